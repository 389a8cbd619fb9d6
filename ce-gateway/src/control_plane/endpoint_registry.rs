/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Name -> endpoint registry and frame-size admission rules.

use crate::endpoint::Endpoint;
use crate::error::GatewayError;
use crate::frame::{CANFD_MAX_DLEN, CANFD_MTU, CAN_MAX_DLEN, CAN_MTU, ETH_DATA_LEN};
use crate::job::{JobFlags, JobKind};
use crate::observability::events;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

const COMPONENT: &str = "endpoint_registry";

/// Smallest frame size an endpoint must accept to carry jobs of `kind`.
///
/// Also used as the MTU of virtual interfaces created for `kind`.
pub(crate) fn required_frame_size(kind: JobKind, flags: JobFlags) -> u32 {
    let size = match (kind, flags.is_can_fd()) {
        (JobKind::EthernetHeader, false) => CAN_MAX_DLEN,
        (JobKind::EthernetHeader, true) => CANFD_MAX_DLEN,
        (JobKind::NetworkLayer, false) => CAN_MTU,
        (JobKind::NetworkLayer, true) => CANFD_MTU,
        (JobKind::None | JobKind::Tcp | JobKind::Udp, _) => ETH_DATA_LEN,
    };
    size as u32
}

/// Advisory check; callers must reject the job themselves on `false`.
pub(crate) fn meets_minimum_frame_size(endpoint: &Endpoint, kind: JobKind, flags: JobFlags) -> bool {
    endpoint.max_frame_size() >= required_frame_size(kind, flags)
}

pub(crate) struct EndpointRegistry {
    endpoints: Mutex<HashMap<String, Arc<Endpoint>>>,
}

impl EndpointRegistry {
    pub(crate) fn new() -> Self {
        Self {
            endpoints: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) async fn register(&self, endpoint: Endpoint) -> Result<Arc<Endpoint>, GatewayError> {
        let mut endpoints = self.endpoints.lock().await;
        if endpoints.contains_key(endpoint.name()) {
            return Err(GatewayError::EndpointExists(endpoint.name().to_string()));
        }

        info!(
            event = events::ENDPOINT_REGISTER,
            component = COMPONENT,
            endpoint = endpoint.name(),
            kind = ?endpoint.kind(),
            max_frame_size = endpoint.max_frame_size(),
            managed = endpoint.is_managed(),
            "registered endpoint"
        );

        let endpoint = Arc::new(endpoint);
        endpoints.insert(endpoint.name().to_string(), endpoint.clone());
        Ok(endpoint)
    }

    pub(crate) async fn resolve(&self, name: &str) -> Result<Arc<Endpoint>, GatewayError> {
        self.endpoints
            .lock()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| GatewayError::EndpointNotFound(name.to_string()))
    }

    pub(crate) async fn unregister(&self, name: &str) -> Option<Arc<Endpoint>> {
        let removed = self.endpoints.lock().await.remove(name);
        if removed.is_some() {
            info!(
                event = events::ENDPOINT_UNREGISTER,
                component = COMPONENT,
                endpoint = name,
                "unregistered endpoint"
            );
        }
        removed
    }

    /// Names of the endpoints this gateway created.
    pub(crate) async fn managed_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .endpoints
            .lock()
            .await
            .values()
            .filter(|endpoint| endpoint.is_managed())
            .map(|endpoint| endpoint.name().to_string())
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::{meets_minimum_frame_size, required_frame_size, EndpointRegistry};
    use crate::endpoint::Endpoint;
    use crate::error::GatewayError;
    use crate::job::{JobFlags, JobKind};
    use crate::test_support::RecordingCanTransport;
    use std::sync::Arc;

    fn can(name: &str, mtu: u32) -> Endpoint {
        Endpoint::can(name, mtu, Arc::new(RecordingCanTransport::default()))
    }

    #[test]
    fn required_frame_size_follows_kind_and_fd_flag() {
        assert_eq!(required_frame_size(JobKind::None, JobFlags::NONE), 1500);
        assert_eq!(required_frame_size(JobKind::EthernetHeader, JobFlags::NONE), 8);
        assert_eq!(required_frame_size(JobKind::EthernetHeader, JobFlags::CAN_FD), 64);
        assert_eq!(required_frame_size(JobKind::NetworkLayer, JobFlags::NONE), 16);
        assert_eq!(required_frame_size(JobKind::NetworkLayer, JobFlags::CAN_FD), 72);
        assert_eq!(required_frame_size(JobKind::Tcp, JobFlags::CAN_FD), 1500);
        assert_eq!(required_frame_size(JobKind::Udp, JobFlags::NONE), 1500);
    }

    #[test]
    fn minimum_frame_size_check_is_inclusive() {
        assert!(meets_minimum_frame_size(&can("can0", 16), JobKind::NetworkLayer, JobFlags::NONE));
        assert!(!meets_minimum_frame_size(&can("can0", 8), JobKind::NetworkLayer, JobFlags::NONE));
        assert!(!meets_minimum_frame_size(&can("can0", 16), JobKind::NetworkLayer, JobFlags::CAN_FD));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_names() {
        let registry = EndpointRegistry::new();
        registry.register(can("can0", 16)).await.expect("first register");

        assert!(matches!(
            registry.register(can("can0", 72)).await,
            Err(GatewayError::EndpointExists(name)) if name == "can0"
        ));
    }

    #[tokio::test]
    async fn resolve_and_unregister() {
        let registry = EndpointRegistry::new();
        registry
            .register(Endpoint::virtual_interface("ceth0", 16))
            .await
            .expect("register");
        registry.register(can("can0", 16)).await.expect("register");

        assert!(registry.resolve("ceth0").await.expect("resolve").is_managed());
        assert_eq!(registry.managed_names().await, vec!["ceth0".to_string()]);
        assert!(registry.unregister("ceth0").await.is_some());
        assert!(matches!(
            registry.resolve("ceth0").await,
            Err(GatewayError::EndpointNotFound(_))
        ));
    }
}
