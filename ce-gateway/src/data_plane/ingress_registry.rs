/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
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

//! CAN receive-path subscriptions and their lifecycle.

use crate::data_plane::ingress_listener::CanIngressListener;
use crate::error::TransportError;
use crate::job::{CanFilter, JobId, RoutingJob};
use crate::observability::{events, fields};
use crate::transport::{CanFrameListener, CanTransport, NetStack};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

const COMPONENT: &str = "ingress_registry";

/// What is needed to undo one receive registration.
struct CanIngressBinding {
    transport: Arc<dyn CanTransport>,
    filter: CanFilter,
    listener: Arc<CanIngressListener>,
}

/// Receive registrations keyed by the job that owns them.
pub(crate) struct CanIngressRegistry {
    bindings: tokio::sync::Mutex<HashMap<JobId, CanIngressBinding>>,
}

impl CanIngressRegistry {
    pub(crate) fn new() -> Self {
        Self {
            bindings: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Subscribes `job` to frames matching its filter on its CAN interface.
    pub(crate) async fn register_job(
        &self,
        job: &Arc<RoutingJob>,
        net_stack: Arc<dyn NetStack>,
    ) -> Result<(), TransportError> {
        let can_endpoint = job.can_endpoint();
        let Some(transport) = can_endpoint.can_transport().cloned() else {
            warn!(
                event = events::CAN_SUBSCRIBE_FAILED,
                component = COMPONENT,
                job_id = job.id,
                src = can_endpoint.name(),
                reason = fields::REASON_NO_CAN_TRANSPORT,
                "endpoint has no CAN transport to subscribe on"
            );
            return Err(TransportError::Unavailable);
        };

        let listener = Arc::new(CanIngressListener::new(job.clone(), net_stack));
        let as_frame_listener: Arc<dyn CanFrameListener> = listener.clone();

        if let Err(err) = transport
            .register_receiver(job.filter, as_frame_listener)
            .await
        {
            warn!(
                event = events::CAN_SUBSCRIBE_FAILED,
                component = COMPONENT,
                job_id = job.id,
                src = can_endpoint.name(),
                can_id = %fields::format_can_id(job.filter.id),
                err = %err,
                "unable to register CAN receiver"
            );
            return Err(err);
        }

        debug!(
            event = events::CAN_SUBSCRIBE_OK,
            component = COMPONENT,
            job_id = job.id,
            src = can_endpoint.name(),
            can_id = %fields::format_can_id(job.filter.id),
            "registered CAN receiver"
        );

        self.bindings.lock().await.insert(
            job.id,
            CanIngressBinding {
                transport,
                filter: job.filter,
                listener,
            },
        );
        Ok(())
    }

    /// Removes the receive registration of `job_id`. Returns `false` when none existed.
    ///
    /// Transport errors are logged; the binding is forgotten either way.
    pub(crate) async fn unregister_job(&self, job_id: JobId) -> bool {
        let Some(binding) = self.bindings.lock().await.remove(&job_id) else {
            return false;
        };

        let listener: Arc<dyn CanFrameListener> = binding.listener;
        if let Err(err) = binding
            .transport
            .unregister_receiver(binding.filter, listener)
            .await
        {
            warn!(
                event = events::CAN_UNSUBSCRIBE_FAILED,
                component = COMPONENT,
                job_id,
                can_id = %fields::format_can_id(binding.filter.id),
                err = %err,
                "unable to unregister CAN receiver"
            );
        } else {
            debug!(
                event = events::CAN_UNSUBSCRIBE_OK,
                component = COMPONENT,
                job_id,
                "unregistered CAN receiver"
            );
        }
        true
    }

    #[cfg(test)]
    pub(crate) async fn binding_count(&self) -> usize {
        self.bindings.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::CanIngressRegistry;
    use crate::endpoint::Endpoint;
    use crate::frame::{CanFrame, CAN_MTU, ETH_DATA_LEN};
    use crate::job::{CanFilter, Direction, JobFlags, JobKind, RoutingJob};
    use crate::test_support::{RecordingCanTransport, RecordingNetStack};
    use std::sync::Arc;

    fn can_to_ethernet_job(
        transport: Arc<RecordingCanTransport>,
        filter: CanFilter,
    ) -> Arc<RoutingJob> {
        Arc::new(RoutingJob::new(
            5,
            JobKind::NetworkLayer,
            JobFlags::NONE,
            Direction::CanToEthernet,
            filter,
            Arc::new(Endpoint::can("can0", CAN_MTU as u32, transport)),
            Arc::new(Endpoint::virtual_interface("ceth0", ETH_DATA_LEN as u32)),
        ))
    }

    #[tokio::test]
    async fn register_and_unregister_job_round_trips_transport_registration() {
        let transport = Arc::new(RecordingCanTransport::default());
        let net = Arc::new(RecordingNetStack::default());
        let registry = CanIngressRegistry::new();
        let job = can_to_ethernet_job(transport.clone(), CanFilter::MATCH_ALL);

        registry
            .register_job(&job, net.clone())
            .await
            .expect("register should succeed");
        assert_eq!(transport.registration_count(), 1);
        assert_eq!(registry.binding_count().await, 1);

        let frame = CanFrame::new(0x10, &[1, 2]).expect("frame");
        assert_eq!(transport.inject(&frame.to_bytes()), 1);
        assert_eq!(net.delivered().len(), 1);
        assert_eq!(job.handled(), 1);

        assert!(registry.unregister_job(job.id).await);
        assert_eq!(transport.registration_count(), 0);
        assert!(!registry.unregister_job(job.id).await);
    }

    #[tokio::test]
    async fn filter_limits_which_frames_reach_the_job() {
        let transport = Arc::new(RecordingCanTransport::default());
        let net = Arc::new(RecordingNetStack::default());
        let registry = CanIngressRegistry::new();
        let job = can_to_ethernet_job(transport.clone(), CanFilter::new(0x100, 0x700));

        registry
            .register_job(&job, net.clone())
            .await
            .expect("register should succeed");

        let matching = CanFrame::new(0x1AB, &[1]).expect("frame");
        let other = CanFrame::new(0x2AB, &[1]).expect("frame");
        transport.inject(&matching.to_bytes());
        transport.inject(&other.to_bytes());

        assert_eq!(net.delivered().len(), 1);
    }

    #[tokio::test]
    async fn failed_registration_leaves_no_binding() {
        let transport = Arc::new(RecordingCanTransport::failing_register());
        let registry = CanIngressRegistry::new();
        let job = can_to_ethernet_job(transport, CanFilter::MATCH_ALL);

        assert!(registry
            .register_job(&job, Arc::new(RecordingNetStack::default()))
            .await
            .is_err());
        assert_eq!(registry.binding_count().await, 0);
    }
}
