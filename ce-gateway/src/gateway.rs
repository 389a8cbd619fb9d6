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

use crate::control_plane::endpoint_registry::{required_frame_size, EndpointRegistry};
use crate::control_plane::job_table::{JobTable, RouteListing};
use crate::control_plane::route_lifecycle::{ResolvedRoute, RouteLifecycle};
use crate::data_plane::ingress_registry::CanIngressRegistry;
use crate::data_plane::virtual_interface::VirtualInterface;
use crate::endpoint::Endpoint;
use crate::error::GatewayError;
use crate::job::{CanFilter, JobFlags, JobId, JobKind};
use crate::observability::events;
use crate::transport::{CanTransport, NetStack};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const COMPONENT: &str = "gateway";

/// Parameters of a route to create, addressed by endpoint name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouteRequest {
    pub src: String,
    pub dst: String,
    pub kind: JobKind,
    pub flags: JobFlags,
    pub filter: CanFilter,
}

impl RouteRequest {
    /// A request with the default match-all receive filter.
    pub fn new(src: &str, dst: &str, kind: JobKind, flags: JobFlags) -> Self {
        Self {
            src: src.to_string(),
            dst: dst.to_string(),
            kind,
            flags,
            filter: CanFilter::MATCH_ALL,
        }
    }

    pub fn with_receive_filter(mut self, filter: CanFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Job ids referencing one endpoint, split by the role it plays.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EndpointMemberships {
    pub as_source: Vec<JobId>,
    pub as_destination: Vec<JobId>,
}

/// CAN <-> Ethernet gateway: the owner of every endpoint and routing job.
///
/// Control operations take `&self` and are serialized by an internal mutation lock, so a
/// `Gateway` can be shared behind an `Arc`. Frame dispatch never takes that lock.
pub struct Gateway {
    name: String,
    registry: EndpointRegistry,
    jobs: Arc<JobTable>,
    ingress_registry: CanIngressRegistry,
    net_stack: Arc<dyn NetStack>,
    mutation_lock: Mutex<()>,
}

impl Gateway {
    /// Creates an empty gateway delivering encapsulated frames to `net_stack`.
    pub fn new(name: &str, net_stack: Arc<dyn NetStack>) -> Self {
        debug!(
            event = events::GATEWAY_CREATE,
            component = COMPONENT,
            gateway = name,
            "gateway created"
        );
        Self {
            name: name.to_string(),
            registry: EndpointRegistry::new(),
            jobs: Arc::new(JobTable::new()),
            ingress_registry: CanIngressRegistry::new(),
            net_stack,
            mutation_lock: Mutex::new(()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn lifecycle(&self) -> RouteLifecycle<'_> {
        RouteLifecycle::new(&self.jobs, &self.ingress_registry, &self.net_stack)
    }

    /// Makes an external CAN interface available for routing.
    pub async fn register_can_interface(
        &self,
        name: &str,
        max_frame_size: u32,
        transport: Arc<dyn CanTransport>,
    ) -> Result<(), GatewayError> {
        let _guard = self.mutation_lock.lock().await;
        self.registry
            .register(Endpoint::can(name, max_frame_size, transport))
            .await
            .map(|_| ())
    }

    /// Creates a gateway-managed interface whose MTU fits jobs of `kind`/`flags`.
    pub async fn create_virtual_interface(
        &self,
        name: &str,
        kind: JobKind,
        flags: JobFlags,
    ) -> Result<VirtualInterface, GatewayError> {
        let _guard = self.mutation_lock.lock().await;
        let endpoint = self
            .registry
            .register(Endpoint::virtual_interface(
                name,
                required_frame_size(kind, flags),
            ))
            .await?;
        Ok(VirtualInterface::new(endpoint, self.jobs.clone()))
    }

    /// Deletes a gateway-managed interface and every route using it.
    pub async fn delete_virtual_interface(&self, name: &str) -> Result<usize, GatewayError> {
        let _guard = self.mutation_lock.lock().await;
        let endpoint = self.registry.resolve(name).await?;
        if !endpoint.is_managed() {
            return Err(GatewayError::NotManaged(name.to_string()));
        }
        Ok(self.teardown_endpoint(&endpoint).await)
    }

    /// Removes any endpoint, cascading to every route using it.
    pub async fn unregister_endpoint(&self, name: &str) -> Result<usize, GatewayError> {
        let _guard = self.mutation_lock.lock().await;
        let endpoint = self.registry.resolve(name).await?;
        Ok(self.teardown_endpoint(&endpoint).await)
    }

    async fn teardown_endpoint(&self, endpoint: &Endpoint) -> usize {
        let removed = self.lifecycle().cascade_on_endpoint_teardown(endpoint).await;
        self.registry.unregister(endpoint.name()).await;
        removed
    }

    /// Transmit handle of a gateway-managed interface.
    pub async fn virtual_interface(&self, name: &str) -> Option<VirtualInterface> {
        let endpoint = self.registry.resolve(name).await.ok()?;
        endpoint
            .is_managed()
            .then(|| VirtualInterface::new(endpoint, self.jobs.clone()))
    }

    /// Creates a route and returns its id.
    pub async fn create_route(&self, request: RouteRequest) -> Result<JobId, GatewayError> {
        let _guard = self.mutation_lock.lock().await;
        info!(
            event = events::ROUTE_ADD_START,
            component = COMPONENT,
            src = request.src.as_str(),
            dst = request.dst.as_str(),
            kind = %request.kind,
            flags = request.flags.bits(),
            "adding route"
        );

        let result = self.create_route_locked(&request).await;
        match &result {
            Ok(job_id) => info!(
                event = events::ROUTE_ADD_OK,
                component = COMPONENT,
                job_id = *job_id,
                src = request.src.as_str(),
                dst = request.dst.as_str(),
                "route added"
            ),
            Err(err) => warn!(
                event = events::ROUTE_ADD_FAILED,
                component = COMPONENT,
                src = request.src.as_str(),
                dst = request.dst.as_str(),
                err = %err,
                "unable to add route"
            ),
        }
        result
    }

    async fn create_route_locked(&self, request: &RouteRequest) -> Result<JobId, GatewayError> {
        let src = self.registry.resolve(&request.src).await?;
        let dst = self.registry.resolve(&request.dst).await?;
        self.lifecycle()
            .create_route(ResolvedRoute {
                src,
                dst,
                kind: request.kind,
                flags: request.flags,
                filter: request.filter,
            })
            .await
    }

    /// Removes route `job_id`, or every route when `job_id` is `0`.
    ///
    /// Returns how many routes were removed; an unknown id removes nothing and is not an
    /// error.
    pub async fn remove_route(&self, job_id: JobId) -> usize {
        let _guard = self.mutation_lock.lock().await;
        info!(
            event = events::ROUTE_DELETE_START,
            component = COMPONENT,
            job_id,
            "removing route"
        );
        self.lifecycle().remove_route(job_id).await
    }

    /// Lists every route, or only `job_id` when non-zero. Never blocks on control operations.
    pub fn list_routes(&self, job_id: JobId) -> RouteListing {
        self.jobs.listing(job_id)
    }

    pub async fn memberships(&self, name: &str) -> Option<EndpointMemberships> {
        let endpoint = self.registry.resolve(name).await.ok()?;
        let index = endpoint.index();
        Some(EndpointMemberships {
            as_source: index.source_jobs().to_vec(),
            as_destination: index.destination_jobs().to_vec(),
        })
    }

    /// Removes every route, then every gateway-managed interface.
    pub async fn shutdown(&self) {
        let removed = self.remove_route(0).await;
        let _guard = self.mutation_lock.lock().await;
        for name in self.registry.managed_names().await {
            if let Ok(endpoint) = self.registry.resolve(&name).await {
                self.teardown_endpoint(&endpoint).await;
            }
        }
        info!(
            event = events::GATEWAY_SHUTDOWN,
            component = COMPONENT,
            gateway = self.name.as_str(),
            removed_routes = removed,
            "gateway shut down"
        );
    }
}
