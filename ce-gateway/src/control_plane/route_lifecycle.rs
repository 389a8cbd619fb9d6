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

//! Route lifecycle orchestration across the job table, endpoint indices and CAN
//! subscriptions.
//!
//! Callers must serialize lifecycle operations; the gateway does so with its mutation lock.

use crate::control_plane::endpoint_registry::{meets_minimum_frame_size, required_frame_size};
use crate::control_plane::job_table::JobTable;
use crate::data_plane::endpoint_index::Role;
use crate::data_plane::ingress_registry::CanIngressRegistry;
use crate::endpoint::{Endpoint, EndpointKind};
use crate::error::GatewayError;
use crate::job::{CanFilter, Direction, JobFlags, JobId, JobKind, RoutingJob, ALL_JOBS};
use crate::observability::{events, fields};
use crate::transport::NetStack;
use std::sync::Arc;
use tracing::{debug, info, warn};

const COMPONENT: &str = "route_lifecycle";

/// Fully resolved parameters of a route to create.
pub(crate) struct ResolvedRoute {
    pub(crate) src: Arc<Endpoint>,
    pub(crate) dst: Arc<Endpoint>,
    pub(crate) kind: JobKind,
    pub(crate) flags: JobFlags,
    pub(crate) filter: CanFilter,
}

fn routing_direction(src: &Endpoint, dst: &Endpoint) -> Option<Direction> {
    match (src.kind(), dst.kind()) {
        (EndpointKind::Can, EndpointKind::Ethernet) if dst.is_managed() => {
            Some(Direction::CanToEthernet)
        }
        (EndpointKind::Ethernet, EndpointKind::Can) if src.is_managed() => {
            Some(Direction::EthernetToCan)
        }
        _ => None,
    }
}

fn check_frame_size(endpoint: &Endpoint, kind: JobKind, flags: JobFlags) -> Result<(), GatewayError> {
    if meets_minimum_frame_size(endpoint, kind, flags) {
        return Ok(());
    }
    Err(GatewayError::MtuTooSmall {
        endpoint: endpoint.name().to_string(),
        required: required_frame_size(kind, flags),
        available: endpoint.max_frame_size(),
    })
}

/// Coordinates the three places a job is linked from plus its CAN subscription.
pub(crate) struct RouteLifecycle<'a> {
    job_table: &'a JobTable,
    ingress_registry: &'a CanIngressRegistry,
    net_stack: &'a Arc<dyn NetStack>,
}

impl<'a> RouteLifecycle<'a> {
    pub(crate) fn new(
        job_table: &'a JobTable,
        ingress_registry: &'a CanIngressRegistry,
        net_stack: &'a Arc<dyn NetStack>,
    ) -> Self {
        Self {
            job_table,
            ingress_registry,
            net_stack,
        }
    }

    /// Admits a route, links it everywhere and subscribes it. Rolls back on subscribe failure.
    pub(crate) async fn create_route(&self, route: ResolvedRoute) -> Result<JobId, GatewayError> {
        let ResolvedRoute {
            src,
            dst,
            kind,
            flags,
            filter,
        } = route;

        check_frame_size(&src, kind, flags)?;
        check_frame_size(&dst, kind, flags)?;

        let direction =
            routing_direction(&src, &dst).ok_or_else(|| GatewayError::InvalidRoute {
                src: src.name().to_string(),
                dst: dst.name().to_string(),
            })?;

        let job = Arc::new(RoutingJob::new(
            self.job_table.allocate_id(),
            kind,
            flags,
            direction,
            filter,
            src,
            dst,
        ));

        self.job_table.insert(job.clone());
        job.src.index().add_membership(job.id, Role::Source);
        job.dst.index().add_membership(job.id, Role::Destination);

        if direction == Direction::CanToEthernet {
            if let Err(err) = self
                .ingress_registry
                .register_job(&job, self.net_stack.clone())
                .await
            {
                self.unlink(job.id);
                return Err(GatewayError::Subscription(err));
            }
        }

        Ok(job.id)
    }

    fn unlink(&self, job_id: JobId) -> Option<Arc<RoutingJob>> {
        let job = self.job_table.remove(job_id)?;
        job.retire();
        job.src.index().remove_membership(job_id);
        job.dst.index().remove_membership(job_id);
        Some(job)
    }

    async fn remove_one(&self, job_id: JobId) -> bool {
        let Some(job) = self.unlink(job_id) else {
            return false;
        };

        if job.direction == Direction::CanToEthernet
            && !self.ingress_registry.unregister_job(job_id).await
        {
            warn!(
                event = events::ROUTE_DELETE_FAILED,
                component = COMPONENT,
                job_id,
                reason = "missing_can_subscription",
                "job had no CAN subscription to remove"
            );
        }

        debug!(
            event = events::ROUTE_DELETE_OK,
            component = COMPONENT,
            job_id,
            src = job.src.name(),
            dst = job.dst.name(),
            handled = job.handled(),
            dropped = job.dropped(),
            "removed route"
        );
        // Freed once in-flight frames and listings holding it finish.
        drop(job);
        true
    }

    /// Removes `job_id`, or every job for [`ALL_JOBS`]. Returns how many were removed.
    pub(crate) async fn remove_route(&self, job_id: JobId) -> usize {
        if job_id != ALL_JOBS {
            return usize::from(self.remove_one(job_id).await);
        }

        let mut removed = 0;
        for id in self.job_table.ids() {
            if self.remove_one(id).await {
                removed += 1;
            }
        }
        info!(
            event = events::ROUTE_DELETE_OK,
            component = COMPONENT,
            removed,
            "removed all routes"
        );
        removed
    }

    /// Removes every job that references `endpoint`, in either role.
    pub(crate) async fn cascade_on_endpoint_teardown(&self, endpoint: &Endpoint) -> usize {
        let mut removed = 0;
        for job_id in endpoint.index().all_jobs() {
            if self.remove_one(job_id).await {
                removed += 1;
            } else {
                warn!(
                    event = events::ROUTE_CASCADE_FAILED,
                    component = COMPONENT,
                    job_id,
                    endpoint = endpoint.name(),
                    reason = fields::REASON_JOB_NOT_FOUND,
                    "indexed job missing from job table"
                );
            }
        }
        removed
    }
}
