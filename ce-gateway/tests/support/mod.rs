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

use ce_gateway::{Gateway, JobFlags, JobId, JobKind, JobSnapshot, RouteRequest};

pub(crate) async fn assert_add_route_ok(gateway: &Gateway, src: &str, dst: &str) -> JobId {
    gateway
        .create_route(RouteRequest::new(
            src,
            dst,
            JobKind::NetworkLayer,
            JobFlags::NONE,
        ))
        .await
        .unwrap_or_else(|err| panic!("route {src} -> {dst} should be admitted: {err}"))
}

pub(crate) fn snapshot(gateway: &Gateway, job_id: JobId) -> JobSnapshot {
    gateway
        .list_routes(job_id)
        .iter()
        .next()
        .unwrap_or_else(|| panic!("route {job_id} should be listed"))
}

#[allow(dead_code)]
pub(crate) fn listed_ids(gateway: &Gateway) -> Vec<JobId> {
    gateway.list_routes(0).iter().map(|job| job.id).collect()
}
