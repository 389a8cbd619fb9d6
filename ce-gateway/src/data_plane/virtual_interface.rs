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

use crate::control_plane::job_table::JobTable;
use crate::data_plane::receive_dispatcher::{self, Disposition};
use crate::endpoint::Endpoint;
use std::sync::Arc;

/// Transmit side of a gateway-managed interface.
///
/// The host's interface shim calls [`VirtualInterface::transmit`] for every frame the OS
/// sends on the interface; each job that uses the interface as its source gets the frame.
#[derive(Clone)]
pub struct VirtualInterface {
    endpoint: Arc<Endpoint>,
    jobs: Arc<JobTable>,
}

impl VirtualInterface {
    pub(crate) fn new(endpoint: Arc<Endpoint>, jobs: Arc<JobTable>) -> Self {
        Self { endpoint, jobs }
    }

    pub fn name(&self) -> &str {
        self.endpoint.name()
    }

    pub fn mtu(&self) -> u32 {
        self.endpoint.max_frame_size()
    }

    /// Dispatches `frame` to every job sourced on this interface.
    ///
    /// Returns how many of them forwarded it.
    pub fn transmit(&self, frame: &[u8]) -> usize {
        let source_jobs = self.endpoint.index().source_jobs();
        source_jobs
            .iter()
            .filter_map(|job_id| self.jobs.get(*job_id))
            .filter(|job| receive_dispatcher::on_ethernet_frame(job, frame) == Disposition::Handled)
            .count()
    }
}
