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

//! CAN receive-path listener bound to one routing job.

use crate::data_plane::receive_dispatcher;
use crate::job::RoutingJob;
use crate::transport::{CanFrameListener, NetStack};
use std::sync::Arc;

/// Registered with the job's CAN transport; every matching frame is dispatched to the job.
///
/// The listener owns a strong reference to its job, so a frame already in flight when the
/// job is removed still sees a fully initialised job.
pub(crate) struct CanIngressListener {
    job: Arc<RoutingJob>,
    net_stack: Arc<dyn NetStack>,
}

impl CanIngressListener {
    pub(crate) fn new(job: Arc<RoutingJob>, net_stack: Arc<dyn NetStack>) -> Self {
        Self { job, net_stack }
    }
}

impl CanFrameListener for CanIngressListener {
    fn on_frame(&self, frame: &[u8]) {
        receive_dispatcher::on_can_frame(&self.job, frame, self.net_stack.as_ref());
    }
}
