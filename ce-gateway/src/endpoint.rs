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

use crate::data_plane::endpoint_index::EndpointIndex;
use crate::transport::CanTransport;
use serde::Serialize;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Transport family of an endpoint.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
    Can,
    Ethernet,
}

///
/// [`Endpoint`] is one interface known to the gateway: either an external CAN interface
/// registered by the host, or a virtual Ethernet-like interface the gateway created itself.
///
/// Endpoints are shared as `Arc<Endpoint>`; a routing job holds a clone for its whole
/// lifetime, so an endpoint outlives every job that references it.
pub struct Endpoint {
    name: String,
    kind: EndpointKind,
    max_frame_size: u32,
    managed: bool,
    can_transport: Option<Arc<dyn CanTransport>>,
    index: EndpointIndex,
}

impl Endpoint {
    pub(crate) fn can(name: &str, max_frame_size: u32, transport: Arc<dyn CanTransport>) -> Self {
        Self {
            name: name.to_string(),
            kind: EndpointKind::Can,
            max_frame_size,
            managed: false,
            can_transport: Some(transport),
            index: EndpointIndex::new(),
        }
    }

    pub(crate) fn virtual_interface(name: &str, max_frame_size: u32) -> Self {
        Self {
            name: name.to_string(),
            kind: EndpointKind::Ethernet,
            max_frame_size,
            managed: true,
            can_transport: None,
            index: EndpointIndex::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EndpointKind {
        self.kind
    }

    /// Largest frame the interface accepts (its MTU).
    pub fn max_frame_size(&self) -> u32 {
        self.max_frame_size
    }

    /// `true` for interfaces created by this gateway.
    pub fn is_managed(&self) -> bool {
        self.managed
    }

    pub(crate) fn can_transport(&self) -> Option<&Arc<dyn CanTransport>> {
        self.can_transport.as_ref()
    }

    pub(crate) fn index(&self) -> &EndpointIndex {
        &self.index
    }
}

impl Debug for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("max_frame_size", &self.max_frame_size)
            .field("managed", &self.managed)
            .finish()
    }
}
