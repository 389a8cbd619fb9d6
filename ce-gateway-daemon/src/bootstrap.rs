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

//! Builds a gateway from the daemon configuration.

use crate::config::Config;
use ce_gateway::frame::EthernetHeader;
use ce_gateway::observability::fields;
use ce_gateway::{Gateway, GatewayError, JobFlags, JobKind, NetStack, RouteRequest, TransportError};
use loopback_transports::LoopbackCanBus;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Host side of the daemon's virtual interfaces: frames are logged and discarded.
pub(crate) struct LoggingNetStack;

impl NetStack for LoggingNetStack {
    fn deliver(&self, interface: &str, frame: Vec<u8>) -> Result<(), TransportError> {
        debug!(
            interface,
            frame_len = frame.len(),
            destination = %EthernetHeader::parse(&frame)
                .map(|(header, _)| fields::format_mac(&header.destination))
                .unwrap_or_default(),
            "frame delivered to host"
        );
        Ok(())
    }
}

pub(crate) struct Runtime {
    pub(crate) gateway: Arc<Gateway>,
    pub(crate) buses: HashMap<String, Arc<LoopbackCanBus>>,
}

pub(crate) async fn build(config: &Config) -> Result<Runtime, GatewayError> {
    let gateway = Arc::new(Gateway::new(
        &config.gateway.name,
        Arc::new(LoggingNetStack),
    ));

    let mut buses = HashMap::new();
    for can in &config.can_interfaces {
        let bus = Arc::new(LoopbackCanBus::new(&can.name));
        gateway
            .register_can_interface(&can.name, can.max_frame_size, bus.clone())
            .await?;
        buses.insert(can.name.clone(), bus);
    }

    for vif in &config.virtual_interfaces {
        let kind = JobKind::try_from(vif.kind)?;
        gateway
            .create_virtual_interface(&vif.name, kind, JobFlags::from_bits(vif.flags))
            .await?;
    }

    for route in &config.routes {
        let kind = JobKind::try_from(route.kind)?;
        let job_id = gateway
            .create_route(RouteRequest::new(
                &route.src,
                &route.dst,
                kind,
                JobFlags::from_bits(route.flags),
            ))
            .await?;
        info!(job_id, src = route.src.as_str(), dst = route.dst.as_str(), "configured route");
    }

    Ok(Runtime { gateway, buses })
}
