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

//! Shared fixtures for `ce-gateway` integration tests and benches.

use ce_gateway::frame::{CanFdFrame, CanFrame, BROADCAST_MAC, ETH_P_CAN, ETH_P_CANFD, ZERO_MAC};
use ce_gateway::{translator, Gateway, JobFlags, JobKind, VirtualInterface};
use loopback_transports::{LoopbackCanBus, RecordingNetStack};
use std::sync::{Arc, Once};
use tracing_subscriber::EnvFilter;

static LOGGING: Once = Once::new();

/// Installs a `RUST_LOG`-driven subscriber once per test binary.
pub fn init_logging() {
    LOGGING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Serialized classic CAN frame.
pub fn can_frame(id: u32, payload: &[u8]) -> Vec<u8> {
    match CanFrame::new(id, payload) {
        Ok(frame) => frame.to_bytes().to_vec(),
        Err(err) => panic!("invalid CAN frame {id:#x}: {err}"),
    }
}

/// Serialized CAN-FD frame.
pub fn canfd_frame(id: u32, flags: u8, payload: &[u8]) -> Vec<u8> {
    match CanFdFrame::new(id, flags, payload) {
        Ok(frame) => frame.to_bytes().to_vec(),
        Err(err) => panic!("invalid CAN-FD frame {id:#x}: {err}"),
    }
}

/// A classic CAN frame wrapped the way the gateway encapsulates it.
pub fn encapsulated_can(id: u32, payload: &[u8]) -> Vec<u8> {
    translator::can_to_ethernet(&ZERO_MAC, &BROADCAST_MAC, ETH_P_CAN, &can_frame(id, payload))
        .unwrap_or_else(|err| panic!("encapsulation failed: {err}"))
}

pub fn encapsulated_canfd(id: u32, flags: u8, payload: &[u8]) -> Vec<u8> {
    translator::canfd_to_ethernet(
        &ZERO_MAC,
        &BROADCAST_MAC,
        ETH_P_CANFD,
        &canfd_frame(id, flags, payload),
    )
    .unwrap_or_else(|err| panic!("encapsulation failed: {err}"))
}

/// A gateway with one loopback CAN bus and one virtual interface.
pub struct GatewayFixture {
    pub gateway: Arc<Gateway>,
    pub can: Arc<LoopbackCanBus>,
    pub net: Arc<RecordingNetStack>,
    pub ceth: VirtualInterface,
}

impl GatewayFixture {
    pub const CAN: &'static str = "can0";
    pub const CETH: &'static str = "ceth0";

    /// `can0` accepts frames up to `can_mtu` bytes; `ceth0` is sized for `kind`/`flags`.
    pub async fn new(can_mtu: u32, kind: JobKind, flags: JobFlags) -> Self {
        init_logging();
        let net = Arc::new(RecordingNetStack::new());
        let can = Arc::new(LoopbackCanBus::new(Self::CAN));
        let gateway = Arc::new(Gateway::new("fixture", net.clone()));
        if let Err(err) = gateway
            .register_can_interface(Self::CAN, can_mtu, can.clone())
            .await
        {
            panic!("register {}: {err}", Self::CAN);
        }
        let ceth = match gateway.create_virtual_interface(Self::CETH, kind, flags).await {
            Ok(ceth) => ceth,
            Err(err) => panic!("create {}: {err}", Self::CETH),
        };
        Self {
            gateway,
            can,
            net,
            ceth,
        }
    }

    /// The common classic-CAN network-layer setup.
    pub async fn network_layer() -> Self {
        Self::new(16, JobKind::NetworkLayer, JobFlags::NONE).await
    }
}
