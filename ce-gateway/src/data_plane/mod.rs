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

//! Data-plane layer.
//!
//! Owns the per-endpoint job indices, CAN receive subscriptions and the receive dispatcher
//! that translates and forwards frames. Nothing in this layer blocks.
//!
//! ```
//! use std::sync::Arc;
//! use ce_gateway::frame::CanFrame;
//! use ce_gateway::{Gateway, JobFlags, JobKind, RouteRequest};
//! use loopback_transports::{LoopbackCanBus, RecordingNetStack};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let net = Arc::new(RecordingNetStack::new());
//! let bus = Arc::new(LoopbackCanBus::new("can0"));
//! let gateway = Gateway::new("data-plane-doc", net.clone());
//! gateway.register_can_interface("can0", 16, bus.clone()).await.unwrap();
//! gateway
//!     .create_virtual_interface("ceth0", JobKind::NetworkLayer, JobFlags::NONE)
//!     .await
//!     .unwrap();
//! gateway
//!     .create_route(RouteRequest::new("can0", "ceth0", JobKind::NetworkLayer, JobFlags::NONE))
//!     .await
//!     .unwrap();
//!
//! // A CAN frame arriving on can0 is delivered to the host on ceth0.
//! bus.inject(&CanFrame::new(0x123, &[1, 2]).unwrap().to_bytes());
//! assert_eq!(net.delivered_on("ceth0").len(), 1);
//! # });
//! ```

pub(crate) mod endpoint_index;
pub(crate) mod ingress_listener;
pub(crate) mod ingress_registry;
pub(crate) mod receive_dispatcher;
pub(crate) mod virtual_interface;
