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

//! # ce-gateway
//!
//! `ce-gateway` relays frames between CAN interfaces and Ethernet-like virtual interfaces,
//! translating each frame according to a configured routing job and counting what each job
//! forwards and drops.
//!
//! Typical usage is API-first and centered on [`Gateway`]: register the host's CAN
//! interfaces, create virtual interfaces, then add routes between them.
//!
//! ## Routing a CAN bus onto a virtual interface
//!
//! ```
//! use std::sync::Arc;
//! use ce_gateway::frame::{CanFrame, ETH_HLEN};
//! use ce_gateway::{Gateway, JobFlags, JobKind, RouteRequest};
//! use loopback_transports::{LoopbackCanBus, RecordingNetStack};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let net = Arc::new(RecordingNetStack::new());
//! let can0 = Arc::new(LoopbackCanBus::new("can0"));
//! let gateway = Gateway::new("quick-start", net.clone());
//!
//! gateway.register_can_interface("can0", 16, can0.clone()).await.unwrap();
//! gateway
//!     .create_virtual_interface("ceth0", JobKind::NetworkLayer, JobFlags::NONE)
//!     .await
//!     .unwrap();
//! let job_id = gateway
//!     .create_route(RouteRequest::new("can0", "ceth0", JobKind::NetworkLayer, JobFlags::NONE))
//!     .await
//!     .unwrap();
//!
//! let frame = CanFrame::new(0x123, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
//! can0.inject(&frame.to_bytes());
//!
//! let delivered = net.delivered_on("ceth0");
//! assert_eq!(&delivered[0][ETH_HLEN..], &frame.to_bytes());
//!
//! let snapshot = gateway.list_routes(job_id).iter().next().unwrap();
//! assert_eq!(snapshot.handled, 1);
//!
//! assert_eq!(gateway.remove_route(job_id).await, 1);
//! # });
//! ```
//!
//! ## Routing a virtual interface onto a CAN bus
//!
//! Frames the host transmits on a virtual interface are handed to
//! [`VirtualInterface::transmit`], decapsulated and sent on the CAN bus with local echo.
//!
//! ```
//! use std::sync::Arc;
//! use ce_gateway::frame::{CanFrame, BROADCAST_MAC, ETH_P_CAN, ZERO_MAC};
//! use ce_gateway::{translator, Gateway, JobFlags, JobKind, RouteRequest};
//! use loopback_transports::{LoopbackCanBus, RecordingNetStack};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let can0 = Arc::new(LoopbackCanBus::new("can0"));
//! let gateway = Gateway::new("reverse", Arc::new(RecordingNetStack::new()));
//! gateway.register_can_interface("can0", 16, can0.clone()).await.unwrap();
//! let ceth0 = gateway
//!     .create_virtual_interface("ceth0", JobKind::NetworkLayer, JobFlags::NONE)
//!     .await
//!     .unwrap();
//! gateway
//!     .create_route(RouteRequest::new("ceth0", "can0", JobKind::NetworkLayer, JobFlags::NONE))
//!     .await
//!     .unwrap();
//!
//! let frame = CanFrame::new(0x42A, &[0xCA, 0xFE]).unwrap();
//! let ethernet =
//!     translator::can_to_ethernet(&ZERO_MAC, &BROADCAST_MAC, ETH_P_CAN, &frame.to_bytes())
//!         .unwrap();
//! assert_eq!(ceth0.transmit(&ethernet), 1);
//! assert_eq!(can0.sent()[0].frame, frame.to_bytes().to_vec());
//! # });
//! ```
//!
//! ## Route contract
//!
//! Admission errors are reported synchronously and leave no trace; removing an unknown
//! route is not an error and removes nothing.
//!
//! ```
//! use std::sync::Arc;
//! use ce_gateway::{Gateway, GatewayError, JobFlags, JobKind, RouteRequest};
//! use loopback_transports::{LoopbackCanBus, RecordingNetStack};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let gateway = Gateway::new("contract", Arc::new(RecordingNetStack::new()));
//! gateway
//!     .register_can_interface("can0", 8, Arc::new(LoopbackCanBus::new("can0")))
//!     .await
//!     .unwrap();
//! gateway
//!     .create_virtual_interface("ceth0", JobKind::NetworkLayer, JobFlags::NONE)
//!     .await
//!     .unwrap();
//!
//! let route = RouteRequest::new("can0", "ceth0", JobKind::NetworkLayer, JobFlags::NONE);
//! assert!(matches!(
//!     gateway.create_route(route).await,
//!     Err(GatewayError::MtuTooSmall { required: 16, available: 8, .. })
//! ));
//! assert_eq!(gateway.remove_route(7).await, 0);
//! # });
//! ```
//!
//! ## Internal architecture map
//!
//! - API facade: [`Gateway`], [`RouteRequest`], [`VirtualInterface`]
//! - Control plane: endpoint registry, job table and route lifecycle
//! - Data plane: endpoint indices, CAN subscriptions and the receive dispatcher
//! - [`translator`]: pure CAN/CAN-FD <-> Ethernet conversions over [`frame`] layouts
//! - [`control`]: control-plane commands as typed request/response values
//!
//! ## Concurrency model
//!
//! Control operations are serialized by one mutation lock. The job table and endpoint
//! indices are published through atomic pointer swaps, so frame dispatch and route
//! listings never wait on it. Jobs are reference counted: a removed job is freed only
//! after the last in-flight frame or listing holding it has finished.
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events.
//! Library code emits events and does not initialize a global subscriber. Binaries and
//! tests are responsible for one-time `tracing_subscriber` initialization at process
//! boundaries.

mod control_plane;
mod data_plane;

pub mod control;
mod endpoint;
pub use endpoint::{Endpoint, EndpointKind};

mod error;
pub use error::{GatewayError, TranslationError, TransportError};

pub mod frame;

mod gateway;
pub use gateway::{EndpointMemberships, Gateway, RouteRequest};

mod job;
pub use job::{CanFilter, JobFlags, JobId, JobKind, JobSnapshot, ALL_JOBS};

pub use control_plane::job_table::RouteListing;
pub use data_plane::virtual_interface::VirtualInterface;

#[doc(hidden)]
pub mod observability;

mod transport;
pub use transport::{CanFrameListener, CanTransport, NetStack};

pub mod translator;

#[cfg(test)]
mod test_support;
