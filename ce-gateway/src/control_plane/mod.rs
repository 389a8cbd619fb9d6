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

//! Control-plane layer.
//!
//! Owns endpoint registration, the job table and route-lifecycle transitions. Every
//! mutation here runs under the gateway's mutation lock; readers of the job table never
//! take it.
//!
//! ```
//! use std::sync::Arc;
//! use ce_gateway::{Gateway, GatewayError, JobFlags, JobKind, RouteRequest};
//! use loopback_transports::{LoopbackCanBus, RecordingNetStack};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let gateway = Gateway::new("control-plane-doc", Arc::new(RecordingNetStack::new()));
//! gateway
//!     .register_can_interface("can0", 16, Arc::new(LoopbackCanBus::new("can0")))
//!     .await
//!     .unwrap();
//! gateway
//!     .register_can_interface("can1", 16, Arc::new(LoopbackCanBus::new("can1")))
//!     .await
//!     .unwrap();
//!
//! // CAN -> CAN is not a gateway route.
//! let route = RouteRequest::new("can0", "can1", JobKind::NetworkLayer, JobFlags::NONE);
//! assert!(matches!(
//!     gateway.create_route(route).await,
//!     Err(GatewayError::InvalidRoute { .. })
//! ));
//! assert!(gateway.list_routes(0).is_empty());
//! # });
//! ```

pub(crate) mod endpoint_registry;
pub(crate) mod job_table;
pub(crate) mod route_lifecycle;
