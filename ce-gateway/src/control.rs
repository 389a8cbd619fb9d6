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

//! Control-plane commands as typed values.
//!
//! Any transport that can carry serde values can front a [`ControlHandler`]; the daemon uses
//! newline-delimited JSON:
//!
//! ```
//! use ce_gateway::control::{ControlRequest, ControlResponse};
//!
//! let request: ControlRequest =
//!     serde_json::from_str(r#"{"command":"add_route","dst":"ceth0","kind":2}"#).unwrap();
//! assert_eq!(
//!     request,
//!     ControlRequest::AddRoute { src: None, dst: "ceth0".into(), kind: 2, flags: 0 }
//! );
//! assert_eq!(serde_json::to_string(&ControlResponse::Done).unwrap(), r#"{"type":"done"}"#);
//! ```

use crate::error::GatewayError;
use crate::gateway::{Gateway, RouteRequest};
use crate::job::{JobFlags, JobId, JobKind, JobSnapshot, ALL_JOBS};
use crate::observability::events;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

const COMPONENT: &str = "control";

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ControlRequest {
    /// Diagnostic round-trip.
    Echo { message: String },
    /// Without `src`, creates virtual interface `dst`; with `src`, creates a route.
    AddRoute {
        #[serde(default)]
        src: Option<String>,
        dst: String,
        kind: u8,
        #[serde(default)]
        flags: u32,
    },
    /// With `dst`, deletes that virtual interface and its routes; otherwise deletes route
    /// `id` (`0` = all).
    DeleteRoute {
        #[serde(default)]
        id: Option<JobId>,
        #[serde(default)]
        dst: Option<String>,
    },
    /// Lists route `id`, or all routes for `0`.
    ListRoutes {
        #[serde(default)]
        id: JobId,
    },
}

/// Stable result codes reported to control-plane clients.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NoDevice,
    AlreadyExists,
    MtuTooSmall,
    InvalidRoute,
    InvalidKind,
    NotManaged,
    MissingAttribute,
    SubscriptionFailed,
    /// The request could not be decoded; never produced by the gateway itself.
    InvalidRequest,
}

impl From<&GatewayError> for ErrorCode {
    fn from(err: &GatewayError) -> Self {
        match err {
            GatewayError::EndpointNotFound(_) => ErrorCode::NoDevice,
            GatewayError::EndpointExists(_) => ErrorCode::AlreadyExists,
            GatewayError::MtuTooSmall { .. } => ErrorCode::MtuTooSmall,
            GatewayError::InvalidRoute { .. } => ErrorCode::InvalidRoute,
            GatewayError::InvalidKind(_) => ErrorCode::InvalidKind,
            GatewayError::NotManaged(_) => ErrorCode::NotManaged,
            GatewayError::MissingAttribute(_) => ErrorCode::MissingAttribute,
            GatewayError::Subscription(_) => ErrorCode::SubscriptionFailed,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlResponse {
    Echo { message: String },
    Ack,
    Error { code: ErrorCode, message: String },
    Route(JobSnapshot),
    /// Ends a `list_routes` stream.
    Done,
}

impl ControlResponse {
    /// Error reply for a request that could not be decoded.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        ControlResponse::Error {
            code: ErrorCode::InvalidRequest,
            message: message.into(),
        }
    }
}

impl From<GatewayError> for ControlResponse {
    fn from(err: GatewayError) -> Self {
        ControlResponse::Error {
            code: ErrorCode::from(&err),
            message: err.to_string(),
        }
    }
}

/// Executes control requests against a shared [`Gateway`].
#[derive(Clone)]
pub struct ControlHandler {
    gateway: Arc<Gateway>,
}

impl ControlHandler {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Runs one request. `list_routes` yields one response per route followed by `Done`;
    /// every other request yields exactly one response.
    pub async fn handle(&self, request: ControlRequest) -> Vec<ControlResponse> {
        debug!(
            event = events::CONTROL_REQUEST,
            component = COMPONENT,
            request = ?request,
            "handling control request"
        );

        match request {
            ControlRequest::Echo { message } => vec![ControlResponse::Echo { message }],
            ControlRequest::AddRoute {
                src,
                dst,
                kind,
                flags,
            } => vec![self.add_route(src, dst, kind, flags).await],
            ControlRequest::DeleteRoute { id, dst } => vec![self.delete_route(id, dst).await],
            ControlRequest::ListRoutes { id } => {
                let mut responses: Vec<ControlResponse> = self
                    .gateway
                    .list_routes(id)
                    .iter()
                    .map(ControlResponse::Route)
                    .collect();
                responses.push(ControlResponse::Done);
                responses
            }
        }
    }

    async fn add_route(
        &self,
        src: Option<String>,
        dst: String,
        kind: u8,
        flags: u32,
    ) -> ControlResponse {
        let kind = match JobKind::try_from(kind) {
            Ok(kind) => kind,
            Err(err) => return err.into(),
        };
        let flags = JobFlags::from_bits(flags);

        let result = match src {
            None => self
                .gateway
                .create_virtual_interface(&dst, kind, flags)
                .await
                .map(|_| ()),
            Some(src) => self
                .gateway
                .create_route(RouteRequest::new(&src, &dst, kind, flags))
                .await
                .map(|_| ()),
        };
        result.map_or_else(ControlResponse::from, |()| ControlResponse::Ack)
    }

    async fn delete_route(&self, id: Option<JobId>, dst: Option<String>) -> ControlResponse {
        match (dst, id) {
            (Some(dst), _) => match self.gateway.delete_virtual_interface(&dst).await {
                Ok(removed) => {
                    info!(
                        event = events::ROUTE_DELETE_OK,
                        component = COMPONENT,
                        dst = dst.as_str(),
                        removed,
                        "deleted virtual interface"
                    );
                    ControlResponse::Ack
                }
                Err(err) => err.into(),
            },
            (None, Some(id)) => {
                self.gateway.remove_route(id).await;
                ControlResponse::Ack
            }
            (None, None) => GatewayError::MissingAttribute("id").into(),
        }
    }
}

impl ControlRequest {
    /// Request deleting every route.
    pub fn delete_all_routes() -> Self {
        ControlRequest::DeleteRoute {
            id: Some(ALL_JOBS),
            dst: None,
        }
    }
}
