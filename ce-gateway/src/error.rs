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

//! Error types surfaced by the gateway.
//!
//! Admission failures are reported through [`GatewayError`] to the control-plane caller.
//! [`TranslationError`] never leaves the receive path: a frame that fails to translate is
//! dropped and counted on its job.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure reported by a [`CanTransport`](crate::CanTransport) or [`NetStack`](crate::NetStack).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TransportError {
    /// The transport refused the request (for example a malformed receive filter).
    Rejected(String),
    /// The device behind the transport is down or gone.
    Unavailable,
    Other(String),
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Rejected(reason) => write!(f, "transport rejected request: {reason}"),
            TransportError::Unavailable => write!(f, "transport unavailable"),
            TransportError::Other(reason) => write!(f, "transport failure: {reason}"),
        }
    }
}

impl Error for TransportError {}

/// Failures for control-plane operations on the gateway.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GatewayError {
    EndpointNotFound(String),
    EndpointExists(String),
    MtuTooSmall {
        endpoint: String,
        required: u32,
        available: u32,
    },
    /// The endpoint pair is not CAN -> gateway interface or gateway interface -> CAN.
    InvalidRoute {
        src: String,
        dst: String,
    },
    InvalidKind(u8),
    /// The endpoint exists but was not created by this gateway.
    NotManaged(String),
    MissingAttribute(&'static str),
    Subscription(TransportError),
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::EndpointNotFound(name) => write!(f, "endpoint not found: {name}"),
            GatewayError::EndpointExists(name) => write!(f, "endpoint already exists: {name}"),
            GatewayError::MtuTooSmall {
                endpoint,
                required,
                available,
            } => write!(
                f,
                "endpoint {endpoint} frame size {available} below required minimum {required}"
            ),
            GatewayError::InvalidRoute { src, dst } => write!(
                f,
                "unsupported route {src} -> {dst}: expected CAN <-> gateway interface"
            ),
            GatewayError::InvalidKind(kind) => write!(f, "unknown translation kind {kind}"),
            GatewayError::NotManaged(name) => {
                write!(f, "endpoint {name} is not managed by this gateway")
            }
            GatewayError::MissingAttribute(attribute) => {
                write!(f, "missing required attribute: {attribute}")
            }
            GatewayError::Subscription(err) => {
                write!(f, "failed to subscribe job to CAN receive path: {err}")
            }
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GatewayError::Subscription(err) => Some(err),
            _ => None,
        }
    }
}

/// Reasons a frame could not be translated. Handled locally by the dispatcher.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TranslationError {
    Truncated { needed: usize, available: usize },
    InvalidLength(u8),
    UnexpectedProtocol(u16),
    /// A serialized frame whose size is neither `CAN_MTU` nor, on CAN-FD jobs, `CANFD_MTU`.
    UnexpectedFrameSize(usize),
}

impl Display for TranslationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslationError::Truncated { needed, available } => {
                write!(f, "frame truncated: need {needed} bytes, have {available}")
            }
            TranslationError::InvalidLength(len) => write!(f, "invalid payload length {len}"),
            TranslationError::UnexpectedProtocol(protocol) => {
                write!(f, "unexpected ethertype 0x{protocol:04X}")
            }
            TranslationError::UnexpectedFrameSize(size) => {
                write!(f, "unexpected frame size {size}")
            }
        }
    }
}

impl Error for TranslationError {}
