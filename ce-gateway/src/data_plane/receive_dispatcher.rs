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

//! Frame entry points for both directions of a routing job.
//!
//! Both functions run synchronously in the transport's receive context. A frame is either
//! translated and forwarded (`handled`) or dropped and counted (`dropped`); nothing waits.
//! Frames reaching a job that has already been removed are ignored and not counted.

use crate::error::{TranslationError, TransportError};
use crate::frame::{BROADCAST_MAC, CANFD_MTU, CAN_MTU, ETH_P_CAN, ETH_P_CANFD, ZERO_MAC};
use crate::job::{JobKind, RoutingJob};
use crate::observability::{events, fields};
use crate::transport::NetStack;
use crate::translator;
use std::fmt::{Display, Formatter};
use tracing::{debug, Level};

const COMPONENT: &str = "receive_dispatcher";

/// Outcome of dispatching one frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Disposition {
    Handled,
    Dropped,
    Retired,
}

enum DropReason {
    Unimplemented,
    Translation(TranslationError),
    Forward(TransportError),
    NoCanTransport,
}

impl DropReason {
    fn reason(&self) -> &'static str {
        match self {
            DropReason::Unimplemented => fields::REASON_TRANSLATION_UNIMPLEMENTED,
            DropReason::Translation(_) => fields::REASON_TRANSLATION_FAILED,
            DropReason::Forward(_) => fields::REASON_FORWARD_FAILED,
            DropReason::NoCanTransport => fields::REASON_NO_CAN_TRANSPORT,
        }
    }
}

impl Display for DropReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::Unimplemented => write!(f, "translation kind not implemented"),
            DropReason::Translation(err) => write!(f, "{err}"),
            DropReason::Forward(err) => write!(f, "{err}"),
            DropReason::NoCanTransport => write!(f, "destination has no CAN transport"),
        }
    }
}

fn settle(job: &RoutingJob, frame: &[u8], outcome: Result<(), DropReason>) -> Disposition {
    match outcome {
        Ok(()) => {
            job.record_handled();
            if tracing::enabled!(Level::TRACE) {
                tracing::trace!(
                    event = events::FRAME_HANDLED,
                    component = COMPONENT,
                    job_id = job.id,
                    can_id = %fields::format_frame_can_id(frame),
                    frame_len = frame.len(),
                    "frame forwarded"
                );
            }
            Disposition::Handled
        }
        Err(drop_reason) => {
            job.record_dropped();
            if tracing::enabled!(Level::DEBUG) {
                let event = match drop_reason {
                    DropReason::Unimplemented => events::FRAME_TRANSLATION_UNIMPLEMENTED,
                    _ => events::FRAME_DROPPED,
                };
                debug!(
                    event,
                    component = COMPONENT,
                    job_id = job.id,
                    kind = %job.kind,
                    frame_len = frame.len(),
                    reason = drop_reason.reason(),
                    err = %drop_reason,
                    "frame dropped"
                );
            }
            Disposition::Dropped
        }
    }
}

/// Handles a serialized CAN or CAN-FD frame received on the job's CAN interface.
pub(crate) fn on_can_frame(job: &RoutingJob, frame: &[u8], net_stack: &dyn NetStack) -> Disposition {
    if !job.is_live() {
        return Disposition::Retired;
    }
    let outcome = match job.kind {
        JobKind::NetworkLayer => encapsulate(job, frame).and_then(|ethernet| {
            net_stack
                .deliver(job.ethernet_endpoint().name(), ethernet)
                .map_err(DropReason::Forward)
        }),
        JobKind::None | JobKind::EthernetHeader | JobKind::Tcp | JobKind::Udp => {
            Err(DropReason::Unimplemented)
        }
    };
    settle(job, frame, outcome)
}

fn encapsulate(job: &RoutingJob, frame: &[u8]) -> Result<Vec<u8>, DropReason> {
    let translated = if job.flags.is_can_fd() && frame.len() == CANFD_MTU {
        translator::canfd_to_ethernet(&ZERO_MAC, &BROADCAST_MAC, ETH_P_CANFD, frame)
    } else if frame.len() == CAN_MTU {
        translator::can_to_ethernet(&ZERO_MAC, &BROADCAST_MAC, ETH_P_CAN, frame)
    } else {
        Err(TranslationError::UnexpectedFrameSize(frame.len()))
    };
    translated.map_err(DropReason::Translation)
}

/// Handles an Ethernet frame the host asked the job's virtual interface to transmit.
pub(crate) fn on_ethernet_frame(job: &RoutingJob, frame: &[u8]) -> Disposition {
    if !job.is_live() {
        return Disposition::Retired;
    }
    let outcome = match job.kind {
        JobKind::NetworkLayer => decapsulate(job, frame).and_then(|can_frame| {
            let transport = job
                .can_endpoint()
                .can_transport()
                .ok_or(DropReason::NoCanTransport)?;
            transport
                .send(&can_frame, true)
                .map_err(DropReason::Forward)
        }),
        JobKind::None | JobKind::EthernetHeader | JobKind::Tcp | JobKind::Udp => {
            Err(DropReason::Unimplemented)
        }
    };
    settle(job, frame, outcome)
}

fn decapsulate(job: &RoutingJob, frame: &[u8]) -> Result<Vec<u8>, DropReason> {
    let bytes = if job.flags.is_can_fd() {
        translator::decapsulate_canfd(frame).map(|fd| fd.to_bytes().to_vec())
    } else {
        translator::decapsulate_can(frame).map(|can| can.to_bytes().to_vec())
    };
    bytes.map_err(DropReason::Translation)
}
