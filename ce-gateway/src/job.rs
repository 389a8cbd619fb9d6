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

//! Routing-job data model.

use crate::endpoint::Endpoint;
use crate::error::GatewayError;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// Identifier of a live routing job. `0` is reserved as the "all jobs" wildcard.
pub type JobId = u32;

pub const ALL_JOBS: JobId = 0;

/// Translation scheme applied to every frame on a route.
///
/// Only [`JobKind::NetworkLayer`] translates frames; jobs of the other kinds are admitted
/// but drop everything they receive.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum JobKind {
    None = 0,
    EthernetHeader = 1,
    NetworkLayer = 2,
    Tcp = 3,
    Udp = 4,
}

impl TryFrom<u8> for JobKind {
    type Error = GatewayError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(JobKind::None),
            1 => Ok(JobKind::EthernetHeader),
            2 => Ok(JobKind::NetworkLayer),
            3 => Ok(JobKind::Tcp),
            4 => Ok(JobKind::Udp),
            other => Err(GatewayError::InvalidKind(other)),
        }
    }
}

impl From<JobKind> for u8 {
    fn from(kind: JobKind) -> Self {
        kind as u8
    }
}

impl Serialize for JobKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*self))
    }
}

impl Display for JobKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JobKind::None => "none",
            JobKind::EthernetHeader => "eth",
            JobKind::NetworkLayer => "net",
            JobKind::Tcp => "tcp",
            JobKind::Udp => "udp",
        };
        f.write_str(name)
    }
}

/// Job flag bit-set.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct JobFlags(u32);

impl JobFlags {
    pub const NONE: JobFlags = JobFlags(0);
    pub const CAN_FD: JobFlags = JobFlags(0x1);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_can_fd(self) -> bool {
        self.0 & Self::CAN_FD.0 == Self::CAN_FD.0
    }
}

/// Identifier/mask pair selecting which CAN frames a job subscribes to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct CanFilter {
    pub id: u32,
    pub mask: u32,
}

impl CanFilter {
    /// Matches every identifier.
    pub const MATCH_ALL: CanFilter = CanFilter { id: 0, mask: 0 };

    pub const fn new(id: u32, mask: u32) -> Self {
        Self { id, mask }
    }

    pub fn matches(&self, can_id: u32) -> bool {
        can_id & self.mask == self.id & self.mask
    }
}

impl Default for CanFilter {
    fn default() -> Self {
        Self::MATCH_ALL
    }
}

/// Which side of the job listens for frames.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Direction {
    /// CAN interface source, gateway interface destination.
    CanToEthernet,
    /// Gateway interface source, CAN interface destination.
    EthernetToCan,
}

/// One active translation route.
///
/// Only the counters change after construction.
pub(crate) struct RoutingJob {
    pub(crate) id: JobId,
    pub(crate) kind: JobKind,
    pub(crate) flags: JobFlags,
    pub(crate) direction: Direction,
    pub(crate) filter: CanFilter,
    pub(crate) src: Arc<Endpoint>,
    pub(crate) dst: Arc<Endpoint>,
    handled: AtomicU32,
    dropped: AtomicU32,
    live: AtomicBool,
}

impl RoutingJob {
    pub(crate) fn new(
        id: JobId,
        kind: JobKind,
        flags: JobFlags,
        direction: Direction,
        filter: CanFilter,
        src: Arc<Endpoint>,
        dst: Arc<Endpoint>,
    ) -> Self {
        Self {
            id,
            kind,
            flags,
            direction,
            filter,
            src,
            dst,
            handled: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
            live: AtomicBool::new(true),
        }
    }

    /// Stops the job from forwarding; frames still in flight see it as gone.
    pub(crate) fn retire(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub(crate) fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    pub(crate) fn can_endpoint(&self) -> &Arc<Endpoint> {
        match self.direction {
            Direction::CanToEthernet => &self.src,
            Direction::EthernetToCan => &self.dst,
        }
    }

    pub(crate) fn ethernet_endpoint(&self) -> &Arc<Endpoint> {
        match self.direction {
            Direction::CanToEthernet => &self.dst,
            Direction::EthernetToCan => &self.src,
        }
    }

    pub(crate) fn record_handled(&self) {
        self.handled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn handled(&self) -> u32 {
        self.handled.load(Ordering::Relaxed)
    }

    pub(crate) fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub(crate) fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            src: self.src.name().to_string(),
            dst: self.dst.name().to_string(),
            id: self.id,
            flags: self.flags,
            kind: self.kind,
            handled: self.handled(),
            dropped: self.dropped(),
        }
    }
}

/// Immutable view of a job taken at listing time.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct JobSnapshot {
    pub src: String,
    pub dst: String,
    pub id: JobId,
    pub flags: JobFlags,
    pub kind: JobKind,
    pub handled: u32,
    pub dropped: u32,
}

#[cfg(test)]
mod tests {
    use super::{CanFilter, JobFlags, JobKind};
    use crate::error::GatewayError;

    #[test]
    fn kind_round_trips_through_wire_value() {
        for value in 0u8..=4 {
            let kind = JobKind::try_from(value).expect("known kind");
            assert_eq!(u8::from(kind), value);
        }
        assert!(matches!(
            JobKind::try_from(5),
            Err(GatewayError::InvalidKind(5))
        ));
    }

    #[test]
    fn default_filter_matches_every_identifier() {
        let filter = CanFilter::default();
        assert!(filter.matches(0x000));
        assert!(filter.matches(0x7FF));
        assert!(filter.matches(0x9FFF_FFFF));
    }

    #[test]
    fn filter_compares_masked_bits_only() {
        let filter = CanFilter::new(0x120, 0x7F0);
        assert!(filter.matches(0x123));
        assert!(filter.matches(0x12F));
        assert!(!filter.matches(0x133));
    }

    #[test]
    fn can_fd_flag_is_detected_among_other_bits() {
        assert!(JobFlags::from_bits(0x1).is_can_fd());
        assert!(JobFlags::from_bits(0x8001).is_can_fd());
        assert!(!JobFlags::from_bits(0x2).is_can_fd());
    }
}
