/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
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

//! Canonical structured field keys and value-format helpers.

use crate::frame::{MacAddress, CAN_EFF_FLAG, CAN_EFF_MASK, CAN_SFF_MASK};

pub const EVENT: &str = "event";
pub const COMPONENT: &str = "component";
pub const GATEWAY: &str = "gateway";

pub const JOB_ID: &str = "job_id";
pub const SRC: &str = "src";
pub const DST: &str = "dst";
pub const KIND: &str = "kind";
pub const FLAGS: &str = "flags";
pub const CAN_ID: &str = "can_id";
pub const FRAME_LEN: &str = "frame_len";

pub const REASON: &str = "reason";
pub const ERR: &str = "err";

pub const NONE: &str = "none";
pub const REASON_TRANSLATION_FAILED: &str = "translation_failed";
pub const REASON_FORWARD_FAILED: &str = "forward_failed";
pub const REASON_TRANSLATION_UNIMPLEMENTED: &str = "translation_unimplemented";
pub const REASON_NO_CAN_TRANSPORT: &str = "no_can_transport";
pub const REASON_JOB_NOT_FOUND: &str = "job_not_found";

/// Formats a raw CAN identifier: three hex digits for standard ids, eight for extended.
pub fn format_can_id(can_id: u32) -> String {
    if can_id & CAN_EFF_FLAG != 0 {
        format!("0x{:08X}", can_id & CAN_EFF_MASK)
    } else {
        format!("0x{:03X}", can_id & CAN_SFF_MASK)
    }
}

/// Identifier of a serialized CAN frame, or [`NONE`] when too short to carry one.
pub fn format_frame_can_id(frame: &[u8]) -> String {
    match frame.get(0..4) {
        Some(id) => format_can_id(u32::from_le_bytes([id[0], id[1], id[2], id[3]])),
        None => NONE.to_string(),
    }
}

pub fn format_mac(mac: &MacAddress) -> String {
    mac.iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::{format_can_id, format_frame_can_id, format_mac, NONE};
    use crate::frame::{BROADCAST_MAC, CAN_EFF_FLAG};

    #[test]
    fn format_can_id_distinguishes_standard_and_extended() {
        assert_eq!(format_can_id(0x123), "0x123");
        assert_eq!(format_can_id(0x1234ABCD | CAN_EFF_FLAG), "0x1234ABCD");
    }

    #[test]
    fn format_frame_can_id_returns_none_for_short_frames() {
        assert_eq!(format_frame_can_id(&[0x23, 0x01, 0, 0, 8]), "0x123");
        assert_eq!(format_frame_can_id(&[0x23]), NONE);
    }

    #[test]
    fn format_mac_is_lowercase_colon_separated() {
        assert_eq!(format_mac(&BROADCAST_MAC), "ff:ff:ff:ff:ff:ff");
        assert_eq!(format_mac(&[0, 1, 2, 0xab, 0xcd, 0xef]), "00:01:02:ab:cd:ef");
    }
}
