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

//! Stateless conversion between CAN/CAN-FD frames and Ethernet-encapsulated frames.
//!
//! Encapsulation prepends a 14-byte Ethernet header to the serialized CAN frame without
//! touching its bytes. The inverse strips the header and rebuilds a frame with the caller's
//! identifier.
//!
//! ```
//! use ce_gateway::frame::{CanFrame, BROADCAST_MAC, ETH_HLEN, ETH_P_CAN, ZERO_MAC};
//! use ce_gateway::translator;
//!
//! let frame = CanFrame::new(0x123, &[1, 2, 3, 4]).unwrap();
//! let ethernet =
//!     translator::can_to_ethernet(&ZERO_MAC, &BROADCAST_MAC, ETH_P_CAN, &frame.to_bytes())
//!         .unwrap();
//! assert_eq!(ethernet.len(), ETH_HLEN + 16);
//!
//! let back = translator::ethernet_to_can(0x123, &ethernet).unwrap();
//! assert_eq!(back.payload(), &[1, 2, 3, 4]);
//! ```

use crate::error::TranslationError;
use crate::frame::{
    ensure_len, read_can_id, read_payload_len, CanFdFrame, CanFrame, EthernetHeader, MacAddress,
    CANFD_MAX_DLEN, CANFD_MTU, CAN_MAX_DLEN, CAN_MTU, DATA_OFFSET, ETH_HLEN, ETH_P_CAN,
    ETH_P_CANFD,
};

fn encapsulate(
    source_mac: &MacAddress,
    dest_mac: &MacAddress,
    protocol: u16,
    frame: &[u8],
    frame_size: usize,
    max_len: usize,
) -> Result<Vec<u8>, TranslationError> {
    ensure_len(frame, frame_size)?;
    read_payload_len(frame, max_len)?;

    let mut out = Vec::with_capacity(ETH_HLEN + frame_size);
    EthernetHeader {
        destination: *dest_mac,
        source: *source_mac,
        ethertype: protocol,
    }
    .write_to(&mut out);
    out.extend_from_slice(&frame[..frame_size]);
    Ok(out)
}

/// Wraps a serialized classic CAN frame in an Ethernet header.
///
/// `can_frame` must hold at least [`CAN_MTU`] bytes; exactly that many are copied.
pub fn can_to_ethernet(
    source_mac: &MacAddress,
    dest_mac: &MacAddress,
    protocol: u16,
    can_frame: &[u8],
) -> Result<Vec<u8>, TranslationError> {
    encapsulate(
        source_mac,
        dest_mac,
        protocol,
        can_frame,
        CAN_MTU,
        CAN_MAX_DLEN,
    )
}

/// Wraps a serialized CAN-FD frame in an Ethernet header.
pub fn canfd_to_ethernet(
    source_mac: &MacAddress,
    dest_mac: &MacAddress,
    protocol: u16,
    canfd_frame: &[u8],
) -> Result<Vec<u8>, TranslationError> {
    encapsulate(
        source_mac,
        dest_mac,
        protocol,
        canfd_frame,
        CANFD_MTU,
        CANFD_MAX_DLEN,
    )
}

/// Payload carried after the Ethernet header.
///
/// A complete embedded frame of the expected layout yields its own payload bytes; any
/// other body is taken as raw payload, clamped to `max_len`.
fn embedded_payload<'a>(
    ethertype: u16,
    body: &'a [u8],
    protocol: u16,
    frame_size: usize,
    max_len: usize,
) -> Result<&'a [u8], TranslationError> {
    if ethertype == protocol && body.len() >= frame_size {
        let len = read_payload_len(body, max_len)?;
        return Ok(&body[DATA_OFFSET..DATA_OFFSET + len]);
    }
    Ok(&body[..body.len().min(max_len)])
}

/// Rebuilds a classic CAN frame from an Ethernet-encapsulated one, using `id` as identifier.
pub fn ethernet_to_can(id: u32, ethernet_frame: &[u8]) -> Result<CanFrame, TranslationError> {
    let (header, body) = EthernetHeader::parse(ethernet_frame)?;
    let payload = embedded_payload(header.ethertype, body, ETH_P_CAN, CAN_MTU, CAN_MAX_DLEN)?;
    CanFrame::new(id, payload)
}

/// Rebuilds a CAN-FD frame from an Ethernet-encapsulated one.
pub fn ethernet_to_canfd(
    id: u32,
    flags: u8,
    res0: u8,
    res1: u8,
    ethernet_frame: &[u8],
) -> Result<CanFdFrame, TranslationError> {
    let (header, body) = EthernetHeader::parse(ethernet_frame)?;
    let payload = embedded_payload(
        header.ethertype,
        body,
        ETH_P_CANFD,
        CANFD_MTU,
        CANFD_MAX_DLEN,
    )?;
    Ok(CanFdFrame::new(id, flags, payload)?.with_reserved(res0, res1))
}

fn expect_protocol(ethernet_frame: &[u8], protocol: u16) -> Result<&[u8], TranslationError> {
    let (header, body) = EthernetHeader::parse(ethernet_frame)?;
    if header.ethertype != protocol {
        return Err(TranslationError::UnexpectedProtocol(header.ethertype));
    }
    Ok(body)
}

/// Recovers the exact classic CAN frame carried by an `ETH_P_CAN` frame.
pub fn decapsulate_can(ethernet_frame: &[u8]) -> Result<CanFrame, TranslationError> {
    let body = expect_protocol(ethernet_frame, ETH_P_CAN)?;
    ensure_len(body, CAN_MTU)?;
    ethernet_to_can(read_can_id(body)?, ethernet_frame)?.with_control_bytes_of(body)
}

/// Recovers the exact CAN-FD frame carried by an `ETH_P_CANFD` frame.
pub fn decapsulate_canfd(ethernet_frame: &[u8]) -> Result<CanFdFrame, TranslationError> {
    let body = expect_protocol(ethernet_frame, ETH_P_CANFD)?;
    ensure_len(body, CANFD_MTU)?;
    ethernet_to_canfd(read_can_id(body)?, body[5], body[6], body[7], ethernet_frame)
}
