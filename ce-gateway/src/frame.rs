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

//! Wire layouts for classic CAN, CAN-FD and the Ethernet header used for encapsulation.
//!
//! The CAN layouts match the SocketCAN `struct can_frame` / `struct canfd_frame` ABI on a
//! little-endian host: a 32-bit identifier, a length byte, three control bytes and a fixed
//! size payload area.

use crate::error::TranslationError;

pub const CAN_MAX_DLEN: usize = 8;
pub const CANFD_MAX_DLEN: usize = 64;
/// Size of a serialized classic CAN frame.
pub const CAN_MTU: usize = 16;
/// Size of a serialized CAN-FD frame.
pub const CANFD_MTU: usize = 72;

pub const CAN_EFF_FLAG: u32 = 0x8000_0000;
pub const CAN_RTR_FLAG: u32 = 0x4000_0000;
pub const CAN_ERR_FLAG: u32 = 0x2000_0000;
pub const CAN_SFF_MASK: u32 = 0x0000_07FF;
pub const CAN_EFF_MASK: u32 = 0x1FFF_FFFF;

pub const ETH_ALEN: usize = 6;
pub const ETH_HLEN: usize = 14;
pub const ETH_DATA_LEN: usize = 1500;
/// EtherType tagging an encapsulated classic CAN frame.
pub const ETH_P_CAN: u16 = 0x000C;
/// EtherType tagging an encapsulated CAN-FD frame.
pub const ETH_P_CANFD: u16 = 0x000D;

pub type MacAddress = [u8; ETH_ALEN];

pub const BROADCAST_MAC: MacAddress = [0xff; ETH_ALEN];
pub const ZERO_MAC: MacAddress = [0x00; ETH_ALEN];

const ID_RANGE: std::ops::Range<usize> = 0..4;
const LEN_OFFSET: usize = 4;
const FLAGS_OFFSET: usize = 5;
const RES0_OFFSET: usize = 6;
const RES1_OFFSET: usize = 7;
// Classic CAN names the same three control bytes differently.
const PAD_OFFSET: usize = FLAGS_OFFSET;
const CAN_RES0_OFFSET: usize = RES0_OFFSET;
const LEN8_DLC_OFFSET: usize = RES1_OFFSET;
pub(crate) const DATA_OFFSET: usize = 8;

pub(crate) fn ensure_len(bytes: &[u8], needed: usize) -> Result<(), TranslationError> {
    if bytes.len() < needed {
        return Err(TranslationError::Truncated {
            needed,
            available: bytes.len(),
        });
    }
    Ok(())
}

pub(crate) fn read_can_id(bytes: &[u8]) -> Result<u32, TranslationError> {
    ensure_len(bytes, ID_RANGE.end)?;
    let mut id = [0u8; 4];
    id.copy_from_slice(&bytes[ID_RANGE]);
    Ok(u32::from_le_bytes(id))
}

/// Returns the payload length byte of a serialized CAN or CAN-FD frame after checking it
/// does not exceed `max_len`.
pub(crate) fn read_payload_len(bytes: &[u8], max_len: usize) -> Result<usize, TranslationError> {
    ensure_len(bytes, DATA_OFFSET)?;
    let len = bytes[LEN_OFFSET];
    if usize::from(len) > max_len {
        return Err(TranslationError::InvalidLength(len));
    }
    Ok(usize::from(len))
}

/// Classic CAN frame with up to eight payload bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CanFrame {
    id: u32,
    len: u8,
    pad: u8,
    res0: u8,
    len8_dlc: u8,
    data: [u8; CAN_MAX_DLEN],
}

impl CanFrame {
    pub fn new(id: u32, payload: &[u8]) -> Result<Self, TranslationError> {
        if payload.len() > CAN_MAX_DLEN {
            return Err(TranslationError::InvalidLength(
                u8::try_from(payload.len()).unwrap_or(u8::MAX),
            ));
        }
        let mut data = [0u8; CAN_MAX_DLEN];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            id,
            len: payload.len() as u8,
            pad: 0,
            res0: 0,
            len8_dlc: 0,
            data,
        })
    }

    pub fn with_reserved(mut self, pad: u8, res0: u8) -> Self {
        self.pad = pad;
        self.res0 = res0;
        self
    }

    /// Sets the raw DLC (9..=15) carried alongside an eight-byte payload.
    pub fn with_len8_dlc(mut self, len8_dlc: u8) -> Self {
        self.len8_dlc = len8_dlc;
        self
    }

    /// Raw identifier including the EFF/RTR/ERR flag bits.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn is_extended(&self) -> bool {
        self.id & CAN_EFF_FLAG != 0
    }

    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `(pad, res0)`.
    pub fn reserved(&self) -> (u8, u8) {
        (self.pad, self.res0)
    }

    pub fn len8_dlc(&self) -> u8 {
        self.len8_dlc
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    pub fn to_bytes(&self) -> [u8; CAN_MTU] {
        let mut bytes = [0u8; CAN_MTU];
        bytes[ID_RANGE].copy_from_slice(&self.id.to_le_bytes());
        bytes[LEN_OFFSET] = self.len;
        bytes[PAD_OFFSET] = self.pad;
        bytes[CAN_RES0_OFFSET] = self.res0;
        bytes[LEN8_DLC_OFFSET] = self.len8_dlc;
        bytes[DATA_OFFSET..].copy_from_slice(&self.data);
        bytes
    }

    /// Parses the first [`CAN_MTU`] bytes of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TranslationError> {
        ensure_len(bytes, CAN_MTU)?;
        let id = read_can_id(bytes)?;
        let len = read_payload_len(bytes, CAN_MAX_DLEN)?;
        Ok(Self::new(id, &bytes[DATA_OFFSET..DATA_OFFSET + len])?
            .with_reserved(bytes[PAD_OFFSET], bytes[CAN_RES0_OFFSET])
            .with_len8_dlc(bytes[LEN8_DLC_OFFSET]))
    }

    /// Copies the control bytes (pad, res0, len8_dlc) of a serialized frame.
    pub(crate) fn with_control_bytes_of(self, bytes: &[u8]) -> Result<Self, TranslationError> {
        ensure_len(bytes, DATA_OFFSET)?;
        Ok(self
            .with_reserved(bytes[PAD_OFFSET], bytes[CAN_RES0_OFFSET])
            .with_len8_dlc(bytes[LEN8_DLC_OFFSET]))
    }
}

/// CAN-FD frame with up to 64 payload bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CanFdFrame {
    id: u32,
    len: u8,
    flags: u8,
    res0: u8,
    res1: u8,
    data: [u8; CANFD_MAX_DLEN],
}

impl CanFdFrame {
    pub fn new(id: u32, flags: u8, payload: &[u8]) -> Result<Self, TranslationError> {
        if payload.len() > CANFD_MAX_DLEN {
            return Err(TranslationError::InvalidLength(
                u8::try_from(payload.len()).unwrap_or(u8::MAX),
            ));
        }
        let mut data = [0u8; CANFD_MAX_DLEN];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            id,
            len: payload.len() as u8,
            flags,
            res0: 0,
            res1: 0,
            data,
        })
    }

    pub fn with_reserved(mut self, res0: u8, res1: u8) -> Self {
        self.res0 = res0;
        self.res1 = res1;
        self
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    pub fn reserved(&self) -> (u8, u8) {
        (self.res0, self.res1)
    }

    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    pub fn to_bytes(&self) -> [u8; CANFD_MTU] {
        let mut bytes = [0u8; CANFD_MTU];
        bytes[ID_RANGE].copy_from_slice(&self.id.to_le_bytes());
        bytes[LEN_OFFSET] = self.len;
        bytes[FLAGS_OFFSET] = self.flags;
        bytes[RES0_OFFSET] = self.res0;
        bytes[RES1_OFFSET] = self.res1;
        bytes[DATA_OFFSET..].copy_from_slice(&self.data);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TranslationError> {
        ensure_len(bytes, CANFD_MTU)?;
        let id = read_can_id(bytes)?;
        let len = read_payload_len(bytes, CANFD_MAX_DLEN)?;
        Ok(Self::new(id, bytes[FLAGS_OFFSET], &bytes[DATA_OFFSET..DATA_OFFSET + len])?
            .with_reserved(bytes[RES0_OFFSET], bytes[RES1_OFFSET]))
    }
}

/// Parsed view of the 14-byte Ethernet header.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EthernetHeader {
    pub destination: MacAddress,
    pub source: MacAddress,
    pub ethertype: u16,
}

impl EthernetHeader {
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.destination);
        out.extend_from_slice(&self.source);
        out.extend_from_slice(&self.ethertype.to_be_bytes());
    }

    /// Splits `frame` into its header and the bytes following it.
    pub fn parse(frame: &[u8]) -> Result<(Self, &[u8]), TranslationError> {
        ensure_len(frame, ETH_HLEN)?;
        let mut destination = ZERO_MAC;
        let mut source = ZERO_MAC;
        destination.copy_from_slice(&frame[..ETH_ALEN]);
        source.copy_from_slice(&frame[ETH_ALEN..2 * ETH_ALEN]);
        let ethertype = u16::from_be_bytes([frame[12], frame[13]]);
        Ok((
            Self {
                destination,
                source,
                ethertype,
            },
            &frame[ETH_HLEN..],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_frame_layout_is_socketcan_compatible() {
        let frame = CanFrame::new(0x123, &[1, 2, 3]).expect("valid frame");
        let bytes = frame.to_bytes();

        assert_eq!(&bytes[0..4], &[0x23, 0x01, 0x00, 0x00]);
        assert_eq!(bytes[4], 3);
        assert_eq!(&bytes[5..8], &[0, 0, 0]);
        assert_eq!(&bytes[8..11], &[1, 2, 3]);
        assert_eq!(&bytes[11..], &[0; 5]);
        assert_eq!(CanFrame::from_bytes(&bytes), Ok(frame));
    }

    #[test]
    fn can_frame_keeps_len8_dlc_and_reserved_bytes() {
        let mut bytes = CanFrame::new(0x123, &[0x11; 8]).expect("valid frame").to_bytes();
        bytes[5] = 0x01;
        bytes[6] = 0x02;
        bytes[7] = 12;

        let parsed = CanFrame::from_bytes(&bytes).expect("parse");
        assert_eq!(parsed.len8_dlc(), 12);
        assert_eq!(parsed.reserved(), (0x01, 0x02));
        assert_eq!(parsed.to_bytes(), bytes);
    }

    #[test]
    fn can_frame_rejects_oversized_payload() {
        assert_eq!(
            CanFrame::new(0x1, &[0; 9]),
            Err(TranslationError::InvalidLength(9))
        );

        let mut bytes = CanFrame::new(0x1, &[]).expect("valid frame").to_bytes();
        bytes[4] = 12;
        assert_eq!(
            CanFrame::from_bytes(&bytes),
            Err(TranslationError::InvalidLength(12))
        );
    }

    #[test]
    fn canfd_frame_keeps_flags_and_reserved_bytes() {
        let frame = CanFdFrame::new(0x1234_5678 | CAN_EFF_FLAG, 0x01, &[0xAA; 48])
            .expect("valid frame")
            .with_reserved(7, 9);
        let bytes = frame.to_bytes();

        assert_eq!(bytes.len(), CANFD_MTU);
        assert_eq!(bytes[5], 0x01);
        assert_eq!((bytes[6], bytes[7]), (7, 9));

        let parsed = CanFdFrame::from_bytes(&bytes).expect("parse");
        assert_eq!(parsed, frame);
        assert_eq!(parsed.reserved(), (7, 9));
    }

    #[test]
    fn truncated_frame_reports_needed_bytes() {
        assert_eq!(
            CanFrame::from_bytes(&[0; 10]),
            Err(TranslationError::Truncated {
                needed: CAN_MTU,
                available: 10
            })
        );
    }

    #[test]
    fn ethernet_header_parses_big_endian_ethertype() {
        let mut frame = Vec::new();
        EthernetHeader {
            destination: BROADCAST_MAC,
            source: ZERO_MAC,
            ethertype: ETH_P_CANFD,
        }
        .write_to(&mut frame);
        frame.push(0x42);

        let (header, rest) = EthernetHeader::parse(&frame).expect("parse");
        assert_eq!(&frame[12..14], &[0x00, 0x0D]);
        assert_eq!(header.destination, BROADCAST_MAC);
        assert_eq!(header.ethertype, ETH_P_CANFD);
        assert_eq!(rest, &[0x42]);
    }
}
