//! 802.11 frame templates and synthesis helpers
//!
//! This module holds the immutable byte templates for the two management
//! frames the crate emits (beacon advertisement and deauthentication) and
//! the pure builders that copy a template into a fresh wire buffer and
//! patch the per-emission fields in place.

use std::fmt;
use std::str::FromStr;

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

use crate::error::{ApparitionError, Result};

/// MAC address (6 bytes)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Broadcast address (FF:FF:FF:FF:FF:FF)
    pub const BROADCAST: MacAddress = MacAddress([0xFF; 6]);

    /// Zero/null address
    pub const ZERO: MacAddress = MacAddress([0x00; 6]);

    /// Create from bytes
    pub fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Create from slice (must be 6 bytes)
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        if slice.len() != 6 {
            return Err(ApparitionError::InvalidMac(format!(
                "Expected 6 bytes, got {}",
                slice.len()
            )));
        }
        let mut bytes = [0u8; 6];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Get as byte slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Check if this is a broadcast address
    pub fn is_broadcast(&self) -> bool {
        self.0 == [0xFF; 6]
    }
}

impl fmt::Debug for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddress({})", self)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl FromStr for MacAddress {
    type Err = ApparitionError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(ApparitionError::InvalidMac(format!(
                "Expected 6 octets separated by ':', got '{}'",
                s
            )));
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            bytes[i] = u8::from_str_radix(part, 16).map_err(|_| {
                ApparitionError::InvalidMac(format!("Invalid hex octet: '{}'", part))
            })?;
        }

        Ok(Self(bytes))
    }
}

/// Offset of the receiver address in a management frame header
pub const RECEIVER_OFFSET: usize = 4;

/// Offset of the sender address in a management frame header
pub const SENDER_OFFSET: usize = 10;

/// Offset of the BSSID in a management frame header
pub const BSSID_OFFSET: usize = 16;

/// Offset of the 16-bit sequence-control field
pub const SEQ_CTRL_OFFSET: usize = 22;

/// Offset of the first SSID byte in the beacon template.
/// The one-byte SSID length sits immediately before it.
pub const BEACON_SSID_OFFSET: usize = 38;

/// Maximum SSID length allowed by the one-byte length field
pub const SSID_MAX_LEN: usize = 32;

/// Largest value of the 12-bit sequence number
pub const SEQ_MAX: u16 = 0x0FFF;

/// Beacon advertisement template (57 bytes before SSID insertion).
///
/// Per emission the last sender/BSSID octet, the sequence-control field,
/// and the SSID element length/body are patched on a copy; everything else
/// goes out verbatim.
pub const BEACON_TEMPLATE: [u8; 57] = [
    0x80, 0x00, // frame control: management / beacon
    0x00, 0x00, // duration
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, // receiver: broadcast
    0xba, 0xde, 0xaf, 0xfe, 0x00, 0x06, // sender, last octet patched per slot
    0xba, 0xde, 0xaf, 0xfe, 0x00, 0x06, // BSSID, last octet patched per slot
    0x00, 0x00, // sequence control, patched per emission
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, // timestamp
    0x64, 0x00, // beacon interval: 100 TU
    0x31, 0x04, // capability info
    0x00, 0x00, // SSID element header, length patched
    0x01, 0x08, 0x82, 0x84, 0x8b, 0x96, 0x0c, 0x12, 0x18, 0x24, // supported rates
    0x03, 0x01, 0x01, // DS parameter set: channel 1
    0x05, 0x04, 0x01, 0x02, 0x00, 0x00, // TIM
];

/// Deauthentication template (26 bytes, fixed length).
///
/// Sequence control and reason code are pre-baked; only the sender and
/// BSSID fields are overwritten per emission.
pub const DEAUTH_TEMPLATE: [u8; 26] = [
    0xc0, 0x00, // frame control: management / deauthentication
    0x3a, 0x01, // duration
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, // destination: broadcast
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // sender, overwritten with spoofed address
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // BSSID, overwritten with spoofed address
    0xf0, 0xff, // sequence control
    0x02, 0x00, // reason: previous authentication no longer valid
];

/// Write a 12-bit sequence number into a sequence-control field.
///
/// Bits 4-15 of the little-endian field carry the sequence number; bits
/// 0-3 are the fragment number and stay zero.
fn write_sequence_control(field: &mut [u8], sequence: u16) {
    LittleEndian::write_u16(&mut field[..2], (sequence << 4) & 0xFFF0);
}

/// Build one beacon advertisement for a virtual AP slot.
///
/// Copies the template around the SSID element, writes the SSID length and
/// bytes, overwrites the last sender/BSSID octet with `slot_octet`, and
/// packs `sequence` into the sequence-control field. The result is exactly
/// `BEACON_TEMPLATE.len() + ssid.len()` bytes.
///
/// The SSID must fit the one-byte length field; callers validate that at
/// configuration time.
pub fn build_beacon(ssid: &str, slot_octet: u8, sequence: u16) -> Vec<u8> {
    debug_assert!(ssid.len() <= SSID_MAX_LEN);

    let mut frame = Vec::with_capacity(BEACON_TEMPLATE.len() + ssid.len());
    frame.extend_from_slice(&BEACON_TEMPLATE[..BEACON_SSID_OFFSET - 1]);
    frame.push(ssid.len() as u8);
    frame.extend_from_slice(ssid.as_bytes());
    frame.extend_from_slice(&BEACON_TEMPLATE[BEACON_SSID_OFFSET..]);

    frame[SENDER_OFFSET + 5] = slot_octet;
    frame[BSSID_OFFSET + 5] = slot_octet;
    write_sequence_control(&mut frame[SEQ_CTRL_OFFSET..], sequence);

    frame
}

/// Build one deauthentication frame for the spoofed address.
///
/// The same address lands in both the sender and BSSID fields while the
/// destination stays broadcast; the template's sequence control and reason
/// code go out unchanged.
pub fn build_deauth(spoof: MacAddress) -> [u8; 26] {
    let mut frame = DEAUTH_TEMPLATE;
    frame[SENDER_OFFSET..SENDER_OFFSET + 6].copy_from_slice(spoof.as_bytes());
    frame[BSSID_OFFSET..BSSID_OFFSET + 6].copy_from_slice(spoof.as_bytes());
    frame
}
