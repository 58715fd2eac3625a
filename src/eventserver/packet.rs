//! EventServer packet encoding.
//!
//! Every packet is header plus payload in network byte order:
//!
//! ```text
//! 0      4     5     6      8         12       16         18    22        32
//! "XBMC" major minor type   sequence  maxseq   payload sz uid   reserved  payload…
//! ```
//!
//! All payloads this client produces fit a single UDP datagram, so sequence
//! and maxseq are always 1.

use crate::mapping::ButtonEvent;

/// Protocol signature at the start of every packet.
pub const SIGNATURE: &[u8; 4] = b"XBMC";
pub const VERSION_MAJOR: u8 = 2;
pub const VERSION_MINOR: u8 = 0;

/// Fixed header length.
pub const HEADER_SIZE: usize = 32;
/// Largest payload a single datagram may carry.
pub const MAX_PAYLOAD_SIZE: usize = 1024 - HEADER_SIZE;

/// Packet types used by this client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacketType {
    Helo = 0x01,
    Bye = 0x02,
    Button = 0x03,
    Ping = 0x05,
}

/// HELO icon type for "no icon attached".
pub const ICON_NONE: u8 = 0x00;

// BUTTON flag bits
pub const BT_USE_NAME: u16 = 0x01;
pub const BT_DOWN: u16 = 0x02;
pub const BT_UP: u16 = 0x04;
pub const BT_USE_AMOUNT: u16 = 0x08;
pub const BT_NO_REPEAT: u16 = 0x20;
pub const BT_AXIS_SINGLE: u16 = 0x100;

/// Builds one complete datagram for the given type and payload.
pub fn encode(packet_type: PacketType, payload: &[u8], uid: u32) -> Vec<u8> {
    debug_assert!(payload.len() <= MAX_PAYLOAD_SIZE);

    let mut packet = Vec::with_capacity(HEADER_SIZE + payload.len());
    packet.extend_from_slice(SIGNATURE);
    packet.push(VERSION_MAJOR);
    packet.push(VERSION_MINOR);
    packet.extend_from_slice(&(packet_type as u16).to_be_bytes());
    packet.extend_from_slice(&1u32.to_be_bytes()); // sequence
    packet.extend_from_slice(&1u32.to_be_bytes()); // maxseq
    packet.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    packet.extend_from_slice(&uid.to_be_bytes());
    packet.extend_from_slice(&[0u8; 10]); // reserved
    packet.extend_from_slice(payload);
    packet
}

/// HELO payload: device name, no icon, reserved fields zeroed.
pub fn helo_payload(device_name: &str) -> Vec<u8> {
    let mut payload = Vec::new();
    push_string(&mut payload, device_name);
    payload.push(ICON_NONE);
    payload.extend_from_slice(&0u16.to_be_bytes()); // functional port, unused
    payload.extend_from_slice(&0u32.to_be_bytes()); // reserved
    payload.extend_from_slice(&0u32.to_be_bytes()); // reserved
    payload
}

/// BUTTON payload: code, flags, amount, then the map and button names.
///
/// Buttons are always addressed by name (`BT_USE_NAME`, code 0), and repeat
/// is always off: press/release pairs are generated explicitly upstream, so
/// the receiver must not synthesize its own repeats.
pub fn button_payload(event: &ButtonEvent) -> Vec<u8> {
    let mut flags = BT_USE_NAME | BT_NO_REPEAT;
    flags |= if event.down { BT_DOWN } else { BT_UP };
    if event.amount.is_some() {
        flags |= BT_USE_AMOUNT;
    }
    if event.axis {
        flags |= BT_AXIS_SINGLE;
    }

    let mut payload = Vec::new();
    payload.extend_from_slice(&0u16.to_be_bytes()); // code, unused with names
    payload.extend_from_slice(&flags.to_be_bytes());
    payload.extend_from_slice(&event.amount.unwrap_or(0).to_be_bytes());
    push_string(&mut payload, event.map);
    push_string(&mut payload, event.button);
    payload
}

fn push_string(payload: &mut Vec<u8>, s: &str) {
    payload.extend_from_slice(s.as_bytes());
    payload.push(0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::BUTTON_MAP;

    fn event(button: &'static str, amount: Option<u16>, down: bool, axis: bool) -> ButtonEvent {
        ButtonEvent {
            map: BUTTON_MAP,
            button,
            down,
            amount,
            axis,
        }
    }

    #[test]
    fn header_layout() {
        let packet = encode(PacketType::Ping, &[], 0xAABBCCDD);
        assert_eq!(packet.len(), HEADER_SIZE);
        assert_eq!(&packet[0..4], b"XBMC");
        assert_eq!(packet[4], VERSION_MAJOR);
        assert_eq!(packet[5], VERSION_MINOR);
        assert_eq!(&packet[6..8], &[0x00, 0x05]);
        assert_eq!(&packet[8..12], &[0, 0, 0, 1]); // sequence
        assert_eq!(&packet[12..16], &[0, 0, 0, 1]); // maxseq
        assert_eq!(&packet[16..18], &[0, 0]); // payload size
        assert_eq!(&packet[18..22], &[0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(&packet[22..32], &[0u8; 10]);
    }

    #[test]
    fn payload_size_is_encoded() {
        let payload = helo_payload("pad");
        let packet = encode(PacketType::Helo, &payload, 1);
        assert_eq!(packet.len(), HEADER_SIZE + payload.len());
        assert_eq!(&packet[16..18], &(payload.len() as u16).to_be_bytes());
    }

    #[test]
    fn bye_and_ping_have_empty_payloads() {
        assert_eq!(encode(PacketType::Bye, &[], 1).len(), HEADER_SIZE);
        assert_eq!(&encode(PacketType::Bye, &[], 1)[6..8], &[0x00, 0x02]);
    }

    #[test]
    fn helo_carries_the_name_and_no_icon() {
        let payload = helo_payload("kodipad");
        assert_eq!(&payload[0..7], b"kodipad");
        assert_eq!(payload[7], 0); // terminator
        assert_eq!(payload[8], ICON_NONE);
        assert_eq!(payload.len(), 7 + 1 + 1 + 2 + 4 + 4);
    }

    #[test]
    fn button_payload_field_order() {
        let payload = button_payload(&event("A", None, true, false));
        assert_eq!(&payload[0..2], &[0, 0]); // code unused
        let flags = u16::from_be_bytes([payload[2], payload[3]]);
        assert_eq!(flags, BT_USE_NAME | BT_NO_REPEAT | BT_DOWN);
        assert_eq!(&payload[4..6], &[0, 0]); // no amount -> 0
        assert_eq!(&payload[6..], b"XG\0A\0");
    }

    #[test]
    fn axis_release_sets_up_amount_and_axis_flags() {
        let payload = button_payload(&event("rightthumbstickleft", Some(0), false, true));
        let flags = u16::from_be_bytes([payload[2], payload[3]]);
        assert_eq!(
            flags,
            BT_USE_NAME | BT_NO_REPEAT | BT_UP | BT_USE_AMOUNT | BT_AXIS_SINGLE
        );
    }

    #[test]
    fn amount_is_big_endian() {
        let payload = button_payload(&event("rightanalogtrigger", Some(25600), true, false));
        assert_eq!(&payload[4..6], &25600u16.to_be_bytes());
    }
}
