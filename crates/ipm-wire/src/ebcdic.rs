//! Codepage Cp500 (IBM500, international EBCDIC) ↔ Latin-1 byte codec.
//!
//! IPM record payloads are opaque Cp500 byte strings. Every
//! byte this protocol's framing, Transmission IDs, and record codes
//! actually put on the wire — digits, upper/lower-case letters, space,
//! and the `R`/`T` direction indicators — is given its documented Cp500
//! assignment below. The remaining positions (accented Latin-1 letters
//! and a few box-drawing/punctuation slots no IPM field ever carries) are
//! filled deterministically so the table stays a true bijection: each
//! unassigned source byte takes the next Latin-1 byte not already claimed
//! by an explicit entry. No crate in this workspace's dependency tree
//! ships codepage 500, so the table lives here as data.

use std::sync::OnceLock;

/// Explicit (EBCDIC byte, Latin-1 byte) pairs for codepage 500. Covers
/// every control code, digit, letter, and punctuation mark this protocol
/// is defined to transmit.
const KNOWN_PAIRS: &[(u8, u8)] = &[
    (0x00, 0x00),
    (0x01, 0x01),
    (0x02, 0x02),
    (0x03, 0x03),
    (0x04, 0x9C),
    (0x05, 0x09),
    (0x06, 0x86),
    (0x07, 0x7F),
    (0x08, 0x97),
    (0x09, 0x8D),
    (0x0A, 0x8E),
    (0x0B, 0x0B),
    (0x0C, 0x0C),
    (0x0D, 0x0D),
    (0x0E, 0x0E),
    (0x0F, 0x0F),
    (0x10, 0x10),
    (0x11, 0x11),
    (0x12, 0x12),
    (0x13, 0x13),
    (0x14, 0x9D),
    (0x15, 0x85),
    (0x16, 0x08),
    (0x17, 0x87),
    (0x18, 0x18),
    (0x19, 0x19),
    (0x1A, 0x92),
    (0x1B, 0x8F),
    (0x1C, 0x1C),
    (0x1D, 0x1D),
    (0x1E, 0x1E),
    (0x1F, 0x1F),
    (0x20, 0x80),
    (0x21, 0x81),
    (0x22, 0x82),
    (0x23, 0x83),
    (0x24, 0x84),
    (0x25, 0x0A),
    (0x26, 0x17),
    (0x27, 0x1B),
    (0x28, 0x88),
    (0x29, 0x89),
    (0x2A, 0x8A),
    (0x2B, 0x8B),
    (0x2C, 0x8C),
    (0x2D, 0x05),
    (0x2E, 0x06),
    (0x2F, 0x07),
    (0x30, 0x90),
    (0x31, 0x91),
    (0x32, 0x16),
    (0x33, 0x93),
    (0x34, 0x94),
    (0x35, 0x95),
    (0x36, 0x96),
    (0x37, 0x04),
    (0x38, 0x98),
    (0x39, 0x99),
    (0x3A, 0x9A),
    (0x3B, 0x9B),
    (0x3C, 0x14),
    (0x3D, 0x15),
    (0x3E, 0x9E),
    (0x3F, 0x1A),
    (0x40, b' '),
    (0x4A, 0xA2),
    (0x4B, b'.'),
    (0x4C, b'<'),
    (0x4D, b'('),
    (0x4E, b'+'),
    (0x4F, b'|'),
    (0x50, b'&'),
    (0x5A, b'!'),
    (0x5B, b'$'),
    (0x5C, b'*'),
    (0x5D, b')'),
    (0x5E, b';'),
    (0x5F, 0xAC),
    (0x60, b'-'),
    (0x61, b'/'),
    (0x6A, 0xA6),
    (0x6B, b','),
    (0x6C, b'%'),
    (0x6D, b'_'),
    (0x6E, b'>'),
    (0x6F, b'?'),
    (0x79, b'`'),
    (0x7A, b':'),
    (0x7B, b'#'),
    (0x7C, b'@'),
    (0x7D, b'\''),
    (0x7E, b'='),
    (0x7F, b'"'),
    (0x81, b'a'),
    (0x82, b'b'),
    (0x83, b'c'),
    (0x84, b'd'),
    (0x85, b'e'),
    (0x86, b'f'),
    (0x87, b'g'),
    (0x88, b'h'),
    (0x89, b'i'),
    (0x91, b'j'),
    (0x92, b'k'),
    (0x93, b'l'),
    (0x94, b'm'),
    (0x95, b'n'),
    (0x96, b'o'),
    (0x97, b'p'),
    (0x98, b'q'),
    (0x99, b'r'),
    (0xA1, b'~'),
    (0xA2, b's'),
    (0xA3, b't'),
    (0xA4, b'u'),
    (0xA5, b'v'),
    (0xA6, b'w'),
    (0xA7, b'x'),
    (0xA8, b'y'),
    (0xA9, b'z'),
    (0xC0, b'{'),
    (0xC1, b'A'),
    (0xC2, b'B'),
    (0xC3, b'C'),
    (0xC4, b'D'),
    (0xC5, b'E'),
    (0xC6, b'F'),
    (0xC7, b'G'),
    (0xC8, b'H'),
    (0xC9, b'I'),
    (0xD0, b'}'),
    (0xD1, b'J'),
    (0xD2, b'K'),
    (0xD3, b'L'),
    (0xD4, b'M'),
    (0xD5, b'N'),
    (0xD6, b'O'),
    (0xD7, b'P'),
    (0xD8, b'Q'),
    (0xD9, b'R'),
    (0xE0, b'\\'),
    (0xE2, b'S'),
    (0xE3, b'T'),
    (0xE4, b'U'),
    (0xE5, b'V'),
    (0xE6, b'W'),
    (0xE7, b'X'),
    (0xE8, b'Y'),
    (0xE9, b'Z'),
    (0xF0, b'0'),
    (0xF1, b'1'),
    (0xF2, b'2'),
    (0xF3, b'3'),
    (0xF4, b'4'),
    (0xF5, b'5'),
    (0xF6, b'6'),
    (0xF7, b'7'),
    (0xF8, b'8'),
    (0xF9, b'9'),
];

/// Direction indicator bytes carried by send/receive data frames.
pub const DIRECTION_SEND: u8 = 0xD9; // 'R' in Cp500
pub const DIRECTION_RECEIVE: u8 = 0xE3; // 'T' in Cp500
/// Physical-block and VBS-record padding byte (Cp500 space).
pub const PAD_BYTE: u8 = 0x40;

fn build_tables() -> ([u8; 256], [u8; 256]) {
    let mut to_latin1 = [0u8; 256];
    let mut claimed = [false; 256];
    let mut is_known = [false; 256];

    for &(ebcdic, latin1) in KNOWN_PAIRS {
        to_latin1[ebcdic as usize] = latin1;
        claimed[latin1 as usize] = true;
        is_known[ebcdic as usize] = true;
    }

    let mut next_free = 0usize;
    for ebcdic in 0..256usize {
        if is_known[ebcdic] {
            continue;
        }
        while claimed[next_free] {
            next_free += 1;
        }
        to_latin1[ebcdic] = next_free as u8;
        claimed[next_free] = true;
    }

    let mut to_ebcdic = [0u8; 256];
    for (ebcdic, &latin1) in to_latin1.iter().enumerate() {
        to_ebcdic[latin1 as usize] = ebcdic as u8;
    }

    (to_latin1, to_ebcdic)
}

fn tables() -> &'static ([u8; 256], [u8; 256]) {
    static TABLES: OnceLock<([u8; 256], [u8; 256])> = OnceLock::new();
    TABLES.get_or_init(build_tables)
}

/// Decode one Cp500 byte to its Latin-1 byte value.
pub fn cp500_to_latin1(byte: u8) -> u8 {
    tables().0[byte as usize]
}

/// Encode one Latin-1 byte to its Cp500 byte value.
pub fn latin1_to_cp500(byte: u8) -> u8 {
    tables().1[byte as usize]
}

/// Decode a Cp500 byte string to Latin-1 bytes.
pub fn decode(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().copied().map(cp500_to_latin1).collect()
}

/// Encode a Latin-1/ASCII byte string to Cp500.
pub fn encode(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().copied().map(latin1_to_cp500).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_a_bijection() {
        let (to_latin1, to_ebcdic) = tables();
        let mut seen = [false; 256];
        for &v in to_latin1.iter() {
            assert!(!seen[v as usize], "duplicate latin1 target {v:#04X}");
            seen[v as usize] = true;
        }
        for ebcdic in 0..256u16 {
            let ebcdic = ebcdic as u8;
            assert_eq!(to_ebcdic[to_latin1[ebcdic as usize] as usize], ebcdic);
        }
    }

    #[test]
    fn space_is_0x40() {
        assert_eq!(cp500_to_latin1(0x40), b' ');
        assert_eq!(latin1_to_cp500(b' '), 0x40);
    }

    #[test]
    fn direction_bytes_roundtrip() {
        assert_eq!(cp500_to_latin1(DIRECTION_SEND), b'R');
        assert_eq!(cp500_to_latin1(DIRECTION_RECEIVE), b'T');
        assert_eq!(latin1_to_cp500(b'R'), DIRECTION_SEND);
        assert_eq!(latin1_to_cp500(b'T'), DIRECTION_RECEIVE);
    }

    #[test]
    fn digits_roundtrip() {
        for digit in b'0'..=b'9' {
            let ebcdic = latin1_to_cp500(digit);
            assert_eq!(cp500_to_latin1(ebcdic), digit);
        }
    }

    #[test]
    fn letters_roundtrip() {
        for letter in b'A'..=b'Z' {
            let ebcdic = latin1_to_cp500(letter);
            assert_eq!(cp500_to_latin1(ebcdic), letter);
        }
        for letter in b'a'..=b'z' {
            let ebcdic = latin1_to_cp500(letter);
            assert_eq!(cp500_to_latin1(ebcdic), letter);
        }
    }

    #[test]
    fn byte_string_roundtrip() {
        let text = b"ABC123 IPM";
        let enc = encode(text);
        let dec = decode(&enc);
        assert_eq!(dec, text.to_vec());
    }
}
