//! Keycode table
//!
//! Translate ASCII characters into the HID key that types them on a US
//! layout, along with whether shift must be held.

// The keytable represents the keys as u16's, with the low 8 bits corresponding
// to the Keyboard enum value, and the upper bits indicating modifiers.

use usbd_human_interface_device::page::Keyboard;

use crate::Mods;

/// A shift modifier.
const SHIFT: u16 = 0x100;

/// An empty character, one we don't support sending.
const NONE: u16 = 0xffff;

/// Encode a single character as a keypress with no modification.
const fn n(ch: Keyboard) -> u16 {
    ch as u16
}

/// Encode a single keypress, indicating that it needs to be shifted.
const fn s(ch: Keyboard) -> u16 {
    SHIFT | (ch as u16)
}

static KEY_TABLE: [u16; 128] = [
    NONE,  // 0x00, NUL
    NONE,  // 0x01, SOH
    NONE,  // 0x02, STX
    NONE,  // 0x03, ETX
    NONE,  // 0x04, EOT
    NONE,  // 0x05, ENQ
    NONE,  // 0x06, ACK
    NONE,  // 0x07, BEL
    NONE,  // 0x08, BS
    n(Keyboard::Tab),  // 0x09, Horizontal Tab
    n(Keyboard::ReturnEnter),  // 0x0A, Line feed
    NONE,  // 0x0B, VT
    NONE,  // 0x0C, FF
    NONE,  // 0x0D, CR
    NONE,  // 0x0E, SO
    NONE,  // 0x0F, SI
    NONE,  // 0x10, DLE
    NONE,  // 0x11, XON
    NONE,  // 0x12, DC2
    NONE,  // 0x13, XOFF
    NONE,  // 0x14, DC4
    NONE,  // 0x15, NAK
    NONE,  // 0x16, SYN
    NONE,  // 0x17, ETB
    NONE,  // 0x18, CAN
    NONE,  // 0x19, EM
    NONE,  // 0x1A, SUB
    NONE,  // 0x1B, ESC
    NONE,  // 0x1C, FS
    NONE,  // 0x1D, GS
    NONE,  // 0x1E, RS
    NONE,  // 0x1F, US
    n(Keyboard::Space), // 0x20, Space
    s(Keyboard::Keyboard1), // 0x21, !
    s(Keyboard::Apostrophe), // 0x22, "
    s(Keyboard::Keyboard3), // 0x23, #
    s(Keyboard::Keyboard4), // 0x24, $
    s(Keyboard::Keyboard5), // 0x25, %
    s(Keyboard::Keyboard7), // 0x26, &
    n(Keyboard::Apostrophe), // 0x27, '
    s(Keyboard::Keyboard9), // 0x28, (
    s(Keyboard::Keyboard0), // 0x29, )
    s(Keyboard::Keyboard8), // 0x2a, *
    s(Keyboard::Equal), // 0x2b, +
    n(Keyboard::Comma), // 0x2c, ,
    n(Keyboard::Minus), // 0x2d, -
    n(Keyboard::Dot), // 0x2e, .
    n(Keyboard::ForwardSlash), // 0x2f, /
    n(Keyboard::Keyboard0), // 0x30, 0
    n(Keyboard::Keyboard1), // 0x31, 1
    n(Keyboard::Keyboard2), // 0x32, 2
    n(Keyboard::Keyboard3), // 0x33, 3
    n(Keyboard::Keyboard4), // 0x34, 4
    n(Keyboard::Keyboard5), // 0x35, 5
    n(Keyboard::Keyboard6), // 0x36, 6
    n(Keyboard::Keyboard7), // 0x37, 7
    n(Keyboard::Keyboard8), // 0x38, 8
    n(Keyboard::Keyboard9), // 0x39, 9
    s(Keyboard::Semicolon), // 0x3A, :
    n(Keyboard::Semicolon), // 0x3B, ;
    s(Keyboard::Comma), // 0x3C, <
    n(Keyboard::Equal), // 0x3D, =
    s(Keyboard::Dot), // 0x3E, >
    s(Keyboard::ForwardSlash), // 0x3F, ?
    s(Keyboard::Keyboard2), // 0x40, @
    s(Keyboard::A), // 0x41, A
    s(Keyboard::B), // 0x42, B
    s(Keyboard::C), // 0x43, C
    s(Keyboard::D), // 0x44, D
    s(Keyboard::E), // 0x45, E
    s(Keyboard::F), // 0x46, F
    s(Keyboard::G), // 0x47, G
    s(Keyboard::H), // 0x48, H
    s(Keyboard::I), // 0x49, I
    s(Keyboard::J), // 0x4a, J
    s(Keyboard::K), // 0x4b, K
    s(Keyboard::L), // 0x4c, L
    s(Keyboard::M), // 0x4d, M
    s(Keyboard::N), // 0x4e, N
    s(Keyboard::O), // 0x4f, O
    s(Keyboard::P), // 0x50, P
    s(Keyboard::Q), // 0x51, Q
    s(Keyboard::R), // 0x52, R
    s(Keyboard::S), // 0x53, S
    s(Keyboard::T), // 0x54, T
    s(Keyboard::U), // 0x55, U
    s(Keyboard::V), // 0x56, V
    s(Keyboard::W), // 0x57, W
    s(Keyboard::X), // 0x58, X
    s(Keyboard::Y), // 0x59, Y
    s(Keyboard::Z), // 0x5a, Z
    n(Keyboard::LeftBrace), // 0x5B, [
    n(Keyboard::Backslash), // 0x5C, \
    n(Keyboard::RightBrace), // 0x5D, ]
    s(Keyboard::Keyboard6), // 0x5E, ^
    s(Keyboard::Minus), // 0x5F, _
    n(Keyboard::Grave), // 0x60, `
    n(Keyboard::A), // 0x61, a
    n(Keyboard::B), // 0x62, b
    n(Keyboard::C), // 0x63, c
    n(Keyboard::D), // 0x64, d
    n(Keyboard::E), // 0x65, e
    n(Keyboard::F), // 0x66, f
    n(Keyboard::G), // 0x67, g
    n(Keyboard::H), // 0x68, h
    n(Keyboard::I), // 0x69, i
    n(Keyboard::J), // 0x6a, j
    n(Keyboard::K), // 0x6b, k
    n(Keyboard::L), // 0x6c, l
    n(Keyboard::M), // 0x6d, m
    n(Keyboard::N), // 0x6e, n
    n(Keyboard::O), // 0x6f, o
    n(Keyboard::P), // 0x70, p
    n(Keyboard::Q), // 0x71, q
    n(Keyboard::R), // 0x72, r
    n(Keyboard::S), // 0x73, s
    n(Keyboard::T), // 0x74, t
    n(Keyboard::U), // 0x75, u
    n(Keyboard::V), // 0x76, v
    n(Keyboard::W), // 0x77, w
    n(Keyboard::X), // 0x78, x
    n(Keyboard::Y), // 0x79, y
    n(Keyboard::Z), // 0x7a, z
    s(Keyboard::LeftBrace), // 0x7B, {
    s(Keyboard::Backslash), // 0x7C, |
    s(Keyboard::RightBrace), // 0x7D, }
    s(Keyboard::Grave), // 0x7E, ~
    NONE, // 0x7F, DEL
];

/// Punctuation that is typed by holding shift over some other key.
const SHIFTED: &str = "!@#$%^&*()_+{}|:\"<>?~";

fn lookup(ch: char) -> Option<u16> {
    if !ch.is_ascii() {
        return None;
    }
    match KEY_TABLE[ch as usize] {
        NONE => None,
        code => Some(code),
    }
}

/// Translate a character into the key and modifiers that type it.
///
/// Returns `None` for anything the table doesn't cover, which callers treat
/// as "type nothing".
pub fn translate(ch: char) -> Option<(Keyboard, Mods)> {
    let code = lookup(ch)?;
    let mods = if (code & SHIFT) != 0 {
        Mods::LEFT_SHIFT
    } else {
        Mods::empty()
    };
    Some((((code & 0xFF) as u8).into(), mods))
}

/// Does typing this character require the shift modifier?
pub fn needs_shift(ch: char) -> bool {
    ch.is_ascii_uppercase() || SHIFTED.contains(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_are_sequential() {
        for (i, ch) in ('a'..='z').enumerate() {
            let (key, mods) = translate(ch).unwrap();
            assert_eq!(key as u8, Keyboard::A as u8 + i as u8);
            assert_eq!(mods, Mods::empty());

            let (upper, mods) = translate(ch.to_ascii_uppercase()).unwrap();
            assert_eq!(upper as u8, key as u8);
            assert_eq!(mods, Mods::LEFT_SHIFT);
        }
    }

    #[test]
    fn zero_follows_nine() {
        for (i, ch) in ('1'..='9').enumerate() {
            assert_eq!(translate(ch).unwrap().0 as u8, 0x1e + i as u8);
        }
        assert_eq!(translate('0').unwrap().0 as u8, translate('9').unwrap().0 as u8 + 1);
    }

    #[test]
    fn whitespace() {
        assert_eq!(translate(' '), Some((Keyboard::Space, Mods::empty())));
        assert_eq!(translate('\n'), Some((Keyboard::ReturnEnter, Mods::empty())));
        assert_eq!(translate('\t'), Some((Keyboard::Tab, Mods::empty())));
        assert_eq!(translate('\r'), None);
    }

    #[test]
    fn unsupported() {
        assert_eq!(translate('\x07'), None);
        assert_eq!(translate('\x7f'), None);
        assert_eq!(translate('é'), None);
        assert_eq!(translate('€'), None);
    }

    #[test]
    fn shift_predicate_agrees_with_table() {
        for b in 0x20u8..0x7f {
            let ch = b as char;
            let (_, mods) = translate(ch).unwrap();
            assert_eq!(mods.contains(Mods::LEFT_SHIFT), needs_shift(ch), "char {:?}", ch);
        }
    }

    #[test]
    fn shifted_punctuation() {
        assert_eq!(translate('!'), Some((Keyboard::Keyboard1, Mods::LEFT_SHIFT)));
        assert_eq!(translate('?'), Some((Keyboard::ForwardSlash, Mods::LEFT_SHIFT)));
        assert_eq!(translate('"'), Some((Keyboard::Apostrophe, Mods::LEFT_SHIFT)));
        assert_eq!(translate('/'), Some((Keyboard::ForwardSlash, Mods::empty())));
    }
}
