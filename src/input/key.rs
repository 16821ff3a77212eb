//! Device key codes

use crate::error::{InputError, Result};

/// Size of the device key-code space
pub const KEY_CODE_COUNT: usize = 256;

/// Scan-code style key identifier in `0..KEY_CODE_COUNT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub const ESCAPE: KeyCode = KeyCode(0x01);
    pub const NUM_1: KeyCode = KeyCode(0x02);
    pub const NUM_2: KeyCode = KeyCode(0x03);
    pub const NUM_3: KeyCode = KeyCode(0x04);
    pub const NUM_4: KeyCode = KeyCode(0x05);
    pub const NUM_5: KeyCode = KeyCode(0x06);
    pub const NUM_6: KeyCode = KeyCode(0x07);
    pub const NUM_7: KeyCode = KeyCode(0x08);
    pub const NUM_8: KeyCode = KeyCode(0x09);
    pub const NUM_9: KeyCode = KeyCode(0x0A);
    pub const NUM_0: KeyCode = KeyCode(0x0B);
    pub const BACKSPACE: KeyCode = KeyCode(0x0E);
    pub const TAB: KeyCode = KeyCode(0x0F);
    pub const Q: KeyCode = KeyCode(0x10);
    pub const W: KeyCode = KeyCode(0x11);
    pub const E: KeyCode = KeyCode(0x12);
    pub const R: KeyCode = KeyCode(0x13);
    pub const ENTER: KeyCode = KeyCode(0x1C);
    pub const LEFT_CTRL: KeyCode = KeyCode(0x1D);
    pub const A: KeyCode = KeyCode(0x1E);
    pub const S: KeyCode = KeyCode(0x1F);
    pub const D: KeyCode = KeyCode(0x20);
    pub const F: KeyCode = KeyCode(0x21);
    pub const LEFT_SHIFT: KeyCode = KeyCode(0x2A);
    pub const Z: KeyCode = KeyCode(0x2C);
    pub const X: KeyCode = KeyCode(0x2D);
    pub const C: KeyCode = KeyCode(0x2E);
    pub const V: KeyCode = KeyCode(0x2F);
    pub const RIGHT_SHIFT: KeyCode = KeyCode(0x36);
    pub const LEFT_ALT: KeyCode = KeyCode(0x38);
    pub const SPACE: KeyCode = KeyCode(0x39);
    pub const F1: KeyCode = KeyCode(0x3B);
    pub const F2: KeyCode = KeyCode(0x3C);
    pub const F3: KeyCode = KeyCode(0x3D);
    pub const F4: KeyCode = KeyCode(0x3E);
    pub const RIGHT_CTRL: KeyCode = KeyCode(0x9D);
    pub const RIGHT_ALT: KeyCode = KeyCode(0xB8);
    pub const UP: KeyCode = KeyCode(0xC8);
    pub const LEFT: KeyCode = KeyCode(0xCB);
    pub const RIGHT: KeyCode = KeyCode(0xCD);
    pub const DOWN: KeyCode = KeyCode(0xD0);
    pub const LEFT_META: KeyCode = KeyCode(0xDB);
    pub const RIGHT_META: KeyCode = KeyCode(0xDC);

    /// Index into per-key tables, rejecting codes outside the key space
    pub fn index(self) -> Result<usize> {
        let index = usize::from(self.0);
        if index < KEY_CODE_COUNT {
            Ok(index)
        } else {
            Err(InputError::InvalidKeyCode(self.0))
        }
    }

    pub fn is_shift(self) -> bool {
        self == Self::LEFT_SHIFT || self == Self::RIGHT_SHIFT
    }

    pub fn is_ctrl(self) -> bool {
        self == Self::LEFT_CTRL || self == Self::RIGHT_CTRL
    }

    pub fn is_alt(self) -> bool {
        self == Self::LEFT_ALT || self == Self::RIGHT_ALT
    }

    pub fn is_meta(self) -> bool {
        self == Self::LEFT_META || self == Self::RIGHT_META
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_bounds() {
        assert_eq!(KeyCode::W.index(), Ok(0x11));
        assert_eq!(KeyCode(255).index(), Ok(255));
        assert_eq!(KeyCode(256).index(), Err(InputError::InvalidKeyCode(256)));
    }
}
