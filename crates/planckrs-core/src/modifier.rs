// Planckrs Modifier Set
// Modifier bits carried by modified keycodes such as LSFT(MINS)

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::Usage;

/// An 8-bit set of held modifiers, laid out like the HID report's modifier byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mods(u8);

impl Mods {
    pub const NONE: Mods = Mods(0);
    pub const LCTL: Mods = Mods(0x01);
    pub const LSFT: Mods = Mods(0x02);
    pub const LALT: Mods = Mods(0x04);
    pub const LGUI: Mods = Mods(0x08);
    pub const RCTL: Mods = Mods(0x10);
    pub const RSFT: Mods = Mods(0x20);
    pub const RALT: Mods = Mods(0x40);
    pub const RGUI: Mods = Mods(0x80);

    const NAMES: [(Mods, &'static str); 8] = [
        (Mods::LCTL, "LCTL"),
        (Mods::LSFT, "LSFT"),
        (Mods::LALT, "LALT"),
        (Mods::LGUI, "LGUI"),
        (Mods::RCTL, "RCTL"),
        (Mods::RSFT, "RSFT"),
        (Mods::RALT, "RALT"),
        (Mods::RGUI, "RGUI"),
    ];

    /// Raw modifier byte
    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn from_bits(bits: u8) -> Self {
        Mods(bits)
    }

    pub const fn union(self, other: Mods) -> Self {
        Mods(self.0 | other.0)
    }

    pub fn contains(self, other: Mods) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Modifier wrapper names accepted in keycode expressions.
    ///
    /// `LSHFT` is spelled the way the stock Planck keymap spells it.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "LCTL" | "LCTRL" | "C" => Some(Mods::LCTL),
            "LSFT" | "LSHFT" | "LSHIFT" | "S" => Some(Mods::LSFT),
            "LALT" | "LOPT" | "A" => Some(Mods::LALT),
            "LGUI" | "LCMD" | "LWIN" | "G" => Some(Mods::LGUI),
            "RCTL" | "RCTRL" => Some(Mods::RCTL),
            "RSFT" | "RSHFT" | "RSHIFT" => Some(Mods::RSFT),
            "RALT" | "ROPT" | "ALGR" => Some(Mods::RALT),
            "RGUI" | "RCMD" | "RWIN" => Some(Mods::RGUI),
            _ => None,
        }
    }

    /// The modifier bit a modifier key sets when pressed on its own
    pub fn from_usage(usage: Usage) -> Option<Self> {
        if usage.is_modifier() {
            Some(Mods(1 << (usage.code() - 0xE0)))
        } else {
            None
        }
    }
}

impl BitOr for Mods {
    type Output = Mods;

    fn bitor(self, rhs: Mods) -> Mods {
        self.union(rhs)
    }
}

impl BitOrAssign for Mods {
    fn bitor_assign(&mut self, rhs: Mods) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Mods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (bit, name) in Mods::NAMES {
            if self.contains(bit) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        if first {
            write!(f, "NONE")?;
        }
        Ok(())
    }
}
