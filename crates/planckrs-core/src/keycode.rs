// Planckrs Keycode Type
// Tagged keycode: literal output, transparency markers, and layer control codes

use std::fmt;

use crate::layer::LayerId;
use crate::{Mods, Usage};

/// Reserved codes the dispatcher acts on instead of forwarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    /// Enable the layer while the key is held
    Momentary(LayerId),
    /// Flip the layer on each press
    Toggle(LayerId),
    /// Persist and switch the default layer
    SetDefault(LayerId),
    /// User-range code with no handler; passes through untouched
    Reserved(u16),
}

impl Control {
    /// The layer this control changes, if any
    pub fn target_layer(self) -> Option<LayerId> {
        match self {
            Control::Momentary(id) | Control::Toggle(id) | Control::SetDefault(id) => Some(id),
            Control::Reserved(_) => None,
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::Momentary(id) => write!(f, "MO({})", id),
            Control::Toggle(id) => write!(f, "TG({})", id),
            Control::SetDefault(id) => write!(f, "DF({})", id),
            Control::Reserved(code) => write!(f, "USER({})", code),
        }
    }
}

/// A single entry of a layer grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keycode {
    /// A literal HID usage
    Output(Usage),
    /// A usage sent with modifiers held
    Modified { mods: Mods, usage: Usage },
    /// A usage tapped several times (the keypad "00" key)
    Repeat { usage: Usage, count: u8 },
    /// Defer to the next lower enabled layer
    Transparent,
    /// Emit nothing; stops the layer search
    NoOp,
    /// Handled by the dispatcher, never sent to the host
    Control(Control),
    /// Lookup fell outside the matrix
    Undefined,
}

impl Keycode {
    pub const TRNS: Keycode = Keycode::Transparent;
    pub const NO: Keycode = Keycode::NoOp;

    pub const fn key(usage: Usage) -> Self {
        Keycode::Output(usage)
    }

    pub const fn shifted(usage: Usage) -> Self {
        Keycode::Modified {
            mods: Mods::LSFT,
            usage,
        }
    }

    pub const fn modified(mods: Mods, usage: Usage) -> Self {
        Keycode::Modified { mods, usage }
    }

    pub const fn momentary(id: u8) -> Self {
        Keycode::Control(Control::Momentary(LayerId(id)))
    }

    pub const fn toggle(id: u8) -> Self {
        Keycode::Control(Control::Toggle(LayerId(id)))
    }

    pub const fn set_default(id: u8) -> Self {
        Keycode::Control(Control::SetDefault(LayerId(id)))
    }

    pub fn is_transparent(self) -> bool {
        matches!(self, Keycode::Transparent)
    }

    pub fn is_control(self) -> bool {
        matches!(self, Keycode::Control(_))
    }

    /// The control code carried, if any
    pub fn control(self) -> Option<Control> {
        match self {
            Keycode::Control(control) => Some(control),
            _ => None,
        }
    }

    /// The usage that reaches the host, if any
    pub fn usage(self) -> Option<Usage> {
        match self {
            Keycode::Output(usage)
            | Keycode::Modified { usage, .. }
            | Keycode::Repeat { usage, .. } => Some(usage),
            _ => None,
        }
    }
}

/// Shifted punctuation names from the US layout, as QMK spells them.
pub(crate) const SHIFTED_NAMES: [(&str, Usage); 16] = [
    ("TILD", Usage::Grave),
    ("EXLM", Usage::N1),
    ("AT", Usage::N2),
    ("HASH", Usage::N3),
    ("DLR", Usage::N4),
    ("PERC", Usage::N5),
    ("CIRC", Usage::N6),
    ("AMPR", Usage::N7),
    ("ASTR", Usage::N8),
    ("LPRN", Usage::N9),
    ("RPRN", Usage::N0),
    ("UNDS", Usage::Minus),
    ("PLUS", Usage::Equal),
    ("LCBR", Usage::LeftBracket),
    ("RCBR", Usage::RightBracket),
    ("PIPE", Usage::Backslash),
];

impl fmt::Display for Keycode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keycode::Output(usage) => write!(f, "{}", usage),
            Keycode::Modified { mods, usage } => {
                if *mods == Mods::LSFT {
                    if let Some((name, _)) = SHIFTED_NAMES.iter().find(|(_, u)| u == usage) {
                        return write!(f, "{}", name);
                    }
                }
                // Innermost modifier last, so the output parses back
                let mut open = 0;
                for bit in 0..8u8 {
                    let single = Mods::from_bits(1 << bit);
                    if mods.contains(single) {
                        write!(f, "{}(", single)?;
                        open += 1;
                    }
                }
                write!(f, "{}", usage)?;
                for _ in 0..open {
                    write!(f, ")")?;
                }
                Ok(())
            }
            Keycode::Repeat { usage, count } => write!(f, "REP({},{})", usage, count),
            Keycode::Transparent => write!(f, "_______"),
            Keycode::NoOp => write!(f, "XXXXXXX"),
            Keycode::Control(control) => write!(f, "{}", control),
            Keycode::Undefined => write!(f, "UNDEFINED"),
        }
    }
}
