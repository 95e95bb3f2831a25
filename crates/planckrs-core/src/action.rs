// Planckrs Key Action
// The edge of a physical key transition reported by the matrix scanner

use std::fmt;

/// Represents the transition a key position went through during a scan.
///
/// Scanners report presses and releases; a repeat is a press that was
/// already held on the previous scan (typematic or a bouncing reporter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KeyAction {
    Release = 0,
    Press = 1,
    Repeat = 2,
}

impl KeyAction {
    /// Build an action from the scanner's boolean `pressed` flag
    pub fn from_pressed(pressed: bool) -> Self {
        if pressed {
            KeyAction::Press
        } else {
            KeyAction::Release
        }
    }

    /// Returns true if the action is either PRESS or REPEAT
    pub fn is_pressed(self) -> bool {
        matches!(self, KeyAction::Press | KeyAction::Repeat)
    }

    /// Returns true only if this is a PRESS event (not REPEAT)
    pub fn just_pressed(self) -> bool {
        matches!(self, KeyAction::Press)
    }

    /// Returns true if this is a RELEASE event
    pub fn is_released(self) -> bool {
        matches!(self, KeyAction::Release)
    }

    /// Returns true if this is a REPEAT event
    pub fn is_repeat(self) -> bool {
        matches!(self, KeyAction::Repeat)
    }
}

impl fmt::Display for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAction::Release => write!(f, "release"),
            KeyAction::Press => write!(f, "press"),
            KeyAction::Repeat => write!(f, "repeat"),
        }
    }
}
