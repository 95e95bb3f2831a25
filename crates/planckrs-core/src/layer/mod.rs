// Planckrs Layer Identity
// Layer ids and the one-bit-per-layer mask shared with the scanner

mod state;
mod tri;

pub use state::LayerState;
pub use tri::{update_tri_layer, TriLayer};

use std::fmt;

/// Upper bound on layers: one bit each in a `u32` mask.
pub const MAX_LAYERS: usize = 32;

/// Index of a layer in the keymap. Higher ids win during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LayerId(pub u8);

impl LayerId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Bit for this layer, or `None` when the id cannot fit in a mask
    pub fn bit(self) -> Option<u32> {
        if self.index() < MAX_LAYERS {
            Some(1u32 << self.0)
        } else {
            None
        }
    }
}

impl From<u8> for LayerId {
    fn from(id: u8) -> Self {
        LayerId(id)
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bitset of enabled layers, bit `n` for layer `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const EMPTY: LayerMask = LayerMask(0);

    pub fn bits(self) -> u32 {
        self.0
    }

    /// Mask holding a single layer (empty for ids beyond the mask width)
    pub fn single(id: LayerId) -> Self {
        LayerMask(id.bit().unwrap_or(0))
    }

    pub fn contains(self, id: LayerId) -> bool {
        id.bit().map_or(false, |bit| self.0 & bit != 0)
    }

    pub fn with(self, id: LayerId) -> Self {
        LayerMask(self.0 | id.bit().unwrap_or(0))
    }

    pub fn without(self, id: LayerId) -> Self {
        LayerMask(self.0 & !id.bit().unwrap_or(0))
    }

    /// Enabled layers from highest id to lowest
    pub fn iter_high_to_low(self) -> impl Iterator<Item = LayerId> {
        (0..MAX_LAYERS as u8)
            .rev()
            .map(LayerId)
            .filter(move |id| self.contains(*id))
    }
}

impl fmt::Display for LayerMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06b}", self.0)
    }
}
