// Planckrs Tri-Layer Rule
// The adjust layer is on exactly while both the lower and raise layers are on

use super::{LayerId, LayerState};

/// Derived-layer policy: `adjust` tracks `lower AND raise`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriLayer {
    pub lower: LayerId,
    pub raise: LayerId,
    pub adjust: LayerId,
}

impl TriLayer {
    pub fn new(lower: LayerId, raise: LayerId, adjust: LayerId) -> Self {
        Self {
            lower,
            raise,
            adjust,
        }
    }

    /// Re-derive the adjust layer from the current lower/raise bits.
    ///
    /// Forces the adjust layer off when the pair is incomplete, even if it
    /// was enabled some other way.
    pub fn apply(&self, state: &mut LayerState) {
        update_tri_layer(state, self.lower, self.raise, self.adjust);
    }

    /// True if the adjust layer currently matches the rule
    pub fn holds(&self, state: &LayerState) -> bool {
        state.is_enabled(self.adjust)
            == (state.is_enabled(self.lower) && state.is_enabled(self.raise))
    }
}

/// Enable `combo` iff both `layer_a` and `layer_b` are enabled; disable it otherwise.
pub fn update_tri_layer(state: &mut LayerState, layer_a: LayerId, layer_b: LayerId, combo: LayerId) {
    let on = state.is_enabled(layer_a) && state.is_enabled(layer_b);
    if on != state.overlays().contains(combo) {
        log::debug!(
            "tri-layer: layer {} {}",
            combo,
            if on { "on" } else { "off" }
        );
    }
    state.set(combo, on);
}
