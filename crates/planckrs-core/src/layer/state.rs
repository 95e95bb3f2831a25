// Planckrs Layer State
// Which layers are enabled right now: overlay bits plus the default layer

use smallvec::SmallVec;

use super::{LayerId, LayerMask};

/// Mutable layer-enable state owned by the dispatcher.
///
/// The default layer is stored apart from the overlay bits and folded into
/// [`LayerState::mask`], so it is always enabled and swapping it is a
/// single write. Overlay operations are idempotent and O(1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerState {
    overlays: LayerMask,
    default_layer: LayerId,
}

impl LayerState {
    /// Boot state: only `default_layer` enabled
    pub fn new(default_layer: LayerId) -> Self {
        Self {
            overlays: LayerMask::EMPTY,
            default_layer,
        }
    }

    /// Enable an overlay layer
    pub fn enable(&mut self, id: LayerId) {
        if id.bit().is_none() {
            log::warn!("ignoring enable of layer {} (mask holds 32 layers)", id);
            return;
        }
        self.overlays = self.overlays.with(id);
    }

    /// Disable an overlay layer. The default layer stays enabled.
    pub fn disable(&mut self, id: LayerId) {
        if id.bit().is_none() {
            log::warn!("ignoring disable of layer {} (mask holds 32 layers)", id);
            return;
        }
        self.overlays = self.overlays.without(id);
    }

    /// Flip an overlay layer
    pub fn toggle(&mut self, id: LayerId) {
        if self.overlays.contains(id) {
            self.disable(id);
        } else {
            self.enable(id);
        }
    }

    /// Set an overlay layer to the given state
    pub fn set(&mut self, id: LayerId, on: bool) {
        if on {
            self.enable(id);
        } else {
            self.disable(id);
        }
    }

    /// True if the layer takes part in resolution
    pub fn is_enabled(&self, id: LayerId) -> bool {
        id == self.default_layer || self.overlays.contains(id)
    }

    pub fn default_layer(&self) -> LayerId {
        self.default_layer
    }

    /// Swap the default layer. The old default stops being enabled unless it
    /// is also set as an overlay.
    pub fn set_default_layer(&mut self, id: LayerId) {
        if id.bit().is_none() {
            log::warn!("ignoring default layer {} (mask holds 32 layers)", id);
            return;
        }
        self.default_layer = id;
    }

    /// Active mask: overlays plus the default layer
    pub fn mask(&self) -> LayerMask {
        self.overlays.with(self.default_layer)
    }

    /// Overlay bits only
    pub fn overlays(&self) -> LayerMask {
        self.overlays
    }

    /// Replace every overlay bit at once
    pub fn set_overlays(&mut self, mask: LayerMask) {
        self.overlays = mask;
    }

    /// Enabled layers in resolution order (highest id first)
    pub fn enabled_layers(&self) -> SmallVec<[LayerId; 8]> {
        self.mask().iter_high_to_low().collect()
    }
}

impl Default for LayerState {
    fn default() -> Self {
        Self::new(LayerId(0))
    }
}
