// Planckrs Event Dispatcher
// Turns key transitions into layer changes, or forwards them to HID encoding
//
// Every event is handled synchronously: resolve the position against the
// current layer mask, act on layer control codes, and report whether the
// event was consumed. Nothing here blocks, allocates per event, or panics.
//
// A press remembers the keycode it resolved to. Its release and repeats act
// on that keycode, so a layer change while the key is down cannot strand a
// momentary layer or release a key that was never pressed.

use crate::keymap::{KeyPos, Keymap};
use crate::layer::{LayerId, LayerMask, LayerState};
use crate::resolve::resolve;
use crate::storage::DefaultLayerStore;
use crate::tone::{Song, ToneSink};
use crate::{Control, KeyAction, Keycode};

/// Outcome of dispatching one key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
    /// A layer control code acted on the event; nothing goes to the host
    Consumed,
    /// Pass the resolved keycode on to HID encoding unchanged
    Forward(Keycode),
}

impl DispatchResult {
    pub fn is_consumed(self) -> bool {
        matches!(self, DispatchResult::Consumed)
    }

    /// The forwarded keycode, if the event was not consumed
    pub fn forwarded(self) -> Option<Keycode> {
        match self {
            DispatchResult::Forward(keycode) => Some(keycode),
            DispatchResult::Consumed => None,
        }
    }
}

/// Owns the layer state and the collaborators it drives.
///
/// Single writer of [`LayerState`]; the scanner reads the mask through
/// [`Dispatcher::active_layer_mask`] between events.
pub struct Dispatcher<S, T> {
    keymap: Keymap,
    state: LayerState,
    /// Keycode each held position resolved to on press, row-major
    held: Vec<Option<Keycode>>,
    store: S,
    tone: T,
}

impl<S: DefaultLayerStore, T: ToneSink> Dispatcher<S, T> {
    /// Create a dispatcher with only the keymap's default layer enabled.
    ///
    /// Does not touch storage or audio; call [`Dispatcher::boot`] for that.
    pub fn new(keymap: Keymap, store: S, tone: T) -> Self {
        let state = LayerState::new(keymap.default_layer());
        let held = vec![None; keymap.key_count()];
        Self {
            keymap,
            state,
            held,
            store,
            tone,
        }
    }

    /// Create a dispatcher and run the boot sequence
    pub fn booted(keymap: Keymap, store: S, tone: T) -> Self {
        let mut dispatcher = Self::new(keymap, store, tone);
        dispatcher.boot();
        dispatcher
    }

    /// Boot sequence: restore the persisted default layer, play the startup song.
    ///
    /// Missing, unreadable, or unusable persisted values fall back to the
    /// keymap's default layer. The tri-layer adjust layer is never usable as
    /// a default, since the rule could not turn it off.
    pub fn boot(&mut self) {
        let fallback = self.keymap.default_layer();
        let default_layer = match self.store.load() {
            Ok(Some(id)) if self.can_be_default(id) => id,
            Ok(Some(id)) => {
                log::warn!(
                    "persisted default layer {} not usable with this keymap, using {}",
                    id,
                    self.keymap.layer_name(fallback)
                );
                fallback
            }
            Ok(None) => fallback,
            Err(e) => {
                log::warn!("could not load default layer ({}), using {}", e, self.keymap.layer_name(fallback));
                fallback
            }
        };

        self.state = LayerState::new(default_layer);
        self.held.fill(None);
        self.update_tri_layer();
        log::debug!(
            "booted with default layer {} ({})",
            self.keymap.layer_name(default_layer),
            self.state.mask()
        );
        self.tone.play(Song::Startup);
    }

    /// Play the goodbye song and silence the speaker
    pub fn shutdown(&mut self) {
        log::debug!("shutting down");
        self.tone.play(Song::Goodbye);
        self.tone.stop_all();
    }

    /// Announce music mode with the scale
    pub fn music_mode_on(&mut self) {
        self.tone.play(Song::MusicScale);
    }

    /// Scanner entry point: returns true if the event was consumed
    pub fn on_key_transition(&mut self, pos: KeyPos, pressed: bool) -> bool {
        self.process(pos, KeyAction::from_pressed(pressed)).is_consumed()
    }

    /// Dispatch one key transition
    ///
    /// Presses resolve against the current mask. Releases and repeats reuse
    /// the keycode the press resolved to, falling back to the current mask
    /// when no press was seen.
    pub fn process(&mut self, pos: KeyPos, action: KeyAction) -> DispatchResult {
        let keycode = match action {
            KeyAction::Press => {
                let keycode = self.effective_keycode(pos);
                self.remember(pos, keycode);
                keycode
            }
            KeyAction::Repeat => self
                .held_keycode(pos)
                .unwrap_or_else(|| self.effective_keycode(pos)),
            KeyAction::Release => self
                .forget(pos)
                .unwrap_or_else(|| self.effective_keycode(pos)),
        };

        let control = match keycode {
            Keycode::Control(control) => control,
            other => return DispatchResult::Forward(other),
        };

        if let Some(target) = control.target_layer() {
            if !self.keymap.contains_layer(target) {
                log::warn!("{} at {} names a missing layer, passing through", control, pos);
                return DispatchResult::Forward(keycode);
            }
        }

        match control {
            Control::Momentary(id) => {
                match action {
                    KeyAction::Press => self.layer_on(id),
                    KeyAction::Release => self.layer_off(id),
                    KeyAction::Repeat => {}
                }
                DispatchResult::Consumed
            }
            Control::Toggle(id) => {
                if action.just_pressed() {
                    self.state.toggle(id);
                    log::debug!(
                        "layer {} toggled {}",
                        self.keymap.layer_name(id),
                        if self.state.overlays().contains(id) { "on" } else { "off" }
                    );
                    self.update_tri_layer();
                }
                DispatchResult::Consumed
            }
            Control::SetDefault(id) => {
                if action.just_pressed() {
                    self.set_default_layer(id);
                }
                DispatchResult::Consumed
            }
            Control::Reserved(code) => {
                log::trace!("reserved code {} at {} has no handler", code, pos);
                DispatchResult::Forward(keycode)
            }
        }
    }

    /// Persist `id` as the default layer, then swap it in.
    ///
    /// A failed write is logged and the in-memory switch still happens. Plays
    /// the layer's song, if it has one. Layers the keymap lacks and the
    /// tri-layer adjust layer are refused.
    pub fn set_default_layer(&mut self, id: LayerId) {
        if !self.can_be_default(id) {
            log::warn!("ignoring switch to default layer {}", id);
            return;
        }

        if let Err(e) = self.store.persist(id) {
            log::warn!("could not persist default layer {}: {}", id, e);
        }

        let old = self.state.default_layer();
        self.state.set_default_layer(id);
        self.update_tri_layer();
        log::debug!(
            "default layer {} -> {} ({})",
            self.keymap.layer_name(old),
            self.keymap.layer_name(id),
            self.state.mask()
        );

        if let Some(song) = self.keymap.layer(id).and_then(|layer| layer.song()) {
            self.tone.play(song);
        }
    }

    /// Replace the overlay layers wholesale. The default layer bit is ignored.
    pub fn set_active_layer_mask(&mut self, mask: LayerMask) {
        self.state
            .set_overlays(mask.without(self.state.default_layer()));
        self.update_tri_layer();
    }

    /// Layers currently taking part in resolution, default layer included
    pub fn active_layer_mask(&self) -> LayerMask {
        self.state.mask()
    }

    /// Keycode the position would produce right now
    pub fn effective_keycode(&self, pos: KeyPos) -> Keycode {
        resolve(&self.keymap, self.state.mask(), pos).keycode
    }

    pub fn default_layer(&self) -> LayerId {
        self.state.default_layer()
    }

    pub fn layer_state(&self) -> &LayerState {
        &self.state
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tone(&self) -> &T {
        &self.tone
    }

    pub fn tone_mut(&mut self) -> &mut T {
        &mut self.tone
    }

    /// Keycode the press at `pos` resolved to, while the key is held
    pub fn held_keycode(&self, pos: KeyPos) -> Option<Keycode> {
        self.keymap
            .key_index(pos)
            .and_then(|index| self.held.get(index).copied().flatten())
    }

    fn remember(&mut self, pos: KeyPos, keycode: Keycode) {
        let slot = self
            .keymap
            .key_index(pos)
            .and_then(|index| self.held.get_mut(index));
        if let Some(slot) = slot {
            *slot = Some(keycode);
        }
    }

    fn forget(&mut self, pos: KeyPos) -> Option<Keycode> {
        self.keymap
            .key_index(pos)
            .and_then(|index| self.held.get_mut(index))
            .and_then(Option::take)
    }

    fn layer_on(&mut self, id: LayerId) {
        self.state.enable(id);
        log::debug!("layer {} on", self.keymap.layer_name(id));
        self.update_tri_layer();
    }

    fn layer_off(&mut self, id: LayerId) {
        self.state.disable(id);
        log::debug!("layer {} off", self.keymap.layer_name(id));
        self.update_tri_layer();
    }

    fn can_be_default(&self, id: LayerId) -> bool {
        self.keymap.contains_layer(id)
            && self.keymap.tri_layer().map_or(true, |tri| tri.adjust != id)
    }

    // Re-derived after every change, whichever layer moved.
    fn update_tri_layer(&mut self) {
        if let Some(tri) = self.keymap.tri_layer() {
            tri.apply(&mut self.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::Layer;
    use crate::storage::MemoryStore;
    use crate::tone::NoTone;
    use crate::Usage;

    // 1x4 board: [MO(1), TG(1), DF(1), A] on BASE; [_, _, DF(0), B] on FN
    fn tiny() -> Keymap {
        Keymap::new(
            1,
            4,
            vec![
                Layer::new(
                    "BASE",
                    vec![
                        Keycode::momentary(1),
                        Keycode::toggle(1),
                        Keycode::set_default(1),
                        Keycode::key(Usage::A),
                    ],
                ),
                Layer::new(
                    "FN",
                    vec![
                        Keycode::TRNS,
                        Keycode::TRNS,
                        Keycode::set_default(0),
                        Keycode::key(Usage::B),
                    ],
                ),
            ],
        )
        .unwrap()
    }

    fn dispatcher() -> Dispatcher<MemoryStore, NoTone> {
        Dispatcher::booted(tiny(), MemoryStore::new(), NoTone)
    }

    #[test]
    fn test_momentary_hold_and_release() {
        let mut d = dispatcher();
        let fn_key = KeyPos::new(0, 0);
        let a = KeyPos::new(0, 3);

        assert_eq!(d.process(fn_key, KeyAction::Press), DispatchResult::Consumed);
        assert_eq!(d.process(a, KeyAction::Press), DispatchResult::Forward(Keycode::key(Usage::B)));
        assert_eq!(d.process(fn_key, KeyAction::Release), DispatchResult::Consumed);
        assert_eq!(d.active_layer_mask(), LayerMask(0b01));
        assert_eq!(d.process(a, KeyAction::Press), DispatchResult::Forward(Keycode::key(Usage::A)));
    }

    #[test]
    fn test_momentary_release_uses_keycode_from_press() {
        // FN has a real key under its own MO position
        let keymap = Keymap::new(
            1,
            2,
            vec![
                Layer::new("BASE", vec![Keycode::momentary(1), Keycode::key(Usage::A)]),
                Layer::new("FN", vec![Keycode::key(Usage::B), Keycode::TRNS]),
            ],
        )
        .unwrap();
        let mut d = Dispatcher::booted(keymap, MemoryStore::new(), NoTone);
        let fn_key = KeyPos::new(0, 0);

        assert_eq!(d.process(fn_key, KeyAction::Press), DispatchResult::Consumed);
        assert_eq!(d.active_layer_mask(), LayerMask(0b11));
        assert_eq!(d.effective_keycode(fn_key), Keycode::key(Usage::B));
        assert_eq!(d.held_keycode(fn_key), Some(Keycode::momentary(1)));

        assert_eq!(d.process(fn_key, KeyAction::Repeat), DispatchResult::Consumed);
        assert_eq!(d.process(fn_key, KeyAction::Release), DispatchResult::Consumed);
        assert_eq!(d.active_layer_mask(), LayerMask(0b01));
        assert_eq!(d.held_keycode(fn_key), None);

        // The next press resolves afresh
        assert_eq!(d.process(fn_key, KeyAction::Press), DispatchResult::Consumed);
    }

    #[test]
    fn test_key_held_across_layer_change_releases_what_it_pressed() {
        let mut d = dispatcher();
        let fn_key = KeyPos::new(0, 0);
        let a = KeyPos::new(0, 3);

        assert_eq!(d.process(a, KeyAction::Press), DispatchResult::Forward(Keycode::key(Usage::A)));
        d.process(fn_key, KeyAction::Press);
        assert_eq!(d.process(a, KeyAction::Repeat), DispatchResult::Forward(Keycode::key(Usage::A)));
        assert_eq!(d.process(a, KeyAction::Release), DispatchResult::Forward(Keycode::key(Usage::A)));
    }

    #[test]
    fn test_release_without_press_resolves_against_current_mask() {
        let mut d = dispatcher();
        d.set_active_layer_mask(LayerMask(0b10));
        assert_eq!(d.process(KeyPos::new(0, 0), KeyAction::Release), DispatchResult::Consumed);
        assert_eq!(d.active_layer_mask(), LayerMask(0b01));
    }

    #[test]
    fn test_momentary_repeat_is_consumed_without_change() {
        let mut d = dispatcher();
        assert_eq!(d.process(KeyPos::new(0, 0), KeyAction::Repeat), DispatchResult::Consumed);
        assert_eq!(d.active_layer_mask(), LayerMask(0b01));
    }

    #[test]
    fn test_toggle_flips_on_press_only() {
        let mut d = dispatcher();
        let tg = KeyPos::new(0, 1);
        assert!(d.on_key_transition(tg, true));
        assert!(d.on_key_transition(tg, false));
        assert_eq!(d.active_layer_mask(), LayerMask(0b11));
        assert!(d.on_key_transition(tg, true));
        assert!(d.on_key_transition(tg, false));
        assert_eq!(d.active_layer_mask(), LayerMask(0b01));
    }

    #[test]
    fn test_set_default_persists_and_swaps() {
        let mut d = dispatcher();
        assert!(d.on_key_transition(KeyPos::new(0, 2), true));
        assert_eq!(d.default_layer(), LayerId(1));
        assert_eq!(d.active_layer_mask(), LayerMask(0b10));
        assert_eq!(d.store().value(), Some(LayerId(1)));

        // Release is consumed and changes nothing
        assert!(d.on_key_transition(KeyPos::new(0, 2), false));
        assert_eq!(d.default_layer(), LayerId(1));
    }

    #[test]
    fn test_set_default_survives_write_failure() {
        let mut d = Dispatcher::booted(tiny(), MemoryStore::new().failing_writes(), NoTone);
        assert!(d.on_key_transition(KeyPos::new(0, 2), true));
        assert_eq!(d.default_layer(), LayerId(1));
        assert_eq!(d.store().value(), None);
    }

    #[test]
    fn test_plain_key_forwarded() {
        let mut d = dispatcher();
        assert!(!d.on_key_transition(KeyPos::new(0, 3), true));
        assert!(!d.on_key_transition(KeyPos::new(0, 3), false));
    }

    #[test]
    fn test_out_of_bounds_forwarded_as_undefined() {
        let mut d = dispatcher();
        assert_eq!(
            d.process(KeyPos::new(5, 5), KeyAction::Press),
            DispatchResult::Forward(Keycode::Undefined)
        );
        assert_eq!(d.active_layer_mask(), LayerMask(0b01));
    }

    #[test]
    fn test_boot_rejects_out_of_range_persisted_layer() {
        let d = Dispatcher::booted(tiny(), MemoryStore::with_value(LayerId(9)), NoTone);
        assert_eq!(d.default_layer(), LayerId(0));
    }

    #[test]
    fn test_boot_restores_persisted_layer() {
        let d = Dispatcher::booted(tiny(), MemoryStore::with_value(LayerId(1)), NoTone);
        assert_eq!(d.default_layer(), LayerId(1));
        assert_eq!(d.active_layer_mask(), LayerMask(0b10));
    }

    #[test]
    fn test_set_active_layer_mask_ignores_default_bit() {
        let mut d = dispatcher();
        d.set_active_layer_mask(LayerMask(0b11));
        assert_eq!(d.layer_state().overlays(), LayerMask(0b10));
        d.set_active_layer_mask(LayerMask::EMPTY);
        assert_eq!(d.active_layer_mask(), LayerMask(0b01));
    }

    #[test]
    fn test_dispatch_result_helpers() {
        assert!(DispatchResult::Consumed.is_consumed());
        assert_eq!(DispatchResult::Consumed.forwarded(), None);
        let forward = DispatchResult::Forward(Keycode::NoOp);
        assert!(!forward.is_consumed());
        assert_eq!(forward.forwarded(), Some(Keycode::NoOp));
    }
}
