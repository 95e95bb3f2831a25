// Planckrs Layer Resolver
// Effective keycode per position: highest enabled layer with a concrete entry wins

use crate::keymap::{KeyPos, Keymap};
use crate::layer::{LayerId, LayerMask};
use crate::Keycode;

/// Result of resolving one position against a layer mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// The effective keycode
    pub keycode: Keycode,
    /// Layer that supplied it; `None` when every enabled layer was
    /// transparent or the position is outside the matrix
    pub layer: Option<LayerId>,
}

/// Resolve `pos` against the enabled layers in `mask`.
///
/// Layers are visited from the highest id down. Transparent entries defer
/// to the next enabled layer; any other entry, `NoOp` included, ends the
/// search. A position where every enabled layer is transparent resolves to
/// `NoOp`. The result depends on nothing but the arguments.
pub fn resolve(keymap: &Keymap, mask: LayerMask, pos: KeyPos) -> Resolution {
    if !keymap.contains_pos(pos) {
        log::debug!("key event outside the {}x{} matrix at {}", keymap.rows(), keymap.cols(), pos);
        return Resolution {
            keycode: Keycode::Undefined,
            layer: None,
        };
    }

    for id in mask.iter_high_to_low() {
        if !keymap.contains_layer(id) {
            continue;
        }
        let keycode = keymap.keycode_at(id, pos);
        if !keycode.is_transparent() {
            log::trace!("{} resolves to {} on layer {}", pos, keycode, id);
            return Resolution {
                keycode,
                layer: Some(id),
            };
        }
    }

    log::trace!("{} is transparent on every enabled layer", pos);
    Resolution {
        keycode: Keycode::NoOp,
        layer: None,
    }
}

/// Effective keycode at `pos` for the enabled layers in `mask`
pub fn effective_keycode(keymap: &Keymap, mask: LayerMask, pos: KeyPos) -> Keycode {
    resolve(keymap, mask, pos).keycode
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::Layer;
    use crate::Usage;

    // BASE:  A B      OVER:  _ X      TOP:  _ _
    //        C D             NO _           _ _
    fn stacked() -> Keymap {
        Keymap::new(
            2,
            2,
            vec![
                Layer::new(
                    "BASE",
                    vec![
                        Keycode::key(Usage::A),
                        Keycode::key(Usage::B),
                        Keycode::key(Usage::C),
                        Keycode::key(Usage::D),
                    ],
                ),
                Layer::new(
                    "OVER",
                    vec![
                        Keycode::TRNS,
                        Keycode::key(Usage::X),
                        Keycode::NO,
                        Keycode::TRNS,
                    ],
                ),
                Layer::new("TOP", vec![Keycode::TRNS; 4]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_base_only() {
        let keymap = stacked();
        let mask = LayerMask(0b001);
        assert_eq!(effective_keycode(&keymap, mask, KeyPos::new(0, 1)), Keycode::key(Usage::B));
    }

    #[test]
    fn test_resolve_overlay_shadows_per_key() {
        let keymap = stacked();
        let mask = LayerMask(0b011);
        assert_eq!(
            resolve(&keymap, mask, KeyPos::new(0, 0)),
            Resolution {
                keycode: Keycode::key(Usage::A),
                layer: Some(LayerId(0))
            }
        );
        assert_eq!(
            resolve(&keymap, mask, KeyPos::new(0, 1)),
            Resolution {
                keycode: Keycode::key(Usage::X),
                layer: Some(LayerId(1))
            }
        );
    }

    #[test]
    fn test_resolve_noop_stops_search() {
        let keymap = stacked();
        assert_eq!(
            effective_keycode(&keymap, LayerMask(0b011), KeyPos::new(1, 0)),
            Keycode::NoOp
        );
    }

    #[test]
    fn test_resolve_all_transparent_is_noop() {
        let keymap = stacked();
        assert_eq!(
            resolve(&keymap, LayerMask(0b100), KeyPos::new(1, 1)),
            Resolution {
                keycode: Keycode::NoOp,
                layer: None
            }
        );
    }

    #[test]
    fn test_resolve_out_of_bounds_is_undefined() {
        let keymap = stacked();
        assert_eq!(
            effective_keycode(&keymap, LayerMask(0b111), KeyPos::new(7, 7)),
            Keycode::Undefined
        );
    }

    #[test]
    fn test_resolve_skips_mask_bits_without_layers() {
        let keymap = stacked();
        let mask = LayerMask(0b1000_0001);
        assert_eq!(effective_keycode(&keymap, mask, KeyPos::new(1, 1)), Keycode::key(Usage::D));
    }
}
