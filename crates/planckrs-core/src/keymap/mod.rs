// Planckrs Layer Map Table
// Static keycode grids, one per layer, indexed by physical key position

pub mod planck;

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::layer::{LayerId, TriLayer, MAX_LAYERS};
use crate::tone::Song;
use crate::Keycode;

/// Errors raised while assembling a keymap
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeymapError {
    #[error("keymap has no layers")]
    NoLayers,

    #[error("keymap has {0} layers; at most 32 fit in a layer mask")]
    TooManyLayers(usize),

    #[error("matrix must have at least one row and one column")]
    EmptyMatrix,

    #[error("layer '{layer}' has {found} keys; the {rows}x{cols} matrix needs {expected}")]
    GridSize {
        layer: String,
        rows: u8,
        cols: u8,
        expected: usize,
        found: usize,
    },

    #[error("duplicate layer name '{0}'")]
    DuplicateLayer(String),

    #[error("layer '{layer}' at {pos} refers to missing layer {target}")]
    MissingTarget {
        layer: String,
        pos: KeyPos,
        target: LayerId,
    },

    #[error("default layer {0} does not exist")]
    MissingDefault(LayerId),

    #[error("tri-layer refers to missing layer {0}")]
    TriLayerMissing(LayerId),

    #[error("tri-layer lower, raise and adjust must be three different layers")]
    TriLayerOverlap,

    #[error("tri-layer adjust layer {0} cannot be the default layer")]
    TriLayerOnDefault(LayerId),
}

/// A physical key position in the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPos {
    pub row: u8,
    pub col: u8,
}

impl KeyPos {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for KeyPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

impl FromStr for KeyPos {
    type Err = String;

    /// Accepts `"3,1"`, `"3 1"` and `"(3,1)"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')');
        let mut parts = inner
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty());
        let (row, col) = match (parts.next(), parts.next(), parts.next()) {
            (Some(row), Some(col), None) => (row, col),
            _ => return Err(format!("expected 'row,col', got '{}'", s)),
        };
        let row = row
            .parse::<u8>()
            .map_err(|_| format!("invalid row '{}'", row))?;
        let col = col
            .parse::<u8>()
            .map_err(|_| format!("invalid column '{}'", col))?;
        Ok(KeyPos { row, col })
    }
}

/// One full keycode mapping for the matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    name: String,
    keys: Vec<Keycode>,
    song: Option<Song>,
}

impl Layer {
    /// Build a layer from row-major keycodes
    pub fn new(name: &str, keys: Vec<Keycode>) -> Self {
        Self {
            name: name.to_string(),
            keys,
            song: None,
        }
    }

    /// Build a layer from a fixed grid
    pub fn from_grid<const ROWS: usize, const COLS: usize>(
        name: &str,
        grid: &[[Keycode; COLS]; ROWS],
    ) -> Self {
        Self::new(name, grid.iter().flatten().copied().collect())
    }

    /// Song to play when this layer becomes the default layer
    pub fn with_song(mut self, song: Song) -> Self {
        self.song = Some(song);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn song(&self) -> Option<Song> {
        self.song
    }

    pub fn keys(&self) -> &[Keycode] {
        &self.keys
    }
}

/// The ordered collection of layers for one keyboard.
///
/// Immutable once built; every control code in it names an existing layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    rows: u8,
    cols: u8,
    layers: Vec<Layer>,
    names: IndexMap<String, LayerId>,
    default_layer: LayerId,
    tri_layer: Option<TriLayer>,
}

impl Keymap {
    /// Validate and assemble a keymap. Layer ids follow vector order.
    pub fn new(rows: u8, cols: u8, layers: Vec<Layer>) -> Result<Self, KeymapError> {
        if rows == 0 || cols == 0 {
            return Err(KeymapError::EmptyMatrix);
        }
        if layers.is_empty() {
            return Err(KeymapError::NoLayers);
        }
        if layers.len() > MAX_LAYERS {
            return Err(KeymapError::TooManyLayers(layers.len()));
        }

        let expected = rows as usize * cols as usize;
        let mut names = IndexMap::new();
        for (index, layer) in layers.iter().enumerate() {
            if layer.keys.len() != expected {
                return Err(KeymapError::GridSize {
                    layer: layer.name.clone(),
                    rows,
                    cols,
                    expected,
                    found: layer.keys.len(),
                });
            }
            if names
                .insert(layer.name.clone(), LayerId(index as u8))
                .is_some()
            {
                return Err(KeymapError::DuplicateLayer(layer.name.clone()));
            }
        }

        let keymap = Self {
            rows,
            cols,
            layers,
            names,
            default_layer: LayerId(0),
            tri_layer: None,
        };
        keymap.check_control_targets()?;

        log::debug!(
            "keymap assembled: {}x{} matrix, {} layers",
            rows,
            cols,
            keymap.layers.len()
        );
        Ok(keymap)
    }

    /// Set the boot default layer (used when nothing valid is persisted)
    pub fn with_default_layer(mut self, id: LayerId) -> Result<Self, KeymapError> {
        if !self.contains_layer(id) {
            return Err(KeymapError::MissingDefault(id));
        }
        if let Some(tri) = self.tri_layer {
            if tri.adjust == id {
                return Err(KeymapError::TriLayerOnDefault(id));
            }
        }
        self.default_layer = id;
        Ok(self)
    }

    /// Attach the tri-layer rule.
    ///
    /// The adjust layer may not be the default layer, so pick the default
    /// with [`Keymap::with_default_layer`] first when it is not layer 0.
    pub fn with_tri_layer(mut self, tri: TriLayer) -> Result<Self, KeymapError> {
        for id in [tri.lower, tri.raise, tri.adjust] {
            if !self.contains_layer(id) {
                return Err(KeymapError::TriLayerMissing(id));
            }
        }
        if tri.lower == tri.raise || tri.lower == tri.adjust || tri.raise == tri.adjust {
            return Err(KeymapError::TriLayerOverlap);
        }
        if tri.adjust == self.default_layer {
            return Err(KeymapError::TriLayerOnDefault(tri.adjust));
        }
        self.tri_layer = Some(tri);
        Ok(self)
    }

    fn check_control_targets(&self) -> Result<(), KeymapError> {
        for layer in &self.layers {
            for (index, keycode) in layer.keys.iter().enumerate() {
                let target = keycode.control().and_then(|control| control.target_layer());
                if let Some(target) = target {
                    if !self.contains_layer(target) {
                        return Err(KeymapError::MissingTarget {
                            layer: layer.name.clone(),
                            pos: self.pos_of(index),
                            target,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn pos_of(&self, index: usize) -> KeyPos {
        KeyPos::new(
            (index / self.cols as usize) as u8,
            (index % self.cols as usize) as u8,
        )
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn default_layer(&self) -> LayerId {
        self.default_layer
    }

    pub fn tri_layer(&self) -> Option<TriLayer> {
        self.tri_layer
    }

    pub fn contains_layer(&self, id: LayerId) -> bool {
        id.index() < self.layers.len()
    }

    pub fn contains_pos(&self, pos: KeyPos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Row-major slot of a position, `None` outside the matrix
    pub fn key_index(&self, pos: KeyPos) -> Option<usize> {
        if self.contains_pos(pos) {
            Some(pos.row as usize * self.cols as usize + pos.col as usize)
        } else {
            None
        }
    }

    pub fn key_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.index())
    }

    /// Layer name, or the numeric id for unknown layers
    pub fn layer_name(&self, id: LayerId) -> String {
        self.layer(id)
            .map(|layer| layer.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn layer_by_name(&self, name: &str) -> Option<LayerId> {
        self.names.get(name).copied().or_else(|| {
            self.names
                .iter()
                .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
                .map(|(_, id)| *id)
        })
    }

    /// Iterate `(id, layer)` in id order
    pub fn layers(&self) -> impl Iterator<Item = (LayerId, &Layer)> {
        self.layers
            .iter()
            .enumerate()
            .map(|(index, layer)| (LayerId(index as u8), layer))
    }

    /// Keycode defined by one layer at one position.
    ///
    /// Returns [`Keycode::Undefined`] for positions outside the matrix or
    /// layers the keymap does not have.
    pub fn keycode_at(&self, id: LayerId, pos: KeyPos) -> Keycode {
        let Some(index) = self.key_index(pos) else {
            log::trace!("lookup outside the matrix at {}", pos);
            return Keycode::Undefined;
        };
        self.layer(id)
            .and_then(|layer| layer.keys.get(index))
            .copied()
            .unwrap_or(Keycode::Undefined)
    }

    /// Every position in row-major order
    pub fn positions(&self) -> impl Iterator<Item = KeyPos> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| KeyPos::new(row, col)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Control, Usage};

    fn two_by_two(name: &str, keys: [Keycode; 4]) -> Layer {
        Layer::new(name, keys.to_vec())
    }

    #[test]
    fn test_keypos_parse() {
        assert_eq!("3,1".parse::<KeyPos>().unwrap(), KeyPos::new(3, 1));
        assert_eq!("3 1".parse::<KeyPos>().unwrap(), KeyPos::new(3, 1));
        assert_eq!("(0, 11)".parse::<KeyPos>().unwrap(), KeyPos::new(0, 11));
        assert!("3".parse::<KeyPos>().is_err());
        assert!("3,1,2".parse::<KeyPos>().is_err());
        assert!("a,b".parse::<KeyPos>().is_err());
    }

    #[test]
    fn test_keycode_at_in_and_out_of_bounds() {
        let keymap = Keymap::new(
            2,
            2,
            vec![two_by_two(
                "BASE",
                [
                    Keycode::key(Usage::A),
                    Keycode::key(Usage::B),
                    Keycode::key(Usage::C),
                    Keycode::key(Usage::D),
                ],
            )],
        )
        .unwrap();

        assert_eq!(keymap.keycode_at(LayerId(0), KeyPos::new(1, 0)), Keycode::key(Usage::C));
        assert_eq!(keymap.keycode_at(LayerId(0), KeyPos::new(2, 0)), Keycode::Undefined);
        assert_eq!(keymap.keycode_at(LayerId(0), KeyPos::new(0, 9)), Keycode::Undefined);
        assert_eq!(keymap.keycode_at(LayerId(5), KeyPos::new(0, 0)), Keycode::Undefined);
    }

    #[test]
    fn test_keymap_rejects_bad_grids() {
        assert_eq!(Keymap::new(2, 2, vec![]), Err(KeymapError::NoLayers));
        assert_eq!(
            Keymap::new(0, 2, vec![two_by_two("X", [Keycode::NO; 4])]),
            Err(KeymapError::EmptyMatrix)
        );
        let short = Layer::new("SHORT", vec![Keycode::NO; 3]);
        assert!(matches!(
            Keymap::new(2, 2, vec![short]),
            Err(KeymapError::GridSize { found: 3, expected: 4, .. })
        ));
        let too_many = (0..33).map(|i| Layer::new(&format!("L{}", i), vec![Keycode::NO])).collect();
        assert_eq!(Keymap::new(1, 1, too_many), Err(KeymapError::TooManyLayers(33)));
    }

    #[test]
    fn test_keymap_rejects_duplicate_names() {
        let result = Keymap::new(
            2,
            2,
            vec![two_by_two("A", [Keycode::NO; 4]), two_by_two("A", [Keycode::NO; 4])],
        );
        assert_eq!(result, Err(KeymapError::DuplicateLayer("A".to_string())));
    }

    #[test]
    fn test_keymap_rejects_missing_control_target() {
        let result = Keymap::new(
            2,
            2,
            vec![two_by_two(
                "BASE",
                [Keycode::NO, Keycode::momentary(4), Keycode::NO, Keycode::NO],
            )],
        );
        assert_eq!(
            result,
            Err(KeymapError::MissingTarget {
                layer: "BASE".to_string(),
                pos: KeyPos::new(0, 1),
                target: LayerId(4),
            })
        );
    }

    #[test]
    fn test_keymap_tri_layer_validation() {
        let layers: Vec<Layer> = ["BASE", "LOWER", "RAISE", "ADJUST"]
            .iter()
            .map(|name| two_by_two(name, [Keycode::TRNS; 4]))
            .collect();
        let keymap = Keymap::new(2, 2, layers).unwrap();

        assert_eq!(
            keymap
                .clone()
                .with_tri_layer(TriLayer::new(LayerId(1), LayerId(1), LayerId(3))),
            Err(KeymapError::TriLayerOverlap)
        );
        assert_eq!(
            keymap
                .clone()
                .with_tri_layer(TriLayer::new(LayerId(1), LayerId(2), LayerId(7))),
            Err(KeymapError::TriLayerMissing(LayerId(7)))
        );
        assert_eq!(
            keymap
                .clone()
                .with_tri_layer(TriLayer::new(LayerId(1), LayerId(2), LayerId(0))),
            Err(KeymapError::TriLayerOnDefault(LayerId(0)))
        );
        let keymap = keymap
            .with_tri_layer(TriLayer::new(LayerId(1), LayerId(2), LayerId(3)))
            .unwrap();
        assert_eq!(
            keymap.clone().with_default_layer(LayerId(3)),
            Err(KeymapError::TriLayerOnDefault(LayerId(3)))
        );
        assert_eq!(keymap.tri_layer().map(|tri| tri.adjust), Some(LayerId(3)));
    }

    #[test]
    fn test_keymap_adjust_at_layer_zero_once_default_moves() {
        let layers: Vec<Layer> = ["ADJUST", "BASE", "LOWER", "RAISE"]
            .iter()
            .map(|name| two_by_two(name, [Keycode::TRNS; 4]))
            .collect();
        let keymap = Keymap::new(2, 2, layers)
            .unwrap()
            .with_default_layer(LayerId(1))
            .unwrap()
            .with_tri_layer(TriLayer::new(LayerId(2), LayerId(3), LayerId(0)))
            .unwrap();
        assert_eq!(keymap.default_layer(), LayerId(1));
        assert_eq!(keymap.tri_layer().map(|tri| tri.adjust), Some(LayerId(0)));
    }

    #[test]
    fn test_key_index() {
        let keymap = Keymap::new(2, 2, vec![two_by_two("BASE", [Keycode::NO; 4])]).unwrap();
        assert_eq!(keymap.key_count(), 4);
        assert_eq!(keymap.key_index(KeyPos::new(0, 0)), Some(0));
        assert_eq!(keymap.key_index(KeyPos::new(1, 0)), Some(2));
        assert_eq!(keymap.key_index(KeyPos::new(0, 2)), None);
    }

    #[test]
    fn test_keymap_names() {
        let keymap = Keymap::new(
            2,
            2,
            vec![
                two_by_two("QWERTY", [Keycode::NO; 4]),
                two_by_two("LOWER", [Keycode::TRNS; 4]),
            ],
        )
        .unwrap();
        assert_eq!(keymap.layer_by_name("LOWER"), Some(LayerId(1)));
        assert_eq!(keymap.layer_by_name("lower"), Some(LayerId(1)));
        assert_eq!(keymap.layer_by_name("RAISE"), None);
        assert_eq!(keymap.layer_name(LayerId(0)), "QWERTY");
        assert_eq!(keymap.layer_name(LayerId(9)), "9");
        assert_eq!(keymap.positions().count(), 4);
        assert_eq!(
            keymap.keycode_at(LayerId(1), KeyPos::new(0, 0)).control(),
            None::<Control>
        );
    }
}
