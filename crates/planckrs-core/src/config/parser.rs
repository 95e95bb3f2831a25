// Planckrs Config Parser - TOML with Serde
// Parses keymap definitions from TOML files

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::keymap::{Keymap, KeymapError, Layer};
use crate::layer::{LayerId, TriLayer, MAX_LAYERS};
use crate::tone::Song;

use super::keycode_parser::{parse_keycode, KeycodeContext, KeycodeParseError};

/// Keymap file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("layer '{layer}' key ({row},{col}): {source}")]
    Keycode {
        layer: String,
        row: usize,
        col: usize,
        #[source]
        source: KeycodeParseError,
    },

    #[error("layer '{layer}' row {row} has {found} keys, expected {expected}")]
    RowLength {
        layer: String,
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("layer '{layer}' has {found} rows, expected {expected}")]
    RowCount {
        layer: String,
        found: usize,
        expected: usize,
    },

    #[error("unknown layer '{0}'")]
    UnknownLayer(String),

    #[error("layer '{layer}' names unknown song '{song}'")]
    UnknownSong { layer: String, song: String },

    #[error(transparent)]
    Keymap(#[from] KeymapError),
}

/// Root table of a keymap file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeymapToml {
    /// Boot default layer, by name or index (first layer when absent)
    #[serde(default)]
    pub default_layer: Option<String>,

    pub matrix: MatrixConfig,

    #[serde(default)]
    pub tri_layer: Option<TriLayerConfig>,

    /// Short names that expand to keycode expressions
    #[serde(default)]
    pub aliases: HashMap<String, String>,

    #[serde(default, rename = "layer")]
    pub layers: Vec<LayerToml>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatrixConfig {
    pub rows: u8,
    pub cols: u8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriLayerConfig {
    pub lower: String,
    pub raise: String,
    pub adjust: String,
}

/// One `[[layer]]` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerToml {
    pub name: String,

    /// Song played when this layer becomes the default layer
    #[serde(default)]
    pub song: Option<String>,

    /// Keycode expressions, one inner array per matrix row
    pub keys: Vec<Vec<String>>,
}

impl KeymapToml {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Resolve names and keycodes into a validated [`Keymap`].
    ///
    /// Every layer name is registered before any keycode is parsed, so a
    /// control may refer to a layer declared further down the file.
    pub fn build(&self) -> Result<Keymap, ConfigError> {
        let mut ctx = KeycodeContext::new();
        for (index, layer) in self.layers.iter().take(MAX_LAYERS).enumerate() {
            ctx.add_layer(&layer.name, LayerId(index as u8));
        }
        for (name, expansion) in &self.aliases {
            ctx.add_alias(name, expansion);
        }

        let rows = self.matrix.rows as usize;
        let cols = self.matrix.cols as usize;

        let mut layers = Vec::with_capacity(self.layers.len());
        for entry in &self.layers {
            if entry.keys.len() != rows {
                return Err(ConfigError::RowCount {
                    layer: entry.name.clone(),
                    found: entry.keys.len(),
                    expected: rows,
                });
            }

            let mut keys = Vec::with_capacity(rows * cols);
            for (row, row_keys) in entry.keys.iter().enumerate() {
                if row_keys.len() != cols {
                    return Err(ConfigError::RowLength {
                        layer: entry.name.clone(),
                        row,
                        found: row_keys.len(),
                        expected: cols,
                    });
                }
                for (col, expr) in row_keys.iter().enumerate() {
                    let keycode =
                        parse_keycode(expr, &ctx).map_err(|source| ConfigError::Keycode {
                            layer: entry.name.clone(),
                            row,
                            col,
                            source,
                        })?;
                    keys.push(keycode);
                }
            }

            let mut layer = Layer::new(&entry.name, keys);
            if let Some(song) = &entry.song {
                let song = Song::from_str(song).map_err(|_| ConfigError::UnknownSong {
                    layer: entry.name.clone(),
                    song: song.clone(),
                })?;
                layer = layer.with_song(song);
            }
            layers.push(layer);
        }

        let mut keymap = Keymap::new(self.matrix.rows, self.matrix.cols, layers)?;

        // with_tri_layer checks adjust against the default, so the file's default goes in first
        if let Some(name) = &self.default_layer {
            let id = ctx
                .layer(name)
                .ok_or_else(|| ConfigError::UnknownLayer(name.clone()))?;
            keymap = keymap.with_default_layer(id)?;
        }

        if let Some(tri) = &self.tri_layer {
            let lookup = |name: &str| {
                ctx.layer(name)
                    .ok_or_else(|| ConfigError::UnknownLayer(name.to_string()))
            };
            keymap = keymap.with_tri_layer(TriLayer::new(
                lookup(&tri.lower)?,
                lookup(&tri.raise)?,
                lookup(&tri.adjust)?,
            ))?;
        }

        log::debug!(
            "loaded keymap with {} layers, default {}",
            keymap.layer_count(),
            keymap.layer_name(keymap.default_layer())
        );
        Ok(keymap)
    }
}

/// Parse and validate a keymap from TOML text
pub fn load_keymap_toml(content: &str) -> Result<Keymap, ConfigError> {
    KeymapToml::from_toml(content)?.build()
}

/// Parse and validate a keymap file
pub fn load_keymap_path<P: AsRef<Path>>(path: P) -> Result<Keymap, ConfigError> {
    KeymapToml::from_file(path)?.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::KeyPos;
    use crate::{Control, Keycode, Usage};

    const SMALL: &str = r#"
default_layer = "BASE"

[matrix]
rows = 1
cols = 3

[tri_layer]
lower = "FN1"
raise = "FN2"
adjust = "BOTH"

[aliases]
FN1 = "MO(FN1)"

[[layer]]
name = "BASE"
song = "qwerty"
keys = [["FN1", "MO(FN2)", "A"]]

[[layer]]
name = "FN1"
keys = [["_______", "_______", "EXLM"]]

[[layer]]
name = "FN2"
keys = [["_______", "_______", "KC_1"]]

[[layer]]
name = "BOTH"
keys = [["XXXXXXX", "XXXXXXX", "TG(BOTH)"]]
"#;

    #[test]
    fn test_load_small_keymap() {
        let keymap = load_keymap_toml(SMALL).unwrap();
        assert_eq!(keymap.layer_count(), 4);
        assert_eq!(keymap.default_layer(), LayerId(0));
        assert_eq!(
            keymap.tri_layer(),
            Some(TriLayer::new(LayerId(1), LayerId(2), LayerId(3)))
        );
        assert_eq!(
            keymap.keycode_at(LayerId(0), KeyPos::new(0, 0)),
            Keycode::Control(Control::Momentary(LayerId(1)))
        );
        assert_eq!(
            keymap.keycode_at(LayerId(1), KeyPos::new(0, 2)),
            Keycode::shifted(Usage::N1)
        );
        assert_eq!(
            keymap.keycode_at(LayerId(3), KeyPos::new(0, 2)),
            Keycode::Control(Control::Toggle(LayerId(3)))
        );
        assert_eq!(keymap.layer(LayerId(0)).and_then(|l| l.song()), Some(Song::Qwerty));
    }

    #[test]
    fn test_adjust_layer_may_come_first() {
        let content = r#"
default_layer = "BASE"

[matrix]
rows = 1
cols = 1

[tri_layer]
lower = "LOWER"
raise = "RAISE"
adjust = "ADJUST"

[[layer]]
name = "ADJUST"
keys = [["B"]]

[[layer]]
name = "BASE"
keys = [["A"]]

[[layer]]
name = "LOWER"
keys = [["_______"]]

[[layer]]
name = "RAISE"
keys = [["_______"]]
"#;
        let keymap = load_keymap_toml(content).unwrap();
        assert_eq!(keymap.default_layer(), LayerId(1));
        assert_eq!(
            keymap.tri_layer(),
            Some(TriLayer::new(LayerId(2), LayerId(3), LayerId(0)))
        );

        let adjust_as_default =
            content.replace("default_layer = \"BASE\"", "default_layer = \"ADJUST\"");
        assert!(matches!(
            load_keymap_toml(&adjust_as_default),
            Err(ConfigError::Keymap(KeymapError::TriLayerOnDefault(LayerId(0))))
        ));
    }

    #[test]
    fn test_forward_layer_reference() {
        let content = r#"
[matrix]
rows = 1
cols = 1

[[layer]]
name = "BASE"
keys = [["DF(LATER)"]]

[[layer]]
name = "LATER"
keys = [["DF(BASE)"]]
"#;
        let keymap = load_keymap_toml(content).unwrap();
        assert_eq!(
            keymap.keycode_at(LayerId(0), KeyPos::new(0, 0)),
            Keycode::Control(Control::SetDefault(LayerId(1)))
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let content = r#"
[matrix]
rows = 1
cols = 1
diodes = "col2row"
"#;
        assert!(matches!(
            load_keymap_toml(content),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_bad_keycode_reports_position() {
        let content = r#"
[matrix]
rows = 1
cols = 2

[[layer]]
name = "BASE"
keys = [["A", "WAT"]]
"#;
        match load_keymap_toml(content) {
            Err(ConfigError::Keycode { layer, row, col, source }) => {
                assert_eq!(layer, "BASE");
                assert_eq!((row, col), (0, 1));
                assert_eq!(source, KeycodeParseError::UnknownKey("WAT".to_string()));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_row_shape_checked() {
        let short_row = r#"
[matrix]
rows = 1
cols = 2

[[layer]]
name = "BASE"
keys = [["A"]]
"#;
        assert!(matches!(
            load_keymap_toml(short_row),
            Err(ConfigError::RowLength { found: 1, expected: 2, .. })
        ));

        let extra_row = r#"
[matrix]
rows = 1
cols = 1

[[layer]]
name = "BASE"
keys = [["A"], ["B"]]
"#;
        assert!(matches!(
            load_keymap_toml(extra_row),
            Err(ConfigError::RowCount { found: 2, expected: 1, .. })
        ));
    }

    #[test]
    fn test_unknown_song_and_layer() {
        let bad_song = r#"
[matrix]
rows = 1
cols = 1

[[layer]]
name = "BASE"
song = "polka"
keys = [["A"]]
"#;
        assert!(matches!(
            load_keymap_toml(bad_song),
            Err(ConfigError::UnknownSong { .. })
        ));

        let bad_default = r#"
default_layer = "NOPE"

[matrix]
rows = 1
cols = 1

[[layer]]
name = "BASE"
keys = [["A"]]
"#;
        assert!(matches!(
            load_keymap_toml(bad_default),
            Err(ConfigError::UnknownLayer(ref name)) if name == "NOPE"
        ));
    }

    #[test]
    fn test_keymap_validation_surfaces() {
        let content = r#"
[matrix]
rows = 1
cols = 1

[[layer]]
name = "BASE"
keys = [["MO(5)"]]
"#;
        assert!(matches!(
            load_keymap_toml(content),
            Err(ConfigError::Keymap(KeymapError::MissingTarget { .. }))
        ));

        let no_layers = "[matrix]\nrows = 1\ncols = 1\n";
        assert!(matches!(
            load_keymap_toml(no_layers),
            Err(ConfigError::Keymap(KeymapError::NoLayers))
        ));
    }
}
