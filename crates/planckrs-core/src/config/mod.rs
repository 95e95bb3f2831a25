// Planckrs Config API
// Keycode expressions and TOML keymap files

pub mod keycode_parser;
pub mod parser;

pub use keycode_parser::{parse_keycode, KeycodeContext, KeycodeParseError};
pub use parser::{
    load_keymap_path, load_keymap_toml, ConfigError, KeymapToml, LayerToml, MatrixConfig,
    TriLayerConfig,
};
