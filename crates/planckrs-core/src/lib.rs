// Planckrs Core Library
// Layer resolution and layer-control dispatch for a Planck-style keyboard

pub mod action;
pub mod config;
pub mod dispatch;
pub mod keycode;
pub mod keymap;
pub mod layer;
pub mod modifier;
pub mod render;
pub mod resolve;
pub mod settings;
pub mod storage;
pub mod tone;
pub mod usage;

pub use action::KeyAction;
pub use config::{
    load_keymap_path, load_keymap_toml, parse_keycode, ConfigError, KeycodeContext,
    KeycodeParseError,
};
pub use dispatch::{DispatchResult, Dispatcher};
pub use keycode::{Control, Keycode};
pub use keymap::planck::planck_default;
pub use keymap::{KeyPos, Keymap, KeymapError, Layer};
pub use layer::{update_tri_layer, LayerId, LayerMask, LayerState, TriLayer};
pub use modifier::Mods;
pub use render::{render_active, render_layer};
pub use resolve::{effective_keycode, resolve, Resolution};
pub use settings::{Settings, SettingsError};
pub use storage::{DefaultLayerStore, FileStore, MemoryStore, StorageError};
pub use tone::{ChannelTone, NoTone, Song, ToneCommand, ToneSink};
pub use usage::Usage;
