// Planckrs HID Usage Table
// Keyboard/keypad page codes plus the media keys the Planck keymap emits

use std::str::FromStr;

use strum_macros::{Display, EnumIter, EnumString, FromRepr, IntoStaticStr};

/// A single HID usage emitted for a literal keycode.
///
/// Discriminants follow the QMK basic keycode space: the keyboard/keypad
/// usage page for everything below `0xA5`, the QMK system/consumer block
/// for the media keys, and `0xE0..=0xE7` for the modifier keys.
/// `Display` yields the canonical short name (`GRV`, `BSPC`, `KP_7`);
/// parsing accepts the long aliases too, case-insensitively.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    FromRepr,
)]
#[strum(ascii_case_insensitive)]
#[repr(u8)]
pub enum Usage {
    A = 0x04,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    #[strum(to_string = "1")]
    N1,
    #[strum(to_string = "2")]
    N2,
    #[strum(to_string = "3")]
    N3,
    #[strum(to_string = "4")]
    N4,
    #[strum(to_string = "5")]
    N5,
    #[strum(to_string = "6")]
    N6,
    #[strum(to_string = "7")]
    N7,
    #[strum(to_string = "8")]
    N8,
    #[strum(to_string = "9")]
    N9,
    #[strum(to_string = "0")]
    N0,
    #[strum(to_string = "ENT", serialize = "ENTER")]
    Enter,
    #[strum(to_string = "ESC", serialize = "ESCAPE")]
    Escape,
    #[strum(to_string = "BSPC", serialize = "BACKSPACE")]
    Backspace,
    #[strum(to_string = "TAB")]
    Tab,
    #[strum(to_string = "SPC", serialize = "SPACE")]
    Space,
    #[strum(to_string = "MINS", serialize = "MINUS")]
    Minus,
    #[strum(to_string = "EQL", serialize = "EQUAL")]
    Equal,
    #[strum(to_string = "LBRC", serialize = "LBRACKET")]
    LeftBracket,
    #[strum(to_string = "RBRC", serialize = "RBRACKET")]
    RightBracket,
    #[strum(to_string = "BSLS", serialize = "BSLASH", serialize = "BACKSLASH")]
    Backslash,
    #[strum(to_string = "NUHS", serialize = "NONUS_HASH")]
    NonUsHash,
    #[strum(to_string = "SCLN", serialize = "SCOLON", serialize = "SEMICOLON")]
    Semicolon,
    #[strum(to_string = "QUOT", serialize = "QUOTE")]
    Quote,
    #[strum(to_string = "GRV", serialize = "GRAVE")]
    Grave,
    #[strum(to_string = "COMM", serialize = "COMMA")]
    Comma,
    #[strum(to_string = "DOT")]
    Dot,
    #[strum(to_string = "SLSH", serialize = "SLASH")]
    Slash,
    #[strum(to_string = "CAPS", serialize = "CAPSLOCK")]
    CapsLock,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    #[strum(to_string = "PSCR", serialize = "PSCREEN")]
    PrintScreen,
    #[strum(to_string = "SLCK", serialize = "SCROLLLOCK")]
    ScrollLock,
    #[strum(to_string = "PAUS", serialize = "PAUSE")]
    Pause,
    #[strum(to_string = "INS", serialize = "INSERT")]
    Insert,
    #[strum(to_string = "HOME")]
    Home,
    #[strum(to_string = "PGUP")]
    PageUp,
    #[strum(to_string = "DEL", serialize = "DELETE")]
    Delete,
    #[strum(to_string = "END")]
    End,
    #[strum(to_string = "PGDN")]
    PageDown,
    #[strum(to_string = "RGHT", serialize = "RIGHT")]
    Right,
    #[strum(to_string = "LEFT")]
    Left,
    #[strum(to_string = "DOWN")]
    Down,
    #[strum(to_string = "UP")]
    Up,
    #[strum(to_string = "NLCK", serialize = "NUMLOCK")]
    NumLock,
    #[strum(to_string = "KP_SLSH", serialize = "PSLS", serialize = "KP_SLASH")]
    KpSlash,
    #[strum(to_string = "KP_ASTR", serialize = "PAST", serialize = "KP_ASTERISK")]
    KpAsterisk,
    #[strum(to_string = "KP_MINS", serialize = "PMNS", serialize = "KP_MINUS")]
    KpMinus,
    #[strum(to_string = "KP_PLUS", serialize = "PPLS")]
    KpPlus,
    #[strum(to_string = "KP_ENT", serialize = "PENT", serialize = "KP_ENTER")]
    KpEnter,
    #[strum(to_string = "KP_1", serialize = "P1")]
    Kp1,
    #[strum(to_string = "KP_2", serialize = "P2")]
    Kp2,
    #[strum(to_string = "KP_3", serialize = "P3")]
    Kp3,
    #[strum(to_string = "KP_4", serialize = "P4")]
    Kp4,
    #[strum(to_string = "KP_5", serialize = "P5")]
    Kp5,
    #[strum(to_string = "KP_6", serialize = "P6")]
    Kp6,
    #[strum(to_string = "KP_7", serialize = "P7")]
    Kp7,
    #[strum(to_string = "KP_8", serialize = "P8")]
    Kp8,
    #[strum(to_string = "KP_9", serialize = "P9")]
    Kp9,
    #[strum(to_string = "KP_0", serialize = "P0")]
    Kp0,
    #[strum(to_string = "KP_DOT", serialize = "PDOT")]
    KpDot,
    #[strum(to_string = "APP", serialize = "APPLICATION")]
    Application = 0x65,
    #[strum(to_string = "MUTE", serialize = "AUDIO_MUTE")]
    AudioMute = 0xA8,
    #[strum(to_string = "VOLU", serialize = "AUDIO_VOL_UP")]
    VolumeUp,
    #[strum(to_string = "VOLD", serialize = "AUDIO_VOL_DOWN")]
    VolumeDown,
    #[strum(to_string = "MNXT", serialize = "MEDIA_NEXT_TRACK")]
    MediaNext,
    #[strum(to_string = "MPRV", serialize = "MEDIA_PREV_TRACK")]
    MediaPrev,
    #[strum(to_string = "MSTP", serialize = "MEDIA_STOP")]
    MediaStop,
    #[strum(to_string = "MPLY", serialize = "MEDIA_PLAY_PAUSE")]
    MediaPlay,
    #[strum(to_string = "LCTL", serialize = "LCTRL")]
    LeftCtrl = 0xE0,
    #[strum(to_string = "LSFT", serialize = "LSHIFT")]
    LeftShift,
    #[strum(to_string = "LALT")]
    LeftAlt,
    #[strum(to_string = "LGUI")]
    LeftGui,
    #[strum(to_string = "RCTL", serialize = "RCTRL")]
    RightCtrl,
    #[strum(to_string = "RSFT", serialize = "RSHIFT")]
    RightShift,
    #[strum(to_string = "RALT")]
    RightAlt,
    #[strum(to_string = "RGUI")]
    RightGui,
}

impl Usage {
    /// Get the raw usage code
    pub fn code(self) -> u8 {
        self as u8
    }

    /// True for the eight modifier keys (`0xE0..=0xE7`)
    pub fn is_modifier(self) -> bool {
        self.code() >= 0xE0
    }

    /// True for the media keys that travel on the consumer report
    pub fn is_media(self) -> bool {
        (0xA5..0xE0).contains(&self.code())
    }

    /// Look a usage up by name, accepting an optional `KC_` prefix
    pub fn from_name(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        let bare = match trimmed.get(..3) {
            Some(prefix) if prefix.eq_ignore_ascii_case("KC_") => &trimmed[3..],
            _ => trimmed,
        };
        Usage::from_str(bare).ok()
    }
}

impl From<Usage> for u8 {
    fn from(usage: Usage) -> Self {
        usage.code()
    }
}
