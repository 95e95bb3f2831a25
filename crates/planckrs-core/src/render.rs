// Planckrs Layer Renderer
// Box diagrams of a layer grid, in the style of keymap source comments
//
// ,-----------------------------------------------------------------------------------.
// |   `  |   Q  |   W  |   E  |   R  |   T  |   Y  |   U  |   I  |   O  |   P  | Bksp |
// |------+------+------+------+------+------+------+------+------+------+------+------|
// ...
// `-----------------------------------------------------------------------------------'

use crate::keymap::{KeyPos, Keymap};
use crate::layer::{LayerId, LayerMask};
use crate::resolve::effective_keycode;
use crate::{Control, Keycode, Mods, Usage};

const CELL: usize = 6;

/// Draw one layer as defined, transparent keys left blank
pub fn render_layer(keymap: &Keymap, id: LayerId) -> String {
    draw(keymap, |pos| keymap.keycode_at(id, pos))
}

/// Draw what every key produces under `mask`
pub fn render_active(keymap: &Keymap, mask: LayerMask) -> String {
    draw(keymap, |pos| effective_keycode(keymap, mask, pos))
}

/// Short label for one keycode, at most six characters
pub fn key_label(keymap: &Keymap, keycode: Keycode) -> String {
    let label = match keycode {
        Keycode::Transparent => String::new(),
        Keycode::NoOp => "--".to_string(),
        Keycode::Undefined => "?".to_string(),
        Keycode::Output(usage) => usage_label(usage),
        Keycode::Modified { mods, usage } if mods == Mods::LSFT => shifted_label(usage),
        Keycode::Modified { .. } => keycode.to_string(),
        Keycode::Repeat { usage, count } => usage_label(usage).repeat(count as usize),
        Keycode::Control(Control::Reserved(code)) => format!("U{}", code),
        Keycode::Control(control) => match control.target_layer() {
            Some(id) => title_case(&keymap.layer_name(id)),
            None => control.to_string(),
        },
    };
    label.chars().take(CELL).collect()
}

fn draw(keymap: &Keymap, keycode_at: impl Fn(KeyPos) -> Keycode) -> String {
    let cols = keymap.cols() as usize;
    let inner = cols * (CELL + 1) - 1;
    let mut out = String::new();

    out.push_str(&format!(",{}.\n", "-".repeat(inner)));
    for row in 0..keymap.rows() {
        if row > 0 {
            out.push_str(&format!("|{}|\n", vec!["-".repeat(CELL); cols].join("+")));
        }
        out.push('|');
        for col in 0..keymap.cols() {
            let label = key_label(keymap, keycode_at(KeyPos::new(row, col)));
            out.push_str(&center(&label));
            out.push('|');
        }
        out.push('\n');
    }
    out.push_str(&format!("`{}'\n", "-".repeat(inner)));
    out
}

// Single glyphs sit in the fourth column ("   Q  "); longer labels lean left
fn center(label: &str) -> String {
    let len = label.chars().count();
    let left = if len == 1 { 3 } else { (CELL - len) / 2 };
    let right = CELL - len - left;
    format!("{}{}{}", " ".repeat(left), label, " ".repeat(right))
}

fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

fn usage_label(usage: Usage) -> String {
    use Usage::*;

    let label = match usage {
        N1 | Kp1 => "1",
        N2 | Kp2 => "2",
        N3 | Kp3 => "3",
        N4 | Kp4 => "4",
        N5 | Kp5 => "5",
        N6 | Kp6 => "6",
        N7 | Kp7 => "7",
        N8 | Kp8 => "8",
        N9 | Kp9 => "9",
        N0 | Kp0 => "0",
        Enter | KpEnter => "Enter",
        Escape => "Esc",
        Backspace => "Bksp",
        Tab => "Tab",
        Space => "Space",
        Minus | KpMinus => "-",
        Equal => "=",
        LeftBracket => "[",
        RightBracket => "]",
        Backslash => "\\",
        Semicolon => ";",
        Quote => "'",
        Grave => "`",
        Comma => ",",
        Dot | KpDot => ".",
        Slash | KpSlash => "/",
        KpAsterisk => "*",
        KpPlus => "+",
        PrintScreen => "PrtSc",
        Pause => "Pause",
        Delete => "Del",
        PageUp => "PgUp",
        PageDown => "PgDn",
        NumLock => "NumLck",
        Left => "Left",
        Right => "Right",
        Up => "Up",
        Down => "Down",
        Home => "Home",
        End => "End",
        VolumeUp => "Vol+",
        VolumeDown => "Vol-",
        MediaNext => "Next",
        MediaPrev => "Prev",
        MediaStop => "Stop",
        MediaPlay => "Play",
        LeftCtrl | RightCtrl => "Ctrl",
        LeftShift | RightShift => "Shift",
        LeftAlt | RightAlt => "Alt",
        LeftGui | RightGui => "GUI",
        other => return other.to_string(),
    };
    label.to_string()
}

// US layout symbols produced with shift held
fn shifted_label(usage: Usage) -> String {
    use Usage::*;

    let label = match usage {
        Grave => "~",
        N1 => "!",
        N2 => "@",
        N3 => "#",
        N4 => "$",
        N5 => "%",
        N6 => "^",
        N7 => "&",
        N8 => "*",
        N9 => "(",
        N0 => ")",
        Minus => "_",
        Equal => "+",
        LeftBracket => "{",
        RightBracket => "}",
        Backslash => "|",
        Semicolon => ":",
        Quote => "\"",
        Comma => "<",
        Dot => ">",
        Slash => "?",
        other => return format!("S-{}", usage_label(other)),
    };
    label.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::planck::{planck_default, LOWER, NUMBER, QWERTY, RAISE};

    #[test]
    fn test_render_qwerty_matches_source_diagram() {
        let keymap = planck_default().unwrap();
        let diagram = render_layer(&keymap, QWERTY);
        let lines: Vec<&str> = diagram.lines().collect();

        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0].len(), 85);
        assert!(lines[0].starts_with(",---") && lines[0].ends_with("---."));
        assert_eq!(
            lines[1],
            "|   `  |   Q  |   W  |   E  |   R  |   T  |   Y  |   U  |   I  |   O  |   P  | Bksp |"
        );
        assert_eq!(
            lines[2],
            "|------+------+------+------+------+------+------+------+------+------+------+------|"
        );
        assert_eq!(
            lines[7],
            "| Ctrl |Number| GUI  | Alt  |Lower | Esc  |Space |Raise | Left | Down |  Up  |Right |"
        );
        assert!(lines[8].starts_with('`') && lines[8].ends_with('\''));
    }

    #[test]
    fn test_render_lower_shows_shifted_symbols_and_blanks() {
        let keymap = planck_default().unwrap();
        let diagram = render_layer(&keymap, LOWER);
        let lines: Vec<&str> = diagram.lines().collect();
        assert!(lines[1].starts_with("|   ~  |   !  |   @  |"));
        assert!(lines[7].starts_with("| Ctrl |      | GUI  |"));
    }

    #[test]
    fn test_render_active_falls_through() {
        let keymap = planck_default().unwrap();
        let mask = LayerMask::single(QWERTY).with(RAISE);
        let diagram = render_active(&keymap, mask);
        let lines: Vec<&str> = diagram.lines().collect();
        // RAISE's thumb keys are transparent, so QWERTY's controls show through
        assert!(lines[7].contains("|Lower |"));
        assert!(lines[1].starts_with("|   `  |   1  |   2  |"));
    }

    #[test]
    fn test_key_labels() {
        let keymap = planck_default().unwrap();
        assert_eq!(
            key_label(&keymap, Keycode::Repeat { usage: Usage::Kp0, count: 2 }),
            "00"
        );
        assert_eq!(key_label(&keymap, Keycode::toggle(NUMBER.0)), "Number");
        assert_eq!(key_label(&keymap, Keycode::Transparent), "");
        assert_eq!(key_label(&keymap, Keycode::NoOp), "--");
        assert_eq!(key_label(&keymap, Keycode::key(Usage::F11)), "F11");
    }

    #[test]
    fn test_center() {
        assert_eq!(center("Q"), "   Q  ");
        assert_eq!(center("Bksp"), " Bksp ");
        assert_eq!(center("Ctrl"), " Ctrl ");
        assert_eq!(center("GUI"), " GUI  ");
        assert_eq!(center("Number"), "Number");
        assert_eq!(center(""), "      ");
    }
}
