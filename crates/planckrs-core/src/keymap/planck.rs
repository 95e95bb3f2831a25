// Planckrs Stock Planck Keymap
// The 4x12 default layout: QWERTY base, LOWER/RAISE overlays, NUMBER tri-layer

use crate::layer::{LayerId, TriLayer};
use crate::tone::Song;
use crate::Keycode;
use crate::Usage::*;

use super::{Keymap, KeymapError, Layer};

pub const ROWS: usize = 4;
pub const COLS: usize = 12;

pub const QWERTY: LayerId = LayerId(0);
pub const LOWER: LayerId = LayerId(1);
pub const RAISE: LayerId = LayerId(2);
pub const NUMBER: LayerId = LayerId(3);

const ___: Keycode = Keycode::Transparent;
const MO_LOWER: Keycode = Keycode::momentary(LOWER.0);
const MO_RAISE: Keycode = Keycode::momentary(RAISE.0);
const MO_NUMBER: Keycode = Keycode::momentary(NUMBER.0);
const TG_NUMBER: Keycode = Keycode::toggle(NUMBER.0);
const KP_00: Keycode = Keycode::Repeat { usage: Kp0, count: 2 };

const fn k(usage: crate::Usage) -> Keycode {
    Keycode::key(usage)
}

const fn s(usage: crate::Usage) -> Keycode {
    Keycode::shifted(usage)
}

/* Qwerty
 * ,-----------------------------------------------------------------------------------.
 * |   `  |   Q  |   W  |   E  |   R  |   T  |   Y  |   U  |   I  |   O  |   P  | Bksp |
 * |------+------+------+------+------+-------------+------+------+------+------+------|
 * | Tab  |   A  |   S  |   D  |   F  |   G  |   H  |   J  |   K  |   L  |   ;  |  "   |
 * |------+------+------+------+------+------|------+------+------+------+------+------|
 * | Shift|   Z  |   X  |   C  |   V  |   B  |   N  |   M  |   ,  |   .  |   /  |Enter |
 * |------+------+------+------+------+------+------+------+------+------+------+------|
 * | Ctrl |Number| GUI  | Alt  |Lower | Esc  |Space |Raise | Left | Down |  Up  |Right |
 * `-----------------------------------------------------------------------------------'
 */
#[rustfmt::skip]
const QWERTY_GRID: [[Keycode; COLS]; ROWS] = [
    [k(Grave),    k(Q),      k(W),       k(E),      k(R),     k(T),      k(Y),     k(U),     k(I),     k(O),   k(P),         k(Backspace)],
    [k(Tab),      k(A),      k(S),       k(D),      k(F),     k(G),      k(H),     k(J),     k(K),     k(L),   k(Semicolon), k(Quote)],
    [k(LeftShift),k(Z),      k(X),       k(C),      k(V),     k(B),      k(N),     k(M),     k(Comma), k(Dot), k(Slash),     k(Enter)],
    [k(LeftCtrl), MO_NUMBER, k(LeftGui), k(LeftAlt), MO_LOWER, k(Escape), k(Space), MO_RAISE, k(Left),  k(Down), k(Up),       k(Right)],
];

/* Lower
 * ,-----------------------------------------------------------------------------------.
 * |   ~  |   !  |   @  |   #  |   $  |   %  |   ^  |   &  |   *  |   (  |   )  | Del  |
 * |------+------+------+------+------+-------------+------+------+------+------+------|
 * | Tab  |  F1  |  F2  |  F3  |  F4  |  F5  |  F6  |PrtSc |      |   {  |   }  |  |   |
 * |------+------+------+------+------+------|------+------+------+------+------+------|
 * |      |  F7  |  F8  |  F9  |  F10 |  F11 |  F12 |Pause | Stop |   _  |   +  | Play |
 * |------+------+------+------+------+------+------+------+------+------+------+------|
 * | Ctrl |      | GUI  | Alt  |      | Esc  |Space |      | Prev | Vol- | Vol+ | Next |
 * `-----------------------------------------------------------------------------------'
 */
#[rustfmt::skip]
const LOWER_GRID: [[Keycode; COLS]; ROWS] = [
    [s(Grave),    s(N1), s(N2),      s(N3),      s(N4),  s(N5),     s(N6),    s(N7),       s(N8),        s(N9),           s(N0),            k(Delete)],
    [k(Tab),      k(F1), k(F2),      k(F3),      k(F4),  k(F5),     k(F6),    k(PrintScreen), ___,        s(LeftBracket),  s(RightBracket),  s(Backslash)],
    [___,         k(F7), k(F8),      k(F9),      k(F10), k(F11),    k(F12),   k(Pause),    k(MediaStop), s(Minus),        s(Equal),         k(MediaPlay)],
    [k(LeftCtrl), ___,   k(LeftGui), k(LeftAlt), ___,    k(Escape), k(Space), ___,         k(MediaPrev), k(VolumeDown),   k(VolumeUp),      k(MediaNext)],
];

/* Raise
 * ,-----------------------------------------------------------------------------------.
 * |   `  |   1  |   2  |   3  |   4  |   5  |   6  |   7  |   8  |   9  |   0  | Bksp |
 * |------+------+------+------+------+-------------+------+------+------+------+------|
 * | Tab  |      |  Up  |      |      |      |      |  Up  |      |   [  |   ]  |  \   |
 * |------+------+------+------+------+------|------+------+------+------+------+------|
 * |      | Left | Down |Right |      |      | Left | Down |Right |   -  |   =  |Enter |
 * |------+------+------+------+------+------+------+------+------+------+------+------|
 * | Ctrl |      | GUI  | Alt  |      | Esc  |Space |      | Home | PgUp | PgDn | End  |
 * `-----------------------------------------------------------------------------------'
 */
#[rustfmt::skip]
const RAISE_GRID: [[Keycode; COLS]; ROWS] = [
    [k(Grave),    k(N1),   k(N2),      k(N3),      k(N4), k(N5),     k(N6),    k(N7),   k(N8),    k(N9),          k(N0),           k(Backspace)],
    [k(Tab),      ___,     k(Up),      ___,        ___,   ___,       ___,      k(Up),   ___,      k(LeftBracket), k(RightBracket), k(Backslash)],
    [___,         k(Left), k(Down),    k(Right),   ___,   ___,       k(Left),  k(Down), k(Right), k(Minus),       k(Equal),        k(Enter)],
    [k(LeftCtrl), ___,     k(LeftGui), k(LeftAlt), ___,   k(Escape), k(Space), ___,     k(Home),  k(PageUp),      k(PageDown),     k(End)],
];

/* Number
 * ,-----------------------------------------------------------------------------------.
 * |      |      |      |      | Home |  Up  | PgUp |NumLck|   7  |   8  |   9  |   *  |
 * |------+------+------+------+------+-------------+------+------+------+------+------|
 * | Tab  |      |      |      | Left |      |Right |   /  |   4  |   5  |   6  |   +  |
 * |------+------+------+------+------+------|------+------+------+------+------+------|
 * |      |      |      |      | End  | Down | PgDn |   -  |   1  |   2  |   3  |Enter |
 * |------+------+------+------+------+------+------+------+------+------+------+------|
 * | Ctrl |      | GUI  | Alt  |      | Esc  |Space |      |   0  |  00  |   .  |Enter |
 * `-----------------------------------------------------------------------------------'
 */
#[rustfmt::skip]
const NUMBER_GRID: [[Keycode; COLS]; ROWS] = [
    [___,         ___, ___,        ___,        k(Home), k(Up),     k(PageUp),   TG_NUMBER,  k(Kp7), k(Kp8), k(Kp9),   k(KpAsterisk)],
    [k(Tab),      ___, ___,        ___,        k(Left), ___,       k(Right),    k(KpSlash), k(Kp4), k(Kp5), k(Kp6),   k(KpPlus)],
    [___,         ___, ___,        ___,        k(End),  k(Down),   k(PageDown), k(KpMinus), k(Kp1), k(Kp2), k(Kp3),   k(KpEnter)],
    [k(LeftCtrl), ___, k(LeftGui), k(LeftAlt), ___,     k(Escape), k(Space),    ___,        k(Kp0), KP_00,  k(KpDot), k(KpEnter)],
];

/// The stock Planck keymap.
///
/// Layer order matches the layer enum of the stock firmware (QWERTY, LOWER,
/// RAISE, NUMBER), so NUMBER wins over both overlays when the tri-layer rule
/// turns it on.
pub fn planck_default() -> Result<Keymap, KeymapError> {
    let layers = vec![
        Layer::from_grid("QWERTY", &QWERTY_GRID).with_song(Song::Qwerty),
        Layer::from_grid("LOWER", &LOWER_GRID),
        Layer::from_grid("RAISE", &RAISE_GRID),
        Layer::from_grid("NUMBER", &NUMBER_GRID),
    ];

    Keymap::new(ROWS as u8, COLS as u8, layers)?
        .with_tri_layer(TriLayer::new(LOWER, RAISE, NUMBER))?
        .with_default_layer(QWERTY)
}
