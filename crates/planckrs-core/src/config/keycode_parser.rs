// Planckrs Config API - Keycode Expression Parser
// Parses strings like "KC_Q", "LSFT(MINS)", "MO(LOWER)" into keycodes

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::keycode::SHIFTED_NAMES;
use crate::layer::{LayerId, MAX_LAYERS};
use crate::{Control, Keycode, Mods, Usage};

/// Alias expansions may refer to other aliases, up to this depth
const MAX_ALIAS_DEPTH: usize = 8;

/// Errors that can occur during keycode parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeycodeParseError {
    #[error("keycode expression cannot be empty")]
    EmptyInput,

    #[error("unknown key name: '{0}'")]
    UnknownKey(String),

    #[error("unknown keycode function: '{0}'")]
    UnknownFunction(String),

    #[error("unbalanced parentheses in '{0}'")]
    Unbalanced(String),

    #[error("unknown layer: '{0}'")]
    UnknownLayer(String),

    #[error("invalid argument '{arg}' to {func}")]
    InvalidArgument { func: String, arg: String },

    #[error("modifier wrapper needs a plain key, got '{0}'")]
    NotModifiable(String),

    #[error("alias '{0}' expands too deeply (cycle?)")]
    AliasCycle(String),
}

/// Names the parser resolves against: layer names and user aliases.
#[derive(Debug, Clone, Default)]
pub struct KeycodeContext {
    layers: IndexMap<String, LayerId>,
    aliases: HashMap<String, String>,
}

impl KeycodeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a layer name
    pub fn with_layer(mut self, name: &str, id: LayerId) -> Self {
        self.layers.insert(name.to_string(), id);
        self
    }

    /// Register an alias that expands to another keycode expression
    pub fn with_alias(mut self, name: &str, expansion: &str) -> Self {
        self.aliases.insert(name.to_string(), expansion.to_string());
        self
    }

    pub fn add_layer(&mut self, name: &str, id: LayerId) {
        self.layers.insert(name.to_string(), id);
    }

    pub fn add_alias(&mut self, name: &str, expansion: &str) {
        self.aliases.insert(name.to_string(), expansion.to_string());
    }

    /// Resolve a layer reference by name (case-insensitive) or by index
    pub fn layer(&self, reference: &str) -> Option<LayerId> {
        let reference = reference.trim();
        if let Some(id) = self.layers.get(reference) {
            return Some(*id);
        }
        if let Some((_, id)) = self
            .layers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(reference))
        {
            return Some(*id);
        }
        match reference.parse::<u8>() {
            Ok(index) if (index as usize) < MAX_LAYERS => Some(LayerId(index)),
            _ => None,
        }
    }

    fn alias(&self, name: &str) -> Option<&str> {
        self.aliases
            .get(name)
            .or_else(|| {
                self.aliases
                    .iter()
                    .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
                    .map(|(_, expansion)| expansion)
            })
            .map(String::as_str)
    }
}

/// Parse a keycode expression
///
/// # Examples
/// ```
/// use planckrs_core::config::{parse_keycode, KeycodeContext};
/// use planckrs_core::layer::LayerId;
/// use planckrs_core::{Control, Keycode, Usage};
///
/// let ctx = KeycodeContext::new().with_layer("LOWER", LayerId(1));
/// assert_eq!(parse_keycode("KC_Q", &ctx).unwrap(), Keycode::key(Usage::Q));
/// assert_eq!(
///     parse_keycode("MO(LOWER)", &ctx).unwrap(),
///     Keycode::Control(Control::Momentary(LayerId(1)))
/// );
/// ```
pub fn parse_keycode(expr: &str, ctx: &KeycodeContext) -> Result<Keycode, KeycodeParseError> {
    parse_with_depth(expr, ctx, 0)
}

fn parse_with_depth(
    expr: &str,
    ctx: &KeycodeContext,
    depth: usize,
) -> Result<Keycode, KeycodeParseError> {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return Err(KeycodeParseError::EmptyInput);
    }

    if let Some(open) = trimmed.find('(') {
        if !trimmed.ends_with(')') {
            return Err(KeycodeParseError::Unbalanced(trimmed.to_string()));
        }
        let func = trimmed[..open].trim();
        let args = &trimmed[open + 1..trimmed.len() - 1];
        return parse_call(func, args, ctx, depth);
    }
    if trimmed.contains(')') {
        return Err(KeycodeParseError::Unbalanced(trimmed.to_string()));
    }

    if let Some(expansion) = ctx.alias(trimmed) {
        if depth >= MAX_ALIAS_DEPTH {
            return Err(KeycodeParseError::AliasCycle(trimmed.to_string()));
        }
        return parse_with_depth(expansion, ctx, depth + 1);
    }

    let upper = trimmed.to_ascii_uppercase();
    let bare = upper.strip_prefix("KC_").unwrap_or(&upper);
    match bare {
        "_______" | "TRNS" | "TRANSPARENT" => return Ok(Keycode::Transparent),
        "XXXXXXX" | "NO" => return Ok(Keycode::NoOp),
        _ => {}
    }

    if let Some((_, usage)) = SHIFTED_NAMES.iter().find(|(name, _)| *name == bare) {
        return Ok(Keycode::shifted(*usage));
    }

    Usage::from_name(bare)
        .map(Keycode::Output)
        .ok_or_else(|| KeycodeParseError::UnknownKey(trimmed.to_string()))
}

fn parse_call(
    func: &str,
    args: &str,
    ctx: &KeycodeContext,
    depth: usize,
) -> Result<Keycode, KeycodeParseError> {
    let name = func.to_ascii_uppercase();
    match name.as_str() {
        "MO" => parse_layer_arg(&name, args, ctx).map(|id| Keycode::Control(Control::Momentary(id))),
        "TG" => parse_layer_arg(&name, args, ctx).map(|id| Keycode::Control(Control::Toggle(id))),
        "DF" => parse_layer_arg(&name, args, ctx).map(|id| Keycode::Control(Control::SetDefault(id))),
        "USER" => args
            .trim()
            .parse::<u16>()
            .map(|code| Keycode::Control(Control::Reserved(code)))
            .map_err(|_| invalid(&name, args)),
        "REP" => parse_repeat(args),
        _ => {
            let mods = Mods::from_name(&name)
                .ok_or_else(|| KeycodeParseError::UnknownFunction(func.to_string()))?;
            match parse_with_depth(args, ctx, depth)? {
                Keycode::Output(usage) => Ok(Keycode::Modified { mods, usage }),
                Keycode::Modified { mods: inner, usage } => Ok(Keycode::Modified {
                    mods: mods | inner,
                    usage,
                }),
                _ => Err(KeycodeParseError::NotModifiable(args.trim().to_string())),
            }
        }
    }
}

fn parse_layer_arg(
    func: &str,
    args: &str,
    ctx: &KeycodeContext,
) -> Result<LayerId, KeycodeParseError> {
    let arg = args.trim();
    if arg.is_empty() {
        return Err(invalid(func, args));
    }
    ctx.layer(arg)
        .ok_or_else(|| KeycodeParseError::UnknownLayer(arg.to_string()))
}

fn parse_repeat(args: &str) -> Result<Keycode, KeycodeParseError> {
    let (usage, count) = args
        .split_once(',')
        .ok_or_else(|| invalid("REP", args))?;
    let usage = Usage::from_name(usage).ok_or_else(|| KeycodeParseError::UnknownKey(usage.trim().to_string()))?;
    let count = match count.trim().parse::<u8>() {
        Ok(count) if count > 0 => count,
        _ => return Err(invalid("REP", count)),
    };
    Ok(Keycode::Repeat { usage, count })
}

fn invalid(func: &str, arg: &str) -> KeycodeParseError {
    KeycodeParseError::InvalidArgument {
        func: func.to_string(),
        arg: arg.trim().to_string(),
    }
}
