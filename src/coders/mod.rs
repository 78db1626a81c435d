pub mod mapping;
pub mod vp9;

pub use mapping::{assemble_arguments, CommandMapping};
pub use vp9::{Vp9, Vp9Settings};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Media type produced by a coder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoderKind {
    Audio,
    Video,
}

/// Static description of an encoder profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoderInfo {
    /// ffmpeg encoder name passed to `-codec`
    pub coder: &'static str,
    /// Human readable label
    pub name: &'static str,
    /// Codec family (e.g. "vp9")
    pub codec: &'static str,
    #[serde(rename = "type")]
    pub kind: CoderKind,
    pub hwaccel: bool,
}

/// Settings together with the mapping they produce
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoderDefaults<S> {
    pub settings: S,
    pub mapping: CommandMapping,
}

/// An encoder profile turning user settings into ffmpeg arguments
pub trait Coder {
    type Settings: Clone;

    fn info(&self) -> &CoderInfo;

    /// Merge caller supplied fields over the profile defaults (caller wins)
    fn init(&self, partial: &Value) -> Self::Settings;

    fn create_mapping(&self, settings: &Self::Settings) -> CommandMapping;

    /// One-line description for display
    fn summarize(&self, settings: &Self::Settings) -> String;

    fn defaults(&self) -> CoderDefaults<Self::Settings> {
        let settings = self.init(&Value::Null);
        let mapping = self.create_mapping(&settings);

        CoderDefaults { settings, mapping }
    }
}

/// Render a JSON value the way a JS template literal would
pub(crate) fn template_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
            _ => n.to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => template_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// `parseInt(s)` without a radix: whitespace, optional sign, then decimal
/// digits or a `0x` prefixed hex run. `None` stands for `NaN`.
pub(crate) fn parse_int(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits) = if s.len() >= 2 && (s.starts_with("0x") || s.starts_with("0X")) {
        (16, &s[2..])
    } else {
        (10, s)
    };

    let mut value = 0.0f64;
    let mut seen = false;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => {
                value = value * radix as f64 + d as f64;
                seen = true;
            }
            None => break,
        }
    }

    if !seen {
        return None;
    }

    Some(if negative { -value } else { value })
}
