#![forbid(unsafe_code)]

//! Computed style values and `var()` substitution.

use ahash::AHashMap;
use tracing::trace;

/// Property values after cascade, inheritance of custom properties, and
/// `var()` substitution.
///
/// Values are kept as CSS text; typed accessors interpret the few properties
/// the overlay engine needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComputedStyle {
    properties: AHashMap<String, String>,
}

impl ComputedStyle {
    /// An empty style (every property at its initial value).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from explicit `(name, value)` pairs, skipping substitution.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            properties: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub(crate) fn insert(&mut self, name: String, value: String) {
        self.properties.insert(name, value);
    }

    /// Raw computed value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Number of properties with a non-initial value.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether every property is at its initial value.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// `display` keyword (initial value `inline`).
    pub fn display(&self) -> &str {
        self.get("display").unwrap_or("inline")
    }

    /// Whether `display: none` applies to this element itself.
    pub fn is_display_none(&self) -> bool {
        self.display().eq_ignore_ascii_case("none")
    }

    /// `opacity` as a number; unparsable values fall back to `1.0`.
    pub fn opacity(&self) -> f32 {
        self.get("opacity")
            .and_then(|v| v.trim().parse::<f32>().ok())
            .unwrap_or(1.0)
    }

    /// `transition-duration` (initial `0s`).
    pub fn transition_duration(&self) -> &str {
        self.get("transition-duration").unwrap_or("0s")
    }

    /// `transition-delay` (initial `0s`).
    pub fn transition_delay(&self) -> &str {
        self.get("transition-delay").unwrap_or("0s")
    }

    /// `animation-duration` (initial `0s`).
    pub fn animation_duration(&self) -> &str {
        self.get("animation-duration").unwrap_or("0s")
    }

    /// `animation-delay` (initial `0s`).
    pub fn animation_delay(&self) -> &str {
        self.get("animation-delay").unwrap_or("0s")
    }
}

/// Custom properties in scope for an element (inherited + own).
pub(crate) type CustomProperties = AHashMap<String, String>;

/// Substitute every `var(--name[, fallback])` in `value`.
///
/// Returns `None` when a reference has no value and no fallback, which makes
/// the declaration invalid at computed-value time.
pub(crate) fn substitute_vars(value: &str, custom: &CustomProperties) -> Option<String> {
    substitute_depth(value, custom, 0)
}

const MAX_VAR_DEPTH: usize = 16;

fn substitute_depth(value: &str, custom: &CustomProperties, depth: usize) -> Option<String> {
    if depth > MAX_VAR_DEPTH {
        trace!(value, "var() nesting too deep");
        return None;
    }
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("var(") {
        out.push_str(&rest[..start]);
        let args_start = start + "var(".len();
        let close = matching_paren(&rest[args_start..])? + args_start;
        let args = &rest[args_start..close];
        let (name, fallback) = match split_top_level_comma(args) {
            Some((n, f)) => (n.trim(), Some(f.trim())),
            None => (args.trim(), None),
        };
        let resolved = match (custom.get(name), fallback) {
            (Some(v), _) => v.clone(),
            (None, Some(f)) => substitute_depth(f, custom, depth + 1)?,
            (None, None) => {
                trace!(name, "unresolved custom property");
                return None;
            }
        };
        out.push_str(&resolved);
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    Some(out)
}

/// Byte index of the `)` closing an already-opened paren in `s`.
fn matching_paren(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return Some(i),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn split_top_level_comma(s: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some((&s[..i], &s[i + 1..])),
            _ => {}
        }
    }
    None
}
