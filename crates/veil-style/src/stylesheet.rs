#![forbid(unsafe_code)]

//! Minimal stylesheet parser and cascade.
//!
//! The cascade considers author rules and inline style only:
//!
//! 1. Rules whose selector matches are applied in `(specificity, source order)`
//!    order; later declarations win.
//! 2. Inline properties (`style.setProperty`) override every rule.
//! 3. Custom properties (`--name`) inherit from the parent's computed value;
//!    no other property inherits.
//! 4. `var()` references are substituted last; an unresolvable reference makes
//!    the declaration invalid and the property falls back to its initial value.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Bad selector | Selector outside the supported grammar | `StyleError::Selector` |
//! | Missing `}` | Truncated input | `StyleError::UnexpectedEof` |
//! | Declaration without `:` | `color red;` | `StyleError::Declaration` |

use std::fmt;

use veil_core::{Document, NodeId, Selector, SelectorError};

use crate::computed::{ComputedStyle, CustomProperties, substitute_vars};

/// Errors from [`Stylesheet::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    /// Input ended inside a rule or comment.
    UnexpectedEof { offset: usize },
    /// A rule's selector failed to parse.
    Selector {
        selector: String,
        source: SelectorError,
    },
    /// A declaration had no `name: value` shape.
    Declaration { text: String },
}

impl fmt::Display for StyleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof { offset } => {
                write!(f, "unexpected end of stylesheet at offset {offset}")
            }
            Self::Selector { selector, source } => {
                write!(f, "invalid selector '{selector}': {source}")
            }
            Self::Declaration { text } => write!(f, "malformed declaration '{text}'"),
        }
    }
}

impl std::error::Error for StyleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Selector { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// One `selector { declarations }` block.
#[derive(Debug, Clone)]
pub struct Rule {
    selector: Selector,
    declarations: Vec<(String, String)>,
}

impl Rule {
    /// Create a rule from a parsed selector and declarations.
    pub fn new<K, V>(selector: Selector, declarations: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            selector,
            declarations: declarations
                .into_iter()
                .map(|(k, v)| (normalize_name(k.into()), v.into()))
                .collect(),
        }
    }

    /// The rule's selector.
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Declarations in source order.
    pub fn declarations(&self) -> &[(String, String)] {
        &self.declarations
    }
}

/// Anything that can produce the computed style of an element.
///
/// The overlay engine depends on this seam rather than on [`Stylesheet`], so a
/// host with a real layout engine can supply its own values.
pub trait StyleSource {
    /// Computed style of `node`.
    fn computed_style(&self, doc: &Document, node: NodeId) -> ComputedStyle;
}

/// An ordered list of rules.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    rules: Vec<Rule>,
}

impl Stylesheet {
    /// An empty stylesheet: only inline style applies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse CSS text. Comments are ignored; at-rules are not supported.
    ///
    /// # Example
    ///
    /// ```
    /// use veil_style::Stylesheet;
    ///
    /// let sheet = Stylesheet::parse(
    ///     "[data-content] { transition-duration: var(--d, 200ms); }",
    /// ).unwrap();
    /// assert_eq!(sheet.len(), 1);
    /// ```
    pub fn parse(css: &str) -> Result<Self, StyleError> {
        let src = strip_comments(css)?;
        let mut rules = Vec::new();
        let mut rest = src.as_str();
        let mut offset = 0;
        loop {
            let trimmed = rest.trim_start();
            offset += rest.len() - trimmed.len();
            if trimmed.is_empty() {
                break;
            }
            let open = trimmed
                .find('{')
                .ok_or(StyleError::UnexpectedEof { offset })?;
            let close = trimmed[open..]
                .find('}')
                .map(|i| i + open)
                .ok_or(StyleError::UnexpectedEof {
                    offset: offset + trimmed.len(),
                })?;
            let selector_text = trimmed[..open].trim();
            let selector =
                Selector::parse(selector_text).map_err(|source| StyleError::Selector {
                    selector: selector_text.to_owned(),
                    source,
                })?;
            let declarations = parse_declarations(&trimmed[open + 1..close])?;
            rules.push(Rule {
                selector,
                declarations,
            });
            offset += close + 1;
            rest = &trimmed[close + 1..];
        }
        Ok(Self { rules })
    }

    /// Append a rule after all existing ones.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Append all rules from `other`.
    pub fn extend(&mut self, other: Self) {
        self.rules.extend(other.rules);
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in source order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Declared values for `node` after cascade, before substitution.
    fn cascaded(&self, doc: &Document, node: NodeId) -> Vec<(String, String)> {
        let mut matching: Vec<_> = self
            .rules
            .iter()
            .enumerate()
            .filter_map(|(idx, rule)| {
                rule.selector
                    .matching_specificity(doc, node)
                    .map(|spec| (spec, idx, rule))
            })
            .collect();
        matching.sort_by_key(|&(spec, idx, _)| (spec, idx));

        let mut declared: Vec<(String, String)> = Vec::new();
        let mut set = |name: &str, value: &str| {
            if let Some(slot) = declared.iter_mut().find(|(k, _)| k == name) {
                slot.1 = value.to_owned();
            } else {
                declared.push((name.to_owned(), value.to_owned()));
            }
        };
        for (_, _, rule) in matching {
            for (name, value) in &rule.declarations {
                set(name, value);
            }
        }
        if let Some(inline) = doc.inline_style(node) {
            for (name, value) in inline {
                set(name, value);
            }
        }
        declared
    }

    /// Custom properties in scope for `node`, inherited top-down.
    fn custom_properties(&self, doc: &Document, node: NodeId) -> CustomProperties {
        let mut chain: Vec<NodeId> = doc.ancestors(node).collect();
        chain.reverse();
        chain.push(node);

        let mut custom = CustomProperties::default();
        for element in chain {
            for (name, value) in self.cascaded(doc, element) {
                if name.starts_with("--") {
                    match substitute_vars(&value, &custom) {
                        Some(resolved) => custom.insert(name, resolved),
                        None => custom.remove(&name),
                    };
                }
            }
        }
        custom
    }
}

impl StyleSource for Stylesheet {
    fn computed_style(&self, doc: &Document, node: NodeId) -> ComputedStyle {
        let custom = self.custom_properties(doc, node);
        let mut style = ComputedStyle::new();
        for (name, value) in self.cascaded(doc, node) {
            if name.starts_with("--") {
                continue;
            }
            if let Some(resolved) = substitute_vars(&value, &custom) {
                style.insert(name, resolved.trim().to_owned());
            }
        }
        for (name, value) in custom {
            style.insert(name, value);
        }
        style
    }
}

fn normalize_name(name: String) -> String {
    let name = name.trim();
    if name.starts_with("--") {
        name.to_owned()
    } else {
        name.to_ascii_lowercase()
    }
}

fn strip_comments(css: &str) -> Result<String, StyleError> {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        let end = rest[start + 2..]
            .find("*/")
            .ok_or(StyleError::UnexpectedEof { offset: css.len() })?;
        rest = &rest[start + 2 + end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

fn parse_declarations(block: &str) -> Result<Vec<(String, String)>, StyleError> {
    block
        .split(';')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|decl| {
            let (name, value) = decl.split_once(':').ok_or_else(|| StyleError::Declaration {
                text: decl.to_owned(),
            })?;
            let name = normalize_name(name.to_owned());
            if name.is_empty() {
                return Err(StyleError::Declaration {
                    text: decl.to_owned(),
                });
            }
            Ok((name, value.trim().to_owned()))
        })
        .collect()
}
