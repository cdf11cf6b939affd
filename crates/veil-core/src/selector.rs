#![forbid(unsafe_code)]

//! CSS selector parsing and matching against a [`Document`].
//!
//! Supported grammar (a deliberately small subset of Selectors Level 3):
//!
//! ```text
//! list      := complex ( "," complex )*
//! complex   := compound ( combinator compound )*
//! combinator:= " " (descendant) | ">" (child)
//! compound  := ( tag | "*" )? ( "#" id | "." class | attribute | ":not(" compound ")" )*
//! attribute := "[" name ( "=" value )? "]"
//! ```
//!
//! Values may be bare identifiers or single/double quoted strings.
//!
//! # Invariants
//!
//! - Matching is right-to-left and never allocates.
//! - A list matches when any of its branches matches.
//! - Specificity follows the usual `(ids, classes + attributes, tags)` ordering;
//!   `:not(x)` contributes the specificity of `x`.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Empty input | `""` or `"a,"` | `SelectorError::Empty` |
//! | Unknown pseudo-class | `:hover` | `SelectorError::UnsupportedPseudo` |
//! | Unterminated `[` / quote / `(` | malformed input | `SelectorError::Unexpected` |

use std::fmt;
use std::str::FromStr;

use crate::document::{Document, NodeId};

/// Error returned when a selector string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// The selector (or one branch of a list) was empty.
    Empty,
    /// An unexpected character or end of input at the given byte offset.
    Unexpected { offset: usize, found: Option<char> },
    /// A pseudo-class other than `:not(...)`.
    UnsupportedPseudo(String),
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty selector"),
            Self::Unexpected {
                offset,
                found: Some(c),
            } => write!(f, "unexpected '{c}' at offset {offset}"),
            Self::Unexpected {
                offset,
                found: None,
            } => write!(f, "unexpected end of selector at offset {offset}"),
            Self::UnsupportedPseudo(name) => write!(f, "unsupported pseudo-class ':{name}'"),
        }
    }
}

impl std::error::Error for SelectorError {}

/// Selector specificity as `(ids, classes/attributes, tags)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Specificity(pub u16, pub u16, pub u16);

impl std::ops::Add for Specificity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0, self.1 + rhs.1, self.2 + rhs.2)
    }
}

/// How two compounds of a complex selector relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttributeMatcher {
    Exists(String),
    Equals(String, String),
}

impl AttributeMatcher {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        match self {
            Self::Exists(name) => doc.has_attribute(node, name),
            Self::Equals(name, value) => doc.attribute(node, name) == Some(value.as_str()),
        }
    }
}

/// A sequence of simple selectors with no combinator (`button.primary[disabled]`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeMatcher>,
    negations: Vec<Compound>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attributes.is_empty()
            && self.negations.is_empty()
    }

    fn specificity(&self) -> Specificity {
        let own = Specificity(
            u16::from(self.id.is_some()),
            (self.classes.len() + self.attributes.len()) as u16,
            u16::from(self.tag.as_deref().is_some_and(|t| t != "*")),
        );
        self.negations
            .iter()
            .fold(own, |acc, n| acc + n.specificity())
    }

    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(tag) = doc.tag(node) else {
            return false;
        };
        if let Some(want) = self.tag.as_deref()
            && want != "*"
            && want != tag
        {
            return false;
        }
        if let Some(id) = self.id.as_deref()
            && doc.attribute(node, "id") != Some(id)
        {
            return false;
        }
        if !self.classes.is_empty() {
            let class_attr = doc.attribute(node, "class").unwrap_or_default();
            if !self
                .classes
                .iter()
                .all(|c| class_attr.split_ascii_whitespace().any(|have| have == c))
            {
                return false;
            }
        }
        self.attributes.iter().all(|a| a.matches(doc, node))
            && !self.negations.iter().any(|n| n.matches(doc, node))
    }
}

/// Compounds joined by combinators, stored left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`.
    combinators: Vec<Combinator>,
}

impl Complex {
    fn specificity(&self) -> Specificity {
        self.compounds
            .iter()
            .fold(Specificity::default(), |acc, c| acc + c.specificity())
    }

    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let last = self.compounds.len() - 1;
        self.compounds[last].matches(doc, node) && self.matches_left_of(doc, node, last)
    }

    fn matches_left_of(&self, doc: &Document, node: NodeId, idx: usize) -> bool {
        if idx == 0 {
            return true;
        }
        let left = &self.compounds[idx - 1];
        match self.combinators[idx - 1] {
            Combinator::Child => doc
                .parent(node)
                .is_some_and(|p| left.matches(doc, p) && self.matches_left_of(doc, p, idx - 1)),
            Combinator::Descendant => doc
                .ancestors(node)
                .any(|p| left.matches(doc, p) && self.matches_left_of(doc, p, idx - 1)),
        }
    }
}

/// A parsed selector list.
///
/// # Example
///
/// ```
/// use veil_core::{Document, Selector};
///
/// let mut doc = Document::new();
/// let root = doc.create_element("div");
/// doc.set_attribute(root, "data-prompt", "");
/// doc.append_child(doc.body(), root).unwrap();
///
/// let selector: Selector = "[data-prompt]".parse().unwrap();
/// assert_eq!(doc.query_selector(doc.body(), &selector), Some(root));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    branches: Vec<Complex>,
}

impl Selector {
    /// Parse a selector list.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut parser = Parser {
            src: input,
            pos: 0,
        };
        let mut branches = Vec::new();
        loop {
            branches.push(parser.complex()?);
            parser.skip_ws();
            match parser.peek() {
                None => break,
                Some(',') => parser.pos += 1,
                found => {
                    return Err(SelectorError::Unexpected {
                        offset: parser.pos,
                        found,
                    });
                }
            }
        }
        Ok(Self {
            source: input.trim().to_owned(),
            branches,
        })
    }

    /// The (trimmed) source text this selector was parsed from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether any branch of the list matches `node`.
    #[must_use]
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.branches.iter().any(|b| b.matches(doc, node))
    }

    /// Highest specificity among the branches that match `node`.
    #[must_use]
    pub fn matching_specificity(&self, doc: &Document, node: NodeId) -> Option<Specificity> {
        self.branches
            .iter()
            .filter(|b| b.matches(doc, node))
            .map(Complex::specificity)
            .max()
    }

    /// Highest specificity among all branches.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        self.branches
            .iter()
            .map(Complex::specificity)
            .max()
            .unwrap_or_default()
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.pos += c.len_utf8();
        }
        self.pos != start
    }

    fn unexpected(&self) -> SelectorError {
        SelectorError::Unexpected {
            offset: self.pos,
            found: self.peek(),
        }
    }

    fn expect(&mut self, want: char) -> Result<(), SelectorError> {
        if self.peek() == Some(want) {
            self.pos += want.len_utf8();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.unexpected());
        }
        Ok(self.src[start..self.pos].to_owned())
    }

    fn value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(quote @ ('\'' | '"')) => {
                self.pos += 1;
                let start = self.pos;
                loop {
                    match self.bump() {
                        Some(c) if c == quote => break,
                        Some(_) => {}
                        None => return Err(self.unexpected()),
                    }
                }
                Ok(self.src[start..self.pos - 1].to_owned())
            }
            _ => self.ident(),
        }
    }

    fn complex(&mut self) -> Result<Complex, SelectorError> {
        self.skip_ws();
        let first = self.compound()?;
        if first.is_empty() {
            return Err(if self.peek().is_none() || self.peek() == Some(',') {
                SelectorError::Empty
            } else {
                self.unexpected()
            });
        }
        let mut compounds = vec![first];
        let mut combinators = Vec::new();
        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    Combinator::Child
                }
                Some(_) if had_ws => Combinator::Descendant,
                Some(_) => return Err(self.unexpected()),
            };
            let next = self.compound()?;
            if next.is_empty() {
                return Err(self.unexpected());
            }
            combinators.push(combinator);
            compounds.push(next);
        }
        Ok(Complex {
            compounds,
            combinators,
        })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        match self.peek() {
            Some('*') => {
                self.pos += 1;
                compound.tag = Some("*".to_owned());
            }
            Some(c) if c.is_ascii_alphabetic() => {
                compound.tag = Some(self.ident()?.to_ascii_lowercase());
            }
            _ => {}
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    self.skip_ws();
                    let name = self.ident()?.to_ascii_lowercase();
                    self.skip_ws();
                    let matcher = if self.peek() == Some('=') {
                        self.pos += 1;
                        self.skip_ws();
                        let value = self.value()?;
                        self.skip_ws();
                        AttributeMatcher::Equals(name, value)
                    } else {
                        AttributeMatcher::Exists(name)
                    };
                    self.expect(']')?;
                    compound.attributes.push(matcher);
                }
                Some(':') => {
                    self.pos += 1;
                    let name = self.ident()?;
                    if name != "not" {
                        return Err(SelectorError::UnsupportedPseudo(name));
                    }
                    self.expect('(')?;
                    self.skip_ws();
                    let inner = self.compound()?;
                    if inner.is_empty() {
                        return Err(self.unexpected());
                    }
                    self.skip_ws();
                    self.expect(')')?;
                    compound.negations.push(inner);
                }
                _ => break,
            }
        }
        Ok(compound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_tree() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let root = doc.create_element("div");
        doc.set_attribute(root, "data-prompt", "");
        doc.set_attribute(root, "id", "menu");
        let content = doc.create_element("div");
        doc.set_attribute(content, "data-content", "");
        doc.set_attribute(content, "class", "panel  wide");
        let button = doc.create_element("button");
        doc.set_attribute(button, "tabindex", "-1");
        doc.append_child(doc.body(), root).unwrap();
        doc.append_child(root, content).unwrap();
        doc.append_child(content, button).unwrap();
        (doc, root, content, button)
    }

    #[test]
    fn attribute_presence() {
        let (doc, root, content, _) = doc_with_tree();
        let sel = Selector::parse("[data-prompt]").unwrap();
        assert!(sel.matches(&doc, root));
        assert!(!sel.matches(&doc, content));
    }

    #[test]
    fn attribute_value_quoted_and_bare() {
        let (doc, _, _, button) = doc_with_tree();
        assert!(Selector::parse("[tabindex='-1']").unwrap().matches(&doc, button));
        assert!(Selector::parse("[tabindex=\"-1\"]").unwrap().matches(&doc, button));
        assert!(Selector::parse("[tabindex=-1]").unwrap().matches(&doc, button));
        assert!(!Selector::parse("[tabindex='0']").unwrap().matches(&doc, button));
    }

    #[test]
    fn id_class_and_tag() {
        let (doc, root, content, button) = doc_with_tree();
        assert!(Selector::parse("#menu").unwrap().matches(&doc, root));
        assert!(Selector::parse("div.panel.wide").unwrap().matches(&doc, content));
        assert!(!Selector::parse("span.panel").unwrap().matches(&doc, content));
        assert!(Selector::parse("BUTTON").unwrap().matches(&doc, button));
        assert!(Selector::parse("*").unwrap().matches(&doc, button));
    }

    #[test]
    fn negation() {
        let (doc, _, _, button) = doc_with_tree();
        let sel = Selector::parse("[tabindex]:not([tabindex='-1'])").unwrap();
        assert!(!sel.matches(&doc, button));
        let sel = Selector::parse("button:not(.primary)").unwrap();
        assert!(sel.matches(&doc, button));
    }

    #[test]
    fn combinators() {
        let (doc, _, content, button) = doc_with_tree();
        assert!(Selector::parse("[data-prompt] button").unwrap().matches(&doc, button));
        assert!(Selector::parse("[data-prompt] > [data-content]").unwrap().matches(&doc, content));
        assert!(!Selector::parse("[data-prompt] > button").unwrap().matches(&doc, button));
        assert!(Selector::parse("#menu>div>button").unwrap().matches(&doc, button));
    }

    #[test]
    fn list_matches_any_branch() {
        let (doc, root, _, button) = doc_with_tree();
        let sel = Selector::parse("input, button, select").unwrap();
        assert!(sel.matches(&doc, button));
        assert!(!sel.matches(&doc, root));
    }

    #[test]
    fn specificity_ordering() {
        let id = Selector::parse("#menu").unwrap().specificity();
        let attr = Selector::parse("[data-prompt]").unwrap().specificity();
        let tag = Selector::parse("div").unwrap().specificity();
        let both = Selector::parse("div[data-prompt] .x").unwrap().specificity();
        assert!(id > attr);
        assert!(attr > tag);
        assert_eq!(both, Specificity(0, 2, 1));
        let neg = Selector::parse("a:not(.b)").unwrap().specificity();
        assert_eq!(neg, Specificity(0, 1, 1));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(Selector::parse(""), Err(SelectorError::Empty));
        assert_eq!(Selector::parse("a,"), Err(SelectorError::Empty));
        assert!(matches!(
            Selector::parse(":hover"),
            Err(SelectorError::UnsupportedPseudo(p)) if p == "hover"
        ));
        assert!(matches!(
            Selector::parse("[data-x"),
            Err(SelectorError::Unexpected { found: None, .. })
        ));
        assert!(Selector::parse("a >").is_err());
        assert!(Selector::parse("[x='open]").is_err());
    }

    #[test]
    fn display_round_trips_source() {
        let sel = Selector::parse("  [data-prompt] > input ").unwrap();
        assert_eq!(sel.to_string(), "[data-prompt] > input");
    }
}
