//! Selector parsing and matching for container lookup (`Element.closest`).
//!
//! Supported: type, class, id, universal and attribute simple selectors (all
//! six value operators plus the `i`/`s` flags), descendant/child/adjacent/
//! general sibling combinators and comma-separated lists. Pseudo-classes and
//! namespaces fail to parse; callers decide how to degrade.

use crate::HostDom;
use anyhow::{Result, bail};

/// A single simple selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimpleSelector {
    Universal,
    /// Type selector, stored lowercase.
    Type(String),
    Class(String),
    Id(String),
    /// `[name]` when `matcher` is `None`, `[name<op>value]` otherwise.
    Attr {
        name: String,
        matcher: Option<AttrMatcher>,
    },
}

/// Value operator of an attribute selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrOperator {
    /// `=`
    Equal,
    /// `~=`: one of the whitespace-separated tokens.
    Includes,
    /// `|=`: equal, or followed by `-`.
    DashMatch,
    /// `^=`
    Prefix,
    /// `*=`
    Substring,
    /// `$=`
    Suffix,
}

impl AttrOperator {
    /// Whether `actual` satisfies `self` against `expected`.
    #[must_use]
    pub fn eval(self, actual: &str, expected: &str) -> bool {
        match self {
            Self::Equal => actual == expected,
            Self::Includes => {
                !expected.is_empty()
                    && !expected.contains(|ch: char| ch.is_ascii_whitespace())
                    && actual.split_ascii_whitespace().any(|token| token == expected)
            }
            Self::DashMatch => {
                actual == expected
                    || actual
                        .strip_prefix(expected)
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            Self::Prefix => !expected.is_empty() && actual.starts_with(expected),
            Self::Substring => !expected.is_empty() && actual.contains(expected),
            Self::Suffix => !expected.is_empty() && actual.ends_with(expected),
        }
    }
}

/// Right-hand side of `[name<op>value]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttrMatcher {
    pub operator: AttrOperator,
    pub value: String,
    /// Set by the `i` flag. Compares ASCII case-insensitively.
    pub case_insensitive: bool,
}

impl AttrMatcher {
    #[must_use]
    pub fn matches(&self, actual: &str) -> bool {
        if self.case_insensitive {
            self.operator.eval(
                &actual.to_ascii_lowercase(),
                &self.value.to_ascii_lowercase(),
            )
        } else {
            self.operator.eval(actual, &self.value)
        }
    }
}

/// Simple selectors that must all match the same element.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

/// Relationship between two adjacent compounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

/// Compounds in source order. `combinators[index]` joins
/// `compounds[index]` and `compounds[index + 1]`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
    pub combinators: Vec<Combinator>,
}

/// Comma-separated group of selectors.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

/// Byte cursor over the selector source.
struct SelectorParser<'src> {
    source: &'src str,
    index: usize,
}

impl<'src> SelectorParser<'src> {
    const fn new(source: &'src str) -> Self {
        Self { source, index: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.index).copied()
    }

    fn bump(&mut self) {
        self.index = self.index.saturating_add(1);
    }

    /// Skip whitespace, reporting whether any was consumed.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.index;
        while self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
            self.bump();
        }
        self.index != start
    }

    fn ident(&mut self) -> Result<String> {
        let start = self.index;
        while self.peek().is_some_and(is_ident_byte) {
            self.bump();
        }
        if start == self.index {
            bail!(
                "expected identifier at offset {start} in selector {:?}",
                self.source
            );
        }
        Ok(self
            .source
            .get(start..self.index)
            .unwrap_or_default()
            .to_owned())
    }

    fn parse_list(&mut self) -> Result<SelectorList> {
        let mut list = SelectorList::default();
        loop {
            self.skip_whitespace();
            list.selectors.push(self.parse_complex()?);
            if self.peek() == Some(b',') {
                self.bump();
                continue;
            }
            return Ok(list);
        }
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector> {
        let mut selector = ComplexSelector::default();
        let mut pending: Option<Combinator> = None;
        loop {
            let compound = self.parse_compound()?;
            if compound.simples.is_empty() {
                bail!(
                    "expected selector at offset {} in {:?}",
                    self.index,
                    self.source
                );
            }
            if let Some(combinator) = pending.take() {
                selector.combinators.push(combinator);
            }
            selector.compounds.push(compound);

            let saw_space = self.skip_whitespace();
            let explicit = match self.peek() {
                None | Some(b',') => return Ok(selector),
                Some(b'>') => Some(Combinator::Child),
                Some(b'+') => Some(Combinator::AdjacentSibling),
                Some(b'~') => Some(Combinator::GeneralSibling),
                Some(_) if saw_space => None,
                Some(other) => bail!(
                    "unsupported selector syntax {:?} at offset {} in {:?}",
                    char::from(other),
                    self.index,
                    self.source
                ),
            };
            if let Some(combinator) = explicit {
                self.bump();
                self.skip_whitespace();
                pending = Some(combinator);
            } else {
                pending = Some(Combinator::Descendant);
            }
        }
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector> {
        let mut compound = CompoundSelector::default();
        while let Some(byte) = self.peek() {
            let simple = match byte {
                b'*' => {
                    self.bump();
                    SimpleSelector::Universal
                }
                b'.' => {
                    self.bump();
                    SimpleSelector::Class(self.ident()?)
                }
                b'#' => {
                    self.bump();
                    SimpleSelector::Id(self.ident()?)
                }
                b'[' => {
                    self.bump();
                    self.parse_attr()?
                }
                byte if is_ident_byte(byte) => {
                    SimpleSelector::Type(self.ident()?.to_ascii_lowercase())
                }
                _ => break,
            };
            compound.simples.push(simple);
        }
        Ok(compound)
    }

    fn parse_attr(&mut self) -> Result<SimpleSelector> {
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();
        let matcher = match self.peek() {
            Some(b']') | None => None,
            Some(byte) => {
                let operator = self.attr_operator(byte)?;
                self.skip_whitespace();
                let value = self.attr_value()?;
                self.skip_whitespace();
                let case_insensitive = self.attr_flag();
                Some(AttrMatcher {
                    operator,
                    value,
                    case_insensitive,
                })
            }
        };
        self.skip_whitespace();
        if self.peek() != Some(b']') {
            bail!("unterminated attribute selector in {:?}", self.source);
        }
        self.bump();
        Ok(SimpleSelector::Attr { name, matcher })
    }

    fn attr_operator(&mut self, first: u8) -> Result<AttrOperator> {
        let operator = match first {
            b'=' => {
                self.bump();
                return Ok(AttrOperator::Equal);
            }
            b'~' => AttrOperator::Includes,
            b'|' => AttrOperator::DashMatch,
            b'^' => AttrOperator::Prefix,
            b'*' => AttrOperator::Substring,
            b'$' => AttrOperator::Suffix,
            other => bail!(
                "unsupported attribute operator {:?} at offset {} in {:?}",
                char::from(other),
                self.index,
                self.source
            ),
        };
        self.bump();
        if self.peek() != Some(b'=') {
            bail!(
                "expected '=' after {:?} at offset {} in {:?}",
                char::from(first),
                self.index,
                self.source
            );
        }
        self.bump();
        Ok(operator)
    }

    /// Trailing `i`/`s` flag. Only `i` changes matching.
    fn attr_flag(&mut self) -> bool {
        match self.peek() {
            Some(b'i' | b'I') => {
                self.bump();
                true
            }
            Some(b's' | b'S') => {
                self.bump();
                false
            }
            _ => false,
        }
    }

    fn attr_value(&mut self) -> Result<String> {
        match self.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                self.bump();
                let start = self.index;
                while self.peek().is_some_and(|byte| byte != quote) {
                    self.bump();
                }
                if self.peek().is_none() {
                    bail!("unterminated string in selector {:?}", self.source);
                }
                let value = self
                    .source
                    .get(start..self.index)
                    .unwrap_or_default()
                    .to_owned();
                self.bump();
                Ok(value)
            }
            _ => self.ident(),
        }
    }
}

/// Identifier bytes: ASCII alphanumerics, `-`, `_` and any non-ASCII byte.
fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' || !byte.is_ascii()
}

/// Parse a selector list.
///
/// # Errors
/// Returns an error for empty selectors and for syntax outside the supported subset.
pub fn parse_selector_list(input: &str) -> Result<SelectorList> {
    SelectorParser::new(input).parse_list()
}

/// Whether `node` matches any selector of `list`.
pub fn matches_selector_list<D: HostDom + ?Sized>(
    dom: &D,
    node: D::Node,
    list: &SelectorList,
) -> bool {
    list.selectors
        .iter()
        .any(|selector| matches_complex(dom, node, selector))
}

/// Whether `node` matches `selector`, anchored at its rightmost compound.
pub fn matches_complex<D: HostDom + ?Sized>(
    dom: &D,
    node: D::Node,
    selector: &ComplexSelector,
) -> bool {
    selector
        .compounds
        .len()
        .checked_sub(1)
        .is_some_and(|last| matches_from(dom, node, selector, last))
}

/// Right-to-left match with backtracking over descendant and general sibling steps.
fn matches_from<D: HostDom + ?Sized>(
    dom: &D,
    node: D::Node,
    selector: &ComplexSelector,
    index: usize,
) -> bool {
    let Some(compound) = selector.compounds.get(index) else {
        return false;
    };
    if !matches_compound(dom, node, compound) {
        return false;
    }
    let Some(previous) = index.checked_sub(1) else {
        return true;
    };
    let Some(&combinator) = selector.combinators.get(previous) else {
        return false;
    };
    match combinator {
        Combinator::Child => dom
            .parent(node)
            .is_some_and(|parent| matches_from(dom, parent, selector, previous)),
        Combinator::AdjacentSibling => dom
            .previous_sibling_element(node)
            .is_some_and(|sibling| matches_from(dom, sibling, selector, previous)),
        Combinator::Descendant => {
            let mut current = dom.parent(node);
            while let Some(ancestor) = current {
                if matches_from(dom, ancestor, selector, previous) {
                    return true;
                }
                current = dom.parent(ancestor);
            }
            false
        }
        Combinator::GeneralSibling => {
            let mut current = dom.previous_sibling_element(node);
            while let Some(sibling) = current {
                if matches_from(dom, sibling, selector, previous) {
                    return true;
                }
                current = dom.previous_sibling_element(sibling);
            }
            false
        }
    }
}

/// Whether every simple selector of `compound` matches `node`.
pub fn matches_compound<D: HostDom + ?Sized>(
    dom: &D,
    node: D::Node,
    compound: &CompoundSelector,
) -> bool {
    compound.simples.iter().all(|simple| match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(tag) => dom.tag_name(node) == tag,
        SimpleSelector::Class(class) => dom.has_class(node, class),
        SimpleSelector::Id(id) => dom.element_id(node) == Some(id.as_str()),
        SimpleSelector::Attr { name, matcher } => dom.attr(node, name).is_some_and(|actual| {
            matcher
                .as_ref()
                .is_none_or(|attr_matcher| attr_matcher.matches(&actual))
        }),
    })
}

/// `Element.closest`: the node itself or its nearest ancestor matching `list`.
pub fn closest<D: HostDom + ?Sized>(
    dom: &D,
    node: D::Node,
    list: &SelectorList,
) -> Option<D::Node> {
    let mut current = Some(node);
    while let Some(candidate) = current {
        if matches_selector_list(dom, candidate, list) {
            return Some(candidate);
        }
        current = dom.parent(candidate);
    }
    None
}
