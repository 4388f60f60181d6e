//! CSS Selectors
//!
//! Parses selector lists (`.card, #header nav > a[href^="#"]`) and matches
//! them against a `DomTree`, which is all `querySelectorAll` needs.
//! Pseudo-elements and stateful pseudo-classes (`:hover`, `:focus`) are
//! rejected because they never match a static document.

use wn_dom::{DomTree, NodeId};

use crate::SelectorError;

/// An+B expression for :nth-* selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NthExpression {
    /// Coefficient (A in An+B)
    pub a: i32,
    /// Offset (B in An+B)
    pub b: i32,
}

impl NthExpression {
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Parse from string like "2n+1", "odd", "even", "3"
    pub fn parse(s: &str) -> Option<Self> {
        let s: String = s.split_whitespace().collect::<String>().to_ascii_lowercase();
        match s.as_str() {
            "odd" => return Some(Self::new(2, 1)),
            "even" => return Some(Self::new(2, 0)),
            _ => {}
        }
        if let Ok(n) = s.parse::<i32>() {
            return Some(Self::new(0, n));
        }

        let n_pos = s.find('n')?;
        let a = match &s[..n_pos] {
            "" | "+" => 1,
            "-" => -1,
            a_str => a_str.parse().ok()?,
        };
        let rest = &s[n_pos + 1..];
        let b = if rest.is_empty() {
            0
        } else {
            rest.trim_start_matches('+').parse().ok()?
        };
        Some(Self::new(a, b))
    }

    /// Check if index n (1-based) matches this expression
    pub fn matches(&self, n: i32) -> bool {
        if self.a == 0 {
            return n == self.b;
        }
        let diff = n - self.b;
        diff % self.a == 0 && diff / self.a >= 0
    }
}

/// A simple selector inside a compound
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// Universal selector *
    Universal,
    /// Type selector (tag name, lowercase)
    Type(String),
    /// ID selector #id
    Id(String),
    /// Class selector .class
    Class(String),
    /// Attribute selector [attr], [attr=value], etc.
    Attribute(AttributeSelector),
    /// Structural pseudo-class
    PseudoClass(PseudoClass),
}

/// Pseudo-classes that can be evaluated on a static tree
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    NthChild(NthExpression),
    NthLastChild(NthExpression),
    NthOfType(NthExpression),
    /// `a[href]`, `area[href]`
    Link,
    Not(Box<CompoundSelector>),
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Contains(String),
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

impl AttributeSelector {
    /// Check if an attribute value matches
    pub fn matches(&self, value: Option<&str>) -> bool {
        let (Some(matcher), Some(value)) = (&self.matcher, value) else {
            return self.matcher.is_none() && value.is_some();
        };
        let fold = |s: &str| {
            if self.case_insensitive {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        };
        let value = fold(value);
        match matcher {
            AttributeMatcher::Exact(expected) => value == fold(expected),
            AttributeMatcher::Contains(expected) => {
                let expected = fold(expected);
                value.split_whitespace().any(|w| w == expected)
            }
            AttributeMatcher::DashMatch(expected) => {
                let expected = fold(expected);
                value == expected || value.starts_with(&format!("{}-", expected))
            }
            // Empty needles never match for the substring family
            AttributeMatcher::Prefix(expected) => {
                !expected.is_empty() && value.starts_with(&fold(expected))
            }
            AttributeMatcher::Suffix(expected) => {
                !expected.is_empty() && value.ends_with(&fold(expected))
            }
            AttributeMatcher::Substring(expected) => {
                !expected.is_empty() && value.contains(&fold(expected))
            }
        }
    }
}

/// Sequence of simple selectors with no combinator between them
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

/// Relationship between two compounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    NextSibling,
    /// `a ~ b`
    SubsequentSibling,
}

/// Compounds joined by combinators, e.g. `nav > ul a`
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    /// Rightmost compound (the subject)
    pub subject: CompoundSelector,
    /// Remaining compounds right-to-left, each with the combinator that
    /// links it to the compound on its right
    pub ancestors: Vec<(Combinator, CompoundSelector)>,
}

/// Comma-separated selector list
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList(pub Vec<ComplexSelector>);

impl SelectorList {
    /// Parse a selector list
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        if input.trim().is_empty() {
            return Err(SelectorError::Empty);
        }
        let mut parser = Parser::new(input);
        let mut selectors = vec![parser.complex()?];
        loop {
            parser.skip_ws();
            match parser.peek() {
                None => break,
                Some(',') => {
                    parser.bump();
                    selectors.push(parser.complex()?);
                }
                Some(found) => {
                    return Err(SelectorError::UnexpectedToken {
                        found,
                        offset: parser.pos,
                    });
                }
            }
        }
        Ok(Self(selectors))
    }

    /// Whether any selector in the list matches `node`
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.0.iter().any(|s| s.matches(tree, node))
    }
}

impl ComplexSelector {
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.subject.matches(tree, node) && match_from(tree, node, &self.ancestors)
    }
}

/// Right-to-left matching with backtracking for descendant/sibling walks
fn match_from(tree: &DomTree, node: NodeId, rest: &[(Combinator, CompoundSelector)]) -> bool {
    let Some(((combinator, compound), tail)) = rest.split_first() else {
        return true;
    };
    match combinator {
        Combinator::Child => tree
            .parent_element(node)
            .is_some_and(|p| compound.matches(tree, p) && match_from(tree, p, tail)),
        Combinator::Descendant => tree
            .ancestors(node)
            .any(|a| compound.matches(tree, a) && match_from(tree, a, tail)),
        Combinator::NextSibling => prev_element(tree, node)
            .is_some_and(|s| compound.matches(tree, s) && match_from(tree, s, tail)),
        Combinator::SubsequentSibling => {
            std::iter::successors(prev_element(tree, node), |&s| prev_element(tree, s))
                .any(|s| compound.matches(tree, s) && match_from(tree, s, tail))
        }
    }
}

impl CompoundSelector {
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        tree.element(node).is_some()
            && self.components.iter().all(|c| match_component(c, tree, node))
    }
}

/// Match a selector component against an element
pub fn match_component(component: &SelectorComponent, tree: &DomTree, node: NodeId) -> bool {
    let Some(elem) = tree.element(node) else {
        return false;
    };
    match component {
        SelectorComponent::Universal => true,
        SelectorComponent::Type(tag) => elem.tag.eq_ignore_ascii_case(tag),
        SelectorComponent::Id(id) => elem.id() == Some(id.as_str()),
        SelectorComponent::Class(class) => elem.has_class(class),
        SelectorComponent::Attribute(attr) => attr.matches(elem.get_attr(&attr.name)),
        SelectorComponent::PseudoClass(pseudo) => match_pseudo_class(pseudo, tree, node),
    }
}

fn match_pseudo_class(pseudo: &PseudoClass, tree: &DomTree, node: NodeId) -> bool {
    let siblings = || -> Vec<NodeId> {
        match tree.get(node).map(|n| n.parent) {
            Some(parent) if parent.is_valid() => tree
                .children(parent)
                .filter(|(_, n)| n.is_element())
                .map(|(id, _)| id)
                .collect(),
            _ => vec![node],
        }
    };
    let same_type = || -> Vec<NodeId> {
        let tag = tree.tag_name(node);
        siblings()
            .into_iter()
            .filter(|&s| tree.tag_name(s) == tag)
            .collect()
    };
    let position = |list: &[NodeId]| list.iter().position(|&s| s == node).map(|p| p as i32 + 1);

    match pseudo {
        PseudoClass::Root => tree.parent_element(node).is_none() && tree.get(node).is_some_and(|n| n.parent == tree.root()),
        PseudoClass::Empty => tree.children(node).all(|(_, n)| !n.is_element() && n.as_text().is_none_or(str::is_empty)),
        PseudoClass::FirstChild => position(&siblings()) == Some(1),
        PseudoClass::LastChild => {
            let list = siblings();
            position(&list) == Some(list.len() as i32)
        }
        PseudoClass::OnlyChild => siblings().len() == 1,
        PseudoClass::FirstOfType => position(&same_type()) == Some(1),
        PseudoClass::LastOfType => {
            let list = same_type();
            position(&list) == Some(list.len() as i32)
        }
        PseudoClass::NthChild(expr) => position(&siblings()).is_some_and(|p| expr.matches(p)),
        PseudoClass::NthLastChild(expr) => {
            let list = siblings();
            position(&list).is_some_and(|p| expr.matches(list.len() as i32 - p + 1))
        }
        PseudoClass::NthOfType(expr) => position(&same_type()).is_some_and(|p| expr.matches(p)),
        PseudoClass::Link => {
            matches!(tree.tag_name(node), Some("a" | "area")) && tree.attr(node, "href").is_some()
        }
        PseudoClass::Not(inner) => !inner.matches(tree, node),
    }
}

fn prev_element(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    let mut current = tree.get(node)?.prev_sibling;
    while current.is_valid() {
        let n = tree.get(current)?;
        if n.is_element() {
            return Some(current);
        }
        current = n.prev_sibling;
    }
    None
}

/// All elements under `root` matching `selectors`, in document order
pub fn query_selector_all(tree: &DomTree, root: NodeId, selectors: &SelectorList) -> Vec<NodeId> {
    tree.descendant_elements(root)
        .into_iter()
        .filter(|&id| selectors.matches(tree, id))
        .collect()
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos != start
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(found) => SelectorError::UnexpectedToken {
                found,
                offset: self.pos,
            },
            None => SelectorError::UnexpectedEnd,
        }
    }

    fn expect(&mut self, ch: char) -> Result<(), SelectorError> {
        if self.peek() == Some(ch) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        self.skip_ws();
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(',') | None => break,
                Some(_) if had_ws => {
                    combinators.push(Combinator::Descendant);
                    compounds.push(self.compound()?);
                    continue;
                }
                Some(_) => return Err(self.unexpected()),
            };
            self.bump();
            self.skip_ws();
            if matches!(self.peek(), None | Some(',')) {
                return Err(SelectorError::DanglingCombinator);
            }
            combinators.push(combinator);
            compounds.push(self.compound()?);
        }

        let subject = compounds.pop().unwrap_or_default();
        let ancestors = combinators.into_iter().rev().zip(compounds.into_iter().rev()).collect();
        Ok(ComplexSelector { subject, ancestors })
    }

    fn compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut components = Vec::new();
        match self.peek() {
            Some('*') => {
                self.bump();
                components.push(SelectorComponent::Universal);
            }
            Some(c) if is_ident_start(c) => {
                components.push(SelectorComponent::Type(self.ident()?.to_ascii_lowercase()));
            }
            _ => {}
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    components.push(SelectorComponent::Id(self.ident()?));
                }
                Some('.') => {
                    self.bump();
                    components.push(SelectorComponent::Class(self.ident()?));
                }
                Some('[') => components.push(SelectorComponent::Attribute(self.attribute()?)),
                Some(':') => components.push(SelectorComponent::PseudoClass(self.pseudo()?)),
                _ => break,
            }
        }
        if components.is_empty() {
            return Err(self.unexpected());
        }
        Ok(CompoundSelector { components })
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        if start == self.pos || self.input[start..].starts_with(|c: char| c.is_ascii_digit()) {
            self.pos = start;
            return Err(self.unexpected());
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.expect('[')?;
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();

        let op = match self.peek() {
            Some(']') => {
                self.bump();
                return Ok(AttributeSelector {
                    name,
                    matcher: None,
                    case_insensitive: false,
                });
            }
            Some('=') => None,
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
                self.bump();
                Some(c)
            }
            _ => return Err(self.unexpected()),
        };
        self.expect('=')?;
        self.skip_ws();
        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => self.quoted(q)?,
            _ => self.ident()?,
        };
        self.skip_ws();
        let case_insensitive = matches!(self.peek(), Some('i' | 'I'));
        if case_insensitive {
            self.bump();
            self.skip_ws();
        }
        self.expect(']')?;

        let matcher = match op {
            None => AttributeMatcher::Exact(value),
            Some('~') => AttributeMatcher::Contains(value),
            Some('|') => AttributeMatcher::DashMatch(value),
            Some('^') => AttributeMatcher::Prefix(value),
            Some('$') => AttributeMatcher::Suffix(value),
            _ => AttributeMatcher::Substring(value),
        };
        Ok(AttributeSelector {
            name,
            matcher: Some(matcher),
            case_insensitive,
        })
    }

    fn quoted(&mut self, quote: char) -> Result<String, SelectorError> {
        self.bump();
        let start = self.pos;
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(self.input[start..self.pos - 1].to_string()),
                Some(_) => {}
                None => return Err(SelectorError::UnexpectedEnd),
            }
        }
    }

    fn pseudo(&mut self) -> Result<PseudoClass, SelectorError> {
        self.expect(':')?;
        if self.peek() == Some(':') {
            self.bump();
            let name = self.ident().unwrap_or_default();
            return Err(SelectorError::UnsupportedPseudo(format!("::{}", name)));
        }
        let name = self.ident()?.to_ascii_lowercase();
        let argument = if self.peek() == Some('(') {
            self.bump();
            let start = self.pos;
            let mut depth = 1;
            while depth > 0 {
                match self.bump() {
                    Some('(') => depth += 1,
                    Some(')') => depth -= 1,
                    Some(_) => {}
                    None => return Err(SelectorError::UnexpectedEnd),
                }
            }
            Some(self.input[start..self.pos - 1].trim().to_string())
        } else {
            None
        };

        let nth = |arg: &Option<String>| {
            arg.as_deref()
                .and_then(NthExpression::parse)
                .ok_or_else(|| SelectorError::UnsupportedPseudo(format!(":{}", name)))
        };
        let pseudo = match (name.as_str(), &argument) {
            ("root", None) => PseudoClass::Root,
            ("empty", None) => PseudoClass::Empty,
            ("first-child", None) => PseudoClass::FirstChild,
            ("last-child", None) => PseudoClass::LastChild,
            ("only-child", None) => PseudoClass::OnlyChild,
            ("first-of-type", None) => PseudoClass::FirstOfType,
            ("last-of-type", None) => PseudoClass::LastOfType,
            ("link" | "any-link", None) => PseudoClass::Link,
            ("nth-child", Some(_)) => PseudoClass::NthChild(nth(&argument)?),
            ("nth-last-child", Some(_)) => PseudoClass::NthLastChild(nth(&argument)?),
            ("nth-of-type", Some(_)) => PseudoClass::NthOfType(nth(&argument)?),
            ("not", Some(inner)) => {
                let mut sub = Parser::new(inner);
                let compound = sub.compound()?;
                if sub.peek().is_some() {
                    return Err(SelectorError::UnsupportedPseudo(format!(":not({})", inner)));
                }
                PseudoClass::Not(Box::new(compound))
            }
            _ => return Err(SelectorError::UnsupportedPseudo(format!(":{}", name))),
        };
        Ok(pseudo)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}
