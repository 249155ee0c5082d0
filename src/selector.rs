use crate::dom::{Dom, Element, NodeId};
use crate::{Error, Result};

/// How an attribute requirement inside `[...]` compares its value.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrExpectation {
    Present,
    Equals(String),
    Prefix(String),
    Suffix(String),
    Substring(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrRequirement {
    name: String,
    expectation: AttrExpectation,
}

/// Everything one compound selector demands of a single element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    universal: bool,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrRequirement>,
}

/// Relation between a compound and the compound to its right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Ancestor,
    Parent,
}

/// One comma group, stored subject first: `subject` applies to the
/// candidate element itself, each hop to an element further up the
/// tree.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MatchChain {
    subject: Compound,
    hops: Vec<(Relation, Compound)>,
}

impl MatchChain {
    fn matches(&self, dom: &Dom, node: NodeId) -> bool {
        compound_matches(dom, node, &self.subject) && hops_match(dom, node, &self.hops)
    }

    fn id_shortcut(&self) -> Option<&str> {
        if !self.hops.is_empty() {
            return None;
        }
        let subject = &self.subject;
        if subject.universal
            || subject.tag.is_some()
            || !subject.classes.is_empty()
            || !subject.attrs.is_empty()
        {
            return None;
        }
        subject.id.as_deref()
    }
}

/// Matches in document order, duplicates removed across groups. Id
/// lookups take the index shortcut, so a repeated id resolves to the
/// element the index kept.
pub(crate) fn select_all(dom: &Dom, selector: &str) -> Result<Vec<NodeId>> {
    let chains = compile(selector)?;
    if let [only] = chains.as_slice() {
        if let Some(id) = only.id_shortcut() {
            return Ok(dom.by_id(id).into_iter().collect());
        }
    }
    let matched = dom
        .all_element_nodes()
        .into_iter()
        .filter(|&node| chains.iter().any(|chain| chain.matches(dom, node)))
        .collect();
    Ok(matched)
}

fn hops_match(dom: &Dom, node: NodeId, hops: &[(Relation, Compound)]) -> bool {
    let Some(((relation, compound), rest)) = hops.split_first() else {
        return true;
    };
    match relation {
        Relation::Parent => match dom.parent(node) {
            Some(parent) => {
                compound_matches(dom, parent, compound) && hops_match(dom, parent, rest)
            }
            None => false,
        },
        Relation::Ancestor => {
            let mut above = dom.parent(node);
            while let Some(candidate) = above {
                if compound_matches(dom, candidate, compound) && hops_match(dom, candidate, rest) {
                    return true;
                }
                above = dom.parent(candidate);
            }
            false
        }
    }
}

fn compound_matches(dom: &Dom, node: NodeId, compound: &Compound) -> bool {
    let Some(element) = dom.element(node) else {
        return false;
    };
    if let Some(tag) = compound.tag.as_deref() {
        if element.tag_name != tag {
            return false;
        }
    }
    if let Some(id) = compound.id.as_deref() {
        if element.attrs.get("id").map(String::as_str) != Some(id) {
            return false;
        }
    }
    if compound
        .classes
        .iter()
        .any(|class| !dom.has_class(node, class))
    {
        return false;
    }
    compound
        .attrs
        .iter()
        .all(|requirement| attr_requirement_met(element, requirement))
}

fn attr_requirement_met(element: &Element, requirement: &AttrRequirement) -> bool {
    let Some(actual) = element.attrs.get(&requirement.name) else {
        return false;
    };
    match &requirement.expectation {
        AttrExpectation::Present => true,
        AttrExpectation::Equals(value) => actual == value,
        AttrExpectation::Prefix(value) => actual.starts_with(value.as_str()),
        AttrExpectation::Suffix(value) => actual.ends_with(value.as_str()),
        AttrExpectation::Substring(value) => actual.contains(value.as_str()),
    }
}

struct Scanner<'a> {
    whole: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(whole: &'a str) -> Self {
        Scanner {
            whole,
            bytes: whole.as_bytes(),
            pos: 0,
        }
    }

    fn reject<T>(&self) -> Result<T> {
        Err(Error::UnsupportedSelector(self.whole.to_string()))
    }

    fn done(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    // Only for positions known to hold an ASCII byte.
    fn bump(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn eat_pair(&mut self, first: u8, second: u8) -> bool {
        if self.bytes.get(self.pos) == Some(&first) && self.bytes.get(self.pos + 1) == Some(&second)
        {
            self.pos += 2;
            return true;
        }
        false
    }

    fn take_char(&mut self) -> Option<char> {
        let ch = self.whole[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn word(&mut self) -> Option<String> {
        self.word_with(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-'))
    }

    fn attr_word(&mut self) -> Option<String> {
        self.word_with(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b':'))
    }

    fn word_with(&mut self, keep: impl Fn(u8) -> bool) -> Option<String> {
        let from = self.pos;
        while matches!(self.peek(), Some(b) if keep(b)) {
            self.pos += 1;
        }
        if self.pos == from {
            return None;
        }
        self.whole.get(from..self.pos).map(str::to_string)
    }
}

fn compile(selector: &str) -> Result<Vec<MatchChain>> {
    let mut scanner = Scanner::new(selector);
    let mut chains = Vec::new();
    loop {
        chains.push(parse_chain(&mut scanner)?);
        scanner.skip_spaces();
        if scanner.eat(b',') {
            continue;
        }
        if scanner.done() {
            return Ok(chains);
        }
        return scanner.reject();
    }
}

fn parse_chain(scanner: &mut Scanner) -> Result<MatchChain> {
    let mut left_to_right: Vec<(Option<Relation>, Compound)> = Vec::new();
    loop {
        scanner.skip_spaces();
        if scanner.done() || scanner.peek() == Some(b',') {
            break;
        }
        let relation = if scanner.eat(b'>') {
            if left_to_right.is_empty() {
                return scanner.reject();
            }
            scanner.skip_spaces();
            Some(Relation::Parent)
        } else if left_to_right.is_empty() {
            None
        } else {
            Some(Relation::Ancestor)
        };
        if scanner.done() || matches!(scanner.peek(), Some(b',') | Some(b'>')) {
            return scanner.reject();
        }
        let compound = parse_compound(scanner)?;
        left_to_right.push((relation, compound));
    }

    let Some((final_relation, subject)) = left_to_right.pop() else {
        return scanner.reject();
    };
    let mut hops = Vec::with_capacity(left_to_right.len());
    let mut link = final_relation;
    while let Some((relation, compound)) = left_to_right.pop() {
        let Some(current) = link else {
            return scanner.reject();
        };
        hops.push((current, compound));
        link = relation;
    }
    Ok(MatchChain { subject, hops })
}

fn parse_compound(scanner: &mut Scanner) -> Result<Compound> {
    let mut compound = Compound::default();
    let mut any_piece = false;
    loop {
        match scanner.peek() {
            Some(b'*') => {
                if compound.universal {
                    return scanner.reject();
                }
                scanner.bump();
                compound.universal = true;
            }
            Some(b'#') => {
                scanner.bump();
                let Some(id) = scanner.word() else {
                    return scanner.reject();
                };
                if compound.id.replace(id).is_some() {
                    return scanner.reject();
                }
            }
            Some(b'.') => {
                scanner.bump();
                let Some(class_name) = scanner.word() else {
                    return scanner.reject();
                };
                compound.classes.push(class_name);
            }
            Some(b'[') => {
                scanner.bump();
                compound.attrs.push(parse_attr_requirement(scanner)?);
            }
            Some(b) if b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-') => {
                // A type selector may only open the compound.
                if any_piece {
                    return scanner.reject();
                }
                let Some(tag) = scanner.word() else {
                    return scanner.reject();
                };
                compound.tag = Some(tag.to_ascii_lowercase());
            }
            _ => break,
        }
        any_piece = true;
    }
    if !any_piece {
        return scanner.reject();
    }
    Ok(compound)
}

fn parse_attr_requirement(scanner: &mut Scanner) -> Result<AttrRequirement> {
    scanner.skip_spaces();
    let Some(name) = scanner.attr_word() else {
        return scanner.reject();
    };
    let name = name.to_ascii_lowercase();
    scanner.skip_spaces();
    if scanner.eat(b']') {
        return Ok(AttrRequirement {
            name,
            expectation: AttrExpectation::Present,
        });
    }
    let build: fn(String) -> AttrExpectation = if scanner.eat(b'=') {
        AttrExpectation::Equals
    } else if scanner.eat_pair(b'^', b'=') {
        AttrExpectation::Prefix
    } else if scanner.eat_pair(b'$', b'=') {
        AttrExpectation::Suffix
    } else if scanner.eat_pair(b'*', b'=') {
        AttrExpectation::Substring
    } else {
        return scanner.reject();
    };
    scanner.skip_spaces();
    let value = parse_attr_value(scanner)?;
    scanner.skip_spaces();
    if !scanner.eat(b']') {
        return scanner.reject();
    }
    Ok(AttrRequirement {
        name,
        expectation: build(value),
    })
}

fn parse_attr_value(scanner: &mut Scanner) -> Result<String> {
    let mut value = String::new();
    match scanner.peek() {
        Some(quote @ (b'"' | b'\'')) => {
            scanner.bump();
            loop {
                match scanner.peek() {
                    None => return scanner.reject(),
                    Some(b'\\') => {
                        scanner.bump();
                        match scanner.take_char() {
                            Some(escaped) => value.push(escaped),
                            None => return scanner.reject(),
                        }
                    }
                    Some(b) if b == quote => {
                        scanner.bump();
                        return Ok(value);
                    }
                    Some(_) => match scanner.take_char() {
                        Some(ch) => value.push(ch),
                        None => return scanner.reject(),
                    },
                }
            }
        }
        _ => loop {
            match scanner.peek() {
                None | Some(b']') => return Ok(value),
                Some(b) if b.is_ascii_whitespace() => return Ok(value),
                Some(b'\\') => {
                    scanner.bump();
                    match scanner.take_char() {
                        Some(escaped) => value.push(escaped),
                        None => return scanner.reject(),
                    }
                }
                Some(_) => match scanner.take_char() {
                    Some(ch) => value.push(ch),
                    None => return scanner.reject(),
                },
            }
        },
    }
}
