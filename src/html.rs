use std::collections::HashMap;

use crate::dom::{Dom, NodeId};
use crate::{Error, Result};

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose body is kept as literal text instead of markup.
const RAW_TEXT_TAGS: &[&str] = &["script", "style", "title", "noscript"];

/// Start tags that imply the end of an open paragraph.
const PARAGRAPH_CLOSERS: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "div", "dl", "fieldset", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hgroup", "hr",
    "main", "menu", "nav", "ol", "p", "pre", "search", "section", "table", "ul",
];

pub(crate) fn parse_html(html: &str) -> Result<Dom> {
    HtmlParser::new(html).run()
}

struct HtmlParser<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    dom: Dom,
    open: Vec<NodeId>,
}

struct StartTag {
    name: String,
    attrs: HashMap<String, String>,
    self_closing: bool,
}

impl<'a> HtmlParser<'a> {
    fn new(source: &'a str) -> Self {
        let dom = Dom::new();
        let open = vec![dom.root];
        HtmlParser {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            dom,
            open,
        }
    }

    fn run(mut self) -> Result<Dom> {
        while self.pos < self.bytes.len() {
            if self.looking_at(b"<!--") {
                self.skip_comment()?;
            } else if self.looking_at(b"</") {
                self.drop_closed_element()?;
            } else if self.looking_at(b"<!") {
                self.skip_declaration()?;
            } else if self.looking_at(b"<") {
                self.open_element()?;
            } else {
                self.collect_text();
            }
        }
        self.dom.initialize_form_control_values();
        Ok(self.dom)
    }

    fn fail(&self, message: impl Into<String>) -> Error {
        Error::HtmlParse(message.into())
    }

    fn looking_at(&self, pattern: &[u8]) -> bool {
        self.bytes[self.pos..].starts_with(pattern)
    }

    fn skip_ws(&mut self) {
        while self.bytes.get(self.pos).is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn take_lower_word(&mut self, keep: fn(u8) -> bool) -> String {
        let from = self.pos;
        while self.bytes.get(self.pos).is_some_and(|&b| keep(b)) {
            self.pos += 1;
        }
        self.source[from..self.pos].to_ascii_lowercase()
    }

    fn skip_comment(&mut self) -> Result<()> {
        match seek(self.bytes, self.pos + 4, b"-->") {
            Some(at) => {
                self.pos = at + 3;
                Ok(())
            }
            None => Err(self.fail("unclosed HTML comment")),
        }
    }

    fn skip_declaration(&mut self) -> Result<()> {
        self.pos += 2;
        let mut quote: Option<u8> = None;
        let mut bracket_depth = 0usize;
        while let Some(&byte) = self.bytes.get(self.pos) {
            self.pos += 1;
            match quote {
                Some(open) if byte == open => quote = None,
                Some(_) => {}
                None => match byte {
                    b'"' | b'\'' => quote = Some(byte),
                    b'[' => bracket_depth += 1,
                    b']' => bracket_depth = bracket_depth.saturating_sub(1),
                    b'>' if bracket_depth == 0 => return Ok(()),
                    _ => {}
                },
            }
        }
        Err(self.fail("unclosed declaration tag"))
    }

    fn drop_closed_element(&mut self) -> Result<()> {
        let name = self.read_end_tag()?;
        // End tags with no matching open element are ignored.
        let found = (1..self.open.len())
            .rev()
            .find(|&depth| self.dom.tag_name(self.open[depth]) == Some(name.as_str()));
        if let Some(depth) = found {
            self.open.truncate(depth);
        }
        Ok(())
    }

    fn open_element(&mut self) -> Result<()> {
        let StartTag {
            name,
            attrs,
            self_closing,
        } = self.read_start_tag()?;
        self.settle_implied_ends(&name);
        let parent = self.insertion_point();
        let node = self.dom.create_element(Some(parent), &name, attrs);
        if RAW_TEXT_TAGS.contains(&name.as_str()) {
            return self.capture_raw_text(node, &name);
        }
        if !self_closing && !VOID_TAGS.contains(&name.as_str()) {
            self.open.push(node);
        }
        Ok(())
    }

    fn insertion_point(&self) -> NodeId {
        self.open.last().copied().unwrap_or(self.dom.root)
    }

    fn settle_implied_ends(&mut self, incoming: &str) {
        if PARAGRAPH_CLOSERS.contains(&incoming) {
            self.close_nearest_open(&["p"], &[]);
        }
        match incoming {
            "li" => self.close_nearest_open(&["li"], &["ul", "ol"]),
            "dt" | "dd" => self.close_nearest_open(&["dt", "dd"], &["dl"]),
            _ => {}
        }
    }

    // Closes the nearest open target element, unless a fence element
    // sits between it and the insertion point.
    fn close_nearest_open(&mut self, targets: &[&str], fences: &[&str]) {
        for depth in (1..self.open.len()).rev() {
            let Some(tag) = self.dom.tag_name(self.open[depth]) else {
                continue;
            };
            if targets.contains(&tag) {
                self.open.truncate(depth);
                return;
            }
            if fences.contains(&tag) {
                return;
            }
        }
    }

    fn read_start_tag(&mut self) -> Result<StartTag> {
        if !self.looking_at(b"<") {
            return Err(self.fail("expected '<'"));
        }
        self.pos += 1;
        self.skip_ws();
        let name = self.take_lower_word(is_tag_name_byte);
        if name.is_empty() {
            return Err(self.fail("empty tag name"));
        }
        let mut attrs = HashMap::new();
        loop {
            self.skip_ws();
            let Some(&next) = self.bytes.get(self.pos) else {
                return Err(self.fail("unclosed start tag"));
            };
            if next == b'>' {
                self.pos += 1;
                return Ok(StartTag {
                    name,
                    attrs,
                    self_closing: false,
                });
            }
            if self.looking_at(b"/>") {
                self.pos += 2;
                return Ok(StartTag {
                    name,
                    attrs,
                    self_closing: true,
                });
            }
            if !is_attr_name_byte(next) {
                // Junk inside a tag is skipped to the next boundary.
                self.skip_tag_junk();
                continue;
            }
            let attr = self.take_lower_word(is_attr_name_byte);
            self.skip_ws();
            let value = if self.looking_at(b"=") {
                self.pos += 1;
                self.skip_ws();
                self.read_attr_value()?
            } else {
                "true".to_string()
            };
            attrs.insert(attr, value);
        }
    }

    fn skip_tag_junk(&mut self) {
        while let Some(&byte) = self.bytes.get(self.pos) {
            if byte.is_ascii_whitespace() || byte == b'>' || self.looking_at(b"/>") {
                return;
            }
            self.pos += 1;
        }
    }

    fn read_attr_value(&mut self) -> Result<String> {
        match self.bytes.get(self.pos).copied() {
            Some(quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                let from = self.pos;
                while let Some(&byte) = self.bytes.get(self.pos) {
                    if byte == quote {
                        let raw = &self.source[from..self.pos];
                        self.pos += 1;
                        return Ok(decode_character_references(raw));
                    }
                    self.pos += 1;
                }
                Err(self.fail("unclosed quoted attribute value"))
            }
            _ => {
                let from = self.pos;
                while let Some(&byte) = self.bytes.get(self.pos) {
                    if byte.is_ascii_whitespace() || byte == b'>' || self.looking_at(b"/>") {
                        break;
                    }
                    self.pos += 1;
                }
                Ok(decode_character_references(&self.source[from..self.pos]))
            }
        }
    }

    fn read_end_tag(&mut self) -> Result<String> {
        if !self.looking_at(b"</") {
            return Err(self.fail("expected end tag"));
        }
        self.pos += 2;
        self.skip_ws();
        let name = self.take_lower_word(is_tag_name_byte);
        while let Some(&byte) = self.bytes.get(self.pos) {
            self.pos += 1;
            if byte == b'>' {
                return Ok(name);
            }
        }
        Err(self.fail("unclosed end tag"))
    }

    fn capture_raw_text(&mut self, node: NodeId, name: &str) -> Result<()> {
        let Some(close) = self.find_matching_end_tag(name) else {
            return Err(self.fail(format!("unclosed <{name}>")));
        };
        let body = &self.source[self.pos..close];
        if !body.is_empty() {
            let content = if name == "title" {
                decode_character_references(body)
            } else {
                body.to_string()
            };
            self.dom.create_text(Some(node), content);
        }
        self.pos = close;
        self.read_end_tag()?;
        Ok(())
    }

    fn find_matching_end_tag(&self, name: &str) -> Option<usize> {
        let pattern = name.as_bytes();
        let mut at = self.pos;
        while at + 2 + pattern.len() <= self.bytes.len() {
            let candidate = &self.bytes[at..];
            if candidate.starts_with(b"</")
                && candidate[2..2 + pattern.len()].eq_ignore_ascii_case(pattern)
                && raw_end_tag_boundary(candidate.get(2 + pattern.len()).copied())
            {
                return Some(at);
            }
            at += 1;
        }
        None
    }

    fn collect_text(&mut self) {
        let from = self.pos;
        while self.bytes.get(self.pos).is_some_and(|&b| b != b'<') {
            self.pos += 1;
        }
        let decoded = decode_character_references(&self.source[from..self.pos]);
        let parent = self.insertion_point();
        let text = if self.dom.tag_name(parent) == Some("pre")
            && self.dom.node(parent).children.is_empty()
        {
            trim_leading_newline(&decoded).to_string()
        } else {
            decoded
        };
        if !text.is_empty() {
            self.dom.create_text(Some(parent), text);
        }
    }
}

fn raw_end_tag_boundary(byte: Option<u8>) -> bool {
    match byte {
        None => true,
        Some(b) => b == b'>' || b == b'/' || b.is_ascii_whitespace(),
    }
}

fn seek(bytes: &[u8], from: usize, pattern: &[u8]) -> Option<usize> {
    let tail = bytes.get(from..)?;
    tail.windows(pattern.len())
        .position(|window| window == pattern)
        .map(|offset| from + offset)
}

fn trim_leading_newline(text: &str) -> &str {
    if let Some(rest) = text.strip_prefix("\r\n") {
        return rest;
    }
    text.strip_prefix(['\n', '\r']).unwrap_or(text)
}

fn is_tag_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_')
}

fn is_attr_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b':')
}

fn decode_character_references(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let (body, after) = match tail.find(';') {
            Some(semi) if !tail[..semi].contains('&') => (&tail[..semi], semi + 1),
            _ => {
                let run = reference_body_run(tail);
                (&tail[..run], run)
            }
        };
        match decode_character_reference(body) {
            Some(decoded) => {
                out.push_str(&decoded);
                rest = &tail[after..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

fn reference_body_run(tail: &str) -> usize {
    tail.char_indices()
        .take_while(|(_, ch)| ch.is_ascii_alphanumeric() || *ch == '#')
        .last()
        .map(|(index, ch)| index + ch.len_utf8())
        .unwrap_or(0)
}

fn decode_character_reference(body: &str) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    if let Some(numeric) = body.strip_prefix('#') {
        return decode_numeric_character_reference(numeric);
    }
    decode_named_character_reference(body)
}

fn decode_numeric_character_reference(digits: &str) -> Option<String> {
    let code = if let Some(hex) = digits.strip_prefix(['x', 'X']) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse::<u32>().ok()?
    };
    char::from_u32(code).map(|ch| ch.to_string())
}

fn decode_named_character_reference(name: &str) -> Option<String> {
    let decoded = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "agrave" => "\u{e0}",
        "ccedil" => "\u{e7}",
        "eacute" => "\u{e9}",
        "egrave" => "\u{e8}",
        "ntilde" => "\u{f1}",
        "ouml" => "\u{f6}",
        "uuml" => "\u{fc}",
        "deg" => "\u{b0}",
        "plusmn" => "\u{b1}",
        "middot" => "\u{b7}",
        "laquo" => "\u{ab}",
        "raquo" => "\u{bb}",
        "times" => "\u{d7}",
        "divide" => "\u{f7}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "hellip" => "\u{2026}",
        "euro" => "\u{20ac}",
        "pound" => "\u{a3}",
        "yen" => "\u{a5}",
        "trade" => "\u{2122}",
        _ => return None,
    };
    Some(decoded.to_string())
}
