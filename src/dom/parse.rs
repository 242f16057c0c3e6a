//! Lenient HTML fragment parsing.
//!
//! Mirrors the forgiving behavior of assigning to a template element's
//! `innerHTML`: parsing is total, malformed input degrades best-effort,
//! and the result is whatever tree could be made of it. Inter-element
//! whitespace is dropped; it carries no meaning for an update cycle.

use std::collections::BTreeMap;

use super::Document;

/// Parses HTML into a fresh detached document. Top-level nodes become
/// children of the document node. Never fails.
pub fn parse_fragment(html: &str) -> Document {
    let mut doc = Document::new();
    let mut stack = vec![doc.root()];
    let bytes = html.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        if starts_with_at(bytes, i, b"<!--") {
            match find_subslice(bytes, i + 4, b"-->") {
                Some(end) => i = end + 3,
                None => break,
            }
            continue;
        }

        // Doctype and other markup declarations are skipped wholesale.
        if starts_with_at(bytes, i, b"<!") {
            i = skip_past(bytes, i, b'>');
            continue;
        }

        if starts_with_at(bytes, i, b"</") {
            let (tag, next) = scan_end_tag(html, i);
            i = next;
            close_open_tag(&doc, &mut stack, &tag);
            continue;
        }

        if bytes[i] == b'<' && i + 1 < bytes.len() && bytes[i + 1].is_ascii_alphabetic() {
            let (tag, attrs, self_closing, next) = scan_start_tag(html, i);
            i = next;

            let parent = *stack.last().unwrap_or(&doc.root());
            let node = doc.create_element(Some(parent), tag.clone(), attrs);

            // script/style bodies are raw text up to the closing tag.
            if is_raw_text(&tag) {
                let close = find_end_tag(bytes, i, tag.as_bytes()).unwrap_or(bytes.len());
                if let Some(body) = html.get(i..close) {
                    if !body.is_empty() {
                        doc.create_text(Some(node), body);
                    }
                }
                i = skip_past(bytes, close, b'>');
                continue;
            }

            if !self_closing && !is_void(&tag) {
                stack.push(node);
            }
            continue;
        }

        // Text run: everything up to the next tag-ish '<'. A lone '<'
        // followed by something that cannot start markup is text.
        let text_start = i;
        i += 1;
        while i < bytes.len() && !is_markup_start(bytes, i) {
            i += 1;
        }
        if let Some(text) = html.get(text_start..i) {
            if !text.trim().is_empty() {
                let parent = *stack.last().unwrap_or(&doc.root());
                doc.create_text(Some(parent), decode_entities(text));
            }
        }
    }

    doc
}

fn is_markup_start(bytes: &[u8], i: usize) -> bool {
    bytes[i] == b'<'
        && (starts_with_at(bytes, i, b"</")
            || starts_with_at(bytes, i, b"<!")
            || (i + 1 < bytes.len() && bytes[i + 1].is_ascii_alphabetic()))
}

/// Pops the open-element stack down through the nearest matching tag.
/// An end tag with no matching open element is dropped, like the platform
/// parser drops it.
fn close_open_tag(doc: &Document, stack: &mut Vec<super::NodeId>, tag: &str) {
    if let Some(depth) = stack
        .iter()
        .rposition(|node| doc.tag_name(*node) == Some(tag))
    {
        stack.truncate(depth);
    }
}

fn scan_start_tag(html: &str, at: usize) -> (String, BTreeMap<String, String>, bool, usize) {
    let bytes = html.as_bytes();
    let mut i = at + 1;

    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    let tag = html[tag_start..i].to_ascii_lowercase();

    let mut attrs = BTreeMap::new();
    let mut self_closing = false;

    loop {
        skip_ws(bytes, &mut i);
        if i >= bytes.len() {
            break;
        }
        if bytes[i] == b'>' {
            i += 1;
            break;
        }
        if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'>') {
            self_closing = true;
            i += 2;
            break;
        }

        let name_start = i;
        while i < bytes.len() && is_attr_name_char(bytes[i]) {
            i += 1;
        }
        if i == name_start {
            // Unparseable byte inside the tag; step over it.
            i += 1;
            continue;
        }
        let name = html[name_start..i].to_ascii_lowercase();

        skip_ws(bytes, &mut i);
        let value = if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            skip_ws(bytes, &mut i);
            scan_attr_value(html, bytes, &mut i)
        } else {
            // Valueless attribute, like `getAttribute` reporting "".
            String::new()
        };
        attrs.insert(name, value);
    }

    (tag, attrs, self_closing, i)
}

fn scan_end_tag(html: &str, at: usize) -> (String, usize) {
    let bytes = html.as_bytes();
    let mut i = at + 2;
    skip_ws(bytes, &mut i);
    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    let tag = html[tag_start..i].to_ascii_lowercase();
    (tag, skip_past(bytes, i, b'>'))
}

fn scan_attr_value(html: &str, bytes: &[u8], i: &mut usize) -> String {
    if *i >= bytes.len() {
        return String::new();
    }
    if bytes[*i] == b'"' || bytes[*i] == b'\'' {
        let quote = bytes[*i];
        *i += 1;
        let start = *i;
        while *i < bytes.len() && bytes[*i] != quote {
            *i += 1;
        }
        let value = decode_entities(&html[start..*i]);
        if *i < bytes.len() {
            *i += 1;
        }
        return value;
    }

    let start = *i;
    while *i < bytes.len()
        && !bytes[*i].is_ascii_whitespace()
        && bytes[*i] != b'>'
        && !(bytes[*i] == b'/' && bytes.get(*i + 1) == Some(&b'>'))
    {
        *i += 1;
    }
    decode_entities(&html[start..*i])
}

/// Resolves the handful of character references that matter for markup
/// round-tripping, plus numeric forms. Unknown references pass through.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let window = rest.len().min(32);
        let Some(end) = rest.as_bytes()[..window].iter().position(|&b| b == b';') else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let name = &rest[1..end];
        let decoded = match name {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => decode_numeric(name),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_numeric(name: &str) -> Option<char> {
    let digits = name.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

/// Index just past the next `stop` byte, or end of input.
fn skip_past(bytes: &[u8], mut i: usize, stop: u8) -> usize {
    while i < bytes.len() && bytes[i] != stop {
        i += 1;
    }
    if i < bytes.len() { i + 1 } else { i }
}

fn starts_with_at(bytes: &[u8], at: usize, prefix: &[u8]) -> bool {
    bytes.len() >= at + prefix.len() && &bytes[at..at + prefix.len()] == prefix
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from > bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| from + pos)
}

/// Start of `</tag` (case-insensitive) at or after `from`.
fn find_end_tag(bytes: &[u8], from: usize, tag: &[u8]) -> Option<usize> {
    let mut i = from;
    while i + tag.len() + 2 <= bytes.len() {
        if bytes[i] == b'<'
            && bytes[i + 1] == b'/'
            && bytes[i + 2..i + 2 + tag.len()].eq_ignore_ascii_case(tag)
        {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn is_tag_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

fn is_attr_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

pub(crate) fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

pub(crate) fn is_raw_text(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}
