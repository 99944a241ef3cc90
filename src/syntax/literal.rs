//! Go string literal decoding and literal-site discovery

use tree_sitter::Node;

use super::{visit_all, GoFile, GO_GRAMMAR};

/// A string literal that may be rewritten into a run-time decoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralSite {
    pub start_byte: usize,
    pub end_byte: usize,
    /// Decoded literal value
    pub value: Vec<u8>,
}

impl GoFile {
    /// String literals that can be replaced by a non-constant expression.
    ///
    /// Skips literals under constant contexts (const declarations, import
    /// paths, array lengths), struct field tags, empty literals, and values
    /// assigned to a `var` declared with a non-`string` type.
    pub fn string_literals(&self) -> Vec<LiteralSite> {
        let mut sites = Vec::new();
        visit_all(&self.root(), |node| {
            if !GO_GRAMMAR.is_string_literal(node.kind()) || !self.is_rewritable(node) {
                return;
            }
            let Some(value) = unquote(self.text(node)) else {
                return;
            };
            if value.is_empty() {
                return;
            }
            sites.push(LiteralSite {
                start_byte: node.start_byte(),
                end_byte: node.end_byte(),
                value,
            });
        });
        sites
    }

    fn is_rewritable(&self, node: &Node) -> bool {
        if let Some(parent) = node.parent() {
            if parent.kind() == GO_GRAMMAR.field_decl
                && parent.child_by_field_name("tag").as_ref() == Some(node)
            {
                return false;
            }
            if let Some(spec) = parent.parent() {
                if spec.kind() == GO_GRAMMAR.var_spec
                    && parent.kind() == GO_GRAMMAR.expression_list {
                    let typed_non_string = spec
                        .child_by_field_name("type")
                        .is_some_and(|t| self.text(&t) != "string");
                    if typed_non_string {
                        return false;
                    }
                }
            }
        }

        let mut current = node.parent();
        while let Some(ancestor) = current {
            if GO_GRAMMAR.is_constant_context(ancestor.kind()) {
                return false;
            }
            current = ancestor.parent();
        }
        true
    }
}

/// Decode a Go string literal (interpreted or raw) to its byte value.
///
/// Returns `None` for text that is not a well-formed literal.
pub fn unquote(text: &str) -> Option<Vec<u8>> {
    if text.len() >= 2 && text.starts_with('`') && text.ends_with('`') {
        let body = &text[1..text.len() - 1];
        return Some(body.bytes().filter(|&b| b != b'\r').collect());
    }
    if text.len() < 2 || !text.starts_with('"') || !text.ends_with('"') {
        return None;
    }

    let body = &text[1..text.len() - 1];
    let mut out = Vec::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next()? {
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0c),
            'n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            'v' => out.push(0x0b),
            '\\' => out.push(b'\\'),
            '"' => out.push(b'"'),
            '\'' => out.push(b'\''),
            'x' => out.push(u8::try_from(take_hex(&mut chars, 2)?).ok()?),
            'u' => push_char(&mut out, take_hex(&mut chars, 4)?)?,
            'U' => push_char(&mut out, take_hex(&mut chars, 8)?)?,
            d @ '0'..='7' => {
                let mut value = d.to_digit(8)?;
                for _ in 0..2 {
                    value = value * 8 + chars.next()?.to_digit(8)?;
                }
                out.push(u8::try_from(value).ok()?);
            }
            _ => return None,
        }
    }
    Some(out)
}

fn take_hex(chars: &mut impl Iterator<Item = char>, digits: usize) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..digits {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}

fn push_char(out: &mut Vec<u8>, code: u32) -> Option<()> {
    let c = char::from_u32(code)?;
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    Some(())
}

/// Render bytes as an interpreted Go literal made of `\xNN` escapes only.
pub fn hex_escaped(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 4 + 2);
    out.push('"');
    for b in bytes {
        out.push_str(&format!("\\x{:02x}", b));
    }
    out.push('"');
    out
}
