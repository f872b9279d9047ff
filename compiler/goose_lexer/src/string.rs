//! String literal scanning and decoding.
//!
//! Finding where a literal ends needs more than a regex: `${...}` segments
//! may contain nested braces and nested string literals of their own. The
//! lexer calls [`literal_len`] from a logos callback to find the extent, and
//! [`decode`] later splits the literal into text and interpolation pieces.

use std::sync::Arc;

use goose_ir::Span;

use crate::{LexError, StrPiece};

/// Length in bytes of the literal body that follows an opening `"`,
/// including the closing quote. `None` if the literal is unterminated.
pub(crate) fn literal_len(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                let escaped = rest[i + 1..].chars().next().map_or(0, char::len_utf8);
                i += 1 + escaped;
            }
            b'"' => return Some(i + 1),
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                let close = interpolation_len(&rest[i + 2..])?;
                i += 2 + close + 1;
            }
            _ => i += 1,
        }
    }
    None
}

/// Offset of the `}` closing an interpolation whose body starts at `rest`.
fn interpolation_len(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => i += 1 + literal_len(&rest[i + 1..])?,
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' if depth == 0 => return Some(i),
            b'}' => {
                depth -= 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Decode a complete literal (quotes included) that starts at byte `start`
/// of its file.
pub(crate) fn decode(literal: &str, start: u32) -> Result<Vec<StrPiece>, LexError> {
    let body = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(literal);
    let base = start + 1;
    let mut pieces = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while let Some(c) = body[i..].chars().next() {
        match c {
            '\\' => {
                let (decoded, consumed) = decode_escape(&body[i + 1..])
                    .map_err(|msg| LexError::new(msg, Span::new(base + to_u32(i), base + to_u32(i + 2))))?;
                text.push(decoded);
                i += 1 + consumed;
            }
            '$' => {
                let after = &body[i + 1..];
                let piece_start = base + to_u32(i);
                if let Some(inner) = after.strip_prefix('{') {
                    let close = interpolation_len(inner).ok_or_else(|| {
                        LexError::new("unterminated interpolation", Span::point(piece_start))
                    })?;
                    flush(&mut text, &mut pieces);
                    pieces.push(StrPiece::Expr {
                        source: inner[..close].to_string(),
                        offset: piece_start + 2,
                    });
                    i += 2 + close + 1;
                } else if let Some(prop) = after.strip_prefix('#') {
                    let len = prop.find(|c| !is_ident_continue(c)).unwrap_or(prop.len());
                    if len == 0 || !prop.starts_with(is_ident_start) {
                        return Err(LexError::new(
                            "expected property name after $#",
                            Span::point(piece_start),
                        ));
                    }
                    flush(&mut text, &mut pieces);
                    pieces.push(StrPiece::ThisProp {
                        name: Arc::from(&prop[..len]),
                        span: Span::new(piece_start, piece_start + to_u32(len + 2)),
                    });
                    i += 2 + len;
                } else if after.starts_with(is_ident_start) {
                    let len = after.find(|c| !is_ident_continue(c)).unwrap_or(after.len());
                    flush(&mut text, &mut pieces);
                    pieces.push(StrPiece::Ident {
                        name: Arc::from(&after[..len]),
                        span: Span::new(piece_start + 1, piece_start + 1 + to_u32(len)),
                    });
                    i += 1 + len;
                } else {
                    return Err(LexError::new(
                        "expected identifier or '{' after $",
                        Span::point(piece_start),
                    ));
                }
            }
            _ => {
                text.push(c);
                i += c.len_utf8();
            }
        }
    }
    flush(&mut text, &mut pieces);
    Ok(pieces)
}

fn flush(text: &mut String, pieces: &mut Vec<StrPiece>) {
    if !text.is_empty() {
        pieces.push(StrPiece::Text(std::mem::take(text)));
    }
}

/// Decode one escape sequence; `rest` starts after the backslash.
/// Returns the character and how many bytes of `rest` it used.
fn decode_escape(rest: &str) -> Result<(char, usize), String> {
    let Some(c) = rest.chars().next() else {
        return Err("unterminated escape sequence".to_string());
    };
    let simple = match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        'a' => Some('\u{7}'),
        'b' => Some('\u{8}'),
        'f' => Some('\u{c}'),
        'v' => Some('\u{b}'),
        '0' => Some('\0'),
        '\\' | '"' | '$' => Some(c),
        _ => None,
    };
    if let Some(decoded) = simple {
        return Ok((decoded, c.len_utf8()));
    }
    let (digits, radix) = match c {
        'x' => (2, 16),
        'o' => (3, 8),
        'u' => (4, 16),
        'U' => (8, 16),
        _ => return Err(format!("unknown escape sequence \\{c}")),
    };
    let Some(text) = rest.get(1..=digits) else {
        return Err(format!("escape sequence \\{c} needs {digits} digits"));
    };
    let code = u32::from_str_radix(text, radix)
        .map_err(|_| format!("invalid digits in escape sequence \\{c}{text}"))?;
    let decoded = char::from_u32(code)
        .ok_or_else(|| "escape sequence is invalid Unicode code point".to_string())?;
    Ok((decoded, 1 + digits))
}
