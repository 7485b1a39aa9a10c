// chatview-rs - Themeable chat view runtime for embedded hosts
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Date pattern translation into the target pattern syntax.
//!
//! Two source syntaxes are accepted:
//! - percent style (`%H:%M`), converted first into a quoted-literal pattern;
//! - quoted-literal style (`h:mm 'o''clock'`), converted into the bracketed
//!   target syntax understood by [`super::TargetPattern`].

/// Expansion of a `%X` escape, expressed in quoted-literal syntax.
fn percent_token(c: char) -> Option<&'static str> {
    match c {
        'M' => Some("mm"),
        'H' => Some("HH"),
        'S' => Some("ss"),
        'c' => Some("EEEE', 'MMMM' 'd', 'yyyy' 'G"),
        'A' => Some("EEEE"),
        'I' => Some("hh"),
        'p' => Some("a"),
        'Y' => Some("yyyy"),
        _ => None,
    }
}

/// Single-letter tokens with no equivalent in the target syntax.
fn quoted_token(c: char) -> char {
    match c {
        // hour in the locale's preferred cycle; the target only knows 12h/24h
        'j' => 'h',
        other => other,
    }
}

/// Converts a percent-style pattern into quoted-literal syntax.
///
/// Every literal run is quoted so its letters are never read as tokens.
/// A `%` followed by an unknown letter stays literal.
#[must_use]
pub fn convert_percent_pattern(format: &str) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    let mut literal = String::new();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '%'
            && let Some(token) = chars.peek().copied().and_then(percent_token)
        {
            chars.next();
            push_quoted_literal(&mut out, &literal);
            literal.clear();
            out.push_str(token);
        } else {
            literal.push(c);
        }
    }
    push_quoted_literal(&mut out, &literal);
    out
}

fn push_quoted_literal(out: &mut String, literal: &str) {
    if literal.is_empty() {
        return;
    }
    // A run of bare apostrophes must not be wrapped: `''''` would read as two
    // escaped apostrophes, not as a quoted one.
    if literal.chars().all(|c| c == '\'') {
        for _ in literal.chars() {
            out.push_str("''");
        }
        return;
    }
    out.push('\'');
    for c in literal.chars() {
        if c == '\'' {
            out.push_str("''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
}

/// Converts a quoted-literal pattern into the bracketed target syntax.
///
/// Quoted spans become `[...]`, `''` is a literal apostrophe and an
/// unterminated span is closed at end of input.
#[must_use]
pub fn convert_quoted_pattern(format: &str) -> String {
    let chars: Vec<char> = format.chars().collect();
    let mut out = String::with_capacity(format.len() + 4);
    let mut in_literal = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                if in_literal {
                    out.push('\'');
                } else {
                    out.push_str("[']");
                }
                i += 2;
            } else {
                out.push(if in_literal { ']' } else { '[' });
                in_literal = !in_literal;
                i += 1;
            }
            continue;
        }

        if in_literal {
            if c == ']' {
                out.push_str("]]");
            } else {
                out.push(c);
            }
            i += 1;
        } else if starts_with_run(&chars[i..], 'E', 4) {
            out.push_str("dddd");
            i += 4;
        } else if starts_with_run(&chars[i..], 'E', 3) {
            out.push_str("ddd");
            i += 3;
        } else {
            out.push(quoted_token(c));
            i += 1;
        }
    }

    if in_literal {
        out.push(']');
    }
    out
}

fn starts_with_run(chars: &[char], letter: char, len: usize) -> bool {
    chars.len() >= len && chars[..len].iter().all(|&c| c == letter)
}

/// Translates a pattern in either source syntax into the target syntax.
#[must_use]
pub fn translate_pattern(source: &str) -> String {
    if source.contains('%') {
        convert_quoted_pattern(&convert_percent_pattern(source))
    } else {
        convert_quoted_pattern(source)
    }
}
