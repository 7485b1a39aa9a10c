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

use chrono::{Datelike as _, NaiveDateTime, Timelike as _};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Year,
    YearShort,
    Month,
    MonthPadded,
    MonthAbbr,
    MonthName,
    Day,
    DayPadded,
    DayOfYear,
    DayOfYearPadded,
    WeekdayAbbr,
    WeekdayName,
    Hour24,
    Hour24Padded,
    Hour12,
    Hour12Padded,
    Minute,
    MinutePadded,
    Second,
    SecondPadded,
    /// Fractional seconds with the given number of digits (1..=9).
    Fraction(u8),
    MeridiemLower,
    MeridiemUpper,
    Era,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(String),
    Field(Field),
}

/// A pattern in the target syntax, compiled once and rendered many times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPattern {
    source: String,
    tokens: Vec<Token>,
}

impl TargetPattern {
    #[must_use]
    pub fn compile(pattern: &str) -> Self {
        let chars: Vec<char> = pattern.chars().collect();
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c == '[' {
                i += 1;
                let mut literal = String::new();
                while i < chars.len() {
                    if chars[i] == ']' {
                        if chars.get(i + 1) == Some(&']') {
                            literal.push(']');
                            i += 2;
                            continue;
                        }
                        i += 1;
                        break;
                    }
                    literal.push(chars[i]);
                    i += 1;
                }
                push_literal(&mut tokens, &literal);
            } else if c.is_ascii_alphabetic() {
                let start = i;
                while i < chars.len() && chars[i] == c {
                    i += 1;
                }
                match field_for(c, i - start) {
                    Some(field) => tokens.push(Token::Field(field)),
                    None => {
                        let run: String = chars[start..i].iter().collect();
                        push_literal(&mut tokens, &run);
                    }
                }
            } else {
                let mut buf = [0u8; 4];
                push_literal(&mut tokens, c.encode_utf8(&mut buf));
                i += 1;
            }
        }

        Self { source: pattern.to_owned(), tokens }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[must_use]
    pub fn render(&self, at: &NaiveDateTime) -> String {
        let mut out = String::with_capacity(self.source.len() + 8);
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Field(field) => render_field(&mut out, *field, at),
            }
        }
        out
    }
}

fn push_literal(tokens: &mut Vec<Token>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Token::Literal(prev)) = tokens.last_mut() {
        prev.push_str(text);
    } else {
        tokens.push(Token::Literal(text.to_owned()));
    }
}

fn field_for(letter: char, count: usize) -> Option<Field> {
    let field = match (letter, count) {
        ('Y' | 'y', 2) => Field::YearShort,
        ('Y' | 'y', _) => Field::Year,
        ('M', 1) => Field::Month,
        ('M', 2) => Field::MonthPadded,
        ('M', 3) => Field::MonthAbbr,
        ('M', _) => Field::MonthName,
        ('D' | 'd', 1) => Field::Day,
        ('D' | 'd', 2) => Field::DayPadded,
        ('D', 3) => Field::DayOfYear,
        ('D', _) => Field::DayOfYearPadded,
        ('d', 3) | ('E', 1..=3) => Field::WeekdayAbbr,
        ('d' | 'E', _) => Field::WeekdayName,
        ('H', 1) => Field::Hour24,
        ('H', _) => Field::Hour24Padded,
        ('h', 1) => Field::Hour12,
        ('h', _) => Field::Hour12Padded,
        ('m', 1) => Field::Minute,
        ('m', _) => Field::MinutePadded,
        ('s', 1) => Field::Second,
        ('s', _) => Field::SecondPadded,
        #[allow(clippy::cast_possible_truncation)]
        ('S', n) => Field::Fraction(n.min(9) as u8),
        ('a', _) => Field::MeridiemLower,
        ('A', _) => Field::MeridiemUpper,
        ('G', _) => Field::Era,
        _ => return None,
    };
    Some(field)
}

fn render_field(out: &mut String, field: Field, at: &NaiveDateTime) {
    // Writing into a String cannot fail.
    let _ = match field {
        Field::Year => write!(out, "{:04}", at.year()),
        Field::YearShort => write!(out, "{:02}", at.year().rem_euclid(100)),
        Field::Month => write!(out, "{}", at.month()),
        Field::MonthPadded => write!(out, "{:02}", at.month()),
        Field::MonthAbbr => write!(out, "{}", at.format("%b")),
        Field::MonthName => write!(out, "{}", at.format("%B")),
        Field::Day => write!(out, "{}", at.day()),
        Field::DayPadded => write!(out, "{:02}", at.day()),
        Field::DayOfYear => write!(out, "{}", at.ordinal()),
        Field::DayOfYearPadded => write!(out, "{:03}", at.ordinal()),
        Field::WeekdayAbbr => write!(out, "{}", at.format("%a")),
        Field::WeekdayName => write!(out, "{}", at.format("%A")),
        Field::Hour24 => write!(out, "{}", at.hour()),
        Field::Hour24Padded => write!(out, "{:02}", at.hour()),
        Field::Hour12 => write!(out, "{}", at.hour12().1),
        Field::Hour12Padded => write!(out, "{:02}", at.hour12().1),
        Field::Minute => write!(out, "{}", at.minute()),
        Field::MinutePadded => write!(out, "{:02}", at.minute()),
        Field::Second => write!(out, "{}", at.second()),
        Field::SecondPadded => write!(out, "{:02}", at.second()),
        Field::Fraction(digits) => {
            let digits = u32::from(digits.max(1));
            let value = at.nanosecond() % 1_000_000_000 / 10u32.pow(9 - digits);
            write!(out, "{value:0width$}", width = digits as usize)
        }
        Field::MeridiemLower => out.write_str(if at.hour12().0 { "pm" } else { "am" }),
        Field::MeridiemUpper => out.write_str(if at.hour12().0 { "PM" } else { "AM" }),
        Field::Era => out.write_str(if at.year() > 0 { "AD" } else { "BC" }),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap().and_hms_opt(h, mi, s).unwrap()
    }

    #[test]
    fn compiles_fields_and_literals() {
        let pattern = TargetPattern::compile("HH[:]mm");
        assert_eq!(
            pattern.tokens(),
            &[
                Token::Field(Field::Hour24Padded),
                Token::Literal(":".to_owned()),
                Token::Field(Field::MinutePadded),
            ]
        );
    }

    #[test]
    fn adjacent_literals_merge() {
        let pattern = TargetPattern::compile("[a]-[b]");
        assert_eq!(pattern.tokens(), &[Token::Literal("a-b".to_owned())]);
    }

    #[test]
    fn renders_twelve_hour_clock() {
        let pattern = TargetPattern::compile("h:mm a");
        assert_eq!(pattern.render(&at(2024, 3, 1, 21, 7, 0)), "9:07 pm");
        assert_eq!(pattern.render(&at(2024, 3, 1, 0, 30, 0)), "12:30 am");
    }

    #[test]
    fn renders_full_date() {
        let pattern = TargetPattern::compile("dddd[, ]MMMM[ ]d[, ]yyyy[ ]G");
        assert_eq!(pattern.render(&at(2024, 1, 1, 9, 5, 0)), "Monday, January 1, 2024 AD");
    }

    #[test]
    fn bracket_literal_keeps_letters() {
        let pattern = TargetPattern::compile("[at] HH");
        assert_eq!(pattern.render(&at(2024, 1, 1, 9, 5, 0)), "at 09");
    }

    #[test]
    fn doubled_bracket_inside_literal() {
        let pattern = TargetPattern::compile("[[x]]]");
        assert_eq!(pattern.render(&at(2024, 1, 1, 9, 5, 0)), "[x]");
    }

    #[test]
    fn unterminated_bracket_runs_to_end() {
        let pattern = TargetPattern::compile("HH [open");
        assert_eq!(pattern.render(&at(2024, 1, 1, 9, 5, 0)), "09 open");
    }

    #[test]
    fn unknown_letters_are_literal() {
        let pattern = TargetPattern::compile("Q HH");
        assert_eq!(pattern.render(&at(2024, 1, 1, 9, 5, 0)), "Q 09");
    }

    #[test]
    fn fraction_digits() {
        let t = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_milli_opt(9, 5, 0, 42)
            .unwrap();
        assert_eq!(TargetPattern::compile("ss.SSS").render(&t), "00.042");
    }
}
