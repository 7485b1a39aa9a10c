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

//! Nickname colors for group chats.

use std::collections::HashMap;

const BLACK: &str = "#000000";
const MIN_SATURATION: f64 = 150.0;
const RAISED_SATURATION: f64 = 250.0;
const MAX_VALUE: f64 = 210.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NickColoring {
    Off,
    /// Each nick gets a stable entry of the list; the last entry is reserved
    /// for the local user.
    Palette(Vec<String>),
    /// Colors derived from the nick bytes.
    Hashed,
}

#[derive(Debug, Clone)]
pub struct NickColorizer {
    coloring: NickColoring,
    nicks: HashMap<String, usize>,
}

impl NickColorizer {
    #[must_use]
    pub fn new(coloring: NickColoring) -> Self {
        Self { coloring, nicks: HashMap::new() }
    }

    #[must_use]
    pub fn coloring(&self) -> &NickColoring {
        &self.coloring
    }

    pub fn set_coloring(&mut self, coloring: NickColoring) {
        self.coloring = coloring;
    }

    /// Color for `nick` as `#rrggbb`.
    pub fn color(&mut self, nick: &str, is_self: bool) -> String {
        let bare = nick.trim_matches('_');
        let sender = if is_self || bare.is_empty() {
            None
        } else {
            let next = self.nicks.len();
            Some(*self.nicks.entry(bare.to_owned()).or_insert(next))
        };

        match &self.coloring {
            NickColoring::Off => BLACK.to_owned(),
            NickColoring::Hashed => hashed_color(bare),
            NickColoring::Palette(colors) => {
                let Some(last) = colors.last() else {
                    return BLACK.to_owned();
                };
                match sender {
                    Some(index) if colors.len() > 1 => colors[index % (colors.len() - 1)].clone(),
                    _ => last.clone(),
                }
            }
        }
    }
}

fn hashed_color(nick: &str) -> String {
    let mut bytes = nick.as_bytes().to_vec();
    if bytes.is_empty() {
        return BLACK.to_owned();
    }
    while bytes.len() < 4 {
        bytes.extend_from_within(..);
    }
    let hex: String = bytes.iter().take(3).map(|b| format!("{b:02x}")).collect();
    let [a, b, c, d, ..] = *hex.as_bytes() else {
        return BLACK.to_owned();
    };
    let mut num = u32::from_le_bytes([a, b, c, d]);
    num ^= num << 4;
    let [r, g, b, _] = num.to_le_bytes();

    let (hue, mut saturation, mut value) = rgb_to_hsv(r, g, b);
    if saturation < MIN_SATURATION {
        saturation = RAISED_SATURATION;
    }
    if value > MAX_VALUE {
        value = MAX_VALUE;
    }
    let (r, g, b) = hsv_to_rgb(hue, saturation, value);
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Hue in degrees, saturation and value on a 0..=255 scale.
fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let saturation = if max > 0.0 { (delta / max * 255.0).round() } else { 0.0 };
    let hue = if delta < f64::EPSILON {
        0.0
    } else if (max - r).abs() < f64::EPSILON {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if (max - g).abs() < f64::EPSILON {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    (hue, saturation, max)
}

fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> (u8, u8, u8) {
    let s = saturation / 255.0;
    let c = value * s;
    let h = hue / 60.0;
    let x = c * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match h {
        h if h < 1.0 => (c, x, 0.0),
        h if h < 2.0 => (x, c, 0.0),
        h if h < 3.0 => (0.0, c, x),
        h if h < 4.0 => (0.0, x, c),
        h if h < 5.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = value - c;
    (channel(r + m), channel(g + m), channel(b + m))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn palette() -> NickColoring {
        NickColoring::Palette(vec!["#111111".into(), "#222222".into(), "#333333".into()])
    }

    #[test]
    fn palette_assignment_is_stable() {
        let mut colors = NickColorizer::new(palette());
        assert_eq!(colors.color("alice", false), "#111111");
        assert_eq!(colors.color("bob", false), "#222222");
        assert_eq!(colors.color("carol", false), "#111111");
        assert_eq!(colors.color("_bob_", false), "#222222");
        assert_eq!(colors.color("alice", false), "#111111");
    }

    #[test]
    fn self_and_empty_nicks_get_the_last_color() {
        let mut colors = NickColorizer::new(palette());
        assert_eq!(colors.color("me", true), "#333333");
        assert_eq!(colors.color("__", false), "#333333");
    }

    #[test]
    fn off_and_empty_palette_are_black() {
        assert_eq!(NickColorizer::new(NickColoring::Off).color("x", false), BLACK);
        assert_eq!(NickColorizer::new(NickColoring::Palette(Vec::new())).color("x", false), BLACK);
    }

    #[test]
    fn hashed_colors_are_deterministic_and_not_too_bright() {
        let mut colors = NickColorizer::new(NickColoring::Hashed);
        let first = colors.color("alice", false);
        assert_eq!(first, colors.color("alice", false));
        assert_eq!(first.len(), 7);
        let (_, _, value) = {
            let n = u32::from_str_radix(&first[1..], 16).unwrap();
            let [b, g, r, _] = n.to_le_bytes();
            rgb_to_hsv(r, g, b)
        };
        assert!(value <= MAX_VALUE);
    }

    #[test]
    fn hsv_round_trips_primary_colors() {
        let (h, s, v) = rgb_to_hsv(255, 0, 0);
        assert_eq!(hsv_to_rgb(h, s, v), (255, 0, 0));
        let (h, s, v) = rgb_to_hsv(0, 128, 255);
        assert_eq!(hsv_to_rgb(h, s, v), (0, 128, 255));
    }
}
