//! Colour helpers: alpha blending toward a background and colour parsing.

use std::str::FromStr;

use ratatui::style::Color;

use crate::error::{Result, TypewriterError};

/// Fully transparent alpha.
pub const TRANSPARENT: f32 = 0.0;

/// Fully opaque alpha.
pub const OPAQUE: f32 = 1.0;

/// Interpolates between two colors based on a factor t (0.0 to 1.0).
///
/// Named and indexed colours are resolved to their xterm RGB values first.
/// If either side has no RGB equivalent (`Color::Reset`), the nearer
/// endpoint is returned unchanged.
pub fn interpolate_color(from: Color, to: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);

    let (Some((r1, g1, b1)), Some((r2, g2, b2))) = (extract_rgb(from), extract_rgb(to)) else {
        return if t < 0.5 { from } else { to };
    };

    Color::Rgb(lerp_u8(r1, r2, t), lerp_u8(g1, g2, t), lerp_u8(b1, b2, t))
}

/// Applies `alpha` to `base` by blending it over `background`.
///
/// Alpha 1 returns `base` untouched so named colours survive a full reveal.
pub fn with_alpha(base: Color, background: Color, alpha: f32) -> Color {
    if alpha >= OPAQUE {
        base
    } else {
        interpolate_color(background, base, alpha)
    }
}

/// Parses a colour name, `#rrggbb` hex string or palette index.
pub fn parse_color(value: &str) -> Result<Color> {
    Color::from_str(value.trim()).map_err(|_| TypewriterError::InvalidColor(value.to_string()))
}

/// Resolves a colour to RGB components using the xterm palette.
pub(crate) fn extract_rgb(color: Color) -> Option<(u8, u8, u8)> {
    let rgb = match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Indexed(index) => return Some(indexed_rgb(index)),
        Color::Reset => return None,
        Color::Black => ANSI[0],
        Color::Red => ANSI[1],
        Color::Green => ANSI[2],
        Color::Yellow => ANSI[3],
        Color::Blue => ANSI[4],
        Color::Magenta => ANSI[5],
        Color::Cyan => ANSI[6],
        Color::Gray => ANSI[7],
        Color::DarkGray => ANSI[8],
        Color::LightRed => ANSI[9],
        Color::LightGreen => ANSI[10],
        Color::LightYellow => ANSI[11],
        Color::LightBlue => ANSI[12],
        Color::LightMagenta => ANSI[13],
        Color::LightCyan => ANSI[14],
        Color::White => ANSI[15],
    };
    Some(rgb)
}

const ANSI: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (205, 0, 0),
    (0, 205, 0),
    (205, 205, 0),
    (0, 0, 238),
    (205, 0, 205),
    (0, 205, 205),
    (229, 229, 229),
    (127, 127, 127),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (92, 92, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];

fn indexed_rgb(index: u8) -> (u8, u8, u8) {
    const CUBE: [u8; 6] = [0, 95, 135, 175, 215, 255];
    match index {
        0..=15 => ANSI[index as usize],
        16..=231 => {
            let i = index - 16;
            (
                CUBE[(i / 36) as usize],
                CUBE[((i / 6) % 6) as usize],
                CUBE[(i % 6) as usize],
            )
        }
        _ => {
            let level = 8 + 10 * (index - 232);
            (level, level, level)
        }
    }
}

/// Linear interpolation between two u8 values.
#[inline]
pub(crate) fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round() as u8
}
