use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A configured color: an ANSI-256 index or a hex RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Ansi256(u8),
    Hex { r: u8, g: u8, b: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorDepth {
    #[default]
    TrueColor,
    Color256,
    Color16,
}

#[derive(Debug, Error)]
#[error("invalid color value for field \"{field}\": \"{value}\"")]
pub struct ColorParseError {
    pub field: String,
    pub value: String,
}

impl Color {
    /// Parse `"0"`..`"255"` as an ANSI index, `"#RRGGBB"` / `"#RGB"` as hex.
    /// `field` only feeds the error message.
    pub fn parse(s: &str, field: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError {
            field: field.to_owned(),
            value: s.to_owned(),
        };

        let Some(hex) = s.strip_prefix('#') else {
            let n: u16 = s.parse().map_err(|_| err())?;
            return u8::try_from(n).map(Color::Ansi256).map_err(|_| err());
        };

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| err());
        match hex.len() {
            6 => Ok(Color::Hex {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
            }),
            // #RGB expands each nibble: f -> ff
            3 => Ok(Color::Hex {
                r: channel(&hex[0..1])? * 17,
                g: channel(&hex[1..2])? * 17,
                b: channel(&hex[2..3])? * 17,
            }),
            _ => Err(err()),
        }
    }

    /// Convert for crossterm at the terminal's color depth.
    ///
    /// ANSI 0-15 map to crossterm's named colors so the terminal's own
    /// palette applies.
    pub fn to_crossterm_color(self, depth: ColorDepth) -> crossterm::style::Color {
        match (depth, self) {
            (_, Color::Ansi256(n)) if n < 16 || depth != ColorDepth::Color16 => named_or_indexed(n),
            (ColorDepth::TrueColor, Color::Hex { r, g, b }) => {
                crossterm::style::Color::Rgb { r, g, b }
            }
            (ColorDepth::Color256, Color::Hex { r, g, b }) => {
                crossterm::style::Color::AnsiValue(nearest_cube_index(r, g, b))
            }
            (_, color) => {
                let (r, g, b) = color.rgb();
                named_or_indexed(nearest_basic(r, g, b))
            }
        }
    }

    fn rgb(self) -> (u8, u8, u8) {
        match self {
            Color::Hex { r, g, b } => (r, g, b),
            Color::Ansi256(n) => ansi_rgb(n),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Ansi256(n) => write!(f, "{n}"),
            Color::Hex { r, g, b } => write!(f, "#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s, "<unknown>")
    }
}

impl ColorDepth {
    /// Detect from `COLORTERM` / `TERM`.
    pub fn detect() -> Self {
        if let Ok(ct) = std::env::var("COLORTERM")
            && (ct == "truecolor" || ct == "24bit")
        {
            return ColorDepth::TrueColor;
        }
        if let Ok(term) = std::env::var("TERM")
            && term.contains("256color")
        {
            return ColorDepth::Color256;
        }
        ColorDepth::Color16
    }
}

// ---------------------------------------------------------------------------
// Palette helpers
// ---------------------------------------------------------------------------

const BASIC_RGB: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (128, 0, 0),
    (0, 128, 0),
    (128, 128, 0),
    (0, 0, 128),
    (128, 0, 128),
    (0, 128, 128),
    (192, 192, 192),
    (128, 128, 128),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (0, 0, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];

fn named_or_indexed(n: u8) -> crossterm::style::Color {
    use crossterm::style::Color;
    match n {
        0 => Color::Black,
        1 => Color::DarkRed,
        2 => Color::DarkGreen,
        3 => Color::DarkYellow,
        4 => Color::DarkBlue,
        5 => Color::DarkMagenta,
        6 => Color::DarkCyan,
        7 => Color::Grey,
        8 => Color::DarkGrey,
        9 => Color::Red,
        10 => Color::Green,
        11 => Color::Yellow,
        12 => Color::Blue,
        13 => Color::Magenta,
        14 => Color::Cyan,
        15 => Color::White,
        _ => Color::AnsiValue(n),
    }
}

fn ansi_rgb(n: u8) -> (u8, u8, u8) {
    match n {
        0..=15 => BASIC_RGB[usize::from(n)],
        16..=231 => {
            let level = |i: u8| if i == 0 { 0 } else { 55 + 40 * i };
            let idx = n - 16;
            (level(idx / 36), level((idx / 6) % 6), level(idx % 6))
        }
        232..=255 => {
            let v = 8 + 10 * (n - 232);
            (v, v, v)
        }
    }
}

fn nearest_cube_index(r: u8, g: u8, b: u8) -> u8 {
    let level = |v: u8| -> u8 {
        match v {
            0..=47 => 0,
            48..=114 => 1,
            #[allow(clippy::cast_possible_truncation)]
            _ => ((u16::from(v) - 35) / 40).min(5) as u8,
        }
    };
    16 + 36 * level(r) + 6 * level(g) + level(b)
}

fn nearest_basic(r: u8, g: u8, b: u8) -> u8 {
    let dist = |(pr, pg, pb): (u8, u8, u8)| {
        let d = |x: u8, y: u8| (i32::from(x) - i32::from(y)).pow(2);
        d(r, pr) + d(g, pg) + d(b, pb)
    };
    (0u8..16)
        .min_by_key(|&i| dist(BASIC_RGB[usize::from(i)]))
        .unwrap_or(7)
}
