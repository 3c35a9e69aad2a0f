/// RGB colours and the shading curves used for flat lighting
use std::fmt;
use std::str::FromStr;

use nom::{
    bytes::complete::{tag, take_while_m_n},
    combinator::{all_consuming, map_res},
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::ColourError;

/// Named palette entries.
const PALETTE: &[(&str, (u8, u8, u8))] = &[
    ("red", (0xff, 0x00, 0x00)),
    ("green", (0x00, 0xff, 0x00)),
    ("blue", (0x00, 0x00, 0xff)),
    ("white", (0xff, 0xff, 0xff)),
    ("black", (0x00, 0x00, 0x00)),
    ("yellow", (0xff, 0xff, 0x00)),
    ("magenta", (0xff, 0x00, 0xff)),
    ("cyan", (0x00, 0xff, 0xff)),
    ("orange", (0xff, 0x7f, 0x00)),
    ("epic", (0x66, 0x00, 0x33)),
    ("lime", (0x7f, 0xff, 0x00)),
    ("grey", (0x7f, 0x7f, 0x7f)),
    ("pink", (0xff, 0x7f, 0xbf)),
    ("purple", (0x7f, 0x00, 0xff)),
];

/// An 8-bit-per-channel RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const BLACK: Colour = Colour::new(0, 0, 0);
    pub const WHITE: Colour = Colour::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Parses `#RRGGBB` (either case).
    pub fn from_hex(s: &str) -> Result<Self, ColourError> {
        all_consuming(hex_colour)(s)
            .map(|(_, c)| c)
            .map_err(|_| ColourError::InvalidHex(s.to_string()))
    }

    pub fn from_name(name: &str) -> Result<Self, ColourError> {
        PALETTE
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, (r, g, b))| Self::new(r, g, b))
            .ok_or_else(|| ColourError::UnknownName(name.to_string()))
    }

    /// Channelwise sum, saturating at 255.
    pub fn add(self, other: Colour) -> Colour {
        Colour::new(
            self.r.saturating_add(other.r),
            self.g.saturating_add(other.g),
            self.b.saturating_add(other.b),
        )
    }

    /// Scales every channel by `ratio`, clamped to 0..=255.
    pub fn adjust_value(self, ratio: f64) -> Colour {
        let adjust = |c: u8| (c as f64 * ratio).clamp(0.0, 255.0) as u8;
        Colour::new(adjust(self.r), adjust(self.g), adjust(self.b))
    }

    /// Perceived brightness in [0, 1] (Rec. 601 weights).
    pub fn luminance(&self) -> f64 {
        (0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64) / 255.0
    }
}

fn hex_channel(input: &str) -> IResult<&str, u8> {
    map_res(take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit()), |s| {
        u8::from_str_radix(s, 16)
    })(input)
}

fn hex_colour(input: &str) -> IResult<&str, Colour> {
    let (input, (r, g, b)) =
        preceded(tag("#"), tuple((hex_channel, hex_channel, hex_channel)))(input)?;
    Ok((input, Colour::new(r, g, b)))
}

impl FromStr for Colour {
    type Err = ColourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with('#') {
            Self::from_hex(s)
        } else {
            Self::from_name(s)
        }
    }
}

impl From<(u8, u8, u8)> for Colour {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Maps a light alignment in [-1, 1] to a brightness multiplier.
///
/// Every curve is monotonic, stays strictly above zero at -1 so faces
/// turned away from the light stay dimly visible, and tops out at or just
/// below 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shader {
    /// `0.5 + 0.5 / (1 + e^(-4x))`
    #[default]
    Logistic,
    /// `0.3x^3 + 0.1x + 0.6`
    Cubic,
    /// `x/4 + 0.75`
    HalfToOne,
    /// 0.2 below zero, 0.6 at zero, 1 above.
    Step,
}

impl Shader {
    pub fn shade(&self, x: f64) -> f64 {
        match self {
            Self::Logistic => 0.5 + 0.5 / (1.0 + (-4.0 * x).exp()),
            Self::Cubic => 0.3 * x.powi(3) + 0.1 * x + 0.6,
            Self::HalfToOne => x / 4.0 + 0.75,
            Self::Step => {
                if x < 0.0 {
                    0.2
                } else if x > 0.0 {
                    1.0
                } else {
                    0.6
                }
            }
        }
    }
}
