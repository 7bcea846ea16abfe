//! Setting values accepted by profile commands.
//!
//! Values come from two places: the `default` entries of a profile (JSON) and
//! the command line (plain text). Every encoder accepts [`Value::Text`] and
//! parses it according to its own value type, so the CLI never needs to know
//! what a command expects.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Basic color names understood by [`Rgb::parse`].
const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("white", Rgb::new(0xFF, 0xFF, 0xFF)),
    ("silver", Rgb::new(0xC0, 0xC0, 0xC0)),
    ("gray", Rgb::new(0x80, 0x80, 0x80)),
    ("black", Rgb::new(0x00, 0x00, 0x00)),
    ("red", Rgb::new(0xFF, 0x00, 0x00)),
    ("maroon", Rgb::new(0x80, 0x00, 0x00)),
    ("yellow", Rgb::new(0xFF, 0xFF, 0x00)),
    ("olive", Rgb::new(0x80, 0x80, 0x00)),
    ("lime", Rgb::new(0x00, 0xFF, 0x00)),
    ("green", Rgb::new(0x00, 0x80, 0x00)),
    ("aqua", Rgb::new(0x00, 0xFF, 0xFF)),
    ("teal", Rgb::new(0x00, 0x80, 0x80)),
    ("blue", Rgb::new(0x00, 0x00, 0xFF)),
    ("navy", Rgb::new(0x00, 0x00, 0x80)),
    ("fuchsia", Rgb::new(0xFF, 0x00, 0xFF)),
    ("purple", Rgb::new(0x80, 0x00, 0x80)),
    ("orange", Rgb::new(0xFF, 0xA5, 0x00)),
];

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB`, `RRGGBB`, `#RGB`, `RGB` or a basic color name.
    pub fn parse(field: &str, text: &str) -> Result<Self> {
        let expected = "a color such as #FF0000, #F00 or red";
        let text = text.trim();

        let lower = text.to_ascii_lowercase();
        if let Some((_, rgb)) = NAMED_COLORS.iter().find(|(name, _)| *name == lower) {
            return Ok(*rgb);
        }

        let hex = text.strip_prefix('#').unwrap_or(text);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::invalid(field, expected));
        }
        let digits: Vec<u8> = hex
            .chars()
            .filter_map(|c| c.to_digit(16))
            .map(|d| d as u8)
            .collect();

        match digits.as_slice() {
            [r, g, b] => Ok(Self::new(r * 0x11, g * 0x11, b * 0x11)),
            [r_hi, r_lo, g_hi, g_lo, b_hi, b_lo] => {
                let byte = |hi: &u8, lo: &u8| (hi << 4) | lo;
                Ok(Self::new(byte(r_hi, r_lo), byte(g_hi, g_lo), byte(b_hi, b_lo)))
            }
            _ => Err(Error::invalid(field, expected)),
        }
    }

    pub fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(rgb: Rgb) -> Self {
        rgb.to_bytes()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// One color stop of a gradient. `pos` is a percentage (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColorStop {
    pub pos: u8,
    pub color: Rgb,
}

impl ColorStop {
    pub const fn new(pos: u8, color: Rgb) -> Self {
        Self { pos, color }
    }
}

/// An animated color gradient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Gradient {
    /// Duration of one full cycle in milliseconds.
    pub duration: u16,
    pub colors: Vec<ColorStop>,
}

impl Gradient {
    /// Parse the text form `duration=1000; colors=0%: #ff0000, 50%: #00ff00`.
    pub fn parse(field: &str, text: &str) -> Result<Self> {
        let expected = "a gradient such as 'duration=1000; colors=0%: #ff0000, 50%: #00ff00'";
        let mut duration = None;
        let mut colors = None;

        for part in text.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, val) = part
                .split_once('=')
                .ok_or_else(|| Error::invalid(field, expected))?;
            match key.trim() {
                "duration" => {
                    let ms = val
                        .trim()
                        .parse::<u16>()
                        .map_err(|_| Error::invalid(field, "a duration in ms (0-65535)"))?;
                    duration = Some(ms);
                }
                "colors" => {
                    let mut stops = Vec::new();
                    for stop in val.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                        let (pos, color) = stop
                            .split_once(':')
                            .ok_or_else(|| Error::invalid(field, expected))?;
                        let pos = pos
                            .trim()
                            .trim_end_matches('%')
                            .parse::<u8>()
                            .map_err(|_| Error::invalid(field, "a stop position in percent"))?;
                        stops.push(ColorStop::new(pos, Rgb::parse(field, color)?));
                    }
                    colors = Some(stops);
                }
                _ => return Err(Error::invalid(field, expected)),
            }
        }

        match (duration, colors) {
            (Some(duration), Some(colors)) => Ok(Self { duration, colors }),
            _ => Err(Error::invalid(field, expected)),
        }
    }
}

impl fmt::Display for Gradient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "duration={}; colors=", self.duration)?;
        for (i, stop) in self.colors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}%: {}", stop.pos, stop.color)?;
        }
        Ok(())
    }
}

/// A value passed to a profile command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// No argument (commands such as `save`).
    None,
    Integer(i64),
    /// Unparsed text, interpreted by the command's encoder.
    Text(String),
    Color(Rgb),
    Gradient(Gradient),
    /// Button name to action name.
    Buttons(BTreeMap<String, String>),
}

impl Value {
    /// Build a value from a command-line argument. An empty string means no value.
    pub fn from_cli(text: &str) -> Self {
        if text.trim().is_empty() {
            Self::None
        } else {
            Self::Text(text.to_string())
        }
    }

    pub(crate) fn to_integer(&self, field: &str) -> Result<i64> {
        match self {
            Self::Integer(n) => Ok(*n),
            Self::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| Error::invalid(field, "an integer")),
            _ => Err(Error::invalid(field, "an integer")),
        }
    }

    pub(crate) fn to_label(&self, field: &str) -> Result<String> {
        match self {
            Self::Text(s) => Ok(s.trim().to_string()),
            Self::Integer(n) => Ok(n.to_string()),
            _ => Err(Error::invalid(field, "a choice label")),
        }
    }

    pub(crate) fn to_color(&self, field: &str) -> Result<Rgb> {
        match self {
            Self::Color(rgb) => Ok(*rgb),
            Self::Text(s) => Rgb::parse(field, s),
            _ => Err(Error::invalid(field, "a color")),
        }
    }

    pub(crate) fn to_gradient(&self, field: &str) -> Result<Gradient> {
        match self {
            Self::Gradient(g) => Ok(g.clone()),
            Self::Text(s) => Gradient::parse(field, s),
            _ => Err(Error::invalid(field, "a gradient")),
        }
    }

    /// Button assignments, either a map or the text form `button1=left, button2=right`.
    pub(crate) fn to_buttons(&self, field: &str) -> Result<BTreeMap<String, String>> {
        match self {
            Self::Buttons(map) => Ok(map.clone()),
            Self::Text(s) => {
                let mut map = BTreeMap::new();
                for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                    let (button, action) = pair
                        .split_once('=')
                        .ok_or_else(|| Error::invalid(field, "pairs such as 'button1=left'"))?;
                    map.insert(button.trim().to_string(), action.trim().to_string());
                }
                Ok(map)
            }
            _ => Err(Error::invalid(field, "a button mapping")),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "-"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Color(rgb) => write!(f, "{rgb}"),
            Self::Gradient(g) => write!(f, "{g}"),
            Self::Buttons(map) => {
                let pairs: Vec<String> = map.iter().map(|(k, v)| format!("{k}={v}")).collect();
                write!(f, "{}", pairs.join(", "))
            }
        }
    }
}
