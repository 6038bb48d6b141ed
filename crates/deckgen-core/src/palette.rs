//! Colours and the three-colour palette carried by every slide.

use std::fmt;

/// An sRGB colour, stored as six upper-case hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Color(String);

/// Primary, secondary and background colours.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Palette {
    pub primary: Color,
    pub secondary: Color,
    pub background: Color,
}

impl Color {
    /// Parse `#RGB`, `#RRGGBB`, `RGB` or `RRGGBB`.
    pub fn parse(s: &str) -> Option<Self> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            6 => Some(Color(hex.to_ascii_uppercase())),
            3 => {
                let mut expanded = String::with_capacity(6);
                for c in hex.chars() {
                    let c = c.to_ascii_uppercase();
                    expanded.push(c);
                    expanded.push(c);
                }
                Some(Color(expanded))
            }
            _ => None,
        }
    }

    /// Bare hex digits (`2563EB`), as DrawingML `srgbClr` expects.
    pub fn hex(&self) -> &str {
        &self.0
    }
}

// Checked by `test_default_constants_are_valid`.
const DEFAULT_PRIMARY: &str = "2563EB";
const DEFAULT_SECONDARY: &str = "3B82F6";
const DEFAULT_BACKGROUND: &str = "F8FAFC";

impl fmt::Display for Color {
    /// CSS form, `#2563EB`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Color::parse(&s).ok_or_else(|| format!("not a hex colour: {s}"))
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

impl Palette {
    pub fn new(primary: Color, secondary: Color, background: Color) -> Self {
        Self {
            primary,
            secondary,
            background,
        }
    }

    /// Parse three hex strings; `None` if any is not a colour.
    pub fn parse(primary: &str, secondary: &str, background: &str) -> Option<Self> {
        Some(Self::new(
            Color::parse(primary)?,
            Color::parse(secondary)?,
            Color::parse(background)?,
        ))
    }
}

impl Default for Palette {
    /// The built-in "Professional Blue" triple.
    fn default() -> Self {
        Self {
            primary: Color(DEFAULT_PRIMARY.to_string()),
            secondary: Color(DEFAULT_SECONDARY.to_string()),
            background: Color(DEFAULT_BACKGROUND.to_string()),
        }
    }
}
