//! Typed option values and their conversion from raw flag text.

use std::fmt;
use std::str::FromStr;

use crate::error::ConversionError;

/// Paper sizes accepted by `--page-size`, with portrait dimensions in mm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    A0,
    A1,
    A2,
    A3,
    #[default]
    A4,
    A5,
    A6,
    A7,
    A8,
    A9,
    B0,
    B1,
    B2,
    B3,
    B4,
    B5,
    B6,
    B7,
    B8,
    B9,
    B10,
    C5E,
    Comm10E,
    DLE,
    Executive,
    Folio,
    Ledger,
    Legal,
    Letter,
    Tabloid,
}

impl PageSize {
    pub const ALL: [PageSize; 30] = [
        PageSize::A0,
        PageSize::A1,
        PageSize::A2,
        PageSize::A3,
        PageSize::A4,
        PageSize::A5,
        PageSize::A6,
        PageSize::A7,
        PageSize::A8,
        PageSize::A9,
        PageSize::B0,
        PageSize::B1,
        PageSize::B2,
        PageSize::B3,
        PageSize::B4,
        PageSize::B5,
        PageSize::B6,
        PageSize::B7,
        PageSize::B8,
        PageSize::B9,
        PageSize::B10,
        PageSize::C5E,
        PageSize::Comm10E,
        PageSize::DLE,
        PageSize::Executive,
        PageSize::Folio,
        PageSize::Ledger,
        PageSize::Legal,
        PageSize::Letter,
        PageSize::Tabloid,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PageSize::A0 => "A0",
            PageSize::A1 => "A1",
            PageSize::A2 => "A2",
            PageSize::A3 => "A3",
            PageSize::A4 => "A4",
            PageSize::A5 => "A5",
            PageSize::A6 => "A6",
            PageSize::A7 => "A7",
            PageSize::A8 => "A8",
            PageSize::A9 => "A9",
            PageSize::B0 => "B0",
            PageSize::B1 => "B1",
            PageSize::B2 => "B2",
            PageSize::B3 => "B3",
            PageSize::B4 => "B4",
            PageSize::B5 => "B5",
            PageSize::B6 => "B6",
            PageSize::B7 => "B7",
            PageSize::B8 => "B8",
            PageSize::B9 => "B9",
            PageSize::B10 => "B10",
            PageSize::C5E => "C5E",
            PageSize::Comm10E => "Comm10E",
            PageSize::DLE => "DLE",
            PageSize::Executive => "Executive",
            PageSize::Folio => "Folio",
            PageSize::Ledger => "Ledger",
            PageSize::Legal => "Legal",
            PageSize::Letter => "Letter",
            PageSize::Tabloid => "Tabloid",
        }
    }

    /// Portrait (width, height) in millimetres.
    pub fn dimensions_mm(self) -> (f64, f64) {
        match self {
            PageSize::A0 => (841.0, 1189.0),
            PageSize::A1 => (594.0, 841.0),
            PageSize::A2 => (420.0, 594.0),
            PageSize::A3 => (297.0, 420.0),
            PageSize::A4 => (210.0, 297.0),
            PageSize::A5 => (148.0, 210.0),
            PageSize::A6 => (105.0, 148.0),
            PageSize::A7 => (74.0, 105.0),
            PageSize::A8 => (52.0, 74.0),
            PageSize::A9 => (37.0, 52.0),
            PageSize::B0 => (1000.0, 1414.0),
            PageSize::B1 => (707.0, 1000.0),
            PageSize::B2 => (500.0, 707.0),
            PageSize::B3 => (353.0, 500.0),
            PageSize::B4 => (250.0, 353.0),
            PageSize::B5 => (176.0, 250.0),
            PageSize::B6 => (125.0, 176.0),
            PageSize::B7 => (88.0, 125.0),
            PageSize::B8 => (62.0, 88.0),
            PageSize::B9 => (44.0, 62.0),
            PageSize::B10 => (31.0, 44.0),
            PageSize::C5E => (163.0, 229.0),
            PageSize::Comm10E => (105.0, 241.0),
            PageSize::DLE => (110.0, 220.0),
            PageSize::Executive => (190.5, 254.0),
            PageSize::Folio => (210.0, 330.0),
            PageSize::Ledger => (431.8, 279.4),
            PageSize::Legal => (215.9, 355.6),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Tabloid => (279.4, 431.8),
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageSize::ALL
            .into_iter()
            .find(|size| size.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| "unknown page size".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Portrait => f.write_str("Portrait"),
            Orientation::Landscape => f.write_str("Landscape"),
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("portrait") {
            Ok(Orientation::Portrait)
        } else if s.eq_ignore_ascii_case("landscape") {
            Ok(Orientation::Landscape)
        } else {
            Err("expected Portrait or Landscape".to_string())
        }
    }
}

/// A length normalized to millimetres.
///
/// Accepts `mm`, `cm`, `in`, `pt` and `px` (at 96 dpi) suffixes; a bare
/// number is taken as millimetres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Measurement(f64);

const MM_PER_INCH: f64 = 25.4;

impl Measurement {
    pub fn from_mm(mm: f64) -> Self {
        Measurement(mm)
    }

    pub fn mm(self) -> f64 {
        self.0
    }

    pub fn inches(self) -> f64 {
        self.0 / MM_PER_INCH
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}mm", self.0)
    }
}

impl FromStr for Measurement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let (number, factor) = [
            ("mm", 1.0),
            ("cm", 10.0),
            ("in", MM_PER_INCH),
            ("pt", MM_PER_INCH / 72.0),
            ("px", MM_PER_INCH / 96.0),
        ]
        .into_iter()
        .find_map(|(unit, factor)| s.strip_suffix(unit).map(|n| (n, factor)))
        .unwrap_or((s.as_str(), 1.0));

        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| "expected a number with optional mm, cm, in, pt or px unit".to_string())?;
        if !value.is_finite() || value < 0.0 {
            return Err("must be a non-negative length".to_string());
        }
        Ok(Measurement(value * factor))
    }
}

/// Browser window size from `--viewport-size 1024x768`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl FromStr for ViewportSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
        let dimension = |v: &str| match v.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err("width and height must be positive integers".to_string()),
        };
        Ok(ViewportSize {
            width: dimension(w)?,
            height: dimension(h)?,
        })
    }
}

/// A `name=value` or `Name: value` pair used by `--cookie` and `--custom-header`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedValue {
    pub name: String,
    pub value: String,
}

impl FromStr for NamedValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = s
            .split_once([':', '='])
            .ok_or_else(|| "expected NAME=VALUE or NAME: VALUE".to_string())?;
        let name = name.trim();
        if name.is_empty() {
            return Err("name must not be empty".to_string());
        }
        Ok(NamedValue {
            name: name.to_string(),
            value: value.trim().to_string(),
        })
    }
}

/// Positive zoom factor.
pub fn parse_zoom(s: &str) -> Result<f64, String> {
    match s.trim().parse::<f64>() {
        Ok(z) if z.is_finite() && z > 0.0 => Ok(z),
        Ok(_) => Err("must be a positive number".to_string()),
        Err(_) => Err("expected a number".to_string()),
    }
}

/// Positive integer used by `--dpi` and the depth options.
pub fn parse_positive_int(s: &str) -> Result<u32, String> {
    match s.trim().parse::<i64>() {
        Ok(n) if n > 0 && n <= i64::from(u32::MAX) => Ok(n as u32),
        Ok(_) => Err("must be a positive integer".to_string()),
        Err(_) => Err("expected an integer".to_string()),
    }
}

/// Convert one raw flag value, tagging failures with the flag name.
pub fn convert<T>(
    flag: &'static str,
    raw: &str,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Result<T, ConversionError> {
    parse(raw).map_err(|reason| ConversionError::new(flag, raw, reason))
}

/// Convert an optional flag value, leaving `None` when the flag was absent.
pub fn convert_opt<T>(
    flag: &'static str,
    raw: Option<&str>,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Result<Option<T>, ConversionError> {
    raw.map(|r| convert(flag, r, parse)).transpose()
}
