//! Real-world length parsing/formatting and the drafting scale type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::INCHES_PER_FOOT;
use crate::error::{Result, ScalerError};

/// Parse a real-world length into inches.
///
/// Accepted forms: bare inches (`80`, `80"`, `80 in`, `6 1/2"`), feet and
/// inches (`12'-6"`, `12' 6"`, `12'6`), and feet only (`12'`). The result
/// must be positive and finite.
pub fn parse_length_inches(text: &str) -> Result<f64> {
    let invalid = || ScalerError::InvalidDimensionInput(format!("cannot read '{}' as a length", text.trim()));

    let normalized: String = text
        .trim()
        .chars()
        .map(|c| match c {
            '\u{2032}' | '\u{2019}' => '\'',
            '\u{2033}' | '\u{201D}' => '"',
            other => other,
        })
        .collect::<String>()
        .to_ascii_lowercase();

    let (feet, inches_text) = match normalized.split_once('\'') {
        Some((feet_text, rest)) => {
            let feet = parse_mixed_number(feet_text).ok_or_else(invalid)?;
            let rest = rest.trim_start();
            let rest = rest.strip_prefix('-').unwrap_or(rest);
            (feet, rest.to_string())
        }
        None => (0.0, normalized.clone()),
    };

    let inches_text = strip_inch_suffix(&inches_text);
    let inches = if inches_text.is_empty() {
        if normalized.contains('\'') {
            0.0
        } else {
            return Err(invalid());
        }
    } else {
        parse_mixed_number(inches_text).ok_or_else(invalid)?
    };

    if feet < 0.0 || inches < 0.0 {
        return Err(ScalerError::InvalidDimensionInput(format!(
            "length must be positive: '{}'",
            text.trim()
        )));
    }
    let total = feet * INCHES_PER_FOOT + inches;
    if !total.is_finite() || total <= 0.0 {
        return Err(ScalerError::InvalidDimensionInput(format!(
            "length must be positive: '{}'",
            text.trim()
        )));
    }
    Ok(total)
}

/// Format inches as feet and inches to the nearest 1/16", e.g. `12'-6 1/2"`.
pub fn format_feet_inches(inches: f64) -> String {
    if !inches.is_finite() {
        return "?".to_string();
    }
    let sign = if inches < 0.0 { "-" } else { "" };
    let sixteenths = (inches.abs() * 16.0).round() as u64;
    let per_foot = (INCHES_PER_FOOT as u64) * 16;
    let feet = sixteenths / per_foot;
    let rem = sixteenths % per_foot;
    let whole = rem / 16;
    let frac = rem % 16;

    if frac == 0 {
        format!("{sign}{feet}'-{whole}\"")
    } else {
        let (n, d) = reduce(frac, 16);
        format!("{sign}{feet}'-{whole} {n}/{d}\"")
    }
}

fn strip_inch_suffix(text: &str) -> &str {
    let t = text.trim();
    let t = t
        .strip_suffix("inches")
        .or_else(|| t.strip_suffix("inch"))
        .or_else(|| t.strip_suffix("in"))
        .or_else(|| t.strip_suffix('"'))
        .unwrap_or(t);
    t.trim()
}

/// `6`, `6.5`, `1/2`, `6 1/2`, `6-1/2`.
fn parse_mixed_number(text: &str) -> Option<f64> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if let Some((whole, frac)) = s.rsplit_once([' ', '-']) {
        if frac.contains('/') && !whole.trim().is_empty() {
            let whole: f64 = whole.trim().parse().ok()?;
            let frac = parse_fraction(frac)?;
            let value = if whole < 0.0 { whole - frac } else { whole + frac };
            return Some(value).filter(|v| v.is_finite());
        }
    }
    if s.contains('/') {
        return parse_fraction(s);
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_fraction(text: &str) -> Option<f64> {
    let (num, den) = text.trim().split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    if den == 0.0 {
        return None;
    }
    Some(num / den).filter(|v| v.is_finite())
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn reduce(n: u64, d: u64) -> (u64, u64) {
    let g = gcd(n, d).max(1);
    (n / g, d / g)
}

/// Drawn inches per one real-world foot, e.g. 0.25 for `1/4" = 1'-0"`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct DraftingScale(f64);

impl DraftingScale {
    pub const EIGHTH_INCH: Self = Self(0.125);
    pub const THREE_SIXTEENTHS_INCH: Self = Self(0.1875);
    pub const QUARTER_INCH: Self = Self(0.25);
    pub const THREE_EIGHTHS_INCH: Self = Self(0.375);
    pub const HALF_INCH: Self = Self(0.5);
    pub const THREE_QUARTERS_INCH: Self = Self(0.75);
    pub const ONE_INCH: Self = Self(1.0);
    pub const ONE_AND_HALF_INCH: Self = Self(1.5);
    pub const THREE_INCH: Self = Self(3.0);

    pub const PRESETS: &[Self] = &[
        Self::EIGHTH_INCH,
        Self::THREE_SIXTEENTHS_INCH,
        Self::QUARTER_INCH,
        Self::THREE_EIGHTHS_INCH,
        Self::HALF_INCH,
        Self::THREE_QUARTERS_INCH,
        Self::ONE_INCH,
        Self::ONE_AND_HALF_INCH,
        Self::THREE_INCH,
    ];

    pub fn new(inches_per_foot: f64) -> Result<Self> {
        if inches_per_foot.is_finite() && inches_per_foot > 0.0 {
            Ok(Self(inches_per_foot))
        } else {
            Err(ScalerError::InvalidDraftingScale(format!(
                "scale must be positive and finite, got {inches_per_foot}"
            )))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Paper inches that represent `real_inches` at this scale.
    pub fn paper_inches(&self, real_inches: f64) -> f64 {
        real_inches * self.0 / INCHES_PER_FOOT
    }

    /// Real-world inches represented by `paper_inches` at this scale.
    pub fn real_inches(&self, paper_inches: f64) -> f64 {
        paper_inches * INCHES_PER_FOOT / self.0
    }

    /// Parse `1/4"=1'-0"`, `1-1/2" = 1'-0"`, `1:48`, `0.25` or `1/4`.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || ScalerError::InvalidDraftingScale(text.trim().to_string());
        let t = text.trim();

        if let Some((drawn, real)) = t.split_once('=') {
            let drawn = parse_length_inches(drawn).map_err(|_| invalid())?;
            let real = parse_length_inches(real).map_err(|_| invalid())?;
            return Self::new(drawn / (real / INCHES_PER_FOOT)).map_err(|_| invalid());
        }
        if let Some((a, b)) = t.split_once(':') {
            let a = parse_mixed_number(a).ok_or_else(invalid)?;
            let b = parse_mixed_number(b).ok_or_else(invalid)?;
            if b <= 0.0 {
                return Err(invalid());
            }
            return Self::new(INCHES_PER_FOOT * a / b).map_err(|_| invalid());
        }
        let value = parse_mixed_number(t.trim_end_matches('"')).ok_or_else(invalid)?;
        Self::new(value).map_err(|_| invalid())
    }
}

impl Default for DraftingScale {
    fn default() -> Self {
        Self::QUARTER_INCH
    }
}

impl TryFrom<f64> for DraftingScale {
    type Error = ScalerError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<DraftingScale> for f64 {
    fn from(scale: DraftingScale) -> f64 {
        scale.0
    }
}

impl FromStr for DraftingScale {
    type Err = ScalerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DraftingScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sixty_fourths = self.0 * 64.0;
        if (sixty_fourths - sixty_fourths.round()).abs() > 1e-9 {
            return write!(f, "{}\" = 1'-0\"", self.0);
        }
        let total = sixty_fourths.round() as u64;
        let whole = total / 64;
        let frac = total % 64;
        match (whole, frac) {
            (w, 0) => write!(f, "{w}\" = 1'-0\""),
            (0, n) => {
                let (n, d) = reduce(n, 64);
                write!(f, "{n}/{d}\" = 1'-0\"")
            }
            (w, n) => {
                let (n, d) = reduce(n, 64);
                write!(f, "{w}-{n}/{d}\" = 1'-0\"")
            }
        }
    }
}
