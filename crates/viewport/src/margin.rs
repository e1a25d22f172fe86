use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarginLength {
    Px(f32),
    Percent(f32),
}

impl MarginLength {
    /// Resolves against the root box dimension along the same axis.
    pub fn resolve(self, axis_len: f32) -> f32 {
        match self {
            MarginLength::Px(v) => v,
            MarginLength::Percent(p) => axis_len * p / 100.0,
        }
    }
}

impl fmt::Display for MarginLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginLength::Px(v) => write!(f, "{v}px"),
            MarginLength::Percent(v) => write!(f, "{v}%"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarginParseError {
    #[error("root margin is empty")]
    Empty,
    #[error("root margin takes 1 to 4 lengths, got {0}")]
    Arity(usize),
    #[error("invalid root margin length `{0}` (expected px or %)")]
    Length(String),
}

/// How far outside the viewport an element still counts as visible, in CSS
/// margin shorthand order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootMargin {
    pub top: MarginLength,
    pub right: MarginLength,
    pub bottom: MarginLength,
    pub left: MarginLength,
}

impl RootMargin {
    pub const DEFAULT: &'static str = "200px 0px";

    pub fn zero() -> Self {
        let z = MarginLength::Px(0.0);
        Self {
            top: z,
            right: z,
            bottom: z,
            left: z,
        }
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self {
            top: MarginLength::Px(200.0),
            right: MarginLength::Px(0.0),
            bottom: MarginLength::Px(200.0),
            left: MarginLength::Px(0.0),
        }
    }
}

fn parse_length(token: &str) -> Result<MarginLength, MarginParseError> {
    let bad = || MarginParseError::Length(token.to_string());

    if let Some(num) = token.strip_suffix("px") {
        return num.parse().map(MarginLength::Px).map_err(|_| bad());
    }
    if let Some(num) = token.strip_suffix('%') {
        return num.parse().map(MarginLength::Percent).map_err(|_| bad());
    }
    // Unitless zero is the only bare number CSS accepts here.
    match token.parse::<f32>() {
        Ok(v) if v == 0.0 => Ok(MarginLength::Px(0.0)),
        _ => Err(bad()),
    }
}

impl FromStr for RootMargin {
    type Err = MarginParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split_whitespace()
            .map(parse_length)
            .collect::<Result<Vec<_>, _>>()?;

        match parts.as_slice() {
            [] => Err(MarginParseError::Empty),
            [all] => Ok(Self {
                top: *all,
                right: *all,
                bottom: *all,
                left: *all,
            }),
            [vertical, horizontal] => Ok(Self {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            }),
            [top, horizontal, bottom] => Ok(Self {
                top: *top,
                right: *horizontal,
                bottom: *bottom,
                left: *horizontal,
            }),
            [top, right, bottom, left] => Ok(Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            more => Err(MarginParseError::Arity(more.len())),
        }
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}
