//! Mate entity - a link between two connectors outside any cable
//!
//! A pin mate joins two individual pins (e.g. a plug into a receptacle,
//! contact by contact). A component mate joins two whole components.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::{HarnessError, Result};
use crate::entities::connector::Pin;

/// Which ends of a mate carry an arrow head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowDirection {
    None,
    Back,
    Forward,
    Both,
}

/// Line weight of a mate arrow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowWeight {
    #[default]
    Single,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrow {
    pub direction: ArrowDirection,
    pub weight: ArrowWeight,
}

impl Arrow {
    /// Parse an arrow token such as `-->`, `<==` or `<->`
    ///
    /// The body must be one or more identical `-` or `=` characters,
    /// optionally preceded by `<` and followed by `>`.
    pub fn parse(token: &str, weight: ArrowWeight) -> Result<Self> {
        let malformed = || HarnessError::MalformedArrowToken {
            token: token.to_string(),
        };

        let (back, rest) = match token.strip_prefix('<') {
            Some(rest) => (true, rest),
            None => (false, token),
        };
        let (forward, body) = match rest.strip_suffix('>') {
            Some(body) => (true, body),
            None => (false, rest),
        };

        let mut chars = body.chars();
        let first = chars.next().ok_or_else(malformed)?;
        if !matches!(first, '-' | '=') || chars.any(|c| c != first) {
            return Err(malformed());
        }

        let direction = match (back, forward) {
            (true, true) => ArrowDirection::Both,
            (true, false) => ArrowDirection::Back,
            (false, true) => ArrowDirection::Forward,
            (false, false) => ArrowDirection::None,
        };
        Ok(Arrow { direction, weight })
    }
}

impl fmt::Display for Arrow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = match self.weight {
            ArrowWeight::Single => "-",
            ArrowWeight::Double => "=",
        };
        let (head, tail) = match self.direction {
            ArrowDirection::None => ("", ""),
            ArrowDirection::Back => ("<", ""),
            ArrowDirection::Forward => ("", ">"),
            ArrowDirection::Both => ("<", ">"),
        };
        write!(f, "{}{}{}{}", head, body, body, tail)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatePin {
    pub from: Pin,
    pub to: Pin,
    pub arrow: Arrow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MateComponent {
    pub from: String,
    pub to: String,
    pub arrow: Arrow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mate {
    Pin(MatePin),
    Component(MateComponent),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direction(token: &str) -> ArrowDirection {
        Arrow::parse(token, ArrowWeight::Single).unwrap().direction
    }

    #[test]
    fn test_arrow_directions() {
        assert_eq!(direction("<->"), ArrowDirection::Both);
        assert_eq!(direction("<=="), ArrowDirection::Back);
        assert_eq!(direction("--->"), ArrowDirection::Forward);
        assert_eq!(direction("=="), ArrowDirection::None);
        assert_eq!(direction("-"), ArrowDirection::None);
    }

    #[test]
    fn test_weight_comes_from_caller() {
        let arrow = Arrow::parse("==>", ArrowWeight::Single).unwrap();
        assert_eq!(arrow.weight, ArrowWeight::Single);
        let arrow = Arrow::parse("-->", ArrowWeight::Double).unwrap();
        assert_eq!(arrow.weight, ArrowWeight::Double);
    }

    #[test]
    fn test_malformed_tokens() {
        for token in ["", "<>", "<", "-=", "~>", "->>", "a-b"] {
            let err = Arrow::parse(token, ArrowWeight::Single).unwrap_err();
            assert_eq!(
                err,
                HarnessError::MalformedArrowToken {
                    token: token.to_string()
                }
            );
        }
    }

    #[test]
    fn test_display() {
        let arrow = Arrow::parse("<-->", ArrowWeight::Double).unwrap();
        assert_eq!(arrow.to_string(), "<==>");
    }
}
