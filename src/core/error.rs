//! Errors raised while building a harness or computing its BOM
//!
//! Every error aborts the whole build. The core never recovers from or logs
//! these; the caller decides how to report them.

use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while resolving, connecting or aggregating
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum HarnessError {
    /// A reference maps to different items through two naming schemes
    #[error("{subject} is {detail}")]
    #[diagnostic(
        code(wirekit::resolve::ambiguous),
        help("Reference the item by a name that only one of the lists uses")
    )]
    AmbiguousReference { subject: String, detail: String },

    /// A label or color is used for more than one item
    #[error("{subject} is used for more than one {item}")]
    #[diagnostic(
        code(wirekit::resolve::duplicate),
        help("Labels and colors used as references must be unique within a component")
    )]
    DuplicateReference { subject: String, item: &'static str },

    /// Reference absent from every table (or unknown designator)
    #[error("{subject} not found")]
    #[diagnostic(code(wirekit::resolve::not_found))]
    NotFound { subject: String },

    /// Unrecognised quantity multiplier for the component kind
    #[error("invalid qty multiplier `{multiplier}` for {kind}")]
    #[diagnostic(
        code(wirekit::bom::multiplier),
        help("Connectors accept pincount or populated; cables accept wirecount, terminations, length or total_length")
    )]
    InvalidMultiplier {
        multiplier: String,
        kind: &'static str,
    },

    /// Unparseable mate arrow token
    #[error("malformed arrow `{token}`")]
    #[diagnostic(
        code(wirekit::mate::arrow),
        help("Arrows look like --, ->, <-, <->, ==, =>, <= or <=>")
    )]
    MalformedArrowToken { token: String },

    /// The declaration itself is inconsistent
    #[error("{message}")]
    #[diagnostic(code(wirekit::structure))]
    StructuralValidation { message: String },
}

impl HarnessError {
    pub fn structural(message: impl Into<String>) -> Self {
        HarnessError::StructuralValidation {
            message: message.into(),
        }
    }

    pub fn not_found(subject: impl Into<String>) -> Self {
        HarnessError::NotFound {
            subject: subject.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
