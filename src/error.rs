use thiserror::Error;

use crate::aexpr::ParseError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A statement or expression shape without a translation rule.
    #[error("unsupported construct: {construct}")]
    UnsupportedConstruct { construct: String },

    /// A jump to a label that no statement carries.
    #[error("jump to unknown label `{label}`")]
    UnreachableLabel { label: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed method summaries: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn unsupported(construct: impl ToString) -> Self {
        Error::UnsupportedConstruct {
            construct: construct.to_string(),
        }
    }

    /// Errors that abort the translation of one method only. Anything else,
    /// such as a jump to an unknown label, means the input is malformed.
    pub fn is_method_local(&self) -> bool {
        matches!(self, Error::UnsupportedConstruct { .. })
    }
}
