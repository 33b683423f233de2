//! Error types for nfssgen-core (made by FontLab https://www.fontlab.com/)

use std::path::PathBuf;

use thiserror::Error;

use crate::config::OptionCategory;

pub type Result<T> = std::result::Result<T, NfssError>;

/// Failures raised while classifying, naming, and emitting font variants.
#[derive(Debug, Error)]
pub enum NfssError {
    /// An axis or option token has no Berry code. Continuing would produce a
    /// wrong series/shape/family code for every variant that uses it.
    #[error("no Berry code for '{token}' in the '{table}' table; add it as \"{token}\": \"xx\"")]
    MissingCode { token: String, table: &'static str },

    #[error(
        "the three-letter Berry ID for font '{family}' must be added to the 'berry_names' table; \
         add it as \"{family}\": \"xxx\", replacing 'xxx' with the Berry ID"
    )]
    MissingBerryName { family: String },

    #[error("encoding '{0}' has no entry in the 'encodings' table")]
    MissingEncoding(String),

    #[error("option '{token}' is listed as both {first} and {second}")]
    ConflictingCategory {
        token: String,
        first: OptionCategory,
        second: OptionCategory,
    },

    #[error("option '{0}' appears in the option groups but in no option category")]
    UncategorizedOption(String),

    #[error("{tool} failed: {detail}")]
    ToolFailed { tool: String, detail: String },

    #[error("unexpected {tool} output for {}: {detail}", path.display())]
    MalformedOutput {
        tool: &'static str,
        path: PathBuf,
        detail: String,
    },

    #[error("no conversion commands to run; no valid OpenType fonts were found")]
    NothingToInstall,

    #[error("formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
