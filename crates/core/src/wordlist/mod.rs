//! Term matching engine.
//!
//! A raw word list (phrases and phrase groups) is compiled into a
//! [`TermIndex`], and a [`Matcher`] checks normalized profile fields against it.

mod index;
mod matcher;
mod normalize;
mod source;

pub use index::{RawTerm, TermIndex};
pub use matcher::Matcher;
pub use normalize::{collapse_whitespace, Normalizer, QuotePolicy};
pub use source::{FileWordlistSource, WordlistSource};

use thiserror::Error;

use crate::config::WordlistConfig;

#[derive(Debug, Error)]
pub enum WordlistError {
    /// Matching was attempted with neither ANY terms nor ALL groups.
    #[error("No terms to match against")]
    Empty,

    #[error("Failed to read wordlist {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse wordlist: {0}")]
    Parse(String),
}

/// Load a word list and compile it into a matcher using the configured policies.
pub fn load_matcher(
    source: &dyn WordlistSource,
    config: &WordlistConfig,
) -> Result<Matcher, WordlistError> {
    let normalizer = Normalizer::new(config.quotes);
    let index = TermIndex::build(source.load()?, &normalizer);
    Ok(Matcher::new(index, normalizer).with_groups_span_fields(config.groups_span_fields))
}
