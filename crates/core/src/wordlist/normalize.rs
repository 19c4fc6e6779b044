//! Text cleanup applied to profile fields and ANY terms before matching.

use serde::{Deserialize, Serialize};

/// What happens to `"`, `'` and `|` during normalization.
///
/// `Remove` joins the surrounding characters (`can't` -> `cant`), `Space`
/// separates them (`can't` -> `can t`). Every other separator always
/// becomes a space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotePolicy {
    #[default]
    Remove,
    Space,
}

/// Deterministic text normalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    quotes: QuotePolicy,
}

impl Normalizer {
    pub fn new(quotes: QuotePolicy) -> Self {
        Self { quotes }
    }

    /// Collapse whitespace runs, lowercase, then map the separator class in a
    /// single pass. A final collapse keeps the output idempotent.
    pub fn normalize(&self, text: &str) -> String {
        let lowered = collapse_whitespace(text).to_lowercase();

        let mut mapped = String::with_capacity(lowered.len());
        for c in lowered.chars() {
            match c {
                '.' | ',' | '-' | '/' | '\\' | '•' => mapped.push(' '),
                '"' | '\'' | '|' => {
                    if self.quotes == QuotePolicy::Space {
                        mapped.push(' ');
                    }
                }
                other => mapped.push(other),
            }
        }

        collapse_whitespace(&mapped)
    }
}

/// Replace every run of two or more whitespace characters with one space.
///
/// A single whitespace character is kept as-is.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending: Option<char> = None;
    let mut run = 0usize;

    for c in text.chars() {
        if c.is_whitespace() {
            run += 1;
            if run == 1 {
                pending = Some(c);
            }
            continue;
        }

        flush_run(&mut out, pending.take(), run);
        run = 0;
        out.push(c);
    }
    flush_run(&mut out, pending, run);

    out
}

fn flush_run(out: &mut String, first: Option<char>, run: usize) {
    match (run, first) {
        (0, _) | (_, None) => {}
        (1, Some(c)) => out.push(c),
        _ => out.push(' '),
    }
}
