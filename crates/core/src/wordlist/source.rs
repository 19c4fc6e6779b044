//! Word list loading from disk.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::index::RawTerm;
use super::WordlistError;

/// Anything that can produce a raw word list.
pub trait WordlistSource: Send + Sync {
    /// Called again on every daemon iteration so edits apply without a restart.
    fn load(&self) -> Result<Vec<RawTerm>, WordlistError>;
}

/// TOML file with a `terms` array.
#[derive(Debug, Deserialize)]
struct TomlWordlist {
    terms: Vec<RawTerm>,
}

/// Loads `*.json` (top-level array) or TOML (`terms = [...]`) files.
#[derive(Debug, Clone)]
pub struct FileWordlistSource {
    path: PathBuf,
}

impl FileWordlistSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WordlistSource for FileWordlistSource {
    fn load(&self) -> Result<Vec<RawTerm>, WordlistError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| WordlistError::Io {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        let is_json = self
            .path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let terms = if is_json {
            serde_json::from_str::<Vec<RawTerm>>(&contents)
                .map_err(|e| WordlistError::Parse(e.to_string()))?
        } else {
            toml::from_str::<TomlWordlist>(&contents)
                .map_err(|e| WordlistError::Parse(e.to_string()))?
                .terms
        };

        debug!(path = %self.path.display(), terms = terms.len(), "Loaded wordlist");
        Ok(terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_toml_wordlist() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r##"terms = ["super straight", ["🟧", "⬛️"], "#hashtag"]"##
        )
        .unwrap();

        let terms = FileWordlistSource::new(file.path()).load().unwrap();
        assert_eq!(terms.len(), 3);
        assert_eq!(terms[0], RawTerm::Any("super straight".to_string()));
        assert!(matches!(&terms[1], RawTerm::All(g) if g.len() == 2));
    }

    #[test]
    fn test_load_json_wordlist() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"["one", ["two", "three"]]"#).unwrap();

        let terms = FileWordlistSource::new(file.path()).load().unwrap();
        assert_eq!(terms.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let result = FileWordlistSource::new("/nonexistent/wordlist.toml").load();
        assert!(matches!(result, Err(WordlistError::Io { .. })));
    }

    #[test]
    fn test_invalid_contents() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "terms = 42").unwrap();

        let result = FileWordlistSource::new(file.path()).load();
        assert!(matches!(result, Err(WordlistError::Parse(_))));
    }

    #[test]
    fn test_reload_picks_up_edits() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"["first"]"#).unwrap();
        file.flush().unwrap();

        let source = FileWordlistSource::new(file.path());
        assert_eq!(source.load().unwrap().len(), 1);

        std::fs::write(file.path(), r#"["first", "second"]"#).unwrap();
        assert_eq!(source.load().unwrap().len(), 2);
    }

    #[test]
    fn test_sample_wordlist_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../wordlist.toml");
        let terms = FileWordlistSource::new(path).load().unwrap();
        assert!(terms.iter().any(|t| matches!(t, RawTerm::All(_))));
    }
}
