//! Compiles a raw word list into ANY terms and ALL groups.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::normalize::Normalizer;

/// One entry of a raw word list: a single phrase or a group of phrases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTerm {
    Any(String),
    All(Vec<String>),
}

impl From<&str> for RawTerm {
    fn from(value: &str) -> Self {
        RawTerm::Any(value.to_string())
    }
}

impl From<Vec<&str>> for RawTerm {
    fn from(value: Vec<&str>) -> Self {
        RawTerm::All(value.into_iter().map(str::to_string).collect())
    }
}

/// Compiled, read-only match structure.
///
/// ANY terms are normalized like the subject text. ALL group members are only
/// lowercased, they usually hold symbol clusters expected verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermIndex {
    any_terms: BTreeSet<String>,
    all_groups: Vec<BTreeSet<String>>,
}

impl TermIndex {
    /// Build an index. An empty list is accepted here; matching against it fails.
    pub fn build<I>(raw: I, normalizer: &Normalizer) -> Self
    where
        I: IntoIterator<Item = RawTerm>,
    {
        let mut index = TermIndex::default();

        for term in raw {
            match term {
                RawTerm::All(members) => {
                    let group: BTreeSet<String> = members
                        .iter()
                        .map(|m| m.to_lowercase())
                        .filter(|m| !m.is_empty())
                        .collect();
                    if !group.is_empty() && !index.all_groups.contains(&group) {
                        index.all_groups.push(group);
                    }
                }
                RawTerm::Any(phrase) => index.add_any(&phrase, normalizer),
            }
        }

        index
    }

    fn add_any(&mut self, phrase: &str, normalizer: &Normalizer) {
        let term = normalizer.normalize(phrase);
        if term.trim().is_empty() {
            return;
        }

        let mut variants = vec![term.clone()];
        // "#tag" also matches the plain word
        if term.contains('#') {
            let stripped = term.replace('#', "");
            if !stripped.trim().is_empty() {
                variants.push(stripped);
            }
        }
        let compressed: Vec<String> = variants.iter().map(|v| remove_spaces(v)).collect();
        variants.extend(compressed);

        for variant in variants {
            if !variant.is_empty() {
                self.any_terms.insert(variant);
            }
        }
    }

    pub fn any_terms(&self) -> impl Iterator<Item = &str> {
        self.any_terms.iter().map(String::as_str)
    }

    pub fn all_groups(&self) -> &[BTreeSet<String>] {
        &self.all_groups
    }

    pub fn is_empty(&self) -> bool {
        self.any_terms.is_empty() && self.all_groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.any_terms.len() + self.all_groups.len()
    }
}

fn remove_spaces(term: &str) -> String {
    term.chars().filter(|c| *c != ' ').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(raw: Vec<RawTerm>) -> TermIndex {
        TermIndex::build(raw, &Normalizer::default())
    }

    #[test]
    fn test_any_term_lowercased_with_compressed_variant() {
        let index = build(vec!["Super Straight".into()]);
        let terms: Vec<&str> = index.any_terms().collect();
        assert_eq!(terms, vec!["super straight", "superstraight"]);
    }

    #[test]
    fn test_hashtag_variants() {
        let index = build(vec!["#ROGD".into(), "stop #grooming now".into()]);
        let terms: BTreeSet<&str> = index.any_terms().collect();

        assert!(terms.contains("#rogd"));
        assert!(terms.contains("rogd"));
        assert!(terms.contains("stop #grooming now"));
        assert!(terms.contains("stop grooming now"));
        assert!(terms.contains("stop#groomingnow"));
        assert!(terms.contains("stopgroomingnow"));
    }

    #[test]
    fn test_any_terms_are_punctuation_stripped() {
        let index = build(vec!["Gender-Critical".into(), "it's".into()]);
        let terms: BTreeSet<&str> = index.any_terms().collect();
        assert!(terms.contains("gender critical"));
        assert!(terms.contains("gendercritical"));
        assert!(terms.contains("its"));
    }

    #[test]
    fn test_any_terms_deduplicated() {
        let index = build(vec!["word".into(), "WORD".into(), "word".into()]);
        assert_eq!(index.any_terms().count(), 1);
    }

    #[test]
    fn test_all_groups_lowercased_not_stripped() {
        let index = build(vec![vec!["Foo-Bar", "BAZ"].into()]);
        let groups = index.all_groups();
        assert_eq!(groups.len(), 1);
        assert!(groups[0].contains("foo-bar"));
        assert!(groups[0].contains("baz"));
        assert_eq!(index.any_terms().count(), 0);
    }

    #[test]
    fn test_blank_entries_ignored() {
        let index = build(vec!["".into(), " ".into(), RawTerm::All(vec![])]);
        assert!(index.is_empty());
    }

    #[test]
    fn test_empty_index_is_legal() {
        let index = build(vec![]);
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn test_raw_term_deserialize_untagged() {
        let raw: Vec<RawTerm> = serde_json::from_str(r#"["one", ["a", "b"]]"#).unwrap();
        assert_eq!(raw[0], RawTerm::Any("one".to_string()));
        assert_eq!(
            raw[1],
            RawTerm::All(vec!["a".to_string(), "b".to_string()])
        );
    }
}
