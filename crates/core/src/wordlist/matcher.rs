//! Substring matcher over normalized profile fields.

use std::collections::BTreeSet;

use super::index::TermIndex;
use super::normalize::Normalizer;
use super::WordlistError;

/// Evaluates profile text against a [`TermIndex`].
#[derive(Debug, Clone)]
pub struct Matcher {
    index: TermIndex,
    normalizer: Normalizer,
    groups_span_fields: bool,
}

impl Matcher {
    pub fn new(index: TermIndex, normalizer: Normalizer) -> Self {
        Self {
            index,
            normalizer,
            groups_span_fields: true,
        }
    }

    /// When set, an ALL group also matches if its members are spread over
    /// several fields (e.g. one emoji in the name, one in the bio).
    pub fn with_groups_span_fields(mut self, enabled: bool) -> Self {
        self.groups_span_fields = enabled;
        self
    }

    pub fn index(&self) -> &TermIndex {
        &self.index
    }

    /// Returns true as soon as one field contains an ANY term or all members
    /// of an ALL group.
    ///
    /// Fails with [`WordlistError::Empty`] when the index holds no terms.
    pub fn is_match<S: AsRef<str>>(&self, fields: &[S]) -> Result<bool, WordlistError> {
        if self.index.is_empty() {
            return Err(WordlistError::Empty);
        }

        let normalized: Vec<String> = fields
            .iter()
            .map(|f| self.normalizer.normalize(f.as_ref()))
            .collect();

        for field in &normalized {
            if self.index.any_terms().any(|term| field.contains(term)) {
                return Ok(true);
            }

            if self
                .index
                .all_groups()
                .iter()
                .any(|group| group_in(group, |term| field.contains(term)))
            {
                return Ok(true);
            }
        }

        if self.groups_span_fields && normalized.len() > 1 {
            let spread = self.index.all_groups().iter().any(|group| {
                group_in(group, |term| normalized.iter().any(|f| f.contains(term)))
            });
            return Ok(spread);
        }

        Ok(false)
    }
}

fn group_in<F>(group: &BTreeSet<String>, contains: F) -> bool
where
    F: Fn(&str) -> bool,
{
    group.iter().all(|term| contains(term))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordlist::RawTerm;

    fn matcher(raw: Vec<RawTerm>) -> Matcher {
        let normalizer = Normalizer::default();
        Matcher::new(TermIndex::build(raw, &normalizer), normalizer)
    }

    #[test]
    fn test_any_term_case_insensitive_substring() {
        let m = matcher(vec!["trump".into()]);
        assert!(m.is_match(&["I Love TRUMP", "", ""]).unwrap());
        assert!(m.is_match(&["", "", "trumpton"]).unwrap());
        assert!(!m.is_match(&["nothing", "here", ""]).unwrap());
    }

    #[test]
    fn test_hashtag_term_matches_plain_word() {
        let m = matcher(vec!["#ROGD".into()]);
        assert!(m.is_match(&["", "discussing rogd today", ""]).unwrap());
        assert!(m.is_match(&["", "#rogd", ""]).unwrap());
    }

    #[test]
    fn test_compressed_variant_matches_hashtag_text() {
        let m = matcher(vec!["super straight".into()]);
        assert!(m.is_match(&["", "#SuperStraight", ""]).unwrap());
    }

    #[test]
    fn test_punctuation_in_subject_is_ignored() {
        let m = matcher(vec!["gender critical".into()]);
        assert!(m.is_match(&["", "Gender-Critical.", ""]).unwrap());
    }

    #[test]
    fn test_all_group_requires_every_member() {
        let m = matcher(vec![vec!["foo", "bar"].into()]);
        assert!(m.is_match(&["bar none foo", "", ""]).unwrap());
        assert!(!m.is_match(&["only foo here", "", ""]).unwrap());
    }

    #[test]
    fn test_all_group_across_fields() {
        let m = matcher(vec![vec!["🟧", "⬛️"].into()]);
        assert!(m.is_match(&["🟧", "⬛️ person", ""]).unwrap());

        let strict = matcher(vec![vec!["🟧", "⬛️"].into()]).with_groups_span_fields(false);
        assert!(!strict.is_match(&["🟧", "⬛️ person", ""]).unwrap());
        assert!(strict.is_match(&["", "🟧⬛️", ""]).unwrap());
    }

    #[test]
    fn test_empty_index_fails() {
        let m = matcher(vec![]);
        assert!(matches!(
            m.is_match(&["anything", "", ""]),
            Err(WordlistError::Empty)
        ));

        let blank_groups = matcher(vec![RawTerm::All(vec![]), "".into()]);
        assert!(matches!(
            blank_groups.is_match(&[""]),
            Err(WordlistError::Empty)
        ));
    }

    #[test]
    fn test_field_order_does_not_change_result() {
        let m = matcher(vec!["needle".into(), vec!["x1", "y2"].into()]);
        let a = m.is_match(&["x1", "haystack", "a needle"]).unwrap();
        let b = m.is_match(&["a needle", "x1", "haystack"]).unwrap();
        assert_eq!(a, b);
        assert!(a);
    }
}
