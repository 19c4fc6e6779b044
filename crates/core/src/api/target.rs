//! Parsing of user supplied targets (status URLs, ids, screen names).

use regex_lite::Regex;

/// Screen name of a profile or status URL together with the status id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTarget {
    pub screen_name: Option<String>,
    pub status_id: Option<String>,
}

/// Accepts a bare numeric id or a `twitter.com/<name>(/status/<id>)` URL.
///
/// Anything else yields an empty target. Ids stay strings so 64-bit values
/// are never rounded.
pub fn parse_status_url(input: &str) -> StatusTarget {
    let input = input.trim();

    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        return StatusTarget {
            screen_name: None,
            status_id: Some(input.to_string()),
        };
    }

    let Some(re) = Regex::new(r"(?i)twitter\.com/([a-z_0-9]+)(?:/status/([0-9]+))?").ok() else {
        return StatusTarget::default();
    };

    match re.captures(input) {
        Some(caps) => StatusTarget {
            screen_name: caps.get(1).map(|m| m.as_str().to_string()),
            status_id: caps.get(2).map(|m| m.as_str().to_string()),
        },
        None => StatusTarget::default(),
    }
}

/// Screen names are 1-20 ASCII letters, digits or underscores.
pub fn is_valid_screen_name(name: &str) -> bool {
    Regex::new(r"(?i)^[a-z_0-9]{1,20}$")
        .map(|re| re.is_match(name))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id() {
        let target = parse_status_url("1452470575137660930");
        assert_eq!(target.screen_name, None);
        assert_eq!(target.status_id.as_deref(), Some("1452470575137660930"));
    }

    #[test]
    fn test_status_url() {
        let target = parse_status_url("https://twitter.com/Some_User/status/1452470575137660930?s=20");
        assert_eq!(target.screen_name.as_deref(), Some("Some_User"));
        assert_eq!(target.status_id.as_deref(), Some("1452470575137660930"));
    }

    #[test]
    fn test_profile_url() {
        let target = parse_status_url("https://twitter.com/someone");
        assert_eq!(target.screen_name.as_deref(), Some("someone"));
        assert_eq!(target.status_id, None);
    }

    #[test]
    fn test_unrecognized_input() {
        assert_eq!(parse_status_url("https://example.com/x"), StatusTarget::default());
        assert_eq!(parse_status_url(""), StatusTarget::default());
    }

    #[test]
    fn test_screen_name_validation() {
        assert!(is_valid_screen_name("someone_42"));
        assert!(is_valid_screen_name("UPPER"));
        assert!(is_valid_screen_name("a"));
        assert!(!is_valid_screen_name(""));
        assert!(!is_valid_screen_name("has space"));
        assert!(!is_valid_screen_name("waytoolongscreenname1"));
        assert!(!is_valid_screen_name("dash-name"));
    }
}
