//! Detection of `Last, First [Middle...]` personal names

use crate::error::Result;
use regex::Regex;

const NAME_PATTERN: &str = r"(\b[A-Z][a-zA-Z]+), ([A-Z][a-zA-Z]+(?: [A-Z][a-zA-Z]+)*)";

/// A name found in page text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMatch {
    /// The text exactly as it appeared, e.g. `Doe, John`
    pub matched: String,
    pub last: String,
    pub first: String,
}

impl NameMatch {
    /// Display order: given names first, surname last
    pub fn display(&self) -> String {
        format!("{} {}", self.first, self.last)
    }
}

/// Compiled name pattern
#[derive(Debug, Clone)]
pub struct NameMatcher {
    pattern: Regex,
}

impl NameMatcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(NAME_PATTERN)?,
        })
    }

    /// Every non-overlapping match, in scan order
    pub fn find_all(&self, text: &str) -> Vec<NameMatch> {
        self.pattern
            .captures_iter(text)
            .map(|caps| NameMatch {
                matched: caps[0].to_string(),
                last: caps[1].to_string(),
                first: caps[2].to_string(),
            })
            .collect()
    }

    /// Display forms of every match, in scan order
    pub fn rearranged(&self, text: &str) -> Vec<String> {
        self.find_all(text).iter().map(NameMatch::display).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("Doe, John", vec!["John Doe"])]
    #[case("Smith, Mary Ann", vec!["Mary Ann Smith"])]
    #[case("Doe, John\nRoe, Jane", vec!["John Doe", "Jane Roe"])]
    #[case("Team: Doe, John and Roe, Jane", vec!["John Doe", "Jane Roe"])]
    #[case("doe, john", vec![])]
    #[case("Doe,John", vec![])]
    #[case("A, Bob", vec![])]
    fn test_rearranged(#[case] text: &str, #[case] expected: Vec<&str>) {
        let matcher = NameMatcher::new().unwrap();
        assert_eq!(matcher.rearranged(text), expected);
    }

    #[test]
    fn test_find_all_keeps_original_text() {
        let matcher = NameMatcher::new().unwrap();
        let found = matcher.find_all("Lead: Doe, John Paul");
        assert_eq!(
            found,
            vec![NameMatch {
                matched: "Doe, John Paul".to_string(),
                last: "Doe".to_string(),
                first: "John Paul".to_string(),
            }]
        );
    }

    #[test]
    fn test_middle_names_stop_at_lowercase_word() {
        let matcher = NameMatcher::new().unwrap();
        assert_eq!(matcher.rearranged("Doe, John works here"), vec!["John Doe"]);
    }
}
