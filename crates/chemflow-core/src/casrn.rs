//! CAS registry numbers.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{CoreError, CoreResult};

/// Default pattern for pulling a CASRN out of a file name such as
/// `CDR_50-00-0_industrial.json`.
pub const DEFAULT_FILENAME_PATTERN: &str = r"(\d{2,7}-\d{2}-\d)";

static CASRN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2,7}-\d{2}-\d$").expect("CASRN pattern compiles"));
static DEFAULT_FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_FILENAME_PATTERN).expect("filename pattern compiles"));

/// A syntactically valid CAS registry number (`NNNNNNN-NN-N`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Casrn(String);

impl Casrn {
    pub fn parse(input: &str) -> CoreResult<Self> {
        let trimmed = input.trim();
        if CASRN_RE.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(CoreError::InvalidCasrn {
                input: input.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hyphens stripped, left-padded with zeros to ten digits (`50-00-0` → `0000050000`).
    pub fn to_ten_digit(&self) -> String {
        let digits: String = self.0.chars().filter(char::is_ascii_digit).collect();
        format!("{digits:0>10}")
    }
}

impl fmt::Display for Casrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Casrn {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Casrn::parse(s)
    }
}

impl TryFrom<String> for Casrn {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Casrn::parse(&value)
    }
}

impl From<Casrn> for String {
    fn from(value: Casrn) -> Self {
        value.0
    }
}

/// Extract the chemical identifier from a file name: capture group 1 of `pattern`
/// (or the whole match when the pattern has no group).
pub fn identifier_from_filename(file_name: &str, pattern: &str) -> CoreResult<String> {
    let custom;
    let re = if pattern == DEFAULT_FILENAME_PATTERN {
        &*DEFAULT_FILENAME_RE
    } else {
        custom = Regex::new(pattern).map_err(|e| CoreError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        &custom
    };
    re.captures(file_name)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(0)))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| CoreError::IdentifierNotInFilename {
            file_name: file_name.to_string(),
            pattern: pattern.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_pads() {
        let cas = Casrn::parse(" 50-00-0 ").unwrap();
        assert_eq!(cas.as_str(), "50-00-0");
        assert_eq!(cas.to_ten_digit(), "0000050000");
        assert_eq!(Casrn::parse("1234567-89-5").unwrap().to_ten_digit(), "1234567895");
    }

    #[test]
    fn rejects_malformed() {
        assert!(matches!(Casrn::parse("50000"), Err(CoreError::InvalidCasrn { .. })));
        assert!("5-00-0".parse::<Casrn>().is_err());
    }

    #[test]
    fn filename_extraction() {
        assert_eq!(
            identifier_from_filename("CDR_50-00-0_uses.json", DEFAULT_FILENAME_PATTERN).unwrap(),
            "50-00-0"
        );
        assert_eq!(
            identifier_from_filename("readme.txt", DEFAULT_FILENAME_PATTERN),
            Err(CoreError::IdentifierNotInFilename {
                file_name: "readme.txt".into(),
                pattern: DEFAULT_FILENAME_PATTERN.into(),
            })
        );
        assert!(matches!(
            identifier_from_filename("x", "("),
            Err(CoreError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn custom_and_default_filename_patterns() {
        assert_eq!(
            identifier_from_filename("tri_2020_dtxsid7020637.json", r"(dtxsid\d+)").unwrap(),
            "dtxsid7020637"
        );
        assert_eq!(
            identifier_from_filename("chemexpo_67-64-1.json", DEFAULT_FILENAME_PATTERN).unwrap(),
            "67-64-1"
        );
    }
}
