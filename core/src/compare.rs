use std::str::FromStr;

use lazy_regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Comparison {
    Exact,
    Included,
    Regex,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompareError {
    #[error("Invalid comparison method: '{0}'")]
    InvalidComparisonMethod(String),

    #[error("Invalid regular expression '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl Comparison {
    pub fn parse(mode: &str) -> Result<Self, CompareError> {
        Self::from_str(mode).map_err(|_| CompareError::InvalidComparisonMethod(mode.to_owned()))
    }

    pub fn matches(self, actual: &str, expected: &str) -> Result<bool, CompareError> {
        match self {
            Comparison::Exact => Ok(actual == expected),
            Comparison::Included => Ok(actual.contains(expected)),
            Comparison::Regex => Ok(compile_pattern(expected)?.is_match(actual)),
        }
    }
}

pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex, CompareError> {
    Regex::new(pattern).map_err(|e| CompareError::InvalidPattern {
        pattern: pattern.to_owned(),
        reason: e.to_string(),
    })
}

/// Judges `actual` against `expected` under the comparison named by `mode`.
///
/// Both strings are taken as-is; trimming happens when the output is captured.
pub fn compare(actual: &str, expected: &str, mode: &str) -> Result<bool, CompareError> {
    Comparison::parse(mode)?.matches(actual, expected)
}
