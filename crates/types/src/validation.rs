//! Validation helpers for user-supplied values.
//!
//! Every check here runs before a request is built, so a rejected value never
//! produces a partial effect on the remote service.

use thiserror::Error;

use crate::EnvVar;

/// Errors raised while validating command input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid key/value pair.")]
    InvalidPair { input: String },

    #[error("Whitespace not allowed in key/value pair.")]
    WhitespaceInName { input: String },

    #[error("{} errors found:\nYour Input: {input}\nInvalid Entries: {}", .invalid.len(), .invalid.join(", "))]
    InvalidEnvList { input: String, invalid: Vec<String> },

    #[error("Required Field")]
    Required,

    #[error("Must be an Integer")]
    NotInteger { input: String },

    #[error("Please remove leading #")]
    SlackChannelHash,

    #[error("Must specify either prefix or suffix")]
    MissingFilter,

    #[error("Can not specify both prefix and suffix")]
    ConflictingFilter,

    #[error("Unknown property '{name}'. Expected one of: {expected}")]
    UnknownProperty { name: String, expected: String },

    #[error("Invalid plan '{input}'. Expected <service>:<plan> (example: xisoap-ws:dev)")]
    InvalidPlan { input: String },

    #[error("Unknown run filter '{input}'. Expected failed or success")]
    UnknownRunFilter { input: String },
}

/// Parse a single `KEY=value` pair.
///
/// The pair must contain exactly one `=` with non-empty text on both sides,
/// and the name must not contain whitespace.
pub fn parse_env_pair(input: &str) -> Result<EnvVar, ValidationError> {
    let (name, value) = split_pair(input).ok_or_else(|| ValidationError::InvalidPair { input: input.to_string() })?;
    if name.chars().any(char::is_whitespace) {
        return Err(ValidationError::WhitespaceInName { input: input.to_string() });
    }
    Ok(EnvVar {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Parse a space separated list of `KEY=value` tokens.
///
/// An empty input is valid and yields no variables. Every invalid token is
/// reported, not just the first. Double quotes are stripped from the accepted
/// tokens so `KEY="value"` stores `value`.
pub fn parse_env_list(input: &str) -> Result<Vec<EnvVar>, ValidationError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    let tokens: Vec<&str> = input.split_whitespace().collect();
    let invalid: Vec<String> = tokens
        .iter()
        .filter(|token| split_pair(token).is_none())
        .map(|token| token.to_string())
        .collect();
    if !invalid.is_empty() {
        return Err(ValidationError::InvalidEnvList {
            input: input.to_string(),
            invalid,
        });
    }

    Ok(tokens
        .into_iter()
        .map(|token| token.replace('"', ""))
        .filter_map(|token| {
            let (name, value) = split_pair(&token)?;
            Some(EnvVar {
                name: name.to_string(),
                value: value.to_string(),
            })
        })
        .collect())
}

fn split_pair(input: &str) -> Option<(&str, &str)> {
    let (name, value) = input.split_once('=')?;
    if name.is_empty() || value.is_empty() || value.contains('=') {
        return None;
    }
    Some((name, value))
}

/// Reject empty input.
pub fn validate_required(input: &str) -> Result<(), ValidationError> {
    if input.is_empty() { Err(ValidationError::Required) } else { Ok(()) }
}

/// Parse an integer answer.
pub fn parse_integer(input: &str) -> Result<i64, ValidationError> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::NotInteger { input: input.to_string() })
}

/// Slack channels are stored without the leading `#`; the service adds it.
pub fn validate_slack_channel(input: &str) -> Result<(), ValidationError> {
    validate_required(input)?;
    if input.contains('#') {
        return Err(ValidationError::SlackChannelHash);
    }
    Ok(())
}

/// Selects tests by the start or the end of their `job-jobspace` name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameFilter {
    Prefix(String),
    Suffix(String),
}

impl NameFilter {
    /// Build a filter from the mutually exclusive `--prefix`/`--suffix` options.
    ///
    /// Empty strings count as absent.
    pub fn from_options(prefix: Option<&str>, suffix: Option<&str>) -> Result<Self, ValidationError> {
        let prefix = prefix.filter(|value| !value.is_empty());
        let suffix = suffix.filter(|value| !value.is_empty());
        match (prefix, suffix) {
            (Some(_), Some(_)) => Err(ValidationError::ConflictingFilter),
            (Some(prefix), None) => Ok(Self::Prefix(prefix.to_string())),
            (None, Some(suffix)) => Ok(Self::Suffix(suffix.to_string())),
            (None, None) => Err(ValidationError::MissingFilter),
        }
    }

    /// Case-sensitive match against a composite test name.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Prefix(prefix) => name.starts_with(prefix.as_str()),
            Self::Suffix(suffix) => name.ends_with(suffix.as_str()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Prefix(_) => "prefix",
            Self::Suffix(_) => "suffix",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Prefix(value) | Self::Suffix(value) => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_pair_accepts_single_separator() {
        let pair = parse_env_pair("FOO=bar").unwrap();
        assert_eq!(pair.name, "FOO");
        assert_eq!(pair.value, "bar");
    }

    #[test]
    fn env_pair_value_may_contain_spaces() {
        let pair = parse_env_pair("GREETING=hello world").unwrap();
        assert_eq!(pair.value, "hello world");
    }

    #[test]
    fn env_pair_rejects_malformed_shapes() {
        for input in ["FOO bar", "FOO=", "=bar", "A=b=c", "", "="] {
            assert_eq!(
                parse_env_pair(input),
                Err(ValidationError::InvalidPair { input: input.to_string() }),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn env_pair_rejects_whitespace_in_name() {
        assert!(matches!(parse_env_pair("FO O=bar"), Err(ValidationError::WhitespaceInName { .. })));
        assert!(matches!(parse_env_pair("FOO\t=bar"), Err(ValidationError::WhitespaceInName { .. })));
    }

    #[test]
    fn env_list_reports_every_invalid_token() {
        let error = parse_env_list("A=1 B C= D=4 =5").unwrap_err();
        assert_eq!(
            error.to_string(),
            "3 errors found:\nYour Input: A=1 B C= D=4 =5\nInvalid Entries: B, C=, =5"
        );
    }

    #[test]
    fn env_list_strips_quotes_and_allows_empty_input() {
        assert!(parse_env_list("").unwrap().is_empty());
        assert!(parse_env_list("   ").unwrap().is_empty());

        let vars = parse_env_list("KEY=\"value\" KEY2=value2").unwrap();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars[0].name, "KEY");
        assert_eq!(vars[0].value, "value");
        assert_eq!(vars[1].name, "KEY2");
    }

    #[test]
    fn slack_channel_rules() {
        assert_eq!(validate_slack_channel(""), Err(ValidationError::Required));
        assert_eq!(validate_slack_channel("#builds"), Err(ValidationError::SlackChannelHash));
        assert!(validate_slack_channel("builds").is_ok());
    }

    #[test]
    fn integers_must_parse() {
        assert_eq!(parse_integer("30"), Ok(30));
        assert_eq!(parse_integer(" 5 "), Ok(5));
        assert!(parse_integer("3.5").is_err());
        assert!(parse_integer("soon").is_err());
    }

    #[test]
    fn name_filter_requires_exactly_one_option() {
        assert_eq!(NameFilter::from_options(None, None), Err(ValidationError::MissingFilter));
        assert_eq!(NameFilter::from_options(Some(""), None), Err(ValidationError::MissingFilter));
        assert_eq!(
            NameFilter::from_options(Some("a"), Some("b")),
            Err(ValidationError::ConflictingFilter)
        );
        assert_eq!(
            NameFilter::from_options(Some("ui-"), None),
            Ok(NameFilter::Prefix("ui-".to_string()))
        );
    }

    #[test]
    fn name_filter_is_case_sensitive() {
        let prefix = NameFilter::Prefix("ui".into());
        assert!(prefix.matches("ui-tests-qa"));
        assert!(!prefix.matches("UI-tests-qa"));

        let suffix = NameFilter::Suffix("-qa".into());
        assert!(suffix.matches("ui-tests-qa"));
        assert!(!suffix.matches("ui-tests-QA"));
        assert_eq!(suffix.kind(), "suffix");
        assert_eq!(suffix.value(), "-qa");
    }
}
