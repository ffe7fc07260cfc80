//! Key resolution: what a command addresses, validated before any store call.

use itertools::Itertools;
use regex::Regex;

use crate::domain::DomainError;

const DOMAIN_PATTERN: &str = r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?(\.[a-z0-9]([a-z0-9-]*[a-z0-9])?)+$";

/// What a state command operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// One alias by id
    Single(String),
    /// Every alias of a domain
    Group(String),
}

impl Target {
    /// Resolve command input into exactly one target.
    ///
    /// Exactly one of `id` and `domain` must be given.
    pub fn resolve(id: Option<&str>, domain: Option<&str>) -> Result<Self, DomainError> {
        match (id, domain) {
            (Some(id), None) => Ok(Target::Single(validate_id(id)?)),
            (None, Some(domain)) => Ok(Target::Group(normalize_domain(domain)?)),
            (Some(_), Some(_)) => Err(DomainError::Validation(
                "ambiguous target: give an alias id or --domain, not both".into(),
            )),
            (None, None) => Err(DomainError::Validation(
                "missing target: give an alias id or --domain".into(),
            )),
        }
    }
}

/// Characters that would change the meaning of a request path or id list.
const ID_RESERVED: &[char] = &['/', '\\', '?', '#', ','];

/// Validate an opaque identifier: non-empty, no whitespace, usable as one
/// path segment and as one entry of a comma-separated list.
pub fn validate_id(id: &str) -> Result<String, DomainError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(DomainError::Validation("empty id".into()));
    }
    if id.chars().any(char::is_whitespace) {
        return Err(DomainError::Validation(format!(
            "id must not contain whitespace: {id:?}"
        )));
    }
    if id == "." || id == ".." || id.contains(ID_RESERVED) {
        return Err(DomainError::Validation(format!(
            "id must not contain '/', '\\', '?', '#' or ',': {id:?}"
        )));
    }
    Ok(id.to_string())
}

/// Validate a list of identifiers, dropping repeats while keeping first-seen order.
///
/// Repeats would otherwise be mutated twice and reported twice.
pub fn validate_ids(ids: &[String]) -> Result<Vec<String>, DomainError> {
    if ids.is_empty() {
        return Err(DomainError::Validation("no ids given".into()));
    }
    let ids: Vec<String> = ids
        .iter()
        .map(|id| validate_id(id))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids.into_iter().unique().collect())
}

/// Normalize a domain group key to lowercase and check its shape.
///
/// Accepts a bare host name; a leading scheme (`https://`) is stripped.
pub fn normalize_domain(domain: &str) -> Result<String, DomainError> {
    let trimmed = domain.trim().trim_end_matches('/');
    let host = trimmed
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(trimmed)
        .to_ascii_lowercase();

    let re = Regex::new(DOMAIN_PATTERN)
        .map_err(|e| DomainError::Validation(format!("domain pattern: {e}")))?;
    if !re.is_match(&host) {
        return Err(DomainError::Validation(format!("not a domain: {domain:?}")));
    }
    Ok(host)
}

/// Validate a mailbox name used as a move destination.
pub fn validate_mailbox(mailbox: &str) -> Result<String, DomainError> {
    let mailbox = mailbox.trim();
    if mailbox.is_empty() {
        return Err(DomainError::Validation("empty mailbox name".into()));
    }
    Ok(mailbox.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn given_only_id_when_resolving_then_single_target() {
        let target = Target::resolve(Some(" a1 "), None).unwrap();
        assert_eq!(target, Target::Single("a1".into()));
    }

    #[test]
    fn given_only_domain_when_resolving_then_group_target_normalized() {
        let target = Target::resolve(None, Some("https://Example.COM/")).unwrap();
        assert_eq!(target, Target::Group("example.com".into()));
    }

    #[rstest]
    #[case(Some("a1"), Some("example.com"))]
    #[case(None, None)]
    #[case(Some("   "), None)]
    #[case(Some("a 1"), None)]
    #[case(None, Some("localhost"))]
    #[case(None, Some("exa mple.com"))]
    #[case(None, Some("-bad.com"))]
    fn given_malformed_input_when_resolving_then_validation_error(
        #[case] id: Option<&str>,
        #[case] domain: Option<&str>,
    ) {
        let err = Target::resolve(id, domain).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)), "got {err:?}");
    }

    #[rstest]
    #[case::parent_path("../aliases/a1")]
    #[case::nested_path("a1/items")]
    #[case::backslash("a1\\x")]
    #[case::query("a1?x=1")]
    #[case::fragment("a1#top")]
    #[case::list_separator("m1,m2")]
    #[case::dot(".")]
    #[case::dot_dot("..")]
    fn given_id_that_reshapes_request_when_validating_then_validation_error(#[case] id: &str) {
        // Act
        let err = validate_id(id).unwrap_err();

        // Assert
        assert!(matches!(err, DomainError::Validation(_)), "got {err:?}");
    }

    #[rstest]
    #[case("a1")]
    #[case("msg-2024.03_01")]
    #[case("alias+tag@x")]
    fn given_opaque_id_when_validating_then_accepted_unchanged(#[case] id: &str) {
        assert_eq!(validate_id(id).unwrap(), id);
    }

    #[test]
    fn given_comma_inside_id_list_when_validating_then_rejected_before_any_call() {
        let ids = vec!["m1".to_string(), "m2,m3".to_string()];
        assert!(matches!(validate_ids(&ids), Err(DomainError::Validation(_))));
    }

    #[test]
    fn given_repeated_ids_when_validating_then_deduplicated_in_order() {
        let ids = vec!["m2".to_string(), "m1".to_string(), "m2".to_string()];
        assert_eq!(validate_ids(&ids).unwrap(), vec!["m2", "m1"]);
    }

    #[test]
    fn given_no_ids_when_validating_then_validation_error() {
        assert!(matches!(
            validate_ids(&[]),
            Err(DomainError::Validation(_))
        ));
    }
}
