//! Token catalog document to [`StaticToken`] mapping

use crate::api::v1;
use crate::error::ConfigError;
use crate::types::StaticToken;
use regex::{Captures, Regex};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::env::{self, VarError};
use std::sync::Arc;

type Result<T> = std::result::Result<T, ConfigError>;

/// `${NAME}` or `$NAME` reference without a default
const PLAIN_REFERENCE: &str = r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)";

/// Indexed token records keyed by value
pub type TokenIndex = HashMap<String, Arc<StaticToken>>;

/// Map a raw v1 catalog document into indexed token records
///
/// Environment references (`$VAR`, `${VAR}`, `${VAR:-default}`) are
/// expanded first. An unset variable takes its default when one is given
/// and the empty string otherwise. The document is then read as JSON,
/// falling back to YAML.
pub fn map_v1_to_model(data: &str) -> Result<TokenIndex> {
    let expanded = expand_env(data)?;
    let config = parse_document(&expanded)?;

    if config.version != v1::VERSION {
        return Err(ConfigError::UnsupportedVersion {
            expected: v1::VERSION,
            got: config.version,
        });
    }

    let tokens = config
        .tokens
        .into_iter()
        .enumerate()
        .map(|(index, token)| map_token(index, token))
        .collect::<Result<Vec<_>>>()?;

    index_tokens(tokens)
}

/// Index records by value, rejecting empty and repeated values
pub fn index_tokens(tokens: impl IntoIterator<Item = StaticToken>) -> Result<TokenIndex> {
    let mut index = TokenIndex::new();

    for (i, token) in tokens.into_iter().enumerate() {
        if token.value.is_empty() {
            return Err(ConfigError::EmptyTokenValue { index: i });
        }

        match index.entry(token.value.clone()) {
            Entry::Occupied(_) => return Err(ConfigError::DuplicateToken { index: i }),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(token));
            }
        }
    }

    Ok(index)
}

fn expand_env(data: &str) -> Result<String> {
    let reference =
        Regex::new(PLAIN_REFERENCE).map_err(|e| ConfigError::EnvSubstitution(e.to_string()))?;

    let data = reference.replace_all(data, |caps: &Captures| {
        let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        match env::var_os(name) {
            Some(_) => caps[0].to_string(),
            None => String::new(),
        }
    });

    shellexpand::env_with_context(&data, |name| match env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(e) => Err(e),
    })
    .map(|expanded| expanded.into_owned())
    .map_err(|e| ConfigError::EnvSubstitution(e.to_string()))
}

fn parse_document(data: &str) -> Result<v1::Config> {
    match serde_json::from_str::<v1::Config>(data) {
        Ok(config) => Ok(config),
        Err(json_err) => serde_yaml::from_str::<v1::Config>(data).map_err(|yaml_err| {
            ConfigError::Parse {
                json: json_err.to_string(),
                yaml: yaml_err.to_string(),
            }
        }),
    }
}

fn map_token(index: usize, token: v1::Token) -> Result<StaticToken> {
    if token.value.is_empty() {
        return Err(ConfigError::EmptyTokenValue { index });
    }

    Ok(StaticToken {
        value: token.value,
        client_id: token.client_id,
        disabled: token.disable,
        expires_at: token.expires_at,
        allowed_method: compile_pattern(&token.allowed_method_regex)?,
        allowed_url: compile_pattern(&token.allowed_url_regex)?,
    })
}

fn compile_pattern(pattern: &str) -> Result<Option<Regex>> {
    if pattern.is_empty() {
        return Ok(None);
    }

    Regex::new(pattern)
        .map(Some)
        .map_err(|source| ConfigError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_document() {
        let tokens = map_v1_to_model(
            r#"{"version": "v1", "tokens": [{"value": "t0", "client_id": "c0"}]}"#,
        )
        .unwrap();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens["t0"].client_id, "c0");
    }

    #[test]
    fn test_yaml_fallback() {
        let tokens = map_v1_to_model("version: v1\ntokens:\n- value: t0\n  allowed_method: PUT\n").unwrap();

        let method = tokens["t0"].allowed_method.as_ref().unwrap();
        assert_eq!(method.as_str(), "PUT");
    }

    #[test]
    fn test_both_parse_errors_surfaced() {
        let err = map_v1_to_model("{ version: [").unwrap_err();

        match err {
            ConfigError::Parse { json, yaml } => {
                assert!(!json.is_empty());
                assert!(!yaml.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_version() {
        let err = map_v1_to_model(r#"{"version": "v2", "tokens": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedVersion { .. }));

        let err = map_v1_to_model(r#"{"tokens": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedVersion { .. }));
    }

    #[test]
    fn test_empty_value() {
        let err = map_v1_to_model(r#"{"version": "v1", "tokens": [{"value": "t0"}, {"value": ""}]}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyTokenValue { index: 1 }));
    }

    #[test]
    fn test_duplicate_value() {
        let err = map_v1_to_model(r#"{"version": "v1", "tokens": [{"value": "dup"}, {"value": "dup"}]}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateToken { index: 1 }));
    }

    #[test]
    fn test_invalid_regex_names_pattern() {
        let err = map_v1_to_model(r#"{"version": "v1", "tokens": [{"value": "t0", "allowed_url": "(unclosed"}]}"#)
            .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidRegex { .. }));
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn test_unset_env_var_expands_to_empty() {
        let tokens = map_v1_to_model(
            r#"{"version": "v1", "tokens": [{"value": "t0", "client_id": "${INGRESS_AUTHZ_MAPPER_UNSET_VAR}"}]}"#,
        )
        .unwrap();

        assert_eq!(tokens["t0"].client_id, "");
    }

    #[test]
    fn test_unset_bare_env_var_expands_to_empty() {
        let tokens = map_v1_to_model(
            "version: v1\ntokens:\n- value: t0\n  client_id: c-$INGRESS_AUTHZ_MAPPER_UNSET_BARE\n",
        )
        .unwrap();

        assert_eq!(tokens["t0"].client_id, "c-");
    }

    #[test]
    fn test_unset_env_var_takes_default() {
        let tokens = map_v1_to_model(
            r#"{"version": "v1", "tokens": [{"value": "${INGRESS_AUTHZ_MAPPER_UNSET_TOKEN:-fallback}", "client_id": "${INGRESS_AUTHZ_MAPPER_UNSET_CLIENT:-dev}"}]}"#,
        )
        .unwrap();

        assert_eq!(tokens["fallback"].client_id, "dev");
    }

    #[test]
    fn test_set_env_var_overrides_default() {
        env::set_var("INGRESS_AUTHZ_MAPPER_SET_TOKEN", "from-env");

        let tokens = map_v1_to_model(
            r#"{"version": "v1", "tokens": [{"value": "${INGRESS_AUTHZ_MAPPER_SET_TOKEN:-fallback}"}]}"#,
        )
        .unwrap();

        assert!(tokens.contains_key("from-env"));
        assert!(!tokens.contains_key("fallback"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_env_var_fails() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        env::set_var(
            "INGRESS_AUTHZ_MAPPER_NOT_UNICODE",
            OsString::from_vec(vec![0x66, 0x6f, 0xff, 0x6f]),
        );

        let err = map_v1_to_model(
            r#"{"version": "v1", "tokens": [{"value": "${INGRESS_AUTHZ_MAPPER_NOT_UNICODE}"}]}"#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::EnvSubstitution(_)));
    }

    #[test]
    fn test_regex_anchor_survives_expansion() {
        let tokens = map_v1_to_model(
            r#"{"version": "v1", "tokens": [{"value": "t0", "allowed_url": "^https://a.dev/api$"}]}"#,
        )
        .unwrap();

        let url = tokens["t0"].allowed_url.as_ref().unwrap();
        assert!(url.is_match("https://a.dev/api"));
    }

    #[test]
    fn test_index_tokens_rejects_duplicates() {
        let err = index_tokens(vec![StaticToken::new("a"), StaticToken::new("a")]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateToken { index: 1 }));
    }
}
