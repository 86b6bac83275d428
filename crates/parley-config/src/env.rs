use std::sync::OnceLock;

use regex::{Captures, Regex};
use thiserror::Error;

/// Failure while substituting `{{ env.VAR }}` placeholders
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvExpansionError {
    /// Variable is unset and the placeholder carries no default
    #[error("environment variable not found: `{0}`")]
    Missing(String),

    /// Placeholder uses a scope other than `env.`
    #[error("only variables scoped with 'env.' are supported: `{0}`")]
    UnsupportedScope(String),
}

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `{{ env.NAME }}` or `{{ env.NAME | default("value") }}`
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#).expect("must be valid regex")
    })
}

/// Expand `{{ env.VAR }}` placeholders in raw configuration text
///
/// A placeholder may carry a fallback, `{{ env.VAR | default("x") }}`, used
/// when the variable is unset. Lines whose first non-blank character is `#`
/// are copied through untouched so commented-out secrets never fail a load.
pub fn expand_env(input: &str) -> Result<String, EnvExpansionError> {
    let mut expanded = input
        .lines()
        .map(expand_line)
        .collect::<Result<Vec<_>, _>>()?
        .join("\n");

    if input.ends_with('\n') {
        expanded.push('\n');
    }

    Ok(expanded)
}

fn expand_line(line: &str) -> Result<String, EnvExpansionError> {
    if line.trim_start().starts_with('#') {
        return Ok(line.to_owned());
    }

    let mut failure = None;
    let replaced = placeholder().replace_all(line, |caps: &Captures<'_>| {
        match resolve(&caps[1], caps.get(2).map(|m| m.as_str())) {
            Ok(value) => value,
            Err(e) => {
                failure.get_or_insert(e);
                String::new()
            }
        }
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(replaced.into_owned()),
    }
}

fn resolve(key: &str, default: Option<&str>) -> Result<String, EnvExpansionError> {
    let Some(name) = key.strip_prefix("env.").filter(|n| !n.is_empty() && !n.contains('.')) else {
        return Err(EnvExpansionError::UnsupportedScope(key.to_owned()));
    };

    std::env::var(name)
        .ok()
        .or_else(|| default.map(str::to_owned))
        .ok_or_else(|| EnvExpansionError::Missing(name.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let input = "backend = \"responses\"";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn substitutes_set_variable() {
        temp_env::with_var("PARLEY_TEST_KEY", Some("sk-123"), || {
            let out = expand_env("api_key = \"{{ env.PARLEY_TEST_KEY }}\"").unwrap();
            assert_eq!(out, "api_key = \"sk-123\"");
        });
    }

    #[test]
    fn substitutes_several_variables_across_lines() {
        temp_env::with_vars([("PARLEY_A", Some("a")), ("PARLEY_B", Some("b"))], || {
            let out = expand_env("x = \"{{ env.PARLEY_A }}\"\ny = \"{{env.PARLEY_B}}\"\n").unwrap();
            assert_eq!(out, "x = \"a\"\ny = \"b\"\n");
        });
    }

    #[test]
    fn missing_variable_is_reported_by_name() {
        temp_env::with_var_unset("PARLEY_ABSENT", || {
            let err = expand_env("token = \"{{ env.PARLEY_ABSENT }}\"").unwrap_err();
            assert_eq!(err, EnvExpansionError::Missing("PARLEY_ABSENT".to_owned()));
        });
    }

    #[test]
    fn non_env_scope_is_rejected() {
        let err = expand_env("x = \"{{ vault.SECRET }}\"").unwrap_err();
        assert!(matches!(err, EnvExpansionError::UnsupportedScope(_)));
    }

    #[test]
    fn comment_lines_are_not_expanded() {
        temp_env::with_var_unset("PARLEY_ABSENT", || {
            let input = "  # token = \"{{ env.PARLEY_ABSENT }}\"";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }

    #[test]
    fn default_applies_only_when_unset() {
        temp_env::with_var_unset("PARLEY_OPTIONAL", || {
            let out = expand_env("x = \"{{ env.PARLEY_OPTIONAL | default(\"fallback\") }}\"").unwrap();
            assert_eq!(out, "x = \"fallback\"");
        });
        temp_env::with_var("PARLEY_OPTIONAL", Some("set"), || {
            let out = expand_env("x = \"{{ env.PARLEY_OPTIONAL | default(\"fallback\") }}\"").unwrap();
            assert_eq!(out, "x = \"set\"");
        });
    }
}
