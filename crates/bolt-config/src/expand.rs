//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.

use crate::ConfigError;

/// Unset variable reported by the lookup callback.
struct MissingVar(String);

/// Expand environment variable references in `value`.
///
/// Only `${...}` tokens are expanded; bare `$` and `$NAME` outside braces are
/// copied through, so prices or shell snippets in a header survive. An
/// unterminated `${` is literal text. `field` names the config key in the
/// error.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    let mut expanded = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        expanded.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find('}') else {
            expanded.push_str(tail);
            return Ok(expanded);
        };
        let token = shellexpand::env_with_context(&tail[..=end], lookup).map_err(|e| {
            ConfigError::EnvVar {
                field: field.to_owned(),
                message: format!("${{{}}} not set", e.cause.0),
            }
        })?;
        expanded.push_str(&token);
        rest = &tail[end + 1..];
    }

    expanded.push_str(rest);
    Ok(expanded)
}

fn lookup(name: &str) -> Result<Option<String>, MissingVar> {
    match std::env::var(name) {
        Ok(found) => Ok(Some(found)),
        Err(_) => Err(MissingVar(name.to_owned())),
    }
}
