//! `${VAR}` expansion for secrets and endpoints in `herald.toml`.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a setting value.
///
/// Values without `${` are returned as-is, so bare `$` characters (common in
/// generated app secrets) survive untouched. An unset variable without a
/// default is reported against `field`.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| match std::env::var(var) {
        Ok(val) => Ok(Some(val)),
        Err(_) => Err(Unset(var.to_owned())),
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Name of a variable that was referenced but not set.
struct Unset(String);

/// Expand every string in place, stopping at the first unset variable.
pub(crate) fn expand_all(fields: &mut [(&mut String, &str)]) -> Result<(), ConfigError> {
    for (value, field) in fields.iter_mut() {
        let field: &str = field;
        **value = expand_env(value.as_str(), field)?;
    }
    Ok(())
}
