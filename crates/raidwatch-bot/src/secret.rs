//! Secret reference resolver.
//!
//! The bot token in `config.toml` (or `--bot-token`) may point at a secret
//! stored elsewhere instead of holding it inline:
//!
//! - `pass::path/in/store` runs `pass show path/in/store` and keeps the first line
//! - `env::VAR_NAME` reads `$VAR_NAME`
//! - anything else is the secret itself

use std::process::Command;

const PASS_PREFIX: &str = "pass::";
const ENV_PREFIX: &str = "env::";

/// Returns true if `value` is a reference rather than an inline secret.
pub fn is_reference(value: &str) -> bool {
    value.starts_with(PASS_PREFIX) || value.starts_with(ENV_PREFIX)
}

/// Resolves a value that may be a secret reference.
pub fn resolve(value: &str) -> Result<String, String> {
    let resolved = if let Some(path) = value.strip_prefix(PASS_PREFIX) {
        from_pass(path)?
    } else if let Some(var) = value.strip_prefix(ENV_PREFIX) {
        from_env(var)?
    } else {
        value.to_string()
    };

    let trimmed = resolved.trim();
    if trimmed.is_empty() {
        return Err(format!("secret `{}` resolved to an empty value", redact(value)));
    }
    Ok(trimmed.to_string())
}

/// Hides inline secrets, leaving references readable.
pub fn redact(value: &str) -> String {
    if is_reference(value) {
        value.to_string()
    } else {
        "<redacted>".to_string()
    }
}

fn from_pass(path: &str) -> Result<String, String> {
    let output = Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|e| format!("failed to run `pass show {}`: {}", path, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "`pass show {}` failed ({}): {}",
            path,
            output.status,
            stderr.trim()
        ));
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| format!("`pass show {}` produced no output", path))
}

fn from_env(var: &str) -> Result<String, String> {
    std::env::var(var).map_err(|_| format!("environment variable `{}` is not set", var))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_token_passes_through() {
        assert_eq!(resolve("123456:ABC-def").unwrap(), "123456:ABC-def");
        assert_eq!(resolve("  123456:ABC-def\n").unwrap(), "123456:ABC-def");
    }

    #[test]
    fn empty_value_is_rejected() {
        assert!(resolve("").unwrap_err().contains("empty"));
    }

    #[test]
    fn env_reference_resolves() {
        unsafe {
            std::env::set_var("_RAIDWATCH_TEST_TOKEN", "42:from-env");
        }
        assert_eq!(resolve("env::_RAIDWATCH_TEST_TOKEN").unwrap(), "42:from-env");
        unsafe {
            std::env::remove_var("_RAIDWATCH_TEST_TOKEN");
        }
    }

    #[test]
    fn missing_env_var_errors() {
        let err = resolve("env::_RAIDWATCH_NONEXISTENT_VAR_12345").unwrap_err();
        assert!(err.contains("not set"));
    }

    #[test]
    fn pass_reference_failure_errors() {
        // Fails whether or not `pass` is installed.
        assert!(resolve("pass::raidwatch/no/such/entry/12345").is_err());
    }

    #[test]
    fn redaction_keeps_references() {
        assert_eq!(redact("env::BOT_TOKEN"), "env::BOT_TOKEN");
        assert_eq!(redact("pass::telegram/bot"), "pass::telegram/bot");
        assert_eq!(redact("123456:ABC"), "<redacted>");
    }
}
