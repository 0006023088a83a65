// src/config.rs

//! Configuration loading utilities.
//!
//! Settings come from a TOML file (see [`Config`]); mail credentials and a few
//! deployment overrides come from the environment, with `.env` loaded first.

use std::env::VarError;
use std::fmt;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Config;

pub const SENDER_EMAIL: &str = "SENDER_EMAIL";
pub const SENDER_PASSWORD: &str = "SENDER_PASSWORD";
pub const RECEIVER_EMAIL: &str = "RECEIVER_EMAIL";

/// Sender account and recipient for notification emails.
#[derive(Clone, PartialEq, Eq)]
pub struct MailCredentials {
    pub sender: String,
    pub password: String,
    pub recipient: String,
}

impl fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailCredentials")
            .field("sender", &self.sender)
            .field("password", &"<redacted>")
            .field("recipient", &self.recipient)
            .finish()
    }
}

/// Load mail credentials from the environment, reading `.env` first.
pub fn load_mail_credentials() -> Result<MailCredentials> {
    dotenvy::dotenv().ok();
    mail_credentials_from(|key| std::env::var(key))
}

/// Build mail credentials from an env-var lookup.
///
/// All three variables are required; blank values count as missing.
pub fn mail_credentials_from<F>(lookup: F) -> Result<MailCredentials>
where
    F: Fn(&str) -> std::result::Result<String, VarError>,
{
    let missing: Vec<&str> = [SENDER_EMAIL, SENDER_PASSWORD, RECEIVER_EMAIL]
        .into_iter()
        .filter(|key| lookup(*key).map(|v| v.trim().is_empty()).unwrap_or(true))
        .collect();

    if !missing.is_empty() {
        return Err(AppError::config(format!(
            "environment variables not set: {}",
            missing.join(", ")
        )));
    }

    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).unwrap_or_default();
    Ok(MailCredentials {
        sender: get(SENDER_EMAIL),
        password: get(SENDER_PASSWORD),
        recipient: get(RECEIVER_EMAIL),
    })
}

/// Apply deployment overrides from an env-var lookup.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> std::result::Result<String, VarError>,
{
    if let Ok(url) = lookup("PRODUCT_URL") {
        config.product.url = url;
    }
    if let Ok(pincode) = lookup("PINCODE") {
        config.product.pincode = pincode;
    }
    if let Ok(endpoint) = lookup("WEBDRIVER_URL") {
        config.browser.webdriver_url = endpoint;
    }
    if let Ok(path) = lookup("STATE_FILE") {
        config.monitor.state_file = path.into();
    }
    if let Ok(raw) = lookup("POLL_INTERVAL_SECS") {
        config.monitor.poll_interval_secs = raw.parse().map_err(|e| {
            AppError::config(format!("POLL_INTERVAL_SECS is not a number ({raw}): {e}"))
        })?;
    }
    Ok(())
}

/// Load the config file (defaults when absent), apply env overrides, validate.
pub fn load_config(path: &Path) -> Result<Config> {
    dotenvy::dotenv().ok();
    let mut config = Config::load_or_default(path);
    apply_env_overrides(&mut config, |key| std::env::var(key))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> std::result::Result<String, VarError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned().ok_or(VarError::NotPresent)
    }

    #[test]
    fn test_credentials_complete() {
        let creds = mail_credentials_from(lookup(&[
            (SENDER_EMAIL, "monitor@example.com"),
            (SENDER_PASSWORD, "abcd efgh"),
            (RECEIVER_EMAIL, " operator@example.com "),
        ]))
        .unwrap();

        assert_eq!(creds.sender, "monitor@example.com");
        assert_eq!(creds.recipient, "operator@example.com");
        assert!(!format!("{creds:?}").contains("abcd"));
    }

    #[test]
    fn test_credentials_missing_are_named() {
        let err = mail_credentials_from(lookup(&[
            (SENDER_EMAIL, "monitor@example.com"),
            (SENDER_PASSWORD, "  "),
        ]))
        .unwrap_err();

        let message = err.to_string();
        assert!(matches!(err, AppError::Config(_)));
        assert!(message.contains(SENDER_PASSWORD));
        assert!(message.contains(RECEIVER_EMAIL));
        assert!(!message.contains(SENDER_EMAIL));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            lookup(&[
                ("PINCODE", "400001"),
                ("WEBDRIVER_URL", "http://selenium:4444"),
                ("POLL_INTERVAL_SECS", "300"),
            ]),
        )
        .unwrap();

        assert_eq!(config.product.pincode, "400001");
        assert_eq!(config.browser.webdriver_url, "http://selenium:4444");
        assert_eq!(config.monitor.poll_interval_secs, 300);
    }

    #[test]
    fn test_env_override_bad_number() {
        let mut config = Config::default();
        let result = apply_env_overrides(&mut config, lookup(&[("POLL_INTERVAL_SECS", "soon")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
