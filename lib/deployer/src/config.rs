//! Network and account configuration.
//!
//! The configuration is a JSON file shaped like
//! `{ "mnemonic": "...", "url": "http://localhost:8545" }`.
use std::path::Path;

use serde::Deserialize;

use crate::{
    client::Client,
    keys::{get_private_key, PrivateKey},
    Error, Result,
};

/// Environment variable overriding the configured RPC endpoint.
pub const RPC_URL_ENV_VAR_NAME: &str = "RPC_URL";

/// Target network and the account deploying to it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Mnemonic of the deploying account.
    pub mnemonic: String,
    /// JSON-RPC endpoint.
    pub url: String,
}

impl Config {
    /// Load the configuration at `path`. The [`RPC_URL_ENV_VAR_NAME`]
    /// variable, when set, takes precedence over the file's `url`.
    ///
    /// # Errors
    ///
    /// * [`Error::Io`] - If the file cannot be read.
    /// * [`Error::Config`] - If it is not a valid configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            Error::Config(format!("{}: {e}", path.display()))
        })?;

        Ok(config.with_url_override(env(RPC_URL_ENV_VAR_NAME)))
    }

    /// Replace the endpoint with `url`, if any.
    #[must_use]
    pub fn with_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            tracing::debug!(%url, "using RPC url from environment");
            self.url = url;
        }
        self
    }

    /// Key of the first account derived from the mnemonic.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidMnemonic`] - If the mnemonic is malformed.
    pub fn private_key(&self) -> Result<PrivateKey> {
        get_private_key(&self.mnemonic)
    }

    /// Client for the configured endpoint.
    ///
    /// # Errors
    ///
    /// * [`Error::Network`] - If the url is invalid.
    pub fn client(&self) -> Result<Client> {
        Client::new(&self.url)
    }
}

/// Load the `name` environment variable, ignoring it when empty.
fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const MNEMONIC: &str =
        "test test test test test test test test test test test junk";

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file =
            tempfile::NamedTempFile::new().expect("should create temp file");
        file.write_all(contents.as_bytes()).expect("should write config");
        file
    }

    #[test]
    fn loads_config_file() {
        let file = write_config(&format!(
            r#"{{ "mnemonic": "{MNEMONIC}", "url": "http://localhost:8545" }}"#
        ));

        let config = Config::from_file(file.path())
            .expect("should load config")
            .with_url_override(None);

        assert_eq!(config.mnemonic, MNEMONIC);
        assert_eq!(
            config.private_key().expect("valid mnemonic").address().to_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
    }

    #[test]
    fn rejects_malformed_config() {
        let file = write_config(r#"{ "mnemonic": 42 }"#);

        let err = Config::from_file(file.path()).expect_err("not a config");

        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_missing_config() {
        let err = Config::from_file("/nonexistent/test.env.json")
            .expect_err("file does not exist");

        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn url_override_takes_precedence() {
        let config = Config {
            mnemonic: MNEMONIC.to_owned(),
            url: "http://localhost:8545".to_owned(),
        };

        let config =
            config.with_url_override(Some("http://node:9545".to_owned()));
        assert_eq!(config.url, "http://node:9545");

        let client = config.client().expect("valid url");
        assert_eq!(client.url().port(), Some(9545));
    }
}
