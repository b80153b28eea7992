//! Configuration validation.

use super::error::{ConfigError, ConfigResult};
use super::schema::{BrazeConfig, LogOutput};

/// Validates a loaded configuration.
///
/// Called by [`ConfigLoader::load`](super::loader::ConfigLoader::load) after
/// extraction, so a successfully loaded configuration is always valid.
pub fn validate_config(config: &BrazeConfig) -> ConfigResult<()> {
    let prefix = &config.bot.command_prefix;
    if prefix.is_empty() {
        return Err(ConfigError::validation("bot.command_prefix must not be empty"));
    }
    if prefix.chars().any(char::is_whitespace) {
        return Err(ConfigError::validation(
            "bot.command_prefix must not contain whitespace",
        ));
    }

    if let Some(proxy) = &config.bot.proxy {
        let supported = ["http://", "https://", "socks5://"];
        if !supported.iter().any(|scheme| proxy.starts_with(scheme)) {
            return Err(ConfigError::validation(format!(
                "bot.proxy must use http, https or socks5, got: {proxy}"
            )));
        }
    }

    if config.logging.output == LogOutput::File && config.logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.file_path is required when logging.output is \"file\"",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&BrazeConfig::default()).is_ok());
    }

    #[test]
    fn empty_prefix_is_rejected() {
        let mut config = BrazeConfig::default();
        config.bot.command_prefix.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn whitespace_prefix_is_rejected() {
        let mut config = BrazeConfig::default();
        config.bot.command_prefix = "! ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn unknown_proxy_scheme_is_rejected() {
        let mut config = BrazeConfig::default();
        config.bot.proxy = Some("ftp://proxy.local".to_string());
        assert!(validate_config(&config).is_err());

        config.bot.proxy = Some("socks5://proxy.local:1080".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn file_output_requires_a_path() {
        let mut config = BrazeConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("braze.log".into());
        assert!(validate_config(&config).is_ok());
    }
}
