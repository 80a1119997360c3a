//! Layered settings: defaults, TOML file, `TAGRELAY_` environment, flags

use std::collections::BTreeMap;
use std::time::Duration;

use eyre::{WrapErr, ensure};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tagrelay_pcsc::{ConnectOptions, Disposition, Protocol, ShareMode};
use tagrelay_session::{DeliveryTarget, HttpTarget, LogTarget, SessionConfig};
use url::Url;

use crate::cli::Cli;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) timing: TimingSettings,
    pub(crate) reader: ReaderSettings,
    pub(crate) target: TargetSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct TimingSettings {
    pub(crate) status_timeout_ms: u64,
    pub(crate) health_interval_ms: u64,
    pub(crate) reboot_delay_ms: u64,
    pub(crate) enumeration_backoff_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            status_timeout_ms: 1000,
            health_interval_ms: 5000,
            reboot_delay_ms: 3000,
            enumeration_backoff_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ReaderSettings {
    pub(crate) share_mode: ShareMode,
    pub(crate) protocol: Protocol,
    pub(crate) disposition: Disposition,
    /// Logged with every read; the read command does not address pages yet
    pub(crate) page: u8,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            share_mode: ShareMode::default(),
            protocol: Protocol::default(),
            disposition: Disposition::default(),
            page: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct TargetSettings {
    pub(crate) url: Option<Url>,
    pub(crate) headers: BTreeMap<String, String>,
    pub(crate) timeout_ms: u64,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            url: None,
            headers: BTreeMap::new(),
            timeout_ms: 10_000,
        }
    }
}

impl Settings {
    /// Load settings, later sources overriding earlier ones
    pub(crate) fn load(cli: &Cli) -> eyre::Result<Self> {
        let figment = Self::figment(cli);
        let settings: Self = figment
            .extract()
            .wrap_err_with(|| format!("Invalid configuration (file: {})", cli.config.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn figment(cli: &Cli) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(&cli.config))
            .merge(Env::prefixed("TAGRELAY_").split("__"));

        if let Some(url) = &cli.target_url {
            figment = figment.merge(Serialized::default("target.url", url.as_str()));
        }
        if !cli.headers.is_empty() {
            let headers: BTreeMap<_, _> = cli.headers.iter().cloned().collect();
            figment = figment.merge(Serialized::default("target.headers", headers));
        }
        figment
    }

    fn validate(&self) -> eyre::Result<()> {
        let timing = &self.timing;
        ensure!(timing.status_timeout_ms > 0, "timing.status_timeout_ms must be positive");
        ensure!(timing.health_interval_ms > 0, "timing.health_interval_ms must be positive");
        ensure!(self.target.timeout_ms > 0, "target.timeout_ms must be positive");
        if let Some(url) = &self.target.url {
            ensure!(
                matches!(url.scheme(), "http" | "https"),
                "target.url must be an http or https URL, got {url}"
            );
        }
        Ok(())
    }

    pub(crate) fn session_config(&self) -> SessionConfig {
        SessionConfig {
            status_timeout: Duration::from_millis(self.timing.status_timeout_ms),
            health_interval: Duration::from_millis(self.timing.health_interval_ms),
            reboot_delay: Duration::from_millis(self.timing.reboot_delay_ms),
            enumeration_backoff: Duration::from_millis(self.timing.enumeration_backoff_ms),
            connect: ConnectOptions::new()
                .with_share_mode(self.reader.share_mode)
                .with_protocol(self.reader.protocol)
                .with_disposition(self.reader.disposition),
            page: self.reader.page,
        }
    }

    /// HTTP target if a URL is configured, otherwise a log target
    pub(crate) fn target(&self) -> eyre::Result<Box<dyn DeliveryTarget>> {
        Ok(match &self.target.url {
            Some(url) => Box::new(
                HttpTarget::new(
                    url.clone(),
                    &self.target.headers,
                    Duration::from_millis(self.target.timeout_ms),
                )
                .wrap_err("Invalid delivery target")?,
            ),
            None => Box::new(LogTarget),
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use figment::Jail;

    use super::*;

    #[test]
    fn test_defaults() {
        Jail::expect_with(|_jail| {
            let settings = Settings::load(&Cli::parse_from(["tagrelay"])).unwrap();
            assert_eq!(settings, Settings::default());

            let config = settings.session_config();
            assert_eq!(config, SessionConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "tagrelay.toml",
                r#"
                [timing]
                status_timeout_ms = 250

                [reader]
                protocol = "any"
                disposition = "reset"
                page = 6

                [target]
                url = "http://localhost:8080/file"
                timeout_ms = 2500
                headers = { "X-Source" = "file" }
                "#,
            )?;
            jail.set_env("TAGRELAY_TIMING__HEALTH_INTERVAL_MS", "750");
            jail.set_env("TAGRELAY_TARGET__URL", "http://localhost:8080/env");

            let cli = Cli::parse_from(["tagrelay", "--header", "X-Cli: yes"]);
            let settings = Settings::load(&cli).unwrap();

            assert_eq!(settings.timing.status_timeout_ms, 250);
            assert_eq!(settings.timing.health_interval_ms, 750);
            assert_eq!(settings.timing.reboot_delay_ms, 3000);
            assert_eq!(settings.reader.protocol, Protocol::Any);
            assert_eq!(settings.reader.disposition, Disposition::Reset);
            assert_eq!(settings.reader.page, 6);
            assert_eq!(settings.target.timeout_ms, 2500);
            assert_eq!(
                settings.target.url.as_ref().map(Url::as_str),
                Some("http://localhost:8080/env")
            );
            assert_eq!(settings.target.headers.len(), 2);
            assert_eq!(settings.target.headers["X-Cli"], "yes");
            Ok(())
        });
    }

    #[test]
    fn test_cli_url_wins() {
        Jail::expect_with(|jail| {
            jail.set_env("TAGRELAY_TARGET__URL", "http://localhost:8080/env");
            let cli = Cli::parse_from(["tagrelay", "--target-url", "https://relay.example/tags"]);
            let settings = Settings::load(&cli).unwrap();
            assert_eq!(
                settings.target.url.as_ref().map(Url::as_str),
                Some("https://relay.example/tags")
            );
            Ok(())
        });
    }

    #[test]
    fn test_rejects_zero_timeout() {
        Jail::expect_with(|jail| {
            jail.set_env("TAGRELAY_TIMING__STATUS_TIMEOUT_MS", "0");
            assert!(Settings::load(&Cli::parse_from(["tagrelay"])).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_rejects_zero_target_timeout() {
        Jail::expect_with(|jail| {
            jail.set_env("TAGRELAY_TARGET__TIMEOUT_MS", "0");
            assert!(Settings::load(&Cli::parse_from(["tagrelay"])).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_rejects_non_http_target() {
        Jail::expect_with(|jail| {
            jail.set_env("TAGRELAY_TARGET__URL", "ftp://relay.example/tags");
            assert!(Settings::load(&Cli::parse_from(["tagrelay"])).is_err());
            Ok(())
        });
    }
}
