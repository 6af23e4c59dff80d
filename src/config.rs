use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DbConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub tariff: TariffConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
        }
    }
}

fn default_api_host() -> String {
    "0.0.0.0".into()
}

fn default_api_port() -> u16 {
    3001
}

/// Flat energy tariff applied to apparent energy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffConfig {
    #[serde(default)]
    pub rate_per_kvah: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            rate_per_kvah: 0.0,
            currency: default_currency(),
        }
    }
}

fn default_currency() -> String {
    "INR".into()
}

/// Thresholds behind the alert feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Facility kVA above which a minute is reported as a peak.
    #[serde(default = "default_peak_demand_threshold")]
    pub peak_demand_threshold_kva: f64,
    /// A generator drawing more than this is running.
    #[serde(default)]
    pub generator_running_kw: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            peak_demand_threshold_kva: default_peak_demand_threshold(),
            generator_running_kw: 0.0,
        }
    }
}

fn default_peak_demand_threshold() -> f64 {
    596.0
}

impl Config {
    /// Load YAML from disk, substitute $(VAR)/${VAR} with env vars, then parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let raw = std::fs::read_to_string(path)?;
        let mut cfg = Self::from_yaml(&raw)?;

        // DATABASE_URL wins over whatever the file says
        if let Ok(url) = std::env::var("DATABASE_URL") {
            cfg.database.url = url;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, anyhow::Error> {
        let expanded = expand_env_placeholders(raw)?;
        Ok(serde_yaml::from_str(&expanded)?)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.url.trim().is_empty() {
            return Err(AppError::Config("database.url is empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(AppError::Config(
                "database.max_connections must be at least 1".into(),
            ));
        }
        if !self.tariff.rate_per_kvah.is_finite() || self.tariff.rate_per_kvah < 0.0 {
            return Err(AppError::Config(format!(
                "tariff.rate_per_kvah must be a non-negative number, got {}",
                self.tariff.rate_per_kvah
            )));
        }
        for (name, value) in [
            (
                "alerts.peak_demand_threshold_kva",
                self.alerts.peak_demand_threshold_kva,
            ),
            ("alerts.generator_running_kw", self.alerts.generator_running_kw),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Expand $(VAR) and ${VAR} placeholders using environment variables.
/// `$$` is a literal `$`.
fn expand_env_placeholders(input: &str) -> Result<String, anyhow::Error> {
    use anyhow::Context;

    let mut out = String::with_capacity(input.len());
    let mut it = input.chars().peekable();

    while let Some(c) = it.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let close = match it.peek().copied() {
            Some('$') => {
                it.next();
                out.push('$');
                continue;
            }
            Some('(') => ')',
            Some('{') => '}',
            _ => {
                out.push('$');
                continue;
            }
        };
        it.next();
        let var = read_until(&mut it, close)
            .with_context(|| format!("unterminated env placeholder: missing '{}'", close))?;
        let val = std::env::var(&var)
            .with_context(|| format!("missing environment variable: {}", var))?;
        out.push_str(&val);
    }

    Ok(out)
}

fn read_until<I>(it: &mut std::iter::Peekable<I>, end: char) -> Option<String>
where
    I: Iterator<Item = char>,
{
    let mut buf = String::new();
    for ch in it.by_ref() {
        if ch == end {
            return Some(buf);
        }
        buf.push(ch);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply() {
        let cfg = Config::from_yaml("database:\n  url: postgres://localhost/energy\n").unwrap();
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.api.host, "0.0.0.0");
        assert_eq!(cfg.api.port, 3001);
        assert_eq!(cfg.tariff, TariffConfig::default());
        assert_eq!(cfg.alerts.peak_demand_threshold_kva, 596.0);
        assert_eq!(cfg.alerts.generator_running_kw, 0.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_env_placeholders_expand() {
        std::env::set_var("ENERGY_TEST_DB_PASSWORD", "s3cret");
        let out = expand_env_placeholders("postgres://u:${ENERGY_TEST_DB_PASSWORD}@h/$(ENERGY_TEST_DB_PASSWORD)")
            .unwrap();
        assert_eq!(out, "postgres://u:s3cret@h/s3cret");
    }

    #[test]
    fn test_dollar_escapes_and_bare_dollars() {
        assert_eq!(expand_env_placeholders("cost $$5 and $x").unwrap(), "cost $5 and $x");
    }

    #[test]
    fn test_unterminated_placeholder_fails() {
        assert!(expand_env_placeholders("${OPEN").is_err());
    }

    #[test]
    fn test_missing_variable_fails() {
        assert!(expand_env_placeholders("${ENERGY_TEST_SURELY_UNSET_VAR}").is_err());
    }

    #[test]
    fn test_negative_tariff_is_rejected() {
        let cfg = Config::from_yaml(
            "database:\n  url: postgres://localhost/energy\ntariff:\n  rate_per_kvah: -1.0\n",
        )
        .unwrap();
        assert!(matches!(cfg.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_alert_thresholds_are_read_and_checked() {
        let cfg = Config::from_yaml(
            "database:\n  url: postgres://localhost/energy\nalerts:\n  peak_demand_threshold_kva: 450\n",
        )
        .unwrap();
        assert_eq!(cfg.alerts.peak_demand_threshold_kva, 450.0);
        assert!(cfg.validate().is_ok());

        let cfg = Config::from_yaml(
            "database:\n  url: postgres://localhost/energy\nalerts:\n  generator_running_kw: -2\n",
        )
        .unwrap();
        assert!(matches!(cfg.validate(), Err(AppError::Config(_))));
    }
}
