//! Configuration for engines and subscription plans
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/jodloo/config.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Sections missing from an override file keep their default values.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::installments::{InstallmentConfig, InstallmentEngine};
use crate::models::BudgetCategory;
use crate::subscription::SubscriptionPlan;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/jodloo.toml");

#[derive(Debug, Clone)]
pub struct Config {
    pub installments: InstallmentConfig,
    /// Plans keyed by plan key (`1_month`, `3_months`, ...)
    pub plans: BTreeMap<String, SubscriptionPlan>,
    /// Offered to users who have no active budget yet
    pub sample_categories: Vec<BudgetCategory>,
}

impl Default for Config {
    fn default() -> Self {
        parse_config(DEFAULT_CONFIG).unwrap_or_else(|_| Self {
            installments: InstallmentConfig::default(),
            plans: BTreeMap::new(),
            sample_categories: Vec::new(),
        })
    }
}

impl Config {
    /// Load from `path` if given, else from the default override location,
    /// else the embedded defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let override_path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        p.display()
                    )));
                }
                Some(p.to_path_buf())
            }
            None => default_config_path().filter(|p| p.exists()),
        };

        match override_path {
            Some(p) => {
                debug!("Loading config from {}", p.display());
                let content = fs::read_to_string(&p).map_err(|e| {
                    Error::Config(format!("Failed to read config {}: {}", p.display(), e))
                })?;
                parse_config(&content)
            }
            None => parse_config(DEFAULT_CONFIG),
        }
    }

    pub fn engine(&self) -> InstallmentEngine {
        InstallmentEngine::new(self.installments.clone())
    }

    pub fn plan(&self, key: &str) -> Result<&SubscriptionPlan> {
        self.plans.get(key).ok_or_else(|| {
            let known: Vec<_> = self.plans.keys().map(|k| k.as_str()).collect();
            Error::NotFound(format!(
                "Subscription plan {} (available: {})",
                key,
                known.join(", ")
            ))
        })
    }
}

/// Default override location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("jodloo").join("config.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    installments: Option<InstallmentConfig>,
    plans: Option<BTreeMap<String, SubscriptionPlan>>,
    sample_categories: Option<Vec<BudgetCategory>>,
}

fn parse_config(content: &str) -> Result<Config> {
    let raw: RawConfig = toml::from_str(content)?;

    let installments = raw.installments.unwrap_or_default();
    if !installments.tolerance.is_finite() || installments.tolerance < 0.0 {
        return Err(Error::Config(format!(
            "installments.tolerance must be a non-negative number, got {}",
            installments.tolerance
        )));
    }

    let mut plans = match raw.plans {
        Some(plans) => plans,
        None => default_section(|raw| raw.plans)?,
    };
    for (key, plan) in plans.iter_mut() {
        if plan.interval_count == 0 {
            return Err(Error::Config(format!(
                "plans.{}.interval_count must be at least 1",
                key
            )));
        }
        plan.key = key.clone();
    }

    let sample_categories = match raw.sample_categories {
        Some(categories) => categories,
        None => default_section(|raw| raw.sample_categories)?,
    };

    Ok(Config {
        installments,
        plans,
        sample_categories,
    })
}

/// Pull one section out of the embedded defaults
fn default_section<T: Default>(section: impl FnOnce(RawConfig) -> Option<T>) -> Result<T> {
    let raw: RawConfig = toml::from_str(DEFAULT_CONFIG)?;
    Ok(section(raw).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installments::{CountingConvention, YearBasis};
    use std::io::Write;

    #[test]
    fn test_parse_default_config() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.installments.tolerance, 100.0);
        assert_eq!(config.installments.counting, CountingConvention::Periods);
        assert_eq!(config.installments.year_basis, YearBasis::Anniversary);
        assert_eq!(config.plans.len(), 3);
        assert_eq!(config.sample_categories.len(), 8);
    }

    #[test]
    fn test_plan_keys_filled() {
        let config = Config::default();
        let plan = config.plan("3_months").unwrap();
        assert_eq!(plan.key, "3_months");
        assert_eq!(plan.interval_count, 3);
        assert_eq!(plan.monthly_price, 93.0);
        assert!(config.plan("12_months").is_err());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = parse_config(
            r#"
            [installments]
            tolerance = 0.01
            counting = "elapsed_days"
            "#,
        )
        .unwrap();

        assert_eq!(config.installments.tolerance, 0.01);
        assert_eq!(config.installments.counting, CountingConvention::ElapsedDays);
        assert_eq!(config.installments.year_basis, YearBasis::Anniversary);
        assert_eq!(config.plans.len(), 3);
        assert!(!config.sample_categories.is_empty());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(parse_config("[installments]\ntolerance = -1.0\n").is_err());
        assert!(parse_config("[installments]\ncounting = \"sometimes\"\n").is_err());
        assert!(parse_config(
            "[plans.free]\nduration = \"never\"\nmonthly_price = 0.0\ninterval_count = 0\ncurrency = \"INR\"\n"
        )
        .is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[installments]\nyear_basis = \"actual_365\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.installments.year_basis, YearBasis::Actual365);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Some(Path::new("/nonexistent/jodloo.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
