// ⚙️ Configuration - JSON file with defaults, FACTORYLINK_* overrides

use crate::auth::{AuthPolicy, AuthStore};
use crate::export::{ExportOptions, DEFAULT_LIST_DELIMITER};
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::seed::seed_deleted_accounts;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG: &str = "FACTORYLINK_CONFIG";
pub const ENV_DATA: &str = "FACTORYLINK_DATA";
pub const ENV_ITEMS_PER_PAGE: &str = "FACTORYLINK_ITEMS_PER_PAGE";
pub const ENV_LOG: &str = "FACTORYLINK_LOG";

/// Longest lockout window accepted from config (one week)
pub const MAX_LOCKOUT_WINDOW_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub items_per_page: usize,
    pub page_size_options: Vec<usize>,
    pub lockout_threshold: u32,
    pub lockout_window_minutes: i64,

    /// Where browse-mode exports are written
    pub export_dir: PathBuf,
    pub list_delimiter: String,

    /// Catalogue file (CSV or JSON); seed data when absent
    pub data_file: Option<PathBuf>,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            page_size_options: vec![10, 25, 50, 100],
            lockout_threshold: 5,
            lockout_window_minutes: 15,
            export_dir: PathBuf::from("."),
            list_delimiter: DEFAULT_LIST_DELIMITER.to_string(),
            data_file: None,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load config from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: AppConfig = serde_json::from_str(&content).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// File (explicit path, else `FACTORYLINK_CONFIG`, else defaults) plus env overrides
    pub fn from_env_and_file(path: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var_os(ENV_CONFIG).map(PathBuf::from);
        let mut config = match path.map(Path::to_path_buf).or(from_env) {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `FACTORYLINK_*` overrides from `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(data) = lookup(ENV_DATA) {
            self.data_file = Some(PathBuf::from(data));
        }
        if let Some(per_page) = lookup(ENV_ITEMS_PER_PAGE) {
            self.items_per_page = per_page
                .trim()
                .parse()
                .with_context(|| format!("{} must be a positive integer, got {:?}", ENV_ITEMS_PER_PAGE, per_page))?;
        }
        if let Some(level) = lookup(ENV_LOG) {
            self.log_level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.items_per_page == 0 {
            bail!("items_per_page must be greater than zero");
        }
        if self.page_size_options.contains(&0) {
            bail!("page_size_options must not contain zero");
        }
        if self.lockout_threshold == 0 {
            bail!("lockout_threshold must be greater than zero");
        }
        if !(1..=MAX_LOCKOUT_WINDOW_MINUTES).contains(&self.lockout_window_minutes) {
            bail!(
                "lockout_window_minutes must be between 1 and {}, got {}",
                MAX_LOCKOUT_WINDOW_MINUTES,
                self.lockout_window_minutes
            );
        }
        Ok(())
    }

    pub fn auth_policy(&self) -> AuthPolicy {
        AuthPolicy {
            lockout_threshold: self.lockout_threshold,
            lockout_window: chrono::Duration::minutes(self.lockout_window_minutes),
        }
    }

    /// Auth store with this config's lockout policy and the seeded deleted accounts
    pub fn auth_store(&self) -> AuthStore {
        AuthStore::new(self.auth_policy(), seed_deleted_accounts())
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            list_delimiter: self.list_delimiter.clone(),
        }
    }

    /// Next page size after the current one, wrapping around
    pub fn next_page_size(&self, current: usize) -> usize {
        match self.page_size_options.iter().position(|n| *n == current) {
            Some(pos) => self.page_size_options[(pos + 1) % self.page_size_options.len()],
            None => self.page_size_options.first().copied().unwrap_or(self.items_per_page),
        }
    }
}
