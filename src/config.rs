//! Query engine configuration.
//!
//! Precedence: environment (`DOCQUERY_*`) > first config file found > defaults.
//! Config files are looked up at an explicit path, then `$DOCQUERY_CONFIG`, then `./docquery.toml`.

use crate::errors::DbError;
use crate::query::{FilterLimits, MAX_IN_SET, MAX_LIMIT, MAX_PATH_DEPTH, MAX_PROJECTION_FIELDS, MAX_SORT_FIELDS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "DOCQUERY_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "docquery.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Page size when the request names none.
    pub default_limit: u64,
    pub max_limit: u64,
    pub max_sort_fields: usize,
    pub max_projection_fields: usize,
    pub max_in_set: usize,
    pub max_path_depth: usize,
    /// Queries slower than this are logged at warn.
    pub slow_query_ms: u64,
    pub default_locale: String,
    /// Extra phrase catalog merged over the built-in one.
    pub locale_file: Option<PathBuf>,
    pub log_config: Option<PathBuf>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: 100,
            max_limit: MAX_LIMIT,
            max_sort_fields: MAX_SORT_FIELDS,
            max_projection_fields: MAX_PROJECTION_FIELDS,
            max_in_set: MAX_IN_SET,
            max_path_depth: MAX_PATH_DEPTH,
            slow_query_ms: 500,
            default_locale: "en".to_string(),
            locale_file: None,
            log_config: None,
        }
    }
}

impl QueryConfig {
    #[must_use]
    pub fn filter_limits(&self) -> FilterLimits {
        FilterLimits { max_in_set: self.max_in_set, max_path_depth: self.max_path_depth }
    }

    /// # Errors
    /// Returns an error if the file cannot be read or is not valid TOML for this struct.
    pub fn from_file(path: &Path) -> Result<Self, DbError> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| DbError::Config(format!("{}: {e}", path.display())))?;
        Ok(toml::from_str::<Self>(&s)?)
    }

    /// Applies `DOCQUERY_*` overrides read through `lookup`.
    ///
    /// # Errors
    /// Returns `Config` when a numeric override does not parse.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), DbError>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn num<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, DbError> {
            raw.trim().parse::<T>().map_err(|_| DbError::Config(format!("{key}={raw} is not a number")))
        }
        if let Some(v) = lookup("DOCQUERY_DEFAULT_LIMIT") {
            self.default_limit = num("DOCQUERY_DEFAULT_LIMIT", &v)?;
        }
        if let Some(v) = lookup("DOCQUERY_MAX_LIMIT") {
            self.max_limit = num("DOCQUERY_MAX_LIMIT", &v)?;
        }
        if let Some(v) = lookup("DOCQUERY_MAX_SORT_FIELDS") {
            self.max_sort_fields = num("DOCQUERY_MAX_SORT_FIELDS", &v)?;
        }
        if let Some(v) = lookup("DOCQUERY_MAX_PROJECTION_FIELDS") {
            self.max_projection_fields = num("DOCQUERY_MAX_PROJECTION_FIELDS", &v)?;
        }
        if let Some(v) = lookup("DOCQUERY_MAX_IN_SET") {
            self.max_in_set = num("DOCQUERY_MAX_IN_SET", &v)?;
        }
        if let Some(v) = lookup("DOCQUERY_MAX_PATH_DEPTH") {
            self.max_path_depth = num("DOCQUERY_MAX_PATH_DEPTH", &v)?;
        }
        if let Some(v) = lookup("DOCQUERY_SLOW_QUERY_MS") {
            self.slow_query_ms = num("DOCQUERY_SLOW_QUERY_MS", &v)?;
        }
        if let Some(v) = lookup("DOCQUERY_DEFAULT_LOCALE") {
            self.default_locale = v;
        }
        if let Some(v) = lookup("DOCQUERY_LOCALE_FILE") {
            self.locale_file = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("DOCQUERY_LOG_CONFIG") {
            self.log_config = Some(PathBuf::from(v));
        }
        Ok(())
    }

    /// The field limits may be lowered but not raised past what the evaluator enforces
    /// (`MAX_SORT_FIELDS`, `MAX_PROJECTION_FIELDS`, `MAX_PATH_DEPTH`).
    ///
    /// # Errors
    /// Returns `Config` for limits that would make pagination meaningless or that exceed the
    /// evaluator's ceilings.
    pub fn validate(&self) -> Result<(), DbError> {
        if self.default_limit == 0 || self.max_limit == 0 {
            return Err(DbError::Config("limits must be positive".into()));
        }
        if self.default_limit > self.max_limit {
            return Err(DbError::Config(format!(
                "default_limit {} exceeds max_limit {}",
                self.default_limit, self.max_limit
            )));
        }
        if self.max_sort_fields == 0 || self.max_projection_fields == 0 || self.max_path_depth == 0 {
            return Err(DbError::Config("field limits must be positive".into()));
        }
        for (name, value, ceiling) in [
            ("max_sort_fields", self.max_sort_fields, MAX_SORT_FIELDS),
            ("max_projection_fields", self.max_projection_fields, MAX_PROJECTION_FIELDS),
            ("max_path_depth", self.max_path_depth, MAX_PATH_DEPTH),
        ] {
            if value > ceiling {
                return Err(DbError::Config(format!("{name} {value} exceeds the supported maximum {ceiling}")));
            }
        }
        Ok(())
    }
}

/// Candidate config files in lookup order.
#[must_use]
pub fn find_config_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = vec![];
    if let Some(p) = explicit {
        paths.push(p.to_path_buf());
    }
    if let Ok(p) = std::env::var(CONFIG_ENV) {
        paths.push(PathBuf::from(p));
    }
    if let Ok(cur) = std::env::current_dir() {
        paths.push(cur.join(DEFAULT_CONFIG_FILE));
    }
    paths
}

/// Loads the effective configuration.
///
/// # Errors
/// Returns an error when the chosen file is unreadable or invalid, an environment override does
/// not parse, or the result fails validation.
pub fn load_config(explicit: Option<&Path>) -> Result<QueryConfig, DbError> {
    let mut cfg = match find_config_paths(explicit).into_iter().find(|p| p.exists()) {
        Some(p) => {
            log::info!("loading query config from {}", p.display());
            QueryConfig::from_file(&p)?
        }
        None => QueryConfig::default(),
    };
    cfg.apply_env(|k| std::env::var(k).ok())?;
    cfg.validate()?;
    Ok(cfg)
}
