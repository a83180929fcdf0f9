//! Configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults, `config.toml`, `config.<env>.toml`
//! and `APP_*` env vars (`__` separates nested keys, e.g.
//! `APP_SEARCH__LANGUAGE=english`).

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    /// Load from the current working directory.
    pub fn load() -> anyhow::Result<Self> {
        let base_dir = env::current_dir()?;
        Self::load_from(&base_dir)
    }

    pub fn load_from(base_dir: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(base_dir, &env_name)
    }

    pub fn load_for_env(base_dir: &Path, env_name: &str) -> anyhow::Result<Self> {
        tracing::debug!(env = env_name, base_dir = %base_dir.display(), "loading configuration");
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(base_dir.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(base_dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base_dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base_dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, base_dir: base_dir.to_path_buf() };
        // Invalid settings are rejected here, not on first use.
        config.settings()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Directory relative paths in the settings are resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

}

/// Analysis language for tokenization, stop words and stemming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    French,
    English,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathsConfig,
    pub search: SearchConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Public/static asset root; the index artifact lives under it.
    pub public_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self { public_dir: "public".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub index_file: String,
    pub language: Language,
    /// Re-run the caller's query once after a self-heal rebuild instead of returning empty.
    pub retry_after_rebuild: bool,
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_file: "search-index.json".to_string(),
            language: Language::French,
            retry_after_rebuild: false,
            default_limit: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "data/lexcab.db".to_string() }
    }
}

impl Settings {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.search.index_file.trim().is_empty() {
            return Err(Error::InvalidConfig("search.index_file must not be empty".to_string()));
        }
        if Path::new(&self.search.index_file).file_name().is_none() {
            return Err(Error::InvalidConfig(format!(
                "search.index_file '{}' is not a file name",
                self.search.index_file
            )));
        }
        if self.search.default_limit == 0 {
            return Err(Error::InvalidConfig("search.default_limit must be at least 1".to_string()));
        }
        if self.database.path.trim().is_empty() {
            return Err(Error::InvalidConfig("database.path must not be empty".to_string()));
        }
        Ok(())
    }

    /// `<public_dir>/<index_file>`, resolved against `base`.
    pub fn index_path(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.paths.public_dir).join(&self.search.index_file)
    }

    pub fn database_path(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.database.path)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
