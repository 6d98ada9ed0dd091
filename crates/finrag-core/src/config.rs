//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env
//! vars. Credentials (LLM and hosted-embedding API keys) flow through the
//! same mechanism, with plain env-var fallbacks for the common cases.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::env;
use std::path::{Path, PathBuf};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_"));

        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Like `get`, falling back to `default` when the key is absent.
    /// A key that is present but does not parse as `T` is an error, not a
    /// fallback; config typos should be visible, not masked.
    pub fn get_or<T>(&self, key: &str, default: T) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        match self.figment.extract_inner(key) {
            Ok(value) => Ok(value),
            Err(e) if matches!(e.kind, figment::error::Kind::MissingField(_)) => Ok(default),
            Err(e) => Err(anyhow::anyhow!("Failed to get '{}': {}", key, e)),
        }
    }

    /// Resolve an API key: a config key first, then a process env var.
    /// Returns an empty string when neither is set; callers decide whether
    /// that is fatal.
    pub fn api_key(&self, config_key: &str, env_var: &str) -> String {
        if let Ok(key) = self.get::<String>(config_key) {
            if !key.is_empty() {
                return key;
            }
        }
        env::var(env_var).unwrap_or_default()
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

/// Resolve a possibly relative path against a given base directory after
/// expansion. If `p` is absolute, it's returned as-is.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_defaults_only_when_key_is_absent() {
        let figment = Figment::new().merge(Toml::string("[retrieval]\ntop_k = 10"));
        let config = Config { figment };
        assert_eq!(config.get_or("retrieval.top_k", 75usize).expect("present"), 10);
        assert_eq!(config.get_or("retrieval.missing", 75usize).expect("absent"), 75);
    }

    #[test]
    fn get_or_reports_mistyped_values() {
        let figment = Figment::new().merge(Toml::string("[retrieval]\ntop_k = \"many\""));
        let config = Config { figment };
        let err = config.get_or("retrieval.top_k", 75usize).expect_err("mistyped");
        assert!(err.to_string().contains("retrieval.top_k"));
    }

    #[test]
    fn expand_path_passes_plain_paths_through() {
        assert_eq!(expand_path("data/index"), PathBuf::from("data/index"));
    }

    #[test]
    fn resolve_with_base_keeps_absolute_paths() {
        let base = Path::new("/srv/finrag");
        assert_eq!(resolve_with_base(base, "/var/index"), PathBuf::from("/var/index"));
        assert_eq!(resolve_with_base(base, "index"), PathBuf::from("/srv/finrag/index"));
    }
}
