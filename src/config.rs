use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::source::DEFAULT_ORIGIN;

/// Username shipped in example configs; treated as "not configured".
pub const PLACEHOLDER_USERNAME: &str = "YOUR_USERNAME";

pub const DEFAULT_CONFIG_FILE: &str = "onstream.toml";
/// Config file name used by earlier releases of the overlay server.
pub const LEGACY_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    #[serde(alias = "malUsername")]
    pub username: String,
    pub port: u16,
    #[serde(alias = "scrollSpeed")]
    pub scroll_speed: u32,
    pub debug: bool,
    /// 0 disables the branch cache; every request re-scrapes.
    #[serde(alias = "cacheTtlSecs")]
    pub cache_ttl_secs: i64,
    /// Per-request deadline; 0 means none.
    #[serde(alias = "requestTimeoutMs")]
    pub request_timeout_ms: u64,
    #[serde(alias = "publicDir")]
    pub public_dir: PathBuf,
    #[serde(alias = "baseUrl")]
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: PLACEHOLDER_USERNAME.to_string(),
            port: 3000,
            scroll_speed: 60,
            debug: false,
            cache_ttl_secs: 0,
            request_timeout_ms: 15_000,
            public_dir: PathBuf::from("public"),
            base_url: DEFAULT_ORIGIN.to_string(),
        }
    }
}

impl Config {
    /// Pick the config file: an explicit path always wins, then
    /// `onstream.toml` in `dir`, then a legacy `config.json` there.
    pub fn locate(explicit: Option<&Path>, dir: &Path) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        let primary = dir.join(DEFAULT_CONFIG_FILE);
        let legacy = dir.join(LEGACY_CONFIG_FILE);
        if !primary.exists() && legacy.exists() { legacy } else { primary }
    }

    /// Read `path` (TOML, or JSON when the extension says so) and apply env
    /// overrides. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Self> {
        let cfg = if path.exists() {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
            Self::parse(path, &text)?
        } else {
            Self::default()
        };
        Ok(cfg.with_env_overrides(|k| std::env::var(k).ok()))
    }

    fn parse(path: &Path, text: &str) -> Result<Self> {
        let is_json = path.extension().and_then(|s| s.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(text).with_context(|| format!("parsing JSON config {}", path.display()))
        } else {
            toml::from_str(text).with_context(|| format!("parsing TOML config {}", path.display()))
        }
    }

    pub fn with_env_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = var("ONSTREAM_USERNAME").filter(|v| !v.trim().is_empty()) { self.username = v.trim().to_string(); }
        if let Some(v) = var("ONSTREAM_PORT").and_then(|s| s.parse().ok()) { self.port = v; }
        if let Some(v) = var("ONSTREAM_SCROLL_SPEED").and_then(|s| s.parse().ok()) { self.scroll_speed = v; }
        if let Some(v) = var("ONSTREAM_DEBUG") { self.debug = matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"); }
        if let Some(v) = var("ONSTREAM_CACHE_TTL_SECS").and_then(|s| s.parse().ok()) { self.cache_ttl_secs = v; }
        self
    }

    /// The configured username, unless it is blank or the placeholder.
    pub fn identity(&self) -> Option<&str> {
        let u = self.username.trim();
        (!u.is_empty() && u != PLACEHOLDER_USERNAME).then_some(u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_have_no_identity() {
        let c = Config::default();
        assert_eq!(c.identity(), None);
        assert_eq!(c.scroll_speed, 60);
        assert_eq!(c.port, 3000);
        assert_eq!(c.cache_ttl_secs, 0);
    }

    #[test]
    fn loads_toml() {
        let mut f = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(f, "username = \"alice\"\nscroll_speed = 90\ndebug = true").unwrap();
        let c = Config::parse(f.path(), &std::fs::read_to_string(f.path()).unwrap()).unwrap();
        assert_eq!(c.identity(), Some("alice"));
        assert_eq!(c.scroll_speed, 90);
        assert!(c.debug);
        assert_eq!(c.port, 3000);
    }

    #[test]
    fn loads_legacy_json() {
        let mut f = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(f, r#"{{"malUsername": "bob", "port": 4000, "scrollSpeed": 30}}"#).unwrap();
        let c = Config::load(f.path()).unwrap();
        assert_eq!(c.username, "bob");
        assert_eq!(c.port, 4000);
        assert_eq!(c.scroll_speed, 30);
    }

    #[test]
    fn locate_falls_back_to_legacy_json() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::locate(None, dir.path()), dir.path().join("onstream.toml"));

        std::fs::write(dir.path().join("config.json"), r#"{"malUsername": "dave"}"#).unwrap();
        let found = Config::locate(None, dir.path());
        assert_eq!(found, dir.path().join("config.json"));
        assert_eq!(Config::load(&found).unwrap().identity(), Some("dave"));

        std::fs::write(dir.path().join("onstream.toml"), "username = \"erin\"").unwrap();
        assert_eq!(Config::locate(None, dir.path()), dir.path().join("onstream.toml"));

        let explicit = dir.path().join("other.toml");
        assert_eq!(Config::locate(Some(&explicit), dir.path()), explicit);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let c = Config::parse(&dir.path().join("x.toml"), "").unwrap();
        assert_eq!(c.username, PLACEHOLDER_USERNAME);
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [("ONSTREAM_USERNAME", "carol"), ("ONSTREAM_CACHE_TTL_SECS", "30"), ("ONSTREAM_DEBUG", "1"), ("ONSTREAM_PORT", "nope")].into();
        let c = Config::default().with_env_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(c.identity(), Some("carol"));
        assert_eq!(c.cache_ttl_secs, 30);
        assert!(c.debug);
        assert_eq!(c.port, 3000);
    }

    #[test]
    fn placeholder_is_not_an_identity() {
        let c = Config { username: "  YOUR_USERNAME ".into(), ..Config::default() };
        assert_eq!(c.identity(), None);
    }
}
