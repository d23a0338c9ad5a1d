use std::path::Path;

use serde::{Deserialize, Serialize};

/// Runtime configuration, loaded from the user config dir and overridden by
/// a repo-local `.diffpin.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DpConfig {
    #[serde(default)]
    pub wait: WaitConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

/// [wait] section: readiness polling for the render target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitConfig {
    /// Poll interval while waiting for the target to become ready
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
    /// Overall readiness deadline; after this the run proceeds anyway
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// [watch] section: input-file watching in `--watch` mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_poll_ms() -> u64 {
    50
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_ms: default_poll_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl DpConfig {
    /// Load config, preferring the repo-local file over the global one.
    /// Missing files fall back to defaults; a file that exists but fails to
    /// parse is skipped with a warning.
    pub fn load(work_dir: &Path) -> Self {
        let global = dirs::config_dir().map(|d| d.join("diffpin/config.toml"));
        let local = work_dir.join(".diffpin.toml");

        for path in [Some(local), global].into_iter().flatten() {
            if let Ok(content) = std::fs::read_to_string(&path) {
                match toml::from_str::<DpConfig>(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        log::warn!("ignoring malformed config {}: {e}", path.display());
                    }
                }
            }
        }

        DpConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = DpConfig::load(dir.path());
        assert_eq!(config.wait.poll_ms, 50);
        assert_eq!(config.wait.timeout_ms, 2000);
        assert_eq!(config.watch.debounce_ms, 300);
    }

    #[test]
    fn local_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join(".diffpin.toml")).unwrap();
        write!(f, "[wait]\ntimeout_ms = 5000\n").unwrap();

        let config = DpConfig::load(dir.path());
        assert_eq!(config.wait.timeout_ms, 5000);
        // Unspecified fields keep their serde defaults
        assert_eq!(config.wait.poll_ms, 50);
        assert_eq!(config.watch.debounce_ms, 300);
    }

    #[test]
    fn malformed_local_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join(".diffpin.toml")).unwrap();
        write!(f, "wait = not toml").unwrap();

        let config = DpConfig::load(dir.path());
        assert_eq!(config.wait.poll_ms, 50);
    }
}
