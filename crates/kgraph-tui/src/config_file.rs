use std::path::{Path, PathBuf};
use std::time::Duration;

use kgraph_core::Latency;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_TICK_RATE_MS: u64 = 100;
const DEFAULT_LOG_LEVEL: &str = "info";

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub display: Option<DisplayConfig>,
    pub service: Option<ServiceConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub theme: Option<String>,
    pub tick_rate_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Multiplier on the simulated backing-service latency.
    pub latency_scale: Option<f64>,
    pub seed_samples: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub file: Option<String>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Platform config directory path: `<config_dir>/kgraph/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("kgraph").join("config.toml"))
}

/// Load config by cascading CWD `.kgraph.toml` over platform config.
/// CWD values override platform values. Files that fail to load are
/// skipped and reported so the caller can log them once logging is up.
pub fn load_config() -> (ConfigFile, Vec<ConfigError>) {
    let mut paths = Vec::new();
    if let Some(platform) = config_path() {
        paths.push(platform);
    }
    paths.push(PathBuf::from(".kgraph.toml"));
    load_cascade(&paths)
}

/// Later paths override earlier ones.
pub fn load_cascade(paths: &[PathBuf]) -> (ConfigFile, Vec<ConfigError>) {
    let mut config = ConfigFile::default();
    let mut errors = Vec::new();
    for path in paths {
        match load_from_path(path) {
            Ok(Some(layer)) => config = merge(config, layer),
            Ok(None) => {}
            Err(e) => errors.push(e),
        }
    }
    (config, errors)
}

/// `Ok(None)` when the file does not exist.
pub fn load_from_path(path: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let display = match (base.display, overlay.display) {
        (Some(b), Some(o)) => Some(DisplayConfig {
            theme: o.theme.or(b.theme),
            tick_rate_ms: o.tick_rate_ms.or(b.tick_rate_ms),
        }),
        (b, o) => o.or(b),
    };
    let service = match (base.service, overlay.service) {
        (Some(b), Some(o)) => Some(ServiceConfig {
            latency_scale: o.latency_scale.or(b.latency_scale),
            seed_samples: o.seed_samples.or(b.seed_samples),
        }),
        (b, o) => o.or(b),
    };
    let logging = match (base.logging, overlay.logging) {
        (Some(b), Some(o)) => Some(LoggingConfig {
            level: o.level.or(b.level),
            file: o.file.or(b.file),
        }),
        (b, o) => o.or(b),
    };
    ConfigFile {
        display,
        service,
        logging,
    }
}

/// Values that beat every config file: environment, then command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub theme: Option<String>,
    pub tick_rate_ms: Option<u64>,
    pub latency_scale: Option<f64>,
    pub no_samples: bool,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub theme: String,
    pub tick_rate: Duration,
    pub latency_scale: f64,
    pub seed_samples: bool,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Precedence: CLI > `KGRAPH_THEME` env > config files > defaults.
    pub fn resolve(file: &ConfigFile, env_theme: Option<String>, cli: &Overrides) -> Self {
        let display = file.display.clone().unwrap_or_default();
        let service = file.service.clone().unwrap_or_default();
        let logging = file.logging.clone().unwrap_or_default();

        let tick_rate_ms = cli
            .tick_rate_ms
            .or(display.tick_rate_ms)
            .unwrap_or(DEFAULT_TICK_RATE_MS)
            .max(10);
        let latency_scale = cli
            .latency_scale
            .or(service.latency_scale)
            .filter(|scale| scale.is_finite())
            .unwrap_or(1.0)
            .clamp(0.0, Latency::MAX_SCALE);

        Self {
            theme: cli
                .theme
                .clone()
                .or(env_theme.filter(|t| !t.trim().is_empty()))
                .or(display.theme)
                .unwrap_or_else(|| "hacker".to_string()),
            tick_rate: Duration::from_millis(tick_rate_ms),
            latency_scale,
            seed_samples: !cli.no_samples && service.seed_samples.unwrap_or(true),
            log_level: cli
                .log_level
                .clone()
                .or(logging.level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_file: cli.log_file.clone().or(logging.file.map(PathBuf::from)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("absent.toml")).unwrap().is_none());
    }

    #[test]
    fn invalid_toml_is_reported_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write(&dir, "bad.toml", "[display\ntheme = ");
        let good = write(&dir, "good.toml", "[display]\ntheme = \"modern\"\n");
        let (config, errors) = load_cascade(&[bad, good]);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ConfigError::Parse { .. }));
        assert_eq!(
            config.display.and_then(|d| d.theme).as_deref(),
            Some("modern")
        );
    }

    #[test]
    fn later_file_overrides_per_field() {
        let dir = tempfile::tempdir().unwrap();
        let platform = write(
            &dir,
            "platform.toml",
            "[display]\ntheme = \"modern\"\ntick_rate_ms = 250\n\n[logging]\nlevel = \"debug\"\n",
        );
        let cwd = write(&dir, "cwd.toml", "[display]\ntick_rate_ms = 50\n");
        let (config, errors) = load_cascade(&[platform, cwd]);
        assert!(errors.is_empty());
        let display = config.display.unwrap();
        assert_eq!(display.theme.as_deref(), Some("modern"));
        assert_eq!(display.tick_rate_ms, Some(50));
        assert_eq!(config.logging.unwrap().level.as_deref(), Some("debug"));
    }

    #[test]
    fn defaults_without_any_source() {
        let settings = Settings::resolve(&ConfigFile::default(), None, &Overrides::default());
        assert_eq!(settings.theme, "hacker");
        assert_eq!(settings.tick_rate, Duration::from_millis(100));
        assert_eq!(settings.latency_scale, 1.0);
        assert!(settings.seed_samples);
        assert_eq!(settings.log_level, "info");
        assert!(settings.log_file.is_none());
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let file = ConfigFile {
            display: Some(DisplayConfig {
                theme: Some("hacker".into()),
                tick_rate_ms: None,
            }),
            ..Default::default()
        };
        let env = Some("modern".to_string());
        let settings = Settings::resolve(&file, env.clone(), &Overrides::default());
        assert_eq!(settings.theme, "modern");

        let cli = Overrides {
            theme: Some("hacker".into()),
            no_samples: true,
            ..Default::default()
        };
        let settings = Settings::resolve(&file, env, &cli);
        assert_eq!(settings.theme, "hacker");
        assert!(!settings.seed_samples);
    }

    #[test]
    fn latency_scale_is_kept_in_range() {
        let scale = |cli: Option<f64>, file: Option<f64>| {
            let config = ConfigFile {
                service: Some(ServiceConfig {
                    latency_scale: file,
                    seed_samples: None,
                }),
                ..Default::default()
            };
            let overrides = Overrides {
                latency_scale: cli,
                ..Default::default()
            };
            Settings::resolve(&config, None, &overrides).latency_scale
        };
        assert_eq!(scale(Some(f64::INFINITY), None), 1.0);
        assert_eq!(scale(None, Some(f64::NAN)), 1.0);
        assert_eq!(scale(Some(1e12), None), Latency::MAX_SCALE);
        assert_eq!(scale(None, Some(-3.0)), 0.0);
        assert_eq!(scale(Some(2.0), Some(0.5)), 2.0);

        // Resolved scales are always safe to turn into delays.
        let _ = Latency::scaled(scale(Some(f64::MAX), None));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = ConfigFile {
            service: Some(ServiceConfig {
                latency_scale: Some(0.5),
                seed_samples: Some(false),
            }),
            ..Default::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(toml::from_str::<ConfigFile>(&text).unwrap(), config);
    }
}
