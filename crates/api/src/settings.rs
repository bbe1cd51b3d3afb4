//! Monitor settings and startup hazard loading

use config::{Config, ConfigError, Environment, File};
use geofence_engine::{EngineConfig, Hazard};
use hazard_model::source::{self, SourceError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Environment variable prefix, e.g. `CAMERA_ALERT__LISTEN_ADDR`
pub const ENV_PREFIX: &str = "CAMERA_ALERT";

/// Errors while preparing the monitor
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed hazard file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Bad record in {path}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: SourceError,
    },
}

/// Host configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// HTTP listen address
    pub listen_addr: String,
    /// Max log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Hazards in native JSON form (list of tagged point/line hazards)
    pub hazards_path: Option<PathBuf>,
    /// Fixed-camera dataset rows, CSV (`.csv`) or a JSON array
    pub cameras_path: Option<PathBuf>,
    /// Monitored stretches as GeoJSON
    pub lines_path: Option<PathBuf>,
    /// Engine settings
    pub engine: EngineConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            log_level: "info".to_string(),
            hazards_path: None,
            cameras_path: None,
            lines_path: None,
            engine: EngineConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Layer defaults, the optional config file at `path` (any format the
    /// `config` crate recognises by extension), then `CAMERA_ALERT__*`
    /// environment variables
    pub fn load(path: &str) -> Result<Self, StartupError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Read every configured hazard source into one list.
    ///
    /// Any unreadable file or malformed record fails the whole load.
    pub fn load_hazards(&self) -> Result<Vec<Hazard>, StartupError> {
        let mut hazards = Vec::new();

        if let Some(path) = &self.hazards_path {
            let text = read(path)?;
            let native: Vec<Hazard> =
                serde_json::from_str(&text).map_err(|source| StartupError::Json {
                    path: path.clone(),
                    source,
                })?;
            info!("Read {} hazards from {}", native.len(), path.display());
            hazards.extend(native);
        }

        if let Some(path) = &self.cameras_path {
            let text = read(path)?;
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            let cameras = if is_csv {
                source::cameras_from_csv(&text)
            } else {
                source::cameras_from_json(&text)
            };
            hazards.extend(cameras.map_err(|source| StartupError::Source {
                path: path.clone(),
                source,
            })?);
        }

        if let Some(path) = &self.lines_path {
            let text = read(path)?;
            hazards.extend(source::lines_from_geojson(&text).map_err(|source| {
                StartupError::Source {
                    path: path.clone(),
                    source,
                }
            })?);
        }

        Ok(hazards)
    }
}

fn read(path: &Path) -> Result<String, StartupError> {
    std::fs::read_to_string(path).map_err(|source| StartupError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.engine.alerting.cooldown_seconds, 30);
        assert_eq!(config.engine.evaluator.point_radius_m, 200.0);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = MonitorConfig::load("does-not-exist/camera-alert-monitor").unwrap();
        assert_eq!(config.log_level, "info");
        assert!(config.load_hazards().unwrap().is_empty());
    }

    #[test]
    fn test_partial_override_keeps_nested_defaults() {
        let json = r#"{"engine": {"alerting": {"cooldown_seconds": 10}}}"#;
        let config: MonitorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.engine.alerting.cooldown_seconds, 10);
        assert_eq!(config.engine.evaluator.line_vertex_radius_m, 50.0);
        assert_eq!(config.engine.event_capacity, 64);
    }

    #[test]
    fn test_environment_overrides_file_defaults() {
        std::env::set_var("CAMERA_ALERT__ENGINE__ALERTING__COOLDOWN_SECONDS", "45");
        let loaded = MonitorConfig::load("does-not-exist/camera-alert-monitor");
        std::env::remove_var("CAMERA_ALERT__ENGINE__ALERTING__COOLDOWN_SECONDS");

        let config = loaded.unwrap();
        assert_eq!(config.engine.alerting.cooldown_seconds, 45);
        assert_eq!(config.engine.evaluator.point_radius_m, 200.0);
    }

    #[test]
    fn test_camera_csv_selected_by_extension() {
        let path = std::env::temp_dir().join(format!("cameras-{}.csv", std::process::id()));
        std::fs::write(
            &path,
            "ID,lat,long,bearing,SITE_DES_1\n1101,22.2820,114.1580,90,Connaught Road C EB\n",
        )
        .unwrap();

        let config = MonitorConfig {
            cameras_path: Some(path.clone()),
            ..Default::default()
        };
        let hazards = config.load_hazards();
        std::fs::remove_file(&path).unwrap();

        let hazards = hazards.unwrap();
        assert_eq!(hazards.len(), 1);
        assert_eq!(hazards[0].id(), "1101");
    }

    #[test]
    fn test_camera_csv_bad_row_fails_startup() {
        let path = std::env::temp_dir().join(format!("cameras-bad-{}.csv", std::process::id()));
        std::fs::write(&path, "ID,lat,long,bearing\n1101,22.2820,114.1580,\n").unwrap();

        let config = MonitorConfig {
            cameras_path: Some(path.clone()),
            ..Default::default()
        };
        let result = config.load_hazards();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            result,
            Err(StartupError::Source {
                source: SourceError::MissingField { field: "bearing", .. },
                ..
            })
        ));
    }

    #[test]
    fn test_unreadable_hazard_file() {
        let config = MonitorConfig {
            hazards_path: Some(PathBuf::from("no/such/hazards.json")),
            ..Default::default()
        };
        assert!(matches!(
            config.load_hazards(),
            Err(StartupError::Io { .. })
        ));
    }
}
