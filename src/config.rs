use crate::error::ConfigError;
use crate::global_variables::ENV_PREEMPTION_CONFIG;
use crate::models::signal::{Signal, SignalId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Static description of one signal on the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Route layout and preemption tunables. Fixed for the lifetime of an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreemptionConfig {
    /// Ordered signals along the route. Order only breaks distance ties.
    pub signals: Vec<SignalConfig>,
    /// The nearest signal turns green within this many meters.
    pub preemption_radius_m: f64,
    /// Degrees of latitude the ambulance must be north of a signal before it can count as passed.
    pub north_offset_deg: f64,
    /// Meters the ambulance must be away from a signal before it can count as passed.
    pub clearance_distance_m: f64,
    /// Samples south of this latitude clear the passed-signal history.
    pub route_start_lat: f64,
    /// Divisor for the ETA estimate. The sample's own speed is not used.
    pub assumed_speed: f64,
    /// Enables the implicit reset when the ambulance returns south of `route_start_lat`.
    pub reset_on_route_start: bool,
}

impl Default for PreemptionConfig {
    fn default() -> Self {
        Self {
            signals: create_reference_signals(),
            preemption_radius_m: 30.0,
            north_offset_deg: 0.0002,
            clearance_distance_m: 50.0,
            route_start_lat: 17.3840,
            assumed_speed: 20.0,
            reset_on_route_start: true,
        }
    }
}

/// The three signals of the demo route, running south to north.
pub fn create_reference_signals() -> Vec<SignalConfig> {
    vec![
        SignalConfig {
            id: "S1".to_string(),
            name: "Signal 1".to_string(),
            lat: 17.3845,
            lng: 78.4867,
        },
        SignalConfig {
            id: "S2".to_string(),
            name: "Signal 2".to_string(),
            lat: 17.3855,
            lng: 78.4867,
        },
        SignalConfig {
            id: "S3".to_string(),
            name: "Signal 3".to_string(),
            lat: 17.3865,
            lng: 78.4867,
        },
    ]
}

impl PreemptionConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: PreemptionConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file named by `PREEMPTION_CONFIG`, or the reference route when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(ENV_PREEMPTION_CONFIG) {
            Ok(path) => {
                log::info!("Loading preemption config from {}", path);
                Self::load(path)
            }
            Err(_) => {
                log::info!("{} not set, using reference route", ENV_PREEMPTION_CONFIG);
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signals.is_empty() {
            return Err(ConfigError::Invalid("route has no signals".to_string()));
        }

        let mut seen = HashSet::new();
        for signal in &self.signals {
            if signal.id.trim().is_empty() {
                return Err(ConfigError::Invalid("signal id must not be empty".to_string()));
            }
            if !seen.insert(signal.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate signal id '{}'",
                    signal.id
                )));
            }
            if !signal.lat.is_finite() || !signal.lng.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "signal '{}' has non-finite coordinates",
                    signal.id
                )));
            }
        }

        let tunables = [
            ("preemption_radius_m", self.preemption_radius_m),
            ("north_offset_deg", self.north_offset_deg),
            ("clearance_distance_m", self.clearance_distance_m),
            ("route_start_lat", self.route_start_lat),
            ("assumed_speed", self.assumed_speed),
        ];
        for (name, value) in tunables {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{} must be finite", name)));
            }
        }
        if self.preemption_radius_m < 0.0 || self.clearance_distance_m < 0.0 {
            return Err(ConfigError::Invalid(
                "radius and clearance distance must not be negative".to_string(),
            ));
        }
        if self.assumed_speed <= 0.0 {
            return Err(ConfigError::Invalid(
                "assumed_speed must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the live signal list, all red, in configured order.
    pub fn build_signals(&self) -> Vec<Signal> {
        self.signals
            .iter()
            .map(|s| Signal::new(s.id.clone(), s.name.clone(), s.lat, s.lng))
            .collect()
    }

    pub fn signal_ids(&self) -> HashSet<SignalId> {
        self.signals.iter().map(|s| SignalId::new(s.id.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_reference_route() {
        let config = PreemptionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.signals.len(), 3);
        assert_eq!(config.signals[0].id, "S1");
        assert_eq!(config.preemption_radius_m, 30.0);
        assert_eq!(config.clearance_distance_m, 50.0);
        assert_eq!(config.route_start_lat, 17.3840);
        assert!(config.reset_on_route_start);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let json = r#"{ "preemption_radius_m": 45.0, "reset_on_route_start": false }"#;
        let config: PreemptionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.preemption_radius_m, 45.0);
        assert!(!config.reset_on_route_start);
        assert_eq!(config.signals.len(), 3);
        assert_eq!(config.assumed_speed, 20.0);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut config = PreemptionConfig::default();
        config.signals[1].id = "S1".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_empty_route_rejected() {
        let config = PreemptionConfig {
            signals: Vec::new(),
            ..PreemptionConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_non_positive_speed_rejected() {
        let config = PreemptionConfig {
            assumed_speed: 0.0,
            ..PreemptionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "preemption_config_{}.json",
            std::process::id()
        ));
        let config = PreemptionConfig {
            preemption_radius_m: 25.0,
            ..PreemptionConfig::default()
        };
        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = PreemptionConfig::load(&path).unwrap();
        assert_eq!(loaded, config);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = PreemptionConfig::load("/definitely/not/here/preemption.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_build_signals_all_red_in_order() {
        let signals = PreemptionConfig::default().build_signals();
        let ids: Vec<&str> = signals.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["S1", "S2", "S3"]);
        assert!(signals.iter().all(|s| !s.is_green()));
    }
}
