use crate::communication::messages::{NearestSignal, PositionSample};
use crate::config::PreemptionConfig;
use crate::engine::geometry::distance_meters;
use crate::error::{ConfigError, PreemptionError};
use crate::models::signal::{Signal, SignalId, SignalState};
use std::collections::BTreeSet;

/// What the engine remembers about the ambulance's trip along the route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteProgress {
    /// The signal preempted by the latest sample, if any.
    pub current_green_signal: Option<SignalId>,
    /// Signals the ambulance has cleared. Only grows until the route is reset.
    pub passed_signals: BTreeSet<SignalId>,
}

impl RouteProgress {
    pub fn is_passed(&self, id: &SignalId) -> bool {
        self.passed_signals.contains(id)
    }

    fn clear(&mut self) {
        self.current_green_signal = None;
        self.passed_signals.clear();
    }
}

/// Owned snapshot produced for every accepted sample.
#[derive(Debug, Clone, PartialEq)]
pub struct PreemptionUpdate {
    pub nearest: NearestSignal,
    /// All signals in configured order, after this sample was applied.
    pub signals: Vec<Signal>,
}

impl PreemptionUpdate {
    pub fn green_signal(&self) -> Option<&Signal> {
        self.signals.iter().find(|s| s.is_green())
    }
}

/// Decides which signal to preempt for a single ambulance on a single route.
///
/// Every sample recomputes the whole picture: all signals drop to red, then at most one
/// is turned green again. Nothing happens between samples.
#[derive(Debug, Clone)]
pub struct PreemptionEngine {
    config: PreemptionConfig,
    signals: Vec<Signal>,
    progress: RouteProgress,
}

impl PreemptionEngine {
    pub fn new(config: PreemptionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let signals = config.build_signals();
        Ok(Self {
            config,
            signals,
            progress: RouteProgress::default(),
        })
    }

    /// Applies one position sample and returns the resulting nearest summary and signal list.
    ///
    /// Samples with non-finite coordinates are rejected before any state is touched.
    pub fn ingest_position(
        &mut self,
        sample: &PositionSample,
    ) -> Result<PreemptionUpdate, PreemptionError> {
        if !sample.lat.is_finite() || !sample.lng.is_finite() {
            return Err(PreemptionError::InvalidSample(format!(
                "coordinates must be finite (lat: {}, lng: {})",
                sample.lat, sample.lng
            )));
        }

        let distances: Vec<f64> = self
            .signals
            .iter()
            .map(|s| distance_meters(sample.lat, sample.lng, s.lat, s.lng))
            .collect();

        // Ties go to the signal configured first.
        let (nearest_index, nearest_distance) = distances
            .iter()
            .copied()
            .enumerate()
            .min_by(|(ia, da), (ib, db)| da.total_cmp(db).then(ia.cmp(ib)))
            .ok_or_else(|| PreemptionError::UnknownSignal("route has no signals".to_string()))?;

        for signal in self.signals.iter_mut() {
            signal.state = SignalState::Red;
        }

        let nearest_id = self.signals[nearest_index].id.clone();
        if nearest_distance <= self.config.preemption_radius_m
            && !self.progress.is_passed(&nearest_id)
        {
            self.signals[nearest_index].state = SignalState::Green;
            if self.progress.current_green_signal.as_ref() != Some(&nearest_id) {
                log::info!(
                    "Signal {} turned GREEN (ambulance {}m away)",
                    nearest_id,
                    nearest_distance.floor()
                );
            }
            self.progress.current_green_signal = Some(nearest_id.clone());
        } else {
            self.progress.current_green_signal = None;
        }

        // Latitude only: the route is assumed to run south to north.
        for (signal, &distance) in self.signals.iter().zip(distances.iter()) {
            if sample.lat > signal.lat + self.config.north_offset_deg
                && distance > self.config.clearance_distance_m
                && !self.progress.is_passed(&signal.id)
            {
                self.progress.passed_signals.insert(signal.id.clone());
                log::info!("Ambulance passed {}", signal.id);
            }
        }

        if self.config.reset_on_route_start && sample.lat < self.config.route_start_lat {
            if !self.progress.passed_signals.is_empty() {
                log::info!("Route reset - ambulance back at start");
            }
            self.progress.passed_signals.clear();
        }

        let nearest = NearestSignal {
            id: nearest_id,
            distance_meters: nearest_distance.floor() as u64,
            eta_seconds: (nearest_distance / self.config.assumed_speed).floor() as u64,
        };
        log::debug!(
            "Sample ({}, {}): nearest {} at {}m, eta {}s, passed {:?}",
            sample.lat,
            sample.lng,
            nearest.id,
            nearest.distance_meters,
            nearest.eta_seconds,
            self.progress.passed_signals
        );

        Ok(PreemptionUpdate {
            nearest,
            signals: self.signals.clone(),
        })
    }

    /// Forgets every passed signal so the route can be driven again.
    pub fn reset_route(&mut self) {
        log::info!("Route reset requested");
        self.progress.clear();
    }

    pub fn signal(&self, id: &str) -> Result<&Signal, PreemptionError> {
        self.signals
            .iter()
            .find(|s| s.id.as_str() == id)
            .ok_or_else(|| PreemptionError::UnknownSignal(id.to_string()))
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn progress(&self) -> &RouteProgress {
        &self.progress
    }

    pub fn config(&self) -> &PreemptionConfig {
        &self.config
    }
}
