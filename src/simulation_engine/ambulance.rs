use crate::communication::messages::PositionSample;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Delay between two GPS fixes.
pub const TICK_MILLIS: u64 = 300;
/// Degrees of latitude travelled per tick.
pub const STEP_DEG: f64 = 0.00003;
/// Speed reported with every fix.
pub const REPORTED_SPEED: f64 = 60.0;

/// Hospital the ambulance can be dispatched to.
#[derive(Debug, Clone, PartialEq)]
pub struct Hospital {
    pub key: &'static str,
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

pub fn create_hospitals() -> Vec<Hospital> {
    vec![
        Hospital {
            key: "Apollo",
            name: "Apollo Hospital",
            lat: 17.3880,
            lng: 78.4867,
        },
        Hospital {
            key: "KIMS",
            name: "KIMS Hospital",
            lat: 17.3875,
            lng: 78.4867,
        },
        Hospital {
            key: "Continental",
            name: "Continental Hospital",
            lat: 17.3870,
            lng: 78.4867,
        },
    ]
}

pub fn find_hospital(key: &str) -> Option<Hospital> {
    create_hospitals()
        .into_iter()
        .find(|h| h.key.eq_ignore_ascii_case(key))
}

/// Fake GPS feed for an ambulance driving north along the demo road.
///
/// Yields one sample per tick, moving `step_deg` north each time, and stops after the
/// first sample beyond `stop_lat`.
pub struct AmbulanceSimulator {
    lat: f64,
    lng: f64,
    step_deg: f64,
    stop_lat: f64,
    jitter_deg: f64,
    rng: SmallRng,
    finished: bool,
}

impl AmbulanceSimulator {
    pub fn new(start_lat: f64, lng: f64, stop_lat: f64) -> Self {
        Self {
            lat: start_lat,
            lng,
            step_deg: STEP_DEG,
            stop_lat,
            jitter_deg: 0.0,
            rng: SmallRng::seed_from_u64(0),
            finished: false,
        }
    }

    /// Starts south of every signal and stops past the last one.
    pub fn demo_route() -> Self {
        Self::new(17.3835, 78.4867, 17.3875)
    }

    pub fn with_step(mut self, step_deg: f64) -> Self {
        self.step_deg = step_deg;
        self
    }

    /// Adds uniform noise of up to `jitter_deg` to each reported coordinate.
    pub fn with_jitter(mut self, jitter_deg: f64, seed: u64) -> Self {
        self.jitter_deg = jitter_deg.abs();
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    fn noise(&mut self) -> f64 {
        if self.jitter_deg > 0.0 {
            self.rng.random_range(-self.jitter_deg..=self.jitter_deg)
        } else {
            0.0
        }
    }
}

impl Iterator for AmbulanceSimulator {
    type Item = PositionSample;

    fn next(&mut self) -> Option<PositionSample> {
        if self.finished {
            return None;
        }
        self.lat += self.step_deg;
        if self.lat > self.stop_lat {
            self.finished = true;
        }
        let lat = self.lat + self.noise();
        let lng = self.lng + self.noise();
        Some(PositionSample::with_speed(lat, lng, REPORTED_SPEED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_route_runs_north_and_stops() {
        let samples: Vec<PositionSample> = AmbulanceSimulator::demo_route().collect();
        assert!(samples.len() > 100);
        assert!(samples.windows(2).all(|w| w[1].lat > w[0].lat));
        assert!(samples.iter().all(|s| s.lng == 78.4867));
        assert!(samples.iter().all(|s| s.speed == Some(REPORTED_SPEED)));

        let last = samples.last().unwrap();
        assert!(last.lat > 17.3875);
        assert!(samples[samples.len() - 2].lat <= 17.3875);
    }

    #[test]
    fn test_jitter_is_bounded_and_seeded() {
        let a: Vec<PositionSample> = AmbulanceSimulator::demo_route()
            .with_jitter(0.00001, 7)
            .take(20)
            .collect();
        let b: Vec<PositionSample> = AmbulanceSimulator::demo_route()
            .with_jitter(0.00001, 7)
            .take(20)
            .collect();
        assert_eq!(a, b);
        assert!(a.iter().all(|s| (s.lng - 78.4867).abs() <= 0.00001 + 1e-12));
    }

    #[test]
    fn test_find_hospital_ignores_case() {
        assert_eq!(find_hospital("kims").map(|h| h.lat), Some(17.3875));
        assert!(find_hospital("Nowhere").is_none());
    }
}
