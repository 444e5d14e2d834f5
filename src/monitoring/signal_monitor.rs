use crate::communication::messages::OutboundMessage;
use crate::global_variables::{CSV_DESTINATION_UPDATES, CSV_NEAREST_SIGNAL, CSV_SIGNAL_STATES};
use crate::shared_data::{
    current_timestamp, DestinationRecord, NearestSignalRecord, SignalStateRecord,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Appends every broadcast event to CSV files in `log_dir`.
pub struct SignalMonitor {
    log_dir: PathBuf,
}

impl SignalMonitor {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    pub fn nearest_signal_log(&self) -> PathBuf {
        self.log_dir.join(CSV_NEAREST_SIGNAL)
    }

    pub fn signal_states_log(&self) -> PathBuf {
        self.log_dir.join(CSV_SIGNAL_STATES)
    }

    pub fn destination_log(&self) -> PathBuf {
        self.log_dir.join(CSV_DESTINATION_UPDATES)
    }

    pub fn record(&self, event: &OutboundMessage) -> Result<(), Box<dyn Error>> {
        self.record_at(event, current_timestamp())
    }

    pub fn record_at(&self, event: &OutboundMessage, timestamp: u64) -> Result<(), Box<dyn Error>> {
        match event {
            OutboundMessage::NearestSignal(nearest) => {
                let record = NearestSignalRecord {
                    timestamp,
                    id: nearest.id.to_string(),
                    distance_meters: nearest.distance_meters,
                    eta_seconds: nearest.eta_seconds,
                };
                log_to_csv(&self.nearest_signal_log(), &[record])
            }
            OutboundMessage::SignalUpdate(signals) => {
                let records: Vec<SignalStateRecord> = signals
                    .iter()
                    .map(|s| SignalStateRecord {
                        timestamp,
                        id: s.id.to_string(),
                        name: s.name.clone(),
                        lat: s.lat,
                        lng: s.lng,
                        state: s.state.to_string(),
                    })
                    .collect();
                log_to_csv(&self.signal_states_log(), &records)
            }
            OutboundMessage::DestinationUpdate(payload) => {
                let record = DestinationRecord {
                    timestamp,
                    hospital_name: payload.hospital_name().unwrap_or_default().to_string(),
                    payload: payload.0.to_string(),
                };
                log_to_csv(&self.destination_log(), &[record])
            }
        }
    }

    /// Same as `record`, but failures are only reported.
    pub fn log_event(&self, event: &OutboundMessage) {
        if let Err(e) = self.record(event) {
            log::error!("Error logging {} event: {}", event.event_name(), e);
        }
    }
}

// Generic helper to append records to a CSV file, writing the header only for a new file.
fn log_to_csv<T: Serialize>(path: &Path, records: &[T]) -> Result<(), Box<dyn Error>> {
    let file_exists = path.exists();
    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Counts the GREEN rows per signal in a signal-states log.
pub fn summarize_signal_states(path: &Path) -> Result<BTreeMap<String, usize>, Box<dyn Error>> {
    let file = File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut green_counts = BTreeMap::new();
    for result in rdr.deserialize() {
        let record: SignalStateRecord = result?;
        let count = green_counts.entry(record.id).or_insert(0);
        if record.state == "GREEN" {
            *count += 1;
        }
    }
    Ok(green_counts)
}

pub fn show_preemption_summary(path: &Path) -> Result<(), Box<dyn Error>> {
    let counts = summarize_signal_states(path)?;
    println!("Preemption summary ({}):", path.display());
    for (id, greens) in &counts {
        println!("  {}: green in {} updates", id, greens);
    }
    Ok(())
}
