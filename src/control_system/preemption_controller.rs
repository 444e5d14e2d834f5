use crate::communication::broadcaster::EventSink;
use crate::communication::messages::{
    DestinationPayload, InboundMessage, OutboundMessage, PositionSample,
};
use crate::engine::{PreemptionEngine, PreemptionUpdate};
use crate::error::PreemptionError;
use tokio::sync::mpsc;

/// Drives a `PreemptionEngine` from inbound events and publishes every result to a sink.
pub struct PreemptionController<S: EventSink> {
    engine: PreemptionEngine,
    sink: S,
}

impl<S: EventSink> PreemptionController<S> {
    pub fn new(engine: PreemptionEngine, sink: S) -> Self {
        Self { engine, sink }
    }

    // Runs the engine on one sample, then broadcasts "nearest_signal" followed by "signal_update".
    // Rejected samples publish nothing.
    pub fn handle_position(
        &mut self,
        sample: &PositionSample,
    ) -> Result<PreemptionUpdate, PreemptionError> {
        let update = match self.engine.ingest_position(sample) {
            Ok(update) => update,
            Err(e) => {
                log::warn!("Rejected position sample {:?}: {}", sample, e);
                return Err(e);
            }
        };

        self.sink
            .publish(&OutboundMessage::NearestSignal(update.nearest.clone()))?;
        self.sink
            .publish(&OutboundMessage::SignalUpdate(update.signals.clone()))?;
        Ok(update)
    }

    // Relays the destination to every subscriber untouched.
    pub fn set_destination(&self, payload: DestinationPayload) -> Result<(), PreemptionError> {
        log::info!(
            "Ambulance heading to: {}",
            payload.hospital_name().unwrap_or("<unnamed>")
        );
        self.sink.publish(&OutboundMessage::DestinationUpdate(payload))
    }

    pub fn reset_route(&mut self) {
        self.engine.reset_route();
    }

    pub fn handle_inbound(&mut self, message: InboundMessage) -> Result<(), PreemptionError> {
        match message {
            InboundMessage::AmbulanceLocation(sample) => self.handle_position(&sample).map(|_| ()),
            InboundMessage::HospitalDestination(payload) => self.set_destination(payload),
            InboundMessage::ResetRoute => {
                self.reset_route();
                Ok(())
            }
        }
    }

    // Handles inbound events in arrival order until every sender is dropped, then hands
    // the controller back. Bad input is logged and skipped; a failing sink stops the loop.
    pub async fn run(mut self, mut inbound: mpsc::Receiver<InboundMessage>) -> Self {
        while let Some(message) = inbound.recv().await {
            match self.handle_inbound(message) {
                Ok(()) => {}
                Err(e @ PreemptionError::InvalidSample(_))
                | Err(e @ PreemptionError::MalformedMessage(_)) => {
                    log::warn!("Skipped inbound event: {}", e);
                }
                Err(e) => {
                    log::error!("Stopping preemption loop: {}", e);
                    break;
                }
            }
        }
        self
    }

    pub fn engine(&self) -> &PreemptionEngine {
        &self.engine
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::broadcaster::{EventHub, MemorySink};
    use crate::config::PreemptionConfig;
    use crate::models::signal::SignalId;

    fn controller() -> PreemptionController<MemorySink> {
        let engine = PreemptionEngine::new(PreemptionConfig::default()).unwrap();
        PreemptionController::new(engine, MemorySink::new())
    }

    #[test]
    fn test_position_publishes_nearest_then_states() {
        let mut controller = controller();
        controller
            .handle_position(&PositionSample::with_speed(17.3845, 78.4867, 60.0))
            .unwrap();

        let events = controller.sink().events();
        assert_eq!(events.len(), 2);
        match &events[0] {
            OutboundMessage::NearestSignal(nearest) => {
                assert_eq!(nearest.id, SignalId::new("S1"));
                assert_eq!(nearest.distance_meters, 0);
                assert_eq!(nearest.eta_seconds, 0);
            }
            other => panic!("expected nearest_signal, got {:?}", other),
        }
        match &events[1] {
            OutboundMessage::SignalUpdate(signals) => {
                assert_eq!(signals.len(), 3);
                assert!(signals[0].is_green());
            }
            other => panic!("expected signal_update, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_sample_publishes_nothing() {
        let mut controller = controller();
        let err = controller
            .handle_position(&PositionSample::new(f64::NAN, 78.4867))
            .unwrap_err();
        assert!(matches!(err, PreemptionError::InvalidSample(_)));
        assert!(controller.sink().events().is_empty());
    }

    #[test]
    fn test_destination_is_relayed_unchanged() {
        let controller = controller();
        let payload = DestinationPayload(serde_json::json!({
            "hospital": "Continental",
            "hospitalName": "Continental Hospital",
            "priority": 1
        }));
        controller.set_destination(payload.clone()).unwrap();
        assert_eq!(
            controller.sink().events(),
            vec![OutboundMessage::DestinationUpdate(payload)]
        );
        assert!(controller.engine().progress().passed_signals.is_empty());
    }

    #[test]
    fn test_inbound_reset_clears_passed_signals() {
        let mut controller = controller();
        controller
            .handle_inbound(InboundMessage::AmbulanceLocation(PositionSample::new(
                17.3852, 78.4867,
            )))
            .unwrap();
        assert!(!controller.engine().progress().passed_signals.is_empty());

        controller.handle_inbound(InboundMessage::ResetRoute).unwrap();
        assert!(controller.engine().progress().passed_signals.is_empty());
        // Reset itself is silent.
        assert_eq!(controller.sink().events().len(), 2);
    }

    #[tokio::test]
    async fn test_run_loop_serializes_events_to_hub() {
        let engine = PreemptionEngine::new(PreemptionConfig::default()).unwrap();
        let hub = EventHub::default();
        let mut subscriber = hub.subscribe();
        let controller = PreemptionController::new(engine, hub);

        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(controller.run(rx));

        tx.send(InboundMessage::HospitalDestination(DestinationPayload::new(
            "Apollo", "Apollo",
        )))
        .await
        .unwrap();
        tx.send(InboundMessage::AmbulanceLocation(PositionSample::new(
            f64::INFINITY,
            78.4867,
        )))
        .await
        .unwrap();
        tx.send(InboundMessage::AmbulanceLocation(PositionSample::new(
            17.3846, 78.4867,
        )))
        .await
        .unwrap();
        drop(tx);

        let controller = handle.await.unwrap();
        assert_eq!(
            controller.engine().progress().current_green_signal,
            Some(SignalId::new("S1"))
        );

        let names: Vec<&str> = std::iter::from_fn(|| subscriber.try_recv().ok())
            .map(|event| event.event_name())
            .collect();
        assert_eq!(
            names,
            vec!["destination_update", "nearest_signal", "signal_update"]
        );
    }
}
