use crate::communication::messages::OutboundMessage;
use crate::error::PreemptionError;
use std::sync::Mutex;
use tokio::sync::broadcast;

/// Anything outbound events can be pushed to. Every subscriber of a sink sees the same events.
pub trait EventSink {
    fn publish(&self, event: &OutboundMessage) -> Result<(), PreemptionError>;
}

/// In-process broadcast topic. Each subscriber receives its own clone of every event.
pub struct EventHub {
    sender: broadcast::Sender<OutboundMessage>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OutboundMessage> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EventSink for EventHub {
    fn publish(&self, event: &OutboundMessage) -> Result<(), PreemptionError> {
        // Nobody listening is fine; the event is simply dropped.
        if self.sender.send(event.clone()).is_err() {
            log::debug!("No subscribers for {}", event.event_name());
        }
        Ok(())
    }
}

/// Keeps every published event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<OutboundMessage>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<OutboundMessage> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for MemorySink {
    fn publish(&self, event: &OutboundMessage) -> Result<(), PreemptionError> {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
        Ok(())
    }
}
