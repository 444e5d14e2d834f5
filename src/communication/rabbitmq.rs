use crate::communication::broadcaster::EventSink;
use crate::communication::messages::{InboundMessage, OutboundMessage};
use crate::control_system::preemption_controller::PreemptionController;
use crate::engine::PreemptionEngine;
use crate::error::PreemptionError;
use crate::global_variables::{amqp_url, EXCHANGE_SIGNAL_EVENTS, QUEUE_AMBULANCE_EVENTS};
use amiquip::{
    Channel, Connection, ConsumerMessage, ConsumerOptions, Exchange, ExchangeDeclareOptions,
    ExchangeType, FieldTable, Publish, QueueDeclareOptions, Result as AmiquipResult,
};

/// Publishes outbound events on the `signal_events` fanout exchange.
pub struct RabbitPublisher<'a> {
    exchange: Exchange<'a>,
}

impl<'a> RabbitPublisher<'a> {
    pub fn new(exchange: Exchange<'a>) -> Self {
        Self { exchange }
    }
}

impl EventSink for RabbitPublisher<'_> {
    fn publish(&self, event: &OutboundMessage) -> Result<(), PreemptionError> {
        let json = event.to_json()?;
        // Fanout exchanges ignore the routing key.
        self.exchange.publish(Publish::new(json.as_bytes(), ""))?;
        Ok(())
    }
}

pub fn declare_signal_exchange(channel: &Channel) -> AmiquipResult<Exchange<'_>> {
    channel.exchange_declare(
        ExchangeType::Fanout,
        EXCHANGE_SIGNAL_EVENTS,
        ExchangeDeclareOptions::default(),
    )
}

/// Sends one inbound event to the preemption server's queue.
pub fn publish_inbound(exchange: &Exchange, message: &InboundMessage) -> Result<(), PreemptionError> {
    let json = message.to_json()?;
    exchange.publish(Publish::new(json.as_bytes(), QUEUE_AMBULANCE_EVENTS))?;
    Ok(())
}

// Consumes "ambulance_events" one delivery at a time and fans every result out on "signal_events".
// Blocking; run it on a dedicated thread or via spawn_blocking.
pub fn run_preemption_server(engine: PreemptionEngine) -> AmiquipResult<()> {
    let mut connection = Connection::insecure_open(&amqp_url())?;
    let channel = connection.open_channel(None)?;
    let exchange = declare_signal_exchange(&channel)?;
    let queue = channel.queue_declare(QUEUE_AMBULANCE_EVENTS, QueueDeclareOptions::default())?;
    let consumer = queue.consume(ConsumerOptions::default())?;
    log::info!(
        "[PreemptionServer] Waiting for ambulance events on '{}'...",
        QUEUE_AMBULANCE_EVENTS
    );

    let mut controller = PreemptionController::new(engine, RabbitPublisher::new(exchange));

    for message in consumer.receiver() {
        match message {
            ConsumerMessage::Delivery(delivery) => {
                let handled = InboundMessage::from_json(&delivery.body)
                    .and_then(|inbound| controller.handle_inbound(inbound));
                match handled {
                    Ok(()) => {}
                    Err(PreemptionError::Publish(e)) => return Err(e),
                    // Bad input is dropped, not redelivered.
                    Err(e) => log::warn!("[PreemptionServer] Dropped message: {}", e),
                }
                consumer.ack(delivery)?;
            }
            other => {
                log::info!("[PreemptionServer] Consumer ended: {:?}", other);
                break;
            }
        }
    }
    connection.close()
}

// Binds a private queue to "signal_events" and hands every decoded event to `handler`.
pub fn listen_signal_events<F>(mut handler: F) -> AmiquipResult<()>
where
    F: FnMut(OutboundMessage),
{
    let mut connection = Connection::insecure_open(&amqp_url())?;
    let channel = connection.open_channel(None)?;
    let exchange = declare_signal_exchange(&channel)?;
    let queue = channel.queue_declare(
        "",
        QueueDeclareOptions {
            exclusive: true,
            ..QueueDeclareOptions::default()
        },
    )?;
    queue.bind(&exchange, "", FieldTable::default())?;
    let consumer = queue.consume(ConsumerOptions::default())?;

    for message in consumer.receiver() {
        match message {
            ConsumerMessage::Delivery(delivery) => {
                match OutboundMessage::from_json(&delivery.body) {
                    Ok(event) => handler(event),
                    Err(e) => log::warn!("Ignoring undecodable signal event: {}", e),
                }
                consumer.ack(delivery)?;
            }
            other => {
                log::info!("Signal events consumer ended: {:?}", other);
                break;
            }
        }
    }
    connection.close()
}
