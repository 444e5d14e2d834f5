use signal_preemption::communication::broadcaster::EventHub;
use signal_preemption::communication::messages::{
    DestinationPayload, InboundMessage, OutboundMessage,
};
use signal_preemption::control_system::preemption_controller::PreemptionController;
use signal_preemption::simulation_engine::ambulance::{AmbulanceSimulator, TICK_MILLIS};
use signal_preemption::{PreemptionConfig, PreemptionEngine};
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

// Runs the whole demo in one process: simulated GPS feed -> controller -> printing subscriber.
#[tokio::main]
async fn main() {
    env_logger::init();

    let engine = match PreemptionConfig::from_env().and_then(PreemptionEngine::new) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Could not start preemption engine: {}", e);
            return;
        }
    };

    let hub = EventHub::default();
    let mut events = hub.subscribe();
    let controller = PreemptionController::new(engine, hub);

    let (tx, rx) = mpsc::channel(32);
    let controller_handle = tokio::spawn(controller.run(rx));

    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                OutboundMessage::NearestSignal(nearest) => println!(
                    "Nearest {}: {}m, eta {}s",
                    nearest.id, nearest.distance_meters, nearest.eta_seconds
                ),
                OutboundMessage::SignalUpdate(signals) => {
                    let states: Vec<String> = signals
                        .iter()
                        .map(|s| format!("{}={}", s.id, s.state))
                        .collect();
                    println!("Signals: {}", states.join(" "));
                }
                OutboundMessage::DestinationUpdate(payload) => println!(
                    "Destination: {}",
                    payload.hospital_name().unwrap_or("<unnamed>")
                ),
            }
        }
    });

    let destination = DestinationPayload::new("Apollo", "Apollo Hospital");
    if tx
        .send(InboundMessage::HospitalDestination(destination))
        .await
        .is_err()
    {
        return;
    }
    for sample in AmbulanceSimulator::demo_route() {
        if tx.send(InboundMessage::AmbulanceLocation(sample)).await.is_err() {
            break;
        }
        sleep(Duration::from_millis(TICK_MILLIS)).await;
    }
    drop(tx);

    // Dropping the controller closes the hub, which ends the printer.
    if let Ok(controller) = controller_handle.await {
        println!(
            "Route finished, passed signals: {:?}",
            controller.engine().progress().passed_signals
        );
    }
    let _ = printer.await;
}
