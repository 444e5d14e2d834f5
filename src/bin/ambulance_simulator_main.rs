// ambulance_simulator_main.rs
use amiquip::{Connection, Exchange, QueueDeclareOptions};
use signal_preemption::communication::messages::{DestinationPayload, InboundMessage};
use signal_preemption::communication::rabbitmq::publish_inbound;
use signal_preemption::global_variables::{amqp_url, QUEUE_AMBULANCE_EVENTS};
use signal_preemption::simulation_engine::ambulance::{find_hospital, AmbulanceSimulator, TICK_MILLIS};
use std::error::Error;
use std::thread;
use std::time::Duration;

// Usage: ambulance_simulator_main [hospital] [jitter_deg]
fn drive(hospital_key: String, jitter_deg: f64) -> Result<(), Box<dyn Error>> {
    let hospital = find_hospital(&hospital_key)
        .ok_or_else(|| format!("unknown hospital '{}'", hospital_key))?;

    let mut connection = Connection::insecure_open(&amqp_url())?;
    let channel = connection.open_channel(None)?;
    channel.queue_declare(QUEUE_AMBULANCE_EVENTS, QueueDeclareOptions::default())?;
    let exchange = Exchange::direct(&channel);

    publish_inbound(
        &exchange,
        &InboundMessage::HospitalDestination(DestinationPayload::new(hospital.key, hospital.name)),
    )?;
    println!("Ambulance dispatched to {}", hospital.name);

    let mut simulator = AmbulanceSimulator::demo_route();
    if jitter_deg > 0.0 {
        simulator = simulator.with_jitter(jitter_deg, rand::random());
    }
    for sample in simulator {
        publish_inbound(&exchange, &InboundMessage::AmbulanceLocation(sample))?;
        log::debug!("Sent position ({:.5}, {:.5})", sample.lat, sample.lng);
        thread::sleep(Duration::from_millis(TICK_MILLIS));
    }
    println!("Hospital reached! Destination: {}", hospital.name);

    connection.close()?;
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let hospital_key = args.next().unwrap_or_else(|| "Apollo".to_string());
    let jitter_deg = args.next().and_then(|a| a.parse().ok()).unwrap_or(0.0);

    let result = tokio::task::spawn_blocking(move || {
        drive(hospital_key, jitter_deg).map_err(|e| e.to_string())
    })
    .await;
    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => eprintln!("Simulator error: {}", e),
        Err(e) => eprintln!("Simulator task failed: {}", e),
    }
}
