// preemption_server_main.rs
use signal_preemption::communication::rabbitmq::run_preemption_server;
use signal_preemption::{PreemptionConfig, PreemptionEngine};

#[tokio::main]
async fn main() {
    env_logger::init();

    let engine = match PreemptionConfig::from_env().and_then(PreemptionEngine::new) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("Could not start preemption engine: {}", e);
            std::process::exit(1);
        }
    };

    println!("Ambulance Traffic Signal Preemption server");
    for signal in engine.signals() {
        println!(
            "  {} ({}) at ({}, {})",
            signal.id, signal.name, signal.lat, signal.lng
        );
    }

    match tokio::task::spawn_blocking(move || run_preemption_server(engine)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => eprintln!("Preemption server error: {}", e),
        Err(e) => eprintln!("Preemption server task failed: {}", e),
    }
}
