use signal_preemption::communication::messages::OutboundMessage;
use signal_preemption::communication::rabbitmq::listen_signal_events;
use signal_preemption::monitoring::signal_monitor::{show_preemption_summary, SignalMonitor};
use std::path::PathBuf;

// Usage: signal_monitor_main [log_dir]
//        signal_monitor_main --summary [log_dir]
#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let summary_only = args.first().map(|a| a == "--summary").unwrap_or(false);
    let log_dir = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let monitor = SignalMonitor::new(log_dir);

    if summary_only {
        if let Err(e) = show_preemption_summary(&monitor.signal_states_log()) {
            eprintln!("Could not read signal states log: {}", e);
        }
        return;
    }

    println!("Listening for signal events...");
    let listener = tokio::task::spawn_blocking(move || {
        listen_signal_events(|event| {
            if let OutboundMessage::NearestSignal(nearest) = &event {
                println!(
                    "Nearest {}: {}m, eta {}s",
                    nearest.id, nearest.distance_meters, nearest.eta_seconds
                );
            }
            monitor.log_event(&event);
        })
    });

    match listener.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => eprintln!("Error in signal events listener: {}", e),
        Err(e) => eprintln!("Signal events listener failed: {}", e),
    }
}
