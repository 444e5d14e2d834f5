pub mod signal_monitor;
