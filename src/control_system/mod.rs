pub mod preemption_controller;
