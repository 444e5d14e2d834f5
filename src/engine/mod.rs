// engine/mod.rs
pub mod geometry;
pub mod preemption_engine;

pub use preemption_engine::{PreemptionEngine, PreemptionUpdate, RouteProgress};
