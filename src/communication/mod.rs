// communication/mod.rs
pub mod broadcaster;
pub mod messages;
pub mod rabbitmq;
