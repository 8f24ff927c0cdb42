mod alert_engine;
mod controller;
mod engine;
mod event_bus;
mod offline_detector;
mod store;

pub use alert_engine::*;
pub use controller::*;
pub use engine::*;
pub use event_bus::*;
pub use offline_detector::*;
pub use store::*;
