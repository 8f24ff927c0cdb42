mod settings;

pub use settings::{Bus, Control, Logger, Settings};
