pub mod commands;
pub mod controller;
pub mod engine;
pub mod session;

pub use controller::SpeechController;
pub use session::{PlaybackStatus, SpeechSession};
