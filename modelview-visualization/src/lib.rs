//! Interactive viewer for modelview
//!
//! This crate wires the renderer to a window:
//! - configuration and command line parsing
//! - logger setup
//! - keyboard and mouse camera controls
//! - the egui control panel
//! - the event loop

pub mod config;
pub mod logging;
pub mod input;
pub mod ui;
pub mod app;

pub use config::{Args, DefaultModel, ViewerConfig};
pub use logging::{init_logging, LoggingConfig};
pub use input::InputState;
pub use ui::{UiAction, UiState};
pub use app::{run, AppContext};
