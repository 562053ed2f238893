pub mod analysis;
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod events;
pub mod fs;
pub mod logging;
pub mod model;
pub mod output;
pub mod style;

pub use api::{ModboundError, VerifyOptions, load_classes, verify};
pub use cli::Cli;
pub use commands::{cmd_init, cmd_verify};
pub use config::Config;
pub use model::AnalysisResult;
