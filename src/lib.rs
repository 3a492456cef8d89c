pub mod cmd;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod infra;
pub mod resolver;
pub mod server;
pub mod services;
pub mod template;
pub mod workflow;

pub use config::AppConfig;
pub use context::AppContext;
pub use error::{AppError, AppResult};
