mod application;
pub mod data;
mod runtime_config;

pub use application::{Application, ApplicationError};
pub use runtime_config::{DEFAULT_ROOT_DIR_NAME, RuntimeConfig};
