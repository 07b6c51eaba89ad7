pub mod config;
pub mod error;
pub mod tools;
pub mod version;

pub use config::LizmapConfig;
pub use error::LizmapError;
pub use tools::{EnvSource, ProcessEnv, check_environment_variable, to_bool};
pub use version::QgisVersion;
