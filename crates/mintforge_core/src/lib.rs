pub mod config;
pub mod logging;
pub mod secrets;

pub use config::MintforgeConfig;
pub use logging::{init_logging, init_logging_to_dir};
pub use secrets::SecretStore;
