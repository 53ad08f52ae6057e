pub mod error;
pub mod orchestrator;
pub mod registry;

pub use error::{DeployError, classify_provider_error};
pub use orchestrator::{DeployOptions, DeployRequest, Deployer, Deployment};
pub use registry::{ContractRegistry, DeployedContract};
