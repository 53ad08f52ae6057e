pub mod handlers;
pub mod pinning;
pub mod server;
pub mod types;
pub mod upload;

pub use handlers::AppState;
pub use pinning::{PinError, PinningClient};
pub use server::{ApiConfig, ApiServer};
pub use upload::upload_collection;
