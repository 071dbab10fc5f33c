pub mod error;
pub mod models;
pub mod platforms;

pub use error::{ErrorClass, RelayError};
pub use platforms::Platform;
