pub mod banner;
pub mod errors;
pub mod http;
pub mod types;

pub use errors::{ApiError, StoreError, YtDlpError};
