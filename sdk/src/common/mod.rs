pub mod errors;
pub mod rate_limiter;
pub mod retry;

pub use errors::{ArmError, ArmResult, ErrorDetail, HttpError};
pub use rate_limiter::{RateLimitError, RateLimiter};
pub use retry::RetryOptions;
