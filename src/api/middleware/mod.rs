pub mod logging;
pub mod rate_limit;

pub use logging::request_logger;
pub use rate_limit::{client_rate_limiter, rate_limit, ClientRateLimiter};
