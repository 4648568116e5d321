pub mod rate_limit;

pub use rate_limit::{search_limiter, write_limiter, RateLimiter};
