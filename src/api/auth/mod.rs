pub mod credentials;
pub mod csrf;
pub mod middleware;
pub mod rate_limit;
pub mod token;

pub use credentials::Credentials;
pub use csrf::CsrfGuard;
pub use rate_limit::LoginRateLimiter;
pub use token::TokenService;
