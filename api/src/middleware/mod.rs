mod auth;
mod metrics;

pub use auth::auth_middleware;
pub use metrics::track_requests;
