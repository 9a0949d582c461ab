// Database layer: PostgreSQL pool and per-table repositories

pub mod pool;
pub mod repositories;

pub use pool::DbPool;
