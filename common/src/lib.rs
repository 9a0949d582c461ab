// Common library shared by the API server and the scheduler

pub mod auth;
pub mod budget;
pub mod config;
pub mod dates;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod money;
pub mod report;
pub mod schedule;
pub mod scheduler;
pub mod services;
pub mod telemetry;
