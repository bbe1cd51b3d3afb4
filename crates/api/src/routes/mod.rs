//! API routes

pub mod hazards;
pub mod monitor;
pub mod samples;
