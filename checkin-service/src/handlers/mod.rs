pub mod admin;
pub mod checkin;
pub mod export;
pub mod metrics;
pub mod token;
