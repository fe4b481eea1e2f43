pub mod client;
pub mod commands;

pub use client::{BackendClient, SummaryLength};
