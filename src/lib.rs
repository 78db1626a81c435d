pub mod coders;
pub mod config;
pub mod publication;
pub mod social;
