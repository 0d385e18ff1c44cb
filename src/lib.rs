pub mod clock;
pub mod config;
pub mod error;
pub mod navigation;
pub mod pipeline;
pub mod resolve;
pub mod routes;
pub mod session;
pub mod state;
pub mod types;
