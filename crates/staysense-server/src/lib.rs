//! StaySense Server
//!
//! HTTP front end for the sentiment engine plus the offline training
//! command. The router is exposed as a library so it can be exercised
//! without binding a socket.

pub mod cli;
pub mod config;
pub mod routes;
pub mod state;

pub use config::{OracleConfig, ServeOverrides, ServerConfig};
pub use routes::create_router;
pub use state::AppState;
