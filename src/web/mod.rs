//! HTTP API for the modpack host.
//!
//! Route names and response shapes are fixed by existing launcher clients.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
