pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod telegram;

pub use routes::build_router;
