pub mod rest;
pub mod routes;
pub mod state;

// Re-export the router builder so the binary and the tests can reach it directly.
pub use routes::app;
pub use state::AppState;
