pub mod app;
pub mod bridge;
pub mod state;
