pub mod config;
pub mod engine;
pub mod error;
pub mod framework;
pub mod input;
pub mod pixels;
pub mod prelude;
pub mod render;
pub mod runtime;

pub use runtime::app::run;
