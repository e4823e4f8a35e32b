pub mod dispatch;
pub mod event;
pub mod keys;
pub mod native;
pub mod queue;
pub mod state;
pub mod synth;
