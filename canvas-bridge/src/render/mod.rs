pub mod frame;
pub mod shader;
pub mod texture;
