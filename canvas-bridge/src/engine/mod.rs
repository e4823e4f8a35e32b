//! The embedded engine seam.
//!
//! An engine owns an off-screen drawing surface the native side cannot present
//! directly, and accepts synthesized input. The bridge drives it through the
//! two traits below and never looks at what the engine renders.

pub mod ready;
pub mod registry;
pub mod script_watch;
pub mod web_view;
pub mod web_view_bridge;

use crate::error::EngineError;
use crate::input::dispatch::EngineEvent;
use crate::pixels::SurfaceSize;

/// Vertical order of the rows an engine writes into a pixel buffer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RowOrder {
    /// First row is the top of the image.
    #[default]
    TopDown,
    /// First row is the bottom of the image, as `gl.readPixels` produces.
    BottomUp,
}

impl RowOrder {
    pub fn is_bottom_up(self) -> bool {
        self == Self::BottomUp
    }
}

/// The engine's virtual input surface.
pub trait VirtualInput {
    /// Whether the engine can accept events right now.
    fn is_input_ready(&self) -> bool;

    /// Delivers one event. [`EngineError::NotReady`] means the surface vanished
    /// and the event was not consumed.
    fn deliver(&mut self, event: &EngineEvent) -> Result<(), EngineError>;
}

/// The engine's off-screen drawing surface.
pub trait OffscreenSurface {
    fn create_surface(&mut self, size: SurfaceSize) -> Result<(), EngineError>;

    fn destroy_surface(&mut self);

    /// Synchronously copies the current surface contents into `out`, which is
    /// exactly `size.byte_len()` bytes of RGBA8.
    fn read_pixels(
        &mut self,
        size: SurfaceSize,
        out: &mut [u8],
    ) -> Result<(), EngineError>;

    fn row_order(&self) -> RowOrder {
        RowOrder::TopDown
    }
}

pub trait Engine: VirtualInput + OffscreenSurface {
    /// Housekeeping run at the start of every tick, before input is drained.
    /// An error is fatal: the frame loop terminates.
    fn pump(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}
