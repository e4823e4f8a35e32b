use std::fmt;

use crate::engine::registry::SurfaceRegistry;
use crate::engine::{OffscreenSurface, RowOrder};
use crate::error::TransferError;
use crate::framework::logging::*;

pub const BYTES_PER_PIXEL: usize = 4;

/// Dimensions shared by the window, the engine surface, the pixel buffer and
/// the presentation texture.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn byte_len(self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }

    pub fn bytes_per_row(self) -> u32 {
        self.width * BYTES_PER_PIXEL as u32
    }

    /// A zero-area size, as reported for minimized windows.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for SurfaceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One RGBA8 snapshot of the engine surface.
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    size: SurfaceSize,
    row_order: RowOrder,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            row_order: RowOrder::TopDown,
            data: vec![0; size.byte_len()],
        }
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn row_order(&self) -> RowOrder {
        self.row_order
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGBA of the pixel at (`x`, `y`) with `y` counted from the top of the
    /// image regardless of row order.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }

        let row = match self.row_order {
            RowOrder::TopDown => y,
            RowOrder::BottomUp => self.size.height - 1 - y,
        };
        let offset = (row as usize * self.size.width as usize + x as usize)
            * BYTES_PER_PIXEL;

        self.data
            .get(offset..offset + BYTES_PER_PIXEL)
            .and_then(|px| px.try_into().ok())
    }
}

/// Moves pixels from the engine surface into a native-owned buffer once per
/// tick.
#[derive(Debug)]
pub struct PixelBridge {
    buffer: PixelBuffer,
}

impl PixelBridge {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            buffer: PixelBuffer::new(size),
        }
    }

    pub fn size(&self) -> SurfaceSize {
        self.buffer.size
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Replaces the buffer with a fresh allocation of `size`.
    pub fn reallocate(&mut self, size: SurfaceSize) {
        debug!("reallocating pixel buffer {} -> {}", self.buffer.size, size);
        self.buffer = PixelBuffer::new(size);
    }

    /// Synchronously reads the current engine surface into the buffer.
    ///
    /// The registry's current handle is fetched on every call, so a resize
    /// that has not reached the buffer yet surfaces as
    /// [`TransferError::StaleSize`] rather than a partial copy.
    pub fn transfer<E>(
        &mut self,
        registry: &SurfaceRegistry,
        engine: &mut E,
    ) -> Result<&PixelBuffer, TransferError>
    where
        E: OffscreenSurface + ?Sized,
    {
        let handle = registry.current().ok_or(TransferError::NoSurface)?;

        if handle.size != self.buffer.size {
            return Err(TransferError::StaleSize {
                buffer: self.buffer.size,
                surface: handle.size,
            });
        }

        registry.read_pixels(engine, &handle, &mut self.buffer.data)?;
        self.buffer.row_order = engine.row_order();

        Ok(&self.buffer)
    }
}
