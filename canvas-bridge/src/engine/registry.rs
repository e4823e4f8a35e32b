use super::OffscreenSurface;
use crate::error::{EngineError, TransferError};
use crate::framework::logging::*;
use crate::pixels::SurfaceSize;

/// Identifies one incarnation of the engine's off-screen surface.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SurfaceHandle {
    pub generation: u64,
    pub size: SurfaceSize,
}

/// Owns the lifecycle of the engine's off-screen surface.
///
/// The surface is never mutated in place: a resize destroys it and creates a
/// new one under a new generation, so handles taken before the resize stop
/// being readable.
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    generation: u64,
    current: Option<SurfaceHandle>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create<E>(
        &mut self,
        engine: &mut E,
        size: SurfaceSize,
    ) -> Result<SurfaceHandle, EngineError>
    where
        E: OffscreenSurface + ?Sized,
    {
        if self.current.is_some() {
            self.destroy(engine);
        }

        engine.create_surface(size)?;

        self.generation += 1;
        let handle = SurfaceHandle {
            generation: self.generation,
            size,
        };
        self.current = Some(handle);

        debug!(
            "created engine surface {} (generation {})",
            size, handle.generation
        );

        Ok(handle)
    }

    pub fn resize<E>(
        &mut self,
        engine: &mut E,
        size: SurfaceSize,
    ) -> Result<SurfaceHandle, EngineError>
    where
        E: OffscreenSurface + ?Sized,
    {
        self.destroy(engine);
        self.create(engine, size)
    }

    pub fn destroy<E>(&mut self, engine: &mut E)
    where
        E: OffscreenSurface + ?Sized,
    {
        if let Some(handle) = self.current.take() {
            engine.destroy_surface();
            debug!("destroyed engine surface generation {}", handle.generation);
        }
    }

    pub fn current(&self) -> Option<SurfaceHandle> {
        self.current
    }

    pub fn read_pixels<E>(
        &self,
        engine: &mut E,
        handle: &SurfaceHandle,
        out: &mut [u8],
    ) -> Result<(), TransferError>
    where
        E: OffscreenSurface + ?Sized,
    {
        let current = self.current.ok_or(TransferError::NoSurface)?;

        if handle.generation != current.generation {
            return Err(TransferError::StaleHandle {
                handle: handle.generation,
                current: current.generation,
            });
        }

        if out.len() != current.size.byte_len() {
            return Err(TransferError::BufferLength {
                expected: current.size.byte_len(),
                actual: out.len(),
            });
        }

        engine.read_pixels(current.size, out)?;

        Ok(())
    }
}
