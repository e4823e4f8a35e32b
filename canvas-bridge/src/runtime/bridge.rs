use crate::config::BridgeConfig;
use crate::engine::Engine;
use crate::engine::ready::ReadyListener;
use crate::engine::registry::SurfaceRegistry;
use crate::error::{EngineError, TransferError};
use crate::framework::logging::*;
use crate::input::dispatch::{Dispatcher, DrainReport};
use crate::input::queue::EventQueue;
use crate::input::state::InputState;
use crate::input::synth::{EventSynthesizer, NativeMessage};
use crate::pixels::{PixelBridge, PixelBuffer, SurfaceSize};
use crate::runtime::state::LoopState;

/// What one tick of the frame loop produced.
#[derive(Debug)]
pub enum Tick<'a> {
    /// The engine has not signalled ready; nothing was dispatched or read.
    Waiting,
    /// A fresh snapshot to upload and present.
    Frame(&'a PixelBuffer),
    /// The transfer failed; keep presenting the previous contents.
    Skipped(TransferError),
    Terminated,
}

/// The GPU-free half of the frame loop.
///
/// Owns the input state, the event queue and the pixel buffer, and drives the
/// engine through surface creation, per-tick dispatch and read-back, resize
/// and teardown. The window runner feeds it native messages and presents
/// whatever [`Bridge::tick`] returns.
pub struct Bridge<E: Engine> {
    engine: E,
    ready: ReadyListener,
    state: LoopState,
    input: InputState,
    queue: EventQueue,
    synthesizer: EventSynthesizer,
    dispatcher: Dispatcher,
    registry: SurfaceRegistry,
    pixels: PixelBridge,
    size: SurfaceSize,
    last_drain: DrainReport,
    reported_abandoned: bool,
    fault: Option<EngineError>,
}

impl<E: Engine> Bridge<E> {
    pub fn new(engine: E, ready: ReadyListener, config: &BridgeConfig) -> Self {
        let size = config.window.size();

        Self {
            engine,
            ready,
            state: LoopState::Uninitialized,
            input: InputState::new(),
            queue: EventQueue::new(),
            synthesizer: EventSynthesizer::new(),
            dispatcher: config.input.dispatcher(),
            registry: SurfaceRegistry::new(),
            pixels: PixelBridge::new(size),
            size,
            last_drain: DrainReport::default(),
            reported_abandoned: false,
            fault: None,
        }
    }

    /// Creates the engine surface and pixel buffer at `size` and starts
    /// waiting for the engine. Called once the window and GPU context exist.
    pub fn attach(&mut self, size: SurfaceSize) -> Result<(), EngineError> {
        if self.state != LoopState::Uninitialized {
            warn!("bridge already attached ({})", self.state);
            return Ok(());
        }

        let size = if size.is_empty() { self.size } else { size };

        self.registry.create(&mut self.engine, size)?;
        self.pixels.reallocate(size);
        self.size = size;
        self.transition(LoopState::WaitingForEngineReady);

        info!("bridge attached at {}", size);

        Ok(())
    }

    /// Applies one native message. Input is turned into queued records;
    /// resizes are applied immediately.
    pub fn handle(&mut self, message: NativeMessage) -> Result<(), EngineError> {
        if self.state.is_terminal() {
            return Ok(());
        }

        if let NativeMessage::Resize(size) = message {
            return self.resize(size).map(|_| ());
        }

        self.synthesizer
            .synthesize(&mut self.input, message, &mut self.queue);

        Ok(())
    }

    /// Recreates the engine surface and reallocates the pixel buffer at
    /// `size`. Returns whether anything changed; zero-area and unchanged
    /// sizes are ignored.
    pub fn resize(&mut self, size: SurfaceSize) -> Result<bool, EngineError> {
        if size.is_empty() {
            debug!("ignoring zero-area resize");
            return Ok(false);
        }

        if size == self.size && !self.surface_missing() {
            return Ok(false);
        }

        match self.state {
            LoopState::Uninitialized => {
                self.size = size;
                self.pixels.reallocate(size);
                return Ok(true);
            }
            LoopState::Terminated | LoopState::Resizing => return Ok(false),
            LoopState::WaitingForEngineReady | LoopState::Running => {}
        }

        let running = self.state == LoopState::Running;
        if running {
            self.transition(LoopState::Resizing);
        }

        info!("resizing {} -> {}", self.size, size);

        // The new size is kept even if creation fails; `tick` keeps retrying.
        let result = self.registry.resize(&mut self.engine, size);
        self.pixels.reallocate(size);
        self.size = size;

        if running {
            self.transition(LoopState::Running);
        }

        if let Err(err) = &result {
            warn!("engine surface lost at {}: {}", size, err);
        }

        result.map(|_| true)
    }

    /// Runs one frame: engine housekeeping, input dispatch and pixel
    /// transfer, in that order.
    pub fn tick(&mut self) -> Tick<'_> {
        match self.state {
            LoopState::Terminated => return Tick::Terminated,
            LoopState::Uninitialized | LoopState::Resizing => {
                return Tick::Waiting;
            }
            LoopState::WaitingForEngineReady | LoopState::Running => {}
        }

        if let Err(err) = self.engine.pump() {
            error!("engine failed: {}", err);
            self.fault = Some(err);
            self.terminate();
            return Tick::Terminated;
        }

        if self.surface_missing() {
            if let Err(err) = self.registry.create(&mut self.engine, self.size) {
                debug!("engine surface still unavailable: {}", err);
                return Tick::Skipped(TransferError::Engine(err));
            }
            info!("recreated engine surface at {}", self.size);
        }

        if self.state == LoopState::WaitingForEngineReady {
            if !self.ready.poll() {
                self.report_abandoned();
                self.dispatcher.discard_pending(&mut self.queue);
                return Tick::Waiting;
            }

            info!("engine ready");
            self.transition(LoopState::Running);
        }

        self.last_drain = self.dispatcher.drain(&mut self.queue, &mut self.engine);

        match self.pixels.transfer(&self.registry, &mut self.engine) {
            Ok(buffer) => Tick::Frame(buffer),
            Err(err) => Tick::Skipped(err),
        }
    }

    /// Destroys the engine surface and stops the loop. Idempotent.
    pub fn terminate(&mut self) {
        if self.state.is_terminal() {
            return;
        }

        self.registry.destroy(&mut self.engine);
        let dropped = self.queue.clear();
        if dropped > 0 {
            debug!("dropped {} undelivered input events at shutdown", dropped);
        }

        self.transition(LoopState::Terminated);
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn input_state(&self) -> &InputState {
        &self.input
    }

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn registry(&self) -> &SurfaceRegistry {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn last_drain(&self) -> DrainReport {
        self.last_drain
    }

    /// The engine failure that terminated the loop, if any.
    pub fn take_fault(&mut self) -> Option<EngineError> {
        self.fault.take()
    }

    fn surface_missing(&self) -> bool {
        matches!(
            self.state,
            LoopState::WaitingForEngineReady | LoopState::Running
        ) && self.registry.current().is_none()
    }

    fn transition(&mut self, next: LoopState) -> bool {
        if !self.state.can_transition_to(next) {
            warn!("refusing loop transition {} -> {}", self.state, next);
            return false;
        }

        trace!("loop {} -> {}", self.state, next);
        self.state = next;
        true
    }

    fn report_abandoned(&mut self) {
        if self.ready.is_abandoned() && !self.reported_abandoned {
            error!("engine went away before signalling ready");
            self.reported_abandoned = true;
        }
    }
}

impl<E: Engine> Drop for Bridge<E> {
    fn drop(&mut self) {
        self.terminate();
    }
}
