#![allow(dead_code)]

use std::env;

use canvas_bridge::prelude::*;

pub fn gpu_tests_enabled() -> bool {
    matches!(
        env::var("CANVAS_BRIDGE_RUN_GPU_TESTS")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// An engine that records everything the bridge asks of it.
///
/// Pixels are written as `[x, y, generation, 255]` (top-down unless
/// `row_order` says otherwise), so tests can check both placement and which
/// surface incarnation produced them.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub surface: Option<SurfaceSize>,
    pub created: Vec<SurfaceSize>,
    pub destroyed: usize,
    pub delivered: Vec<EngineEvent>,
    pub reads: usize,
    pub pumps: usize,
    pub row_order: RowOrder,
    /// Forces input readiness regardless of the surface.
    pub input_ready: Option<bool>,
    /// Number of upcoming `create_surface` calls that fail.
    pub failing_creates: usize,
    /// Makes `pump` report a lost engine.
    pub disconnected: bool,
}

impl RecordingEngine {
    pub fn kinds(&self) -> Vec<EventKind> {
        self.delivered.iter().map(|event| event.kind).collect()
    }
}

impl VirtualInput for RecordingEngine {
    fn is_input_ready(&self) -> bool {
        self.input_ready.unwrap_or(self.surface.is_some())
    }

    fn deliver(&mut self, event: &EngineEvent) -> Result<(), EngineError> {
        if !self.is_input_ready() {
            return Err(EngineError::NotReady);
        }
        self.delivered.push(event.clone());
        Ok(())
    }
}

impl OffscreenSurface for RecordingEngine {
    fn create_surface(&mut self, size: SurfaceSize) -> Result<(), EngineError> {
        if self.failing_creates > 0 {
            self.failing_creates -= 1;
            return Err(EngineError::NoSurface);
        }

        self.surface = Some(size);
        self.created.push(size);
        Ok(())
    }

    fn destroy_surface(&mut self) {
        self.surface = None;
        self.destroyed += 1;
    }

    fn read_pixels(
        &mut self,
        size: SurfaceSize,
        out: &mut [u8],
    ) -> Result<(), EngineError> {
        if self.surface != Some(size) {
            return Err(EngineError::NoFrame(size));
        }

        let generation = self.created.len() as u8;
        let width = size.width as usize;
        let height = size.height as usize;

        for (i, px) in out.chunks_exact_mut(4).enumerate() {
            let x = i % width;
            let row = i / width;
            let y = match self.row_order {
                RowOrder::TopDown => row,
                RowOrder::BottomUp => height - 1 - row,
            };
            px.copy_from_slice(&[x as u8, y as u8, generation, 255]);
        }

        self.reads += 1;
        Ok(())
    }

    fn row_order(&self) -> RowOrder {
        self.row_order
    }
}

impl Engine for RecordingEngine {
    fn pump(&mut self) -> Result<(), EngineError> {
        self.pumps += 1;
        if self.disconnected {
            return Err(EngineError::Disconnected("engine went away".into()));
        }
        Ok(())
    }
}

pub fn config(policy: DrainPolicy) -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.input.drain_policy = policy;
    config
}

/// A bridge attached at `size` whose engine has not signalled ready yet.
pub fn attached_bridge(
    size: SurfaceSize,
    config: &BridgeConfig,
) -> (Bridge<RecordingEngine>, ReadyNotifier) {
    let (notifier, listener) = ready_channel();
    let mut bridge = Bridge::new(RecordingEngine::default(), listener, config);
    bridge.attach(size).expect("attach bridge");
    (bridge, notifier)
}

/// A bridge that is already running.
pub fn running_bridge(size: SurfaceSize) -> Bridge<RecordingEngine> {
    let (mut bridge, notifier) =
        attached_bridge(size, &BridgeConfig::default());
    notifier.notify();
    assert!(matches!(bridge.tick(), Tick::Frame(_)));
    assert_eq!(bridge.state(), LoopState::Running);
    bridge
}

pub fn press(button: MouseButton) -> NativeMessage {
    NativeMessage::ButtonChange {
        button,
        pressed: true,
    }
}

pub fn release(button: MouseButton) -> NativeMessage {
    NativeMessage::ButtonChange {
        button,
        pressed: false,
    }
}

pub fn move_to(x: f64, y: f64) -> NativeMessage {
    NativeMessage::PointerMove { x, y }
}
