use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use super::bridge::{Bridge, Tick};
use crate::config::BridgeConfig;
use crate::engine::Engine;
use crate::engine::ready::ReadyListener;
use crate::error::{BridgeError, TransferError};
use crate::framework::logging::*;
use crate::input::native::native_message;
use crate::pixels::SurfaceSize;
use crate::render::frame::Frame;
use crate::render::shader::load_shader;
use crate::render::texture::PresentationTexture;

/// Opens the window, attaches `engine` and runs the frame loop until the
/// window closes. Fatal errors raised inside winit callbacks are returned
/// once the event loop has exited.
pub fn run<E: Engine + 'static>(
    config: BridgeConfig,
    engine: E,
    ready: ReadyListener,
) -> Result<(), BridgeError> {
    let event_loop = EventLoop::new()
        .map_err(|err| BridgeError::EventLoop(err.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let bridge = Bridge::new(engine, ready, &config);
    let mut runner = Runner::new(config, bridge);

    event_loop
        .run_app(&mut runner)
        .map_err(|err| BridgeError::EventLoop(err.to_string()))?;

    match runner.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct Gpu {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    presentation: PresentationTexture,
}

struct Runner<E: Engine> {
    config: BridgeConfig,
    bridge: Bridge<E>,
    window: Option<Arc<Window>>,
    window_id: Option<WindowId>,
    gpu: Option<Gpu>,
    fatal: Option<BridgeError>,
}

impl<E: Engine> Runner<E> {
    fn new(config: BridgeConfig, bridge: Bridge<E>) -> Self {
        Self {
            config,
            bridge,
            window: None,
            window_id: None,
            gpu: None,
            fatal: None,
        }
    }

    fn init_runtime(
        &mut self,
        event_loop: &ActiveEventLoop,
    ) -> Result<(), BridgeError> {
        let window_config = &self.config.window;
        let attrs = WindowAttributes::default()
            .with_title(window_config.title.clone())
            .with_inner_size(LogicalSize::new(
                window_config.width,
                window_config.height,
            ));

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|err| BridgeError::Window(err.to_string()))?,
        );

        let instance =
            wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let surface = instance
            .create_surface(window.clone())
            .map_err(|err| BridgeError::Gpu(err.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(
            &wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            },
        ))
        .map_err(|err| BridgeError::Gpu(err.to_string()))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("canvas-bridge-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::default(),
            },
        ))
        .map_err(|err| BridgeError::Gpu(err.to_string()))?;

        let inner = window.inner_size();
        let size = SurfaceSize::new(inner.width.max(1), inner.height.max(1));

        let caps = surface.get_capabilities(&adapter);
        let format = choose_surface_format(&caps.formats).ok_or_else(|| {
            BridgeError::Gpu("surface has no supported formats".to_string())
        })?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: if self.config.present.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &surface_config);

        let presentation = self.create_presentation(&device, format, size)?;

        self.bridge.attach(size)?;

        info!("window created at {} ({:?})", size, format);

        self.window_id = Some(window.id());
        self.window = Some(window);
        self.gpu = Some(Gpu {
            device: Arc::new(device),
            queue: Arc::new(queue),
            surface,
            surface_config,
            presentation,
        });

        Ok(())
    }

    /// Tries the configured shader first and falls back to the built-in one.
    fn create_presentation(
        &self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: SurfaceSize,
    ) -> Result<PresentationTexture, BridgeError> {
        if let Some(path) = self.config.present.shader.as_ref() {
            let custom = load_shader(path).and_then(|source| {
                PresentationTexture::with_shader(device, format, size, &source)
            });

            match custom {
                Ok(presentation) => {
                    info!("using presentation shader {}", path.display());
                    return Ok(presentation);
                }
                Err(err) => {
                    error!(
                        "presentation shader '{}' failed, using built-in: {}",
                        path.display(),
                        err
                    );
                }
            }
        }

        Ok(PresentationTexture::new(device, format, size)?)
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let size = SurfaceSize::new(new_size.width, new_size.height);
        if size.is_empty() {
            return;
        }

        if let Err(err) = self.bridge.resize(size) {
            warn!("engine surface resize failed: {}", err);
        }

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        gpu.surface_config.width = size.width;
        gpu.surface_config.height = size.height;
        gpu.surface.configure(gpu.device.as_ref(), &gpu.surface_config);
        gpu.presentation
            .resize(gpu.device.as_ref(), self.bridge.size());
    }

    fn render(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        match self.bridge.tick() {
            Tick::Terminated => {
                match self.bridge.take_fault() {
                    Some(err) => self.fail(event_loop, err.into()),
                    None => event_loop.exit(),
                }
                return;
            }
            Tick::Waiting => {}
            Tick::Frame(buffer) => {
                if let Err(err) =
                    gpu.presentation.upload(gpu.queue.as_ref(), buffer)
                {
                    warn!("skipping upload: {}", err);
                }
            }
            Tick::Skipped(err) => log_skipped(&err),
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(gpu.device.as_ref(), &gpu.surface_config);
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("surface timeout while acquiring frame");
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(
                    event_loop,
                    BridgeError::Gpu("surface out of memory".to_string()),
                );
                return;
            }
            Err(wgpu::SurfaceError::Other) => {
                warn!("surface error while acquiring frame");
                return;
            }
        };

        let mut frame =
            Frame::new(gpu.device.as_ref(), gpu.queue.clone(), output);
        gpu.presentation
            .draw(&mut frame, clear_color(self.config.present.clear_color));
        frame.submit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: BridgeError) {
        error!("{}", err);
        self.bridge.terminate();
        if self.fatal.is_none() {
            self.fatal = Some(err);
        }
        event_loop.exit();
    }
}

impl<E: Engine> ApplicationHandler for Runner<E> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init_runtime(event_loop) {
            self.fail(event_loop, err);
            return;
        }

        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window_id != Some(window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("close requested");
                self.bridge.terminate();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => self.resize(new_size),
            WindowEvent::RedrawRequested => self.render(event_loop),
            other => {
                if let Some(message) = native_message(&other) {
                    if let Err(err) = self.bridge.handle(message) {
                        warn!("failed to handle {:?}: {}", message, err);
                    }
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.bridge.terminate();
    }
}

fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| *f == wgpu::TextureFormat::Bgra8UnormSrgb)
        .or_else(|| formats.first().copied())
}

fn clear_color([r, g, b, a]: [f64; 4]) -> wgpu::Color {
    wgpu::Color { r, g, b, a }
}

fn log_skipped(err: &TransferError) {
    match err {
        TransferError::Engine(_) => debug!("frame skipped: {}", err),
        _ => warn!("frame skipped: {}", err),
    }
}
