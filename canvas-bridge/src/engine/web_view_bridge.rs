use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use ipc_channel::ipc::{IpcOneShotServer, IpcReceiver, IpcSender};

use super::ready::{ReadyListener, ReadyNotifier, ready_channel};
use super::script_watch::ScriptWatch;
use super::web_view::{Event, PageConfig};
use super::{Engine, OffscreenSurface, RowOrder, VirtualInput};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::framework::logging::*;
use crate::input::dispatch::EngineEvent;
use crate::pixels::SurfaceSize;

type Bootstrap = (IpcSender<Event>, IpcReceiver<Event>);

struct Snapshot {
    size: SurfaceSize,
    data: Vec<u8>,
}

#[derive(Default)]
struct Shared {
    input_ready: AtomicBool,
    disconnected: AtomicBool,
    latest: Mutex<Option<Snapshot>>,
}

/// An engine hosted by a wry web view in the `web_view_process` child.
///
/// Scripts run against an off-screen WebGL2 canvas. Surface, input and
/// read-back requests travel over `ipc-channel`; the most recent pixel
/// snapshot the child sent is kept here and served to
/// [`OffscreenSurface::read_pixels`], which asks for a fresh one each time.
pub struct WebViewEngine {
    child: Child,
    to_child: IpcSender<Event>,
    shared: Arc<Shared>,
    inbound_handle: Option<JoinHandle<()>>,
    scripts: Vec<PathBuf>,
    show_window: bool,
    devtools: bool,
    watch: Option<ScriptWatch>,
}

impl WebViewEngine {
    pub fn launch(
        config: &EngineConfig,
    ) -> Result<(Self, ReadyListener), EngineError> {
        let page = PageConfig::read(
            &config.scripts,
            config.show_window,
            config.devtools,
        )?;

        let (server, server_name) = IpcOneShotServer::<Bootstrap>::new()
            .map_err(|err| {
                EngineError::Launch(format!(
                    "failed to create IPC bootstrap: {}",
                    err
                ))
            })?;

        let mut child =
            spawn_web_view_process(&server_name, config.web_view_bin.as_ref())?;

        pipe_child_logs(&mut child);

        let (_bootstrap_rx, (to_child, from_child)): (
            IpcReceiver<Bootstrap>,
            Bootstrap,
        ) = server.accept().map_err(|err| {
            EngineError::Launch(format!(
                "failed to accept web-view bootstrap: {}",
                err
            ))
        })?;

        info!("web-view process connected");

        let shared = Arc::new(Shared::default());
        let (notifier, listener) = ready_channel();
        let inbound_handle =
            spawn_inbound(from_child, shared.clone(), notifier);

        to_child.send(Event::Load(page)).map_err(|err| {
            EngineError::Launch(format!("failed to send scripts: {}", err))
        })?;

        let watch = if config.watch_scripts && !config.scripts.is_empty() {
            match ScriptWatch::start(&config.scripts) {
                Ok(watch) => Some(watch),
                Err(err) => {
                    warn!("script hot reload disabled: {}", err);
                    None
                }
            }
        } else {
            None
        };

        let engine = Self {
            child,
            to_child,
            shared,
            inbound_handle: Some(inbound_handle),
            scripts: config.scripts.clone(),
            show_window: config.show_window,
            devtools: config.devtools,
            watch,
        };

        Ok((engine, listener))
    }

    /// Re-reads the scripts and rebuilds the page. Input is held until the
    /// page reports ready again.
    pub fn reload(&mut self) -> Result<(), EngineError> {
        let page =
            PageConfig::read(&self.scripts, self.show_window, self.devtools)?;

        self.shared.input_ready.store(false, Ordering::Release);
        self.send(Event::Load(page))?;

        info!("reloading {} engine scripts", self.scripts.len());

        Ok(())
    }

    fn send(&self, event: Event) -> Result<(), EngineError> {
        if self.shared.disconnected.load(Ordering::Acquire) {
            return Err(EngineError::Disconnected(
                "web-view process has exited".to_string(),
            ));
        }

        self.to_child
            .send(event)
            .map_err(|err| EngineError::Disconnected(err.to_string()))
    }
}

impl VirtualInput for WebViewEngine {
    fn is_input_ready(&self) -> bool {
        self.shared.input_ready.load(Ordering::Acquire)
            && !self.shared.disconnected.load(Ordering::Acquire)
    }

    fn deliver(&mut self, event: &EngineEvent) -> Result<(), EngineError> {
        if !self.is_input_ready() {
            return Err(EngineError::NotReady);
        }

        self.send(Event::Dispatch(event.clone()))
    }
}

impl OffscreenSurface for WebViewEngine {
    fn create_surface(&mut self, size: SurfaceSize) -> Result<(), EngineError> {
        self.send(Event::CreateSurface {
            width: size.width,
            height: size.height,
        })
    }

    fn destroy_surface(&mut self) {
        if let Ok(mut latest) = self.shared.latest.lock() {
            *latest = None;
        }

        if let Err(err) = self.send(Event::DestroySurface) {
            debug!("destroy surface not sent: {}", err);
        }
    }

    fn read_pixels(
        &mut self,
        size: SurfaceSize,
        out: &mut [u8],
    ) -> Result<(), EngineError> {
        self.send(Event::RequestPixels {
            width: size.width,
            height: size.height,
        })?;

        let latest = self.shared.latest.lock().map_err(|err| {
            EngineError::Disconnected(format!(
                "pixel snapshot lock poisoned: {}",
                err
            ))
        })?;

        match latest.as_ref() {
            Some(snapshot)
                if snapshot.size == size && snapshot.data.len() == out.len() =>
            {
                out.copy_from_slice(&snapshot.data);
                Ok(())
            }
            _ => Err(EngineError::NoFrame(size)),
        }
    }

    fn row_order(&self) -> RowOrder {
        RowOrder::BottomUp
    }
}

impl Engine for WebViewEngine {
    fn pump(&mut self) -> Result<(), EngineError> {
        if self.shared.disconnected.load(Ordering::Acquire) {
            return Err(EngineError::Disconnected(
                "web-view process has exited".to_string(),
            ));
        }

        let changed = self
            .watch
            .as_ref()
            .is_some_and(|watch| watch.take_changed());

        if changed {
            if let Err(err) = self.reload() {
                warn!("keeping current page: {}", err);
            }
        }

        Ok(())
    }
}

impl Drop for WebViewEngine {
    fn drop(&mut self) {
        debug!("shutting down web-view engine");

        let _ = self.to_child.send(Event::Quit);
        let _ = self.child.kill();
        let _ = self.child.wait();

        if let Some(handle) = self.inbound_handle.take() {
            let _ = handle.join();
        }
    }
}

fn spawn_inbound(
    from_child: IpcReceiver<Event>,
    shared: Arc<Shared>,
    notifier: ReadyNotifier,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut notifier = Some(notifier);

        while let Ok(event) = from_child.recv() {
            match event {
                Event::Ready => {
                    info!("engine scripts loaded");
                    shared.input_ready.store(true, Ordering::Release);
                    if let Some(notifier) = notifier.take() {
                        notifier.notify();
                    }
                }
                Event::Pixels {
                    width,
                    height,
                    data,
                } => {
                    trace!("received {}x{} pixel snapshot", width, height);
                    if let Ok(mut latest) = shared.latest.lock() {
                        *latest = Some(Snapshot {
                            size: SurfaceSize::new(width, height),
                            data,
                        });
                    }
                }
                Event::ScriptError(message) => {
                    error!("engine script failed: {}", message);
                }
                Event::Quit => {
                    warn!("web-view window was closed");
                    break;
                }
                other => {
                    warn!("unexpected event from web-view process: {:?}", other);
                }
            }
        }

        shared.input_ready.store(false, Ordering::Release);
        shared.disconnected.store(true, Ordering::Release);
    })
}

fn spawn_web_view_process(
    server_name: &str,
    prebuilt: Option<&PathBuf>,
) -> Result<Child, EngineError> {
    let mut command = match prebuilt {
        Some(bin) => {
            let mut command = Command::new(bin);
            command.arg(server_name);
            command
        }
        None => {
            let mut command = Command::new("cargo");
            command
                .args([
                    "run",
                    "--features",
                    "web_view_process",
                    "--bin",
                    "web_view_process",
                    "--",
                    server_name,
                ])
                .current_dir(env!("CARGO_MANIFEST_DIR"));
            command
        }
    };

    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    command.spawn().map_err(|err| {
        EngineError::Launch(format!(
            "failed to launch web-view process: {}",
            err
        ))
    })
}

fn pipe_child_logs(child: &mut Child) {
    if let Some(stdout) = child.stdout.take() {
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines().map_while(Result::ok) {
                println!("[web-view] {}", line);
            }
        });
    }

    if let Some(stderr) = child.stderr.take() {
        thread::spawn(move || {
            let reader = BufReader::new(stderr);
            for line in reader.lines().map_while(Result::ok) {
                eprintln!("[web-view] {}", line);
            }
        });
    }
}
