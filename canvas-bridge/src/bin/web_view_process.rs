use std::cell::Cell;
use std::error::Error;
use std::rc::Rc;
use std::time::{Duration, Instant};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use canvas_bridge::engine::web_view::{self as wv, PageConfig, PageMessage};
use canvas_bridge::framework::logging::init_logger;
use canvas_bridge::pixels::SurfaceSize;
use ipc_channel::ipc::{self, IpcSender, TryRecvError};
use tao::dpi::LogicalSize;
use tao::event::{Event, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop};
use tao::window::{Window, WindowBuilder};
use wry::{WebView, WebViewBuilder};

const POLL_INTERVAL: Duration = Duration::from_millis(2);
const BLANK_PAGE: &str = "<!DOCTYPE html><html><body></body></html>";

fn main() -> Result<(), Box<dyn Error>> {
    init_logger();
    log::info!("Starting canvas-bridge web_view_process");

    let server_name = std::env::args()
        .nth(1)
        .ok_or("missing IPC bootstrap server name argument")?;

    let (to_parent, receiver) = setup_ipc_connection(server_name)?;
    let event_loop = EventLoop::new();

    let window = WindowBuilder::new()
        .with_title("Canvas Bridge Engine")
        .with_inner_size(LogicalSize::new(640, 480))
        .with_visible(false)
        .build(&event_loop)?;

    let loaded = Rc::new(Cell::new(false));

    let ipc_sender = to_parent.clone();
    let page_loaded = loaded.clone();
    let web_view = WebViewBuilder::new()
        .with_initialization_script(wv::HOST_SCRIPT)
        .with_ipc_handler(move |message| {
            if let Some(event) = page_event(message.body(), &page_loaded) {
                if let Err(err) = ipc_sender.send(event) {
                    log::error!("failed to forward page message: {}", err);
                }
            }
        })
        .with_html(BLANK_PAGE)
        .build(&window)?;

    let mut host = Host {
        window,
        web_view,
        page: None,
        size: None,
        loaded,
    };

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::WaitUntil(Instant::now() + POLL_INTERVAL);

        loop {
            match receiver.try_recv() {
                Ok(wv::Event::Quit) => {
                    log::info!(
                        "received quit from parent; shutting down web-view process"
                    );
                    *control_flow = ControlFlow::Exit;
                    return;
                }
                Ok(event) => host.apply(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::IpcError(err)) => {
                    log::error!("lost connection to parent: {:?}", err);
                    *control_flow = ControlFlow::Exit;
                    return;
                }
            }
        }

        if let Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } = event
        {
            let _ = to_parent.send(wv::Event::Quit);
            *control_flow = ControlFlow::Exit;
        }
    });
}

struct Host {
    window: Window,
    web_view: WebView,
    page: Option<PageConfig>,
    size: Option<SurfaceSize>,
    /// The current page has finished running its scripts, successfully or
    /// not.
    loaded: Rc<Cell<bool>>,
}

impl Host {
    fn apply(&mut self, event: wv::Event) {
        match event {
            wv::Event::Load(page) => {
                self.window.set_visible(page.show_window);
                if page.devtools {
                    self.web_view.open_devtools();
                }
                self.page = Some(page);
                self.load_page();
            }
            wv::Event::CreateSurface { width, height } => {
                let size = SurfaceSize::new(width, height);
                self.size = Some(size);
                self.window
                    .set_inner_size(LogicalSize::new(width, height));

                if self.loaded.get() {
                    self.evaluate(&wv::create_surface_script(size));
                } else {
                    self.load_page();
                }
            }
            wv::Event::DestroySurface => {
                self.size = None;
                if self.loaded.get() {
                    self.evaluate(wv::destroy_surface_script());
                }
            }
            wv::Event::Dispatch(engine_event) => {
                if !self.loaded.get() {
                    return;
                }
                match wv::dispatch_script(&engine_event) {
                    Ok(script) => self.evaluate(&script),
                    Err(err) => log::error!("{}", err),
                }
            }
            wv::Event::RequestPixels { width, height } => {
                if self.loaded.get() {
                    self.evaluate(&wv::read_pixels_script(SurfaceSize::new(
                        width, height,
                    )));
                }
            }
            other => {
                log::warn!("unexpected event from parent: {:?}", other);
            }
        }
    }

    /// Rebuilds the document once both the scripts and the surface size are
    /// known.
    fn load_page(&mut self) {
        let (Some(page), Some(size)) = (self.page.as_ref(), self.size) else {
            return;
        };

        let html = match wv::page_html(size, page) {
            Ok(html) => html,
            Err(err) => {
                log::error!("{}", err);
                return;
            }
        };

        self.loaded.set(false);

        if let Err(err) = self.web_view.load_html(&html) {
            log::error!("failed to load page: {:?}", err);
        }
    }

    fn evaluate(&self, script: &str) {
        if let Err(err) = self.web_view.evaluate_script(script) {
            log::error!("failed to evaluate script in web view: {:?}", err);
        }
    }
}

fn page_event(body: &str, loaded: &Cell<bool>) -> Option<wv::Event> {
    let message = match wv::parse_page_message(body) {
        Ok(message) => message,
        Err(err) => {
            log::error!("{}", err);
            return None;
        }
    };

    match message {
        PageMessage::Ready => {
            loaded.set(true);
            Some(wv::Event::Ready)
        }
        PageMessage::ScriptError { script, message } => {
            loaded.set(true);
            Some(wv::Event::ScriptError(format!("{}: {}", script, message)))
        }
        PageMessage::Pixels {
            width,
            height,
            data,
        } => match STANDARD.decode(data) {
            Ok(data) => Some(wv::Event::Pixels {
                width,
                height,
                data,
            }),
            Err(err) => {
                log::error!("invalid pixel payload: {}", err);
                None
            }
        },
        PageMessage::Log { level, message } => {
            match level.as_str() {
                "error" => log::error!("[page] {}", message),
                "warn" => log::warn!("[page] {}", message),
                _ => log::info!("[page] {}", message),
            }
            None
        }
    }
}

fn setup_ipc_connection(
    server_name: String,
) -> Result<(wv::Sender, wv::Receiver), ipc_channel::Error> {
    let (to_child, from_parent): (wv::Sender, wv::Receiver) = ipc::channel()?;
    let (to_parent, from_child): (wv::Sender, wv::Receiver) = ipc::channel()?;
    let bootstrap = IpcSender::connect(server_name)?;
    bootstrap.send((to_child, from_child))?;
    Ok((to_parent, from_parent))
}
