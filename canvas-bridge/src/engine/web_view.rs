//! Messages exchanged with the `web_view_process` child, and the JavaScript
//! snippets the child evaluates against the host shim.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::input::dispatch::EngineEvent;
use crate::pixels::SurfaceSize;

pub type Sender = ipc_channel::ipc::IpcSender<Event>;
pub type Receiver = ipc_channel::ipc::IpcReceiver<Event>;

/// The host shim installed into every page before any engine script runs.
pub const HOST_SCRIPT: &str = include_str!("host.js");

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptSource {
    pub name: String,
    pub source: String,
}

impl ScriptSource {
    pub fn read(path: &Path) -> Result<Self, EngineError> {
        let source = fs::read_to_string(path).map_err(|err| {
            EngineError::Launch(format!(
                "failed to read script '{}': {}",
                path.display(),
                err
            ))
        })?;

        Ok(Self {
            name: path.display().to_string(),
            source,
        })
    }
}

/// Everything the child needs to (re)build the page.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub scripts: Vec<ScriptSource>,
    pub show_window: bool,
    pub devtools: bool,
}

impl PageConfig {
    pub fn read(
        paths: &[PathBuf],
        show_window: bool,
        devtools: bool,
    ) -> Result<Self, EngineError> {
        let scripts = paths
            .iter()
            .map(|path| ScriptSource::read(path))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            scripts,
            show_window,
            devtools,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Parent → child: load (or reload) the page with these scripts.
    Load(PageConfig),
    CreateSurface { width: u32, height: u32 },
    DestroySurface,
    Dispatch(EngineEvent),
    RequestPixels { width: u32, height: u32 },
    Quit,

    /// Child → parent: every script loaded.
    Ready,
    /// Child → parent: a bottom-up RGBA8 read of the canvas.
    Pixels {
        width: u32,
        height: u32,
        data: Vec<u8>,
    },
    ScriptError(String),
}

/// Messages posted by the host shim through `window.ipc.postMessage`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PageMessage {
    Ready,
    Pixels {
        width: u32,
        height: u32,
        /// Base64 encoded RGBA8.
        data: String,
    },
    ScriptError {
        script: String,
        message: String,
    },
    Log {
        level: String,
        message: String,
    },
}

pub fn parse_page_message(message: &str) -> Result<PageMessage, String> {
    serde_json::from_str(message).map_err(|err| {
        format!("invalid web-view message '{}': {}", message, err)
    })
}

pub fn create_surface_script(size: SurfaceSize) -> String {
    format!(
        "window.canvasBridge.createSurface({}, {});",
        size.width, size.height
    )
}

pub fn destroy_surface_script() -> &'static str {
    "window.canvasBridge.destroySurface();"
}

pub fn read_pixels_script(size: SurfaceSize) -> String {
    format!(
        "window.canvasBridge.readPixels({}, {});",
        size.width, size.height
    )
}

pub fn dispatch_script(event: &EngineEvent) -> Result<String, String> {
    serde_json::to_string(event)
        .map(|json| format!("window.canvasBridge.dispatch({});", json))
        .map_err(|err| format!("failed to serialize engine event: {}", err))
}

/// The page document: creates the surface at `size` and then loads the
/// scripts in order.
pub fn page_html(size: SurfaceSize, config: &PageConfig) -> Result<String, String> {
    let scripts = serde_json::to_string(&config.scripts)
        .map_err(|err| format!("failed to serialize scripts: {}", err))?;

    Ok(format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html><head><meta charset=\"utf-8\"></head><body>\n",
            "<script>\n",
            "window.canvasBridge.createSurface({}, {});\n",
            "window.canvasBridge.loadScripts({});\n",
            "</script>\n",
            "</body></html>\n"
        ),
        size.width,
        size.height,
        escape_script_text(&scripts)
    ))
}

/// Keeps embedded JSON from closing the surrounding `<script>` element.
fn escape_script_text(json: &str) -> String {
    json.replace("</", "<\\/")
}
