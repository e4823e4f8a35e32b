pub use crate::config::{
    BridgeConfig, EngineConfig, InputConfig, PresentConfig, WindowConfig,
};
pub use crate::engine::ready::{ReadyListener, ReadyNotifier, ready_channel};
pub use crate::engine::registry::{SurfaceHandle, SurfaceRegistry};
pub use crate::engine::web_view_bridge::WebViewEngine;
pub use crate::engine::{Engine, OffscreenSurface, RowOrder, VirtualInput};
pub use crate::error::{
    BridgeError, ConfigError, EngineError, PresentError, ShaderError,
    TransferError,
};
pub use crate::framework::logging::init_logger;
pub use crate::framework::logging::{debug, error, info, trace, warn};
pub use crate::input::dispatch::{
    DeliveryClass, Dispatcher, DrainPolicy, DrainReport, EngineEvent,
};
pub use crate::input::event::{EventKind, InputEvent, Modifiers, MouseButton};
pub use crate::input::queue::EventQueue;
pub use crate::input::state::InputState;
pub use crate::input::synth::{EventSynthesizer, KeyId, NativeMessage};
pub use crate::pixels::{PixelBridge, PixelBuffer, SurfaceSize};
pub use crate::runtime::app::run;
pub use crate::runtime::bridge::{Bridge, Tick};
pub use crate::runtime::state::LoopState;
