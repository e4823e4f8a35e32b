use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use super::event::{EventKind, InputEvent};
use super::queue::EventQueue;
use crate::engine::VirtualInput;
use crate::error::EngineError;

pub const DEFAULT_WHEEL_SCALE: f64 = 50.0;

/// Which family of engine-side event object an event is delivered as.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryClass {
    Wheel,
    Pointer,
    Keyboard,
}

impl DeliveryClass {
    pub fn for_kind(kind: &str) -> Self {
        if kind == "wheel" {
            Self::Wheel
        } else if kind.starts_with("mouse") || kind.starts_with("pointer") {
            Self::Pointer
        } else {
            Self::Keyboard
        }
    }
}

/// What happens to queued input while the engine cannot receive it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrainPolicy {
    /// Keep events queued, in order, until the engine's input surface exists.
    #[default]
    Retain,
    /// Drop them.
    Discard,
}

/// The engine-facing form of an [`InputEvent`], field names matching the DOM
/// event init dictionaries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub class: DeliveryClass,
    pub client_x: f64,
    pub client_y: f64,
    pub movement_x: f64,
    pub movement_y: f64,
    pub button: i32,
    pub buttons: u8,
    pub ctrl_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    pub meta_key: bool,
    pub delta_y: f64,
    pub key_code: i32,
    pub code: String,
}

impl EngineEvent {
    pub fn from_input(event: &InputEvent, wheel_scale: f64) -> Self {
        let delta_y = if event.kind == EventKind::Wheel {
            -wheel_scale * event.wheel_delta
        } else {
            0.0
        };

        Self {
            kind: event.kind,
            class: DeliveryClass::for_kind(event.kind.as_str()),
            client_x: event.position[0],
            client_y: event.position[1],
            movement_x: event.movement[0],
            movement_y: event.movement[1],
            button: event.button,
            buttons: event.button_mask,
            ctrl_key: event.modifiers.ctrl,
            shift_key: event.modifiers.shift,
            alt_key: event.modifiers.alt,
            meta_key: event.modifiers.meta,
            delta_y,
            key_code: event.key_code,
            code: event.key_name.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DrainReport {
    pub delivered: usize,
    pub failed: usize,
    pub retained: usize,
    pub discarded: usize,
}

#[derive(Clone, Copy, Debug)]
pub struct Dispatcher {
    wheel_scale: f64,
    policy: DrainPolicy,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_WHEEL_SCALE, DrainPolicy::default())
    }
}

impl Dispatcher {
    pub fn new(wheel_scale: f64, policy: DrainPolicy) -> Self {
        Self {
            wheel_scale,
            policy,
        }
    }

    pub fn policy(&self) -> DrainPolicy {
        self.policy
    }

    pub fn wheel_scale(&self) -> f64 {
        self.wheel_scale
    }

    /// Delivers every queued event in FIFO order. Moves are never coalesced.
    pub fn drain<S>(&self, queue: &mut EventQueue, sink: &mut S) -> DrainReport
    where
        S: VirtualInput + ?Sized,
    {
        let mut report = DrainReport::default();

        if queue.is_empty() {
            return report;
        }

        if !sink.is_input_ready() {
            self.hold_or_discard(queue, &mut report);
            return report;
        }

        while let Some(event) = queue.pop() {
            let engine_event = EngineEvent::from_input(&event, self.wheel_scale);

            match sink.deliver(&engine_event) {
                Ok(()) => {
                    trace!(
                        "delivered {} at ({}, {})",
                        event.kind, event.position[0], event.position[1]
                    );
                    report.delivered += 1;
                }
                Err(EngineError::NotReady) => {
                    queue.requeue_front(event);
                    self.hold_or_discard(queue, &mut report);
                    break;
                }
                Err(err) => {
                    warn!("failed to deliver {} event: {}", event.kind, err);
                    report.failed += 1;
                }
            }
        }

        if report.delivered > 0 {
            debug!("dispatched {} input events", report.delivered);
        }

        report
    }

    /// Discards everything queued under [`DrainPolicy::Discard`]; used while
    /// the frame loop waits for the engine.
    pub fn discard_pending(&self, queue: &mut EventQueue) -> usize {
        if self.policy != DrainPolicy::Discard {
            return 0;
        }

        let discarded = queue.clear();
        if discarded > 0 {
            warn!(
                "discarded {} input events queued before the engine was ready",
                discarded
            );
        }
        discarded
    }

    fn hold_or_discard(&self, queue: &mut EventQueue, report: &mut DrainReport) {
        match self.policy {
            DrainPolicy::Retain => {
                report.retained = queue.len();
                trace!(
                    "engine input not ready; holding {} events",
                    report.retained
                );
            }
            DrainPolicy::Discard => {
                report.discarded = queue.clear();
                warn!(
                    "engine input not ready; discarded {} events",
                    report.discarded
                );
            }
        }
    }
}
