use super::event::{EventKind, InputEvent, Modifiers, MouseButton};
use super::queue::EventQueue;
use super::state::InputState;
use crate::pixels::SurfaceSize;

/// A key as reported by the native layer: legacy key code plus DOM `code`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KeyId {
    pub code: i32,
    pub name: &'static str,
}

/// The closed set of native callbacks the bridge reacts to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NativeMessage {
    PointerMove { x: f64, y: f64 },
    ButtonChange { button: MouseButton, pressed: bool },
    Wheel { delta: f64 },
    KeyChange { key: KeyId, pressed: bool },
    ModifiersChange(Modifiers),
    EnterLeave { entered: bool },
    Resize(SurfaceSize),
}

/// Turns native messages into canonical records.
///
/// Pointer input is emitted twice, legacy mouse family first and pointer
/// family second, so scripts written against either family see it.
#[derive(Clone, Copy, Debug, Default)]
pub struct EventSynthesizer;

impl EventSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Applies `message` to `state` and pushes the resulting records. Returns
    /// the number of records pushed.
    pub fn synthesize(
        &self,
        state: &mut InputState,
        message: NativeMessage,
        queue: &mut EventQueue,
    ) -> usize {
        match message {
            NativeMessage::PointerMove { x, y } => {
                let [px, py] = state.position();
                state.on_pointer_move(x, y);
                let movement = [x - px, y - py];

                self.emit_pair(
                    state,
                    queue,
                    [EventKind::MouseMove, EventKind::PointerMove],
                    |event| event.with_movement(movement),
                )
            }
            NativeMessage::ButtonChange { button, pressed } => {
                state.on_button(button, pressed);

                let kinds = if pressed {
                    [EventKind::MouseDown, EventKind::PointerDown]
                } else {
                    [EventKind::MouseUp, EventKind::PointerUp]
                };

                self.emit_pair(state, queue, kinds, |event| {
                    event.with_button(button.id())
                })
            }
            NativeMessage::EnterLeave { entered } => {
                state.on_pointer_enter_leave(entered);

                if entered {
                    return 0;
                }

                self.emit_pair(
                    state,
                    queue,
                    [EventKind::MouseOut, EventKind::PointerOut],
                    |event| event,
                )
            }
            NativeMessage::Wheel { delta } => {
                state.on_wheel(delta);
                queue.push(
                    snapshot(state, EventKind::Wheel).with_wheel_delta(delta),
                );
                1
            }
            NativeMessage::KeyChange { key, pressed } => {
                state.on_key(key.code, pressed);

                let kind = if pressed {
                    EventKind::KeyDown
                } else {
                    EventKind::KeyUp
                };

                queue.push(snapshot(state, kind).with_key(key.code, key.name));
                1
            }
            NativeMessage::ModifiersChange(modifiers) => {
                state.on_modifier_change(modifiers);
                0
            }
            NativeMessage::Resize(_) => 0,
        }
    }

    fn emit_pair(
        &self,
        state: &InputState,
        queue: &mut EventQueue,
        kinds: [EventKind; 2],
        decorate: impl Fn(InputEvent) -> InputEvent,
    ) -> usize {
        for kind in kinds {
            queue.push(decorate(snapshot(state, kind)));
        }
        kinds.len()
    }
}

fn snapshot(state: &InputState, kind: EventKind) -> InputEvent {
    InputEvent::new(
        kind,
        state.position(),
        state.button_mask(),
        state.modifiers(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(queue: &mut EventQueue) -> Vec<InputEvent> {
        std::iter::from_fn(|| queue.pop()).collect()
    }

    #[test]
    fn movement_is_relative_to_previous_position() {
        let synth = EventSynthesizer::new();
        let mut state = InputState::new();
        let mut queue = EventQueue::new();

        synth.synthesize(
            &mut state,
            NativeMessage::PointerMove { x: 10.0, y: 20.0 },
            &mut queue,
        );
        synth.synthesize(
            &mut state,
            NativeMessage::PointerMove { x: 15.0, y: 18.0 },
            &mut queue,
        );
        synth.synthesize(
            &mut state,
            NativeMessage::PointerMove { x: 15.0, y: 18.0 },
            &mut queue,
        );

        let events = drain(&mut queue);
        assert_eq!(events.len(), 6);
        assert_eq!(events[0].kind, EventKind::MouseMove);
        assert_eq!(events[1].kind, EventKind::PointerMove);
        assert_eq!(events[0].movement, [10.0, 20.0]);
        assert_eq!(events[2].movement, [5.0, -2.0]);
        assert_eq!(events[3].movement, [5.0, -2.0]);
        assert_eq!(events[4].movement, [0.0, 0.0]);
        assert_eq!(state.position(), [15.0, 18.0]);
    }

    #[test]
    fn button_mask_includes_own_transition() {
        let synth = EventSynthesizer::new();
        let mut state = InputState::new();
        let mut queue = EventQueue::new();

        synth.synthesize(
            &mut state,
            NativeMessage::ButtonChange {
                button: MouseButton::Right,
                pressed: true,
            },
            &mut queue,
        );
        synth.synthesize(
            &mut state,
            NativeMessage::ButtonChange {
                button: MouseButton::Left,
                pressed: true,
            },
            &mut queue,
        );
        synth.synthesize(
            &mut state,
            NativeMessage::ButtonChange {
                button: MouseButton::Right,
                pressed: false,
            },
            &mut queue,
        );

        let masks: Vec<(EventKind, u8, i32)> = drain(&mut queue)
            .into_iter()
            .map(|e| (e.kind, e.button_mask, e.button))
            .collect();

        assert_eq!(
            masks,
            vec![
                (EventKind::MouseDown, 0b100, 2),
                (EventKind::PointerDown, 0b100, 2),
                (EventKind::MouseDown, 0b101, 0),
                (EventKind::PointerDown, 0b101, 0),
                (EventKind::MouseUp, 0b001, 2),
                (EventKind::PointerUp, 0b001, 2),
            ]
        );
    }

    #[test]
    fn leaving_emits_out_pair_with_cleared_mask() {
        let synth = EventSynthesizer::new();
        let mut state = InputState::new();
        let mut queue = EventQueue::new();

        for button in [MouseButton::Left, MouseButton::Middle, MouseButton::Right]
        {
            state.on_button(button, true);
        }

        let emitted = synth.synthesize(
            &mut state,
            NativeMessage::EnterLeave { entered: false },
            &mut queue,
        );
        assert_eq!(emitted, 2);

        let events = drain(&mut queue);
        assert_eq!(events[0].kind, EventKind::MouseOut);
        assert_eq!(events[1].kind, EventKind::PointerOut);
        assert!(events.iter().all(|e| e.button_mask == 0));

        let entered = synth.synthesize(
            &mut state,
            NativeMessage::EnterLeave { entered: true },
            &mut queue,
        );
        assert_eq!(entered, 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn wheel_keeps_raw_delta() {
        let synth = EventSynthesizer::new();
        let mut state = InputState::new();
        let mut queue = EventQueue::new();

        synth.synthesize(
            &mut state,
            NativeMessage::Wheel { delta: -0.5 },
            &mut queue,
        );

        let events = drain(&mut queue);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Wheel);
        assert_eq!(events[0].wheel_delta, -0.5);
        assert_eq!(events[0].button, -1);
        assert_eq!(state.last_wheel_delta(), -0.5);
    }

    #[test]
    fn modifiers_are_snapshotted_per_event() {
        let synth = EventSynthesizer::new();
        let mut state = InputState::new();
        let mut queue = EventQueue::new();
        let key = KeyId {
            code: 65,
            name: "KeyA",
        };

        synth.synthesize(
            &mut state,
            NativeMessage::ModifiersChange(Modifiers {
                shift: true,
                ..Modifiers::default()
            }),
            &mut queue,
        );
        synth.synthesize(
            &mut state,
            NativeMessage::KeyChange { key, pressed: true },
            &mut queue,
        );
        synth.synthesize(
            &mut state,
            NativeMessage::ModifiersChange(Modifiers::default()),
            &mut queue,
        );
        synth.synthesize(
            &mut state,
            NativeMessage::KeyChange {
                key,
                pressed: false,
            },
            &mut queue,
        );

        let events = drain(&mut queue);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::KeyDown);
        assert!(events[0].modifiers.shift);
        assert_eq!(events[0].key_code, 65);
        assert_eq!(events[0].key_name, "KeyA");
        assert_eq!(events[1].kind, EventKind::KeyUp);
        assert!(!events[1].modifiers.shift);
        assert!(!state.is_key_pressed(65));
    }
}
