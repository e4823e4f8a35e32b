mod support;

use canvas_bridge::prelude::*;
use support::{move_to, press, release, running_bridge};

fn synthesize_all(messages: &[NativeMessage]) -> (InputState, Vec<InputEvent>) {
    let synthesizer = EventSynthesizer::new();
    let mut state = InputState::new();
    let mut queue = EventQueue::new();

    for message in messages {
        synthesizer.synthesize(&mut state, *message, &mut queue);
    }

    (state, std::iter::from_fn(|| queue.pop()).collect())
}

#[test]
fn mask_matches_held_buttons_after_every_transition() {
    let steps = [
        (press(MouseButton::Left), 0b001),
        (press(MouseButton::Right), 0b101),
        (press(MouseButton::Middle), 0b111),
        (release(MouseButton::Left), 0b110),
        (press(MouseButton::Back), 0b110),
        (release(MouseButton::Right), 0b010),
        (release(MouseButton::Middle), 0b000),
    ];

    let synthesizer = EventSynthesizer::new();
    let mut state = InputState::new();
    let mut queue = EventQueue::new();

    for (message, mask) in steps {
        synthesizer.synthesize(&mut state, message, &mut queue);
        assert_eq!(state.button_mask(), mask, "after {:?}", message);

        let emitted: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(emitted.len(), 2);
        assert!(emitted.iter().all(|event| event.button_mask == mask));
    }
}

#[test]
fn pointer_move_reports_movement_and_replay_is_idle() {
    let (_, events) =
        synthesize_all(&[move_to(10.0, 20.0), move_to(15.0, 18.0), move_to(15.0, 18.0)]);

    let kinds: Vec<_> = events.iter().map(|event| event.kind).collect();
    assert_eq!(
        kinds,
        [
            EventKind::MouseMove,
            EventKind::PointerMove,
            EventKind::MouseMove,
            EventKind::PointerMove,
            EventKind::MouseMove,
            EventKind::PointerMove,
        ]
    );

    assert_eq!(events[2].movement, [5.0, -2.0]);
    assert_eq!(events[3].movement, [5.0, -2.0]);
    assert_eq!(events[4].movement, [0.0, 0.0]);
    assert_eq!(events[5].position, [15.0, 18.0]);
}

#[test]
fn leaving_with_buttons_held_clears_them() {
    let (state, events) = synthesize_all(&[
        press(MouseButton::Left),
        press(MouseButton::Right),
        NativeMessage::EnterLeave { entered: false },
    ]);

    let out: Vec<_> = events[4..].iter().map(|event| event.kind).collect();
    assert_eq!(out, [EventKind::MouseOut, EventKind::PointerOut]);
    assert!(events[4..].iter().all(|event| event.button_mask == 0));
    assert_eq!(state.button_mask(), 0);
    assert!(!state.is_inside());
}

#[test]
fn entering_emits_nothing() {
    let (state, events) =
        synthesize_all(&[NativeMessage::EnterLeave { entered: true }]);
    assert!(events.is_empty());
    assert!(state.is_inside());
}

#[test]
fn modifiers_are_snapshotted_at_emission() {
    let shift = Modifiers {
        shift: true,
        ..Modifiers::default()
    };

    let (_, events) = synthesize_all(&[
        NativeMessage::ModifiersChange(shift),
        press(MouseButton::Left),
        NativeMessage::ModifiersChange(Modifiers::default()),
        release(MouseButton::Left),
    ]);

    assert_eq!(events.len(), 4);
    assert!(events[0].modifiers.shift);
    assert!(events[1].modifiers.shift);
    assert!(!events[2].modifiers.shift);
}

#[test]
fn fifo_order_holds_across_enqueue_rounds() {
    let mut bridge = running_bridge(SurfaceSize::new(32, 32));

    for round in 0..3 {
        for i in 0..4 {
            let x = (round * 4 + i) as f64;
            bridge.handle(move_to(x, 0.0)).expect("handle move");
        }
        bridge.tick();
    }

    let xs: Vec<f64> = bridge
        .engine()
        .delivered
        .iter()
        .filter(|event| event.kind == EventKind::PointerMove)
        .map(|event| event.client_x)
        .collect();

    assert_eq!(xs, (0..12).map(f64::from).collect::<Vec<_>>());

    let kinds = bridge.engine().kinds();
    assert!(kinds.chunks(2).all(|pair| {
        pair == [EventKind::MouseMove, EventKind::PointerMove]
    }));
}

#[test]
fn wheel_is_scaled_and_negated_at_delivery() {
    let mut bridge = running_bridge(SurfaceSize::new(16, 16));

    bridge
        .handle(NativeMessage::Wheel { delta: 1.0 })
        .expect("handle wheel");
    bridge.tick();

    let delivered = &bridge.engine().delivered;
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].kind, EventKind::Wheel);
    assert_eq!(delivered[0].class, DeliveryClass::Wheel);
    assert_eq!(delivered[0].delta_y, -50.0);
    assert_eq!(delivered[0].button, -1);
    assert_eq!(bridge.input_state().last_wheel_delta(), 1.0);
}

#[test]
fn wheel_scale_comes_from_config() {
    let mut config = BridgeConfig::default();
    config.input.wheel_scale = 120.0;
    let (mut bridge, notifier) =
        support::attached_bridge(SurfaceSize::new(8, 8), &config);
    notifier.notify();

    bridge
        .handle(NativeMessage::Wheel { delta: -0.5 })
        .expect("handle wheel");
    bridge.tick();

    assert_eq!(bridge.engine().delivered[0].delta_y, 60.0);
}

#[test]
fn keys_are_delivered_as_keyboard_class() {
    let mut bridge = running_bridge(SurfaceSize::new(8, 8));
    let space = KeyId {
        code: 32,
        name: "Space",
    };

    bridge
        .handle(NativeMessage::KeyChange {
            key: space,
            pressed: true,
        })
        .expect("key down");
    assert!(bridge.input_state().is_key_pressed(32));

    bridge
        .handle(NativeMessage::KeyChange {
            key: space,
            pressed: false,
        })
        .expect("key up");
    bridge.tick();

    let delivered = &bridge.engine().delivered;
    assert_eq!(bridge.engine().kinds(), [EventKind::KeyDown, EventKind::KeyUp]);
    assert!(delivered.iter().all(|event| {
        event.class == DeliveryClass::Keyboard
            && event.key_code == 32
            && event.code == "Space"
    }));
    assert!(!bridge.input_state().is_key_pressed(32));
}

#[test]
fn out_of_range_input_is_accepted_and_ignored() {
    let (state, events) = synthesize_all(&[
        press(MouseButton::Other(9)),
        NativeMessage::KeyChange {
            key: KeyId {
                code: 4000,
                name: "Unidentified",
            },
            pressed: true,
        },
    ]);

    assert_eq!(state.button_mask(), 0);
    assert!(!state.is_key_pressed(4000));
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].button, 9);
}
