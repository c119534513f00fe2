use std::rc::Rc;
use std::time::Duration;
use fable_core::backend::headless::HeadlessAudio;
use fable_core::backend::{Resource, Resources, SoundClip, Texture};
use fable_core::character::CharacterId;
use fable_core::effect::{Effect, EffectFactory, Execute, FadeState, MoveState, SpinState, Target};
use fable_core::event::RuntimeEvent;
use fable_core::runtime::{TimerTask, World};
use fable_core::scheduler::Motion;
use fable_core::stage::{SpriteId, Viewport};
use fable_core::story::EffectSpec;
use fable_core::trigger::{EffectChain, Trigger};
use serde_json::json;

fn setup() -> (World, SpriteId, HeadlessAudio) {
    let mut resources = Resources::new();
    resources.insert("cat.png", Resource::Texture(Texture { width: 20.0, height: 50.0 }));
    resources.insert("cat_sleep.png", Resource::Texture(Texture { width: 30.0, height: 30.0 }));
    resources.insert("meow.mp3", Resource::Sound(SoundClip::default()));

    let audio = HeadlessAudio::new(Duration::from_millis(1000));
    let mut world = World::new(
        Viewport { width: 200.0, height: 200.0 },
        Rc::new(resources),
        Box::new(audio.clone()),
    );
    let tex = Texture { width: 20.0, height: 50.0 };
    let sprite = world.stage.create("cat.png", &tex);
    world.stage.attach(sprite);
    (world, sprite, audio)
}

fn build(world: &World, sprite: SpriteId, spec: serde_json::Value) -> Effect {
    let spec: EffectSpec = serde_json::from_value(spec).unwrap();
    let resources = Rc::clone(&world.resources);
    EffectFactory::default()
        .build(&spec, &Target { sprite, resources: &resources })
        .unwrap_or_else(|e| panic!("Build failed: {}", e))
}

fn frame() -> Duration {
    Duration::from_micros(16_667)
}

#[test]
fn test_chain_executes_in_declaration_order() {
    let (mut world, sprite, audio) = setup();
    let effects = vec![
        build(&world, sprite, json!({ "name": "audio", "sound": "meow.mp3" })),
        build(&world, sprite, json!({ "name": "move", "speed": 2 })),
        build(&world, sprite, json!({ "name": "fade_out", "speed": 0.01 })),
    ];
    let mut chain = EffectChain::new(Trigger::Touch, effects);
    assert_eq!(chain.kinds(), vec!["audio", "move", "fade_out"]);

    chain.fire(CharacterId(0), &mut world.effect_cx());

    let executed: Vec<_> = world
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            RuntimeEvent::EffectExecuted { effect, trigger, .. } => {
                assert_eq!(trigger, Trigger::Touch);
                Some(effect)
            }
            _ => None,
        })
        .collect();
    assert_eq!(executed, vec!["audio", "move", "fade_out"]);
    assert_eq!(audio.plays().len(), 1);
    assert_eq!(world.animator.len(), 2);
}

#[test]
fn test_audio_restarts_instead_of_overlapping() {
    let (mut world, sprite, audio) = setup();
    let mut effect = build(&world, sprite, json!({ "name": "audio", "sound": "meow.mp3" }));

    effect.execute(&mut world.effect_cx());
    effect.execute(&mut world.effect_cx());

    assert_eq!(audio.plays().len(), 2);
    world.advance_clock(Duration::from_millis(1000));
    // 第一次播放被停掉，只有第二次自然结束
    assert_eq!(world.finished_playbacks().len(), 1);
}

#[test]
fn test_spin_toggles_and_resets_rotation() {
    let (mut world, sprite, _) = setup();
    let mut effect = build(&world, sprite, json!({ "name": "spin", "speed": 0.5 }));
    let state = |e: &Effect| match e {
        Effect::Spin(s) => s.state(),
        _ => panic!("Expected a spin effect"),
    };

    effect.execute(&mut world.effect_cx());
    world.tick(frame());
    let s = world.stage.get(sprite).unwrap();
    assert!((s.rotation - 0.5).abs() < 0.001);
    assert_eq!((s.anchor.x, s.anchor.y), (0.5, 0.5));

    effect.execute(&mut world.effect_cx());
    assert_eq!(state(&effect), SpinState::Idle);
    assert_eq!(world.stage.get(sprite).unwrap().rotation, 0.0);
    assert!(world.animator.is_empty());

    effect.execute(&mut world.effect_cx());
    assert!(matches!(state(&effect), SpinState::Active(_)));
    assert_eq!(world.animator.len(), 1);
}

#[test]
fn test_fade_out_detaches_exactly_once() {
    let (mut world, sprite, _) = setup();
    let mut effect = build(&world, sprite, json!({ "name": "fade_out", "speed": 0.3 }));

    effect.execute(&mut world.effect_cx());
    // 淡出中再次触发不会重复登记
    effect.execute(&mut world.effect_cx());
    assert_eq!(world.animator.len(), 1);

    for _ in 0..10 {
        world.tick(frame());
    }

    assert!(!world.stage.is_attached(sprite));
    assert_eq!(world.stage.get(sprite).unwrap().alpha, 0.0);
    assert!(world.animator.is_empty());
    let removed = world
        .drain()
        .into_iter()
        .filter(|e| matches!(e, RuntimeEvent::SpriteRemoved { .. }))
        .count();
    assert_eq!(removed, 1);

    effect.execute(&mut world.effect_cx());
    assert!(world.animator.is_empty());
    match &effect {
        Effect::FadeOut(f) => assert_eq!(f.state(), FadeState::Done),
        _ => panic!("Expected a fade effect"),
    }
}

#[test]
fn test_gravity_clamps_to_floor() {
    let (mut world, sprite, _) = setup();
    let tick = world.animator.register(Motion::Gravity { sprite, strength: 1.0, velocity: 0.0 });
    let floor = 200.0 - 50.0;

    for _ in 0..100 {
        world.animator.tick(&mut world.stage, 1.0);
        assert!(world.stage.get(sprite).unwrap().pos.y <= floor);
    }

    assert_eq!(world.stage.get(sprite).unwrap().pos.y, floor);
    match world.animator.get(tick) {
        Some(Motion::Gravity { velocity, .. }) => assert_eq!(*velocity, 0.0),
        other => panic!("Unexpected motion: {:?}", other),
    }
}

#[test]
fn test_move_waits_for_pause_then_runs_once() {
    let (mut world, sprite, _) = setup();
    let mut effect = build(&world, sprite, json!({
        "name": "move", "speed": 3, "direction": "left", "pause_in_ms": 500
    }));
    let state = |e: &Effect| match e {
        Effect::Move(m) => m.state(),
        _ => panic!("Expected a move effect"),
    };

    effect.execute(&mut world.effect_cx());
    assert!(matches!(state(&effect), MoveState::Pending { .. }));
    assert!(world.animator.is_empty());
    assert_eq!(world.timers.len(), 1);

    effect.execute(&mut world.effect_cx());
    assert_eq!(world.timers.len(), 1);

    for _ in 0..5 {
        for task in world.advance_clock(Duration::from_millis(100)) {
            if let TimerTask::StartMotion { tick, motion } = task {
                assert!(world.animator.register_reserved(tick, motion));
            }
        }
    }
    assert_eq!(world.animator.len(), 1);

    world.animator.tick(&mut world.stage, 1.0);
    assert_eq!(world.stage.get(sprite).unwrap().pos.x, -3.0);

    effect.execute(&mut world.effect_cx());
    assert!(matches!(state(&effect), MoveState::Moving(_)));
    assert_eq!(world.animator.len(), 1);
    assert!(world.timers.is_empty());
}

#[test]
fn test_cancel_drops_pending_move() {
    let (mut world, sprite, _) = setup();
    let mut effect = build(&world, sprite, json!({ "name": "move", "speed": 1, "pause_in_ms": 200 }));

    effect.execute(&mut world.effect_cx());
    effect.cancel(&mut world.effect_cx());

    assert!(world.timers.is_empty());
    assert!(world.advance_clock(Duration::from_millis(500)).is_empty());
    assert!(world.animator.is_empty());
}

#[test]
fn test_bounce_and_transition_are_one_shot() {
    let (mut world, sprite, _) = setup();
    world.stage.get_mut(sprite).unwrap().pos.y = 150.0;

    let mut bounce = build(&world, sprite, json!({ "name": "bounce", "speed": 5 }));
    bounce.execute(&mut world.effect_cx());
    bounce.execute(&mut world.effect_cx());
    assert_eq!(world.stage.get(sprite).unwrap().pos.y, -50.0);

    let mut transition = build(&world, sprite, json!({ "name": "transition", "image": "cat_sleep.png" }));
    transition.execute(&mut world.effect_cx());
    let s = world.stage.get(sprite).unwrap();
    assert_eq!(s.texture, "cat_sleep.png");
    assert_eq!((s.size.x, s.size.y), (30.0, 30.0));
    assert!(world.animator.is_empty());
}

#[test]
fn test_unresolved_effects_report_a_reason() {
    let (world, sprite, _) = setup();
    let resources = Rc::clone(&world.resources);
    let target = Target { sprite, resources: &resources };
    let factory = EffectFactory::default();

    let unknown: EffectSpec = serde_json::from_value(json!({ "name": "dance", "tempo": 3 })).unwrap();
    let err = factory.build(&unknown, &target).unwrap_err();
    assert_eq!(err.name, "dance");

    let missing: EffectSpec = serde_json::from_value(json!({ "name": "audio", "sound": "purr.mp3" })).unwrap();
    let err = factory.build(&missing, &target).unwrap_err();
    assert_eq!(err.name, "audio");
    assert!(err.reason.contains("purr.mp3"));
}
