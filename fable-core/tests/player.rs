use std::time::Duration;
use fable_core::backend::headless::{HeadlessAudio, MemoryLoader, RecordingRenderer};
use fable_core::backend::Texture;
use fable_core::config::SceneConfig;
use fable_core::event::RuntimeEvent;
use fable_core::manifest;
use fable_core::player::{Phase, StoryPlayer};
use fable_core::stage::Viewport;
use fable_core::story::StoryDocument;
use serde_json::json;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn room_story() -> StoryDocument {
    let doc = json!({
        "splash": { "image": "s.png", "sound": "s.mp3" },
        "start": "room",
        "scenes": {
            "room": {
                "background": "bg.png",
                "sounds": [{ "id": "amb", "file": "a.mp3", "wait_in_ms": 1000 }],
                "objects": [{
                    "name": "Cat",
                    "image": "cat.png",
                    "position": { "x1": 10, "y1": 20 },
                    "actions": { "touch": { "effects": [{ "name": "bounce" }] } }
                }]
            },
            "hall": { "background": "hall.png" }
        }
    });
    StoryDocument::from_json(&doc.to_string()).unwrap_or_else(|e| panic!("Parse failed: {:#}", e))
}

fn load(doc: StoryDocument, audio: &HeadlessAudio) -> StoryPlayer {
    let m = manifest::resolve(&doc);
    let mut loader = MemoryLoader::covering(&m, Texture { width: 64.0, height: 64.0 });
    StoryPlayer::load(
        doc,
        &mut loader,
        Box::new(audio.clone()),
        Viewport { width: 800.0, height: 600.0 },
        SceneConfig::default(),
    )
    .unwrap_or_else(|e| panic!("Load failed: {:#}", e))
}

fn run(player: &mut StoryPlayer, total_ms: u64) {
    for _ in 0..total_ms / 10 {
        player.frame(ms(10));
    }
}

#[test]
fn test_splash_completion_enters_start_scene() {
    let audio = HeadlessAudio::new(ms(3000)).with_clip("s.mp3", ms(500));
    let mut player = load(room_story(), &audio);
    assert_eq!(player.phase(), Phase::Loaded);
    assert_eq!(player.manifest().len(), 6);

    player.start().unwrap();
    assert_eq!(player.phase(), Phase::Splash);
    let splash = player.splash_sprite().unwrap();
    assert!(player.stage().is_attached(splash));

    run(&mut player, 490);
    assert!(player.scene().is_none());

    run(&mut player, 10);
    assert_eq!(player.phase(), Phase::Playing);
    assert_eq!(player.scene().map(|s| s.id()), Some("room"));
    assert!(player.stage().get(splash).is_none());

    let events = player.drain_events();
    let order: Vec<_> = events
        .iter()
        .filter(|e| matches!(e,
            RuntimeEvent::StoryLoaded { .. }
            | RuntimeEvent::SplashShown
            | RuntimeEvent::SplashFinished
            | RuntimeEvent::SceneEntered { .. }))
        .cloned()
        .collect();
    assert_eq!(order, vec![
        RuntimeEvent::StoryLoaded { assets: 6 },
        RuntimeEvent::SplashShown,
        RuntimeEvent::SplashFinished,
        RuntimeEvent::SceneEntered { scene: "room".into() },
    ]);

    // 环境音在进入场景 1000ms 后开始
    run(&mut player, 1000);
    let plays = audio.plays();
    assert_eq!(plays[0], (ms(0), "s.mp3".to_string()));
    assert_eq!(plays[1], (ms(1500), "a.mp3".to_string()));
}

#[test]
fn test_touch_by_name_and_render() {
    let audio = HeadlessAudio::new(ms(100));
    let mut player = load(room_story(), &audio);
    player.start().unwrap();
    run(&mut player, 100);

    assert_eq!(player.touch_named("Cat"), 1);
    assert_eq!(player.touch_named("Dog"), 0);

    let mut renderer = RecordingRenderer::new(640.0, 480.0);
    player.render(&mut renderer);
    assert_eq!(renderer.last_frame(), Some(&["bg.png".to_string(), "cat.png".to_string()][..]));
    assert_eq!(player.stage().viewport(), Viewport { width: 640.0, height: 480.0 });
}

#[test]
fn test_enter_scene_tears_down_the_previous_one() {
    let audio = HeadlessAudio::new(ms(100));
    let mut player = load(room_story(), &audio);
    player.start().unwrap();
    run(&mut player, 100);

    player.enter_scene("hall").unwrap();
    assert_eq!(player.stage().len(), 1);
    assert!(player.world().timers.is_empty());
    assert!(player.drain_events().contains(&RuntimeEvent::SceneTornDown { scene: "room".into() }));

    let err = player.enter_scene("attic").unwrap_err();
    assert!(format!("{:#}", err).contains("attic"));
    assert_eq!(player.scene().map(|s| s.id()), Some("hall"));
}

#[test]
fn test_loader_failure_aborts_load() {
    let doc = room_story();
    let mut loader = MemoryLoader::new()
        .with_texture("s.png", 10.0, 10.0)
        .with_sound("s.mp3", None);

    let result = StoryPlayer::load(
        doc,
        &mut loader,
        Box::new(HeadlessAudio::new(ms(100))),
        Viewport { width: 800.0, height: 600.0 },
        SceneConfig::default(),
    );

    let err = match result {
        Ok(_) => panic!("Load should fail when assets are missing"),
        Err(e) => format!("{:#}", e),
    };
    assert!(err.contains("cat.png"));
    assert!(err.contains("bg.png"));
}

#[test]
fn test_unknown_start_scene_is_rejected() {
    let doc = json!({
        "splash": { "image": "s.png", "sound": "s.mp3" },
        "start": "nowhere",
        "scenes": { "room": { "background": "bg.png" } }
    });
    assert!(StoryDocument::from_json(&doc.to_string()).is_err());
}
