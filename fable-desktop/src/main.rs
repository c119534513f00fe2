mod config_gen;
mod loader;
mod renderer;
mod setup;

use std::{env, fs, thread};
use std::time::Duration;
use anyhow::{Context, Result};
use fable_core::backend::headless::HeadlessAudio;
use fable_core::config::{AudioConfig, SceneConfig, StageConfig, SystemConfig};
use fable_core::stage::Viewport;
use fable_core::{RuntimeEvent, StoryDocument, StoryPlayer};
use config_gen::RunConfig;
use loader::FsLoader;
use renderer::LogRenderer;

/// 命令行里的一次模拟点击：`--touch Cat@2500`
struct ScriptedTouch {
    name: String,
    at: Duration,
}

struct Args {
    seconds: Option<u64>,
    realtime: bool,
    touches: Vec<ScriptedTouch>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args { seconds: None, realtime: false, touches: Vec::new() };
    let mut iter = env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--seconds" => {
                let v = iter.next().context("--seconds needs a value")?;
                args.seconds = Some(v.parse().with_context(|| format!("Bad --seconds value '{}'", v))?);
            }
            "--realtime" => args.realtime = true,
            "--touch" => {
                let v = iter.next().context("--touch needs NAME@MS")?;
                let (name, at) = v.rsplit_once('@').with_context(|| format!("Bad --touch value '{}'", v))?;
                let at: u64 = at.parse().with_context(|| format!("Bad --touch time '{}'", at))?;
                args.touches.push(ScriptedTouch { name: name.to_string(), at: Duration::from_millis(at) });
            }
            other => log::warn!("Unknown argument '{}' ignored", other),
        }
    }

    args.touches.sort_by_key(|t| t.at);
    Ok(args)
}

fn main() {
    setup::init("config.toml");
    log::info!(">>> Fable Desktop Launcher Started <<<");

    if let Err(e) = run() {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = parse_args()?;

    let sys_cfg: SystemConfig = fable_shared::config::get("system");
    let stage_cfg = StageConfig::load();
    let scene_cfg = SceneConfig::load();
    let audio_cfg: AudioConfig = fable_shared::config::get("audio");
    let run_cfg: RunConfig = fable_shared::config::get("run");

    log::info!("Loading story from config: {}", sys_cfg.story_path);
    let source = fs::read_to_string(&sys_cfg.story_path)
        .with_context(|| format!("Story '{}' not found. Please check config.toml or file path.", sys_cfg.story_path))?;
    log::debug!("Loaded story: {} bytes", source.len());

    let doc = StoryDocument::from_json(&source)?;
    log::info!("Story parsed: {} scene(s), start '{}'", doc.scenes.len(), doc.start);

    let mut loader = FsLoader::new(&sys_cfg.assets_path);
    let audio = HeadlessAudio::new(Duration::from_millis(audio_cfg.default_clip_ms));
    let viewport = Viewport { width: stage_cfg.width, height: stage_cfg.height };
    let mut player = StoryPlayer::load(doc, &mut loader, Box::new(audio), viewport, scene_cfg)?;
    let mut renderer = LogRenderer::new(stage_cfg.width, stage_cfg.height, run_cfg.report_every);

    player.start()?;

    let frame_rate = stage_cfg.frame_rate.max(1);
    let dt = Duration::from_secs(1) / frame_rate;
    let seconds = args.seconds.unwrap_or(run_cfg.seconds);
    let realtime = args.realtime || run_cfg.realtime;
    let total_frames = seconds * u64::from(frame_rate);
    log::info!("Running {} frame(s) at {} fps (realtime: {})", total_frames, frame_rate, realtime);

    let mut touches = args.touches.into_iter().peekable();
    let mut elapsed = Duration::ZERO;

    for _ in 0..total_frames {
        while let Some(touch) = touches.next_if(|t| t.at <= elapsed) {
            let fired = player.touch_named(&touch.name);
            log::info!("Touch '{}' at {:?}: {} chain(s) fired", touch.name, touch.at, fired);
        }

        player.frame(dt);
        player.render(&mut renderer);
        report(player.drain_events());

        elapsed += dt;
        if realtime {
            thread::sleep(dt);
        }
    }

    player.shutdown();
    report(player.drain_events());
    log::info!("Finished after {:?}", elapsed);
    Ok(())
}

fn report(events: Vec<RuntimeEvent>) {
    for event in events {
        match event {
            RuntimeEvent::StoryLoaded { .. }
            | RuntimeEvent::SplashShown
            | RuntimeEvent::SplashFinished
            | RuntimeEvent::SceneEntered { .. }
            | RuntimeEvent::SceneTornDown { .. } => log::info!("{:?}", event),
            RuntimeEvent::EffectSkipped { .. } => log::warn!("{:?}", event),
            _ => log::debug!("{:?}", event),
        }
    }
}
