use std::rc::Rc;
use std::time::Duration;
use anyhow::{Context, Result};
use crate::backend::{AudioBackend, PlaybackId, Renderer, ResourceLoader};
use crate::character::CharacterId;
use crate::config::SceneConfig;
use crate::event::RuntimeEvent;
use crate::manifest::{self, Manifest};
use crate::runtime::{TimerTask, World};
use crate::scene::SceneController;
use crate::stage::{SpriteId, Stage, Viewport};
use crate::story::StoryDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 资源已加载，还没开始
    Loaded,
    /// 闪屏图显示中，等闪屏音播完
    Splash,
    Playing,
}

/// 故事的启动与逐帧驱动：加载资源 → 闪屏 → 进入起始场景
pub struct StoryPlayer {
    doc: StoryDocument,
    manifest: Manifest,
    config: SceneConfig,
    world: World,
    phase: Phase,
    splash_sprite: Option<SpriteId>,
    splash_playback: Option<PlaybackId>,
    scene: Option<SceneController>,
}

impl StoryPlayer {
    /// 解析资源清单并一次性加载；任何资源失败都会让整个加载失败
    pub fn load(
        doc: StoryDocument,
        loader: &mut dyn ResourceLoader,
        audio: Box<dyn AudioBackend>,
        viewport: Viewport,
        config: SceneConfig,
    ) -> Result<Self> {
        let manifest = manifest::resolve(&doc);
        log::info!("Manifest resolved: {} asset(s)", manifest.len());

        let resources = loader
            .load_bundle(&manifest)
            .with_context(|| format!("Failed to load {} story asset(s)", manifest.len()))?;
        log::info!("Loaded {} resource(s)", resources.len());

        let mut world = World::new(viewport, Rc::new(resources), audio);
        world.push(RuntimeEvent::StoryLoaded { assets: manifest.len() });

        Ok(Self {
            doc,
            manifest,
            config,
            world,
            phase: Phase::Loaded,
            splash_sprite: None,
            splash_playback: None,
            scene: None,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn document(&self) -> &StoryDocument {
        &self.doc
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn stage(&self) -> &Stage {
        &self.world.stage
    }

    pub fn scene(&self) -> Option<&SceneController> {
        self.scene.as_ref()
    }

    pub fn splash_sprite(&self) -> Option<SpriteId> {
        self.splash_sprite
    }

    /// 显示闪屏图并播放闪屏音；闪屏音播完后自动进入起始场景
    pub fn start(&mut self) -> Result<()> {
        if self.phase != Phase::Loaded {
            log::warn!("Story already started");
            return Ok(());
        }

        let splash = self.doc.splash.clone();
        if let Some(tex) = self.world.resources.texture(&splash.image).copied() {
            let id = self.world.stage.create(&splash.image, &tex);
            self.world.stage.attach(id);
            self.splash_sprite = Some(id);
        }

        if self.world.resources.sound(&splash.sound).is_none() {
            log::warn!("Splash sound '{}' is not loaded, skipping splash", splash.sound);
            let start = self.doc.start.clone();
            return self.enter_scene(&start);
        }

        let playback = self.world.audio.play(&splash.sound);
        self.splash_playback = Some(playback);
        self.phase = Phase::Splash;
        log::info!("Splash shown, waiting for '{}'", splash.sound);
        self.world.push(RuntimeEvent::SplashShown);
        self.world.push(RuntimeEvent::SoundStarted { alias: splash.sound, playback });
        Ok(())
    }

    /// 撤掉当前场景（及闪屏），构建并进入 id 对应的场景
    pub fn enter_scene(&mut self, id: &str) -> Result<()> {
        let spec = self.doc
            .scene(id)
            .with_context(|| format!("Scene '{}' is not defined", id))?;
        let mut next = SceneController::new(id, spec, self.doc.settings.interactive, self.config.clone());

        if let Some(mut current) = self.scene.take() {
            current.teardown(&mut self.world);
        }
        self.clear_splash();

        next.enter(&mut self.world);
        self.scene = Some(next);
        self.phase = Phase::Playing;
        Ok(())
    }

    fn clear_splash(&mut self) {
        if let Some(sprite) = self.splash_sprite.take() {
            self.world.stage.destroy(sprite);
        }
        if self.splash_playback.take().is_some() {
            self.world.audio.stop(&self.doc.splash.sound);
        }
    }

    /// 推进一帧：到期定时器 → 音频完成通知 → 逐帧登记项
    pub fn frame(&mut self, dt: Duration) {
        for task in self.world.advance_clock(dt) {
            self.dispatch(task);
        }

        for playback in self.world.finished_playbacks() {
            if self.splash_playback == Some(playback) {
                self.splash_playback = None;
                self.world.push(RuntimeEvent::SplashFinished);
                let start = self.doc.start.clone();
                if let Err(e) = self.enter_scene(&start) {
                    log::error!("Failed to enter start scene: {:#}", e);
                }
                continue;
            }
            if let Some(scene) = self.scene.as_mut() {
                scene.on_sound_finished(playback, &mut self.world);
            }
        }

        self.world.tick(dt);
    }

    fn dispatch(&mut self, task: TimerTask) {
        match task {
            TimerTask::PlaySound { link } => {
                if let Some(scene) = self.scene.as_mut() {
                    scene.play_sound(link, &mut self.world);
                }
            }
            TimerTask::StartMotion { tick, motion } => {
                self.world.animator.register_reserved(tick, motion);
            }
            TimerTask::Retrigger { character } => {
                if let Some(scene) = self.scene.as_mut() {
                    scene.retrigger(character, &mut self.world);
                }
            }
        }
    }

    pub fn touch(&mut self, character: CharacterId) -> bool {
        match self.scene.as_mut() {
            Some(scene) => scene.touch(character, &mut self.world),
            None => false,
        }
    }

    /// 触摸所有同名角色，返回实际执行了 touch 链的个数
    pub fn touch_named(&mut self, name: &str) -> usize {
        let Some(scene) = self.scene.as_mut() else {
            return 0;
        };
        let targets = scene.find(name);
        targets
            .into_iter()
            .filter(|id| scene.touch(*id, &mut self.world))
            .count()
    }

    pub fn pointer_up_at(&mut self, x: f32, y: f32) -> bool {
        match self.scene.as_mut() {
            Some(scene) => scene.pointer_up_at(x, y, &mut self.world),
            None => false,
        }
    }

    pub fn drain_events(&mut self) -> Vec<RuntimeEvent> {
        self.world.drain()
    }

    /// 视口跟随渲染器，然后交给渲染器绘制当前舞台
    pub fn render(&mut self, renderer: &mut dyn Renderer) {
        let vp = renderer.viewport();
        if vp != self.world.stage.viewport() {
            log::debug!("Viewport resized to {}x{}", vp.width, vp.height);
            self.world.stage.resize(vp.width, vp.height);
        }
        renderer.draw(&self.world.stage);
    }

    /// 撤掉当前场景
    pub fn shutdown(&mut self) {
        if let Some(mut scene) = self.scene.take() {
            scene.teardown(&mut self.world);
        }
        self.clear_splash();
    }
}
