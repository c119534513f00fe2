use std::time::Duration;
use crate::backend::PlaybackId;
use crate::character::{CharacterId, RuntimeCharacter};
use crate::config::SceneConfig;
use crate::effect::EffectFactory;
use crate::event::RuntimeEvent;
use crate::runtime::{TimerTask, World};
use crate::scheduler::TimerId;
use crate::sound_chain::SoundChain;
use crate::stage::SpriteId;
use crate::story::{InteractiveStyle, SceneSpec};
use crate::trigger::TriggerBinder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    Uninitialized,
    Loading,
    Active,
    TornDown,
}

pub struct SceneController {
    id: String,
    background_image: String,
    state: SceneState,
    background: Option<SpriteId>,
    characters: Vec<RuntimeCharacter>,
    sounds: SoundChain,
    retriggers: Vec<TimerId>,
    factory: EffectFactory,
    style: InteractiveStyle,
    config: SceneConfig,
}

impl SceneController {
    pub fn new(id: &str, spec: &SceneSpec, style: InteractiveStyle, config: SceneConfig) -> Self {
        let characters = spec.objects
            .iter()
            .enumerate()
            .map(|(i, obj)| RuntimeCharacter::new(CharacterId(i), obj.clone()))
            .collect();

        Self {
            id: id.to_string(),
            background_image: spec.background.clone(),
            state: SceneState::Uninitialized,
            background: None,
            characters,
            sounds: SoundChain::new(spec.sounds.clone()),
            retriggers: Vec::new(),
            factory: EffectFactory::new(config.bounce_offset),
            style,
            config,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn background(&self) -> Option<SpriteId> {
        self.background
    }

    pub fn characters(&self) -> &[RuntimeCharacter] {
        &self.characters
    }

    pub fn character(&self, id: CharacterId) -> Option<&RuntimeCharacter> {
        self.characters.get(id.0)
    }

    /// 按名字找角色；名字不唯一，返回全部匹配
    pub fn find(&self, name: &str) -> Vec<CharacterId> {
        self.characters
            .iter()
            .filter(|c| c.name() == name)
            .map(|c| c.id())
            .collect()
    }

    pub fn sound_chain(&self) -> &SoundChain {
        &self.sounds
    }

    /// 进入场景：播放环境音 → 画背景 → 按声明顺序显示角色 → 安装周期重触发
    pub fn enter(&mut self, world: &mut World) {
        if self.state != SceneState::Uninitialized {
            log::warn!("Scene '{}' entered twice, ignored", self.id);
            return;
        }
        self.state = SceneState::Loading;
        log::info!("Entering scene '{}' ({} characters)", self.id, self.characters.len());

        self.sounds.start(world);
        self.draw_background(world);

        let binder = TriggerBinder { factory: &self.factory, style: self.style };
        for character in &mut self.characters {
            character.show(world, &binder);
        }

        self.install_retriggers(world);
        self.state = SceneState::Active;
        world.push(RuntimeEvent::SceneEntered { scene: self.id.clone() });
    }

    fn draw_background(&mut self, world: &mut World) {
        let Some(tex) = world.resources.texture(&self.background_image).copied() else {
            log::warn!("Scene '{}': background '{}' is not loaded", self.id, self.background_image);
            return;
        };
        let id = world.stage.create(&self.background_image, &tex);
        world.stage.attach(id);
        self.background = Some(id);
    }

    fn install_retriggers(&mut self, world: &mut World) {
        let Some(name) = self.config.retrigger_character.as_deref() else {
            return;
        };
        let targets = self.find(name);
        if targets.is_empty() {
            log::debug!("Scene '{}': no character named '{}' to re-trigger", self.id, name);
            return;
        }
        if targets.len() > 1 {
            log::warn!("Scene '{}': {} characters named '{}', re-triggering all of them", self.id, targets.len(), name);
        }

        let interval = Duration::from_millis(self.config.retrigger_interval_ms);
        for character in targets {
            let timer = world.timers.schedule_repeating(interval, TimerTask::Retrigger { character });
            self.retriggers.push(timer);
        }
    }

    /// 周期重触发：重新执行该角色的 show/onload
    pub fn retrigger(&mut self, character: CharacterId, world: &mut World) {
        if self.state != SceneState::Active {
            return;
        }
        let binder = TriggerBinder { factory: &self.factory, style: self.style };
        if let Some(c) = self.characters.get_mut(character.0) {
            log::debug!("Re-triggering '{}'", c.name());
            c.show(world, &binder);
        }
    }

    pub fn play_sound(&mut self, link: usize, world: &mut World) {
        if self.state == SceneState::TornDown {
            return;
        }
        self.sounds.play(link, world);
    }

    pub fn on_sound_finished(&mut self, playback: PlaybackId, world: &mut World) -> bool {
        self.sounds.on_finished(playback, world)
    }

    pub fn touch(&mut self, character: CharacterId, world: &mut World) -> bool {
        if self.state != SceneState::Active {
            return false;
        }
        self.characters
            .get_mut(character.0)
            .is_some_and(|c| c.touch(world))
    }

    /// 指针在某个精灵上抬起
    pub fn pointer_up(&mut self, sprite: SpriteId, world: &mut World) -> bool {
        let owner = self.characters
            .iter()
            .find(|c| c.sprite() == Some(sprite))
            .map(|c| c.id());
        match owner {
            Some(id) => self.touch(id, world),
            None => false,
        }
    }

    pub fn pointer_up_at(&mut self, x: f32, y: f32, world: &mut World) -> bool {
        match world.stage.hit_test(x, y) {
            Some(sprite) => self.pointer_up(sprite, world),
            None => false,
        }
    }

    /// 撤掉场景拥有的一切：定时器、音频链、角色和背景
    pub fn teardown(&mut self, world: &mut World) {
        if self.state == SceneState::TornDown {
            return;
        }
        for timer in self.retriggers.drain(..) {
            world.timers.cancel(timer);
        }
        self.sounds.stop(world);
        for character in &mut self.characters {
            character.hide(world);
        }
        if let Some(bg) = self.background.take() {
            world.stage.destroy(bg);
        }
        self.state = SceneState::TornDown;
        log::info!("Scene '{}' torn down", self.id);
        world.push(RuntimeEvent::SceneTornDown { scene: self.id.clone() });
    }
}
