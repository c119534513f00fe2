use crate::backend::PlaybackId;
use crate::character::CharacterId;
use crate::stage::SpriteId;
use crate::trigger::Trigger;

/// 运行时做过的事情，由宿主取出（启动器写日志，测试做断言）
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeEvent {
    StoryLoaded { assets: usize },
    SplashShown,
    SplashFinished,

    SceneEntered { scene: String },
    SceneTornDown { scene: String },
    CharacterShown { character: CharacterId, name: String },

    SoundStarted { alias: String, playback: PlaybackId },

    EffectExecuted { character: CharacterId, trigger: Trigger, effect: &'static str },
    EffectSkipped { character: String, effect: String, reason: String },

    MotionFinished { sprite: SpriteId, kind: &'static str },
    SpriteRemoved { sprite: SpriteId },
}
