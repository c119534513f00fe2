mod audio;
mod instant;
mod motion;

pub use audio::AudioEffect;
pub use instant::{BounceEffect, TransitionEffect};
pub use motion::{FadeOutEffect, FadeState, MoveEffect, MoveState, SpinEffect, SpinState};

use std::collections::VecDeque;
use std::fmt;
use crate::backend::{AudioBackend, Resources};
use crate::event::RuntimeEvent;
use crate::runtime::TimerTask;
use crate::scheduler::{AnimationScheduler, TimerQueue};
use crate::stage::{SpriteId, Stage};
use crate::story::EffectSpec;

/// 效果执行时可以触碰的运行时服务；效果不会越过这个范围
pub struct EffectCx<'a> {
    pub stage: &'a mut Stage,
    pub animator: &'a mut AnimationScheduler,
    pub timers: &'a mut TimerQueue<TimerTask>,
    pub audio: &'a mut dyn AudioBackend,
    pub events: &'a mut VecDeque<RuntimeEvent>,
}

pub trait Execute {
    /// 每次触发调用一次
    fn execute(&mut self, cx: &mut EffectCx);

    /// 撤销该效果挂起的定时器和逐帧登记
    fn cancel(&mut self, _cx: &mut EffectCx) {}
}

/// 运行时效果，一个封闭的枚举
#[derive(Debug, Clone)]
pub enum Effect {
    Audio(AudioEffect),
    Move(MoveEffect),
    Bounce(BounceEffect),
    Transition(TransitionEffect),
    FadeOut(FadeOutEffect),
    Spin(SpinEffect),
}

impl Effect {
    pub fn kind(&self) -> &'static str {
        match self {
            Effect::Audio(_) => "audio",
            Effect::Move(_) => "move",
            Effect::Bounce(_) => "bounce",
            Effect::Transition(_) => "transition",
            Effect::FadeOut(_) => "fade_out",
            Effect::Spin(_) => "spin",
        }
    }

    fn inner(&mut self) -> &mut dyn Execute {
        match self {
            Effect::Audio(e) => e,
            Effect::Move(e) => e,
            Effect::Bounce(e) => e,
            Effect::Transition(e) => e,
            Effect::FadeOut(e) => e,
            Effect::Spin(e) => e,
        }
    }
}

impl Execute for Effect {
    fn execute(&mut self, cx: &mut EffectCx) {
        self.inner().execute(cx);
    }

    fn cancel(&mut self, cx: &mut EffectCx) {
        self.inner().cancel(cx);
    }
}

/// 无法构建的效果；所在位置会从效果链中去掉
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedEffect {
    pub name: String,
    pub reason: String,
}

impl fmt::Display for UnresolvedEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect '{}' unresolved: {}", self.name, self.reason)
    }
}

impl std::error::Error for UnresolvedEffect {}

/// 构建效果时的目标：精灵句柄 + 资源表
pub struct Target<'a> {
    pub sprite: SpriteId,
    pub resources: &'a Resources,
}

#[derive(Debug, Clone)]
pub struct EffectFactory {
    pub bounce_offset: f32,
}

impl Default for EffectFactory {
    fn default() -> Self {
        Self { bounce_offset: 100.0 }
    }
}

impl EffectFactory {
    pub fn new(bounce_offset: f32) -> Self {
        Self { bounce_offset }
    }

    pub fn build(&self, spec: &EffectSpec, target: &Target) -> Result<Effect, UnresolvedEffect> {
        let unresolved = |reason: String| UnresolvedEffect { name: spec.name().to_string(), reason };

        let effect = match spec {
            EffectSpec::Audio { sound } => {
                if target.resources.sound(sound).is_none() {
                    return Err(unresolved(format!("sound '{}' is not loaded", sound)));
                }
                Effect::Audio(AudioEffect::new(sound))
            }
            EffectSpec::Move { speed, direction, pause_in_ms } => {
                Effect::Move(MoveEffect::new(target.sprite, *speed * direction.sign(), pause_in_ms.unwrap_or(0)))
            }
            EffectSpec::Bounce { .. } => Effect::Bounce(BounceEffect::new(target.sprite, self.bounce_offset)),
            EffectSpec::Transition { image } => {
                let Some(tex) = target.resources.texture(image) else {
                    return Err(unresolved(format!("image '{}' is not loaded", image)));
                };
                Effect::Transition(TransitionEffect::new(target.sprite, image, *tex))
            }
            EffectSpec::FadeOut { speed } => Effect::FadeOut(FadeOutEffect::new(target.sprite, *speed)),
            EffectSpec::Spin { speed } => Effect::Spin(SpinEffect::new(target.sprite, *speed)),
            EffectSpec::Unresolved { reason, .. } => return Err(unresolved(reason.clone())),
        };
        Ok(effect)
    }
}
