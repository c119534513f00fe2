use std::time::Duration;
use crate::effect::{EffectCx, Execute};
use crate::runtime::TimerTask;
use crate::scheduler::{Motion, TickId, TimerId};
use crate::stage::{SpriteId, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveState {
    Idle,
    /// 在等 pause_in_ms，到期后 tick 才真正登记
    Pending { timer: TimerId, tick: TickId },
    Moving(TickId),
}

/// 水平匀速移动，触发一次后一直运行，直到被 cancel
#[derive(Debug, Clone)]
pub struct MoveEffect {
    sprite: SpriteId,
    velocity: f32,
    pause: Duration,
    state: MoveState,
}

impl MoveEffect {
    pub fn new(sprite: SpriteId, velocity: f32, pause_in_ms: u64) -> Self {
        Self {
            sprite,
            velocity,
            pause: Duration::from_millis(pause_in_ms),
            state: MoveState::Idle,
        }
    }

    pub fn state(&self) -> MoveState {
        self.state
    }

    // 定时器到期或登记被外部移除后，同步一下自身状态
    fn refresh(&mut self, cx: &EffectCx) {
        self.state = match self.state {
            MoveState::Pending { timer, tick } if !cx.timers.is_pending(timer) => {
                if cx.animator.is_registered(tick) { MoveState::Moving(tick) } else { MoveState::Idle }
            }
            MoveState::Moving(tick) if !cx.animator.is_registered(tick) => MoveState::Idle,
            other => other,
        };
    }
}

impl Execute for MoveEffect {
    fn execute(&mut self, cx: &mut EffectCx) {
        self.refresh(cx);
        if self.state != MoveState::Idle {
            log::debug!("Move on {:?} already started, ignoring trigger", self.sprite);
            return;
        }

        let motion = Motion::Drift { sprite: self.sprite, velocity: self.velocity };
        if self.pause.is_zero() {
            self.state = MoveState::Moving(cx.animator.register(motion));
        } else {
            log::debug!("Move on {:?} waits {:?}", self.sprite, self.pause);
            let tick = cx.animator.reserve();
            let timer = cx.timers.schedule(self.pause, TimerTask::StartMotion { tick, motion });
            self.state = MoveState::Pending { timer, tick };
        }
    }

    fn cancel(&mut self, cx: &mut EffectCx) {
        match self.state {
            MoveState::Pending { timer, tick } => {
                cx.timers.cancel(timer);
                cx.animator.deregister(tick);
            }
            MoveState::Moving(tick) => {
                cx.animator.deregister(tick);
            }
            MoveState::Idle => {}
        }
        self.state = MoveState::Idle;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinState {
    Idle,
    Active(TickId),
}

/// 旋转开关：Idle ⇄ Active，停下时角度归零
#[derive(Debug, Clone)]
pub struct SpinEffect {
    sprite: SpriteId,
    speed: f32,
    state: SpinState,
}

impl SpinEffect {
    pub fn new(sprite: SpriteId, speed: f32) -> Self {
        Self { sprite, speed, state: SpinState::Idle }
    }

    pub fn state(&self) -> SpinState {
        self.state
    }
}

impl Execute for SpinEffect {
    fn execute(&mut self, cx: &mut EffectCx) {
        self.state = match self.state {
            SpinState::Idle => {
                if let Some(sprite) = cx.stage.get_mut(self.sprite) {
                    sprite.anchor = Vec2::new(0.5, 0.5);
                }
                SpinState::Active(cx.animator.register(Motion::Spin { sprite: self.sprite, speed: self.speed }))
            }
            SpinState::Active(tick) => {
                cx.animator.deregister(tick);
                if let Some(sprite) = cx.stage.get_mut(self.sprite) {
                    sprite.rotation = 0.0;
                }
                SpinState::Idle
            }
        };
    }

    fn cancel(&mut self, cx: &mut EffectCx) {
        if let SpinState::Active(tick) = self.state {
            cx.animator.deregister(tick);
        }
        self.state = SpinState::Idle;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeState {
    Idle,
    Fading(TickId),
    /// 已经淡出并从渲染树摘下，之后的触发都无效
    Done,
}

#[derive(Debug, Clone)]
pub struct FadeOutEffect {
    sprite: SpriteId,
    speed: f32,
    state: FadeState,
}

impl FadeOutEffect {
    pub fn new(sprite: SpriteId, speed: f32) -> Self {
        Self { sprite, speed, state: FadeState::Idle }
    }

    pub fn state(&self) -> FadeState {
        self.state
    }
}

impl Execute for FadeOutEffect {
    fn execute(&mut self, cx: &mut EffectCx) {
        if let FadeState::Fading(tick) = self.state {
            if !cx.animator.is_registered(tick) {
                self.state = FadeState::Done;
            }
        }

        match self.state {
            FadeState::Idle => {
                let tick = cx.animator.register(Motion::Fade { sprite: self.sprite, speed: self.speed });
                self.state = FadeState::Fading(tick);
            }
            FadeState::Fading(_) => log::debug!("Fade on {:?} already running", self.sprite),
            FadeState::Done => log::debug!("Fade on {:?} already finished", self.sprite),
        }
    }

    fn cancel(&mut self, cx: &mut EffectCx) {
        if let FadeState::Fading(tick) = self.state {
            cx.animator.deregister(tick);
            self.state = FadeState::Idle;
        }
    }
}
