use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;
use crate::backend::{AudioBackend, PlaybackId, Resources};
use crate::character::CharacterId;
use crate::effect::EffectCx;
use crate::event::RuntimeEvent;
use crate::scheduler::{delta_frames, AnimationScheduler, Motion, TickId, TimerQueue};
use crate::stage::{Stage, Viewport};

/// 定时器到期后要做的事
#[derive(Debug, Clone, PartialEq)]
pub enum TimerTask {
    /// 播放当前场景的第 link 条音频
    PlaySound { link: usize },
    /// 延迟启动的逐帧登记（move 的 pause_in_ms）
    StartMotion { tick: TickId, motion: Motion },
    /// 场景级的周期性重新 show
    Retrigger { character: CharacterId },
}

/// 单线程运行时的全部可变状态
pub struct World {
    pub stage: Stage,
    pub animator: AnimationScheduler,
    pub timers: TimerQueue<TimerTask>,
    pub audio: Box<dyn AudioBackend>,
    pub resources: Rc<Resources>,
    events: VecDeque<RuntimeEvent>,
}

impl World {
    pub fn new(viewport: Viewport, resources: Rc<Resources>, audio: Box<dyn AudioBackend>) -> Self {
        Self {
            stage: Stage::new(viewport),
            animator: AnimationScheduler::new(),
            timers: TimerQueue::new(),
            audio,
            resources,
            events: VecDeque::new(),
        }
    }

    pub fn push(&mut self, event: RuntimeEvent) {
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<RuntimeEvent> {
        self.events.drain(..).collect()
    }

    pub fn effect_cx(&mut self) -> EffectCx<'_> {
        EffectCx {
            stage: &mut self.stage,
            animator: &mut self.animator,
            timers: &mut self.timers,
            audio: self.audio.as_mut(),
            events: &mut self.events,
        }
    }

    /// 推进音频和定时器的时钟，返回到期任务
    pub fn advance_clock(&mut self, dt: Duration) -> Vec<TimerTask> {
        self.audio.update(dt);
        self.timers.advance(dt).into_iter().map(|(_, task)| task).collect()
    }

    pub fn finished_playbacks(&mut self) -> Vec<PlaybackId> {
        self.audio.drain_finished()
    }

    /// 执行一帧逐帧登记项
    pub fn tick(&mut self, dt: Duration) {
        let delta = delta_frames(dt);
        for (id, motion) in self.animator.tick(&mut self.stage, delta) {
            log::debug!("Tick {:?} finished: {}", id, motion.kind());
            let sprite = motion.sprite();
            // 淡出结束时精灵仍在，只是已从渲染树摘下
            if matches!(motion, Motion::Fade { .. }) && self.stage.get(sprite).is_some() {
                self.push(RuntimeEvent::SpriteRemoved { sprite });
            }
            self.push(RuntimeEvent::MotionFinished { sprite, kind: motion.kind() });
        }
    }
}
