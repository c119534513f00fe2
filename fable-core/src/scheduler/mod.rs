mod motion;
pub mod timer;

pub use motion::{Motion, MotionStatus};
pub use timer::{TimerId, TimerQueue};

use std::time::Duration;
use crate::stage::Stage;

/// 60Hz 下一帧的时长，delta = 1.0 对应一帧
pub const FRAME_MS: f32 = 1000.0 / 60.0;

pub fn delta_frames(dt: Duration) -> f32 {
    dt.as_secs_f32() * 1000.0 / FRAME_MS
}

/// 逐帧登记项的稳定句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(u64);

struct Entry {
    id: TickId,
    motion: Motion,
}

/// 有序的逐帧登记表，每帧按登记顺序执行一次
#[derive(Default)]
pub struct AnimationScheduler {
    next_id: u64,
    entries: Vec<Entry>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 先拿到句柄，稍后再用 `register_reserved` 真正登记（用于延迟启动）
    pub fn reserve(&mut self) -> TickId {
        self.next_id += 1;
        TickId(self.next_id)
    }

    pub fn register(&mut self, motion: Motion) -> TickId {
        let id = self.reserve();
        log::debug!("Tick {:?} registered: {} on {:?}", id, motion.kind(), motion.sprite());
        self.entries.push(Entry { id, motion });
        id
    }

    pub fn register_reserved(&mut self, id: TickId, motion: Motion) -> bool {
        if self.is_registered(id) {
            return false;
        }
        log::debug!("Tick {:?} registered (deferred): {} on {:?}", id, motion.kind(), motion.sprite());
        self.entries.push(Entry { id, motion });
        true
    }

    pub fn deregister(&mut self, id: TickId) -> Option<Motion> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(idx).motion)
    }

    pub fn is_registered(&self, id: TickId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn get(&self, id: TickId) -> Option<&Motion> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.motion)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 执行一帧，返回本帧结束的登记项
    pub fn tick(&mut self, stage: &mut Stage, delta: f32) -> Vec<(TickId, Motion)> {
        let mut finished = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].motion.step(stage, delta) == MotionStatus::Finished {
                let e = self.entries.remove(i);
                finished.push((e.id, e.motion));
            } else {
                i += 1;
            }
        }
        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Texture;
    use crate::stage::Viewport;

    fn stage_with_sprite() -> (Stage, crate::stage::SpriteId) {
        let mut stage = Stage::new(Viewport { width: 200.0, height: 200.0 });
        let id = stage.create("a.png", &Texture { width: 20.0, height: 50.0 });
        stage.attach(id);
        (stage, id)
    }

    #[test]
    fn one_frame_at_sixty_hz_is_unit_delta() {
        let d = delta_frames(Duration::from_micros(16_667));
        assert!((d - 1.0).abs() < 0.001);
    }

    #[test]
    fn motions_run_in_registration_order_and_deregister() {
        let (mut stage, id) = stage_with_sprite();
        let mut sched = AnimationScheduler::new();
        let drift = sched.register(Motion::Drift { sprite: id, velocity: 2.0 });
        let spin = sched.register(Motion::Spin { sprite: id, speed: 0.5 });

        sched.tick(&mut stage, 1.0);
        assert_eq!(stage.get(id).unwrap().pos.x, 2.0);
        assert_eq!(stage.get(id).unwrap().rotation, 0.5);

        assert!(sched.deregister(drift).is_some());
        assert!(sched.deregister(drift).is_none());
        sched.tick(&mut stage, 1.0);
        assert_eq!(stage.get(id).unwrap().pos.x, 2.0);
        assert!(sched.is_registered(spin));
    }

    #[test]
    fn reserved_ids_are_inactive_until_registered() {
        let (_stage, id) = stage_with_sprite();
        let mut sched = AnimationScheduler::new();
        let tick = sched.reserve();
        assert!(!sched.is_registered(tick));
        assert!(sched.register_reserved(tick, Motion::Spin { sprite: id, speed: 1.0 }));
        assert!(!sched.register_reserved(tick, Motion::Spin { sprite: id, speed: 1.0 }));
        assert_eq!(sched.len(), 1);
    }

    #[test]
    fn motions_on_destroyed_sprites_finish() {
        let (mut stage, id) = stage_with_sprite();
        let mut sched = AnimationScheduler::new();
        let tick = sched.register(Motion::Drift { sprite: id, velocity: 1.0 });
        stage.destroy(id);
        let finished = sched.tick(&mut stage, 1.0);
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].0, tick);
        assert!(sched.is_empty());
    }
}
