use std::time::Duration;
use rustc_hash::{FxHashMap, FxHashSet};
use crate::backend::PlaybackId;
use crate::event::RuntimeEvent;
use crate::runtime::{TimerTask, World};
use crate::scheduler::TimerId;
use crate::story::SoundSpec;

/// 场景的环境音/旁白调度：按 wait_in_ms 延迟播放，播放完成后沿 next 接下一条
pub struct SoundChain {
    links: Vec<SoundSpec>,
    /// 播放中、且有 next 的实例 → 所在 link
    awaiting: FxHashMap<PlaybackId, usize>,
    pending: Vec<TimerId>,
}

impl SoundChain {
    pub fn new(links: Vec<SoundSpec>) -> Self {
        Self {
            links,
            awaiting: FxHashMap::default(),
            pending: Vec::new(),
        }
    }

    pub fn links(&self) -> &[SoundSpec] {
        &self.links
    }

    /// 自动开始的链头。没有被任何音频 next 指向、且定义了 wait_in_ms 的音频先入选；
    /// 剩下从这些链头走不到的（例如自循环或首尾相接的环），取声明顺序中
    /// 第一个定义了 wait_in_ms 的作为该环的链头。
    pub fn roots(&self) -> Vec<usize> {
        let targeted: FxHashSet<&str> = self.links
            .iter()
            .filter_map(|s| s.next.as_deref())
            .collect();

        let mut roots: Vec<usize> = self.links
            .iter()
            .enumerate()
            .filter(|(_, s)| s.wait_in_ms.is_some())
            .filter(|(_, s)| !s.id.as_deref().is_some_and(|id| targeted.contains(id)))
            .map(|(i, _)| i)
            .collect();

        let mut reached = FxHashSet::default();
        for &root in &roots {
            self.mark_reachable(root, &mut reached);
        }
        for (i, s) in self.links.iter().enumerate() {
            if s.wait_in_ms.is_some() && !reached.contains(&i) {
                roots.push(i);
                self.mark_reachable(i, &mut reached);
            }
        }

        roots.sort_unstable();
        roots
    }

    /// link 播完后会接上的音频：id 等于它的 next 的全部条目
    fn successors(&self, link: usize) -> Vec<usize> {
        let Some(next) = self.links[link].next.as_deref() else {
            return Vec::new();
        };
        self.links
            .iter()
            .enumerate()
            .filter(|(_, s)| s.id.as_deref() == Some(next))
            .map(|(i, _)| i)
            .collect()
    }

    fn mark_reachable(&self, from: usize, reached: &mut FxHashSet<usize>) {
        let mut stack = vec![from];
        while let Some(link) = stack.pop() {
            if reached.insert(link) {
                stack.extend(self.successors(link));
            }
        }
    }

    pub fn start(&mut self, world: &mut World) {
        let roots = self.roots();
        log::debug!("Starting {} sound chain(s)", roots.len());
        for link in roots {
            self.schedule(link, world);
        }
    }

    fn schedule(&mut self, link: usize, world: &mut World) {
        let wait = self.links[link].wait_in_ms.unwrap_or(0);
        let timer = world.timers.schedule(Duration::from_millis(wait), TimerTask::PlaySound { link });
        self.pending.push(timer);
    }

    /// 定时器到期：设置音量并播放
    pub fn play(&mut self, link: usize, world: &mut World) {
        self.pending.retain(|t| world.timers.is_pending(*t));
        let Some(spec) = self.links.get(link) else {
            log::warn!("Sound link {} out of range", link);
            return;
        };

        world.audio.set_volume(&spec.file, spec.volume);
        let playback = world.audio.play(&spec.file);
        log::debug!("Sound '{}' playing (volume {})", spec.file, spec.volume);
        world.push(RuntimeEvent::SoundStarted { alias: spec.file.clone(), playback });

        if spec.next.is_some() {
            self.awaiting.insert(playback, link);
        }
    }

    /// 某次播放自然结束；不属于本链时返回 false
    pub fn on_finished(&mut self, playback: PlaybackId, world: &mut World) -> bool {
        let Some(link) = self.awaiting.remove(&playback) else {
            return false;
        };
        let matches = self.successors(link);
        if matches.is_empty() {
            log::debug!("Sound chain ends: no sound with id '{}'", self.links[link].next.as_deref().unwrap_or_default());
        }
        for target in matches {
            self.schedule(target, world);
        }
        true
    }

    /// 取消尚未触发的播放，停止等待接续的音频
    pub fn stop(&mut self, world: &mut World) {
        for timer in self.pending.drain(..) {
            world.timers.cancel(timer);
        }
        for (_, link) in self.awaiting.drain() {
            world.audio.stop(&self.links[link].file);
        }
    }
}
