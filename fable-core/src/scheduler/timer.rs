use std::time::Duration;

/// 定时器句柄，可用于取消
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

// 重复定时器的最小间隔，避免一次 advance 内无限触发
const MIN_INTERVAL: Duration = Duration::from_millis(1);

struct Timer<T> {
    id: TimerId,
    due: Duration,
    interval: Option<Duration>,
    task: T,
}

/// 单线程的延时任务队列。时间只由 `advance` 推进。
pub struct TimerQueue<T> {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self { now: Duration::ZERO, next_id: 0, timers: Vec::new() }
    }
}

impl<T: Clone> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, delay: Duration, task: T) -> TimerId {
        self.insert(delay, None, task)
    }

    pub fn schedule_repeating(&mut self, interval: Duration, task: T) -> TimerId {
        let interval = interval.max(MIN_INTERVAL);
        self.insert(interval, Some(interval), task)
    }

    fn insert(&mut self, delay: Duration, interval: Option<Duration>, task: T) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.push(Timer { id, due: self.now + delay, interval, task });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        before != self.timers.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// 推进时间并按 (到期时间, 创建顺序) 返回所有到期任务。
    /// 重复定时器每经过一个间隔触发一次。
    pub fn advance(&mut self, dt: Duration) -> Vec<(TimerId, T)> {
        self.now += dt;
        let mut fired = Vec::new();

        loop {
            let next = self.timers
                .iter()
                .enumerate()
                .filter(|(_, t)| t.due <= self.now)
                .min_by_key(|(_, t)| (t.due, t.id))
                .map(|(i, _)| i);
            let Some(idx) = next else { break };

            match self.timers[idx].interval {
                Some(interval) => {
                    let timer = &mut self.timers[idx];
                    fired.push((timer.id, timer.task.clone()));
                    timer.due += interval;
                }
                None => {
                    let timer = self.timers.swap_remove(idx);
                    fired.push((timer.id, timer.task));
                }
            }
        }

        fired
    }
}
