//! 不依赖窗口和声卡的协作者实现，供启动器的空跑、测试和基准使用。

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use rustc_hash::FxHashMap;
use crate::backend::{AudioBackend, PlaybackId, Renderer, Resource, ResourceLoader, Resources, SoundClip, Texture};
use crate::manifest::Manifest;
use crate::stage::{Stage, Viewport};

/// 预先登记好的内存资源表
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    available: FxHashMap<String, Resource>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_texture(mut self, alias: &str, width: f32, height: f32) -> Self {
        self.available.insert(alias.to_string(), Resource::Texture(Texture { width, height }));
        self
    }

    pub fn with_sound(mut self, alias: &str, duration: Option<Duration>) -> Self {
        self.available.insert(alias.to_string(), Resource::Sound(SoundClip { duration }));
        self
    }

    /// 按扩展名猜测类型，把 manifest 里的每一项都登记上
    pub fn covering(manifest: &Manifest, texture: Texture) -> Self {
        let mut loader = Self::new();
        for alias in manifest.aliases() {
            let res = if is_audio(alias) {
                Resource::Sound(SoundClip::default())
            } else {
                Resource::Texture(texture)
            };
            loader.available.insert(alias.to_string(), res);
        }
        loader
    }
}

impl ResourceLoader for MemoryLoader {
    fn load_bundle(&mut self, manifest: &Manifest) -> anyhow::Result<Resources> {
        let mut resources = Resources::new();
        let mut missing = Vec::new();
        for entry in manifest.entries() {
            match self.available.get(&entry.src) {
                Some(res) => resources.insert(entry.alias.clone(), res.clone()),
                None => missing.push(entry.src.as_str()),
            }
        }
        if !missing.is_empty() {
            anyhow::bail!("Failed to load {} asset(s): {}", missing.len(), missing.join(", "));
        }
        Ok(resources)
    }
}

pub fn is_audio(alias: &str) -> bool {
    let lower = alias.to_ascii_lowercase();
    ["mp3", "wav", "ogg", "flac"].iter().any(|ext| lower.ends_with(&format!(".{}", ext)))
}

struct Voice {
    id: PlaybackId,
    alias: String,
    ends_at: Duration,
}

#[derive(Default)]
struct AudioState {
    now: Duration,
    next_id: u64,
    default_clip: Duration,
    clips: FxHashMap<String, Duration>,
    volumes: FxHashMap<String, f32>,
    voices: Vec<Voice>,
    finished: Vec<PlaybackId>,
    plays: Vec<(Duration, String)>,
}

/// 模拟时钟上的音频后端：播放经过片段时长后自然结束。
///
/// 克隆出的句柄共享同一状态，测试可以保留一个来检查播放记录。
#[derive(Clone)]
pub struct HeadlessAudio {
    state: Rc<RefCell<AudioState>>,
}

impl HeadlessAudio {
    pub fn new(default_clip: Duration) -> Self {
        let state = AudioState { default_clip, ..Default::default() };
        Self { state: Rc::new(RefCell::new(state)) }
    }

    pub fn with_clip(self, alias: &str, duration: Duration) -> Self {
        self.state.borrow_mut().clips.insert(alias.to_string(), duration);
        self
    }

    /// (开始时间, alias) 的播放记录
    pub fn plays(&self) -> Vec<(Duration, String)> {
        self.state.borrow().plays.clone()
    }

    pub fn volume(&self, alias: &str) -> Option<f32> {
        self.state.borrow().volumes.get(alias).copied()
    }

    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }
}

impl AudioBackend for HeadlessAudio {
    fn play(&mut self, alias: &str) -> PlaybackId {
        let mut st = self.state.borrow_mut();
        st.next_id += 1;
        let id = PlaybackId(st.next_id);
        let clip = st.clips.get(alias).copied().unwrap_or(st.default_clip);
        let ends_at = st.now + clip;
        let now = st.now;
        st.voices.push(Voice { id, alias: alias.to_string(), ends_at });
        st.plays.push((now, alias.to_string()));
        id
    }

    fn stop(&mut self, alias: &str) {
        self.state.borrow_mut().voices.retain(|v| v.alias != alias);
    }

    fn is_playing(&self, alias: &str) -> bool {
        self.state.borrow().voices.iter().any(|v| v.alias == alias)
    }

    fn set_volume(&mut self, alias: &str, volume: f32) {
        self.state.borrow_mut().volumes.insert(alias.to_string(), volume.clamp(0.0, 1.0));
    }

    fn update(&mut self, dt: Duration) {
        let mut st = self.state.borrow_mut();
        st.now += dt;
        let now = st.now;

        let mut done: Vec<(Duration, PlaybackId)> = st.voices
            .iter()
            .filter(|v| v.ends_at <= now)
            .map(|v| (v.ends_at, v.id))
            .collect();
        done.sort();
        st.voices.retain(|v| v.ends_at > now);
        st.finished.extend(done.into_iter().map(|(_, id)| id));
    }

    fn drain_finished(&mut self) -> Vec<PlaybackId> {
        std::mem::take(&mut self.state.borrow_mut().finished)
    }
}

/// 只记录每帧画了哪些贴图的渲染器
pub struct RecordingRenderer {
    viewport: Viewport,
    pub frames: Vec<Vec<String>>,
}

impl RecordingRenderer {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            viewport: Viewport { width, height },
            frames: Vec::new(),
        }
    }

    pub fn last_frame(&self) -> Option<&[String]> {
        self.frames.last().map(|f| f.as_slice())
    }
}

impl Renderer for RecordingRenderer {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn draw(&mut self, stage: &Stage) {
        self.frames.push(stage.drawables().map(|(_, s)| s.texture.clone()).collect());
    }
}
