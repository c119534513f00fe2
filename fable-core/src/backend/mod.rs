pub mod headless;

use std::time::Duration;
use rustc_hash::FxHashMap;
use crate::manifest::Manifest;
use crate::stage::{Stage, Viewport};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Texture {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SoundClip {
    /// 解码器给出的时长；未知时为 None
    pub duration: Option<Duration>,
}

/// 已加载的资源句柄
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Texture(Texture),
    Sound(SoundClip),
}

/// 按 alias 查找的只读资源表
#[derive(Debug, Clone, Default)]
pub struct Resources {
    entries: FxHashMap<String, Resource>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, alias: impl Into<String>, res: Resource) {
        self.entries.insert(alias.into(), res);
    }

    pub fn get(&self, alias: &str) -> Option<&Resource> {
        self.entries.get(alias)
    }

    pub fn texture(&self, alias: &str) -> Option<&Texture> {
        match self.entries.get(alias) {
            Some(Resource::Texture(t)) => Some(t),
            _ => None,
        }
    }

    pub fn sound(&self, alias: &str) -> Option<&SoundClip> {
        match self.entries.get(alias) {
            Some(Resource::Sound(s)) => Some(s),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 音频播放的一次实例，完成通知通过它回传
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaybackId(pub u64);

/// 资源加载器：任何一项失败都会让整个故事加载失败
pub trait ResourceLoader {
    fn load_bundle(&mut self, manifest: &Manifest) -> anyhow::Result<Resources>;
}

pub trait AudioBackend {
    /// 从头播放 alias 对应的音频
    fn play(&mut self, alias: &str) -> PlaybackId;
    fn stop(&mut self, alias: &str);
    fn is_playing(&self, alias: &str) -> bool;
    fn set_volume(&mut self, alias: &str, volume: f32);
    /// 推进后端自身的时间，默认什么也不做
    fn update(&mut self, _dt: Duration) {}
    /// 取出自上次调用以来自然播放结束的实例
    fn drain_finished(&mut self) -> Vec<PlaybackId>;
}

pub trait Renderer {
    fn viewport(&self) -> Viewport;
    fn draw(&mut self, stage: &Stage);
}
