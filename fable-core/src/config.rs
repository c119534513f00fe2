use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub story_path:  String,
    pub assets_path: String,
    pub log_path:    String,
    pub log_level:   String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub width: f32,
    pub height: f32,
    pub frame_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// 周期性重新执行 show/onload 的角色名，None 表示关闭
    pub retrigger_character: Option<String>,
    pub retrigger_interval_ms: u64,
    /// bounce 效果向上移动的像素
    pub bounce_offset: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// HeadlessAudio 中没有时长信息的音频按这个时长结束
    pub default_clip_ms: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            story_path:  "story/story.json".into(),
            assets_path: "story/".into(),
            log_path:    "logs/".into(),
            log_level:   "info".into(),
        }
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 1024.0,
            frame_rate: 60,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            retrigger_character: None,
            retrigger_interval_ms: 2000,
            bounce_offset: 100.0,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            default_clip_ms: 3000,
        }
    }
}

impl SceneConfig {
    pub fn load() -> Self {
        fable_shared::config::get("scene")
    }
}

impl StageConfig {
    pub fn load() -> Self {
        fable_shared::config::get("stage")
    }
}
