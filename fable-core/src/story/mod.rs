mod effect;

pub use effect::{Direction, EffectSpec};

use std::collections::BTreeMap;
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// 已解析的故事文档，加载后不再修改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryDocument {
    #[serde(default)]
    pub settings: StorySettings,
    pub splash: Splash,
    pub start: String,
    pub scenes: BTreeMap<String, SceneSpec>,
}

impl StoryDocument {
    pub fn from_json(source: &str) -> Result<Self> {
        let doc: StoryDocument = serde_json::from_str(source)
            .context("Failed to parse story document")?;
        if !doc.scenes.contains_key(&doc.start) {
            anyhow::bail!("Start scene '{}' is not defined in the story", doc.start);
        }
        Ok(doc)
    }

    pub fn scene(&self, id: &str) -> Option<&SceneSpec> {
        self.scenes.get(id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorySettings {
    #[serde(default)]
    pub interactive: InteractiveStyle,
}

/// 可交互物体的发光提示参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractiveStyle {
    pub distance: f32,
    pub strength: f32,
    #[serde(deserialize_with = "de_color")]
    pub color: u32,
}

impl Default for InteractiveStyle {
    fn default() -> Self {
        Self {
            distance: 10.0,
            strength: 2.0,
            color: 0xFFFFFF,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Splash {
    pub image: String,
    pub sound: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSpec {
    pub background: String,
    #[serde(default)]
    pub sounds: Vec<SoundSpec>,
    #[serde(default)]
    pub objects: Vec<CharacterSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundSpec {
    #[serde(default)]
    pub id: Option<String>,
    pub file: String,
    #[serde(default = "full_volume")]
    pub volume: f32,
    /// 没有 wait_in_ms 的音频不会自动播放
    #[serde(default, deserialize_with = "de_opt_millis")]
    pub wait_in_ms: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
}

fn full_volume() -> f32 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterSpec {
    pub name: String,
    pub image: String,
    pub position: Position,
    #[serde(default)]
    pub settings: Option<CharacterSettings>,
    #[serde(default)]
    pub actions: BTreeMap<String, ActionSpec>,
}

impl CharacterSpec {
    pub fn gravity(&self) -> f32 {
        self.settings.as_ref().map_or(0.0, |s| s.gravity)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x1: f32,
    pub y1: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterSettings {
    pub scale: Option<Scale>,
    pub gravity: f32,
    pub flip: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub height: f32,
    pub width: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionSpec {
    #[serde(default)]
    pub effects: Vec<EffectSpec>,
}

// 颜色既可以写数字，也可以写 "#ffcc00" / "0xffcc00"
fn de_color<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawColor {
        Number(u32),
        Text(String),
    }

    match RawColor::deserialize(deserializer)? {
        RawColor::Number(n) => Ok(n),
        RawColor::Text(s) => {
            let hex = s.trim_start_matches('#').trim_start_matches("0x").trim_start_matches("0X");
            u32::from_str_radix(hex, 16)
                .map_err(|_| serde::de::Error::custom(format!("invalid color '{}'", s)))
        }
    }
}

// 毫秒数既可以写整数，也可以写 1000.0 这样的小数（四舍五入）
pub(crate) fn de_opt_millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawMillis {
        Int(u64),
        Float(f64),
    }

    match Option::<RawMillis>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawMillis::Int(n)) => Ok(Some(n)),
        Some(RawMillis::Float(f)) if f.is_finite() && f >= 0.0 => Ok(Some(f.round() as u64)),
        Some(RawMillis::Float(f)) => Err(serde::de::Error::custom(format!("invalid duration {} ms", f))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal(extra_settings: serde_json::Value) -> serde_json::Value {
        json!({
            "settings": extra_settings,
            "splash": {"image": "s.png", "sound": "s.mp3"},
            "start": "room",
            "scenes": {
                "room": {"background": "bg.png", "objects": []}
            }
        })
    }

    #[test]
    fn color_accepts_number_and_hex_text() {
        let doc = StoryDocument::from_json(
            &minimal(json!({"interactive": {"distance": 5, "strength": 1, "color": "#ff8800"}})).to_string(),
        ).unwrap();
        assert_eq!(doc.settings.interactive.color, 0xff8800);

        let doc = StoryDocument::from_json(
            &minimal(json!({"interactive": {"color": 255}})).to_string(),
        ).unwrap();
        assert_eq!(doc.settings.interactive.color, 255);
        assert_eq!(doc.settings.interactive.distance, 10.0);
    }

    #[test]
    fn missing_sounds_and_settings_default_to_inert() {
        let doc = StoryDocument::from_json(&minimal(json!({})).to_string()).unwrap();
        let room = doc.scene("room").unwrap();
        assert!(room.sounds.is_empty());
        assert_eq!(doc.settings.interactive, InteractiveStyle::default());
    }

    #[test]
    fn unknown_start_scene_is_rejected() {
        let mut raw = minimal(json!({}));
        raw["start"] = json!("attic");
        let err = StoryDocument::from_json(&raw.to_string()).unwrap_err();
        assert!(err.to_string().contains("attic"));
    }

    #[test]
    fn sound_volume_defaults_to_full() {
        let sound: SoundSpec = serde_json::from_value(json!({"file": "a.mp3", "wait_in_ms": 10})).unwrap();
        assert_eq!(sound.volume, 1.0);
        assert_eq!(sound.wait_in_ms, Some(10));
        assert!(sound.next.is_none());
    }

    #[test]
    fn wait_accepts_fractional_millis() {
        let sound: SoundSpec = serde_json::from_value(json!({"file": "a.mp3", "wait_in_ms": 1000.0})).unwrap();
        assert_eq!(sound.wait_in_ms, Some(1000));
        let sound: SoundSpec = serde_json::from_value(json!({"file": "a.mp3", "wait_in_ms": 249.6})).unwrap();
        assert_eq!(sound.wait_in_ms, Some(250));
        assert!(serde_json::from_value::<SoundSpec>(json!({"file": "a.mp3", "wait_in_ms": -5})).is_err());
    }
}
