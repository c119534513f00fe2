use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde::ser::SerializeMap;

/// 声明式效果描述，按 `name` 字段区分
#[derive(Debug, Clone, PartialEq)]
pub enum EffectSpec {
    Audio { sound: String },
    Move { speed: f32, direction: Direction, pause_in_ms: Option<u64> },
    Bounce { speed: f32 },
    Transition { image: String },
    FadeOut { speed: f32 },
    Spin { speed: f32 },
    /// 未知的 name，或参数不合法；文档照常加载，构建时跳过
    Unresolved { name: String, reason: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[serde(alias = "right_to_left")]
    Left,
    #[default]
    #[serde(alias = "left_to_right")]
    Right,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }
}

impl EffectSpec {
    pub fn name(&self) -> &str {
        match self {
            EffectSpec::Audio { .. } => "audio",
            EffectSpec::Move { .. } => "move",
            EffectSpec::Bounce { .. } => "bounce",
            EffectSpec::Transition { .. } => "transition",
            EffectSpec::FadeOut { .. } => "fade_out",
            EffectSpec::Spin { .. } => "spin",
            EffectSpec::Unresolved { name, .. } => name,
        }
    }

    /// 该效果引用的资源（音频或图片），用于生成 manifest
    pub fn asset(&self) -> Option<&str> {
        match self {
            EffectSpec::Audio { sound } => Some(sound),
            EffectSpec::Transition { image } => Some(image),
            _ => None,
        }
    }
}

// 序列化/反序列化用的镜像类型，Unresolved 不在其中
#[derive(Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
enum Tagged {
    Audio { sound: String },
    Move {
        speed: f32,
        #[serde(default)]
        direction: Direction,
        #[serde(default, deserialize_with = "super::de_opt_millis")]
        pause_in_ms: Option<u64>,
    },
    Bounce {
        #[serde(default)]
        speed: f32,
    },
    Transition { image: String },
    FadeOut { speed: f32 },
    Spin {
        #[serde(default = "default_spin_speed")]
        speed: f32,
    },
}

fn default_spin_speed() -> f32 {
    0.1
}

impl From<Tagged> for EffectSpec {
    fn from(t: Tagged) -> Self {
        match t {
            Tagged::Audio { sound } => EffectSpec::Audio { sound },
            Tagged::Move { speed, direction, pause_in_ms } => EffectSpec::Move { speed, direction, pause_in_ms },
            Tagged::Bounce { speed } => EffectSpec::Bounce { speed },
            Tagged::Transition { image } => EffectSpec::Transition { image },
            Tagged::FadeOut { speed } => EffectSpec::FadeOut { speed },
            Tagged::Spin { speed } => EffectSpec::Spin { speed },
        }
    }
}

impl<'de> Deserialize<'de> for EffectSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let name = value
            .get("name")
            .and_then(|n| n.as_str())
            .unwrap_or_default()
            .to_string();

        match serde_json::from_value::<Tagged>(value) {
            Ok(tagged) => Ok(tagged.into()),
            Err(e) => Ok(EffectSpec::Unresolved { name, reason: e.to_string() }),
        }
    }
}

impl Serialize for EffectSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tagged = match self.clone() {
            EffectSpec::Audio { sound } => Tagged::Audio { sound },
            EffectSpec::Move { speed, direction, pause_in_ms } => Tagged::Move { speed, direction, pause_in_ms },
            EffectSpec::Bounce { speed } => Tagged::Bounce { speed },
            EffectSpec::Transition { image } => Tagged::Transition { image },
            EffectSpec::FadeOut { speed } => Tagged::FadeOut { speed },
            EffectSpec::Spin { speed } => Tagged::Spin { speed },
            EffectSpec::Unresolved { name, .. } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("name", &name)?;
                return map.end();
            }
        };
        tagged.serialize(serializer)
    }
}
