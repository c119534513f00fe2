use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use fable_core::config::{AudioConfig, SceneConfig, StageConfig, SystemConfig};

/// 启动器自己的 `[run]` 段
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// 空跑的模拟时长（秒）
    pub seconds: u64,
    /// 按真实时间睡眠，否则尽快跑完
    pub realtime: bool,
    /// 每隔多少帧输出一次舞台摘要
    pub report_every: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seconds: 10,
            realtime: false,
            report_every: 60,
        }
    }
}

#[derive(Serialize)]
struct FullConfig {
    system: SystemConfig,
    stage: StageConfig,
    scene: SceneConfig,
    audio: AudioConfig,
    run: RunConfig,
}

pub fn ensure_config_exists(path: &str) {
    if Path::new(path).exists() {
        return;
    }

    println!("Creating default configuration at '{}'...", path);

    let default_config = FullConfig {
        system: SystemConfig::default(),
        stage: StageConfig::default(),
        scene: SceneConfig::default(),
        audio: AudioConfig::default(),
        run: RunConfig::default(),
    };

    let toml_str = match toml::to_string_pretty(&default_config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to serialize default config: {}", e);
            return;
        }
    };

    if let Err(e) = fs::write(path, toml_str) {
        eprintln!("Failed to write config file: {}", e);
    } else {
        println!("Config file created successfully.");
    }
}
