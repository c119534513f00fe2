use crate::effect::{EffectCx, Execute};
use crate::event::RuntimeEvent;

/// 播放一个音频；正在播放时先停再从头播，保证同一时间最多一份
#[derive(Debug, Clone)]
pub struct AudioEffect {
    sound: String,
}

impl AudioEffect {
    pub fn new(sound: &str) -> Self {
        Self { sound: sound.to_string() }
    }

    pub fn sound(&self) -> &str {
        &self.sound
    }
}

impl Execute for AudioEffect {
    fn execute(&mut self, cx: &mut EffectCx) {
        if cx.audio.is_playing(&self.sound) {
            log::debug!("Restarting sound '{}'", self.sound);
            cx.audio.stop(&self.sound);
        }
        let playback = cx.audio.play(&self.sound);
        cx.events.push_back(RuntimeEvent::SoundStarted { alias: self.sound.clone(), playback });
    }

    fn cancel(&mut self, cx: &mut EffectCx) {
        if cx.audio.is_playing(&self.sound) {
            cx.audio.stop(&self.sound);
        }
    }
}
