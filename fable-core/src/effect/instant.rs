use crate::backend::Texture;
use crate::effect::{EffectCx, Execute};
use crate::stage::SpriteId;

/// 一次性上移固定距离，没有回落动画
#[derive(Debug, Clone)]
pub struct BounceEffect {
    sprite: SpriteId,
    offset: f32,
}

impl BounceEffect {
    pub fn new(sprite: SpriteId, offset: f32) -> Self {
        Self { sprite, offset }
    }
}

impl Execute for BounceEffect {
    fn execute(&mut self, cx: &mut EffectCx) {
        if let Some(sprite) = cx.stage.get_mut(self.sprite) {
            sprite.pos.y -= self.offset;
        }
    }
}

/// 一次性换贴图
#[derive(Debug, Clone)]
pub struct TransitionEffect {
    sprite: SpriteId,
    image: String,
    texture: Texture,
}

impl TransitionEffect {
    pub fn new(sprite: SpriteId, image: &str, texture: Texture) -> Self {
        Self { sprite, image: image.to_string(), texture }
    }
}

impl Execute for TransitionEffect {
    fn execute(&mut self, cx: &mut EffectCx) {
        if let Some(sprite) = cx.stage.get_mut(self.sprite) {
            log::debug!("Texture '{}' -> '{}'", sprite.texture, self.image);
            sprite.set_texture(&self.image, &self.texture);
        }
    }
}
