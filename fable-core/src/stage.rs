use slotmap::{new_key_type, SlotMap};
use crate::backend::Texture;

new_key_type! {
    /// 舞台上一个精灵的句柄
    pub struct SpriteId;
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self { Self { x, y } }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// 可交互物体上的发光滤镜
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlowFilter {
    pub distance: f32,
    pub outer_strength: f32,
    pub color: u32,
}

#[derive(Clone, Debug)]
pub struct Sprite {
    pub texture: String,
    /// 贴图原始尺寸（像素）
    pub size: Vec2,

    pub pos: Vec2,
    pub scale: Vec2,
    pub alpha: f32,
    pub rotation: f32,
    pub anchor: Vec2,

    pub interactive: bool,
    pub glow: Option<GlowFilter>,
}

impl Sprite {
    pub fn new(texture: &str, tex: &Texture) -> Self {
        Self {
            texture: texture.to_string(),
            size: Vec2::new(tex.width, tex.height),
            pos: Vec2::new(0.0, 0.0),
            scale: Vec2::new(1.0, 1.0),
            alpha: 1.0,
            rotation: 0.0,
            anchor: Vec2::new(0.0, 0.0),
            interactive: false,
            glow: None,
        }
    }

    pub fn width(&self) -> f32 {
        self.size.x * self.scale.x.abs()
    }

    pub fn height(&self) -> f32 {
        self.size.y * self.scale.y.abs()
    }

    pub fn set_texture(&mut self, texture: &str, tex: &Texture) {
        self.texture = texture.to_string();
        self.size = Vec2::new(tex.width, tex.height);
    }

    /// 轴对齐包围盒测试，不考虑旋转
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let (w, h) = (self.width(), self.height());
        let left = self.pos.x - self.anchor.x * w;
        let top = self.pos.y - self.anchor.y * h;
        x >= left && x <= left + w && y >= top && y <= top + h
    }
}

/// 核心持有的显示列表；外部渲染器每帧按 draw_order 绘制
pub struct Stage {
    sprites: SlotMap<SpriteId, Sprite>,
    draw_order: Vec<SpriteId>,
    viewport: Viewport,
}

impl Stage {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            sprites: SlotMap::with_key(),
            draw_order: Vec::new(),
            viewport,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, w: f32, h: f32) {
        self.viewport = Viewport { width: w, height: h };
    }

    /// 创建精灵但不加入渲染树
    pub fn create(&mut self, texture: &str, tex: &Texture) -> SpriteId {
        self.sprites.insert(Sprite::new(texture, tex))
    }

    /// 加到渲染树最上层；已在树上则不变
    pub fn attach(&mut self, id: SpriteId) -> bool {
        if !self.sprites.contains_key(id) || self.draw_order.contains(&id) {
            return false;
        }
        self.draw_order.push(id);
        true
    }

    pub fn detach(&mut self, id: SpriteId) -> bool {
        let before = self.draw_order.len();
        self.draw_order.retain(|s| *s != id);
        before != self.draw_order.len()
    }

    pub fn destroy(&mut self, id: SpriteId) -> Option<Sprite> {
        self.detach(id);
        self.sprites.remove(id)
    }

    pub fn is_attached(&self, id: SpriteId) -> bool {
        self.draw_order.contains(&id)
    }

    pub fn get(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.get(id)
    }

    pub fn get_mut(&mut self, id: SpriteId) -> Option<&mut Sprite> {
        self.sprites.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// 按绘制顺序（底 → 顶）遍历已挂载的精灵
    pub fn drawables(&self) -> impl Iterator<Item = (SpriteId, &Sprite)> {
        self.draw_order
            .iter()
            .filter_map(|id| self.sprites.get(*id).map(|s| (*id, s)))
    }

    /// 命中测试：返回最上层、可交互且包含该点的精灵
    pub fn hit_test(&self, x: f32, y: f32) -> Option<SpriteId> {
        self.draw_order
            .iter()
            .rev()
            .copied()
            .find(|id| {
                self.sprites
                    .get(*id)
                    .is_some_and(|s| s.interactive && s.alpha > 0.0 && s.contains(x, y))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tex(w: f32, h: f32) -> Texture {
        Texture { width: w, height: h }
    }

    #[test]
    fn attach_keeps_draw_order_and_ignores_duplicates() {
        let mut stage = Stage::new(Viewport { width: 100.0, height: 100.0 });
        let a = stage.create("a.png", &tex(10.0, 10.0));
        let b = stage.create("b.png", &tex(10.0, 10.0));
        assert!(stage.attach(a));
        assert!(stage.attach(b));
        assert!(!stage.attach(a));

        let order: Vec<_> = stage.drawables().map(|(id, _)| id).collect();
        assert_eq!(order, vec![a, b]);

        assert!(stage.detach(a));
        assert!(!stage.detach(a));
        assert!(stage.get(a).is_some());
    }

    #[test]
    fn hit_test_prefers_topmost_interactive_sprite() {
        let mut stage = Stage::new(Viewport { width: 100.0, height: 100.0 });
        let under = stage.create("a.png", &tex(50.0, 50.0));
        let over = stage.create("b.png", &tex(50.0, 50.0));
        let deco = stage.create("c.png", &tex(50.0, 50.0));
        stage.attach(under);
        stage.attach(over);
        stage.attach(deco);
        stage.get_mut(under).unwrap().interactive = true;
        stage.get_mut(over).unwrap().interactive = true;

        assert_eq!(stage.hit_test(10.0, 10.0), Some(over));
        stage.detach(over);
        assert_eq!(stage.hit_test(10.0, 10.0), Some(under));
        assert_eq!(stage.hit_test(80.0, 80.0), None);
    }

    #[test]
    fn scaled_height_ignores_flip_sign() {
        let mut sprite = Sprite::new("a.png", &tex(20.0, 40.0));
        sprite.scale = Vec2::new(-1.0, 0.5);
        assert_eq!(sprite.height(), 20.0);
        assert_eq!(sprite.width(), 20.0);
    }
}
