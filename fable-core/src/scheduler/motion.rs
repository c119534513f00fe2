use crate::stage::{SpriteId, Stage};

/// 每帧对一个精灵做的连续修改；各变体只改互不相交的属性
#[derive(Debug, Clone, PartialEq)]
pub enum Motion {
    /// 竖直方向：半隐式欧拉积分，落地后速度清零
    Gravity { sprite: SpriteId, strength: f32, velocity: f32 },
    /// 水平方向匀速平移，velocity 带符号
    Drift { sprite: SpriteId, velocity: f32 },
    Spin { sprite: SpriteId, speed: f32 },
    /// alpha 衰减到 0 后把精灵从渲染树上摘下并结束
    Fade { sprite: SpriteId, speed: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionStatus {
    Running,
    Finished,
}

impl Motion {
    pub fn sprite(&self) -> SpriteId {
        match self {
            Motion::Gravity { sprite, .. }
            | Motion::Drift { sprite, .. }
            | Motion::Spin { sprite, .. }
            | Motion::Fade { sprite, .. } => *sprite,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Motion::Gravity { .. } => "gravity",
            Motion::Drift { .. } => "move",
            Motion::Spin { .. } => "spin",
            Motion::Fade { .. } => "fade_out",
        }
    }

    pub fn step(&mut self, stage: &mut Stage, delta: f32) -> MotionStatus {
        let id = self.sprite();
        let floor_line = stage.viewport().height;
        let Some(sprite) = stage.get_mut(id) else {
            // 精灵已被销毁，登记自然失效
            return MotionStatus::Finished;
        };

        match self {
            Motion::Gravity { strength, velocity, .. } => {
                *velocity += *strength * delta;
                sprite.pos.y += *velocity * delta;
                let floor = floor_line - sprite.height();
                if sprite.pos.y > floor {
                    sprite.pos.y = floor;
                    *velocity = 0.0;
                }
                MotionStatus::Running
            }
            Motion::Drift { velocity, .. } => {
                sprite.pos.x += *velocity * delta;
                MotionStatus::Running
            }
            Motion::Spin { speed, .. } => {
                sprite.rotation += *speed * delta;
                MotionStatus::Running
            }
            Motion::Fade { speed, .. } => {
                sprite.alpha -= *speed * delta;
                if sprite.alpha > 0.0 {
                    return MotionStatus::Running;
                }
                sprite.alpha = 0.0;
                stage.detach(id);
                MotionStatus::Finished
            }
        }
    }
}
