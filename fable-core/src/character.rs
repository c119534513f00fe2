use std::rc::Rc;
use serde::{Deserialize, Serialize};
use crate::effect::Target;
use crate::event::RuntimeEvent;
use crate::runtime::World;
use crate::scheduler::{Motion, TickId};
use crate::stage::{SpriteId, Vec2};
use crate::story::CharacterSpec;
use crate::trigger::{Bindings, TriggerBinder};

/// 场景内角色的编号（声明顺序），名字可能重复，所以不用名字做键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterId(pub usize);

pub struct RuntimeCharacter {
    id: CharacterId,
    spec: CharacterSpec,
    sprite: Option<SpriteId>,
    bindings: Bindings,
    gravity: Option<TickId>,
}

impl RuntimeCharacter {
    pub fn new(id: CharacterId, spec: CharacterSpec) -> Self {
        Self {
            id,
            spec,
            sprite: None,
            bindings: Bindings::default(),
            gravity: None,
        }
    }

    pub fn id(&self) -> CharacterId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn spec(&self) -> &CharacterSpec {
        &self.spec
    }

    pub fn sprite(&self) -> Option<SpriteId> {
        self.sprite
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn gravity(&self) -> Option<TickId> {
        self.gravity
    }

    /// 创建精灵、应用静态变换、绑定触发器、挂到舞台，然后执行 onload 链。
    /// 已经显示过的话先把上一次的全部撤掉。
    pub fn show(&mut self, world: &mut World, binder: &TriggerBinder) {
        if self.sprite.is_some() {
            self.hide(world);
        }

        let resources = Rc::clone(&world.resources);
        let Some(tex) = resources.texture(&self.spec.image) else {
            log::warn!("{}: image '{}' is not loaded, not shown", self.spec.name, self.spec.image);
            return;
        };

        let id = world.stage.create(&self.spec.image, tex);
        if let Some(sprite) = world.stage.get_mut(id) {
            sprite.pos = Vec2::new(self.spec.position.x1, self.spec.position.y1);
            if let Some(settings) = &self.spec.settings {
                if let Some(scale) = settings.scale {
                    sprite.scale = Vec2::new(scale.height, scale.width);
                }
                if settings.flip {
                    sprite.scale.x = -sprite.scale.x;
                }
            }
        }
        self.sprite = Some(id);

        let mut skipped = Vec::new();
        let target = Target { sprite: id, resources: &resources };
        self.bindings = binder.bind(&self.spec, &target, &mut world.stage, &mut skipped);
        for event in skipped {
            world.push(event);
        }

        world.stage.attach(id);
        world.push(RuntimeEvent::CharacterShown { character: self.id, name: self.spec.name.clone() });

        if let Some(chain) = self.bindings.onload.as_mut() {
            chain.fire(self.id, &mut world.effect_cx());
        }

        let strength = self.spec.gravity();
        if strength != 0.0 {
            log::debug!("{}: gravity {}", self.spec.name, strength);
            self.gravity = Some(world.animator.register(Motion::Gravity { sprite: id, strength, velocity: 0.0 }));
        }
    }

    /// 执行 touch 链；没有 touch 动作时返回 false
    pub fn touch(&mut self, world: &mut World) -> bool {
        if self.sprite.is_none() {
            return false;
        }
        match self.bindings.touch.as_mut() {
            Some(chain) => {
                log::debug!("{} touched", self.spec.name);
                chain.fire(self.id, &mut world.effect_cx());
                true
            }
            None => false,
        }
    }

    /// 撤销效果、注销重力并销毁精灵
    pub fn hide(&mut self, world: &mut World) {
        self.bindings.cancel(&mut world.effect_cx());
        self.bindings = Bindings::default();
        if let Some(tick) = self.gravity.take() {
            world.animator.deregister(tick);
        }
        if let Some(sprite) = self.sprite.take() {
            world.stage.destroy(sprite);
        }
    }
}
