use std::fmt;
use crate::character::CharacterId;
use crate::effect::{Effect, EffectCx, EffectFactory, Execute, Target};
use crate::event::RuntimeEvent;
use crate::stage::{GlowFilter, Stage};
use crate::story::{CharacterSpec, InteractiveStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    OnLoad,
    Touch,
}

impl Trigger {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "onload" => Some(Trigger::OnLoad),
            "touch" => Some(Trigger::Touch),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::OnLoad => "onload",
            Trigger::Touch => "touch",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 绑定在一个触发器上的有序效果链
#[derive(Debug, Clone)]
pub struct EffectChain {
    trigger: Trigger,
    effects: Vec<Effect>,
}

impl EffectChain {
    pub fn new(trigger: Trigger, effects: Vec<Effect>) -> Self {
        Self { trigger, effects }
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.effects.iter().map(Effect::kind).collect()
    }

    /// 按声明顺序同步执行整条链
    pub fn fire(&mut self, character: CharacterId, cx: &mut EffectCx) {
        for effect in &mut self.effects {
            cx.events.push_back(RuntimeEvent::EffectExecuted {
                character,
                trigger: self.trigger,
                effect: effect.kind(),
            });
            effect.execute(cx);
        }
    }

    pub fn cancel(&mut self, cx: &mut EffectCx) {
        for effect in &mut self.effects {
            effect.cancel(cx);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Bindings {
    pub onload: Option<EffectChain>,
    pub touch: Option<EffectChain>,
}

impl Bindings {
    pub fn cancel(&mut self, cx: &mut EffectCx) {
        for chain in [self.onload.as_mut(), self.touch.as_mut()].into_iter().flatten() {
            chain.cancel(cx);
        }
    }
}

/// 把角色的 actions 变成效果链；touch 链会让精灵可交互并加上发光提示
pub struct TriggerBinder<'a> {
    pub factory: &'a EffectFactory,
    pub style: InteractiveStyle,
}

impl TriggerBinder<'_> {
    pub fn bind(
        &self,
        spec: &CharacterSpec,
        target: &Target,
        stage: &mut Stage,
        events: &mut Vec<RuntimeEvent>,
    ) -> Bindings {
        let mut bindings = Bindings::default();

        for (key, action) in &spec.actions {
            let Some(trigger) = Trigger::from_key(key) else {
                log::warn!("{}: unknown action '{}', skipped", spec.name, key);
                continue;
            };

            let mut effects = Vec::with_capacity(action.effects.len());
            for effect_spec in &action.effects {
                match self.factory.build(effect_spec, target) {
                    Ok(effect) => effects.push(effect),
                    Err(unresolved) => {
                        log::warn!("{}: {} ({}), skipped", spec.name, unresolved, trigger);
                        events.push(RuntimeEvent::EffectSkipped {
                            character: spec.name.clone(),
                            effect: unresolved.name,
                            reason: unresolved.reason,
                        });
                    }
                }
            }
            log::debug!("{}: {} chain with {} effect(s)", spec.name, trigger, effects.len());
            let chain = EffectChain::new(trigger, effects);

            match trigger {
                Trigger::OnLoad => bindings.onload = Some(chain),
                Trigger::Touch => {
                    self.make_interactive(stage, target);
                    bindings.touch = Some(chain);
                }
            }
        }

        bindings
    }

    fn make_interactive(&self, stage: &mut Stage, target: &Target) {
        if let Some(sprite) = stage.get_mut(target.sprite) {
            sprite.interactive = true;
            sprite.glow = Some(GlowFilter {
                distance: self.style.distance,
                outer_strength: self.style.strength,
                color: self.style.color,
            });
        }
    }
}
