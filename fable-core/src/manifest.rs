use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use crate::story::StoryDocument;

/// 交给外部加载器的一条资源，alias 与 src 相同
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub alias: String,
    pub src: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
    seen: FxHashSet<String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一个资源引用，重复的引用会被忽略
    pub fn push(&mut self, reference: &str) -> bool {
        if !self.seen.insert(reference.to_string()) {
            return false;
        }
        self.entries.push(ManifestEntry {
            alias: reference.to_string(),
            src: reference.to_string(),
        });
        true
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.seen.contains(alias)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.alias.as_str())
    }
}

/// 遍历整个故事文档，收集所有需要预加载的资源
pub fn resolve(doc: &StoryDocument) -> Manifest {
    let mut manifest = Manifest::new();
    manifest.push(&doc.splash.image);
    manifest.push(&doc.splash.sound);

    // scenes 是 BTreeMap，遍历顺序稳定
    for scene in doc.scenes.values() {
        manifest.push(&scene.background);
        for sound in &scene.sounds {
            manifest.push(&sound.file);
        }
        for obj in &scene.objects {
            manifest.push(&obj.image);
            for action in obj.actions.values() {
                for effect in &action.effects {
                    if let Some(asset) = effect.asset() {
                        manifest.push(asset);
                    }
                }
            }
        }
    }

    log::debug!("Manifest resolved: {} entries", manifest.len());
    manifest
}
