use std::collections::HashMap;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use walkdir::WalkDir;
use fable_core::backend::headless::is_audio;
use fable_core::backend::{Resource, ResourceLoader, Resources, SoundClip, Texture};
use fable_core::manifest::Manifest;

/// 从资源目录加载：图片只读取尺寸，音频只登记存在
pub struct FsLoader {
    root_path: PathBuf,
    files: HashMap<String, PathBuf>,
}

impl FsLoader {
    pub fn new(root_path: &str) -> Self {
        let mut loader = Self {
            root_path: PathBuf::from(root_path),
            files: HashMap::new(),
        };
        loader.scan_assets();
        loader
    }

    fn scan_assets(&mut self) {
        log::info!("Scanning assets in {:?}...", self.root_path);

        for entry in WalkDir::new(&self.root_path).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Some(key) = relative_key(&self.root_path, path) {
                self.files.insert(key, path.to_path_buf());
            }
        }

        log::info!("Asset scan complete. Files: {}", self.files.len());
    }

    fn load_one(&self, src: &str) -> Result<Resource> {
        let path = self.files
            .get(src)
            .with_context(|| format!("'{}' not found under {:?}", src, self.root_path))?;

        if is_audio(src) {
            return Ok(Resource::Sound(SoundClip::default()));
        }

        let (width, height) = image::image_dimensions(path)
            .with_context(|| format!("Failed to read image {:?}", path))?;
        log::debug!("Loaded asset: {} -> {:?} ({}x{})", src, path, width, height);
        Ok(Resource::Texture(Texture { width: width as f32, height: height as f32 }))
    }
}

// 文档里的资源路径统一用 '/' 分隔
fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel.components().filter_map(|c| c.as_os_str().to_str()).collect();
    Some(parts.join("/"))
}

impl ResourceLoader for FsLoader {
    fn load_bundle(&mut self, manifest: &Manifest) -> Result<Resources> {
        let mut resources = Resources::new();
        let mut failures = Vec::new();

        for entry in manifest.entries() {
            match self.load_one(&entry.src) {
                Ok(res) => resources.insert(entry.alias.clone(), res),
                Err(e) => {
                    log::error!("{:#}", e);
                    failures.push(entry.src.as_str());
                }
            }
        }

        if !failures.is_empty() {
            anyhow::bail!("Failed to load {} asset(s): {}", failures.len(), failures.join(", "));
        }
        Ok(resources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_key_uses_forward_slashes() {
        let root = Path::new("story");
        let path = root.join("scene1").join("cat.png");
        assert_eq!(relative_key(root, &path).as_deref(), Some("scene1/cat.png"));
        assert_eq!(relative_key(root, Path::new("elsewhere/cat.png")), None);
    }
}
