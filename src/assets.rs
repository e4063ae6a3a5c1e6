//! Image asset collaborator
//!
//! The core never reads image bytes. It stores whatever reference the asset
//! manager handed out and asks it to release that reference when a recipe is
//! deleted.

use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use crate::constants::images;

/// Releases image resources that belong to deleted recipes
pub trait ImageAssets {
    fn release(&self, reference: &str) -> io::Result<()>;
}

/// For front ends without managed images
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImageAssets;

impl ImageAssets for NoImageAssets {
    fn release(&self, _reference: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Images stored as files inside one assets directory
#[derive(Debug, Clone)]
pub struct AssetDirectory {
    root: PathBuf,
}

impl AssetDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File name a front end should store an upload under for `recipe_name`
    ///
    /// `"Gin Tonic"` with `"PNG"` becomes `gin_tonic.png`.
    pub fn reference_for(recipe_name: &str, extension: Option<&str>) -> String {
        let stem = recipe_name.trim().to_lowercase().replace(' ', "_");
        let extension = extension
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .unwrap_or_else(|| images::DEFAULT_EXTENSION.to_string());
        format!("{stem}.{extension}")
    }

    /// Path a reference points to; relative references live under the root
    pub fn resolve(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl ImageAssets for AssetDirectory {
    fn release(&self, reference: &str) -> io::Result<()> {
        if reference.is_empty() {
            return Ok(());
        }

        let path = self.resolve(reference);
        let escapes = !path.starts_with(&self.root)
            || path.components().any(|c| matches!(c, Component::ParentDir));
        if escapes {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("image reference {} is outside {}", path.display(), self.root.display()),
            ));
        }

        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!(path = %path.display(), "Removed recipe image");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Recipe image already gone");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_reference_for_recipe_name() {
        assert_eq!(AssetDirectory::reference_for("Gin Tonic", Some(".PNG")), "gin_tonic.png");
        assert_eq!(AssetDirectory::reference_for("Aperol Spritz", None), "aperol_spritz.jpg");
        assert_eq!(AssetDirectory::reference_for("Mojito", Some("")), "mojito.jpg");
    }

    #[test]
    fn test_release_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetDirectory::new(dir.path());
        fs::write(dir.path().join("mojito.jpg"), b"jpeg").unwrap();

        assets.release("mojito.jpg").unwrap();
        assert!(!dir.path().join("mojito.jpg").exists());
    }

    #[test]
    fn test_release_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetDirectory::new(dir.path());
        assets.release("never_uploaded.jpg").unwrap();
        assets.release("").unwrap();
    }

    #[test]
    fn test_release_refuses_paths_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetDirectory::new(dir.path().join("assets"));
        let outside = dir.path().join("keep.jpg");
        fs::write(&outside, b"jpeg").unwrap();

        let err = assets.release("../keep.jpg").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(assets.release(outside.to_str().unwrap()).is_err());
        assert!(outside.exists());
    }

    #[test]
    fn test_absolute_reference_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetDirectory::new(dir.path());
        let image = dir.path().join("gin_tonic.jpg");
        fs::write(&image, b"jpeg").unwrap();

        assets.release(image.to_str().unwrap()).unwrap();
        assert!(!image.exists());
    }
}
