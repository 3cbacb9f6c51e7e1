//! Story discovery and decoding.
//!
//! A *story* is one image file in the directory the viewer was opened on.
//! This module only reads the filesystem and returns plain data; no Ratatui
//! types are used here.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use ignore::WalkBuilder;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("no images found in {}", .0.display())]
    NoStories(PathBuf),
}

/// One image shown on a face of the cube.
#[derive(Debug, Clone)]
pub struct Story {
    pub path: PathBuf,
    pub name: String,
    pub modified: Option<SystemTime>,
    /// MIME type from content sniffing, when it recognised the file.
    pub mime: Option<String>,
}

impl Story {
    /// Modification time formatted for captions.
    pub fn modified_label(&self) -> String {
        use chrono::{DateTime, Local};
        match self.modified {
            Some(t) => DateTime::<Local>::from(t).format("%Y/%m/%d %H:%M").to_string(),
            None => "-".to_string(),
        }
    }
}

/// Knobs for [`discover`].
#[derive(Debug, Clone)]
pub struct DiscoverConfig {
    pub show_hidden: bool,
    pub respect_gitignore: bool,
}

impl Default for DiscoverConfig {
    fn default() -> Self {
        Self {
            show_hidden: false,
            respect_gitignore: true,
        }
    }
}

/// List the images directly inside `root`, sorted by name
/// (case-insensitive).
pub fn discover(root: &Path, config: &DiscoverConfig) -> Result<Vec<Story>, StoryError> {
    let meta = std::fs::metadata(root).map_err(|source| StoryError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(StoryError::Io {
            path: root.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
        });
    }

    let walker = WalkBuilder::new(root)
        .max_depth(Some(1))
        .hidden(!config.show_hidden)
        .git_ignore(config.respect_gitignore)
        .build();

    let mut stories = Vec::new();
    for entry in walker.flatten() {
        let path = entry.path();
        if path == root || !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let sniffed = tree_magic_mini::from_filepath(path).map(str::to_string);
        let is_image = sniffed.as_deref().is_some_and(|m| m.starts_with("image/"))
            || image::ImageFormat::from_path(path).is_ok();
        if !is_image {
            continue;
        }
        let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
        stories.push(Story {
            path: path.to_path_buf(),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            modified,
            mime: sniffed,
        });
    }

    if stories.is_empty() {
        return Err(StoryError::NoStories(root.to_path_buf()));
    }
    stories.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    tracing::info!(root = %root.display(), count = stories.len(), "stories discovered");
    Ok(stories)
}

/// Decode `path` and shrink it to fit `max_w × max_h` pixels.  Smaller
/// images are returned as-is.
pub fn decode(path: &Path, max_w: u32, max_h: u32) -> Result<image::RgbaImage, StoryError> {
    let img = image::open(path).map_err(|source| StoryError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let (max_w, max_h) = (max_w.max(1), max_h.max(1));
    if img.width() <= max_w && img.height() <= max_h {
        return Ok(img.to_rgba8());
    }
    Ok(img.thumbnail(max_w, max_h).to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba([200, 40, 40, 255]));
        img.save(&path).expect("write png");
        path
    }

    #[test]
    fn finds_images_sorted_and_skips_others() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_png(dir.path(), "b.png", 4, 4);
        write_png(dir.path(), "A.png", 4, 4);
        std::fs::write(dir.path().join("notes.txt"), "not an image").expect("write txt");
        std::fs::create_dir(dir.path().join("nested")).expect("mkdir");
        write_png(&dir.path().join("nested"), "c.png", 4, 4);

        let stories = discover(dir.path(), &DiscoverConfig::default()).expect("discover");
        let names: Vec<_> = stories.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["A.png", "b.png"]);
        assert_ne!(stories[0].modified_label(), "-");
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("readme.md"), "# hi").expect("write md");
        let err = discover(dir.path(), &DiscoverConfig::default()).unwrap_err();
        assert!(matches!(err, StoryError::NoStories(_)));
    }

    #[test]
    fn missing_directory_is_io() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = discover(&dir.path().join("gone"), &DiscoverConfig::default()).unwrap_err();
        assert!(matches!(err, StoryError::Io { .. }));
    }

    #[test]
    fn decode_fits_inside_bounds() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_png(dir.path(), "wide.png", 64, 16);
        let img = decode(&path, 16, 16).expect("decode");
        assert_eq!((img.width(), img.height()), (16, 4));

        let small = write_png(dir.path(), "small.png", 6, 3);
        assert_eq!(decode(&small, 16, 16).expect("decode").dimensions(), (6, 3));
    }

    #[test]
    fn decode_reports_garbage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not png").expect("write");
        assert!(matches!(decode(&path, 8, 8), Err(StoryError::Decode { .. })));
    }
}
