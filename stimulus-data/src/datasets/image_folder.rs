// DatasetIndex: directory enumeration for image classification folders
//
// Scans a directory tree where each immediate subdirectory is a class:
//
//   root/
//     cat/
//       img_001.png
//       nested/img_002.jpg
//     dog/
//       img_003.png
//
// Class indices follow the sorted subdirectory names; files are collected
// recursively below each class directory and sorted by path. Files placed
// directly under `root` are not part of any class and are ignored.
//
// Sorting makes the enumeration independent of the filesystem's listing
// order, so two scans of an unchanged tree always agree entry for entry.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use stimulus_core::StimulusError;

/// Supported image extensions (case-insensitive).
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "ppm", "bmp", "pgm", "tif", "tiff", "webp",
];

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn walk_error(err: walkdir::Error, fallback: &Path) -> StimulusError {
    let path = err.path().unwrap_or(fallback).display().to_string();
    StimulusError::Io {
        path,
        message: err.to_string(),
    }
}

/// Ordered `(file path, directory label)` enumeration of an image folder.
#[derive(Debug, Clone)]
pub struct DatasetIndex {
    root: PathBuf,
    /// Sorted class names (subdirectory names).
    class_names: Vec<String>,
    /// Per-sample `(path, class_index)`.
    entries: Vec<(PathBuf, usize)>,
}

impl DatasetIndex {
    /// Scans `root` and builds the index.
    ///
    /// # Errors
    ///
    /// * `StimulusError::Io` if `root` is not a readable directory or a
    ///   subdirectory cannot be listed.
    /// * `StimulusError::EmptyDataset` if no image files are found.
    pub fn scan<P: AsRef<Path>>(root: P) -> Result<Self, StimulusError> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(StimulusError::Io {
                path: root.display().to_string(),
                message: "not a directory".to_string(),
            });
        }

        // Immediate subdirectories, sorted by name
        let mut class_dirs: Vec<(String, PathBuf)> = Vec::new();
        for entry in WalkDir::new(&root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| walk_error(e, &root))?;
            if entry.file_type().is_dir() {
                let name = entry.file_name().to_string_lossy().into_owned();
                class_dirs.push((name, entry.into_path()));
            }
        }

        let mut entries: Vec<(PathBuf, usize)> = Vec::new();
        let mut skipped = 0usize;
        for (class_idx, (_name, dir)) in class_dirs.iter().enumerate() {
            let mut paths: Vec<PathBuf> = Vec::new();
            for entry in WalkDir::new(dir).follow_links(true) {
                let entry = entry.map_err(|e| walk_error(e, dir))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                if is_image(entry.path()) {
                    paths.push(entry.into_path());
                } else {
                    skipped += 1;
                }
            }
            paths.sort();
            entries.extend(paths.into_iter().map(|p| (p, class_idx)));
        }

        if skipped > 0 {
            warn!(
                "Ignored {} non-image files under {}",
                skipped,
                root.display()
            );
        }
        if entries.is_empty() {
            return Err(StimulusError::EmptyDataset {
                root: root.display().to_string(),
            });
        }

        let class_names: Vec<String> = class_dirs.into_iter().map(|(n, _)| n).collect();
        debug!(
            "Indexed {} images in {} class directories under {}",
            entries.len(),
            class_names.len(),
            root.display()
        );

        Ok(DatasetIndex {
            root,
            class_names,
            entries,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted class (subdirectory) names.
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn entries(&self) -> &[(PathBuf, usize)] {
        &self.entries
    }

    /// File path of the i-th entry.
    pub fn path_of(&self, index: usize) -> Option<&Path> {
        self.entries.get(index).map(|(p, _)| p.as_path())
    }

    /// Class index inferred from the directory layout for the i-th entry.
    pub fn class_of(&self, index: usize) -> Option<usize> {
        self.entries.get(index).map(|&(_, c)| c)
    }

    /// Directory name the i-th entry was found under.
    pub fn directory_label_of(&self, index: usize) -> Option<&str> {
        self.class_of(index)
            .and_then(|c| self.class_names.get(c))
            .map(String::as_str)
    }
}

#[cfg(test)]
#[path = "image_folder_test.rs"]
mod tests;
