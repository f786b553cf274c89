// Fixture helpers shared by the unit tests of this crate.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

static LOGGER_INIT: Once = Once::new();

pub(crate) fn setup_logger() {
    LOGGER_INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Writes a PNG of seeded RGB noise, creating parent directories.
pub(crate) fn write_noise_png(path: &Path, width: u32, height: u32, seed: u64) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture directory");
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let img = RgbImage::from_fn(width, height, |_, _| Rgb([rng.gen(), rng.gen(), rng.gen()]));
    img.save(path).expect("write fixture image");
    path.to_path_buf()
}

/// Builds `root/{class}/img_{i}.png` for every `(class, count)` pair.
pub(crate) fn image_tree(layout: &[(&str, usize)], width: u32, height: u32) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    let mut seed = 0u64;
    for (class, count) in layout {
        for i in 0..*count {
            let path = dir.path().join(class).join(format!("img_{i}.png"));
            write_noise_png(&path, width, height, seed);
            seed += 1;
        }
    }
    dir
}
