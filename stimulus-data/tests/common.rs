use std::fs;
use std::path::Path;
use std::sync::Once;

use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

static INIT: Once = Once::new();

// Shared by several test crates; not every crate uses every helper.
#[allow(dead_code)]
pub(crate) fn setup_logger() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

#[allow(dead_code)]
pub(crate) fn write_png(path: &Path, width: u32, height: u32, seed: u64) {
    fs::create_dir_all(path.parent().expect("fixture path has a parent")).expect("create fixture dir");
    let mut rng = StdRng::seed_from_u64(seed);
    RgbImage::from_fn(width, height, |_, _| Rgb([rng.gen(), rng.gen(), rng.gen()]))
        .save(path)
        .expect("write fixture png");
}

/// A temporary root with `root/{relative}` images for every given relative path.
#[allow(dead_code)]
pub(crate) fn stimulus_root(files: &[&str], width: u32, height: u32) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for (seed, relative) in files.iter().enumerate() {
        write_png(&dir.path().join(relative), width, height, seed as u64);
    }
    dir
}
