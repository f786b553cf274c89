pub mod image_folder;
pub mod path_aware;
pub mod traits;

pub use image_folder::DatasetIndex;
pub use path_aware::{PathAwareDataset, Sample};
pub use traits::Dataset;
