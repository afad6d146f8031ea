#[cfg(feature = "cine")]
pub mod cine;
pub mod image_io;
pub mod loader;
pub mod natural;
pub mod npy;

pub use loader::{
    clamp_range, detect_source, list_image_files, load_series, probe, LoadRequest, LoadTask,
};
pub use npy::{read_npy, write_npy};
