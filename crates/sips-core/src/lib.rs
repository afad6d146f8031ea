pub mod consts;
pub mod convert;
pub mod correction;
pub mod error;
pub mod filters;
pub mod frame;
pub mod geometry;
pub mod io;
pub mod modes;
pub mod nielsen;
pub mod pipeline;
pub mod sample;
pub mod series;
pub mod stack;

pub use error::{Result, SipsError};
pub use frame::ProcessedFrame;
pub use sample::{Sample, SampleKind};
pub use series::{ImageSeries, PreparedSeries, RawSeries};
