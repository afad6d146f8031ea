pub mod mean;

pub use mean::{average_source, mean_frame};
