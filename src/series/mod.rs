pub mod generator;

pub use generator::{SeriesSession, DEFAULT_WINDOW_SIZE};
