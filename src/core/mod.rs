pub mod rng;

pub use rng::{derive_seed, Mulberry32};
