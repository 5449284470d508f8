pub mod batch;

pub use batch::{BatchOptions, run_batch};
