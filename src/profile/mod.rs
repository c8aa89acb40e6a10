//! Input data profiling.

mod read_depth;

pub use read_depth::{profile_read_depth, ReadDepthProfile};
