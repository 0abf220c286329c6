//! Foundational types shared by every Xenon crate: the engine-wide error
//! taxonomy and small matrix helpers used by the animation sampler and the
//! scene graph.

pub mod errors;
pub mod math;

pub use errors::{Result, XenonError};
