//! Backend capability traits for the Storyboard pipeline.
//!
//! The pipeline never sees credentials or transports. It receives an
//! authenticated client as one of these traits and issues requests
//! through it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{ImageBackend, TextBackend};
