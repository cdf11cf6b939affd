#![forbid(unsafe_code)]

//! Test harness and reference fixtures for Veil.
//!
//! - [`fixture`]: overlay markup builders and the reference stylesheet
//! - [`recorder`]: ordered callback logs
//! - [`render`]: deterministic markup text
//! - [`snapshot`]: text snapshots with `BLESS=1` updates
//! - [`strategies`]: `proptest` strategies for durations and action sequences

pub mod fixture;
pub mod recorder;
pub mod render;
pub mod snapshot;
pub mod strategies;

pub use fixture::{OverlayMarkup, OverlayNodes, Page, STANDARD_CSS, standard_stylesheet};
pub use recorder::Recorder;
pub use render::render_markup;
pub use strategies::Step;
