#![forbid(unsafe_code)]

//! Style cascade for Veil.
//!
//! This crate provides:
//! - [`Stylesheet`] for parsing author rules and computing element style
//! - [`ComputedStyle`] with typed accessors for visibility and timing properties
//! - [`StyleSource`], the seam the overlay engine reads computed style through

pub mod computed;
pub mod stylesheet;

pub use computed::ComputedStyle;
pub use stylesheet::{Rule, StyleError, StyleSource, Stylesheet};
