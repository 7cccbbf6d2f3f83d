//! Render pipeline definitions.

pub mod physical;
