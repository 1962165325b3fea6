//! Collaborators around `spine2d-doc`: a blocking wrapper for the Spine editor CLI and a texture
//! alpha utility.

#![forbid(unsafe_code)]

pub mod alpha;
mod config;
pub mod editor;
mod error;

pub use config::*;
pub use editor::SpineEditor;
pub use error::*;


#[cfg(test)]
mod config_tests;
