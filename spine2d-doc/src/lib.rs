//! Editing toolkit for Spine 3.8 skeleton JSON documents (unofficial).
//!
//! A [`SkeletonDocument`] holds the bones in a name-keyed [`Hierarchy`] and addresses weighted
//! vertices by bone name, so bones can be renamed, added, removed and merged between skeletons.
//! Fields the editing operations do not understand are carried through untouched.

#![forbid(unsafe_code)]

mod animation;
mod document;
mod error;
mod hierarchy;
mod merge;
mod rename;
mod schema;
mod version;
mod vertices;

pub use document::*;
pub use error::*;
pub use hierarchy::*;
pub use merge::{merge_json, merge_json_map};
pub use rename::RenameBoneOptions;
pub use schema::*;
pub use version::*;
pub use vertices::*;




#[cfg(test)]
mod rename_tests;
