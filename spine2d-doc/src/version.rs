//! Spine export version the document schema follows.

/// Spine major version of the documents this crate edits.
pub const SPINE_EXPORT_MAJOR: u32 = 3;

/// Spine minor version of the documents this crate edits.
pub const SPINE_EXPORT_MINOR: u32 = 8;

/// Name of the bone every skeleton is rooted at.
pub const ROOT_BONE: &str = "root";

/// Whether a `skeleton.spine` version string names a 3.8 export (`3.8.99`, `3.8`).
pub fn is_supported_spine_version(value: &str) -> bool {
    let mut parts = value.split('.').map(|p| p.parse::<u32>().ok());
    let major = parts.next().flatten();
    let minor = parts.next().flatten();
    major == Some(SPINE_EXPORT_MAJOR) && minor == Some(SPINE_EXPORT_MINOR)
}
