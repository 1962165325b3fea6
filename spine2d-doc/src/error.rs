use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("inserting bone '{bone}' would form a cycle: {}", chain.join(" -> "))]
    Cycle { bone: String, chain: Vec<String> },

    #[error("duplicate bone: {name}")]
    DuplicateBone { name: String },

    #[error("duplicate attachment '{attachment}' in skin '{skin}', slot '{slot}'")]
    DuplicateAttachment {
        skin: String,
        slot: String,
        attachment: String,
    },

    #[error("skeleton has no '{name}' bone")]
    MissingRoot { name: String },

    #[error("unknown bone: {name}")]
    UnknownBone { name: String },

    #[error("unknown skin: {name}")]
    UnknownSkin { name: String },

    #[error("unknown animation: {name}")]
    UnknownAnimation { name: String },

    #[error("bone index {index} out of range for {bone_count} bones in weighted vertices")]
    BoneIndexOutOfRange { index: u64, bone_count: usize },

    #[error("unknown bone '{name}' referenced by weighted vertices")]
    UnknownVertexBone { name: String },

    #[error("invalid vertex data: {message}")]
    InvalidVertexData { message: String },

    #[error("bone hierarchy is corrupted at '{bone}': parent chain exceeds {limit} links")]
    GraphCorruption { bone: String, limit: usize },

    #[error("failed to parse Spine JSON: {message}")]
    JsonParse { message: String },

    #[error("i/o error on '{path}': {message}")]
    Io { path: String, message: String },
}
