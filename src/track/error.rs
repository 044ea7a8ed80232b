use thiserror::Error;

/// Errors that can occur while building a track registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A track with this name is already registered; the name-to-index
    /// mapping shared with the editor must be unambiguous
    #[error("Track name '{name}' is already registered")]
    DuplicateName { name: String },

    /// Track names are the wire identity of a track and may not be empty
    #[error("Track names may not be empty")]
    EmptyName,
}
