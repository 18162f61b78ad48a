//! Error handling for Kinetica
//!
//! Surface consistency violations are repaired silently by the resolver and
//! integration failures are reported through `SimulationOutcome` flags, so
//! neither appears here.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Kinetica operations
pub type Result<T> = std::result::Result<T, KineticaError>;

/// Main error type for Kinetica operations
#[derive(Error, Debug)]
pub enum KineticaError {
    // Indexing Errors
    #[error("Surface species '{label}' is not in the core species list")]
    SpeciesNotInCore { label: String },

    #[error("Surface reaction '{reaction}' is not in the core reaction list")]
    ReactionNotInCore { reaction: String },

    #[error("Unknown species: {label}")]
    UnknownSpecies { label: String },

    #[error("Duplicate species: {label}")]
    DuplicateSpecies { label: String },

    #[error("Core reaction '{reaction}' references edge species '{species}'")]
    ReactionOutsideCore { reaction: String, species: String },

    #[error("Got {reactions} reactions but {indices} edge indices")]
    MismatchedIndices { reactions: usize, indices: usize },

    // Model Errors
    #[error("Reaction model has not been initialized")]
    ModelNotInitialized,

    #[error("Reactor has no termination criteria")]
    MissingTermination,

    #[error("Invalid initial state: {reason}")]
    InvalidInitialState { reason: String },

    #[error("Invalid settings: {reason}")]
    InvalidSettings { reason: String },

    #[error("Unknown units '{units}' for {quantity}")]
    UnknownUnits { units: String, quantity: String },

    // Listener Errors
    #[error("Listener is not attached to this reaction system")]
    ListenerNotFound,

    #[error("Listener failed: {reason}")]
    ListenerFailed { reason: String },

    // Persistence Errors
    #[error("Snapshot checksum mismatch: expected {expected}, found {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Unsupported snapshot schema version: {version}")]
    UnsupportedSchemaVersion { version: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl KineticaError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            KineticaError::SpeciesNotInCore { .. } => "SPECIES_NOT_IN_CORE",
            KineticaError::ReactionNotInCore { .. } => "REACTION_NOT_IN_CORE",
            KineticaError::UnknownSpecies { .. } => "UNKNOWN_SPECIES",
            KineticaError::DuplicateSpecies { .. } => "DUPLICATE_SPECIES",
            KineticaError::ReactionOutsideCore { .. } => "REACTION_OUTSIDE_CORE",
            KineticaError::MismatchedIndices { .. } => "MISMATCHED_INDICES",
            KineticaError::ModelNotInitialized => "MODEL_NOT_INITIALIZED",
            KineticaError::MissingTermination => "MISSING_TERMINATION",
            KineticaError::InvalidInitialState { .. } => "INVALID_INITIAL_STATE",
            KineticaError::InvalidSettings { .. } => "INVALID_SETTINGS",
            KineticaError::UnknownUnits { .. } => "UNKNOWN_UNITS",
            KineticaError::ListenerNotFound => "LISTENER_NOT_FOUND",
            KineticaError::ListenerFailed { .. } => "LISTENER_FAILED",
            KineticaError::ChecksumMismatch { .. } => "CHECKSUM_MISMATCH",
            KineticaError::UnsupportedSchemaVersion { .. } => "UNSUPPORTED_SCHEMA_VERSION",
            KineticaError::FileNotFound { .. } => "FILE_NOT_FOUND",
            KineticaError::FileReadError { .. } => "FILE_READ_ERROR",
            KineticaError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            KineticaError::Serialization(_) => "SERIALIZATION_ERROR",
            KineticaError::Io(_) => "IO_ERROR",
        }
    }

    /// Indexing errors come from surface lists that do not match the core lists
    pub fn is_indexing_error(&self) -> bool {
        matches!(
            self,
            KineticaError::SpeciesNotInCore { .. }
                | KineticaError::ReactionNotInCore { .. }
                | KineticaError::UnknownSpecies { .. }
                | KineticaError::ReactionOutsideCore { .. }
                | KineticaError::MismatchedIndices { .. }
        )
    }

    /// Check if the caller can fix the input and retry
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            KineticaError::ModelNotInitialized
                | KineticaError::ListenerNotFound
                | KineticaError::ListenerFailed { .. }
                | KineticaError::FileNotFound { .. }
                | KineticaError::FileWriteError { .. }
        )
    }

    /// Returns a recovery suggestion, if there is one.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            KineticaError::SpeciesNotInCore { .. } | KineticaError::ReactionNotInCore { .. } => {
                Some("Move the species or reaction into the core before placing it on the surface.")
            }
            KineticaError::ModelNotInitialized => {
                Some("Call initialize_model before querying layering indices.")
            }
            KineticaError::MissingTermination => {
                Some("Add a conversion, time or rate-ratio termination criterion.")
            }
            KineticaError::UnknownUnits { .. } => {
                Some("Use SI units or one of the supported aliases (bar, atm, mol/L, ms, min, h).")
            }
            KineticaError::ChecksumMismatch { .. } => {
                Some("The snapshot was modified after it was saved; re-run the simulation.")
            }
            KineticaError::FileNotFound { .. } => Some("Check the file path and try again."),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = KineticaError::SpeciesNotInCore {
            label: "H".to_string(),
        };
        assert_eq!(err.error_code(), "SPECIES_NOT_IN_CORE");
        assert!(err.is_indexing_error());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_recovery_suggestions() {
        let err = KineticaError::MissingTermination;
        assert!(err.recovery_suggestion().is_some());
        assert!(KineticaError::ListenerNotFound.is_recoverable());
        assert!(KineticaError::ListenerNotFound.recovery_suggestion().is_none());
    }
}
