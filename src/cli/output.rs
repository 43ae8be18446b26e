//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{GenerationError, ProviderError};

/// Map domain errors to a string for CLI output, with a hint for unreachable backends.
pub fn map_error(e: &GenerationError) -> String {
    match e {
        GenerationError::GenerationFailed {
            source: ProviderError::Transport(_) | ProviderError::Timeout(_),
            ..
        } => format!(
            "Error: {}\nIs the model server running and reachable at the configured endpoint?",
            e
        ),
        GenerationError::GenerationFailed {
            source: ProviderError::ModelNotFound(_),
            backend,
            ..
        } => format!(
            "Error: {}\nMake sure model '{}' is available on the server.",
            e, backend
        ),
        _ => format!("Error: {}", e),
    }
}
