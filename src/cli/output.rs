//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    format!("error: {}", e)
}

/// Process exit code: 2 for rejected input, 1 for everything else.
pub fn exit_code(e: &ApiError) -> i32 {
    if e.status_code() == 400 {
        2
    } else {
        1
    }
}
