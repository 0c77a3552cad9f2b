//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Code | Domain    | Description                                  |
//! |------|-----------|----------------------------------------------|
//! | 0    | Universal | Success                                      |
//! | 1    | Universal | General error (unspecified)                  |
//! | 2    | Universal | CLI usage error (bad args)                   |
//! | 3-8  | transfer  | Layout, report, config, IO, upload failures  |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Map it in `service_exit_code` if a service error produces it

use rebalance_cli::ServiceError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Transfer (3-8)
// =============================================================================

/// No row in the spreadsheet contains the store header anchor.
pub const EXIT_LAYOUT_NOT_FOUND: u8 = 3;

/// Export requested with no suggestions to write.
pub const EXIT_EMPTY_REPORT: u8 = 4;

/// Config file failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 5;

/// Input file or config could not be read.
pub const EXIT_READ: u8 = 6;

/// Export file could not be built or written.
pub const EXIT_WRITE: u8 = 7;

/// Input file name is missing or not a spreadsheet extension.
pub const EXIT_UNSUPPORTED_UPLOAD: u8 = 8;

/// Map a service error to its exit code.
pub fn service_exit_code(err: &ServiceError) -> u8 {
    match err {
        ServiceError::MissingFilename | ServiceError::UnsupportedFile { .. } => EXIT_UNSUPPORTED_UPLOAD,
        ServiceError::InvalidConfig(_) => EXIT_INVALID_CONFIG,
        ServiceError::LayoutNotFound { .. } => EXIT_LAYOUT_NOT_FOUND,
        ServiceError::EmptyReport => EXIT_EMPTY_REPORT,
        ServiceError::Read(_) => EXIT_READ,
        ServiceError::Write(_) => EXIT_WRITE,
        ServiceError::Unexpected(_) => EXIT_ERROR,
    }
}
