//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                      |
//! |------|--------------------------------------------------------------|
//! | 0    | Success (including buyers with zero recommendations)         |
//! | 1    | General error (unspecified)                                  |
//! | 2    | Usage error (bad args, unreadable config file)               |
//! | 3    | Invalid config (TOML parse or validation failure)            |
//! | 4    | Input/data error (missing column, empty dataset, duplicate)  |
//! | 5    | Output write error (CSV, JSON or SQLite)                     |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use stockmatch_matcher::MatchError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing or unreadable config file.
pub const EXIT_USAGE: u8 = 2;

/// Config parsed as TOML but failed to deserialize or validate.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// An input table could not be read, or its contents abort the run.
pub const EXIT_INPUT: u8 = 4;

/// A configured output could not be written.
pub const EXIT_OUTPUT: u8 = 5;

/// Map an engine error to its exit code.
pub fn match_error_exit_code(err: &MatchError) -> u8 {
    match err {
        MatchError::ConfigParse(_) | MatchError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        MatchError::UnknownSource(_)
        | MatchError::MissingColumn { .. }
        | MatchError::EmptyDataset(_)
        | MatchError::DuplicateBuyer { .. }
        | MatchError::Io(_) => EXIT_INPUT,
    }
}
