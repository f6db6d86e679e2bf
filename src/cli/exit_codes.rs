//! exit codes for editcond commands
//!
//! these follow Unix conventions where 0 = success and non-zero = error
//! specific codes help scripts distinguish between failure types

/// command completed successfully
pub const SUCCESS: i32 = 0;

/// general or unknown error
pub const ERROR: i32 = 1;

/// invalid command-line arguments
pub const INVALID_ARGS: i32 = 2;

/// configuration file error
pub const CONFIG_ERROR: i32 = 3;

/// expression failed to lex or compile
pub const PARSE_ERROR: i32 = 4;

/// expression failed to evaluate against the subject
pub const EVAL_ERROR: i32 = 5;

/// subject file missing or invalid
pub const SUBJECT_ERROR: i32 = 6;
