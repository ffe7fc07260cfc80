//! Standard exit codes (BSD sysexits.h compatible)

/// Successful termination
pub const OK: i32 = 0;

/// Command line usage error
pub const USAGE: i32 = 64;

/// Data format error (e.g. alias already in the requested state)
pub const DATAERR: i32 = 65;

/// Addressed alias or domain does not exist
pub const NOINPUT: i32 = 66;

/// Remote service unavailable or rejected the request
pub const UNAVAILABLE: i32 = 69;

/// Internal software error
pub const SOFTWARE: i32 = 70;

/// Input/output error
pub const IOERR: i32 = 74;

/// Temporary failure (deadline exceeded or cancelled)
pub const TEMPFAIL: i32 = 75;

/// Configuration error
pub const CONFIG: i32 = 78;

/// Terminated by a second Ctrl-C (128 + SIGINT)
pub const INTERRUPTED: i32 = 130;
