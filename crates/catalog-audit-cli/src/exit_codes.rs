//! Process exit codes. Part of the CLI contract.

pub const SUCCESS: i32 = 0;
/// Unreadable record source, bad config or missing credential.
pub const CONFIG_ERROR: i32 = 2;
