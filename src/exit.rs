// Tue Jan 20 2026 - Alex

// BSD sysexits-style process exit codes.

pub const OK: i32 = 0;
pub const USAGE: i32 = 64;
pub const SOFTWARE: i32 = 70;
pub const TEMP_FAIL: i32 = 75;
pub const CONFIG: i32 = 78;
