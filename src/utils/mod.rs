// Tue Jan 20 2026 - Alex

pub mod logging;
pub mod testing;
