// Tue Jan 20 2026 - Alex

use env_logger::Env;

pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default))
        .format_timestamp_millis()
        .init();
}
