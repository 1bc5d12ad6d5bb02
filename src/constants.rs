// Live dashboard
pub const LIVE_UPDATE_INTERVAL_SECS: u64 = 5;
pub const LIVE_HISTORY_CAPACITY: usize = 7;
pub const LIVE_RANGE_C: (f64, f64) = (-18.0, -16.0);

// Basic dashboard: latest reading only
pub const BASIC_UPDATE_INTERVAL_SECS: u64 = 3;
pub const BASIC_HISTORY_CAPACITY: usize = 1;
pub const BASIC_RANGE_C: (f64, f64) = (-19.0, -17.0);

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const APP_TITLE: &str = "Antarctic Explorer";
pub const APP_DESCRIPTION: &str = "A demonstration of real-time temperature readings in Antarctica.";
pub const LINKS: [(&str, &str); 4] = [
    ("GitHub Source", "https://github.com/sydsailors/cintel-05-cintel"),
    ("GitHub App", "https://sydsailors.github.io/cintel-05-cintel/"),
    ("PyShiny", "https://shiny.posit.co/py/"),
    ("PyShiny Express", "https://shiny.posit.co/blog/posts/shiny-express/"),
];

pub const CONFIG_ENV_VAR: &str = "ANTARCTIC_MONITOR_CONFIG";
pub const LOG_FILE_NAME: &str = "antarctic-monitor.log";
