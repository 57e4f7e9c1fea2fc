use std::sync::LazyLock;

use derive_from_env::FromEnv;

#[derive(FromEnv)]
#[from_env(prefix = "ALOG")]
#[allow(non_snake_case)]
pub struct ALogConfig {
    /// Initial minimum priority level (2=Verbose .. 8=None).
    #[from_env(default = "2")]
    pub MIN_LEVEL: u8,
    /// Path of the shared default log file used by the file-redirected levels.
    #[from_env(default = "alog.log")]
    pub LOG_FILE: String,
}

pub static ALOG_CONFIG: LazyLock<ALogConfig> = LazyLock::new(|| ALogConfig::from_env().unwrap());
