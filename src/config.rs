// IMPORTANT:
// Keep ALL numeric values centralized here (repo rule: no hardcoded numeric values scattered around).

// NOTE: HOST_VERSION must stay in sync with the `version` field in Cargo.toml.
pub const HOST_VERSION: &str = "0.1.0";

pub mod logging {
    pub const LOG_DIR_REL: &str = ".sentvec/logs";
    pub const LOG_FILE_NAME: &str = "sentvec_host.log";

    pub const LOG_ROTATE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
    pub const LOG_ROTATE_KEEP_FILES: usize = 5;
}

pub mod host {
    pub const MAX_MESSAGE_SIZE_BYTES: u32 = 128 * 1024 * 1024;
}

pub mod batch {
    /// Advisory cap on words per training job. Batch boundaries are the
    /// driving loop's policy; the engine itself never enforces this.
    pub const MAX_WORDS_IN_BATCH: usize = 10_000;
}

pub mod subword {
    // fastText-style defaults for the character n-gram fallback.
    pub const DEFAULT_MIN_N: usize = 3;
    pub const DEFAULT_MAX_N: usize = 6;
    pub const DEFAULT_BUCKET: usize = 2_000_000;
}
