use std::path::PathBuf;

use anyhow::Context;
use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming};

use crate::config;

pub fn init_logging() -> anyhow::Result<()> {
    let Some(log_dir) = sentvec_log_dir()? else {
        // No resolvable home directory (bare CI containers): stderr only.
        Logger::try_with_str("debug")?
            .log_to_stderr()
            .start()
            .context("failed to start stderr logger")?;
        return Ok(());
    };

    // File logs at debug, stderr at warn+ so a driving process sees problems
    // without drowning in per-batch chatter.
    Logger::try_with_str("debug")?
        .log_to_file(FileSpec::default().directory(log_dir).basename(config::logging::LOG_FILE_NAME))
        .rotate(
            Criterion::Size(config::logging::LOG_ROTATE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config::logging::LOG_ROTATE_KEEP_FILES),
        )
        .duplicate_to_stderr(Duplicate::Warn)
        .format(flexi_logger::detailed_format)
        .start()
        .context("failed to start logger")?;

    log::info!("{}", "=".repeat(60));
    log::info!("sentvec host starting");
    log::info!("Version: {}", config::HOST_VERSION);
    log::info!("Platform: {}", std::env::consts::OS);
    log::info!("{}", "=".repeat(60));

    Ok(())
}

fn sentvec_log_dir() -> anyhow::Result<Option<PathBuf>> {
    let Some(home) = home_dir() else {
        return Ok(None);
    };
    let dir = home.join(config::logging::LOG_DIR_REL);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed creating log dir {}", dir.display()))?;
    Ok(Some(dir))
}

fn home_dir() -> Option<PathBuf> {
    if let Ok(v) = std::env::var("HOME") {
        if !v.is_empty() {
            return Some(PathBuf::from(v));
        }
    }
    // Windows fallback
    if let Ok(v) = std::env::var("USERPROFILE") {
        if !v.is_empty() {
            return Some(PathBuf::from(v));
        }
    }
    None
}
