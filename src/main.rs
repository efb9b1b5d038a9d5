//! Entry point for the locale synchronization driver.

use std::path::PathBuf;

use i18n_sync::config;
use i18n_sync::sync;

/// ワークスペースルートを第一引数から決める (デフォルトはカレントディレクトリ)
fn workspace_root() -> PathBuf {
    std::env::args().nth(1).map_or_else(|| PathBuf::from("."), PathBuf::from)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let root = workspace_root();
    let settings = config::load_from_workspace(&root)?.unwrap_or_default();

    let reports = sync::run(&root, &settings)?;
    for report in &reports {
        tracing::info!(
            "{}: {} of {} leaves untranslated -> {} after merge",
            report.language,
            report.untranslated_before,
            report.leaf_count,
            report.untranslated_after
        );
    }
    Ok(())
}
