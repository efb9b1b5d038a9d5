//! 同期ドライバの設定
//!
//! ワークスペースルートの `.i18n-sync.json` から読み込む。全てのフィールドに
//! デフォルト値があり、設定ファイルが無くても動作する。

use std::path::Path;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::tree::DEFAULT_KEY_SEPARATOR;

/// Errors raised while loading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 設定ファイルの読み込みエラー
    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// 設定ファイルのパースエラー
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Overwrite policy selection as written in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum OverwriteSetting {
    /// パッチを常に適用する (パッチ自体が正とみなせる場合)
    Unconditional,

    /// 未翻訳のリーフにのみパッチを適用する (既存の翻訳を守る)
    #[default]
    IfUntranslated,
}

/// Settings for one synchronization pass.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncSettings {
    /// Directory containing one `<language>.json` file per locale.
    pub locales_dir: String,

    /// Language whose locale file is the completeness baseline.
    /// This file is only ever read, never written.
    pub reference_language: String,

    /// Separator used in dotted key paths.
    pub key_separator: String,

    /// Overwrite policy applied to patch leaves.
    pub overwrite: OverwriteSetting,

    /// Glob patterns selecting locale files inside `locales_dir`.
    pub include_patterns: Vec<String>,

    /// Glob patterns excluding locale files from synchronization.
    pub exclude_patterns: Vec<String>,

    /// Optional patch document to merge into every target locale.
    /// ネスト形式とフラットなドット区切り形式の両方を受け付ける。
    pub patch_file: Option<String>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            locales_dir: "locales".to_string(),
            reference_language: "en".to_string(),
            key_separator: DEFAULT_KEY_SEPARATOR.to_string(),
            overwrite: OverwriteSetting::default(),
            include_patterns: vec!["*.json".to_string()],
            exclude_patterns: Vec::new(),
            patch_file: None,
        }
    }
}

/// ワークスペースから設定を読み込む
///
/// `.i18n-sync.json` ファイルを探して読み込む
///
/// # Returns
/// - `Ok(Some(settings))`: 設定ファイルが見つかり、読み込みに成功
/// - `Ok(None)`: 設定ファイルが見つからない
///
/// # Errors
/// - ファイル読み込みエラー
/// - JSON パースエラー
pub fn load_from_workspace(workspace_root: &Path) -> Result<Option<SyncSettings>, ConfigError> {
    let config_path = workspace_root.join(".i18n-sync.json");

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    tracing::debug!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(&config_path)?;
    let settings: SyncSettings = serde_json::from_str(&content)?;

    Ok(Some(settings))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    /// `load_from_workspace`: 設定ファイルが存在する場合
    #[rstest]
    fn test_load_from_workspace_with_valid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"{"referenceLanguage": "ja", "overwrite": "unconditional"}"#;
        fs::write(temp_dir.path().join(".i18n-sync.json"), config_content).unwrap();

        let settings = load_from_workspace(temp_dir.path()).unwrap().unwrap();

        assert_that!(settings.reference_language, eq("ja"));
        assert_that!(settings.overwrite, eq(OverwriteSetting::Unconditional));
        // 省略されたフィールドはデフォルトのまま
        assert_that!(settings.locales_dir, eq("locales"));
        assert_that!(settings.key_separator, eq("."));
    }

    /// `load_from_workspace`: 設定ファイルが存在しない場合
    #[rstest]
    fn test_load_from_workspace_no_config_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = load_from_workspace(temp_dir.path());

        assert_that!(result.unwrap(), none());
    }

    /// `load_from_workspace`: JSON パースエラー
    #[rstest]
    fn test_load_from_workspace_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".i18n-sync.json"), "{ not json").unwrap();

        let result = load_from_workspace(temp_dir.path());

        assert_that!(matches!(result, Err(ConfigError::ParseError(_))), eq(true));
    }

    /// 設定は camelCase でシリアライズされ、ラウンドトリップする
    #[rstest]
    fn test_settings_serialization_round_trip() {
        let settings = SyncSettings {
            overwrite: OverwriteSetting::Unconditional,
            patch_file: Some("patch.json".to_string()),
            ..Default::default()
        };

        let text = serde_json::to_string(&settings).unwrap();
        assert_that!(text.contains("\"referenceLanguage\""), eq(true));
        assert_that!(text.contains("\"overwrite\":\"unconditional\""), eq(true));

        let restored: SyncSettings = serde_json::from_str(&text).unwrap();
        assert_that!(restored, eq(&settings));
    }

    /// デフォルト設定の内容
    #[rstest]
    fn test_default_settings() {
        let settings = SyncSettings::default();

        assert_that!(settings.reference_language, eq("en"));
        assert_that!(settings.overwrite, eq(OverwriteSetting::IfUntranslated));
        assert_that!(settings.include_patterns, eq(&vec!["*.json".to_string()]));
        assert_that!(settings.patch_file, none());
    }
}
