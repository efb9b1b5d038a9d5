//! 同期ドライバ
//!
//! ファイル I/O を担う唯一のレイヤー。リファレンスロケールを読み込み、
//! ターゲットロケールを発見し、1 ファイルずつマージして書き戻す。
//! 集計はログではなく値 ([`SyncReport`]) として返す。

use std::collections::HashMap;
use std::path::{
    Path,
    PathBuf,
};

use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};
use ignore::WalkBuilder;
use serde_json::Value;
use thiserror::Error;

use crate::config::{
    OverwriteSetting,
    SyncSettings,
};
use crate::diff::find_untranslated;
use crate::keypath::{
    is_flat,
    unflatten,
};
use crate::merge::{
    OverwritePolicy,
    merge,
};
use crate::tree::{
    LocaleTree,
    TreeError,
    document_root,
    leaf_count,
};

/// Errors raised by the synchronization driver.
#[derive(Error, Debug)]
pub enum SyncError {
    /// ファイルの読み書きエラー
    #[error("Failed to read or write '{path}': {source}")]
    Io {
        /// 対象ファイルのパス
        path: PathBuf,
        /// 元の I/O エラー
        #[source]
        source: std::io::Error,
    },

    /// ロケールドキュメントのパースエラー
    #[error("Failed to parse '{path}': {source}")]
    Parse {
        /// 対象ファイルのパス
        path: PathBuf,
        /// 元のパースエラー
        #[source]
        source: serde_json::Error,
    },

    /// ロケールドキュメントの形状エラー
    #[error("Invalid locale document '{path}': {source}")]
    Tree {
        /// 対象ファイルのパス
        path: PathBuf,
        /// 元のツリーエラー
        #[source]
        source: TreeError,
    },

    /// 無効な glob パターン
    #[error("Invalid glob pattern '{pattern}': {source}")]
    Pattern {
        /// 問題のパターン
        pattern: String,
        /// 元の globset エラー
        #[source]
        source: globset::Error,
    },

    /// glob セットのビルド失敗
    #[error("Failed to build glob set: {0}")]
    GlobSetBuild(#[from] globset::Error),
}

/// Result summary of one language's synchronization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// 対象言語 (ロケールファイル名の語幹)
    pub language: String,

    /// マージ前に未翻訳だったリーフ数
    pub untranslated_before: usize,

    /// マージ後も未翻訳のまま残ったリーフ数
    pub untranslated_after: usize,

    /// リファレンスに含まれる翻訳対象リーフの総数
    pub leaf_count: usize,
}

/// Loads and parses one JSON document.
fn load_document(path: &Path) -> Result<Value, SyncError> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| SyncError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_str(&content)
        .map_err(|source| SyncError::Parse { path: path.to_path_buf(), source })
}

/// Loads a locale tree from a JSON file.
///
/// # Errors
/// 読み込み・パースに失敗した場合、またはルートがオブジェクトでない場合
pub fn load_tree(path: &Path) -> Result<LocaleTree, SyncError> {
    let document = load_document(path)?;
    let tree = document_root(&document)
        .map_err(|source| SyncError::Tree { path: path.to_path_buf(), source })?;
    Ok(tree.clone())
}

/// ターゲットロケールを読み込む。ファイルが無ければ空ツリーを返す
/// (新しい言語のブートストラップケース)。
fn load_tree_or_empty(path: &Path) -> Result<LocaleTree, SyncError> {
    if !path.exists() {
        tracing::debug!("Target locale not found, starting empty: {:?}", path);
        return Ok(LocaleTree::new());
    }
    load_tree(path)
}

/// Loads a patch document, accepting both nested trees and flat dotted-key
/// maps.
///
/// トップレベルの値が全て文字列の場合はフラット形式とみなし、
/// キーパスコーデックでネスト形式へ変換する。そのため、キー自体に
/// セパレータを含む深さ 1 のネスト文書はフラットマップと区別できず
/// 分割されてしまう。そのようなキーはネスト形式で書くこと (ドット
/// 区切りキーの既知の制限)。
///
/// # Errors
/// 読み込み・パースに失敗した場合
pub fn load_patch(path: &Path, separator: &str) -> Result<LocaleTree, SyncError> {
    let tree = load_tree(path)?;

    if is_flat(&tree) {
        let flat: HashMap<String, String> = tree
            .iter()
            .filter_map(|(key, value)| value.as_str().map(|s| (key.clone(), s.to_string())))
            .collect();
        return Ok(unflatten(&flat, separator));
    }
    Ok(tree)
}

/// glob パターン列からマッチャーをビルドする
fn build_glob_set(patterns: &[String]) -> Result<GlobSet, SyncError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|source| SyncError::Pattern { pattern: pattern.clone(), source })?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Discovers the target locale files for one pass.
///
/// `locales_dir` を走査し、include/exclude パターンに一致するファイルを
/// 集める。リファレンス言語のファイルは常に除外される。結果はパスの
/// ソート順で返す。
///
/// # Errors
/// glob パターンが無効な場合
pub fn discover_targets(
    workspace_root: &Path,
    settings: &SyncSettings,
) -> Result<Vec<PathBuf>, SyncError> {
    let locales_dir = workspace_root.join(&settings.locales_dir);
    let include_set = build_glob_set(&settings.include_patterns)?;
    let exclude_set = build_glob_set(&settings.exclude_patterns)?;
    let reference_name = format!("{}.json", settings.reference_language);

    let mut targets = Vec::new();
    for entry in WalkBuilder::new(&locales_dir).hidden(false).follow_links(false).build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Failed to walk locales directory: {e}");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name == reference_name {
            continue;
        }
        if !include_set.is_match(name) || exclude_set.is_match(name) {
            continue;
        }
        targets.push(path.to_path_buf());
    }
    targets.sort();
    Ok(targets)
}

/// ツリーを整形した JSON として書き出す (末尾改行つき)
fn write_tree(path: &Path, tree: &LocaleTree) -> Result<(), SyncError> {
    let mut text = serde_json::to_string_pretty(tree)
        .map_err(|source| SyncError::Parse { path: path.to_path_buf(), source })?;
    text.push('\n');
    std::fs::write(path, text).map_err(|source| SyncError::Io { path: path.to_path_buf(), source })
}

/// Synchronizes one target locale file.
///
/// 1 パスの流れ: ターゲットを読み込み、マージ前の未翻訳数を数え、
/// パッチをマージし、結果を書き戻してマージ後の未翻訳数を数える。
/// リファレンスとパッチは変更されない。
///
/// # Errors
/// ターゲットの読み書き・パースに失敗した場合
pub fn sync_file(
    reference: &LocaleTree,
    target_path: &Path,
    patch: &LocaleTree,
    settings: &SyncSettings,
) -> Result<SyncReport, SyncError> {
    let language = target_path
        .file_stem()
        .map_or_else(|| "unknown".to_string(), |stem| stem.to_string_lossy().to_string());
    let separator = settings.key_separator.as_str();

    let target = load_tree_or_empty(target_path)?;
    let untranslated_before = find_untranslated(reference, &target, separator).len();

    let policy = match settings.overwrite {
        OverwriteSetting::Unconditional => OverwritePolicy::Unconditional,
        OverwriteSetting::IfUntranslated => OverwritePolicy::IfUntranslated(reference),
    };
    let merged = merge(&target, patch, policy);
    let untranslated_after = find_untranslated(reference, &merged, separator).len();

    write_tree(target_path, &merged)?;

    tracing::debug!(
        "Synchronized '{language}': {untranslated_before} -> {untranslated_after} untranslated"
    );
    Ok(SyncReport {
        language,
        untranslated_before,
        untranslated_after,
        leaf_count: leaf_count(reference),
    })
}

/// Runs one full synchronization pass over a workspace.
///
/// リファレンスを一度だけ読み込み、パッチ (あれば) を読み込み、
/// 発見した各ターゲットロケールを独立に同期する。
///
/// # Errors
/// リファレンス・パッチ・ターゲットの読み書きに失敗した場合
pub fn run(workspace_root: &Path, settings: &SyncSettings) -> Result<Vec<SyncReport>, SyncError> {
    let locales_dir = workspace_root.join(&settings.locales_dir);
    let reference_path = locales_dir.join(format!("{}.json", settings.reference_language));

    tracing::debug!("Loading reference locale: {:?}", reference_path);
    let reference = load_tree(&reference_path)?;

    // パッチが無い場合は空ツリー (マージは no-op、レポートだけが目的)
    let patch = match &settings.patch_file {
        Some(patch_file) => load_patch(&workspace_root.join(patch_file), &settings.key_separator)?,
        None => LocaleTree::new(),
    };

    let targets = discover_targets(workspace_root, settings)?;
    tracing::debug!("Discovered {} target locale(s)", targets.len());

    let mut reports = Vec::with_capacity(targets.len());
    for target_path in &targets {
        reports.push(sync_file(&reference, target_path, &patch, settings)?);
    }
    Ok(reports)
}
