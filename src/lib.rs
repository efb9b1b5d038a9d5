//! i18n-sync
//!
//! ネストした JSON ロケールファイル向けのローカライズリソース同期エンジン
//!
//! リファレンスロケール (基準言語) を完全性のベースラインとして、
//! パッチ (新しい翻訳) をターゲットロケールへマージし、未翻訳のまま
//! 残っているキーを決定的に報告する。

pub mod config;
pub mod diff;
pub mod keypath;
pub mod merge;
pub mod sync;
pub mod tree;

// コアエンジンを再エクスポート
pub use diff::{
    UntranslatedKey,
    find_untranslated,
};
pub use merge::{
    OverwritePolicy,
    merge,
};
pub use tree::LocaleTree;
