//! マージエンジン
//!
//! ターゲットツリーとパッチツリーを結合して新しいツリーを生成する。
//! 入力のツリーはどちらも変更されない (関数的セマンティクス)。

use serde_json::Value;

use crate::tree::{
    LocaleTree,
    empty_tree,
};

/// Rule governing whether a patch leaf may replace an existing target value.
#[derive(Debug, Clone, Copy)]
pub enum OverwritePolicy<'a> {
    /// The patch is authoritative: its leaves always replace the target's,
    /// even over an existing human-supplied translation.
    Unconditional,

    /// The patch only fills leaves whose target value is missing or still
    /// equal to the carried reference tree's value at the same path.
    ///
    /// 一度翻訳されたリーフには二度と触れないため、繰り返しの適用は
    /// 冪等になる。
    IfUntranslated(&'a LocaleTree),
}

impl OverwritePolicy<'_> {
    /// 1 階層下のポリシー (リファレンスを同じキーで掘り下げる)
    fn descend(self, key: &str) -> Self {
        match self {
            Self::Unconditional => Self::Unconditional,
            Self::IfUntranslated(reference) => match reference.get(key) {
                Some(Value::Object(subtree)) => Self::IfUntranslated(subtree),
                _ => Self::IfUntranslated(empty_tree()),
            },
        }
    }

    /// このキーの現在値を上書きしてよいか
    fn allows(self, key: &str, current: Option<&Value>) -> bool {
        match self {
            Self::Unconditional => true,
            Self::IfUntranslated(reference) => {
                current.is_none_or(|value| reference.get(key) == Some(value))
            }
        }
    }
}

/// Combines a target tree and a patch tree into a new tree.
///
/// Traversal is driven by the patch's keys; target-only keys are carried
/// through unchanged by copy at each level. The result contains the union
/// of both trees' key paths, and no key is ever deleted.
///
/// - パッチ側がサブツリーの場合は再帰する。ターゲット側に同じキーが
///   無ければ空ツリーを代用し、パッチのサブツリーをそのまま取り込む。
/// - パッチ側がリーフの場合は `policy` が許可したときだけ置き換える。
///
/// 形状の衝突 (片方がリーフで片方がサブツリー) は致命的ではなく、
/// 構造的に豊かな側を優先して警告ログのみ残す。
#[must_use]
pub fn merge(target: &LocaleTree, patch: &LocaleTree, policy: OverwritePolicy<'_>) -> LocaleTree {
    let mut result = target.clone();

    for (key, patch_value) in patch {
        match patch_value {
            Value::Object(patch_subtree) => {
                let target_subtree = match target.get(key) {
                    Some(Value::Object(subtree)) => subtree,
                    Some(_) => {
                        tracing::warn!("Shape conflict at '{key}': patch subtree replaces leaf");
                        empty_tree()
                    }
                    None => empty_tree(),
                };
                let merged = merge(target_subtree, patch_subtree, policy.descend(key));
                result.insert(key.clone(), Value::Object(merged));
            }
            patch_leaf => {
                if policy.allows(key, target.get(key)) {
                    if matches!(target.get(key), Some(Value::Object(_))) {
                        tracing::warn!("Shape conflict at '{key}': patch leaf replaces subtree");
                    }
                    result.insert(key.clone(), patch_leaf.clone());
                }
            }
        }
    }
    result
}
