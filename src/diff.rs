//! 未翻訳キー検出エンジン

use serde_json::Value;

use crate::tree::{
    LocaleTree,
    empty_tree,
};

/// One reference leaf whose target-side value is missing or still mirrors
/// the reference (an untranslated placeholder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UntranslatedKey {
    /// Dotted key path from the document root (e.g. `common.hello`).
    pub path: String,

    /// The reference value at that path.
    pub value: String,
}

/// Collects the reference leaves the target has not translated yet.
///
/// リファレンスツリーを走査し、ターゲット側の値が存在しないか
/// リファレンスと完全一致するリーフを列挙する。
///
/// - The reference decides which paths exist; paths present only in the
///   target are out of schema and ignored.
/// - Reference subtrees recurse, with the empty tree standing in when the
///   target side is absent or not an object.
/// - Non-string reference leaves report their JSON text as `value`.
///
/// Pure function of its inputs; the output order follows the reference
/// tree's own key order, so re-running over the same trees always yields
/// the same sequence.
#[must_use]
pub fn find_untranslated(
    reference: &LocaleTree,
    target: &LocaleTree,
    separator: &str,
) -> Vec<UntranslatedKey> {
    let mut result = Vec::new();
    collect_untranslated(reference, target, separator, None, &mut result);
    result
}

/// 再帰本体。`prefix` はここまでのキーパス。
fn collect_untranslated(
    reference: &LocaleTree,
    target: &LocaleTree,
    separator: &str,
    prefix: Option<&str>,
    result: &mut Vec<UntranslatedKey>,
) {
    for (key, reference_value) in reference {
        let path = prefix.map_or_else(|| key.clone(), |p| format!("{p}{separator}{key}"));
        match reference_value {
            Value::Object(reference_subtree) => {
                // ターゲット側がオブジェクトでない場合は空ツリーで代用する
                let target_subtree = match target.get(key) {
                    Some(Value::Object(subtree)) => subtree,
                    _ => empty_tree(),
                };
                collect_untranslated(
                    reference_subtree,
                    target_subtree,
                    separator,
                    Some(&path),
                    result,
                );
            }
            leaf => {
                if target.get(key).is_none_or(|value| value == leaf) {
                    result.push(UntranslatedKey { path, value: leaf_text(leaf) });
                }
            }
        }
    }
}

/// リーフ値の表示用文字列 (文字列以外のリーフは JSON テキスト)
fn leaf_text(leaf: &Value) -> String {
    match leaf {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
