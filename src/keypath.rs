//! フラットなドット区切りキーとネストしたツリーの相互変換

use std::collections::HashMap;

use serde_json::Value;

use crate::tree::LocaleTree;

/// Builds a nested locale tree from a flat dotted-key map.
///
/// Splits each key on `separator` and creates intermediate subtrees as
/// needed; the final segment receives the value as a string leaf. Entries
/// are applied in sorted key order, so the resulting shape does not depend
/// on the map's iteration order.
///
/// 衝突時の挙動:
/// - 中間セグメントが既に文字列リーフの場合、サブツリーで置き換える
///   (last-applied-wins、警告ログのみ)
/// - セパレータを含むキーセグメントはエスケープできないため、そのような
///   キーはネスト形式で渡す必要がある (既知の制限)
///
/// # Examples
/// ```
/// use std::collections::HashMap;
///
/// use i18n_sync::keypath::unflatten;
/// use serde_json::json;
///
/// let flat = HashMap::from([
///     ("a.b".to_string(), "x".to_string()),
///     ("a.c".to_string(), "y".to_string()),
/// ]);
///
/// let tree = unflatten(&flat, ".");
/// assert_eq!(serde_json::Value::Object(tree), json!({"a": {"b": "x", "c": "y"}}));
/// ```
#[must_use]
pub fn unflatten(flat: &HashMap<String, String>, separator: &str) -> LocaleTree {
    let mut root = LocaleTree::new();

    // HashMap の走査順に依存しないよう、キーをソートしてから適用する
    let mut entries: Vec<_> = flat.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (key, value) in entries {
        let segments: Vec<&str> = key.split(separator).collect();
        assign(&mut root, &segments, value);
    }
    root
}

/// Returns `true` when every top-level value is a string, i.e. the document
/// looks like a flat dotted-key map rather than a nested tree.
///
/// ドットを含まないキーだけの場合でも `unflatten` は恒等変換になるため、
/// この判定が誤って真になっても結果は変わらない。
#[must_use]
pub fn is_flat(tree: &LocaleTree) -> bool {
    !tree.is_empty() && tree.values().all(Value::is_string)
}

/// 1 つのキーパスをツリーに書き込む再帰本体
fn assign(node: &mut LocaleTree, segments: &[&str], value: &str) {
    match segments.split_first() {
        None => {}
        Some((leaf, [])) => {
            node.insert((*leaf).to_string(), Value::String(value.to_string()));
        }
        Some((head, rest)) => {
            let child =
                node.entry((*head).to_string()).or_insert_with(|| Value::Object(LocaleTree::new()));
            if !child.is_object() {
                tracing::warn!("Key segment '{head}' already held a leaf; replacing with a subtree");
                *child = Value::Object(LocaleTree::new());
            }
            if let Value::Object(subtree) = child {
                assign(subtree, rest, value);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    /// フラットマップの変換結果を JSON 値として比較するヘルパー
    fn unflatten_json(entries: &[(&str, &str)], separator: &str) -> serde_json::Value {
        let flat: HashMap<String, String> =
            entries.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        serde_json::Value::Object(unflatten(&flat, separator))
    }

    /// `unflatten`: 衝突のないドット区切りキーのラウンドトリップ
    #[rstest]
    fn test_unflatten_nested_keys() {
        let tree = unflatten_json(&[("a.b", "x"), ("a.c", "y")], ".");

        assert_that!(tree, eq(&json!({"a": {"b": "x", "c": "y"}})));
    }

    /// `unflatten`: ドットを含まないキーは恒等変換
    #[rstest]
    fn test_unflatten_without_dots_is_identity() {
        let tree = unflatten_json(&[("greeting", "Hello"), ("farewell", "Bye")], ".");

        assert_that!(tree, eq(&json!({"greeting": "Hello", "farewell": "Bye"})));
    }

    #[rstest]
    fn test_unflatten_deep_path() {
        let tree = unflatten_json(&[("a.b.c.d", "deep")], ".");

        assert_that!(tree, eq(&json!({"a": {"b": {"c": {"d": "deep"}}}})));
    }

    /// `unflatten`: `"a"` と `"a.b"` の衝突はソート順で last-applied-wins
    #[rstest]
    fn test_unflatten_collision_last_applied_wins() {
        let tree = unflatten_json(&[("a", "leaf"), ("a.b", "x")], ".");

        assert_that!(tree, eq(&json!({"a": {"b": "x"}})));
    }

    #[rstest]
    fn test_unflatten_with_custom_separator() {
        let tree = unflatten_json(&[("ns:key", "value")], ":");

        assert_that!(tree, eq(&json!({"ns": {"key": "value"}})));
    }

    #[rstest]
    fn test_unflatten_empty_map() {
        let tree = unflatten_json(&[], ".");

        assert_that!(tree, eq(&json!({})));
    }

    #[rstest]
    #[case::all_strings(json!({"a.b": "x", "c": "y"}), true)]
    #[case::nested_value(json!({"a": {"b": "x"}}), false)]
    #[case::mixed(json!({"a": "x", "b": {"c": "y"}}), false)]
    #[case::empty(json!({}), false)]
    fn test_is_flat(#[case] document: serde_json::Value, #[case] expected: bool) {
        let tree = document.as_object().unwrap();

        assert_that!(is_flat(tree), eq(expected));
    }
}
