//! ロケールツリーの基本型

use std::sync::LazyLock;

use serde_json::{
    Map,
    Value,
};
use thiserror::Error;

/// One locale document: a mapping from string key to either a string leaf
/// or a nested subtree.
///
/// Arrays and non-string scalars are opaque leaves: they are never recursed
/// into and only ever compared by strict equality.
pub type LocaleTree = Map<String, Value>;

/// Default separator for dotted key paths (e.g. `common.hello`).
pub const DEFAULT_KEY_SEPARATOR: &str = ".";

/// 共有の空ツリー (走査中に片側が存在しない場合の代用)
static EMPTY_TREE: LazyLock<LocaleTree> = LazyLock::new(LocaleTree::new);

/// Returns the shared empty tree substituted when one side of a lock-step
/// traversal is absent.
#[must_use]
pub fn empty_tree() -> &'static LocaleTree {
    &EMPTY_TREE
}

/// Counts the leaves of a tree (values that are not subtrees).
///
/// リファレンスツリーに適用すると翻訳対象のエントリ総数になる。
/// 配列や数値などの不透明なリーフも 1 と数える。
#[must_use]
pub fn leaf_count(tree: &LocaleTree) -> usize {
    tree.values()
        .map(|value| match value {
            Value::Object(subtree) => leaf_count(subtree),
            _ => 1,
        })
        .sum()
}

/// Errors raised when viewing a JSON document as a locale tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// ドキュメントのルートがオブジェクトではない
    #[error("locale document root must be a JSON object, found {found}")]
    NotAnObject {
        /// JSON type name of the offending root value.
        found: &'static str,
    },
}

/// Views a parsed JSON document as a locale tree.
///
/// # Errors
/// ルートがオブジェクトでない場合は [`TreeError::NotAnObject`]
pub fn document_root(document: &Value) -> Result<&LocaleTree, TreeError> {
    document.as_object().ok_or(TreeError::NotAnObject { found: json_type_name(document) })
}

/// JSON value type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
