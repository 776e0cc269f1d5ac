//! 構造化ドキュメント（`serde_json::Value`）からの寛容なフィールド読み出し
//!
//! 欠落・型違いのフィールドはエラーにせず、呼び出し側が指定した既定値に落とす。

use serde_json::{Map, Value};

use super::Timestamp;

/// エンティティ1件分のドキュメント
pub type Document = Map<String, Value>;

/// ドキュメントとの相互変換
///
/// `from_document` は失敗しない。読めないフィールドは既定値になる。
pub trait DocumentRecord: Sized {
    fn to_document(&self) -> Value;

    fn from_document(document: &Value) -> Self;
}

/// マッピングでないドキュメントは空のマッピングとして扱う
pub(crate) fn fields(document: &Value) -> Option<&Document> {
    document.as_object()
}

pub(crate) fn text(fields: Option<&Document>, key: &str) -> String {
    fields
        .and_then(|f| f.get(key))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default()
}

pub(crate) fn flag(fields: Option<&Document>, key: &str, default: bool) -> bool {
    fields
        .and_then(|f| f.get(key))
        .and_then(Value::as_bool)
        .unwrap_or(default)
}

pub(crate) fn integer(fields: Option<&Document>, key: &str) -> i64 {
    fields
        .and_then(|f| f.get(key))
        .and_then(Value::as_i64)
        .unwrap_or_default()
}

/// `null`・欠落・解釈不能はいずれも `None`
pub(crate) fn timestamp(fields: Option<&Document>, key: &str) -> Option<Timestamp> {
    fields
        .and_then(|f| f.get(key))
        .and_then(Value::as_str)
        .and_then(Timestamp::parse)
}

/// 値があること自体に意味を持つ日時（返却日など）
///
/// `null` と欠落だけが `None`。値はあるが解釈できない場合は
/// `fallback` に置き換え、「値なし」とは扱わない。
pub(crate) fn recorded_timestamp(
    fields: Option<&Document>,
    key: &str,
    fallback: Timestamp,
) -> Option<Timestamp> {
    let value = fields.and_then(|f| f.get(key)).filter(|v| !v.is_null())?;

    match value.as_str().and_then(Timestamp::parse) {
        Some(timestamp) => Some(timestamp),
        None => {
            tracing::warn!("Unreadable {} {}, using {}", key, value, fallback);
            Some(fallback)
        }
    }
}
