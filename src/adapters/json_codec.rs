use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

use crate::ports::document_store::{Result, StoreError};

/// 保存ファイルのインデント幅
const INDENT: &[u8] = b"    ";

/// テキストをエンティティドキュメントの配列として解釈する
pub fn decode_records(location: &Path, text: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(text).map_err(|source| StoreError::Malformed {
        location: location.to_path_buf(),
        source,
    })?;

    match value {
        Value::Array(records) => Ok(records),
        _ => Err(StoreError::NotACollection {
            location: location.to_path_buf(),
        }),
    }
}

/// エンティティドキュメントの配列を整形済みテキストにする
pub fn encode_records(location: &Path, records: &[Value]) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    records
        .serialize(&mut serializer)
        .map_err(|source| StoreError::Encode {
            location: location.to_path_buf(),
            source,
        })?;

    // serde_json は常に UTF-8 を出力する
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_records_array() {
        let records = decode_records(Path::new("books.json"), r#"[{"ISBN":"1"},{"ISBN":"2"}]"#)
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], json!({"ISBN": "2"}));
    }

    #[test]
    fn test_decode_records_rejects_invalid_json() {
        let err = decode_records(Path::new("books.json"), "[{").unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }

    #[test]
    fn test_decode_records_rejects_non_array() {
        let err = decode_records(Path::new("books.json"), r#"{"ISBN":"1"}"#).unwrap_err();
        assert!(matches!(err, StoreError::NotACollection { .. }));
    }

    #[test]
    fn test_encode_records_uses_four_space_indent() {
        let text = encode_records(Path::new("readers.json"), &[json!({"Id": 1})]).unwrap();
        assert_eq!(text, "[\n    {\n        \"Id\": 1\n    }\n]");
    }
}
