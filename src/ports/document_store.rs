use std::fmt;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// 永続化の対象となるコレクション
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Books,
    Readers,
    Loans,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Books => "books",
            Collection::Readers => "readers",
            Collection::Loans => "loans",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ドキュメントストアのエラー
#[derive(Debug, Error)]
pub enum StoreError {
    /// 保存先の読み書きに失敗
    #[error("I/O error on {location}")]
    Io {
        location: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// ドキュメントとして解釈できない
    #[error("Malformed document in {location}")]
    Malformed {
        location: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// ドキュメントを書き出せない
    #[error("Failed to encode document for {location}")]
    Encode {
        location: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// 最上位がエンティティの配列ではない
    #[error("Document in {location} is not an array of records")]
    NotACollection { location: PathBuf },
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// ドキュメントストアポート
///
/// コレクションごとに独立した保存先を持ち、最上位ドキュメントは
/// エンティティドキュメントの配列。書き込みは常に全体の上書き。
pub trait DocumentStore {
    /// コレクションのドキュメントを読み込む
    ///
    /// 保存先が存在しない場合は `Ok(None)`。
    fn read_collection(&self, collection: Collection) -> Result<Option<Vec<Value>>>;

    /// コレクションのドキュメントを書き込む（全体を上書き）
    fn write_collection(&self, collection: Collection, records: &[Value]) -> Result<()>;
}
