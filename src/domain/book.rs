use serde_json::{Value, json};

use super::Isbn;
use super::document::{self, DocumentRecord};

/// 書籍 - カタログの1レコード
///
/// 不変条件：`is_available` が false であることと、
/// このISBNを参照する未返却の貸出が存在することは同値。
/// フラグの更新は管理者の貸出・返却処理からのみ行う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub isbn: Isbn,
    pub is_available: bool,
}

impl Book {
    /// 新規登録用の書籍（貸出可能な状態）
    pub fn new(title: impl Into<String>, author: impl Into<String>, isbn: impl Into<Isbn>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            is_available: true,
        }
    }

    pub(crate) fn mark_as_loaned(&mut self) {
        self.is_available = false;
    }

    pub(crate) fn mark_as_available(&mut self) {
        self.is_available = true;
    }

    /// タイトルまたは著者に `needle`（小文字化済み）が含まれるか
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.author.to_lowercase().contains(needle)
    }
}

impl Default for Book {
    fn default() -> Self {
        Self::new("", "", Isbn::default())
    }
}

impl DocumentRecord for Book {
    fn to_document(&self) -> Value {
        json!({
            "Title": self.title,
            "Author": self.author,
            "ISBN": self.isbn.as_str(),
            "IsAvailable": self.is_available,
        })
    }

    fn from_document(doc: &Value) -> Self {
        let fields = document::fields(doc);
        Self {
            title: document::text(fields, "Title"),
            author: document::text(fields, "Author"),
            isbn: Isbn::new(document::text(fields, "ISBN")),
            is_available: document::flag(fields, "IsAvailable", true),
        }
    }
}
