use thiserror::Error;

use crate::domain::{Isbn, ReaderId};
use crate::ports::{Collection, StoreError};

/// 蔵書管理のエラー
///
/// どのバリアントでも、失敗した操作は状態を一切変更しない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LibraryError {
    /// 同じISBNの書籍が既に登録されている
    #[error("Book {0} already exists")]
    BookAlreadyExists(Isbn),

    /// 書籍が見つからない
    #[error("Book {0} not found")]
    BookNotFound(Isbn),

    /// 貸出中のため削除できない
    #[error("Book {0} is on loan")]
    BookOnLoan(Isbn),

    /// 書籍が貸出不可
    #[error("Book {0} is not available for loan")]
    BookNotAvailable(Isbn),

    /// 同じIDの利用者が既に登録されている
    #[error("Reader {0} already exists")]
    ReaderAlreadyExists(ReaderId),

    /// 利用者が見つからない
    #[error("Reader {0} not found")]
    ReaderNotFound(ReaderId),

    /// 最大IDが `i64::MAX` に達し、次のIDを採番できない
    #[error("No reader id left after {0}")]
    ReaderIdsExhausted(ReaderId),

    /// 該当する貸出中の記録がない
    #[error("No active loan of book {isbn} for reader {reader_id}")]
    NoActiveLoan { isbn: Isbn, reader_id: ReaderId },
}

/// 保存のエラー
///
/// 保存は3つの保存先をまたいだトランザクションではない。
/// 途中で失敗した場合、それ以前のコレクションは書き込み済みのまま残る。
#[derive(Debug, Error)]
#[error("Failed to save {collection}")]
pub struct PersistenceError {
    pub collection: Collection,
    #[source]
    pub source: StoreError,
}

/// 不変条件の違反
///
/// 通常の操作では発生しない。保存データが外部で書き換えられた場合などに検出される。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// ISBNの重複
    #[error("Duplicate ISBN {0}")]
    DuplicateIsbn(Isbn),

    /// 利用者IDの重複
    #[error("Duplicate reader id {0}")]
    DuplicateReaderId(ReaderId),

    /// 貸出可否フラグと貸出中の記録数が一致しない
    #[error("Book {isbn} is_available={is_available} but has {active_loans} active loan(s)")]
    AvailabilityMismatch {
        isbn: Isbn,
        is_available: bool,
        active_loans: usize,
    },

    /// カタログにない書籍への貸出中の記録
    #[error("Active loan references unknown book {0}")]
    UnknownBook(Isbn),

    /// 登録されていない利用者の貸出中の記録
    #[error("Active loan of book {isbn} references unknown reader {reader_id}")]
    UnknownReader { isbn: Isbn, reader_id: ReaderId },
}

/// 蔵書管理の Result型
pub type Result<T> = std::result::Result<T, LibraryError>;
