use std::collections::HashSet;

use crate::domain::{self, Book, Isbn, Loan, Reader, ReaderId, Timestamp};

use super::errors::{InvariantViolation, LibraryError, Result};

/// 蔵書管理
///
/// 書籍・利用者・貸出の3つのコレクションを排他的に所有し、
/// コレクション間の整合性を保つ。
///
/// - すべてのコレクションは挿入順を保持する
/// - 問い合わせはコピーを返す
/// - 失敗した操作は何も変更しない
///
/// 書籍の貸出可否フラグは貸出記録から導かれる非正規化値で、
/// 貸出状態を変える操作はすべて `refresh_availability` を通して更新する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryManager {
    pub(super) books: Vec<Book>,
    pub(super) readers: Vec<Reader>,
    pub(super) loans: Vec<Loan>,
}

impl LibraryManager {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // 書籍
    // ========================================================================

    /// 書籍を登録する
    ///
    /// 貸出可否フラグは渡された値に関わらず貸出記録から決まる。
    pub fn add_book(&mut self, mut book: Book) -> Result<()> {
        self.guarded(|library| {
            if library.book_index(&book.isbn).is_some() {
                return Err(LibraryError::BookAlreadyExists(book.isbn));
            }

            book.is_available = !library.has_active_loan(&book.isbn);
            tracing::debug!("Added book {}", book.isbn);
            library.books.push(book);
            Ok(())
        })
    }

    /// 書籍を削除する（貸出中は不可）
    pub fn remove_book(&mut self, isbn: &Isbn) -> Result<()> {
        self.guarded(|library| {
            let index = library
                .book_index(isbn)
                .ok_or_else(|| LibraryError::BookNotFound(isbn.clone()))?;

            if !library.books[index].is_available {
                return Err(LibraryError::BookOnLoan(isbn.clone()));
            }

            library.books.remove(index);
            tracing::debug!("Removed book {}", isbn);
            Ok(())
        })
    }

    pub fn find_book(&self, isbn: &Isbn) -> Option<Book> {
        self.book_index(isbn).map(|i| self.books[i].clone())
    }

    /// タイトルまたは著者の部分一致検索（大文字小文字を区別しない）
    ///
    /// 空文字列はカタログ全体を返す。結果はカタログ順。
    pub fn search_books(&self, term: &str) -> Vec<Book> {
        if term.is_empty() {
            return self.books.clone();
        }

        let needle = term.to_lowercase();
        self.books
            .iter()
            .filter(|b| b.matches_lowercase(&needle))
            .cloned()
            .collect()
    }

    pub fn available_books(&self) -> Vec<Book> {
        self.books.iter().filter(|b| b.is_available).cloned().collect()
    }

    // ========================================================================
    // 利用者
    // ========================================================================

    /// 次に採番する利用者ID（既存の最大ID + 1、空なら1）
    ///
    /// 最大IDが `i64::MAX` の場合は採番できない。
    pub fn next_reader_id(&self) -> Result<ReaderId> {
        let max = self
            .readers
            .iter()
            .map(|r| r.id)
            .max()
            .unwrap_or_default()
            .max(ReaderId::default());

        max.next().ok_or(LibraryError::ReaderIdsExhausted(max))
    }

    pub fn add_reader(&mut self, reader: Reader) -> Result<()> {
        self.guarded(|library| {
            if library.reader_index(reader.id).is_some() {
                return Err(LibraryError::ReaderAlreadyExists(reader.id));
            }

            tracing::debug!("Added reader {}", reader.id);
            library.readers.push(reader);
            Ok(())
        })
    }

    /// IDを採番して利用者を登録する
    pub fn register_reader(
        &mut self,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Reader> {
        let reader = Reader::new(self.next_reader_id()?, name, email);
        self.add_reader(reader.clone())?;
        Ok(reader)
    }

    /// 利用者を削除する
    ///
    /// 利用者の貸出中の記録も削除し、対象の書籍は貸出可能に戻る。
    /// 返却済みの記録は履歴として残す。
    pub fn remove_reader(&mut self, id: ReaderId) -> Result<()> {
        self.guarded(|library| {
            let index = library
                .reader_index(id)
                .ok_or(LibraryError::ReaderNotFound(id))?;

            let released: Vec<Isbn> = library
                .loans
                .iter()
                .filter(|l| l.reader_id == id && l.is_active())
                .map(|l| l.book_isbn.clone())
                .collect();

            library.loans.retain(|l| !(l.reader_id == id && l.is_active()));
            library.readers.remove(index);

            for isbn in &released {
                library.refresh_availability(isbn);
            }

            tracing::info!(
                "Removed reader {} and {} active loan(s)",
                id,
                released.len()
            );
            Ok(())
        })
    }

    pub fn find_reader(&self, id: ReaderId) -> Option<Reader> {
        self.reader_index(id).map(|i| self.readers[i].clone())
    }

    // ========================================================================
    // 貸出
    // ========================================================================

    /// 現在時刻で書籍を貸し出す
    pub fn issue_loan(&mut self, isbn: &Isbn, reader_id: ReaderId) -> Result<()> {
        self.issue_loan_at(isbn, reader_id, Timestamp::now())
    }

    /// 書籍を貸し出す
    ///
    /// ビジネスルール：
    /// - 書籍が存在し、貸出可能であること
    /// - 利用者が存在すること
    pub fn issue_loan_at(
        &mut self,
        isbn: &Isbn,
        reader_id: ReaderId,
        loaned_at: Timestamp,
    ) -> Result<()> {
        self.guarded(|library| {
            let index = library
                .book_index(isbn)
                .ok_or_else(|| LibraryError::BookNotFound(isbn.clone()))?;

            if !library.books[index].is_available {
                return Err(LibraryError::BookNotAvailable(isbn.clone()));
            }

            if library.reader_index(reader_id).is_none() {
                return Err(LibraryError::ReaderNotFound(reader_id));
            }

            library
                .loans
                .push(domain::loan::issue_loan(isbn.clone(), reader_id, loaned_at));
            library.refresh_availability(isbn);

            tracing::info!("Issued book {} to reader {}", isbn, reader_id);
            Ok(())
        })
    }

    /// 現在時刻で書籍を返却する
    pub fn return_book(&mut self, isbn: &Isbn, reader_id: ReaderId) -> Result<()> {
        self.return_book_at(isbn, reader_id, Timestamp::now())
    }

    /// 書籍を返却する
    ///
    /// 書籍・利用者の両方が一致する貸出中の記録が必要。
    pub fn return_book_at(
        &mut self,
        isbn: &Isbn,
        reader_id: ReaderId,
        returned_at: Timestamp,
    ) -> Result<()> {
        self.guarded(|library| {
            let no_active_loan = || LibraryError::NoActiveLoan {
                isbn: isbn.clone(),
                reader_id,
            };

            let index = library
                .loans
                .iter()
                .position(|l| l.is_active_for(isbn, reader_id))
                .ok_or_else(no_active_loan)?;

            let returned = domain::loan::return_loan(&library.loans[index], returned_at)
                .map_err(|_| no_active_loan())?;
            library.loans[index] = returned;
            library.refresh_availability(isbn);

            tracing::info!("Reader {} returned book {}", reader_id, isbn);
            Ok(())
        })
    }

    pub fn active_loans(&self) -> Vec<Loan> {
        self.loans.iter().filter(|l| l.is_active()).cloned().collect()
    }

    // ========================================================================
    // 読み取り専用アクセス
    // ========================================================================

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn readers(&self) -> &[Reader] {
        &self.readers
    }

    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    /// すべての不変条件を検査し、違反を列挙する
    pub fn invariant_violations(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        let mut isbns = HashSet::new();
        for book in &self.books {
            if !isbns.insert(&book.isbn) {
                violations.push(InvariantViolation::DuplicateIsbn(book.isbn.clone()));
            }
        }

        let mut ids = HashSet::new();
        for reader in &self.readers {
            if !ids.insert(reader.id) {
                violations.push(InvariantViolation::DuplicateReaderId(reader.id));
            }
        }

        for book in &self.books {
            let active_loans = self
                .loans
                .iter()
                .filter(|l| l.is_active() && l.book_isbn == book.isbn)
                .count();
            let consistent = match active_loans {
                0 => book.is_available,
                1 => !book.is_available,
                _ => false,
            };
            if !consistent {
                violations.push(InvariantViolation::AvailabilityMismatch {
                    isbn: book.isbn.clone(),
                    is_available: book.is_available,
                    active_loans,
                });
            }
        }

        for loan in self.loans.iter().filter(|l| l.is_active()) {
            if !isbns.contains(&loan.book_isbn) {
                violations.push(InvariantViolation::UnknownBook(loan.book_isbn.clone()));
            }
            if !ids.contains(&loan.reader_id) {
                violations.push(InvariantViolation::UnknownReader {
                    isbn: loan.book_isbn.clone(),
                    reader_id: loan.reader_id,
                });
            }
        }

        violations
    }

    /// 不変条件がすべて成り立つか
    pub fn check_invariants(&self) -> bool {
        self.invariant_violations().is_empty()
    }

    // ========================================================================
    // 内部ヘルパー
    // ========================================================================

    fn book_index(&self, isbn: &Isbn) -> Option<usize> {
        self.books.iter().position(|b| b.isbn == *isbn)
    }

    fn reader_index(&self, id: ReaderId) -> Option<usize> {
        self.readers.iter().position(|r| r.id == id)
    }

    fn has_active_loan(&self, isbn: &Isbn) -> bool {
        self.loans
            .iter()
            .any(|l| l.is_active() && l.book_isbn == *isbn)
    }

    /// 変更操作を実行する
    ///
    /// debug ビルドでは、整合していた状態が操作後も整合していることを検査する。
    /// 読み込んだ時点で既に不整合だった状態は検査しない。
    fn guarded<T>(&mut self, operation: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let was_consistent = cfg!(debug_assertions) && self.check_invariants();

        let result = operation(self);

        if was_consistent {
            let violations = self.invariant_violations();
            debug_assert!(
                violations.is_empty(),
                "Mutation broke library invariants: {:?}",
                violations
            );
        }
        result
    }

    /// 貸出可否フラグを貸出記録に合わせる
    ///
    /// 貸出状態を変えるすべての経路はここを通る。
    fn refresh_availability(&mut self, isbn: &Isbn) {
        let on_loan = self.has_active_loan(isbn);
        if let Some(index) = self.book_index(isbn) {
            let book = &mut self.books[index];
            if on_loan {
                book.mark_as_loaned();
            } else {
                book.mark_as_available();
            }
        }
    }

    /// すべての書籍の貸出可否フラグを貸出記録から計算し直す
    pub(super) fn refresh_all_availability(&mut self) {
        let isbns: Vec<Isbn> = self.books.iter().map(|b| b.isbn.clone()).collect();
        for isbn in &isbns {
            self.refresh_availability(isbn);
        }
    }
}
