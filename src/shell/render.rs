use crate::domain::{Book, Loan};

pub const MENU: &str = "\n--- Library Menu ---\n\
1. Add book\n\
2. Remove book\n\
3. Add reader\n\
4. Remove reader\n\
5. Issue book\n\
6. Return book\n\
7. Search books\n\
8. Reports\n\
9. Save & Exit\n\
0. Exit without save\n\
Choice: ";

/// 検索結果の1行
pub fn search_result_line(book: &Book) -> String {
    let status = if book.is_available { "Available" } else { "Loaned" };
    format!("{} — {} — {} — {}", book.title, book.author, book.isbn, status)
}

/// 貸出可能な書籍の1行
pub fn available_book_line(book: &Book) -> String {
    format!("{} — {} — {}", book.title, book.author, book.isbn)
}

/// 貸出中の記録の1行
pub fn active_loan_line(loan: &Loan) -> String {
    format!(
        "ISBN: {} ReaderId: {} since {}",
        loan.book_isbn, loan.reader_id, loan.loan_date
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Isbn, ReaderId, Timestamp, loan::issue_loan};

    #[test]
    fn test_search_result_line_shows_status() {
        let mut book = Book::new("Dune", "Herbert", "111");
        assert_eq!(search_result_line(&book), "Dune — Herbert — 111 — Available");
        book.is_available = false;
        assert_eq!(search_result_line(&book), "Dune — Herbert — 111 — Loaned");
    }

    #[test]
    fn test_active_loan_line() {
        let loan = issue_loan(
            Isbn::from("111"),
            ReaderId::new(2),
            Timestamp::parse("2024-02-03T04:05:06Z").unwrap(),
        );
        assert_eq!(
            active_loan_line(&loan),
            "ISBN: 111 ReaderId: 2 since 2024-02-03T04:05:06Z"
        );
    }
}
