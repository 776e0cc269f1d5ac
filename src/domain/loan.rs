use serde_json::{Value, json};

use super::document::{self, DocumentRecord};
use super::{Isbn, ReaderId, ReturnBookError, Timestamp};

/// 貸出 - 1冊の書籍の1回の貸出記録
///
/// 書籍・利用者へはIDで参照するだけで、所有はしない。
/// 返却済みの貸出も履歴として保持し続ける。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Loan {
    // 他の集約への参照（IDのみ）
    pub book_isbn: Isbn,
    pub reader_id: ReaderId,

    pub loan_date: Timestamp,
    /// `None` は貸出中
    pub return_date: Option<Timestamp>,
}

impl Loan {
    /// 貸出中（未返却）か
    pub fn is_active(&self) -> bool {
        self.return_date.is_none()
    }

    /// 指定の書籍・利用者に対する貸出中の記録か
    pub fn is_active_for(&self, isbn: &Isbn, reader_id: ReaderId) -> bool {
        self.is_active() && self.book_isbn == *isbn && self.reader_id == reader_id
    }
}

/// 純粋関数：書籍を貸し出す
///
/// 返却日なしの新しい貸出を返す。前提条件（書籍が貸出可能、
/// 利用者が存在）の確認は管理者側の責務。
pub fn issue_loan(book_isbn: Isbn, reader_id: ReaderId, loan_date: Timestamp) -> Loan {
    Loan {
        book_isbn,
        reader_id,
        loan_date,
        return_date: None,
    }
}

/// 純粋関数：書籍を返却する
///
/// 返却日は一度だけ設定される。
pub fn return_loan(loan: &Loan, returned_at: Timestamp) -> Result<Loan, ReturnBookError> {
    if !loan.is_active() {
        return Err(ReturnBookError::AlreadyReturned);
    }

    Ok(Loan {
        return_date: Some(returned_at),
        ..loan.clone()
    })
}

impl DocumentRecord for Loan {
    fn to_document(&self) -> Value {
        json!({
            "BookISBN": self.book_isbn.as_str(),
            "ReaderId": self.reader_id.value(),
            "LoanDate": self.loan_date.to_string(),
            // 未返却は明示的な null で書き出す
            "ReturnDate": self.return_date.map(|d| d.to_string()),
        })
    }

    fn from_document(doc: &Value) -> Self {
        let fields = document::fields(doc);
        let loan_date = document::timestamp(fields, "LoanDate").unwrap_or_default();
        Self {
            book_isbn: Isbn::new(document::text(fields, "BookISBN")),
            reader_id: ReaderId::new(document::integer(fields, "ReaderId")),
            loan_date,
            // 返却日の表記が読めなくても返却済みのまま扱う
            return_date: document::recorded_timestamp(fields, "ReturnDate", loan_date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(text: &str) -> Timestamp {
        Timestamp::parse(text).unwrap()
    }

    #[test]
    fn test_issue_loan_is_active() {
        let loan = issue_loan(Isbn::from("111"), ReaderId::new(1), at("2024-01-01T09:00:00Z"));
        assert!(loan.is_active());
        assert!(loan.is_active_for(&Isbn::from("111"), ReaderId::new(1)));
        assert!(!loan.is_active_for(&Isbn::from("111"), ReaderId::new(2)));
        assert!(!loan.is_active_for(&Isbn::from("222"), ReaderId::new(1)));
    }

    #[test]
    fn test_return_loan_sets_return_date() {
        let loan = issue_loan(Isbn::from("111"), ReaderId::new(1), at("2024-01-01T09:00:00Z"));
        let returned = return_loan(&loan, at("2024-01-08T17:30:00Z")).unwrap();

        assert!(!returned.is_active());
        assert_eq!(returned.return_date, Some(at("2024-01-08T17:30:00Z")));
        assert_eq!(returned.loan_date, loan.loan_date);
        assert_eq!(returned.book_isbn, loan.book_isbn);
    }

    #[test]
    fn test_return_loan_fails_when_already_returned() {
        let loan = issue_loan(Isbn::from("111"), ReaderId::new(1), at("2024-01-01T09:00:00Z"));
        let returned = return_loan(&loan, at("2024-01-02T09:00:00Z")).unwrap();

        let result = return_loan(&returned, at("2024-01-03T09:00:00Z"));
        assert_eq!(result.unwrap_err(), ReturnBookError::AlreadyReturned);
    }

    #[test]
    fn test_active_loan_document_has_explicit_null() {
        let loan = issue_loan(Isbn::from("111"), ReaderId::new(1), at("2024-01-01T09:00:00Z"));
        let doc = loan.to_document();

        assert_eq!(
            doc,
            json!({
                "BookISBN": "111",
                "ReaderId": 1,
                "LoanDate": "2024-01-01T09:00:00Z",
                "ReturnDate": null,
            })
        );
        assert!(doc.as_object().unwrap().contains_key("ReturnDate"));
    }

    #[test]
    fn test_from_document_returned_loan() {
        let loan = Loan::from_document(&json!({
            "BookISBN": "111",
            "ReaderId": 4,
            "LoanDate": "2024-01-01T09:00:00Z",
            "ReturnDate": "2024-01-05T10:00:00Z",
        }));
        assert_eq!(loan.reader_id, ReaderId::new(4));
        assert_eq!(loan.return_date, Some(at("2024-01-05T10:00:00Z")));
    }

    #[test]
    fn test_from_document_missing_return_date_is_active() {
        let loan = Loan::from_document(&json!({"BookISBN": "111", "ReaderId": 4}));
        assert!(loan.is_active());
        assert_eq!(loan.loan_date, Timestamp::default());
    }

    #[test]
    fn test_from_document_unreadable_return_date_stays_returned() {
        let loan = Loan::from_document(&json!({
            "BookISBN": "111",
            "ReaderId": 4,
            "LoanDate": "2024-01-01T09:00:00Z",
            "ReturnDate": "2024-01-05 10:00:00",
        }));
        assert!(!loan.is_active());
        assert_eq!(loan.return_date, Some(at("2024-01-01T09:00:00Z")));
    }
}
