use std::str::FromStr;

use crate::domain::ReaderId;

/// メニューの選択肢
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    AddBook,
    RemoveBook,
    AddReader,
    RemoveReader,
    IssueBook,
    ReturnBook,
    SearchBooks,
    Reports,
    SaveAndExit,
    ExitWithoutSave,
}

impl FromStr for MenuChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(MenuChoice::AddBook),
            "2" => Ok(MenuChoice::RemoveBook),
            "3" => Ok(MenuChoice::AddReader),
            "4" => Ok(MenuChoice::RemoveReader),
            "5" => Ok(MenuChoice::IssueBook),
            "6" => Ok(MenuChoice::ReturnBook),
            "7" => Ok(MenuChoice::SearchBooks),
            "8" => Ok(MenuChoice::Reports),
            "9" => Ok(MenuChoice::SaveAndExit),
            "0" => Ok(MenuChoice::ExitWithoutSave),
            other => Err(format!("Unknown command: {}", other)),
        }
    }
}

/// 入力テキストを利用者IDとして解釈する
pub fn parse_reader_id(text: &str) -> Option<ReaderId> {
    text.trim().parse::<i64>().ok().map(ReaderId::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_choice_from_str() {
        assert_eq!("1".parse(), Ok(MenuChoice::AddBook));
        assert_eq!(" 9 ".parse(), Ok(MenuChoice::SaveAndExit));
        assert_eq!("0".parse(), Ok(MenuChoice::ExitWithoutSave));
        assert!("10".parse::<MenuChoice>().is_err());
        assert!("".parse::<MenuChoice>().is_err());
    }

    #[test]
    fn test_parse_reader_id() {
        assert_eq!(parse_reader_id("12"), Some(ReaderId::new(12)));
        assert_eq!(parse_reader_id(" 3\t"), Some(ReaderId::new(3)));
        assert_eq!(parse_reader_id("three"), None);
        assert_eq!(parse_reader_id(""), None);
    }
}
