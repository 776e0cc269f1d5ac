//! 対話シェル
//!
//! 入力を型付きの引数に変換して蔵書管理の操作を呼び出し、結果を表示する。
//! 業務ルールの判断はしない。

mod command;
mod render;

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::application::library::LibraryManager;
use crate::domain::{Book, Isbn};
use crate::ports::DocumentStore;

pub use command::{MenuChoice, parse_reader_id};

/// シェルのエラー
#[derive(Debug, Error)]
pub enum ShellError {
    /// 端末の入出力に失敗
    #[error("Terminal I/O error")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ShellError>;

/// シェルの終了理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellExit {
    /// 保存して終了
    Saved,
    /// 保存せずに終了（入力の終端を含む）
    Discarded,
}

/// 1つの選択肢を処理した後の継続可否
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    /// プロンプトの途中で入力が尽きた
    EndOfInput,
}

/// メニュー駆動の対話シェル
pub struct Shell<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// 終了が選ばれるまでメニューを繰り返す
    pub fn run(
        &mut self,
        library: &mut LibraryManager,
        store: &dyn DocumentStore,
    ) -> Result<ShellExit> {
        loop {
            write!(self.output, "{}", render::MENU)?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(ShellExit::Discarded);
            };

            let choice = match line.parse::<MenuChoice>() {
                Ok(choice) => choice,
                Err(_) => {
                    writeln!(self.output, "Unknown command.")?;
                    continue;
                }
            };

            match choice {
                MenuChoice::SaveAndExit => match library.save(store) {
                    Ok(()) => {
                        writeln!(self.output, "Saved. Exiting.")?;
                        return Ok(ShellExit::Saved);
                    }
                    Err(e) => {
                        tracing::error!("Save failed: {:?}", e);
                        writeln!(self.output, "Save failed: {}", e)?;
                    }
                },
                MenuChoice::ExitWithoutSave => {
                    writeln!(self.output, "Exit without save.")?;
                    return Ok(ShellExit::Discarded);
                }
                other => {
                    if self.dispatch(other, library)? == Step::EndOfInput {
                        return Ok(ShellExit::Discarded);
                    }
                }
            }
        }
    }

    /// 保存・終了以外の選択肢を処理する
    fn dispatch(&mut self, choice: MenuChoice, library: &mut LibraryManager) -> Result<Step> {
        match choice {
            MenuChoice::AddBook => {
                let Some(title) = self.prompt("Title: ")? else { return Ok(Step::EndOfInput) };
                let Some(author) = self.prompt("Author: ")? else { return Ok(Step::EndOfInput) };
                let Some(isbn) = self.prompt("ISBN: ")? else { return Ok(Step::EndOfInput) };

                match library.add_book(Book::new(title, author, isbn)) {
                    Ok(()) => writeln!(self.output, "Book added.")?,
                    Err(_) => writeln!(self.output, "Book exists.")?,
                }
            }
            MenuChoice::RemoveBook => {
                let Some(isbn) = self.prompt("ISBN to remove: ")? else { return Ok(Step::EndOfInput) };

                match library.remove_book(&Isbn::new(isbn)) {
                    Ok(()) => writeln!(self.output, "Removed.")?,
                    Err(_) => writeln!(self.output, "Remove failed (not found or loaned).")?,
                }
            }
            MenuChoice::AddReader => {
                let Some(name) = self.prompt("Name: ")? else { return Ok(Step::EndOfInput) };
                let Some(email) = self.prompt("Email: ")? else { return Ok(Step::EndOfInput) };

                match library.register_reader(name, email) {
                    Ok(reader) => writeln!(self.output, "Reader added with Id={}", reader.id)?,
                    Err(e) => writeln!(self.output, "Add reader failed: {}", e)?,
                }
            }
            MenuChoice::RemoveReader => {
                let Some(text) = self.prompt("Reader id to remove: ")? else { return Ok(Step::EndOfInput) };
                let Some(id) = parse_reader_id(&text) else {
                    writeln!(self.output, "Invalid reader id.")?;
                    return Ok(Step::Continue);
                };

                match library.remove_reader(id) {
                    Ok(()) => writeln!(self.output, "Removed.")?,
                    Err(_) => writeln!(self.output, "Not found.")?,
                }
            }
            MenuChoice::IssueBook | MenuChoice::ReturnBook => {
                let Some(text) = self.prompt("ReaderId: ")? else { return Ok(Step::EndOfInput) };
                let Some(reader_id) = parse_reader_id(&text) else {
                    writeln!(self.output, "Invalid reader id.")?;
                    return Ok(Step::Continue);
                };
                let Some(isbn) = self.prompt("ISBN: ")? else { return Ok(Step::EndOfInput) };
                let isbn = Isbn::new(isbn);

                if choice == MenuChoice::IssueBook {
                    match library.issue_loan(&isbn, reader_id) {
                        Ok(()) => writeln!(self.output, "Issued.")?,
                        Err(_) => writeln!(self.output, "Issue failed.")?,
                    }
                } else {
                    match library.return_book(&isbn, reader_id) {
                        Ok(()) => writeln!(self.output, "Returned.")?,
                        Err(_) => writeln!(self.output, "Return failed.")?,
                    }
                }
            }
            MenuChoice::SearchBooks => {
                let Some(term) = self.prompt("Search term: ")? else { return Ok(Step::EndOfInput) };

                for book in library.search_books(&term) {
                    writeln!(self.output, "{}", render::search_result_line(&book))?;
                }
            }
            MenuChoice::Reports => {
                writeln!(self.output, "Available books:")?;
                for book in library.available_books() {
                    writeln!(self.output, "{}", render::available_book_line(&book))?;
                }
                writeln!(self.output, "Active loans:")?;
                for loan in library.active_loans() {
                    writeln!(self.output, "{}", render::active_loan_line(&loan))?;
                }
            }
            MenuChoice::SaveAndExit | MenuChoice::ExitWithoutSave => {}
        }

        Ok(Step::Continue)
    }

    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;
        self.read_line()
    }

    /// 1行読む。入力の終端では `None`。
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}
