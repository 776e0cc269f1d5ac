use std::path::{Path, PathBuf};

use crate::ports::Collection;

pub const DEFAULT_BOOKS_FILE: &str = "books.json";
pub const DEFAULT_READERS_FILE: &str = "readers.json";
pub const DEFAULT_LOANS_FILE: &str = "loans.json";

/// 3つのコレクションの保存先
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocations {
    pub books: PathBuf,
    pub readers: PathBuf,
    pub loans: PathBuf,
}

impl StorageLocations {
    pub fn new(
        books: impl Into<PathBuf>,
        readers: impl Into<PathBuf>,
        loans: impl Into<PathBuf>,
    ) -> Self {
        Self {
            books: books.into(),
            readers: readers.into(),
            loans: loans.into(),
        }
    }

    /// ディレクトリ配下の既定ファイル名
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(
            dir.join(DEFAULT_BOOKS_FILE),
            dir.join(DEFAULT_READERS_FILE),
            dir.join(DEFAULT_LOANS_FILE),
        )
    }

    pub fn location(&self, collection: Collection) -> &Path {
        match collection {
            Collection::Books => &self.books,
            Collection::Readers => &self.readers,
            Collection::Loans => &self.loans,
        }
    }
}

impl Default for StorageLocations {
    fn default() -> Self {
        Self::new(DEFAULT_BOOKS_FILE, DEFAULT_READERS_FILE, DEFAULT_LOANS_FILE)
    }
}
