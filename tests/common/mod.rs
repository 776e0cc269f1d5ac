use rusty_library_manager::config::StorageLocations;
use std::path::PathBuf;

/// テスト用の一時ディレクトリ
///
/// テストごとに一意のディレクトリを作成し、破棄時に削除します。
pub struct TempDataDir {
    path: PathBuf,
}

#[allow(dead_code)]
impl TempDataDir {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("rusty-library-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&path).expect("Failed to create temp data dir");
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn locations(&self) -> StorageLocations {
        StorageLocations::in_dir(&self.path)
    }
}

impl Drop for TempDataDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
