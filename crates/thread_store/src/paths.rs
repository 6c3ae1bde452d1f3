use std::path::{Path, PathBuf};

pub const STORAGE_DIR: &str = ".agent_chat";

#[must_use]
pub fn storage_root(base: &Path) -> PathBuf {
    base.join(STORAGE_DIR)
}

#[must_use]
pub fn sanitize_key_for_filename(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            ':' | '/' | '\\' | ' ' | '.' => '-',
            _ => c,
        })
        .collect()
}

#[must_use]
pub fn snapshot_file_name(key: &str) -> String {
    format!("{}.json", sanitize_key_for_filename(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_file_name_is_flat_and_json() {
        assert_eq!(snapshot_file_name("chat-storage"), "chat-storage.json");
        assert_eq!(snapshot_file_name("../a/b c"), "---a-b-c.json");
    }
}
