//! シェル文字列の組み立て

use std::path::Path;

/// シェル用にエスケープ
pub fn shell_escape(s: &str) -> String {
    // シングルクォートでラップしてエスケープ
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// 転送先の親ディレクトリを作成するコマンド
///
/// 親がない（ホーム直下）場合は None。
pub fn mkdir_parent_command(remote: &Path) -> Option<String> {
    let parent = remote.parent()?;
    if parent.as_os_str().is_empty() {
        return None;
    }
    Some(format!(
        "mkdir -p {}",
        shell_escape(&parent.to_string_lossy())
    ))
}
