pub mod error;

pub use error::*;

use std::path::{Path, PathBuf};

/// 設定ファイルパスを直接指定する環境変数
pub const SWARM_CONFIG_ENV: &str = "SWARM_CONFIG_PATH";

/// 探索する設定ファイル名（優先順）
const CANDIDATES: [&str; 4] = ["swarm.local.kdl", ".swarm.local.kdl", "swarm.kdl", ".swarm.kdl"];

/// swarm.kdl を探す（見つからなければ None）
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 SWARM_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: swarm.local.kdl, .swarm.local.kdl, swarm.kdl, .swarm.kdl
/// 3. ./.swarmflow/ ディレクトリ内: 同様の順序
/// 4. ~/.config/swarmflow/swarm.kdl (グローバル設定)
///
/// SWARM_CONFIG_PATH が設定されているのにファイルがない場合はエラー。
pub fn locate_swarm_file() -> Result<Option<PathBuf>> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(SWARM_CONFIG_ENV) {
        let path = PathBuf::from(&config_path);
        if path.exists() {
            tracing::debug!(path = %path.display(), "Using {}", SWARM_CONFIG_ENV);
            return Ok(Some(path));
        }
        return Err(ConfigError::EnvPathMissing(config_path));
    }

    // 2, 3. カレントディレクトリと ./.swarmflow/
    let current_dir = std::env::current_dir()?;
    if let Some(path) = find_swarm_file_in(&current_dir) {
        return Ok(Some(path));
    }

    // 4. グローバル設定ファイル (~/.config/swarmflow/swarm.kdl)
    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("swarmflow").join("swarm.kdl");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// 指定ディレクトリとその .swarmflow/ から設定ファイルを探す
pub fn find_swarm_file_in(dir: &Path) -> Option<PathBuf> {
    for filename in &CANDIDATES {
        let path = dir.join(filename);
        if path.exists() {
            return Some(path);
        }
    }

    let swarm_dir = dir.join(".swarmflow");
    if swarm_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = swarm_dir.join(filename);
            if path.exists() {
                return Some(path);
            }
        }
    }

    None
}

/// 先頭の `~/` をホームディレクトリに展開
pub fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_find_swarm_file_in_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("swarm.kdl"), "// test").unwrap();

        let result = find_swarm_file_in(temp_dir.path()).unwrap();
        assert!(result.ends_with("swarm.kdl"));
    }

    #[test]
    fn test_find_swarm_file_local_priority() {
        let temp_dir = tempfile::tempdir().unwrap();

        // swarm.kdl と swarm.local.kdl の両方を作成
        fs::write(temp_dir.path().join("swarm.kdl"), "// global").unwrap();
        fs::write(temp_dir.path().join("swarm.local.kdl"), "// local").unwrap();

        // swarm.local.kdl が優先される
        let result = find_swarm_file_in(temp_dir.path()).unwrap();
        assert!(result.ends_with("swarm.local.kdl"));
    }

    #[test]
    fn test_find_swarm_file_in_swarmflow_dir() {
        let temp_dir = tempfile::tempdir().unwrap();

        let swarm_dir = temp_dir.path().join(".swarmflow");
        fs::create_dir(&swarm_dir).unwrap();
        fs::write(swarm_dir.join("swarm.kdl"), "// in swarmflow dir").unwrap();

        let result = find_swarm_file_in(temp_dir.path()).unwrap();
        assert!(result.ends_with(".swarmflow/swarm.kdl"));
    }

    #[test]
    fn test_find_swarm_file_in_empty_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(find_swarm_file_in(temp_dir.path()).is_none());
    }

    #[test]
    #[serial]
    fn test_find_swarm_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("swarm.kdl"), "// test").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = locate_swarm_file().unwrap();
        assert!(result.unwrap().ends_with("swarm.kdl"));

        // 元のディレクトリに戻る
        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_find_swarm_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.kdl");
        fs::write(&config_path, "// custom").unwrap();

        unsafe {
            std::env::set_var(SWARM_CONFIG_ENV, config_path.to_str().unwrap());
        }

        let result = locate_swarm_file().unwrap();
        assert_eq!(result, Some(config_path));

        // クリーンアップ
        unsafe {
            std::env::remove_var(SWARM_CONFIG_ENV);
        }
    }

    #[test]
    #[serial]
    fn test_env_var_pointing_nowhere() {
        unsafe {
            std::env::set_var(SWARM_CONFIG_ENV, "/nonexistent/swarm.kdl");
        }

        let result = locate_swarm_file();
        assert!(matches!(result, Err(ConfigError::EnvPathMissing(_))));

        unsafe {
            std::env::remove_var(SWARM_CONFIG_ENV);
        }
    }

    #[test]
    fn test_expand_home() {
        let plain = PathBuf::from("/etc/hosts");
        assert_eq!(expand_home(&plain), plain);

        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_home(Path::new("~/.ssh/id_rsa")),
                home.join(".ssh/id_rsa")
            );
        }
    }
}
