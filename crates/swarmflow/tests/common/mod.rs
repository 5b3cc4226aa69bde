use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// 一時ディレクトリに swarm.kdl を置いて CLI を実行するためのプロジェクト
pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write_swarm_kdl(&self, content: &str) {
        let path = self.root.path().join("swarm.kdl");
        fs::write(path, content).unwrap();
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    /// 実行環境の設定や環境変数に影響されない `swarm` コマンド
    #[allow(deprecated)]
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("swarm").unwrap();
        cmd.current_dir(self.path())
            .env("XDG_CONFIG_HOME", self.path().join(".config"))
            .env("HOME", self.path())
            .env_remove("SWARM_CONFIG_PATH")
            .env_remove("SWARM_SIZE")
            .env_remove("SWARM_CLIENTS")
            .env_remove("SWARM_MANAGER_IP")
            .env("NO_COLOR", "1");
        cmd
    }
}
