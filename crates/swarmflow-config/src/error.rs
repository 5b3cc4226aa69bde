use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("SWARM_CONFIG_PATH が指すファイルが存在しません: {0}")]
    EnvPathMissing(String),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
