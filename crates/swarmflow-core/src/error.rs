use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("KDLパースエラー: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    /// 不正な静的パラメータ（リモート操作の前に検出される）
    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("グループサイズは1以上である必要があります: {group} = {count}")]
    InvalidGroupSize { group: String, count: usize },

    #[error("不明なターゲット: {0}（cluster, workers, manager, clients, first-client, local のいずれか）")]
    UnknownTarget(String),

    #[error("不明な失敗ポリシー: {0}（fail-fast, best-effort のいずれか）")]
    UnknownPolicy(String),

    #[error("不明なステージ種別: {0}")]
    UnknownStageKind(String),

    #[error("ステージ '{0}' が重複しています")]
    DuplicateStage(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
