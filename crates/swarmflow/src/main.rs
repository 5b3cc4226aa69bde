mod commands;
mod settings;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "swarm")]
#[command(about = "Docker Swarm クラスタのブートストラップとデプロイ", long_about = None)]
struct Cli {
    /// 詳細ログ（-v: info, -vv: debug）
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// パイプライン全体を実行してクラスタを構築・デプロイ
    Up {
        #[command(flatten)]
        cluster: ClusterArgs,
        /// 実行しないステージ（カンマ区切り）
        #[arg(long, value_delimiter = ',')]
        skip: Vec<String>,
        /// イメージのビルド・プッシュ方法
        #[arg(long, value_enum, default_value_t = ImageBackend::Cli)]
        image_backend: ImageBackend,
    },
    /// 実行せずにステージと対象ホストを表示
    Plan {
        #[command(flatten)]
        cluster: ClusterArgs,
        /// 実行しないステージ（カンマ区切り）
        #[arg(long, value_delimiter = ',')]
        skip: Vec<String>,
    },
    /// クラスタ全体の swarm 所属を強制解除
    Reset {
        #[command(flatten)]
        cluster: ClusterArgs,
    },
    /// クラスタを初期化してワーカー参加コマンドを表示
    JoinToken {
        #[command(flatten)]
        cluster: ClusterArgs,
    },
    /// バージョン情報を表示
    Version,
}

/// クラスタ構成の共通オプション（swarm.kdl より優先）
#[derive(Args, Debug, Clone, Default)]
pub struct ClusterArgs {
    /// クラスタのホスト数（マネージャーを含む）
    #[arg(short = 'n', long = "number", env = "SWARM_SIZE")]
    pub number: Option<usize>,

    /// クライアントのホスト数
    #[arg(
        short = 'c',
        long = "client-number",
        visible_alias = "cn",
        env = "SWARM_CLIENTS"
    )]
    pub clients: Option<usize>,

    /// マネージャーの advertise アドレス
    #[arg(short = 'a', long = "ip", env = "SWARM_MANAGER_IP")]
    pub ip: Option<String>,

    /// 設定ファイルのパス（未指定なら自動検出）
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// ホスト名のプレフィックス
    #[arg(long)]
    pub prefix: Option<String>,

    /// SSH ユーザー
    #[arg(long)]
    pub user: Option<String>,

    /// SSH 秘密鍵
    #[arg(long, value_name = "FILE")]
    pub identity: Option<PathBuf>,

    /// 1オペレーションあたりのタイムアウト（秒）
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImageBackend {
    /// docker CLI をシェル経由で実行
    Cli,
    /// Docker Engine API (bollard) を直接使用
    Api,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Up {
            cluster,
            skip,
            image_backend,
        } => commands::up::handle(&cluster, skip, image_backend).await,
        Commands::Plan { cluster, skip } => commands::plan::handle(&cluster, &skip),
        Commands::Reset { cluster } => commands::reset::handle(&cluster).await,
        Commands::JoinToken { cluster } => commands::join_token::handle(&cluster).await,
        Commands::Version => {
            println!("swarmflow {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
