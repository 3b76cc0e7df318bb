//! ログ出力の初期化
//!
//! # 責務
//!
//! - `tracing-subscriber` による標準エラー出力へのログ（pretty / JSON）
//! - `tracing-appender` による日次ローテーションのファイル出力（任意）
//!
//! フィルタは環境変数 `RUST_LOG` が設定されていればそちらを優先し、
//! なければ設定ファイルの `logging.level` を使います。

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::{LogFormat, LoggingSettings};

/// ログファイル名の接頭辞
const LOG_FILE_PREFIX: &str = "resume-roaster.log";

/// ログ出力を初期化する
///
/// # 戻り値
///
/// - `Ok(Some(WorkerGuard))`: ファイル出力が有効な場合。プロセス終了まで保持すること
/// - `Ok(None)`: 標準エラー出力のみ
/// - `Err(_)`: サブスクライバが既に登録済み等
pub fn init_logging(
    settings: &LoggingSettings,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(settings.level()))?;

    let stderr_layer = match settings.format() {
        LogFormat::Pretty => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_writer(std::io::stderr)
            .json()
            .boxed(),
    };

    let (file_layer, guard) = match settings.directory() {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .json()
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}
