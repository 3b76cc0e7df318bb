//! トランスポート抽象化レイヤー
//!
//! # 責務
//!
//! - ファイル保存先と解析サービスを統一的に扱うインターフェースを提供
//! - 設定から HTTP クライアントを生成するファクトリー機能
//! - アップロード対象ファイル [`UploadedFile`] とファイル参照 [`FileReference`] の型定義
//!
//! # モジュール構成
//!
//! - `traits` - 共通インターフェース（[`UploadTransport`], [`AnalysisTransport`]）
//! - `file` - アップロード対象ファイルとファイル参照
//! - `http` - reqwest ベースの HTTP 実装
//!
//! # 使用例
//!
//! ```rust,no_run
//! use resume_roaster::config::Settings;
//! use resume_roaster::transport::{create_transports, UploadedFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::from_file("settings/roaster.toml")?;
//!     let transports = create_transports(&settings)?;
//!
//!     let file = UploadedFile::from_path("resume.pdf").await?;
//!     let file_ref = transports.upload.store(&file).await?;
//!     println!("Stored at: {}", file_ref);
//!     Ok(())
//! }
//! ```

pub mod traits;
pub mod file;
pub mod http;

// 公開APIの再エクスポート
pub use traits::{AnalysisTransport, UploadTransport};
pub use file::{FileKind, FileReference, UploadedFile};
pub use http::{HttpAnalysisClient, HttpUploadClient};

use crate::config::Settings;
use crate::error::TransportError;

/// アップロード用と解析用のトランスポートの組
pub struct Transports {
    pub upload: Box<dyn UploadTransport>,
    pub analysis: Box<dyn AnalysisTransport>,
}

/// 設定から HTTP トランスポートを生成するファクトリー関数
///
/// API キーは設定で指定された環境変数から読み出します。
/// 環境変数が未設定の場合は認証ヘッダーなしで接続します。
///
/// # エラー
///
/// - [`TransportError::Misconfiguration`] - HTTP クライアントを構築できない
pub fn create_transports(settings: &Settings) -> Result<Transports, TransportError> {
    let api_key = settings.api_key();

    let upload = HttpUploadClient::new(
        settings.upload().url().clone(),
        settings.upload().timeout(),
        api_key.clone(),
    )?;
    let analysis = HttpAnalysisClient::new(
        settings.analysis().url().clone(),
        settings.analysis().timeout(),
        api_key,
    )?;

    Ok(Transports {
        upload: Box::new(upload),
        analysis: Box::new(analysis),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_transports_from_default_settings() {
        let transports = create_transports(&Settings::default());
        assert!(transports.is_ok());
    }
}
