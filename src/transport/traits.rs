//! トランスポートの共通インターフェース定義
//!
//! # 責務
//!
//! - アップロード先 [`UploadTransport`] と解析サービス [`AnalysisTransport`] の共通トレイトを定義
//!
//! どちらも単発呼び出しで、リトライやストリーミングは行いません。
//! ワークフローからは失敗しうる・遅い可能性のあるリモート呼び出しとして扱われます。
//!
//! # 使用例
//!
//! ```rust,no_run
//! use resume_roaster::transport::{UploadTransport, UploadedFile};
//!
//! async fn example(client: Box<dyn UploadTransport>) {
//!     let file = UploadedFile::new("resume.pdf", vec![]).unwrap();
//!     let file_ref = client.store(&file).await.unwrap();
//!     println!("Stored at: {}", file_ref);
//! }
//! ```

use async_trait::async_trait;
use serde_json::Value;

use super::file::{FileReference, UploadedFile};
use crate::error::TransportError;
use crate::roast::AnalysisRequest;

/// ファイル保存先の共通インターフェース
///
/// # 実装要件
///
/// - `Send + Sync`: マルチスレッド環境で安全に使用可能
/// - 非同期実行対応（`async_trait`を使用）
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// ファイルを保存し、参照を返す
    ///
    /// # エラー
    ///
    /// - [`TransportError::PayloadTooLarge`] - サイズ上限超過
    /// - [`TransportError::UnsupportedMediaType`] - 受け付けない形式
    /// - [`TransportError::Network`] - 通信失敗
    async fn store(&self, file: &UploadedFile) -> Result<FileReference, TransportError>;
}

/// 解析（推論）サービスの共通インターフェース
///
/// 戻り値は検証前の生の JSON オブジェクトです。
/// スキーマ検証はワークフロー側で行います。
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    /// 解析リクエストを送信し、構造化された応答を返す
    ///
    /// # エラー
    ///
    /// - [`TransportError::Timeout`] - タイムアウト
    /// - [`TransportError::InvalidResponse`] - JSON として解釈できない応答
    /// - [`TransportError::ServiceUnavailable`] - サービス障害
    async fn infer(&self, request: &AnalysisRequest) -> Result<Value, TransportError>;
}
