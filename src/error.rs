//! エラー型の定義
//!
//! このモジュールは、Resume Roaster 全体で使用されるエラー型を定義します。
//! ワークフロー固有のエラーは [`crate::engine::WorkflowError`] を参照してください。

use std::time::Duration;

use thiserror::Error;

/// 設定関連のエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// ファイルの読み込みに失敗
    #[error("設定ファイルの読み込みに失敗しました: {0}")]
    FileRead(#[from] std::io::Error),

    /// TOML のデシリアライズに失敗
    #[error("TOML のデシリアライズに失敗しました: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    /// TOML のシリアライズに失敗
    #[error("TOML のシリアライズに失敗しました: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// バリデーションエラー
    #[error("設定のバリデーションに失敗しました: {0}")]
    Validation(String),
}

/// トランスポート（アップロード / 解析サービス）関連のエラー
///
/// どのバリアントもプロセスにとって致命的ではなく、
/// 同じ操作をやり直すことで回復できます。
#[derive(Debug, Error)]
pub enum TransportError {
    /// ネットワークエラー（接続失敗等）
    #[error("ネットワークエラー: {0}")]
    Network(String),

    /// タイムアウト
    #[error("タイムアウトしました: {0}")]
    Timeout(String),

    /// 認証エラー
    #[error("認証に失敗しました: {0}")]
    Authentication(String),

    /// レート制限超過
    #[error("レート制限を超えました")]
    RateLimitExceeded,

    /// ファイルサイズ超過
    #[error("ファイルサイズが上限を超えています")]
    PayloadTooLarge,

    /// サービス側が受け付けないファイル形式
    #[error("サポートされていないメディアタイプです")]
    UnsupportedMediaType,

    /// その他の 4xx 応答
    #[error("リクエストが拒否されました (HTTP {status}): {body}")]
    Rejected {
        /// HTTP ステータスコード
        status: u16,
        /// レスポンスボディ（先頭部分）
        body: String,
    },

    /// 5xx 応答
    #[error("サービスが利用できません: {0}")]
    ServiceUnavailable(String),

    /// 不正なレスポンス
    #[error("不正なレスポンス: {0}")]
    InvalidResponse(String),

    /// ローカルファイルの入出力エラー
    #[error("ファイルの入出力に失敗しました: {0}")]
    Io(#[from] std::io::Error),

    /// 受け付けない拡張子
    #[error("サポートされていないファイル形式です: {0} (PDF, PNG, JPG のみ)")]
    UnsupportedFileType(String),

    /// クライアントの構成エラー
    #[error("クライアントの構成に失敗しました: {0}")]
    Misconfiguration(String),
}

impl TransportError {
    /// 待ち時間の上限を超えたことを表すエラーを生成
    ///
    /// 1 秒未満の上限も `50ms` のように表示されます。
    pub fn timed_out(limit: Duration) -> Self {
        TransportError::Timeout(format!("{:?} 以内に応答がありませんでした", limit))
    }

    /// HTTP ステータスコードからエラーを生成
    ///
    /// 2xx/3xx を渡した場合も `Rejected` として扱います（呼び出し側で成功判定済みの前提）。
    pub fn from_status(status: u16, body: &str) -> Self {
        let body = truncate(body, MAX_BODY_IN_ERROR);
        match status {
            401 | 403 => TransportError::Authentication(format!("HTTP {}: {}", status, body)),
            408 => TransportError::Timeout(format!("HTTP 408: {}", body)),
            413 => TransportError::PayloadTooLarge,
            415 => TransportError::UnsupportedMediaType,
            429 => TransportError::RateLimitExceeded,
            500..=599 => TransportError::ServiceUnavailable(format!("HTTP {}: {}", status, body)),
            _ => TransportError::Rejected { status, body },
        }
    }
}

/// エラーメッセージに含めるレスポンスボディの最大文字数
const MAX_BODY_IN_ERROR: usize = 200;

fn truncate(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_auth() {
        assert!(matches!(
            TransportError::from_status(401, "no"),
            TransportError::Authentication(_)
        ));
        assert!(matches!(
            TransportError::from_status(403, "no"),
            TransportError::Authentication(_)
        ));
    }

    #[test]
    fn test_from_status_specific_codes() {
        assert!(matches!(TransportError::from_status(408, ""), TransportError::Timeout(_)));
        assert!(matches!(TransportError::from_status(413, ""), TransportError::PayloadTooLarge));
        assert!(matches!(
            TransportError::from_status(415, ""),
            TransportError::UnsupportedMediaType
        ));
        assert!(matches!(TransportError::from_status(429, ""), TransportError::RateLimitExceeded));
    }

    #[test]
    fn test_from_status_server_error() {
        assert!(matches!(
            TransportError::from_status(503, "down"),
            TransportError::ServiceUnavailable(_)
        ));
    }

    #[test]
    fn test_from_status_other_client_error() {
        match TransportError::from_status(422, "bad field") {
            TransportError::Rejected { status, body } => {
                assert_eq!(status, 422);
                assert_eq!(body, "bad field");
            }
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_body_is_truncated() {
        let long = "x".repeat(500);
        match TransportError::from_status(400, &long) {
            TransportError::Rejected { body, .. } => {
                assert_eq!(body.chars().count(), MAX_BODY_IN_ERROR + 3);
                assert!(body.ends_with("..."));
            }
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_timed_out_keeps_sub_second_precision() {
        let err = TransportError::timed_out(Duration::from_millis(50));
        assert!(matches!(err, TransportError::Timeout(_)));
        assert!(err.to_string().contains("50ms"));

        let err = TransportError::timed_out(Duration::from_secs(180));
        assert!(err.to_string().contains("180s"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("timeout は 0 より大きい必要があります".to_string());
        assert_eq!(
            err.to_string(),
            "設定のバリデーションに失敗しました: timeout は 0 より大きい必要があります"
        );
    }
}
