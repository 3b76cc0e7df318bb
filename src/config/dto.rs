//! TOML デシリアライズ用の DTO (Data Transfer Object)
//!
//! # 責務
//!
//! このモジュールは、TOML ファイルからのデータ読み込み専用の構造体を提供します。
//! DTO はバリデーション前の「生データ」を表現し、ドメインモデルとは分離されています。
//!
//! ## 変換フロー
//!
//! ```text
//! TOML ファイル
//!   ↓ (デシリアライズ)
//! SettingsDto
//!   ↓ (TryFrom でバリデーション)
//! Settings (ドメインモデル)
//! ```
//!
//! 省略されたセクション・キーは `None` のまま受け入れ、
//! 既定値の補完は [`Settings`](super::settings::Settings) 側で行います。

use serde::{Deserialize, Serialize};

/// 設定 DTO
///
/// **注**: この構造体は config モジュール内部の実装詳細です。
/// 外部からは [`Settings`](super::settings::Settings) を使用してください。
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct SettingsDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) upload: Option<EndpointDto>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) analysis: Option<EndpointDto>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) auth: Option<AuthDto>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) roast: Option<RoastDto>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) logging: Option<LoggingDto>,
}

/// `[upload]` / `[analysis]` セクション
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct EndpointDto {
    pub(super) url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) timeout_secs: Option<u64>,
}

/// `[auth]` セクション
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct AuthDto {
    /// API キーを読み出す環境変数名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) api_key_env: Option<String>,
}

/// `[roast]` セクション
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RoastDto {
    /// 既定トーン（文字列のまま受け取り、ドメイン変換時に検証する）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) default_tone: Option<String>,
}

/// `[logging]` セクション
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct LoggingDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) directory: Option<String>,
}
