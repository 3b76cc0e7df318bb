//! 設定の読み込み
//!
//! # 責務
//!
//! - TOML 形式の設定ファイルを読み込み、バリデーション済みの [`Settings`] を提供
//! - 読み込み用 DTO とドメインモデルの分離（DTO はモジュール外に公開しない）
//!
//! # モジュール構成
//!
//! - `dto` - TOML デシリアライズ用の生データ（非公開）
//! - [`settings`][] - ドメインモデル

mod dto;
pub mod settings;

pub use settings::{EndpointSettings, LogFormat, LoggingSettings, Settings};
