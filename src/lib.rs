//! Resume Roaster
//!
//! 履歴書ファイルをアップロードし、講評トーンを選んで、
//! 外部の LLM 解析サービスから構造化された講評を受け取るクライアントです。
//!
//! # モジュール構成
//!
//! - [`engine`][]: 講評ワークフロー（状態遷移・古い応答の破棄）
//! - [`roast`][]: トーン・リクエスト構築・応答スキーマ・解析結果
//! - [`transport`][]: アップロード / 解析サービスとの通信
//! - [`config`][]: TOML 設定
//! - [`telemetry`][]: ログ出力の初期化
//! - [`error`][]: 共通エラー型

pub mod config;
pub mod engine;
pub mod error;
pub mod roast;
pub mod telemetry;
pub mod transport;
