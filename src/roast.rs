//! 講評ドメイン
//!
//! # 責務
//!
//! - 講評トーン [`ToneSetting`] とトーン別スタイルガイドの管理
//! - 解析サービスへのリクエスト [`AnalysisRequest`] の構築
//! - 応答スキーマの宣言と検証（[`schema`]）
//! - 検証済みの解析結果 [`AnalysisResult`] の型定義
//!
//! # モジュール構成
//!
//! - [`tone`][]: トーン定義
//! - [`prompt`][]: リクエスト構築
//! - [`schema`][]: 応答スキーマ
//! - [`result`][]: 解析結果
//!
//! # 使用例
//!
//! ```rust
//! use resume_roaster::roast::{AnalysisRequest, ToneSetting};
//! use resume_roaster::transport::FileReference;
//!
//! let request = AnalysisRequest::new(ToneSetting::Gentle, &FileReference::new("blob://abc"));
//! println!("{}", request.to_json().unwrap());
//! ```

pub mod tone;
pub mod prompt;
pub mod schema;
pub mod result;

// 公開APIの再エクスポート
pub use tone::ToneSetting;
pub use prompt::AnalysisRequest;
pub use schema::{response_schema, validate_response};
pub use result::{AnalysisResult, Categories, CategoryView, ScoreBand};
