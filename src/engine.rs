//! 講評ワークフローエンジン
//!
//! # 責務
//!
//! - アップロード → トーン選択 → 解析 → 結果表示 の状態遷移を制御
//! - 各遷移の前提条件の検証
//! - 解析リクエストの構築と応答の検証結果の保持
//! - リセット後に届いた古い応答の破棄
//!
//! # モジュール構成
//!
//! - [`state`][]: 状態とセッショントークン
//! - [`workflow`][]: ワークフロー本体
//! - [`result`][]: エラー型
//!
//! # 使用例
//!
//! ```rust
//! use resume_roaster::engine::{RoastWorkflow, WorkflowState};
//! use resume_roaster::transport::{FileReference, UploadedFile};
//!
//! let mut workflow = RoastWorkflow::new();
//!
//! let file = UploadedFile::new("resume.pdf", b"%PDF-1.4".to_vec()).unwrap();
//! let ticket = workflow.begin_upload(file).unwrap();
//! // ... ticket.file() を保存先に送る ...
//! workflow.complete_upload(ticket, Ok(FileReference::new("blob://abc"))).unwrap();
//!
//! assert_eq!(workflow.state(), WorkflowState::AwaitingToneSelection);
//! ```

pub mod state;
pub mod result;
pub mod workflow;

// 公開APIの再エクスポート
pub use state::{SessionToken, WorkflowState};
pub use result::WorkflowError;
pub use workflow::{DEFAULT_ANALYSIS_TIMEOUT, PendingAnalysis, PendingUpload, RoastWorkflow};
