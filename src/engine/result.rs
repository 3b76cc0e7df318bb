//! ワークフローエラーの型定義
//!
//! # 責務
//!
//! - ワークフロー操作で発生するエラー [`WorkflowError`] の型定義
//! - リトライ可能なエラーと呼び出し方の誤りの区別
//!
//! # エラー種別
//!
//! | 種別 | 原因 | 回復方法 |
//! |------|------|----------|
//! | `UploadFailure` | 保存先・通信の失敗 | 同じファイルで再送 |
//! | `AnalysisFailure` | 推論・通信・タイムアウト | トーン選択からやり直し |
//! | `SchemaViolation` | 応答に必須キーがない等 | トーン選択からやり直し |
//! | `InvalidTransition` 等 | 呼び出し順序の誤り | 呼び出し側の修正 |
//!
//! どのエラーもプロセスにとって致命的ではなく、`reset()` で初期状態に戻せます。

use thiserror::Error;

use super::state::{SessionToken, WorkflowState};
use crate::error::TransportError;

/// ワークフローエラー
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// 現在の状態では実行できない操作
    #[error("状態 '{state}' では {operation} を実行できません")]
    InvalidTransition {
        /// 操作名
        operation: &'static str,
        /// 呼び出し時の状態
        state: WorkflowState,
    },

    /// ファイル参照がないまま解析しようとした
    #[error("ファイル参照がありません。先にファイルをアップロードしてください")]
    MissingFileReference,

    /// 同じステップのリモート呼び出しが実行中
    #[error("{operation} は実行中です")]
    Busy {
        /// 操作名
        operation: &'static str,
    },

    /// アップロード失敗
    #[error("アップロードに失敗しました: {0}")]
    UploadFailure(#[source] TransportError),

    /// 解析失敗
    #[error("解析に失敗しました: {0}")]
    AnalysisFailure(#[source] TransportError),

    /// 応答がスキーマを満たさない
    #[error("解析結果がスキーマに適合しません: {}", .problems.join("; "))]
    SchemaViolation {
        /// 問題のあるフィールドと理由
        problems: Vec<String>,
    },

    /// リセット前のセッションに属する応答
    #[error("古いセッション {ticket} の応答を破棄しました (現在: {current})")]
    StaleResponse {
        /// 応答が属するセッション
        ticket: SessionToken,
        /// 現在のセッション
        current: SessionToken,
    },
}

impl WorkflowError {
    /// 同じ操作をやり直せば成功しうるエラーかどうか
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WorkflowError::UploadFailure(_)
                | WorkflowError::AnalysisFailure(_)
                | WorkflowError::SchemaViolation { .. }
        )
    }
}
