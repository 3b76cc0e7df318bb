//! ワークフロー状態とセッショントークン
//!
//! # 主要な型
//!
//! - [`WorkflowState`][]: ワークフローの現在のステップ
//! - [`SessionToken`][]: セッションを識別する単調増加の ID
//!
//! # 状態遷移
//!
//! ```text
//! AwaitingUpload ──submit_file──▶ AwaitingToneSelection ──start_analysis──▶ Analyzing
//!       ▲                              ▲   │ select_tone                      │
//!       │                              │   └──────────┘                       │
//!       │                              └────────── 失敗 ◀─────────────────────┤
//!       │                                                                     ▼
//!       └──────────────────────── reset（任意の状態から） ◀──────────── ShowingResult
//! ```

use std::fmt;

use serde::Serialize;

/// ワークフローの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// ファイルのアップロード待ち
    #[default]
    AwaitingUpload,

    /// トーン選択待ち（ファイル参照取得済み）
    AwaitingToneSelection,

    /// 解析中
    Analyzing,

    /// 結果表示中
    ShowingResult,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::AwaitingUpload => "awaiting_upload",
            WorkflowState::AwaitingToneSelection => "awaiting_tone_selection",
            WorkflowState::Analyzing => "analyzing",
            WorkflowState::ShowingResult => "showing_result",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// セッショントークン
///
/// リセットのたびに増加します。実行中のリモート呼び出しは開始時のトークンを持ち、
/// 応答到着時に現在のトークンと一致しなければ破棄されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct SessionToken(u64);

impl SessionToken {
    /// 次のトークン
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        assert_eq!(WorkflowState::default(), WorkflowState::AwaitingUpload);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(WorkflowState::Analyzing.to_string(), "analyzing");
        assert_eq!(WorkflowState::ShowingResult.to_string(), "showing_result");
    }

    #[test]
    fn test_state_serializes_like_display() {
        for state in [
            WorkflowState::AwaitingUpload,
            WorkflowState::AwaitingToneSelection,
            WorkflowState::Analyzing,
            WorkflowState::ShowingResult,
        ] {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{}\"", state));
        }
    }

    #[test]
    fn test_session_token_is_monotonic() {
        let first = SessionToken::default();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.value(), 1);
        assert_eq!(second.to_string(), "#1");
    }
}
