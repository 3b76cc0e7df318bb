//! 講評ワークフローの制御
//!
//! # 責務
//!
//! このモジュールは、アップロード → トーン選択 → 解析 → 結果表示 → リセット を
//! 順序立てて制御する [`RoastWorkflow`] を提供します。
//! セッションの状態はすべてこの構造体が所有します。
//!
//! # 中断と再開
//!
//! ワークフローが中断するのはリモート呼び出しを待つ 2 箇所だけです。
//! それぞれ `begin_*` でチケットを受け取り、呼び出し結果を `complete_*` に渡します。
//!
//! チケットは発行時の [`SessionToken`] を持ちます。途中で `reset()` された場合、
//! 遅れて届いた応答は [`WorkflowError::StaleResponse`] として破棄され、
//! 新しいセッションの状態には一切影響しません。
//!
//! 単純な用途では `begin_*` / `complete_*` をまとめた
//! [`RoastWorkflow::submit_file`] と [`RoastWorkflow::start_analysis`] を使います。
//!
//! # 使用例
//!
//! ```rust,no_run
//! use resume_roaster::config::Settings;
//! use resume_roaster::engine::RoastWorkflow;
//! use resume_roaster::roast::ToneSetting;
//! use resume_roaster::transport::{create_transports, UploadedFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::default();
//!     let transports = create_transports(&settings)?;
//!     let mut workflow = RoastWorkflow::from_settings(&settings);
//!
//!     let file = UploadedFile::from_path("resume.pdf").await?;
//!     workflow.submit_file(file, transports.upload.as_ref()).await?;
//!     workflow.select_tone(ToneSetting::Savage)?;
//!
//!     let result = workflow.start_analysis(transports.analysis.as_ref()).await?;
//!     println!("{}: {}", result.overall_score, result.roast_headline);
//!
//!     workflow.reset();
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use super::result::WorkflowError;
use super::state::{SessionToken, WorkflowState};
use crate::config::Settings;
use crate::error::TransportError;
use crate::roast::{AnalysisRequest, AnalysisResult, ToneSetting};
use crate::transport::{AnalysisTransport, FileReference, UploadTransport, UploadedFile};

/// 解析呼び出しの待ち時間の既定上限
pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(180);

/// アップロード待ちのチケット
///
/// アップロード対象のファイルを所有し、成功時にワークフローへ引き渡されます。
#[derive(Debug)]
pub struct PendingUpload {
    session: SessionToken,
    file: UploadedFile,
}

impl PendingUpload {
    pub fn session(&self) -> SessionToken {
        self.session
    }

    /// アップロードするファイル
    pub fn file(&self) -> &UploadedFile {
        &self.file
    }
}

/// 解析待ちのチケット
#[derive(Debug)]
pub struct PendingAnalysis {
    session: SessionToken,
    request: AnalysisRequest,
}

impl PendingAnalysis {
    pub fn session(&self) -> SessionToken {
        self.session
    }

    /// 解析サービスに送るリクエスト
    pub fn request(&self) -> &AnalysisRequest {
        &self.request
    }
}

/// 講評ワークフロー
///
/// 1 ユーザーセッションにつき 1 つだけ存在し、状態の唯一の持ち主です。
/// 表示層には参照で渡します。
///
/// # 不変条件
///
/// - [`FileReference`] がなければ [`AnalysisRequest`] は構築されない
/// - [`RoastWorkflow::result`] は [`WorkflowState::ShowingResult`] のときだけ `Some`
/// - `reset()` はファイル・ファイル参照・解析結果を無条件に破棄する
#[derive(Debug)]
pub struct RoastWorkflow {
    state: WorkflowState,
    tone: ToneSetting,
    session: SessionToken,
    uploaded_file: Option<UploadedFile>,
    file_reference: Option<FileReference>,
    result: Option<AnalysisResult>,
    upload_in_flight: bool,
    analysis_timeout: Duration,
    last_error: Option<String>,
}

impl Default for RoastWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl RoastWorkflow {
    /// 新しいワークフローを生成
    ///
    /// トーンは [`ToneSetting::Medium`]、解析のタイムアウトは [`DEFAULT_ANALYSIS_TIMEOUT`]。
    pub fn new() -> Self {
        Self {
            state: WorkflowState::AwaitingUpload,
            tone: ToneSetting::default(),
            session: SessionToken::default(),
            uploaded_file: None,
            file_reference: None,
            result: None,
            upload_in_flight: false,
            analysis_timeout: DEFAULT_ANALYSIS_TIMEOUT,
            last_error: None,
        }
    }

    /// 設定の既定トーンと解析タイムアウトを使って生成
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new()
            .with_tone(settings.default_tone())
            .with_analysis_timeout(settings.analysis().timeout())
    }

    /// 初期トーンを設定
    pub fn with_tone(mut self, tone: ToneSetting) -> Self {
        self.tone = tone;
        self
    }

    /// [`RoastWorkflow::start_analysis`] の待ち時間の上限を設定
    pub fn with_analysis_timeout(mut self, timeout: Duration) -> Self {
        self.analysis_timeout = timeout;
        self
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn tone(&self) -> ToneSetting {
        self.tone
    }

    /// [`RoastWorkflow::start_analysis`] の待ち時間の上限
    pub fn analysis_timeout(&self) -> Duration {
        self.analysis_timeout
    }

    pub fn session(&self) -> SessionToken {
        self.session
    }

    pub fn uploaded_file(&self) -> Option<&UploadedFile> {
        self.uploaded_file.as_ref()
    }

    pub fn file_reference(&self) -> Option<&FileReference> {
        self.file_reference.as_ref()
    }

    /// 解析結果（結果表示中のみ）
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self.state {
            WorkflowState::ShowingResult => self.result.as_ref(),
            _ => None,
        }
    }

    /// 直近の失敗内容（次の成功またはリセットで消える）
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// アップロードが実行中かどうか
    pub fn is_uploading(&self) -> bool {
        self.upload_in_flight
    }

    /// アップロードを開始
    ///
    /// [`WorkflowState::AwaitingUpload`] でのみ有効です。
    /// 返されたチケットのファイルを保存先に送り、結果を
    /// [`RoastWorkflow::complete_upload`] に渡してください。
    ///
    /// # エラー
    ///
    /// - [`WorkflowError::InvalidTransition`] - アップロード待ちでない
    /// - [`WorkflowError::Busy`] - 別のアップロードが実行中
    pub fn begin_upload(&mut self, file: UploadedFile) -> Result<PendingUpload, WorkflowError> {
        if self.state != WorkflowState::AwaitingUpload {
            return Err(self.invalid("submit_file"));
        }
        if self.upload_in_flight {
            return Err(WorkflowError::Busy {
                operation: "submit_file",
            });
        }

        self.upload_in_flight = true;
        info!(
            session = %self.session,
            file = file.name(),
            bytes = file.len(),
            "アップロードを開始します"
        );

        Ok(PendingUpload {
            session: self.session,
            file,
        })
    }

    /// アップロード結果を反映
    ///
    /// 成功時はファイルと参照を保存し、[`WorkflowState::AwaitingToneSelection`] に遷移します。
    /// 失敗時は何も保存せず [`WorkflowState::AwaitingUpload`] のままです。
    ///
    /// # エラー
    ///
    /// - [`WorkflowError::StaleResponse`] - チケット発行後にリセットされた
    /// - [`WorkflowError::UploadFailure`] - 保存先が失敗を返した（再試行可能）
    pub fn complete_upload(
        &mut self,
        ticket: PendingUpload,
        outcome: Result<FileReference, TransportError>,
    ) -> Result<&FileReference, WorkflowError> {
        self.ensure_current(ticket.session)?;
        self.upload_in_flight = false;

        match outcome {
            Ok(file_reference) => {
                info!(
                    session = %self.session,
                    file_reference = %file_reference,
                    "アップロードが完了しました"
                );
                self.uploaded_file = Some(ticket.file);
                self.last_error = None;
                self.state = WorkflowState::AwaitingToneSelection;
                Ok(self.file_reference.insert(file_reference))
            }
            Err(error) => {
                warn!(session = %self.session, error = %error, "アップロードに失敗しました");
                self.last_error = Some(error.to_string());
                Err(WorkflowError::UploadFailure(error))
            }
        }
    }

    /// ファイルをアップロードし、トーン選択に進む
    ///
    /// [`RoastWorkflow::begin_upload`] と [`RoastWorkflow::complete_upload`] をまとめたものです。
    pub async fn submit_file(
        &mut self,
        file: UploadedFile,
        transport: &dyn UploadTransport,
    ) -> Result<&FileReference, WorkflowError> {
        let ticket = self.begin_upload(file)?;
        let outcome = transport.store(ticket.file()).await;
        self.complete_upload(ticket, outcome)
    }

    /// トーンを選択
    ///
    /// [`WorkflowState::AwaitingToneSelection`] でのみ有効で、何度呼んでも構いません。
    /// 状態遷移は起こしません。
    pub fn select_tone(&mut self, tone: ToneSetting) -> Result<(), WorkflowError> {
        if self.state != WorkflowState::AwaitingToneSelection {
            return Err(self.invalid("select_tone"));
        }
        self.tone = tone;
        Ok(())
    }

    /// 解析を開始
    ///
    /// [`WorkflowState::Analyzing`] に遷移し、選択中のトーンでリクエストを構築します。
    ///
    /// # エラー
    ///
    /// - [`WorkflowError::Busy`] - 解析が実行中
    /// - [`WorkflowError::MissingFileReference`] - ファイル参照がない
    /// - [`WorkflowError::InvalidTransition`] - トーン選択待ちでない
    pub fn begin_analysis(&mut self) -> Result<PendingAnalysis, WorkflowError> {
        if self.state == WorkflowState::Analyzing {
            return Err(WorkflowError::Busy {
                operation: "start_analysis",
            });
        }
        let Some(file_reference) = self.file_reference.as_ref() else {
            return Err(WorkflowError::MissingFileReference);
        };
        if self.state != WorkflowState::AwaitingToneSelection {
            return Err(self.invalid("start_analysis"));
        }

        let request = AnalysisRequest::new(self.tone, file_reference);
        self.state = WorkflowState::Analyzing;
        self.last_error = None;
        info!(session = %self.session, tone = %self.tone, "解析を開始します");

        Ok(PendingAnalysis {
            session: self.session,
            request,
        })
    }

    /// 解析結果を反映
    ///
    /// 応答をスキーマ検証し、成功時は結果を保存して
    /// [`WorkflowState::ShowingResult`] に遷移します。
    /// 失敗時は [`WorkflowState::AwaitingToneSelection`] に戻り、
    /// ファイル参照とトーンを保ったまま再試行できます。
    ///
    /// # エラー
    ///
    /// - [`WorkflowError::StaleResponse`] - チケット発行後にリセットされた
    /// - [`WorkflowError::AnalysisFailure`] - 解析サービスが失敗を返した
    /// - [`WorkflowError::SchemaViolation`] - 応答が必須キー等を満たさない
    pub fn complete_analysis(
        &mut self,
        ticket: PendingAnalysis,
        outcome: Result<Value, TransportError>,
    ) -> Result<&AnalysisResult, WorkflowError> {
        self.ensure_current(ticket.session)?;
        if self.state != WorkflowState::Analyzing {
            return Err(self.invalid("complete_analysis"));
        }

        let value = match outcome {
            Ok(value) => value,
            Err(error) => {
                warn!(session = %self.session, error = %error, "解析に失敗しました");
                return Err(self.fail_analysis(WorkflowError::AnalysisFailure(error)));
            }
        };

        match AnalysisResult::from_value(value) {
            Ok(result) => {
                info!(
                    session = %self.session,
                    overall_score = result.overall_score,
                    "解析が完了しました"
                );
                self.state = WorkflowState::ShowingResult;
                Ok(self.result.insert(result))
            }
            Err(problems) => {
                warn!(
                    session = %self.session,
                    problems = problems.len(),
                    "解析結果がスキーマに適合しません"
                );
                Err(self.fail_analysis(WorkflowError::SchemaViolation { problems }))
            }
        }
    }

    /// 解析を実行し、結果表示に進む
    ///
    /// [`RoastWorkflow::begin_analysis`] と [`RoastWorkflow::complete_analysis`] をまとめたものです。
    /// 時間内に応答がなければ [`WorkflowError::AnalysisFailure`] になります。
    ///
    /// 完了前にこの future が破棄された場合も、ワークフローは
    /// [`WorkflowState::AwaitingToneSelection`] に戻ります。
    pub async fn start_analysis(
        &mut self,
        transport: &dyn AnalysisTransport,
    ) -> Result<&AnalysisResult, WorkflowError> {
        let ticket = self.begin_analysis()?;
        let limit = self.analysis_timeout;

        let guard = AnalysisGuard::new(self, ticket.session);
        let outcome = tokio::time::timeout(limit, transport.infer(ticket.request()))
            .await
            .unwrap_or_else(|_| Err(TransportError::timed_out(limit)));
        guard.disarm();

        self.complete_analysis(ticket, outcome)
    }

    /// 初期状態に戻す
    ///
    /// どの状態からでも呼べます。実行中のリモート呼び出しは取り消しませんが、
    /// セッショントークンが進むため、その応答は後で破棄されます。
    pub fn reset(&mut self) {
        let previous = self.state;
        self.session = self.session.next();
        self.state = WorkflowState::AwaitingUpload;
        self.uploaded_file = None;
        self.file_reference = None;
        self.result = None;
        self.upload_in_flight = false;
        self.last_error = None;
        info!(session = %self.session, from = %previous, "ワークフローをリセットしました");
    }

    fn ensure_current(&self, ticket: SessionToken) -> Result<(), WorkflowError> {
        if ticket == self.session {
            return Ok(());
        }
        warn!(
            ticket = %ticket,
            current = %self.session,
            "古いセッションの応答を破棄します"
        );
        Err(WorkflowError::StaleResponse {
            ticket,
            current: self.session,
        })
    }

    fn fail_analysis(&mut self, error: WorkflowError) -> WorkflowError {
        self.state = WorkflowState::AwaitingToneSelection;
        self.last_error = Some(error.to_string());
        error
    }

    fn invalid(&self, operation: &'static str) -> WorkflowError {
        WorkflowError::InvalidTransition {
            operation,
            state: self.state,
        }
    }
}

/// 解析の完了前に [`RoastWorkflow::start_analysis`] が破棄された場合に
/// 状態を [`WorkflowState::AwaitingToneSelection`] へ戻す
struct AnalysisGuard<'a> {
    workflow: &'a mut RoastWorkflow,
    session: SessionToken,
    armed: bool,
}

impl<'a> AnalysisGuard<'a> {
    fn new(workflow: &'a mut RoastWorkflow, session: SessionToken) -> Self {
        Self {
            workflow,
            session,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AnalysisGuard<'_> {
    fn drop(&mut self) {
        if !self.armed
            || self.workflow.session != self.session
            || self.workflow.state != WorkflowState::Analyzing
        {
            return;
        }
        warn!(session = %self.session, "解析が完了前に中断されました");
        self.workflow.state = WorkflowState::AwaitingToneSelection;
        self.workflow.last_error = Some("解析が完了前に中断されました".to_string());
    }
}
