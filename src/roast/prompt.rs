//! 解析リクエストの構築
//!
//! # 責務
//!
//! - トーンとファイル参照から [`AnalysisRequest`] を組み立てる
//! - トーンに依存しない必須指示（お世辞禁止、曖昧な実績表現の指摘等）を常に付与
//!
//! # ワイヤ形式
//!
//! ```json
//! {
//!   "prompt": "...",
//!   "file_urls": ["blob://abc"],
//!   "response_json_schema": { "type": "object", ... }
//! }
//! ```

use serde::Serialize;
use serde_json::Value;

use super::schema::response_schema;
use super::tone::ToneSetting;
use crate::transport::FileReference;

/// トーンに依存しない必須指示
const CRITICAL_INSTRUCTIONS: &str = "CRITICAL INSTRUCTIONS:
- DO NOT glaze or be overly nice. If the resume is bad, say it's bad.
- Be GENUINELY CRITICAL of vague, weak, or generic accomplishments. Call them out specifically.
- If someone just lists job duties instead of achievements, ROAST THEM for it.
- Words like \"responsible for\", \"helped with\", \"worked on\" without metrics = WEAK. Call it out.
- No participation trophy energy. Bad resumes deserve honest feedback.
- Don't hold back on pointing out lack of quantifiable results, impact, or specificity.";

/// 期待する出力の説明（スキーマと同じ形をプロンプト内でも示す）
const OUTPUT_INSTRUCTIONS: &str = r#"Analyze the resume and return a JSON response with the following structure. Be specific about what you see in the actual resume:

{
  "overall_score": (number 1-100),
  "roast_headline": (a punchy, funny one-liner about the resume),
  "main_roast": (2-3 paragraphs of entertaining critique in your roast style, referencing specific things from the resume),
  "categories": {
    "formatting": { "score": (1-10), "roast": (short witty comment), "issues": [(list of specific issues)] },
    "buzzwords": { "score": (1-10), "roast": (short witty comment), "offenders": [(list of overused words found)] },
    "accomplishments": { "score": (1-10), "roast": (short witty comment), "feedback": (specific feedback) },
    "red_flags": { "score": (1-10), "roast": (short witty comment), "flags": [(list of concerning things)] }
  },
  "improvement_tips": [(5 specific, actionable tips to improve the resume)],
  "career_suggestions": [(3 job titles/paths that match this resume's experience)],
  "final_verdict": (a memorable closing zinger that's also encouraging)
}"#;

/// 解析サービスへ送るリクエスト
///
/// 解析のたびに新しく構築され、永続化されません。
/// [`FileReference`] がなければ構築できないため、
/// アップロード前にリクエストが作られることはありません。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRequest {
    prompt: String,
    file_urls: Vec<FileReference>,
    response_json_schema: Value,
}

impl AnalysisRequest {
    /// トーンとファイル参照からリクエストを構築
    ///
    /// # 例
    ///
    /// ```rust
    /// use resume_roaster::roast::{AnalysisRequest, ToneSetting};
    /// use resume_roaster::transport::FileReference;
    ///
    /// let file_ref = FileReference::new("blob://abc");
    /// let request = AnalysisRequest::new(ToneSetting::Savage, &file_ref);
    ///
    /// assert!(request.prompt().contains("\"savage\" roast style"));
    /// assert_eq!(request.file_urls(), &[file_ref]);
    /// ```
    pub fn new(tone: ToneSetting, file_reference: &FileReference) -> Self {
        Self {
            prompt: build_prompt(tone),
            file_urls: vec![file_reference.clone()],
            response_json_schema: response_schema(),
        }
    }

    /// 自然言語の指示文
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// 解析対象ファイルの参照
    pub fn file_urls(&self) -> &[FileReference] {
        &self.file_urls
    }

    /// 応答形状の制約として宣言するスキーマ
    pub fn response_json_schema(&self) -> &Value {
        &self.response_json_schema
    }

    /// ワイヤ形式の JSON に変換
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// トーンを埋め込んだプロンプト本文を生成
fn build_prompt(tone: ToneSetting) -> String {
    format!(
        "You are a professional resume reviewer with a comedic twist. \
         Analyze this resume and provide feedback in a \"{}\" roast style.\n\n\
         Style guide: {}\n\n\
         {}\n\n\
         {}",
        tone.as_str(),
        tone.guidance(),
        CRITICAL_INSTRUCTIONS,
        OUTPUT_INSTRUCTIONS,
    )
}
