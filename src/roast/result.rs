//! 解析結果の型定義
//!
//! # 責務
//!
//! - 解析サービスが返す構造化講評 [`AnalysisResult`] の型定義
//! - 4 つのカテゴリ（書式・バズワード・実績・危険信号）の型定義
//! - 総合スコアの評価帯 [`ScoreBand`] の判定
//!
//! [`AnalysisResult`] は [`AnalysisResult::from_value`] でのみ生成され、
//! 生成時点で [`validate_response`] を通過していることが保証されます。

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::schema::validate_response;

/// 解析結果
///
/// 解析呼び出しの成功 1 回につき 1 つだけ生成され、以後変更されません。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// 総合スコア（1〜100）
    #[serde(deserialize_with = "deserialize_score")]
    pub overall_score: u8,

    /// 一言見出し
    pub roast_headline: String,

    /// 複数段落の講評本文
    pub main_roast: String,

    /// カテゴリ別評価
    pub categories: Categories,

    /// 改善のヒント（想定 5 件、件数は強制しない）
    pub improvement_tips: Vec<String>,

    /// 推奨キャリアパス（想定 3 件、件数は強制しない）
    pub career_suggestions: Vec<String>,

    /// 締めの一言
    pub final_verdict: String,
}

/// カテゴリ別評価
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Categories {
    pub formatting: FormattingCategory,
    pub buzzwords: BuzzwordsCategory,
    pub accomplishments: AccomplishmentsCategory,
    pub red_flags: RedFlagsCategory,
}

/// 書式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattingCategory {
    #[serde(deserialize_with = "deserialize_score")]
    pub score: u8,
    pub roast: String,
    pub issues: Vec<String>,
}

/// バズワード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuzzwordsCategory {
    #[serde(deserialize_with = "deserialize_score")]
    pub score: u8,
    pub roast: String,
    pub offenders: Vec<String>,
}

/// 実績
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccomplishmentsCategory {
    #[serde(deserialize_with = "deserialize_score")]
    pub score: u8,
    pub roast: String,
    pub feedback: String,
}

/// 危険信号
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedFlagsCategory {
    #[serde(deserialize_with = "deserialize_score")]
    pub score: u8,
    pub roast: String,
    pub flags: Vec<String>,
}

/// カテゴリを統一的に扱うための読み取り専用ビュー
///
/// 詳細フィールドの名前はカテゴリごとに異なるため、
/// ここでは文字列のリスト（`findings`）にそろえます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryView<'a> {
    /// スキーマ上のキー（例: `red_flags`）
    pub key: &'static str,
    /// 表示名（例: `Red Flags`）
    pub label: &'static str,
    pub score: u8,
    pub roast: &'a str,
    pub findings: Vec<&'a str>,
}

impl Categories {
    /// 4 カテゴリをスキーマ順に返す
    pub fn views(&self) -> [CategoryView<'_>; 4] {
        [
            CategoryView {
                key: "formatting",
                label: "Formatting",
                score: self.formatting.score,
                roast: &self.formatting.roast,
                findings: self.formatting.issues.iter().map(String::as_str).collect(),
            },
            CategoryView {
                key: "buzzwords",
                label: "Buzzwords",
                score: self.buzzwords.score,
                roast: &self.buzzwords.roast,
                findings: self.buzzwords.offenders.iter().map(String::as_str).collect(),
            },
            CategoryView {
                key: "accomplishments",
                label: "Accomplishments",
                score: self.accomplishments.score,
                roast: &self.accomplishments.roast,
                // 空のフィードバックは項目として扱わない
                findings: Some(self.accomplishments.feedback.as_str())
                    .filter(|feedback| !feedback.trim().is_empty())
                    .into_iter()
                    .collect(),
            },
            CategoryView {
                key: "red_flags",
                label: "Red Flags",
                score: self.red_flags.score,
                roast: &self.red_flags.roast,
                findings: self.red_flags.flags.iter().map(String::as_str).collect(),
            },
        ]
    }
}

impl AnalysisResult {
    /// 解析サービスの生の応答から結果を生成
    ///
    /// スキーマ検証に失敗した場合、問題点の一覧を返します。
    pub fn from_value(value: Value) -> Result<Self, Vec<String>> {
        validate_response(&value)?;
        serde_json::from_value(value).map_err(|e| vec![e.to_string()])
    }

    /// 総合スコアの評価帯
    pub fn score_band(&self) -> ScoreBand {
        ScoreBand::from_score(self.overall_score)
    }

    /// 結果を JSON 形式でシリアライズ
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// 総合スコアの評価帯
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreBand {
    /// 80 以上
    Excellent,
    /// 60 以上
    Decent,
    /// 40 以上
    Rough,
    /// 40 未満
    Dumpster,
}

impl ScoreBand {
    /// スコアから評価帯を判定
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => ScoreBand::Excellent,
            60..=79 => ScoreBand::Decent,
            40..=59 => ScoreBand::Rough,
            _ => ScoreBand::Dumpster,
        }
    }

    /// 表示用ラベル
    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Decent => "Decent",
            ScoreBand::Rough => "Rough",
            ScoreBand::Dumpster => "Dumpster fire",
        }
    }
}

/// 整数値の浮動小数（`42.0` 等）も受け付けるスコアのデシリアライザ
fn deserialize_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if raw.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&raw) {
        return Err(serde::de::Error::custom(format!("不正なスコアです: {}", raw)));
    }
    Ok(raw as u8)
}
