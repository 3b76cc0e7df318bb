//! 講評トーンの定義
//!
//! # 責務
//!
//! - 講評の強さ（トーン）を表す [`ToneSetting`] を提供
//! - トーンごとのスタイルガイド文言を管理
//!
//! # マッピング表
//!
//! | Tone   | スタイル                                     |
//! |--------|----------------------------------------------|
//! | Gentle | 励まし重視、良い点も指摘しつつ建設的に       |
//! | Medium | 皮肉とウィットを効かせつつ最終的には役に立つ |
//! | Savage | 手加減なしの辛口、ただし最後は建設的に       |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const GENTLE_GUIDANCE: &str = "Be encouraging and constructive, like a supportive mentor. \
Point out issues gently with humor but focus on positives too.";

const MEDIUM_GUIDANCE: &str = "Be witty and sarcastic, like a comedian doing a roast. \
Make jokes about common resume mistakes but keep it helpful.";

const SAVAGE_GUIDANCE: &str = "Be brutally honest and hilariously savage, like Gordon Ramsay reviewing a resume. \
No mercy, but still ultimately constructive.";

/// 講評トーン
///
/// 既定値は [`ToneSetting::Medium`] です。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneSetting {
    /// 優しめ
    Gentle,
    /// 標準
    #[default]
    Medium,
    /// 容赦なし
    Savage,
}

impl ToneSetting {
    /// 全トーン（表示順）
    pub const ALL: [ToneSetting; 3] = [ToneSetting::Gentle, ToneSetting::Medium, ToneSetting::Savage];

    /// プロンプトに埋め込む識別子
    pub fn as_str(&self) -> &'static str {
        match self {
            ToneSetting::Gentle => "gentle",
            ToneSetting::Medium => "medium",
            ToneSetting::Savage => "savage",
        }
    }

    /// トーンに対応するスタイルガイド
    pub fn guidance(&self) -> &'static str {
        match self {
            ToneSetting::Gentle => GENTLE_GUIDANCE,
            ToneSetting::Medium => MEDIUM_GUIDANCE,
            ToneSetting::Savage => SAVAGE_GUIDANCE,
        }
    }

    /// 選択肢として表示する短い説明
    pub fn tagline(&self) -> &'static str {
        match self {
            ToneSetting::Gentle => "Constructive with a smile",
            ToneSetting::Medium => "Witty and honest",
            ToneSetting::Savage => "No mercy, all truth",
        }
    }
}

impl fmt::Display for ToneSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToneSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gentle" => Ok(ToneSetting::Gentle),
            "medium" => Ok(ToneSetting::Medium),
            "savage" => Ok(ToneSetting::Savage),
            other => Err(format!(
                "不明なトーンです: '{}' (gentle, medium, savage のいずれか)",
                other
            )),
        }
    }
}
