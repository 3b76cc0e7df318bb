//! アプリケーション設定
//!
//! # 責務
//!
//! - TOML ファイルから [`Settings`] を読み込み、バリデーション済みのドメインモデルに変換
//! - 省略された項目への既定値の補完
//! - 設定の TOML への書き出し
//!
//! ## 使用例
//!
//! ```toml
//! [upload]
//! url = "https://storage.example.com/upload"
//! timeout_secs = 60
//!
//! [analysis]
//! url = "https://llm.example.com/invoke"
//! timeout_secs = 180
//!
//! [auth]
//! api_key_env = "ROASTER_API_KEY"
//!
//! [roast]
//! default_tone = "medium"
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;

use super::dto::{AuthDto, EndpointDto, LoggingDto, RoastDto, SettingsDto};
use crate::error::ConfigError;
use crate::roast::ToneSetting;

const DEFAULT_UPLOAD_URL: &str = "http://localhost:8080/upload";
const DEFAULT_ANALYSIS_URL: &str = "http://localhost:8080/invoke";
const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 60;
const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 180;
const DEFAULT_API_KEY_ENV: &str = "ROASTER_API_KEY";
const DEFAULT_LOG_LEVEL: &str = "info";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// アプリケーション設定（ドメインモデル）
///
/// バリデーション済みの状態を保証します。
///
/// ## DTO との違い
///
/// - `SettingsDto`: TOML デシリアライズ専用、バリデーション前の生データ
/// - [`Settings`]: バリデーション済み、既定値補完済み
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    upload: EndpointSettings,
    analysis: EndpointSettings,
    api_key_env: Option<String>,
    default_tone: ToneSetting,
    logging: LoggingSettings,
}

/// 接続先エンドポイントの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSettings {
    url: Url,
    timeout: Duration,
}

impl EndpointSettings {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 人間向けの整形出力
    #[default]
    Pretty,
    /// 1 行 1 イベントの JSON
    Json,
}

impl LogFormat {
    fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// ログ設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    level: String,
    format: LogFormat,
    directory: Option<PathBuf>,
}

impl LoggingSettings {
    /// フィルタレベル（`trace`〜`error`）
    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    /// ファイル出力先ディレクトリ（`None` ならファイル出力なし）
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// 詳細ログ用にレベルを `debug` へ引き上げる
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        if verbose {
            self.level = "debug".to_string();
        }
        self
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::Pretty,
            directory: None,
        }
    }
}

impl Settings {
    /// TOML ファイルから設定を読み込む
    ///
    /// # 処理フロー
    ///
    /// 1. ファイル読み込み
    /// 2. TOML デシリアライズ → `SettingsDto`
    /// 3. バリデーション & 変換 → [`Settings`]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// TOML 文字列から設定を読み込む
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let dto: SettingsDto = toml::from_str(toml)?;
        Self::try_from(dto)
    }

    /// 設定を TOML 文字列に変換
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        let dto = SettingsDto::from(self.clone());
        Ok(toml::to_string(&dto)?)
    }

    pub fn upload(&self) -> &EndpointSettings {
        &self.upload
    }

    pub fn analysis(&self) -> &EndpointSettings {
        &self.analysis
    }

    /// API キーを読み出す環境変数名
    pub fn api_key_env(&self) -> Option<&str> {
        self.api_key_env.as_deref()
    }

    /// 環境変数から API キーを取得（未設定・空なら `None`）
    pub fn api_key(&self) -> Option<String> {
        self.api_key_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn default_tone(&self) -> ToneSetting {
        self.default_tone
    }

    pub fn logging(&self) -> &LoggingSettings {
        &self.logging
    }
}

impl Default for Settings {
    fn default() -> Self {
        // 既定値は空の DTO からの変換と同一
        Self {
            upload: EndpointSettings {
                url: parse_url("upload.url", DEFAULT_UPLOAD_URL)
                    .unwrap_or_else(|_| unreachable!("既定の URL は常に有効")),
                timeout: Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
            },
            analysis: EndpointSettings {
                url: parse_url("analysis.url", DEFAULT_ANALYSIS_URL)
                    .unwrap_or_else(|_| unreachable!("既定の URL は常に有効")),
                timeout: Duration::from_secs(DEFAULT_ANALYSIS_TIMEOUT_SECS),
            },
            api_key_env: Some(DEFAULT_API_KEY_ENV.to_string()),
            default_tone: ToneSetting::default(),
            logging: LoggingSettings::default(),
        }
    }
}

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::Validation(format!("{} が不正な URL です ({}): {}", field, raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Validation(format!(
            "{} のスキーム '{}' はサポートされていません (http / https のみ)",
            field, other
        ))),
    }
}

fn convert_endpoint(
    field: &str,
    dto: Option<EndpointDto>,
    default_url: &str,
    default_timeout_secs: u64,
) -> Result<EndpointSettings, ConfigError> {
    let (raw_url, timeout_secs) = match dto {
        Some(dto) => (dto.url, dto.timeout_secs.unwrap_or(default_timeout_secs)),
        None => (default_url.to_string(), default_timeout_secs),
    };

    if timeout_secs == 0 {
        return Err(ConfigError::Validation(format!(
            "{}.timeout_secs は 0 より大きい必要があります",
            field
        )));
    }

    Ok(EndpointSettings {
        url: parse_url(&format!("{}.url", field), &raw_url)?,
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn convert_logging(dto: Option<LoggingDto>) -> Result<LoggingSettings, ConfigError> {
    let Some(dto) = dto else {
        return Ok(LoggingSettings::default());
    };

    let level = dto
        .level
        .map(|level| level.trim().to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(ConfigError::Validation(format!(
            "logging.level '{}' は不正です ({} のいずれか)",
            level,
            LOG_LEVELS.join(", ")
        )));
    }

    let format = match dto.format.as_deref().map(str::trim) {
        None | Some("pretty") => LogFormat::Pretty,
        Some("json") => LogFormat::Json,
        Some(other) => {
            return Err(ConfigError::Validation(format!(
                "logging.format '{}' は不正です (pretty / json のいずれか)",
                other
            )));
        }
    };

    let directory = match dto.directory {
        Some(dir) if dir.trim().is_empty() => {
            return Err(ConfigError::Validation(
                "logging.directory が空です".to_string(),
            ));
        }
        Some(dir) => Some(PathBuf::from(dir)),
        None => None,
    };

    Ok(LoggingSettings {
        level,
        format,
        directory,
    })
}

/// DTO からドメインモデルへの変換（読み込み方向）
///
/// バリデーションを実施し、不正なデータの場合は [`ConfigError::Validation`] を返します。
impl TryFrom<SettingsDto> for Settings {
    type Error = ConfigError;

    fn try_from(dto: SettingsDto) -> Result<Self, Self::Error> {
        let upload = convert_endpoint(
            "upload",
            dto.upload,
            DEFAULT_UPLOAD_URL,
            DEFAULT_UPLOAD_TIMEOUT_SECS,
        )?;
        let analysis = convert_endpoint(
            "analysis",
            dto.analysis,
            DEFAULT_ANALYSIS_URL,
            DEFAULT_ANALYSIS_TIMEOUT_SECS,
        )?;

        let api_key_env = match dto.auth.and_then(|auth| auth.api_key_env) {
            Some(name) if name.trim().is_empty() => None,
            Some(name) => Some(name.trim().to_string()),
            None => Some(DEFAULT_API_KEY_ENV.to_string()),
        };

        let default_tone = match dto.roast.and_then(|roast| roast.default_tone) {
            Some(raw) => raw
                .parse::<ToneSetting>()
                .map_err(|e| ConfigError::Validation(format!("roast.default_tone: {}", e)))?,
            None => ToneSetting::default(),
        };

        Ok(Self {
            upload,
            analysis,
            api_key_env,
            default_tone,
            logging: convert_logging(dto.logging)?,
        })
    }
}

/// ドメインモデルから DTO への変換（書き込み方向）
///
/// バリデーション済みのドメインモデルから DTO を生成するため、
/// この変換は失敗しません（`From` トレイトを使用）。
impl From<Settings> for SettingsDto {
    fn from(settings: Settings) -> Self {
        let endpoint = |endpoint: EndpointSettings| EndpointDto {
            url: endpoint.url.to_string(),
            timeout_secs: Some(endpoint.timeout.as_secs()),
        };

        SettingsDto {
            upload: Some(endpoint(settings.upload)),
            analysis: Some(endpoint(settings.analysis)),
            auth: Some(AuthDto {
                // 空文字列は「API キーを使わない」を表す
                api_key_env: Some(settings.api_key_env.unwrap_or_default()),
            }),
            roast: Some(RoastDto {
                default_tone: Some(settings.default_tone.to_string()),
            }),
            logging: Some(LoggingDto {
                level: Some(settings.logging.level),
                format: Some(settings.logging.format.as_str().to_string()),
                directory: settings
                    .logging
                    .directory
                    .map(|dir| dir.display().to_string()),
            }),
        }
    }
}
