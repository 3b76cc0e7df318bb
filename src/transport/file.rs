//! アップロード対象ファイルとファイル参照
//!
//! # 責務
//!
//! - ユーザーが選んだファイル [`UploadedFile`] の保持（表示名・種別・バイト列）
//! - 拡張子からの種別判定（PDF / PNG / JPEG のみ受け付け）
//! - アップロード先が返す不透明な参照 [`FileReference`] の型定義

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// ファイル種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// 文書（PDF）
    Document,
    /// 画像（PNG / JPEG）
    Image,
}

/// ユーザーが選択したファイル
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedFile {
    name: String,
    kind: FileKind,
    mime_type: &'static str,
    content: Vec<u8>,
}

impl UploadedFile {
    /// ファイル名とバイト列から生成
    ///
    /// 種別は拡張子から判定します。
    ///
    /// # エラー
    ///
    /// - [`TransportError::UnsupportedFileType`] - PDF / PNG / JPEG 以外
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Result<Self, TransportError> {
        let name = name.into();
        let (kind, mime_type) = detect_kind(&name)?;
        Ok(Self {
            name,
            kind,
            mime_type,
            content,
        })
    }

    /// ローカルファイルを読み込んで生成
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| TransportError::UnsupportedFileType(path.display().to_string()))?
            .to_string();

        // 読み込み前に拡張子を検証する
        detect_kind(&name)?;
        let content = tokio::fs::read(path).await?;
        Self::new(name, content)
    }

    /// 表示名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 種別
    pub fn kind(&self) -> FileKind {
        self.kind
    }

    /// MIME タイプ
    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    /// バイト列
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// サイズ（バイト）
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// 空ファイルかどうか
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

// バイト列はログに出さない
impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("mime_type", &self.mime_type)
            .field("len", &self.content.len())
            .finish()
    }
}

fn detect_kind(name: &str) -> Result<(FileKind, &'static str), TransportError> {
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("pdf") => Ok((FileKind::Document, "application/pdf")),
        Some("png") => Ok((FileKind::Image, "image/png")),
        Some("jpg") | Some("jpeg") => Ok((FileKind::Image, "image/jpeg")),
        _ => Err(TransportError::UnsupportedFileType(name.to_string())),
    }
}

/// アップロード先が返す不透明なファイル参照（URL 等）
///
/// 一度取得したら変更されません。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileReference(String);

impl FileReference {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
