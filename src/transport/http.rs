//! HTTP トランスポート実装
//!
//! # 責務
//!
//! - ファイル保存エンドポイントへの multipart アップロード（[`HttpUploadClient`]）
//! - 解析エンドポイントへの JSON リクエスト送信（[`HttpAnalysisClient`]）
//! - HTTP ステータス・通信エラーから [`TransportError`] への変換
//!
//! # ワイヤ形式
//!
//! アップロード（`multipart/form-data`、パート名 `file`）の応答:
//!
//! ```json
//! { "file_url": "https://storage.example.com/files/abc.pdf" }
//! ```
//!
//! 解析リクエストは [`AnalysisRequest`] をそのまま JSON で送り、
//! 応答ボディの JSON オブジェクトを検証前の値として返します。
//!
//! # 認証
//!
//! API キーが与えられた場合は `Authorization: Bearer <key>` を付与します。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::file::{FileReference, UploadedFile};
use super::traits::{AnalysisTransport, UploadTransport};
use crate::error::TransportError;
use crate::roast::AnalysisRequest;

/// 接続確立のタイムアウト
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP クライアントを構築
fn build_client(timeout: Duration) -> Result<Client, TransportError> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(timeout)
        .build()
        .map_err(|e| TransportError::Misconfiguration(format!("HTTP クライアントの構築に失敗しました: {}", e)))
}

fn with_auth(builder: RequestBuilder, api_key: Option<&str>) -> RequestBuilder {
    match api_key {
        Some(key) => builder.bearer_auth(key),
        None => builder,
    }
}

/// 通信エラーを変換
fn map_reqwest_error(error: reqwest::Error, timeout: Duration) -> TransportError {
    if error.is_timeout() {
        TransportError::timed_out(timeout)
    } else if error.is_decode() {
        TransportError::InvalidResponse(error.to_string())
    } else {
        TransportError::Network(error.to_string())
    }
}

/// 非 2xx 応答をエラーに変換
async fn ensure_success(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TransportError::from_status(status.as_u16(), &body))
}

/// アップロード応答
#[derive(Debug, Deserialize)]
struct UploadResponse {
    file_url: String,
}

/// アップロード応答ボディを解釈
fn parse_upload_response(body: &str) -> Result<FileReference, TransportError> {
    let response: UploadResponse = serde_json::from_str(body).map_err(|e| {
        TransportError::InvalidResponse(format!("アップロード応答を解釈できません: {}", e))
    })?;

    if response.file_url.trim().is_empty() {
        return Err(TransportError::InvalidResponse(
            "file_url が空です".to_string(),
        ));
    }
    Ok(FileReference::new(response.file_url))
}

/// 解析応答ボディを解釈
///
/// JSON オブジェクト以外（配列・文字列等）は不正な応答とみなします。
fn parse_analysis_response(body: &str) -> Result<Value, TransportError> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        TransportError::InvalidResponse(format!("解析応答を JSON として解釈できません: {}", e))
    })?;

    if !value.is_object() {
        return Err(TransportError::InvalidResponse(
            "解析応答が JSON オブジェクトではありません".to_string(),
        ));
    }
    Ok(value)
}

/// multipart アップロードクライアント
pub struct HttpUploadClient {
    client: Client,
    url: Url,
    timeout: Duration,
    api_key: Option<String>,
}

impl HttpUploadClient {
    /// 新しいアップロードクライアントを生成
    ///
    /// # エラー
    ///
    /// - [`TransportError::Misconfiguration`] - HTTP クライアントを構築できない
    pub fn new(url: Url, timeout: Duration, api_key: Option<String>) -> Result<Self, TransportError> {
        Ok(Self {
            client: build_client(timeout)?,
            url,
            timeout,
            api_key,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl UploadTransport for HttpUploadClient {
    async fn store(&self, file: &UploadedFile) -> Result<FileReference, TransportError> {
        debug!(
            url = %self.url,
            file = file.name(),
            bytes = file.len(),
            "ファイルをアップロードします"
        );

        let part = Part::bytes(file.content().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.mime_type())
            .map_err(|e| TransportError::Misconfiguration(e.to_string()))?;
        let form = Form::new().part("file", part);

        let request = with_auth(self.client.post(self.url.clone()), self.api_key.as_deref())
            .multipart(form);
        let response = request
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, self.timeout))?;
        let response = ensure_success(response).await?;
        let body = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(e, self.timeout))?;

        parse_upload_response(&body)
    }
}

/// JSON 解析クライアント
pub struct HttpAnalysisClient {
    client: Client,
    url: Url,
    timeout: Duration,
    api_key: Option<String>,
}

impl HttpAnalysisClient {
    /// 新しい解析クライアントを生成
    ///
    /// # エラー
    ///
    /// - [`TransportError::Misconfiguration`] - HTTP クライアントを構築できない
    pub fn new(url: Url, timeout: Duration, api_key: Option<String>) -> Result<Self, TransportError> {
        Ok(Self {
            client: build_client(timeout)?,
            url,
            timeout,
            api_key,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl AnalysisTransport for HttpAnalysisClient {
    async fn infer(&self, request: &AnalysisRequest) -> Result<Value, TransportError> {
        debug!(
            url = %self.url,
            file_urls = request.file_urls().len(),
            prompt_chars = request.prompt().len(),
            "解析リクエストを送信します"
        );

        let response = with_auth(self.client.post(self.url.clone()), self.api_key.as_deref())
            .json(request)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, self.timeout))?;
        let response = ensure_success(response).await?;
        let body = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(e, self.timeout))?;

        parse_analysis_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roast::ToneSetting;
    use mockito::{Matcher, Mock, Server, ServerGuard};
    use serde_json::json;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn test_new_upload_client() {
        let client =
            HttpUploadClient::new(url("https://storage.example.com/upload"), Duration::from_secs(5), None)
                .unwrap();
        assert_eq!(client.url().as_str(), "https://storage.example.com/upload");
        assert!(client.api_key.is_none());
    }

    #[test]
    fn test_new_analysis_client() {
        let client = HttpAnalysisClient::new(
            url("https://llm.example.com/invoke"),
            Duration::from_secs(5),
            Some("key".to_string()),
        )
        .unwrap();
        assert_eq!(client.url().host_str(), Some("llm.example.com"));
        assert_eq!(client.api_key.as_deref(), Some("key"));
    }

    #[test]
    fn test_parse_upload_response() {
        let file_ref = parse_upload_response(r#"{"file_url":"blob://abc"}"#).unwrap();
        assert_eq!(file_ref.as_str(), "blob://abc");
    }

    #[test]
    fn test_parse_upload_response_extra_fields_ignored() {
        let file_ref =
            parse_upload_response(r#"{"file_url":"blob://abc","size":123}"#).unwrap();
        assert_eq!(file_ref, FileReference::new("blob://abc"));
    }

    #[test]
    fn test_parse_upload_response_missing_url() {
        let result = parse_upload_response(r#"{"url":"blob://abc"}"#);
        assert!(matches!(result, Err(TransportError::InvalidResponse(_))));

        let result = parse_upload_response(r#"{"file_url":"  "}"#);
        assert!(matches!(result, Err(TransportError::InvalidResponse(_))));
    }

    #[test]
    fn test_parse_analysis_response() {
        let value = parse_analysis_response(r#"{"overall_score": 42}"#).unwrap();
        assert_eq!(value["overall_score"], 42);
    }

    #[test]
    fn test_parse_analysis_response_rejects_non_object() {
        assert!(matches!(
            parse_analysis_response("[1,2]"),
            Err(TransportError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_analysis_response("Sorry, I can't do that"),
            Err(TransportError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // 何も待ち受けていないポートへの接続
        let client = HttpAnalysisClient::new(
            url("http://127.0.0.1:9/invoke"),
            Duration::from_secs(5),
            None,
        )
        .unwrap();
        let request = AnalysisRequest::new(
            crate::roast::ToneSetting::Medium,
            &FileReference::new("blob://abc"),
        );

        let result = client.infer(&request).await;
        assert!(matches!(
            result,
            Err(TransportError::Network(_)) | Err(TransportError::Timeout(_))
        ));
    }

    fn server_url(server: &ServerGuard, path: &str) -> Url {
        url(&format!("{}{}", server.url(), path))
    }

    fn upload_client(server: &ServerGuard, api_key: Option<&str>) -> HttpUploadClient {
        HttpUploadClient::new(
            server_url(server, "/upload"),
            Duration::from_secs(5),
            api_key.map(str::to_string),
        )
        .unwrap()
    }

    fn analysis_client(server: &ServerGuard, api_key: Option<&str>) -> HttpAnalysisClient {
        HttpAnalysisClient::new(
            server_url(server, "/invoke"),
            Duration::from_secs(5),
            api_key.map(str::to_string),
        )
        .unwrap()
    }

    fn resume() -> UploadedFile {
        UploadedFile::new("resume.pdf", b"%PDF-1.4 body".to_vec()).unwrap()
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest::new(ToneSetting::Savage, &FileReference::new("blob://abc"))
    }

    #[tokio::test]
    async fn test_store_sends_multipart_file_part_with_bearer() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/upload")
            .match_header("authorization", "Bearer secret")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".to_string()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="file"; filename="resume.pdf""#.to_string()),
                Matcher::Regex("(?i)content-type: application/pdf".to_string()),
                Matcher::Regex("%PDF-1.4 body".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"file_url":"blob://abc"}"#)
            .create_async()
            .await;

        let file_ref = upload_client(&server, Some("secret"))
            .store(&resume())
            .await
            .unwrap();

        assert_eq!(file_ref, FileReference::new("blob://abc"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_store_without_api_key_sends_no_authorization() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/upload")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"file_url":"blob://anon"}"#)
            .create_async()
            .await;

        let file_ref = upload_client(&server, None).store(&resume()).await.unwrap();

        assert_eq!(file_ref.as_str(), "blob://anon");
        mock.assert_async().await;
    }

    /// 指定ステータスを返すサーバーを立てる
    async fn server_returning(path: &str, status: usize, body: &str) -> (ServerGuard, Mock) {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", path)
            .with_status(status)
            .with_body(body)
            .create_async()
            .await;
        (server, mock)
    }

    #[tokio::test]
    async fn test_store_maps_error_statuses() {
        let (server, _mock) = server_returning("/upload", 413, "too big").await;
        let result = upload_client(&server, None).store(&resume()).await;
        assert!(matches!(result, Err(TransportError::PayloadTooLarge)));

        let (server, _mock) = server_returning("/upload", 500, "boom").await;
        let result = upload_client(&server, None).store(&resume()).await;
        assert!(matches!(result, Err(TransportError::ServiceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_store_rejects_body_without_file_url() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/upload")
            .with_status(200)
            .with_body(r#"{"url":"blob://abc"}"#)
            .create_async()
            .await;

        let result = upload_client(&server, None).store(&resume()).await;
        assert!(matches!(result, Err(TransportError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_infer_posts_request_json_with_bearer() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/invoke")
            .match_header("authorization", "Bearer secret")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(json!({ "file_urls": ["blob://abc"] })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"overall_score": 42}"#)
            .create_async()
            .await;

        let value = analysis_client(&server, Some("secret"))
            .infer(&request())
            .await
            .unwrap();

        assert_eq!(value["overall_score"], 42);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_infer_without_api_key_sends_no_authorization() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/invoke")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let value = analysis_client(&server, None).infer(&request()).await.unwrap();

        assert!(value.is_object());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_infer_maps_error_statuses() {
        let (server, _mock) = server_returning("/invoke", 429, "").await;
        let result = analysis_client(&server, None).infer(&request()).await;
        assert!(matches!(result, Err(TransportError::RateLimitExceeded)));

        let (server, _mock) = server_returning("/invoke", 503, "maintenance").await;
        let result = analysis_client(&server, None).infer(&request()).await;
        match result {
            Err(TransportError::ServiceUnavailable(message)) => {
                assert!(message.contains("503"));
                assert!(message.contains("maintenance"));
            }
            other => panic!("Expected ServiceUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_infer_rejects_non_object_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/invoke")
            .with_status(200)
            .with_body("[1, 2, 3]")
            .create_async()
            .await;

        let result = analysis_client(&server, None).infer(&request()).await;
        assert!(matches!(result, Err(TransportError::InvalidResponse(_))));
    }
}
