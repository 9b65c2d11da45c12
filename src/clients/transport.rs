//! 传输层接口
//!
//! 编排器只依赖这里的 trait，具体的 HTTP 实现见 `http_transport`，
//! 测试中可替换为内存实现。

use crate::clients::metadata::DocumentMetadata;
use crate::clients::session::Session;
use crate::error::AppResult;
use async_trait::async_trait;
use serde_json::Value;

/// 文档定位方式：服务端 ID 或完整资源地址
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentLocator {
    Id(String),
    Uri(String),
}

impl DocumentLocator {
    pub fn id(id: impl Into<String>) -> Self {
        DocumentLocator::Id(id.into())
    }

    pub fn uri(uri: impl Into<String>) -> Self {
        DocumentLocator::Uri(uri.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            DocumentLocator::Id(value) | DocumentLocator::Uri(value) => value,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().trim().is_empty()
    }
}

impl std::fmt::Display for DocumentLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 上传请求
#[derive(Debug, Clone)]
pub struct UploadRequest<'a> {
    pub data: &'a [u8],
    pub content_type: &'a str,
    pub filename: Option<&'a str>,
    pub document_type: Option<&'a str>,
    pub metadata: Option<&'a DocumentMetadata>,
}

/// 远程服务的传输层
///
/// 每个方法对应一次网络往返，返回未经映射的原始响应。
/// 创建类接口返回新资源的 Location。
#[async_trait]
pub trait Transport: Send + Sync {
    async fn upload_document(&self, request: UploadRequest<'_>, session: &Session) -> AppResult<String>;

    async fn get_document(&self, locator: &DocumentLocator, session: &Session) -> AppResult<Value>;

    async fn delete_document(&self, locator: &DocumentLocator, session: &Session) -> AppResult<()>;

    async fn get_extractions(&self, document_id: &str, session: &Session) -> AppResult<Value>;

    async fn send_feedback(
        &self,
        document_id: &str,
        specific: Value,
        compound: Value,
        session: &Session,
    ) -> AppResult<Value>;

    async fn error_report_for_document(
        &self,
        document_id: &str,
        summary: &str,
        description: &str,
        session: &Session,
    ) -> AppResult<Value>;

    async fn get_layout_for_document(&self, document_id: &str, session: &Session) -> AppResult<Value>;

    async fn get_payment_providers(&self, session: &Session) -> AppResult<Value>;

    async fn get_payment_provider(&self, provider_id: &str, session: &Session) -> AppResult<Value>;

    async fn post_payment_request(&self, body: Value, session: &Session) -> AppResult<String>;

    async fn get_payment_request(&self, request_id: &str, session: &Session) -> AppResult<Value>;

    async fn get_payment_requests(&self, session: &Session) -> AppResult<Value>;

    async fn resolve_payment_request(
        &self,
        request_id: &str,
        body: Value,
        session: &Session,
    ) -> AppResult<String>;

    async fn get_payment(&self, request_id: &str, session: &Session) -> AppResult<Value>;
}
