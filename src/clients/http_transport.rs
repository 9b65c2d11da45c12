/// HTTP 传输层
///
/// 基于 reqwest 实现 `Transport`，封装所有与文档/支付 API 相关的调用
use crate::clients::media_types::MediaTypes;
use crate::clients::session::Session;
use crate::clients::transport::{DocumentLocator, Transport, UploadRequest};
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult, ConfigError};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// HTTP 传输层
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    media_types: MediaTypes,
}

impl HttpTransport {
    /// 根据配置创建传输层
    pub fn new(config: &Config) -> AppResult<Self> {
        let base_url = Url::parse(&config.api_base_url).map_err(|source| ConfigError::InvalidUrl {
            value: config.api_base_url.clone(),
            source,
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                value: config.api_base_url.clone(),
                source: url::ParseError::RelativeUrlWithoutBase,
            }
            .into());
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url,
            media_types: config.media_types(),
        })
    }

    /// 在根地址后追加路径段，每段单独做百分号编码
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::invalid_value("api_base_url", self.base_url.as_str()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// ID 拼到 `documents/` 下，资源地址相对根地址解析
    fn document_url(&self, locator: &DocumentLocator) -> AppResult<Url> {
        match locator {
            DocumentLocator::Id(id) => self.endpoint(&["documents", id.as_str()]),
            DocumentLocator::Uri(uri) => self
                .base_url
                .join(uri)
                .map_err(|_| AppError::invalid_value("document", uri.as_str())),
        }
    }

    /// 附加认证和 Accept 头
    fn authorized(&self, builder: RequestBuilder, session: &Session) -> RequestBuilder {
        builder
            .bearer_auth(session.access_token())
            .header(ACCEPT, self.media_types.json())
    }

    async fn get_json(&self, url: Url, session: &Session) -> AppResult<Value> {
        debug!("GET {}", url);
        let endpoint = url.to_string();
        let response = self
            .authorized(self.client.get(url), session)
            .send()
            .await?;
        let response = check_status(&endpoint, response).await?;
        Ok(response.json().await?)
    }

    async fn post_for_location(&self, url: Url, body: Value, session: &Session) -> AppResult<String> {
        debug!("POST {} Payload: {}", url, body);
        let endpoint = url.to_string();
        let response = self
            .authorized(self.client.post(url), session)
            .header(CONTENT_TYPE, self.media_types.json())
            .body(serde_json::to_vec(&body)?)
            .send()
            .await?;
        let response = check_status(&endpoint, response).await?;
        location_of(&endpoint, &response)
    }
}

/// 检查 HTTP 状态码，非 2xx 转为 `ApiError::BadResponse`
async fn check_status(endpoint: &str, response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::bad_response(
        endpoint,
        status.as_u16(),
        if body.is_empty() { None } else { Some(body) },
    ))
}

fn location_of(endpoint: &str, response: &Response) -> AppResult<String> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| {
            ApiError::MissingLocation {
                endpoint: endpoint.to_string(),
            }
            .into()
        })
}

#[async_trait]
impl Transport for HttpTransport {
    async fn upload_document(&self, request: UploadRequest<'_>, session: &Session) -> AppResult<String> {
        let mut url = self.endpoint(&["documents"])?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(filename) = request.filename {
                query.append_pair("filename", filename);
            }
            if let Some(document_type) = request.document_type {
                query.append_pair("doctype", document_type);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        debug!(
            "上传文档: {} 字节, Content-Type: {}",
            request.data.len(),
            request.content_type
        );

        let endpoint = url.to_string();
        let mut builder = self
            .authorized(self.client.post(url), session)
            .header(CONTENT_TYPE, request.content_type);
        if let Some(metadata) = request.metadata {
            for (name, value) in metadata.headers() {
                builder = builder.header(name, value);
            }
        }
        let response = builder.body(request.data.to_vec()).send().await?;
        let response = check_status(&endpoint, response).await?;
        location_of(&endpoint, &response)
    }

    async fn get_document(&self, locator: &DocumentLocator, session: &Session) -> AppResult<Value> {
        self.get_json(self.document_url(locator)?, session).await
    }

    async fn delete_document(&self, locator: &DocumentLocator, session: &Session) -> AppResult<()> {
        let url = self.document_url(locator)?;
        debug!("DELETE {}", url);
        let endpoint = url.to_string();
        let response = self
            .authorized(self.client.delete(url), session)
            .send()
            .await?;
        check_status(&endpoint, response).await?;
        Ok(())
    }

    async fn get_extractions(&self, document_id: &str, session: &Session) -> AppResult<Value> {
        let url = self.endpoint(&["documents", document_id, "extractions"])?;
        self.get_json(url, session).await
    }

    async fn send_feedback(
        &self,
        document_id: &str,
        specific: Value,
        compound: Value,
        session: &Session,
    ) -> AppResult<Value> {
        let url = self.endpoint(&["documents", document_id, "extractions"])?;
        let body = json!({
            "feedback": specific,
            "compoundExtractions": compound,
        });

        debug!("PUT {} Payload: {}", url, body);

        let endpoint = url.to_string();
        let response = self
            .authorized(self.client.put(url), session)
            .header(CONTENT_TYPE, self.media_types.json())
            .body(serde_json::to_vec(&body)?)
            .send()
            .await?;
        check_status(&endpoint, response).await?;
        // 反馈接口只返回状态码
        Ok(Value::Null)
    }

    async fn error_report_for_document(
        &self,
        document_id: &str,
        summary: &str,
        description: &str,
        session: &Session,
    ) -> AppResult<Value> {
        let mut url = self.endpoint(&["documents", document_id, "errorreport"])?;
        url.query_pairs_mut()
            .append_pair("summary", summary)
            .append_pair("description", description);
        debug!("POST {}", url);
        let endpoint = url.to_string();
        let response = self
            .authorized(self.client.post(url), session)
            .send()
            .await?;
        let response = check_status(&endpoint, response).await?;
        Ok(response.json().await?)
    }

    async fn get_layout_for_document(&self, document_id: &str, session: &Session) -> AppResult<Value> {
        let url = self.endpoint(&["documents", document_id, "layout"])?;
        self.get_json(url, session).await
    }

    async fn get_payment_providers(&self, session: &Session) -> AppResult<Value> {
        self.get_json(self.endpoint(&["paymentProviders"])?, session).await
    }

    async fn get_payment_provider(&self, provider_id: &str, session: &Session) -> AppResult<Value> {
        let url = self.endpoint(&["paymentProviders", provider_id])?;
        self.get_json(url, session).await
    }

    async fn post_payment_request(&self, body: Value, session: &Session) -> AppResult<String> {
        self.post_for_location(self.endpoint(&["paymentRequests"])?, body, session)
            .await
    }

    async fn get_payment_request(&self, request_id: &str, session: &Session) -> AppResult<Value> {
        let url = self.endpoint(&["paymentRequests", request_id])?;
        self.get_json(url, session).await
    }

    async fn get_payment_requests(&self, session: &Session) -> AppResult<Value> {
        self.get_json(self.endpoint(&["paymentRequests"])?, session).await
    }

    async fn resolve_payment_request(
        &self,
        request_id: &str,
        body: Value,
        session: &Session,
    ) -> AppResult<String> {
        let url = self.endpoint(&["paymentRequests", request_id, "payment"])?;
        self.post_for_location(url, body, session).await
    }

    async fn get_payment(&self, request_id: &str, session: &Session) -> AppResult<Value> {
        let url = self.endpoint(&["paymentRequests", request_id, "payment"])?;
        self.get_json(url, session).await
    }
}
