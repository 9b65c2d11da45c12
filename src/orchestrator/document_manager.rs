//! 文档编排器 - 编排层
//!
//! ## 职责
//!
//! 组合会话提供者和传输层的调用，把原始响应交给响应映射层，
//! 对外提供文档和支付相关的高层异步操作。
//!
//! ## 顺序保证
//!
//! - 每个操作先取会话，再按约定的顺序发起传输调用，任一步失败立即返回该错误
//! - 级联删除逐个删除父文档，上一个成功后才发起下一个，最后删除部分文档本身
//! - 只有 PENDING 状态的轮询会重试，传输错误从不重试

use crate::clients::{
    DocumentLocator, DocumentMetadata, MediaTypes, Session, SessionProvider, Transport,
    UploadRequest,
};
use crate::config::Config;
use crate::error::{require, AppError, AppResult};
use crate::mapper;
use crate::models::{
    CompoundExtraction, Document, DocumentType, ExtractionsContainer, Payment, PaymentProvider,
    PaymentRequest, PaymentRequestInput, ResolvePaymentInput, SpecificExtraction,
};
use crate::orchestrator::composite::composite_document_body;
use crate::orchestrator::feedback;
use crate::orchestrator::polling::{PollToken, PollingRegistry};
use crate::orchestrator::scheduler::{PollHandle, PollScheduler};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 编排器配置
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub media_types: MediaTypes,
    /// 两次轮询之间的间隔
    pub polling_interval: Duration,
    /// 最大轮询次数，None 表示一直轮询到终态或被取消
    pub max_poll_attempts: Option<u32>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            media_types: MediaTypes::new("gini", "v1"),
            polling_interval: Duration::from_secs(1),
            max_poll_attempts: None,
        }
    }
}

impl From<&Config> for OrchestratorConfig {
    fn from(config: &Config) -> Self {
        Self {
            media_types: config.media_types(),
            polling_interval: config.polling_interval(),
            max_poll_attempts: config.max_poll_attempts,
        }
    }
}

/// 文档编排器
pub struct DocumentOrchestrator<T, S> {
    config: Arc<OrchestratorConfig>,
    transport: Arc<T>,
    sessions: Arc<S>,
    registry: Arc<PollingRegistry>,
    scheduler: Arc<PollScheduler>,
}

impl<T, S> Clone for DocumentOrchestrator<T, S> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            transport: self.transport.clone(),
            sessions: self.sessions.clone(),
            registry: self.registry.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T, S> DocumentOrchestrator<T, S>
where
    T: Transport + 'static,
    S: SessionProvider + 'static,
{
    pub fn new(
        config: OrchestratorConfig,
        transport: Arc<T>,
        sessions: Arc<S>,
        scheduler: PollScheduler,
    ) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            sessions,
            registry: Arc::new(PollingRegistry::new()),
            scheduler: Arc::new(scheduler),
        }
    }

    pub fn polling_registry(&self) -> &PollingRegistry {
        &self.registry
    }

    /// 关闭轮询调度器，所有进行中的轮询以取消结束
    pub fn shutdown(&self) {
        info!("⏹ 关闭轮询调度器，进行中的轮询: {}", self.registry.len());
        self.scheduler.shutdown();
    }

    async fn session(&self) -> AppResult<Session> {
        self.sessions.get_session().await
    }

    // ========== 文档 ==========

    /// 上传一个部分文档（单页）
    ///
    /// 上传类型为 `partial+<子类型>`，文件名和类型提示原样透传，
    /// 元数据作为 `X-Document-Metadata-*` 请求头发送。
    pub async fn create_partial_document(
        &self,
        data: &[u8],
        content_type: &str,
        filename: Option<&str>,
        document_type: Option<DocumentType>,
        metadata: Option<&DocumentMetadata>,
    ) -> AppResult<Document> {
        if data.is_empty() {
            return Err(AppError::invalid_argument("data"));
        }
        require("content_type", content_type)?;

        let partial_type = self.config.media_types.partial(content_type);
        info!("📤 上传部分文档: {} ({} 字节)", filename.unwrap_or("-"), data.len());

        self.upload_and_fetch(UploadRequest {
            data,
            content_type: &partial_type,
            filename,
            document_type: document_type.map(DocumentType::api_name),
            metadata,
        })
        .await
    }

    /// 用部分文档组合成一个文档，每页不旋转
    pub async fn create_composite_document(
        &self,
        documents: &[Document],
        document_type: Option<DocumentType>,
    ) -> AppResult<Document> {
        let pages: Vec<(&Document, i32)> = documents.iter().map(|document| (document, 0)).collect();
        self.create_composite_document_with_rotation(&pages, document_type)
            .await
    }

    /// 用部分文档组合成一个文档
    ///
    /// 页面顺序与 `pages` 一致，旋转角度规范化为 {0, 90, 180, 270}。
    /// 不是 90 的整数倍的角度返回 `InvalidArgument`，不发起任何请求。
    pub async fn create_composite_document_with_rotation(
        &self,
        pages: &[(&Document, i32)],
        document_type: Option<DocumentType>,
    ) -> AppResult<Document> {
        if pages.is_empty() {
            return Err(AppError::invalid_argument("pages"));
        }
        let body = serde_json::to_vec(&composite_document_body(pages)?)?;
        let composite_type = self.config.media_types.composite();
        info!("📎 组合 {} 个部分文档", pages.len());

        self.upload_and_fetch(UploadRequest {
            data: &body,
            content_type: &composite_type,
            filename: None,
            document_type: document_type.map(DocumentType::api_name),
            metadata: None,
        })
        .await
    }

    async fn upload_and_fetch(&self, request: UploadRequest<'_>) -> AppResult<Document> {
        let session = self.session().await?;
        let location = self.transport.upload_document(request, &session).await?;
        debug!("文档已创建: {}", location);

        let response = self
            .transport
            .get_document(&DocumentLocator::uri(location), &session)
            .await?;
        let document = mapper::document_from_response(&response)?;
        info!("✓ 文档创建成功 {}", document);
        Ok(document)
    }

    /// 获取文档（按 ID 或资源地址）
    pub async fn get_document(&self, locator: &DocumentLocator) -> AppResult<Document> {
        if locator.is_empty() {
            return Err(AppError::invalid_argument("locator"));
        }
        let session = self.session().await?;
        let response = self.transport.get_document(locator, &session).await?;
        mapper::document_from_response(&response)
    }

    /// 轮询文档直到处理结束
    ///
    /// 文档不是 PENDING 时立即返回原文档，不访问网络。
    /// 否则在调度器上循环获取文档：每次获取前检查取消标记，
    /// 仍是 PENDING 就等待一个轮询间隔后重试。服务端返回的 ERROR
    /// 也是正常结束；只有传输错误和取消会让轮询失败。
    pub fn poll_document(&self, document: &Document) -> PollHandle {
        if !document.state.is_pending() {
            debug!("{} 已是终态，无需轮询", document);
            return PollHandle::ready(document.clone());
        }

        let token = self.registry.register(&document.id);
        info!(
            "🔄 开始轮询文档 {} (该文档进行中的轮询: {})",
            document.id,
            self.registry.active_polls(&document.id)
        );

        let this = self.clone();
        let poll_token = token.clone();
        let handle = self.scheduler.spawn(async move {
            let result = this.poll_until_processed(&poll_token).await;
            this.registry.clear(&poll_token);
            result
        });
        PollHandle::spawned(token, handle)
    }

    async fn poll_until_processed(&self, token: &PollToken) -> AppResult<Document> {
        let document_id = token.document_id();
        let locator = DocumentLocator::id(document_id);
        let mut attempts: u32 = 0;

        loop {
            if token.is_cancelled() || self.scheduler.is_shut_down() {
                warn!("⏹ 文档 {} 的轮询已取消", document_id);
                return Err(AppError::Cancelled {
                    document_id: document_id.to_string(),
                });
            }
            if let Some(max_attempts) = self.config.max_poll_attempts {
                if attempts >= max_attempts {
                    warn!("文档 {} 在 {} 次轮询后仍在处理中", document_id, attempts);
                    return Err(AppError::PollingLimitReached {
                        document_id: document_id.to_string(),
                        attempts,
                    });
                }
            }
            attempts += 1;

            let document = self.get_document(&locator).await?;
            if !document.state.is_pending() {
                info!("✓ 文档处理结束 {} (第 {} 次轮询)", document, attempts);
                return Ok(document);
            }

            debug!(
                "文档 {} 仍在处理中，{:?} 后重试",
                document_id, self.config.polling_interval
            );
            self.scheduler.wait(self.config.polling_interval).await;
        }
    }

    /// 取消文档所有进行中的轮询，只影响该文档
    ///
    /// 只设置取消标记，不会中断正在进行的请求；之后新开始的轮询不受影响
    pub fn cancel_document_polling(&self, document: &Document) {
        if self.registry.cancel(&document.id) {
            info!("已请求取消文档 {} 的轮询", document.id);
        } else {
            debug!("文档 {} 没有进行中的轮询", document.id);
        }
    }

    /// 轮询到终态后获取全部提取结果
    ///
    /// 在轮询结束前丢弃返回的 future 只会取消这次调用开始的轮询
    pub async fn poll_and_get_extractions(&self, document: &Document) -> AppResult<ExtractionsContainer> {
        let handle = self.poll_document(document);
        let guard = CancelOnDrop {
            token: handle.token().cloned(),
        };
        let polled = handle.await?;
        guard.disarm();
        self.get_all_extractions(&polled).await
    }

    /// 删除部分文档及包含它的所有组合文档
    ///
    /// 先按顺序逐个删除组合文档，最后删除部分文档本身。
    /// 任一步失败立即返回，已完成的删除不会回滚。
    pub async fn delete_partial_document_and_parents(&self, document_id: &str) -> AppResult<()> {
        require("document_id", document_id)?;
        let session = self.session().await?;
        let locator = DocumentLocator::id(document_id);

        let response = self.transport.get_document(&locator, &session).await?;
        let document = mapper::document_from_response(&response)?;

        for (index, parent) in document.composite_documents.iter().enumerate() {
            debug!(
                "🗑 删除组合文档 {}/{}: {}",
                index + 1,
                document.composite_documents.len(),
                parent
            );
            let parent_locator = DocumentLocator::uri(parent.clone());
            if let Err(e) = self.transport.delete_document(&parent_locator, &session).await {
                warn!("删除组合文档 {} 失败，停止级联删除: {}", parent, e);
                return Err(e);
            }
        }

        self.transport.delete_document(&locator, &session).await?;
        info!(
            "🗑 已删除部分文档 {} 及 {} 个组合文档",
            document_id,
            document.composite_documents.len()
        );
        Ok(())
    }

    /// 删除单个文档，不级联
    pub async fn delete_document(&self, locator: &DocumentLocator) -> AppResult<()> {
        if locator.is_empty() {
            return Err(AppError::invalid_argument("locator"));
        }
        let session = self.session().await?;
        self.transport.delete_document(locator, &session).await?;
        info!("🗑 已删除文档 {}", locator);
        Ok(())
    }

    // ========== 提取结果 ==========

    pub async fn get_all_extractions(&self, document: &Document) -> AppResult<ExtractionsContainer> {
        require("document.id", &document.id)?;
        let session = self.session().await?;
        let response = self.transport.get_extractions(&document.id, &session).await?;
        let container = mapper::extractions_container_from_response(&response)?;
        debug!(
            "文档 {} 的提取结果: {} 个具名, {} 个表格, {} 个退货原因",
            document.id,
            container.specific_extractions.len(),
            container.compound_extractions.len(),
            container.return_reasons.len()
        );
        Ok(container)
    }

    /// 提交修改过的提取结果
    ///
    /// 只发送 dirty 的条目。提交成功后直接清除调用方传入对象的
    /// dirty 标记，之后刷新文档失败也不会恢复，最后返回刷新后的文档。
    pub async fn send_feedback_for_extractions(
        &self,
        document: &Document,
        specific_extractions: &mut HashMap<String, SpecificExtraction>,
        compound_extractions: &mut HashMap<String, CompoundExtraction>,
    ) -> AppResult<Document> {
        require("document.id", &document.id)?;
        let specific_payload = feedback::specific_feedback(specific_extractions);
        let compound_payload = feedback::compound_feedback(compound_extractions);

        let session = self.session().await?;
        self.transport
            .send_feedback(&document.id, specific_payload, compound_payload, &session)
            .await?;

        let cleared = feedback::mark_submitted(specific_extractions, compound_extractions);
        info!("✓ 已提交文档 {} 的 {} 条反馈", document.id, cleared);

        let response = self
            .transport
            .get_document(&DocumentLocator::id(document.id.as_str()), &session)
            .await?;
        mapper::document_from_response(&response)
    }

    /// 报告文档处理问题，返回服务端的错误报告 ID
    pub async fn report_document(
        &self,
        document: &Document,
        summary: &str,
        description: &str,
    ) -> AppResult<String> {
        require("document.id", &document.id)?;
        require("summary", summary)?;
        require("description", description)?;

        let session = self.session().await?;
        let response = self
            .transport
            .error_report_for_document(&document.id, summary, description, &session)
            .await?;
        let error_id = mapper::error_id_from_response(&response)?;
        info!("已提交文档 {} 的错误报告: {}", document.id, error_id);
        Ok(error_id)
    }

    /// 获取文档版面结构，原样返回
    pub async fn get_layout(&self, document: &Document) -> AppResult<Value> {
        require("document.id", &document.id)?;
        let session = self.session().await?;
        self.transport
            .get_layout_for_document(&document.id, &session)
            .await
    }

    // ========== 支付 ==========

    pub async fn get_payment_providers(&self) -> AppResult<Vec<PaymentProvider>> {
        let session = self.session().await?;
        let response = self.transport.get_payment_providers(&session).await?;
        mapper::payment_providers_from_response(&response)
    }

    pub async fn get_payment_provider(&self, provider_id: &str) -> AppResult<PaymentProvider> {
        require("provider_id", provider_id)?;
        let session = self.session().await?;
        let response = self
            .transport
            .get_payment_provider(provider_id, &session)
            .await?;
        mapper::payment_provider_from_response(&response)
    }

    /// 创建支付请求，返回新支付请求的 ID
    pub async fn create_payment_request(&self, input: &PaymentRequestInput) -> AppResult<String> {
        let body = serde_json::to_value(input)?;
        let session = self.session().await?;
        let location = self.transport.post_payment_request(body, &session).await?;
        let request_id = mapper::payment_request_id_from_location(&location)?;
        info!("✓ 支付请求已创建: {}", request_id);
        Ok(request_id)
    }

    pub async fn get_payment_request(&self, request_id: &str) -> AppResult<PaymentRequest> {
        require("request_id", request_id)?;
        let session = self.session().await?;
        let response = self
            .transport
            .get_payment_request(request_id, &session)
            .await?;
        mapper::payment_request_from_response(&response)
    }

    pub async fn get_payment_requests(&self) -> AppResult<Vec<PaymentRequest>> {
        let session = self.session().await?;
        let response = self.transport.get_payment_requests(&session).await?;
        mapper::payment_requests_from_response(&response)
    }

    /// 完成支付请求，返回该支付请求的 ID
    pub async fn resolve_payment_request(
        &self,
        request_id: &str,
        input: &ResolvePaymentInput,
    ) -> AppResult<String> {
        require("request_id", request_id)?;
        let body = serde_json::to_value(input)?;
        let session = self.session().await?;
        let location = self
            .transport
            .resolve_payment_request(request_id, body, &session)
            .await?;
        mapper::payment_request_id_from_location(&location)
    }

    pub async fn get_payment(&self, request_id: &str) -> AppResult<Payment> {
        require("request_id", request_id)?;
        let session = self.session().await?;
        let response = self.transport.get_payment(request_id, &session).await?;
        mapper::payment_from_response(&response)
    }
}

/// 在 future 被丢弃时取消它自己的那次轮询
struct CancelOnDrop {
    token: Option<PollToken>,
}

impl CancelOnDrop {
    fn disarm(mut self) {
        self.token = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }
}
