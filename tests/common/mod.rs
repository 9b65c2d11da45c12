//! 集成测试共用的内存传输层和会话提供者

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use docflow::clients::{DocumentLocator, Session, SessionProvider, Transport, UploadRequest};
use docflow::error::{AppError, AppResult, SessionError};
use docflow::mapper::document_from_response;
use docflow::models::Document;
use docflow::orchestrator::{DocumentOrchestrator, OrchestratorConfig, PollScheduler};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE_URL: &str = "https://pay-api.gini.net";

pub type TestOrchestrator = DocumentOrchestrator<MockTransport, MockSessionProvider>;

/// 按模板生成文档响应
pub fn document_json(id: &str, progress: &str) -> Value {
    let raw = include_str!("../fixtures/document-template.json")
        .replace("${id}", id)
        .replace("${progress}", progress);
    serde_json::from_str(&raw).unwrap()
}

pub fn document(id: &str, progress: &str) -> Document {
    document_from_response(&document_json(id, progress)).unwrap()
}

pub fn fixture(content: &str) -> Value {
    serde_json::from_str(content).unwrap()
}

/// 一次上传请求的记录
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub data: Vec<u8>,
    pub content_type: String,
    pub filename: Option<String>,
    pub document_type: Option<String>,
    pub metadata: Vec<(String, String)>,
}

/// 一次反馈请求的记录
#[derive(Debug, Clone)]
pub struct RecordedFeedback {
    pub document_id: String,
    pub specific: Value,
    pub compound: Value,
}

/// 内存传输层
///
/// 记录每次调用；文档状态按 ID 预先编排，队列只剩一个状态时一直返回该状态。
#[derive(Default)]
pub struct MockTransport {
    calls: Mutex<Vec<String>>,
    states: Mutex<HashMap<String, VecDeque<String>>>,
    upload_ids: Mutex<VecDeque<String>>,
    failing_gets: Mutex<HashSet<String>>,
    failing_deletes: Mutex<HashSet<String>>,
    failing_feedback: Mutex<bool>,
    uploads: Mutex<Vec<RecordedUpload>>,
    feedback: Mutex<Vec<RecordedFeedback>>,
    payment_bodies: Mutex<Vec<Value>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 依次返回给定的处理状态
    pub fn script_states(&self, document_id: &str, states: &[&str]) {
        self.states.lock().unwrap().insert(
            document_id.to_string(),
            states.iter().map(|state| state.to_string()).collect(),
        );
    }

    /// 下一次上传返回的文档 ID
    pub fn queue_upload_id(&self, document_id: &str) {
        self.upload_ids
            .lock()
            .unwrap()
            .push_back(document_id.to_string());
    }

    pub fn fail_get(&self, document_id: &str) {
        self.failing_gets
            .lock()
            .unwrap()
            .insert(document_id.to_string());
    }

    pub fn fail_delete(&self, locator: &str) {
        self.failing_deletes
            .lock()
            .unwrap()
            .insert(locator.to_string());
    }

    /// 之后的反馈请求都返回服务端错误
    pub fn fail_feedback(&self) {
        *self.failing_feedback.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn feedback(&self) -> Vec<RecordedFeedback> {
        self.feedback.lock().unwrap().clone()
    }

    pub fn payment_bodies(&self) -> Vec<Value> {
        self.payment_bodies.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_state(&self, document_id: &str) -> String {
        let mut states = self.states.lock().unwrap();
        match states.get_mut(document_id) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or_else(|| "COMPLETED".to_string()),
            None => "COMPLETED".to_string(),
        }
    }
}

fn id_of(locator: &DocumentLocator) -> String {
    match locator {
        DocumentLocator::Id(id) => id.clone(),
        DocumentLocator::Uri(uri) => uri.rsplit('/').next().unwrap_or_default().to_string(),
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn upload_document(&self, request: UploadRequest<'_>, _session: &Session) -> AppResult<String> {
        self.record(format!("upload_document {}", request.content_type));
        self.uploads.lock().unwrap().push(RecordedUpload {
            data: request.data.to_vec(),
            content_type: request.content_type.to_string(),
            filename: request.filename.map(str::to_string),
            document_type: request.document_type.map(str::to_string),
            metadata: request
                .metadata
                .map(|metadata| {
                    metadata
                        .headers()
                        .map(|(name, value)| (name.to_string(), value.to_string()))
                        .collect()
                })
                .unwrap_or_default(),
        });
        let id = self
            .upload_ids
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "new-document".to_string());
        Ok(format!("{}/documents/{}", BASE_URL, id))
    }

    async fn get_document(&self, locator: &DocumentLocator, _session: &Session) -> AppResult<Value> {
        self.record(format!("get_document {}", locator));
        let id = id_of(locator);
        if self.failing_gets.lock().unwrap().contains(&id) {
            return Err(AppError::bad_response(locator.as_str(), 500, None));
        }
        let state = self.next_state(&id);
        Ok(document_json(&id, &state))
    }

    async fn delete_document(&self, locator: &DocumentLocator, _session: &Session) -> AppResult<()> {
        self.record(format!("delete_document {}", locator));
        if self.failing_deletes.lock().unwrap().contains(locator.as_str()) {
            return Err(AppError::bad_response(locator.as_str(), 404, Some("not found".to_string())));
        }
        Ok(())
    }

    async fn get_extractions(&self, document_id: &str, _session: &Session) -> AppResult<Value> {
        self.record(format!("get_extractions {}", document_id));
        Ok(fixture(include_str!("../fixtures/extractions.json")))
    }

    async fn send_feedback(
        &self,
        document_id: &str,
        specific: Value,
        compound: Value,
        _session: &Session,
    ) -> AppResult<Value> {
        self.record(format!("send_feedback {}", document_id));
        if *self.failing_feedback.lock().unwrap() {
            return Err(AppError::bad_response(
                format!("{}/documents/{}/extractions/feedback", BASE_URL, document_id),
                503,
                None,
            ));
        }
        self.feedback.lock().unwrap().push(RecordedFeedback {
            document_id: document_id.to_string(),
            specific,
            compound,
        });
        Ok(Value::Null)
    }

    async fn error_report_for_document(
        &self,
        document_id: &str,
        summary: &str,
        description: &str,
        _session: &Session,
    ) -> AppResult<Value> {
        self.record(format!("error_report {} {} {}", document_id, summary, description));
        Ok(json!({ "errorId": "e1b2c3d4" }))
    }

    async fn get_layout_for_document(&self, document_id: &str, _session: &Session) -> AppResult<Value> {
        self.record(format!("get_layout {}", document_id));
        Ok(fixture(include_str!("../fixtures/layout.json")))
    }

    async fn get_payment_providers(&self, _session: &Session) -> AppResult<Value> {
        self.record("get_payment_providers".to_string());
        Ok(fixture(include_str!("../fixtures/payment-providers.json")))
    }

    async fn get_payment_provider(&self, provider_id: &str, _session: &Session) -> AppResult<Value> {
        self.record(format!("get_payment_provider {}", provider_id));
        Ok(fixture(include_str!("../fixtures/payment-provider.json")))
    }

    async fn post_payment_request(&self, body: Value, _session: &Session) -> AppResult<String> {
        self.record("post_payment_request".to_string());
        self.payment_bodies.lock().unwrap().push(body);
        Ok(format!("{}/paymentRequests/a6466506-acf1-4896-94c8-9b398d4e0ee1", BASE_URL))
    }

    async fn get_payment_request(&self, request_id: &str, _session: &Session) -> AppResult<Value> {
        self.record(format!("get_payment_request {}", request_id));
        Ok(fixture(include_str!("../fixtures/payment-request.json")))
    }

    async fn get_payment_requests(&self, _session: &Session) -> AppResult<Value> {
        self.record("get_payment_requests".to_string());
        Ok(fixture(include_str!("../fixtures/payment-requests.json")))
    }

    async fn resolve_payment_request(
        &self,
        request_id: &str,
        body: Value,
        _session: &Session,
    ) -> AppResult<String> {
        self.record(format!("resolve_payment_request {}", request_id));
        self.payment_bodies.lock().unwrap().push(body);
        Ok(format!("{}/paymentRequests/{}/payment", BASE_URL, request_id))
    }

    async fn get_payment(&self, request_id: &str, _session: &Session) -> AppResult<Value> {
        self.record(format!("get_payment {}", request_id));
        Ok(fixture(include_str!("../fixtures/payment.json")))
    }
}

/// 计数的会话提供者，可设置为总是失败
#[derive(Default)]
pub struct MockSessionProvider {
    requests: AtomicUsize,
    fail: bool,
}

impl MockSessionProvider {
    pub fn failing() -> Self {
        Self {
            requests: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProvider for MockSessionProvider {
    async fn get_session(&self) -> AppResult<Session> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SessionError::MissingToken.into());
        }
        Ok(Session::new("test-token", Utc::now() + ChronoDuration::hours(1)))
    }
}

pub fn test_config() -> OrchestratorConfig {
    OrchestratorConfig {
        polling_interval: Duration::from_millis(10),
        ..OrchestratorConfig::default()
    }
}

pub fn orchestrator_with(
    config: OrchestratorConfig,
    sessions: MockSessionProvider,
) -> (TestOrchestrator, Arc<MockTransport>, Arc<MockSessionProvider>) {
    let transport = Arc::new(MockTransport::new());
    let sessions = Arc::new(sessions);
    let scheduler = PollScheduler::start_on_current().unwrap();
    let orchestrator =
        DocumentOrchestrator::new(config, transport.clone(), sessions.clone(), scheduler);
    (orchestrator, transport, sessions)
}

pub fn orchestrator() -> (TestOrchestrator, Arc<MockTransport>, Arc<MockSessionProvider>) {
    orchestrator_with(test_config(), MockSessionProvider::default())
}
