//! 轮询调度器
//!
//! 由编排器实例持有，负责运行轮询任务、等待轮询间隔，
//! 并提供明确的关闭入口。

use crate::error::{AppError, AppResult};
use crate::models::Document;
use crate::orchestrator::polling::PollToken;
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// 轮询调度器
pub struct PollScheduler {
    runtime: Handle,
    shutdown_tx: watch::Sender<bool>,
}

impl PollScheduler {
    /// 在给定的 tokio 运行时上启动调度器
    pub fn start(runtime: Handle) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            runtime,
            shutdown_tx,
        }
    }

    /// 在当前 tokio 运行时上启动调度器
    pub fn start_on_current() -> AppResult<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| AppError::Other(format!("当前线程没有 tokio 运行时: {}", e)))?;
        Ok(Self::start(runtime))
    }

    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.runtime.spawn(future)
    }

    /// 关闭调度器：正在等待的轮询立即醒来，并在下一步以取消结束
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// 等待一个轮询间隔；调度器在等待期间关闭时返回 `true`
    pub async fn wait(&self, interval: Duration) -> bool {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        if *shutdown_rx.borrow() {
            return true;
        }
        tokio::select! {
            _ = tokio::time::sleep(interval) => false,
            _ = shutdown_rx.wait_for(|stopped| *stopped) => true,
        }
    }
}

/// 一次文档轮询的结果句柄
///
/// 解析为轮询到的终态文档、传输错误，或 `AppError::Cancelled`。
/// 丢弃句柄不会停止轮询，需调用 `cancel` 或 `cancel_document_polling`。
pub struct PollHandle {
    document_id: String,
    token: Option<PollToken>,
    inner: BoxFuture<'static, AppResult<Document>>,
}

impl PollHandle {
    /// 文档已是终态，直接返回
    pub(crate) fn ready(document: Document) -> Self {
        Self {
            document_id: document.id.clone(),
            token: None,
            inner: futures::future::ready(Ok(document)).boxed(),
        }
    }

    pub(crate) fn spawned(token: PollToken, handle: JoinHandle<AppResult<Document>>) -> Self {
        let document_id = token.document_id().to_string();
        let id = document_id.clone();
        let inner = async move {
            match handle.await {
                Ok(result) => result,
                Err(e) if e.is_cancelled() => Err(AppError::Cancelled { document_id: id }),
                Err(e) => Err(AppError::Other(format!("文档 {} 的轮询任务异常退出: {}", id, e))),
            }
        }
        .boxed();
        Self {
            document_id,
            token: Some(token),
            inner,
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// 只取消这一次轮询，同一文档的其他轮询不受影响
    pub fn cancel(&self) {
        if let Some(token) = &self.token {
            token.cancel();
        }
    }

    pub(crate) fn token(&self) -> Option<&PollToken> {
        self.token.as_ref()
    }
}

impl Future for PollHandle {
    type Output = AppResult<Document>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}
