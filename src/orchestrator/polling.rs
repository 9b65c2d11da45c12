//! 轮询登记表
//!
//! 文档 ID -> 该文档所有进行中轮询的取消令牌。所有读写都经过同一个
//! 并发安全的 map，按文档的稳定 ID 区分，不依赖对象身份。
//! 同一文档可以同时有多个轮询，每个轮询只移除自己的令牌。

use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 单个轮询的取消令牌
#[derive(Debug, Clone)]
pub struct PollToken {
    document_id: String,
    cancelled: Arc<AtomicBool>,
}

impl PollToken {
    fn new(document_id: &str) -> Self {
        Self {
            document_id: document_id.to_string(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// 只取消这一个轮询
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn same_poll(&self, other: &PollToken) -> bool {
        Arc::ptr_eq(&self.cancelled, &other.cancelled)
    }
}

#[derive(Debug, Default)]
pub struct PollingRegistry {
    polls: DashMap<String, Vec<PollToken>>,
}

impl PollingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一个新的轮询，返回它自己的令牌（初始为未取消）
    pub fn register(&self, document_id: &str) -> PollToken {
        let token = PollToken::new(document_id);
        self.polls
            .entry(document_id.to_string())
            .or_default()
            .push(token.clone());
        token
    }

    /// 取消该文档所有进行中的轮询；返回该文档是否在轮询中
    ///
    /// 之后新开始的轮询不受影响
    pub fn cancel(&self, document_id: &str) -> bool {
        match self.polls.get(document_id) {
            Some(tokens) => {
                tokens.iter().for_each(PollToken::cancel);
                !tokens.is_empty()
            }
            None => false,
        }
    }

    pub fn is_registered(&self, document_id: &str) -> bool {
        self.polls.contains_key(document_id)
    }

    /// 该文档进行中的轮询数量
    pub fn active_polls(&self, document_id: &str) -> usize {
        self.polls
            .get(document_id)
            .map(|tokens| tokens.len())
            .unwrap_or(0)
    }

    /// 轮询结束后移除它自己的令牌，文档没有其他轮询时移除整个登记
    pub fn clear(&self, token: &PollToken) {
        let now_empty = match self.polls.get_mut(token.document_id()) {
            Some(mut tokens) => {
                tokens.retain(|existing| !existing.same_poll(token));
                tokens.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.polls
                .remove_if(token.document_id(), |_, tokens| tokens.is_empty());
        }
    }

    /// 正在轮询的文档数量
    pub fn len(&self) -> usize {
        self.polls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polls.is_empty()
    }
}
