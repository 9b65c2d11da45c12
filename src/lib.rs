//! # Docflow
//!
//! 文档分析与支付 API 的异步客户端编排层
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 领域模型（Models）
//! - `models/` - 文档、提取结果、支付相关的类型
//!
//! ### ② 能力层（Clients）
//! - `clients/` - 描述"我能访问什么"，每个方法一次网络往返
//! - `Transport` - 传输层接口，`HttpTransport` 为 reqwest 实现
//! - `SessionProvider` - 会话获取
//!
//! ### ③ 映射层（Mapper）
//! - `mapper/` - 纯函数，原始 JSON -> 领域模型
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/DocumentOrchestrator` - 组合调用顺序，管理轮询和取消
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod mapper;
pub mod models;
pub mod orchestrator;
pub mod utils;

// 重新导出常用类型
pub use clients::{
    DocumentLocator, DocumentMetadata, HttpTransport, Session, SessionProvider,
    StaticSessionProvider, Transport,
};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{
    CompoundExtraction, Document, DocumentType, ExtractionsContainer, ProcessingState,
    SpecificExtraction,
};
pub use orchestrator::{
    DocumentOrchestrator, OrchestratorConfig, PollHandle, PollScheduler, PollToken,
};
