//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层是整个客户端的"指挥中心"：组合会话和传输调用，
//! 管理文档轮询的生命周期，并把响应交给映射层。
//!
//! ## 模块划分
//!
//! ### `document_manager` - 文档编排器
//! - 上传部分文档、创建组合文档
//! - 轮询文档处理状态，支持按文档取消
//! - 级联删除部分文档及其父文档
//! - 获取提取结果、提交反馈、错误报告
//! - 支付服务商、支付请求和支付结果
//!
//! ### `scheduler` - 轮询调度器
//! - 运行轮询任务，等待轮询间隔
//! - 明确的启动和关闭
//!
//! ### `polling` - 轮询登记表
//! - 文档 ID -> 取消标记
//!
//! ### `composite` / `feedback` - 请求体构造
//! - 组合文档的页面列表和旋转角度
//! - 只包含 dirty 条目的反馈请求体
//!
//! ## 层次关系
//!
//! ```text
//! app (批量上传 Vec<文件>)
//!     ↓
//! orchestrator::DocumentOrchestrator (单个文档的完整操作)
//!     ↓
//! clients (能力层：Transport / SessionProvider)
//!     ↓
//! mapper (响应映射：JSON -> models)
//! ```

pub mod composite;
pub mod document_manager;
pub mod feedback;
pub mod polling;
pub mod scheduler;

pub use composite::{composite_document_body, normalize_rotation};
pub use document_manager::{DocumentOrchestrator, OrchestratorConfig};
pub use polling::{PollToken, PollingRegistry};
pub use scheduler::{PollHandle, PollScheduler};
