use chrono::{DateTime, Utc};

/// 文档处理状态
///
/// 只会从 `Pending` 迁移到某个终态，不会回退
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProcessingState {
    /// 处理中
    Pending,
    /// 处理完成
    Completed,
    /// 服务端处理失败（对轮询而言仍是正常结束）
    Error,
    /// 服务端返回的其他终态
    Other(String),
}

impl ProcessingState {
    pub fn from_api(value: &str) -> Self {
        match value {
            "PENDING" => ProcessingState::Pending,
            "COMPLETED" => ProcessingState::Completed,
            "ERROR" => ProcessingState::Error,
            other => ProcessingState::Other(other.to_string()),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ProcessingState::Pending)
    }
}

impl std::fmt::Display for ProcessingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingState::Pending => write!(f, "PENDING"),
            ProcessingState::Completed => write!(f, "COMPLETED"),
            ProcessingState::Error => write!(f, "ERROR"),
            ProcessingState::Other(value) => write!(f, "{}", value),
        }
    }
}

/// 文档来源分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceClassification {
    /// 原生电子文档
    Native,
    /// 扫描件
    Scanned,
    /// 带文本层的扫描件
    Sandwich,
    /// 由多个部分文档组合而成
    Composite,
    /// 纯文本
    Text,
    #[serde(other)]
    Unknown,
}

/// 服务端文档
///
/// 只能由响应映射器根据服务端响应创建，`id` 一经分配不再改变
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub state: ProcessingState,
    pub filename: String,
    pub page_count: u32,
    pub creation_date: DateTime<Utc>,
    pub source_classification: SourceClassification,
    /// 文档自身的资源地址
    pub uri: String,
    /// 包含本文档的组合文档地址（按服务端顺序）
    pub composite_documents: Vec<String>,
    /// 组成本文档的部分文档地址（按组合顺序）
    pub partial_documents: Vec<String>,
}

impl Document {
    pub fn is_composite(&self) -> bool {
        !self.partial_documents.is_empty()
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[文档 {} {} ({})]", self.id, self.filename, self.state)
    }
}
