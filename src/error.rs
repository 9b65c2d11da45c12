use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 必填参数缺失（在任何异步操作开始之前抛出）
    #[error("参数缺失: {argument}")]
    InvalidArgument { argument: &'static str },
    /// API 调用错误（由传输层原样转发）
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 会话错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 响应映射错误
    #[error("响应映射错误: {0}")]
    Mapping(#[from] MappingError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文档轮询被取消
    #[error("文档 {document_id} 的轮询已取消")]
    Cancelled { document_id: String },
    /// 文档轮询达到最大次数仍未完成
    #[error("文档 {document_id} 在 {attempts} 次轮询后仍在处理中")]
    PollingLimitReached { document_id: String, attempts: u32 },
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 返回错误响应
    #[error("API返回错误响应 ({endpoint}): status={status}, message={message:?}")]
    BadResponse {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    /// 创建资源的响应中缺少 Location
    #[error("API响应缺少 Location ({endpoint})")]
    MissingLocation { endpoint: String },
    /// JSON 解析失败
    #[error("JSON解析失败: {source}")]
    JsonParseFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 会话错误
#[derive(Debug, Error)]
pub enum SessionError {
    /// 没有可用的访问令牌
    #[error("没有可用的访问令牌")]
    MissingToken,
    /// 会话已过期
    #[error("会话已于 {expired_at} 过期")]
    Expired { expired_at: String },
}

/// 响应映射错误
#[derive(Debug, Error)]
pub enum MappingError {
    /// 必需字段缺失
    #[error("响应缺少字段: {field}")]
    MissingField { field: String },
    /// 字段值无效
    #[error("字段 {field} 的值无效: {value}")]
    InvalidValue { field: String, value: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// API 根地址无效
    #[error("无效的 API 根地址 '{value}': {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err
            .url()
            .map(|url| url.path().to_string())
            .unwrap_or_default();
        AppError::Api(ApiError::RequestFailed {
            endpoint,
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(ConfigError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: err,
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Config(ConfigError::ReadFailed {
            path: String::new(),
            source: err,
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建参数缺失错误
    pub fn invalid_argument(argument: &'static str) -> Self {
        AppError::InvalidArgument { argument }
    }

    /// 创建API错误响应
    pub fn bad_response(endpoint: impl Into<String>, status: u16, message: Option<String>) -> Self {
        AppError::Api(ApiError::BadResponse {
            endpoint: endpoint.into(),
            status,
            message,
        })
    }

    /// 创建字段缺失错误
    pub fn missing_field(field: impl Into<String>) -> Self {
        AppError::Mapping(MappingError::MissingField {
            field: field.into(),
        })
    }

    /// 创建字段值无效错误
    pub fn invalid_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        AppError::Mapping(MappingError::InvalidValue {
            field: field.into(),
            value: value.into(),
        })
    }

    /// 轮询是否因取消而结束
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::Cancelled { .. })
    }
}

/// 检查必填字符串参数
pub(crate) fn require(argument: &'static str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_argument(argument));
    }
    Ok(())
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
