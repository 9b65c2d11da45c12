use crate::clients::MediaTypes;
use crate::error::{AppResult, ConfigError};
use crate::models::DocumentType;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API 根地址
    pub api_base_url: String,
    /// 媒体类型中的厂商名（application/vnd.<vendor>.<version>...）
    pub vendor: String,
    /// API 版本
    pub api_version: String,
    /// 访问令牌
    pub access_token: String,
    /// 访问令牌有效期（秒）
    pub token_lifetime_secs: i64,
    /// 轮询间隔（毫秒）
    pub polling_interval_ms: u64,
    /// 最大轮询次数，None 表示不限
    pub max_poll_attempts: Option<u32>,
    /// 待上传文档所在目录
    pub documents_folder: String,
    /// 文档类型提示
    pub document_type: Option<DocumentType>,
    /// 同时上传的文档数量
    pub max_concurrent_uploads: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://pay-api.gini.net".to_string(),
            vendor: "gini".to_string(),
            api_version: "v1".to_string(),
            access_token: String::new(),
            token_lifetime_secs: 3600,
            polling_interval_ms: 1000,
            max_poll_attempts: None,
            documents_folder: "documents".to_string(),
            document_type: None,
            max_concurrent_uploads: 4,
            verbose_logging: false,
            request_timeout_secs: 60,
        }
    }
}

impl Config {
    /// 默认配置加上环境变量，环境变量无法解析时报错
    pub fn from_env() -> AppResult<Self> {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载配置，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })?;
        Ok(config)
    }

    /// 先读取 `DOCFLOW_CONFIG` 指向的配置文件（如果有），再应用环境变量
    pub fn load() -> AppResult<Self> {
        let base = match std::env::var("DOCFLOW_CONFIG") {
            Ok(path) => Self::from_toml_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        base.with_env_overrides()
    }

    fn with_env_overrides(self) -> AppResult<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(self, lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let text = |name: &str, current: String| lookup(name).unwrap_or(current);
        Ok(Self {
            api_base_url: text("DOCFLOW_API_BASE_URL", self.api_base_url),
            vendor: text("DOCFLOW_VENDOR", self.vendor),
            api_version: text("DOCFLOW_API_VERSION", self.api_version),
            access_token: text("DOCFLOW_ACCESS_TOKEN", self.access_token),
            token_lifetime_secs: parsed(&lookup, "DOCFLOW_TOKEN_LIFETIME_SECS", "i64")?
                .unwrap_or(self.token_lifetime_secs),
            polling_interval_ms: parsed(&lookup, "DOCFLOW_POLLING_INTERVAL_MS", "u64")?
                .unwrap_or(self.polling_interval_ms),
            max_poll_attempts: parsed(&lookup, "DOCFLOW_MAX_POLL_ATTEMPTS", "u32")?
                .or(self.max_poll_attempts),
            documents_folder: text("DOCFLOW_DOCUMENTS_FOLDER", self.documents_folder),
            document_type: parsed(&lookup, "DOCFLOW_DOCUMENT_TYPE", "DocumentType")?
                .or(self.document_type),
            max_concurrent_uploads: parsed(&lookup, "DOCFLOW_MAX_CONCURRENT_UPLOADS", "usize")?
                .unwrap_or(self.max_concurrent_uploads),
            verbose_logging: parsed(&lookup, "DOCFLOW_VERBOSE_LOGGING", "bool")?
                .unwrap_or(self.verbose_logging),
            request_timeout_secs: parsed(&lookup, "DOCFLOW_REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.request_timeout_secs),
        })
    }

    pub fn media_types(&self) -> MediaTypes {
        MediaTypes::new(&self.vendor, &self.api_version)
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms)
    }
}

/// 读取并解析一个环境变量，未设置时返回 None
fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    expected_type: &str,
) -> AppResult<Option<T>> {
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }
            .into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_toml_overrides_only_given_fields() {
        let config: Config = toml::from_str(
            r#"
            api_base_url = "https://api.example.com"
            polling_interval_ms = 250
            max_poll_attempts = 30
            document_type = "Invoice"
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.polling_interval(), Duration::from_millis(250));
        assert_eq!(config.max_poll_attempts, Some(30));
        assert_eq!(config.document_type, Some(DocumentType::Invoice));
        assert_eq!(config.vendor, "gini");
        assert_eq!(config.max_concurrent_uploads, 4);
    }

    #[test]
    fn test_default_polling_is_unbounded() {
        let config = Config::default();
        assert_eq!(config.max_poll_attempts, None);
        assert_eq!(config.media_types().composite(), "application/vnd.gini.v1.composite+json");
    }

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: std::collections::HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_env_overrides_apply_on_top_of_base() {
        let config = Config::default()
            .with_overrides(lookup_from(&[
                ("DOCFLOW_API_BASE_URL", "https://api.example.com"),
                ("DOCFLOW_MAX_POLL_ATTEMPTS", "12"),
                ("DOCFLOW_DOCUMENT_TYPE", "remittance_slip"),
                ("DOCFLOW_VERBOSE_LOGGING", "true"),
            ]))
            .unwrap();

        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.max_poll_attempts, Some(12));
        assert_eq!(config.document_type, Some(DocumentType::RemittanceSlip));
        assert!(config.verbose_logging);
        assert_eq!(config.polling_interval_ms, 1000);
    }

    #[test]
    fn test_unparsable_env_value_is_an_error() {
        let result = Config::default().with_overrides(lookup_from(&[(
            "DOCFLOW_POLLING_INTERVAL_MS",
            "fast",
        )]));

        match result {
            Err(AppError::Config(ConfigError::EnvVarParseFailed {
                var_name,
                value,
                expected_type,
            })) => {
                assert_eq!(var_name, "DOCFLOW_POLLING_INTERVAL_MS");
                assert_eq!(value, "fast");
                assert_eq!(expected_type, "u64");
            }
            other => panic!("期望环境变量解析错误, 实际: {:?}", other),
        }
    }
}
