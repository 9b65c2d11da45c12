//! 上传文档时附带的元数据
//!
//! 每一项作为一个 `X-Document-Metadata-*` 请求头随上传请求发送。

use crate::error::{AppError, AppResult};
use reqwest::header::{HeaderName, HeaderValue};

const BRANCH_ID_HEADER: &str = "X-Document-Metadata-Branch-Id";
const CUSTOM_PREFIX: &str = "X-Document-Metadata-Custom-";

/// 文档元数据，请求头名 -> 值，按添加顺序发送
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMetadata {
    headers: Vec<(String, String)>,
}

impl DocumentMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置分支 ID（如门店或部门编号）
    pub fn set_branch_id(&mut self, branch_id: &str) -> AppResult<()> {
        self.insert(BRANCH_ID_HEADER.to_string(), branch_id)
    }

    /// 添加自定义元数据，请求头为 `X-Document-Metadata-Custom-<name>`
    ///
    /// 名称和值都必须是合法的 HTTP 头内容，否则返回 `InvalidArgument`。
    pub fn add(&mut self, name: &str, value: &str) -> AppResult<()> {
        if name.trim().is_empty() {
            return Err(AppError::invalid_argument("metadata.name"));
        }
        self.insert(format!("{}{}", CUSTOM_PREFIX, name), value)
    }

    fn insert(&mut self, header: String, value: &str) -> AppResult<()> {
        if HeaderName::from_bytes(header.as_bytes()).is_err() {
            return Err(AppError::invalid_argument("metadata.name"));
        }
        if value.trim().is_empty() || HeaderValue::from_str(value).is_err() {
            return Err(AppError::invalid_argument("metadata.value"));
        }
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&header))
        {
            Some((_, existing_value)) => *existing_value = value.to_string(),
            None => self.headers.push((header, value.to_string())),
        }
        Ok(())
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_id_and_custom_headers() {
        let mut metadata = DocumentMetadata::new();
        metadata.set_branch_id("filiale-7").unwrap();
        metadata.add("Customer", "4711").unwrap();

        let headers: Vec<_> = metadata.headers().collect();
        assert_eq!(
            headers,
            vec![
                ("X-Document-Metadata-Branch-Id", "filiale-7"),
                ("X-Document-Metadata-Custom-Customer", "4711"),
            ]
        );
    }

    #[test]
    fn test_setting_same_header_replaces_value() {
        let mut metadata = DocumentMetadata::new();
        metadata.set_branch_id("a").unwrap();
        metadata.set_branch_id("b").unwrap();
        assert_eq!(
            metadata.headers().collect::<Vec<_>>(),
            vec![("X-Document-Metadata-Branch-Id", "b")]
        );
    }

    #[test]
    fn test_invalid_header_content_is_rejected() {
        let mut metadata = DocumentMetadata::new();
        assert!(metadata.add("bad name", "value").is_err());
        assert!(metadata.add("Customer", "line\nbreak").is_err());
        assert!(metadata.add("", "value").is_err());
        assert!(metadata.set_branch_id(" ").is_err());
        assert!(metadata.is_empty());
    }
}
