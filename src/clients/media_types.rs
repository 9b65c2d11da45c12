/// 服务端使用的厂商媒体类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTypes {
    vendor: String,
    api_version: String,
}

impl MediaTypes {
    pub fn new(vendor: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            api_version: api_version.into(),
        }
    }

    fn prefix(&self) -> String {
        format!("application/vnd.{}.{}", self.vendor, self.api_version)
    }

    /// `application/vnd.<vendor>.<version>+json`
    pub fn json(&self) -> String {
        format!("{}+json", self.prefix())
    }

    /// 部分文档的上传类型，子类型取自原始类型，如 `image/jpeg` -> `partial+jpeg`
    pub fn partial(&self, content_type: &str) -> String {
        format!("{}.partial+{}", self.prefix(), subtype_of(content_type))
    }

    /// `application/vnd.<vendor>.<version>.composite+json`
    pub fn composite(&self) -> String {
        format!("{}.composite+json", self.prefix())
    }
}

/// 取出媒体类型的子类型，去掉参数部分
fn subtype_of(content_type: &str) -> &str {
    let without_params = content_type.split(';').next().unwrap_or(content_type).trim();
    match without_params.split_once('/') {
        Some((_, subtype)) => subtype,
        None => without_params,
    }
}
