use serde::Serialize;

/// 支付服务商（集成了支付 SDK 的银行应用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentProvider {
    pub id: String,
    pub name: String,
    /// 最低要求的应用版本
    pub app_version: String,
}

/// 支付请求状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentRequestStatus {
    Open,
    Paid,
    Other(String),
}

impl PaymentRequestStatus {
    pub fn from_api(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "open" => PaymentRequestStatus::Open,
            "paid" => PaymentRequestStatus::Paid,
            _ => PaymentRequestStatus::Other(value.to_string()),
        }
    }
}

/// 支付请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    /// 支付服务商 ID
    pub payment_provider: String,
    pub recipient: String,
    pub iban: String,
    pub bic: String,
    /// 金额与币种，如 `335.50:EUR`
    pub amount: String,
    pub purpose: String,
    pub status: PaymentRequestStatus,
}

/// 已完成的支付
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub paid_at: String,
    pub recipient: String,
    pub iban: String,
    pub bic: String,
    pub amount: String,
    pub purpose: String,
}

/// 创建支付请求的请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequestInput {
    pub payment_provider: String,
    pub recipient: String,
    pub iban: String,
    pub bic: String,
    pub amount: String,
    pub purpose: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_document_location: Option<String>,
}

/// 完成（解析）支付请求的请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvePaymentInput {
    pub recipient: String,
    pub iban: String,
    pub bic: String,
    pub amount: String,
    pub purpose: String,
}
