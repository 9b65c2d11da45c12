use crate::error::{AppError, AppResult};
use crate::models::{Payment, PaymentProvider, PaymentRequest, PaymentRequestStatus};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentProviderResponse {
    id: String,
    name: String,
    min_app_version: AppVersionResponse,
}

#[derive(Debug, Deserialize)]
struct AppVersionResponse {
    android: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentRequestResponse {
    payment_provider: String,
    recipient: String,
    iban: String,
    bic: String,
    amount: String,
    purpose: String,
    status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentResponse {
    paid_at: String,
    recipient: String,
    iban: String,
    bic: String,
    amount: String,
    purpose: String,
}

fn as_array<'a>(data: &'a Value, field: &str) -> AppResult<&'a Vec<Value>> {
    data.as_array()
        .ok_or_else(|| AppError::invalid_value(field, data.to_string()))
}

pub fn payment_provider_from_response(data: &Value) -> AppResult<PaymentProvider> {
    let raw = PaymentProviderResponse::deserialize(data)?;
    Ok(PaymentProvider {
        id: raw.id,
        name: raw.name,
        app_version: raw.min_app_version.android,
    })
}

pub fn payment_providers_from_response(data: &Value) -> AppResult<Vec<PaymentProvider>> {
    as_array(data, "paymentProviders")?
        .iter()
        .map(payment_provider_from_response)
        .collect()
}

pub fn payment_request_from_response(data: &Value) -> AppResult<PaymentRequest> {
    let raw = PaymentRequestResponse::deserialize(data)?;
    Ok(PaymentRequest {
        payment_provider: raw.payment_provider,
        recipient: raw.recipient,
        iban: raw.iban,
        bic: raw.bic,
        amount: raw.amount,
        purpose: raw.purpose,
        status: PaymentRequestStatus::from_api(&raw.status),
    })
}

pub fn payment_requests_from_response(data: &Value) -> AppResult<Vec<PaymentRequest>> {
    as_array(data, "paymentRequests")?
        .iter()
        .map(payment_request_from_response)
        .collect()
}

pub fn payment_from_response(data: &Value) -> AppResult<Payment> {
    let raw = PaymentResponse::deserialize(data)?;
    Ok(Payment {
        paid_at: raw.paid_at,
        recipient: raw.recipient,
        iban: raw.iban,
        bic: raw.bic,
        amount: raw.amount,
        purpose: raw.purpose,
    })
}

/// 错误报告接口返回的 `errorId`
pub fn error_id_from_response(data: &Value) -> AppResult<String> {
    data.get("errorId")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AppError::missing_field("errorId"))
}
