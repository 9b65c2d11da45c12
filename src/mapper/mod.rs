//! 响应映射层
//!
//! 把服务端返回的原始 JSON 转为类型化的实体。
//! 这里只有纯函数：不做网络请求，不持有状态。

pub mod document;
pub mod extractions;
pub mod location;
pub mod payment;

pub use document::document_from_response;
pub use extractions::{
    candidates_from_response, compound_extractions_from_response, extraction_from_response,
    extractions_container_from_response, return_reasons_from_response,
    specific_extraction_from_response,
};
pub use location::{id_from_location, payment_request_id_from_location};
pub use payment::{
    error_id_from_response, payment_from_response, payment_provider_from_response,
    payment_providers_from_response, payment_request_from_response,
    payment_requests_from_response,
};
