use crate::error::{AppError, AppResult};
use url::Url;

/// 相对地址（如 `/documents/1234`）解析时使用的占位根地址
const RELATIVE_BASE: &str = "http://localhost/";

/// 取出 Location 的最后一个路径段，即新资源的 ID
pub fn id_from_location(location: &str) -> AppResult<String> {
    path_segments(location)?
        .pop()
        .ok_or_else(|| AppError::invalid_value("location", location))
}

/// 取出支付请求 ID
///
/// 创建支付请求返回 `.../paymentRequests/<id>`，
/// 完成支付请求返回 `.../paymentRequests/<id>/payment`，两种都取 `<id>`。
pub fn payment_request_id_from_location(location: &str) -> AppResult<String> {
    let segments = path_segments(location)?;
    match segments.iter().position(|segment| segment == "paymentRequests") {
        Some(index) if index + 1 < segments.len() => Ok(segments[index + 1].clone()),
        _ => id_from_location(location),
    }
}

/// 解析 Location（绝对或相对地址），返回非空路径段，不含 query 和 fragment
fn path_segments(location: &str) -> AppResult<Vec<String>> {
    let url = match Url::parse(location) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(RELATIVE_BASE)
            .and_then(|base| base.join(location))
            .map_err(|_| AppError::invalid_value("location", location))?,
        Err(_) => return Err(AppError::invalid_value("location", location)),
    };
    let segments = url
        .path_segments()
        .map(|segments| {
            segments
                .filter(|segment| !segment.is_empty())
                .map(|segment| segment.to_string())
                .collect()
        })
        .unwrap_or_default();
    Ok(segments)
}
