//! 组合文档的请求体与旋转角度规范化

use crate::error::{AppError, AppResult};
use crate::models::Document;
use serde_json::{json, Value};

/// 把旋转角度规范化为 {0, 90, 180, 270}
///
/// 只接受 90 的整数倍，对 360 取非负余数，如 -90 -> 270，450 -> 90。
/// 其他角度返回 `InvalidArgument`。
pub fn normalize_rotation(degrees: i32) -> AppResult<u16> {
    if degrees % 90 != 0 {
        return Err(AppError::invalid_argument("rotation"));
    }
    Ok(degrees.rem_euclid(360) as u16)
}

/// 组合文档的请求体，页面顺序与调用方给出的顺序一致
pub fn composite_document_body(pages: &[(&Document, i32)]) -> AppResult<Value> {
    let partial_documents = pages
        .iter()
        .map(|(document, rotation)| {
            Ok(json!({
                "document": document.uri,
                "rotationDelta": normalize_rotation(*rotation)?,
            }))
        })
        .collect::<AppResult<Vec<Value>>>()?;
    Ok(json!({ "partialDocuments": partial_documents }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProcessingState, SourceClassification};
    use chrono::Utc;

    fn partial(id: &str) -> Document {
        Document {
            id: id.to_string(),
            state: ProcessingState::Completed,
            filename: format!("{}.jpg", id),
            page_count: 1,
            creation_date: Utc::now(),
            source_classification: SourceClassification::Scanned,
            uri: format!("https://pay-api.gini.net/documents/{}", id),
            composite_documents: Vec::new(),
            partial_documents: Vec::new(),
        }
    }

    #[test]
    fn test_normalize_examples() {
        assert_eq!(normalize_rotation(0).unwrap(), 0);
        assert_eq!(normalize_rotation(-90).unwrap(), 270);
        assert_eq!(normalize_rotation(450).unwrap(), 90);
        assert_eq!(normalize_rotation(-270).unwrap(), 90);
        assert_eq!(normalize_rotation(360).unwrap(), 0);
        assert_eq!(normalize_rotation(-720).unwrap(), 0);
    }

    #[test]
    fn test_normalize_is_congruent_for_quarter_turns() {
        for turns in -20..=20 {
            let degrees = turns * 90;
            let normalized = normalize_rotation(degrees).unwrap();
            assert!([0, 90, 180, 270].contains(&normalized));
            assert_eq!((i32::from(normalized) - degrees).rem_euclid(360), 0, "degrees = {}", degrees);
        }
    }

    #[test]
    fn test_non_quarter_turns_are_rejected() {
        for degrees in [-181, -45, -1, 1, 44, 45, 46, 134, 359, i32::MIN, i32::MAX] {
            let error = normalize_rotation(degrees).unwrap_err();
            assert!(
                matches!(error, AppError::InvalidArgument { argument } if argument == "rotation"),
                "degrees = {}",
                degrees
            );
        }
    }

    #[test]
    fn test_body_fails_on_any_invalid_page() {
        let first = partial("1111");
        let second = partial("2222");
        assert!(composite_document_body(&[(&first, 90), (&second, 45)]).is_err());
    }

    #[test]
    fn test_body_keeps_order_and_rotation() {
        let first = partial("1111");
        let second = partial("2222");
        let third = partial("3333");

        let body = composite_document_body(&[(&second, -90), (&first, 450), (&third, 180)]).unwrap();

        assert_eq!(
            body,
            json!({
                "partialDocuments": [
                    { "document": "https://pay-api.gini.net/documents/2222", "rotationDelta": 270 },
                    { "document": "https://pay-api.gini.net/documents/1111", "rotationDelta": 90 },
                    { "document": "https://pay-api.gini.net/documents/3333", "rotationDelta": 180 }
                ]
            })
        );
    }
}
