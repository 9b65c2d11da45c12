use crate::error::{AppError, AppResult};
use crate::models::{Document, ProcessingState, SourceClassification};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentResponse {
    id: String,
    progress: String,
    name: String,
    page_count: u32,
    /// 毫秒时间戳
    creation_date: i64,
    source_classification: SourceClassification,
    links: DocumentLinks,
    #[serde(default)]
    composite_documents: Vec<DocumentReference>,
    #[serde(default)]
    partial_documents: Vec<DocumentReference>,
}

#[derive(Debug, Deserialize)]
struct DocumentLinks {
    document: String,
}

#[derive(Debug, Deserialize)]
struct DocumentReference {
    document: String,
}

/// 把文档响应映射为 `Document`
pub fn document_from_response(response: &Value) -> AppResult<Document> {
    let raw = DocumentResponse::deserialize(response)?;

    let creation_date: DateTime<Utc> = DateTime::from_timestamp_millis(raw.creation_date)
        .ok_or_else(|| AppError::invalid_value("creationDate", raw.creation_date.to_string()))?;

    Ok(Document {
        id: raw.id,
        state: ProcessingState::from_api(&raw.progress),
        filename: raw.name,
        page_count: raw.page_count,
        creation_date,
        source_classification: raw.source_classification,
        uri: raw.links.document,
        composite_documents: raw
            .composite_documents
            .into_iter()
            .map(|reference| reference.document)
            .collect(),
        partial_documents: raw
            .partial_documents
            .into_iter()
            .map(|reference| reference.document)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document_json(progress: &str) -> Value {
        json!({
            "id": "626626a0-749f-11e2-bfd6-000000000000",
            "creationDate": 1360623867402i64,
            "name": "scanned.jpg",
            "progress": progress,
            "origin": "UPLOAD",
            "sourceClassification": "SCANNED",
            "pageCount": 1,
            "links": {
                "extractions": "https://pay-api.gini.net/documents/626626a0-749f-11e2-bfd6-000000000000/extractions",
                "layout": "https://pay-api.gini.net/documents/626626a0-749f-11e2-bfd6-000000000000/layout",
                "document": "https://pay-api.gini.net/documents/626626a0-749f-11e2-bfd6-000000000000"
            },
            "compositeDocuments": [
                { "document": "https://pay-api.gini.net/documents/1111" },
                { "document": "https://pay-api.gini.net/documents/2222" }
            ]
        })
    }

    #[test]
    fn test_maps_all_fields() {
        let document = document_from_response(&document_json("COMPLETED")).unwrap();

        assert_eq!(document.id, "626626a0-749f-11e2-bfd6-000000000000");
        assert_eq!(document.state, ProcessingState::Completed);
        assert_eq!(document.filename, "scanned.jpg");
        assert_eq!(document.page_count, 1);
        assert_eq!(document.creation_date.timestamp_millis(), 1360623867402);
        assert_eq!(document.source_classification, SourceClassification::Scanned);
        assert_eq!(
            document.uri,
            "https://pay-api.gini.net/documents/626626a0-749f-11e2-bfd6-000000000000"
        );
        assert_eq!(
            document.composite_documents,
            vec![
                "https://pay-api.gini.net/documents/1111".to_string(),
                "https://pay-api.gini.net/documents/2222".to_string(),
            ]
        );
        assert!(document.partial_documents.is_empty());
        assert!(!document.is_composite());
    }

    #[test]
    fn test_unknown_progress_is_a_terminal_state() {
        let document = document_from_response(&document_json("ARCHIVED")).unwrap();
        assert_eq!(document.state, ProcessingState::Other("ARCHIVED".to_string()));
        assert!(!document.state.is_pending());
    }

    #[test]
    fn test_missing_id_fails() {
        let mut response = document_json("PENDING");
        response.as_object_mut().unwrap().remove("id");
        assert!(document_from_response(&response).is_err());
    }
}
