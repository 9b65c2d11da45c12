use crate::error::{AppError, AppResult};
use crate::models::{
    BoundingBox, CompoundExtraction, Extraction, ExtractionsContainer, ReturnReason,
    SpecificExtraction,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// 候选池：实体类型 -> 候选提取结果
pub type CandidatePools = HashMap<String, Vec<Extraction>>;

#[derive(Debug, Deserialize)]
struct BoxResponse {
    page: u32,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl From<BoxResponse> for BoundingBox {
    fn from(raw: BoxResponse) -> Self {
        BoundingBox {
            page: raw.page,
            left: raw.left,
            top: raw.top,
            width: raw.width,
            height: raw.height,
        }
    }
}

fn required_str<'a>(data: &'a Value, field: &str) -> AppResult<&'a str> {
    data.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::missing_field(field))
}

fn as_object<'a>(data: &'a Value, field: &str) -> AppResult<&'a Map<String, Value>> {
    data.as_object()
        .ok_or_else(|| AppError::invalid_value(field, data.to_string()))
}

/// 解析单个提取结果，`entity` 和 `value` 必须存在，`box` 可选
pub fn extraction_from_response(data: &Value) -> AppResult<Extraction> {
    let entity = required_str(data, "entity")?;
    let value = required_str(data, "value")?;
    let bounding_box: Option<BoundingBox> = match data.get("box") {
        Some(raw) if !raw.is_null() => Some(BoxResponse::deserialize(raw)?.into()),
        _ => None,
    };
    Ok(Extraction::new(value, entity, bounding_box))
}

/// 解析候选池，每个池内的顺序与响应一致
pub fn candidates_from_response(data: &Value) -> AppResult<CandidatePools> {
    let mut pools = CandidatePools::new();
    for (entity_name, list) in as_object(data, "candidates")? {
        let items = list
            .as_array()
            .ok_or_else(|| AppError::invalid_value(format!("candidates.{}", entity_name), list.to_string()))?;
        let candidates = items
            .iter()
            .map(extraction_from_response)
            .collect::<AppResult<Vec<_>>>()?;
        pools.insert(entity_name.clone(), candidates);
    }
    Ok(pools)
}

/// 解析具名提取结果，通过 `candidates` 字段引用候选池
///
/// 池不存在或没有引用时候选列表为空
pub fn specific_extraction_from_response(
    name: &str,
    data: &Value,
    pools: &CandidatePools,
) -> AppResult<SpecificExtraction> {
    let extraction = extraction_from_response(data)?;
    let candidates = data
        .get("candidates")
        .and_then(Value::as_str)
        .and_then(|pool_name| pools.get(pool_name))
        .cloned()
        .unwrap_or_default();
    Ok(SpecificExtraction::new(
        name,
        extraction.value,
        extraction.entity,
        extraction.bounding_box,
        candidates,
    ))
}

fn specific_extractions_from_object(
    data: &Value,
    field: &str,
    pools: &CandidatePools,
) -> AppResult<HashMap<String, SpecificExtraction>> {
    as_object(data, field)?
        .iter()
        .map(|(name, raw)| {
            specific_extraction_from_response(name, raw, pools).map(|extraction| (name.clone(), extraction))
        })
        .collect()
}

/// 解析表格型提取结果，行顺序保持不变
pub fn compound_extractions_from_response(
    data: &Value,
    pools: &CandidatePools,
) -> AppResult<HashMap<String, CompoundExtraction>> {
    let mut compounds = HashMap::new();
    for (name, rows) in as_object(data, "compoundExtractions")? {
        let rows = rows
            .as_array()
            .ok_or_else(|| AppError::invalid_value(format!("compoundExtractions.{}", name), rows.to_string()))?
            .iter()
            .map(|row| specific_extractions_from_object(row, name, pools))
            .collect::<AppResult<Vec<_>>>()?;
        compounds.insert(name.clone(), CompoundExtraction::new(name.clone(), rows));
    }
    Ok(compounds)
}

/// 解析退货原因：`id` 之外的字符串字段都视为语言标签
pub fn return_reasons_from_response(data: &Value) -> AppResult<Vec<ReturnReason>> {
    let items = data
        .as_array()
        .ok_or_else(|| AppError::invalid_value("returnReasons", data.to_string()))?;
    items
        .iter()
        .map(|item| {
            let id = required_str(item, "id")?.to_string();
            let localized_labels = as_object(item, "returnReasons")?
                .iter()
                .filter(|(key, _)| key.as_str() != "id")
                .filter_map(|(locale, label)| {
                    label.as_str().map(|label| (locale.clone(), label.to_string()))
                })
                .collect();
            Ok(ReturnReason {
                id,
                localized_labels,
            })
        })
        .collect()
}

/// 解析提取接口的完整响应
pub fn extractions_container_from_response(data: &Value) -> AppResult<ExtractionsContainer> {
    let pools = match data.get("candidates") {
        Some(raw) if !raw.is_null() => candidates_from_response(raw)?,
        _ => CandidatePools::new(),
    };

    let specific_extractions = match data.get("extractions") {
        Some(raw) if !raw.is_null() => specific_extractions_from_object(raw, "extractions", &pools)?,
        _ => HashMap::new(),
    };

    let compound_extractions = match data.get("compoundExtractions") {
        Some(raw) if !raw.is_null() => compound_extractions_from_response(raw, &pools)?,
        _ => HashMap::new(),
    };

    let return_reasons = match data.get("returnReasons") {
        Some(raw) if !raw.is_null() => return_reasons_from_response(raw)?,
        _ => Vec::new(),
    };

    Ok(ExtractionsContainer {
        specific_extractions,
        compound_extractions,
        return_reasons,
    })
}
