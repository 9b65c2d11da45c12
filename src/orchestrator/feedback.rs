//! 反馈请求体
//!
//! 只提交 dirty 的提取结果，未修改的条目不发送。

use crate::models::{CompoundExtraction, SpecificExtraction};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// `{name: {"value": ...}}`，只包含 dirty 的条目
pub fn specific_feedback(extractions: &HashMap<String, SpecificExtraction>) -> Value {
    Value::Object(dirty_entries(extractions))
}

/// `{name: [{column: {"value": ...}}, ...]}`
///
/// 只包含至少有一个 dirty 单元格的表格；行位置保持不变，
/// 每行只带 dirty 的列，没有修改的行是空对象。
pub fn compound_feedback(extractions: &HashMap<String, CompoundExtraction>) -> Value {
    let payload: Map<String, Value> = extractions
        .iter()
        .filter(|(_, compound)| compound.is_dirty())
        .map(|(name, compound)| {
            let rows: Vec<Value> = compound
                .rows
                .iter()
                .map(|row| Value::Object(dirty_entries(row)))
                .collect();
            (name.clone(), Value::Array(rows))
        })
        .collect();
    Value::Object(payload)
}

fn dirty_entries(extractions: &HashMap<String, SpecificExtraction>) -> Map<String, Value> {
    extractions
        .iter()
        .filter(|(_, extraction)| extraction.is_dirty())
        .map(|(name, extraction)| (name.clone(), json!({ "value": extraction.value() })))
        .collect()
}

/// 反馈提交成功后清除 dirty 标记（直接修改调用方的对象）
pub fn mark_submitted(
    specific: &mut HashMap<String, SpecificExtraction>,
    compound: &mut HashMap<String, CompoundExtraction>,
) -> usize {
    let mut cleared = 0;
    let cells = compound
        .values_mut()
        .flat_map(|compound| compound.rows.iter_mut())
        .flat_map(|row| row.values_mut());
    for extraction in specific.values_mut().chain(cells) {
        if extraction.is_dirty() {
            extraction.mark_clean();
            cleared += 1;
        }
    }
    cleared
}
