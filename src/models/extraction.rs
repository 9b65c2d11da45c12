use std::collections::HashMap;

/// 提取结果在页面上的位置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// 页码（从 1 开始）
    pub page: u32,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// 单个提取结果
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub value: String,
    pub entity: String,
    pub bounding_box: Option<BoundingBox>,
}

impl Extraction {
    pub fn new(value: impl Into<String>, entity: impl Into<String>, bounding_box: Option<BoundingBox>) -> Self {
        Self {
            value: value.into(),
            entity: entity.into(),
            bounding_box,
        }
    }
}

/// 具名提取结果（如 `amountToPay`）
///
/// 通过 `set_value` 修改值后会被标记为 dirty，
/// 反馈提交成功后由编排器清除该标记。
#[derive(Debug, Clone, PartialEq)]
pub struct SpecificExtraction {
    name: String,
    value: String,
    entity: String,
    bounding_box: Option<BoundingBox>,
    candidates: Vec<Extraction>,
    dirty: bool,
}

impl SpecificExtraction {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        entity: impl Into<String>,
        bounding_box: Option<BoundingBox>,
        candidates: Vec<Extraction>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            entity: entity.into(),
            bounding_box,
            candidates,
            dirty: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }

    /// 同一实体的候选读数，顺序与服务端一致
    pub fn candidates(&self) -> &[Extraction] {
        &self.candidates
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// 修改值并标记为 dirty
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.dirty = true;
    }

    /// 修改位置并标记为 dirty
    pub fn set_bounding_box(&mut self, bounding_box: Option<BoundingBox>) {
        self.bounding_box = bounding_box;
        self.dirty = true;
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

/// 表格型提取结果（如 `lineItems`），每行是列名到提取结果的映射
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundExtraction {
    pub name: String,
    pub rows: Vec<HashMap<String, SpecificExtraction>>,
}

impl CompoundExtraction {
    pub fn new(name: impl Into<String>, rows: Vec<HashMap<String, SpecificExtraction>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.rows
            .iter()
            .any(|row| row.values().any(SpecificExtraction::is_dirty))
    }
}

/// 退货原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnReason {
    pub id: String,
    /// 语言代码 -> 翻译后的标签
    pub localized_labels: HashMap<String, String>,
}

/// 一个文档的全部提取结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionsContainer {
    pub specific_extractions: HashMap<String, SpecificExtraction>,
    pub compound_extractions: HashMap<String, CompoundExtraction>,
    pub return_reasons: Vec<ReturnReason>,
}
