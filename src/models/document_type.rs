use std::str::FromStr;

/// 文档类型提示
///
/// 上传时作为 `doctype` 原样传给服务端，帮助服务端选择处理流程
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DocumentType {
    /// 银行对账单
    BankStatement,
    /// 合同
    Contract,
    /// 发票
    Invoice,
    /// 收据
    Receipt,
    /// 催款单
    Reminder,
    /// 汇款单
    RemittanceSlip,
    /// 差旅报销单
    TravelExpenseReport,
    /// 其他
    Other,
}

impl DocumentType {
    /// 获取 API 使用的名称
    pub fn api_name(self) -> &'static str {
        match self {
            DocumentType::BankStatement => "BankStatement",
            DocumentType::Contract => "Contract",
            DocumentType::Invoice => "Invoice",
            DocumentType::Receipt => "Receipt",
            DocumentType::Reminder => "Reminder",
            DocumentType::RemittanceSlip => "RemittanceSlip",
            DocumentType::TravelExpenseReport => "TravelExpenseReport",
            DocumentType::Other => "Other",
        }
    }
}

impl FromStr for DocumentType {
    type Err = String;

    /// 不区分大小写，兼容下划线写法（如 `BANK_STATEMENT`）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "bankstatement" => Ok(DocumentType::BankStatement),
            "contract" => Ok(DocumentType::Contract),
            "invoice" => Ok(DocumentType::Invoice),
            "receipt" => Ok(DocumentType::Receipt),
            "reminder" => Ok(DocumentType::Reminder),
            "remittanceslip" => Ok(DocumentType::RemittanceSlip),
            "travelexpensereport" => Ok(DocumentType::TravelExpenseReport),
            "other" => Ok(DocumentType::Other),
            _ => Err(format!("未知的文档类型: {}", s)),
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.api_name())
    }
}
