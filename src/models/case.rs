use serde::{Deserialize, Serialize};

use crate::error::BusinessError;

/// 案件信息，由操作人员提供
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseMetadata {
    /// 物业地址 / 标识
    pub property: String,
    /// 买方主体名称
    pub counterparty: String,
}

impl CaseMetadata {
    pub fn new(property: impl Into<String>, counterparty: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            counterparty: counterparty.into(),
        }
    }

    /// 两个字段都不能为空
    pub fn validate(&self) -> Result<(), BusinessError> {
        if self.property.trim().is_empty() {
            return Err(BusinessError::MissingCaseField { field: "property" });
        }
        if self.counterparty.trim().is_empty() {
            return Err(BusinessError::MissingCaseField {
                field: "counterparty",
            });
        }
        Ok(())
    }
}
