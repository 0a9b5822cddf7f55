use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GarbageBinSelection {
    pub delivery_address: String,
    pub organic: bool,
    pub recyclable: bool,
    pub non_recyclable: bool,
    pub timestamp: i64,
}
