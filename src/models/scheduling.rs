use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingEntry {
    pub date: String,
    pub timestamp: i64,
    pub status: SchedulingStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SchedulingStatus {
    Scheduled,
}

impl SchedulingEntry {
    pub fn scheduled(date: &str, timestamp: i64) -> Self {
        Self {
            date: date.to_string(),
            timestamp,
            status: SchedulingStatus::Scheduled,
        }
    }
}
