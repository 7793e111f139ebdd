use crate::types::{AnnouncementRecord, RunSummary};

/// Emit an announced sale as a single JSON line to stdout.
pub fn report_announcement(record: &AnnouncementRecord) {
    if let Ok(json) = serde_json::to_string(record) {
        println!("{json}");
    }
}

/// Emit the end-of-pass summary as a single JSON line to stdout.
pub fn report_run_summary(summary: &RunSummary) {
    if let Ok(json) = serde_json::to_string(summary) {
        println!("{json}");
    }
}
