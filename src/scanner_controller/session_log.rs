//! Session log - ordered, append-only record of completed submissions

use super::types::ScanRecord;

/// In-memory scan log for one session
#[derive(Debug, Clone, Default)]
pub struct SessionLog {
    entries: Vec<ScanRecord>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record
    pub fn push(&mut self, record: ScanRecord) {
        tracing::debug!(
            scanned_id = %record.id,
            result = %record.result,
            position = self.entries.len(),
            "Scan recorded in session log"
        );
        self.entries.push(record);
    }

    /// Whether `id` has a record in this session
    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn entries(&self) -> &[ScanRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&ScanRecord> {
        self.entries.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_only_order() {
        let mut log = SessionLog::new();
        assert!(log.is_empty());

        log.push(ScanRecord::now("EVENT2025-001", "Submitted"));
        log.push(ScanRecord::now("EVENT2025-002", "Already Scanned"));

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].id, "EVENT2025-001");
        assert_eq!(log.last().unwrap().result, "Already Scanned");
        assert!(log.contains("EVENT2025-002"));
        assert!(!log.contains("EVENT2025-003"));
    }

    #[test]
    fn test_record_display() {
        let record = ScanRecord {
            id: "EVENT2025-042".to_string(),
            result: "Submitted".to_string(),
            time: "10:42:07".to_string(),
        };
        assert_eq!(record.to_string(), "10:42:07 - EVENT2025-042 - Submitted");
    }
}
