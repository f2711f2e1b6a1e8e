//! Per-severity line buffer for scoped logging
//!
//! Slot 0 is reserved for the operation identifier and stays empty until the
//! buffer is rendered, so the buffer holds entries iff its length is above 1.

/// Placeholder rendered when the operation has no identifier
pub const MISSING_OPERATION_ID: &str = "-";

/// Ordered lines recorded for one severity during one operation
#[derive(Debug, Clone)]
pub struct LineBuffer {
    /// Reserved slot followed by entries in append order
    lines: Vec<String>,
    /// Capacity to allocate on reset
    capacity: usize,
}

impl LineBuffer {
    /// Create an empty buffer with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        let mut buffer = Self {
            lines: Vec::new(),
            capacity,
        };
        buffer.reset();
        buffer
    }

    /// Append an entry
    pub fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    /// Whether at least one entry was appended since the last reset
    pub fn has_entries(&self) -> bool {
        self.lines.len() > 1
    }

    /// Number of entries, not counting the reserved slot
    pub fn len(&self) -> usize {
        self.lines.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        !self.has_entries()
    }

    /// Entries in append order
    pub fn entries(&self) -> &[String] {
        &self.lines[1..]
    }

    /// Fill the reserved slot and join everything with single spaces
    pub fn render(&mut self, operation_id: Option<&str>) -> String {
        self.lines[0] = operation_id.unwrap_or(MISSING_OPERATION_ID).to_string();
        self.lines.join(" ")
    }

    /// Drop all entries and re-seed the reserved slot
    pub fn reset(&mut self) {
        self.lines = Vec::with_capacity(self.capacity + 1);
        self.lines.push(String::new());
    }
}
