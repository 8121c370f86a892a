use std::io::{self, Read};

use genka_finance_core::store::MemoryDataset;

/// Read a dataset snapshot from piped stdin. Returns `None` when stdin is an
/// interactive TTY or the pipe is empty, so the caller can ask for --data.
pub fn read_dataset() -> Result<Option<MemoryDataset>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let dataset: MemoryDataset = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse dataset snapshot from stdin: {e}"))?;
    Ok(Some(dataset))
}
