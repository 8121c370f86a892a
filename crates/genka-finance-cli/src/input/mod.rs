pub mod file;
pub mod stdin;

use genka_finance_core::store::MemoryDataset;

/// Load the dataset snapshot from --data, or from piped stdin.
pub fn load_dataset(path: Option<&str>) -> Result<MemoryDataset, Box<dyn std::error::Error>> {
    if let Some(p) = path {
        return file::read_json(p);
    }
    match stdin::read_dataset()? {
        Some(dataset) => Ok(dataset),
        None => Err("--data is required (or pipe a dataset snapshot on stdin)".into()),
    }
}
