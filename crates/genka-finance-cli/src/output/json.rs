use serde_json::Value;

/// Pretty-printed JSON, the default output format.
pub fn print_json(value: &Value) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    println!("{rendered}");
}
