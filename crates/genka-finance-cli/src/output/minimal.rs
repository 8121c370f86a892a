use serde_json::Value;

/// The single figure each report boils down to, tried in priority order.
const PRIORITY_KEYS: &[&str] = &[
    "total_recognized_revenue",
    "revenue_impact",
    "recognized_revenue",
    "running_balance",
    "closing_balance",
];

/// Print just the key answer value from a report.
///
/// The recognition report answers with its portfolio revenue, the impact
/// analysis with its revenue shift, and the forecast with the final month's
/// running balance.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|envelope| envelope.get("result"))
        .unwrap_or(value);

    // A forecast result is a row array; the last row carries the projected
    // end balance.
    let answer = match result {
        Value::Array(rows) => rows.last().unwrap_or(result),
        other => other,
    };

    let Value::Object(fields) = answer else {
        println!("{}", render(answer));
        return;
    };

    for key in PRIORITY_KEYS {
        if let Some(val) = fields.get(*key).filter(|v| !v.is_null()) {
            println!("{}", render(val));
            return;
        }
    }

    match fields.iter().next() {
        Some((key, val)) => println!("{}: {}", key, render(val)),
        None => println!("{{}}"),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
