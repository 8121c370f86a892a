use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Preferred column order for the forecast's monthly rows. Any other keys
/// are appended after these in whatever order serde_json yields them.
const FORECAST_COLUMNS: &[&str] = &[
    "year_month",
    "projected_inflow",
    "projected_outflow",
    "running_balance",
];

/// Format a report envelope as tables.
///
/// The primary data sits under "result": the recognition report and the
/// impact summary render as a field/value table, the forecast's row array
/// renders one row per month. Warnings and the methodology line follow as a
/// footer.
pub fn print_table(value: &Value) {
    let result = value
        .as_object()
        .and_then(|envelope| envelope.get("result"))
        .unwrap_or(value);

    match result {
        Value::Array(rows) => print_monthly_rows(rows),
        Value::Object(fields) => print_fields(fields),
        other => println!("{other}"),
    }

    if let Some(envelope) = value.as_object() {
        print_footer(envelope);
    }
}

fn print_fields(fields: &serde_json::Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in fields {
        builder.push_record([key.as_str(), &render(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_monthly_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        println!("(empty)");
        return;
    };

    let mut columns: Vec<String> = FORECAST_COLUMNS
        .iter()
        .filter(|c| first.contains_key(**c))
        .map(|c| c.to_string())
        .collect();
    columns.extend(
        first
            .keys()
            .filter(|k| !FORECAST_COLUMNS.contains(&k.as_str()))
            .cloned(),
    );

    let mut builder = Builder::default();
    builder.push_record(&columns);
    for row in rows {
        let Value::Object(fields) = row else { continue };
        builder.push_record(
            columns
                .iter()
                .map(|c| fields.get(c.as_str()).map(render).unwrap_or_default()),
        );
    }
    println!("{}", Table::from(builder));
}

fn print_footer(envelope: &serde_json::Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for warning in warnings.iter().filter_map(Value::as_str) {
                println!("  - {warning}");
            }
        }
    }

    if let Some(methodology) = envelope.get("methodology").and_then(Value::as_str) {
        println!("\nMethodology: {methodology}");
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(items) => items.iter().map(render).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
