//! Resource-usage statistics formatting.

use serde_json::Value;

fn to_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_i64().unwrap_or_else(|| n.as_f64().unwrap_or(0.0) as i64),
        Value::String(s) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

/// Humanize a byte count with binary units.
fn human_bytes(n: i64) -> String {
    const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];
    if n < 1024 {
        return format!("{n} Bytes");
    }
    let mut value = n as f64;
    let mut unit = "KiB";
    for u in UNITS {
        unit = u;
        value /= 1024.0;
        if value < 1024.0 {
            break;
        }
    }
    format!("{value:.1} {unit}")
}

/// Group an integer with thousands separators.
fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Format the statistics object as an aligned key/value table.
///
/// Keys ending in `_size` or `_bytes` are humanized as binary byte
/// sizes; `cpu_used` is reported in milliseconds under `cpu_used_msec`.
#[must_use]
pub fn format_stats(stats: &Value) -> String {
    let Some(map) = stats.as_object() else {
        return String::new();
    };
    let rows: Vec<(String, String)> = map
        .iter()
        .map(|(key, value)| {
            let n = to_int(value);
            if key.ends_with("_size") || key.ends_with("_bytes") {
                (key.clone(), human_bytes(n))
            } else if key == "cpu_used" {
                ("cpu_used_msec".to_string(), group_thousands(n))
            } else {
                (key.clone(), group_thousands(n))
            }
        })
        .collect();

    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(k, v)| format!("{k:<width$}  {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print the stats carried by a destroy response, if any.
pub fn print_destroy_stats(ret: Option<&Value>) {
    match ret.and_then(|v| v.get("stats")) {
        Some(stats) => println!("{}", format_stats(stats)),
        None => println!("Statistics is not available."),
    }
}
