use crate::domain::models::JsonOut;
use serde::Serialize;

/// Prints `data` inside the `{ok, data}` envelope, or as text lines.
pub fn print_report<T: Serialize>(
    json: bool,
    data: &T,
    lines: impl Fn(&T) -> Vec<String>,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        for line in lines(data) {
            println!("{line}");
        }
    }
    Ok(())
}

/// Failure envelope for `--json` runs, printed on stdout so scripts parse one stream.
pub fn print_failure(kind: &str, message: &str) {
    let body = serde_json::json!({
        "ok": false,
        "error": { "kind": kind, "message": message }
    });
    println!("{body}");
}

pub fn human_bytes(n: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{n} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
