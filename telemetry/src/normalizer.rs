//! Parses `nvidia-smi --format=csv,noheader,nounits` output into readings.

use crate::error::{Result, TelemetryError};
use crate::reading::GpuReading;
use once_cell::sync::Lazy;
use regex::Regex;

/// The device query run on every remote host.
pub const DEVICE_QUERY: &str = "nvidia-smi --query-gpu=index,name,temperature.gpu,utilization.gpu,memory.used,memory.total --format=csv,noheader,nounits";

const FIELDS: [&str; 6] = ["index", "name", "temperature", "utilization", "memory.used", "memory.total"];

static VENDOR_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^NVIDIA GeForce\s+").expect("valid vendor prefix pattern"));

/// Strips the consumer product-line prefix: "NVIDIA GeForce RTX 3090" → "RTX 3090".
/// Anything else passes through untouched.
pub fn strip_vendor_prefix(name: &str) -> String {
    VENDOR_PREFIX.replace(name, "").into_owned()
}

/// Parses device-query lines with the default name rule.
pub fn parse<I, S>(lines: I) -> Result<Vec<GpuReading>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parse_with(lines, strip_vendor_prefix)
}

/// Parses device-query lines, cleaning each device name with `clean_name`.
///
/// Fails as a whole on the first malformed line; empty input is an error too.
pub fn parse_with<I, S, F>(lines: I, clean_name: F) -> Result<Vec<GpuReading>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: Fn(&str) -> String,
{
    let mut readings = Vec::new();

    for (i, raw) in lines.into_iter().enumerate() {
        let line_no = i + 1;
        let line = raw.as_ref().trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split(", ").collect();
        if parts.len() != FIELDS.len() {
            return Err(TelemetryError::parse(
                line_no,
                format!("expected {} fields, found {}", FIELDS.len(), parts.len()),
            ));
        }

        readings.push(GpuReading {
            index: number(parts[0], line_no, FIELDS[0])?,
            name: clean_name(parts[1].trim()),
            temperature_c: number(parts[2], line_no, FIELDS[2])?,
            utilization_pct: number(parts[3], line_no, FIELDS[3])?,
            memory_used_mib: number(parts[4], line_no, FIELDS[4])?,
            memory_total_mib: number(parts[5], line_no, FIELDS[5])?,
        });
    }

    if readings.is_empty() {
        return Err(TelemetryError::parse(0, "no device output"));
    }
    Ok(readings)
}

/// Splits captured stdout into lines and parses them.
pub fn parse_output(stdout: &str) -> Result<Vec<GpuReading>> {
    parse(stdout.trim().lines())
}

fn number<T: std::str::FromStr>(raw: &str, line: usize, field: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| TelemetryError::parse(line, field))
}
