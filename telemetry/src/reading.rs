use crate::error::{Result, TelemetryError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One device's instantaneous state. Serialized with the dashboard's field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuReading {
    pub index: u32,
    pub name: String,
    #[serde(rename = "temp")]
    pub temperature_c: i32,
    #[serde(rename = "util")]
    pub utilization_pct: u32,
    #[serde(rename = "memUsed")]
    pub memory_used_mib: u64,
    #[serde(rename = "memTotal")]
    pub memory_total_mib: u64,
}

/// The result of one successful fetch.
///
/// A proxy is trusted to return readings already in dashboard shape, so its
/// body is kept verbatim and handed back to live callers unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Sample {
    Devices(Vec<GpuReading>),
    Proxied(Value),
}

impl Sample {
    /// Per-device utilization in device order, for the history summary.
    pub fn utilization(&self) -> Result<Vec<u32>> {
        match self {
            Sample::Devices(readings) => Ok(readings.iter().map(|r| r.utilization_pct).collect()),
            Sample::Proxied(Value::Array(devices)) => devices
                .iter()
                .enumerate()
                .map(|(i, device)| {
                    device
                        .get("util")
                        .and_then(leading_integer)
                        .ok_or_else(|| TelemetryError::parse(i + 1, "util"))
                })
                .collect(),
            Sample::Proxied(_) => Err(TelemetryError::parse(0, "proxy body is not an array")),
        }
    }
}

/// Reads a utilization value the way a lenient integer parse would:
/// numbers are truncated, strings contribute their leading digits.
fn leading_integer(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.trunc() as u64))
            .and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => {
            let s = s.trim_start();
            let s = s.strip_prefix('+').unwrap_or(s);
            let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
            s[..end].parse().ok()
        }
        _ => None,
    }
}
