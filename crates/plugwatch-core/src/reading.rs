//! Instantaneous plug readings.
//!
//! A Tuya switch reports its state as a list of data points (`{code, value}`
//! pairs). [`PlugSnapshot`] decodes the codes a metering smart plug exposes,
//! and [`Reading`] pins a snapshot to the moment it was polled.
//!
//! Data point reference:
//! <https://developer.tuya.com/en/docs/iot/smart-switch-product-function-definition?id=K9r7gh4lbe886>

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::InvalidReading;

/// One `{code, value}` pair as returned by the device status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub code: String,
    pub value: serde_json::Value,
}

/// Decoded switch data points.
///
/// `power_on` stays `None` when the device did not report `switch_1`; the
/// classifier rejects such snapshots instead of guessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlugSnapshot {
    pub power_on: Option<bool>,
    pub countdown_s: i64,
    pub energy_wh: i64,
    pub current_a: f64,
    pub voltage_v: f64,
    pub power_w: Option<f64>,
    pub fault_code: i64,
    pub relay_status: String,
}

impl PlugSnapshot {
    /// Decode a data point list.
    ///
    /// Unknown codes are ignored. Known codes with the wrong JSON type fail
    /// with [`InvalidReading::BadDataPoint`].
    pub fn from_data_points(points: &[DataPoint]) -> Result<Self, InvalidReading> {
        let dps: HashMap<&str, &serde_json::Value> = points
            .iter()
            .map(|dp| (dp.code.as_str(), &dp.value))
            .collect();

        let power_on = match dps.get("switch_1") {
            Some(v) => Some(v.as_bool().ok_or_else(|| bad("switch_1", v))?),
            None => None,
        };
        // cur_power is reported in tenths of a watt
        let power_w = number(&dps, "cur_power")?.map(|dw| dw / 10.0);

        let relay_status = match dps.get("relay_status") {
            Some(v) => v.as_str().ok_or_else(|| bad("relay_status", v))?.to_string(),
            None => "unknown".to_string(),
        };

        Ok(Self {
            power_on,
            countdown_s: integer(&dps, "countdown_1")?.unwrap_or(0),
            energy_wh: integer(&dps, "add_ele")?.unwrap_or(0),
            current_a: number(&dps, "cur_current")?.unwrap_or(0.0) / 1000.0,
            voltage_v: number(&dps, "cur_voltage")?.unwrap_or(0.0) / 10.0,
            power_w,
            fault_code: integer(&dps, "fault")?.unwrap_or(0),
            relay_status,
        })
    }
}

fn bad(code: &str, value: &serde_json::Value) -> InvalidReading {
    InvalidReading::BadDataPoint {
        code: code.to_string(),
        value: value.to_string(),
    }
}

fn number(dps: &HashMap<&str, &serde_json::Value>, code: &str) -> Result<Option<f64>, InvalidReading> {
    match dps.get(code) {
        Some(v) => v.as_f64().map(Some).ok_or_else(|| bad(code, v)),
        None => Ok(None),
    }
}

fn integer(dps: &HashMap<&str, &serde_json::Value>, code: &str) -> Result<Option<i64>, InvalidReading> {
    match dps.get(code) {
        Some(v) => v.as_i64().map(Some).ok_or_else(|| bad(code, v)),
        None => Ok(None),
    }
}

/// One poll result, timestamped when it was taken. Never persisted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub power_watts: Option<f64>,
    pub raw_status: PlugSnapshot,
}

impl Reading {
    pub fn from_snapshot(raw_status: PlugSnapshot, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            power_watts: raw_status.power_w,
            raw_status,
        }
    }

    /// A reading with only the switch flag and wattage filled in.
    pub fn new(timestamp: DateTime<Utc>, power_on: bool, power_watts: Option<f64>) -> Self {
        let raw_status = PlugSnapshot {
            power_on: Some(power_on),
            countdown_s: 0,
            energy_wh: 0,
            current_a: 0.0,
            voltage_v: 0.0,
            power_w: power_watts,
            fault_code: 0,
            relay_status: "unknown".to_string(),
        };
        Self::from_snapshot(raw_status, timestamp)
    }
}
