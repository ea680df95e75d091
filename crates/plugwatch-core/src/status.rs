//! Binary On/Off classification of plug readings.
//!
//! The plug's own switch flag only says whether the relay is closed. Whether
//! the attached device is actually running is decided by wattage against a
//! fixed threshold. There is no standby state; anything under the threshold
//! is `Off`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InvalidReading;
use crate::reading::Reading;

/// Default wattage at or above which a switched-on plug counts as `On`.
pub const DEFAULT_THRESHOLD_WATTS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    On,
    Off,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::On => "On",
            Status::Off => "Off",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "On" => Ok(Status::On),
            "Off" => Ok(Status::Off),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}

/// Maps readings to [`Status`] using a wattage threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classifier {
    threshold_watts: f64,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            threshold_watts: DEFAULT_THRESHOLD_WATTS,
        }
    }
}

impl Classifier {
    /// # Errors
    /// Returns [`InvalidReading::BadThreshold`] for negative or non-finite thresholds.
    pub fn new(threshold_watts: f64) -> Result<Self, InvalidReading> {
        if !threshold_watts.is_finite() || threshold_watts < 0.0 {
            return Err(InvalidReading::BadThreshold(threshold_watts));
        }
        Ok(Self { threshold_watts })
    }

    pub fn threshold_watts(&self) -> f64 {
        self.threshold_watts
    }

    /// State of the plug relay alone, ignoring wattage.
    pub fn plug_state(&self, reading: &Reading) -> Result<Status, InvalidReading> {
        match reading.raw_status.power_on {
            Some(true) => Ok(Status::On),
            Some(false) => Ok(Status::Off),
            None => Err(InvalidReading::MissingDataPoint("switch_1".to_string())),
        }
    }

    /// State of the attached device.
    ///
    /// Relay off is always `Off`. Relay on is `On` unless the reported
    /// wattage is below the threshold; a plug that reports no wattage is
    /// taken at its switch flag.
    pub fn classify(&self, reading: &Reading) -> Result<Status, InvalidReading> {
        let plug = self.plug_state(reading)?;

        let watts = match reading.power_watts {
            Some(w) if !w.is_finite() || w < 0.0 => return Err(InvalidReading::BadWattage(w)),
            other => other,
        };

        if plug == Status::Off {
            return Ok(Status::Off);
        }
        match watts {
            Some(w) if w < self.threshold_watts => Ok(Status::Off),
            _ => Ok(Status::On),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn reading(power_on: bool, watts: Option<f64>) -> Reading {
        Reading::new(Utc::now(), power_on, watts)
    }

    #[test]
    fn below_threshold_is_off() {
        let c = Classifier::default();
        assert_eq!(c.classify(&reading(true, Some(0.4))).unwrap(), Status::Off);
        assert_eq!(c.classify(&reading(true, Some(4.99))).unwrap(), Status::Off);
    }

    #[test]
    fn at_or_above_threshold_is_on() {
        let c = Classifier::default();
        assert_eq!(c.classify(&reading(true, Some(5.0))).unwrap(), Status::On);
        assert_eq!(c.classify(&reading(true, Some(120.0))).unwrap(), Status::On);
    }

    #[test]
    fn relay_off_wins_over_wattage() {
        let c = Classifier::default();
        assert_eq!(c.classify(&reading(false, Some(300.0))).unwrap(), Status::Off);
        assert_eq!(c.classify(&reading(false, None)).unwrap(), Status::Off);
    }

    #[test]
    fn no_wattage_uses_switch_flag() {
        let c = Classifier::default();
        assert_eq!(c.classify(&reading(true, None)).unwrap(), Status::On);
    }

    #[test]
    fn plug_state_ignores_wattage() {
        let c = Classifier::default();
        assert_eq!(c.plug_state(&reading(true, Some(0.0))).unwrap(), Status::On);
    }

    #[test]
    fn missing_switch_flag_is_invalid() {
        let c = Classifier::default();
        let mut r = reading(true, Some(10.0));
        r.raw_status.power_on = None;
        assert_eq!(
            c.classify(&r),
            Err(InvalidReading::MissingDataPoint("switch_1".into()))
        );
    }

    #[test]
    fn impossible_wattage_is_invalid() {
        let c = Classifier::default();
        assert!(matches!(
            c.classify(&reading(true, Some(-1.0))),
            Err(InvalidReading::BadWattage(_))
        ));
        assert!(matches!(
            c.classify(&reading(false, Some(f64::NAN))),
            Err(InvalidReading::BadWattage(_))
        ));
    }

    #[test]
    fn rejects_bad_threshold() {
        assert!(Classifier::new(-0.1).is_err());
        assert!(Classifier::new(f64::INFINITY).is_err());
        assert_eq!(Classifier::new(0.0).unwrap().threshold_watts(), 0.0);
    }

    #[test]
    fn status_string_roundtrip() {
        assert_eq!("On".parse::<Status>().unwrap(), Status::On);
        assert_eq!(Status::Off.to_string(), "Off");
        assert!("Standby".parse::<Status>().is_err());
    }
}
