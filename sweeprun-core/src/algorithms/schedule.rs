//! Temperature decay schedules for simulated annealing.
//!
//! Schedules are sweepable parameter values. They display as their initial
//! temperature and report their type and current value as diagnostics.

use crate::record::Record;
use crate::value::{Diagnostics, SweepComponent, Value};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::str::FromStr;

/// Decay law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayKind {
    /// `T(t) = T0 * decay^t`
    Geometric,
    /// `T(t) = T0 - decay * t`
    Arithmetic,
    /// `T(t) = T0 * exp(-decay * t)`
    Exponential,
}

impl DecayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecayKind::Geometric => "geometric",
            DecayKind::Arithmetic => "arithmetic",
            DecayKind::Exponential => "exponential",
        }
    }

    fn default_rate(&self) -> f64 {
        match self {
            DecayKind::Geometric => 0.99,
            DecayKind::Arithmetic => 0.0001,
            DecayKind::Exponential => 0.005,
        }
    }
}

impl FromStr for DecayKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "geometric" | "geom" => Ok(DecayKind::Geometric),
            "arithmetic" | "arith" => Ok(DecayKind::Arithmetic),
            "exponential" | "exp" => Ok(DecayKind::Exponential),
            other => Err(format!("unknown decay kind '{other}'")),
        }
    }
}

/// A temperature schedule, floored at `min_temp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecaySchedule {
    pub kind: DecayKind,
    pub init_temp: f64,
    pub rate: f64,
    pub min_temp: f64,
}

impl DecaySchedule {
    pub fn new(kind: DecayKind, init_temp: f64) -> Self {
        Self {
            kind,
            init_temp,
            rate: kind.default_rate(),
            min_temp: 0.001,
        }
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Temperature after `t` steps (or seconds, for diagnostics).
    pub fn evaluate(&self, t: f64) -> f64 {
        let temp = match self.kind {
            DecayKind::Geometric => self.init_temp * self.rate.powf(t),
            DecayKind::Arithmetic => self.init_temp - self.rate * t,
            DecayKind::Exponential => self.init_temp * (-self.rate * t).exp(),
        };
        temp.max(self.min_temp)
    }
}

impl Default for DecaySchedule {
    fn default() -> Self {
        Self::new(DecayKind::Geometric, 1.0)
    }
}

impl Diagnostics for DecaySchedule {
    fn diagnostics(&self, elapsed_secs: f64) -> Record {
        let mut info = Record::with_capacity(5);
        info.insert("schedule_type", self.kind.as_str());
        info.insert("schedule_init_temp", self.init_temp);
        info.insert("schedule_decay", self.rate);
        info.insert("schedule_min_temp", self.min_temp);
        info.insert("schedule_current_value", self.evaluate(elapsed_secs));
        info
    }
}

impl SweepComponent for DecaySchedule {
    fn short_name(&self) -> String {
        Value::Float(self.init_temp).to_string()
    }

    fn diagnostics(&self) -> Option<&dyn Diagnostics> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
