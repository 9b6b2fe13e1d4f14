use std::fmt;
use std::str::FromStr;

use crate::error::{HarnessError, HarnessResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimeUnit {
    Fs,
    Ps,
    Ns,
    Us,
    Ms,
    Sec,
}

impl TimeUnit {
    /// Power of ten of one unit in seconds.
    pub fn exponent(self) -> i8 {
        match self {
            TimeUnit::Fs => -15,
            TimeUnit::Ps => -12,
            TimeUnit::Ns => -9,
            TimeUnit::Us => -6,
            TimeUnit::Ms => -3,
            TimeUnit::Sec => 0,
        }
    }
}

impl FromStr for TimeUnit {
    type Err = HarnessError;

    fn from_str(unit: &str) -> Result<Self, Self::Err> {
        match unit {
            "fs" => Ok(TimeUnit::Fs),
            "ps" => Ok(TimeUnit::Ps),
            "ns" => Ok(TimeUnit::Ns),
            "us" => Ok(TimeUnit::Us),
            "ms" => Ok(TimeUnit::Ms),
            "sec" => Ok(TimeUnit::Sec),
            _ => Err(HarnessError::UnknownTimeUnit(unit.to_string())),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeUnit::Fs => "fs",
            TimeUnit::Ps => "ps",
            TimeUnit::Ns => "ns",
            TimeUnit::Us => "us",
            TimeUnit::Ms => "ms",
            TimeUnit::Sec => "sec",
        };
        f.write_str(s)
    }
}

/// Converts `time` given in `unit` to whole simulation steps of size `precision`.
/// Refuses to round: a duration finer than the precision is an error.
pub(crate) fn to_steps(time: u64, unit: TimeUnit, precision: TimeUnit) -> HarnessResult<u64> {
    let inexact = || HarnessError::InexactTime {
        time,
        unit,
        precision,
    };
    let diff = unit.exponent() - precision.exponent();
    if diff >= 0 {
        time.checked_mul(10_u64.pow(diff as u32)).ok_or_else(inexact)
    } else {
        let div = 10_u64.pow(-diff as u32);
        if time % div == 0 {
            Ok(time / div)
        } else {
            Err(inexact())
        }
    }
}

/// Converts steps back to `unit`. Loses precision for large values, use for display only.
pub(crate) fn from_steps(steps: u64, unit: TimeUnit, precision: TimeUnit) -> f64 {
    ldexp10(steps as f64, precision.exponent() - unit.exponent())
}

fn ldexp10(frac: f64, exp: i8) -> f64 {
    // Like math.ldexp, but base 10
    if exp >= 0 {
        frac * 10_u64.pow(exp as u32) as f64
    } else {
        let div = 10_u64.pow(-exp as u32) as f64;
        frac / div
    }
}
