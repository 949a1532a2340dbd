//! Mean inflow velocity resolution
//!
//! The mean wind is either given directly as three components or read from a
//! single-record velocity timetable (`time speed direction_deg`). Direction
//! uses the mathematical convention: radians counter-clockwise from +x, with
//! `u = speed * cos(dir)` and `v = speed * sin(dir)`.

use crate::config::VelocitySource;
use crate::core_types::{Degrees, Radians, Vec3};
use crate::error::{InitError, Result};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

/// One `time speed direction` record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimetableRecord {
    /// Record time (s)
    pub time: f64,
    /// Horizontal wind speed (m/s)
    pub speed: f64,
    /// Wind direction
    pub direction: Degrees,
}

impl TimetableRecord {
    /// Read the first record of a timetable file
    ///
    /// # Errors
    ///
    /// `TimetableUnavailable` if the file cannot be read, `TimetableMalformed`
    /// if it is not UTF-8 text or its first three fields are missing or not
    /// numbers.
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::InvalidData => InitError::TimetableMalformed {
                path: path.to_path_buf(),
                reason: format!("not valid UTF-8 text: {source}"),
            },
            _ => InitError::TimetableUnavailable {
                path: path.to_path_buf(),
                source,
            },
        })?;
        let record = text.parse::<Self>().map_err(|reason| InitError::TimetableMalformed {
            path: path.to_path_buf(),
            reason,
        })?;
        let extra = text.split_whitespace().count().saturating_sub(3);
        if extra > 0 {
            warn!(
                "Ignoring {} trailing field(s) in velocity timetable {}",
                extra,
                path.display()
            );
        }
        Ok(record)
    }

    /// Horizontal wind vector for this record, zero vertical component
    pub fn mean_velocity(&self) -> Vec3 {
        let rad: Radians = self.direction.to_radians();
        Vec3::new(self.speed * rad.cos(), self.speed * rad.sin(), 0.0)
    }
}

impl FromStr for TimetableRecord {
    type Err = String;

    /// Parse the first three whitespace-separated fields; anything after is ignored
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut fields = s.split_whitespace();
        let mut next = |name: &str| -> std::result::Result<f64, String> {
            let token = fields
                .next()
                .ok_or_else(|| format!("missing `{name}` field"))?;
            token
                .parse::<f64>()
                .map_err(|_| format!("`{name}` field is not a number: `{token}`"))
        };
        let time = next("time")?;
        let speed = next("speed")?;
        let direction = Degrees::new(next("direction")?);
        Ok(Self {
            time,
            speed,
            direction,
        })
    }
}

/// The resolved mean velocity and where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VelocityState {
    Constant(Vec3),
    Timetable(TimetableRecord),
}

impl VelocityState {
    pub fn mean_velocity(&self) -> Vec3 {
        match self {
            VelocityState::Constant(v) => *v,
            VelocityState::Timetable(record) => record.mean_velocity(),
        }
    }
}

/// Resolves the mean velocity once, at construction
#[derive(Debug, Clone)]
pub struct VelocityIntentResolver {
    state: VelocityState,
    mean: Vec3,
}

impl VelocityIntentResolver {
    /// Resolve a velocity source, reading the timetable if one is configured
    ///
    /// # Errors
    ///
    /// Propagates timetable read and parse errors.
    pub fn new(source: &VelocitySource) -> Result<Self> {
        let state = match source {
            VelocitySource::Constant([u, v, w]) => VelocityState::Constant(Vec3::new(*u, *v, *w)),
            VelocitySource::Timetable(path) => {
                let record = TimetableRecord::read(path)?;
                info!(
                    "Velocity timetable {}: t={}s, speed={} m/s, direction={}",
                    path.display(),
                    record.time,
                    record.speed,
                    record.direction
                );
                VelocityState::Timetable(record)
            }
        };
        let mean = state.mean_velocity();
        Ok(Self { state, mean })
    }

    pub fn state(&self) -> &VelocityState {
        &self.state
    }

    /// Mean `[u, v, w]` applied to every cell
    pub fn mean_velocity(&self) -> Vec3 {
        self.mean
    }
}
