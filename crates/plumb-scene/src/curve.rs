//! Animation curve key data

use serde::{Deserialize, Serialize};

/// Tangent type of one side of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TangentType {
    #[default]
    Auto,
    Spline,
    Linear,
    Flat,
    Clamped,
    Plateau,
    Fixed,
    /// Hold the value until the next key
    Step,
    /// Jump to the next key's value immediately
    StepNext,
}

/// One key on an animation curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Key time in frames
    pub time: f64,
    pub value: f64,
    /// Incoming tangent angle in degrees
    #[serde(default)]
    pub in_angle: f64,
    /// Outgoing tangent angle in degrees
    #[serde(default)]
    pub out_angle: f64,
    #[serde(default)]
    pub in_tangent: TangentType,
    #[serde(default)]
    pub out_tangent: TangentType,
    /// Templated keys are locked against editing
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Keyframe {
    /// A key with flat, auto tangents
    pub fn new(time: f64, value: f64) -> Self {
        Self {
            time,
            value,
            in_angle: 0.0,
            out_angle: 0.0,
            in_tangent: TangentType::Auto,
            out_tangent: TangentType::Auto,
            locked: false,
        }
    }

    pub fn with_angles(mut self, in_angle: f64, out_angle: f64) -> Self {
        self.in_angle = in_angle;
        self.out_angle = out_angle;
        self
    }

    pub fn with_out_tangent(mut self, tangent: TangentType) -> Self {
        self.out_tangent = tangent;
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }
}

/// The keys of one animation curve, ordered by time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimCurve {
    pub keys: Vec<Keyframe>,
}

impl AnimCurve {
    pub fn new(keys: Vec<Keyframe>) -> Self {
        Self { keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn times(&self) -> Vec<f64> {
        self.keys.iter().map(|k| k.time).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.keys.iter().map(|k| k.value).collect()
    }

    /// Absolute incoming tangent angles
    pub fn in_angles(&self) -> Vec<f64> {
        self.keys.iter().map(|k| k.in_angle.abs()).collect()
    }

    /// Absolute outgoing tangent angles
    pub fn out_angles(&self) -> Vec<f64> {
        self.keys.iter().map(|k| k.out_angle.abs()).collect()
    }

    pub fn out_tangents(&self) -> Vec<TangentType> {
        self.keys.iter().map(|k| k.out_tangent).collect()
    }

    pub fn has_locked_keys(&self) -> bool {
        self.keys.iter().any(|k| k.locked)
    }

    /// Value of the curve at `input` (a time, or the driver value for a
    /// set-driven curve).
    ///
    /// Holds the first and last values outside the keyed range. Between keys
    /// the previous key's out tangent decides: `Step` holds, `StepNext`
    /// jumps, anything else interpolates linearly. Tangent angles are not
    /// evaluated. Returns `None` for a curve without keys.
    pub fn evaluate(&self, input: f64) -> Option<f64> {
        let first = self.keys.first()?;
        let last = self.keys.last()?;
        if input <= first.time {
            return Some(first.value);
        }
        if input >= last.time {
            return Some(last.value);
        }

        let next = self.keys.iter().position(|k| k.time > input)?;
        let (a, b) = (&self.keys[next - 1], &self.keys[next]);
        let value = match a.out_tangent {
            TangentType::Step => a.value,
            TangentType::StepNext => b.value,
            _ => {
                let span = b.time - a.time;
                if span <= 0.0 {
                    b.value
                } else {
                    a.value + (b.value - a.value) * (input - a.time) / span
                }
            }
        };
        Some(value)
    }
}
