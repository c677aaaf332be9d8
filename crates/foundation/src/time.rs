/// Simulation time coordinate. Units are whatever the dataset uses (years for
/// the temporal city models).
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct Time(pub f64);

/// Inclusive time interval `[start, end]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimeSpan {
    pub start: Time,
    pub end: Time,
}

impl TimeSpan {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start: Time(start),
            end: Time(end),
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.start.0 <= self.end.0
    }

    /// Both endpoints are inclusive.
    pub fn contains(&self, t: Time) -> bool {
        t.0 >= self.start.0 && t.0 <= self.end.0
    }

    /// `(end - start) / 2`, unclamped.
    pub fn half_duration(&self) -> f64 {
        (self.end.0 - self.start.0) / 2.0
    }

    /// Smallest span covering both.
    pub fn union(&self, other: TimeSpan) -> TimeSpan {
        TimeSpan {
            start: Time(self.start.0.min(other.start.0)),
            end: Time(self.end.0.max(other.end.0)),
        }
    }
}
