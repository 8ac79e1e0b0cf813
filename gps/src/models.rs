use std::time::Duration;

#[derive(Debug, Clone, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gps {
    /// UNIX timestamp e.g. duration after [`std::time::UNIX_EPOCH`]
    pub timestamp: Duration,
    pub latitude: f64,
    pub longitude: f64,
    /// The altitude of location in meters above the WGS84 reference ellipsoid
    pub altitude: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Distance(f64);

impl Distance {
    pub const ZERO: Self = Self(0.0);

    pub const fn from_kilometers(km: f64) -> Self {
        Self(km)
    }

    pub const fn from_meters(m: f64) -> Self {
        Self(m / 1000.0)
    }

    pub const fn as_kilometers(self) -> f64 {
        self.0
    }

    pub const fn as_meters(self) -> f64 {
        self.0 * 1000.0
    }
}

impl std::ops::Add for Distance {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Distance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

#[derive(Debug, Clone, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Movement {
    pub distance: Distance,
    pub duration: Duration,
}

impl Movement {
    /// Average speed over the movement. Zero for a zero duration.
    pub fn speed_kmhr(&self) -> f64 {
        let hours = self.duration.as_secs_f64() / 60.0 / 60.0;

        if hours <= 0.0 {
            return 0.0;
        }

        self.distance.as_kilometers() / hours
    }
}

/// Running pace, stored as whole seconds per kilometer.
///
/// Displays as `M'SS"`, e.g. `5'07"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Pace(u64);

impl Pace {
    pub const fn from_secs_per_km(secs: u64) -> Self {
        Self(secs)
    }

    pub const fn as_secs_per_km(self) -> u64 {
        self.0
    }

    pub const fn minutes(self) -> u64 {
        self.0 / 60
    }

    pub const fn seconds(self) -> u64 {
        self.0 % 60
    }
}

impl std::fmt::Display for Pace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}'{:02}\"", self.minutes(), self.seconds())
    }
}
