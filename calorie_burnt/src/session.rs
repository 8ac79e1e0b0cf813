//! Cardio session controller.
//!
//! Owns the running calorie total of one run or walk. A timer outside this crate calls
//! [`CardioSession::tick`] once per sampling interval while the session is running.

use std::time::Duration;

use gps::{Distance, Gps, Movement, Pace, Track};

use crate::{
    CalculationMethod, MovingAverage, Sample, SessionError, UserProfile, ValidationError, estimate,
};

/// Interval between two calorie samples
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Number of incline readings averaged before estimation
pub const DEFAULT_INCLINE_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Paused,
    Finished,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Running => write!(f, "running"),
            SessionState::Paused => write!(f, "paused"),
            SessionState::Finished => write!(f, "finished"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub method: CalculationMethod,
    /// Time slice covered by one tick
    pub interval: Duration,
    /// Capacity of the incline moving average
    pub incline_window: usize,
}

impl SessionOptions {
    pub const fn new() -> Self {
        Self {
            method: CalculationMethod::Met,
            interval: DEFAULT_INTERVAL,
            incline_window: DEFAULT_INCLINE_WINDOW,
        }
    }

    pub const fn set_method(mut self, method: CalculationMethod) -> Self {
        self.method = method;
        self
    }

    pub const fn set_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub const fn set_incline_window(mut self, incline_window: usize) -> Self {
        self.incline_window = incline_window;
        self
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Motion reading taken at a tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reading {
    pub speed_kmh: f64,
    /// Raw incline in percent, smoothed by the session
    pub incline: Option<f64>,
}

/// Finished workout as stored in history.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkoutSummary {
    pub method: CalculationMethod,
    pub duration: Duration,
    pub distance: Distance,
    pub calories: f64,
    pub pace: Option<Pace>,
    pub average_speed_kmh: f64,
    pub average_heart_rate: Option<u16>,
    /// Climb in meters
    pub elevation_gain: f64,
}

#[derive(Debug)]
pub struct CardioSession {
    profile: UserProfile,
    options: SessionOptions,
    state: SessionState,
    incline: MovingAverage,
    track: Track,
    elapsed: Duration,
    calories: f64,
    heart_rate: Option<u16>,
    heart_rates: Vec<u16>,
}

impl CardioSession {
    pub fn new(profile: UserProfile, options: SessionOptions) -> Result<Self, ValidationError> {
        profile.validate()?;

        if options.interval.is_zero() {
            return Err(ValidationError::ZeroInterval);
        }

        let incline = MovingAverage::try_new(options.incline_window)?;

        Ok(Self {
            profile,
            options,
            state: SessionState::Idle,
            incline,
            track: Track::new(),
            elapsed: Duration::ZERO,
            calories: 0.0,
            heart_rate: None,
            heart_rates: Vec::new(),
        })
    }

    fn transition(&mut self, from: &[SessionState], to: SessionState) -> Result<(), SessionError> {
        if !from.contains(&self.state) {
            tracing::warn!(from = %self.state, to = %to, "rejected cardio session transition");

            return Err(SessionError::InvalidTransition {
                from: self.state,
                to,
            });
        }

        tracing::info!(from = %self.state, to = %to, "cardio session");
        self.state = to;

        Ok(())
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        self.transition(&[SessionState::Idle], SessionState::Running)
    }

    /// Pausing also ends the current GPS segment, so the gap isn't counted as distance.
    pub fn pause(&mut self) -> Result<(), SessionError> {
        self.transition(&[SessionState::Running], SessionState::Paused)?;
        self.track.break_segment();

        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        self.transition(&[SessionState::Paused], SessionState::Running)
    }

    pub fn finish(&mut self) -> Result<WorkoutSummary, SessionError> {
        self.transition(
            &[SessionState::Running, SessionState::Paused],
            SessionState::Finished,
        )?;

        let summary = self.summary();

        tracing::info!(
            calories = summary.calories,
            distance_km = summary.distance.as_kilometers(),
            duration_secs = summary.duration.as_secs(),
            "cardio session finished"
        );

        Ok(summary)
    }

    /// Back to [`SessionState::Idle`] with every total cleared.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.incline.reset();
        self.track.reset();
        self.elapsed = Duration::ZERO;
        self.calories = 0.0;
        self.heart_rate = None;
        self.heart_rates.clear();
    }

    /// Ignored unless running.
    pub fn record_position(&mut self, point: Gps) -> Option<Movement> {
        if self.state != SessionState::Running {
            tracing::debug!(state = %self.state, "position ignored");
            return None;
        }

        self.track.push(point)
    }

    /// Latest reading from the heart rate monitor, `0` when it's unpaired.
    ///
    /// Only readings taken while running count towards the average.
    pub fn record_heart_rate(&mut self, bpm: u16) {
        self.heart_rate = (bpm > 0).then_some(bpm);

        if self.state == SessionState::Running {
            self.heart_rates.push(bpm);
        }
    }

    /// Estimate calories for one interval and add them to the total. Returns the delta.
    pub fn tick(&mut self, reading: Reading) -> f64 {
        if self.state != SessionState::Running {
            tracing::debug!(state = %self.state, "tick ignored");
            return 0.0;
        }

        let incline = match reading.incline.filter(|this| this.is_finite()) {
            Some(incline) => Some(self.incline.next(incline)),
            None => self.incline.average(),
        };

        let sample = Sample {
            method: self.options.method,
            weight: self.profile.weight,
            age: self.profile.age,
            sex: self.profile.sex,
            duration: self.options.interval,
            speed_kmh: reading.speed_kmh,
            incline,
            heart_rate: self.heart_rate.map(f64::from),
        };

        let delta = estimate(&sample);

        self.calories += delta;
        self.elapsed = self.elapsed.saturating_add(self.options.interval);

        tracing::debug!(
            speed_kmh = reading.speed_kmh,
            incline = ?incline,
            heart_rate = ?self.heart_rate,
            delta,
            total = self.calories,
            "cardio tick"
        );

        delta
    }

    pub fn summary(&self) -> WorkoutSummary {
        let distance = self.track.distance();

        WorkoutSummary {
            method: self.options.method,
            duration: self.elapsed,
            distance,
            calories: self.calories,
            pace: gps::pace(distance, self.elapsed),
            average_speed_kmh: gps::average_speed_kmh(distance, self.elapsed),
            average_heart_rate: heart_rate::average_heart_rate(self.heart_rates.iter().copied()),
            elevation_gain: self.track.elevation_gain(),
        }
    }

    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Running calorie total
    pub const fn calories(&self) -> f64 {
        self.calories
    }

    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub const fn distance(&self) -> Distance {
        self.track.distance()
    }

    pub const fn heart_rate(&self) -> Option<u16> {
        self.heart_rate
    }

    pub const fn profile(&self) -> &UserProfile {
        &self.profile
    }
}
