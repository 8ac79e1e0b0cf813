//! # Calorie burnt
//!
//! Calories burnt during one time slice of a cardio session. Three interchangeable
//! methods are supported:
//!
//! - MET - metabolic equivalent looked up from speed bands
//!   (compendium of physical activities):
//!
//! ```notrust
//! kcal = MET x 3.5 x weight(kg) x time(min) / 200
//! ```
//!
//! - ACSM - oxygen consumption for running with treadmill incline:
//!
//! ```notrust
//! VO2 = 0.2 x speed(m/min) + 0.9 x speed(m/min) x incline + 3.5
//! kcal/min = VO2 x weight(kg) / 1000 x 5
//! ```
//!
//! - Heart rate - Keytel regression:
//!
//! ```notrust
//! Men:   kcal/min = (-55.0969 + 0.6309 x HR + 0.1988 x W + 0.2017 x A) / 4.184
//! Women: kcal/min = (-20.4022 + 0.4472 x HR + 0.1263 x W + 0.074 x A) / 4.184
//! ```
//!
//! Speed under 1 km/h is a pause and burns nothing whatever the method. ACSM falls back to MET
//! under 4.8 km/h and heart rate falls back to MET when no reading is available, so
//! [`estimate`] always returns a finite, non-negative number.

use std::time::Duration;

mod error;
mod profile;
mod session;
mod smoothing;

pub use self::{error::*, profile::*, session::*, smoothing::*};

/// Speed under which a sample counts as a pause
pub const PAUSE_SPEED_KMH: f64 = 1.0;

/// ACSM running equation is not calibrated for walking speed
pub const ACSM_MIN_SPEED_KMH: f64 = 4.8;

/// Upper bound (exclusive) of speed band in km/h and its MET value
const MET_BANDS: [(f64, f64); 11] = [
    (3.2, 2.0),   // Walking, slow
    (4.8, 3.0),   // Walking, moderate
    (5.6, 3.5),   // Walking, brisk
    (6.4, 5.0),   // Walking, very brisk
    (8.0, 8.3),   // Jogging
    (9.7, 9.8),   // Running
    (11.3, 11.0), // Running
    (12.9, 11.8), // Running
    (14.5, 12.8), // Running
    (16.1, 14.5), // Running
    (17.7, 16.0), // Running
];

/// Running faster than 17.7 km/h
const MAX_MET: f64 = 19.0;

const KJ_PER_KCAL: f64 = 4.184;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Sex {
    #[default]
    Male,
    Female,
    /// Uses female coefficients of the Keytel regression
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
#[cfg_attr(feature = "binary", derive(clap::ValueEnum))]
pub enum CalculationMethod {
    #[default]
    Met,
    Acsm,
    HeartRate,
}

/// Snapshot of biometric and motion data for one time slice.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    pub method: CalculationMethod,
    /// Weight in kilograms
    pub weight: f64,
    /// Age in years
    pub age: u8,
    pub sex: Sex,
    /// Time slice covered by this sample
    pub duration: Duration,
    pub speed_kmh: f64,
    /// Incline in percent, negative for descent. `None` or non-finite counts as flat
    pub incline: Option<f64>,
    /// Beats per minute. `None` or non-positive means no monitor is available
    pub heart_rate: Option<f64>,
}

impl Sample {
    pub const fn new(weight: f64, duration: Duration, speed_kmh: f64) -> Self {
        Self {
            method: CalculationMethod::Met,
            weight,
            age: DEFAULT_AGE,
            sex: Sex::Male,
            duration,
            speed_kmh,
            incline: None,
            heart_rate: None,
        }
    }

    pub const fn set_method(mut self, method: CalculationMethod) -> Self {
        self.method = method;
        self
    }

    pub const fn set_age(mut self, age: u8) -> Self {
        self.age = age;
        self
    }

    pub const fn set_sex(mut self, sex: Sex) -> Self {
        self.sex = sex;
        self
    }

    pub const fn set_incline(mut self, incline: Option<f64>) -> Self {
        self.incline = incline;
        self
    }

    pub const fn set_heart_rate(mut self, heart_rate: Option<f64>) -> Self {
        self.heart_rate = heart_rate;
        self
    }
}

#[inline]
fn clamp_nonneg(x: f64) -> f64 {
    if x.is_finite() && x > 0.0 { x } else { 0.0 }
}

#[inline]
fn minutes(duration: Duration) -> f64 {
    duration.as_secs_f64() / 60.0
}

/// MET value for speed in km/h
pub fn met_value(speed_kmh: f64) -> f64 {
    MET_BANDS
        .iter()
        .find(|(upper, _)| speed_kmh < *upper)
        .map(|(_, met)| *met)
        .unwrap_or(MAX_MET)
}

pub fn met_calories(weight: f64, duration: Duration, speed_kmh: f64) -> f64 {
    clamp_nonneg((met_value(speed_kmh) * 3.5 * weight * minutes(duration)) / 200.0)
}

/// Falls back to [`met_calories`] under [`ACSM_MIN_SPEED_KMH`].
///
/// # Params
/// - `incline` - grade in percent
pub fn acsm_calories(weight: f64, duration: Duration, speed_kmh: f64, incline: f64) -> f64 {
    if speed_kmh < ACSM_MIN_SPEED_KMH {
        return met_calories(weight, duration, speed_kmh);
    }

    let speed_mpm = (speed_kmh * 1000.0) / 60.0;
    let incline_fraction = incline / 100.0;
    let vo2 = (0.2 * speed_mpm) + (0.9 * speed_mpm * incline_fraction) + 3.5;
    let kcal_per_min = (vo2 * weight / 1000.0) * 5.0;

    clamp_nonneg(kcal_per_min * minutes(duration))
}

/// Keytel regression. Low heart rates can give negative energy, which is clamped to zero.
pub fn keytel_calories(weight: f64, age: u8, sex: Sex, duration: Duration, heart_rate: f64) -> f64 {
    let age = f64::from(age);

    let kj_per_min = match sex {
        Sex::Male => -55.0969 + (0.6309 * heart_rate) + (0.1988 * weight) + (0.2017 * age),
        Sex::Female | Sex::Other => {
            -20.4022 + (0.4472 * heart_rate) + (0.1263 * weight) + (0.074 * age)
        }
    };

    let kcal_per_min = clamp_nonneg(kj_per_min / KJ_PER_KCAL);

    clamp_nonneg(kcal_per_min * minutes(duration))
}

/// Calories burnt during the sample's time slice.
pub fn estimate(sample: &Sample) -> f64 {
    let Sample {
        method,
        weight,
        age,
        sex,
        duration,
        speed_kmh,
        incline,
        heart_rate,
    } = *sample;

    if speed_kmh.is_nan() || speed_kmh < PAUSE_SPEED_KMH {
        return 0.0;
    }

    match method {
        CalculationMethod::Met => met_calories(weight, duration, speed_kmh),
        CalculationMethod::Acsm => {
            let incline = incline.filter(|this| this.is_finite()).unwrap_or_default();
            acsm_calories(weight, duration, speed_kmh, incline)
        }
        CalculationMethod::HeartRate => match heart_rate.filter(|this| *this > 0.0) {
            Some(heart_rate) => keytel_calories(weight, age, sex, duration, heart_rate),
            None => met_calories(weight, duration, speed_kmh),
        },
    }
}
