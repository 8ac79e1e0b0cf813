use crate::{Sex, ValidationError};

pub const DEFAULT_WEIGHT: f64 = 70.0;
pub const DEFAULT_AGE: u8 = 30;
pub const DEFAULT_HEIGHT_CM: f64 = 175.0;

/// Biometrics the estimator needs from the user.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct UserProfile {
    /// Weight in kilograms
    pub weight: f64,
    /// Age in years
    pub age: u8,
    /// Not used by any calculation method yet
    pub height_cm: f64,
    pub sex: Sex,
}

impl UserProfile {
    pub const fn new() -> Self {
        Self {
            weight: DEFAULT_WEIGHT,
            age: DEFAULT_AGE,
            height_cm: DEFAULT_HEIGHT_CM,
            sex: Sex::Male,
        }
    }

    pub const fn set_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub const fn set_age(mut self, age: u8) -> Self {
        self.age = age;
        self
    }

    pub const fn set_height_cm(mut self, height_cm: f64) -> Self {
        self.height_cm = height_cm;
        self
    }

    pub const fn set_sex(mut self, sex: Sex) -> Self {
        self.sex = sex;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(ValidationError::NonPositiveWeight(self.weight));
        }

        Ok(())
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "binary")]
impl UserProfile {
    /// Read profile from a TOML file. Missing keys keep their defaults.
    pub fn from_toml_path(
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();

        let contents = std::fs::read_to_string(path).map_err(|e| {
            format!(
                "Failed to read profile {}. Reason: {e}",
                path.to_string_lossy()
            )
        })?;

        let profile = toml::from_str::<Self>(&contents)
            .map_err(|e| format!("Failed to parse profile. Reason: {e}"))?;

        profile.validate()?;

        tracing::info!(
            path = %path.to_string_lossy(),
            weight = profile.weight,
            age = profile.age,
            sex = ?profile.sex,
            "profile loaded"
        );

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let profile = UserProfile::default();

        assert_eq!(profile.weight, 70.0);
        assert_eq!(profile.age, 30);
        assert_eq!(profile.height_cm, 175.0);
        assert_eq!(profile.sex, Sex::Male);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn rejects_bad_weight() {
        for weight in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let profile = UserProfile::new().set_weight(weight);

            assert!(matches!(
                profile.validate(),
                Err(ValidationError::NonPositiveWeight(_))
            ));
        }
    }

    #[cfg(feature = "binary")]
    #[test]
    fn loads_partial_toml() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "weight = 62.5\nsex = \"female\"").unwrap();

        let profile = UserProfile::from_toml_path(file.path()).unwrap();

        assert_eq!(
            profile,
            UserProfile::new().set_weight(62.5).set_sex(Sex::Female)
        );
    }

    #[cfg(feature = "binary")]
    #[test]
    fn rejects_invalid_toml_profile() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "weight = -3.0").unwrap();

        assert!(UserProfile::from_toml_path(file.path()).is_err());
    }
}
