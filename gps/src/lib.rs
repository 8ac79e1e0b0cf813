//! Distance between coordinates.
//!
//! If we have two coordinates we could use Haversine formula:
//!
//! ```norust
//! d=2R*sin ^ −1(√(sin^2((Φ2​−Φ1​​)/2)+cos(Φ1​)cos(Φ2​)sin^2((λ2​−λ1​​)/2)))
//! ```
//!
//! where:
//!
//! - R – Earth's radius (R = 6371 km);
//! - λ1, φ₁ – First point longitude and latitude coordinates;
//! - λ2, φ₂ – Second point longitude and latitude coordinates;
//! - d – Distance between them along Earth's surface.
//!
//! Altitude is not part of the distance. It only feeds the elevation gain of a [`Track`].

mod models;

use std::time::Duration;

pub use models::*;

/// Radius of Earth
pub const R: f64 = 6371.0;

const WINDOW_SIZE: usize = 2;

/// Movement between two consecutive points.
///
/// Duration saturates at zero if the points are out of order.
pub fn movement(first: &Gps, second: &Gps) -> Movement {
    Movement {
        distance: Distance::from_kilometers(haversine(
            first.longitude,
            first.latitude,
            second.longitude,
            second.latitude,
        )),
        duration: second.timestamp.saturating_sub(first.timestamp),
    }
}

pub fn movement_from_gps(data: impl IntoIterator<Item = Gps>) -> Vec<Movement> {
    let data = data.into_iter().collect::<Vec<_>>();

    data.windows(WINDOW_SIZE)
        .map(|this| movement(&this[0], &this[1]))
        .collect()
}

/// Calculates distance from point A to point B in kilometers
pub fn haversine(longitude_1: f64, latitude_1: f64, longitude_2: f64, latitude_2: f64) -> f64 {
    let d_lat = (std::f64::consts::PI / 180.0) * (latitude_2 - latitude_1);
    let d_lon = (std::f64::consts::PI / 180.0) * (longitude_2 - longitude_1);

    // convert to radians
    let latitude_1 = (std::f64::consts::PI / 180.0) * latitude_1;
    let latitude_2 = (std::f64::consts::PI / 180.0) * latitude_2;

    R * (2.0
        * ((d_lat / 2.0).sin().powi(2)
            + (d_lon / 2.0).sin().powi(2) * latitude_1.cos() * latitude_2.cos())
        .sqrt()
        .asin())
}

/// Accumulates distance and elevation gain from a live stream of positions.
#[derive(Debug, Clone, Default)]
pub struct Track {
    last: Option<Gps>,
    distance: Distance,
    elevation_gain: f64,
}

impl Track {
    pub const fn new() -> Self {
        Self {
            last: None,
            distance: Distance::ZERO,
            elevation_gain: 0.0,
        }
    }

    /// Adds a position. Returns the movement from the previous position, `None` for the first one.
    ///
    /// Climb is only counted when both positions carry an altitude.
    pub fn push(&mut self, point: Gps) -> Option<Movement> {
        let movement = match &self.last {
            Some(last) => {
                if let (Some(from), Some(to)) = (last.altitude, point.altitude) {
                    let climb = to - from;
                    if climb > 0.0 {
                        self.elevation_gain += climb;
                    }
                }

                let step = movement(last, &point);
                self.distance += step.distance;
                Some(step)
            }
            None => None,
        };

        self.last = Some(point);

        movement
    }

    /// Forgets the last position, so the next one starts a new segment.
    pub fn break_segment(&mut self) {
        self.last = None;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub const fn distance(&self) -> Distance {
        self.distance
    }

    /// Total climb in meters
    pub const fn elevation_gain(&self) -> f64 {
        self.elevation_gain
    }

    pub const fn last(&self) -> Option<&Gps> {
        self.last.as_ref()
    }
}

/// Pace for a covered distance. `None` if nothing was covered yet.
pub fn pace(distance: Distance, elapsed: Duration) -> Option<Pace> {
    let km = distance.as_kilometers();

    if km <= 0.0 || elapsed.is_zero() {
        return None;
    }

    let secs = (elapsed.as_secs_f64() / km).round();

    if !secs.is_finite() {
        return None;
    }

    Some(Pace::from_secs_per_km(secs as u64))
}

#[inline]
pub fn average_speed_kmh(distance: Distance, elapsed: Duration) -> f64 {
    if distance.as_kilometers() <= 0.0 || elapsed.is_zero() {
        return 0.0;
    }

    distance.as_kilometers() / (elapsed.as_secs_f64() / 60.0 / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(secs: u64, latitude: f64, longitude: f64, altitude: Option<f64>) -> Gps {
        Gps {
            timestamp: Duration::from_secs(secs),
            latitude,
            longitude,
            altitude,
        }
    }

    #[test]
    fn test_haversine_flat_large() {
        let latitude_1 = 51.5007;
        let longitude_1 = 0.1246;

        let latitude_2 = 40.6892;
        let longitude_2 = 74.0445;

        let actual = haversine(longitude_1, latitude_1, longitude_2, latitude_2);

        assert!((actual - 5574.84).abs() < 0.01, "{actual}");
    }

    #[test]
    fn test_haversine_flat_small() {
        let latitude_1 = 49.235835445219784;
        let longitude_1 = 28.48586563389628;

        let latitude_2 = 49.23297532196681;
        let longitude_2 = 28.493329182275833;

        let actual = haversine(longitude_1, latitude_1, longitude_2, latitude_2);

        assert!((actual - 0.628333).abs() < 1e-5, "{actual}");
    }

    #[test]
    fn test_haversine_same_point() {
        assert_eq!(haversine(28.4, 49.2, 28.4, 49.2), 0.0);
    }

    #[test]
    fn movement_speed() {
        let data = [
            point(1000, 49.235835445219784, 28.48586563389628, None),
            point(2000, 49.23297532196681, 28.493329182275833, None),
        ];

        let movements = movement_from_gps(data);

        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].duration, Duration::from_secs(1000));
        // 0.628 km in 1000 s
        assert!((movements[0].speed_kmhr() - 2.262).abs() < 0.001);
    }

    #[test]
    fn movement_out_of_order_has_no_speed() {
        let first = point(2000, 49.2358, 28.4858, None);
        let second = point(1000, 49.2329, 28.4933, None);

        let movement = movement(&first, &second);

        assert_eq!(movement.duration, Duration::ZERO);
        assert_eq!(movement.speed_kmhr(), 0.0);
    }

    #[test]
    fn track_accumulates_distance() {
        let mut track = Track::new();

        assert!(track.push(point(0, 49.2358, 28.4858, None)).is_none());
        let first = track.push(point(5, 49.2340, 28.4900, None)).expect("second point");
        let second = track.push(point(10, 49.2329, 28.4933, None)).expect("third point");

        let expected = first.distance.as_kilometers() + second.distance.as_kilometers();

        assert!((track.distance().as_kilometers() - expected).abs() < 1e-12);
        assert!(track.distance().as_meters() > 0.0);
        assert_eq!(track.elevation_gain(), 0.0);
    }

    #[test]
    fn track_counts_only_climb() {
        let mut track = Track::new();

        track.push(point(0, 49.0, 28.0, Some(100.0)));
        track.push(point(5, 49.0001, 28.0, Some(104.5)));
        track.push(point(10, 49.0002, 28.0, Some(101.0)));
        track.push(point(15, 49.0003, 28.0, Some(103.0)));

        assert!((track.elevation_gain() - 6.5).abs() < 1e-9);
    }

    #[test]
    fn track_ignores_missing_altitude() {
        let mut track = Track::new();

        track.push(point(0, 49.0, 28.0, None));
        track.push(point(5, 49.0001, 28.0, Some(500.0)));
        track.push(point(10, 49.0002, 28.0, None));

        assert_eq!(track.elevation_gain(), 0.0);
    }

    #[test]
    fn track_break_segment_skips_gap() {
        let mut track = Track::new();

        track.push(point(0, 49.0, 28.0, None));
        track.push(point(5, 49.001, 28.0, None));
        let before = track.distance();

        track.break_segment();
        assert!(track.push(point(60, 49.5, 28.0, None)).is_none());
        assert_eq!(track.distance(), before);

        track.reset();
        assert_eq!(track.distance(), Distance::ZERO);
        assert!(track.last().is_none());
    }

    #[test]
    fn pace_display() {
        // 5 km in 25:35
        let pace = pace(Distance::from_kilometers(5.0), Duration::from_secs(25 * 60 + 35))
            .expect("distance covered");

        assert_eq!(pace.as_secs_per_km(), 307);
        assert_eq!(pace.to_string(), "5'07\"");
    }

    #[test]
    fn pace_never_shows_sixty_seconds() {
        // 359.6 s/km rounds to 6'00", not 5'60"
        let pace = pace(Distance::from_kilometers(1.0), Duration::from_millis(359_600))
            .expect("distance covered");

        assert_eq!(pace.to_string(), "6'00\"");
    }

    #[test]
    fn pace_none_without_distance() {
        assert!(pace(Distance::ZERO, Duration::from_secs(60)).is_none());
        assert!(pace(Distance::from_kilometers(1.0), Duration::ZERO).is_none());
    }

    #[test]
    fn average_speed() {
        let speed = average_speed_kmh(Distance::from_meters(2500.0), Duration::from_secs(900));

        assert!((speed - 10.0).abs() < 1e-9);
        assert_eq!(average_speed_kmh(Distance::ZERO, Duration::from_secs(900)), 0.0);
    }
}
