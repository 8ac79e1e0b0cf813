use std::{collections::VecDeque, num::NonZeroUsize};

use crate::ValidationError;

/// Evicting a value this many times larger than what's left of the sum loses its precision
const REBUILD_RATIO: f64 = 1e3;

/// Sliding window mean used to stabilize noisy sensor input like incline.
///
/// Keeps a running sum, so each [`MovingAverage::next`] is O(1).
#[derive(Debug, Clone)]
pub struct MovingAverage {
    capacity: NonZeroUsize,
    window: VecDeque<f64>,
    sum: f64,
}

impl MovingAverage {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            window: VecDeque::with_capacity(capacity.get() + 1),
            sum: 0.0,
        }
    }

    pub fn try_new(capacity: usize) -> Result<Self, ValidationError> {
        NonZeroUsize::new(capacity)
            .map(Self::new)
            .ok_or(ValidationError::ZeroCapacity)
    }

    /// Add a value and return the mean of the window.
    ///
    /// While warming up the window holds fewer than `capacity` values and the mean covers only those.
    ///
    /// The running sum is rebuilt from the window when an eviction leaves it non-finite or
    /// cancels out most of it, so a single `inf` or huge outlier doesn't outlive its slot.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self, value: f64) -> f64 {
        self.window.push_back(value);
        self.sum += value;

        if self.window.len() > self.capacity.get() {
            if let Some(oldest) = self.window.pop_front() {
                self.sum -= oldest;

                if !self.sum.is_finite() || oldest.abs() > REBUILD_RATIO * self.sum.abs() {
                    self.sum = self.window.iter().sum();
                }
            }
        }

        self.sum / self.window.len() as f64
    }

    /// Mean of the window without adding a value. `None` before the first value.
    pub fn average(&self) -> Option<f64> {
        match self.window.is_empty() {
            true => None,
            false => Some(self.sum / self.window.len() as f64),
        }
    }

    pub const fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.window.len() == self.capacity.get()
    }

    pub fn reset(&mut self) {
        self.window.clear();
        self.sum = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn average(capacity: usize) -> MovingAverage {
        MovingAverage::try_new(capacity).expect("non zero capacity")
    }

    #[test]
    fn warm_up_then_slide() {
        let mut ma = average(3);

        let actual = [10.0, 20.0, 30.0, 40.0].map(|this| ma.next(this));

        assert_eq!(actual, [10.0, 15.0, 20.0, 30.0]);
    }

    #[test]
    fn exact_mean_while_warming_up() {
        let mut ma = average(5);
        let values = [1.5, -2.0, 4.0, 0.25];

        let mut last = 0.0;
        for value in values {
            last = ma.next(value);
        }

        let expected = values.iter().sum::<f64>() / values.len() as f64;

        assert!((last - expected).abs() < 1e-12);
        assert!(!ma.is_full());
        assert_eq!(ma.len(), 4);
    }

    #[test]
    fn mean_of_most_recent_values_only() {
        let mut ma = average(4);
        let values = (1..=20).map(f64::from).collect::<Vec<_>>();

        let mut last = 0.0;
        for value in &values {
            last = ma.next(*value);
        }

        // 17, 18, 19, 20
        assert!((last - 18.5).abs() < 1e-12);
        assert!(ma.is_full());
        assert_eq!(ma.len(), 4);
    }

    #[test]
    fn capacity_one_follows_input() {
        let mut ma = average(1);

        assert_eq!(ma.next(3.0), 3.0);
        assert_eq!(ma.next(-7.5), -7.5);
        assert_eq!(ma.average(), Some(-7.5));
    }

    #[test]
    fn recovers_after_infinity_leaves_window() {
        let mut ma = average(1);

        assert_eq!(ma.next(f64::INFINITY), f64::INFINITY);
        assert_eq!(ma.next(2.0), 2.0);
        assert_eq!(ma.next(4.0), 4.0);
    }

    #[test]
    fn recovers_after_nan_leaves_window() {
        let mut ma = average(3);

        assert_eq!(ma.next(1.0), 1.0);
        assert!(ma.next(f64::NAN).is_nan());
        assert!(ma.next(2.0).is_nan());
        assert!(ma.next(3.0).is_nan());
        assert_eq!(ma.next(4.0), 3.0);
        assert_eq!(ma.average(), Some(3.0));
    }

    #[test]
    fn recovers_after_huge_outlier_leaves_window() {
        let mut ma = average(1);
        ma.next(1e20);

        assert_eq!(ma.next(1.0), 1.0);

        let mut ma = average(2);
        ma.next(1e20);
        ma.next(1.0);

        assert_eq!(ma.next(2.0), 1.5);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(
            MovingAverage::try_new(0).unwrap_err(),
            ValidationError::ZeroCapacity
        );
    }

    #[test]
    fn reset_clears_window() {
        let mut ma = average(2);
        ma.next(4.0);
        ma.next(6.0);

        ma.reset();

        assert!(ma.is_empty());
        assert_eq!(ma.average(), None);
        assert_eq!(ma.next(1.0), 1.0);
        assert_eq!(ma.capacity().get(), 2);
    }
}
