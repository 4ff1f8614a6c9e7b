//! Open-model injection: wait, then start users evenly across a ramp window.

use crate::error::Error;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadProfile {
    pub users: u32,
    pub ramp_duration: Duration,
    pub initial_delay: Duration,
}

impl LoadProfile {
    pub fn new(users: u32, ramp_duration: Duration, initial_delay: Duration) -> Self {
        Self {
            users,
            ramp_duration,
            initial_delay,
        }
    }

    /// Gap between two consecutive user starts.
    pub fn interval(&self) -> Duration {
        if self.users == 0 {
            Duration::default()
        } else {
            self.ramp_duration / self.users
        }
    }

    /// Start offset of every user, measured from the beginning of the run.
    ///
    /// Fails when the last offset does not fit in a `Duration`.
    pub fn start_offsets(&self) -> Result<Vec<Duration>, Error> {
        let interval = self.interval();

        (0..self.users)
            .map(|user| {
                interval
                    .checked_mul(user)
                    .and_then(|ramp_offset| self.initial_delay.checked_add(ramp_offset))
                    .ok_or_else(|| {
                        Error::InvalidConfiguration(format!(
                            "start of user {} overflows: initial delay {:?}, ramp {:?}",
                            user, self.initial_delay, self.ramp_duration
                        ))
                    })
            })
            .collect()
    }
}

impl Default for LoadProfile {
    fn default() -> Self {
        Self::new(1, Duration::from_secs(10), Duration::from_secs(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(value: u64) -> Duration {
        Duration::from_secs(value)
    }

    #[test]
    fn single_user_starts_after_the_delay() {
        assert_eq!(LoadProfile::default().start_offsets().unwrap(), vec![secs(5)]);
    }

    #[test]
    fn users_are_spread_evenly_over_the_ramp() {
        let profile = LoadProfile::new(4, secs(10), secs(5));

        assert_eq!(profile.interval(), Duration::from_millis(2500));
        assert_eq!(
            profile.start_offsets().unwrap(),
            vec![
                secs(5),
                Duration::from_millis(7500),
                secs(10),
                Duration::from_millis(12500)
            ]
        );
    }

    #[test]
    fn zero_ramp_starts_everyone_together() {
        let profile = LoadProfile::new(3, Duration::default(), secs(1));

        assert_eq!(profile.start_offsets().unwrap(), vec![secs(1); 3]);
    }

    #[test]
    fn zero_users_start_nothing() {
        let profile = LoadProfile::new(0, secs(10), secs(5));

        assert!(profile.start_offsets().unwrap().is_empty());
        assert_eq!(profile.interval(), Duration::default());
    }

    #[test]
    fn overflowing_offsets_are_rejected() {
        let profile = LoadProfile::new(2, secs(10), Duration::from_secs(u64::MAX));

        match profile.start_offsets() {
            Err(Error::InvalidConfiguration(message)) => assert!(message.contains("user 1")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
