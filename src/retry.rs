use log::{error, info};

use crate::delay_manager::{backoff_delay, Sleep};
use crate::fetcher::{Fetch, FetchError};

/// Calls `fetcher` up to `max_attempts` times, sleeping `2^i` seconds after
/// failed attempt `i` when another attempt follows. Every failure class is
/// retried alike. Returns the last error once attempts run out.
pub fn fetch_with_retries<F, S>(
    fetcher: &F,
    sleeper: &S,
    url: &str,
    max_attempts: u32,
) -> Result<String, FetchError>
where
    F: Fetch + ?Sized,
    S: Sleep + ?Sized,
{
    let mut last_err = FetchError::Other(format!("no attempts made for {}", url));

    for attempt in 0..max_attempts {
        match fetcher.get(url) {
            Ok(body) => return Ok(body),
            Err(e) => {
                error!("Attempt {}/{} for {} failed: {}", attempt + 1, max_attempts, url, e);
                last_err = e;
            }
        }

        if attempt + 1 < max_attempts {
            info!("Retrying... ({}/{})", attempt + 1, max_attempts);
            sleeper.sleep(backoff_delay(attempt));
        }
    }

    Err(last_err)
}

#[cfg(test)]
pub(crate) mod scripted {
    use crate::fetcher::{Fetch, FetchError};
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned responses in order and records every URL asked for.
    /// Once the script is exhausted every call fails with `Status(404)`.
    #[derive(Default)]
    pub struct ScriptedFetch {
        pub responses: RefCell<VecDeque<Result<String, FetchError>>>,
        pub requested: RefCell<Vec<String>>,
    }

    impl ScriptedFetch {
        pub fn new(responses: Vec<Result<String, FetchError>>) -> Self {
            ScriptedFetch {
                responses: RefCell::new(responses.into()),
                requested: RefCell::default(),
            }
        }

        pub fn calls(&self) -> usize {
            self.requested.borrow().len()
        }
    }

    impl Fetch for ScriptedFetch {
        fn get(&self, url: &str) -> Result<String, FetchError> {
            self.requested.borrow_mut().push(url.to_string());
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(FetchError::Status(404)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::scripted::ScriptedFetch;
    use super::*;
    use crate::delay_manager::recording::RecordingSleep;
    use std::time::Duration;

    #[test]
    fn success_on_first_attempt_does_not_sleep() {
        let fetch = ScriptedFetch::new(vec![Ok("body".into())]);
        let sleeper = RecordingSleep::default();

        let body = fetch_with_retries(&fetch, &sleeper, "http://x/", 3).unwrap();
        assert_eq!(body, "body");
        assert_eq!(fetch.calls(), 1);
        assert!(sleeper.slept.borrow().is_empty());
    }

    #[test]
    fn backs_off_exponentially_until_success() {
        let fetch = ScriptedFetch::new(vec![
            Err(FetchError::Timeout),
            Err(FetchError::Connect),
            Ok("third time".into()),
        ]);
        let sleeper = RecordingSleep::default();

        let body = fetch_with_retries(&fetch, &sleeper, "http://x/", 5).unwrap();
        assert_eq!(body, "third time");
        assert_eq!(fetch.calls(), 3);
        assert_eq!(
            *sleeper.slept.borrow(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[test]
    fn gives_up_after_max_attempts_with_last_error() {
        let fetch = ScriptedFetch::new(vec![
            Err(FetchError::Timeout),
            Err(FetchError::Timeout),
            Err(FetchError::Status(404)),
            Ok("never reached".into()),
        ]);
        let sleeper = RecordingSleep::default();

        let err = fetch_with_retries(&fetch, &sleeper, "http://x/", 3).unwrap_err();
        assert_eq!(err, FetchError::Status(404));
        assert_eq!(fetch.calls(), 3);
        assert_eq!(
            *sleeper.slept.borrow(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[test]
    fn zero_attempts_never_fetches() {
        let fetch = ScriptedFetch::new(vec![Ok("x".into())]);
        let sleeper = RecordingSleep::default();

        assert!(fetch_with_retries(&fetch, &sleeper, "http://x/", 0).is_err());
        assert_eq!(fetch.calls(), 0);
    }
}
