//! Retrying JSON fetcher

use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::error::FetchError;
use crate::http::{HttpResponse, Transport};
use crate::retry::{RetryPolicy, RetryState, Sleeper};

/// Parsed body plus the full response header set (pagination lives in `Link`).
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub body: Value,
    pub headers: HeaderMap,
}

/// GET a URL and return parsed JSON.
///
/// The paginator and author listing are written against this trait.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<FetchResult, FetchError>;
}

/// [`Fetch`] implementation that retries transient failures.
///
/// 429, unparsable JSON and network errors are retried with linear backoff;
/// any other non-2xx status fails immediately.
pub struct Fetcher<T, S> {
    transport: T,
    sleeper: S,
    policy: RetryPolicy,
}

impl<T: Transport, S: Sleeper> Fetcher<T, S> {
    pub fn new(transport: T, sleeper: S, policy: RetryPolicy) -> Self {
        Self {
            transport,
            sleeper,
            policy,
        }
    }

    fn attempt(&self, url: &str) -> Result<FetchResult, FetchError> {
        let response = self.transport.get(url)?;
        classify(url, response)
    }
}

impl<T: Transport, S: Sleeper> Fetch for Fetcher<T, S> {
    fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        let max = self.policy.max_attempts;
        let mut state = RetryState::start();
        loop {
            state = match state {
                RetryState::Attempting { attempt } => {
                    log::debug!("GET {url} (attempt {attempt}/{max})");
                    match self.attempt(url) {
                        Ok(result) => RetryState::Succeeded(result),
                        Err(e) if e.is_retryable() => {
                            log::debug!("{e}");
                            RetryState::after_failure(&self.policy, attempt)
                        }
                        Err(e) => {
                            log::error!("{e}");
                            return Err(e);
                        }
                    }
                }
                RetryState::Backoff { attempt, wait } => {
                    log::warn!(
                        "Request to {url} failed, sleeping for {}s (attempt {attempt}/{max})",
                        wait.as_secs_f64()
                    );
                    self.sleeper.sleep(wait);
                    RetryState::Attempting {
                        attempt: attempt + 1,
                    }
                }
                RetryState::Succeeded(result) => return Ok(result),
                RetryState::Exhausted { attempts } => {
                    return Err(FetchError::Exhausted {
                        url: url.to_string(),
                        attempts,
                    });
                }
            };
        }
    }
}

/// Map a raw response to a parsed result or a classified error
fn classify(url: &str, response: HttpResponse) -> Result<FetchResult, FetchError> {
    if response.status == 429 {
        return Err(FetchError::RateLimited {
            url: url.to_string(),
        });
    }
    if !response.is_success() {
        return Err(FetchError::Http {
            url: url.to_string(),
            status: response.status,
            body: response.body,
        });
    }
    match serde_json::from_str(&response.body) {
        Ok(body) => Ok(FetchResult {
            body,
            headers: response.headers,
        }),
        Err(e) => Err(FetchError::InvalidJson {
            url: url.to_string(),
            message: e.to_string(),
            body: response.body,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::time::Duration;

    use reqwest::header::{HeaderValue, LINK};

    use super::*;

    struct ScriptedTransport {
        responses: RefCell<VecDeque<Result<HttpResponse, FetchError>>>,
        calls: Cell<usize>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<Result<HttpResponse, FetchError>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                calls: Cell::new(0),
            }
        }
    }

    impl Transport for &ScriptedTransport {
        fn get(&self, _url: &str) -> Result<HttpResponse, FetchError> {
            self.calls.set(self.calls.get() + 1);
            self.responses
                .borrow_mut()
                .pop_front()
                .expect("transport called more times than scripted")
        }
    }

    #[derive(Default)]
    struct RecordingSleeper {
        waits: RefCell<Vec<Duration>>,
    }

    impl Sleeper for &RecordingSleeper {
        fn sleep(&self, wait: Duration) {
            self.waits.borrow_mut().push(wait);
        }
    }

    fn ok(status: u16, body: &str) -> Result<HttpResponse, FetchError> {
        Ok(HttpResponse {
            status,
            headers: HeaderMap::new(),
            body: body.to_string(),
        })
    }

    const URL: &str = "https://hub.test/api/models";

    #[test]
    fn two_rate_limits_then_success() {
        let transport = ScriptedTransport::new(vec![
            ok(429, ""),
            ok(429, ""),
            ok(200, r#"[{"id": "a/b"}]"#),
        ]);
        let sleeper = RecordingSleeper::default();
        let fetcher = Fetcher::new(&transport, &sleeper, RetryPolicy::default());

        let result = fetcher.fetch(URL).unwrap();
        assert_eq!(result.body[0]["id"], "a/b");
        assert_eq!(transport.calls.get(), 3);

        let waits = sleeper.waits.borrow();
        assert_eq!(waits.len(), 2);
        assert!(waits[0] < waits[1]);
        assert_eq!(waits[0], Duration::from_secs(10));
        assert_eq!(waits[1], Duration::from_secs(20));
    }

    #[test]
    fn fatal_status_fails_without_retry() {
        let transport = ScriptedTransport::new(vec![ok(404, "not found")]);
        let sleeper = RecordingSleeper::default();
        let fetcher = Fetcher::new(&transport, &sleeper, RetryPolicy::default());

        let err = fetcher.fetch(URL).unwrap_err();
        match err {
            FetchError::Http { status, body, .. } => {
                assert_eq!(status, 404);
                assert_eq!(body, "not found");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(transport.calls.get(), 1);
        assert!(sleeper.waits.borrow().is_empty());
    }

    #[test]
    fn invalid_json_retried_then_succeeds() {
        let transport = ScriptedTransport::new(vec![ok(200, "<html>"), ok(200, "[]")]);
        let sleeper = RecordingSleeper::default();
        let fetcher = Fetcher::new(&transport, &sleeper, RetryPolicy::default());

        let result = fetcher.fetch(URL).unwrap();
        assert_eq!(result.body, serde_json::json!([]));
        assert_eq!(sleeper.waits.borrow().as_slice(), &[Duration::from_secs(10)]);
    }

    #[test]
    fn exhaustion_reports_url_and_attempts() {
        let transport = ScriptedTransport::new(vec![ok(429, ""), ok(429, ""), ok(429, "")]);
        let sleeper = RecordingSleeper::default();
        let fetcher = Fetcher::new(&transport, &sleeper, RetryPolicy::default());

        let err = fetcher.fetch(URL).unwrap_err();
        match err {
            FetchError::Exhausted { url, attempts } => {
                assert_eq!(url, URL);
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(transport.calls.get(), 3);
        // no wait after the final attempt
        assert_eq!(sleeper.waits.borrow().len(), 2);
    }

    #[test]
    fn network_error_is_retried() {
        let transport = ScriptedTransport::new(vec![
            Err(FetchError::Network {
                url: URL.to_string(),
                message: "connection reset".to_string(),
            }),
            ok(200, "{}"),
        ]);
        let sleeper = RecordingSleeper::default();
        let fetcher = Fetcher::new(&transport, &sleeper, RetryPolicy::default());

        assert!(fetcher.fetch(URL).is_ok());
        assert_eq!(transport.calls.get(), 2);
    }

    #[test]
    fn headers_are_returned() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static(r#"<https://hub.test/next>; rel="next""#),
        );
        let transport = ScriptedTransport::new(vec![Ok(HttpResponse {
            status: 200,
            headers,
            body: "[]".to_string(),
        })]);
        let sleeper = RecordingSleeper::default();
        let fetcher = Fetcher::new(&transport, &sleeper, RetryPolicy::default());

        let result = fetcher.fetch(URL).unwrap();
        assert!(result.headers.contains_key("link"));
    }
}
