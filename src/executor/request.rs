//! Single timed request execution

use crate::{
    client::{HttpClient, HttpResponse},
    error::{AppError, Result},
    models::metrics::RequestOutcome,
};
use std::time::Duration;
use tokio::time::{timeout, Instant};

/// Issue one GET and classify what happened
///
/// Never fails: transport problems become outcome data. The clock starts just
/// before the call and stops as soon as it returns. A call still pending
/// after `deadline` is dropped and reported as a timeout, whatever timeout
/// the client itself was built with.
pub async fn execute_request(client: &dyn HttpClient, url: &str, deadline: Duration) -> RequestOutcome {
    let start = Instant::now();
    let result = match timeout(deadline, client.get(url)).await {
        Ok(result) => result,
        Err(_) => Err(AppError::timeout(format!("No response within {}ms", deadline.as_millis()))),
    };
    let elapsed = start.elapsed();
    classify(elapsed, result)
}

/// Turn a client result into an outcome
pub fn classify(elapsed: Duration, result: Result<HttpResponse>) -> RequestOutcome {
    match result {
        Ok(response) => RequestOutcome::response(elapsed, response.status_code),
        Err(AppError::Timeout(_)) => RequestOutcome::timeout(elapsed),
        Err(error) => RequestOutcome::transport_error(elapsed, error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::metrics::Outcome;
    use crate::types::OutcomeClass;
    use async_trait::async_trait;

    struct FixedClient {
        delay: Duration,
        result: fn() -> Result<HttpResponse>,
    }

    #[async_trait]
    impl HttpClient for FixedClient {
        async fn get(&self, _url: &str) -> Result<HttpResponse> {
            tokio::time::sleep(self.delay).await;
            (self.result)()
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }
    }

    fn ok_200() -> Result<HttpResponse> {
        Ok(HttpResponse { status_code: 200, final_url: "https://example.com/".to_string() })
    }

    fn server_error() -> Result<HttpResponse> {
        Ok(HttpResponse { status_code: 500, final_url: "https://example.com/".to_string() })
    }

    fn timed_out() -> Result<HttpResponse> {
        Err(AppError::timeout("deadline exceeded"))
    }

    fn refused() -> Result<HttpResponse> {
        Err(AppError::network("connection refused"))
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_measures_elapsed() {
        let client = FixedClient { delay: Duration::from_millis(7), result: ok_200 };
        let outcome = execute_request(&client, "https://example.com/", Duration::from_secs(1)).await;
        assert_eq!(outcome.class(), OutcomeClass::Success);
        assert!(outcome.elapsed() >= Duration::from_millis(7));
        assert!(outcome.elapsed() < Duration::from_millis(9));
    }

    #[tokio::test]
    async fn test_classification() {
        let cases: [(fn() -> Result<HttpResponse>, OutcomeClass); 4] = [
            (ok_200, OutcomeClass::Success),
            (server_error, OutcomeClass::NotOk),
            (timed_out, OutcomeClass::Timeout),
            (refused, OutcomeClass::TransportError),
        ];
        for (result, expected) in cases {
            let client = FixedClient { delay: Duration::ZERO, result };
            let outcome = execute_request(&client, "https://example.com/", Duration::from_secs(1)).await;
            assert_eq!(outcome.class(), expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_shorter_than_client_timeout() {
        // The client would wait its full second; the deadline cuts it at 200ms.
        let client = FixedClient { delay: Duration::from_millis(1_500), result: ok_200 };
        let outcome = execute_request(&client, "https://example.com/", Duration::from_millis(200)).await;
        assert_eq!(outcome.class(), OutcomeClass::Timeout);
        assert!(outcome.elapsed() >= Duration::from_millis(200));
        assert!(outcome.elapsed() < Duration::from_millis(201));
    }

    #[test]
    fn test_transport_error_keeps_message() {
        let outcome = classify(Duration::from_millis(1), refused());
        match outcome.outcome {
            Outcome::TransportError { message } => assert!(message.contains("connection refused")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
