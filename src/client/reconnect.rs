//! Unbounded reconnection.
//!
//! [`Reconnector`] wraps a [`Dialer`] and keeps dialing until it gets a
//! transport or the caller's context ends. Failed attempts are separated by
//! an exponentially growing wait, see [`BackoffPolicy`].

use std::sync::Arc;
use std::time::Duration;

use super::backoff::BackoffPolicy;
use crate::core::{CallContext, ContextError, Logger};
use crate::transport::{Dialer, Transport};

/// Where a reconnection cycle stands.
enum ReconnectState {
    /// About to dial.
    Attempting,
    /// Waiting before the next attempt.
    Backoff(Duration),
    /// Connected.
    Done(Box<dyn Transport>),
    /// The context ended first.
    Cancelled(ContextError),
}

/// Dials until connected or cancelled.
#[derive(Clone)]
pub struct Reconnector {
    dialer: Arc<dyn Dialer>,
    policy: BackoffPolicy,
    logger: Arc<dyn Logger>,
}

impl Reconnector {
    /// Wrap `dialer`.
    pub fn new(dialer: Arc<dyn Dialer>, policy: BackoffPolicy, logger: Arc<dyn Logger>) -> Self {
        Self {
            dialer,
            policy,
            logger,
        }
    }

    /// Dial until a transport is open.
    ///
    /// Dial errors are logged and retried forever; the only way out without
    /// a transport is the end of `ctx`, whose reason is returned. The
    /// context is checked before every attempt and wins over any wait.
    pub async fn reconnect(&self, ctx: &CallContext) -> Result<Box<dyn Transport>, ContextError> {
        let mut backoff = self.policy.start();
        let mut state = ReconnectState::Attempting;

        loop {
            state = match state {
                ReconnectState::Attempting => match ctx.err() {
                    Some(reason) => ReconnectState::Cancelled(reason),
                    None => match self.dialer.dial(ctx).await {
                        Ok(transport) => ReconnectState::Done(transport),
                        Err(err) => {
                            let wait = backoff.next_delay();
                            self.logger.warn(format_args!(
                                "error connecting {err}, waiting {wait:?} then retrying"
                            ));
                            ReconnectState::Backoff(wait)
                        }
                    },
                },
                ReconnectState::Backoff(wait) => {
                    tokio::select! {
                        biased;
                        reason = ctx.done() => ReconnectState::Cancelled(reason),
                        _ = tokio::time::sleep(wait) => ReconnectState::Attempting,
                    }
                }
                ReconnectState::Done(transport) => {
                    self.logger.debug(format_args!("connected"));
                    return Ok(transport);
                }
                ReconnectState::Cancelled(reason) => {
                    self.logger.warn(format_args!("ctx error {reason} reconnecting"));
                    return Err(reason);
                }
            };
        }
    }
}

impl std::fmt::Debug for Reconnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconnector")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{EventLog, FakeDialer, FakeTransport};
    use crate::core::{Level, MemoryLogger};

    fn reconnector(dialer: Arc<FakeDialer>, logger: MemoryLogger) -> Reconnector {
        Reconnector::new(dialer, BackoffPolicy::default(), Arc::new(logger))
    }

    fn waits(dialer: &FakeDialer) -> Vec<u64> {
        dialer
            .attempts()
            .windows(2)
            .map(|w| (w[1] - w[0]).as_secs())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_success_does_not_wait() {
        let dialer = Arc::new(FakeDialer::new(EventLog::default()));
        let logger = MemoryLogger::new();
        let start = tokio::time::Instant::now();

        let result = reconnector(dialer.clone(), logger.clone())
            .reconnect(&CallContext::background())
            .await;

        assert!(result.is_ok());
        assert_eq!(dialer.attempts().len(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(logger.count(Level::Warn), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_sequence_doubles_then_holds() {
        let dialer = Arc::new(
            FakeDialer::new(EventLog::default())
                .then_fail(10)
                .then_connect(FakeTransport::new()),
        );
        let logger = MemoryLogger::new();

        let result = reconnector(dialer.clone(), logger.clone())
            .reconnect(&CallContext::background())
            .await;

        assert!(result.is_ok());
        assert_eq!(dialer.attempts().len(), 11);
        assert_eq!(waits(&dialer), vec![1, 2, 4, 8, 16, 32, 60, 60, 60, 60]);
        assert_eq!(logger.count(Level::Warn), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_first_attempt() {
        let dialer = Arc::new(FakeDialer::new(EventLog::default()));
        let ctx = CallContext::background();
        ctx.cancel();

        let result = reconnector(dialer.clone(), MemoryLogger::new())
            .reconnect(&ctx)
            .await;

        assert!(matches!(result, Err(ContextError::Cancelled)));
        assert!(dialer.attempts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_interrupts_backoff() {
        let dialer = Arc::new(FakeDialer::failing(EventLog::default()));
        let ctx = CallContext::background().with_timeout(Duration::from_secs(10));
        let start = tokio::time::Instant::now();

        let result = reconnector(dialer.clone(), MemoryLogger::new())
            .reconnect(&ctx)
            .await;

        assert!(matches!(result, Err(ContextError::DeadlineExceeded)));
        // Attempts at 0, 1, 3 and 7s; the 8s wait is cut short at 10s.
        assert_eq!(dialer.attempts().len(), 4);
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff() {
        let dialer = Arc::new(FakeDialer::failing(EventLog::default()));
        let ctx = CallContext::background();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            canceller.cancel();
        });

        let result = reconnector(dialer.clone(), MemoryLogger::new())
            .reconnect(&ctx)
            .await;

        assert!(matches!(result, Err(ContextError::Cancelled)));
        assert_eq!(dialer.attempts().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_cycle_restarts_backoff() {
        let dialer = Arc::new(
            FakeDialer::new(EventLog::default())
                .then_fail(3)
                .then_connect(FakeTransport::new())
                .then_fail(1)
                .then_connect(FakeTransport::new()),
        );
        let reconnector = reconnector(dialer.clone(), MemoryLogger::new());

        reconnector.reconnect(&CallContext::background()).await.unwrap();
        reconnector.reconnect(&CallContext::background()).await.unwrap();

        // 1, 2, 4 in the first cycle; back to 1 in the second.
        assert_eq!(waits(&dialer), vec![1, 2, 4, 0, 1]);
    }
}
