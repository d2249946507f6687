use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::ApiError;

/// Abort signal shared between the owner of a view and the requests it issues.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once `cancel` has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        loop {
            let cancelled = *rx.borrow_and_update();
            if cancelled {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Drive `fut` to completion unless the token fires first, in which case
    /// the request future is dropped and `ApiError::Cancelled` is returned.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        if self.is_cancelled() {
            return Err(ApiError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.cancelled() => Err(ApiError::Cancelled),
            result = fut => result,
        }
    }

    /// Guard that cancels this token when dropped.
    pub fn guard(&self) -> CancelGuard {
        CancelGuard {
            token: self.clone(),
        }
    }
}

pub struct CancelGuard {
    token: CancelToken,
}

impl CancelGuard {
    pub fn token(&self) -> &CancelToken {
        &self.token
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_run_completes_when_not_cancelled() {
        let token = CancelToken::new();
        let result = token.run(async { Ok::<_, ApiError>(42) }).await;
        assert_eq!(result, Ok(42));
    }

    #[tokio::test]
    async fn test_dropping_guard_aborts_in_flight_request() {
        let token = CancelToken::new();
        let guard = token.guard();

        let handle = tokio::spawn({
            let token = token.clone();
            async move {
                token
                    .run(async {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        Ok::<_, ApiError>(())
                    })
                    .await
            }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(guard);

        let result = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("cancellation should be prompt")
            .expect("task panicked");
        assert_eq!(result, Err(ApiError::Cancelled));
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_token_refuses_new_requests() {
        let token = CancelToken::new();
        token.cancel();
        let result = token.run(async { Ok::<_, ApiError>(()) }).await;
        assert_eq!(result, Err(ApiError::Cancelled));
    }
}
