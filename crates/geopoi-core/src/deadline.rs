use std::future::Future;
use std::time::Duration;

use crate::{Error, Result};

/// Run `fut` under an optional deadline. Dropping the inner future on expiry
/// cancels whatever round trip it was awaiting.
pub async fn with_deadline<T, F>(limit: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        None => fut.await,
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| Error::DeadlineExceeded(limit.as_millis()))?,
    }
}
