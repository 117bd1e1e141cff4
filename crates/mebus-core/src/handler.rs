//! Event handlers and their completion values.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::BusResult;
use crate::schema::EventKey;

/// What a handler hands back to the bus after it returns.
#[derive(Default)]
pub enum Completion {
    /// The handler finished synchronously.
    #[default]
    Done,
    /// The handler started work that finishes when the future resolves.
    Deferred(BoxFuture<'static, ()>),
}

impl Completion {
    /// Wrap a future as a deferred completion.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self::Deferred(Box::pin(future))
    }

    /// Whether work is still outstanding.
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// The outstanding future, if any.
    #[must_use]
    pub fn into_future(self) -> Option<BoxFuture<'static, ()>> {
        match self {
            Self::Done => None,
            Self::Deferred(future) => Some(future),
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done => write!(f, "Done"),
            Self::Deferred(_) => write!(f, "Deferred(..)"),
        }
    }
}

/// Values a handler may return.
///
/// Implemented for `()`, [`Completion`], and any [`BusResult`] of those, so
/// handlers can be plain closures, async-returning closures, or fallible.
pub trait IntoCompletion {
    /// Convert into the bus-facing result.
    ///
    /// # Errors
    ///
    /// Returns the handler's own error unchanged.
    fn into_completion(self) -> BusResult<Completion>;
}

impl IntoCompletion for () {
    fn into_completion(self) -> BusResult<Completion> {
        Ok(Completion::Done)
    }
}

impl IntoCompletion for Completion {
    fn into_completion(self) -> BusResult<Completion> {
        Ok(self)
    }
}

impl<T: IntoCompletion> IntoCompletion for BusResult<T> {
    fn into_completion(self) -> BusResult<Completion> {
        self.and_then(IntoCompletion::into_completion)
    }
}

/// Untyped handler as registered on a bus.
///
/// Receives the validated JSON payload. Typed handlers are adapted with
/// [`typed_handler`].
pub type RawHandler = Arc<dyn Fn(&Value) -> BusResult<Completion> + Send + Sync>;

/// Adapt a typed handler for `key` into a [`RawHandler`].
///
/// The payload is decoded into `P` before the handler runs; a decode failure
/// is returned as [`crate::BusError::InvalidPayload`] without calling it.
pub fn typed_handler<P, F, R>(key: EventKey<P>, handler: F) -> RawHandler
where
    P: DeserializeOwned + 'static,
    F: Fn(P) -> R + Send + Sync + 'static,
    R: IntoCompletion,
{
    Arc::new(move |payload: &Value| {
        let decoded = key.decode(payload)?;
        handler(decoded).into_completion()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BusError;
    use serde_json::json;
    use std::sync::Mutex;

    const PING: EventKey<String> = EventKey::new("ping");

    #[test]
    fn test_unit_is_done() {
        assert!(!().into_completion().unwrap().is_deferred());
    }

    #[test]
    fn test_result_passthrough() {
        let ok: BusResult<()> = Ok(());
        assert!(ok.into_completion().is_ok());

        let err: BusResult<()> = Err(BusError::handler("ping", "boom"));
        assert!(matches!(
            err.into_completion(),
            Err(BusError::Handler { .. })
        ));
    }

    #[test]
    fn test_typed_handler_decodes() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler = typed_handler(PING, move |payload: String| {
            sink.lock().unwrap().push(payload);
        });

        handler(&json!("x")).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["x".to_string()]);
    }

    #[test]
    fn test_typed_handler_rejects_bad_payload() {
        let handler = typed_handler(PING, |_: String| {});
        let err = handler(&json!(7)).unwrap_err();
        assert_eq!(err.event(), Some("ping"));
    }

    #[tokio::test]
    async fn test_deferred_completion_runs() {
        let flag = Arc::new(Mutex::new(false));
        let inner = Arc::clone(&flag);
        let completion = Completion::deferred(async move {
            *inner.lock().unwrap() = true;
        });
        assert!(completion.is_deferred());

        completion.into_future().unwrap().await;
        assert!(*flag.lock().unwrap());
    }
}
