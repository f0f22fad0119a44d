//! Sequential chaining of dependent asynchronous sub-streams.
//!
//! [`inductor`] runs a pipeline of stages where each stage is a stream, the
//! last value emitted by one stage decides the next stage, and every
//! intermediate value is re-emitted to the observer as it happens. The step
//! function returning `None` ends the chain.

use futures_util::stream::{BoxStream, FusedStream, Stream};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Sub-stream produced by a step function.
pub type StepStream<T, E> = BoxStream<'static, Result<T, E>>;

/// Chain sub-streams produced by `step`, starting from `seed`.
///
/// `step` is consulted immediately with the seed (once the stream is first
/// polled), and again with the last value a sub-stream emitted each time
/// that sub-stream completes. Exactly one sub-stream is live at a time, and
/// the switch happens only on completion, never on a mere emission. An
/// `Err` from the active sub-stream is passed through and ends the chain
/// without consulting `step` again. Dropping the returned stream drops the
/// active sub-stream with it.
///
/// A sub-stream that completes without emitting anything completes the
/// chain: `step` is only ever re-invoked with a value produced by the
/// sub-stream that just finished.
pub fn inductor<T, E, F>(seed: T, step: F) -> Inductor<T, E, F>
where
    T: Clone,
    F: FnMut(&T) -> Option<StepStream<T, E>>,
{
    Inductor {
        step,
        phase: Phase::Advance(seed),
    }
}

/// Stream returned by [`inductor`].
pub struct Inductor<T, E, F> {
    step: F,
    phase: Phase<T, E>,
}

enum Phase<T, E> {
    /// The step function has not been consulted for this value yet.
    Advance(T),
    /// Draining the active sub-stream; `last` is the most recent value it
    /// emitted, if any.
    Draining {
        child: StepStream<T, E>,
        last: Option<T>,
    },
    /// Chain finished: completed, errored, or cancelled.
    Terminated,
}

impl<T, E, F> Stream for Inductor<T, E, F>
where
    T: Clone + Unpin,
    F: FnMut(&T) -> Option<StepStream<T, E>> + Unpin,
{
    type Item = Result<T, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match std::mem::replace(&mut this.phase, Phase::Terminated) {
                Phase::Terminated => return Poll::Ready(None),
                Phase::Advance(value) => match (this.step)(&value) {
                    None => return Poll::Ready(None),
                    Some(child) => {
                        this.phase = Phase::Draining { child, last: None };
                    }
                },
                Phase::Draining { mut child, last } => match child.as_mut().poll_next(cx) {
                    Poll::Pending => {
                        this.phase = Phase::Draining { child, last };
                        return Poll::Pending;
                    }
                    Poll::Ready(Some(Ok(value))) => {
                        this.phase = Phase::Draining {
                            child,
                            last: Some(value.clone()),
                        };
                        return Poll::Ready(Some(Ok(value)));
                    }
                    // The phase stays `Terminated`: an error ends the chain.
                    Poll::Ready(Some(Err(err))) => return Poll::Ready(Some(Err(err))),
                    Poll::Ready(None) => match last {
                        Some(value) => this.phase = Phase::Advance(value),
                        None => return Poll::Ready(None),
                    },
                },
            }
        }
    }
}

impl<T, E, F> FusedStream for Inductor<T, E, F>
where
    T: Clone + Unpin,
    F: FnMut(&T) -> Option<StepStream<T, E>> + Unpin,
{
    fn is_terminated(&self) -> bool {
        matches!(self.phase, Phase::Terminated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future::FutureExt;
    use futures_util::stream::{self, StreamExt};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(values: Vec<u32>) -> StepStream<u32, String> {
        stream::iter(values.into_iter().map(Ok)).boxed()
    }

    #[tokio::test]
    async fn chains_sub_streams_in_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = Arc::clone(&calls);
        let chain = inductor(0u32, move |v| {
            calls2.fetch_add(1, Ordering::SeqCst);
            if *v >= 6 {
                None
            } else {
                Some(counting(vec![v + 1, v + 2]))
            }
        });

        let values: Vec<u32> = chain.map(|r| r.unwrap()).collect().await;
        assert_eq!(values, vec![1, 2, 3, 4, 5, 6]);
        // Seed, then one call per completed sub-stream.
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn completes_immediately_when_step_declines_seed() {
        let chain = inductor(0u32, |_| None::<StepStream<u32, String>>);
        let values: Vec<_> = chain.collect().await;
        assert!(values.is_empty());
    }

    #[tokio::test]
    async fn error_ends_chain_without_another_step_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = Arc::clone(&calls);
        let chain = inductor(0u32, move |_| {
            calls2.fetch_add(1, Ordering::SeqCst);
            Some(stream::iter(vec![Ok(1), Err("boom".to_string()), Ok(2)]).boxed())
        });

        let items: Vec<Result<u32, String>> = chain.collect().await;
        assert_eq!(items, vec![Ok(1), Err("boom".to_string())]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn silent_sub_stream_completion_ends_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = Arc::clone(&calls);
        let chain = inductor(0u32, move |_| {
            calls2.fetch_add(1, Ordering::SeqCst);
            Some(stream::empty().boxed())
        });

        let items: Vec<Result<u32, String>> = chain.collect().await;
        assert!(items.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// Never emits; records when it is dropped.
    struct HangingChild {
        dropped: Arc<AtomicBool>,
    }

    impl Stream for HangingChild {
        type Item = Result<u32, String>;

        fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
            Poll::Pending
        }
    }

    impl Drop for HangingChild {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn dropping_the_chain_drops_the_active_sub_stream() {
        let dropped = Arc::new(AtomicBool::new(false));
        let dropped2 = Arc::clone(&dropped);
        let mut chain = inductor(0u32, move |_| {
            Some(
                HangingChild {
                    dropped: Arc::clone(&dropped2),
                }
                .boxed(),
            )
        });

        // One poll subscribes to the hanging sub-stream.
        assert!(chain.next().now_or_never().is_none());
        assert!(!dropped.load(Ordering::SeqCst));

        drop(chain);
        assert!(dropped.load(Ordering::SeqCst));
    }
}
