use std::{pin::Pin, sync::Arc};

use futures::{Stream, StreamExt};

/// A payload tagged with its position in the upstream batch.
#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub payload: T,
    pub index: usize,
}

impl<T> Envelope<T> {
    pub fn map<U>(self, payload: U) -> Envelope<U> {
        Envelope {
            payload,
            index: self.index,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source error: {0}")]
    Source(String),
    #[error("transform error: {0}")]
    Transform(String),
    #[error("sink error: {0}")]
    Sink(String),
}

pub type EnvelopeStream<T> = Pin<Box<dyn Stream<Item = Result<Envelope<T>, PipelineError>> + Send>>;

#[async_trait::async_trait]
pub trait Source<T>: Send + Sync {
    async fn stream(&self) -> EnvelopeStream<T>;
}

#[async_trait::async_trait]
pub trait Transform<I, O>: Send + Sync {
    async fn apply(&self, input: Envelope<I>) -> Result<Envelope<O>, PipelineError>;
}

#[async_trait::async_trait]
pub trait Sink<T>: Send + Sync {
    async fn run<S>(&self, input: S) -> Result<(), PipelineError>
    where
        S: Stream<Item = Result<Envelope<T>, PipelineError>> + Send + Unpin + 'static;
}

/// Source → one mapping transform → same-type checks → sink.
pub struct Pipeline<S, I, O, K> {
    pub source: S,
    pub transform: Arc<dyn Transform<I, O> + Send + Sync>,
    pub checks: Vec<Arc<dyn Transform<O, O> + Send + Sync>>,
    pub sink: K,
}

impl<S, I, O, K> Pipeline<S, I, O, K>
where
    I: Send + 'static,
    O: Send + 'static,
    S: Source<I> + Send + Sync + 'static,
    K: Sink<O> + Send + Sync + 'static,
{
    pub async fn run(self) -> Result<(), PipelineError> {
        let input = self.source.stream().await;

        let transform = self.transform.clone();
        let mut stream: EnvelopeStream<O> = Box::pin(input.then(move |item| {
            let t_inner = transform.clone();
            async move {
                match item {
                    Ok(env) => t_inner.apply(env).await,
                    Err(e) => Err(e),
                }
            }
        }));

        for check in self.checks {
            stream = Box::pin(stream.then(move |item| {
                let c_inner = check.clone();
                async move {
                    match item {
                        Ok(env) => c_inner.apply(env).await,
                        Err(e) => Err(e),
                    }
                }
            }));
        }

        self.sink.run(stream).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct Numbers(Vec<i64>);

    #[async_trait::async_trait]
    impl Source<i64> for Numbers {
        async fn stream(&self) -> EnvelopeStream<i64> {
            let items: Vec<_> = self
                .0
                .iter()
                .enumerate()
                .map(|(index, n)| Ok(Envelope { payload: *n, index }))
                .collect();
            Box::pin(futures::stream::iter(items))
        }
    }

    struct Stringify;

    #[async_trait::async_trait]
    impl Transform<i64, String> for Stringify {
        async fn apply(&self, input: Envelope<i64>) -> Result<Envelope<String>, PipelineError> {
            let s = input.payload.to_string();
            Ok(input.map(s))
        }
    }

    struct RejectNegative;

    #[async_trait::async_trait]
    impl Transform<String, String> for RejectNegative {
        async fn apply(&self, input: Envelope<String>) -> Result<Envelope<String>, PipelineError> {
            if input.payload.starts_with('-') {
                return Err(PipelineError::Transform(format!("item #{} is negative", input.index)));
            }
            Ok(input)
        }
    }

    #[derive(Clone, Default)]
    struct Collect(Arc<Mutex<Vec<String>>>);

    #[async_trait::async_trait]
    impl Sink<String> for Collect {
        async fn run<S>(&self, mut input: S) -> Result<(), PipelineError>
        where
            S: Stream<Item = Result<Envelope<String>, PipelineError>> + Send + Unpin + 'static,
        {
            while let Some(item) = input.next().await {
                self.0.lock().unwrap().push(item?.payload);
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn runs_transform_and_checks_in_order() {
        let sink = Collect::default();
        let pipeline: Pipeline<_, i64, String, _> = Pipeline {
            source: Numbers(vec![1, 20, 300]),
            transform: Arc::new(Stringify),
            checks: vec![Arc::new(RejectNegative)],
            sink: sink.clone(),
        };

        pipeline.run().await.unwrap();
        assert_eq!(*sink.0.lock().unwrap(), vec!["1", "20", "300"]);
    }

    #[tokio::test]
    async fn check_failure_reaches_the_sink() {
        let sink = Collect::default();
        let pipeline: Pipeline<_, i64, String, _> = Pipeline {
            source: Numbers(vec![1, -2, 3]),
            transform: Arc::new(Stringify),
            checks: vec![Arc::new(RejectNegative)],
            sink: sink.clone(),
        };

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, PipelineError::Transform(msg) if msg.contains("#1")));
        assert_eq!(*sink.0.lock().unwrap(), vec!["1"]);
    }
}
