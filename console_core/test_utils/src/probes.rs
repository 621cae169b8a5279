use async_trait::async_trait;
use shared_clients::{ConnectionProbe, DatabaseAdapterError};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
pub enum ProbeOutcome {
    Succeed,
    Fail(String),
    Panic(String),
}

type Hook = Box<dyn Fn() + Send + Sync>;

/// Probe with a fixed outcome that counts how often it was called.
pub struct FakeProbe {
    outcome: ProbeOutcome,
    calls: AtomicUsize,
    on_call: Option<Hook>,
}

impl FakeProbe {
    pub fn new(outcome: ProbeOutcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            on_call: None,
        }
    }

    /// Runs `hook` inside every call, before the outcome is produced. Lets a
    /// test change state while a probe is in flight.
    pub fn on_call(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_call = Some(Box::new(hook));
        self
    }

    pub fn succeeding() -> Self {
        Self::new(ProbeOutcome::Succeed)
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(ProbeOutcome::Fail(message.into()))
    }

    pub fn panicking(message: impl Into<String>) -> Self {
        Self::new(ProbeOutcome::Panic(message.into()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T> ConnectionProbe<T> for FakeProbe
where
    T: Send + Sync,
{
    async fn probe(&self, _target: &T) -> Result<(), DatabaseAdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(hook) = &self.on_call {
            hook();
        }
        match &self.outcome {
            ProbeOutcome::Succeed => Ok(()),
            ProbeOutcome::Fail(message) => Err(DatabaseAdapterError::invalid_connection(message.clone())),
            ProbeOutcome::Panic(message) => panic!("{message}"),
        }
    }
}
