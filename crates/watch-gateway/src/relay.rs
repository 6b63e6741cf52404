//! Relay loop: moves translated events from the engine reader to the
//! subscriber writer under a shared session budget.

use crate::event::{EventReader, EventWriter, ReadOutcome};
use crate::session::Deadline;

/// Terminal state of one relay session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The upstream stream ended and the final event, if any, was delivered.
    Completed,
    /// A read or write failed hard.
    Failed,
    /// The session budget ran out or the session was cancelled.
    TimedOut,
}

/// Runs one relay session to completion.
///
/// Events flow strictly one at a time: pull, push, repeat. Both adapters are
/// closed exactly once on every exit path, and a close error never overrides
/// the outcome already reached.
pub async fn run<R, W>(deadline: &Deadline, mut reader: R, mut writer: W) -> SessionOutcome
where
    R: EventReader,
    W: EventWriter,
{
    let outcome = stream_events(deadline, &mut reader, &mut writer).await;

    if let Err(e) = reader.close().await {
        tracing::warn!(error = %e, "couldn't close engine event stream");
    }
    if let Err(e) = writer.close().await {
        tracing::warn!(error = %e, "couldn't close subscriber connection");
    }

    outcome
}

async fn stream_events<R, W>(deadline: &Deadline, reader: &mut R, writer: &mut W) -> SessionOutcome
where
    R: EventReader,
    W: EventWriter,
{
    loop {
        if deadline.check().is_err() {
            tracing::info!("session budget exhausted before next read");
            return SessionOutcome::TimedOut;
        }

        let outcome = match deadline.bound(reader.read()).await {
            Err(expiry) => {
                tracing::info!(?expiry, "session budget exhausted mid-read");
                return SessionOutcome::TimedOut;
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "couldn't read workflow update");
                return SessionOutcome::Failed;
            }
            Ok(Ok(outcome)) => outcome,
        };

        match outcome {
            ReadOutcome::Exhausted(Some(event)) => {
                // Expected shutdown path: deliver the final state best effort.
                if let Err(e) = writer.write(&event).await {
                    if e.is_expiry() {
                        tracing::info!("deadline reached while sending final event");
                    } else {
                        tracing::error!(error = %e, "couldn't send final event");
                    }
                }
                return SessionOutcome::Completed;
            }
            ReadOutcome::Exhausted(None) => return SessionOutcome::Completed,
            ReadOutcome::Event(event) => match writer.write(&event).await {
                Ok(()) => {}
                Err(e) if e.is_expiry() => {
                    tracing::info!("deadline reached while sending event");
                    return SessionOutcome::TimedOut;
                }
                Err(e) => {
                    tracing::error!(error = %e, "couldn't send event");
                    return SessionOutcome::Failed;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ReadError, WorkflowEvent, WriteError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn event(name: &str, status: &str) -> WorkflowEvent {
        WorkflowEvent {
            name: name.to_string(),
            namespace: "test".to_string(),
            kind: None,
            status: status.to_string(),
            started_at: chrono::Utc::now(),
            finished_at: None,
            stages: Vec::new(),
        }
    }

    fn budget() -> Deadline {
        Deadline::new(Duration::from_secs(60))
    }

    #[derive(Default)]
    struct Tally {
        reads: AtomicUsize,
        reader_closes: AtomicUsize,
        writer_closes: AtomicUsize,
        written: Mutex<Vec<WorkflowEvent>>,
    }

    impl Tally {
        fn written(&self) -> Vec<WorkflowEvent> {
            self.written.lock().unwrap().clone()
        }
    }

    struct ScriptedReader {
        script: VecDeque<Result<ReadOutcome, ReadError>>,
        close_error: bool,
        tally: Arc<Tally>,
    }

    impl ScriptedReader {
        fn new(script: Vec<Result<ReadOutcome, ReadError>>, tally: Arc<Tally>) -> Self {
            Self {
                script: script.into(),
                close_error: false,
                tally,
            }
        }
    }

    #[async_trait]
    impl EventReader for ScriptedReader {
        async fn read(&mut self) -> Result<ReadOutcome, ReadError> {
            self.tally.reads.fetch_add(1, Ordering::SeqCst);
            self.script
                .pop_front()
                .unwrap_or(Ok(ReadOutcome::Exhausted(None)))
        }

        async fn close(self) -> anyhow::Result<()> {
            self.tally.reader_closes.fetch_add(1, Ordering::SeqCst);
            if self.close_error {
                anyhow::bail!("upstream refused to close");
            }
            Ok(())
        }
    }

    struct ScriptedWriter {
        /// Per-call script; `None` records the event and succeeds.
        failures: VecDeque<Option<WriteError>>,
        tally: Arc<Tally>,
    }

    impl ScriptedWriter {
        fn new(failures: Vec<Option<WriteError>>, tally: Arc<Tally>) -> Self {
            Self {
                failures: failures.into(),
                tally,
            }
        }
    }

    #[async_trait]
    impl EventWriter for ScriptedWriter {
        async fn write(&mut self, event: &WorkflowEvent) -> Result<(), WriteError> {
            match self.failures.pop_front().flatten() {
                Some(err) => Err(err),
                None => {
                    self.tally.written.lock().unwrap().push(event.clone());
                    Ok(())
                }
            }
        }

        async fn close(self) -> anyhow::Result<()> {
            self.tally.writer_closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn running_then_terminal_snapshot_writes_both_and_completes() {
        let tally = Arc::new(Tally::default());
        let reader = ScriptedReader::new(
            vec![
                Ok(ReadOutcome::Event(event("wf", "running"))),
                Ok(ReadOutcome::Exhausted(Some(event("wf", "succeeded")))),
            ],
            tally.clone(),
        );
        let writer = ScriptedWriter::new(Vec::new(), tally.clone());

        let outcome = run(&budget(), reader, writer).await;

        assert_eq!(outcome, SessionOutcome::Completed);
        let written = tally.written();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].status, "running");
        assert_eq!(written[1].status, "succeeded");
        assert_eq!(tally.reader_closes.load(Ordering::SeqCst), 1);
        assert_eq!(tally.writer_closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn read_failure_means_zero_writes_and_failed() {
        let tally = Arc::new(Tally::default());
        let reader = ScriptedReader::new(
            vec![Err(ReadError::ConnectionFailed("reset by peer".to_string()))],
            tally.clone(),
        );
        let writer = ScriptedWriter::new(Vec::new(), tally.clone());

        let outcome = run(&budget(), reader, writer).await;

        assert_eq!(outcome, SessionOutcome::Failed);
        assert!(tally.written().is_empty());
        assert_eq!(tally.reader_closes.load(Ordering::SeqCst), 1);
        assert_eq!(tally.writer_closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn write_deadline_stops_the_session_without_another_read() {
        let tally = Arc::new(Tally::default());
        let reader = ScriptedReader::new(
            vec![
                Ok(ReadOutcome::Event(event("wf", "running"))),
                Ok(ReadOutcome::Event(event("wf", "running"))),
            ],
            tally.clone(),
        );
        let writer = ScriptedWriter::new(
            vec![Some(WriteError::DeadlineExceeded)],
            tally.clone(),
        );

        let outcome = run(&budget(), reader, writer).await;

        assert_eq!(outcome, SessionOutcome::TimedOut);
        assert_eq!(tally.reads.load(Ordering::SeqCst), 1);
        assert!(tally.written().is_empty());
    }

    #[tokio::test]
    async fn write_hard_failure_fails_the_session() {
        let tally = Arc::new(Tally::default());
        let reader = ScriptedReader::new(
            vec![Ok(ReadOutcome::Event(event("wf", "running")))],
            tally.clone(),
        );
        let writer = ScriptedWriter::new(
            vec![Some(WriteError::ConnectionFailed("gone".to_string()))],
            tally.clone(),
        );

        let outcome = run(&budget(), reader, writer).await;

        assert_eq!(outcome, SessionOutcome::Failed);
        assert_eq!(tally.reader_closes.load(Ordering::SeqCst), 1);
        assert_eq!(tally.writer_closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_budget_times_out_before_any_read() {
        let tally = Arc::new(Tally::default());
        let reader = ScriptedReader::new(
            vec![Ok(ReadOutcome::Event(event("wf", "running")))],
            tally.clone(),
        );
        let writer = ScriptedWriter::new(Vec::new(), tally.clone());

        let outcome = run(&Deadline::new(Duration::ZERO), reader, writer).await;

        assert_eq!(outcome, SessionOutcome::TimedOut);
        assert_eq!(tally.reads.load(Ordering::SeqCst), 0);
        assert_eq!(tally.reader_closes.load(Ordering::SeqCst), 1);
        assert_eq!(tally.writer_closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancellation_times_out_and_still_cleans_up() {
        let tally = Arc::new(Tally::default());
        let reader = ScriptedReader::new(Vec::new(), tally.clone());
        let writer = ScriptedWriter::new(Vec::new(), tally.clone());

        let deadline = budget();
        deadline.cancel();
        let outcome = run(&deadline, reader, writer).await;

        assert_eq!(outcome, SessionOutcome::TimedOut);
        assert_eq!(tally.reader_closes.load(Ordering::SeqCst), 1);
        assert_eq!(tally.writer_closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_without_event_completes_immediately() {
        let tally = Arc::new(Tally::default());
        let reader =
            ScriptedReader::new(vec![Ok(ReadOutcome::Exhausted(None))], tally.clone());
        let writer = ScriptedWriter::new(Vec::new(), tally.clone());

        let outcome = run(&budget(), reader, writer).await;

        assert_eq!(outcome, SessionOutcome::Completed);
        assert!(tally.written().is_empty());
    }

    #[tokio::test]
    async fn final_write_failure_does_not_override_completion() {
        let tally = Arc::new(Tally::default());
        let reader = ScriptedReader::new(
            vec![Ok(ReadOutcome::Exhausted(Some(event("wf", "failed"))))],
            tally.clone(),
        );
        let writer = ScriptedWriter::new(
            vec![Some(WriteError::ConnectionFailed("gone".to_string()))],
            tally.clone(),
        );

        let outcome = run(&budget(), reader, writer).await;

        // The stream itself finished; the terminal delivery is best effort.
        assert_eq!(outcome, SessionOutcome::Completed);
    }

    #[tokio::test]
    async fn close_errors_do_not_override_the_outcome() {
        let tally = Arc::new(Tally::default());
        let mut reader =
            ScriptedReader::new(vec![Ok(ReadOutcome::Exhausted(None))], tally.clone());
        reader.close_error = true;
        let writer = ScriptedWriter::new(Vec::new(), tally.clone());

        let outcome = run(&budget(), reader, writer).await;

        assert_eq!(outcome, SessionOutcome::Completed);
        assert_eq!(tally.reader_closes.load(Ordering::SeqCst), 1);
    }
}
