//! Fixed-interval trial clock.
//!
//! The sleep is re-armed only after the previous tick has fully completed,
//! so ticks never overlap or queue up under load. The session sits behind a
//! single mutex shared with the input handler, which serializes `tick`
//! against `record`.

use std::sync::Arc;
use std::time::Duration;

use nback_core::{RoundReport, Session, StimulusSource, TickOutcome, Trial};
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Debug, Clone, PartialEq)]
pub enum ClockEvent {
    Presented {
        index: usize,
        total: usize,
        level: usize,
        trial: Trial,
    },
    Finished(RoundReport),
    Cancelled,
}

/// Run one round to completion. Returns `None` if cancelled, in which case
/// the session has been stopped and its round state discarded.
pub async fn run_round<S: StimulusSource + Send>(
    session: &SharedSession,
    source: &mut S,
    interval: Duration,
    cancel: &CancellationToken,
    events: &mpsc::UnboundedSender<ClockEvent>,
) -> Option<RoundReport> {
    {
        let mut s = session.lock().await;
        let first = s.start(source);
        let _ = events.send(presented(&s, first));
    }

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                session.lock().await.stop();
                tracing::info!("round cancelled");
                let _ = events.send(ClockEvent::Cancelled);
                return None;
            }
            _ = tokio::time::sleep(interval) => {}
        }

        let mut s = session.lock().await;
        match s.tick(source) {
            TickOutcome::Advanced(trial) => {
                let _ = events.send(presented(&s, trial));
            }
            TickOutcome::RoundEnded(report) => {
                let _ = events.send(ClockEvent::Finished(report.clone()));
                return Some(report);
            }
            TickOutcome::Ignored => {
                // Someone stopped the session between ticks.
                tracing::debug!("tick ignored, session no longer playing");
                return None;
            }
        }
    }
}

fn presented(session: &Session, trial: Trial) -> ClockEvent {
    ClockEvent::Presented {
        index: session.current_index() - 1,
        total: session.total_trials(),
        level: session.level(),
        trial,
    }
}
