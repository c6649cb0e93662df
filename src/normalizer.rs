use tracing::{info, warn};

use crate::colors::ColorTable;
use crate::labels;
use crate::report::{Outcome, RunKind, RunReport};
use crate::store::{SessionRecord, SessionStore, StoreResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    pub abort_on_error: bool,
}

/// Decision for one session, made before any write.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    Skip,
    Rewrite {
        emotion: &'static str,
        color: Option<String>,
    },
    Unmapped,
}

pub fn plan(record: &SessionRecord, colors: &ColorTable) -> Plan {
    if labels::is_canonical(&record.emotion) {
        return Plan::Skip;
    }
    match labels::translate(&record.emotion) {
        Some(emotion) => Plan::Rewrite {
            emotion,
            color: colors
                .get(emotion)
                .cloned()
                .or_else(|| record.color.clone()),
        },
        None => Plan::Unmapped,
    }
}

/// Rewrites every foreign emotion label in the session snapshot. Only a failed
/// snapshot query is returned as an error; per-record failures land in the report.
pub async fn normalize_emotions(
    store: &dyn SessionStore,
    colors: &ColorTable,
    opts: RunOptions,
) -> StoreResult<RunReport> {
    let mut report = RunReport::new(RunKind::Emotions, opts.dry_run);
    let sessions = store.sessions_with_emotion().await?;
    info!(count = sessions.len(), "scanning sessions");

    for record in sessions {
        let outcome = match plan(&record, colors) {
            Plan::Skip => Outcome::Skipped,
            Plan::Unmapped => Outcome::Unmapped {
                label: record.emotion.clone(),
            },
            Plan::Rewrite { emotion, color } => {
                let written = if opts.dry_run {
                    Ok(())
                } else {
                    store.set_mood(&record.id, emotion, color.as_deref()).await
                };
                match written {
                    Ok(()) => Outcome::Transformed {
                        from: record.emotion.clone(),
                        to: emotion.to_string(),
                        color,
                    },
                    Err(e) => Outcome::Failed {
                        error: e.to_string(),
                    },
                }
            }
        };

        match &outcome {
            Outcome::Transformed { from, to, color } => info!(
                id = %record.id,
                "{from:?} -> {to:?} (color {})",
                color.as_deref().unwrap_or("unset")
            ),
            Outcome::Unmapped { label } => warn!(id = %record.id, "no mapping for {label:?}"),
            Outcome::Failed { error } => warn!(id = %record.id, "update failed: {error}"),
            Outcome::Skipped => {}
        }

        let failed = matches!(outcome, Outcome::Failed { .. });
        report.record(&record.id, outcome);
        if failed && opts.abort_on_error {
            report.aborted = true;
            break;
        }
    }

    report.finish();
    Ok(report)
}
