use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::RecordId;

/// What happened to a single record during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Skipped,
    Transformed {
        from: String,
        to: String,
        color: Option<String>,
    },
    Unmapped {
        label: String,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    Emotions,
    Nicknames,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Unmapped {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Failed {
    pub id: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub kind: RunKind,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub aborted: bool,
    pub scanned: usize,
    pub skipped: usize,
    pub transformed: usize,
    pub unmapped: Vec<Unmapped>,
    pub failed: Vec<Failed>,
}

impl RunReport {
    pub fn new(kind: RunKind, dry_run: bool) -> Self {
        Self {
            kind,
            dry_run,
            started_at: Utc::now(),
            finished_at: None,
            aborted: false,
            scanned: 0,
            skipped: 0,
            transformed: 0,
            unmapped: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn record(&mut self, id: &RecordId, outcome: Outcome) {
        self.scanned += 1;
        match outcome {
            Outcome::Skipped => self.skipped += 1,
            Outcome::Transformed { .. } => self.transformed += 1,
            Outcome::Unmapped { label } => self.unmapped.push(Unmapped {
                id: id.to_string(),
                label,
            }),
            Outcome::Failed { error } => self.failed.push(Failed {
                id: id.to_string(),
                error,
            }),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// False when the run stopped early or any update failed. Unmapped labels do not count.
    pub fn succeeded(&self) -> bool {
        !self.aborted && self.failed.is_empty()
    }

    /// Plain-text summary printed at the end of a run.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let verb = if self.dry_run {
            "would transform"
        } else {
            "transformed"
        };
        out.push_str(&format!(
            "=== {} RUN SUMMARY{} ===\n",
            match self.kind {
                RunKind::Emotions => "EMOTION",
                RunKind::Nicknames => "NICKNAME",
            },
            if self.dry_run { " (dry run)" } else { "" }
        ));
        out.push_str(&format!("Scanned: {}\n", self.scanned));
        out.push_str(&format!("Already canonical: {}\n", self.skipped));
        out.push_str(&format!("{}: {}\n", capitalize(verb), self.transformed));
        out.push_str(&format!("Unmapped: {}\n", self.unmapped.len()));
        for u in &self.unmapped {
            out.push_str(&format!("  - {} ({:?})\n", u.id, u.label));
        }
        out.push_str(&format!("Failed: {}\n", self.failed.len()));
        for f in &self.failed {
            out.push_str(&format!("  - {}: {}\n", f.id, f.error));
        }
        if self.aborted {
            out.push_str("Run aborted before completion\n");
        }
        out
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_fold_into_counts() {
        let mut report = RunReport::new(RunKind::Emotions, false);
        let a = RecordId::Text("a".into());
        let b = RecordId::Text("b".into());
        report.record(&a, Outcome::Skipped);
        report.record(
            &a,
            Outcome::Transformed {
                from: "Happy".into(),
                to: "행복".into(),
                color: None,
            },
        );
        report.record(&b, Outcome::Unmapped { label: "grumpy".into() });
        report.record(&b, Outcome::Failed { error: "timeout".into() });

        assert_eq!(report.scanned, 4);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.transformed, 1);
        assert_eq!(
            report.unmapped,
            vec![Unmapped { id: "b".into(), label: "grumpy".into() }]
        );
        assert_eq!(report.failed.len(), 1);
    }

    #[test]
    fn failed_updates_mark_the_run_unsuccessful() {
        let mut report = RunReport::new(RunKind::Emotions, false);
        let id = RecordId::Text("s1".into());
        report.record(&id, Outcome::Unmapped { label: "grumpy".into() });
        assert!(report.succeeded());

        report.record(&id, Outcome::Failed { error: "timeout".into() });
        assert!(!report.succeeded());

        let mut aborted = RunReport::new(RunKind::Nicknames, false);
        aborted.aborted = true;
        assert!(!aborted.succeeded());
    }

    #[test]
    fn summary_lists_unmapped_labels() {
        let mut report = RunReport::new(RunKind::Emotions, true);
        report.record(
            &RecordId::Text("s-9".into()),
            Outcome::Unmapped { label: "grumpy".into() },
        );
        let text = report.summary();
        assert!(text.contains("(dry run)"));
        assert!(text.contains("Would transform: 0"));
        assert!(text.contains("Unmapped: 1"));
        assert!(text.contains("s-9 (\"grumpy\")"));
    }

    #[test]
    fn serializes_kind_lowercase() {
        let report = RunReport::new(RunKind::Nicknames, false);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "nicknames");
        assert_eq!(json["aborted"], false);
    }
}
