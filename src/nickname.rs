use rand::Rng;
use tracing::{info, warn};

use crate::normalizer::RunOptions;
use crate::report::{Outcome, RunKind, RunReport};
use crate::store::{SessionStore, StoreResult, UserRecord};

const MAX_BASE_CHARS: usize = 12;

/// Alphanumeric stem taken from the email local part, falling back to `userId`.
pub fn nickname_base(user: &UserRecord) -> Option<String> {
    let email_local = user
        .email
        .as_deref()
        .and_then(|e| e.split('@').next())
        .map(clean);
    let from_user_id = user.user_id.as_deref().map(clean);

    email_local
        .into_iter()
        .chain(from_user_id)
        .find(|base| !base.is_empty())
}

fn clean(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .take(MAX_BASE_CHARS)
        .collect()
}

pub fn synthesize<R: Rng>(base: &str, rng: &mut R) -> String {
    format!("{base}{}", rng.gen_range(1000..=9999))
}

/// Gives every user without a nickname a generated one.
pub async fn normalize_nicknames<R: Rng>(
    store: &dyn SessionStore,
    rng: &mut R,
    opts: RunOptions,
) -> StoreResult<RunReport> {
    let mut report = RunReport::new(RunKind::Nicknames, opts.dry_run);
    let users = store.users_missing_nickname().await?;
    info!(count = users.len(), "scanning users without nickname");

    for user in users {
        let outcome = match nickname_base(&user) {
            None => {
                warn!(id = %user.id, "no identifier to derive a nickname from");
                Outcome::Unmapped {
                    label: user.email.clone().unwrap_or_default(),
                }
            }
            Some(base) => {
                let nickname = synthesize(&base, rng);
                let written = if opts.dry_run {
                    Ok(())
                } else {
                    store.set_nickname(&user.id, &nickname).await
                };
                match written {
                    Ok(()) => {
                        info!(id = %user.id, "nickname set to {nickname:?}");
                        Outcome::Transformed {
                            from: base,
                            to: nickname,
                            color: None,
                        }
                    }
                    Err(e) => {
                        warn!(id = %user.id, "update failed: {e}");
                        Outcome::Failed {
                            error: e.to_string(),
                        }
                    }
                }
            }
        };

        let failed = matches!(outcome, Outcome::Failed { .. });
        report.record(&user.id, outcome);
        if failed && opts.abort_on_error {
            report.aborted = true;
            break;
        }
    }

    report.finish();
    Ok(report)
}
