//! Non-fatal warning channel for statistics that could not be computed.
//!
//! Warnings can be demoted for a scope by holding a [`SuppressWarnings`]
//! guard. The previous state comes back when the guard drops, including on
//! early returns and `?` propagation.

use std::cell::Cell;
use std::marker::PhantomData;

use crate::error::StatisticUnavailable;

use super::AnnotationContext;

thread_local! {
    static SUPPRESS_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Scope guard: while alive, statistic warnings on this thread are logged at
/// `debug` instead of `warn`. Guards nest.
#[must_use = "warnings are only suppressed while the guard is alive"]
pub struct SuppressWarnings {
    // The depth counter is thread-local, so the guard must stay on its thread.
    _not_send: PhantomData<*const ()>,
}

impl SuppressWarnings {
    pub fn acquire() -> Self {
        SUPPRESS_DEPTH.with(|d| d.set(d.get() + 1));
        Self {
            _not_send: PhantomData,
        }
    }
}

impl Drop for SuppressWarnings {
    fn drop(&mut self) {
        SUPPRESS_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// Whether a [`SuppressWarnings`] guard is alive on this thread.
pub fn warnings_suppressed() -> bool {
    SUPPRESS_DEPTH.with(|d| d.get() > 0)
}

/// Report a failed statistic together with the inputs it was evaluated on.
pub fn report_unavailable(err: &StatisticUnavailable, ctx: &AnnotationContext<'_>) {
    let vars = match ctx.y_name {
        Some(y) => format!("{} vs {}", ctx.x_name, y),
        None => ctx.x_name.to_string(),
    };
    let group = ctx.label.unwrap_or("<all>");
    if warnings_suppressed() {
        log::debug!(
            "while evaluating {} on {vars} (group {group}, n={}): {err}",
            err.statistic,
            ctx.x.len()
        );
    } else {
        log::warn!(
            "while evaluating {} on {vars} (group {group}, n={}): {err}",
            err.statistic,
            ctx.x.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fails() -> Result<(), ()> {
        let _guard = SuppressWarnings::acquire();
        assert!(warnings_suppressed());
        Err(())
    }

    #[test]
    fn guard_restores_on_every_exit_path() {
        assert!(!warnings_suppressed());
        {
            let _outer = SuppressWarnings::acquire();
            {
                let _inner = SuppressWarnings::acquire();
                assert!(warnings_suppressed());
            }
            assert!(warnings_suppressed());
        }
        assert!(!warnings_suppressed());
        assert!(fails().is_err());
        assert!(!warnings_suppressed());
    }
}
