//! Single-flight guard for collection jobs.
//!
//! The whole process shares one [`RunGuard`] (clones share the underlying
//! flag); every trigger request goes through [`RunGuard::try_acquire`], and
//! nothing else touches the flag. Acquisition is a compare-and-swap, so
//! under concurrent triggers exactly one caller wins — a plain
//! read-then-write would let two requests both observe idle and both
//! dispatch a job.
//!
//! Release is tied to [`RunPermit`]'s `Drop`, which makes it structural: the
//! guard returns to idle when the permit goes out of scope, whether the job
//! finished, errored, timed out, or panicked. There is no release method to
//! forget to call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct RunGuard {
    running: Arc<AtomicBool>,
}

impl RunGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to move the guard from idle to running.
    ///
    /// Returns a [`RunPermit`] on success, or `None` if a job is already in
    /// flight. Never blocks, never queues: a caller that loses the race is
    /// expected to retrigger later.
    pub fn try_acquire(&self) -> Option<RunPermit> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_was| RunPermit {
                running: Arc::clone(&self.running),
            })
    }

    /// Whether a collection job currently holds the permit.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Proof of a successful acquire. Holding it means the process-wide job slot
/// is yours; dropping it returns the guard to idle.
#[derive(Debug)]
pub struct RunPermit {
    running: Arc<AtomicBool>,
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_while_permit_held() {
        let guard = RunGuard::new();
        let permit = guard.try_acquire();
        assert!(permit.is_some());
        assert!(guard.is_running());
        assert!(guard.try_acquire().is_none());
    }

    #[test]
    fn dropping_permit_releases_guard() {
        let guard = RunGuard::new();
        {
            let _permit = guard.try_acquire().expect("first acquire");
            assert!(guard.is_running());
        }
        assert!(!guard.is_running());
        assert!(guard.try_acquire().is_some());
    }

    #[test]
    fn clones_share_the_same_flag() {
        let guard = RunGuard::new();
        let other = guard.clone();

        let _permit = guard.try_acquire().expect("acquire");
        assert!(other.is_running());
        assert!(other.try_acquire().is_none());
    }

    #[test]
    fn exactly_one_winner_under_thread_contention() {
        let guard = RunGuard::new();
        let winners = std::sync::atomic::AtomicU32::new(0);

        std::thread::scope(|scope| {
            for _ in 0..32 {
                scope.spawn(|| {
                    if let Some(permit) = guard.try_acquire() {
                        winners.fetch_add(1, Ordering::SeqCst);
                        // Hold the permit until every thread has tried.
                        std::thread::sleep(std::time::Duration::from_millis(50));
                        drop(permit);
                    }
                });
            }
        });

        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert!(!guard.is_running(), "guard must be idle after permit drop");
    }

    #[tokio::test]
    async fn panicking_task_still_releases_guard() {
        let guard = RunGuard::new();
        let permit = guard.try_acquire().expect("acquire");

        let handle = tokio::spawn(async move {
            let _permit = permit;
            panic!("job blew up");
        });

        assert!(handle.await.is_err(), "task should have panicked");
        assert!(
            !guard.is_running(),
            "permit drop during unwind must release the guard"
        );
        assert!(guard.try_acquire().is_some());
    }

    #[test]
    fn sequential_runs_reacquire_cleanly() {
        let guard = RunGuard::new();
        for _ in 0..5 {
            let permit = guard.try_acquire().expect("acquire");
            drop(permit);
        }
        assert!(!guard.is_running());
    }
}
