//! Pause/resume/kill control with tracking of paused processes.
//!
//! The controller owns the set of pids it has stopped. Membership is a
//! belief, not a guarantee: a tracked process may have exited or been
//! continued by someone else. The kernel remains the only ground truth and
//! the set is never reconciled against snapshots.

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Mutex;
use tracing::{info, warn};

/// Signals the controller can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleSignal {
    /// SIGSTOP
    Stop,
    /// SIGCONT
    Continue,
    /// SIGKILL
    Terminate,
}

impl LifecycleSignal {
    pub fn as_nix(self) -> Signal {
        match self {
            LifecycleSignal::Stop => Signal::SIGSTOP,
            LifecycleSignal::Continue => Signal::SIGCONT,
            LifecycleSignal::Terminate => Signal::SIGKILL,
        }
    }
}

/// Failure to deliver a signal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    #[error("no such process")]
    NoSuchProcess,

    #[error("permission denied")]
    PermissionDenied,

    #[error("invalid pid {0}")]
    InvalidPid(u32),

    #[error("signal delivery failed: {0}")]
    Other(String),
}

impl From<Errno> for SignalError {
    fn from(e: Errno) -> Self {
        match e {
            Errno::ESRCH => SignalError::NoSuchProcess,
            Errno::EPERM => SignalError::PermissionDenied,
            other => SignalError::Other(other.desc().to_string()),
        }
    }
}

/// Capability to deliver a lifecycle signal to a pid.
pub trait SignalDelivery: Send + Sync {
    fn deliver(&self, pid: u32, signal: LifecycleSignal) -> Result<(), SignalError>;
}

/// Delivers signals with `kill(2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KernelSignals;

impl SignalDelivery for KernelSignals {
    fn deliver(&self, pid: u32, signal: LifecycleSignal) -> Result<(), SignalError> {
        // Zero and values above i32::MAX would address process groups.
        let raw = i32::try_from(pid)
            .ok()
            .filter(|p| *p > 0)
            .ok_or(SignalError::InvalidPid(pid))?;
        kill(Pid::from_raw(raw), signal.as_nix())?;
        Ok(())
    }
}

/// Observable result of a lifecycle request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlOutcome {
    Paused(u32),
    AlreadyPaused(u32),
    Resumed(u32),
    Killed(u32),
    NotPaused(u32),
    NoSuchProcess(u32),
    PermissionDenied(u32),
    /// The pid belongs to the controlling process itself; nothing was sent.
    Protected(u32),
    Failed(u32, String),
}

impl ControlOutcome {
    /// Whether the requested signal reached the process.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ControlOutcome::Paused(_)
                | ControlOutcome::AlreadyPaused(_)
                | ControlOutcome::Resumed(_)
                | ControlOutcome::Killed(_)
        )
    }

    fn from_error(pid: u32, err: SignalError) -> Self {
        match err {
            SignalError::NoSuchProcess => ControlOutcome::NoSuchProcess(pid),
            SignalError::PermissionDenied => ControlOutcome::PermissionDenied(pid),
            other => ControlOutcome::Failed(pid, other.to_string()),
        }
    }
}

impl fmt::Display for ControlOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlOutcome::Paused(pid) => write!(f, "Process {} paused", pid),
            ControlOutcome::AlreadyPaused(pid) => write!(f, "Process {} is already paused", pid),
            ControlOutcome::Resumed(pid) => write!(f, "Process {} resumed", pid),
            ControlOutcome::Killed(pid) => write!(f, "Process {} killed", pid),
            ControlOutcome::NotPaused(pid) => write!(f, "Process {} is not paused", pid),
            ControlOutcome::NoSuchProcess(pid) => write!(f, "No process with PID {} found", pid),
            ControlOutcome::PermissionDenied(pid) => {
                write!(f, "Permission denied for process {}", pid)
            }
            ControlOutcome::Protected(pid) => {
                write!(f, "Refusing to signal process {}: it is procwatch itself", pid)
            }
            ControlOutcome::Failed(pid, msg) => {
                write!(f, "Error signalling process {}: {}", pid, msg)
            }
        }
    }
}

/// Owner of the paused-pid set.
///
/// Signal delivery and the set update happen under one lock so that the
/// per-pid transitions stay consistent when requests race.
pub struct LifecycleController {
    signals: Box<dyn SignalDelivery>,
    paused: Mutex<BTreeSet<u32>>,
    own_pid: u32,
}

impl LifecycleController {
    pub fn new(signals: impl SignalDelivery + 'static) -> Self {
        Self {
            signals: Box::new(signals),
            paused: Mutex::new(BTreeSet::new()),
            own_pid: std::process::id(),
        }
    }

    /// Controller delivering real signals.
    pub fn with_kernel_signals() -> Self {
        Self::new(KernelSignals)
    }

    /// Stops `pid` and starts tracking it.
    pub fn pause(&self, pid: u32) -> ControlOutcome {
        // A stopped monitor could never serve the resume.
        if pid == self.own_pid {
            let outcome = ControlOutcome::Protected(pid);
            report(&outcome);
            return outcome;
        }
        let mut paused = self.paused.lock().expect("paused set lock poisoned");
        let outcome = match self.signals.deliver(pid, LifecycleSignal::Stop) {
            Ok(()) => {
                if paused.insert(pid) {
                    ControlOutcome::Paused(pid)
                } else {
                    ControlOutcome::AlreadyPaused(pid)
                }
            }
            Err(e) => ControlOutcome::from_error(pid, e),
        };
        drop(paused);
        report(&outcome);
        outcome
    }

    /// Continues `pid` if, and only if, this controller paused it.
    pub fn resume(&self, pid: u32) -> ControlOutcome {
        let mut paused = self.paused.lock().expect("paused set lock poisoned");
        let outcome = if !paused.contains(&pid) {
            ControlOutcome::NotPaused(pid)
        } else {
            match self.signals.deliver(pid, LifecycleSignal::Continue) {
                Ok(()) => {
                    paused.remove(&pid);
                    ControlOutcome::Resumed(pid)
                }
                Err(SignalError::NoSuchProcess) => {
                    // Stale entry: the process is gone.
                    paused.remove(&pid);
                    ControlOutcome::NoSuchProcess(pid)
                }
                Err(e) => ControlOutcome::from_error(pid, e),
            }
        };
        drop(paused);
        report(&outcome);
        outcome
    }

    /// Kills `pid` unconditionally.
    ///
    /// A tracked pid stops being tracked once it is killed or found gone.
    pub fn kill(&self, pid: u32) -> ControlOutcome {
        if pid == self.own_pid {
            let outcome = ControlOutcome::Protected(pid);
            report(&outcome);
            return outcome;
        }
        let mut paused = self.paused.lock().expect("paused set lock poisoned");
        let outcome = match self.signals.deliver(pid, LifecycleSignal::Terminate) {
            Ok(()) => {
                paused.remove(&pid);
                ControlOutcome::Killed(pid)
            }
            Err(SignalError::NoSuchProcess) => {
                paused.remove(&pid);
                ControlOutcome::NoSuchProcess(pid)
            }
            Err(e) => ControlOutcome::from_error(pid, e),
        };
        drop(paused);
        report(&outcome);
        outcome
    }

    pub fn contains(&self, pid: u32) -> bool {
        self.paused
            .lock()
            .expect("paused set lock poisoned")
            .contains(&pid)
    }

    /// Tracked pids in ascending order.
    pub fn paused(&self) -> Vec<u32> {
        self.paused
            .lock()
            .expect("paused set lock poisoned")
            .iter()
            .copied()
            .collect()
    }
}

impl fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleController")
            .field("paused", &self.paused())
            .finish()
    }
}

fn report(outcome: &ControlOutcome) {
    if outcome.is_success() {
        info!("{}", outcome);
    } else {
        warn!("{}", outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Records delivered signals; pids listed in `errors` fail.
    #[derive(Clone, Default)]
    struct FakeSignals {
        errors: Arc<Mutex<HashMap<u32, SignalError>>>,
        sent: Arc<Mutex<Vec<(u32, LifecycleSignal)>>>,
    }

    impl FakeSignals {
        fn failing(pid: u32, err: SignalError) -> Self {
            let fake = Self::default();
            fake.fail(pid, err);
            fake
        }

        fn fail(&self, pid: u32, err: SignalError) {
            self.errors.lock().unwrap().insert(pid, err);
        }

        fn sent(&self) -> Vec<(u32, LifecycleSignal)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl SignalDelivery for FakeSignals {
        fn deliver(&self, pid: u32, signal: LifecycleSignal) -> Result<(), SignalError> {
            if let Some(err) = self.errors.lock().unwrap().get(&pid) {
                return Err(err.clone());
            }
            self.sent.lock().unwrap().push((pid, signal));
            Ok(())
        }
    }

    fn controller_with(fake: FakeSignals) -> (LifecycleController, FakeSignals) {
        (LifecycleController::new(fake.clone()), fake)
    }

    #[test]
    fn test_pause_then_resume() {
        let (ctl, sent) = controller_with(FakeSignals::default());

        assert_eq!(ctl.pause(100), ControlOutcome::Paused(100));
        assert!(ctl.contains(100));

        assert_eq!(ctl.resume(100), ControlOutcome::Resumed(100));
        assert!(!ctl.contains(100));

        assert_eq!(
            sent.sent(),
            vec![(100, LifecycleSignal::Stop), (100, LifecycleSignal::Continue)]
        );
    }

    #[test]
    fn test_own_pid_is_never_signalled() {
        let (ctl, sent) = controller_with(FakeSignals::default());
        let me = std::process::id();

        assert_eq!(ctl.pause(me), ControlOutcome::Protected(me));
        assert_eq!(ctl.kill(me), ControlOutcome::Protected(me));
        assert!(!ctl.pause(me).is_success());
        assert!(!ctl.contains(me));
        assert!(sent.sent().is_empty());
    }

    #[test]
    fn test_pause_twice_is_deduplicated() {
        let (ctl, _) = controller_with(FakeSignals::default());
        assert_eq!(ctl.pause(7), ControlOutcome::Paused(7));
        assert_eq!(ctl.pause(7), ControlOutcome::AlreadyPaused(7));
        assert_eq!(ctl.paused(), vec![7]);
    }

    #[test]
    fn test_resume_never_paused() {
        let (ctl, sent) = controller_with(FakeSignals::default());
        let outcome = ctl.resume(42);
        assert_eq!(outcome, ControlOutcome::NotPaused(42));
        assert_eq!(outcome.to_string(), "Process 42 is not paused");
        assert!(sent.sent().is_empty());
        assert!(ctl.paused().is_empty());
    }

    #[test]
    fn test_pause_missing_process_not_tracked() {
        let (ctl, _) = controller_with(FakeSignals::failing(999_999, SignalError::NoSuchProcess));
        assert_eq!(ctl.pause(999_999), ControlOutcome::NoSuchProcess(999_999));
        assert!(!ctl.contains(999_999));
    }

    #[test]
    fn test_pause_permission_denied_not_tracked() {
        let (ctl, _) = controller_with(FakeSignals::failing(1, SignalError::PermissionDenied));
        assert_eq!(ctl.pause(1), ControlOutcome::PermissionDenied(1));
        assert!(ctl.paused().is_empty());
    }

    #[test]
    fn test_resume_stale_entry_is_cleared() {
        let (ctl, fake) = controller_with(FakeSignals::default());
        assert_eq!(ctl.pause(55), ControlOutcome::Paused(55));

        // The process exits while paused.
        fake.fail(55, SignalError::NoSuchProcess);

        assert_eq!(ctl.resume(55), ControlOutcome::NoSuchProcess(55));
        assert!(!ctl.contains(55));
    }

    #[test]
    fn test_kill_is_unconditional_and_clears_tracking() {
        let (ctl, sent) = controller_with(FakeSignals::default());
        assert_eq!(ctl.kill(300), ControlOutcome::Killed(300));

        ctl.pause(301);
        assert_eq!(ctl.kill(301), ControlOutcome::Killed(301));
        assert!(!ctl.contains(301));
        assert_eq!(ctl.resume(301), ControlOutcome::NotPaused(301));

        assert_eq!(sent.sent()[0], (300, LifecycleSignal::Terminate));
    }

    #[test]
    fn test_kill_failure_reported() {
        let (ctl, _) = controller_with(FakeSignals::failing(
            9,
            SignalError::Other("Invalid argument".into()),
        ));
        let outcome = ctl.kill(9);
        assert!(!outcome.is_success());
        assert_eq!(
            outcome.to_string(),
            "Error signalling process 9: signal delivery failed: Invalid argument"
        );
    }

    #[test]
    fn test_signal_mapping() {
        assert_eq!(LifecycleSignal::Stop.as_nix(), Signal::SIGSTOP);
        assert_eq!(LifecycleSignal::Continue.as_nix(), Signal::SIGCONT);
        assert_eq!(LifecycleSignal::Terminate.as_nix(), Signal::SIGKILL);
    }

    #[test]
    fn test_errno_mapping() {
        assert_eq!(SignalError::from(Errno::ESRCH), SignalError::NoSuchProcess);
        assert_eq!(SignalError::from(Errno::EPERM), SignalError::PermissionDenied);
        assert!(matches!(SignalError::from(Errno::EINVAL), SignalError::Other(_)));
    }

    #[test]
    fn test_kernel_signals_rejects_group_pids() {
        assert_eq!(
            KernelSignals.deliver(0, LifecycleSignal::Stop),
            Err(SignalError::InvalidPid(0))
        );
        assert_eq!(
            KernelSignals.deliver(u32::MAX, LifecycleSignal::Stop),
            Err(SignalError::InvalidPid(u32::MAX))
        );
    }
}
