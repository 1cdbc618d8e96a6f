//! Kill command implementation.
//!
//! Delivers SIGKILL once. Pause and resume are only offered by the server,
//! because the set of paused processes lives in its memory.

use procwatch::{ControlOutcome, LifecycleController};

/// Kills `pid` and reports the outcome.
pub fn command_kill(pid: u32) -> Result<(), Box<dyn std::error::Error>> {
    let controller = LifecycleController::with_kernel_signals();
    match controller.kill(pid) {
        ControlOutcome::Killed(_) => {
            println!("✅ Process {} killed", pid);
            Ok(())
        }
        other => Err(other.to_string().into()),
    }
}
