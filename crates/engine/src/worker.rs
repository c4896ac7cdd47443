//! Thread worker
//!
//! Per-trial lifecycle of one worker thread:
//!
//! ```text
//! SPAWNED -> (gate) -> AFFINITY-PINNED -> BARRIER-WAIT -> TIMED-EXECUTION
//!         -> RESULT-WRITTEN -> JOINED
//! ```
//!
//! Barrier wait and timed execution happen inside the kernel. Pinning is
//! requested only for multi-threaded trials and is best-effort: a worker
//! that cannot be pinned still runs, so the barrier count stays intact.
//! A kernel that panics abandons the trial barrier before the panic leaves
//! the thread, so the other workers return instead of waiting for it.

use crate::gate::StartGate;
use crate::topology::Affinity;
use roofline_core::{Kernel, KernelArgs, ThreadResult};
use std::panic::{self, AssertUnwindSafe};
use tracing::{trace, warn};

/// Everything one worker needs for one trial.
pub(crate) struct Worker<'a> {
    pub kernel: &'a Kernel,
    pub args: KernelArgs<'a>,
    pub gate: &'a StartGate,
    /// Affinity collaborator and target core, for multi-threaded trials
    pub pin: Option<(&'a dyn Affinity, usize)>,
}

impl Worker<'_> {
    /// Run the trial and write the kernel's result into `slot`.
    ///
    /// Returns `false` without touching `slot` if the trial was aborted
    /// before it started.
    pub fn run(mut self, slot: &mut ThreadResult) -> bool {
        let tid = self.args.tid;
        trace!(tid, kernel = %self.kernel.name, "worker spawned");

        if !self.gate.wait() {
            trace!(tid, "trial aborted before start");
            return false;
        }

        if let Some((affinity, core)) = self.pin {
            if let Err(e) = affinity.pin_current(core) {
                warn!(tid, core, error = %e, "pinning failed, running unpinned");
            }
        }

        let ctx = self.args.ctx;
        let body = self.kernel.body;
        let args = &mut self.args;
        match panic::catch_unwind(AssertUnwindSafe(|| body(args))) {
            Ok(result) => *slot = result,
            Err(payload) => {
                warn!(tid, kernel = %self.kernel.name, "kernel panicked, abandoning trial");
                ctx.barrier().abandon();
                panic::resume_unwind(payload);
            }
        }
        trace!(tid, reps = slot.reps, runtime = slot.runtime, "result written");
        true
    }
}
