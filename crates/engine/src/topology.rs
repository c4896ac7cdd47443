//! CPU topology and affinity pinning
//!
//! The engine needs two things from the OS: an ordered list of logical cores
//! this process may run on, and a way to bind the calling thread to one of
//! them. Both sit behind small seams so trials can run against a recording
//! stub.

use roofline_core::{Error, Result};
use tracing::debug;

/// Binds the calling thread to a logical core.
pub trait Affinity: Send + Sync {
    /// Pin the current thread to `core`.
    fn pin_current(&self, core: usize) -> Result<()>;
}

/// Affinity through `sched_setaffinity` (Linux); a no-op elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchedAffinity;

impl Affinity for SchedAffinity {
    #[cfg(target_os = "linux")]
    fn pin_current(&self, core: usize) -> Result<()> {
        if core >= libc::CPU_SETSIZE as usize {
            return Err(Error::Affinity {
                core,
                reason: format!("core id exceeds CPU_SETSIZE ({})", libc::CPU_SETSIZE),
            });
        }
        // SAFETY: `set` is a zeroed, correctly sized cpu_set_t and `core` is
        // within CPU_SETSIZE; pid 0 targets the calling thread.
        let rc = unsafe {
            let mut set: libc::cpu_set_t = std::mem::zeroed();
            libc::CPU_SET(core, &mut set);
            libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set)
        };
        if rc != 0 {
            return Err(Error::Affinity {
                core,
                reason: std::io::Error::last_os_error().to_string(),
            });
        }
        debug!(core, "thread pinned");
        Ok(())
    }

    #[cfg(not(target_os = "linux"))]
    fn pin_current(&self, core: usize) -> Result<()> {
        debug!(core, "affinity pinning unsupported on this platform, skipping");
        Ok(())
    }
}

/// Logical cores this process may run on, in ascending order.
#[cfg(target_os = "linux")]
pub fn usable_cores() -> Vec<usize> {
    // SAFETY: `set` is a zeroed, correctly sized cpu_set_t; pid 0 queries
    // the calling thread.
    let (rc, set) = unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        let rc = libc::sched_getaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &mut set);
        (rc, set)
    };
    if rc != 0 {
        return fallback_cores();
    }
    // SAFETY: CPU_ISSET only reads the set.
    (0..libc::CPU_SETSIZE as usize)
        .filter(|&id| unsafe { libc::CPU_ISSET(id, &set) })
        .collect()
}

/// Logical cores this process may run on, in ascending order.
#[cfg(not(target_os = "linux"))]
pub fn usable_cores() -> Vec<usize> {
    fallback_cores()
}

fn fallback_cores() -> Vec<usize> {
    let count = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (0..count).collect()
}
