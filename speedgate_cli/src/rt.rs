//! Real-time scheduling helpers (Linux SCHED_FIFO / affinity / mlockall).
//!
//! Tick pacing relies on short sleeps; SCHED_FIFO plus locked memory keeps
//! the wakeup jitter small enough that a 0.1 ms tick is meaningful on a
//! stock kernel. Everything here degrades to a logged warning rather than
//! failing the run.

use crate::cli::RtLock;

#[cfg(target_os = "linux")]
pub fn setup_rt_once(rt: bool, prio: Option<i32>, lock: RtLock, rt_cpu: Option<usize>) {
    use std::sync::OnceLock;
    static RT_ONCE: OnceLock<()> = OnceLock::new();

    if !rt {
        return;
    }

    fn try_apply_mem_lock(lock: RtLock) -> eyre::Result<()> {
        use libc::{MCL_CURRENT, MCL_FUTURE, mlockall};
        let flags = match lock {
            RtLock::None => return Ok(()),
            RtLock::Current => MCL_CURRENT,
            RtLock::All => MCL_CURRENT | MCL_FUTURE,
        };
        let rc = unsafe { mlockall(flags) };
        if rc != 0 {
            let err = std::io::Error::last_os_error();
            eyre::bail!(
                "mlockall failed: {err}; hint: needs CAP_IPC_LOCK (or root) and sufficient 'ulimit -l'"
            );
        }
        Ok(())
    }

    fn try_apply_fifo_priority(prio: Option<i32>) -> eyre::Result<()> {
        use libc::{SCHED_FIFO, sched_get_priority_max, sched_get_priority_min, sched_param, sched_setscheduler};
        let (min, max) = unsafe {
            let min = sched_get_priority_min(SCHED_FIFO);
            let max = sched_get_priority_max(SCHED_FIFO);
            if min < 0 || max < 0 { (1, 99) } else { (min, max) }
        };
        let param = sched_param {
            sched_priority: prio.unwrap_or(max).clamp(min, max),
        };
        let rc = unsafe { sched_setscheduler(0, SCHED_FIFO, &param) };
        if rc != 0 {
            let err = std::io::Error::last_os_error();
            eyre::bail!(
                "sched_setscheduler(SCHED_FIFO) failed: {err}; hint: needs CAP_SYS_NICE or root"
            );
        }
        Ok(())
    }

    fn try_apply_affinity(rt_cpu: Option<usize>) -> eyre::Result<()> {
        use libc::{CPU_ISSET, CPU_SET, CPU_ZERO};
        const MAX_CPUSET_BITS: usize = std::mem::size_of::<libc::cpu_set_t>() * 8;
        let online = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
        if online < 1 {
            eyre::bail!("_SC_NPROCESSORS_ONLN < 1");
        }
        let target = rt_cpu.unwrap_or(0);
        if target as libc::c_long >= online || target >= MAX_CPUSET_BITS {
            eyre::bail!("requested CPU {target} out of range (online {online})");
        }
        let mut allowed: libc::cpu_set_t = unsafe { std::mem::zeroed() };
        unsafe { CPU_ZERO(&mut allowed) };
        let rc = unsafe {
            libc::sched_getaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &mut allowed)
        };
        if rc == 0 && unsafe { CPU_ISSET(target, &allowed) as libc::c_int } == 0 {
            eyre::bail!("CPU {target} not permitted by current affinity mask");
        }
        let mut desired: libc::cpu_set_t = unsafe { std::mem::zeroed() };
        unsafe { CPU_ZERO(&mut desired) };
        unsafe { CPU_SET(target, &mut desired) };
        let rc = unsafe {
            libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &desired)
        };
        if rc != 0 {
            eyre::bail!(std::io::Error::last_os_error());
        }
        Ok(())
    }

    RT_ONCE.get_or_init(|| {
        match try_apply_mem_lock(lock) {
            Ok(()) => tracing::info!(mode = ?lock, "memory lock applied"),
            Err(e) => tracing::warn!(error = %e, "memory lock skipped"),
        }
        match try_apply_fifo_priority(prio) {
            Ok(()) => tracing::info!("SCHED_FIFO applied"),
            Err(e) => tracing::warn!(error = %e, "SCHED_FIFO skipped"),
        }
        match try_apply_affinity(rt_cpu) {
            Ok(()) => tracing::info!(cpu = rt_cpu.unwrap_or(0), "CPU affinity applied"),
            Err(e) => tracing::warn!(error = %e, "CPU affinity skipped"),
        }
    });
}

#[cfg(not(target_os = "linux"))]
pub fn setup_rt_once(rt: bool, _prio: Option<i32>, _lock: RtLock, _rt_cpu: Option<usize>) {
    if rt {
        tracing::warn!("real-time mode is only supported on Linux; continuing without it");
    }
}
