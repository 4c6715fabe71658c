//! System event monitors: sleep/resume and wall-clock changes.
//!
//! After a resume or a clock jump the next scheduled tick may be far away and
//! the desktop may have reset its appearance, so both events make the core
//! re-evaluate at once.
//!
//! - Sleep/resume comes from systemd-logind's `PrepareForSleep` D-Bus signal.
//! - Clock changes are detected with a `CLOCK_REALTIME` timerfd armed with
//!   `TFD_TIMER_CANCEL_ON_SET`, which the kernel cancels whenever the clock is
//!   set.
//!
//! Both monitors are best effort: if D-Bus or timerfd is unavailable a
//! warning is logged and geodark keeps running on its regular ticks.

use anyhow::{Context, Result};
use nix::errno::Errno;
use nix::sys::time::TimeSpec;
use nix::sys::timerfd::{ClockId, Expiration, TimerFd, TimerFlags, TimerSetTimeFlags};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use zbus::blocking::Connection;

use crate::io::signals::SignalMessage;

/// Clock changes reported this soon after a resume are the resume itself.
const RESUME_GRACE_SECS: u64 = 5;
const MAX_MONITOR_RESTARTS: u8 = 3;
const RESTART_DELAY: Duration = Duration::from_secs(2);

#[zbus::proxy(
    interface = "org.freedesktop.login1.Manager",
    default_service = "org.freedesktop.login1",
    default_path = "/org/freedesktop/login1"
)]
trait LogindManager {
    #[zbus(signal)]
    fn prepare_for_sleep(&self, start: bool) -> zbus::Result<()>;
}

/// Sleep state shared by both monitors.
#[derive(Clone, Default)]
struct SleepTracker {
    is_sleeping: Arc<AtomicBool>,
    resumed_at: Arc<AtomicU64>,
}

impl SleepTracker {
    fn now_secs() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn suppresses_time_change(&self) -> bool {
        if self.is_sleeping.load(Ordering::SeqCst) {
            return true;
        }
        let resumed_at = self.resumed_at.load(Ordering::SeqCst);
        resumed_at != 0 && Self::now_secs().saturating_sub(resumed_at) <= RESUME_GRACE_SECS
    }
}

/// Start both monitors on background threads.
pub fn start_system_event_monitors(signal_sender: Sender<SignalMessage>) {
    let tracker = SleepTracker::default();

    thread::spawn({
        let signal_sender = signal_sender.clone();
        let tracker = tracker.clone();
        move || {
            for attempt in 0..=MAX_MONITOR_RESTARTS {
                match monitor_sleep_signals(&signal_sender, &tracker) {
                    Ok(()) => return,
                    Err(e) => {
                        log_pipe!();
                        log_warning!("Sleep monitor error: {:#}", e);
                        if attempt == MAX_MONITOR_RESTARTS {
                            log_indented!("Sleep/resume detection will not be available");
                            return;
                        }
                        log_indented!(
                            "Will restart D-Bus monitor (attempt {}/{})",
                            attempt + 1,
                            MAX_MONITOR_RESTARTS
                        );
                        thread::sleep(RESTART_DELAY);
                    }
                }
            }
        }
    });

    thread::spawn(move || {
        if let Err(e) = monitor_time_changes(&signal_sender, &tracker) {
            log_pipe!();
            log_warning!("Time change monitor error: {:#}", e);
            log_indented!("System time change detection will not be available");
        }
    });
}

/// Returns `Ok` only when the core has gone away.
fn monitor_sleep_signals(
    signal_sender: &Sender<SignalMessage>,
    tracker: &SleepTracker,
) -> Result<()> {
    let connection = Connection::system().context("Failed to connect to system D-Bus")?;
    let proxy =
        LogindManagerProxyBlocking::new(&connection).context("Failed to create logind proxy")?;
    let signals = proxy
        .receive_prepare_for_sleep()
        .context("Failed to subscribe to PrepareForSleep signals")?;

    log_debug!("Subscribed to logind PrepareForSleep signals");

    for signal in signals {
        let going_to_sleep = match signal.args() {
            Ok(args) => args.start,
            Err(e) => {
                log_warning!("Failed to parse PrepareForSleep signal: {}", e);
                continue;
            }
        };

        if going_to_sleep {
            tracker.is_sleeping.store(true, Ordering::SeqCst);
            log_pipe!();
            log_info!("System entering sleep");
        } else {
            tracker
                .resumed_at
                .store(SleepTracker::now_secs(), Ordering::SeqCst);
            tracker.is_sleeping.store(false, Ordering::SeqCst);
            log_pipe!();
            log_info!("System resumed from sleep");
        }

        if signal_sender
            .send(SignalMessage::Sleep {
                resuming: !going_to_sleep,
            })
            .is_err()
        {
            return Ok(());
        }
    }

    anyhow::bail!("D-Bus connection lost, PrepareForSleep stream ended")
}

struct TimeChangeDetector {
    timer: TimerFd,
}

impl TimeChangeDetector {
    fn new() -> nix::Result<Self> {
        let timer = TimerFd::new(ClockId::CLOCK_REALTIME, TimerFlags::empty())?;
        let mut detector = Self { timer };
        detector.arm()?;
        Ok(detector)
    }

    /// Arm far in the future; only a clock change will wake us.
    fn arm(&mut self) -> nix::Result<()> {
        let flags =
            TimerSetTimeFlags::TFD_TIMER_ABSTIME | TimerSetTimeFlags::TFD_TIMER_CANCEL_ON_SET;
        let far_future = TimeSpec::new(i64::MAX / 1000, 0);
        self.timer.set(Expiration::OneShot(far_future), flags)
    }

    fn wait(&mut self) -> Result<()> {
        match self.timer.wait() {
            Ok(()) | Err(Errno::ECANCELED) => {
                self.arm().context("Failed to re-arm clock change timer")?;
                Ok(())
            }
            Err(e) => Err(anyhow::anyhow!("Timer wait error: {}", e)),
        }
    }
}

fn monitor_time_changes(
    signal_sender: &Sender<SignalMessage>,
    tracker: &SleepTracker,
) -> Result<()> {
    let mut detector =
        TimeChangeDetector::new().context("Failed to create time change detector")?;

    loop {
        detector.wait().context("Time change detection failed")?;

        if tracker.suppresses_time_change() {
            continue;
        }

        log_pipe!();
        log_info!("System time changed");
        if signal_sender.send(SignalMessage::TimeChange).is_err() {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_change_suppressed_while_sleeping_and_after_resume() {
        let tracker = SleepTracker::default();
        assert!(!tracker.suppresses_time_change());

        tracker.is_sleeping.store(true, Ordering::SeqCst);
        assert!(tracker.suppresses_time_change());

        tracker.is_sleeping.store(false, Ordering::SeqCst);
        tracker
            .resumed_at
            .store(SleepTracker::now_secs(), Ordering::SeqCst);
        assert!(tracker.suppresses_time_change());

        tracker
            .resumed_at
            .store(SleepTracker::now_secs() - 60, Ordering::SeqCst);
        assert!(!tracker.suppresses_time_change());
    }
}
