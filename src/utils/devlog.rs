//! Bench lines from the query path.
//!
//! `find`, `count` and the translator each emit one JSON line through [`dev6!`] under the
//! `docquery::dev6` target. Tests switch on a per-thread capture to read those lines back without
//! installing a logger.

use std::cell::RefCell;

thread_local! {
    static CAPTURED: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Stops capturing on the current thread when dropped.
pub struct CaptureGuard;

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        CAPTURED.with(|c| *c.borrow_mut() = None);
    }
}

/// Starts capturing bench lines emitted on this thread.
#[must_use]
pub fn enable_thread_sink() -> CaptureGuard {
    CAPTURED.with(|c| *c.borrow_mut() = Some(Vec::new()));
    CaptureGuard
}

pub fn write_str(line: &str) {
    CAPTURED.with(|c| {
        if let Some(lines) = c.borrow_mut().as_mut() {
            lines.push(line.to_owned());
        }
    });
}

/// Takes the lines captured so far; empty when capture is off.
pub fn drain() -> Vec<String> {
    CAPTURED.with(|c| c.borrow_mut().as_mut().map(std::mem::take).unwrap_or_default())
}

#[macro_export]
macro_rules! dev6 {
    ($($arg:tt)*) => {{
        let __line = format!($($arg)*);
        $crate::utils::devlog::write_str(&__line);
        log::log!(target: "docquery::dev6", log::Level::Trace, "{}", __line);
    }};
}
