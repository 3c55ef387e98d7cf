// ===== Собственные ошибки логгера =====
//
// Сбои открытия файлов и чистки не должны доходить до вызывающего,
// поэтому пишем о них в системный журнал, а если его нет — в stderr.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Problem {
    Warning,
    Error,
}

pub(crate) fn warning(message: &str) {
    report(Problem::Warning, message);
}

pub(crate) fn error(message: &str) {
    report(Problem::Error, message);
}

fn report(problem: Problem, message: &str) {
    if !system::report(problem, message) {
        eprintln!("rotlog: {}", message);
    }
}

#[cfg(any(target_os = "linux", target_os = "windows"))]
fn process_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "rotlog".to_owned())
}

#[cfg(target_os = "linux")]
mod system {
    use super::{process_name, Problem};
    use once_cell::sync::Lazy;
    use parking_lot::Mutex;
    use syslog::{Facility, Formatter3164, Logger, LoggerBackend};

    static SYSLOG: Lazy<Mutex<Option<Logger<LoggerBackend, Formatter3164>>>> =
        Lazy::new(|| Mutex::new(connect()));

    fn connect() -> Option<Logger<LoggerBackend, Formatter3164>> {
        let formatter = Formatter3164 {
            facility: Facility::LOG_USER,
            hostname: None,
            process: process_name(),
            pid: std::process::id(),
        };
        syslog::unix(formatter).ok()
    }

    pub(super) fn report(problem: Problem, message: &str) -> bool {
        let mut guard = SYSLOG.lock();
        let Some(logger) = guard.as_mut() else {
            return false;
        };
        let sent = match problem {
            Problem::Warning => logger.warning(message),
            Problem::Error => logger.err(message),
        };
        sent.is_ok()
    }
}

#[cfg(target_os = "windows")]
mod system {
    use super::{process_name, Problem};
    use once_cell::sync::Lazy;
    use winlog_rs::{EventKind, EventSource};

    static EVENT_LOG: Lazy<EventSource> = Lazy::new(|| EventSource::new(&process_name()));

    pub(super) fn report(problem: Problem, message: &str) -> bool {
        let kind = match problem {
            Problem::Warning => EventKind::Warning,
            Problem::Error => EventKind::Error,
        };
        EVENT_LOG.report(kind, message)
    }
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
mod system {
    use super::Problem;

    pub(super) fn report(_problem: Problem, _message: &str) -> bool {
        false
    }
}
