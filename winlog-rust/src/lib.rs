//! # winlog-rs
//!
//! Запись в Windows Event Log для собственных ошибок логгера.
//! Если свой источник не зарегистрирован — пишет в "Application" с префиксом.
#![cfg(windows)]

use std::ffi::CString;
use windows_sys::core::PCSTR;
use windows_sys::Win32::Foundation::HANDLE;
use windows_sys::Win32::System::EventLog::{
    DeregisterEventSource, RegisterEventSourceA, ReportEventA, EVENTLOG_ERROR_TYPE,
    EVENTLOG_INFORMATION_TYPE, EVENTLOG_WARNING_TYPE,
};

const FALLBACK_SOURCE: &str = "Application";
const EVENT_ID: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Information,
    Warning,
    Error,
}

impl EventKind {
    fn event_type(self) -> u16 {
        match self {
            EventKind::Information => EVENTLOG_INFORMATION_TYPE,
            EventKind::Warning => EVENTLOG_WARNING_TYPE,
            EventKind::Error => EVENTLOG_ERROR_TYPE,
        }
    }
}

/// Открытый источник событий. Регистрируется один раз и
/// снимается с регистрации при удалении.
#[derive(Debug)]
pub struct EventSource {
    name: String,
    handle: HANDLE,
    prefixed: bool,
}

impl EventSource {
    pub fn new(name: &str) -> Self {
        let mut handle = register(name);
        let mut prefixed = false;
        if handle == 0 {
            handle = register(FALLBACK_SOURCE);
            prefixed = true;
        }
        EventSource {
            name: name.to_owned(),
            handle,
            prefixed,
        }
    }

    /// `true`, если событие принято журналом.
    pub fn report(&self, kind: EventKind, message: &str) -> bool {
        if self.handle == 0 {
            return false;
        }

        let text = if self.prefixed {
            format!("[{}] {}", self.name, message)
        } else {
            message.to_owned()
        };
        let Ok(c_message) = CString::new(text) else {
            return false;
        };
        let strings: [PCSTR; 1] = [c_message.as_ptr() as PCSTR];

        let reported = unsafe {
            ReportEventA(
                self.handle,
                kind.event_type(),
                0,
                EVENT_ID,
                std::ptr::null_mut(),
                1,
                0,
                strings.as_ptr(),
                std::ptr::null(),
            )
        };
        reported != 0
    }
}

impl Drop for EventSource {
    fn drop(&mut self) {
        if self.handle != 0 {
            unsafe {
                DeregisterEventSource(self.handle);
            }
        }
    }
}

fn register(source: &str) -> HANDLE {
    match CString::new(source) {
        Ok(c_source) => unsafe { RegisterEventSourceA(std::ptr::null(), c_source.as_ptr() as PCSTR) },
        Err(_) => 0,
    }
}
