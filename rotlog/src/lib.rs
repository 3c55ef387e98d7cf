//! # rotlog
//!
//! Логгер с уровнями и ротацией файлов по времени.
//!
//! Имя файла задаётся шаблоном вида `logs/app.log-*-*-*`: каждая `*` —
//! компонента времени (год, месяц, день, час, минута), их число задаёт
//! период ротации. Старые файлы удаляются по сроку хранения.

mod callsite;
mod clock;
mod diag;
mod error;
mod level;
mod logger;
mod registry;
mod rotation;
mod sink;
mod sweep;
mod template;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use level::{should_emit, Level};
pub use logger::{Config, Logger, DISCARD};
pub use registry::Registry;
pub use sink::{RotationState, SinkKind};
pub use sweep::{sweep, Retention};
pub use template::{Granularity, Period, Template, PLACEHOLDER};

pub use tokio_util::sync::CancellationToken;

use once_cell::sync::{Lazy, OnceCell};
use callsite::CallSite;
use sink::Sink;

// ===== Глобальные логгеры =====

static DEFAULT_LOGGER: Lazy<Logger> = Lazy::new(|| Logger::fixed(Level::All, CallSite::Frames(0), Sink::Stdout));

static DEV_NULL: Lazy<Logger> = Lazy::new(|| Logger::fixed(Level::All, CallSite::Frames(0), Sink::Discard));

static GLOBAL_REGISTRY: OnceCell<Registry> = OnceCell::new();

/// Логгер процесса: stdout, все уровни, с местом вызова.
pub fn default_logger() -> &'static Logger {
    &DEFAULT_LOGGER
}

/// Логгер, который всё выбрасывает.
pub fn discard() -> &'static Logger {
    &DEV_NULL
}

/// Один раз за процесс строит глобальный реестр.
pub fn init<I, S>(configs: I, cancel: &CancellationToken) -> Result<&'static Registry>
where
    I: IntoIterator<Item = (S, Config)>,
    S: Into<String>,
{
    if GLOBAL_REGISTRY.get().is_some() {
        return Err(Error::AlreadyInitialized);
    }
    let registry = Registry::new(configs, cancel)?;
    GLOBAL_REGISTRY
        .set(registry)
        .map_err(|_| Error::AlreadyInitialized)?;
    GLOBAL_REGISTRY.get().ok_or(Error::AlreadyInitialized)
}

/// Логгер из глобального реестра; до `init` и для чужих имён — по умолчанию.
pub fn get(name: &str) -> &'static Logger {
    match GLOBAL_REGISTRY.get() {
        Some(registry) => registry.get(name),
        None => default_logger(),
    }
}
