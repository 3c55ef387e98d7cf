use crate::callsite::{self, CallSite};
use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::level::{should_emit, Level};
use crate::rotation::Rotation;
use crate::sink::{ActiveSink, Fallback, RotationState, Sink, SinkKind};
use crate::sweep::Retention;
use crate::template::Template;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::io::Write;
use std::panic::Location;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Файл-пустышка: всё записанное выбрасывается, ротации нет.
pub const DISCARD: &str = "/dev/null";

// ===== Конфигурация =====

/// Настройки одного логгера. Логгер берёт копию и дальше её не меняет.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Шаблон имени вида `logs/app.log-*-*-*`; пустой — писать в stdout.
    pub file: String,
    pub level: Level,
    pub expire: Retention,
    /// Меньше нуля — без места вызова, 0 — вызывающий, N — на N кадров выше.
    pub trace: i32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            file: String::new(),
            level: Level::All,
            expire: Retention::Forever,
            trace: 0,
        }
    }
}

enum Destination {
    Stdout,
    Discard,
    Rotating(Template),
}

/// То, что логгер реально использует; выводится из `Config` один раз.
struct Effective {
    level: Level,
    call_site: CallSite,
    retention: Retention,
    destination: Destination,
}

impl Effective {
    fn derive(config: &Config) -> Result<Self> {
        let destination = match config.file.as_str() {
            "" => Destination::Stdout,
            DISCARD => Destination::Discard,
            file => Destination::Rotating(Template::parse(file)?),
        };
        Ok(Effective {
            level: config.level,
            call_site: CallSite::from_trace(config.trace),
            retention: config.expire,
            destination,
        })
    }
}

// ===== Логгер =====

pub struct Logger {
    level: Level,
    call_site: CallSite,
    sink: Arc<ActiveSink>,
    // отмена задачи ротации вместе с логгером
    _rotation: Option<DropGuard>,
}

impl Logger {
    /// Логгер по конфигурации. Для файла нужен работающий tokio runtime:
    /// ротация идёт отдельной задачей до отмены `cancel` или удаления логгера.
    pub fn new(config: &Config, cancel: &CancellationToken) -> Result<Self> {
        Self::with_clock(config, cancel, SystemClock)
    }

    pub fn with_clock<C: Clock>(config: &Config, cancel: &CancellationToken, clock: C) -> Result<Self> {
        Self::build(config, cancel, clock, Box::new(|| Sink::Stderr))
    }

    /// Как `with_clock`, но при неудачном открытии файла строки уходят
    /// в `fallback()`, а не в stderr.
    pub fn with_fallback<C, W, F>(
        config: &Config,
        cancel: &CancellationToken,
        clock: C,
        fallback: F,
    ) -> Result<Self>
    where
        C: Clock,
        W: Write + Send + 'static,
        F: Fn() -> W + Send + Sync + 'static,
    {
        Self::build(
            config,
            cancel,
            clock,
            Box::new(move || Sink::Writer(Box::new(fallback()))),
        )
    }

    fn build<C: Clock>(
        config: &Config,
        cancel: &CancellationToken,
        clock: C,
        fallback: Fallback,
    ) -> Result<Self> {
        let effective = Effective::derive(config)?;

        match effective.destination {
            Destination::Stdout => Ok(Logger::fixed(effective.level, effective.call_site, Sink::Stdout)),
            Destination::Discard => {
                let sink = ActiveSink::new(Sink::Discard, RotationState::Installing);
                sink.install(Sink::Discard, DISCARD.to_owned());
                sink.set_state(RotationState::Stopped);
                Ok(Logger {
                    level: effective.level,
                    call_site: effective.call_site,
                    sink: Arc::new(sink),
                    _rotation: None,
                })
            }
            Destination::Rotating(template) => {
                let runtime = Handle::try_current().map_err(|_| Error::NoRuntime {
                    file: config.file.clone(),
                })?;

                let sink = Arc::new(ActiveSink::new(Sink::Stderr, RotationState::Installing));
                let rotation = Rotation::new(
                    template,
                    effective.retention,
                    clock,
                    fallback,
                    Arc::clone(&sink),
                );
                let deadline = rotation.install();

                let token = cancel.child_token();
                runtime.spawn(Arc::new(rotation).run(deadline, token.clone()));

                Ok(Logger {
                    level: effective.level,
                    call_site: effective.call_site,
                    sink,
                    _rotation: Some(token.drop_guard()),
                })
            }
        }
    }

    /// Логгер без ротации поверх произвольного приёмника.
    pub fn to_writer<W: Write + Send + 'static>(level: Level, trace: i32, writer: W) -> Self {
        Logger::fixed(level, CallSite::from_trace(trace), Sink::Writer(Box::new(writer)))
    }

    pub(crate) fn fixed(level: Level, call_site: CallSite, sink: Sink) -> Self {
        Logger {
            level,
            call_site,
            sink: Arc::new(ActiveSink::new(sink, RotationState::Stopped)),
            _rotation: None,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn enabled(&self, severity: Level) -> bool {
        should_emit(self.level, severity)
    }

    /// Имя текущего файла периода (и при запасном stderr тоже).
    pub fn file_name(&self) -> Option<String> {
        self.sink.file_name()
    }

    pub fn sink_kind(&self) -> SinkKind {
        self.sink.kind()
    }

    /// Сколько раз ставился новый приёмник, включая первый.
    pub fn rotations(&self) -> u64 {
        self.sink.installs()
    }

    pub fn rotation_state(&self) -> RotationState {
        self.sink.state()
    }

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.output(Level::Debug, args);
    }

    #[track_caller]
    pub fn debug(&self, values: &[&dyn fmt::Display]) {
        self.output(Level::Debug, format_args!("{}", Spaced(values)));
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.output(Level::Info, args);
    }

    #[track_caller]
    pub fn info(&self, values: &[&dyn fmt::Display]) {
        self.output(Level::Info, format_args!("{}", Spaced(values)));
    }

    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.output(Level::Warn, args);
    }

    #[track_caller]
    pub fn warn(&self, values: &[&dyn fmt::Display]) {
        self.output(Level::Warn, format_args!("{}", Spaced(values)));
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) {
        self.output(Level::Fatal, args);
    }

    #[track_caller]
    pub fn fatal(&self, values: &[&dyn fmt::Display]) {
        self.output(Level::Fatal, format_args!("{}", Spaced(values)));
    }

    #[track_caller]
    fn output(&self, severity: Level, message: fmt::Arguments<'_>) {
        if !self.enabled(severity) {
            return;
        }
        let site = match self.call_site {
            CallSite::Off => None,
            CallSite::Frames(skip) => Some(callsite::resolve(Location::caller(), skip)),
        };
        let line = format_line(
            Local::now(),
            site.as_ref().map(|(file, line)| (file.as_ref(), *line)),
            severity,
            message,
        );
        self.sink.write_line(&line);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .field("call_site", &self.call_site)
            .field("sink", &self.sink.kind())
            .field("file_name", &self.sink.file_name())
            .finish()
    }
}

struct Spaced<'a>(&'a [&'a dyn fmt::Display]);

impl fmt::Display for Spaced<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}

fn format_line(
    now: DateTime<Local>,
    site: Option<(&str, u32)>,
    severity: Level,
    message: fmt::Arguments<'_>,
) -> String {
    let mut line = String::with_capacity(96);
    let _ = write!(line, "{} ", now.format("%Y/%m/%d %H:%M:%S"));
    if let Some((file, number)) = site {
        let _ = write!(line, "{}:{}: ", file, number);
    }
    let _ = write!(line, "{} {}", severity.as_str(), message);
    if !line.ends_with('\n') {
        line.push('\n');
    }
    line
}

// ===== Макросы =====

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)*) => {{
        let logger = &$logger;
        if logger.enabled($crate::Level::Debug) {
            logger.debugf(::std::format_args!($($arg)*));
        }
    }};
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)*) => {{
        let logger = &$logger;
        if logger.enabled($crate::Level::Info) {
            logger.infof(::std::format_args!($($arg)*));
        }
    }};
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)*) => {{
        let logger = &$logger;
        if logger.enabled($crate::Level::Warn) {
            logger.warnf(::std::format_args!($($arg)*));
        }
    }};
}

#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)*) => {{
        let logger = &$logger;
        if logger.enabled($crate::Level::Fatal) {
            logger.fatalf(::std::format_args!($($arg)*));
        }
    }};
}

// ===== Глобальные макросы =====

#[macro_export]
macro_rules! gdebug {
    ($($arg:tt)*) => {{
        $crate::debug!($crate::default_logger(), $($arg)*);
    }};
}

#[macro_export]
macro_rules! ginfo {
    ($($arg:tt)*) => {{
        $crate::info!($crate::default_logger(), $($arg)*);
    }};
}

#[macro_export]
macro_rules! gwarn {
    ($($arg:tt)*) => {{
        $crate::warn!($crate::default_logger(), $($arg)*);
    }};
}

#[macro_export]
macro_rules! gfatal {
    ($($arg:tt)*) => {{
        $crate::fatal!($crate::default_logger(), $($arg)*);
    }};
}
