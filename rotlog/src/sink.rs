use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

// ===== Приёмники =====

/// Куда в данный момент уходят строки логгера.
pub enum Sink {
    Stdout,
    /// Запасной приёмник, когда файл периода открыть не удалось.
    Stderr,
    Discard,
    File(File),
    Writer(Box<dyn Write + Send>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Stdout,
    Stderr,
    Discard,
    File,
    Writer,
}

impl Sink {
    pub fn kind(&self) -> SinkKind {
        match self {
            Sink::Stdout => SinkKind::Stdout,
            Sink::Stderr => SinkKind::Stderr,
            Sink::Discard => SinkKind::Discard,
            Sink::File(_) => SinkKind::File,
            Sink::Writer(_) => SinkKind::Writer,
        }
    }

    /// Одна строка — одна запись `write_all`.
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        match self {
            Sink::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(line.as_bytes())?;
                out.flush()
            }
            Sink::Stderr => io::stderr().lock().write_all(line.as_bytes()),
            Sink::Discard => Ok(()),
            Sink::File(file) => file.write_all(line.as_bytes()),
            Sink::Writer(writer) => {
                writer.write_all(line.as_bytes())?;
                writer.flush()
            }
        }
    }
}

/// Что ставить вместо файла периода, если его не удалось открыть.
pub(crate) type Fallback = Box<dyn Fn() -> Sink + Send + Sync>;

/// Открывает файл периода на дозапись, создавая недостающие каталоги.
pub(crate) fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

// ===== Состояние ротации =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationState {
    Installing,
    Armed,
    Stopped,
}

impl RotationState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => RotationState::Installing,
            1 => RotationState::Armed,
            _ => RotationState::Stopped,
        }
    }
}

struct Installed {
    sink: Sink,
    file_name: Option<String>,
}

/// Активный приёмник логгера. Меняет его только задача ротации этого логгера.
pub(crate) struct ActiveSink {
    installed: Mutex<Installed>,
    installs: AtomicU64,
    state: AtomicU8,
}

impl ActiveSink {
    pub(crate) fn new(sink: Sink, state: RotationState) -> Self {
        ActiveSink {
            installed: Mutex::new(Installed {
                sink,
                file_name: None,
            }),
            installs: AtomicU64::new(0),
            state: AtomicU8::new(state as u8),
        }
    }

    /// Ошибки записи проглатываются: логирование не должно ронять вызывающего.
    pub(crate) fn write_line(&self, line: &str) {
        let mut installed = self.installed.lock();
        let _ = installed.sink.write_line(line);
    }

    /// Ставит новый приёмник. Старый закрывается уже после снятия блокировки.
    pub(crate) fn install(&self, sink: Sink, file_name: String) {
        let previous = {
            let mut installed = self.installed.lock();
            installed.file_name = Some(file_name);
            std::mem::replace(&mut installed.sink, sink)
        };
        self.installs.fetch_add(1, Ordering::SeqCst);
        drop(previous);
    }

    pub(crate) fn kind(&self) -> SinkKind {
        self.installed.lock().sink.kind()
    }

    pub(crate) fn file_name(&self) -> Option<String> {
        self.installed.lock().file_name.clone()
    }

    pub(crate) fn installs(&self) -> u64 {
        self.installs.load(Ordering::SeqCst)
    }

    pub(crate) fn state(&self) -> RotationState {
        RotationState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub(crate) fn set_state(&self, state: RotationState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }
}
