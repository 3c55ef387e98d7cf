use thiserror::Error;

/// Результат операций построения логгеров.
pub type Result<T> = std::result::Result<T, Error>;

/// Ошибки конфигурации. Сбои ввода-вывода во время работы сюда не попадают:
/// они уходят в системный журнал, а запись продолжается.
#[derive(Debug, Error)]
pub enum Error {
    #[error("file template {template:?} has no `*` placeholders")]
    NoPlaceholders { template: String },

    #[error("file template {template:?} has {count} placeholders, at most 5 are supported")]
    TooManyPlaceholders { template: String, count: usize },

    #[error("file template {template:?} has no file name before the first placeholder")]
    EmptyStem { template: String },

    #[error("file template {template:?} has text after the last placeholder")]
    TrailingText { template: String },

    #[error("file template {template:?} has a path separator between placeholders")]
    SeparatorInSuffix { template: String },

    #[error("rotating log file {file:?} needs a running tokio runtime")]
    NoRuntime { file: String },

    #[error("logger {name:?}: {source}")]
    Logger {
        name: String,
        #[source]
        source: Box<Error>,
    },

    #[error("global registry is already initialized")]
    AlreadyInitialized,
}
