use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::logger::{Config, Logger};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

// ===== Реестр именованных логгеров =====

/// Логгеры по именам. Неизвестное имя отдаёт логгер по умолчанию.
#[derive(Debug, Default)]
pub struct Registry {
    loggers: HashMap<String, Logger>,
}

impl Registry {
    /// Строит по логгеру на каждую запись. Ошибка в любой записи отменяет
    /// всю сборку; уже запущенные ротации останавливаются вместе с логгерами.
    pub fn new<I, S>(configs: I, cancel: &CancellationToken) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Config)>,
        S: Into<String>,
    {
        Self::with_clock(configs, cancel, SystemClock)
    }

    pub fn with_clock<I, S, C>(configs: I, cancel: &CancellationToken, clock: C) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Config)>,
        S: Into<String>,
        C: Clock + Clone,
    {
        let mut loggers = HashMap::new();
        for (name, config) in configs {
            let name = name.into();
            match Logger::with_clock(&config, cancel, clock.clone()) {
                Ok(logger) => {
                    loggers.insert(name, logger);
                }
                Err(e) => {
                    return Err(Error::Logger {
                        name,
                        source: Box::new(e),
                    })
                }
            }
        }
        Ok(Registry { loggers })
    }

    pub fn get(&self, name: &str) -> &Logger {
        self.loggers
            .get(name)
            .unwrap_or_else(|| crate::default_logger())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loggers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.loggers.keys().map(String::as_str)
    }
}
