use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ===== Уровни логгирования =====

/// Порог фильтрации и важность записи.
///
/// `All` и `Off` используются только как пороги: `All` ниже любой важности,
/// `Off` выше любой, поэтому отсекает всё, включая `Fatal`.
///
/// В конфигурации задаётся именем (`"info"`) или числом (`2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "LevelRepr")]
#[repr(u8)]
pub enum Level {
    All = 0x0,
    Debug = 0x1,
    Info = 0x2,
    Warn = 0x4,
    Fatal = 0x8,
    Off = 0xf,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::All => "ALL",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Fatal => "FATAL",
            Level::Off => "OFF",
        }
    }

    pub fn ordinal(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for Level {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x0 => Ok(Level::All),
            0x1 => Ok(Level::Debug),
            0x2 => Ok(Level::Info),
            0x4 => Ok(Level::Warn),
            0x8 => Ok(Level::Fatal),
            0xf => Ok(Level::Off),
            other => Err(other),
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "all" => Ok(Level::All),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" => Ok(Level::Warn),
            "fatal" => Ok(Level::Fatal),
            "off" => Ok(Level::Off),
            _ => Err(format!("unknown level `{}`", name)),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LevelRepr {
    Ordinal(u8),
    Name(String),
}

impl TryFrom<LevelRepr> for Level {
    type Error = String;

    fn try_from(repr: LevelRepr) -> Result<Self, Self::Error> {
        match repr {
            LevelRepr::Ordinal(n) => {
                Level::try_from(n).map_err(|n| format!("unknown level ordinal {:#x}", n))
            }
            LevelRepr::Name(name) => name.parse(),
        }
    }
}

/// Пропускает запись, если её важность не ниже порога.
pub fn should_emit(threshold: Level, severity: Level) -> bool {
    severity.ordinal() >= threshold.ordinal()
}
