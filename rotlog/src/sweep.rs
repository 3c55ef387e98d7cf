use crate::diag;
use crate::template::Template;
use chrono::{DateTime, TimeDelta, TimeZone};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ===== Срок хранения =====

/// Сколько дней держать файлы прошлых периодов.
/// В конфигурации это число дней, отрицательное значит «всегда».
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Retention {
    Days(u32),
    Forever,
}

impl Retention {
    pub fn window(self) -> Option<TimeDelta> {
        match self {
            Retention::Days(days) => Some(TimeDelta::days(i64::from(days))),
            Retention::Forever => None,
        }
    }
}

impl From<i64> for Retention {
    fn from(days: i64) -> Self {
        match u32::try_from(days) {
            Ok(days) => Retention::Days(days),
            Err(_) if days < 0 => Retention::Forever,
            Err(_) => Retention::Days(u32::MAX),
        }
    }
}

impl From<Retention> for i64 {
    fn from(retention: Retention) -> Self {
        match retention {
            Retention::Days(days) => i64::from(days),
            Retention::Forever => -1,
        }
    }
}

// ===== Чистка старых файлов =====

/// Удаляет файлы шаблона, чей период начался раньше, чем `now - window`.
/// Активный файл не трогает. Ошибки удаления сообщаются и пропускаются.
/// Возвращает удалённые пути.
pub fn sweep<Tz: TimeZone>(
    template: &Template,
    retention: Retention,
    now: &DateTime<Tz>,
    active: Option<&Path>,
) -> Vec<PathBuf> {
    let Some(window) = retention.window() else {
        return Vec::new();
    };

    let dir = template.directory();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            diag::warning(&format!(
                "Failed to scan {} for expired logs: {}",
                dir.display(),
                e
            ));
            return Vec::new();
        }
    };

    let tz = now.timezone();
    let active_name = active.and_then(Path::file_name);
    let mut deleted = Vec::new();

    for entry in entries.flatten() {
        let name = entry.file_name();
        if Some(name.as_os_str()) == active_name {
            continue;
        }
        let Some(start) = name.to_str().and_then(|n| template.parse_start(n, &tz)) else {
            continue;
        };
        if now.clone() - start <= window {
            continue;
        }

        let path = entry.path();
        match fs::remove_file(&path) {
            Ok(()) => deleted.push(path),
            Err(e) => diag::warning(&format!(
                "Failed to remove expired log {}: {}",
                path.display(),
                e
            )),
        }
    }

    deleted.sort();
    deleted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"line\n").unwrap();
    }

    fn template_in(dir: &Path) -> Template {
        Template::parse(&format!("{}/app.log-*-*-*", dir.display())).unwrap()
    }

    #[test]
    fn deletes_only_expired_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["app.log-2026-10-15", "app.log-2026-10-17", "app.log-2026-10-18", "app.log-2026-10-19"] {
            touch(dir.path(), name);
        }
        touch(dir.path(), "other.log-2026-01-01");
        touch(dir.path(), "app.log-2026-01-01.bak");

        let template = template_in(dir.path());
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();
        let deleted = sweep(&template, Retention::Days(1), &now, None);

        let names: Vec<_> = deleted
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_owned())
            .collect();
        assert_eq!(names, ["app.log-2026-10-15", "app.log-2026-10-17"]);
        assert!(dir.path().join("app.log-2026-10-18").exists());
        assert!(dir.path().join("other.log-2026-01-01").exists());
        assert!(dir.path().join("app.log-2026-01-01.bak").exists());
    }

    #[test]
    fn second_sweep_deletes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app.log-2026-09-01");
        touch(dir.path(), "app.log-2026-10-19");

        let template = template_in(dir.path());
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        assert_eq!(sweep(&template, Retention::Days(3), &now, None).len(), 1);
        assert!(sweep(&template, Retention::Days(3), &now, None).is_empty());
    }

    #[test]
    fn forever_keeps_everything() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app.log-1999-01-01");

        let template = template_in(dir.path());
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        assert!(sweep(&template, Retention::Forever, &now, None).is_empty());
        assert!(dir.path().join("app.log-1999-01-01").exists());
    }

    #[test]
    fn active_file_survives_zero_window() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app.log-2026-10-18");
        touch(dir.path(), "app.log-2026-10-19");

        let template = template_in(dir.path());
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let active = dir.path().join("app.log-2026-10-19");
        let deleted = sweep(&template, Retention::Days(0), &now, Some(&active));
        assert_eq!(deleted, [dir.path().join("app.log-2026-10-18")]);
        assert!(active.exists());
    }

    #[test]
    fn missing_directory_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let template = template_in(&dir.path().join("absent"));
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        assert!(sweep(&template, Retention::Days(1), &now, None).is_empty());
    }

    #[test]
    fn retention_from_days() {
        assert_eq!(Retention::from(-1), Retention::Forever);
        assert_eq!(Retention::from(7), Retention::Days(7));
        assert_eq!(i64::from(Retention::Forever), -1);
        assert_eq!(serde_json::to_string(&Retention::Days(3)).unwrap(), "3");
        assert_eq!(
            serde_json::from_str::<Retention>("-1").unwrap(),
            Retention::Forever
        );
    }
}
