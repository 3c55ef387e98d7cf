use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::panic::Location;
use std::path::Path;

// ===== Место вызова =====

/// Выводить ли место вызова и на сколько кадров выше вызывающего подниматься.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallSite {
    Off,
    Frames(usize),
}

impl CallSite {
    pub(crate) fn from_trace(trace: i32) -> Self {
        usize::try_from(trace)
            .map(CallSite::Frames)
            .unwrap_or(CallSite::Off)
    }
}

/// Файл (только имя) и строка, которые попадут в лог.
///
/// `caller` приходит из `#[track_caller]` и сам по себе даёт глубину 0.
/// Для `skip > 0` снимаем стек, находим в нём кадр `caller` и берём кадр
/// на `skip` выше. Без отладочной информации остаётся `caller`.
pub(crate) fn resolve(caller: &'static Location<'static>, skip: usize) -> (Cow<'static, str>, u32) {
    if skip > 0 {
        let trace = format!("{:#}", Backtrace::force_capture());
        if let Some((file, line)) = outer_frame(&trace, caller.file(), caller.line(), skip) {
            return (Cow::Owned(short_name(file).to_owned()), line);
        }
    }
    (Cow::Borrowed(short_name(caller.file())), caller.line())
}

fn short_name(file: &str) -> &str {
    Path::new(file)
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or(file)
}

fn outer_frame<'t>(trace: &'t str, file: &str, line: u32, skip: usize) -> Option<(&'t str, u32)> {
    let frames = frames(trace);
    let anchor = frames
        .iter()
        .position(|f| matches!(f, Some((path, l)) if *l == line && same_file(path, file)))?;
    frames.get(anchor + skip).copied().flatten()
}

/// Кадры в порядке от внутреннего к внешнему; у кадра без `at` места нет.
fn frames(trace: &str) -> Vec<Option<(&str, u32)>> {
    let mut frames: Vec<Option<(&str, u32)>> = Vec::new();
    for line in trace.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match line.strip_prefix("at ") {
            Some(at) => {
                if let Some(last) = frames.last_mut() {
                    if last.is_none() {
                        *last = parse_at(at);
                    }
                }
            }
            None => frames.push(None),
        }
    }
    frames
}

// `path:line:col` или `path:line`
fn parse_at(at: &str) -> Option<(&str, u32)> {
    let (rest, last) = at.rsplit_once(':')?;
    let last: u32 = last.parse().ok()?;
    match rest.rsplit_once(':') {
        Some((path, line)) => match line.parse() {
            Ok(line) => Some((path, line)),
            Err(_) => Some((rest, last)),
        },
        None => Some((rest, last)),
    }
}

fn same_file(path: &str, file: &str) -> bool {
    let path = path.replace('\\', "/");
    let path = path.trim_start_matches("./");
    let file = file.replace('\\', "/");
    let file = file.trim_start_matches("./");
    path == file || path.ends_with(&format!("/{}", file))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACE: &str = "\
   0: std::backtrace::Backtrace::force_capture
             at /rustc/abc/library/std/src/backtrace.rs:312:13
   1: rotlog::callsite::resolve
             at /work/rotlog/src/callsite.rs:31:34
   2: rotlog::logger::Logger::infof
             at /work/rotlog/src/logger.rs:180:9
   3: app::relay
             at /work/app/src/main.rs:13:5
   4: app::main
             at /work/app/src/main.rs:23:5
   5: core::ops::function::FnOnce::call_once
   6: main
";

    #[test]
    fn trace_levels() {
        assert_eq!(CallSite::from_trace(-1), CallSite::Off);
        assert_eq!(CallSite::from_trace(0), CallSite::Frames(0));
        assert_eq!(CallSite::from_trace(2), CallSite::Frames(2));
    }

    #[test]
    fn finds_frames_above_the_caller() {
        assert_eq!(
            outer_frame(TRACE, "app/src/main.rs", 13, 1),
            Some(("/work/app/src/main.rs", 23))
        );
        assert_eq!(outer_frame(TRACE, "app/src/main.rs", 13, 2), None);
        assert_eq!(outer_frame(TRACE, "app/src/main.rs", 99, 1), None);
    }

    #[test]
    fn parses_locations() {
        assert_eq!(parse_at("/a/b.rs:12:5"), Some(("/a/b.rs", 12)));
        assert_eq!(parse_at("/a/b.rs:12"), Some(("/a/b.rs", 12)));
        assert_eq!(parse_at(r"C:\a\b.rs:7:1"), Some((r"C:\a\b.rs", 7)));
        assert_eq!(parse_at("nowhere"), None);
    }

    #[test]
    fn matches_relative_and_absolute_paths() {
        assert!(same_file("/work/rotlog/src/logger.rs", "rotlog/src/logger.rs"));
        assert!(same_file(r"C:\work\src\lib.rs", r"src\lib.rs"));
        assert!(!same_file("/work/rotlog/src/xlogger.rs", "logger.rs"));
    }

    #[test]
    fn depth_zero_is_the_caller() {
        let here = Location::caller();
        let (file, line) = resolve(here, 0);
        assert_eq!(file, "callsite.rs");
        assert_eq!(line, here.line());
    }
}
