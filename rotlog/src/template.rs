use crate::error::{Error, Result};
use chrono::{
    DateTime, Datelike, LocalResult, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta,
    TimeZone, Timelike,
};
use std::fmt::Write;
use std::path::{self, Path};

// ===== Шаблон имени файла =====

pub const PLACEHOLDER: char = '*';

/// Самая мелкая подставляемая компонента времени. Определяется числом `*`
/// в шаблоне: один — год, два — месяц, три — день, четыре — час, пять — минута.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Granularity {
    Year,
    Month,
    Day,
    Hour,
    Minute,
}

impl Granularity {
    fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(Granularity::Year),
            2 => Some(Granularity::Month),
            3 => Some(Granularity::Day),
            4 => Some(Granularity::Hour),
            5 => Some(Granularity::Minute),
            _ => None,
        }
    }

    pub fn components(self) -> usize {
        self as usize + 1
    }

    fn truncate(self, at: NaiveDateTime) -> NaiveDateTime {
        let values = fields(&at);
        // компоненты из того же момента всегда валидны
        compose(&values[..self.components()]).unwrap_or(at)
    }

    fn advance(self, start: NaiveDateTime) -> NaiveDateTime {
        let next = match self {
            Granularity::Year => start.checked_add_months(Months::new(12)),
            Granularity::Month => start.checked_add_months(Months::new(1)),
            Granularity::Day => start.checked_add_signed(TimeDelta::days(1)),
            Granularity::Hour => start.checked_add_signed(TimeDelta::hours(1)),
            Granularity::Minute => start.checked_add_signed(TimeDelta::minutes(1)),
        };
        next.unwrap_or(NaiveDateTime::MAX)
    }
}

/// Один период ротации: `[start, deadline)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period<Tz: TimeZone> {
    pub file_name: String,
    pub start: DateTime<Tz>,
    pub deadline: DateTime<Tz>,
}

/// Разобранный шаблон вида `logs/app.log-*-*-*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    raw: String,
    prefix: String,
    stem_at: usize,
    separators: Vec<String>,
    granularity: Granularity,
}

impl Template {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut pieces = raw.split(PLACEHOLDER);
        let prefix = pieces.next().unwrap_or_default();
        let rest: Vec<&str> = pieces.collect();

        let count = rest.len();
        let granularity = match Granularity::from_count(count) {
            Some(g) => g,
            None if count == 0 => {
                return Err(Error::NoPlaceholders {
                    template: raw.to_owned(),
                })
            }
            None => {
                return Err(Error::TooManyPlaceholders {
                    template: raw.to_owned(),
                    count,
                })
            }
        };

        if !rest[count - 1].is_empty() {
            return Err(Error::TrailingText {
                template: raw.to_owned(),
            });
        }

        let separators: Vec<String> = rest[..count - 1].iter().map(|s| (*s).to_owned()).collect();
        if separators.iter().any(|s| s.contains(path::is_separator)) {
            return Err(Error::SeparatorInSuffix {
                template: raw.to_owned(),
            });
        }

        let stem_at = prefix
            .rfind(path::is_separator)
            .map(|i| i + 1)
            .unwrap_or(0);
        if prefix[stem_at..].is_empty() {
            return Err(Error::EmptyStem {
                template: raw.to_owned(),
            });
        }

        Ok(Template {
            raw: raw.to_owned(),
            prefix: prefix.to_owned(),
            stem_at,
            separators,
            granularity,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Каталог, в котором лежат файлы этого шаблона.
    pub fn directory(&self) -> &Path {
        match &self.prefix[..self.stem_at] {
            "" => Path::new("."),
            dir => Path::new(dir),
        }
    }

    /// Начало имени файла без каталога.
    pub fn stem(&self) -> &str {
        &self.prefix[self.stem_at..]
    }

    /// Имя файла и срок смены для периода, в который попадает `at`.
    /// Компоненты берутся в часовом поясе `at`.
    pub fn period_at<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> Period<Tz> {
        let tz = at.timezone();
        let start_local = self.granularity.truncate(at.naive_local());

        let mut next_local = self.granularity.advance(start_local);
        let mut deadline = resolve_local(&tz, next_local);
        while deadline <= *at && next_local < NaiveDateTime::MAX {
            next_local = self.granularity.advance(next_local);
            deadline = resolve_local(&tz, next_local);
        }

        Period {
            file_name: self.render(&start_local),
            start: resolve_local(&tz, start_local),
            deadline,
        }
    }

    /// Обратная операция: достаёт начало периода из имени файла (без каталога).
    /// Чужие имена дают `None`.
    pub fn parse_start<Tz: TimeZone>(&self, file_name: &str, tz: &Tz) -> Option<DateTime<Tz>> {
        let mut rest = file_name.strip_prefix(self.stem())?;
        let mut values = Vec::with_capacity(self.granularity.components());

        for i in 0..self.granularity.components() {
            if i > 0 {
                rest = rest.strip_prefix(self.separators[i - 1].as_str())?;
            }
            let width = width_of(i);
            let digits = rest.get(..width)?;
            if !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            values.push(digits.parse::<u32>().ok()?);
            rest = &rest[width..];
        }

        if !rest.is_empty() {
            return None;
        }

        compose(&values).map(|naive| resolve_local(tz, naive))
    }

    fn render(&self, start: &NaiveDateTime) -> String {
        let values = fields(start);
        let mut name = self.prefix.clone();
        for (i, value) in values[..self.granularity.components()].iter().enumerate() {
            if i > 0 {
                name.push_str(&self.separators[i - 1]);
            }
            let _ = write!(name, "{:0width$}", value, width = width_of(i));
        }
        name
    }
}

fn width_of(component: usize) -> usize {
    if component == 0 {
        4
    } else {
        2
    }
}

fn fields(at: &NaiveDateTime) -> [u32; 5] {
    [
        u32::try_from(at.year()).unwrap_or(0),
        at.month(),
        at.day(),
        at.hour(),
        at.minute(),
    ]
}

fn compose(values: &[u32]) -> Option<NaiveDateTime> {
    let get = |i: usize, default: u32| values.get(i).copied().unwrap_or(default);
    let year = i32::try_from(get(0, 1970)).ok()?;
    let date = NaiveDate::from_ymd_opt(year, get(1, 1), get(2, 1))?;
    let time = NaiveTime::from_hms_opt(get(3, 0), get(4, 0), 0)?;
    Some(date.and_time(time))
}

/// Местное время в момент. Неоднозначное (перевод часов назад) даёт более
/// ранний момент, несуществующее (перевод вперёд) — первую существующую минуту.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    let mut candidate = naive;
    for _ in 0..=24 * 60 {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(t) => return t,
            LocalResult::Ambiguous(earliest, _) => return earliest,
            LocalResult::None => {}
        }
        candidate = match candidate.checked_add_signed(TimeDelta::minutes(1)) {
            Some(p) => p,
            None => break,
        };
    }
    tz.from_utc_datetime(&naive)
}
