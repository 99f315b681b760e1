//! Free-text dates to epoch seconds, and epoch seconds back to text.
//!
//! The parser accepts the loose mix of forms people type at a terminal:
//! `Jan 15`, `10:30`, `2024-01-15`, `99/12/31`, `Mon Jan 15 10:30:00 2024`,
//! `2024-01-15T10:30:00Z` and so on. Each blank- or comma-separated token is
//! tried against a fixed list of forms; a token matching none of them fails
//! the whole parse. Fields never mentioned come from the current time.

use chrono::{
    DateTime, Datelike, Days, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime,
    TimeDelta, TimeZone, Timelike, Utc,
};
use tracing::trace;

use crate::error::ConvertError;

/// asctime layout: `Thu Jan  1 00:00:00 1970`.
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const LONG_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Years a two-digit or bare year may name.
const YEARS: std::ops::RangeInclusive<i32> = 1970..=2037;

/// Parses free-text dates in local time or UTC.
#[derive(Debug, Clone)]
pub struct DateParser {
    utc: bool,
    now: Option<NaiveDateTime>,
}

/// Calendar fields gathered while scanning tokens.
#[derive(Debug)]
struct Fields {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    have_date: bool,
    have_hour: bool,
    have_minute: bool,
    have_second: bool,
    offset: Option<FixedOffset>,
}

impl DateParser {
    pub fn new(utc: bool) -> Self {
        Self { utc, now: None }
    }

    /// Use a fixed wall-clock time, in the parser's zone, for missing fields.
    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    fn now(&self) -> NaiveDateTime {
        match self.now {
            Some(now) => now,
            None if self.utc => Utc::now().naive_utc(),
            None => Local::now().naive_local(),
        }
    }

    /// Parse `text` to seconds since 1970-01-01 00:00:00 UTC.
    pub fn parse(&self, text: &str) -> Result<i64, ConvertError> {
        let fail = || ConvertError::parse("date", text.as_bytes());

        let now = self.now();
        let mut fields = Fields {
            year: now.year(),
            month: now.month(),
            day: now.day(),
            hour: now.hour(),
            minute: now.minute(),
            second: now.second(),
            have_date: false,
            have_hour: false,
            have_minute: false,
            have_second: false,
            offset: None,
        };

        for token in text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            if !fields.apply(token) {
                trace!(token, "unrecognised date token");
                return Err(fail());
            }
        }

        if fields.have_date {
            if !fields.have_hour {
                fields.hour = 0;
            }
            if !fields.have_minute {
                fields.minute = 0;
            }
            if !fields.have_second {
                fields.second = 0;
            }
        } else if fields.have_minute && !fields.have_second {
            fields.second = 0;
        }

        let naive = fields.to_naive().ok_or_else(fail)?;
        let seconds = match fields.offset {
            Some(offset) => offset
                .from_local_datetime(&naive)
                .single()
                .map(|t| t.timestamp()),
            None if self.utc => Some(naive.and_utc().timestamp()),
            None => resolve_local(naive),
        };
        seconds.ok_or_else(fail)
    }
}

impl Fields {
    /// Try `token` against each accepted form in turn.
    fn apply(&mut self, token: &str) -> bool {
        if name_index(token, &WEEKDAYS).is_some() {
            return true;
        }
        if let Some(m) = name_index(token, &MONTHS).or_else(|| name_index(token, &LONG_MONTHS)) {
            self.month = m as u32 + 1;
            self.have_date = true;
            return true;
        }
        if let Some([y, mo, d, h, mi, s]) = iso_timestamp(token) {
            if YEARS.contains(&y) && valid_date(mo, d) && valid_time(h, mi, s) {
                self.set_date(y, mo, d);
                self.set_time(h, mi, Some(s));
                self.offset = FixedOffset::east_opt(0);
                return true;
            }
        }
        if let Some([h, mi, s]) = digit_groups(token, b':') {
            if token.len() == 8 && valid_time(h, mi, s) {
                self.set_time(h, mi, Some(s));
                return true;
            }
        }
        if let Some([h, mi]) = digit_groups(token, b':') {
            if token.len() == 5 && valid_time(h, mi, 0) {
                self.set_time(h, mi, None);
                return true;
            }
        }
        if let Ok(n) = token.parse::<i32>() {
            if (1..=31).contains(&n) {
                self.day = n as u32;
                self.have_date = true;
                return true;
            }
            if YEARS.contains(&n) {
                self.year = n;
                self.have_date = true;
                return true;
            }
        }
        if let Some([y, mo, d]) = int_groups(token, '-') {
            if YEARS.contains(&y) && valid_date(mo, d) {
                self.set_date(y, mo, d);
                return true;
            }
        }
        if let Some([y, mo, d]) = int_groups(token, '/') {
            if let Some(y) = window_year(y)
                && valid_date(mo, d)
            {
                self.set_date(y, mo, d);
                return true;
            }
        }
        if let Some([mo, d]) = int_groups(token, '/') {
            if valid_date(mo, d) {
                self.month = mo as u32;
                self.day = d as u32;
                self.have_date = true;
                return true;
            }
        }
        let offset = match token {
            "GMT" | "UTC" => FixedOffset::east_opt(0),
            "BST" => FixedOffset::east_opt(3600),
            _ => return false,
        };
        self.offset = offset;
        true
    }

    fn set_date(&mut self, year: i32, month: i32, day: i32) {
        self.year = year;
        self.month = month as u32;
        self.day = day as u32;
        self.have_date = true;
    }

    fn set_time(&mut self, hour: i32, minute: i32, second: Option<i32>) {
        self.hour = hour as u32;
        self.minute = minute as u32;
        self.have_hour = true;
        self.have_minute = true;
        if let Some(second) = second {
            self.second = second as u32;
            self.have_second = true;
        }
    }

    /// Days past the end of the month roll into the next one, as `mktime`
    /// normalises them.
    fn to_naive(&self) -> Option<NaiveDateTime> {
        let first = NaiveDate::from_ymd_opt(self.year, self.month, 1)?;
        let date = first.checked_add_days(Days::new(self.day as u64 - 1))?;
        date.and_hms_opt(self.hour, self.minute, self.second)
    }
}

/// Pick a wall-clock reading in the local zone, letting the zone's rules
/// decide between standard and daylight time.
fn resolve_local(naive: NaiveDateTime) -> Option<i64> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(t) => Some(t.timestamp()),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.timestamp()),
        // Skipped by a forward transition: read it as the hour after.
        LocalResult::None => Local
            .from_local_datetime(&(naive + TimeDelta::hours(1)))
            .earliest()
            .map(|t| t.timestamp()),
    }
}

fn name_index(token: &str, names: &[&str]) -> Option<usize> {
    names.iter().position(|name| name.eq_ignore_ascii_case(token))
}

fn valid_date(month: i32, day: i32) -> bool {
    (1..=12).contains(&month) && (1..=31).contains(&day)
}

/// Seconds stop at 59: leap seconds are refused.
fn valid_time(hour: i32, minute: i32, second: i32) -> bool {
    (0..24).contains(&hour) && (0..60).contains(&minute) && (0..60).contains(&second)
}

/// Four-digit years in range, `70..=99` as 19xx, `0..=37` as 20xx.
fn window_year(year: i32) -> Option<i32> {
    match year {
        y if YEARS.contains(&y) => Some(y),
        70..=99 => Some(year + 1900),
        0..=37 => Some(year + 2000),
        _ => None,
    }
}

/// `YYYY-MM-DDThh:mm:ssZ` or `YYYYMMDDThhmmssZ`.
fn iso_timestamp(token: &str) -> Option<[i32; 6]> {
    let b = token.as_bytes();
    let (pattern, spans): (&[u8], [(usize, usize); 6]) = match b.len() {
        20 => (
            b"dddd-dd-ddTdd:dd:ddZ",
            [(0, 4), (5, 7), (8, 10), (11, 13), (14, 16), (17, 19)],
        ),
        16 => (
            b"ddddddddTddddddZ",
            [(0, 4), (4, 6), (6, 8), (9, 11), (11, 13), (13, 15)],
        ),
        _ => return None,
    };
    let shaped = b.iter().zip(pattern).all(|(&c, &p)| match p {
        b'd' => c.is_ascii_digit(),
        _ => c == p,
    });
    if !shaped {
        return None;
    }
    let mut out = [0; 6];
    for (slot, (from, to)) in out.iter_mut().zip(spans) {
        *slot = token[from..to].parse().ok()?;
    }
    Some(out)
}

/// Exactly `N` runs of one or two digits separated by `sep`.
fn digit_groups<const N: usize>(token: &str, sep: u8) -> Option<[i32; N]> {
    let mut out = [0; N];
    let mut parts = token.split(sep as char);
    for slot in out.iter_mut() {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    parts.next().is_none().then_some(out)
}

/// Exactly `N` signed integers separated by `sep`.
fn int_groups<const N: usize>(token: &str, sep: char) -> Option<[i32; N]> {
    let mut out = [0; N];
    let mut parts = token.split(sep);
    for slot in out.iter_mut() {
        *slot = parts.next()?.parse().ok()?;
    }
    parts.next().is_none().then_some(out)
}

/// Render epoch seconds in the asctime layout, without a line end.
pub fn render_date(seconds: i64, utc: bool) -> Result<String, ConvertError> {
    let out_of_range = || ConvertError::Parse {
        what: "timestamp",
        text: seconds.to_string(),
    };
    if utc {
        let time = DateTime::from_timestamp(seconds, 0).ok_or_else(out_of_range)?;
        Ok(time.format(ASCTIME).to_string())
    } else {
        let time = Local
            .timestamp_opt(seconds, 0)
            .earliest()
            .ok_or_else(out_of_range)?;
        Ok(time.format(ASCTIME).to_string())
    }
}
