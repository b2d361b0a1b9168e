use core::fmt;
use std::time::SystemTime;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike};

use crate::error::ArchiveError;

/// A calendar date and time, without time zone, as written in the archive headers.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct DateTimeCS {
    year: i32,
    month: u16,
    day: u16,
    hour: u16,
    minute: u16,
    second: u16,
}

impl Default for DateTimeCS {
    /// 1980, January 1th, 12AM.
    fn default() -> Self {
        Self {
            year: 1980,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }
}

impl DateTimeCS {
    /// Build a date and time from its parts. Returns `None` if the parts do not form a valid date.
    pub fn new(
        year: i32,
        month: u16,
        day: u16,
        hour: u16,
        minute: u16,
        second: u16,
    ) -> Option<Self> {
        let date = NaiveDate::from_ymd_opt(year, month as u32, day as u32)?;
        let date_time = date.and_hms_opt(hour as u32, minute as u32, second as u32)?;
        Some(Self::from_naive(date_time))
    }

    /// Take the fields of `datetime` as seen in its own time zone.
    pub fn from_chrono_datetime<Tz: TimeZone>(datetime: DateTime<Tz>) -> Self {
        Self::from_naive(datetime.naive_local())
    }

    /// Take the fields of a date and time already expressed in local time.
    pub fn from_naive(datetime: NaiveDateTime) -> Self {
        Self {
            year: datetime.year(),
            month: datetime.month() as u16,
            day: datetime.day() as u16,
            hour: datetime.hour() as u16,
            minute: datetime.minute() as u16,
            second: datetime.second() as u16,
        }
    }

    /// Convert a point in time to the local time zone.
    pub fn from_system_time(time: SystemTime) -> Self {
        Self::from_chrono_datetime(DateTime::<Local>::from(time))
    }

    pub fn now() -> Self {
        Self::from_chrono_datetime(Local::now())
    }

    pub fn from_msdos(datepart: u16, timepart: u16) -> Self {
        let seconds = (timepart & 0b0000000000011111) << 1;
        let minutes = (timepart & 0b0000011111100000) >> 5;
        let hours = (timepart & 0b1111100000000000) >> 11;
        let days = datepart & 0b0000000000011111;
        let months = (datepart & 0b0000000111100000) >> 5;
        let years = (datepart & 0b1111111000000000) >> 9;

        Self {
            year: years as i32 + 1980,
            month: months,
            day: days,
            hour: hours,
            minute: minutes,
            second: seconds,
        }
    }

    pub fn to_time(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month as u32, self.day as u32)?.and_hms_opt(
            self.hour as u32,
            self.minute as u32,
            self.second as u32,
        )
    }

    /// The MS-DOS `(date, time)` pair, or `None` when the year is outside 1980..=2107.
    ///
    /// Seconds are truncated to an even value.
    pub fn ms_dos(&self) -> Option<(u16, u16)> {
        if !(1980..=2107).contains(&self.year) {
            return None;
        }
        let year = (self.year - 1980) as u16;
        let date = self.day | (self.month << 5) | year << 9;
        let time = (self.second / 2) | (self.minute << 5) | self.hour << 11;
        Some((date, time))
    }
}

impl fmt::Display for DateTimeCS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_time() {
            Some(date_time) => write!(f, "{:}", date_time),
            None => write!(
                f,
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02} (invalid)",
                self.year, self.month, self.day, self.hour, self.minute, self.second
            ),
        }
    }
}

/// The (timezone-less) date and time that will be written in the archive alongside the file.
///
/// Use `FileDateTime::Zero` if the date and time are insignificant. This will set the value
/// to 0 which is 1980, January 1th, 12AM.
/// Use `FileDateTime::Custom` if you need to set a custom date and time.
/// Use `FileDateTime::Now` if you want to use the current local date and time.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum FileDateTime {
    /// 1980, January 1th, 12AM.
    #[default]
    Zero,
    Custom(DateTimeCS),
    Now,
}

impl FileDateTime {
    fn tuple(&self) -> DateTimeCS {
        match self {
            FileDateTime::Zero => DateTimeCS::default(),
            FileDateTime::Custom(date_time) => *date_time,
            FileDateTime::Now => DateTimeCS::now(),
        }
    }

    pub fn ms_dos(&self) -> Option<(u16, u16)> {
        self.tuple().ms_dos()
    }
}

impl From<SystemTime> for FileDateTime {
    fn from(time: SystemTime) -> Self {
        FileDateTime::Custom(DateTimeCS::from_system_time(time))
    }
}

impl From<NaiveDateTime> for FileDateTime {
    fn from(time: NaiveDateTime) -> Self {
        FileDateTime::Custom(DateTimeCS::from_naive(time))
    }
}

/// An entry name, as stored in the headers.
///
/// Names coming from a `&str` are UTF-8 and flagged as such (general purpose bit 11).
/// Raw byte names keep the encoding chosen by the caller.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntryName {
    bytes: Vec<u8>,
    utf8: bool,
}

impl EntryName {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, utf8: bool) -> Self {
        Self {
            bytes: bytes.into(),
            utf8,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_utf8(&self) -> bool {
        self.utf8
    }

    /// Lossy, printable form of the name, for messages.
    pub fn display(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub(crate) fn is_directory(&self) -> bool {
        self.bytes.last() == Some(&b'/')
    }

    //ensure that the name end with a slash ('/')
    pub(crate) fn into_directory(mut self) -> Self {
        if !self.is_directory() {
            self.bytes.push(b'/');
        }
        self
    }

    pub(crate) fn check(&self, index: usize) -> Result<(), ArchiveError> {
        if self.is_empty() {
            return Err(ArchiveError::InvalidName {
                index,
                reason: "the name is empty".to_owned(),
            });
        }
        if self.len() > u16::MAX as usize {
            return Err(ArchiveError::InvalidName {
                index,
                reason: format!(
                    "the name is {} bytes long, the limit is {}",
                    self.len(),
                    u16::MAX
                ),
            });
        }
        Ok(())
    }
}

impl From<&str> for EntryName {
    fn from(name: &str) -> Self {
        Self::from_bytes(name.as_bytes(), true)
    }
}

impl From<String> for EntryName {
    fn from(name: String) -> Self {
        Self::from_bytes(name.into_bytes(), true)
    }
}
