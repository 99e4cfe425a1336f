use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
    sync::LazyLock,
};

use hifitime::{
    efmt::Format,
    prelude::{Epoch, Formatter},
};
use log::debug;
use regex::Regex;

use crate::error::{Error, ParsingError};

/// Header label we're interested in
const TIME_OF_FIRST_OBS: &str = "TIME OF FIRST OBS";

/// year, month, day, hour, minute, seconds (with fraction)
static TIME_OF_FIRST_OBS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})\s+(\d{1,2})\s+(\d{1,2})\s+(\d{1,2})\s+(\d{1,2})\s+([\d\.]+)").unwrap()
});

/// [ObservationTimestamp] is the first observation time of the rover,
/// expressed in UTC. It can only be built from a valid Gregorian date.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ObservationTimestamp {
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    /// Sub second remainder, truncated to the microsecond
    microsecond: u32,
    epoch: Epoch,
}

impl ObservationTimestamp {
    /// Builds a new [ObservationTimestamp], making sure it is a valid
    /// Gregorian date and time of day.
    pub fn new(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        microsecond: u32,
    ) -> Result<Self, ParsingError> {
        let invalid = || ParsingError::InvalidDate {
            year,
            month,
            day,
            hour,
            minute,
            second,
        };

        if hour > 23 || microsecond >= 1_000_000 {
            return Err(invalid());
        }

        let epoch = Epoch::maybe_from_gregorian_utc(
            year,
            month,
            day,
            hour,
            minute,
            second,
            microsecond * 1_000,
        )
        .map_err(|_| invalid())?;

        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            microsecond,
            epoch,
        })
    }

    /// Parses a "TIME OF FIRST OBS" header line
    pub fn from_header_line(line: &str) -> Result<Self, ParsingError> {
        let bad_timestamp = || ParsingError::BadTimestamp(line.trim().to_string());

        let captures = TIME_OF_FIRST_OBS_RE
            .captures(line)
            .ok_or_else(bad_timestamp)?;

        let year = captures[1].parse::<i32>().map_err(|_| bad_timestamp())?;
        let month = captures[2].parse::<u8>().map_err(|_| bad_timestamp())?;
        let day = captures[3].parse::<u8>().map_err(|_| bad_timestamp())?;
        let hour = captures[4].parse::<u8>().map_err(|_| bad_timestamp())?;
        let minute = captures[5].parse::<u8>().map_err(|_| bad_timestamp())?;

        let (second, microsecond) = split_seconds(&captures[6]).ok_or_else(bad_timestamp)?;

        Self::new(year, month, day, hour, minute, second, microsecond)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    pub fn microsecond(&self) -> u32 {
        self.microsecond
    }

    fn format(&self, fmt: &str) -> String {
        let fmt = Format::from_str(fmt).unwrap();
        Formatter::new(self.epoch, fmt).to_string()
    }

    /// Returns the day of year (1..=366)
    pub fn day_of_year(&self) -> u16 {
        self.doy_string().parse::<u16>().unwrap_or_default()
    }

    /// Day of year, as used in archive paths ("%j")
    pub fn doy_string(&self) -> String {
        self.format("%j")
    }

    /// 4 digit year
    pub fn year_string(&self) -> String {
        format!("{:04}", self.year)
    }

    /// Year and day of year, as used in long file names ("%Y%j")
    pub fn year_doy_string(&self) -> String {
        self.format("%Y%j")
    }

    /// 2 digit year: last two characters of the 4 digit year
    pub fn yy_string(&self) -> String {
        let year = self.year_string();
        year[year.len() - 2..].to_string()
    }

    /// Converts to [Epoch] in UTC
    pub fn to_epoch(&self) -> Epoch {
        self.epoch
    }
}

impl std::fmt::Display for ObservationTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Splits "SS.FFFFFFF" into integer seconds and microseconds.
/// The fraction is truncated, never rounded.
fn split_seconds(content: &str) -> Option<(u8, u32)> {
    let (integer, fraction) = match content.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (content, ""),
    };

    let second = integer.parse::<u8>().ok()?;

    if !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let mut microsecond = 0;
    for (i, c) in fraction.chars().chain(std::iter::repeat('0')).take(6).enumerate() {
        let digit = c.to_digit(10)?;
        microsecond += digit * 10_u32.pow(5 - i as u32);
    }

    Some((second, microsecond))
}

/// Scans the rover observation file and returns its first observation time.
pub fn time_of_first_obs(path: &Path) -> Result<ObservationTimestamp, Error> {
    let fd = File::open(path).map_err(|e| Error::file_access(path, e))?;
    let reader = BufReader::new(fd);

    for line in reader.lines() {
        let line = line.map_err(|e| Error::file_access(path, e))?;

        if line.contains(TIME_OF_FIRST_OBS) {
            debug!("header: {}", line.trim_end());
            let timestamp = ObservationTimestamp::from_header_line(&line)?;
            return Ok(timestamp);
        }
    }

    Err(ParsingError::MissingMarker.into())
}

#[cfg(test)]
mod test {
    use super::{ObservationTimestamp, split_seconds, time_of_first_obs};
    use crate::error::{Error, ParsingError};

    use hifitime::prelude::Epoch;

    use std::{io::Write, path::Path, str::FromStr};

    const HEADER: &str = "     3.04           OBSERVATION DATA    M                   RINEX VERSION / TYPE
ubx2rinex           nav-solutions       20230115 083015 UTC PGM / RUN BY / DATE
ROVR                                                        MARKER NAME
  2023    01    15    08    30   15.0000000     GPS         TIME OF FIRST OBS
                                                            END OF HEADER
";

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut fd = tempfile::NamedTempFile::new().unwrap();
        fd.write_all(content.as_bytes()).unwrap();
        fd.flush().unwrap();
        fd
    }

    #[test]
    fn parse_header_line() {
        let t = ObservationTimestamp::from_header_line(
            "  2023    01    15    08    30   15.0000000     GPS         TIME OF FIRST OBS",
        )
        .unwrap();

        assert_eq!(t, ObservationTimestamp::new(2023, 1, 15, 8, 30, 15, 0).unwrap());
        assert_eq!(t.day_of_year(), 15);
        assert_eq!(t.doy_string(), "015");
        assert_eq!(t.yy_string(), "23");
        assert_eq!(t.year_string(), "2023");
        assert_eq!(t.to_string(), "2023-01-15 08:30:15 UTC");
    }

    #[test]
    fn fraction_is_truncated() {
        assert_eq!(split_seconds("15.0000000"), Some((15, 0)));
        assert_eq!(split_seconds("15.1234569"), Some((15, 123_456)));
        assert_eq!(split_seconds("59.9999999"), Some((59, 999_999)));
        assert_eq!(split_seconds("7.5"), Some((7, 500_000)));
        assert_eq!(split_seconds("7"), Some((7, 0)));
        assert_eq!(split_seconds("7.1.2"), None);
        assert_eq!(split_seconds("."), None);

        let t = ObservationTimestamp::from_header_line(
            "  2024     2    29    23    59   59.9999999     GPS         TIME OF FIRST OBS",
        )
        .unwrap();

        assert_eq!(t.second(), 59);
        assert_eq!(t.microsecond(), 999_999);
    }

    #[test]
    fn day_of_year() {
        for (year, month, day, expected) in [
            (2023, 1, 1, 1),
            (2023, 2, 28, 59),
            (2023, 3, 1, 60),
            (2023, 12, 31, 365),
            (2024, 2, 29, 60),
            (2024, 3, 1, 61),
            (2024, 12, 31, 366),
            (2000, 12, 31, 366),
            (1900, 12, 31, 365),
        ] {
            let t = ObservationTimestamp::new(year, month, day, 0, 0, 0, 0).unwrap();
            assert_eq!(t.day_of_year(), expected, "{}-{}-{}", year, month, day);
        }

        let t = ObservationTimestamp::new(2024, 2, 29, 0, 0, 0, 0).unwrap();
        assert_eq!(t.doy_string(), "060");
        assert_eq!(t.year_doy_string(), "2024060");

        let t = ObservationTimestamp::new(2023, 2, 28, 0, 0, 0, 0).unwrap();
        assert_eq!(t.doy_string(), "059");
        assert_eq!(t.year_doy_string(), "2023059");
    }

    #[test]
    fn accessors() {
        let t = ObservationTimestamp::new(2023, 1, 15, 8, 30, 15, 42).unwrap();
        assert_eq!(t.year(), 2023);
        assert_eq!(t.month(), 1);
        assert_eq!(t.day(), 15);
        assert_eq!(t.hour(), 8);
        assert_eq!(t.minute(), 30);
        assert_eq!(t.second(), 15);
        assert_eq!(t.microsecond(), 42);
    }

    #[test]
    fn invalid_dates() {
        assert!(ObservationTimestamp::new(2023, 2, 29, 0, 0, 0, 0).is_err());
        assert!(ObservationTimestamp::new(2023, 13, 1, 0, 0, 0, 0).is_err());
        assert!(ObservationTimestamp::new(2023, 4, 31, 0, 0, 0, 0).is_err());
        assert!(ObservationTimestamp::new(2023, 1, 1, 24, 0, 0, 0).is_err());
        assert!(ObservationTimestamp::new(2023, 1, 0, 0, 0, 0, 0).is_err());
        assert!(ObservationTimestamp::new(2023, 0, 1, 0, 0, 0, 0).is_err());
        assert!(ObservationTimestamp::new(2023, 1, 1, 0, 0, 0, 1_000_000).is_err());
        assert!(ObservationTimestamp::new(2024, 2, 29, 0, 0, 0, 0).is_ok());

        // 60 s only where a leap second was inserted
        assert!(ObservationTimestamp::new(2016, 12, 31, 23, 59, 60, 0).is_ok());
        assert!(ObservationTimestamp::new(2023, 1, 1, 0, 0, 60, 0).is_err());

        match ObservationTimestamp::from_header_line(
            "  2023     2    29    00    00    0.0000000     GPS         TIME OF FIRST OBS",
        ) {
            Err(ParsingError::InvalidDate { month: 2, day: 29, .. }) => {},
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn epoch_conversion() {
        let t = ObservationTimestamp::new(2023, 1, 15, 8, 30, 15, 250_000).unwrap();
        assert_eq!(
            t.to_epoch().to_gregorian_utc(),
            (2023, 1, 15, 8, 30, 15, 250_000_000)
        );

        let t0 = Epoch::from_str("2023-01-15T08:30:15 UTC").unwrap();
        let t = ObservationTimestamp::new(2023, 1, 15, 8, 30, 15, 0).unwrap();
        assert_eq!(t.to_epoch(), t0);
    }

    #[test]
    fn parse_rover_file() {
        let fd = write_temp(HEADER);
        let t = time_of_first_obs(fd.path()).unwrap();
        assert_eq!(t, ObservationTimestamp::new(2023, 1, 15, 8, 30, 15, 0).unwrap());
    }

    #[test]
    fn missing_marker() {
        let fd = write_temp("     3.04           OBSERVATION DATA    M                   RINEX VERSION / TYPE\n");

        match time_of_first_obs(fd.path()) {
            Err(Error::Parse(ParsingError::MissingMarker)) => {},
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn unparsable_marker_line() {
        let fd = write_temp("  2023    xx    15                                        TIME OF FIRST OBS\n");

        match time_of_first_obs(fd.path()) {
            Err(Error::Parse(ParsingError::BadTimestamp(_))) => {},
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn missing_file() {
        let path = Path::new("/this/rover/file/does/not/exist.23o");

        match time_of_first_obs(path) {
            Err(Error::FileAccess { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
