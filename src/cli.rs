use clap::{Arg, ArgAction, ArgMatches, ColorChoice, Command};
use hifitime::prelude::Duration;

use crate::{
    archive::{Archive, DEFAULT_AGENCIES, DEFAULT_DAILY_ROOT, DEFAULT_MGEX_ROOT, RinexVersion},
    settings::{DEFAULT_TIMEOUT_SECONDS, Settings},
};

use std::{path::PathBuf, str::FromStr};

pub struct Cli {
    /// Arguments passed by user
    matches: ArgMatches,
}

/// Station identifiers are 4 alphanumeric characters, lowercased.
fn parse_station(s: &str) -> Result<String, String> {
    let s = s.trim();
    if s.len() == 4 && s.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(s.to_lowercase())
    } else {
        Err(format!("\"{}\" is not a 4 character station ID (e.g. ALGO)", s))
    }
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    s.trim()
        .parse::<Duration>()
        .map_err(|e| format!("invalid duration: {}", e))
}

fn command() -> Command {
    Command::new("igs-fetch")
        .author("Guillaume W. Bres, <guillaume.bressaix@gmail.com>")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Download IGS base station and broadcast ephemeris data for PPK")
        .color(ColorChoice::Always)
        .arg_required_else_help(true)
        .next_help_heading("Rover")
        .arg(
            Arg::new("rover")
                .short('r')
                .long("rover")
                .value_name("FILENAME")
                .required(true)
                .help("Rover observation RINEX. Its \"TIME OF FIRST OBS\" defines the day to retrieve."),
        )
        .next_help_heading("Reference station")
        .arg(
            Arg::new("station")
                .short('s')
                .long("station")
                .value_name("ID")
                .required(true)
                .value_parser(parse_station)
                .help("4 character IGS station ID, for example ALGO or DHAK"),
        )
        .arg(
            Arg::new("rinex-version")
                .short('v')
                .long("rinex-version")
                .value_name("2|3")
                .value_parser(["2", "3"])
                .default_value("3")
                .help("Observation RINEX revision. 3: Compact RINEX 3 (gzip, decompressed automatically).
2: RINEX 2.11 (.Z, must be decompressed manually)."),
        )
        .next_help_heading("Output")
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIRECTORY")
                .required(true)
                .help("Directory where downloaded files are stored. Created when it does not exist."),
        )
        .next_help_heading("Archives")
        .arg(
            Arg::new("archive")
                .long("archive")
                .value_name("URL")
                .action(ArgAction::Set)
                .help(format!("Daily observation archive root. Default: {}", DEFAULT_DAILY_ROOT)),
        )
        .arg(
            Arg::new("mgex")
                .long("mgex")
                .value_name("URL")
                .action(ArgAction::Set)
                .help(format!("MGEX navigation archive root. Default: {}", DEFAULT_MGEX_ROOT)),
        )
        .arg(
            Arg::new("agency")
                .long("agency")
                .value_name("CODE")
                .action(ArgAction::Append)
                .help(format!(
                    "Broadcast ephemeris analysis agency. Use as many as needed, they are tried in order.
Default: {}",
                    DEFAULT_AGENCIES.join(", ")
                )),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("DURATION")
                .value_parser(parse_duration)
                .help("Timeout of each request. Default value is 60 s."),
        )
}

impl Cli {
    /// Build new command line interface
    pub fn new() -> Self {
        Self {
            matches: command().get_matches(),
        }
    }

    /// Rover observation file
    pub fn rover(&self) -> PathBuf {
        self.matches
            .get_one::<String>("rover")
            .map(PathBuf::from)
            .unwrap_or_default()
    }

    /// Lowercase station ID
    pub fn station(&self) -> String {
        self.matches
            .get_one::<String>("station")
            .cloned()
            .unwrap_or_default()
    }

    pub fn output_dir(&self) -> PathBuf {
        self.matches
            .get_one::<String>("output")
            .map(PathBuf::from)
            .unwrap_or_default()
    }

    fn version(&self) -> RinexVersion {
        self.matches
            .get_one::<String>("rinex-version")
            .and_then(|v| RinexVersion::from_str(v).ok())
            .unwrap_or_default()
    }

    fn archive(&self) -> Archive {
        let mut archive = Archive::default();

        if let Some(root) = self.matches.get_one::<String>("archive") {
            archive.daily_root = root.to_string();
        }

        if let Some(root) = self.matches.get_one::<String>("mgex") {
            archive.mgex_root = root.to_string();
        }

        if let Some(agencies) = self.matches.get_many::<String>("agency") {
            archive.agencies = agencies.map(|a| a.trim().to_uppercase()).collect();
        }

        archive
    }

    fn timeout(&self) -> Duration {
        self.matches
            .get_one::<Duration>("timeout")
            .copied()
            .unwrap_or(Duration::from_seconds(DEFAULT_TIMEOUT_SECONDS))
    }

    pub fn settings(&self) -> Settings {
        Settings {
            rover: self.rover(),
            station: self.station(),
            output_dir: self.output_dir(),
            version: self.version(),
            archive: self.archive(),
            timeout: self.timeout(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Cli, command, parse_station};
    use crate::archive::{Archive, RinexVersion};

    use hifitime::prelude::Duration;

    fn cli(args: &[&str]) -> Result<Cli, clap::Error> {
        let matches = command().try_get_matches_from(args)?;
        Ok(Cli { matches })
    }

    #[test]
    fn station_id() {
        assert_eq!(parse_station("ALGO"), Ok("algo".to_string()));
        assert_eq!(parse_station(" dhak "), Ok("dhak".to_string()));
        assert!(parse_station("ALG").is_err());
        assert!(parse_station("ALGO0").is_err());
        assert!(parse_station("AL/O").is_err());
    }

    #[test]
    fn default_settings() {
        let cli = cli(&["igs-fetch", "-r", "rover.23o", "-s", "ALGO", "-o", "out"]).unwrap();
        let settings = cli.settings();

        assert_eq!(settings.rover.to_str(), Some("rover.23o"));
        assert_eq!(settings.station, "algo");
        assert_eq!(settings.output_dir.to_str(), Some("out"));
        assert_eq!(settings.version, RinexVersion::V3);
        assert_eq!(settings.archive, Archive::default());
        assert_eq!(settings.timeout, Duration::from_seconds(60.0));
    }

    #[test]
    fn custom_settings() {
        let cli = cli(&[
            "igs-fetch",
            "--rover",
            "rover.23o",
            "--station",
            "dhak",
            "--output",
            "out",
            "--rinex-version",
            "2",
            "--mgex",
            "http://localhost/mgex",
            "--agency",
            "wrd",
            "--agency",
            "IGS",
        ])
        .unwrap();

        let settings = cli.settings();

        assert_eq!(settings.version, RinexVersion::V2);
        assert_eq!(settings.archive.mgex_root, "http://localhost/mgex");
        assert_eq!(settings.archive.daily_root, Archive::default().daily_root);
        assert_eq!(settings.archive.agencies, vec!["WRD", "IGS"]);
    }

    #[test]
    fn invalid_arguments() {
        // version 4 is not supported
        assert!(cli(&["igs-fetch", "-r", "rover.23o", "-s", "ALGO", "-o", "out", "-v", "4"]).is_err());

        // missing station
        assert!(cli(&["igs-fetch", "-r", "rover.23o", "-o", "out"]).is_err());

        // invalid station
        assert!(cli(&["igs-fetch", "-r", "rover.23o", "-s", "ALGORITHM", "-o", "out"]).is_err());
    }
}
