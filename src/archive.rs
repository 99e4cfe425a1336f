use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::header::ObservationTimestamp;

/// Daily observation archive
pub const DEFAULT_DAILY_ROOT: &str = "https://cddis.nasa.gov/archive/gnss/data/daily";

/// Multi-GNSS broadcast ephemeris archive
pub const DEFAULT_MGEX_ROOT: &str =
    "https://cddis.nasa.gov/archive/gnss/data/campaign/mgex/daily/rinex3";

/// Analysis agencies publishing merged broadcast ephemerides, by preference
pub const DEFAULT_AGENCIES: [&str; 2] = ["DLR", "GDE"];

/// Observation RINEX revision to retrieve
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum RinexVersion {
    /// RINEX 2.11, unix compressed (.Z)
    V2,
    /// RINEX 3 in compact (CRINEX) form, gzip compressed
    #[default]
    V3,
}

impl FromStr for RinexVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "2" => Ok(Self::V2),
            "3" => Ok(Self::V3),
            other => Err(format!("invalid RINEX version \"{}\": 2 or 3 expected", other)),
        }
    }
}

impl std::fmt::Display for RinexVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::V2 => write!(f, "2"),
            Self::V3 => write!(f, "3"),
        }
    }
}

/// Compression applied to a remote resource
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Compression {
    /// Handled by this tool
    Gzip,
    /// Legacy LZW (.Z), left to the user
    UnixCompress,
}

/// [Resource] describes one remote file and its local copies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Remote URL
    pub url: String,

    /// Local (compressed) download path
    pub compressed: PathBuf,

    /// Local path once decompressed
    pub decompressed: PathBuf,

    /// [Compression] of the remote file
    pub compression: Compression,
}

impl Resource {
    /// Remote file name
    pub fn filename(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or_default()
    }
}

/// [Archive] layout of the remote data centers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    /// Daily observation root
    pub daily_root: String,

    /// MGEX navigation root
    pub mgex_root: String,

    /// Agency codes, tried in order
    pub agencies: Vec<String>,
}

impl Default for Archive {
    fn default() -> Self {
        Self {
            daily_root: DEFAULT_DAILY_ROOT.to_string(),
            mgex_root: DEFAULT_MGEX_ROOT.to_string(),
            agencies: DEFAULT_AGENCIES.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl Archive {
    /// Short observation file name stem, for example "algo0150.23o"
    pub fn observation_stem(t: &ObservationTimestamp, station: &str, version: RinexVersion) -> String {
        let mut formatted = station.to_lowercase();

        formatted.push_str(&t.doy_string());
        formatted.push_str("0.");
        formatted.push_str(&t.yy_string());

        match version {
            RinexVersion::V2 => formatted.push('d'),
            RinexVersion::V3 => formatted.push('o'),
        }

        formatted
    }

    /// Merged broadcast ephemeris stem, for example "BRDM00DLR_S_20230150000_01D_MN"
    pub fn navigation_stem(t: &ObservationTimestamp, agency: &str) -> String {
        let mut formatted = format!("BRDM00{}_S_", agency);

        formatted.push_str(&t.year_doy_string());
        formatted.push_str("0000_01D_MN");

        formatted
    }

    /// Station observation [Resource]
    pub fn observation(
        &self,
        t: &ObservationTimestamp,
        station: &str,
        version: RinexVersion,
        output_dir: &Path,
    ) -> Resource {
        let stem = Self::observation_stem(t, station, version);
        let yy = t.yy_string();

        let (subdir, decompressed, filename, compression) = match version {
            RinexVersion::V3 => (
                format!("{}o", yy),
                format!("{}.crx", stem),
                format!("{}.crx.gz", stem),
                Compression::Gzip,
            ),
            RinexVersion::V2 => (
                format!("{}d", yy),
                stem.clone(),
                format!("{}.Z", stem),
                Compression::UnixCompress,
            ),
        };

        Resource {
            url: format!(
                "{}/{}/{}/{}/{}",
                self.daily_root.trim_end_matches('/'),
                t.year_string(),
                t.doy_string(),
                subdir,
                filename
            ),
            compressed: output_dir.join(&filename),
            decompressed: output_dir.join(decompressed),
            compression,
        }
    }

    /// Navigation [Resource] published by given agency
    pub fn navigation(&self, t: &ObservationTimestamp, agency: &str, output_dir: &Path) -> Resource {
        let stem = Self::navigation_stem(t, agency);
        let filename = format!("{}.rnx.gz", stem);

        Resource {
            url: format!(
                "{}/{}/{}/{}",
                self.mgex_root.trim_end_matches('/'),
                t.year_string(),
                t.doy_string(),
                filename
            ),
            compressed: output_dir.join(&filename),
            decompressed: output_dir.join(format!("{}.rnx", stem)),
            compression: Compression::Gzip,
        }
    }

    /// Navigation [Resource]s, in order of preference
    pub fn navigation_candidates(&self, t: &ObservationTimestamp, output_dir: &Path) -> Vec<Resource> {
        self.agencies
            .iter()
            .map(|agency| self.navigation(t, agency, output_dir))
            .collect()
    }
}
