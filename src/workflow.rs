use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::{
    archive::{Compression, Resource},
    decompress::gunzip,
    error::Error,
    fetch::Fetcher,
    header::{ObservationTimestamp, time_of_first_obs},
    settings::Settings,
};

/// Local availability of one of the files required for post processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// File confirmed present on disk
    Ready(PathBuf),

    /// User must retrieve or decompress this file
    Manual(String),
}

impl FileStatus {
    /// Confirms the presence of `path` on disk, otherwise
    /// falls back to the manual instruction.
    fn confirm(path: &Path, instruction: String) -> Self {
        if path.is_file() {
            Self::Ready(path.to_path_buf())
        } else {
            Self::Manual(instruction)
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Ready(path) => write!(f, "{}", path.display()),
            Self::Manual(instruction) => write!(f, "{}", instruction),
        }
    }
}

/// Files to be loaded by the post processing tool
#[derive(Debug, Clone)]
pub struct Summary {
    pub output_dir: PathBuf,
    pub rover: PathBuf,
    pub base: FileStatus,
    pub navigation: FileStatus,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "--- Download process finished. ---")?;
        writeln!(
            f,
            "Please check the '{}' directory for downloaded and decompressed files.",
            self.output_dir.display()
        )?;
        writeln!(f, "Required files for RTKPOST (typically):")?;
        writeln!(f, "  - Rover OBS: {}", self.rover.display())?;
        writeln!(f, "  - Base OBS:  {}", self.base)?;
        write!(f, "  - NAV file:  {}", self.navigation)
    }
}

/// [Workflow] retrieves the reference station observations and
/// the broadcast ephemeris matching the rover observation day.
pub struct Workflow<F: Fetcher> {
    settings: Settings,
    fetcher: F,
}

impl<F: Fetcher> Workflow<F> {
    pub fn new(settings: Settings, fetcher: F) -> Self {
        Self { settings, fetcher }
    }

    /// Runs the complete workflow. Only local setup and rover header
    /// errors are returned: download and decompression failures
    /// are reported in the [Summary].
    pub async fn run(&self) -> Result<Summary, Error> {
        let output_dir = &self.settings.output_dir;

        if !output_dir.exists() {
            std::fs::create_dir_all(output_dir).map_err(|e| Error::file_access(output_dir, e))?;
            info!("Created output directory: {}", output_dir.display());
        }

        let t = time_of_first_obs(&self.settings.rover)?;

        info!("Rover observation start: {}", t.to_epoch());
        info!(
            "Year: {}, Day of Year: {}, Station: {}",
            t.year(),
            t.doy_string(),
            self.settings.station.to_uppercase()
        );

        let base = self.observation(&t).await;
        let navigation = self.navigation(&t).await;

        Ok(Summary {
            output_dir: output_dir.to_path_buf(),
            rover: self.settings.rover.clone(),
            base,
            navigation,
        })
    }

    /// Downloads then decompresses a gzip [Resource].
    /// Returns false when the download itself failed.
    async fn retrieve(&self, resource: &Resource) -> bool {
        if let Err(e) = self
            .fetcher
            .fetch(&resource.url, &resource.compressed)
            .await
        {
            error!("{}", e);
            return false;
        }

        if let Err(e) = gunzip(&resource.compressed, &resource.decompressed) {
            error!("{}", e);
        }

        true
    }

    async fn observation(&self, t: &ObservationTimestamp) -> FileStatus {
        let resource = self.settings.archive.observation(
            t,
            &self.settings.station,
            self.settings.version,
            &self.settings.output_dir,
        );

        match resource.compression {
            Compression::Gzip => {
                if !self.retrieve(&resource).await {
                    error!(
                        "Failed to download OBS file. Please check URL or try another IGS source if CDDIS is down."
                    );
                }

                FileStatus::confirm(
                    &resource.decompressed,
                    "Download/Decompress OBS manually if failed".to_string(),
                )
            },
            Compression::UnixCompress => {
                warn!(
                    "RINEX 2.11 uses .Z compression, which is not handled here. Manual decompression of {} will be needed.",
                    resource.filename()
                );

                let instruction = match self
                    .fetcher
                    .fetch(&resource.url, &resource.compressed)
                    .await
                {
                    Ok(_) => {
                        warn!(
                            "Downloaded {}. Please decompress it manually (e.g., using 'uncompress' or 7-Zip).",
                            resource.compressed.display()
                        );
                        format!(
                            "Decompress {} manually (e.g., using 'uncompress' or 7-Zip)",
                            resource.compressed.display()
                        )
                    },
                    Err(e) => {
                        error!("{}", e);
                        error!(
                            "Failed to download OBS file. Please check URL or try another IGS source if CDDIS is down."
                        );
                        format!(
                            "Download and decompress {} manually ({})",
                            resource.filename(),
                            resource.url
                        )
                    },
                };

                FileStatus::confirm(&resource.decompressed, instruction)
            },
        }
    }

    async fn navigation(&self, t: &ObservationTimestamp) -> FileStatus {
        let agencies = &self.settings.archive.agencies;
        let candidates = self
            .settings
            .archive
            .navigation_candidates(t, &self.settings.output_dir);

        for (i, (agency, resource)) in agencies.iter().zip(candidates.iter()).enumerate() {
            if self.retrieve(resource).await {
                return FileStatus::confirm(
                    &resource.decompressed,
                    "Download/Decompress NAV manually if failed".to_string(),
                );
            }

            match agencies.get(i + 1) {
                Some(next) => warn!("Failed to download NAV file with {}. Trying {}...", agency, next),
                None => error!("Failed to download NAV file with {} as well.", agency),
            }
        }

        error!(
            "Please check MGEX directory for available BRDM files for {}/{} or try a different IGS source.",
            t.year(),
            t.doy_string()
        );

        FileStatus::Manual("Download/Decompress NAV manually if failed".to_string())
    }
}
