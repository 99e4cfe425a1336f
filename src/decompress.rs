use std::{
    fs::File,
    io::{BufReader, BufWriter, ErrorKind, Write},
    path::Path,
};

use flate2::read::MultiGzDecoder;
use log::{debug, info, warn};

use crate::error::Error;

/// Inflates the gzip archive into `output`, then removes the archive.
/// On failure, the archive is preserved and the partial output is discarded.
pub fn gunzip(compressed: &Path, output: &Path) -> Result<(), Error> {
    info!("Decompressing: {}", compressed.display());

    let fd = File::open(compressed).map_err(|e| Error::file_access(compressed, e))?;

    if let Err(e) = inflate(fd, output) {
        if output.exists() {
            if let Err(e) = std::fs::remove_file(output) {
                warn!("failed to discard \"{}\": {}", output.display(), e);
            }
        }

        return Err(match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => Error::file_access(output, e),
            _ => Error::Decompression {
                path: compressed.to_path_buf(),
                source: e,
            },
        });
    }

    info!("Successfully decompressed to: {}", output.display());

    std::fs::remove_file(compressed).map_err(|e| Error::file_access(compressed, e))?;
    debug!("Removed compressed file: {}", compressed.display());

    Ok(())
}

fn inflate(fd: File, output: &Path) -> std::io::Result<u64> {
    let mut decoder = MultiGzDecoder::new(BufReader::new(fd));
    let mut writer = BufWriter::new(File::create(output)?);

    let size = std::io::copy(&mut decoder, &mut writer)?;
    writer.flush()?;

    Ok(size)
}
