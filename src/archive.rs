//! Zip helpers for bundling files before upload and after download.

use crate::config::ZIP_COMPRESSION_LEVEL;
use crate::error::Result;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Write `sources` into a deflate archive at `destination`.
///
/// Each file is stored under its base name. With `delete_sources` the source
/// files are removed once the archive has been written.
pub fn pack<P: AsRef<Path>>(
    destination: impl AsRef<Path>,
    sources: &[P],
    delete_sources: bool,
) -> Result<()> {
    let destination = destination.as_ref();
    info!("Zipping {} file(s) to {}", sources.len(), destination.display());

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(ZIP_COMPRESSION_LEVEL));
    let mut zip = ZipWriter::new(File::create(destination)?);

    for source in sources {
        let source = source.as_ref();
        let name = source
            .file_name()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} has no file name", source.display()),
                )
            })?
            .to_string_lossy()
            .into_owned();

        info!("Zipping {}", source.display());
        zip.start_file(name, options)?;
        let mut input = File::open(source)?;
        io::copy(&mut input, &mut zip)?;
    }
    zip.finish()?;

    if delete_sources {
        for source in sources {
            fs::remove_file(source)?;
        }
    }
    Ok(())
}

/// Extract every entry of `archive` into `destination`, returning the number
/// of entries.
pub fn unpack(
    archive: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    delete_archive: bool,
) -> Result<usize> {
    let archive = archive.as_ref();
    let destination = destination.as_ref();
    info!("Extracting {} to {}", archive.display(), destination.display());

    let entries = {
        let mut zip = ZipArchive::new(File::open(archive)?)?;
        zip.extract(destination)?;
        zip.len()
    };

    if delete_archive {
        fs::remove_file(archive)?;
    }
    Ok(entries)
}
