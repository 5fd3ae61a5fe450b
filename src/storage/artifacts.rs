use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::entities::{NormalizedMovieRecord, RawMovieRecord};
use crate::storage::errors::PersistenceError;

const CSV_HEADER: [&str; 7] = [
    "rank",
    "title",
    "release_year",
    "imdb_rating",
    "runtime",
    "genres",
    "imdb_url",
];

pub fn write_raw(path: &Path, records: &[RawMovieRecord]) -> Result<(), PersistenceError> {
    write_json(path, records)?;
    info!(path = %path.display(), records = records.len(), "raw records saved");
    Ok(())
}

pub fn write_processed(
    path: &Path,
    records: &[NormalizedMovieRecord],
) -> Result<(), PersistenceError> {
    write_json(path, records)?;
    info!(path = %path.display(), records = records.len(), "processed records saved");
    Ok(())
}

pub fn read_processed(path: &Path) -> Result<Vec<NormalizedMovieRecord>, PersistenceError> {
    read_json(path)
}

/// Flat export of the processed records. Nulls are empty cells and genres
/// share one cell, comma separated.
pub fn write_processed_csv(
    path: &Path,
    records: &[NormalizedMovieRecord],
) -> Result<(), PersistenceError> {
    let csv_err = |source| PersistenceError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_writer(create(path)?);
    writer.write_record(CSV_HEADER).map_err(csv_err)?;

    for record in records {
        writer
            .write_record([
                record.rank.to_string(),
                record.title.clone(),
                record.release_year.map(|y| y.to_string()).unwrap_or_default(),
                record.imdb_rating.map(|r| r.to_string()).unwrap_or_default(),
                record.runtime.clone().unwrap_or_default(),
                record.genres.join(", "),
                record.imdb_url.clone().unwrap_or_default(),
            ])
            .map_err(csv_err)?;
    }

    writer.flush().map_err(|source| io_err(path, source))?;
    info!(path = %path.display(), records = records.len(), "csv export saved");
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    let mut writer = BufWriter::new(create(path)?);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| PersistenceError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|source| io_err(path, source))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PersistenceError> {
    let file = File::open(path).map_err(|source| io_err(path, source))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| PersistenceError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn create(path: &Path) -> Result<File, PersistenceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| io_err(parent, source))?;
    }
    File::create(path).map_err(|source| io_err(path, source))
}

fn io_err(path: &Path, source: std::io::Error) -> PersistenceError {
    PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    }
}
