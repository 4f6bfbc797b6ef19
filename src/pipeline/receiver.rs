use crate::error::{PipelineError, Result};
use crate::parallel::Candidate;
use std::io::{self, Read};
use std::path::Path;

/// Line counts gathered while reading a candidate source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub total_lines: usize,
    pub valid_lines: usize,
    pub invalid_lines: usize,
}

/// Candidates read from a delimited source plus its line counts
#[derive(Debug, Clone, Default)]
pub struct LoadedSource {
    pub candidates: Vec<Candidate>,
    pub stats: SourceStats,
}

/// Reads candidates from the first column of a delimited text file
#[derive(Debug, Clone)]
pub struct CsvReceiver {
    delimiter: u8,
    has_header: bool,
}

impl Default for CsvReceiver {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: false,
        }
    }
}

impl CsvReceiver {
    pub fn new(delimiter: u8, has_header: bool) -> Self {
        Self {
            delimiter,
            has_header,
        }
    }

    /// Load every candidate from `path`.
    pub fn load(&self, path: &Path) -> Result<LoadedSource> {
        let source_error = |reason: String| PipelineError::Source {
            path: path.display().to_string(),
            reason,
        };

        if !path.is_file() {
            return Err(source_error("file not found".to_string()));
        }

        let file = std::fs::File::open(path).map_err(|e| source_error(e.to_string()))?;
        tracing::info!("Reading candidates from {}", path.display());

        let loaded = self
            .read(file)
            .map_err(|e| source_error(e.to_string()))?;

        tracing::info!(
            "Loaded {} candidates from {} lines",
            loaded.stats.valid_lines,
            loaded.stats.total_lines
        );
        if loaded.stats.invalid_lines > 0 {
            tracing::warn!("Skipped {} empty lines", loaded.stats.invalid_lines);
        }
        Ok(loaded)
    }

    /// Read candidates from any reader. Rows may have differing field counts.
    ///
    /// Empty lines never reach the csv reader as records, so they are counted
    /// on the way in and reported as invalid lines.
    pub fn read<R: Read>(&self, reader: R) -> std::result::Result<LoadedSource, csv::Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(self.has_header)
            .flexible(true)
            .from_reader(BlankLineCounter::new(reader));

        let mut loaded = LoadedSource::default();
        let mut record = csv::ByteRecord::new();

        while csv_reader.read_byte_record(&mut record)? {
            loaded.stats.total_lines += 1;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            match record.get(0).map(<[u8]>::trim_ascii) {
                Some(field) if !field.is_empty() => {
                    loaded.candidates.push(Candidate::new(field));
                    loaded.stats.valid_lines += 1;
                }
                _ => {
                    tracing::debug!("Skipping empty line {}", line);
                    loaded.stats.invalid_lines += 1;
                }
            }
        }

        let blank_lines = csv_reader.get_ref().blank_lines;
        if blank_lines > 0 {
            tracing::debug!("Skipping {} blank lines", blank_lines);
        }
        loaded.stats.total_lines += blank_lines;
        loaded.stats.invalid_lines += blank_lines;

        Ok(loaded)
    }
}

/// Byte pass-through that counts empty lines outside quoted fields
struct BlankLineCounter<R> {
    inner: R,
    line_has_content: bool,
    in_quotes: bool,
    blank_lines: usize,
}

impl<R> BlankLineCounter<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            line_has_content: false,
            in_quotes: false,
            blank_lines: 0,
        }
    }
}

impl<R: Read> Read for BlankLineCounter<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        for &byte in &buf[..n] {
            match byte {
                b'\n' if !self.in_quotes => {
                    if !self.line_has_content {
                        self.blank_lines += 1;
                    }
                    self.line_has_content = false;
                }
                b'\r' => {}
                b'"' => {
                    self.in_quotes = !self.in_quotes;
                    self.line_has_content = true;
                }
                _ => self.line_has_content = true,
            }
        }
        Ok(n)
    }
}
