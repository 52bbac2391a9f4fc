use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDateTime};
use uuid::Uuid;

use crate::{
    configuration::OutputSettings,
    domain::investor::{InvestorRecord, InvestorRow, INVESTOR_ROW_HEADERS},
    error::ScrapeError,
};

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const SEPARATOR_WIDTH: usize = 50;

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Writes accepted records to a csv file and a plain text file as soon as
/// they are accepted. Both files of a run share one timestamp token.
#[derive(Debug)]
pub struct RecordSink {
    csv_path: PathBuf,
    txt_path: PathBuf,
    written: usize,
}

impl RecordSink {
    pub fn initialize(output: &OutputSettings, clock: &dyn Clock) -> Result<Self, ScrapeError> {
        fs::create_dir_all(&output.directory)?;

        let timestamp = clock.now().format(TIMESTAMP_FORMAT).to_string();
        let (csv_path, csv_file, txt_path) =
            match create_file_pair(&output.directory, &output.file_prefix, &timestamp)? {
                Some(pair) => pair,
                None => {
                    let suffix = Uuid::new_v4().simple().to_string();
                    let token = format!("{}_{}", timestamp, &suffix[..8]);
                    log::warn!(
                        "Output files for {} already exist, using token {}",
                        timestamp,
                        token
                    );
                    create_file_pair(&output.directory, &output.file_prefix, &token)?.ok_or_else(
                        || io::Error::new(io::ErrorKind::AlreadyExists, "output file collision"),
                    )?
                }
            };

        let mut writer = csv::Writer::from_writer(csv_file);
        writer.write_record(INVESTOR_ROW_HEADERS)?;
        writer.flush()?;

        Ok(RecordSink {
            csv_path,
            txt_path,
            written: 0,
        })
    }

    /// Appends one record to both files. No deduplication happens here; the
    /// files are closed again before this returns. Both payloads are built and
    /// both files opened before anything is written, so a file that cannot be
    /// opened leaves neither one changed.
    pub fn append(&mut self, record: &InvestorRecord) -> Result<(), ScrapeError> {
        let mut row = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(vec![]);
        row.serialize(InvestorRow::from(record))?;
        let row = row.into_inner().map_err(|e| e.into_error())?;
        let block = format_text_block(record);

        let mut csv_file = OpenOptions::new().append(true).open(&self.csv_path)?;
        let mut txt_file = OpenOptions::new().append(true).open(&self.txt_path)?;

        csv_file.write_all(&row)?;
        csv_file.flush()?;
        txt_file.write_all(block.as_bytes())?;
        txt_file.flush()?;

        self.written += 1;
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    pub fn txt_path(&self) -> &Path {
        &self.txt_path
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

/// Creates `<prefix>_<token>.csv` and an empty `.txt` next to it. Returns
/// `None` when either name is taken so the caller can pick another token.
fn create_file_pair(
    directory: &Path,
    prefix: &str,
    token: &str,
) -> io::Result<Option<(PathBuf, File, PathBuf)>> {
    let csv_path = directory.join(format!("{}_{}.csv", prefix, token));
    let txt_path = directory.join(format!("{}_{}.txt", prefix, token));

    let csv_file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&csv_path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(None),
        Err(e) => return Err(e),
    };

    match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&txt_path)
    {
        Ok(_) => Ok(Some((csv_path, csv_file, txt_path))),
        Err(e) => {
            drop(csv_file);
            fs::remove_file(&csv_path)?;
            match e.kind() {
                io::ErrorKind::AlreadyExists => Ok(None),
                _ => Err(e),
            }
        }
    }
}

pub fn format_text_block(record: &InvestorRecord) -> String {
    format!(
        "Investor: {}\nDeals: {}\nMedian Amount: {}\nRound Type: {}\nProject Category: {}\nProject Name: {}\nChain Images: {}\n{}\n\n",
        record.investor,
        record.deals,
        record.median_amount,
        record.round_type,
        record.category,
        record.project_name,
        record.chains_joined(),
        "-".repeat(SEPARATOR_WIDTH),
    )
}

/// Reads back a structured output file.
pub fn read_rows(path: &Path) -> Result<Vec<InvestorRow>, csv::Error> {
    csv::Reader::from_path(path)?.deserialize().collect()
}

/// The newest `.csv` in `directory`, going by file name (names embed the run
/// timestamp).
pub fn latest_structured_file(directory: &Path) -> io::Result<Option<PathBuf>> {
    let latest = fs::read_dir(directory)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "csv"))
        .max_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(latest)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;

    use chrono::{NaiveDate, NaiveDateTime};
    use uuid::Uuid;

    use super::Clock;
    use crate::{configuration::OutputSettings, domain::investor::InvestorRow};

    pub struct FixedClock(pub NaiveDateTime);

    impl Clock for FixedClock {
        fn now(&self) -> NaiveDateTime {
            self.0
        }
    }

    pub fn fixed_clock() -> FixedClock {
        FixedClock(
            NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(14, 5, 7)
                .unwrap(),
        )
    }

    pub fn temp_output() -> OutputSettings {
        OutputSettings {
            directory: std::env::temp_dir().join(format!("raise_scout_{}", Uuid::new_v4())),
            file_prefix: "defillama_data".to_string(),
        }
    }

    pub fn read_rows(path: &Path) -> Vec<InvestorRow> {
        super::read_rows(path).unwrap()
    }
}
