use crate::config::{IndexConfig, ReadConfig};
use crate::error::RunError;
use crate::index::{Index, InsertOutcome};
use crate::record::Record;
use crate::source::LineSource;
use std::io::Write;
use tracing::{debug, info};

const DUPLICATE_HEADER: &str = "Potential duplicate\n===================\n";
const DUPLICATE_SEPARATOR: &str = "==========\n";

/// What a batch run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Report {
    /// Address blocks read from the main input
    pub read: usize,

    /// Records kept in the index
    pub stored: usize,

    /// Blocks rejected as duplicates
    pub duplicates: usize,

    /// Probe blocks found in the index
    pub found: usize,
}

/// Prints every distinct address once, sorted by surname, postcode and house
/// number.
pub fn unique<S, W>(
    source: &mut S,
    sink: &mut W,
    read: &ReadConfig,
    config: IndexConfig,
) -> Result<Report, RunError>
where
    S: LineSource + ?Sized,
    W: Write + ?Sized,
{
    let (index, report) = load(source, read, config)?;
    for record in index.sorted() {
        record.write_to(sink).map_err(RunError::Output)?;
    }
    index.destroy();
    Ok(report)
}

/// Prints each address that repeats one seen earlier, next to the earlier one.
pub fn duplicates<S, W>(
    source: &mut S,
    sink: &mut W,
    read: &ReadConfig,
    config: IndexConfig,
) -> Result<Report, RunError>
where
    S: LineSource + ?Sized,
    W: Write + ?Sized,
{
    read.validate()?;
    let mut index = Index::create(config)?;
    let mut report = Report::default();

    while let Some(record) = Record::parse(source, read)? {
        report.read += 1;
        match index.lookup(&record) {
            Some(stored) => {
                report.duplicates += 1;
                write_duplicate(sink, &record, stored).map_err(RunError::Output)?;
            }
            None => {
                index.insert(record)?;
            }
        }
    }

    report.stored = index.len();
    info!(
        "{} blocks read, {} duplicates reported",
        report.read, report.duplicates
    );
    index.destroy();
    Ok(report)
}

/// Builds the index from `source`, then reports each probe block as found or
/// not found.
pub fn lookup<S, P, W>(
    source: &mut S,
    probes: &mut P,
    sink: &mut W,
    read: &ReadConfig,
    config: IndexConfig,
) -> Result<Report, RunError>
where
    S: LineSource + ?Sized,
    P: LineSource + ?Sized,
    W: Write + ?Sized,
{
    let (index, mut report) = load(source, read, config)?;

    while let Some(probe) = Record::parse(probes, read)? {
        let written = match index.lookup(&probe) {
            Some(stored) => {
                report.found += 1;
                write_labelled(sink, "found: ", stored)
            }
            None => write_labelled(sink, "not found: ", &probe),
        };
        written.map_err(RunError::Output)?;
    }

    index.destroy();
    Ok(report)
}

/// Inserts every block of `source` into a fresh index.
pub fn load<S: LineSource + ?Sized>(
    source: &mut S,
    read: &ReadConfig,
    config: IndexConfig,
) -> Result<(Index, Report), RunError> {
    read.validate()?;
    let mut index = Index::create(config)?;
    let mut report = Report::default();

    while let Some(record) = Record::parse(source, read)? {
        report.read += 1;
        if let InsertOutcome::Duplicate(record) = index.insert(record)? {
            debug!("skipping repeated address of {}", record.surname());
            report.duplicates += 1;
        }
    }

    report.stored = index.len();
    info!(
        "loaded {} records from {} blocks into {} buckets",
        report.stored,
        report.read,
        index.bucket_count()
    );
    Ok((index, report))
}

fn write_labelled<W: Write + ?Sized>(
    sink: &mut W,
    label: &str,
    record: &Record,
) -> std::io::Result<()> {
    sink.write_all(label.as_bytes())?;
    record.write_to(sink)
}

fn write_duplicate<W: Write + ?Sized>(
    sink: &mut W,
    record: &Record,
    stored: &Record,
) -> std::io::Result<()> {
    sink.write_all(DUPLICATE_HEADER.as_bytes())?;
    record.write_to(sink)?;
    sink.write_all(DUPLICATE_SEPARATOR.as_bytes())?;
    stored.write_to(sink)?;
    sink.write_all(b"\n")
}
