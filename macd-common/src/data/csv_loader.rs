// =================================================================
// data/csv_loader.rs - Daily Price File Ingestion
// =================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::repository::PriceRepository;
use super::types::{DataError, PricePoint};

const DATE_FORMATS: [&str; 2] = ["%Y%m%d", "%Y-%m-%d"];

/// Column positions resolved from the header row
struct Columns {
    ticker: usize,
    date: usize,
    high: usize,
    low: usize,
    close: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, DataError> {
        let names: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |candidates: &[&str]| {
            names
                .iter()
                .position(|name| candidates.contains(&name.as_str()))
                .ok_or_else(|| DataError::MissingColumn(candidates[0].to_string()))
        };

        Ok(Self {
            ticker: find(&["ticker", "symbol"])?,
            date: find(&["dtyyyymmdd", "date"])?,
            high: find(&["high"])?,
            low: find(&["low"])?,
            close: find(&["close"])?,
        })
    }
}

/// `<Close>` -> `close`
fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('<')
        .trim_end_matches('>')
        .to_lowercase()
}

fn parse_date(raw: &str) -> Result<NaiveDate, DataError> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .ok_or_else(|| DataError::Parse(format!("Invalid date '{}'", raw)))
}

fn parse_decimal(raw: &str, column: &str) -> Result<Decimal, DataError> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| DataError::Parse(format!("Invalid {} '{}': {}", column, raw, e)))
}

fn field<'a>(record: &'a StringRecord, index: usize, column: &str) -> Result<&'a str, DataError> {
    match record.get(index) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(DataError::Parse(format!("Missing {}", column))),
    }
}

fn parse_record(record: &StringRecord, columns: &Columns) -> Result<PricePoint, DataError> {
    let ticker = field(record, columns.ticker, "ticker")?;
    let timestamp = parse_date(field(record, columns.date, "date")?)?;
    let high = parse_decimal(field(record, columns.high, "high")?, "high")?;
    let low = parse_decimal(field(record, columns.low, "low")?, "low")?;
    let close = parse_decimal(field(record, columns.close, "close")?, "close")?;

    Ok(PricePoint::new(timestamp, ticker, close, high, low))
}

/// Read price rows from any CSV source.
///
/// Rows with a missing or malformed required field are dropped and logged.
/// Output keeps file order; ordering and de-duplication happen in
/// [`PriceRepository::from_points`].
pub fn read_price_points<R: Read>(reader: R) -> Result<Vec<PricePoint>, DataError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let columns = Columns::resolve(reader.headers()?)?;
    let mut points = Vec::new();

    for (line, result) in reader.records().enumerate() {
        let record = result?;
        match parse_record(&record, &columns) {
            Ok(point) => points.push(point),
            // +2: header line plus 1-based numbering
            Err(e) => warn!("Dropping row {}: {}", line + 2, e),
        }
    }

    Ok(points)
}

/// Load a daily price file into a repository.
pub fn load_price_file(path: impl AsRef<Path>) -> Result<PriceRepository, DataError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let points = read_price_points(file)?;
    let repository = PriceRepository::from_points(points);

    info!(
        "Loaded {} tickers from {}",
        repository.len(),
        path.display()
    );
    Ok(repository)
}
