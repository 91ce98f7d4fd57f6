use crate::error::MarketDataError;
use crate::PriceProvider;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{Instrument, PriceTable};
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const DATE_HEADER: &str = "date";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A frozen price snapshot stored as a wide CSV file.
///
/// The layout is `date,<ticker>,<ticker>,...` with one row per trading date. An
/// empty cell means the instrument has no close on that date.
#[derive(Debug, Clone)]
pub struct CsvPriceStore {
    path: PathBuf,
}

impl CsvPriceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the closes of `tickers` dated within `[start, end]`.
    pub fn load(
        &self,
        tickers: &BTreeSet<Instrument>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable, MarketDataError> {
        let file = File::open(&self.path)?;
        let table = read_from(file, tickers, start, end)?;
        tracing::info!(
            path = %self.path.display(),
            tickers = tickers.len(),
            dates = table.len(),
            "Loaded price snapshot."
        );
        Ok(table)
    }

    /// Writes `table` to the store's path, creating parent directories as needed.
    pub fn save(&self, table: &PriceTable) -> Result<(), MarketDataError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.path)?;
        write_to(file, table)?;
        tracing::info!(
            path = %self.path.display(),
            dates = table.len(),
            "Saved price snapshot."
        );
        Ok(())
    }
}

/// Parses a wide CSV snapshot, keeping only `tickers` and dates within `[start, end]`.
pub fn read_from<R: Read>(
    reader: R,
    tickers: &BTreeSet<Instrument>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceTable, MarketDataError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    match headers.get(0) {
        Some(first) if first.eq_ignore_ascii_case(DATE_HEADER) => {}
        _ => {
            return Err(MarketDataError::InvalidData(format!(
                "the first column of the snapshot must be '{DATE_HEADER}'"
            )));
        }
    }

    // Map each requested ticker to its column index.
    let mut columns = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        let index = headers
            .iter()
            .position(|h| h == ticker.as_str())
            .ok_or_else(|| MarketDataError::UnknownTicker(ticker.to_string()))?;
        columns.push((ticker, index));
    }

    let mut table = PriceTable::new();
    let mut seen = HashSet::new();
    for record in csv_reader.records() {
        let record = record?;
        let raw_date = record.get(0).unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|e| {
            MarketDataError::InvalidData(format!("invalid date '{raw_date}': {e}"))
        })?;
        if !seen.insert(date) {
            return Err(MarketDataError::InvalidData(format!(
                "date {date} appears more than once"
            )));
        }
        if date < start || date > end {
            continue;
        }

        for (ticker, index) in &columns {
            let cell = record.get(*index).unwrap_or_default();
            if cell.is_empty() {
                continue;
            }
            let price = Decimal::from_str(cell).map_err(|e| {
                MarketDataError::InvalidData(format!("{ticker} on {date}: '{cell}' ({e})"))
            })?;
            table.insert(date, (*ticker).clone(), price)?;
        }
    }

    Ok(table)
}

/// Serializes `table` in the wide snapshot layout, tickers in alphabetical order.
pub fn write_to<W: Write>(writer: W, table: &PriceTable) -> Result<(), MarketDataError> {
    let instruments: Vec<Instrument> = table.instruments().into_iter().collect();
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(instruments.len() + 1);
    header.push(DATE_HEADER.to_string());
    header.extend(instruments.iter().map(|i| i.to_string()));
    csv_writer.write_record(&header)?;

    for (date, row) in table.table().rows() {
        let mut record = Vec::with_capacity(instruments.len() + 1);
        record.push(date.format(DATE_FORMAT).to_string());
        for instrument in &instruments {
            record.push(row.get(instrument).map(|p| p.to_string()).unwrap_or_default());
        }
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[async_trait]
impl PriceProvider for CsvPriceStore {
    async fn get_daily_closes(
        &self,
        tickers: &BTreeSet<Instrument>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable, MarketDataError> {
        self.load(tickers, start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tickers(list: &[&str]) -> BTreeSet<Instrument> {
        list.iter().map(|t| Instrument::new(*t).unwrap()).collect()
    }

    const SNAPSHOT: &str = "\
date,BVN,SCCO,HL
2024-01-02,15.10,78.2,
2024-01-03,15.30,,5.1
2024-01-04,15.00,79.0,5.2
";

    #[test]
    fn empty_cells_are_absent() {
        let table = read_from(
            SNAPSHOT.as_bytes(),
            &tickers(&["BVN", "SCCO"]),
            date(2024, 1, 1),
            date(2024, 1, 31),
        )
        .unwrap();

        let scco = Instrument::new("SCCO").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(date(2024, 1, 3), &scco), None);
        assert_eq!(table.get(date(2024, 1, 4), &scco), Some(dec!(79.0)));
        // HL was not requested.
        assert_eq!(table.instruments(), tickers(&["BVN", "SCCO"]));
    }

    #[test]
    fn range_is_inclusive() {
        let table = read_from(
            SNAPSHOT.as_bytes(),
            &tickers(&["BVN"]),
            date(2024, 1, 3),
            date(2024, 1, 4),
        )
        .unwrap();
        assert_eq!(table.table().first_date(), Some(date(2024, 1, 3)));
        assert_eq!(table.table().last_date(), Some(date(2024, 1, 4)));
    }

    #[test]
    fn missing_ticker_is_an_error() {
        let err = read_from(
            SNAPSHOT.as_bytes(),
            &tickers(&["FCX"]),
            date(2024, 1, 1),
            date(2024, 1, 31),
        )
        .unwrap_err();
        assert!(matches!(err, MarketDataError::UnknownTicker(t) if t == "FCX"));
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let body = "date,BVN\n2024-01-02,1\n2024-01-02,2\n";
        let err = read_from(body.as_bytes(), &tickers(&["BVN"]), date(2024, 1, 1), date(2024, 1, 31))
            .unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidData(_)));
    }

    #[test]
    fn zero_prices_are_rejected() {
        let body = "date,BVN\n2024-01-02,0\n";
        let err = read_from(body.as_bytes(), &tickers(&["BVN"]), date(2024, 1, 1), date(2024, 1, 31))
            .unwrap_err();
        assert!(matches!(err, MarketDataError::Core(_)));
    }

    #[test]
    fn writes_the_wide_layout() {
        let table = PriceTable::from_observations([
            (date(2024, 1, 2), Instrument::new("SCCO").unwrap(), dec!(78.2)),
            (date(2024, 1, 2), Instrument::new("BVN").unwrap(), dec!(15.1)),
            (date(2024, 1, 3), Instrument::new("BVN").unwrap(), dec!(15.3)),
        ])
        .unwrap();

        let mut buffer = Vec::new();
        write_to(&mut buffer, &table).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "date,BVN,SCCO\n2024-01-02,15.1,78.2\n2024-01-03,15.3,\n");
    }
}
