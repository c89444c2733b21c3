//! CSV file adapters: price history, statement tables and frame export.

use crate::domain::error::TickerscopeError;
use crate::domain::frame::{COLUMNS, IndicatorFrame};
use crate::domain::fundamentals::FinancialStatementSeries;
use crate::domain::indicator::IndicatorType;
use crate::domain::ohlcv::{PriceBar, normalize_bars};
use crate::ports::data_port::PriceHistoryPort;
use chrono::NaiveDate;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Reads `<base>/<TICKER>.csv` with a `date,open,high,low,close,volume` header.
pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{ticker}.csv"))
    }

    /// Tickers with a price file in the base directory, sorted.
    pub fn list_tickers(&self) -> Result<Vec<String>, TickerscopeError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| TickerscopeError::DataSource {
            reason: format!("failed to read directory {}: {}", self.base_path.display(), e),
        })?;

        let mut tickers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TickerscopeError::DataSource {
                reason: format!("directory entry error: {e}"),
            })?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(ticker) = name.strip_suffix(".csv") {
                if !ticker.ends_with("_statements") {
                    tickers.push(ticker.to_string());
                }
            }
        }
        tickers.sort();
        Ok(tickers)
    }
}

fn field<'r>(record: &'r csv::StringRecord, idx: usize, name: &str) -> Result<&'r str, TickerscopeError> {
    record.get(idx).ok_or_else(|| TickerscopeError::DataSource {
        reason: format!("missing {name} column"),
    })
}

fn number(record: &csv::StringRecord, idx: usize, name: &str) -> Result<f64, TickerscopeError> {
    field(record, idx, name)?
        .parse()
        .map_err(|e| TickerscopeError::DataSource {
            reason: format!("invalid {name} value: {e}"),
        })
}

impl PriceHistoryPort for CsvAdapter {
    fn fetch_prices(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, TickerscopeError> {
        let path = self.csv_path(ticker);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(TickerscopeError::DataSource {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| TickerscopeError::DataSource {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let date_str = field(&record, 0, "date")?;
            let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT).map_err(|e| {
                TickerscopeError::DataSource {
                    reason: format!("invalid date format: {e}"),
                }
            })?;
            if date < start || date > end {
                continue;
            }

            bars.push(PriceBar {
                date,
                open: number(&record, 1, "open")?,
                high: number(&record, 2, "high")?,
                low: number(&record, 3, "low")?,
                close: number(&record, 4, "close")?,
                volume: number(&record, 5, "volume")?,
            });
        }

        Ok(normalize_bars(bars))
    }
}

/// Statement table: first column is the line item, every other header is a
/// period end date. Blank or non-numeric cells read as missing.
pub fn read_statements(path: &Path) -> Result<FinancialStatementSeries, TickerscopeError> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(FinancialStatementSeries::default()),
        Err(e) => {
            return Err(TickerscopeError::DataSource {
                reason: format!("failed to read {}: {}", path.display(), e),
            });
        }
    };

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = rdr.headers().map_err(|e| TickerscopeError::DataSource {
        reason: format!("CSV header error in {}: {}", path.display(), e),
    })?;
    let periods = headers
        .iter()
        .skip(1)
        .map(|h| {
            NaiveDate::parse_from_str(h, DATE_FORMAT).map_err(|e| TickerscopeError::DataSource {
                reason: format!("invalid period '{h}' in {}: {e}", path.display()),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut series = FinancialStatementSeries::new(periods);
    for result in rdr.records() {
        let record = result.map_err(|e| TickerscopeError::DataSource {
            reason: format!("CSV parse error in {}: {}", path.display(), e),
        })?;
        let Some(name) = record.get(0).filter(|n| !n.is_empty()) else {
            continue;
        };
        let cells = record.iter().skip(1).map(|c| c.parse::<f64>().ok()).collect();
        series.push_row(name, cells);
    }
    Ok(series)
}

fn column_headers() -> Vec<String> {
    let mut headers: Vec<String> = ["date", "open", "high", "low", "close", "volume"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for column in COLUMNS {
        match column {
            IndicatorType::Bollinger { .. } => {
                for part in ["upper", "middle", "lower"] {
                    headers.push(format!("{column}.{part}"));
                }
            }
            IndicatorType::Macd { .. } => {
                for part in ["line", "signal", "histogram"] {
                    headers.push(format!("{column}.{part}"));
                }
            }
            other => headers.push(other.to_string()),
        }
    }
    headers
}

fn cell(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

/// Write the frame as CSV; undefined values become empty cells.
pub fn write_frame<W: Write>(frame: &IndicatorFrame, writer: W) -> Result<(), TickerscopeError> {
    let to_err = |e: csv::Error| TickerscopeError::DataSource {
        reason: format!("CSV write error: {e}"),
    };
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(column_headers()).map_err(to_err)?;

    for row in frame.rows() {
        let b = &row.bar;
        let bb = row.bollinger;
        let macd = row.macd;
        let record = vec![
            b.date.format(DATE_FORMAT).to_string(),
            b.open.to_string(),
            b.high.to_string(),
            b.low.to_string(),
            b.close.to_string(),
            b.volume.to_string(),
            cell(row.ma20),
            cell(row.ma50),
            cell(row.ma200),
            cell(row.rsi14),
            cell(row.atr14),
            cell(row.atr_pct),
            cell(bb.map(|x| x.upper)),
            cell(bb.map(|x| x.middle)),
            cell(bb.map(|x| x.lower)),
            cell(macd.map(|x| x.line)),
            cell(macd.map(|x| x.signal)),
            cell(macd.map(|x| x.histogram)),
        ];
        wtr.write_record(&record).map_err(to_err)?;
    }
    wtr.flush()?;
    Ok(())
}
