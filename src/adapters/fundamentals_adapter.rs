//! Local fundamentals: `<TICKER>.ini` snapshots and `<TICKER>_statements.csv`
//! statement tables in one directory.

use crate::adapters::csv_adapter::read_statements;
use crate::domain::error::TickerscopeError;
use crate::domain::fundamentals::{FinancialStatementSeries, FundamentalSnapshot};
use crate::ports::data_port::FundamentalsPort;
use configparser::ini::Ini;
use std::path::PathBuf;

const SNAPSHOT_SECTION: &str = "info";

pub struct IniFundamentalsAdapter {
    base_path: PathBuf,
}

impl IniFundamentalsAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }
}

impl FundamentalsPort for IniFundamentalsAdapter {
    fn fetch_snapshot(&self, ticker: &str) -> Result<FundamentalSnapshot, TickerscopeError> {
        let path = self.base_path.join(format!("{ticker}.ini"));
        if !path.exists() {
            return Ok(FundamentalSnapshot::new());
        }

        // vendor keys are camelCase
        let mut ini = Ini::new_cs();
        ini.load(&path).map_err(|reason| TickerscopeError::DataSource {
            reason: format!("failed to parse {}: {}", path.display(), reason),
        })?;

        let mut snapshot = FundamentalSnapshot::new();
        if let Some(section) = ini.get_map_ref().get(SNAPSHOT_SECTION) {
            for (key, value) in section {
                if let Some(raw) = value {
                    snapshot.insert_raw(key, raw);
                }
            }
        }
        Ok(snapshot)
    }

    fn fetch_statements(&self, ticker: &str) -> Result<FinancialStatementSeries, TickerscopeError> {
        read_statements(&self.base_path.join(format!("{ticker}_statements.csv")))
    }
}
