//! Append-only order log.
//!
//! One line per order action:
//! `{MM-DD HH:MM:SS} {instrument}，{action}，{price}`.
//! Lines are never rewritten or removed.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use trading_core::error::OrderLogError;
use trading_core::types::{OrderAction, OrderRequest};

const TIME_FORMAT: &str = "%m-%d %H:%M:%S";

/// A single order-log line.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLogEntry {
    pub timestamp: NaiveDateTime,
    pub instrument: String,
    pub action: OrderAction,
    pub price: Decimal,
}

impl OrderLogEntry {
    /// Entry for a request about to be (or just) placed.
    pub fn for_request(timestamp: NaiveDateTime, request: &OrderRequest) -> Self {
        Self {
            timestamp,
            instrument: request.instrument.clone(),
            action: request.action(),
            price: request.price,
        }
    }

    /// Entry from a numeric action code (1 buy-open .. 4 sell-close).
    ///
    /// Any other code is rejected.
    pub fn from_code(
        timestamp: NaiveDateTime,
        instrument: impl Into<String>,
        code: u8,
        price: Decimal,
    ) -> Result<Self, OrderLogError> {
        Ok(Self {
            timestamp,
            instrument: instrument.into(),
            action: OrderAction::try_from(code)?,
            price,
        })
    }

    /// Render the entry without a trailing newline.
    pub fn to_line(&self) -> String {
        format!(
            "{} {}，{}，{}",
            self.timestamp.format(TIME_FORMAT),
            self.instrument,
            self.action.label(),
            self.price
        )
    }
}

/// Shared writer for the order book file.
///
/// Construct once per destination and hand an `Arc<OrderLog>` to every
/// strategy instance that writes to it. The lock covers one whole line, so
/// concurrent writers never interleave partial lines.
pub struct OrderLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl OrderLog {
    /// Open (or create) the log for appending. Parent directories are created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, OrderLogError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry.
    pub fn append(&self, entry: &OrderLogEntry) -> Result<(), OrderLogError> {
        let mut line = entry.to_line();
        line.push('\n');

        {
            // A panic while holding the lock leaves the file handle intact.
            let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
            file.write_all(line.as_bytes())?;
            file.flush()?;
        }

        info!(
            instrument = %entry.instrument,
            action = %entry.action,
            price = %entry.price,
            "order logged"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use trading_core::types::{Offset, Side};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 7)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_line_layout() {
        let request =
            OrderRequest::limit("rb2510", "SHFE", Side::Sell, Offset::CloseToday, dec!(3498), 2);
        let entry = OrderLogEntry::for_request(at(9, 31, 5), &request);
        assert_eq!(entry.to_line(), "03-07 09:31:05 rb2510，sell-close，3498");
    }

    #[test]
    fn test_from_code_rejects_unknown_action() {
        let ok = OrderLogEntry::from_code(at(10, 0, 0), "rb2510", 1, dec!(3500)).unwrap();
        assert_eq!(ok.action, OrderAction::BuyOpen);

        let err = OrderLogEntry::from_code(at(10, 0, 0), "rb2510", 9, dec!(3500)).unwrap_err();
        assert!(matches!(err, OrderLogError::InvalidAction(_)));
    }

    #[test]
    fn test_append_creates_parent_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result").join("order_book.txt");
        let log = OrderLog::open(&path).unwrap();

        let first = OrderLogEntry::from_code(at(9, 0, 0), "rb2510", 1, dec!(3500)).unwrap();
        let second = OrderLogEntry::from_code(at(9, 1, 0), "rb2510", 4, dec!(3510)).unwrap();
        log.append(&first).unwrap();
        log.append(&second).unwrap();

        // Reopening keeps existing lines
        let reopened = OrderLog::open(&path).unwrap();
        reopened.append(&first).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines,
            vec![
                "03-07 09:00:00 rb2510，buy-open，3500",
                "03-07 09:01:00 rb2510，sell-close，3510",
                "03-07 09:00:00 rb2510，buy-open，3500",
            ]
        );
    }

    #[test]
    fn test_concurrent_writers_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order_book.txt");
        let log = Arc::new(OrderLog::open(&path).unwrap());

        std::thread::scope(|scope| {
            for worker in 0..8u32 {
                let log = Arc::clone(&log);
                scope.spawn(move || {
                    let instrument = format!("inst{}", worker);
                    for i in 0..50u32 {
                        let entry = OrderLogEntry::from_code(
                            at(11, 0, 0),
                            instrument.clone(),
                            (i % 4 + 1) as u8,
                            Decimal::from(i),
                        )
                        .unwrap();
                        log.append(&entry).unwrap();
                    }
                });
            }
        });

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 400);
        for line in lines {
            let fields: Vec<&str> = line.split('，').collect();
            assert_eq!(fields.len(), 3, "malformed line: {}", line);
            assert!(fields[1].parse::<OrderAction>().is_ok());
        }
    }
}
