//! Sales history: raw events, ingest and daily aggregation

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A single (timestamp, amount) pair supplied by the data-access layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalesEvent {
    /// When the sale happened
    pub timestamp: DateTime<Utc>,
    /// Quantity or revenue contributed by the sale
    pub amount: f64,
}

impl SalesEvent {
    /// Create a new event
    pub fn new(timestamp: DateTime<Utc>, amount: f64) -> Self {
        Self { timestamp, amount }
    }
}

/// A transaction line item as stored by the point-of-sale backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// When the transaction happened
    pub timestamp: DateTime<Utc>,
    /// Product sold, if the line is tied to one
    pub product_id: Option<i64>,
    /// Units sold
    pub quantity: f64,
    /// Price per unit
    pub unit_price: f64,
}

/// Which aggregate a sales record contributes to the series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalesMetric {
    /// Units sold
    #[default]
    Quantity,
    /// Units sold times unit price
    Revenue,
}

impl SalesRecord {
    /// Convert the record to an event carrying the chosen metric
    pub fn to_event(&self, metric: SalesMetric) -> SalesEvent {
        let amount = match metric {
            SalesMetric::Quantity => self.quantity,
            SalesMetric::Revenue => self.quantity * self.unit_price,
        };
        SalesEvent::new(self.timestamp, amount)
    }
}

/// Scope records to a target product (when given) and convert them to events
pub fn records_to_events(
    records: &[SalesRecord],
    target_id: Option<i64>,
    metric: SalesMetric,
) -> Vec<SalesEvent> {
    records
        .iter()
        .filter(|r| target_id.map_or(true, |id| r.product_id == Some(id)))
        .map(|r| r.to_event(metric))
        .collect()
}

/// Loader for sales records exported by the backend
#[derive(Debug)]
pub struct SalesLoader;

impl SalesLoader {
    /// Load sales records from a CSV file with header
    /// `timestamp,product_id,quantity,unit_price`
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<SalesRecord>> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load sales records from any CSV source
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<SalesRecord>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for row in csv_reader.deserialize() {
            let record: SalesRecord = row?;
            records.push(record);
        }

        Ok(records)
    }
}

/// Aggregated value for one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    /// Calendar day (UTC)
    pub date: NaiveDate,
    /// Summed quantity or revenue for the day
    pub value: f64,
}

impl HistoricalPoint {
    /// Create a new point
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Gap-free daily series, sorted by date with one point per day
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    points: Vec<HistoricalPoint>,
}

/// Bucket events by UTC calendar day, summing amounts within a day.
///
/// Days between the first and last event with no sales contribute zero.
pub fn aggregate_daily(events: &[SalesEvent]) -> Result<DailySeries> {
    if events.is_empty() {
        return Err(ForecastError::InsufficientData {
            required: 1,
            found: 0,
        });
    }

    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for event in events {
        if !event.amount.is_finite() {
            return Err(ForecastError::InvalidParameter(format!(
                "Non-finite sales amount at {}",
                event.timestamp
            )));
        }
        *buckets.entry(event.timestamp.date_naive()).or_insert(0.0) += event.amount;
    }

    let points = buckets
        .into_iter()
        .map(|(date, value)| HistoricalPoint::new(date, value))
        .collect();

    Ok(DailySeries {
        points: fill_gaps(points)?,
    })
}

impl DailySeries {
    /// Build a series from caller-supplied points.
    ///
    /// Points must be sorted by date without duplicates; missing days are
    /// filled with zero.
    pub fn from_points(points: Vec<HistoricalPoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(ForecastError::InsufficientData {
                required: 1,
                found: 0,
            });
        }

        for point in &points {
            if !point.value.is_finite() {
                return Err(ForecastError::InvalidParameter(format!(
                    "Non-finite value on {}",
                    point.date
                )));
            }
        }

        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ForecastError::InvalidParameter(format!(
                    "History must be sorted by date without duplicates ({} follows {})",
                    pair[1].date, pair[0].date
                )));
            }
        }

        Ok(Self {
            points: fill_gaps(points)?,
        })
    }

    /// Daily points
    pub fn points(&self) -> &[HistoricalPoint] {
        &self.points
    }

    /// Consume the series, returning its points
    pub fn into_points(self) -> Vec<HistoricalPoint> {
        self.points
    }

    /// Daily values in date order
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Last day in the series
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Number of days in the series
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series holds no days
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Split into the first `len - tail` days and the last `tail` days
    pub fn split_tail(&self, tail: usize) -> Result<(DailySeries, DailySeries)> {
        if tail == 0 || tail >= self.points.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Cannot hold out {} of {} days",
                tail,
                self.points.len()
            )));
        }

        let cut = self.points.len() - tail;
        Ok((
            DailySeries {
                points: self.points[..cut].to_vec(),
            },
            DailySeries {
                points: self.points[cut..].to_vec(),
            },
        ))
    }
}

/// Insert zero-valued days between sorted, unique points
fn fill_gaps(points: Vec<HistoricalPoint>) -> Result<Vec<HistoricalPoint>> {
    let mut filled: Vec<HistoricalPoint> = Vec::with_capacity(points.len());

    for point in points {
        if let Some(prev) = filled.last() {
            let mut day = next_day(prev.date)?;
            while day < point.date {
                filled.push(HistoricalPoint::new(day, 0.0));
                day = next_day(day)?;
            }
        }
        filled.push(point);
    }

    Ok(filled)
}

fn next_day(date: NaiveDate) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(1))
        .ok_or_else(|| ForecastError::InvalidParameter(format!("No calendar day after {}", date)))
}
