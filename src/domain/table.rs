//! The immutable, column-oriented bookings table.
//!
//! Columns are keyed by schema `Field`. A field missing from the source CSV is
//! simply absent here; aggregations that reference it fail with
//! `MetricsError::MissingColumn` instead of the whole load failing.

use std::collections::HashMap;

use crate::domain::{BookingRecord, Field, FieldKind};
use crate::error::MetricsError;

/// Column storage. Missing numerics are `NaN`, missing categoricals `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<f64>),
    Categorical(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Column::Numeric(_) => FieldKind::Numeric,
            Column::Categorical(_) => FieldKind::Categorical,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookingTable {
    rows: usize,
    columns: HashMap<Field, Column>,
}

impl BookingTable {
    /// Assemble a table from pre-built columns.
    ///
    /// Every column must hold exactly `rows` values.
    pub fn from_columns(rows: usize, columns: HashMap<Field, Column>) -> Result<Self, String> {
        for (field, column) in &columns {
            if column.len() != rows {
                return Err(format!(
                    "Column `{}` has {} values, expected {rows}.",
                    field.name(),
                    column.len()
                ));
            }
        }
        Ok(Self { rows, columns })
    }

    /// Build a table with every schema column from row records.
    pub fn from_records(records: &[BookingRecord]) -> Self {
        let text = |f: fn(&BookingRecord) -> Option<String>| {
            Column::Categorical(records.iter().map(f).collect())
        };
        let num = |f: fn(&BookingRecord) -> f64| Column::Numeric(records.iter().map(f).collect());

        let mut columns = HashMap::new();
        columns.insert(Field::Hotel, text(|r| Some(r.hotel.clone())));
        columns.insert(Field::Country, text(|r| r.country.clone()));
        columns.insert(Field::CustomerType, text(|r| Some(r.customer_type.clone())));
        columns.insert(Field::ReservedRoomType, text(|r| Some(r.reserved_room_type.clone())));
        columns.insert(Field::LeadTime, num(|r| r.lead_time));
        columns.insert(Field::Adr, num(|r| r.adr));
        columns.insert(Field::StaysInWeekendNights, num(|r| r.stays_in_weekend_nights));
        columns.insert(Field::StaysInWeekNights, num(|r| r.stays_in_week_nights));
        columns.insert(Field::Adults, num(|r| r.adults));
        columns.insert(Field::Children, num(|r| r.children));
        columns.insert(Field::Babies, num(|r| r.babies));
        columns.insert(Field::IsCanceled, num(|r| if r.is_canceled { 1.0 } else { 0.0 }));
        columns.insert(Field::PreviousCancellations, num(|r| r.previous_cancellations));

        Self {
            rows: records.len(),
            columns,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn has(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }

    /// Schema fields absent from this table, in schema order.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL.into_iter().filter(|f| !self.has(*f)).collect()
    }

    pub fn numeric(&self, field: Field) -> Result<&[f64], MetricsError> {
        match self.columns.get(&field) {
            Some(Column::Numeric(values)) => Ok(values),
            Some(Column::Categorical(_)) => Err(MetricsError::WrongKind {
                field,
                expected: FieldKind::Numeric,
            }),
            None => Err(MetricsError::MissingColumn(field)),
        }
    }

    pub fn categorical(&self, field: Field) -> Result<&[Option<String>], MetricsError> {
        match self.columns.get(&field) {
            Some(Column::Categorical(values)) => Ok(values),
            Some(Column::Numeric(_)) => Err(MetricsError::WrongKind {
                field,
                expected: FieldKind::Categorical,
            }),
            None => Err(MetricsError::MissingColumn(field)),
        }
    }
}
