//! Pearson correlation matrix over numeric columns.

use nalgebra::DMatrix;

use crate::domain::{BookingTable, Field};
use crate::error::MetricsError;

/// Symmetric correlation matrix. `NaN` cells are undefined (constant column or
/// fewer than two paired observations).
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub fields: Vec<Field>,
    pub values: DMatrix<f64>,
}

impl CorrelationMatrix {
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        let v = *self.values.get((i, j))?;
        v.is_finite().then_some(v)
    }

    pub fn labels(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name().to_string()).collect()
    }

    /// Rows of `Option` cells, for serialization.
    pub fn to_rows(&self) -> Vec<Vec<Option<f64>>> {
        let n = self.fields.len();
        (0..n).map(|i| (0..n).map(|j| self.get(i, j)).collect()).collect()
    }
}

/// Pairwise correlation of `fields`.
///
/// Each pair uses only rows where both values are present.
pub fn correlation_matrix(table: &BookingTable, fields: &[Field]) -> Result<CorrelationMatrix, MetricsError> {
    let columns = fields
        .iter()
        .map(|f| table.numeric(*f))
        .collect::<Result<Vec<_>, _>>()?;

    let n = fields.len();
    let mut values = DMatrix::from_element(n, n, f64::NAN);
    for i in 0..n {
        for j in i..n {
            let r = if i == j {
                // Exactly 1 unless the column is constant or too short.
                pearson(columns[i], columns[i]).signum()
            } else {
                pearson(columns[i], columns[j])
            };
            values[(i, j)] = r;
            values[(j, i)] = r;
        }
    }

    Ok(CorrelationMatrix {
        fields: fields.to_vec(),
        values,
    })
}

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| (*x, *y))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookingRecord, CORRELATION_FIELDS};

    fn sample_table() -> BookingTable {
        let rows: Vec<BookingRecord> = (0..12)
            .map(|i| {
                let i = i as f64;
                BookingRecord {
                    lead_time: i * 10.0,
                    adr: 80.0 + (i * 7.0) % 13.0,
                    stays_in_weekend_nights: i % 3.0,
                    stays_in_week_nights: 5.0 - i % 4.0,
                    adults: 1.0 + i % 2.0,
                    children: if i == 3.0 { f64::NAN } else { i % 2.0 },
                    babies: 0.0,
                    previous_cancellations: (i / 4.0).floor(),
                    ..BookingRecord::default()
                }
            })
            .collect();
        BookingTable::from_records(&rows)
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let table = sample_table();
        let corr = correlation_matrix(&table, &CORRELATION_FIELDS).unwrap();
        let n = CORRELATION_FIELDS.len();
        assert_eq!(corr.values.shape(), (n, n));

        for i in 0..n {
            for j in 0..n {
                assert_eq!(corr.get(i, j), corr.get(j, i));
            }
        }

        let babies = CORRELATION_FIELDS.iter().position(|f| *f == Field::Babies).unwrap();
        for i in 0..n {
            if i == babies {
                // Constant column.
                assert_eq!(corr.get(i, i), None);
            } else {
                assert!((corr.get(i, i).unwrap() - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn perfectly_linear_columns_correlate_to_one() {
        let rows: Vec<BookingRecord> = (0..5)
            .map(|i| BookingRecord {
                lead_time: i as f64,
                adr: 50.0 + 2.0 * i as f64,
                adults: 10.0 - i as f64,
                ..BookingRecord::default()
            })
            .collect();
        let table = BookingTable::from_records(&rows);
        let corr = correlation_matrix(&table, &[Field::LeadTime, Field::Adr, Field::Adults]).unwrap();
        assert!((corr.get(0, 1).unwrap() - 1.0).abs() < 1e-12);
        assert!((corr.get(0, 2).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(corr.labels(), vec!["lead_time", "adr", "adults"]);
    }

    #[test]
    fn missing_field_fails_whole_matrix() {
        let table = BookingTable::default();
        assert_eq!(
            correlation_matrix(&table, &[Field::Adr]).unwrap_err(),
            MetricsError::MissingColumn(Field::Adr)
        );
    }
}
