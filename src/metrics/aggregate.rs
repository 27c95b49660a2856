//! Counts, means, ratios and frequency tables over the bookings table.
//!
//! Every function here is pure: it borrows the table and returns a fresh value.

use std::collections::{BTreeMap, HashMap};

use crate::domain::{BookingTable, Field};
use crate::error::MetricsError;

/// Number of rows.
pub fn count(table: &BookingTable) -> usize {
    table.len()
}

/// Arithmetic mean of a numeric column, skipping missing (`NaN`) cells.
///
/// Returns `Ok(None)` when there is nothing to average (empty table or an
/// all-missing column).
pub fn mean(table: &BookingTable, field: Field) -> Result<Option<f64>, MetricsError> {
    let values = table.numeric(field)?;
    Ok(mean_of(values.iter().copied()))
}

/// Percentage of rows whose `field` value satisfies `predicate`.
///
/// Missing cells count towards the denominator but never satisfy the predicate.
pub fn ratio_pct(
    table: &BookingTable,
    field: Field,
    predicate: impl Fn(f64) -> bool,
) -> Result<f64, MetricsError> {
    let values = table.numeric(field)?;
    if values.is_empty() {
        return Err(MetricsError::EmptyTable);
    }
    let hits = values.iter().filter(|v| v.is_finite() && predicate(**v)).count();
    Ok(100.0 * hits as f64 / values.len() as f64)
}

/// Share of canceled bookings, in percent, rounded to 2 decimals.
pub fn cancellation_rate(table: &BookingTable) -> Result<f64, MetricsError> {
    let pct = ratio_pct(table, Field::IsCanceled, |v| v != 0.0)?;
    Ok(round_to(pct, 2))
}

/// Frequency of each category, most frequent first.
///
/// Ties keep the order in which categories first appear. Missing cells are
/// not counted.
pub fn value_counts(table: &BookingTable, field: Field) -> Result<Vec<(String, usize)>, MetricsError> {
    let values = table.categorical(field)?;
    Ok(counts_in_order(values.iter().filter_map(|v| v.as_deref())))
}

/// The `n` most frequent categories (see [`value_counts`] for ordering).
pub fn top_n(table: &BookingTable, field: Field, n: usize) -> Result<Vec<(String, usize)>, MetricsError> {
    let mut counts = value_counts(table, field)?;
    counts.truncate(n);
    Ok(counts)
}

/// Mean of `value` per category of `group`, categories in ascending order.
///
/// Categories whose values are all missing are left out.
pub fn mean_by(
    table: &BookingTable,
    group: Field,
    value: Field,
) -> Result<Vec<(String, f64)>, MetricsError> {
    let keys = table.categorical(group)?;
    let values = table.numeric(value)?;

    let mut acc: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for (key, v) in keys.iter().zip(values) {
        let Some(key) = key.as_deref() else { continue };
        let entry = acc.entry(key).or_insert((0.0, 0));
        if v.is_finite() {
            entry.0 += v;
            entry.1 += 1;
        }
    }

    Ok(acc
        .into_iter()
        .filter(|(_, (_, n))| *n > 0)
        .map(|(k, (sum, n))| (k.to_string(), sum / n as f64))
        .collect())
}

/// Value counts of `inner` within each category of `outer`.
///
/// Outer categories are ascending; inner counts follow [`value_counts`]
/// ordering. Rows missing either label are skipped.
pub fn counts_by(
    table: &BookingTable,
    outer: Field,
    inner: Field,
) -> Result<Vec<(String, Vec<(String, usize)>)>, MetricsError> {
    let outer_values = table.categorical(outer)?;
    let inner_values = table.categorical(inner)?;

    let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (o, i) in outer_values.iter().zip(inner_values) {
        if let (Some(o), Some(i)) = (o.as_deref(), i.as_deref()) {
            groups.entry(o).or_default().push(i);
        }
    }

    Ok(groups
        .into_iter()
        .map(|(k, members)| (k.to_string(), counts_in_order(members.into_iter())))
        .collect())
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

pub(crate) fn mean_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { None } else { Some(sum / n as f64) }
}

fn counts_in_order<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for label in labels {
        match index.get(label) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(label, counts.len());
                counts.push((label.to_string(), 1));
            }
        }
    }
    // Stable sort keeps first-seen order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BookingRecord;

    fn booking(hotel: &str, adr: f64, canceled: bool) -> BookingRecord {
        BookingRecord {
            hotel: hotel.to_string(),
            adr,
            is_canceled: canceled,
            ..BookingRecord::default()
        }
    }

    #[test]
    fn count_matches_row_sequence() {
        let table = BookingTable::from_records(&vec![BookingRecord::default(); 7]);
        assert_eq!(count(&table), 7);
        assert_eq!(count(&BookingTable::from_records(&[])), 0);
    }

    #[test]
    fn mean_is_arithmetic_average() {
        let table = BookingTable::from_records(&[
            booking("A", 10.0, false),
            booking("A", 20.0, false),
            booking("B", 60.0, false),
        ]);
        assert_eq!(mean(&table, Field::Adr).unwrap(), Some(30.0));
    }

    #[test]
    fn mean_skips_missing_and_reports_undefined_when_empty() {
        let mut rows = vec![BookingRecord::default(); 2];
        rows[0].children = f64::NAN;
        rows[1].children = 2.0;
        let table = BookingTable::from_records(&rows);
        assert_eq!(mean(&table, Field::Children).unwrap(), Some(2.0));

        let empty = BookingTable::from_records(&[]);
        assert_eq!(mean(&empty, Field::Adr).unwrap(), None);
    }

    #[test]
    fn cancellation_rate_two_of_three() {
        let table = BookingTable::from_records(&[
            booking("A", 0.0, true),
            booking("A", 0.0, false),
            booking("A", 0.0, true),
        ]);
        assert_eq!(cancellation_rate(&table).unwrap(), 66.67);
    }

    #[test]
    fn cancellation_rate_bounded_and_guarded() {
        let all = BookingTable::from_records(&[booking("A", 0.0, true), booking("B", 0.0, true)]);
        assert_eq!(cancellation_rate(&all).unwrap(), 100.0);

        let none = BookingTable::from_records(&[booking("A", 0.0, false)]);
        assert_eq!(cancellation_rate(&none).unwrap(), 0.0);

        let empty = BookingTable::from_records(&[]);
        assert_eq!(cancellation_rate(&empty).unwrap_err(), MetricsError::EmptyTable);
    }

    #[test]
    fn mean_by_hotel_matches_example() {
        let table = BookingTable::from_records(&[
            booking("Resort", 100.0, false),
            booking("City", 150.0, false),
            booking("Resort", 200.0, false),
        ]);
        let by_hotel = mean_by(&table, Field::Hotel, Field::Adr).unwrap();
        assert_eq!(
            by_hotel,
            vec![("City".to_string(), 150.0), ("Resort".to_string(), 150.0)]
        );
    }

    #[test]
    fn top_n_sorted_desc_with_first_seen_ties() {
        let rooms = ["B", "A", "C", "A", "B", "D", "C"];
        let rows: Vec<BookingRecord> = rooms
            .iter()
            .map(|r| BookingRecord {
                reserved_room_type: r.to_string(),
                ..BookingRecord::default()
            })
            .collect();
        let table = BookingTable::from_records(&rows);

        let top = top_n(&table, Field::ReservedRoomType, 3).unwrap();
        assert_eq!(
            top,
            vec![("B".to_string(), 2), ("A".to_string(), 2), ("C".to_string(), 2)]
        );
        assert!(top.iter().map(|(_, n)| n).sum::<usize>() <= count(&table));

        let all = value_counts(&table, Field::ReservedRoomType).unwrap();
        assert_eq!(all.last(), Some(&("D".to_string(), 1)));
        assert!(top_n(&table, Field::ReservedRoomType, 0).unwrap().is_empty());
    }

    #[test]
    fn value_counts_skip_missing_categories() {
        let rows = vec![
            BookingRecord { country: None, ..BookingRecord::default() },
            BookingRecord { country: Some("GBR".to_string()), ..BookingRecord::default() },
        ];
        let table = BookingTable::from_records(&rows);
        assert_eq!(
            value_counts(&table, Field::Country).unwrap(),
            vec![("GBR".to_string(), 1)]
        );
    }

    #[test]
    fn counts_by_groups_outer_then_ranks_inner() {
        let rows: Vec<BookingRecord> = [
            ("Transient", "City"),
            ("Group", "Resort"),
            ("Transient", "Resort"),
            ("Transient", "Resort"),
        ]
        .iter()
        .map(|(c, h)| BookingRecord {
            customer_type: c.to_string(),
            hotel: h.to_string(),
            ..BookingRecord::default()
        })
        .collect();
        let table = BookingTable::from_records(&rows);

        let grouped = counts_by(&table, Field::CustomerType, Field::Hotel).unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, "Group");
        assert_eq!(grouped[1].0, "Transient");
        assert_eq!(
            grouped[1].1,
            vec![("Resort".to_string(), 2), ("City".to_string(), 1)]
        );
    }

    #[test]
    fn wrong_kind_is_reported() {
        let table = BookingTable::from_records(&[BookingRecord::default()]);
        assert!(matches!(
            mean(&table, Field::Hotel),
            Err(MetricsError::WrongKind { .. })
        ));
        assert!(matches!(
            value_counts(&table, Field::Adr),
            Err(MetricsError::WrongKind { .. })
        ));
    }

    #[test]
    fn round_to_two_places() {
        assert_eq!(round_to(200.0 / 3.0, 2), 66.67);
        assert_eq!(round_to(1.005_f64 * 1000.0, 0), 1005.0);
    }
}
