//! Synthetic booking generation.
//!
//! Produces a plausible hotel-bookings CSV with the full schema so the
//! dashboard can be demoed and smoke-tested without the real dataset. Output is
//! deterministic for a given seed.

use std::path::Path;

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{Exp, Normal};

use crate::domain::{BookingRecord, Field};
use crate::error::AppError;

const HOTELS: [(&str, f64); 2] = [("City Hotel", 0.66), ("Resort Hotel", 0.34)];

const COUNTRIES: [(&str, f64); 12] = [
    ("PRT", 0.41),
    ("GBR", 0.10),
    ("FRA", 0.09),
    ("ESP", 0.07),
    ("DEU", 0.06),
    ("ITA", 0.03),
    ("IRL", 0.03),
    ("BEL", 0.02),
    ("BRA", 0.02),
    ("NLD", 0.02),
    ("USA", 0.02),
    ("CHE", 0.01),
];

const CUSTOMER_TYPES: [(&str, f64); 4] = [
    ("Transient", 0.75),
    ("Transient-Party", 0.21),
    ("Contract", 0.03),
    ("Group", 0.01),
];

const ROOM_TYPES: [(&str, f64); 8] = [
    ("A", 0.72),
    ("D", 0.16),
    ("E", 0.055),
    ("F", 0.025),
    ("G", 0.018),
    ("B", 0.01),
    ("C", 0.008),
    ("H", 0.005),
];

/// Longest lead time in the source data (days).
const MAX_LEAD_TIME: f64 = 737.0;

/// Generate `count` bookings from `seed`.
pub fn generate_bookings(count: usize, seed: u64) -> Result<Vec<BookingRecord>, AppError> {
    if count == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let hotels = Picker::new(&HOTELS)?;
    let countries = Picker::new(&COUNTRIES)?;
    let customers = Picker::new(&CUSTOMER_TYPES)?;
    let rooms = Picker::new(&ROOM_TYPES)?;

    let lead = Exp::new(1.0_f64 / 95.0).map_err(|e| AppError::new(4, format!("Lead-time distribution error: {e}")))?;
    let noise = Normal::new(0.0_f64, 1.0).map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let hotel = hotels.pick(&mut rng);
        let is_city = hotel == "City Hotel";

        let lead_time = lead.sample(&mut rng).round().min(MAX_LEAD_TIME);

        // City rates sit higher and are less seasonal than resort rates.
        let (base, spread) = if is_city { (105.0, 30.0) } else { (95.0, 55.0) };
        let adr = (base + spread * noise.sample(&mut rng)).max(0.0);
        let adr = (adr * 100.0).round() / 100.0;

        // Cancellation odds rise with lead time.
        let p_cancel = (if is_city { 0.25 } else { 0.15 }) + 0.45 * (lead_time / 400.0).min(1.0);
        let is_canceled = rng.r#gen::<f64>() < p_cancel;

        let children = if rng.r#gen::<f64>() < 0.001 {
            f64::NAN
        } else if rng.r#gen::<f64>() < 0.07 {
            rng.gen_range(1..=2) as f64
        } else {
            0.0
        };

        out.push(BookingRecord {
            hotel: hotel.to_string(),
            country: (rng.r#gen::<f64>() >= 0.004).then(|| countries.pick(&mut rng).to_string()),
            customer_type: customers.pick(&mut rng).to_string(),
            lead_time,
            adr,
            stays_in_weekend_nights: rng.gen_range(0..=4) as f64,
            stays_in_week_nights: rng.gen_range(0..=7) as f64,
            adults: rng.gen_range(1..=3) as f64,
            children,
            babies: if rng.r#gen::<f64>() < 0.008 { 1.0 } else { 0.0 },
            is_canceled,
            previous_cancellations: if rng.r#gen::<f64>() < 0.05 {
                rng.gen_range(1..=3) as f64
            } else {
                0.0
            },
            reserved_room_type: rooms.pick(&mut rng).to_string(),
        });
    }

    Ok(out)
}

/// Write a synthetic bookings CSV. Missing values use the `NA`/`NULL` tokens
/// the real dataset uses.
pub fn write_sample_csv(path: &Path, count: usize, seed: u64) -> Result<usize, AppError> {
    let bookings = generate_bookings(count, seed)?;

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create sample CSV '{}': {e}", path.display())))?;

    writer
        .write_record(Field::ALL.iter().map(|f| f.name()))
        .map_err(|e| AppError::new(2, format!("Failed to write sample CSV header: {e}")))?;

    for b in &bookings {
        writer
            .write_record(Field::ALL.iter().map(|f| cell(b, *f)))
            .map_err(|e| AppError::new(2, format!("Failed to write sample CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush sample CSV: {e}")))?;

    tracing::info!(path = %path.display(), rows = bookings.len(), seed, "wrote synthetic sample");
    Ok(bookings.len())
}

fn cell(b: &BookingRecord, field: Field) -> String {
    let num = |v: f64| if v.is_finite() { format!("{v}") } else { "NA".to_string() };
    match field {
        Field::Hotel => b.hotel.clone(),
        Field::Country => b.country.clone().unwrap_or_else(|| "NULL".to_string()),
        Field::CustomerType => b.customer_type.clone(),
        Field::ReservedRoomType => b.reserved_room_type.clone(),
        Field::LeadTime => num(b.lead_time),
        Field::Adr => num(b.adr),
        Field::StaysInWeekendNights => num(b.stays_in_weekend_nights),
        Field::StaysInWeekNights => num(b.stays_in_week_nights),
        Field::Adults => num(b.adults),
        Field::Children => num(b.children),
        Field::Babies => num(b.babies),
        Field::IsCanceled => (if b.is_canceled { "1" } else { "0" }).to_string(),
        Field::PreviousCancellations => num(b.previous_cancellations),
    }
}

/// Weighted choice over a fixed label table.
struct Picker<'a> {
    labels: Vec<&'a str>,
    index: WeightedIndex<f64>,
}

impl<'a> Picker<'a> {
    fn new(table: &[(&'a str, f64)]) -> Result<Self, AppError> {
        let index = WeightedIndex::new(table.iter().map(|(_, w)| *w))
            .map_err(|e| AppError::new(4, format!("Invalid category weights: {e}")))?;
        Ok(Self {
            labels: table.iter().map(|(l, _)| *l).collect(),
            index,
        })
    }

    fn pick(&self, rng: &mut StdRng) -> &'a str {
        self.labels[self.index.sample(rng)]
    }
}
