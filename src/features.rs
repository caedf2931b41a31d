//! Feature engineering: turns a validated ride into the fixed-order
//! numeric vector the linear model was trained against.
//!
//! Every constant in this module (scaling ranges, epoch reference,
//! district vocabulary, concatenation order) is part of the training
//! contract. Changing any of them without retraining silently corrupts
//! predictions, which is why the order lives in exactly one place,
//! `FeatureAssembler::new`, and is pinned by a regression test.

use chrono::{Datelike, Timelike};
use chrono_tz::America::New_York;
use geohash::Coord;

use crate::request::RideRequest;

/// Civil timezone the model was trained against.
const REFERENCE_TZ: chrono_tz::Tz = New_York;

/// 2009-01-01T00:00:00Z, the zero point of the ride-age feature.
const EPOCH_REFERENCE_UNIX: i64 = 1_230_768_000;
/// Span (days) the ride age is scaled by.
const AGE_SPAN_DAYS: f64 = 2090.0;

const PASSENGER_MIN: f64 = 1.0;
const PASSENGER_MAX: f64 = 8.0;

const EARTH_RADIUS_KM: f64 = 6371.0;
const DIST_MIN_KM: f64 = 0.0;
const DIST_MAX_KM: f64 = 100.0;

pub const GEOHASH_PRECISION: usize = 5;

/// The 20 most frequent precision-5 district geohashes, covering about
/// 99% of pickup and dropoff locations in the training data. The array
/// order is the one-hot column order, used once for pickup and again,
/// independently, for dropoff.
pub const DISTRICT_VOCABULARY: [&str; 20] = [
    "dr5ru", "dr5rs", "dr5rv", "dr72h", "dr72j", "dr5re", "dr5rk", "dr5rz",
    "dr5ry", "dr5rt", "dr5rg", "dr5x1", "dr5x0", "dr72m", "dr5rm", "dr5rx",
    "dr5x2", "dr5rw", "dr5rh", "dr5x8",
];

fn district_index(code: &str) -> Option<usize> {
    DISTRICT_VOCABULARY.iter().position(|d| *d == code)
}

/// The assembled feature vector. Fixed length for every request; the
/// length must equal the active artifact's weight count at inference.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// One feature sub-vector producer. The assembler owns the order in
/// which blocks run; each block appends exactly `width()` values.
pub trait FeatureBlock {
    fn width(&self) -> usize;
    fn encode(&self, ride: &RideRequest, out: &mut Vec<f64>);
}

/// Appends a one-hot row of `width` columns. An out-of-domain index
/// fails closed to an all-zero row so the feature width never varies.
fn push_one_hot(out: &mut Vec<f64>, index: Option<usize>, width: usize) {
    let start = out.len();
    out.resize(start + width, 0.0);
    if let Some(i) = index {
        if i < width {
            out[start + i] = 1.0;
        }
    }
}

/// Passenger count, min-max scaled to the training range. No clamping:
/// counts outside [1, 8] extrapolate linearly.
pub struct PassengerFeatureEncoder;

impl FeatureBlock for PassengerFeatureEncoder {
    fn width(&self) -> usize {
        1
    }

    fn encode(&self, ride: &RideRequest, out: &mut Vec<f64>) {
        let count = ride.passenger_count as f64;
        out.push((count - PASSENGER_MIN) / (PASSENGER_MAX - PASSENGER_MIN));
    }
}

/// Cyclical hour, weekday and month one-hots, and scaled ride age, all
/// derived from the pickup instant viewed in the reference timezone.
pub struct TimeFeatureEncoder;

impl FeatureBlock for TimeFeatureEncoder {
    fn width(&self) -> usize {
        2 + 7 + 12 + 1
    }

    fn encode(&self, ride: &RideRequest, out: &mut Vec<f64>) {
        let local = ride.pickup_datetime.with_timezone(&REFERENCE_TZ);

        // Sine/cosine pair avoids the false 23h -> 0h discontinuity.
        let angle = 2.0 * std::f64::consts::PI / 24.0 * local.hour() as f64;
        out.push(angle.sin());
        out.push(angle.cos());

        // Monday = 0 .. Sunday = 6.
        let weekday = local.weekday().num_days_from_monday() as usize;
        push_one_hot(out, Some(weekday), 7);

        // Months are 1..=12; column 0 is January.
        let month = local.month() as usize;
        push_one_hot(out, month.checked_sub(1), 12);

        let age_days =
            (ride.pickup_datetime.timestamp() - EPOCH_REFERENCE_UNIX) as f64 / 86_400.0;
        out.push(age_days / AGE_SPAN_DAYS);
    }
}

/// Haversine and grid distances between pickup and dropoff, min-max
/// scaled to the training range. No clamping here either.
pub struct DistanceFeatureEncoder;

impl DistanceFeatureEncoder {
    /// Returns (haversine_km, grid_km) on a spherical Earth.
    pub fn distances_km(ride: &RideRequest) -> (f64, f64) {
        let lat1 = ride.pickup_latitude.to_radians();
        let lon1 = ride.pickup_longitude.to_radians();
        let lat2 = ride.dropoff_latitude.to_radians();
        let lon2 = ride.dropoff_longitude.to_radians();

        let dlat = lat2 - lat1;
        let dlon = lon2 - lon1;

        let grid_km = (dlat.abs() + dlon.abs()) * EARTH_RADIUS_KM;

        let a = (dlat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        // sqrt can drift a hair above 1.0 near antipodal points.
        let haversine_km = 2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin();

        (haversine_km, grid_km)
    }
}

impl FeatureBlock for DistanceFeatureEncoder {
    fn width(&self) -> usize {
        2
    }

    fn encode(&self, ride: &RideRequest, out: &mut Vec<f64>) {
        let (haversine_km, grid_km) = Self::distances_km(ride);
        out.push((haversine_km - DIST_MIN_KM) / (DIST_MAX_KM - DIST_MIN_KM));
        out.push((grid_km - DIST_MIN_KM) / (DIST_MAX_KM - DIST_MIN_KM));
    }
}

/// Buckets each endpoint into a precision-5 geohash district and
/// one-hot encodes it against the vocabulary. A district outside the
/// vocabulary is a known-unknown location and yields an all-zero row.
pub struct GeoDistrictEncoder;

impl GeoDistrictEncoder {
    fn district(latitude: f64, longitude: f64) -> Option<String> {
        geohash::encode(
            Coord {
                x: longitude,
                y: latitude,
            },
            GEOHASH_PRECISION,
        )
        .ok()
    }
}

impl FeatureBlock for GeoDistrictEncoder {
    fn width(&self) -> usize {
        2 * DISTRICT_VOCABULARY.len()
    }

    fn encode(&self, ride: &RideRequest, out: &mut Vec<f64>) {
        let pickup = Self::district(ride.pickup_latitude, ride.pickup_longitude);
        push_one_hot(
            out,
            pickup.as_deref().and_then(district_index),
            DISTRICT_VOCABULARY.len(),
        );

        let dropoff = Self::district(ride.dropoff_latitude, ride.dropoff_longitude);
        push_one_hot(
            out,
            dropoff.as_deref().and_then(district_index),
            DISTRICT_VOCABULARY.len(),
        );
    }
}

/// Runs the encoders in the contract order and concatenates their
/// output: passenger scalar, time tuple, distance pair, pickup and
/// dropoff district one-hots. This order matches the column order the
/// model was trained against; it is defined here and nowhere else.
pub struct FeatureAssembler {
    blocks: Vec<Box<dyn FeatureBlock + Send + Sync>>,
}

impl FeatureAssembler {
    pub fn new() -> Self {
        Self {
            blocks: vec![
                Box::new(PassengerFeatureEncoder),
                Box::new(TimeFeatureEncoder),
                Box::new(DistanceFeatureEncoder),
                Box::new(GeoDistrictEncoder),
            ],
        }
    }

    /// Total feature width, constant across all requests.
    pub fn width(&self) -> usize {
        self.blocks.iter().map(|b| b.width()).sum()
    }

    pub fn assemble(&self, ride: &RideRequest) -> FeatureVector {
        let mut out = Vec::with_capacity(self.width());
        for block in &self.blocks {
            block.encode(ride, &mut out);
        }
        debug_assert_eq!(out.len(), self.width());
        FeatureVector(out)
    }
}

impl Default for FeatureAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    const EPS: f64 = 1e-9;

    fn ride(
        ts: DateTime<Utc>,
        pickup: (f64, f64),
        dropoff: (f64, f64),
        passengers: u32,
    ) -> RideRequest {
        RideRequest::new(ts, pickup.0, pickup.1, dropoff.0, dropoff.1, passengers).unwrap()
    }

    // 19:18 EDT on Sunday 2014-07-06.
    fn reference_ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2014, 7, 6, 23, 18, 0).unwrap()
    }

    #[test]
    fn width_is_constant_at_65() {
        let assembler = FeatureAssembler::new();
        assert_eq!(assembler.width(), 65);

        let inputs = [
            ride(reference_ts(), (40.7128, -74.0060), (40.7831, -73.9712), 1),
            ride(reference_ts(), (48.8566, 2.3522), (48.8606, 2.3376), 4),
            ride(reference_ts(), (-33.8688, 151.2093), (-33.8688, 151.2093), 8),
        ];
        for r in &inputs {
            assert_eq!(assembler.assemble(r).len(), 65);
        }
    }

    #[test]
    fn feature_order_contract() {
        // Pins the exact column layout the model was trained against.
        // If this test starts failing, the artifact must be retrained,
        // not the test adjusted.
        let assembler = FeatureAssembler::new();
        let r = ride(
            reference_ts(),
            (40.783282, -73.950655),
            (40.769802, -73.984365),
            2,
        );
        let v = assembler.assemble(&r);
        let v = v.as_slice();

        // [0] passenger: (2 - 1) / 7
        assert!((v[0] - 1.0 / 7.0).abs() < EPS);

        // [1..3] cyclical hour for 19:00 local
        assert!((v[1] - (-0.9659258262890684)).abs() < EPS);
        assert!((v[2] - 0.2588190451025203).abs() < EPS);

        // [3..10] weekday one-hot: Sunday -> column 6
        assert_eq!(&v[3..10], &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);

        // [10..22] month one-hot: July -> column 6
        let month: &[f64] = &v[10..22];
        assert_eq!(month.iter().sum::<f64>(), 1.0);
        assert_eq!(month[6], 1.0);

        // [22] ride age: 2012.970833... days / 2090
        assert!((v[22] - 0.9631439393939394).abs() < EPS);

        // [23..25] scaled haversine and grid distances
        assert!((v[23] - 0.03209961648240229).abs() < EPS);
        assert!((v[24] - 0.05247288588356615).abs() < EPS);

        // [25..45] pickup district dr72j -> column 4
        assert_eq!(v[25 + 4], 1.0);
        assert_eq!(v[25..45].iter().sum::<f64>(), 1.0);

        // [45..65] dropoff district dr5ru -> column 0
        assert_eq!(v[45], 1.0);
        assert_eq!(v[45..65].iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn zero_distance_when_pickup_equals_dropoff() {
        let r = ride(reference_ts(), (40.7128, -74.0060), (40.7128, -74.0060), 1);
        let (haversine, grid) = DistanceFeatureEncoder::distances_km(&r);
        assert_eq!(haversine, 0.0);
        assert_eq!(grid, 0.0);
        assert!(!haversine.is_nan());
    }

    #[test]
    fn haversine_is_symmetric() {
        let a = (40.783282, -73.950655);
        let b = (40.769802, -73.984365);
        let there = DistanceFeatureEncoder::distances_km(&ride(reference_ts(), a, b, 1));
        let back = DistanceFeatureEncoder::distances_km(&ride(reference_ts(), b, a, 1));
        assert!((there.0 - back.0).abs() < EPS);
        assert!((there.1 - back.1).abs() < EPS);
    }

    #[test]
    fn distances_are_not_clamped() {
        // New York to Sydney is far beyond the 100 km training range;
        // the scaled value passes through above 1.0.
        let r = ride(
            reference_ts(),
            (40.7128, -74.0060),
            (-33.8688, 151.2093),
            1,
        );
        let mut out = Vec::new();
        DistanceFeatureEncoder.encode(&r, &mut out);
        assert!(out[0] > 1.0);
        assert!(out[1] > 1.0);
    }

    #[test]
    fn district_row_sums_are_zero_or_one() {
        let mut out = Vec::new();
        // Midtown pickup is in the vocabulary, Paris dropoff is not.
        let r = ride(reference_ts(), (40.7590, -73.9845), (48.8566, 2.3522), 1);
        GeoDistrictEncoder.encode(&r, &mut out);
        let (pickup_row, dropoff_row) = out.split_at(DISTRICT_VOCABULARY.len());
        assert_eq!(pickup_row.iter().sum::<f64>(), 1.0);
        assert_eq!(dropoff_row.iter().sum::<f64>(), 0.0);
    }

    #[test]
    fn weekday_and_month_rows_sum_to_one() {
        let timestamps = [
            Utc.with_ymd_and_hms(2009, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2014, 12, 31, 23, 59, 59).unwrap(),
            Utc.with_ymd_and_hms(2020, 2, 29, 12, 0, 0).unwrap(),
        ];
        for ts in timestamps {
            let mut out = Vec::new();
            let r = ride(ts, (40.7128, -74.0060), (40.7831, -73.9712), 1);
            TimeFeatureEncoder.encode(&r, &mut out);
            assert_eq!(out[2..9].iter().sum::<f64>(), 1.0, "weekday row for {ts}");
            assert_eq!(out[9..21].iter().sum::<f64>(), 1.0, "month row for {ts}");
        }
    }

    #[test]
    fn passenger_scaling_extrapolates() {
        let encoder = PassengerFeatureEncoder;
        let mut out = Vec::new();
        encoder.encode(
            &ride(reference_ts(), (40.7, -74.0), (40.7, -74.0), 1),
            &mut out,
        );
        encoder.encode(
            &ride(reference_ts(), (40.7, -74.0), (40.7, -74.0), 15),
            &mut out,
        );
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 2.0);
    }
}
