use chrono::{Datelike, Local, Timelike, Weekday};
use rand::Rng;

use shared_models::Doctor;

pub const MIN_ESTIMATE_MINUTES: i64 = 5;
pub const MAX_ESTIMATE_MINUTES: i64 = 60;

/// Estimate a consultation length in minutes for a patient joining now.
///
/// The value is computed once at enqueue time and frozen on the entry.
pub fn estimate(doctor: &Doctor, queue_len: i64) -> i64 {
    let now = Local::now();
    let jitter = rand::thread_rng().gen_range(-2.0..=2.0);
    estimate_at(doctor, queue_len, now.hour(), now.weekday(), jitter)
}

/// Deterministic core of the estimate: base average scaled by the factor
/// chain, plus jitter, clamped to [MIN, MAX] and rounded.
pub fn estimate_at(
    doctor: &Doctor,
    queue_len: i64,
    hour: u32,
    weekday: Weekday,
    jitter: f64,
) -> i64 {
    let base = doctor.average_consultation_minutes as f64;
    let raw = base
        * specialization_factor(&doctor.specialization)
        * time_of_day_factor(hour)
        * day_of_week_factor(weekday)
        * queue_length_factor(queue_len)
        * experience_factor(&doctor.id)
        + jitter;

    (raw.round() as i64).clamp(MIN_ESTIMATE_MINUTES, MAX_ESTIMATE_MINUTES)
}

fn specialization_factor(specialization: &str) -> f64 {
    match specialization.to_lowercase().as_str() {
        "surgery" => 1.5,
        "psychiatry" => 1.3,
        "cardiology" => 1.15,
        "general" => 1.0,
        "dermatology" => 0.85,
        _ => 1.0,
    }
}

// Mid-day is the efficient baseline; edges of the day run slower.
fn time_of_day_factor(hour: u32) -> f64 {
    match hour {
        6..=8 => 1.1,
        9..=11 => 1.0,
        12..=13 => 1.05,
        14..=16 => 1.0,
        17..=19 => 1.15,
        _ => 1.2,
    }
}

fn day_of_week_factor(weekday: Weekday) -> f64 {
    match weekday {
        Weekday::Tue | Weekday::Wed | Weekday::Thu => 1.0,
        Weekday::Mon | Weekday::Fri => 1.1,
        Weekday::Sat | Weekday::Sun => 1.2,
    }
}

// Longer queues slightly compress estimates.
fn queue_length_factor(queue_len: i64) -> f64 {
    match queue_len {
        0..=2 => 1.0,
        3..=5 => 0.95,
        6..=10 => 0.9,
        _ => 0.85,
    }
}

fn experience_factor(doctor_id: &str) -> f64 {
    match doctor_id {
        "doc2" => 0.9,
        "doc3" => 1.1,
        _ => 1.0,
    }
}
