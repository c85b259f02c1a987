use chrono::Weekday;

use queue_cell::estimator::{estimate, estimate_at, MAX_ESTIMATE_MINUTES, MIN_ESTIMATE_MINUTES};
use shared_utils::test_utils::test_doctor;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[test]
fn test_estimate_always_clamped_to_range() {
    let specializations = [
        "surgery",
        "psychiatry",
        "cardiology",
        "general",
        "dermatology",
        "unheard-of",
    ];
    let averages = [1, 5, 15, 30, 60, 240];
    let queue_lens = [0, 1, 3, 6, 11, 50];
    let jitters = [-2.0, 0.0, 2.0];

    for specialization in specializations {
        for average in averages {
            let doctor = test_doctor("docX", specialization, average, 50);
            for hour in 0..24 {
                for weekday in WEEKDAYS {
                    for queue_len in queue_lens {
                        for jitter in jitters {
                            let minutes =
                                estimate_at(&doctor, queue_len, hour, weekday, jitter);
                            assert!(
                                (MIN_ESTIMATE_MINUTES..=MAX_ESTIMATE_MINUTES)
                                    .contains(&minutes),
                                "estimate {} out of range for {} avg {} hour {} {:?} len {} jitter {}",
                                minutes, specialization, average, hour, weekday, queue_len, jitter
                            );
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn test_specialization_ordering() {
    // Baseline conditions: Tuesday mid-morning, empty queue, no jitter.
    let at = |specialization: &str| {
        let doctor = test_doctor("docX", specialization, 20, 50);
        estimate_at(&doctor, 0, 10, Weekday::Tue, 0.0)
    };

    assert!(at("surgery") > at("psychiatry"));
    assert!(at("psychiatry") > at("cardiology"));
    assert!(at("cardiology") > at("general"));
    assert!(at("general") > at("dermatology"));
}

#[test]
fn test_unknown_specialization_uses_neutral_factor() {
    let known = test_doctor("docX", "general", 20, 50);
    let unknown = test_doctor("docX", "astrology", 20, 50);

    assert_eq!(
        estimate_at(&known, 0, 10, Weekday::Tue, 0.0),
        estimate_at(&unknown, 0, 10, Weekday::Tue, 0.0)
    );
}

#[test]
fn test_neutral_conditions_return_base_average() {
    let doctor = test_doctor("docX", "general", 20, 50);
    assert_eq!(estimate_at(&doctor, 0, 10, Weekday::Tue, 0.0), 20);
}

#[test]
fn test_longer_queues_compress_estimates() {
    let doctor = test_doctor("docX", "general", 40, 50);
    let short = estimate_at(&doctor, 0, 10, Weekday::Tue, 0.0);
    let long = estimate_at(&doctor, 20, 10, Weekday::Tue, 0.0);

    assert!(long < short);
}

#[test]
fn test_weekends_run_slower_than_midweek() {
    let doctor = test_doctor("docX", "general", 30, 50);
    let tuesday = estimate_at(&doctor, 0, 10, Weekday::Tue, 0.0);
    let sunday = estimate_at(&doctor, 0, 10, Weekday::Sun, 0.0);

    assert!(sunday > tuesday);
}

#[test]
fn test_public_estimate_stays_in_range() {
    let doctor = test_doctor("docX", "surgery", 45, 50);
    for queue_len in 0..20 {
        let minutes = estimate(&doctor, queue_len);
        assert!((MIN_ESTIMATE_MINUTES..=MAX_ESTIMATE_MINUTES).contains(&minutes));
    }
}
