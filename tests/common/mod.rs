//! Seeded demo data shared by the integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use contact_gallery::core::{Entry, UNKNOWN_GROUP};

pub fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// A (1h old) and B (2d old) share a contact; C is 40d old and unclassified.
pub fn scenario(now: DateTime<Utc>) -> (Entry, Entry, Entry) {
    (
        Entry::new("/images/IMG-20240601-WA0001.jpg", now - Duration::hours(1), "WA0001"),
        Entry::new("/images/IMG-20240530-WA0001.jpg", now - Duration::days(2), "WA0001"),
        Entry::new("/images/camera_roll.png", now - Duration::days(40), UNKNOWN_GROUP),
    )
}

/// Deterministic demo library: `contacts` contacts with `per_contact`
/// images each, spread over roughly two months, plus a few unclassified shots.
pub fn seeded_entries(now: DateTime<Utc>, contacts: u32, per_contact: u32) -> Vec<Entry> {
    let mut entries = Vec::new();
    // Small LCG so the spread looks irregular but never changes between runs
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let mut next_age = move || {
        state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        Duration::minutes(((state >> 33) % (60 * 24 * 60)) as i64)
    };

    for contact in 1..=contacts {
        let key = format!("WA{:04}", contact);
        for image in 0..per_contact {
            let path = format!("/images/IMG-{}-{}-{}.jpg", contact, image, key);
            entries.push(Entry::new(path, now - next_age(), key.clone()));
        }
    }

    for image in 0..3 {
        entries.push(Entry::new(
            format!("/images/Screenshot_{}.png", image),
            now - next_age(),
            UNKNOWN_GROUP,
        ));
    }

    entries
}
