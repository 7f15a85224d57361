//! First-run sample data
//!
//! A fresh install opens with three clients so the admin panel has
//! something to show: one active, one expiring within the reminder window,
//! one already expired. Expiry dates are relative to the day of seeding.

use chrono::{Duration, Local, NaiveDate};
use clientdb_core::{timestamp_now, ClientRecord, ClientStatus, Record};

fn date(today: NaiveDate, offset_days: i64) -> String {
    (today + Duration::days(offset_days))
        .format("%Y-%m-%d")
        .to_string()
}

/// Sample clients written when `clients.json` is missing
pub fn sample_clients() -> Vec<ClientRecord> {
    sample_clients_on(Local::now().date_naive())
}

/// Sample clients with expiries relative to `today`
pub fn sample_clients_on(today: NaiveDate) -> Vec<ClientRecord> {
    let now = timestamp_now();
    let samples = [
        (
            "María García",
            "+5491123456789",
            "Netflix",
            "Premium",
            30,
            ClientStatus::Active,
        ),
        (
            "José Rodríguez",
            "+5491198765432",
            "Spotify",
            "Familiar",
            3,
            ClientStatus::Expiring,
        ),
        (
            "Ana Martínez",
            "+5491155554444",
            "Disney+",
            "Standard",
            -5,
            ClientStatus::Expired,
        ),
    ];

    samples
        .into_iter()
        .zip(1..)
        .map(|((name, phone, service, plan, offset, status), id)| {
            let mut client = ClientRecord::new(name, phone, service, date(today, offset))
                .with_plan(plan)
                .with_status(status)
                .with_last_payment(date(today, offset - 30));
            client.set_id(id);
            client.stamp_created(now);
            client
        })
        .collect()
}
