//! Test data helpers
//!
//! Builders for participant rows and attractions, with generated names and
//! e-mails where the exact values do not matter.

use chrono::{DateTime, Duration, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use rand::Rng;
use serde_json::{json, Value};

use BlocoCheckin::models::{Attraction, AttractionKind, ParticipantRow, ParticipantStatus};
use BlocoCheckin::utils::helpers::mask_cpf;

/// Random formatted CPF
pub fn random_cpf() -> String {
    let mut rng = rand::thread_rng();
    let digits: String = (0..11).map(|_| char::from(b'0' + rng.gen_range(0..10u8))).collect();
    mask_cpf(&digits)
}

/// Registered participant row with generated personal data
pub fn registered_row(unit: &str) -> ParticipantRow {
    ParticipantRow {
        name: Name().fake(),
        email: SafeEmail().fake(),
        phone: "(81) 99999-0000".to_string(),
        cpf: random_cpf(),
        unit: unit.to_string(),
        status: Some(ParticipantStatus::Registered),
        ..Default::default()
    }
}

/// Row as the backend stores it after a delivery
pub fn delivered_row(unit: &str, food_type: &str, food_kg: f64, at: DateTime<Utc>) -> ParticipantRow {
    ParticipantRow {
        status: Some(ParticipantStatus::Delivered),
        bracelet_delivered: true,
        delivery_at: Some(at),
        food_kg: Some(food_kg),
        food_type: Some(food_type.to_string()),
        ..registered_row(unit)
    }
}

/// JSON rows as returned by the table API, newest first
pub fn participant_rows_json(count: usize) -> Value {
    let now = Utc::now();
    let rows: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "id": format!("p-{}", i),
                "name": Name().fake::<String>(),
                "phone": "(81) 99999-0000",
                "email": SafeEmail().fake::<String>(),
                "cpf": format!("{:03}.000.000-00", i),
                "unit": "Graças",
                "status": "inscrito",
                "bracelet_delivered": false,
                "delivery_at": null,
                "food_kg": null,
                "food_type": null,
                "user_type": null,
                "notes": null,
                "created_at": (now - Duration::minutes(i as i64)).to_rfc3339(),
            })
        })
        .collect();
    Value::Array(rows)
}

pub fn attraction(name: &str, time: &str, kind: AttractionKind) -> Attraction {
    Attraction {
        id: String::new(),
        name: name.to_string(),
        time: time.to_string(),
        kind,
        is_featured: Some(false),
        order: None,
        created_at: None,
    }
}
