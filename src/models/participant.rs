//! Participant model
//!
//! The domain type carries one [`Lifecycle`] value. The legacy columns the
//! backend stores (`status`, `bracelet_delivered`, `delivery_at`, `food_kg`,
//! `food_type`) only exist on [`ParticipantRow`] and are derived from the
//! lifecycle when a record crosses the gateway boundary.

use std::fmt;
use serde::{Deserialize, Deserializer, Serialize};
use chrono::{DateTime, Utc};

/// Stored status vocabulary, unknown values read as registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticipantStatus {
    #[serde(rename = "aguardando")]
    Awaiting,
    #[serde(rename = "entregue")]
    Delivered,
    #[serde(rename = "cancelado")]
    Cancelled,
    #[serde(rename = "inscrito", other)]
    Registered,
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ParticipantStatus::Registered => "registered",
            ParticipantStatus::Awaiting => "awaiting",
            ParticipantStatus::Delivered => "delivered",
            ParticipantStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// Data recorded when a bracelet is handed over
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub at: DateTime<Utc>,
    pub food_kg: f64,
    pub food_type: String,
}

impl Delivery {
    /// Human-readable summary stored in the participant notes
    pub fn note(&self) -> String {
        format!("Retirada de pulseira: {} ({}kg)", self.food_type, self.food_kg)
    }
}

/// Check-in state of a participant
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Lifecycle {
    #[default]
    Registered,
    Awaiting,
    Delivered(Delivery),
    Cancelled,
}

impl Lifecycle {
    pub fn status(&self) -> ParticipantStatus {
        match self {
            Lifecycle::Registered => ParticipantStatus::Registered,
            Lifecycle::Awaiting => ParticipantStatus::Awaiting,
            Lifecycle::Delivered(_) => ParticipantStatus::Delivered,
            Lifecycle::Cancelled => ParticipantStatus::Cancelled,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Lifecycle::Delivered(_))
    }

    pub fn delivery(&self) -> Option<&Delivery> {
        match self {
            Lifecycle::Delivered(delivery) => Some(delivery),
            _ => None,
        }
    }
}

/// A person registered for the event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ParticipantRow", into = "ParticipantRow")]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub cpf: String,
    pub unit: String,
    pub user_type: Option<String>,
    pub admin_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub lifecycle: Lifecycle,
}

impl Participant {
    pub fn is_delivered(&self) -> bool {
        self.lifecycle.is_delivered()
    }

    /// Donated weight, zero until delivery
    pub fn food_kg(&self) -> f64 {
        self.lifecycle.delivery().map(|d| d.food_kg).unwrap_or(0.0)
    }

    pub fn food_type(&self) -> Option<&str> {
        self.lifecycle.delivery().map(|d| d.food_type.as_str())
    }

    pub fn delivery_at(&self) -> Option<DateTime<Utc>> {
        self.lifecycle.delivery().map(|d| d.at)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Row shape stored by the backend in the `participants` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cpf: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unit: String,
    #[serde(default)]
    pub status: Option<ParticipantStatus>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bracelet_delivered: bool,
    #[serde(default)]
    pub delivery_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub food_kg: Option<f64>,
    #[serde(default)]
    pub food_type: Option<String>,
    #[serde(default)]
    pub user_type: Option<String>,
    #[serde(default)]
    pub admin_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ParticipantRow> for Participant {
    fn from(row: ParticipantRow) -> Self {
        // Either legacy flag marks the record as delivered; a missing timestamp
        // keeps the record out of "delivered today" instead of guessing one.
        let delivered = row.bracelet_delivered || row.status == Some(ParticipantStatus::Delivered);
        let lifecycle = if delivered {
            Lifecycle::Delivered(Delivery {
                at: row.delivery_at.unwrap_or_default(),
                food_kg: row.food_kg.unwrap_or(0.0).max(0.0),
                food_type: row.food_type.unwrap_or_default(),
            })
        } else {
            match row.status {
                Some(ParticipantStatus::Awaiting) => Lifecycle::Awaiting,
                Some(ParticipantStatus::Cancelled) => Lifecycle::Cancelled,
                _ => Lifecycle::Registered,
            }
        };

        Self {
            id: row.id.unwrap_or_default(),
            name: row.name,
            phone: row.phone,
            email: row.email,
            cpf: row.cpf,
            unit: row.unit,
            user_type: row.user_type.filter(|t| !t.is_empty()),
            admin_id: row.admin_id,
            notes: row.notes,
            created_at: row.created_at,
            lifecycle,
        }
    }
}

impl From<Participant> for ParticipantRow {
    fn from(participant: Participant) -> Self {
        let status = participant.lifecycle.status();
        let (bracelet_delivered, delivery_at, food_kg, food_type) = match participant.lifecycle {
            Lifecycle::Delivered(delivery) => {
                (true, Some(delivery.at), Some(delivery.food_kg), Some(delivery.food_type))
            }
            _ => (false, None, Some(0.0), None),
        };

        Self {
            id: Some(participant.id).filter(|id| !id.is_empty()),
            name: participant.name,
            phone: participant.phone,
            email: participant.email,
            cpf: participant.cpf,
            unit: participant.unit,
            status: Some(status),
            bracelet_delivered,
            delivery_at,
            food_kg,
            food_type,
            user_type: participant.user_type,
            admin_id: participant.admin_id,
            notes: participant.notes,
            created_at: participant.created_at,
        }
    }
}

/// Payload written by the public registration form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewParticipant {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub cpf: String,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
}

impl NewParticipant {
    /// Row as the backend creates it, before an id is assigned
    pub fn into_row(self) -> ParticipantRow {
        ParticipantRow {
            name: self.name,
            phone: self.phone,
            email: self.email,
            cpf: self.cpf,
            unit: self.unit,
            user_type: self.user_type,
            status: Some(ParticipantStatus::Registered),
            bracelet_delivered: false,
            food_kg: Some(0.0),
            ..Default::default()
        }
    }
}

/// Partial update of a participant row; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParticipantPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ParticipantStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracelet_delivered: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ParticipantPatch {
    /// Every delivery column at once, so the stored row never holds half a delivery
    pub fn delivery(delivery: &Delivery, notes: String) -> Self {
        Self {
            status: Some(ParticipantStatus::Delivered),
            bracelet_delivered: Some(true),
            delivery_at: Some(delivery.at),
            food_kg: Some(delivery.food_kg),
            food_type: Some(delivery.food_type.clone()),
            notes: Some(notes),
        }
    }

    pub fn cancellation() -> Self {
        Self {
            status: Some(ParticipantStatus::Cancelled),
            bracelet_delivered: Some(false),
            ..Default::default()
        }
    }

    /// Apply the patch to a stored row
    pub fn apply_to(&self, row: &mut ParticipantRow) {
        if let Some(status) = self.status {
            row.status = Some(status);
        }
        if let Some(delivered) = self.bracelet_delivered {
            row.bracelet_delivered = delivered;
        }
        if let Some(at) = self.delivery_at {
            row.delivery_at = Some(at);
        }
        if let Some(kg) = self.food_kg {
            row.food_kg = Some(kg);
        }
        if let Some(food_type) = &self.food_type {
            row.food_type = Some(food_type.clone());
        }
        if let Some(notes) = &self.notes {
            row.notes = Some(notes.clone());
        }
    }
}
