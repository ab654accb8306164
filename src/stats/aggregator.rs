//! Dashboard statistics
//!
//! Pure functions over the in-memory participant collection. Every function
//! is total: an empty slice yields zero counts and empty groupings.

use std::collections::HashMap;
use std::ops::AddAssign;

use chrono::{DateTime, Local, TimeZone};

use crate::models::Participant;

/// Label used when a participant has no unit
pub const UNSPECIFIED_UNIT: &str = "Não Informada";

/// Label used when a participant has no affiliation type
pub const DEFAULT_USER_TYPE: &str = "Aluno(a)";

pub const UNIT_PALETTE: [&str; 5] = ["#002D5B", "#1D71BC", "#FFD100", "#2A9D8F", "#E63946"];

pub const FOOD_PALETTE: [&str; 7] = [
    "#FFD100", "#002D5B", "#E63946", "#2A9D8F", "#1D71BC", "#F97316", "#8E44AD",
];

pub const USER_TYPE_PALETTE: [&str; 5] = ["#002D5B", "#FFD100", "#E63946", "#2A9D8F", "#1D71BC"];

/// Key/value totals kept in first-seen key order
#[derive(Debug, Clone, PartialEq)]
pub struct Grouping<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> Default for Grouping<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

/// One chart segment
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSlice<V> {
    pub name: String,
    pub value: V,
    pub color: &'static str,
}

impl<V: Copy + AddAssign> Grouping<V> {
    /// Add `value` to `key`, appending the key if it is new
    pub fn add(&mut self, key: &str, value: V) {
        match self.index.get(key) {
            Some(&position) => self.entries[position].1 += value,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.index.get(key).map(|&position| self.entries[position].1)
    }

    pub fn entries(&self) -> &[(String, V)] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Assign colors by cycling through `palette` in key order
    pub fn colored(&self, palette: &[&'static str]) -> Vec<ChartSlice<V>> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, (name, value))| ChartSlice {
                name: name.clone(),
                value: *value,
                color: if palette.is_empty() { "#000000" } else { palette[i % palette.len()] },
            })
            .collect()
    }
}

impl Grouping<f64> {
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }
}

impl Grouping<usize> {
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, v)| v).sum()
    }
}

/// Headline numbers and chart data for the overview tab
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardStats {
    pub total_registered: usize,
    pub total_delivered: usize,
    pub total_pending: usize,
    pub total_food_kg: f64,
    pub delivered_today: usize,
    pub by_unit: Grouping<usize>,
    pub food_kg_by_type: Grouping<f64>,
    pub by_user_type: Grouping<usize>,
}

impl DashboardStats {
    /// Compute against the current local date
    pub fn compute(participants: &[Participant]) -> Self {
        Self::compute_at(participants, Local::now())
    }

    /// Compute with "today" taken from `now` in its own time zone
    pub fn compute_at<Tz: TimeZone>(participants: &[Participant], now: DateTime<Tz>) -> Self {
        let total_registered = participants.len();
        let total_delivered = delivered_count(participants);

        Self {
            total_registered,
            total_delivered,
            total_pending: total_registered - total_delivered,
            total_food_kg: total_food_kg(participants),
            delivered_today: delivered_on_day(participants, &now),
            by_unit: group_by_unit(participants),
            food_kg_by_type: food_kg_by_type(participants),
            by_user_type: group_by_user_type(participants),
        }
    }

    pub fn unit_chart(&self) -> Vec<ChartSlice<usize>> {
        self.by_unit.colored(&UNIT_PALETTE)
    }

    pub fn food_chart(&self) -> Vec<ChartSlice<f64>> {
        self.food_kg_by_type.colored(&FOOD_PALETTE)
    }

    pub fn user_type_chart(&self) -> Vec<ChartSlice<usize>> {
        self.by_user_type.colored(&USER_TYPE_PALETTE)
    }
}

pub fn delivered_count(participants: &[Participant]) -> usize {
    participants.iter().filter(|p| p.is_delivered()).count()
}

/// Sum of donated weight over every record
pub fn total_food_kg(participants: &[Participant]) -> f64 {
    participants.iter().map(|p| p.food_kg()).sum()
}

/// Delivered records whose delivery falls on the calendar day of `now`
pub fn delivered_on_day<Tz: TimeZone>(participants: &[Participant], now: &DateTime<Tz>) -> usize {
    let zone = now.timezone();
    let today = now.date_naive();
    participants
        .iter()
        .filter_map(|p| p.delivery_at())
        .filter(|at| at.with_timezone(&zone).date_naive() == today)
        .count()
}

pub fn group_by_unit(participants: &[Participant]) -> Grouping<usize> {
    let mut grouping = Grouping::default();
    for p in participants {
        let unit = if p.unit.trim().is_empty() { UNSPECIFIED_UNIT } else { p.unit.as_str() };
        grouping.add(unit, 1);
    }
    grouping
}

/// Donated weight per food type, delivered records with a food type only
pub fn food_kg_by_type(participants: &[Participant]) -> Grouping<f64> {
    let mut grouping = Grouping::default();
    for delivery in participants.iter().filter_map(|p| p.lifecycle.delivery()) {
        if !delivery.food_type.is_empty() {
            grouping.add(&delivery.food_type, delivery.food_kg);
        }
    }
    grouping
}

pub fn group_by_user_type(participants: &[Participant]) -> Grouping<usize> {
    let mut grouping = Grouping::default();
    for p in participants {
        grouping.add(p.user_type.as_deref().unwrap_or(DEFAULT_USER_TYPE), 1);
    }
    grouping
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Delivery, Lifecycle};
    use chrono::{Duration, Utc};

    fn participant(unit: &str, lifecycle: Lifecycle) -> Participant {
        Participant {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Folião".to_string(),
            phone: String::new(),
            email: "f@example.com".to_string(),
            cpf: "000.000.000-00".to_string(),
            unit: unit.to_string(),
            user_type: None,
            admin_id: None,
            notes: None,
            created_at: None,
            lifecycle,
        }
    }

    fn delivered(unit: &str, kg: f64, food: &str, at: DateTime<Utc>) -> Participant {
        participant(
            unit,
            Lifecycle::Delivered(Delivery {
                at,
                food_kg: kg,
                food_type: food.to_string(),
            }),
        )
    }

    #[test]
    fn test_empty_list() {
        let stats = DashboardStats::compute(&[]);
        assert_eq!(stats.total_registered, 0);
        assert_eq!(stats.total_delivered, 0);
        assert_eq!(stats.total_pending, 0);
        assert_eq!(stats.total_food_kg, 0.0);
        assert!(stats.by_unit.is_empty());
        assert!(stats.food_kg_by_type.is_empty());
        assert!(stats.by_user_type.is_empty());
    }

    #[test]
    fn test_unit_grouping_keeps_first_seen_order() {
        let list = vec![
            participant("Graças", Lifecycle::Registered),
            participant("Graças", Lifecycle::Registered),
            participant("Boa Viagem", Lifecycle::Registered),
        ];
        let grouping = group_by_unit(&list);
        assert_eq!(
            grouping.entries(),
            &[("Graças".to_string(), 2), ("Boa Viagem".to_string(), 1)]
        );
        assert_eq!(grouping.keys().collect::<Vec<_>>(), vec!["Graças", "Boa Viagem"]);
    }

    #[test]
    fn test_missing_unit_uses_sentinel() {
        let list = vec![participant("", Lifecycle::Registered)];
        assert_eq!(group_by_unit(&list).get(UNSPECIFIED_UNIT), Some(1));
        assert_eq!(group_by_user_type(&list).get(DEFAULT_USER_TYPE), Some(1));
    }

    #[test]
    fn test_delivery_totals() {
        let now = Utc::now();
        let list = vec![
            delivered("Graças", 2.5, "Arroz", now),
            delivered("Olinda", 1.0, "Feijão", now - Duration::days(2)),
            delivered("Olinda", 1.5, "Arroz", now),
            delivered("Olinda", 3.0, "", now),
            participant("Paulista", Lifecycle::Registered),
        ];

        let stats = DashboardStats::compute_at(&list, now);
        assert_eq!(stats.total_registered, 5);
        assert_eq!(stats.total_delivered, 4);
        assert_eq!(stats.total_pending, 1);
        assert_eq!(stats.total_food_kg, 8.0);
        assert_eq!(stats.delivered_today, 3);
        assert_eq!(stats.food_kg_by_type.get("Arroz"), Some(4.0));
        assert_eq!(stats.food_kg_by_type.get("Feijão"), Some(1.0));
        assert_eq!(stats.food_kg_by_type.len(), 2);
    }

    #[test]
    fn test_palette_cycles() {
        let mut grouping = Grouping::default();
        for unit in ["a", "b", "c", "d", "e", "f"] {
            grouping.add(unit, 1usize);
        }
        let slices = grouping.colored(&UNIT_PALETTE);
        assert_eq!(slices[0].color, UNIT_PALETTE[0]);
        assert_eq!(slices[5].color, UNIT_PALETTE[0]);
        assert_eq!(slices[4].color, UNIT_PALETTE[4]);
    }
}
