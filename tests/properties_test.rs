//! Property tests for statistics and pagination

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use BlocoCheckin::models::{Delivery, Lifecycle, Participant};
use BlocoCheckin::stats::{filter_participants, paginate, search_page, DashboardStats, DEFAULT_PAGE_SIZE};
use BlocoCheckin::utils::helpers::total_pages;

const UNITS: [&str; 4] = ["Graças", "Boa Viagem", "Paulista", ""];
const FOODS: [&str; 4] = ["Arroz", "Feijão", "Leite em pó", ""];

fn participant(index: usize, name: String, unit: &str, lifecycle: Lifecycle) -> Participant {
    Participant {
        id: format!("p-{}", index),
        email: format!("{}@example.com", name),
        name,
        phone: String::new(),
        cpf: format!("{:011}", index),
        unit: unit.to_string(),
        user_type: None,
        admin_id: None,
        notes: None,
        created_at: None,
        lifecycle,
    }
}

fn lifecycle_strategy() -> impl Strategy<Value = Lifecycle> {
    prop_oneof![
        Just(Lifecycle::Registered),
        Just(Lifecycle::Cancelled),
        (0.1f64..50.0, 0usize..FOODS.len(), 0i64..2_000_000_000).prop_map(|(kg, food, ts)| {
            Lifecycle::Delivered(Delivery {
                at: Utc.timestamp_opt(ts, 0).unwrap(),
                food_kg: kg,
                food_type: FOODS[food].to_string(),
            })
        }),
    ]
}

fn participants_strategy() -> impl Strategy<Value = Vec<Participant>> {
    prop::collection::vec(("[a-y]{1,8}", 0usize..UNITS.len(), lifecycle_strategy()), 0..60).prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(i, (name, unit, lifecycle))| participant(i, name, UNITS[unit], lifecycle))
            .collect()
    })
}

proptest! {
    #[test]
    fn delivered_plus_pending_is_total(participants in participants_strategy()) {
        let stats = DashboardStats::compute(&participants);
        prop_assert_eq!(stats.total_registered, participants.len());
        prop_assert_eq!(stats.total_delivered + stats.total_pending, stats.total_registered);
    }

    #[test]
    fn food_grouping_sums_typed_deliveries(participants in participants_strategy()) {
        let stats = DashboardStats::compute(&participants);
        let expected: f64 = participants
            .iter()
            .filter_map(|p| p.lifecycle.delivery())
            .filter(|d| !d.food_type.is_empty())
            .map(|d| d.food_kg)
            .sum();
        prop_assert!((stats.food_kg_by_type.total() - expected).abs() < 1e-6);
    }

    #[test]
    fn unit_grouping_counts_everyone(participants in participants_strategy()) {
        let stats = DashboardStats::compute(&participants);
        prop_assert_eq!(stats.by_unit.total(), participants.len());
    }

    #[test]
    fn empty_query_keeps_everything_in_order(participants in participants_strategy()) {
        let filtered = filter_participants(&participants, "");
        let ids: Vec<&str> = filtered.iter().map(|p| p.id.as_str()).collect();
        let expected: Vec<&str> = participants.iter().map(|p| p.id.as_str()).collect();
        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn unmatched_query_has_one_empty_page(participants in participants_strategy()) {
        let page = search_page(&participants, "zz#none", 1, DEFAULT_PAGE_SIZE);
        prop_assert!(page.is_empty());
        prop_assert_eq!(page.total_pages, 1);
        prop_assert_eq!(page.total_matches, 0);
    }

    #[test]
    fn pages_partition_the_filtered_list(participants in participants_strategy(), size in 1usize..15) {
        let filtered = filter_participants(&participants, "a");
        let pages = total_pages(filtered.len(), size);

        let mut joined = Vec::new();
        for page in 1..=pages {
            joined.extend_from_slice(paginate(&filtered, page, size));
        }
        prop_assert_eq!(joined, filtered.clone());
        prop_assert!(paginate(&filtered, pages + 1, size).is_empty());
    }
}

#[test]
fn test_twenty_five_records_in_three_pages() {
    let participants: Vec<Participant> = (0..25)
        .map(|i| participant(i, format!("p{}", i), "Graças", Lifecycle::Registered))
        .collect();

    let first = search_page(&participants, "", 1, 10);
    assert_eq!(first.total_pages, 3);
    let ids: Vec<&str> = first.items.iter().map(|p| p.id.as_str()).collect();
    let expected: Vec<String> = (0..10).map(|i| format!("p-{}", i)).collect();
    assert_eq!(ids, expected);

    let third = search_page(&participants, "", 3, 10);
    assert_eq!(third.items.len(), 5);
    assert_eq!(third.items[0].id, "p-20");
    assert_eq!(third.items[4].id, "p-24");

    assert!(search_page(&participants, "", 4, 10).is_empty());
}

#[test]
fn test_unit_grouping_keeps_first_seen_order() {
    let participants: Vec<Participant> = ["Graças", "Graças", "Boa Viagem"]
        .iter()
        .enumerate()
        .map(|(i, unit)| participant(i, format!("p{}", i), unit, Lifecycle::Registered))
        .collect();

    let stats = DashboardStats::compute(&participants);
    assert_eq!(
        stats.by_unit.entries(),
        &[("Graças".to_string(), 2usize), ("Boa Viagem".to_string(), 1usize)]
    );
}
