//! Search filter and page slicing for the attendee table

use crate::models::Participant;
use crate::utils::helpers::{calculate_offset, total_pages};

/// Rows per page on the collection tab
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Case-insensitive match on name or e-mail, raw substring match on CPF
pub fn matches_query(participant: &Participant, query: &str) -> bool {
    let q = query.to_lowercase();
    participant.name.to_lowercase().contains(&q)
        || participant.cpf.contains(&q)
        || participant.email.to_lowercase().contains(&q)
}

/// Records matching `query`, in their original order
pub fn filter_participants<'a>(participants: &'a [Participant], query: &str) -> Vec<&'a Participant> {
    participants
        .iter()
        .filter(|p| matches_query(p, query))
        .collect()
}

/// Slice for a 1-based `page`; pages outside the range yield an empty slice
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = match calculate_offset(page, page_size) {
        Some(start) if start < items.len() => start,
        _ => return &[],
    };
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Bring a page number back into `1..=total_pages`
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// One page of filtered participants
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantPage<'a> {
    pub items: Vec<&'a Participant>,
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
}

impl<'a> ParticipantPage<'a> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Filter then slice; the page number is used as given
pub fn search_page<'a>(
    participants: &'a [Participant],
    query: &str,
    page: usize,
    page_size: usize,
) -> ParticipantPage<'a> {
    let filtered = filter_participants(participants, query);
    let items = paginate(&filtered, page, page_size).to_vec();

    ParticipantPage {
        items,
        page,
        total_pages: total_pages(filtered.len(), page_size),
        total_matches: filtered.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Lifecycle;

    fn participant(name: &str, cpf: &str, email: &str) -> Participant {
        Participant {
            id: name.to_string(),
            name: name.to_string(),
            phone: String::new(),
            email: email.to_string(),
            cpf: cpf.to_string(),
            unit: "Graças".to_string(),
            user_type: None,
            admin_id: None,
            notes: None,
            created_at: None,
            lifecycle: Lifecycle::Registered,
        }
    }

    fn numbered(count: usize) -> Vec<Participant> {
        (0..count)
            .map(|i| participant(&format!("P{}", i), &format!("{:011}", i), &format!("p{}@example.com", i)))
            .collect()
    }

    #[test]
    fn test_query_matches_name_cpf_and_email() {
        let p = participant("Maria Souza", "123.456.789-00", "MARIA@Example.com");
        assert!(matches_query(&p, "SOUZA"));
        assert!(matches_query(&p, "456.789"));
        assert!(matches_query(&p, "maria@example"));
        assert!(matches_query(&p, ""));
        assert!(!matches_query(&p, "joão"));
    }

    #[test]
    fn test_empty_query_returns_everything_in_order() {
        let list = numbered(4);
        let filtered = filter_participants(&list, "");
        let ids: Vec<&str> = filtered.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["P0", "P1", "P2", "P3"]);
    }

    #[test]
    fn test_no_match_has_one_page() {
        let list = numbered(4);
        let page = search_page(&list, "nobody", 1, DEFAULT_PAGE_SIZE);
        assert!(page.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_matches, 0);
    }

    #[test]
    fn test_twenty_five_records() {
        let list = numbered(25);

        let first = search_page(&list, "", 1, 10);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.items[0].id, "P0");
        assert_eq!(first.items[9].id, "P9");

        let third = search_page(&list, "", 3, 10);
        assert_eq!(third.items.len(), 5);
        assert_eq!(third.items[0].id, "P20");
        assert_eq!(third.items[4].id, "P24");
        assert!(!third.has_next());
        assert!(third.has_previous());
        assert!(!first.has_previous());
        assert!(first.has_next());

        let fourth = search_page(&list, "", 4, 10);
        assert!(fourth.is_empty());
    }

    #[test]
    fn test_page_zero_is_empty() {
        let list = numbered(3);
        assert!(paginate(&list, 0, 10).is_empty());
    }

    #[test]
    fn test_huge_page_numbers_are_empty() {
        let list = numbered(25);
        assert!(paginate(&list, usize::MAX, 10).is_empty());
        assert!(paginate(&list, 2, usize::MAX).is_empty());
        // (page - 1) * 10 wraps to zero without checked arithmetic
        let wrapping = usize::MAX / 10 + 2;
        assert!(paginate(&list, wrapping, 10).is_empty());

        let page = search_page(&list, "", usize::MAX, DEFAULT_PAGE_SIZE);
        assert!(page.is_empty());
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_matches, 25);
    }

    #[test]
    fn test_last_page_shorter_than_page_size() {
        let list = numbered(3);
        assert_eq!(paginate(&list, 1, usize::MAX).len(), 3);
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(4, 3), 3);
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(2, 0), 1);
        assert_eq!(clamp_page(2, 3), 2);
    }
}
