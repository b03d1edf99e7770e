// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crmdesk_app::{
    ActionItemPriority, ActionItemStatus, LinkedRecordRef, NewActionItem, NewContact, NewDeal,
    NewLead, UserId,
};
use std::path::PathBuf;
use time::{Date, Duration, Month};

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Blake", "Casey", "Dana", "Elliot", "Frankie", "Harper", "Jordan", "Kai", "Logan",
    "Morgan", "Noor", "Parker", "Quinn", "Riley", "Sasha",
];

const LAST_NAMES: [&str; 16] = [
    "Adams", "Bauer", "Chen", "Diaz", "Evans", "Fischer", "Garcia", "Haddad", "Ito", "Jensen",
    "Kowalski", "Lopez", "Moreau", "Nakamura", "Okafor", "Patel",
];

const COMPANIES: [&str; 12] = [
    "Acme Logistics",
    "Brightline Health",
    "Cobalt Systems",
    "Driftwood Foods",
    "Evergreen Capital",
    "Foxglove Media",
    "Granite Works",
    "Harbor Analytics",
    "Ironbark Energy",
    "Juniper Retail",
    "Keystone Freight",
    "Lumen Labs",
];

const POSITIONS: [&str; 10] = [
    "CEO",
    "CFO",
    "CTO",
    "Head of Sales",
    "Operations Manager",
    "Procurement Lead",
    "Product Manager",
    "Marketing Director",
    "Account Executive",
    "IT Manager",
];

const REGIONS: [&str; 6] = ["North", "South", "East", "West", "Central", "International"];

const INDUSTRIES: [&str; 8] = [
    "Manufacturing",
    "Healthcare",
    "Finance",
    "Retail",
    "Logistics",
    "Energy",
    "Media",
    "Technology",
];

const CONTACT_SOURCES: [&str; 5] = ["Website", "Referral", "Event", "Cold Call", "LinkedIn"];

const DEAL_STAGES: [&str; 6] = [
    "Lead",
    "Discussions",
    "Qualified",
    "RFQ",
    "Offered",
    "Won",
];

const LEAD_STATUSES: [&str; 4] = ["New", "Contacted", "Qualified", "Lost"];

const TASK_VERBS: [&str; 8] = [
    "Follow up with",
    "Send proposal to",
    "Schedule demo for",
    "Review contract for",
    "Call",
    "Prepare quote for",
    "Confirm pricing with",
    "Share case study with",
];

const REFERENCE_YEAR: i32 = 2026;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn chance(&mut self, percent: u64) -> bool {
        self.next_u64() % 100 < percent
    }
}

/// Seeded generator for CRM demo and test records. The same seed always
/// yields the same sequence.
#[derive(Debug, Clone)]
pub struct CrmFaker {
    rng: DeterministicRng,
}

impl CrmFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn person_name(&mut self) -> String {
        format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES))
    }

    pub fn company(&mut self) -> String {
        self.pick(&COMPANIES).to_owned()
    }

    pub fn contact(&mut self) -> NewContact {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let company = self.pick(&COMPANIES);
        let domain = email_domain(company);
        NewContact {
            contact_name: format!("{first} {last}"),
            company_name: Some(company.to_owned()),
            position: self
                .rng
                .chance(80)
                .then(|| self.pick(&POSITIONS).to_owned()),
            email: Some(format!(
                "{}.{}@{domain}",
                first.to_lowercase(),
                last.to_lowercase()
            )),
            phone_no: Some(self.phone()),
            region: Some(self.pick(&REGIONS).to_owned()),
            contact_owner: None,
            contact_source: Some(self.pick(&CONTACT_SOURCES).to_owned()),
            industry: Some(self.pick(&INDUSTRIES).to_owned()),
            linkedin: Some(format!(
                "https://linkedin.example/in/{}-{}",
                first.to_lowercase(),
                last.to_lowercase()
            )),
            website: Some(format!("https://{domain}")),
        }
    }

    pub fn deal(&mut self) -> NewDeal {
        let company = self.pick(&COMPANIES);
        let stage = self.pick(&DEAL_STAGES);
        let closing = self.date_in_year(REFERENCE_YEAR);
        NewDeal {
            deal_name: format!("{company} {}", self.pick(&["renewal", "expansion", "pilot", "rollout"])),
            stage: stage.to_owned(),
            customer_name: Some(company.to_owned()),
            total_contract_cents: Some(self.int_range_i64(500_000, 25_000_000)),
            expected_closing_date: Some(closing),
            lead_owner: Some(self.person_name()),
        }
    }

    pub fn lead(&mut self) -> NewLead {
        let name = self.person_name();
        let company = self.pick(&COMPANIES);
        let email = format!(
            "{}@{}",
            name.to_lowercase().replace(' ', "."),
            email_domain(company)
        );
        NewLead {
            lead_name: name,
            company_name: Some(company.to_owned()),
            position: Some(self.pick(&POSITIONS).to_owned()),
            email: Some(email),
            phone_no: Some(self.phone()),
            lead_status: Some(self.pick(&LEAD_STATUSES).to_owned()),
            contact_owner: None,
        }
    }

    pub fn action_item(
        &mut self,
        assigned_to: Option<UserId>,
        linked: Option<LinkedRecordRef>,
    ) -> NewActionItem {
        let status = ActionItemStatus::ALL[self.rng.int_n(ActionItemStatus::ALL.len())];
        let priority = ActionItemPriority::ALL[self.rng.int_n(ActionItemPriority::ALL.len())];
        let due_date = self
            .rng
            .chance(70)
            .then(|| self.date_in_year(REFERENCE_YEAR));
        NewActionItem {
            title: format!("{} {}", self.pick(&TASK_VERBS), self.company()),
            assigned_to,
            status,
            priority,
            due_date,
            linked,
        }
    }

    pub fn date_in_year(&mut self, year: i32) -> Date {
        let start = Date::from_calendar_date(year, Month::January, 1).unwrap_or(Date::MIN);
        let offset = self.int_range_i64(0, 364);
        start.saturating_add(Duration::days(offset))
    }

    fn phone(&mut self) -> String {
        format!(
            "+1-{:03}-{:03}-{:04}",
            self.int_range_i64(200, 989),
            self.int_range_i64(200, 999),
            self.int_range_i64(0, 9999)
        )
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range_i64(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("crmdesk.db");
    Ok((dir, db_path))
}

pub fn deal_stages() -> &'static [&'static str] {
    &DEAL_STAGES
}

fn email_domain(company: &str) -> String {
    let slug: String = company
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase();
    format!("{slug}.example")
}

#[cfg(test)]
mod tests {
    use super::{CrmFaker, deal_stages, email_domain};
    use crmdesk_app::{LinkedKind, LinkedRecordRef, UserId};

    #[test]
    fn new_deterministic_seed() {
        let mut left = CrmFaker::new(42);
        let mut right = CrmFaker::new(42);
        assert_eq!(left.contact(), right.contact());
        assert_eq!(left.deal(), right.deal());
    }

    #[test]
    fn zero_seed_is_usable() {
        let mut faker = CrmFaker::new(0);
        assert!(!faker.person_name().is_empty());
    }

    #[test]
    fn contact_fields_are_populated() {
        let mut faker = CrmFaker::new(7);
        for _ in 0..20 {
            let contact = faker.contact();
            assert!(contact.contact_name.contains(' '));
            assert!(contact.company_name.is_some());
            let email = contact.email.expect("email");
            assert!(email.ends_with(".example"), "email {email}");
        }
    }

    #[test]
    fn deal_stage_and_value_are_in_range() {
        let mut faker = CrmFaker::new(9);
        for _ in 0..20 {
            let deal = faker.deal();
            assert!(deal_stages().contains(&deal.stage.as_str()));
            let value = deal.total_contract_cents.expect("value");
            assert!((500_000..=25_000_000).contains(&value));
            assert_eq!(
                deal.expected_closing_date.map(|date| date.year()),
                Some(2026)
            );
        }
    }

    #[test]
    fn action_item_keeps_supplied_links() {
        let mut faker = CrmFaker::new(11);
        let linked = LinkedRecordRef::new(LinkedKind::Lead, "l-1");
        let item = faker.action_item(Some(UserId::from("u-1")), Some(linked.clone()));
        assert_eq!(item.assigned_to, Some(UserId::from("u-1")));
        assert_eq!(item.linked, Some(linked));
        assert!(!item.title.is_empty());
    }

    #[test]
    fn email_domain_strips_punctuation() {
        assert_eq!(email_domain("Acme Logistics"), "acmelogistics.example");
    }
}
