// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crmdesk_app::{LinkedKind, LinkedRecordRef, UserId};
use crmdesk_db::Store;
use crmdesk_testkit::CrmFaker;

pub const DEMO_SEED: u64 = 2026;

const DEMO_USERS: usize = 5;
const DEMO_CONTACTS: usize = 60;
const DEMO_DEALS: usize = 8;
const DEMO_LEADS: usize = 8;
const DEMO_ACTION_ITEMS: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoSummary {
    pub users: usize,
    pub contacts: usize,
    pub deals: usize,
    pub leads: usize,
    pub action_items: usize,
}

/// Fills an empty store with a deterministic sample book of business.
pub fn seed_demo_data(store: &Store, seed: u64) -> Result<DemoSummary> {
    let mut faker = CrmFaker::new(seed);

    let mut users: Vec<UserId> = Vec::with_capacity(DEMO_USERS);
    while users.len() < DEMO_USERS {
        let name = faker.person_name();
        if store
            .list_users()?
            .iter()
            .any(|user| user.display_name == name)
        {
            continue;
        }
        users.push(store.create_user(&name).context("seed demo user")?);
    }

    let mut linkable = Vec::new();
    for _ in 0..DEMO_CONTACTS {
        let id = store
            .create_contact(&faker.contact())
            .context("seed demo contact")?;
        linkable.push(LinkedRecordRef::new(LinkedKind::Contact, id.as_str()));
    }
    for _ in 0..DEMO_DEALS {
        let id = store.create_deal(&faker.deal()).context("seed demo deal")?;
        linkable.push(LinkedRecordRef::new(LinkedKind::Deal, id.as_str()));
    }
    for _ in 0..DEMO_LEADS {
        let id = store.create_lead(&faker.lead()).context("seed demo lead")?;
        linkable.push(LinkedRecordRef::new(LinkedKind::Lead, id.as_str()));
    }

    for index in 0..DEMO_ACTION_ITEMS {
        // Every fourth item stays unassigned and every fifth stays unlinked.
        let assigned_to = (index % 4 != 3).then(|| users[faker.int_n(users.len())].clone());
        let linked = (index % 5 != 4).then(|| linkable[faker.int_n(linkable.len())].clone());
        store
            .create_action_item(&faker.action_item(assigned_to, linked))
            .context("seed demo action item")?;
    }

    let summary = DemoSummary {
        users: users.len(),
        contacts: DEMO_CONTACTS,
        deals: DEMO_DEALS,
        leads: DEMO_LEADS,
        action_items: DEMO_ACTION_ITEMS,
    };
    log::info!("seeded demo data: {summary:?}");
    Ok(summary)
}
