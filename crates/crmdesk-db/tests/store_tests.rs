// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use crmdesk_app::{
    ActionItemPatch, ActionItemPriority, ActionItemStatus, ContactSelector, DealPatch,
    LinkedKind, LinkedRecordRef, NewActionItem, NewContact, NewDeal, Notification, PageConfig,
    spawn_contact_load,
};
use crmdesk_db::{Store, validate_db_path};
use crmdesk_testkit::{CrmFaker, temp_db_path};
use std::sync::mpsc;
use time::{Date, Month};

fn store() -> Result<Store> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    Ok(store)
}

fn named_contact(name: &str) -> NewContact {
    NewContact {
        contact_name: name.to_owned(),
        ..NewContact::default()
    }
}

#[test]
fn validate_db_path_rejects_uri_forms() {
    assert!(validate_db_path("file:test.db").is_err());
    assert!(validate_db_path("https://example.com/db.sqlite").is_err());
    assert!(validate_db_path("db.sqlite?mode=ro").is_err());
    assert!(validate_db_path("").is_err());
    assert!(validate_db_path("/tmp/crmdesk.db").is_ok());
    assert!(validate_db_path(":memory:").is_ok());
}

#[test]
fn bootstrap_is_idempotent_on_disk() -> Result<()> {
    let (_dir, path) = temp_db_path()?;
    {
        let store = Store::open(&path)?;
        store.bootstrap()?;
        store.create_user("Avery Walker")?;
    }

    let reopened = Store::open(&path)?;
    reopened.bootstrap()?;
    assert_eq!(reopened.list_users()?.len(), 1);
    Ok(())
}

#[test]
fn bootstrap_rejects_schema_missing_required_column() -> Result<()> {
    let store = store()?;
    store.raw_connection().execute_batch(
        "
        DROP TABLE action_items;
        CREATE TABLE action_items (
          id TEXT PRIMARY KEY,
          title TEXT NOT NULL,
          assigned_to TEXT,
          priority TEXT NOT NULL,
          due_date TEXT,
          module_type TEXT,
          module_id TEXT,
          created_at TEXT NOT NULL,
          updated_at TEXT NOT NULL
        );
        ",
    )?;

    let err = store
        .bootstrap()
        .expect_err("schema validation should fail");
    let message = err.to_string();
    assert!(message.contains("table `action_items` is missing required columns"));
    assert!(message.contains("status"));
    Ok(())
}

#[test]
fn contact_pages_follow_name_order_without_gaps() -> Result<()> {
    let store = store()?;
    for name in ["Morgan", "avery", "Blake", "Casey", "Dana"] {
        store.create_contact(&named_contact(name))?;
    }
    store.create_contact(&named_contact("Blake"))?;

    let mut seen = Vec::new();
    let mut offset = 0;
    loop {
        let page = store.list_contacts_page(offset, 2)?;
        if page.is_empty() {
            break;
        }
        offset += page.len();
        seen.extend(page);
    }

    let names: Vec<&str> = seen.iter().map(|c| c.contact_name.as_str()).collect();
    assert_eq!(names, vec!["Blake", "Blake", "Casey", "Dana", "Morgan", "avery"]);
    assert!(seen[0].id < seen[1].id, "ties break on id");
    assert_eq!(store.count_contacts()?, 6);
    Ok(())
}

#[test]
fn missing_records_are_none_not_errors() -> Result<()> {
    let store = store()?;
    assert!(store.get_contact("nope")?.is_none());
    assert!(store.get_deal("nope")?.is_none());
    assert!(store.get_lead("nope")?.is_none());
    assert!(store.get_action_item("nope")?.is_none());
    Ok(())
}

#[test]
fn update_deal_applies_partial_fields_and_stamps_modified() -> Result<()> {
    let store = store()?;
    let deal_id = store.create_deal(&NewDeal {
        deal_name: "Acme renewal".to_owned(),
        stage: "Lead".to_owned(),
        customer_name: Some("Acme".to_owned()),
        total_contract_cents: Some(100_000),
        ..NewDeal::default()
    })?;
    let before = store.get_deal(deal_id.as_str())?.expect("deal exists");

    let closing = Date::from_calendar_date(2026, Month::March, 31)?;
    store.update_deal(
        &deal_id,
        &DealPatch {
            stage: Some("Won".to_owned()),
            customer_name: Some(None),
            expected_closing_date: Some(Some(closing)),
            ..DealPatch::default()
        },
    )?;

    let after = store.get_deal(deal_id.as_str())?.expect("deal exists");
    assert_eq!(after.deal_name, "Acme renewal");
    assert_eq!(after.stage, "Won");
    assert_eq!(after.customer_name, None);
    assert_eq!(after.total_contract_cents, Some(100_000));
    assert_eq!(after.expected_closing_date, Some(closing));
    assert!(after.modified_at >= before.modified_at);
    Ok(())
}

#[test]
fn update_deal_rejects_unknown_id_and_empty_patch() -> Result<()> {
    let store = store()?;
    let patch = DealPatch {
        stage: Some("Won".to_owned()),
        ..DealPatch::default()
    };
    let err = store
        .update_deal(&"missing".into(), &patch)
        .expect_err("unknown deal should fail");
    assert!(err.to_string().contains("not found"));

    let deal_id = store.create_deal(&CrmFaker::new(3).deal())?;
    assert!(store.update_deal(&deal_id, &DealPatch::default()).is_err());
    Ok(())
}

#[test]
fn action_item_lifecycle() -> Result<()> {
    let store = store()?;
    let user = store.create_user("Jordan Reed")?;
    let due = Date::from_calendar_date(2026, Month::May, 1)?;
    let item_id = store.create_action_item(&NewActionItem {
        title: "  Send proposal  ".to_owned(),
        assigned_to: Some(user.clone()),
        status: ActionItemStatus::Open,
        priority: ActionItemPriority::High,
        due_date: Some(due),
        linked: Some(LinkedRecordRef::new(LinkedKind::Deal, "d-1")),
    })?;

    let created = store.get_action_item(item_id.as_str())?.expect("item exists");
    assert_eq!(created.title, "Send proposal");
    assert_eq!(created.assigned_to, Some(user));
    assert_eq!(created.module_type.as_deref(), Some("deals"));
    assert_eq!(created.module_id.as_deref(), Some("d-1"));

    store.update_action_item(&item_id, &ActionItemPatch::due_date(None))?;
    store.update_action_item(&item_id, &ActionItemPatch::status(ActionItemStatus::Completed))?;
    store.update_action_item(&item_id, &ActionItemPatch::assigned_to(None))?;
    let updated = store.get_action_item(item_id.as_str())?.expect("item exists");
    assert_eq!(updated.due_date, None);
    assert_eq!(updated.status, ActionItemStatus::Completed);
    assert_eq!(updated.priority, ActionItemPriority::High);
    assert_eq!(updated.assigned_to, None);

    store.delete_action_item(&item_id)?;
    assert!(store.list_action_items()?.is_empty());
    assert!(store.delete_action_item(&item_id).is_err());
    Ok(())
}

#[test]
fn record_names_resolves_known_records_only() -> Result<()> {
    let store = store()?;
    let mut faker = CrmFaker::new(21);
    let deal_id = store.create_deal(&faker.deal())?;
    let second_deal = faker.deal();
    let second_deal_name = second_deal.deal_name.clone();
    let second_deal_id = store.create_deal(&second_deal)?;
    let lead = faker.lead();
    let lead_name = lead.lead_name.clone();
    let lead_id = store.create_lead(&lead)?;
    let contact_id = store.create_contact(&named_contact("Casey Diaz"))?;

    let refs = vec![
        LinkedRecordRef::new(LinkedKind::Deal, deal_id.as_str()),
        LinkedRecordRef::new(LinkedKind::Lead, lead_id.as_str()),
        LinkedRecordRef::new(LinkedKind::Contact, contact_id.as_str()),
        LinkedRecordRef::new(LinkedKind::Contact, contact_id.as_str()),
        LinkedRecordRef::new(LinkedKind::Deal, "missing"),
        LinkedRecordRef::new(LinkedKind::Deal, second_deal_id.as_str()),
    ];
    let names = store.record_names(&refs)?;

    assert_eq!(names.len(), 4);
    assert!(names.contains_key(&refs[0]));
    assert_eq!(names.get(&refs[5]), Some(&second_deal_name));
    assert_eq!(names.get(&refs[1]), Some(&lead_name));
    assert_eq!(names.get(&refs[2]).map(String::as_str), Some("Casey Diaz"));
    assert!(!names.contains_key(&refs[4]));
    Ok(())
}

#[test]
fn users_list_in_name_order() -> Result<()> {
    let store = store()?;
    store.create_user("Riley")?;
    store.create_user("Avery")?;
    assert!(store.create_user("   ").is_err());

    let names: Vec<String> = store
        .list_users()?
        .into_iter()
        .map(|user| user.display_name)
        .collect();
    assert_eq!(names, vec!["Avery", "Riley"]);
    Ok(())
}

#[test]
fn contact_load_streams_from_a_second_connection() -> Result<()> {
    let (_dir, path) = temp_db_path()?;
    let store = Store::open(&path)?;
    store.bootstrap()?;
    let mut faker = CrmFaker::new(34);
    for _ in 0..7 {
        store.create_contact(&faker.contact())?;
    }

    let mut selector = ContactSelector::new(
        PageConfig {
            page_size: 3,
            retries: 0,
        },
        50,
    );
    let ticket = selector.begin_load();
    let (tx, rx) = mpsc::channel();
    let handle = spawn_contact_load(Store::open(&path)?, ticket, tx);

    let mut notifications: Vec<Notification> = Vec::new();
    for event in rx {
        selector.apply(event, &mut notifications);
    }
    handle.join().expect("contact load thread");

    assert!(notifications.is_empty());
    assert!(!selector.is_loading());
    let loaded: Vec<String> = selector
        .contacts()
        .iter()
        .map(|contact| contact.id.to_string())
        .collect();
    let direct: Vec<String> = store
        .list_contacts_page(0, 100)?
        .into_iter()
        .map(|contact| contact.id.to_string())
        .collect();
    assert_eq!(loaded, direct);
    Ok(())
}
