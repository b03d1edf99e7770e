// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use crmdesk_app::{
    ActionItem, ActionItemId, ActionItemPatch, ActionItemPriority, ActionItemStatus,
    ActionItemsRuntime, ColumnField, Contact, ContactSource, Deal, DealId, DealPatch, Lead,
    LinkedRecordRef, LogNotifier, Notification, Notifier, RecordNameResolver, RecordNames,
    SortState, User, UserId, sort_action_items,
};
use crmdesk_db::Store;
use std::collections::BTreeMap;
use time::Date;

/// Binds the table and selector ports to a local [`Store`]. Sort state is
/// owned here because the table only signals header clicks.
pub struct StoreRuntime<'a> {
    store: &'a Store,
    sort: Option<SortState>,
    notifications: Vec<Notification>,
    edit_requests: Vec<ActionItemId>,
}

impl<'a> StoreRuntime<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            store,
            sort: None,
            notifications: Vec::new(),
            edit_requests: Vec::new(),
        }
    }

    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn edit_requests(&self) -> &[ActionItemId] {
        &self.edit_requests
    }

    /// Current collection in caller-side sort order.
    pub fn load_items(&mut self) -> Result<Vec<ActionItem>> {
        let mut items = self.store.list_action_items()?;
        if self.sort.is_some() {
            let refs: Vec<LinkedRecordRef> =
                items.iter().filter_map(LinkedRecordRef::for_item).collect();
            let names = RecordNames::from_map(self.store.record_names(&refs)?);
            let users = self.store.list_users()?;
            sort_action_items(&mut items, self.sort, &names, &users);
        }
        Ok(items)
    }
}

impl Notifier for StoreRuntime<'_> {
    fn notify(&mut self, notification: Notification) {
        LogNotifier.notify(notification.clone());
        self.notifications.push(notification);
    }
}

impl RecordNameResolver for StoreRuntime<'_> {
    fn record_names(
        &mut self,
        refs: &[LinkedRecordRef],
    ) -> Result<BTreeMap<LinkedRecordRef, String>> {
        self.store.record_names(refs)
    }
}

impl ContactSource for StoreRuntime<'_> {
    fn fetch_contacts_page(&mut self, offset: usize, limit: usize) -> Result<Vec<Contact>> {
        self.store.list_contacts_page(offset, limit)
    }
}

impl ActionItemsRuntime for StoreRuntime<'_> {
    fn edit(&mut self, item: &ActionItem) -> Result<()> {
        log::info!("edit requested for action item {}", item.id);
        self.edit_requests.push(item.id.clone());
        Ok(())
    }

    fn delete(&mut self, id: &ActionItemId) -> Result<()> {
        self.store.delete_action_item(id)
    }

    fn change_status(&mut self, id: &ActionItemId, status: ActionItemStatus) -> Result<()> {
        self.store
            .update_action_item(id, &ActionItemPatch::status(status))
    }

    fn change_priority(&mut self, id: &ActionItemId, priority: ActionItemPriority) -> Result<()> {
        self.store
            .update_action_item(id, &ActionItemPatch::priority(priority))
    }

    fn change_assignee(&mut self, id: &ActionItemId, user: Option<&UserId>) -> Result<()> {
        self.store
            .update_action_item(id, &ActionItemPatch::assigned_to(user.cloned()))
    }

    fn change_due_date(&mut self, id: &ActionItemId, date: Option<Date>) -> Result<()> {
        self.store
            .update_action_item(id, &ActionItemPatch::due_date(date))
    }

    fn sort_by(&mut self, field: ColumnField) {
        self.sort = SortState::toggle(self.sort, field);
    }

    fn resize_column(&mut self, field: ColumnField, width: u16) {
        if let Err(error) = self.store.put_column_width(field, width) {
            log::warn!("persist width for column {} failed: {error:#}", field.as_str());
        }
    }

    fn list_users(&mut self) -> Result<Vec<User>> {
        self.store.list_users()
    }

    fn fetch_deal(&mut self, id: &str) -> Result<Option<Deal>> {
        self.store.get_deal(id)
    }

    fn fetch_lead(&mut self, id: &str) -> Result<Option<Lead>> {
        self.store.get_lead(id)
    }

    fn fetch_contact(&mut self, id: &str) -> Result<Option<Contact>> {
        self.store.get_contact(id)
    }

    fn update_deal(&mut self, id: &DealId, patch: &DealPatch) -> Result<()> {
        self.store.update_deal(id, patch)
    }
}

#[cfg(test)]
mod tests {
    use super::StoreRuntime;
    use anyhow::Result;
    use crmdesk_app::{
        ActionItemStatus, ActionItemsTable, ColumnField, ContactSelector, DealPatch, DetailView,
        DueDateKey, HitTarget, LinkedKind, LinkedRecordRef, NewContact, PageConfig, RowAction,
        SortDirection,
    };
    use crmdesk_db::Store;
    use crmdesk_testkit::CrmFaker;

    fn store() -> Result<Store> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        Ok(store)
    }

    #[test]
    fn header_clicks_cycle_sort_and_reorder_listing() -> Result<()> {
        let store = store()?;
        let mut faker = CrmFaker::new(5);
        for title in ["beta", "Alpha", "gamma"] {
            let mut item = faker.action_item(None, None);
            item.title = title.to_owned();
            store.create_action_item(&item)?;
        }

        let mut runtime = StoreRuntime::new(&store);
        let mut table = ActionItemsTable::new();
        let items = runtime.load_items()?;
        table.mount(&mut runtime, items);

        assert!(table.click_header(&mut runtime, ColumnField::Title));
        let titles: Vec<String> = runtime
            .load_items()?
            .into_iter()
            .map(|item| item.title)
            .collect();
        assert_eq!(titles, vec!["Alpha", "beta", "gamma"]);

        table.click_header(&mut runtime, ColumnField::Title);
        assert_eq!(
            runtime.sort().map(|sort| sort.direction),
            Some(SortDirection::Desc)
        );
        assert!(!table.click_header(&mut runtime, ColumnField::Checkbox));
        Ok(())
    }

    #[test]
    fn due_date_edit_and_mark_complete_reach_the_store() -> Result<()> {
        let store = store()?;
        let id = store.create_action_item(&CrmFaker::new(8).action_item(None, None))?;
        store.update_action_item(
            &id,
            &crmdesk_app::ActionItemPatch::status(ActionItemStatus::Open),
        )?;

        let mut runtime = StoreRuntime::new(&store);
        let mut table = ActionItemsTable::new();
        let items = runtime.load_items()?;
        table.mount(&mut runtime, items);

        table.begin_due_date_edit(&mut runtime, &id);
        table.set_due_date_draft("2026-07-04");
        assert!(table.due_date_key(&mut runtime, DueDateKey::Enter));
        let stored = store.get_action_item(id.as_str())?.expect("item exists");
        assert_eq!(
            stored.due_date.map(|date| date.to_string()),
            Some("2026-07-04".to_owned())
        );

        assert!(table.apply_row_action(&mut runtime, &id, RowAction::MarkComplete));
        let stored = store.get_action_item(id.as_str())?.expect("item exists");
        assert_eq!(stored.status, ActionItemStatus::Completed);
        assert!(runtime.notifications().is_empty());
        Ok(())
    }

    #[test]
    fn failed_mutation_notifies_through_runtime() -> Result<()> {
        let store = store()?;
        let id = store.create_action_item(&CrmFaker::new(2).action_item(None, None))?;
        let mut runtime = StoreRuntime::new(&store);
        let mut table = ActionItemsTable::new();
        let items = runtime.load_items()?;
        table.mount(&mut runtime, items);

        store.delete_action_item(&id)?;
        assert!(!table.apply_row_action(&mut runtime, &id, RowAction::Delete));
        let notifications = runtime.take_notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].description, "Failed to delete action item");
        assert!(runtime.notifications().is_empty());
        Ok(())
    }

    #[test]
    fn row_click_records_edit_request() -> Result<()> {
        let store = store()?;
        let id = store.create_action_item(&CrmFaker::new(4).action_item(None, None))?;
        let mut runtime = StoreRuntime::new(&store);
        let mut table = ActionItemsTable::new();
        let items = runtime.load_items()?;
        table.mount(&mut runtime, items);

        table.click(&mut runtime, &id, HitTarget::Row);
        table.click(&mut runtime, &id, HitTarget::StatusSelect);
        assert_eq!(runtime.edit_requests(), &[id]);
        Ok(())
    }

    #[test]
    fn linked_deal_opens_detail_view() -> Result<()> {
        let store = store()?;
        let mut faker = CrmFaker::new(13);
        let deal_id = store.create_deal(&faker.deal())?;
        let item_id = store.create_action_item(&faker.action_item(
            None,
            Some(LinkedRecordRef::new(LinkedKind::Deal, deal_id.as_str())),
        ))?;

        let mut runtime = StoreRuntime::new(&store);
        let mut table = ActionItemsTable::new();
        let items = runtime.load_items()?;
        table.mount(&mut runtime, items);

        assert!(table.activate_linked_record(&mut runtime, &item_id));
        assert!(matches!(table.detail(), DetailView::Deal(deal) if deal.id == deal_id));
        Ok(())
    }

    #[test]
    fn saved_deal_name_replaces_cached_module_label() -> Result<()> {
        let store = store()?;
        let mut faker = CrmFaker::new(13);
        let deal_id = store.create_deal(&faker.deal())?;
        let key = LinkedRecordRef::new(LinkedKind::Deal, deal_id.as_str());
        let item_id = store.create_action_item(&faker.action_item(None, Some(key.clone())))?;

        let mut runtime = StoreRuntime::new(&store);
        let mut table = ActionItemsTable::new();
        let items = runtime.load_items()?;
        table.mount(&mut runtime, items);
        assert!(table.activate_linked_record(&mut runtime, &item_id));

        let patch = DealPatch {
            deal_name: Some("Renamed Deal".to_owned()),
            ..DealPatch::default()
        };
        assert!(table.save_deal(&mut runtime, &patch));
        assert_eq!(table.record_names().get(&key), Some("Renamed Deal"));

        let items = runtime.load_items()?;
        table.set_items(&mut runtime, items);
        assert_eq!(table.record_names().get(&key), Some("Renamed Deal"));
        Ok(())
    }

    #[test]
    fn narrow_stored_width_is_rejected_and_table_keeps_floor() -> Result<()> {
        let store = store()?;
        store.put_column_width(ColumnField::Title, 200)?;
        let mut runtime = StoreRuntime::new(&store);
        let mut table = ActionItemsTable::new();
        table.mount(&mut runtime, Vec::new());
        table.set_column_widths(store.get_column_widths()?);

        assert!(store.put_column_width(ColumnField::Title, 10).is_err());
        assert_eq!(
            store.get_column_widths()?.get(&ColumnField::Title),
            Some(&200)
        );
        assert!(table.column_width(ColumnField::Title) >= crmdesk_app::MIN_COLUMN_WIDTH);
        Ok(())
    }

    #[test]
    fn resize_persists_width() -> Result<()> {
        let store = store()?;
        let mut runtime = StoreRuntime::new(&store);
        let mut table = ActionItemsTable::new();
        table.mount(&mut runtime, Vec::new());

        assert!(table.begin_resize(ColumnField::Title, 100));
        assert_eq!(table.drag_resize(&mut runtime, 180), Some(380));
        table.end_resize();
        assert_eq!(
            store.get_column_widths()?.get(&ColumnField::Title),
            Some(&380)
        );
        Ok(())
    }

    #[test]
    fn selector_pages_through_store_contacts() -> Result<()> {
        let store = store()?;
        let mut faker = CrmFaker::new(17);
        for _ in 0..7 {
            store.create_contact(&faker.contact())?;
        }
        store.create_contact(&NewContact {
            contact_name: "Zed Zulu".to_owned(),
            company_name: Some("Quietwater".to_owned()),
            ..NewContact::default()
        })?;

        let mut runtime = StoreRuntime::new(&store);
        let mut selector = ContactSelector::new(
            PageConfig {
                page_size: 3,
                retries: 0,
            },
            5,
        );
        let mut notifications = Vec::new();
        assert!(selector.load_blocking(&mut runtime, &mut notifications));
        assert_eq!(selector.contacts().len(), 8);
        assert!(notifications.is_empty());

        selector.set_search("QUIET");
        let names: Vec<&str> = selector
            .filtered()
            .into_iter()
            .map(|contact| contact.contact_name.as_str())
            .collect();
        assert_eq!(names, vec!["Zed Zulu"]);

        selector.set_search("");
        assert_eq!(selector.filtered().len(), 5);
        Ok(())
    }
}
