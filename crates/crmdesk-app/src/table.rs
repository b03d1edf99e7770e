// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use time::Date;

use crate::{
    ActionItem, ActionItemId, ActionItemPriority, ActionItemStatus, Contact, Deal, DealId,
    DealPatch, DetailView, Lead, LinkedKind, LinkedRecordRef, Notification, Notifier,
    RecordNameResolver, RecordNames, SortDirection, User, UserId, format_due_date,
    format_iso_date, parse_iso_date,
};

pub const MIN_COLUMN_WIDTH: u16 = 60;
pub const UNASSIGNED_LABEL: &str = "Unassigned";
const UNKNOWN_USER_LABEL: &str = "Unknown user";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ColumnField {
    Checkbox,
    Title,
    AssignedTo,
    Status,
    DueDate,
    Priority,
    Module,
    Actions,
}

impl ColumnField {
    pub const ALL: [Self; 8] = [
        Self::Checkbox,
        Self::Title,
        Self::AssignedTo,
        Self::Status,
        Self::DueDate,
        Self::Priority,
        Self::Module,
        Self::Actions,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checkbox => "checkbox",
            Self::Title => "title",
            Self::AssignedTo => "assigned_to",
            Self::Status => "status",
            Self::DueDate => "due_date",
            Self::Priority => "priority",
            Self::Module => "module",
            Self::Actions => "actions",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == value)
    }

    pub const fn spec(self) -> ColumnSpec {
        match self {
            Self::Checkbox => ColumnSpec::fixed(self, "", 40, Align::Center),
            Self::Title => ColumnSpec::data(self, "Task", 300),
            Self::AssignedTo => ColumnSpec::data(self, "Assigned To", 100),
            Self::Status => ColumnSpec::data(self, "Status", 90),
            Self::DueDate => ColumnSpec::data(self, "Due Date", 100),
            Self::Priority => ColumnSpec::data(self, "Priority", 75),
            Self::Module => ColumnSpec::data(self, "Module", 60),
            Self::Actions => ColumnSpec::fixed(self, "", 60, Align::Left),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub field: ColumnField,
    pub label: &'static str,
    pub sortable: bool,
    pub resizable: bool,
    pub default_width: u16,
    pub align: Align,
}

impl ColumnSpec {
    const fn data(field: ColumnField, label: &'static str, default_width: u16) -> Self {
        Self {
            field,
            label,
            sortable: true,
            resizable: true,
            default_width,
            align: Align::Left,
        }
    }

    const fn fixed(field: ColumnField, label: &'static str, width: u16, align: Align) -> Self {
        Self {
            field,
            label,
            sortable: false,
            resizable: false,
            default_width: width,
            align,
        }
    }
}

pub type ColumnWidths = BTreeMap<ColumnField, u16>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub field: ColumnField,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortIndicator {
    Neutral,
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectAllState {
    None,
    Some,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssigneeChoice {
    Unassigned,
    User(UserId),
}

impl AssigneeChoice {
    pub fn into_user(self) -> Option<UserId> {
        match self {
            Self::Unassigned => None,
            Self::User(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowAction {
    Edit,
    MarkComplete,
    Delete,
}

impl RowAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Edit => "Edit",
            Self::MarkComplete => "Mark Complete",
            Self::Delete => "Delete",
        }
    }
}

/// Where inside a row a click landed. Only `Row` and `Title` reach the row's
/// primary action; every other target handles the click itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Row,
    Title,
    Checkbox,
    AssigneeSelect,
    StatusSelect,
    DueDate,
    PrioritySelect,
    LinkedRecord,
    ActionsMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Edited,
    Handled,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueDateKey {
    Enter,
    Escape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DueDateEdit {
    item_id: ActionItemId,
    draft: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnResize {
    field: ColumnField,
    start_x: i32,
    start_width: u16,
}

/// The owning screen's persistence and lookup surface. The table never
/// persists anything itself; every mutation is forwarded here.
pub trait ActionItemsRuntime: RecordNameResolver + Notifier {
    fn edit(&mut self, item: &ActionItem) -> Result<()>;
    fn delete(&mut self, id: &ActionItemId) -> Result<()>;
    fn change_status(&mut self, id: &ActionItemId, status: ActionItemStatus) -> Result<()>;
    fn change_priority(&mut self, id: &ActionItemId, priority: ActionItemPriority) -> Result<()>;
    fn change_assignee(&mut self, id: &ActionItemId, user: Option<&UserId>) -> Result<()>;
    fn change_due_date(&mut self, id: &ActionItemId, date: Option<Date>) -> Result<()>;
    fn sort_by(&mut self, field: ColumnField);
    fn resize_column(&mut self, field: ColumnField, width: u16);
    fn list_users(&mut self) -> Result<Vec<User>>;
    fn fetch_deal(&mut self, id: &str) -> Result<Option<Deal>>;
    fn fetch_lead(&mut self, id: &str) -> Result<Option<Lead>>;
    fn fetch_contact(&mut self, id: &str) -> Result<Option<Contact>>;
    fn update_deal(&mut self, id: &DealId, patch: &DealPatch) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
    pub spec: ColumnSpec,
    pub width: u16,
    pub indicator: Option<SortIndicator>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkedLabel {
    pub kind: LinkedKind,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    pub id: ActionItemId,
    pub title: String,
    pub assignee: String,
    pub status: ActionItemStatus,
    pub priority: ActionItemPriority,
    pub due_date: String,
    pub due_date_draft: Option<String>,
    pub linked: Option<LinkedLabel>,
    pub selected: bool,
    pub actions: Vec<RowAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub title: &'static str,
    pub hint: &'static str,
}

pub const EMPTY_TABLE: EmptyState = EmptyState {
    title: "No action items found",
    hint: "Create a new action item to get started",
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody {
    Empty(EmptyState),
    Rows(Vec<RowView>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionItemsTable {
    items: Vec<ActionItem>,
    sort: Option<SortState>,
    column_widths: ColumnWidths,
    users: Vec<User>,
    names: RecordNames,
    selection: BTreeSet<ActionItemId>,
    due_date_edit: Option<DueDateEdit>,
    resize: Option<ColumnResize>,
    detail: DetailView,
}

impl ActionItemsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the user directory and the initial collection.
    pub fn mount<R: ActionItemsRuntime>(&mut self, runtime: &mut R, items: Vec<ActionItem>) {
        match runtime.list_users() {
            Ok(users) => self.users = users,
            Err(error) => {
                log::warn!("load users failed: {error:#}");
                runtime.notify(Notification::error("Failed to load users"));
            }
        }
        self.set_items(runtime, items);
    }

    /// Replaces the displayed collection and drops any transient state that
    /// pointed at rows which are no longer present.
    pub fn set_items<R: ActionItemsRuntime>(&mut self, runtime: &mut R, items: Vec<ActionItem>) {
        self.items = items;
        let present: BTreeSet<&ActionItemId> = self.items.iter().map(|item| &item.id).collect();
        self.selection.retain(|id| present.contains(id));
        if self
            .due_date_edit
            .as_ref()
            .is_some_and(|edit| !present.contains(&edit.item_id))
        {
            self.due_date_edit = None;
        }

        if let Err(error) = self.names.refresh(runtime, &self.items) {
            log::warn!("resolve linked record names failed: {error:#}");
        }
    }

    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }

    pub fn set_sort(&mut self, sort: Option<SortState>) {
        self.sort = sort;
    }

    pub fn set_column_widths(&mut self, widths: ColumnWidths) {
        self.column_widths = widths;
    }

    pub fn set_column_width(&mut self, field: ColumnField, width: u16) {
        self.column_widths.insert(field, width);
    }

    pub fn items(&self) -> &[ActionItem] {
        &self.items
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn item(&self, id: &ActionItemId) -> Option<&ActionItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn record_names(&self) -> &RecordNames {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // Selection.

    pub fn toggle_all(&mut self) {
        if self.select_all_state() == SelectAllState::All {
            self.selection.clear();
        } else {
            self.selection = self.items.iter().map(|item| item.id.clone()).collect();
        }
    }

    pub fn toggle_item(&mut self, id: &ActionItemId) -> bool {
        if self.item(id).is_none() {
            return false;
        }
        if !self.selection.remove(id) {
            self.selection.insert(id.clone());
        }
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, id: &ActionItemId) -> bool {
        self.selection.contains(id)
    }

    pub fn selected_ids(&self) -> Vec<ActionItemId> {
        self.items
            .iter()
            .filter(|item| self.selection.contains(&item.id))
            .map(|item| item.id.clone())
            .collect()
    }

    pub fn select_all_state(&self) -> SelectAllState {
        if self.items.is_empty() || self.selection.is_empty() {
            SelectAllState::None
        } else if self.selection.len() == self.items.len() {
            SelectAllState::All
        } else {
            SelectAllState::Some
        }
    }

    // Sorting.

    pub fn click_header<R: ActionItemsRuntime>(
        &mut self,
        runtime: &mut R,
        field: ColumnField,
    ) -> bool {
        if !field.spec().sortable {
            return false;
        }
        runtime.sort_by(field);
        true
    }

    pub fn sort_indicator(&self, field: ColumnField) -> Option<SortIndicator> {
        if !field.spec().sortable {
            return None;
        }
        Some(match self.sort {
            Some(sort) if sort.field == field => match sort.direction {
                SortDirection::Asc => SortIndicator::Ascending,
                SortDirection::Desc => SortIndicator::Descending,
            },
            _ => SortIndicator::Neutral,
        })
    }

    // Column resize.

    pub fn column_width(&self, field: ColumnField) -> u16 {
        let spec = field.spec();
        if !spec.resizable {
            return spec.default_width;
        }
        self.column_widths
            .get(&field)
            .copied()
            .filter(|width| *width > 0)
            .map_or(spec.default_width, |width| width.max(MIN_COLUMN_WIDTH))
    }

    /// Starts a resize drag. Only valid when no other resize is active.
    pub fn begin_resize(&mut self, field: ColumnField, pointer_x: i32) -> bool {
        if self.resize.is_some() || !field.spec().resizable {
            return false;
        }
        self.resize = Some(ColumnResize {
            field,
            start_x: pointer_x,
            start_width: self.column_width(field),
        });
        true
    }

    pub fn drag_resize<R: ActionItemsRuntime>(
        &mut self,
        runtime: &mut R,
        pointer_x: i32,
    ) -> Option<u16> {
        let resize = self.resize?;
        let width = resized_width(resize.start_width, resize.start_x, pointer_x);
        runtime.resize_column(resize.field, width);
        Some(width)
    }

    pub fn end_resize(&mut self) -> bool {
        self.resize.take().is_some()
    }

    /// Hosts should only route pointer move/release events here while this
    /// returns true.
    pub fn is_capturing_pointer(&self) -> bool {
        self.resize.is_some()
    }

    pub fn resizing_column(&self) -> Option<ColumnField> {
        self.resize.map(|resize| resize.field)
    }

    // Inline due-date edit.

    pub fn begin_due_date_edit<R: ActionItemsRuntime>(
        &mut self,
        runtime: &mut R,
        id: &ActionItemId,
    ) -> bool {
        let Some(item) = self.item(id) else {
            return false;
        };
        let draft = match item.due_date.map(format_iso_date).transpose() {
            Ok(draft) => draft.unwrap_or_default(),
            Err(error) => {
                log::warn!("seed due date draft for {id} failed: {error:#}");
                String::new()
            }
        };
        if self
            .due_date_edit
            .as_ref()
            .is_some_and(|edit| &edit.item_id == id)
        {
            return true;
        }
        if self.due_date_edit.is_some() {
            self.commit_due_date_edit(runtime);
        }
        self.due_date_edit = Some(DueDateEdit {
            item_id: id.clone(),
            draft,
        });
        true
    }

    pub fn set_due_date_draft(&mut self, value: impl Into<String>) -> bool {
        match self.due_date_edit.as_mut() {
            Some(edit) => {
                edit.draft = value.into();
                true
            }
            None => false,
        }
    }

    pub fn editing_due_date(&self) -> Option<&ActionItemId> {
        self.due_date_edit.as_ref().map(|edit| &edit.item_id)
    }

    pub fn due_date_key<R: ActionItemsRuntime>(&mut self, runtime: &mut R, key: DueDateKey) -> bool {
        match key {
            DueDateKey::Enter => self.commit_due_date_edit(runtime),
            DueDateKey::Escape => self.cancel_due_date_edit(),
        }
    }

    /// Blur or Enter. Empty input clears the date; returns whether a change
    /// was signalled.
    pub fn commit_due_date_edit<R: ActionItemsRuntime>(&mut self, runtime: &mut R) -> bool {
        let Some(edit) = self.due_date_edit.take() else {
            return false;
        };
        let trimmed = edit.draft.trim();
        let date = if trimmed.is_empty() {
            None
        } else {
            match parse_iso_date(trimmed) {
                Some(date) => Some(date),
                None => {
                    runtime.notify(Notification::warning(format!(
                        "Invalid due date {trimmed:?}; use YYYY-MM-DD"
                    )));
                    return false;
                }
            }
        };
        if let Err(error) = runtime.change_due_date(&edit.item_id, date) {
            report_failure(runtime, "update due date", &error);
        }
        true
    }

    pub fn cancel_due_date_edit(&mut self) -> bool {
        self.due_date_edit.take().is_some()
    }

    // Per-row field mutations.

    pub fn change_status<R: ActionItemsRuntime>(
        &mut self,
        runtime: &mut R,
        id: &ActionItemId,
        status: ActionItemStatus,
    ) -> bool {
        if self.item(id).is_none() {
            return false;
        }
        if let Err(error) = runtime.change_status(id, status) {
            report_failure(runtime, "update status", &error);
        }
        true
    }

    pub fn change_priority<R: ActionItemsRuntime>(
        &mut self,
        runtime: &mut R,
        id: &ActionItemId,
        priority: ActionItemPriority,
    ) -> bool {
        if self.item(id).is_none() {
            return false;
        }
        if let Err(error) = runtime.change_priority(id, priority) {
            report_failure(runtime, "update priority", &error);
        }
        true
    }

    pub fn change_assignee<R: ActionItemsRuntime>(
        &mut self,
        runtime: &mut R,
        id: &ActionItemId,
        choice: AssigneeChoice,
    ) -> bool {
        if self.item(id).is_none() {
            return false;
        }
        let user = choice.into_user();
        if let Err(error) = runtime.change_assignee(id, user.as_ref()) {
            report_failure(runtime, "update assignee", &error);
        }
        true
    }

    pub fn assignee_choices(&self) -> Vec<(AssigneeChoice, String)> {
        let mut choices = Vec::with_capacity(self.users.len() + 1);
        choices.push((AssigneeChoice::Unassigned, UNASSIGNED_LABEL.to_owned()));
        choices.extend(
            self.users
                .iter()
                .map(|user| (AssigneeChoice::User(user.id.clone()), user.display_name.clone())),
        );
        choices
    }

    pub fn assignee_label(&self, user: Option<&UserId>) -> String {
        let Some(user) = user else {
            return UNASSIGNED_LABEL.to_owned();
        };
        self.users
            .iter()
            .find(|candidate| &candidate.id == user)
            .map_or_else(|| UNKNOWN_USER_LABEL.to_owned(), |found| found.display_name.clone())
    }

    // Row actions.

    pub fn row_actions(&self, id: &ActionItemId) -> Vec<RowAction> {
        let Some(item) = self.item(id) else {
            return Vec::new();
        };
        let mut actions = vec![RowAction::Edit];
        if item.status != ActionItemStatus::Completed {
            actions.push(RowAction::MarkComplete);
        }
        actions.push(RowAction::Delete);
        actions
    }

    pub fn apply_row_action<R: ActionItemsRuntime>(
        &mut self,
        runtime: &mut R,
        id: &ActionItemId,
        action: RowAction,
    ) -> bool {
        if !self.row_actions(id).contains(&action) {
            return false;
        }
        match action {
            RowAction::Edit => self.edit_row(runtime, id),
            RowAction::MarkComplete => self.change_status(runtime, id, ActionItemStatus::Completed),
            RowAction::Delete => match runtime.delete(id) {
                Ok(()) => {
                    self.selection.remove(id);
                    true
                }
                Err(error) => {
                    report_failure(runtime, "delete action item", &error);
                    false
                }
            },
        }
    }

    fn edit_row<R: ActionItemsRuntime>(&mut self, runtime: &mut R, id: &ActionItemId) -> bool {
        let Some(item) = self.item(id).cloned() else {
            return false;
        };
        if let Err(error) = runtime.edit(&item) {
            report_failure(runtime, "open action item", &error);
        }
        true
    }

    /// Routes a click inside a row. Interactive targets consume the click so
    /// it never reaches the row's edit action.
    pub fn click<R: ActionItemsRuntime>(
        &mut self,
        runtime: &mut R,
        id: &ActionItemId,
        target: HitTarget,
    ) -> ClickOutcome {
        if self.item(id).is_none() {
            return ClickOutcome::Ignored;
        }
        match target {
            HitTarget::Row | HitTarget::Title => {
                self.edit_row(runtime, id);
                ClickOutcome::Edited
            }
            HitTarget::Checkbox => {
                self.toggle_item(id);
                ClickOutcome::Handled
            }
            HitTarget::DueDate => {
                self.begin_due_date_edit(runtime, id);
                ClickOutcome::Handled
            }
            HitTarget::LinkedRecord => {
                self.activate_linked_record(runtime, id);
                ClickOutcome::Handled
            }
            HitTarget::AssigneeSelect
            | HitTarget::StatusSelect
            | HitTarget::PrioritySelect
            | HitTarget::ActionsMenu => ClickOutcome::Handled,
        }
    }

    // Linked records.

    /// Opens the detail view for the row's linked record. Only rows whose
    /// label has been resolved are clickable.
    pub fn activate_linked_record<R: ActionItemsRuntime>(
        &mut self,
        runtime: &mut R,
        id: &ActionItemId,
    ) -> bool {
        let Some(item) = self.item(id) else {
            return false;
        };
        let Some(linked) = LinkedRecordRef::for_item(item) else {
            return false;
        };
        if self.names.get(&linked).is_none() {
            return false;
        }
        self.open_linked(runtime, &linked)
    }

    pub fn open_linked<R: ActionItemsRuntime>(
        &mut self,
        runtime: &mut R,
        linked: &LinkedRecordRef,
    ) -> bool {
        let fetched = match linked.kind {
            LinkedKind::Deal => runtime
                .fetch_deal(&linked.id)
                .map(|found| found.map(DetailView::Deal)),
            LinkedKind::Lead => runtime
                .fetch_lead(&linked.id)
                .map(|found| found.map(DetailView::Lead)),
            LinkedKind::Contact => runtime
                .fetch_contact(&linked.id)
                .map(|found| found.map(DetailView::Contact)),
        };
        match fetched {
            Ok(Some(view)) => {
                self.detail = view;
                true
            }
            Ok(None) => {
                log::debug!(
                    "linked {} {} not found",
                    linked.kind.collection(),
                    linked.id
                );
                false
            }
            Err(error) => {
                log::warn!(
                    "fetch linked {} {} failed: {error:#}",
                    linked.kind.collection(),
                    linked.id
                );
                runtime.notify(Notification::error(format!(
                    "Failed to load {}",
                    linked.kind.label().to_ascii_lowercase()
                )));
                false
            }
        }
    }

    pub fn detail(&self) -> &DetailView {
        &self.detail
    }

    pub fn close_detail(&mut self) {
        self.detail = DetailView::Closed;
    }

    /// Lead and contact views report success after saving on their own.
    /// The record's cached label is dropped so the next `set_items`
    /// resolves the saved name.
    pub fn detail_succeeded(&mut self) {
        if let Some(key) = self.detail.record_ref() {
            self.names.invalidate(&key);
        }
        self.close_detail();
    }

    pub fn save_deal<R: ActionItemsRuntime>(&mut self, runtime: &mut R, patch: &DealPatch) -> bool {
        let DetailView::Deal(deal) = &self.detail else {
            return false;
        };
        let deal_id = deal.id.clone();
        if let Err(error) = patch.validate() {
            runtime.notify(Notification::warning(error.to_string()));
            return false;
        }
        match runtime.update_deal(&deal_id, patch) {
            Ok(()) => {
                self.names
                    .invalidate(&LinkedRecordRef::new(LinkedKind::Deal, deal_id.as_str()));
                if let Err(error) = self.names.refresh(runtime, &self.items) {
                    log::warn!("resolve linked record names failed: {error:#}");
                }
                self.close_detail();
                true
            }
            Err(error) => {
                report_failure(runtime, "save deal", &error);
                false
            }
        }
    }

    /// Releases pointer capture and drops per-mount transient state.
    pub fn teardown(&mut self) {
        self.resize = None;
        self.due_date_edit = None;
        self.detail = DetailView::Closed;
        self.selection.clear();
    }

    // Projection.

    pub fn columns(&self) -> Vec<ColumnView> {
        ColumnField::ALL
            .into_iter()
            .map(|field| ColumnView {
                spec: field.spec(),
                width: self.column_width(field),
                indicator: self.sort_indicator(field),
                active: self.sort.is_some_and(|sort| sort.field == field),
            })
            .collect()
    }

    pub fn body(&self) -> TableBody {
        if self.items.is_empty() {
            return TableBody::Empty(EMPTY_TABLE);
        }
        TableBody::Rows(self.items.iter().map(|item| self.row_view(item)).collect())
    }

    fn row_view(&self, item: &ActionItem) -> RowView {
        let linked = LinkedRecordRef::for_item(item).and_then(|key| {
            self.names.get(&key).map(|label| LinkedLabel {
                kind: key.kind,
                label: label.to_owned(),
            })
        });
        let due_date_draft = self
            .due_date_edit
            .as_ref()
            .filter(|edit| edit.item_id == item.id)
            .map(|edit| edit.draft.clone());
        RowView {
            id: item.id.clone(),
            title: item.title.clone(),
            assignee: self.assignee_label(item.assigned_to.as_ref()),
            status: item.status,
            priority: item.priority,
            due_date: format_due_date(item.due_date),
            due_date_draft,
            linked,
            selected: self.selection.contains(&item.id),
            actions: self.row_actions(&item.id),
        }
    }
}

pub fn resized_width(start_width: u16, start_x: i32, pointer_x: i32) -> u16 {
    let delta = i64::from(pointer_x) - i64::from(start_x);
    let width = (i64::from(start_width) + delta).max(i64::from(MIN_COLUMN_WIDTH));
    u16::try_from(width).unwrap_or(u16::MAX)
}

fn report_failure<R: Notifier + ?Sized>(runtime: &mut R, action: &str, error: &anyhow::Error) {
    log::warn!("{action} failed: {error:#}");
    runtime.notify(Notification::error(format!("Failed to {action}")));
}
