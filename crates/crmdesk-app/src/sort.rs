// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use crate::{ActionItem, ColumnField, RecordNames, SortDirection, SortState, User, UserId};

impl SortState {
    pub const fn ascending(field: ColumnField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    /// Header click handling on the owning side: a new field starts
    /// ascending, the active field flips direction.
    pub fn toggle(current: Option<Self>, field: ColumnField) -> Option<Self> {
        if !field.spec().sortable {
            return current;
        }
        match current {
            Some(active) if active.field == field => Some(Self {
                field,
                direction: active.direction.flipped(),
            }),
            _ => Some(Self::ascending(field)),
        }
    }
}

/// Stable sort; empty values go last in both directions and ties fall back
/// to the record id.
pub fn sort_action_items(
    items: &mut [ActionItem],
    sort: Option<SortState>,
    names: &RecordNames,
    users: &[User],
) {
    let Some(sort) = sort else {
        return;
    };
    if !sort.field.spec().sortable {
        return;
    }
    items.sort_by(|left, right| {
        compare_field(left, right, sort, names, users).then_with(|| left.id.cmp(&right.id))
    });
}

fn compare_field(
    left: &ActionItem,
    right: &ActionItem,
    sort: SortState,
    names: &RecordNames,
    users: &[User],
) -> Ordering {
    match sort.field {
        ColumnField::Title => directed(
            sort.direction,
            left.title.to_lowercase().cmp(&right.title.to_lowercase()),
        ),
        ColumnField::AssignedTo => nulls_last(
            assignee_name(users, left.assigned_to.as_ref()),
            assignee_name(users, right.assigned_to.as_ref()),
            sort.direction,
        ),
        ColumnField::Status => directed(sort.direction, left.status.cmp(&right.status)),
        ColumnField::DueDate => nulls_last(left.due_date, right.due_date, sort.direction),
        ColumnField::Priority => directed(
            sort.direction,
            left.priority.rank().cmp(&right.priority.rank()),
        ),
        ColumnField::Module => nulls_last(
            names.for_item(left).map(str::to_lowercase),
            names.for_item(right).map(str::to_lowercase),
            sort.direction,
        ),
        ColumnField::Checkbox | ColumnField::Actions => Ordering::Equal,
    }
}

fn assignee_name(users: &[User], id: Option<&UserId>) -> Option<String> {
    let id = id?;
    users
        .iter()
        .find(|user| &user.id == id)
        .map(|user| user.display_name.to_lowercase())
}

fn directed(direction: SortDirection, ordering: Ordering) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn nulls_last<T: Ord>(left: Option<T>, right: Option<T>, direction: SortDirection) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => directed(direction, left.cmp(&right)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::sort_action_items;
    use crate::{
        ActionItem, ActionItemId, ActionItemPriority, ActionItemStatus, ColumnField,
        LinkedRecordRef, RecordNames, SortDirection, SortState, User, UserId,
    };
    use std::collections::BTreeMap;
    use time::{Date, Month, OffsetDateTime};

    fn item(id: &str, title: &str) -> ActionItem {
        ActionItem {
            id: ActionItemId::from(id),
            title: title.to_owned(),
            assigned_to: None,
            status: ActionItemStatus::Open,
            priority: ActionItemPriority::Medium,
            due_date: None,
            module_type: None,
            module_id: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn ids(items: &[ActionItem]) -> Vec<&str> {
        items.iter().map(|item| item.id.as_str()).collect()
    }

    fn day(value: u8) -> Option<Date> {
        Some(Date::from_calendar_date(2024, Month::March, value).expect("valid date"))
    }

    #[test]
    fn toggle_starts_ascending_and_flips_on_same_field() {
        let first = SortState::toggle(None, ColumnField::Title);
        assert_eq!(first, Some(SortState::ascending(ColumnField::Title)));

        let second = SortState::toggle(first, ColumnField::Title);
        assert_eq!(second.map(|sort| sort.direction), Some(SortDirection::Desc));

        let other = SortState::toggle(second, ColumnField::Status);
        assert_eq!(other, Some(SortState::ascending(ColumnField::Status)));

        assert_eq!(SortState::toggle(other, ColumnField::Checkbox), other);
    }

    #[test]
    fn due_date_sort_keeps_missing_dates_last() {
        let mut items = vec![item("a", "a"), item("b", "b"), item("c", "c"), item("d", "d")];
        items[0].due_date = day(9);
        items[2].due_date = day(1);
        items[3].due_date = day(5);
        let names = RecordNames::default();

        sort_action_items(
            &mut items,
            Some(SortState::ascending(ColumnField::DueDate)),
            &names,
            &[],
        );
        assert_eq!(ids(&items), vec!["c", "d", "a", "b"]);

        sort_action_items(
            &mut items,
            Some(SortState {
                field: ColumnField::DueDate,
                direction: SortDirection::Desc,
            }),
            &names,
            &[],
        );
        assert_eq!(ids(&items), vec!["a", "d", "c", "b"]);
    }

    #[test]
    fn priority_sorts_by_rank_with_id_tiebreak() {
        let mut items = vec![item("b", "x"), item("a", "x"), item("c", "x")];
        items[0].priority = ActionItemPriority::Low;
        items[1].priority = ActionItemPriority::Low;
        items[2].priority = ActionItemPriority::High;

        sort_action_items(
            &mut items,
            Some(SortState::ascending(ColumnField::Priority)),
            &RecordNames::default(),
            &[],
        );
        assert_eq!(ids(&items), vec!["c", "a", "b"]);
    }

    #[test]
    fn assignee_and_module_sort_use_display_labels() {
        let users = vec![
            User {
                id: UserId::from("u1"),
                display_name: "Zed".to_owned(),
            },
            User {
                id: UserId::from("u2"),
                display_name: "amy".to_owned(),
            },
        ];
        let mut items = vec![item("a", "a"), item("b", "b"), item("c", "c")];
        items[0].assigned_to = Some(UserId::from("u1"));
        items[1].assigned_to = Some(UserId::from("u2"));

        sort_action_items(
            &mut items,
            Some(SortState::ascending(ColumnField::AssignedTo)),
            &RecordNames::default(),
            &users,
        );
        assert_eq!(ids(&items), vec!["b", "a", "c"]);

        for entry in &mut items {
            entry.module_type = Some("deal".to_owned());
            entry.module_id = Some(format!("d-{}", entry.id));
        }
        let names = RecordNames::from_map(BTreeMap::from([
            (
                LinkedRecordRef::parse("deal", "d-a").expect("ref"),
                "Beta".to_owned(),
            ),
            (
                LinkedRecordRef::parse("deal", "d-c").expect("ref"),
                "alpha".to_owned(),
            ),
        ]));
        sort_action_items(
            &mut items,
            Some(SortState::ascending(ColumnField::Module)),
            &names,
            &users,
        );
        assert_eq!(ids(&items), vec!["c", "a", "b"]);
    }

    #[test]
    fn no_sort_keeps_order() {
        let mut items = vec![item("b", "z"), item("a", "y")];
        sort_action_items(&mut items, None, &RecordNames::default(), &[]);
        assert_eq!(ids(&items), vec!["b", "a"]);
    }
}
