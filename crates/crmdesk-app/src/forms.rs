// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use time::Date;

use crate::{ActionItemPriority, ActionItemStatus, LinkedRecordRef, UserId};

/// Creation inputs. Ids and timestamps are assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewContact {
    pub contact_name: String,
    pub company_name: Option<String>,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone_no: Option<String>,
    pub region: Option<String>,
    pub contact_owner: Option<String>,
    pub contact_source: Option<String>,
    pub industry: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewDeal {
    pub deal_name: String,
    pub stage: String,
    pub customer_name: Option<String>,
    pub total_contract_cents: Option<i64>,
    pub expected_closing_date: Option<Date>,
    pub lead_owner: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewLead {
    pub lead_name: String,
    pub company_name: Option<String>,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone_no: Option<String>,
    pub lead_status: Option<String>,
    pub contact_owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActionItem {
    pub title: String,
    pub assigned_to: Option<UserId>,
    pub status: ActionItemStatus,
    pub priority: ActionItemPriority,
    pub due_date: Option<Date>,
    pub linked: Option<LinkedRecordRef>,
}

/// Partial update for an action item. Outer `None` leaves a field untouched;
/// `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionItemPatch {
    pub title: Option<String>,
    pub assigned_to: Option<Option<UserId>>,
    pub status: Option<ActionItemStatus>,
    pub priority: Option<ActionItemPriority>,
    pub due_date: Option<Option<Date>>,
}

impl ActionItemPatch {
    pub fn status(status: ActionItemStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn priority(priority: ActionItemPriority) -> Self {
        Self {
            priority: Some(priority),
            ..Self::default()
        }
    }

    pub fn assigned_to(user: Option<UserId>) -> Self {
        Self {
            assigned_to: Some(user),
            ..Self::default()
        }
    }

    pub fn due_date(date: Option<Date>) -> Self {
        Self {
            due_date: Some(date),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.assigned_to.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            bail!("action item update has no fields -- change at least one field and retry");
        }
        if let Some(title) = &self.title
            && title.trim().is_empty()
        {
            bail!("action item title is required -- enter a title and retry");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DealPatch {
    pub deal_name: Option<String>,
    pub stage: Option<String>,
    pub customer_name: Option<Option<String>>,
    pub total_contract_cents: Option<Option<i64>>,
    pub expected_closing_date: Option<Option<Date>>,
    pub lead_owner: Option<Option<String>>,
}

impl DealPatch {
    pub fn is_empty(&self) -> bool {
        self.deal_name.is_none()
            && self.stage.is_none()
            && self.customer_name.is_none()
            && self.total_contract_cents.is_none()
            && self.expected_closing_date.is_none()
            && self.lead_owner.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            bail!("deal update has no fields -- change at least one field and retry");
        }
        if let Some(name) = &self.deal_name
            && name.trim().is_empty()
        {
            bail!("deal name is required -- enter a name and retry");
        }
        if let Some(stage) = &self.stage
            && stage.trim().is_empty()
        {
            bail!("deal stage is required -- choose a stage and retry");
        }
        if let Some(Some(total)) = self.total_contract_cents
            && total < 0
        {
            bail!("deal contract value cannot be negative");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ActionItemPatch, DealPatch};
    use crate::ActionItemStatus;

    #[test]
    fn empty_patch_is_rejected() {
        let error = ActionItemPatch::default()
            .validate()
            .expect_err("empty patch should fail");
        assert!(error.to_string().contains("no fields"));
    }

    #[test]
    fn single_field_constructors_touch_one_field() {
        let patch = ActionItemPatch::status(ActionItemStatus::Completed);
        assert_eq!(patch.status, Some(ActionItemStatus::Completed));
        assert!(patch.due_date.is_none());
        assert!(patch.validate().is_ok());

        let cleared = ActionItemPatch::due_date(None);
        assert_eq!(cleared.due_date, Some(None));
        assert!(!cleared.is_empty());
    }

    #[test]
    fn blank_title_is_rejected() {
        let patch = ActionItemPatch {
            title: Some("   ".to_owned()),
            ..ActionItemPatch::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn deal_patch_rejects_negative_value() {
        let patch = DealPatch {
            total_contract_cents: Some(Some(-1)),
            ..DealPatch::default()
        };
        let error = patch.validate().expect_err("negative value should fail");
        assert!(error.to_string().contains("cannot be negative"));

        let cleared = DealPatch {
            total_contract_cents: Some(None),
            ..DealPatch::default()
        };
        assert!(cleared.validate().is_ok());
    }
}
