// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionItemStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl ActionItemStatus {
    pub const ALL: [Self; 4] = [Self::Open, Self::InProgress, Self::Completed, Self::Cancelled];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Open" => Some(Self::Open),
            "In Progress" => Some(Self::InProgress),
            "Completed" => Some(Self::Completed),
            "Cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionItemPriority {
    High,
    Medium,
    Low,
}

impl ActionItemPriority {
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    pub const fn abbrev(self) -> &'static str {
        match self {
            Self::High => "H",
            Self::Medium => "M",
            Self::Low => "L",
        }
    }

    /// Lower ranks sort first.
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "High" => Some(Self::High),
            "Medium" => Some(Self::Medium),
            "Low" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: ActionItemId,
    pub title: String,
    pub assigned_to: Option<UserId>,
    pub status: ActionItemStatus,
    pub priority: ActionItemPriority,
    pub due_date: Option<Date>,
    pub module_type: Option<String>,
    pub module_id: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    pub deal_name: String,
    pub stage: String,
    pub customer_name: Option<String>,
    pub total_contract_cents: Option<i64>,
    pub expected_closing_date: Option<Date>,
    pub lead_owner: Option<String>,
    pub modified_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub lead_name: String,
    pub company_name: Option<String>,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone_no: Option<String>,
    pub lead_status: Option<String>,
    pub contact_owner: Option<String>,
    pub modified_at: OffsetDateTime,
}

pub const EMPTY_CELL: &str = "—";

pub fn format_due_date(value: Option<Date>) -> String {
    match value {
        Some(date) => date
            .format(&format_description!("[day]-[month]-[year repr:last_two]"))
            .unwrap_or_else(|_| EMPTY_CELL.to_owned()),
        None => EMPTY_CELL.to_owned(),
    }
}

pub fn parse_iso_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), &format_description!("[year]-[month]-[day]")).ok()
}

pub fn format_iso_date(value: Date) -> Result<String> {
    value
        .format(&format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("format date {value}"))
}
