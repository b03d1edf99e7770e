// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::{ActionItem, Contact, Deal, Lead};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LinkedKind {
    Deal,
    Lead,
    Contact,
}

impl LinkedKind {
    pub const ALL: [Self; 3] = [Self::Deal, Self::Lead, Self::Contact];

    /// Accepts singular and plural spellings in any case; anything else is
    /// outside the closed set.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "deal" | "deals" => Some(Self::Deal),
            "lead" | "leads" => Some(Self::Lead),
            "contact" | "contacts" => Some(Self::Contact),
            _ => None,
        }
    }

    pub const fn collection(self) -> &'static str {
        match self {
            Self::Deal => "deals",
            Self::Lead => "leads",
            Self::Contact => "contacts",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Deal => "Deal",
            Self::Lead => "Lead",
            Self::Contact => "Contact",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinkedRecordRef {
    pub kind: LinkedKind,
    pub id: String,
}

impl LinkedRecordRef {
    pub fn new(kind: LinkedKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn parse(kind: &str, id: &str) -> Option<Self> {
        let id = id.trim();
        if id.is_empty() {
            return None;
        }
        LinkedKind::parse(kind).map(|kind| Self::new(kind, id))
    }

    pub fn for_item(item: &ActionItem) -> Option<Self> {
        match (item.module_type.as_deref(), item.module_id.as_deref()) {
            (Some(kind), Some(id)) => Self::parse(kind, id),
            _ => None,
        }
    }
}

/// Batch lookup of display labels for linked records.
pub trait RecordNameResolver {
    /// Unknown or missing records are simply absent from the returned map.
    fn record_names(
        &mut self,
        refs: &[LinkedRecordRef],
    ) -> Result<BTreeMap<LinkedRecordRef, String>>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordNames {
    names: BTreeMap<LinkedRecordRef, String>,
}

impl RecordNames {
    pub fn from_map(names: BTreeMap<LinkedRecordRef, String>) -> Self {
        Self { names }
    }

    /// Resolves only the references not already cached, in a single batch.
    pub fn refresh<R: RecordNameResolver + ?Sized>(
        &mut self,
        resolver: &mut R,
        items: &[ActionItem],
    ) -> Result<()> {
        let wanted: BTreeSet<LinkedRecordRef> =
            items.iter().filter_map(LinkedRecordRef::for_item).collect();
        self.names.retain(|key, _| wanted.contains(key));

        let missing: Vec<LinkedRecordRef> = wanted
            .into_iter()
            .filter(|key| !self.names.contains_key(key))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        let resolved = resolver.record_names(&missing)?;
        log::debug!(
            "resolved {} of {} linked record names",
            resolved.len(),
            missing.len()
        );
        self.names.extend(resolved);
        Ok(())
    }

    pub fn get(&self, key: &LinkedRecordRef) -> Option<&str> {
        self.names.get(key).map(String::as_str)
    }

    /// Drops a cached label so the next refresh resolves it again.
    pub fn invalidate(&mut self, key: &LinkedRecordRef) -> bool {
        self.names.remove(key).is_some()
    }

    pub fn for_item(&self, item: &ActionItem) -> Option<&str> {
        LinkedRecordRef::for_item(item).and_then(|key| self.get(&key))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The single linked-record detail surface; at most one kind is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DetailView {
    #[default]
    Closed,
    Deal(Deal),
    Lead(Lead),
    Contact(Contact),
}

impl DetailView {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    pub fn kind(&self) -> Option<LinkedKind> {
        match self {
            Self::Closed => None,
            Self::Deal(_) => Some(LinkedKind::Deal),
            Self::Lead(_) => Some(LinkedKind::Lead),
            Self::Contact(_) => Some(LinkedKind::Contact),
        }
    }

    pub fn record_ref(&self) -> Option<LinkedRecordRef> {
        match self {
            Self::Closed => None,
            Self::Deal(deal) => Some(LinkedRecordRef::new(LinkedKind::Deal, deal.id.as_str())),
            Self::Lead(lead) => Some(LinkedRecordRef::new(LinkedKind::Lead, lead.id.as_str())),
            Self::Contact(contact) => Some(LinkedRecordRef::new(
                LinkedKind::Contact,
                contact.id.as_str(),
            )),
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Closed => None,
            Self::Deal(deal) => Some(&deal.deal_name),
            Self::Lead(lead) => Some(&lead.lead_name),
            Self::Contact(contact) => Some(&contact.contact_name),
        }
    }
}
