// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use crate::{Contact, ContactId, Notification, Notifier};

pub const DEFAULT_PAGE_SIZE: usize = 1000;
pub const DEFAULT_DISPLAY_LIMIT: usize = 100;
pub const LOADING_LABEL: &str = "Loading contacts...";
pub const EMPTY_LABEL: &str = "No contacts found.";
pub const PLACEHOLDER_LABEL: &str = "Select contact...";

/// Ordered range fetch over the contact collection. Pages must come back in
/// a stable order (`contact_name`, then `id`).
pub trait ContactSource {
    fn fetch_contacts_page(&mut self, offset: usize, limit: usize) -> Result<Vec<Contact>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageConfig {
    pub page_size: usize,
    /// Extra attempts per page after the first failure. Zero makes any
    /// failure terminal for the load.
    pub retries: u32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            retries: 0,
        }
    }
}

/// Fetches every page in order, handing each non-empty page to `on_page`.
/// Stops after an empty or short page. Returns the number of records seen.
pub fn fetch_all_pages<S, F>(source: &mut S, config: PageConfig, mut on_page: F) -> Result<usize>
where
    S: ContactSource + ?Sized,
    F: FnMut(Vec<Contact>) -> Result<()>,
{
    if config.page_size == 0 {
        bail!("contact page size must be positive -- set [contacts].page_size to at least 1");
    }

    let mut offset = 0usize;
    let mut total = 0usize;
    loop {
        let page = fetch_page(source, config, offset)?;
        let count = page.len();
        log::debug!("fetched {count} contacts at offset {offset}");
        if count == 0 {
            break;
        }
        total += count;
        on_page(page)?;
        if count < config.page_size {
            break;
        }
        offset += config.page_size;
    }
    Ok(total)
}

fn fetch_page<S: ContactSource + ?Sized>(
    source: &mut S,
    config: PageConfig,
    offset: usize,
) -> Result<Vec<Contact>> {
    let mut attempt = 0u32;
    loop {
        match source.fetch_contacts_page(offset, config.page_size) {
            Ok(page) => return Ok(page),
            Err(error) if attempt < config.retries => {
                attempt += 1;
                log::warn!(
                    "contact page at offset {offset} failed (attempt {attempt} of {}): {error:#}",
                    config.retries + 1
                );
            }
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("fetch contacts page at offset {offset}"));
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactLoadEvent {
    Page {
        generation: u64,
        contacts: Vec<Contact>,
    },
    Finished {
        generation: u64,
        total: usize,
    },
    Failed {
        generation: u64,
        error: String,
    },
}

impl ContactLoadEvent {
    pub const fn generation(&self) -> u64 {
        match self {
            Self::Page { generation, .. }
            | Self::Finished { generation, .. }
            | Self::Failed { generation, .. } => *generation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub page: PageConfig,
}

/// Runs the page loop on a worker thread and streams results over `tx`.
/// The loop stops early once the receiving side has gone away.
pub fn spawn_contact_load<S>(
    mut source: S,
    ticket: LoadTicket,
    tx: Sender<ContactLoadEvent>,
) -> JoinHandle<()>
where
    S: ContactSource + Send + 'static,
{
    thread::spawn(move || {
        let generation = ticket.generation;
        let result = fetch_all_pages(&mut source, ticket.page, |contacts| {
            tx.send(ContactLoadEvent::Page {
                generation,
                contacts,
            })
            .map_err(|_| anyhow!("contact load channel closed"))
        });
        let event = match result {
            Ok(total) => ContactLoadEvent::Finished { generation, total },
            Err(error) => ContactLoadEvent::Failed {
                generation,
                error: format!("{error:#}"),
            },
        };
        if tx.send(event).is_err() {
            log::debug!("contact load {generation} finished after receiver closed");
        }
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum SelectorValue {
    #[default]
    Unset,
    Cleared,
    Chosen(String),
}

impl SelectorValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Chosen(name) => Some(name),
            Self::Unset | Self::Cleared => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorEvent {
    ValueChanged(SelectorValue),
    ContactSelected(Contact),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactOption {
    pub id: ContactId,
    pub name: String,
    pub subtitle: Option<String>,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSelector {
    contacts: Vec<Contact>,
    loading: bool,
    search: String,
    open: bool,
    value: SelectorValue,
    page: PageConfig,
    display_limit: usize,
    generation: u64,
    active_load: Option<u64>,
    torn_down: bool,
}

impl Default for ContactSelector {
    fn default() -> Self {
        Self::new(PageConfig::default(), DEFAULT_DISPLAY_LIMIT)
    }
}

impl ContactSelector {
    pub fn new(page: PageConfig, display_limit: usize) -> Self {
        Self {
            contacts: Vec::new(),
            loading: false,
            search: String::new(),
            open: false,
            value: SelectorValue::Unset,
            page,
            display_limit,
            generation: 0,
            active_load: None,
            torn_down: false,
        }
    }

    pub fn with_value(mut self, value: SelectorValue) -> Self {
        self.value = value;
        self
    }

    /// Starts a fresh load cycle. Any load still in flight becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation = self.generation.saturating_add(1);
        self.active_load = Some(self.generation);
        self.loading = true;
        self.torn_down = false;
        self.contacts.clear();
        LoadTicket {
            generation: self.generation,
            page: self.page,
        }
    }

    /// Applies one background load event. Returns false for events from a
    /// superseded load or arriving after teardown.
    pub fn apply<N: Notifier + ?Sized>(
        &mut self,
        event: ContactLoadEvent,
        notifier: &mut N,
    ) -> bool {
        if self.torn_down || self.active_load != Some(event.generation()) {
            log::debug!("dropping stale contact load event {}", event.generation());
            return false;
        }
        match event {
            ContactLoadEvent::Page { contacts, .. } => {
                self.contacts.extend(contacts);
            }
            ContactLoadEvent::Finished { total, .. } => {
                log::debug!("contact load finished with {total} records");
                self.finish_load();
            }
            ContactLoadEvent::Failed { error, .. } => {
                log::warn!(
                    "contact load failed after {} records: {error}",
                    self.contacts.len()
                );
                self.finish_load();
                notifier.notify(Notification::error("Failed to load contacts"));
            }
        }
        true
    }

    /// Runs the whole load on the calling thread.
    pub fn load_blocking<S, N>(&mut self, source: &mut S, notifier: &mut N) -> bool
    where
        S: ContactSource + ?Sized,
        N: Notifier + ?Sized,
    {
        let ticket = self.begin_load();
        let result = fetch_all_pages(source, ticket.page, |contacts| {
            self.contacts.extend(contacts);
            Ok(())
        });
        let event = match result {
            Ok(total) => ContactLoadEvent::Finished {
                generation: ticket.generation,
                total,
            },
            Err(error) => ContactLoadEvent::Failed {
                generation: ticket.generation,
                error: format!("{error:#}"),
            },
        };
        let succeeded = matches!(event, ContactLoadEvent::Finished { .. });
        self.apply(event, notifier);
        succeeded
    }

    fn finish_load(&mut self) {
        self.loading = false;
        self.active_load = None;
    }

    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.active_load = None;
        self.loading = false;
        self.open = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn display_limit(&self) -> usize {
        self.display_limit
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
        if !open {
            self.search.clear();
        }
    }

    pub fn value(&self) -> &SelectorValue {
        &self.value
    }

    pub fn display_label(&self) -> &str {
        self.value.as_str().unwrap_or(PLACEHOLDER_LABEL)
    }

    /// Empty query yields the first N cached records; otherwise a
    /// case-insensitive substring match over name, company, position and
    /// email, capped at N, in cache order.
    pub fn filtered(&self) -> Vec<&Contact> {
        filter_contacts(&self.contacts, &self.search, self.display_limit)
    }

    pub fn options(&self) -> Vec<ContactOption> {
        self.filtered()
            .into_iter()
            .map(|contact| ContactOption {
                id: contact.id.clone(),
                name: contact.contact_name.clone(),
                subtitle: subtitle(contact),
                checked: self.value.as_str() == Some(contact.contact_name.as_str()),
            })
            .collect()
    }

    pub fn status_label(&self) -> Option<&'static str> {
        if self.loading {
            Some(LOADING_LABEL)
        } else if self.filtered().is_empty() {
            Some(EMPTY_LABEL)
        } else {
            None
        }
    }

    pub fn select(&mut self, id: &ContactId) -> Vec<SelectorEvent> {
        let Some(contact) = self.contacts.iter().find(|contact| &contact.id == id).cloned() else {
            return Vec::new();
        };
        self.value = SelectorValue::Chosen(contact.contact_name.clone());
        self.set_open(false);
        vec![
            SelectorEvent::ValueChanged(self.value.clone()),
            SelectorEvent::ContactSelected(contact),
        ]
    }

    pub fn clear(&mut self) -> Vec<SelectorEvent> {
        self.value = SelectorValue::Cleared;
        vec![SelectorEvent::ValueChanged(SelectorValue::Cleared)]
    }
}

pub fn filter_contacts<'a>(contacts: &'a [Contact], query: &str, limit: usize) -> Vec<&'a Contact> {
    if query.is_empty() {
        return contacts.iter().take(limit).collect();
    }
    let needle = query.to_lowercase();
    contacts
        .iter()
        .filter(|contact| matches_query(contact, &needle))
        .take(limit)
        .collect()
}

fn matches_query(contact: &Contact, needle: &str) -> bool {
    [
        Some(contact.contact_name.as_str()),
        contact.company_name.as_deref(),
        contact.position.as_deref(),
        contact.email.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}

fn subtitle(contact: &Contact) -> Option<String> {
    match (contact.company_name.as_deref(), contact.position.as_deref()) {
        (Some(company), Some(position)) => Some(format!("{company} • {position}")),
        (Some(company), None) => Some(company.to_owned()),
        (None, Some(position)) => Some(position.to_owned()),
        (None, None) => None,
    }
}
