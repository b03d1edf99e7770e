// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use crmdesk_app::{
    ActionItem, ActionItemId, ActionItemPatch, ActionItemPriority, ActionItemStatus,
    ColumnField, ColumnWidths, Contact, ContactId, ContactSource, Deal, DealId, DealPatch, Lead, LeadId,
    LinkedKind, LinkedRecordRef, MIN_COLUMN_WIDTH, NewActionItem, NewContact, NewDeal, NewLead,
    User, UserId,
};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};
use uuid::Uuid;

pub const APP_NAME: &str = "crmdesk";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    ("users", &["id", "display_name", "created_at"]),
    (
        "contacts",
        &[
            "id",
            "contact_name",
            "company_name",
            "position",
            "email",
            "phone_no",
            "region",
            "contact_owner",
            "contact_source",
            "industry",
            "linkedin",
            "website",
            "created_at",
            "modified_at",
        ],
    ),
    (
        "deals",
        &[
            "id",
            "deal_name",
            "stage",
            "customer_name",
            "total_contract_cents",
            "expected_closing_date",
            "lead_owner",
            "created_at",
            "modified_at",
        ],
    ),
    (
        "leads",
        &[
            "id",
            "lead_name",
            "company_name",
            "position",
            "email",
            "phone_no",
            "lead_status",
            "contact_owner",
            "created_at",
            "modified_at",
        ],
    ),
    (
        "action_items",
        &[
            "id",
            "title",
            "assigned_to",
            "status",
            "priority",
            "due_date",
            "module_type",
            "module_id",
            "created_at",
            "updated_at",
        ],
    ),
    ("column_widths", &["field", "width", "updated_at"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequiredIndex {
    name: &'static str,
    create_sql: &'static str,
}

const REQUIRED_INDEXES: &[RequiredIndex] = &[
    RequiredIndex {
        name: "idx_contacts_name",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_contacts_name ON contacts (contact_name, id);",
    },
    RequiredIndex {
        name: "idx_action_items_module",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_action_items_module ON action_items (module_type, module_id);",
    },
    RequiredIndex {
        name: "idx_action_items_assigned_to",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_action_items_assigned_to ON action_items (assigned_to);",
    },
];

const ACTION_ITEM_COLUMNS: &str = "
  id, title, assigned_to, status, priority, due_date,
  module_type, module_id, created_at, updated_at
";

const CONTACT_COLUMNS: &str = "
  id, contact_name, company_name, position, email, phone_no,
  region, contact_owner, contact_source, industry, linkedin, website
";

const DEAL_COLUMNS: &str = "
  id, deal_name, stage, customer_name, total_contract_cents,
  expected_closing_date, lead_owner, modified_at
";

const LEAD_COLUMNS: &str = "
  id, lead_name, company_name, position, email, phone_no,
  lead_status, contact_owner, modified_at
";

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if has_user_tables(&self.conn)? {
            validate_schema(&self.conn)?;
            log::debug!("validated existing schema");
        } else {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
            log::info!("created {APP_NAME} schema");
        }

        ensure_required_indexes(&self.conn)
    }

    pub fn create_user(&self, display_name: &str) -> Result<UserId> {
        if display_name.trim().is_empty() {
            bail!("user display name is required -- enter a name and retry");
        }
        let id = new_id();
        self.conn
            .execute(
                "INSERT INTO users (id, display_name, created_at) VALUES (?, ?, ?)",
                params![id, display_name.trim(), now_rfc3339()?],
            )
            .context("insert user")?;
        Ok(UserId::new(id))
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, display_name FROM users ORDER BY display_name ASC, id ASC")
            .context("prepare users query")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(User {
                    id: UserId::new(row.get::<_, String>(0)?),
                    display_name: row.get(1)?,
                })
            })
            .context("query users")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect users")
    }

    pub fn create_contact(&self, contact: &NewContact) -> Result<ContactId> {
        if contact.contact_name.trim().is_empty() {
            bail!("contact name is required -- enter a name and retry");
        }
        let id = new_id();
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO contacts (
                  id, contact_name, company_name, position, email, phone_no,
                  region, contact_owner, contact_source, industry, linkedin, website,
                  created_at, modified_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
                params![
                    id,
                    contact.contact_name,
                    contact.company_name,
                    contact.position,
                    contact.email,
                    contact.phone_no,
                    contact.region,
                    contact.contact_owner,
                    contact.contact_source,
                    contact.industry,
                    contact.linkedin,
                    contact.website,
                    now,
                    now,
                ],
            )
            .context("insert contact")?;
        Ok(ContactId::new(id))
    }

    pub fn get_contact(&self, contact_id: &str) -> Result<Option<Contact>> {
        self.conn
            .query_row(
                &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?"),
                params![contact_id],
                contact_from_row,
            )
            .optional()
            .with_context(|| format!("load contact {contact_id}"))
    }

    /// One page of contacts in stable `contact_name, id` order.
    pub fn list_contacts_page(&self, offset: usize, limit: usize) -> Result<Vec<Contact>> {
        let offset = i64::try_from(offset).context("contact page offset out of range")?;
        let limit = i64::try_from(limit).context("contact page limit out of range")?;
        let mut stmt = self
            .conn
            .prepare_cached(&format!(
                "
                SELECT {CONTACT_COLUMNS}
                FROM contacts
                ORDER BY contact_name ASC, id ASC
                LIMIT ? OFFSET ?
                "
            ))
            .context("prepare contacts page query")?;
        let rows = stmt
            .query_map(params![limit, offset], contact_from_row)
            .context("query contacts page")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("collect contacts page at offset {offset}"))
    }

    pub fn count_contacts(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))
            .context("count contacts")?;
        usize::try_from(count).context("contact count out of range")
    }

    pub fn create_deal(&self, deal: &NewDeal) -> Result<DealId> {
        if deal.deal_name.trim().is_empty() {
            bail!("deal name is required -- enter a name and retry");
        }
        let id = new_id();
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO deals (
                  id, deal_name, stage, customer_name, total_contract_cents,
                  expected_closing_date, lead_owner, created_at, modified_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
                params![
                    id,
                    deal.deal_name,
                    deal.stage,
                    deal.customer_name,
                    deal.total_contract_cents,
                    deal.expected_closing_date.map(format_date).transpose()?,
                    deal.lead_owner,
                    now,
                    now,
                ],
            )
            .context("insert deal")?;
        Ok(DealId::new(id))
    }

    pub fn get_deal(&self, deal_id: &str) -> Result<Option<Deal>> {
        self.conn
            .query_row(
                &format!("SELECT {DEAL_COLUMNS} FROM deals WHERE id = ?"),
                params![deal_id],
                deal_from_row,
            )
            .optional()
            .with_context(|| format!("load deal {deal_id}"))
    }

    /// Applies only the fields present in `patch` and stamps `modified_at`.
    pub fn update_deal(&self, deal_id: &DealId, patch: &DealPatch) -> Result<()> {
        patch.validate()?;
        let Some(current) = self.get_deal(deal_id.as_str())? else {
            bail!("deal {deal_id} not found -- choose an existing deal and retry");
        };

        let deal_name = patch.deal_name.clone().unwrap_or(current.deal_name);
        let stage = patch.stage.clone().unwrap_or(current.stage);
        let customer_name = patch
            .customer_name
            .clone()
            .unwrap_or(current.customer_name);
        let total_contract_cents = patch
            .total_contract_cents
            .unwrap_or(current.total_contract_cents);
        let expected_closing_date = patch
            .expected_closing_date
            .unwrap_or(current.expected_closing_date);
        let lead_owner = patch.lead_owner.clone().unwrap_or(current.lead_owner);

        let rows_affected = self
            .conn
            .execute(
                "
                UPDATE deals
                SET
                  deal_name = ?,
                  stage = ?,
                  customer_name = ?,
                  total_contract_cents = ?,
                  expected_closing_date = ?,
                  lead_owner = ?,
                  modified_at = ?
                WHERE id = ?
                ",
                params![
                    deal_name,
                    stage,
                    customer_name,
                    total_contract_cents,
                    expected_closing_date.map(format_date).transpose()?,
                    lead_owner,
                    now_rfc3339()?,
                    deal_id.as_str(),
                ],
            )
            .with_context(|| format!("update deal {deal_id}"))?;
        if rows_affected == 0 {
            bail!("deal {deal_id} not found -- choose an existing deal and retry");
        }
        Ok(())
    }

    pub fn create_lead(&self, lead: &NewLead) -> Result<LeadId> {
        if lead.lead_name.trim().is_empty() {
            bail!("lead name is required -- enter a name and retry");
        }
        let id = new_id();
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO leads (
                  id, lead_name, company_name, position, email, phone_no,
                  lead_status, contact_owner, created_at, modified_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
                params![
                    id,
                    lead.lead_name,
                    lead.company_name,
                    lead.position,
                    lead.email,
                    lead.phone_no,
                    lead.lead_status,
                    lead.contact_owner,
                    now,
                    now,
                ],
            )
            .context("insert lead")?;
        Ok(LeadId::new(id))
    }

    pub fn get_lead(&self, lead_id: &str) -> Result<Option<Lead>> {
        self.conn
            .query_row(
                &format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?"),
                params![lead_id],
                lead_from_row,
            )
            .optional()
            .with_context(|| format!("load lead {lead_id}"))
    }

    pub fn create_action_item(&self, item: &NewActionItem) -> Result<ActionItemId> {
        if item.title.trim().is_empty() {
            bail!("action item title is required -- enter a title and retry");
        }
        let id = new_id();
        let now = now_rfc3339()?;
        let (module_type, module_id) = match &item.linked {
            Some(linked) => (Some(linked.kind.collection()), Some(linked.id.as_str())),
            None => (None, None),
        };
        self.conn
            .execute(
                "
                INSERT INTO action_items (
                  id, title, assigned_to, status, priority, due_date,
                  module_type, module_id, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
                params![
                    id,
                    item.title.trim(),
                    item.assigned_to.as_ref().map(UserId::as_str),
                    item.status.as_str(),
                    item.priority.as_str(),
                    item.due_date.map(format_date).transpose()?,
                    module_type,
                    module_id,
                    now,
                    now,
                ],
            )
            .context("insert action item")?;
        Ok(ActionItemId::new(id))
    }

    pub fn get_action_item(&self, item_id: &str) -> Result<Option<ActionItem>> {
        self.conn
            .query_row(
                &format!("SELECT {ACTION_ITEM_COLUMNS} FROM action_items WHERE id = ?"),
                params![item_id],
                action_item_from_row,
            )
            .optional()
            .with_context(|| format!("load action item {item_id}"))
    }

    pub fn list_action_items(&self) -> Result<Vec<ActionItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "
                SELECT {ACTION_ITEM_COLUMNS}
                FROM action_items
                ORDER BY created_at DESC, id ASC
                "
            ))
            .context("prepare action items query")?;
        let rows = stmt
            .query_map([], action_item_from_row)
            .context("query action items")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect action items")
    }

    pub fn update_action_item(&self, item_id: &ActionItemId, patch: &ActionItemPatch) -> Result<()> {
        patch.validate()?;
        let Some(current) = self.get_action_item(item_id.as_str())? else {
            bail!("action item {item_id} not found -- refresh the list and retry");
        };

        let title = patch
            .title
            .as_deref()
            .map_or(current.title, |title| title.trim().to_owned());
        let assigned_to = patch.assigned_to.clone().unwrap_or(current.assigned_to);
        let status = patch.status.unwrap_or(current.status);
        let priority = patch.priority.unwrap_or(current.priority);
        let due_date = patch.due_date.unwrap_or(current.due_date);

        let rows_affected = self
            .conn
            .execute(
                "
                UPDATE action_items
                SET
                  title = ?,
                  assigned_to = ?,
                  status = ?,
                  priority = ?,
                  due_date = ?,
                  updated_at = ?
                WHERE id = ?
                ",
                params![
                    title,
                    assigned_to.as_ref().map(UserId::as_str),
                    status.as_str(),
                    priority.as_str(),
                    due_date.map(format_date).transpose()?,
                    now_rfc3339()?,
                    item_id.as_str(),
                ],
            )
            .with_context(|| format!("update action item {item_id}"))?;
        if rows_affected == 0 {
            bail!("action item {item_id} not found -- refresh the list and retry");
        }
        Ok(())
    }

    pub fn delete_action_item(&self, item_id: &ActionItemId) -> Result<()> {
        let rows_affected = self
            .conn
            .execute(
                "DELETE FROM action_items WHERE id = ?",
                params![item_id.as_str()],
            )
            .with_context(|| format!("delete action item {item_id}"))?;
        if rows_affected == 0 {
            bail!("action item {item_id} not found -- refresh the list and retry");
        }
        Ok(())
    }

    /// Display labels for a batch of linked records, one query per kind.
    /// Records that do not exist are left out of the result.
    pub fn record_names(
        &self,
        refs: &[LinkedRecordRef],
    ) -> Result<BTreeMap<LinkedRecordRef, String>> {
        let mut by_kind: BTreeMap<LinkedKind, BTreeSet<&str>> = BTreeMap::new();
        for key in refs {
            by_kind.entry(key.kind).or_default().insert(key.id.as_str());
        }

        let mut names = BTreeMap::new();
        for (kind, ids) in by_kind {
            let (table, column) = match kind {
                LinkedKind::Deal => ("deals", "deal_name"),
                LinkedKind::Lead => ("leads", "lead_name"),
                LinkedKind::Contact => ("contacts", "contact_name"),
            };
            let placeholders = vec!["?"; ids.len()].join(", ");
            let sql = format!("SELECT id, {column} FROM {table} WHERE id IN ({placeholders})");
            let mut stmt = self
                .conn
                .prepare(&sql)
                .with_context(|| format!("prepare {} name lookup", kind.collection()))?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(ids), |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })
                .with_context(|| format!("resolve {} names", kind.collection()))?;
            for row in rows {
                let (id, name) =
                    row.with_context(|| format!("read {} name row", kind.collection()))?;
                names.insert(LinkedRecordRef::new(kind, id), name);
            }
        }
        Ok(names)
    }

    pub fn get_column_widths(&self) -> Result<ColumnWidths> {
        let mut stmt = self
            .conn
            .prepare("SELECT field, width FROM column_widths ORDER BY field ASC")
            .context("prepare column widths query")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .context("query column widths")?;

        let mut widths = ColumnWidths::new();
        for row in rows {
            let (field_raw, width_raw) = row.context("read column width row")?;
            let Some(field) = ColumnField::parse(&field_raw) else {
                log::warn!("ignoring stored width for unknown column {field_raw:?}");
                continue;
            };
            let width = u16::try_from(width_raw)
                .map_err(|_| anyhow!("stored width {width_raw} for column {field_raw} is out of range"))?;
            widths.insert(field, width);
        }
        Ok(widths)
    }

    pub fn put_column_width(&self, field: ColumnField, width: u16) -> Result<()> {
        if width < MIN_COLUMN_WIDTH {
            bail!(
                "column {} width {width} is below the {MIN_COLUMN_WIDTH} px minimum -- drag it wider and retry",
                field.as_str()
            );
        }
        self.conn
            .execute(
                "
                INSERT INTO column_widths (field, width, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(field) DO UPDATE SET
                  width = excluded.width,
                  updated_at = excluded.updated_at
                ",
                params![field.as_str(), width, now_rfc3339()?],
            )
            .with_context(|| format!("store width for column {}", field.as_str()))?;
        Ok(())
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("CRMDESK_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set CRMDESK_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("crmdesk.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: ContactId::new(row.get::<_, String>(0)?),
        contact_name: row.get(1)?,
        company_name: row.get(2)?,
        position: row.get(3)?,
        email: row.get(4)?,
        phone_no: row.get(5)?,
        region: row.get(6)?,
        contact_owner: row.get(7)?,
        contact_source: row.get(8)?,
        industry: row.get(9)?,
        linkedin: row.get(10)?,
        website: row.get(11)?,
    })
}

fn deal_from_row(row: &Row<'_>) -> rusqlite::Result<Deal> {
    let closing_raw: Option<String> = row.get(5)?;
    let modified_raw: String = row.get(7)?;
    Ok(Deal {
        id: DealId::new(row.get::<_, String>(0)?),
        deal_name: row.get(1)?,
        stage: row.get(2)?,
        customer_name: row.get(3)?,
        total_contract_cents: row.get(4)?,
        expected_closing_date: parse_opt_date(closing_raw).map_err(to_sql_error)?,
        lead_owner: row.get(6)?,
        modified_at: parse_datetime(&modified_raw).map_err(to_sql_error)?,
    })
}

fn lead_from_row(row: &Row<'_>) -> rusqlite::Result<Lead> {
    let modified_raw: String = row.get(8)?;
    Ok(Lead {
        id: LeadId::new(row.get::<_, String>(0)?),
        lead_name: row.get(1)?,
        company_name: row.get(2)?,
        position: row.get(3)?,
        email: row.get(4)?,
        phone_no: row.get(5)?,
        lead_status: row.get(6)?,
        contact_owner: row.get(7)?,
        modified_at: parse_datetime(&modified_raw).map_err(to_sql_error)?,
    })
}

fn action_item_from_row(row: &Row<'_>) -> rusqlite::Result<ActionItem> {
    let status_raw: String = row.get(3)?;
    let status = ActionItemStatus::parse(&status_raw)
        .ok_or_else(|| to_sql_error(anyhow!("unknown action item status {status_raw}")))?;
    let priority_raw: String = row.get(4)?;
    let priority = ActionItemPriority::parse(&priority_raw)
        .ok_or_else(|| to_sql_error(anyhow!("unknown action item priority {priority_raw}")))?;
    let due_date_raw: Option<String> = row.get(5)?;
    let created_at_raw: String = row.get(8)?;
    let updated_at_raw: String = row.get(9)?;

    Ok(ActionItem {
        id: ActionItemId::new(row.get::<_, String>(0)?),
        title: row.get(1)?,
        assigned_to: row.get::<_, Option<String>>(2)?.map(UserId::new),
        status,
        priority,
        due_date: parse_opt_date(due_date_raw).map_err(to_sql_error)?,
        module_type: row.get(6)?,
        module_id: row.get(7)?,
        created_at: parse_datetime(&created_at_raw).map_err(to_sql_error)?,
        updated_at: parse_datetime(&updated_at_raw).map_err(to_sql_error)?,
    })
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            bail!(
                "database is missing required table `{table}`; use a crmdesk-compatible database or migrate first"
            );
        }

        let columns = table_columns(conn, table)?;
        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();

        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; run migration before launching",
                missing.join(", ")
            );
        }
    }

    Ok(())
}

fn ensure_required_indexes(conn: &Connection) -> Result<()> {
    for index in REQUIRED_INDEXES {
        conn.execute_batch(index.create_sql)
            .with_context(|| format!("ensure required index `{}`", index.name))?;
    }

    let existing_indexes = index_names(conn)?;
    let missing = REQUIRED_INDEXES
        .iter()
        .filter(|index| !existing_indexes.contains(index.name))
        .map(|index| index.name)
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        bail!(
            "database is missing required indexes: {}; run migration before launching",
            missing.join(", ")
        );
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1
              FROM sqlite_master
              WHERE type = 'table' AND name = ?
            )
            ",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check table existence for {table}"))?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;

    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))
}

fn index_names(conn: &Connection) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(
            "
            SELECT name
            FROM sqlite_master
            WHERE type = 'index'
              AND name NOT LIKE 'sqlite_%'
            ORDER BY name ASC
            ",
        )
        .context("prepare index names query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query index names")?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .context("collect index names")
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl ContactSource for Store {
    fn fetch_contacts_page(&mut self, offset: usize, limit: usize) -> Result<Vec<Contact>> {
        self.list_contacts_page(offset, limit)
    }
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}

fn parse_datetime(raw: &str) -> Result<OffsetDateTime> {
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(value);
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Ok(value.assume_utc());
    }

    bail!("unsupported datetime format {raw:?}")
}

fn parse_date(raw: &str) -> Result<Date> {
    if let Ok(value) = Date::parse(raw, &format_description!("[year]-[month]-[day]")) {
        return Ok(value);
    }

    // Backends sometimes hand dates back as full timestamps.
    Ok(parse_datetime(raw)?.date())
}

fn parse_opt_date(raw: Option<String>) -> Result<Option<Date>> {
    raw.as_deref().map(parse_date).transpose()
}

fn to_sql_error(error: anyhow::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            error.to_string(),
        )),
    )
}

fn format_date(value: Date) -> Result<String> {
    value
        .format(&format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("format date {value}"))
}
