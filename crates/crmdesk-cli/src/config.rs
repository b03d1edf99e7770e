// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use crmdesk_app::{
    ColumnField, ColumnWidths, DEFAULT_DISPLAY_LIMIT, DEFAULT_PAGE_SIZE, MIN_COLUMN_WIDTH,
    PageConfig,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_LEVEL: &str = "warn";
const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];
const MAX_FETCH_RETRIES: u32 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub contacts: Contacts,
    #[serde(default)]
    pub table: Table,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage: Storage::default(),
            contacts: Contacts::default(),
            table: Table::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contacts {
    pub page_size: Option<usize>,
    pub display_limit: Option<usize>,
    pub fetch_retries: Option<u32>,
}

impl Default for Contacts {
    fn default() -> Self {
        Self {
            page_size: Some(DEFAULT_PAGE_SIZE),
            display_limit: Some(DEFAULT_DISPLAY_LIMIT),
            fetch_retries: Some(0),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub column_widths: BTreeMap<String, u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("CRMDESK_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set CRMDESK_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(crmdesk_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [storage], [contacts], [table], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(db_path) = &self.storage.db_path {
            crmdesk_db::validate_db_path(db_path)?;
        }

        if let Some(page_size) = self.contacts.page_size
            && page_size == 0
        {
            bail!(
                "contacts.page_size in {} must be positive, got 0",
                path.display()
            );
        }

        if let Some(limit) = self.contacts.display_limit
            && limit == 0
        {
            bail!(
                "contacts.display_limit in {} must be positive, got 0",
                path.display()
            );
        }

        if let Some(retries) = self.contacts.fetch_retries
            && retries > MAX_FETCH_RETRIES
        {
            bail!(
                "contacts.fetch_retries in {} must be at most {MAX_FETCH_RETRIES}, got {retries}",
                path.display()
            );
        }

        self.column_widths()
            .with_context(|| format!("invalid [table.column_widths] in {}", path.display()))?;

        if let Some(level) = &self.log.level
            && !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
        {
            bail!(
                "log.level in {} must be one of {}, got {level:?}",
                path.display(),
                LOG_LEVELS.join(", ")
            );
        }

        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => crmdesk_db::default_db_path(),
        }
    }

    pub fn page_config(&self) -> PageConfig {
        PageConfig {
            page_size: self.contacts.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            retries: self.contacts.fetch_retries.unwrap_or(0),
        }
    }

    pub fn display_limit(&self) -> usize {
        self.contacts.display_limit.unwrap_or(DEFAULT_DISPLAY_LIMIT)
    }

    /// Configured starting widths. Stored widths from earlier resizes take
    /// precedence over these.
    pub fn column_widths(&self) -> Result<ColumnWidths> {
        let mut widths = ColumnWidths::new();
        for (name, width) in &self.table.column_widths {
            let field = ColumnField::parse(name)
                .ok_or_else(|| anyhow!("unknown column {name:?}"))?;
            if !field.spec().resizable {
                bail!("column {name:?} has a fixed width");
            }
            if *width < MIN_COLUMN_WIDTH {
                bail!("column {name:?} width must be at least {MIN_COLUMN_WIDTH}, got {width}");
            }
            widths.insert(field, *width);
        }
        Ok(widths)
    }

    pub fn log_level(&self) -> String {
        self.log
            .level
            .as_deref()
            .unwrap_or(DEFAULT_LOG_LEVEL)
            .to_ascii_lowercase()
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# crmdesk config\n# Place this file at: {}\n\nversion = 1\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/crmdesk/crmdesk.db)\n# db_path = \"/absolute/path/to/crmdesk.db\"\n\n[contacts]\npage_size = {}\ndisplay_limit = {}\nfetch_retries = 0\n\n[table.column_widths]\n# title = 300\n# assigned_to = 100\n\n[log]\n# One of: off, error, warn, info, debug, trace. RUST_LOG overrides this.\nlevel = \"{}\"\n",
            path.display(),
            DEFAULT_PAGE_SIZE,
            DEFAULT_DISPLAY_LIMIT,
            DEFAULT_LOG_LEVEL,
        )
    }
}
