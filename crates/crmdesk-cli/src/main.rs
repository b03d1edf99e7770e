// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod demo;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use crmdesk_app::{
    ActionItemId, ActionItemsTable, ColumnField, ContactSelector, DetailView, EMPTY_CELL,
    HitTarget, Notification, RowAction, SortIndicator, TableBody, spawn_contact_load,
};
use crmdesk_db::Store;
use runtime::StoreRuntime;
use serde_json::json;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `crmdesk --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    init_logging(&config)?;

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    let store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or CRMDESK_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;
    if options.demo {
        demo::seed_demo_data(&store, demo::DEMO_SEED)?;
    }
    if options.check_only {
        log::info!("config and database at {} are valid", db_path.display());
        return Ok(());
    }

    let mut runtime = StoreRuntime::new(&store);
    let mut table = ActionItemsTable::new();
    let mut widths = config.column_widths()?;
    widths.extend(store.get_column_widths()?);
    table.set_column_widths(widths);
    let items = runtime.load_items()?;
    table.mount(&mut runtime, items);

    let mut failures = 0;
    if let Some(id) = &options.complete {
        let id = known_item(&table, id)?;
        if !table.apply_row_action(&mut runtime, &id, RowAction::MarkComplete) {
            log::info!("action item {id} is already completed");
        }
    }
    if let Some((id, raw_date)) = &options.due {
        let id = known_item(&table, id)?;
        table.click(&mut runtime, &id, HitTarget::DueDate);
        table.set_due_date_draft(raw_date.as_str());
        table.commit_due_date_edit(&mut runtime);
    }
    failures += report_notifications(&mut runtime);

    for field in &options.sort {
        table.click_header(&mut runtime, *field);
    }
    table.set_sort(runtime.sort());
    let items = runtime.load_items()?;
    table.set_items(&mut runtime, items);

    if let Some(id) = &options.open {
        let id = known_item(&table, id)?;
        if table.activate_linked_record(&mut runtime, &id) {
            print_detail(table.detail(), options.json)?;
        } else {
            let lookup_failures = report_notifications(&mut runtime);
            if lookup_failures == 0 {
                println!("action item {id} has no resolvable linked record");
            }
            failures += lookup_failures;
        }
        table.close_detail();
    }

    if let Some(query) = &options.search {
        let mut selector = ContactSelector::new(config.page_config(), config.display_limit());
        let mut load_notifications: Vec<Notification> = Vec::new();
        if options.demo {
            selector.load_blocking(&mut runtime, &mut load_notifications);
        } else {
            load_contacts_in_background(&mut selector, &db_path, &mut load_notifications)?;
        }
        for notification in &load_notifications {
            eprintln!("{}: {}", notification.title, notification.description);
        }
        failures += load_notifications.len();
        selector.set_open(true);
        selector.set_search(query.as_str());
        print_contacts(&selector, options.json)?;
        selector.teardown();
    }

    if options.list || options.runs_default_listing() {
        print_table(&table, options.json)?;
    }
    table.teardown();

    failures += report_notifications(&mut runtime);
    if failures > 0 {
        bail!("{failures} operation(s) reported a failure; see messages above");
    }
    Ok(())
}

fn init_logging(config: &Config) -> Result<()> {
    let env = env_logger::Env::default().default_filter_or(config.log_level());
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init()
        .context("initialize logger")
}

/// Streams contact pages from a second connection on a worker thread. The
/// in-memory demo database is not shared across connections, so `--demo`
/// loads on the calling thread instead.
fn load_contacts_in_background(
    selector: &mut ContactSelector,
    db_path: &Path,
    notifications: &mut Vec<Notification>,
) -> Result<()> {
    let source = Store::open(db_path)
        .with_context(|| format!("open contact loader for {}", db_path.display()))?;
    let ticket = selector.begin_load();
    let (tx, rx) = mpsc::channel();
    let handle = spawn_contact_load(source, ticket, tx);
    for event in rx {
        selector.apply(event, notifications);
    }
    handle
        .join()
        .map_err(|_| anyhow!("contact load thread panicked"))
}

fn known_item(table: &ActionItemsTable, raw: &str) -> Result<ActionItemId> {
    let id = ActionItemId::from(raw);
    if table.item(&id).is_none() {
        bail!("action item {raw} not found -- run `crmdesk --list` to see ids");
    }
    Ok(id)
}

fn report_notifications(runtime: &mut StoreRuntime<'_>) -> usize {
    let notifications = runtime.take_notifications();
    for notification in &notifications {
        eprintln!("{}: {}", notification.title, notification.description);
    }
    notifications.len()
}

fn print_table(table: &ActionItemsTable, as_json: bool) -> Result<()> {
    let columns: Vec<_> = table
        .columns()
        .into_iter()
        .filter(|column| {
            !matches!(
                column.spec.field,
                ColumnField::Checkbox | ColumnField::Actions
            )
        })
        .collect();

    match table.body() {
        TableBody::Empty(empty) => {
            if as_json {
                println!("{}", json!({ "rows": [], "empty": empty.title }));
            } else {
                println!("{}", empty.title);
                println!("{}", empty.hint);
            }
        }
        TableBody::Rows(rows) => {
            if as_json {
                let payload = json!({
                    "sort": table.sort(),
                    "rows": rows,
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&payload).context("encode table as JSON")?
                );
                return Ok(());
            }
            let header: Vec<String> = columns
                .iter()
                .map(|column| {
                    let marker = match column.indicator {
                        Some(SortIndicator::Ascending) => " ^",
                        Some(SortIndicator::Descending) => " v",
                        _ => "",
                    };
                    cell(
                        &format!("{}{marker}", column.spec.label),
                        char_width(column.width),
                    )
                })
                .collect();
            println!("{}  id", header.join(" "));
            for row in rows {
                let values = columns.iter().map(|column| match column.spec.field {
                    ColumnField::Title => row.title.clone(),
                    ColumnField::AssignedTo => row.assignee.clone(),
                    ColumnField::Status => row.status.as_str().to_owned(),
                    ColumnField::DueDate => row.due_date.clone(),
                    ColumnField::Priority => row.priority.abbrev().to_owned(),
                    ColumnField::Module => row
                        .linked
                        .as_ref()
                        .map(|linked| linked.label.clone())
                        .unwrap_or_else(|| EMPTY_CELL.to_owned()),
                    ColumnField::Checkbox | ColumnField::Actions => String::new(),
                });
                let line: Vec<String> = values
                    .zip(&columns)
                    .map(|(value, column)| cell(&value, char_width(column.width)))
                    .collect();
                println!("{}  {}", line.join(" "), row.id);
            }
        }
    }
    Ok(())
}

fn print_contacts(selector: &ContactSelector, as_json: bool) -> Result<()> {
    let options = selector.options();
    if as_json {
        let payload = json!({
            "search": selector.search(),
            "loaded": selector.contacts().len(),
            "options": options,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("encode contacts as JSON")?
        );
        return Ok(());
    }
    if let Some(status) = selector.status_label() {
        println!("{status}");
        return Ok(());
    }
    for option in options {
        match option.subtitle {
            Some(subtitle) => println!("{}  {}  ({})", option.name, subtitle, option.id),
            None => println!("{}  ({})", option.name, option.id),
        }
    }
    Ok(())
}

fn print_detail(detail: &DetailView, as_json: bool) -> Result<()> {
    let (kind, record) = match detail {
        DetailView::Closed => return Ok(()),
        DetailView::Deal(deal) => ("deal", serde_json::to_value(deal)),
        DetailView::Lead(lead) => ("lead", serde_json::to_value(lead)),
        DetailView::Contact(contact) => ("contact", serde_json::to_value(contact)),
    };
    let record = record.context("encode linked record")?;
    if as_json {
        let payload = json!({ "kind": kind, "record": record });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("encode linked record as JSON")?
        );
        return Ok(());
    }
    println!("{kind}: {}", detail.title().unwrap_or_default());
    if let Some(fields) = record.as_object() {
        for (key, value) in fields {
            match value {
                serde_json::Value::Null => {}
                serde_json::Value::String(text) => println!("  {key}: {text}"),
                other => println!("  {key}: {other}"),
            }
        }
    }
    Ok(())
}

/// Pixel widths map onto roughly eight pixels per terminal cell.
fn char_width(width: u16) -> usize {
    usize::from(width / 8).max(4)
}

fn cell(value: &str, width: usize) -> String {
    let count = value.chars().count();
    if count <= width {
        return format!("{value:<width$}");
    }
    let truncated: String = value.chars().take(width.saturating_sub(1)).collect();
    format!("{truncated}…")
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    list: bool,
    json: bool,
    sort: Vec<ColumnField>,
    search: Option<String>,
    open: Option<String>,
    complete: Option<String>,
    due: Option<(String, String)>,
}

impl CliOptions {
    /// Listing is the default when no other command was requested.
    fn runs_default_listing(&self) -> bool {
        self.search.is_none()
            && self.open.is_none()
            && self.complete.is_none()
            && self.due.is_none()
    }
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
        list: false,
        json: false,
        sort: Vec::new(),
        search: None,
        open: None,
        complete: None,
        due: None,
    };

    let mut iter = args.into_iter().map(|arg| arg.as_ref().to_owned());
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = next_value(&mut iter, "--config", "a file path")?;
                options.config_path = PathBuf::from(path);
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--list" => {
                options.list = true;
            }
            "--json" => {
                options.json = true;
            }
            "--sort" => {
                let raw = next_value(&mut iter, "--sort", "a column name")?;
                let field = ColumnField::parse(&raw)
                    .filter(|field| field.spec().sortable)
                    .ok_or_else(|| {
                        anyhow!(
                            "--sort {raw:?} is not a sortable column; use one of title, assigned_to, status, due_date, priority, module"
                        )
                    })?;
                options.sort.push(field);
            }
            "--search" => {
                options.search = Some(next_value(&mut iter, "--search", "a query")?);
            }
            "--open" => {
                options.open = Some(next_value(&mut iter, "--open", "an action item id")?);
            }
            "--complete" => {
                let id = next_value(&mut iter, "--complete", "an action item id")?;
                options.complete = Some(id);
            }
            "--due" => {
                let id = next_value(&mut iter, "--due", "an action item id and a date")?;
                let date =
                    next_value(&mut iter, "--due", "a date (YYYY-MM-DD, or \"\" to clear)")?;
                options.due = Some((id, date));
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                bail!("unknown argument {unknown:?}; run with --help to see supported options");
            }
        }
    }

    Ok(options)
}

fn next_value<I>(iter: &mut I, flag: &str, what: &str) -> Result<String>
where
    I: Iterator<Item = String>,
{
    iter.next().ok_or_else(|| anyhow!("{flag} requires {what}"))
}

fn print_help() {
    println!("crmdesk");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Run against seeded demo data (in-memory)");
    println!("  --check                  Validate config + database and exit");
    println!("  --list                   Print the action items table (default)");
    println!("  --sort <field>           Sort the listing; repeat to flip direction");
    println!("  --search <query>         Search contacts");
    println!("  --open <item-id>         Show the record linked to an action item");
    println!("  --complete <item-id>     Mark an action item completed");
    println!("  --due <item-id> <date>   Set an action item due date (\"\" clears it)");
    println!("  --json                   Emit JSON instead of text");
    println!("  --help                   Show this help");
}
