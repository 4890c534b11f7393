//! Command handlers. Each one builds its own object store client and working
//! set; nothing survives between invocations.

use std::path::Path;

use anyhow::{Context, bail};
use chrono::Utc;
use tracing::{info, warn};
use webjuris_core::{CaseDraft, CasePatch, CaseQuery, CaseRecord, courts, nomenclature};
use webjuris_store::{CaseBook, NumberRegistry};
use webjuris_sync::{ListParams, ObjectStoreClient, ObjectStoreConfig};

use crate::display;
use crate::{Command, CreateArgs, ListArgs, NumbersAction, UpdateArgs};

pub async fn run(command: Command, json: bool) -> anyhow::Result<()> {
    match command {
        Command::List(args) => list(args, json).await,
        Command::Show { id } => show(&id, json).await,
        Command::Create(args) => create(args, json).await,
        Command::Update(args) => update(args, json).await,
        Command::Delete { id } => delete(&id).await,
        Command::NextNumber { code } => next_number(&code).await,
        Command::Numbers { file, action } => numbers(&file, action, json).await,
        Command::Ping => ping().await,
        Command::Codes => {
            display::print_codes(nomenclature::all());
            Ok(())
        }
        Command::Courts { appeal } => list_courts(appeal.as_deref()),
    }
}

fn connect() -> anyhow::Result<ObjectStoreClient> {
    let config = ObjectStoreConfig::from_env()?;
    Ok(ObjectStoreClient::new(config)?)
}

/// Every case currently on the server, as the snapshot used for numbering
/// and duplicate checks.
async fn snapshot(client: &ObjectStoreClient) -> anyhow::Result<CaseBook> {
    let cases = client.load_all(client.page_size()).await?;
    Ok(CaseBook::from_cases(cases))
}

fn print_record(record: &CaseRecord, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        display::print_case_card(record);
    }
    Ok(())
}

async fn list(args: ListArgs, json: bool) -> anyhow::Result<()> {
    let client = connect()?;
    let page_size = args.page_size.unwrap_or(client.page_size());

    let (book, total, has_more) = if args.all {
        let book = snapshot(&client).await?;
        let total = book.len() as u64;
        (book, total, false)
    } else {
        let params = ListParams {
            search: args.search,
            ..ListParams::new(args.page, page_size)
        };
        let page = client.load_page(&params).await?;
        let has_more = page.has_more();
        (CaseBook::from_cases(page.items), page.total_count, has_more)
    };

    let query = CaseQuery::new(args.query, args.status);
    let visible = book.filter(&query);

    if json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
        return Ok(());
    }

    display::print_counts(&book.status_counts());
    display::print_case_table(&visible);
    if has_more {
        println!(
            "Page {} of {} cases; use --page {} for more.",
            args.page,
            total,
            args.page + 1
        );
    }
    Ok(())
}

async fn show(id: &str, json: bool) -> anyhow::Result<()> {
    let client = connect()?;
    let case = client.fetch_case(id).await?;
    print_record(&case, json)
}

async fn create(args: CreateArgs, json: bool) -> anyhow::Result<()> {
    let client = connect()?;
    let mut book = snapshot(&client).await?;

    let draft = CaseDraft {
        title: args.title,
        client: args.client,
        year: args
            .year
            .unwrap_or_else(|| CaseDraft::for_current_year().year),
        classification_code: args.code,
        sequence: args.sequence,
        status: args.status,
        priority: args.priority,
        description: args.description,
        lawyer: args.lawyer,
        court: args.court,
        court_of_appeal: args.appeal,
        first_instance_tribunal: args.tribunal,
        next_hearing: args.next_hearing,
    };

    let local = book.insert_draft(&draft, Utc::now())?.clone();
    info!(case_number = %local.case_number, "submitting new case");
    let created = client.create(&local).await?;
    if created.case_number != local.case_number {
        warn!(
            sent = %local.case_number,
            echoed = %created.case_number,
            "object store echoed a different case number"
        );
    }
    print_record(&created, json)
}

async fn update(args: UpdateArgs, json: bool) -> anyhow::Result<()> {
    let patch = CasePatch {
        title: args.title,
        client: args.client,
        status: args.status,
        priority: args.priority,
        description: args.description,
        lawyer: args.lawyer,
        court: args.court,
        court_of_appeal: args.appeal,
        first_instance_tribunal: args.tribunal,
        next_hearing: args.next_hearing,
    };
    if patch.is_empty() {
        bail!("nothing to update; pass at least one field");
    }

    let client = connect()?;
    let current = client.fetch_case(&args.id).await?;
    let mut book = CaseBook::from_cases(vec![current]);
    let edited = book.update(&args.id, &patch, Utc::now())?;
    // Only the patched fields go back; placeholders stay local.
    let changes = patch.changes(edited);
    client.update(&args.id, &changes).await?;
    let saved = client.fetch_case(&args.id).await?;
    print_record(&saved, json)
}

async fn delete(id: &str) -> anyhow::Result<()> {
    let client = connect()?;
    client.delete(id).await?;
    println!("Deleted case {id}.");
    Ok(())
}

async fn next_number(code: &str) -> anyhow::Result<()> {
    let entry = nomenclature::find(code)
        .with_context(|| format!("unknown classification code '{code}'; see `webjuris codes`"))?;
    let client = connect()?;
    let book = snapshot(&client).await?;
    println!("{}", book.next_case_number(entry.code));
    Ok(())
}

async fn numbers(file: &Path, action: NumbersAction, json: bool) -> anyhow::Result<()> {
    let mut registry = NumberRegistry::load(file)?;

    match action {
        NumbersAction::List => {
            let client = connect()?;
            let book = snapshot(&client).await?;
            let usage = registry.usage(book.cases());
            if json {
                let rows: Vec<_> = usage
                    .iter()
                    .map(|u| {
                        serde_json::json!({
                            "id": u.entry.id,
                            "number": u.entry.number,
                            "note": u.entry.note,
                            "used": u.used,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                display::print_numbers(&usage);
            }
            return Ok(());
        }
        NumbersAction::Add { number, note } => {
            let entry = registry.add(&number, note)?;
            println!("Reserved {} as #{}.", entry.number, entry.id);
        }
        NumbersAction::Edit { id, number } => {
            let client = connect()?;
            let book = snapshot(&client).await?;
            let entry = registry.edit(id, &number, book.cases())?;
            println!("Reserved number #{} is now {}.", entry.id, entry.number);
        }
        NumbersAction::Delete { id } => {
            let client = connect()?;
            let book = snapshot(&client).await?;
            let removed = registry.delete(id, book.cases())?;
            println!("Released {}.", removed.number);
        }
    }
    registry.save(file)?;
    Ok(())
}

async fn ping() -> anyhow::Result<()> {
    let client = connect()?;
    client.ping().await?;
    println!("Connected to {}.", client.collection_url());
    Ok(())
}

fn list_courts(appeal: Option<&str>) -> anyhow::Result<()> {
    match appeal {
        None => display::print_courts(courts::COURTS_OF_APPEAL),
        Some(id) => {
            let court = courts::court_of_appeal(id)
                .with_context(|| format!("unknown court of appeal '{id}'"))?;
            let tribunals: Vec<_> = courts::tribunals_for(court.id).collect();
            display::print_tribunals(court, &tribunals);
        }
    }
    Ok(())
}
