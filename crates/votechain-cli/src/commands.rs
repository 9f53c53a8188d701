use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use votechain_host::{HostConfig, HostError, LogSink, SubjectResults, VotingService};
use votechain_ledger::{
    Block, ChainArchive, ChainValidator, InMemoryLedger, LedgerReader, ValidationReport,
};
use votechain_types::SubjectId;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Demo => cmd_demo(format),
        Command::Init(args) => cmd_init(args),
        Command::Cast(args) => cmd_cast(args, format),
        Command::Verify(store) => cmd_verify(store, format),
        Command::Tally(args) => cmd_tally(args, format),
        Command::Show(args) => cmd_show(args, format),
    }
}

fn load_config(store: &StoreArgs) -> anyhow::Result<HostConfig> {
    match &store.config {
        Some(path) => HostConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(HostConfig::demo()?),
    }
}

/// Load and verify the archive, or start a fresh chain if there is none.
fn open_ledger(path: &Path, config: &HostConfig) -> anyhow::Result<InMemoryLedger> {
    if !path.exists() {
        return Ok(InMemoryLedger::new()?.with_difficulty(config.difficulty));
    }
    let ledger = ChainArchive::load(path)?
        .into_ledger()
        .with_context(|| format!("archive {} failed verification", path.display()))?;
    Ok(ledger)
}

fn open_service(store: &StoreArgs) -> anyhow::Result<VotingService> {
    let config = load_config(store)?;
    let ledger = open_ledger(&store.archive, &config)?;
    Ok(VotingService::new(Arc::new(ledger), config.registry()?)?.with_sink(Arc::new(LogSink)))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_demo(format: OutputFormat) -> anyhow::Result<()> {
    let config = HostConfig::demo()?;
    let ledger = Arc::new(InMemoryLedger::new()?);
    let service = VotingService::from_config(&config, ledger)?;

    for (actor, subject, choice) in [("u1", "e1", "c1"), ("u2", "e1", "c2"), ("u1", "e1", "c1")] {
        match service.cast_vote(actor, subject, choice) {
            Ok(receipt) => {
                if let OutputFormat::Text = format {
                    println!(
                        "{} {} voted {} in {} (block #{})",
                        "✓".green().bold(),
                        actor.bold(),
                        choice.yellow(),
                        subject,
                        receipt.block.sequence
                    );
                }
            }
            Err(HostError::Rejected(rejection)) => {
                if let OutputFormat::Text = format {
                    println!("{} {}", "✗".red().bold(), rejection);
                }
            }
            Err(err) => return Err(err.into()),
        }
    }

    let status = service.chain_status()?;
    let results = service.all_results()?;
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "status": status,
            "results": results,
            "blocks": service.snapshot()?,
        })),
        OutputFormat::Text => {
            println!();
            for block in service.snapshot()? {
                print_block(&block);
            }
            println!();
            print_results(&results);
            println!(
                "\nChain: {} blocks, head {}, integrity {}",
                status.length.to_string().bold(),
                status.head_digest.short_hex().dimmed(),
                if status.valid { "✓".green() } else { "✗".red() }
            );
            Ok(())
        }
    }
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    let path = &args.store.archive;
    if path.exists() && !args.force {
        bail!("{} already exists (use --force to replace it)", path.display());
    }
    let config = load_config(&args.store)?;
    let ledger = InMemoryLedger::new()?.with_difficulty(config.difficulty);
    ChainArchive::capture(&ledger)?.save(path)?;
    println!(
        "{} Initialized chain in {}",
        "✓".green().bold(),
        path.display().to_string().bold()
    );
    Ok(())
}

fn cmd_cast(args: CastArgs, format: OutputFormat) -> anyhow::Result<()> {
    let service = open_service(&args.store)?;
    let receipt = service.cast_vote(&args.actor, &args.subject, &args.choice)?;
    ChainArchive::capture(service.ledger())?.save(&args.store.archive)?;

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "block": receipt.block,
            "results": receipt.results,
        })),
        OutputFormat::Text => {
            println!("{} Vote recorded", "✓".green().bold());
            println!("  Block: #{} {}", receipt.block.sequence, receipt.block.digest.short_hex().yellow());
            for (name, count) in &receipt.results {
                println!("  {name}: {}", count.to_string().bold());
            }
            Ok(())
        }
    }
}

fn cmd_verify(store: StoreArgs, format: OutputFormat) -> anyhow::Result<()> {
    let archive = ChainArchive::load(&store.archive)?;
    let report = ChainValidator::validate_blocks(&archive.blocks);

    match format {
        OutputFormat::Json => print_json(&report_json(&report))?,
        OutputFormat::Text => print_report(&report),
    }

    if !report.is_valid() {
        bail!("chain integrity check failed with {} violation(s)", report.violations.len());
    }
    Ok(())
}

fn report_json(report: &ValidationReport) -> serde_json::Value {
    let violations: Vec<_> = report
        .violations
        .iter()
        .map(|v| {
            serde_json::json!({
                "index": v.index,
                "kind": format!("{:?}", v.kind),
                "description": v.description,
            })
        })
        .collect();
    serde_json::json!({
        "valid": report.is_valid(),
        "block_count": report.block_count,
        "genesis_valid": report.genesis_valid,
        "digests_valid": report.digests_valid,
        "links_valid": report.links_valid,
        "sequence_monotonic": report.sequence_monotonic,
        "violations": violations,
    })
}

fn check_mark(ok: bool) -> colored::ColoredString {
    if ok {
        "valid".green()
    } else {
        "INVALID".red().bold()
    }
}

fn print_report(report: &ValidationReport) {
    if report.is_valid() {
        println!("{} Chain integrity verified", "✓".green().bold());
    } else {
        println!("{} Chain integrity check failed", "✗".red().bold());
    }
    println!("  Blocks: {}", report.block_count);
    println!("  Genesis: {}", check_mark(report.genesis_valid));
    println!("  Digests: {}", check_mark(report.digests_valid));
    println!("  Links: {}", check_mark(report.links_valid));
    println!("  Sequences: {}", check_mark(report.sequence_monotonic));
    for violation in &report.violations {
        println!(
            "  {} block #{}: {:?} ({})",
            "!".red(),
            violation.index,
            violation.kind,
            violation.description
        );
    }
}

fn cmd_tally(args: TallyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let service = open_service(&args.store)?;
    let results: Vec<SubjectResults> = match &args.subject {
        Some(subject) => {
            let subject = SubjectId::new(subject.as_str())?;
            service
                .all_results()?
                .into_iter()
                .filter(|r| r.subject_id == subject)
                .collect()
        }
        None => service.all_results()?,
    };
    if results.is_empty() {
        if let Some(subject) = &args.subject {
            bail!("subject {subject} is not registered");
        }
    }

    match format {
        OutputFormat::Json => print_json(&results),
        OutputFormat::Text => {
            print_results(&results);
            Ok(())
        }
    }
}

fn print_results(results: &[SubjectResults]) {
    for subject in results {
        let state = if subject.active { "open".green() } else { "closed".dimmed() };
        println!("{} ({}) [{}]", subject.name.bold(), subject.subject_id, state);
        if subject.results.is_empty() {
            println!("  no votes");
        }
        for (name, count) in &subject.results {
            println!("  {name}: {}", count.to_string().bold());
        }
    }
}

fn cmd_show(args: ShowArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config(&args.store)?;
    let ledger = open_ledger(&args.store.archive, &config)?;
    let blocks: Vec<Block> = match args.sequence {
        Some(sequence) => {
            let block = ledger
                .get(sequence)?
                .with_context(|| format!("no block with sequence {sequence}"))?;
            vec![block]
        }
        None => ledger.snapshot()?,
    };

    match format {
        OutputFormat::Json => print_json(&blocks),
        OutputFormat::Text => {
            for block in &blocks {
                print_block(block);
            }
            Ok(())
        }
    }
}

fn print_block(block: &Block) {
    let previous = match block.previous_digest.digest() {
        Some(digest) => digest.short_hex(),
        None => block.previous_digest.to_string(),
    };
    println!(
        "{} {}  prev {}  {}",
        format!("#{}", block.sequence).yellow().bold(),
        block.digest.short_hex(),
        previous.dimmed(),
        block.timestamp.to_rfc3339().dimmed()
    );
    if block.is_genesis() {
        println!("  {}", "genesis".cyan());
    }
    for entry in block.entries() {
        println!(
            "  {} -> {}: {}",
            entry.actor_id,
            entry.subject_id,
            entry.choice_id.as_str().yellow()
        );
    }
}
