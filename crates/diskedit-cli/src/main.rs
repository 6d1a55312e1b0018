//! diskedit - interactive disk partition layout editor
//!
//! Edits an in-memory partition layout and keeps a live, line-oriented
//! control table in sync with it using minimal destructive edits.

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use diskedit_core::DiskGeometry;
use diskedit_ctl::{read_layout, CtlFile};
use diskedit_expr::ExprEvaluator;
use diskedit_layout::PartitionSet;

mod command;
mod editor;

use editor::Editor;

#[derive(Debug, Parser)]
#[command(name = "diskedit", about = "Interactive disk partition layout editor")]
struct Args {
    /// Control-table file of the disk being edited
    ctl: PathBuf,

    /// Number of sectors in the edited region
    #[arg(long)]
    sectors: i64,

    /// Absolute sector offset of the edited region
    #[arg(long, default_value_t = 0)]
    offset: i64,

    /// Control-table name of the partition being edited
    #[arg(long, default_value = "disk")]
    partition: String,

    /// Refuse all writes to the control table
    #[arg(long)]
    read_only: bool,

    /// Refuse to hold more than this many partitions
    #[arg(long)]
    capacity: Option<usize>,

    /// Seed the layout from the control table's current records
    #[arg(long)]
    from_ctl: bool,

    /// Print the layout as JSON and exit instead of entering the editor
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct LayoutRow<'a> {
    name: Option<&'a str>,
    start: i64,
    end: i64,
    sectors: i64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut geometry = DiskGeometry::new(&args.partition, args.sectors).with_offset(args.offset);
    if args.read_only {
        geometry = geometry.read_only();
    }

    let mut backend = CtlFile::open(&args.ctl, geometry)
        .with_context(|| format!("opening control table {}", args.ctl.display()))?;

    let mut set = match args.capacity {
        Some(capacity) => PartitionSet::with_capacity_limit(capacity),
        None => PartitionSet::new(),
    };

    if args.from_ctl {
        for part in read_layout(&mut backend).context("reading control table")? {
            let name = part.name.clone();
            if let Err(e) = set.add(part) {
                // nested or otherwise conflicting table entries cannot be
                // edited as layout members; leave them to reconciliation
                tracing::warn!("skipping control entry \"{}\": {}", name, e);
            }
        }
        set.mark_clean();
    }

    if args.json {
        let rows: Vec<LayoutRow<'_>> = set
            .summary(args.sectors)
            .into_iter()
            .map(|row| LayoutRow {
                name: row.part.map(|p| p.name.as_str()),
                start: row.start,
                end: row.end,
                sectors: row.end - row.start,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut editor = Editor::new(set, backend, ExprEvaluator, stdin.lock(), stdout.lock());
    editor.run().context("editor session failed")?;
    Ok(())
}
