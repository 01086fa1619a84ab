//! The sync command: pick source and target, then drive the batch sync
//! across the seven standard categories with live progress.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use dialoguer::Select;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tabled::Tabled;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use dpsync_core::{
    Node, Outcome, RunReport, SiteClient, SyncEngine, SyncEvent, SyncOptions, TargetHandle,
    catalog,
};

use crate::cli::{GlobalOpts, OutputFormat, SyncArgs};
use crate::config::Config;
use crate::error::{CliError, exit_code};
use crate::output;

use super::util;

// ── Node selection ──────────────────────────────────────────────────

/// Match a `--source` / `--target` value against the node list, by id
/// first, then by name. Id matches win even when another node's name
/// collides with the identifier.
fn resolve_node<'a>(nodes: &'a [Node], identifier: &str) -> Result<&'a Node, CliError> {
    nodes
        .iter()
        .find(|n| n.id == identifier)
        .or_else(|| nodes.iter().find(|n| n.name == identifier))
        .ok_or_else(|| CliError::NodeNotFound {
            identifier: identifier.to_owned(),
        })
}

fn node_label(node: &Node) -> String {
    match &node.server {
        Some(server) => format!("{} ({server})", node.name),
        None => format!("{} ({})", node.name, node.id),
    }
}

/// Interactive node picker, optionally excluding one node id.
fn pick_node<'a>(
    prompt: &str,
    nodes: &'a [Node],
    exclude: Option<&str>,
) -> Result<&'a Node, CliError> {
    let candidates: Vec<&Node> = nodes
        .iter()
        .filter(|n| exclude != Some(n.id.as_str()))
        .collect();
    if candidates.is_empty() {
        return Err(CliError::Validation {
            field: "nodes".into(),
            reason: "no other distribution point is available as target".into(),
        });
    }

    let labels: Vec<String> = candidates.iter().map(|n| node_label(n)).collect();
    let selection = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()
        .map_err(util::prompt_err)?;

    Ok(candidates[selection])
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: Arc<SiteClient>,
    args: SyncArgs,
    config: &Config,
    global: &GlobalOpts,
) -> Result<i32, CliError> {
    let nodes = catalog::list_nodes(&client).await?;
    if nodes.is_empty() {
        return Err(CliError::Validation {
            field: "nodes".into(),
            reason: "the site has no distribution points".into(),
        });
    }

    let source = match args.source.as_deref() {
        Some(id) => resolve_node(&nodes, id)?,
        None => pick_node("Source distribution point", &nodes, None)?,
    }
    .clone();
    let target = match args.target.as_deref() {
        Some(id) => resolve_node(&nodes, id)?,
        None => pick_node("Target distribution point", &nodes, Some(&source.id))?,
    }
    .clone();

    // Selecting the same node twice is a usage error, caught before any
    // category processing starts.
    if source.id == target.id {
        return Err(CliError::Validation {
            field: "target".into(),
            reason: "source and target must be different distribution points".into(),
        });
    }

    if !util::confirm(
        &format!(
            "Copy all content from '{}' to '{}'?",
            source.name, target.name
        ),
        global.yes,
    )? {
        return Ok(exit_code::SUCCESS);
    }

    let target_handle = TargetHandle::new(target.id.clone()).map_err(CliError::from)?;

    let options = SyncOptions {
        item_delay: Duration::from_millis(args.delay_ms.unwrap_or(config.defaults.item_delay_ms)),
        item_timeout: args.item_timeout.map(Duration::from_secs),
    };

    // Ctrl-C cancels between items; the partial report is still rendered.
    let cancel = CancellationToken::new();
    let signal_task = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let (tx, rx) = mpsc::unbounded_channel();
    let format = global.output_format();
    let live_progress = !global.quiet && matches!(format, OutputFormat::Table);
    let color = output::should_color(&global.color_mode());
    let renderer = tokio::spawn(render_events(rx, live_progress, color));

    let categories = catalog::standard_categories(Arc::clone(&client));
    let report = {
        let engine = SyncEngine::new(options)
            .with_events(tx)
            .with_cancellation(cancel);
        engine.run(&categories, &target_handle).await?
    };

    signal_task.abort();
    let _ = renderer.await;

    let out = output::render_single(
        &format,
        &report,
        |r| format_report(r, color),
        |r| format!("{}/{}", r.total_success(), r.total_items()),
    );
    output::print_output(&out, global.quiet);

    Ok(if report.is_clean() {
        exit_code::SUCCESS
    } else {
        exit_code::GENERAL
    })
}

// ── Live progress rendering ─────────────────────────────────────────

/// Consume engine events, drawing one progress bar per category and
/// echoing failures as they happen.
async fn render_events(
    mut rx: mpsc::UnboundedReceiver<SyncEvent>,
    live: bool,
    color: bool,
) {
    let mut bar: Option<ProgressBar> = None;

    while let Some(event) = rx.recv().await {
        if !live {
            continue;
        }
        match event {
            SyncEvent::CategoryStarted { category, total } => {
                let pb = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
                pb.set_style(
                    ProgressStyle::with_template("{prefix:>20} [{bar:30}] {pos}/{len}")
                        .expect("static template")
                        .progress_chars("=> "),
                );
                pb.set_prefix(category);
                bar = Some(pb);
            }
            SyncEvent::EnumerationFailed { category, reason } => {
                let line = format!("{category}: enumeration failed: {reason}");
                if color {
                    eprintln!("{}", line.red());
                } else {
                    eprintln!("{line}");
                }
            }
            SyncEvent::Item { item, outcome, .. } => {
                if let Outcome::Failure { ref reason } = outcome {
                    let line = format!("  failed: {item}: {reason}");
                    match &bar {
                        Some(pb) => pb.println(if color {
                            line.red().to_string()
                        } else {
                            line
                        }),
                        None => eprintln!("{line}"),
                    }
                }
                if let Some(ref pb) = bar {
                    pb.inc(1);
                }
            }
            SyncEvent::CategoryFinished { .. } => {
                if let Some(pb) = bar.take() {
                    pb.finish_and_clear();
                }
            }
            SyncEvent::Cancelled => {
                if let Some(pb) = bar.take() {
                    pb.abandon();
                }
                eprintln!("cancelled -- report reflects partial completion");
            }
        }
    }
}

// ── Report rendering ────────────────────────────────────────────────

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Items")]
    items: String,
    #[tabled(rename = "Success")]
    success: usize,
    #[tabled(rename = "Failed")]
    failed: usize,
    #[tabled(rename = "Rate")]
    rate: String,
}

fn format_report(report: &RunReport, color: bool) -> String {
    let rows: Vec<CategoryRow> = report
        .categories
        .iter()
        .map(|stats| CategoryRow {
            category: stats.name.clone(),
            items: stats.total.to_string(),
            success: stats.success,
            failed: stats.failed,
            rate: match stats.enumeration_error {
                Some(_) => "error".into(),
                None => output::fmt_rate(stats.success_rate()),
            },
        })
        .collect();

    let mut out = output::render_table(&rows);
    let _ = writeln!(out);

    let summary = format!(
        "{} of {} items distributed, {} failed ({}) in {}s",
        report.total_success(),
        report.total_items(),
        report.total_failed(),
        output::fmt_rate(if report.total_items() == 0 {
            None
        } else {
            Some(report.success_rate())
        }),
        report.duration().num_seconds()
    );
    if color && report.is_clean() {
        let _ = write!(out, "{}", summary.green());
    } else if color {
        let _ = write!(out, "{}", summary.red());
    } else {
        let _ = write!(out, "{summary}");
    }
    if report.cancelled {
        let _ = write!(out, " [cancelled]");
    }
    out
}
