//! The operations every collection shares, written once against
//! `CollectionController`.

use std::time::Duration;

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tabled::Tabled;

use adminly_core::{
    BulkAction, BulkReport, CollectionController, CoreError, DirectorySink, FilterPatch, Gateway,
    Phase, Resource, ResourceId, export_filename,
};

use crate::cli::{CollectionCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

/// How a resource shows up in the terminal.
pub trait Presenter: Resource + Serialize {
    type Row: Tabled;

    /// Singular noun for messages ("user").
    const NOUN: &'static str;

    fn row(&self, color: bool) -> Self::Row;

    fn detail(&self) -> String;
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle<R, G>(
    controller: &CollectionController<R, G>,
    cmd: CollectionCommand,
    global: &GlobalOpts,
) -> Result<(), CliError>
where
    R: Presenter,
    R::Draft: DeserializeOwned,
    G: Gateway<R>,
{
    match cmd {
        CollectionCommand::List(args) => {
            let mut patch = args.filters.to_patch();
            if let Some(limit) = args.limit {
                patch = patch.limit(limit);
            }
            load(controller, patch).await?;

            if args.page > 1 && !controller.change_page(args.page).await {
                return Err(CliError::PageOutOfRange {
                    page: args.page,
                    last_page: controller.pagination().map_or(1, |m| m.last_page()),
                });
            }
            check(controller)?;

            let snap = controller.snapshot();
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                snap.items().as_slice(),
                |item| item.row(color),
                |item| item.id().to_string(),
            );
            output::print_output(&out, global.quiet);

            if matches!(global.output, OutputFormat::Table) {
                if snap.is_empty_result() {
                    output::note(&format!("No {} match", R::COLLECTION), global.quiet);
                } else if let Some(meta) = snap.pagination() {
                    output::note(&output::page_footer(&meta), global.quiet);
                }
            }
            Ok(())
        }

        CollectionCommand::Get { id } => {
            let id = ResourceId::new(id);
            let Some(record) = controller.get(&id).await else {
                return Err(lookup_failure::<R, G>(controller, &id));
            };
            let out = output::render_single(
                &global.output,
                &record,
                |r| r.detail(),
                |r| r.id().to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CollectionCommand::Create { from_file } => {
            let draft: R::Draft = util::read_draft(&from_file)?;
            let outcome = controller.create(draft).await;
            if !outcome.success {
                return Err(CliError::from_outcome(&outcome));
            }
            if let Some(ref record) = outcome.record {
                print_record(record, global);
            }
            output::note(&format!("Created {}", R::NOUN), global.quiet);
            Ok(())
        }

        CollectionCommand::Update { id, from_file } => {
            let id = ResourceId::new(id);
            let draft: R::Draft = util::read_draft(&from_file)?;
            let outcome = controller.update(&id, draft).await;
            if !outcome.success {
                return Err(not_found_or(
                    controller,
                    &id,
                    CliError::from_outcome(&outcome),
                ));
            }
            if let Some(ref record) = outcome.record {
                print_record(record, global);
            }
            output::note(&format!("Updated {} {id}", R::NOUN), global.quiet);
            Ok(())
        }

        CollectionCommand::Delete { id } => {
            let id = ResourceId::new(id);
            if !util::confirm(&format!("Delete {} {id}?", R::NOUN), global.yes)? {
                return Ok(());
            }
            if !controller.remove(&id).await {
                return Err(lookup_failure::<R, G>(controller, &id));
            }
            output::note(&format!("Deleted {} {id}", R::NOUN), global.quiet);
            Ok(())
        }

        CollectionCommand::BulkDelete { ids } => {
            let ids = select(controller, ids);
            let prompt = format!("Delete {} {}?", ids.len(), R::COLLECTION);
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }
            let report = controller.bulk_action_report(&ids, BulkAction::Delete).await;
            summarize::<R>(&report, "delete", global)
        }

        CollectionCommand::BulkUpdate { ids, from_file } => {
            let draft: R::Draft = util::read_draft(&from_file)?;
            let ids = select(controller, ids);
            let report = controller
                .bulk_action_report(&ids, BulkAction::Update(draft))
                .await;
            summarize::<R>(&report, "update", global)
        }

        CollectionCommand::Export { filters, dir } => {
            load(controller, filters.to_patch()).await?;
            tokio::fs::create_dir_all(&dir).await?;

            let spinner = spinner(global, &format!("Exporting {}...", R::COLLECTION));
            let ok = controller.export_current_view(&DirectorySink::new(&dir)).await;
            spinner.finish_and_clear();

            if !ok {
                return Err(controller.error().map_or_else(
                    || CliError::Export {
                        message: "export did not complete".into(),
                    },
                    CliError::from,
                ));
            }
            let path = dir.join(export_filename(R::COLLECTION, Utc::now().date_naive()));
            output::note(&format!("Wrote {}", path.display()), global.quiet);
            Ok(())
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Apply the filters and make sure at least one page has been fetched.
async fn load<R: Resource, G: Gateway<R>>(
    controller: &CollectionController<R, G>,
    patch: FilterPatch,
) -> Result<(), CliError> {
    controller.set_filter(patch).await;
    // An unchanged filter does not fetch on its own.
    if controller.snapshot().phase() == Phase::Idle {
        controller.refresh().await;
    }
    check(controller)
}

fn check<R: Resource, G: Gateway<R>>(controller: &CollectionController<R, G>) -> Result<(), CliError> {
    match controller.error() {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Route the ids through the selection so duplicates collapse.
fn select<R: Resource, G: Gateway<R>>(
    controller: &CollectionController<R, G>,
    ids: Vec<String>,
) -> Vec<ResourceId> {
    controller.select_all(ids.into_iter().map(ResourceId::new));
    controller.selection().to_vec()
}

fn not_found(noun: &str, collection: &str, id: &ResourceId) -> CliError {
    CliError::NotFound {
        resource_type: noun.into(),
        identifier: id.to_string(),
        list_command: format!("{collection} list"),
    }
}

/// Error for a failed single-record call, with 404 turned into `NotFound`.
fn lookup_failure<R: Presenter, G: Gateway<R>>(
    controller: &CollectionController<R, G>,
    id: &ResourceId,
) -> CliError {
    match controller.error() {
        Some(CoreError::Server {
            status: Some(404), ..
        })
        | None => not_found(R::NOUN, R::COLLECTION, id),
        Some(e) => e.into(),
    }
}

fn not_found_or<R: Presenter, G: Gateway<R>>(
    controller: &CollectionController<R, G>,
    id: &ResourceId,
    fallback: CliError,
) -> CliError {
    match controller.error() {
        Some(CoreError::Server {
            status: Some(404), ..
        }) => not_found(R::NOUN, R::COLLECTION, id),
        _ => fallback,
    }
}

fn print_record<R: Presenter>(record: &R, global: &GlobalOpts) {
    let out = output::render_single(
        &global.output,
        record,
        R::detail,
        |r| r.id().to_string(),
    );
    output::print_output(&out, global.quiet);
}

fn summarize<R: Resource>(report: &BulkReport, action: &str, global: &GlobalOpts) -> Result<(), CliError> {
    for (id, reason) in &report.failed {
        eprintln!("  ✗ {id}: {reason}");
    }
    let total = report.succeeded.len() + report.failed.len();
    output::note(
        &format!(
            "{action}: {} of {total} {} succeeded",
            report.succeeded.len(),
            R::COLLECTION
        ),
        global.quiet,
    );
    if report.all_succeeded() {
        Ok(())
    } else {
        Err(CliError::PartialFailure {
            action: action.into(),
            failed: report.failed.len(),
            total,
        })
    }
}

fn spinner(global: &GlobalOpts, message: &str) -> ProgressBar {
    if global.quiet || !std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
