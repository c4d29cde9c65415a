//! Repository command handlers.
//!
//! Mutations drive a [`Navigator`] through the same states an interactive
//! console would: edit, save or erase, change status.

use std::sync::Arc;

use tabled::Tabled;

use chililog_core::{
    Console, DocumentId, Event, Navigator, QueueMaxMemoryPolicy, RepositoryInfo, RepositoryStatus,
    StartupStatus,
};

use crate::cli::{
    GlobalOpts, MemoryPolicyArg, ReposArgs, ReposCommand, RepositoryFields, StartupStatusArg,
};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RepositoryRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Display Name")]
    display_name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Startup")]
    startup: String,
    #[tabled(rename = "Workers")]
    workers: u32,
    #[tabled(rename = "Keywords")]
    max_keywords: String,
}

impl RepositoryRow {
    fn new(r: &RepositoryInfo, color: bool) -> Self {
        Self {
            name: r.name.clone(),
            display_name: util::or_dash(r.display_name.as_deref()),
            status: output::paint_repository_status(r.current_status, color),
            startup: r.startup_status.to_string(),
            workers: r.write_queue_worker_count,
            max_keywords: if r.has_unlimited_keywords() {
                "unlimited".into()
            } else {
                r.max_keywords.to_string()
            },
        }
    }
}

fn repository_detail(r: &RepositoryInfo, color: bool) -> String {
    output::detail_lines(&[
        ("ID", r.id.as_ref().map(ToString::to_string).unwrap_or_default()),
        ("Version", r.version.to_string()),
        ("Name", r.name.clone()),
        ("Display Name", r.display_name.clone().unwrap_or_default()),
        ("Description", r.description.clone().unwrap_or_default()),
        (
            "Status",
            output::paint_repository_status(r.current_status, color),
        ),
        ("Startup Status", r.startup_status.to_string()),
        ("Read Queue Durable", r.read_queue_durable.to_string()),
        ("Write Queue Durable", r.write_queue_durable.to_string()),
        ("Write Workers", r.write_queue_worker_count.to_string()),
        ("Write Max Memory", r.write_queue_max_memory.to_string()),
        (
            "Write Memory Policy",
            r.write_queue_max_memory_policy.to_string(),
        ),
        ("Write Page Size", r.write_queue_page_size.to_string()),
        ("Write Page Cache", r.write_queue_page_count_cache.to_string()),
        ("Max Keywords", r.max_keywords.to_string()),
    ])
}

/// Repository table (or the selected structured format), sorted by name.
pub fn render_repository_list(console: &Console, global: &GlobalOpts) -> Result<String, CliError> {
    let color = output::should_color(&global.color);
    let mut repositories: Vec<Arc<RepositoryInfo>> =
        console.repository_info().snapshot().iter().cloned().collect();
    repositories.sort_by(|a, b| a.name.cmp(&b.name));
    output::render_list(
        &global.output,
        &repositories,
        |r| RepositoryRow::new(r, color),
        |r| r.name.clone(),
    )
}

fn print_repository(r: &RepositoryInfo, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        r,
        |r| repository_detail(r, color),
        |r| r.name.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Field edits ─────────────────────────────────────────────────────

fn apply_fields(fields: &RepositoryFields, r: &mut RepositoryInfo) {
    if let Some(ref v) = fields.display_name {
        r.display_name = Some(v.clone());
    }
    if let Some(ref v) = fields.description {
        r.description = Some(v.clone());
    }
    if let Some(v) = fields.startup_status {
        r.startup_status = match v {
            StartupStatusArg::Online => StartupStatus::Online,
            StartupStatusArg::Offline => StartupStatus::Offline,
        };
    }
    if let Some(v) = fields.read_queue_durable {
        r.read_queue_durable = v;
    }
    if let Some(v) = fields.write_queue_durable {
        r.write_queue_durable = v;
    }
    if let Some(v) = fields.worker_count {
        r.write_queue_worker_count = v;
    }
    if let Some(v) = fields.max_memory {
        r.write_queue_max_memory = v;
    }
    if let Some(v) = fields.max_memory_policy {
        r.write_queue_max_memory_policy = match v {
            MemoryPolicyArg::Page => QueueMaxMemoryPolicy::Page,
            MemoryPolicyArg::Drop => QueueMaxMemoryPolicy::Drop,
            MemoryPolicyArg::Block => QueueMaxMemoryPolicy::Block,
        };
    }
    if let Some(v) = fields.page_size {
        r.write_queue_page_size = v;
    }
    if let Some(v) = fields.page_count_cache {
        r.write_queue_page_count_cache = v;
    }
    if let Some(v) = fields.max_keywords {
        r.max_keywords = v;
    }
}

// ── Navigator steps ─────────────────────────────────────────────────

async fn open_for_edit(console: &Console, id: DocumentId) -> Result<Navigator, CliError> {
    let mut nav = Navigator::new(console.clone());
    nav.send(Event::ViewRepositories).await;
    nav.send(Event::Edit { document_id: id }).await;
    util::navigator_result(&mut nav)?;
    Ok(nav)
}

/// Save the navigator's pending edits and return the saved record.
async fn save(nav: &mut Navigator) -> Result<RepositoryInfo, CliError> {
    nav.send(Event::Save).await;
    util::navigator_result(nav)?;
    nav.repository()
        .record()
        .cloned()
        .ok_or_else(|| CliError::Internal("saved repository is no longer open".into()))
}

async fn change_status(
    console: &Console,
    identifier: &str,
    status: RepositoryStatus,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let id = util::resolve_repository(console, identifier)?;
    let mut nav = open_for_edit(console, id).await?;

    let allowed = match status {
        RepositoryStatus::Online => nav.repository().can_bring_online(),
        RepositoryStatus::ReadOnly => nav.repository().can_make_read_only(),
        RepositoryStatus::Offline => nav.repository().can_take_offline(),
    };
    if !allowed {
        output::notice(global, &format!("Repository '{identifier}' is already {status}"));
        return Ok(());
    }

    let spin = output::spinner(global, "Changing repository status");
    nav.send(Event::ChangeStatus { status }).await;
    spin.finish_and_clear();
    util::navigator_result(&mut nav)?;

    let current = nav
        .repository()
        .record()
        .and_then(|r| r.current_status);
    output::notice(
        global,
        &format!(
            "Repository '{identifier}' is now {}",
            output::paint_repository_status(current, output::should_color(&global.color))
        ),
    );
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(console: &Console, args: ReposArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ReposCommand::List => {
            let out = render_repository_list(console, global)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReposCommand::Show { repository } => {
            let id = util::resolve_repository(console, &repository)?;
            let record = console.repository_info().get(&id).ok_or_else(|| {
                CliError::NotFound {
                    resource_type: "repository".into(),
                    identifier: repository.clone(),
                    list_command: "repos list".into(),
                }
            })?;
            print_repository(&record, global)
        }

        ReposCommand::Create { name, fields } => {
            let mut nav = Navigator::new(console.clone());
            nav.send(Event::ViewRepositories).await;
            nav.send(Event::Create).await;
            nav.repository_mut().update(|r| {
                r.name = name;
                apply_fields(&fields, r);
            });
            let saved = save(&mut nav).await?;
            output::notice(global, &format!("Repository '{}' created", saved.name));
            print_repository(&saved, global)
        }

        ReposCommand::Update {
            repository,
            name,
            fields,
        } => {
            let id = util::resolve_repository(console, &repository)?;
            let mut nav = open_for_edit(console, id).await?;
            nav.repository_mut().update(|r| {
                if let Some(name) = name {
                    r.name = name;
                }
                apply_fields(&fields, r);
            });
            let saved = save(&mut nav).await?;
            output::notice(global, &format!("Repository '{}' updated", saved.name));
            print_repository(&saved, global)
        }

        ReposCommand::Delete { repository } => {
            let id = util::resolve_repository(console, &repository)?;
            let mut nav = open_for_edit(console, id.clone()).await?;
            if !nav.repository().can_remove() {
                let status = nav.repository().record().and_then(|r| r.current_status);
                return Err(CliError::Precondition {
                    message: format!(
                        "Repository '{repository}' must be offline before it can be deleted (currently {})",
                        status.map_or_else(|| "unknown".to_owned(), |s| s.to_string())
                    ),
                });
            }
            if !util::confirm(
                &format!("Delete repository '{repository}'? Its configuration will be removed."),
                global.yes,
            )? {
                return Ok(());
            }
            nav.send(Event::Erase { document_id: id }).await;
            util::navigator_result(&mut nav)?;
            output::notice(global, &format!("Repository '{repository}' deleted"));
            Ok(())
        }

        ReposCommand::Online { repository } => {
            change_status(console, &repository, RepositoryStatus::Online, global).await
        }
        ReposCommand::Readonly { repository } => {
            change_status(console, &repository, RepositoryStatus::ReadOnly, global).await
        }
        ReposCommand::Offline { repository } => {
            change_status(console, &repository, RepositoryStatus::Offline, global).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_leave_record_unchanged() {
        let mut r = RepositoryInfo::default();
        let before = r.clone();
        apply_fields(&RepositoryFields::default(), &mut r);
        assert_eq!(r, before);
    }

    #[test]
    fn set_fields_are_applied() {
        let mut r = RepositoryInfo::default();
        let fields = RepositoryFields {
            startup_status: Some(StartupStatusArg::Offline),
            max_memory_policy: Some(MemoryPolicyArg::Block),
            max_keywords: Some(-1),
            ..RepositoryFields::default()
        };
        apply_fields(&fields, &mut r);
        assert_eq!(r.startup_status, StartupStatus::Offline);
        assert_eq!(r.write_queue_max_memory_policy, QueueMaxMemoryPolicy::Block);
        assert!(r.has_unlimited_keywords());
    }
}
