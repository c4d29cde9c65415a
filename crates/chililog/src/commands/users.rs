//! User account command handlers.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tabled::Tabled;

use chililog_core::{Console, DocumentId, Event, Navigator, User, UserStatus};

use crate::cli::{GlobalOpts, UserStatusArg, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Display Name")]
    display_name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Roles")]
    roles: String,
}

impl UserRow {
    fn new(u: &User, color: bool) -> Self {
        Self {
            username: u.username.clone(),
            display_name: util::or_dash(u.display_name.as_deref()),
            email: util::or_dash(u.email_address.as_deref()),
            status: output::paint_user_status(u.status, color),
            roles: u.roles.join(", "),
        }
    }
}

fn user_detail(u: &User, color: bool) -> String {
    output::detail_lines(&[
        ("ID", u.id.as_ref().map(ToString::to_string).unwrap_or_default()),
        ("Version", u.version.to_string()),
        ("Username", u.username.clone()),
        ("Display Name", u.display_name.clone().unwrap_or_default()),
        ("Email", u.email_address.clone().unwrap_or_default()),
        ("Status", output::paint_user_status(u.status, color)),
        ("Roles", u.roles.join(", ")),
    ])
}

fn print_user(u: &User, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        u,
        |u| user_detail(u, color),
        |u| u.username.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn user_status(arg: UserStatusArg) -> UserStatus {
    match arg {
        UserStatusArg::Enabled => UserStatus::Enabled,
        UserStatusArg::Disabled => UserStatus::Disabled,
        UserStatusArg::Locked => UserStatus::Locked,
    }
}

fn apply_role_changes(user: &mut User, add: &[String], remove: &[String]) {
    user.roles.retain(|r| !remove.contains(r));
    for role in add {
        if !user.has_role(role) {
            user.roles.push(role.clone());
        }
    }
}

/// Prompt for a new password twice.
fn prompt_new_password() -> Result<SecretString, CliError> {
    let password = util::prompt_password("New password: ")?;
    let confirm = util::prompt_password("Confirm password: ")?;
    if password.expose_secret() != confirm.expose_secret() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "passwords do not match".into(),
        });
    }
    Ok(password)
}

// ── Navigator steps ─────────────────────────────────────────────────

async fn open_for_edit(console: &Console, id: DocumentId) -> Result<Navigator, CliError> {
    let mut nav = Navigator::new(console.clone());
    nav.send(Event::ViewUsers).await;
    nav.send(Event::Edit { document_id: id }).await;
    util::navigator_result(&mut nav)?;
    Ok(nav)
}

async fn save(nav: &mut Navigator) -> Result<User, CliError> {
    nav.send(Event::Save).await;
    util::navigator_result(nav)?;
    nav.user()
        .record()
        .cloned()
        .ok_or_else(|| CliError::Internal("saved user is no longer open".into()))
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(console: &Console, args: UsersArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        UsersCommand::List { role } => {
            let color = output::should_color(&global.color);
            let mut users: Vec<Arc<User>> = console
                .users()
                .snapshot()
                .iter()
                .filter(|u| role.as_deref().is_none_or(|r| u.has_role(r)))
                .cloned()
                .collect();
            users.sort_by(|a, b| a.username.cmp(&b.username));
            let out = output::render_list(
                &global.output,
                &users,
                |u| UserRow::new(u, color),
                |u| u.username.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Show { user } => {
            let id = util::resolve_user(console, &user)?;
            let record = console.users().get(&id).ok_or_else(|| CliError::NotFound {
                resource_type: "user".into(),
                identifier: user.clone(),
                list_command: "users list".into(),
            })?;
            print_user(&record, global)
        }

        UsersCommand::Create {
            username,
            email,
            display_name,
            roles,
            status,
        } => {
            let password = prompt_new_password()?;
            let mut nav = Navigator::new(console.clone());
            nav.send(Event::ViewUsers).await;
            nav.send(Event::Create).await;
            nav.user_mut().update(|u| {
                u.username = username;
                u.email_address = email;
                u.display_name = display_name;
                u.roles = roles;
                u.status = user_status(status);
                u.password = Some(password);
            });
            let saved = save(&mut nav).await?;
            output::notice(global, &format!("User '{}' created", saved.username));
            print_user(&saved, global)
        }

        UsersCommand::Update {
            user,
            email,
            display_name,
            add_role,
            remove_role,
            status,
            reset_password,
        } => {
            let id = util::resolve_user(console, &user)?;
            let password = if reset_password {
                Some(prompt_new_password()?)
            } else {
                None
            };
            let mut nav = open_for_edit(console, id).await?;
            nav.user_mut().update(|u| {
                if let Some(email) = email {
                    u.email_address = Some(email);
                }
                if let Some(name) = display_name {
                    u.display_name = Some(name);
                }
                if let Some(status) = status {
                    u.status = user_status(status);
                }
                apply_role_changes(u, &add_role, &remove_role);
                if password.is_some() {
                    u.password = password;
                }
            });
            let saved = save(&mut nav).await?;
            output::notice(global, &format!("User '{}' updated", saved.username));
            print_user(&saved, global)
        }

        UsersCommand::Delete { user } => {
            let id = util::resolve_user(console, &user)?;
            if !util::confirm(&format!("Delete user '{user}'?"), global.yes)? {
                return Ok(());
            }
            let mut nav = open_for_edit(console, id.clone()).await?;
            nav.send(Event::Erase { document_id: id }).await;
            util::navigator_result(&mut nav)?;
            output::notice(global, &format!("User '{user}' deleted"));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_changes_remove_then_add_without_duplicates() {
        let mut u = User::default();
        u.roles = vec!["repo.a.workbench".into(), "repo.b.workbench".into()];
        apply_role_changes(
            &mut u,
            &["repo.a.workbench".into(), "repo.c.administrator".into()],
            &["repo.b.workbench".into()],
        );
        assert_eq!(u.roles, vec!["repo.a.workbench", "repo.c.administrator"]);
    }
}
