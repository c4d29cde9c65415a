//! Handlers for the logged-in user's own profile.

use chililog_core::{AuthenticatedUser, Console, CoreError};

use crate::cli::{GlobalOpts, ProfileArgs, ProfileCommand};
use crate::error::CliError;
use crate::output;

use super::util;

fn profile_detail(u: &AuthenticatedUser) -> String {
    output::detail_lines(&[
        ("Username", u.username.clone()),
        ("Display Name", u.display_name.clone().unwrap_or_default()),
        ("Email", u.email_address.clone().unwrap_or_default()),
        ("Roles", u.roles.join(", ")),
        ("Gravatar", u.gravatar_url().unwrap_or_default()),
    ])
}

fn print_profile(u: &AuthenticatedUser, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(&global.output, u, profile_detail, |u| u.username.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle(console: &Console, args: ProfileArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = console.session();
    match args.command {
        ProfileCommand::Show => {
            let user = session
                .authenticated_user()
                .ok_or(CoreError::NotAuthenticated)?;
            print_profile(&user, global)
        }

        ProfileCommand::Update {
            display_name,
            email,
        } => {
            if display_name.is_none() && email.is_none() {
                output::notice(global, "Nothing to update");
                return Ok(());
            }
            let mut profile = session.edit_profile().ok_or(CoreError::NotAuthenticated)?;
            profile.update(|p| {
                if let Some(name) = display_name {
                    p.display_name = Some(name);
                }
                if let Some(email) = email {
                    p.email_address = Some(email);
                }
            });
            let result = console.save_profile(&profile).await;
            session.discard_profile_changes(profile);
            let saved = result?;
            output::notice(global, "Profile updated");
            print_profile(&saved, global)
        }

        ProfileCommand::Password => {
            let old = util::prompt_password("Current password: ")?;
            let new = util::prompt_password("New password: ")?;
            let confirm = util::prompt_password("Confirm new password: ")?;
            let spin = output::spinner(global, "Changing password");
            let result = session.change_password(&old, &new, &confirm).await;
            spin.finish_and_clear();
            result?;
            output::notice(global, "Password changed");
            Ok(())
        }
    }
}
