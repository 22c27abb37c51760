//! `lec user`: list and manage the accounts stored alongside the hierarchy.
//!
//! Listing is open to anyone. Adding, updating, and removing users require an
//! acting admin (see [`crate::identity`]).

use crate::cmd::{Actor, identity_failure, short_id, store_failure};
use crate::identity;
use crate::output::{CliError, OutputMode, fail, pretty_rule, render, render_mode};
use crate::project::Project;
use crate::validate;
use clap::{Args, Subcommand};
use lectern_core::model::{NewUser, Role, User, UserPatch};
use std::io::{self, Write};
use std::path::Path;

#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// List all users.
    List,

    #[command(
        about = "Add a user (admin only)",
        after_help = "EXAMPLES:\n    lec --as admin@example.com user add --name \"Ada\" --email ada@example.com\n\n    # Grant admin rights up front\n    lec --as admin@example.com user add --name Bo --email bo@example.com --role admin"
    )]
    Add(UserAddArgs),

    /// Change a user's fields (admin only).
    Update(UserUpdateArgs),

    /// Remove a user (admin only; you cannot remove yourself).
    Remove {
        /// User id or email.
        user: String,
    },
}

#[derive(Args, Debug)]
pub struct UserAddArgs {
    #[arg(short, long)]
    pub name: String,

    #[arg(short, long)]
    pub email: String,

    #[arg(short, long, default_value_t = Role::Author)]
    pub role: Role,
}

#[derive(Args, Debug)]
pub struct UserUpdateArgs {
    /// User id or email.
    pub user: String,

    #[arg(short, long)]
    pub name: Option<String>,

    #[arg(short, long)]
    pub email: Option<String>,

    #[arg(short, long)]
    pub role: Option<Role>,

    /// Avatar URL. An empty string clears it.
    #[arg(long)]
    pub avatar: Option<String>,
}

impl UserUpdateArgs {
    fn to_patch(&self) -> UserPatch {
        UserPatch {
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            avatar: self.avatar.clone(),
        }
    }
}

fn write_user_row(w: &mut dyn Write, user: &User) -> io::Result<()> {
    writeln!(w, "{}\t{}\t{}\t{}", user.id, user.role, user.email, user.name)
}

pub fn run_user(
    args: &UserArgs,
    actor: Actor<'_>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    match &args.command {
        UserCommand::List => run_user_list(output, project_root),
        UserCommand::Add(add) => run_user_add(add, actor, output, project_root),
        UserCommand::Update(update) => run_user_update(update, actor, output, project_root),
        UserCommand::Remove { user } => run_user_remove(user, actor, output, project_root),
    }
}

fn run_user_list(output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = Project::discover(project_root, output)?;
    let store = project.open_store();
    let users = store.users().to_vec();

    render_mode(
        output,
        &users,
        |users, w| {
            for user in users {
                write_user_row(w, user)?;
            }
            Ok(())
        },
        |users, w| {
            writeln!(w, "{:<8}  {:<6}  {:<28}  NAME", "ID", "ROLE", "EMAIL")?;
            pretty_rule(w)?;
            for user in users {
                writeln!(
                    w,
                    "{:<8}  {:<6}  {:<28}  {}",
                    short_id(&user.id),
                    user.role,
                    user.email,
                    user.name
                )?;
            }
            Ok(())
        },
    )
}

fn run_user_add(
    args: &UserAddArgs,
    actor: Actor<'_>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    if let Err(e) = validate::validate_name(&args.name) {
        return Err(fail(output, &e.to_cli_error()));
    }
    if let Err(e) = validate::validate_email(&args.email) {
        return Err(fail(output, &e.to_cli_error()));
    }

    let project = Project::discover(project_root, output)?;
    let _lock = project.lock(output)?;
    let mut store = project.open_store();
    let admin = identity::require_admin(&store, actor.flag, actor.config_user)
        .map_err(|err| identity_failure(output, &err))?;

    if store.user_by_email(&args.email).is_some() {
        return Err(duplicate_email(output, &args.email));
    }

    let user = store
        .add_user(NewUser {
            name: args.name.clone(),
            email: args.email.clone(),
            role: args.role,
        })
        .map_err(|err| store_failure(output, &err))?;
    tracing::info!(by = %admin.email, id = %user.id, "user added");

    render_mode(
        output,
        &user,
        |user, w| write_user_row(w, user),
        |user, w| writeln!(w, "✓ Added {} <{}> as {}", user.name, user.email, user.role),
    )
}

fn duplicate_email(output: OutputMode, email: &str) -> anyhow::Error {
    fail(
        output,
        &CliError::with_details(
            format!("a user with email '{email}' already exists"),
            "Use `lec user update` to change the existing account",
            "duplicate_email",
        ),
    )
}

fn run_user_update(
    args: &UserUpdateArgs,
    actor: Actor<'_>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    if let Some(email) = &args.email
        && let Err(e) = validate::validate_email(email)
    {
        return Err(fail(output, &e.to_cli_error()));
    }
    if let Some(name) = &args.name
        && let Err(e) = validate::validate_name(name)
    {
        return Err(fail(output, &e.to_cli_error()));
    }

    let project = Project::discover(project_root, output)?;
    let _lock = project.lock(output)?;
    let mut store = project.open_store();
    identity::require_admin(&store, actor.flag, actor.config_user)
        .map_err(|err| identity_failure(output, &err))?;

    let target_id = resolve_user_id(&store, &args.user, output)?;
    if let Some(email) = &args.email
        && store
            .user_by_email(email)
            .is_some_and(|other| other.id != target_id)
    {
        return Err(duplicate_email(output, email));
    }
    let user = store
        .update_user(&target_id, args.to_patch())
        .map_err(|err| store_failure(output, &err))?;

    render(output, &user, |user, w| {
        writeln!(w, "✓ Updated {} <{}>", user.name, user.email)
    })
}

fn run_user_remove(
    ident: &str,
    actor: Actor<'_>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let project = Project::discover(project_root, output)?;
    let _lock = project.lock(output)?;
    let mut store = project.open_store();
    let admin = identity::require_admin(&store, actor.flag, actor.config_user)
        .map_err(|err| identity_failure(output, &err))?;

    let target_id = resolve_user_id(&store, ident, output)?;
    if target_id == admin.id {
        return Err(fail(
            output,
            &CliError::with_details(
                "you cannot remove your own account",
                "Ask another admin to remove it",
                "self_removal",
            ),
        ));
    }

    let removed = store
        .remove_user(&target_id)
        .map_err(|err| store_failure(output, &err))?;
    tracing::info!(by = %admin.email, id = %removed.id, "user removed");

    render(output, &removed, |user, w| {
        writeln!(w, "✓ Removed {} <{}>", user.name, user.email)
    })
}

/// Map an id-or-email to the stored id.
fn resolve_user_id(
    store: &lectern_core::Store,
    ident: &str,
    output: OutputMode,
) -> anyhow::Result<String> {
    store.find_user(ident).map(|u| u.id.clone()).ok_or_else(|| {
        store_failure(
            output,
            &lectern_core::StoreError::UserNotFound(ident.to_string()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(subcommand)]
        command: UserCommand,
    }

    #[test]
    fn add_defaults_to_author() {
        let w = Wrapper::parse_from(["test", "add", "--name", "Ada", "--email", "ada@x.io"]);
        let UserCommand::Add(add) = w.command else {
            panic!("expected add");
        };
        assert_eq!(add.role, Role::Author);
    }

    #[test]
    fn update_patch_only_carries_given_fields() {
        let w = Wrapper::parse_from(["test", "update", "1", "--role", "admin"]);
        let UserCommand::Update(update) = w.command else {
            panic!("expected update");
        };
        let patch = update.to_patch();
        assert_eq!(patch.role, Some(Role::Admin));
        assert!(patch.name.is_none());
        assert!(patch.email.is_none());
    }

    #[test]
    fn remove_takes_identifier() {
        let w = Wrapper::parse_from(["test", "remove", "demo@example.com"]);
        assert!(matches!(w.command, UserCommand::Remove { ref user } if user == "demo@example.com"));
    }
}
