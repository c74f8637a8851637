use std::io::{self, IsTerminal};

use anyhow::anyhow;
use marquee_api_models::AdminUser;
use marquee_client::{LoginForm, RegisterForm, has_admin, login, logout, register};
use serde_json::json;

use crate::cli::{LoginArgs, OutputFormat, RegisterArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_json;

pub(crate) async fn handle_login(ctx: &AppContext, args: LoginArgs) -> CliResult<()> {
    let password = resolve_password(args.password)?;
    let form = LoginForm {
        email: args.email,
        password,
    };
    let user = login(&ctx.client, &form).await?;
    println!("Logged in as {}", display_name(&user, &form.email));
    if ctx.client.session().token().is_none() {
        println!("note: the server issued no token in the response body");
    }
    Ok(())
}

pub(crate) async fn handle_register(ctx: &AppContext, args: RegisterArgs) -> CliResult<()> {
    let password = resolve_password(args.password)?;
    let form = RegisterForm {
        name: args.name,
        email: args.email,
        password,
        as_admin: args.admin,
    };
    let user = register(&ctx.client, &form).await?;
    let role = if user.is_admin { "administrator" } else { "user" };
    println!(
        "Registered {} as {role}",
        display_name(&user, &form.email)
    );
    Ok(())
}

pub(crate) fn handle_logout(ctx: &AppContext) -> CliResult<()> {
    logout(&ctx.client)?;
    println!("Logged out");
    Ok(())
}

pub(crate) async fn handle_has_admin(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    let present = has_admin(&ctx.client).await?;
    match format {
        OutputFormat::Json => render_json(&json!({ "hasAdmin": present })),
        OutputFormat::Table => {
            println!("admin account: {}", if present { "present" } else { "missing" });
            Ok(())
        }
    }
}

fn display_name<'a>(user: &'a AdminUser, fallback: &'a str) -> &'a str {
    user.name
        .as_deref()
        .or(user.email.as_deref())
        .unwrap_or(fallback)
}

/// Use the supplied password, or prompt for one on an interactive terminal.
fn resolve_password(supplied: Option<String>) -> CliResult<String> {
    if let Some(password) = supplied {
        return Ok(password);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::validation(
            "password is required (pass --password or set MARQUEE_PASSWORD)",
        ));
    }
    rpassword::prompt_password("Password: ")
        .map_err(|err| CliError::failure(anyhow!("failed to read password: {err}")))
}
