use crate::cli::actions::{Action, AppContext};
use crate::session::guard::{self, Route};
use crate::session::menu::{map_api_menus, MenuItem};
use anyhow::{bail, Result};
use tracing::warn;

/// Handle the session actions (whoami, menus, can, logout).
pub async fn handle(action: Action, ctx: &AppContext) -> Result<()> {
    match action {
        Action::Whoami => whoami(ctx).await,
        Action::Menus => menus(ctx).await,
        Action::Can { module, action } => can(ctx, &module, &action),
        Action::Logout => logout(ctx),
        Action::Login { .. } => bail!("expected a session action"),
    }
}

async fn whoami(ctx: &AppContext) -> Result<()> {
    ensure_session(ctx, "/whoami")?;

    match ctx.client.fetch_me().await {
        Ok(me) => ctx.session.apply_refresh(&me, None),
        Err(err) => warn!("session refresh failed, using cached user: {err}"),
    }

    match ctx.session.current_user() {
        Some(user) => println!("{}", serde_json::to_string_pretty(&user)?),
        None => bail!("no user information available"),
    }

    Ok(())
}

async fn menus(ctx: &AppContext) -> Result<()> {
    ensure_session(ctx, "/menus")?;

    match ctx.client.fetch_me().await {
        Ok(me) => ctx.session.apply_refresh(&me, None),
        Err(err) => {
            warn!("session refresh failed, falling back to menu endpoint: {err}");
            if let Ok(raw) = ctx.client.load_menus().await {
                ctx.session.set_menus(map_api_menus(&raw["menus"]));
            }
        }
    }

    for item in ctx.session.menus() {
        print_menu(&item, 0);
    }

    Ok(())
}

fn print_menu(item: &MenuItem, depth: usize) {
    let indent = "  ".repeat(depth);
    match &item.path {
        Some(path) => println!("{indent}{} [{}] -> {}", item.label, item.icon, path),
        None => println!("{indent}{} [{}]", item.label, item.icon),
    }
    for child in &item.children {
        print_menu(child, depth + 1);
    }
}

fn can(ctx: &AppContext, module: &str, action: &str) -> Result<()> {
    if ctx.session.can(module, action) {
        println!("allowed: {module}/{action}");
    } else {
        println!("denied: {module}/{action}");
    }
    Ok(())
}

fn logout(ctx: &AppContext) -> Result<()> {
    ctx.session.logout();
    ctx.navigator.navigate(Route::Login { expired: false });
    println!("Signed out.");
    Ok(())
}

fn ensure_session(ctx: &AppContext, path: &str) -> Result<()> {
    let target = Route::Protected(path.to_string());
    if !guard::can_activate(&ctx.session, &ctx.navigator, &target) {
        bail!("not authenticated, run `clinigate login` first");
    }
    Ok(())
}
