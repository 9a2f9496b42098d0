use crate::cli::actions::{Action, AppContext};
use crate::session::guard::Route;
use crate::session::LoginOutcome;
use anyhow::{anyhow, bail, Result};
use tracing::debug;

/// Handle the login action: primary credential exchange, optional second
/// factor, then navigate to the dashboard. The session refresh behind
/// `handle_login_success` is allowed to fail without unwinding the login.
pub async fn handle(action: Action, ctx: &AppContext) -> Result<()> {
    let Action::Login {
        login,
        password,
        remember,
        code,
    } = action
    else {
        bail!("expected the login action");
    };

    let response = ctx.client.login(&login, &password).await?;
    let outcome = ctx
        .session
        .handle_login_success(&ctx.client, &response, remember)
        .await?;

    let outcome = match outcome {
        LoginOutcome::TwoFactorRequired { user_id } => {
            debug!("second factor required for user {user_id}");
            let code = code.ok_or_else(|| {
                anyhow!("two-factor authentication required, retry with --code <6-digit code>")
            })?;
            let response = ctx.client.verify_2fa(user_id, &code).await?;
            ctx.session
                .handle_login_success(&ctx.client, &response, remember)
                .await?
        }
        outcome => outcome,
    };

    if let LoginOutcome::TwoFactorRequired { .. } = outcome {
        bail!("server requested a second factor again; verification did not complete");
    }

    ctx.navigator.navigate(Route::Dashboard);

    match ctx.session.current_user() {
        Some(user) => println!("Signed in as {} ({})", user.login, user.roles.join(", ")),
        None => println!("Signed in"),
    }

    Ok(())
}
