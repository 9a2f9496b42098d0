use anyhow::Result;
use clinigate::cli::{actions, actions::Action, start};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let (globals, action) = start()?;

    let ctx = actions::AppContext::new(&globals)?;

    // Handle the action
    let result = match action {
        Action::Login { .. } => actions::login::handle(action, &ctx).await,
        action => actions::session::handle(action, &ctx).await,
    };

    // Surface any queued notices (session expiry, access denied, ...)
    for notice in ctx.notices.active() {
        eprintln!("{}", notice.message);
    }

    result
}
