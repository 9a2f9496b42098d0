use crate::cli::actions::Action;
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    // Closure to return subcommand matches
    let sub_m = |subcommand| -> Result<&clap::ArgMatches> {
        matches
            .subcommand_matches(subcommand)
            .context("arguments not found")
    };

    match matches.subcommand_name() {
        Some("login") => {
            let matches = sub_m("login")?;
            Ok(Action::Login {
                login: matches
                    .get_one::<String>("login")
                    .map(String::to_string)
                    .ok_or_else(|| anyhow!("missing required argument: --login"))?,
                password: matches
                    .get_one::<String>("password")
                    .map(|s| SecretString::from(s.to_string()))
                    .ok_or_else(|| anyhow!("missing required argument: --password"))?,
                remember: matches.get_one::<bool>("remember").copied().unwrap_or(true),
                code: matches.get_one::<String>("code").map(String::to_string),
            })
        }
        Some("whoami") => Ok(Action::Whoami),
        Some("menus") => Ok(Action::Menus),
        Some("can") => {
            let matches = sub_m("can")?;
            Ok(Action::Can {
                module: matches
                    .get_one::<String>("module")
                    .map(String::to_string)
                    .ok_or_else(|| anyhow!("missing required argument: module"))?,
                action: matches
                    .get_one::<String>("action")
                    .map(String::to_string)
                    .ok_or_else(|| anyhow!("missing required argument: action"))?,
            })
        }
        Some("logout") => Ok(Action::Logout),
        _ => Err(anyhow!("no command provided")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn dispatches_login() {
        let matches = commands::new().get_matches_from(vec![
            "clinigate",
            "--api-url",
            "https://api.hospital.tld",
            "login",
            "--login",
            "alice",
            "--password",
            "s3cret",
        ]);

        let action = handler(&matches).expect("action");
        match action {
            Action::Login {
                login,
                remember,
                code,
                ..
            } => {
                assert_eq!(login, "alice");
                assert!(remember);
                assert_eq!(code, None);
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn dispatches_can_with_pair() {
        let matches = commands::new().get_matches_from(vec![
            "clinigate",
            "--api-url",
            "https://api.hospital.tld",
            "can",
            "patients",
            "create",
        ]);

        let action = handler(&matches).expect("action");
        assert!(matches!(
            action,
            Action::Can { ref module, ref action } if module == "patients" && action == "create"
        ));
    }
}
