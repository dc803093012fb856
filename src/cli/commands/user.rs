use crate::cli::parser::UserCommand;
use crate::config::Config;
use crate::db::{Gateway, SqliteGateway};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use std::io::{self, BufRead, Write};

pub fn handle(action: &UserCommand, cfg: &Config) -> AppResult<()> {
    match action {
        UserCommand::Add { username, password } => {
            let password = match password {
                Some(p) => p.clone(),
                None => read_password()?,
            };

            let gateway =
                SqliteGateway::open(&cfg.database, cfg.defaults, &cfg.legacy_user, cfg.tz()?)?;
            gateway.add_user(username, &password)?;
            gateway.audit("user_add", username, "User created");

            success(format!("User '{}' created", username));
            Ok(())
        }
    }
}

/// First line of stdin, without the line terminator.
fn read_password() -> AppResult<String> {
    print!("Password: ");
    io::stdout().flush().ok();

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(AppError::InvalidPassword("must not be empty".to_string()));
    }
    Ok(password)
}
