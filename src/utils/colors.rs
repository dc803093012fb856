//! Colors for terminal output of the CLI commands.

use ansi_term::Colour;

/// Audit log operation → color.
pub fn color_for_operation(op: &str) -> Colour {
    match op {
        "start" | "break_end" => Colour::Green,
        "stop" => Colour::Red,
        "break_start" => Colour::Yellow,
        "settings" | "export" => Colour::Cyan,
        "user_add" | "login" => Colour::Blue,
        "backup" => Colour::Blue,
        "migration_applied" | "legacy_import" => Colour::Purple,
        "init" => Colour::RGB(255, 153, 51),
        _ => Colour::White,
    }
}

/// Remove ANSI escape sequences, for width computations.
pub fn strip_ansi(s: &str) -> String {
    match regex::Regex::new(r"\x1B\[[0-9;]*[mK]") {
        Ok(re) => re.replace_all(s, "").into_owned(),
        Err(_) => s.to_string(),
    }
}
