use std::path::Path;

use {anyhow::Result, clap::Subcommand};

use picker_config::{
    Diagnostic, PickerConfig, Severity,
    validate::{self, ValidationResult},
};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors/warnings.
    Check {
        /// Also show informational diagnostics.
        #[arg(long)]
        verbose: bool,
    },
    /// Print the effective configuration (file, env overrides, defaults) as TOML.
    Show,
}

pub fn handle_config(
    action: ConfigAction,
    path: Option<&Path>,
    config: &PickerConfig,
) -> Result<()> {
    match action {
        ConfigAction::Check { verbose } => {
            let result = validate::validate(path);
            eprint!("{}", report(&result, verbose));
            if result.has_errors() {
                std::process::exit(1);
            }
            Ok(())
        },
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(config)?);
            Ok(())
        },
    }
}

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn diagnostic_line(d: &Diagnostic) -> String {
    let color = match d.severity {
        Severity::Error => RED,
        Severity::Warning => YELLOW,
        Severity::Info => CYAN,
    };
    let location = if d.path.is_empty() {
        String::new()
    } else {
        format!("{}: ", d.path)
    };
    format!("  {BOLD}{color}{}{RESET} {location}{}", d.severity, d.message)
}

/// Human-readable report for `config check`.
fn report(result: &ValidationResult, verbose: bool) -> String {
    let mut out = match &result.config_path {
        Some(path) => format!("Checking {}\n\n", path.display()),
        None => "No config file found; checking defaults.\n\n".to_string(),
    };

    let lines: Vec<String> = result
        .diagnostics
        .iter()
        .filter(|d| verbose || d.severity != Severity::Info)
        .map(diagnostic_line)
        .collect();
    if !lines.is_empty() {
        out.push_str(&lines.join("\n"));
        out.push_str("\n\n");
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);
    if errors + warnings == 0 {
        out.push_str("No issues found.\n");
    } else {
        out.push_str(&format!("{errors} error(s), {warnings} warning(s)\n"));
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn clean_config_reports_no_issues() {
        let result = validate::validate_toml_str("[inspector]\ntext_limit = 120\n");
        let text = report(&result, false);
        assert!(text.starts_with("No config file found"));
        assert!(text.ends_with("No issues found.\n"));
    }

    #[test]
    fn errors_are_listed_with_their_path() {
        let result = validate::validate_toml_str("[bus]\nmax_message_bytes = 0\n");
        let text = report(&result, false);
        assert!(text.contains("bus.max_message_bytes: must be greater than zero"));
        assert!(text.contains("1 error(s), 0 warning(s)"));
    }
}
