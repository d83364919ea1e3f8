use colored::Colorize;
use rust_decimal::Decimal;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use repay_core::form::{Field, LoanForm};
use repay_core::formatting::format_currency;

use super::Context;

const HELP: &str = "\
commands:
  amount|rate|months <text>   type into a field (lenient: 42,000,000원 is fine)
  slide <field> <value>       move a field's slider
  focus <field> / blur        edit a field / leave it
  show                        print the current state
  help                        this text
  quit                        leave";

#[derive(Debug, PartialEq)]
enum Command {
    Type(Field, String),
    Slide(Field, Decimal),
    Focus(Field),
    Blur,
    Show,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (line, ""),
    };
    let field = |name: &str| Field::from_str(name).map_err(|e| e.to_string());

    let command = match head.to_lowercase().as_str() {
        "quit" | "exit" | "q" => Command::Quit,
        "help" | "?" => Command::Help,
        "show" => Command::Show,
        "blur" => Command::Blur,
        "focus" => Command::Focus(field(rest)?),
        "slide" => {
            let (name, value) = rest
                .split_once(char::is_whitespace)
                .ok_or("usage: slide <field> <value>")?;
            let value = Decimal::from_str(value.trim())
                .map_err(|e| format!("invalid slider value '{}': {e}", value.trim()))?;
            Command::Slide(field(name)?, value)
        }
        other => Command::Type(field(other)?, rest.to_string()),
    };
    Ok(Some(command))
}

/// Current fields and results as printable lines.
fn render_state(form: &mut LoanForm) -> String {
    let result = form.result();
    let policy = form.policy().clone();
    let mark = |field: Field| if form.focused() == Some(field) { "*" } else { " " };

    let fields = format!(
        "{}amount [{}]  {}rate [{}]%  {}months [{}]",
        mark(Field::Amount),
        form.display_text(Field::Amount),
        mark(Field::Rate),
        form.display_text(Field::Rate),
        mark(Field::Months),
        form.display_text(Field::Months),
    );
    format!(
        "{fields}\n  monthly payment  {}\n  total payment    {}\n  total interest   {}",
        format_currency(result.monthly_payment, &policy),
        format_currency(result.total_payment, &policy),
        format_currency(result.total_interest, &policy),
    )
}

/// Apply a command; true when the state should be printed again.
fn apply(form: &mut LoanForm, command: Command) -> bool {
    match command {
        Command::Type(field, text) => {
            form.set_text(field, &text);
            true
        }
        Command::Slide(field, value) => {
            form.set_slider(field, value);
            true
        }
        Command::Focus(field) => {
            form.focus(field);
            true
        }
        Command::Blur => {
            form.blur();
            true
        }
        Command::Show => true,
        Command::Help | Command::Quit => false,
    }
}

pub fn run_interactive(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let mut form = LoanForm::new(
        ctx.config.defaults.clone(),
        ctx.config.sliders,
        ctx.policy.clone(),
    );
    let stdin = io::stdin();
    let mut out = io::stdout().lock();

    writeln!(out, "{}", render_state(&mut form))?;
    write!(out, "> ")?;
    out.flush()?;

    for line in stdin.lock().lines() {
        match parse_command(&line?) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(Command::Help)) => writeln!(out, "{HELP}")?,
            Ok(Some(command)) => {
                if apply(&mut form, command) {
                    writeln!(out, "{}", render_state(&mut form))?;
                }
            }
            Ok(None) => {}
            Err(msg) => writeln!(out, "{}: {}", "error".red().bold(), msg)?,
        }
        write!(out, "> ")?;
        out.flush()?;
    }

    let (hits, misses) = form.cache_stats();
    tracing::debug!(hits, misses, "interactive session finished");
    Ok(())
}
