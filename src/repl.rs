use anyhow::Result;
use insights_analytics::{Insights, ReportGenerator};
use insights_core::source::ConversationSource;
use insights_core::store::{ConversationStore, LoadOutcome};
use insights_core::types::{CallStatus, CallType};
use rustyline::error::ReadlineError;
use rustyline::{Config as RlConfig, DefaultEditor};
use std::str::FromStr;

const BANNER: &str = r#"
  ╔═══════════════════════════════════════════╗
  ║          call-insights                    ║
  ║   Voice-agent conversation analytics      ║
  ╚═══════════════════════════════════════════╝
"#;

const HELP: &str = r#"
  Filters (`*` clears a field, `-` leaves a bound open):
    agent <name|*>              — Restrict to one agent
    type <inbound|outbound|*>   — Restrict to one call type
    status <status|*>           — busy, success, transfer, no_answer, dropped
    date <start|-> <end|->      — Inclusive start-time bounds
    duration <min|-> <max|->    — Inclusive duration bounds (seconds)
    cost <min|-> <max|->        — Inclusive cost bounds
    clear                       — Clear all filters
  Views:
    show                        — Full dashboard report
    kpis                        — Key metrics only
    list [n]                    — First n filtered conversations (default 10)
    agents                      — Known agents and filter placeholders
  Other:
    reload                      — Fetch conversations again
    help                        — Show this help
    exit                        — Quit
"#;

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Agent(Option<String>),
    CallType(Option<CallType>),
    Status(Option<CallStatus>),
    DateRange(Option<i64>, Option<i64>),
    DurationRange(Option<f64>, Option<f64>),
    CostRange(Option<f64>, Option<f64>),
    Clear,
    Show,
    Kpis,
    List(usize),
    Agents,
    Reload,
    Help,
    Exit,
}

/// Parse a shell line. Never mutates anything; errors are user-facing messages.
pub fn parse_command(line: &str) -> std::result::Result<ShellCommand, String> {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return Err("empty command".into());
    };
    let args: Vec<&str> = parts.collect();

    match cmd {
        "agent" => {
            let value = single_arg(cmd, &args)?;
            Ok(ShellCommand::Agent(if value == "*" {
                None
            } else {
                Some(value.to_string())
            }))
        }
        "type" => Ok(ShellCommand::CallType(parse_choice(single_arg(cmd, &args)?)?)),
        "status" => Ok(ShellCommand::Status(parse_choice(single_arg(cmd, &args)?)?)),
        "date" => {
            let (start, end) = pair_args(cmd, &args)?;
            Ok(ShellCommand::DateRange(parse_bound(start)?, parse_bound(end)?))
        }
        "duration" => {
            let (min, max) = pair_args(cmd, &args)?;
            Ok(ShellCommand::DurationRange(parse_bound(min)?, parse_bound(max)?))
        }
        "cost" => {
            let (min, max) = pair_args(cmd, &args)?;
            Ok(ShellCommand::CostRange(parse_bound(min)?, parse_bound(max)?))
        }
        "clear" => Ok(ShellCommand::Clear),
        "show" => Ok(ShellCommand::Show),
        "kpis" => Ok(ShellCommand::Kpis),
        "list" => match args.as_slice() {
            [] => Ok(ShellCommand::List(10)),
            [n] => n
                .parse()
                .map(ShellCommand::List)
                .map_err(|_| format!("list: '{}' is not a count", n)),
            _ => Err("usage: list [n]".into()),
        },
        "agents" => Ok(ShellCommand::Agents),
        "reload" => Ok(ShellCommand::Reload),
        "help" | "?" => Ok(ShellCommand::Help),
        "exit" | "quit" => Ok(ShellCommand::Exit),
        other => Err(format!("unknown command '{}' (type 'help')", other)),
    }
}

fn single_arg<'a>(cmd: &str, args: &[&'a str]) -> std::result::Result<&'a str, String> {
    match args {
        [value] => Ok(*value),
        _ => Err(format!("usage: {} <value|*>", cmd)),
    }
}

fn pair_args<'a>(cmd: &str, args: &[&'a str]) -> std::result::Result<(&'a str, &'a str), String> {
    match args {
        [a, b] => Ok((*a, *b)),
        _ => Err(format!("usage: {} <min|-> <max|->", cmd)),
    }
}

fn parse_choice<T>(value: &str) -> std::result::Result<Option<T>, String>
where
    T: FromStr<Err = String>,
{
    if value == "*" {
        Ok(None)
    } else {
        value.parse().map(Some)
    }
}

fn parse_bound<T: FromStr>(value: &str) -> std::result::Result<Option<T>, String> {
    if value == "-" {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| format!("'{}' is not a number", value))
}

/// Run the interactive filter shell.
pub async fn run(source: Box<dyn ConversationSource>) -> Result<()> {
    println!("{}", BANNER);
    println!("  Source: {}", source.describe());
    println!("  Type 'help' for commands.\n");

    let mut store = ConversationStore::new();
    if let LoadOutcome::Failed = store.load(source.as_ref()).await {
        println!("  Failed to load conversations; 'reload' to retry.\n");
    }
    print_view_line(&store);

    let rl_config = RlConfig::builder().auto_add_history(true).build();
    let mut rl = DefaultEditor::with_config(rl_config)?;

    loop {
        let line = match rl.readline("insights> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                tracing::error!("Readline error: {}", e);
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command = match parse_command(line) {
            Ok(command) => command,
            Err(e) => {
                println!("  {}", e);
                continue;
            }
        };

        match command {
            ShellCommand::Agent(agent) => store.set_agent(agent),
            ShellCommand::CallType(call_type) => store.set_call_type(call_type),
            ShellCommand::Status(status) => store.set_status(status),
            ShellCommand::DateRange(start, end) => store.set_date_range(start, end),
            ShellCommand::DurationRange(min, max) => store.set_duration_range(min, max),
            ShellCommand::CostRange(min, max) => store.set_cost_range(min, max),
            ShellCommand::Clear => store.clear_filters(),
            ShellCommand::Show => {
                println!("{}", ReportGenerator::dashboard_report(&Insights::from_store(&store)));
                continue;
            }
            ShellCommand::Kpis => {
                println!("{}", ReportGenerator::kpi_summary(&Insights::from_store(&store)));
                continue;
            }
            ShellCommand::List(n) => {
                print_list(&store, n);
                continue;
            }
            ShellCommand::Agents => {
                print_agents(&store);
                continue;
            }
            ShellCommand::Reload => {
                if let LoadOutcome::Failed = store.load(source.as_ref()).await {
                    println!("  Reload failed; keeping the previous conversations.");
                }
            }
            ShellCommand::Help => {
                println!("{}", HELP);
                continue;
            }
            ShellCommand::Exit => break,
        }

        print_view_line(&store);
    }

    println!("Goodbye!");
    Ok(())
}

fn print_view_line(store: &ConversationStore) {
    let insights = Insights::from_store(store);
    println!(
        "  Showing {} of {} conversations | success {:.1}% | avg {}s | ${:.2}",
        insights.total_calls(),
        insights.conversations().len(),
        insights.success_rate(),
        insights.average_call_duration().round(),
        insights.total_cost(),
    );
}

fn print_list(store: &ConversationStore, n: usize) {
    let filtered = store.filtered_conversations();
    if filtered.is_empty() {
        println!("  No conversations match the current filters.");
        return;
    }
    for conv in filtered.iter().take(n) {
        println!(
            "  {:<12} {:<12} {:<8} {:<9} {:>7.1}s  ${:.2}",
            conv.id,
            conv.agent,
            conv.call_type(),
            conv.status,
            conv.duration,
            conv.cost
        );
    }
    if filtered.len() > n {
        println!("  … {} more", filtered.len() - n);
    }
}

fn print_agents(store: &ConversationStore) {
    let insights = Insights::from_store(store);
    let agents = insights.unique_agents();
    if agents.is_empty() {
        println!("  No agents loaded.");
    } else {
        println!("  Agents: {}", agents.join(", "));
    }
    println!(
        "  Duration range: {}..{}s | Cost range: ${:.2}..${:.2}",
        insights.min_duration(),
        insights.max_duration(),
        insights.min_cost(),
        insights.max_cost()
    );
}
