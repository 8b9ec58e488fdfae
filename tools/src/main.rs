//! colony-runner: headless runner for the colony simulation.
//!
//! Usage:
//!   colony-runner --seed 12345 --months 24
//!   colony-runner --seed 12345 --data-dir ./data --ipc-mode
//!
//! In IPC mode the runner reads one JSON request per line on stdin and
//! answers each with one JSON line on stdout.

use anyhow::Result;
use colony_core::{
    command::{CommandResult, PlayerCommand},
    config::SimConfig,
    engine::SimEngine,
    event::MonthlyEvent,
    ledger::ResourceKind,
    snapshot::SimSnapshot,
    store::HistoryQuery,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcRequest {
    GetState,
    /// Play `count` months, auto-answering choices.
    Advance {
        count: u32,
    },
    Command {
        command: PlayerCommand,
    },
    /// Filtered history, newest month first. An empty query returns everything.
    History {
        #[serde(default)]
        query: HistoryQuery,
    },
    /// The latest month-end report.
    Report,
    Quit,
}

#[derive(serde::Serialize)]
struct IpcReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    result:  Option<CommandResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    history: Option<Vec<MonthlyEvent>>,
    state:   SimSnapshot,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let months = parse_arg(&args, "--months", 12u32);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str());

    let config = match data_dir {
        Some(dir) => SimConfig::load(dir)?,
        None => SimConfig::standard()?,
    };

    if !ipc_mode {
        println!("colony-runner");
        println!("  seed:      {seed}");
        println!("  months:    {months}");
        println!("  data_dir:  {}", data_dir.unwrap_or("(embedded)"));
        println!();
    }

    let run_id = format!("run-{seed}-{}", chrono::Utc::now().format("%Y%m%dT%H%M%S"));
    let mut engine = SimEngine::build(run_id, seed, config)?;

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else {
        let played = engine.run_months(months)?;
        print_summary(&engine, played)?;
    }

    Ok(())
}

fn run_ipc_loop(engine: &mut SimEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let request: IpcRequest = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        let (result, history) = match request {
            IpcRequest::Quit => break,
            IpcRequest::GetState => (None, None),
            IpcRequest::Advance { count } => {
                if let Err(e) = engine.run_months(count) {
                    write_error(&mut stdout, &e.to_string())?;
                    continue;
                }
                (None, None)
            }
            IpcRequest::Command { command } => match engine.apply(command) {
                Ok(result) => (Some(result), None),
                Err(e) => {
                    log::warn!("command rejected: {e}");
                    write_error(&mut stdout, &e.to_string())?;
                    continue;
                }
            },
            IpcRequest::History { query } => match engine.history_search(&query) {
                Ok(events) => (None, Some(events)),
                Err(e) => {
                    write_error(&mut stdout, &e.to_string())?;
                    continue;
                }
            },
            IpcRequest::Report => match engine.monthly_report() {
                Ok(events) => (None, Some(events)),
                Err(e) => {
                    write_error(&mut stdout, &e.to_string())?;
                    continue;
                }
            },
        };

        let reply = IpcReply { result, history, state: engine.snapshot()? };
        writeln!(stdout, "{}", serde_json::to_string(&reply)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn write_error(stdout: &mut io::Stdout, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(stdout, "{err_json}")?;
    stdout.flush()?;
    Ok(())
}

fn print_summary(engine: &SimEngine, played: u32) -> Result<()> {
    let clock = &engine.clock;
    let stats = engine.economy().monthly_stats();

    println!("=== RUN SUMMARY ===");
    println!("  run_id:         {}", engine.run_id);
    println!("  months played:  {played}");
    println!("  date:           {}", clock.current_date);
    println!("  turn:           {}", clock.turn);
    println!("  status:         {:?}", clock.status);
    println!("  history:        {} entries", engine.history_len()?);
    println!("  events handled: {}", engine.events().handled().join(", "));

    println!();
    println!("=== RESOURCES ===");
    for kind in ResourceKind::ALL {
        let r = engine.ledger().get(kind);
        println!(
            "  {:<11} {:>10.0} {:<6} [{:?}]",
            r.name, r.current, r.unit, r.alert_level
        );
    }

    println!();
    println!("=== LAST MONTH ({}) ===", clock.report_date);
    println!("  income:   {:>10.0} Cr", stats.total_income);
    println!("  expenses: {:>10.0} Cr", stats.total_expenses);
    println!("  net:      {:>+10.0} Cr", stats.net_profit);
    for entry in engine.monthly_report()? {
        println!("  - [{:?}] {}", entry.severity, entry.title);
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
