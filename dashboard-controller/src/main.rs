//! Terminal front end for the trading dashboard
//!
//! Reads commands from stdin, dispatches them to the controller and
//! redraws the dashboard on stdout whenever the view changes. Logs go to
//! stderr.

use std::sync::Arc;

use dashboard_controller::{
    DashboardConfig, DashboardController, ElementId, HttpBackend, Intent, SharedView,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
Commands:
  start [amount]                     start trading (optionally set trade-amount first)
  stop                               stop trading
  theme                              toggle dark/light mode
  save [threshold take cut]          save settings (optionally set the inputs first)
  set <element-id> <value>           type into an input (trade-amount, threshold-input, ...)
  balance                            refresh wallet balance now
  status                             fetch bot status now
  show                               redraw the dashboard
  help                               this text
  quit                               exit";

/// A parsed command line
#[derive(Debug, PartialEq)]
enum Command {
    Dispatch(Vec<Intent>),
    Show,
    Help,
    Quit,
}

fn set(id: ElementId, value: &str) -> Intent {
    Intent::SetInput {
        id,
        value: value.to_string(),
    }
}

fn parse_command(line: &str) -> Result<Command, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&name, args)) = words.split_first() else {
        return Ok(Command::Show);
    };

    let command = match (name.to_lowercase().as_str(), args) {
        ("start", []) => Command::Dispatch(vec![Intent::StartTrading]),
        ("start", [amount]) => Command::Dispatch(vec![
            set(ElementId::TradeAmount, amount),
            Intent::StartTrading,
        ]),
        ("stop", []) => Command::Dispatch(vec![Intent::StopTrading]),
        ("theme", []) => Command::Dispatch(vec![Intent::ToggleTheme]),
        ("save", []) => Command::Dispatch(vec![Intent::SaveSettings]),
        ("save", [threshold, take, cut]) => Command::Dispatch(vec![
            set(ElementId::ThresholdInput, threshold),
            set(ElementId::ProfitTakeInput, take),
            set(ElementId::LossCutInput, cut),
            Intent::SaveSettings,
        ]),
        ("set", [id, value]) => {
            let id: ElementId = id.parse()?;
            Command::Dispatch(vec![set(id, value)])
        }
        ("balance", []) => Command::Dispatch(vec![Intent::RefreshBalance]),
        ("status", []) => Command::Dispatch(vec![Intent::RefreshStatus]),
        ("show", []) => Command::Show,
        ("help" | "?", _) => Command::Help,
        ("quit" | "exit" | "q", _) => Command::Quit,
        _ => return Err(format!("unrecognised command: {line}")),
    };
    Ok(command)
}

fn draw(view: &SharedView) {
    println!("{}", view.read(|v| v.render()));
    for alert in view.take_alerts() {
        println!(">>> {alert}");
    }
}

/// Redraw on every view change until the view is dropped
fn spawn_redraw(view: SharedView) -> JoinHandle<()> {
    let mut changes = view.subscribe();
    tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            draw(&view);
        }
    })
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("dashboard_controller={level},dashboard={level}")))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = DashboardConfig::from_env();
    init_logging(&config.log_level);
    config.validate()?;

    info!("SOL Trading Dashboard v{}", env!("CARGO_PKG_VERSION"));
    info!("   Backend: {}", config.backend_url);
    info!("   Poll: every {:?} ({:?})", config.poll_interval, config.poll_mode);
    info!("   Balance refresh: every {:?}", config.balance_refresh_interval);

    let backend = Arc::new(HttpBackend::from_config(&config)?);
    let mut controller = DashboardController::new(backend, config);
    let redraw = spawn_redraw(controller.view().clone());
    controller.initialize();
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received, shutting down...");
                None
            }
        };
        let Some(line) = line else { break };

        match parse_command(&line) {
            Ok(Command::Dispatch(intents)) => {
                for intent in intents {
                    controller.dispatch(intent).await;
                }
            }
            Ok(Command::Show) => draw(controller.view()),
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::Quit) => break,
            Err(e) => warn!("{e} (type `help`)"),
        }
    }

    controller.shutdown().await;
    redraw.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_with_amount_sets_input_first() {
        assert_eq!(
            parse_command("start 0.5"),
            Ok(Command::Dispatch(vec![
                set(ElementId::TradeAmount, "0.5"),
                Intent::StartTrading,
            ]))
        );
    }

    #[test]
    fn test_save_with_values() {
        let Ok(Command::Dispatch(intents)) = parse_command("save 5 20 10") else {
            panic!("expected dispatch");
        };
        assert_eq!(intents.len(), 4);
        assert_eq!(intents[3], Intent::SaveSettings);
    }

    #[test]
    fn test_set_uses_dom_ids() {
        assert_eq!(
            parse_command("set loss-cut-input 7.5"),
            Ok(Command::Dispatch(vec![set(ElementId::LossCutInput, "7.5")]))
        );
        assert!(parse_command("set nowhere 1").is_err());
    }

    #[test]
    fn test_blank_line_redraws_and_unknown_is_error() {
        assert_eq!(parse_command("   "), Ok(Command::Show));
        assert_eq!(parse_command("QUIT"), Ok(Command::Quit));
        assert!(parse_command("launch rockets").is_err());
        assert!(parse_command("stop now").is_err());
    }
}
