use atm_sim::application::controller::SessionController;
use atm_sim::application::view::RendererBox;
use atm_sim::config::AtmConfig;
use atm_sim::domain::card::{CardNetwork, CardRequest};
use atm_sim::domain::ports::{ClockBox, IdGeneratorBox, ReceiptExporterBox};
use atm_sim::infrastructure::generators::{RandomIdGenerator, SystemClock};
use atm_sim::infrastructure::receipt_file::{JsonReceiptExporter, TextReceiptExporter};
use atm_sim::infrastructure::terminal::TerminalRenderer;
use atm_sim::interfaces::csv::statement_writer::StatementWriter;
use atm_sim::interfaces::json::card_reader::load_card_request;
use atm_sim::interfaces::script::{Command, Outcome, execute, parse_command};
use clap::{Parser, ValueEnum};
use log::info;
use miette::{IntoDiagnostic, Result};
use std::io;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::time::{Instant, sleep};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Machine configuration (JSON). Built-in defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Card issuance request (JSON). A demo card is used when omitted.
    #[arg(long)]
    card: Option<PathBuf>,

    /// Directory receipts are written to
    #[arg(long, default_value = "receipts")]
    receipts_dir: PathBuf,

    /// File format receipts are written in
    #[arg(long, value_enum, default_value_t = ReceiptFormat::Json)]
    receipt_format: ReceiptFormat,

    /// Read commands from this file instead of stdin
    #[arg(long)]
    script: Option<PathBuf>,

    /// Print the account statement as CSV whenever the card is ejected
    #[arg(long)]
    statement: bool,

    /// Advance timers only on `wait`, without sleeping
    #[arg(long)]
    fast_forward: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReceiptFormat {
    Json,
    Text,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AtmConfig::load(path).into_diagnostic()?,
        None => AtmConfig::default(),
    };
    let card = match &cli.card {
        Some(path) => load_card_request(path).into_diagnostic()?,
        None => demo_card(),
    };

    let renderer: RendererBox = Box::new(TerminalRenderer::new(io::stdout()));
    let exporter: ReceiptExporterBox = match cli.receipt_format {
        ReceiptFormat::Json => {
            Box::new(JsonReceiptExporter::new(&cli.receipts_dir).into_diagnostic()?)
        }
        ReceiptFormat::Text => Box::new(
            TextReceiptExporter::new(&cli.receipts_dir, config.currency.clone())
                .into_diagnostic()?,
        ),
    };
    let ids: IdGeneratorBox = Box::new(RandomIdGenerator::new());
    let clock: ClockBox = Box::new(SystemClock);
    let mut controller =
        SessionController::new(config, renderer, exporter, ids, clock).into_diagnostic()?;

    let source: Box<dyn AsyncRead + Unpin> = match &cli.script {
        Some(path) => Box::new(tokio::fs::File::open(path).await.into_diagnostic()?),
        None => Box::new(tokio::io::stdin()),
    };
    let mut lines = BufReader::new(source).lines();
    let mut line_no = 0;
    let mut input_open = true;
    let mut last_tick = Instant::now();

    loop {
        let next_timer = controller.next_timer_in();
        if !input_open && (cli.fast_forward || next_timer.is_none()) {
            break;
        }
        let timers_live = next_timer.is_some() && !cli.fast_forward;

        tokio::select! {
            line = lines.next_line(), if input_open => {
                if !cli.fast_forward {
                    tick(&mut controller, &mut last_tick);
                }
                match line.into_diagnostic()? {
                    Some(line) => {
                        line_no += 1;
                        let outcome =
                            run_line(&mut controller, &card, &cli, &mut last_tick, line_no, &line)
                                .await?;
                        if outcome == Outcome::Quit {
                            break;
                        }
                    }
                    None => input_open = false,
                }
            }
            _ = sleep(next_timer.unwrap_or_default()), if timers_live => {
                tick(&mut controller, &mut last_tick);
            }
        }

        flush_statement(&mut controller, cli.statement)?;
    }

    if controller.is_card_inserted() {
        controller.eject();
    }
    flush_statement(&mut controller, cli.statement)?;
    info!("Session closed");
    Ok(())
}

async fn run_line(
    controller: &mut SessionController,
    card: &CardRequest,
    cli: &Cli,
    last_tick: &mut Instant,
    line_no: usize,
    line: &str,
) -> Result<Outcome> {
    let command = match parse_command(line_no, line) {
        Ok(Some(command)) => command,
        Ok(None) => return Ok(Outcome::Continue),
        Err(e) => {
            eprintln!("{e}");
            return Ok(Outcome::Continue);
        }
    };

    if let Command::Wait(duration) = command
        && !cli.fast_forward
    {
        sleep(duration).await;
        tick(controller, last_tick);
        return Ok(Outcome::Continue);
    }

    let mut stdout = io::stdout();
    match execute(controller, card, &command, &mut stdout) {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            eprintln!("Error on line {line_no}: {e}");
            Ok(Outcome::Continue)
        }
    }
}

/// Feeds the wall-clock time since the last tick to the session timers.
fn tick(controller: &mut SessionController, last_tick: &mut Instant) {
    let now = Instant::now();
    controller.advance(now.duration_since(*last_tick));
    *last_tick = now;
}

fn flush_statement(controller: &mut SessionController, print: bool) -> Result<()> {
    if let Some(account) = controller.take_closed_account()
        && print
    {
        let stdout = io::stdout();
        let mut writer = StatementWriter::new(stdout.lock());
        writer
            .write_transactions(account.history())
            .into_diagnostic()?;
    }
    Ok(())
}

fn demo_card() -> CardRequest {
    CardRequest {
        cardholder_name: "John Doe".to_string(),
        card_number: "4111 1111 1111 1111".to_string(),
        expiry_date: "12/29".to_string(),
        cvv: "123".to_string(),
        bank_name: "Fake Bank".to_string(),
        card_type: CardNetwork::Visa,
        card_color: "gradient-blue".to_string(),
    }
}
