use std::fs;
use std::io::{self, BufRead, Read};
use std::path::PathBuf;

use carescore::{
    CareScoreService, ImmuneBatchRequest, ImmuneRequest, NutritionRequest, Session, StoreConfig,
};
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(
    name = "carescore",
    version,
    about = "DIVS immune risk and nutrition intervention scoring",
    long_about = "carescore scores care-facility residents for immune risk (DIVS) and\n\
        projects the effect of nutrition intervention plans.\n\n\
        Model bundles and the guideline table are read from <root>/modeling/artifacts\n\
        or <root>/modeling; missing artifacts fall back to formulas and defaults.\n\n\
        EXAMPLES:\n\
        \n  carescore immune resident.json            Score one resident\n\
        \n  carescore batch residents.json            Score a batch in order\n\
        \n  echo '{...}' | carescore nutrition         Simulate a plan from stdin\n\
        \n  carescore --root /srv/care status          Show loaded artifacts\n\
        \n  carescore session                          Serve JSON lines on stdin"
)]
struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Project root holding the modeling/ directory
    #[arg(long, value_name = "DIR", env = "CARESCORE_ROOT", global = true)]
    root: Option<PathBuf>,

    /// Immune model bundle, probed before the default locations
    #[arg(long = "immune-model", value_name = "FILE", global = true)]
    immune_model: Option<PathBuf>,

    /// Albumin model bundle, probed before the default locations
    #[arg(long = "albumin-model", value_name = "FILE", global = true)]
    albumin_model: Option<PathBuf>,

    /// Guideline document, probed before the default locations
    #[arg(long, value_name = "FILE", global = true)]
    guidelines: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score one immune request document
    Immune(InputArgs),
    /// Score an immune batch document ({"items": [...]})
    Batch(InputArgs),
    /// Simulate a nutrition request document ({"patient": ..., "intervention": ...})
    Nutrition(InputArgs),
    /// Print the artifact store status
    Status,
    /// Answer JSON request lines from stdin against one loaded store
    #[command(long_about = "Reads one request per line from stdin and answers each with one JSON line.\n\n\
        Commands:\n\
        \n  :status   Show the artifact store status\n\
        \n  :reload   Reload artifacts from disk\n\
        \n  :help     Show available commands\n\
        \n  :quit     End the session (also :q, :exit)")]
    Session,
}

#[derive(Debug, Args, Clone)]
struct InputArgs {
    /// Request document (reads from stdin if not provided)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,
}

fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(verbose: u8) {
    // RUST_LOG, when set, overrides the -v level
    let _ = env_logger::Builder::new()
        .filter_level(level_for(verbose))
        .parse_default_env()
        .try_init();
}

fn store_config(cli: &Cli) -> StoreConfig {
    let mut config = match &cli.root {
        Some(root) => StoreConfig::new(root),
        None => StoreConfig::from_env(),
    };
    if let Some(path) = &cli.immune_model {
        config = config.with_immune_candidate(path);
    }
    if let Some(path) = &cli.albumin_model {
        config = config.with_albumin_candidate(path);
    }
    if let Some(path) = &cli.guidelines {
        config = config.with_guideline_candidate(path);
    }
    config
}

fn read_input(input: &Option<PathBuf>) -> Result<String, String> {
    if let Some(path) = input {
        fs::read_to_string(path).map_err(|e| format!("failed to read '{}': {e}", path.display()))
    } else {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("failed to read from stdin: {e}"))?;
        Ok(buf)
    }
}

fn print_pretty<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{text}");
            0
        }
        Err(e) => {
            eprintln!("error: failed to serialize response: {e}");
            2
        }
    }
}

fn run_request<T, R, F>(args: &InputArgs, handle: F) -> i32
where
    T: DeserializeOwned,
    R: Serialize,
    F: FnOnce(T) -> R,
{
    let text = match read_input(&args.input) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return 2;
        }
    };
    let request: T = match serde_json::from_str(&text) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: invalid request document: {e}");
            return 1;
        }
    };
    print_pretty(&handle(request))
}

fn run_session(service: &CareScoreService) -> i32 {
    let session = Session::new(service);
    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("error: session failed: {e}");
                return 2;
            }
        };
        let (out, exit) = session.handle_line(&line);
        for l in out {
            println!("{l}");
        }
        if exit {
            break;
        }
    }
    0
}

fn run_cli() -> i32 {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let service = CareScoreService::open(store_config(&cli));

    match &cli.command {
        Command::Immune(args) => run_request(args, |req: ImmuneRequest| {
            service.predict_immune(req.resident_id, &req.features)
        }),
        Command::Batch(args) => run_request(args, |batch: ImmuneBatchRequest| {
            service.predict_immune_batch(&batch)
        }),
        Command::Nutrition(args) => run_request(args, |req: NutritionRequest| {
            service.simulate_nutrition(&req.patient, &req.intervention)
        }),
        Command::Status => print_pretty(&service.health()),
        Command::Session => run_session(&service),
    }
}

fn main() {
    std::process::exit(run_cli());
}
