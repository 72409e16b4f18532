use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use volfs::fs::{DirectoryBackend, InMemoryBackend, Volume};
use volfs::functions::{run_script, run_volume_script, FunctionRegistry, LineOutcome};
use volfs::session::{LayoutConfig, Session, SessionOptions};

#[derive(Parser)]
#[command(name = "volfs")]
#[command(about = "Run file-system scripts against a set of virtual volumes")]
#[command(version)]
struct Cli {
    /// Execute the script from command line argument
    #[arg(short = 'c')]
    script: Option<String>,

    /// Volume layout file (TOML)
    #[arg(long = "config", conflicts_with_all = ["archive", "capacity"])]
    config: Option<PathBuf>,

    /// Host directory mounted as the "archive" volume (slot 0)
    #[arg(long = "archive")]
    archive: Option<PathBuf>,

    /// Capacity in bytes of the in-memory "local" volume
    #[arg(long = "capacity")]
    capacity: Option<u64>,

    /// Output results as a JSON array, one entry per executed line
    #[arg(long = "json")]
    json: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Run a script stored on a volume (e.g. `archive:/boot`)
    #[arg(long = "run", conflicts_with_all = ["script", "script_file"])]
    run: Option<String>,

    /// Script file to execute
    #[arg()]
    script_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    volfs::logging::init(cli.verbose);

    let options = match session_options(&cli) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            return ExitCode::FAILURE;
        }
    };
    let mut session = match Session::new(options) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let registry = FunctionRegistry::with_builtins();
    let outcomes = match &cli.run {
        Some(path) => match run_volume_script(&mut session, &registry, path.as_str()) {
            Ok(outcomes) => outcomes,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => match read_script(&cli) {
            Ok(script) => run_script(&mut session, &registry, &script),
            Err(message) => {
                eprintln!("Error: {}", message);
                return ExitCode::FAILURE;
            }
        },
    };

    if cli.json {
        let lines: Vec<serde_json::Value> = outcomes.iter().map(outcome_json).collect();
        println!("{}", serde_json::Value::Array(lines));
    } else {
        for outcome in &outcomes {
            match &outcome.result {
                Ok(Some(value)) => println!("{}", value),
                Ok(None) => {}
                Err(e) => eprintln!("line {}: {}", outcome.line, e),
            }
        }
    }

    if outcomes.iter().all(LineOutcome::is_ok) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Script source: `-c`, then a file, then piped stdin.
fn read_script(cli: &Cli) -> Result<String, String> {
    if let Some(s) = &cli.script {
        return Ok(s.clone());
    }
    if let Some(file) = &cli.script_file {
        return std::fs::read_to_string(file)
            .map_err(|e| format!("Cannot read script file: {}: {}", file.display(), e));
    }

    use std::io::IsTerminal;
    if std::io::stdin().is_terminal() {
        return Err("No script provided. Use -c 'script', provide a script file, or pipe via stdin.".to_string());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| format!("Cannot read stdin: {}", e))?;
    Ok(buf)
}

fn session_options(cli: &Cli) -> Result<SessionOptions, String> {
    if let Some(path) = &cli.config {
        return LayoutConfig::load(path)
            .and_then(LayoutConfig::into_options)
            .map_err(|e| e.to_string());
    }
    if cli.archive.is_none() && cli.capacity.is_none() {
        return Ok(SessionOptions::default());
    }

    let archive = match &cli.archive {
        Some(dir) => {
            let backend = DirectoryBackend::open(dir).map_err(|e| format!("archive '{}': {}", dir.display(), e))?;
            Volume::new("archive", backend)
        }
        None => Volume::in_memory("archive"),
    };
    let local = match cli.capacity {
        Some(bytes) => Volume::new("local", InMemoryBackend::with_capacity(bytes)),
        None => Volume::in_memory("local"),
    };
    Ok(SessionOptions {
        volumes: Some(vec![archive, local]),
        ..Default::default()
    })
}

fn outcome_json(outcome: &LineOutcome) -> serde_json::Value {
    match &outcome.result {
        Ok(value) => serde_json::json!({
            "line": outcome.line,
            "function": outcome.function,
            "ok": true,
            "output": value.as_ref().map(|v| v.to_string()),
        }),
        Err(e) => serde_json::json!({
            "line": outcome.line,
            "function": outcome.function,
            "ok": false,
            "error": e.to_string(),
        }),
    }
}
