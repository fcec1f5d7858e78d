use std::{
    env,
    fs::read_to_string,
    io::{self, BufReader, IsTerminal},
    path::Path,
    process::ExitCode,
};

use cool::{display_error, run_program, RunOptions};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging() {
    let use_ansi = env::var_os("NO_COLOR").is_none() && io::stderr().is_terminal();
    let filter = EnvFilter::try_from_env("COOL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    let subscriber = fmt::fmt()
        .with_env_filter(filter)
        .with_ansi(use_ansi)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: cool <file.cl>");
        return ExitCode::from(2);
    }

    let file_path = args[1].clone();
    let file_name = Path::new(&file_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_path.clone());

    let source = match read_to_string(&file_path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: failed to read {}: {}", file_path, err);
            return ExitCode::FAILURE;
        }
    };

    run(&source, file_name)
}

fn run(source: &str, file_name: String) -> ExitCode {
    let options = RunOptions::from_env().with_source_name(file_name);
    info!(file = %options.source_name, "running");

    let mut input = BufReader::new(io::stdin());
    let result = run_program(source, &options, &mut input);

    print!("{}", result.output);

    for diagnostic in &result.diagnostics {
        eprint!("{}", display_error(diagnostic, source));
    }

    if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
