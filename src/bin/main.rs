use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context as _;
use clap::Parser;
use pyll::{codegen, lexer, parser};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Source file to compile.
    input: PathBuf,

    /// Where to write the generated IR.
    #[arg(short, long, default_value = "generated.ll")]
    output: PathBuf,

    /// Also write the AST as JSON to `ast-<input file name>.json`.
    #[arg(long)]
    emit_ast: bool,

    /// Also write the token stream to `<input>.tokens`.
    #[arg(long)]
    emit_tokens: bool,

    /// Don't echo the IR to stdout.
    #[arg(short, long)]
    quiet: bool,

    /// Raise the log level. Repeat for more.
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("\x1b[1;31merror\x1b[0m: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> anyhow::Result<()> {
    let src = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read `{}`", args.input.display()))?;
    let module_name = args
        .input
        .file_name()
        .map_or_else(|| "main".into(), |name| name.to_string_lossy());

    let tokens = lexer::lex(&src).map_err(diagnostic)?;
    if args.emit_tokens {
        let mut out = String::with_capacity(tokens.len() * 48);
        for token in &tokens {
            _ = writeln!(out, "{token}");
        }
        let path = suffixed(&args.input, ".tokens");
        write(&path, out)?;
    }

    let module = parser::parse(&tokens).map_err(diagnostic)?;
    if args.emit_ast {
        let path = args
            .input
            .with_file_name(format!("ast-{module_name}.json"));
        let json = serde_json::to_string_pretty(&module).context("failed to serialize the AST")?;
        write(&path, json)?;
    }

    let ir = codegen::generate(&module, &module_name).map_err(diagnostic)?;
    let text = ir.to_string();
    write(&args.output, &text)?;
    info!(output = %args.output.display(), "wrote IR");

    if !args.quiet {
        print!("{text}");
    }
    Ok(())
}

/// Formats a stage error together with its source position.
fn diagnostic(error: impl Into<pyll::Error>) -> anyhow::Error {
    anyhow::anyhow!("{:#}", error.into())
}

/// `path` with `suffix` appended to its full file name.
fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn write(path: &Path, contents: impl AsRef<[u8]>) -> anyhow::Result<()> {
    debug!(path = %path.display(), "writing");
    fs::write(path, contents).with_context(|| format!("failed to write `{}`", path.display()))
}
