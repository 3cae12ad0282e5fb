// jackc: batch Jack-to-CST compiler front end

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use jackc::files::collect_sources;
use jackc::parser::parser::Parser as CstParser;

/// Batch compiler front end for the Jack language: parses every `.jack`
/// file under the source path and writes the concrete syntax trees as JSON.
#[derive(Parser, Debug)]
#[command(name = "jackc", version, about)]
struct Args {
    /// The source file or directory to compile
    #[arg(short, long, default_value = ".")]
    source: PathBuf,

    /// The directory to output compiled files to
    #[arg(short, long, default_value = ".")]
    output: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let start = Instant::now();

    let sources = match collect_sources(&args.source) {
        Ok(sources) => sources,
        Err(err) => {
            eprintln!("Error: failed to scan '{}': {}", args.source.display(), err);
            return ExitCode::FAILURE;
        }
    };

    if sources.is_empty() {
        eprintln!("No .jack files found under '{}'", args.source.display());
        return ExitCode::SUCCESS;
    }

    let out_path = args.output.join("out.txt");
    let file = match File::create(&out_path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Error: failed to create '{}': {}", out_path.display(), err);
            return ExitCode::FAILURE;
        }
    };
    let mut out = BufWriter::new(file);

    let mut failures = 0usize;
    for path in &sources {
        if let Err(message) = compile_unit(path, &mut out) {
            eprintln!("{}", message);
            failures += 1;
        }
    }

    if let Err(err) = out.flush() {
        eprintln!("Error: failed to write '{}': {}", out_path.display(), err);
        return ExitCode::FAILURE;
    }

    let runtime = start.elapsed();
    eprintln!("runtime: {}ms", runtime.as_millis());
    eprintln!("parsed {} of {} files", sources.len() - failures, sources.len());
    eprintln!(
        "average: {:.3}ms/file",
        runtime.as_secs_f64() * 1000.0 / sources.len() as f64
    );

    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Parse one source file and append its path and pretty-printed tree to the
/// batch output stream. Any failure is reported as a message; the caller
/// decides whether the batch goes on.
fn compile_unit(path: &Path, out: &mut impl Write) -> Result<(), String> {
    let display = path.display().to_string();

    let source =
        fs::read_to_string(path).map_err(|err| format!("Error reading {}: {}", display, err))?;

    let mut parser =
        CstParser::new(&source, &display).map_err(|err| err.to_string())?;
    let tree = parser.parse_class().map_err(|err| err.to_string())?;

    let json = serde_json::to_string_pretty(&tree)
        .map_err(|err| format!("Error serializing {}: {}", display, err))?;

    writeln!(out, "{}", display)
        .and_then(|_| writeln!(out, "{}", json))
        .map_err(|err| format!("Error writing output for {}: {}", display, err))
}
