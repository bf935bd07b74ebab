use cfa::analysis::{analyze, Cfg};
use clap::Parser;
use std::error::Error;
use std::process::exit;

/// Recovers structured control flow primitives from .dot control flow graphs.
///
/// Every input file is parsed, analyzed with the interval method and the
/// recovered primitives (intervals, switches, loops and ifs) are printed to
/// stdout as JSON, one record per file.
#[derive(Parser)]
#[command(version, about, verbatim_doc_comment)]
struct Args {
    /// Input .dot file(s).
    #[arg(required = true)]
    input: Vec<String>,
    /// Prints each record on a single line instead of pretty-printing it.
    #[arg(short, long)]
    compact: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let mut failed = false;
    for path in &args.input {
        match restructure(path, args.compact) {
            Ok(record) => println!("{}", record),
            Err(err) => {
                log::error!("{}: {}", path, err);
                failed = true;
            }
        }
    }
    if failed {
        exit(1);
    }
}

fn restructure(path: &str, compact: bool) -> Result<String, Box<dyn Error>> {
    let (graph, mut nodes) = Cfg::from_file(path)?;
    let prims = analyze(&graph, &mut nodes)?;
    let record = if compact {
        serde_json::to_string(&prims)?
    } else {
        serde_json::to_string_pretty(&prims)?
    };
    Ok(record)
}
