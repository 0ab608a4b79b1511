//! Rewrite bracket parameters in the route source into colon parameters.
//!
//! Exit status: 0 when done (or nothing to do), 1 when `--check` finds
//! pending changes, 2 when the file cannot be read or written.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use news_site::config::schema::DEFAULT_ROUTES_PATH;
use news_site::normalize::normalize_file;

#[derive(Parser)]
#[command(name = "normalize-routes")]
#[command(about = "Convert [param] route segments to :param", long_about = None)]
struct Args {
    /// Route source to rewrite
    #[arg(short, long, default_value = DEFAULT_ROUTES_PATH)]
    source: PathBuf,

    /// Report what would change without writing
    #[arg(long)]
    check: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match normalize_file(&args.source, args.check) {
        Ok(report) => {
            println!("{}", report.summary());
            if args.check && !report.converted.is_empty() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("normalize-routes: {}", e);
            ExitCode::from(2)
        }
    }
}
