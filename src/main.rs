use clap::Parser;
use docsfetch::cli::{run, Args};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("docsfetch: {}", e);
            if args.verbose {
                let mut cause = e.source();
                while let Some(c) = cause {
                    eprintln!("  caused by: {}", c);
                    cause = c.source();
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}
