use std::process::ExitCode;

use clap::Parser;
use pixelflag::cli::{Arguments, Command, ExitStatus};

fn main() -> ExitCode {
    let args = Arguments::parse();
    pixelflag::logging::init(args.verbose);

    if matches!(args.command, Some(Command::Serve)) {
        if let Err(err) = pixelflag::mcp::run_server() {
            eprintln!("Error: {:#}", err);
            return ExitStatus::Error.into();
        }
        return ExitStatus::Success.into();
    }

    match pixelflag::cli::run_cli(args) {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitStatus::Error.into()
        }
    }
}
