use restry_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    logging::init_logging_stderr();

    match Cli::run_from_args() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("restry error: {:#}", err);
            std::process::exit(1);
        }
    }
}
