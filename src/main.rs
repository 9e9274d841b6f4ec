use clap::Parser;
use signalboard::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    signalboard::logging::init_logging(cli.verbose);
    run(cli)
}
