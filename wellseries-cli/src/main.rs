use clap::Parser;
use wellseries_cli::{execute, Cli};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    execute(&cli, &mut std::io::stdout().lock())
}
