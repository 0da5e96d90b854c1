use clap::{Parser, Subcommand};

mod cmd;
mod hifo;
mod records;

#[derive(Parser)]
#[command(
    name = "hifoc",
    version,
    about = "Calculate per-year capital gains/losses using HIFO cost basis"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Calculate and display per-year capital gains/losses
    Gains(cmd::gains::GainsCommand),
    /// Show open lots remaining after matching all sales
    Lots(cmd::lots::LotsCommand),
    /// Check that total sales do not exceed total purchases
    Validate(cmd::validate::ValidateCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Gains(cmd) => cmd.exec(),
        Command::Lots(cmd) => cmd.exec(),
        Command::Validate(cmd) => cmd.exec(),
    }
}
