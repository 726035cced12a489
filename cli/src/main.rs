mod commands;
mod terminal;

use commands::{CommandLine, Commands, bulk, enumerate};
use subscout_common::config::Config;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands: CommandLine = CommandLine::parse_args();
    let cfg: Config = commands.config();

    logging::init_logging(&cfg);
    print::banner(cfg.no_banner, cfg.quiet);

    match commands.command {
        Commands::Enumerate(args) => {
            print::header("enumerating subdomains", cfg.quiet);
            enumerate::enumerate(args, &cfg).await
        }
        Commands::Bulk(args) => {
            print::header("bulk enumeration", cfg.quiet);
            bulk::bulk(args, &cfg).await
        }
    }
}
