use anyhow::Result;
use log::LevelFilter;
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::env;
use tutorgrid::cli::{self, Command};
use tutorgrid::config::Config;
use tutorgrid::context::StandardContext;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let inv = cli::parse_args(&args)?;

    if inv.command == Command::Help {
        print!("{}", cli::help_text("tutorgrid"));
        return Ok(());
    }

    let ctx = StandardContext::new(inv.root.clone());
    let config = Config::load_or_default(&ctx)?;

    let level = if inv.verbose {
        LevelFilter::Debug
    } else {
        config.log_level_filter()
    };
    // Logging is best effort; a second init (or no terminal) is not fatal.
    let _ = TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    let out = cli::run(&inv, &ctx, &config)?;
    print!("{}", out);
    Ok(())
}
