use clap::{Parser, Subcommand};
use relm4::prelude::*;
use ringpop::config;
use ringpop::gui::app::AppModel;
use ringpop::gui::menu::State;
use ringpop::sys::{runtime, server};

#[derive(Parser, Debug)]
#[command(name = "ringpop", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Pop the menu up at the pointer of a running daemon
    Show,
    /// Close the menu without picking anything
    Hide,
    /// Write the built-in menu to the config directory and print its path
    InitConfig,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Show) => server::send_command("show"),
        Some(Commands::Hide) => server::send_command("hide"),
        Some(Commands::InitConfig) => {
            let path = config::write_default_config()?;
            println!("{}", path.display());
            Ok(())
        }
        None => run_daemon(),
    }
}

fn run_daemon() -> anyhow::Result<()> {
    let config = config::load_or_default();
    let state = State::from_config(&config).or_else(|e| {
        log::error!("Config does not describe a valid menu, using built-in one: {}", e);
        State::from_config(&config::builtin_config()?)
    })?;

    let (tx, rx) = async_channel::bounded(32);
    runtime::start_background_services(tx);

    // relm4 parses argv itself; the subcommands above are already handled.
    let app = RelmApp::new("org.ringpop.ringpop").with_args(Vec::new());
    app.run::<AppModel>((state, rx));
    Ok(())
}
