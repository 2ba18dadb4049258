use anklelog::cli::{Cli, Command};
use anklelog::config::{default_db_path, load_config, resolve_advisory_rules};
use anklelog::journal::{handle_delete_user, handle_log, handle_register, handle_shell, handle_show};
use anklelog::status::handle_status;
use anklelog::store::open_store;
use anklelog::AnkleError;
use clap::Parser;
use std::process::ExitCode;

fn run() -> Result<(), AnkleError> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let db_path = cli.db.unwrap_or_else(default_db_path);

    let store = || open_store(&config, &db_path);
    let rules = || resolve_advisory_rules(&config);

    match cli.command {
        Command::Register(args) => handle_register(store()?.as_ref(), rules(), &args),
        Command::Log(args) => handle_log(store()?.as_ref(), rules(), &args),
        Command::Show(args) => handle_show(store()?.as_ref(), rules(), &args),
        Command::DeleteUser(args) => handle_delete_user(store()?.as_ref(), rules(), &args),
        Command::Shell => handle_shell(store()?.as_ref(), rules()),
        Command::Status => handle_status(&db_path, &config),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("anklelog: {e}");
            ExitCode::from(1)
        }
    }
}
