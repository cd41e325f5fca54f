use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{Local, NaiveDate};
use log::{error, info};
use seahorse::{App, Command, Context, Flag, FlagType};

use zentao_weekly_report::input::Config;
use zentao_weekly_report::{generate_weekly_report, make_weekly_report};

const DEFAULT_CONFIG: &str = "config.toml";

fn set_env_if_absent<K: AsRef<OsStr>, V: AsRef<OsStr>>(var: K, default: impl FnOnce() -> V) {
    if env::var(var.as_ref()).is_err() {
        env::set_var(var, default());
    }
}

fn main() {
    set_env_if_absent("RUST_APP_LOG", || "info");
    color_backtrace::install();
    pretty_env_logger::init_custom_env("RUST_APP_LOG");

    let args: Vec<String> = env::args().collect();

    let make_command = Command::new("make")
        .usage(format!("{} make [args]", args[0]))
        .description("Writes last week's report without sending it.")
        .flag(config_flag())
        .flag(date_flag())
        .action(make_action);

    let app = App::new(env!("CARGO_PKG_NAME"))
        .description(env!("CARGO_PKG_DESCRIPTION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .usage(format!("{} [args]", args[0]))
        .flag(config_flag())
        .flag(date_flag())
        .action(send_action)
        .command(make_command);

    app.run(args);
}

fn config_flag() -> Flag {
    Flag::new("config", FlagType::String)
        .description("[optional] Path to the config file. Default: `config.toml`")
        .alias("c")
}

fn date_flag() -> Flag {
    Flag::new("date", FlagType::String)
        .description("[optional] Report the week before this date (YYYY-MM-DD). Default: today")
        .alias("d")
}

trait ContextExt {
    fn context(&self) -> &Context;

    fn config_path(&self) -> PathBuf {
        self.context()
            .string_flag("config")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                println!("using {} in current directory.", DEFAULT_CONFIG);
                PathBuf::from(DEFAULT_CONFIG)
            })
    }

    fn reference_date(&self) -> anyhow::Result<NaiveDate> {
        match self.context().string_flag("date") {
            Ok(date) => NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .with_context(|| format!("\"{}\" is not a valid date, expected YYYY-MM-DD", date)),
            Err(_) => Ok(Local::now().date_naive()),
        }
    }
}

impl ContextExt for Context {
    fn context(&self) -> &Context {
        self
    }
}

fn exit_on_error<T>(result: anyhow::Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            error!("{:?}", e);
            ::std::process::exit(1);
        }
    }
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    if !path.is_file() {
        println!("{} not found", path.display());
        ::std::process::exit(1);
    }

    let config = Config::try_from_toml_file(path)?.build();
    info!("loaded config from `{}`", path.display());

    Ok(config)
}

fn send_action(context: &Context) {
    let config = exit_on_error(load_config(&context.config_path()));
    let reference = exit_on_error(context.reference_date());

    if exit_on_error(generate_weekly_report(&config, reference)) {
        println!("generating weekly report done.");
    } else {
        println!("generating weekly report failed.");
    }
}

fn make_action(context: &Context) {
    let config = exit_on_error(load_config(&context.config_path()));
    let reference = exit_on_error(context.reference_date());

    let workbook = exit_on_error(make_weekly_report(&config, reference));
    println!("wrote {}", workbook.display());
}
