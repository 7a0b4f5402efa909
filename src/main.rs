//!
//! jsop command-line tool
//! ----------------------
//! Bulk import/export for jsop databases: `init` creates a fresh database
//! (optionally seeded from a JSON file), `export` writes the snapshot as
//! JSON to a file or pretty-printed to standard output.

use std::env;
use std::fs;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use jsop::session::Jsop;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} init <db-path> [<json-path>]\n  {program} export <db-path> [<json-path>]\n\nCommands:\n  init      create a fresh database; seeded from <json-path> when given,\n            else initialised with an empty map\n  export    write the database snapshot as JSON to <json-path> when given,\n            else pretty-printed to standard output"
    );
}

fn main() -> Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("jsop");
    if !(3..=4).contains(&args.len()) {
        print_usage(program);
        std::process::exit(1);
    }
    let command = args[1].as_str();
    let db_path = args[2].as_str();
    let json_path = args.get(3).map(String::as_str);

    match command {
        "init" => {
            let value = match json_path {
                Some(path) => {
                    let text = fs::read_to_string(path)
                        .with_context(|| format!("cannot read '{}'", path))?;
                    serde_json::from_str(&text)
                        .with_context(|| format!("'{}' is not valid JSON", path))?
                }
                None => serde_json::json!({}),
            };
            Jsop::new(db_path)
                .init(&value)
                .with_context(|| format!("cannot initialise '{}'", db_path))?;
        }
        "export" => {
            let value = Jsop::new(db_path)
                .export()
                .with_context(|| format!("cannot export '{}'", db_path))?;
            match json_path {
                Some(path) => fs::write(path, serde_json::to_string(&value)?)
                    .with_context(|| format!("cannot write '{}'", path))?,
                None => println!("{}", serde_json::to_string_pretty(&value)?),
            }
        }
        _ => {
            print_usage(program);
            std::process::exit(1);
        }
    }
    Ok(())
}
