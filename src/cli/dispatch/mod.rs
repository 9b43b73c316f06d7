use std::io::{self, Write};
use std::time::Instant;

use tracing::{debug, info};

use crate::cli::{Cli, Command};
use crate::config::ManglerConfig;
use crate::error::{Error, Result};
use crate::logging::init_logging;
use crate::mangle::{Mangler, ManglerTables};
use crate::manifest::{BatchManifest, EntityEntry, owner_class};
use crate::primitives::PrimitiveRegistry;

mod reporting;

/// Execute a parsed CLI command, printing symbols to stdout. Logging is
/// configured here so the binary entrypoint can stay thin.
pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.log_options);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_to(cli, &mut out)
}

/// Like [`run`] but writes command output to `out` and leaves logging alone.
pub fn run_to(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let start = Instant::now();
    let name = command_name(&cli.command);
    info!(target: "mangle", command = name, "run start");
    let result = dispatch_command(cli, out);
    info!(
        target: "mangle",
        command = name,
        elapsed = ?start.elapsed(),
        ok = result.is_ok(),
        "run complete"
    );
    result
}

pub fn report_error(err: &Error) {
    reporting::report_error(err);
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Entity { .. } => "entity",
        Command::Vtable { .. } => "vtable",
        Command::Batch { .. } => "batch",
        Command::Help { .. } => "help",
        Command::Version => "version",
    }
}

fn dispatch_command(cli: Cli, out: &mut dyn Write) -> Result<()> {
    match cli.command {
        Command::Help { topic } => {
            let text = match topic {
                Some(topic) => Cli::help_for(&topic)?,
                None => Cli::usage(),
            };
            out.write_all(text.as_bytes())?;
            Ok(())
        }
        Command::Version => {
            writeln!(out, "oomangle {}", env!("CARGO_PKG_VERSION"))?;
            Ok(())
        }
        Command::Entity {
            owner,
            name,
            descriptor,
            is_static,
        } => {
            let tables = load_tables(cli.config.as_deref())?;
            let entry = EntityEntry {
                owner,
                name,
                descriptor,
                is_static,
            };
            let entity = entry.to_entity(tables.primitives())?;
            let symbol = Mangler::new(&tables).mangle_entity_name(&entity)?;
            writeln!(out, "{symbol}")?;
            Ok(())
        }
        Command::Vtable { class } => {
            let tables = load_tables(cli.config.as_deref())?;
            let symbol = Mangler::new(&tables).mangle_vtable_name(&owner_class(&class))?;
            writeln!(out, "{symbol}")?;
            Ok(())
        }
        Command::Batch { manifest } => {
            let tables = load_tables(cli.config.as_deref())?;
            let manifest = BatchManifest::load(&manifest)?;
            let symbols = manifest.mangle_all(&mut Mangler::new(&tables))?;
            for entry in symbols {
                writeln!(out, "{}\t{}", entry.symbol, entry.description)?;
            }
            Ok(())
        }
    }
}

fn load_tables(config: Option<&std::path::Path>) -> Result<ManglerTables> {
    let config = match config {
        Some(path) => {
            debug!(target: "mangle", path = %path.display(), "loading mangler config");
            ManglerConfig::load(path)?
        }
        None => ManglerConfig::java_defaults(),
    };
    config.build_tables(PrimitiveRegistry::with_builtins())
}
