use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use pagestore::{
    DbError, ExecuteResult, MAX_PAGES_LIMIT, PagerConfig, Result, Statement, SyncMode,
    TABLE_MAX_PAGES, Table,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Single-file paged record store")]
struct Cli {
    /// Path of the data file, created on first insert.
    db_path: PathBuf,

    /// Maximum number of pages the table may use.
    #[arg(
        long,
        default_value_t = TABLE_MAX_PAGES as u64,
        value_parser = clap::value_parser!(u64).range(1..=MAX_PAGES_LIMIT as u64),
    )]
    max_pages: u64,

    /// How row writes reach the data file.
    #[arg(long, value_enum, default_value_t = SyncMode::InPlace)]
    sync: SyncMode,
}

struct InputBuffer {
    buffer: String,
}

impl InputBuffer {
    fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Returns `false` at end of input.
    fn read_input(&mut self, input: &mut impl BufRead) -> io::Result<bool> {
        self.buffer.clear();
        if input.read_line(&mut self.buffer)? == 0 {
            return Ok(false);
        }
        self.buffer = self.buffer.trim().to_string();
        Ok(true)
    }
}

// Non-SQL statements like .exit are called “meta-commands”.
enum MetaCommands {
    Exit,
    Help,
    Unrecognized,
}

impl MetaCommands {
    fn parse(input: &str) -> Option<MetaCommands> {
        match input {
            ".exit" => Some(MetaCommands::Exit),
            ".help" => Some(MetaCommands::Help),
            _ => {
                if input.starts_with(".") {
                    Some(MetaCommands::Unrecognized)
                } else {
                    None
                }
            }
        }
    }
}

fn print_prompt() -> io::Result<()> {
    print!("db > ");
    io::stdout().flush()
}

fn print_help() {
    println!("insert <id> <username> <email>  append a row");
    println!("select                          print every row");
    println!("select <page>                   print the rows of one page");
    println!(".help                           show this message");
    println!(".exit                           quit");
}

fn run_statement(input: &str, table: &mut Table) {
    let statement = match Statement::prepare(input) {
        Ok(statement) => statement,
        Err(err) => {
            println!("{err}");
            return;
        }
    };

    match statement.execute(table) {
        Ok(ExecuteResult::Inserted) => println!("Executed."),
        Ok(ExecuteResult::Rows(rows)) => {
            for row in rows {
                println!("{row}");
            }
            println!("Executed.");
        }
        Err(DbError::TableFull { .. }) => println!("Error: Table full."),
        Err(err) => println!("Error: {err}"),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = PagerConfig {
        // Bounded by the value parser, so the cast cannot truncate.
        max_pages: cli.max_pages as usize,
        sync_mode: cli.sync,
    };
    let mut table = Table::open(cli.db_path, config)?;

    let stdin = io::stdin();
    let mut stdin = stdin.lock();
    let mut input_buffer = InputBuffer::new();

    loop {
        print_prompt()?;
        if !input_buffer.read_input(&mut stdin)? {
            break;
        }

        match MetaCommands::parse(&input_buffer.buffer) {
            Some(MetaCommands::Exit) => break,
            Some(MetaCommands::Help) => print_help(),
            Some(MetaCommands::Unrecognized) => {
                println!("Unrecognized meta-command: {}", input_buffer.buffer);
            }
            None => run_statement(&input_buffer.buffer, &mut table),
        }
    }

    Ok(())
}
