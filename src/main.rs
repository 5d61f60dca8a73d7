use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use rowstore::command::{InputType, MetaCommands};
use rowstore::{Outcome, PagedStore, ROW_SIZE, StoreConfig, execute};

/// In-memory row store with a tiny SQL-like prompt
#[derive(Parser, Debug)]
#[command(name = "rowstore", version, about)]
struct Args {
    /// Size of a page in bytes
    #[arg(long, default_value_t = rowstore::PAGE_SIZE, env = "ROWSTORE_PAGE_SIZE")]
    page_size: usize,

    /// Maximum number of pages the table may allocate
    #[arg(long, default_value_t = rowstore::TABLE_MAX_PAGES, env = "ROWSTORE_MAX_PAGES")]
    max_pages: usize,

    /// Log level (trace, debug, info, warn, error); logs go to stderr
    #[arg(long, default_value = "warn", env = "ROWSTORE_LOG")]
    log_level: String,
}

impl Args {
    fn store_config(&self) -> StoreConfig {
        StoreConfig {
            page_size: self.page_size,
            max_pages: self.max_pages,
        }
    }
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

    /// Reads the next line, returning `false` once stdin is exhausted.
    fn read_input(&mut self, input: &mut impl BufRead) -> io::Result<bool> {
        self.buffer.clear();
        let bytes_read = input.read_line(&mut self.buffer)?;
        self.buffer = self.buffer.trim().to_string();
        Ok(bytes_read > 0)
    }
}

enum Flow {
    Continue,
    Exit,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(format!("rowstore={level}"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn print_prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "db > ")?;
    out.flush()
}

fn print_constants(out: &mut impl Write, store: &PagedStore) -> io::Result<()> {
    let config = store.config();
    writeln!(out, "Constants:")?;
    writeln!(out, "ROW_SIZE: {ROW_SIZE}")?;
    writeln!(out, "PAGE_SIZE: {}", config.page_size)?;
    writeln!(out, "ROWS_PER_PAGE: {}", store.rows_per_page())?;
    writeln!(out, "TABLE_MAX_PAGES: {}", config.max_pages)?;
    writeln!(out, "TABLE_MAX_ROWS: {}", store.capacity())
}

fn handle_line(line: &str, store: &mut PagedStore, out: &mut impl Write) -> io::Result<Flow> {
    match InputType::parse(line) {
        InputType::Meta(MetaCommands::Exit) => return Ok(Flow::Exit),
        InputType::Meta(MetaCommands::Constants) => print_constants(out, store)?,
        InputType::Meta(MetaCommands::Unrecognized) => {
            writeln!(out, "Unrecognized meta-command: {line}")?;
        }
        InputType::Statement(Err(err)) => {
            debug!(%err, "rejected input");
            writeln!(out, "{err}")?;
        }
        InputType::Statement(Ok(statement)) => match execute(&statement, store) {
            Ok(Outcome::Inserted) => writeln!(out, "Executed.")?,
            Ok(Outcome::Rows(rows)) => {
                for row in rows {
                    writeln!(out, "{row}")?;
                }
                writeln!(out, "Executed.")?;
            }
            Err(err) => writeln!(out, "{err}")?,
        },
    }
    Ok(Flow::Continue)
}

fn run(store: &mut PagedStore) -> io::Result<bool> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout().lock();
    let mut input_buffer = InputBuffer::new();

    loop {
        print_prompt(&mut out)?;
        if !input_buffer.read_input(&mut input)? {
            return Ok(false);
        }

        if let Flow::Exit = handle_line(&input_buffer.buffer, store, &mut out)? {
            return Ok(true);
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    let mut store = match PagedStore::with_config(args.store_config()) {
        Ok(store) => store,
        Err(err) => {
            error!(%err, "invalid table configuration");
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match run(&mut store) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            eprintln!("Error reading input");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!(%err, "I/O failure");
            eprintln!("Error reading input: {err}");
            ExitCode::FAILURE
        }
    }
}
