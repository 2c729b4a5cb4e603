use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use afe_core::error::{AfeError, AfeResult};
use afe_core::render::ReportView;
use afe_core::report::parse_report;
use afe_core::resolve::tool::DEVKITPRO_ADDR2LINE;
use afe_core::resolve::{
    Addr2LineResolver, Addr2LineTool, AddressResolver, DwarfResolver, DwarfSymbolizer, PlainResolver,
};
use afe_utils::{debug, info, init_logging_with_format, init_logging_with_level, warn, LogFormat, LogLevel};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};

/// Decode and print Atmosphère fatal-error reports.
#[derive(Parser, Debug)]
#[command(name = "afe")]
#[command(version)]
#[command(about = "Decode and print Atmosphère fatal-error (AFE) crash reports", long_about = None)]
struct Cli
{
    /// Path to the AFE report file
    #[arg(short, long)]
    report: PathBuf,

    /// ELF file carrying the symbols of the crashed module
    #[arg(short, long, env = "AFE_ELF")]
    elf: Option<PathBuf>,

    /// Path to the addr2line executable (default: devkitPro's, if installed)
    #[arg(long, env = "AFE_ADDR2LINE")]
    addr2line: Option<PathBuf>,

    /// How code addresses are described
    #[arg(long, value_enum, env = "AFE_RESOLVER", default_value_t = ResolverChoice::Auto)]
    resolver: ResolverChoice,

    /// Log level (error, warn, info, debug, trace); defaults to RUST_LOG or warn
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Log format (pretty or json)
    #[arg(long, env = "AFE_LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ResolverChoice
{
    /// addr2line when both an ELF and the tool are available, plain otherwise
    Auto,
    /// Address and module offset only
    None,
    /// Run an external addr2line per address
    Addr2line,
    /// Read the ELF's DWARF in-process
    Dwarf,
}

/// The resolver picked for this run, with what the banner says about it.
struct Selection
{
    name: &'static str,
    tool: Option<PathBuf>,
    resolver: Box<dyn AddressResolver>,
}

enum SelectError
{
    MissingElf(ResolverChoice),
    Symbols(AfeError),
}

/// Exit status for an unreadable or invalid report
const EXIT_FAILURE: u8 = 1;

/// Exit status for a usage error, as clap reports it
const EXIT_USAGE: u8 = 2;

fn main() -> ExitCode
{
    let cli = Cli::parse();

    let format = cli.log_format.unwrap_or_default();
    let logging = match cli.log_level {
        Some(level) => init_logging_with_level(level, format),
        None => init_logging_with_format(format),
    };
    // Dropped when main returns, flushing the log file on every exit path
    let _guard = match logging {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    ExitCode::from(execute(&cli))
}

/// Run the command and return the process exit status
fn execute(cli: &Cli) -> u8
{
    let selection = match select_resolver(cli) {
        Ok(selection) => selection,
        Err(SelectError::MissingElf(choice)) => {
            let name = choice.to_possible_value().map(|v| v.get_name().to_string()).unwrap_or_default();
            let err = Cli::command().error(
                ErrorKind::MissingRequiredArgument,
                format!("--resolver {name} requires --elf <PATH>"),
            );
            if let Err(e) = err.print() {
                warn!("failed to print usage error: {e}");
            }
            return EXIT_USAGE;
        }
        Err(SelectError::Symbols(e)) => {
            eprintln!("Error: {e}");
            return EXIT_FAILURE;
        }
    };

    print!("{}", banner(&cli.report, cli.elf.as_deref(), &selection));

    match run(&cli.report, selection.resolver.as_ref()) {
        Ok(()) => 0,
        Err(e) => {
            match e {
                AfeError::UnrecognizedFormat { .. } | AfeError::UnknownVersion(_) => println!("{e}"),
                other => eprintln!("Error: {other}"),
            }
            EXIT_FAILURE
        }
    }
}

fn run(report_path: &Path, resolver: &dyn AddressResolver) -> AfeResult<()>
{
    let bytes = std::fs::read(report_path)?;
    info!(path = %report_path.display(), len = bytes.len(), "read report");

    let report = parse_report(&bytes)?;
    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", ReportView::new(&report, resolver))?;
    stdout.flush()?;
    Ok(())
}

fn select_resolver(cli: &Cli) -> Result<Selection, SelectError>
{
    let tool = cli.addr2line.clone().or_else(|| {
        let default = PathBuf::from(DEVKITPRO_ADDR2LINE);
        default.is_file().then_some(default)
    });
    debug!(choice = ?cli.resolver, tool = ?tool, elf = ?cli.elf, "selecting resolver");

    match (cli.resolver, &cli.elf) {
        (ResolverChoice::None, _) | (ResolverChoice::Auto, None) => Ok(plain()),
        (ResolverChoice::Auto, Some(elf)) => match tool {
            Some(tool) => Ok(addr2line(tool, elf)),
            None => {
                warn!("no addr2line found, falling back to plain addresses");
                Ok(plain())
            }
        },
        (ResolverChoice::Addr2line, Some(elf)) => {
            let tool = tool.unwrap_or_else(|| PathBuf::from(DEVKITPRO_ADDR2LINE));
            if !tool.is_file() {
                warn!(tool = %tool.display(), "addr2line executable not found; every address will fail to resolve");
            }
            Ok(addr2line(tool, elf))
        }
        (ResolverChoice::Dwarf, Some(elf)) => {
            let symbols = DwarfSymbolizer::load(elf).map_err(SelectError::Symbols)?;
            Ok(Selection {
                name: "DwarfResolver",
                tool: None,
                resolver: Box::new(DwarfResolver::new(symbols)),
            })
        }
        (choice, None) => Err(SelectError::MissingElf(choice)),
    }
}

fn plain() -> Selection
{
    Selection {
        name: "PlainResolver",
        tool: None,
        resolver: Box::new(PlainResolver),
    }
}

fn addr2line(tool: PathBuf, elf: &Path) -> Selection
{
    Selection {
        name: "Addr2LineResolver",
        tool: Some(tool.clone()),
        resolver: Box::new(Addr2LineResolver::new(Addr2LineTool::new(tool, elf))),
    }
}

fn banner(report: &Path, elf: Option<&Path>, selection: &Selection) -> String
{
    let elf = elf.map_or_else(|| "(none)".to_string(), |p| p.display().to_string());
    let tool = selection.tool.as_deref().map(|p| p.display().to_string()).unwrap_or_default();
    format!(
        "Report file    : {}\nELF file       : {elf}\nResolver type  : {} ({tool})\n{}\n",
        report.display(),
        selection.name,
        "-".repeat(63)
    )
}
