//! Convert scalar values between text and binary.
//!
//! Usage:
//!   cconv [-chilfgsbjpryuzodxqte] [-CHILFGSBJPRYUZODXQTE] value...
//!   cconv [options] -N FILE
//!
//! Lower-case letters configure the output, upper-case letters the input.
//! With `-N`, values are read one per line from FILE (`-` is stdin).

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use cconv_rs::{
    ConversionSpec, Quoting, RunConfig, ScalarType, SourceSelector, Style, TruncationPolicy, run,
};
use clap::error::ErrorKind;
use clap::{ArgAction, ArgGroup, CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

/// Exit status for command line mistakes.
const USAGE_EXIT: i32 = 200;

#[derive(Parser)]
#[command(name = "cconv")]
#[command(about = "Convert scalar values between text and binary")]
#[command(disable_help_flag = true)]
#[command(group(ArgGroup::new("output_type")))]
#[command(group(ArgGroup::new("input_type")))]
#[command(group(ArgGroup::new("output_style")))]
#[command(group(ArgGroup::new("input_style")))]
#[command(group(ArgGroup::new("output_quoting")))]
#[command(group(ArgGroup::new("input_quoting")))]
struct Cli {
    /// Output int
    #[arg(short = 'i', group = "output_type")]
    out_int: bool,
    /// Output long
    #[arg(short = 'l', group = "output_type")]
    out_long: bool,
    /// Output short
    #[arg(short = 'h', group = "output_type")]
    out_short: bool,
    /// Output char
    #[arg(short = 'c', group = "output_type")]
    out_char: bool,
    /// Output float
    #[arg(short = 'f', group = "output_type")]
    out_float: bool,
    /// Output double
    #[arg(short = 'g', group = "output_type")]
    out_double: bool,
    /// Output string
    #[arg(short = 's', group = "output_type")]
    out_string: bool,
    /// Output BCN code
    #[arg(short = 'b', group = "output_type")]
    out_bcn: bool,
    /// Output point name
    #[arg(short = 'p', group = "output_type")]
    out_point: bool,
    /// Output NordFloat
    #[arg(short = 'j', group = "output_type")]
    out_nord: bool,
    /// Output date
    #[arg(short = 'y', group = "output_type")]
    out_date: bool,
    /// Output raw bytes
    #[arg(short = 'r', group = "output_type")]
    out_raw: bool,

    /// Input int
    #[arg(short = 'I', group = "input_type")]
    in_int: bool,
    /// Input long
    #[arg(short = 'L', group = "input_type")]
    in_long: bool,
    /// Input short
    #[arg(short = 'H', group = "input_type")]
    in_short: bool,
    /// Input char
    #[arg(short = 'C', group = "input_type")]
    in_char: bool,
    /// Input float
    #[arg(short = 'F', group = "input_type")]
    in_float: bool,
    /// Input double
    #[arg(short = 'G', group = "input_type")]
    in_double: bool,
    /// Input string
    #[arg(short = 'S', group = "input_type")]
    in_string: bool,
    /// Input BCN code
    #[arg(short = 'B', group = "input_type")]
    in_bcn: bool,
    /// Input point name
    #[arg(short = 'P', group = "input_type")]
    in_point: bool,
    /// Input NordFloat
    #[arg(short = 'J', group = "input_type")]
    in_nord: bool,
    /// Input date
    #[arg(short = 'Y', group = "input_type")]
    in_date: bool,
    /// Input raw bytes
    #[arg(short = 'R', group = "input_type")]
    in_raw: bool,

    /// Output in binary
    #[arg(short = 'z', group = "output_style")]
    out_binary: bool,
    /// Output in octal
    #[arg(short = 'o', group = "output_style")]
    out_octal: bool,
    /// Output in decimal
    #[arg(short = 'd', group = "output_style")]
    out_decimal: bool,
    /// Output in hex
    #[arg(short = 'x', group = "output_style")]
    out_hex: bool,
    /// Input in binary
    #[arg(short = 'Z', group = "input_style")]
    in_binary: bool,
    /// Input in octal
    #[arg(short = 'O', group = "input_style")]
    in_octal: bool,
    /// Input in decimal
    #[arg(short = 'D', group = "input_style")]
    in_decimal: bool,
    /// Input in hex
    #[arg(short = 'X', group = "input_style")]
    in_hex: bool,

    /// Output unsigned, or dates in UTC
    #[arg(short = 'u')]
    out_unsigned: bool,
    /// Input unsigned, or dates in UTC
    #[arg(short = 'U')]
    in_unsigned: bool,
    /// Byte-swap the output
    #[arg(short = 'e')]
    out_swap: bool,
    /// Byte-swap the input
    #[arg(short = 'E')]
    in_swap: bool,

    /// Quote output strings for the shell
    #[arg(short = 'q', group = "output_quoting")]
    out_shell: bool,
    /// Quote output strings for Tcl
    #[arg(short = 't', group = "output_quoting")]
    out_tcl: bool,
    /// Accept shell-quoted input strings
    #[arg(short = 'Q', group = "input_quoting")]
    in_shell: bool,
    /// Accept Tcl-quoted input strings
    #[arg(short = 'T', group = "input_quoting")]
    in_tcl: bool,

    /// Read values from FILE, one per line (`-` for stdin)
    #[arg(short = 'N', value_name = "FILE", conflicts_with = "values")]
    file: Option<PathBuf>,

    /// Fail on input that ends part-way through a value
    #[arg(long)]
    strict: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Values to convert
    #[arg(allow_negative_numbers = true)]
    values: Vec<String>,
}

fn pick<T: Copy>(choices: &[(bool, T)]) -> Option<T> {
    choices.iter().find(|(set, _)| *set).map(|&(_, value)| value)
}

impl Cli {
    fn input_spec(&self) -> ConversionSpec {
        let scalar_type = pick(&[
            (self.in_int, ScalarType::Int),
            (self.in_long, ScalarType::Long),
            (self.in_short, ScalarType::Short),
            (self.in_char, ScalarType::Char),
            (self.in_float, ScalarType::Float),
            (self.in_double, ScalarType::Double),
            (self.in_string, ScalarType::String),
            (self.in_bcn, ScalarType::Bcn),
            (self.in_point, ScalarType::PointName),
            (self.in_nord, ScalarType::NordFloat),
            (self.in_date, ScalarType::Date),
            (self.in_raw, ScalarType::Raw),
        ]);
        let style = pick(&[
            (self.in_binary, Style::Binary),
            (self.in_octal, Style::Octal),
            (self.in_decimal, Style::Decimal),
            (self.in_hex, Style::Hex),
        ]);
        let quoting = pick(&[(self.in_shell, Quoting::Shell), (self.in_tcl, Quoting::Tcl)]);
        ConversionSpec::new(scalar_type.unwrap_or(ScalarType::Int))
            .with_style(style.unwrap_or_default())
            .with_quoting(quoting.unwrap_or_default())
            .unsigned(self.in_unsigned)
            .swapped(self.in_swap)
    }

    fn output_spec(&self) -> ConversionSpec {
        let scalar_type = pick(&[
            (self.out_int, ScalarType::Int),
            (self.out_long, ScalarType::Long),
            (self.out_short, ScalarType::Short),
            (self.out_char, ScalarType::Char),
            (self.out_float, ScalarType::Float),
            (self.out_double, ScalarType::Double),
            (self.out_string, ScalarType::String),
            (self.out_bcn, ScalarType::Bcn),
            (self.out_point, ScalarType::PointName),
            (self.out_nord, ScalarType::NordFloat),
            (self.out_date, ScalarType::Date),
            (self.out_raw, ScalarType::Raw),
        ]);
        let style = pick(&[
            (self.out_binary, Style::Binary),
            (self.out_octal, Style::Octal),
            (self.out_decimal, Style::Decimal),
            (self.out_hex, Style::Hex),
        ]);
        let quoting = pick(&[(self.out_shell, Quoting::Shell), (self.out_tcl, Quoting::Tcl)]);
        ConversionSpec::new(scalar_type.unwrap_or(ScalarType::Int))
            .with_style(style.unwrap_or_default())
            .with_quoting(quoting.unwrap_or_default())
            .unsigned(self.out_unsigned)
            .swapped(self.out_swap)
    }
}

fn usage_error(err: clap::Error) -> ! {
    let _ = err.print();
    let code = if err.use_stderr() { USAGE_EXIT } else { 0 };
    process::exit(code);
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::try_parse().unwrap_or_else(|err| usage_error(err));
    init_logging(cli.verbose);

    let source = match (&cli.file, cli.values.is_empty()) {
        (Some(path), _) => SourceSelector::File(path.clone()),
        (None, false) => SourceSelector::Arguments(cli.values.clone()),
        (None, true) => usage_error(
            Cli::command().error(ErrorKind::MissingRequiredArgument, "no values to convert"),
        ),
    };

    let truncation = if cli.strict {
        TruncationPolicy::Reject
    } else {
        TruncationPolicy::ZeroFill
    };
    let config = RunConfig::new(source)
        .with_input(cli.input_spec())
        .with_output(cli.output_spec())
        .with_truncation(truncation);

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    if let Err(e) = run(&config, &mut out) {
        let _ = out.flush();
        eprintln!("cconv: {e}");
        process::exit(1);
    }
}
