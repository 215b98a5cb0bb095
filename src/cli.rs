use clap::{Arg, Command};
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

use crate::report::{self, Summary};
use crate::{scan, ScanError, ScanRequest};

const ABOUT: &str = "Filter files that have been accessed less than Y seconds ago in directory X.";
const SEPARATOR: &str = "----------------------";

/// Exactly two positionals and no flags, so a directory named `-l` or a seconds value of `-60`
/// is taken as given.
pub fn command() -> Command {
    Command::new("recent-files")
        .about(ABOUT)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("directory")
                .value_name("X")
                .help("Directory to scan")
                .value_parser(clap::value_parser!(PathBuf))
                .allow_hyphen_values(true)
                .required(true),
        )
        .arg(
            Arg::new("seconds")
                .value_name("Y")
                .help("How many seconds back an access still counts; negative looks ahead")
                .allow_hyphen_values(true)
                .required(true),
        )
}

fn usage(program: &str) -> String {
    format!("{}\nUSAGE: {} <X> <Y>\n", ABOUT, program)
}

fn fail<W: Write>(out: &mut W, err: &ScanError, program: &str) -> anyhow::Result<u8> {
    writeln!(out, "ERROR: {}", err)?;
    if err.shows_usage() {
        writeln!(out, "{}", SEPARATOR)?;
        write!(out, "{}", usage(program))?;
    }
    Ok(1)
}

/// First line of clap's rendered error, without its `error: ` prefix.
fn argument_error(err: &clap::Error) -> ScanError {
    let rendered = err.render().to_string();
    let reason = rendered
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ");
    ScanError::InvalidArgument(format!("invalid arguments: {}", reason))
}

/// Parses `args` (program name first), runs the scan and writes the report to `out`.
/// Returns the process exit status.
pub fn run<I, T, W>(args: I, out: &mut W) -> anyhow::Result<u8>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let program = args
        .first()
        .map(|arg| arg.to_string_lossy().into_owned())
        .unwrap_or_else(|| "recent-files".to_string());

    let given = args.len().saturating_sub(1);
    if given != 2 {
        let err = ScanError::InvalidArgument(format!("expected exactly 2 arguments, got {}", given));
        return fail(out, &err, &program);
    }

    // `--` ends option parsing, so every value below is taken literally.
    let positionals = [
        args[0].clone(),
        OsString::from("--"),
        args[1].clone(),
        args[2].clone(),
    ];
    let matches = match command().try_get_matches_from(positionals) {
        Ok(matches) => matches,
        Err(err) => return fail(out, &argument_error(&err), &program),
    };

    let (Some(directory), Some(seconds)) = (
        matches.get_one::<PathBuf>("directory"),
        matches.get_one::<String>("seconds"),
    ) else {
        let err = ScanError::InvalidArgument("expected exactly 2 arguments".to_string());
        return fail(out, &err, &program);
    };

    let request = match ScanRequest::new(directory.clone(), seconds) {
        Ok(request) => request,
        Err(err) => return fail(out, &err, &program),
    };
    report::write_request(out, &request)?;

    let records = match scan(&request) {
        Ok(records) => records,
        Err(err) => return fail(out, &err, &program),
    };
    report::write_summary(out, &Summary::from_records(&records))?;

    Ok(0)
}
