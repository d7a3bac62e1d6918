use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::io::Read;
use std::process::ExitCode;
use svg_fill_tools::{
    clean_svg_string, compare_svg_content,
    constants::DEFAULT_DOWNLOAD_NAME,
    filler::{
        coerce_number, error_comment, is_blank, preview_or_placeholder,
        process_svg_to_path_filler,
    },
    FillParams, PartialFillParams,
};

#[derive(Debug, Default, PartialEq)]
struct Args {
    input: Option<String>,
    overrides: PartialFillParams,
    params_file: Option<String>,
    out: Option<String>,
    download: bool,
    report: bool,
    placeholder: bool,
    verbosity: u8,
}

#[derive(Debug, PartialEq)]
enum Invocation {
    Help,
    Run(Args),
}

fn usage() -> &'static str {
    "svg-fill\n\
\n\
USAGE:\n\
  svg-fill [--color <c>] [--percent <n>] [--left <n>] [--right <n>] [--top <n>] [--bottom <n>]\n\
           [--params <file.json>] [--out <path>] [--download] [--report] [--placeholder]\n\
           [-v|-vv] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - Input may be quoted and backslash-escaped (pasted from source code).\n\
  - Percent is clamped to 0..100; non-numeric values count as 0. Margins are not clamped.\n\
  - Defaults come from SVG_FILL_* environment variables (or .env), then --params, then flags.\n\
  - --download writes to ./tank-filled.svg unless --out is given.\n\
  - --report prints a Markdown diff of input vs output to stderr.\n\
  - --placeholder prints the placeholder artwork when the input is empty.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Invocation> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        let mut value = |flag: &str| -> Result<String> {
            match it.next() {
                Some(v) => Ok(v.clone()),
                None => bail!("missing value for {}", flag),
            }
        };
        match a.as_str() {
            "--help" | "-h" => return Ok(Invocation::Help),
            "--color" => args.overrides.fill_color = Some(value(a)?),
            "--percent" => args.overrides.fill_percent = Some(coerce_number(&value(a)?)),
            "--left" => args.overrides.offset_left = Some(coerce_number(&value(a)?)),
            "--right" => args.overrides.offset_right = Some(coerce_number(&value(a)?)),
            "--top" => args.overrides.offset_top = Some(coerce_number(&value(a)?)),
            "--bottom" => args.overrides.offset_bottom = Some(coerce_number(&value(a)?)),
            "--params" => args.params_file = Some(value(a)?),
            "--out" => args.out = Some(value(a)?),
            "--download" => args.download = true,
            "--report" => args.report = true,
            "--placeholder" => args.placeholder = true,
            "-v" => args.verbosity = args.verbosity.saturating_add(1),
            "-vv" => args.verbosity = args.verbosity.saturating_add(2),
            "-" => set_input(&mut args, a)?,
            flag if flag.starts_with('-') => bail!("unknown option {}", flag),
            path => set_input(&mut args, path)?,
        }
    }
    Ok(Invocation::Run(args))
}

fn set_input(args: &mut Args, path: &str) -> Result<()> {
    if args.input.is_some() {
        bail!("only one input may be given");
    }
    args.input = Some(path.to_string());
    Ok(())
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::builder()
        .filter_level(level) // Set default level
        .parse_default_env() // Allow RUST_LOG override
        .init();
}

/// Layers defaults, environment, the params file and flags, lowest precedence first.
fn resolve_params(args: &Args) -> Result<FillParams> {
    let mut params = FillParams::default()
        .merged(&PartialFillParams::from_lookup(|key| env::var(key).ok()));
    if let Some(path) = &args.params_file {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read params file {}", path))?;
        let from_file = PartialFillParams::from_json(&json)
            .with_context(|| format!("invalid params file {}", path))?;
        params = params.merged(&from_file);
    }
    Ok(params.merged(&args.overrides))
}

fn read_input(input: Option<&str>) -> Result<String> {
    match input {
        None | Some("-") => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
        Some(path) => fs::read_to_string(path).with_context(|| format!("failed to read {}", path)),
    }
}

/// Runs the transform; returns whether it succeeded.
fn run(args: &Args) -> Result<bool> {
    match dotenvy::dotenv() {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("Ignoring unreadable .env file: {}", e),
    }

    let params = resolve_params(args)?;
    log::info!(
        "Filling with {} at {}% (margins L{} R{} T{} B{})",
        params.fill_color,
        params.clamped_percent(),
        params.offset_left,
        params.offset_right,
        params.offset_top,
        params.offset_bottom
    );

    let raw = read_input(args.input.as_deref())?;
    let cleaned = clean_svg_string(&raw);

    let (processed, ok) = if is_blank(&raw) {
        log::warn!("Input is empty; nothing to fill");
        (String::new(), true)
    } else {
        match process_svg_to_path_filler(&cleaned, &params) {
            Ok(svg) => (svg, true),
            Err(e) => {
                log::error!("SVG fill failed: {}", e);
                (error_comment(&e), false)
            }
        }
    };

    let out_path = args
        .out
        .clone()
        .or_else(|| args.download.then(|| DEFAULT_DOWNLOAD_NAME.to_string()));

    if args.report && ok && !processed.is_empty() {
        let report = compare_svg_content(
            &cleaned,
            &processed,
            args.input.as_deref().unwrap_or("stdin.svg"),
            out_path.as_deref().unwrap_or(DEFAULT_DOWNLOAD_NAME),
        )?;
        eprint!("{}", report.markdown_report);
    }

    let output = if args.placeholder {
        preview_or_placeholder(&processed)
    } else {
        processed.as_str()
    };

    match out_path {
        Some(path) => {
            fs::write(&path, output).with_context(|| format!("failed to write {}", path))?;
            log::info!("SVG saved to {}", path);
        }
        None => println!("{}", output),
    }
    Ok(ok)
}

fn main() -> ExitCode {
    let argv: Vec<String> = env::args().collect();
    let args = match parse_args(&argv) {
        Ok(Invocation::Help) => {
            print!("{}", usage());
            return ExitCode::SUCCESS;
        }
        Ok(Invocation::Run(args)) => args,
        Err(e) => {
            eprintln!("error: {}\n\n{}", e, usage());
            return ExitCode::from(2);
        }
    };

    init_logger(args.verbosity);

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("svg-fill")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    fn run_args(args: &[&str]) -> Args {
        match parse_args(&argv(args)).expect("valid arguments") {
            Invocation::Run(args) => args,
            Invocation::Help => panic!("unexpected help"),
        }
    }

    #[test]
    fn test_parse_args_defaults() {
        assert_eq!(run_args(&[]), Args::default());
    }

    #[test]
    fn test_parse_args_fill_flags() {
        let args = run_args(&[
            "--color", "#ff0000", "--percent", "75", "--left", "10", "--right", "abc", "--top",
            "5", "--bottom", "2.5", "tank.svg",
        ]);
        assert_eq!(args.input.as_deref(), Some("tank.svg"));
        assert_eq!(args.overrides.fill_color.as_deref(), Some("#ff0000"));
        assert_eq!(args.overrides.fill_percent, Some(75.0));
        assert_eq!(args.overrides.offset_left, Some(10.0));
        assert_eq!(args.overrides.offset_right, Some(0.0));
        assert_eq!(args.overrides.offset_top, Some(5.0));
        assert_eq!(args.overrides.offset_bottom, Some(2.5));
    }

    #[test]
    fn test_parse_args_switches() {
        let args = run_args(&["--download", "--report", "--placeholder", "-vv", "-"]);
        assert!(args.download && args.report && args.placeholder);
        assert_eq!(args.verbosity, 2);
        assert_eq!(args.input.as_deref(), Some("-"));
    }

    #[test]
    fn test_parse_args_help_and_errors() {
        assert_eq!(
            parse_args(&argv(&["--help"])).expect("help parses"),
            Invocation::Help
        );
        assert!(parse_args(&argv(&["--percent"])).is_err());
        assert!(parse_args(&argv(&["--bogus"])).is_err());
        assert!(parse_args(&argv(&["a.svg", "b.svg"])).is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = run_args(&["--percent", "20", "--color", "navy"]);
        let params = FillParams::default().merged(&args.overrides);
        assert_eq!(params.fill_color, "navy");
        assert_eq!(params.fill_percent, 20.0);
        assert_eq!(params.offset_left, 0.0);
    }
}
