use std::process;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::{error, info, warn};

use fakewkhtmltopdf::{Args, ChromeRenderer, Config, Error, INVOCATION, ParseError};

/// Report a fatal error on stderr and in the invocation log, then exit.
fn fail(err: Error) -> ! {
    match &err {
        Error::Parse(ParseError::Syntax(e)) => eprint!("{e}"),
        _ => eprintln!("Error: {err}"),
    }
    error!(target: INVOCATION, "Failed: Error: {err}");
    process::exit(err.exit_code());
}

fn main() {
    let argv: Vec<String> = std::env::args().collect();

    // Logging comes first so rejected command lines are still recorded.
    let (config, config_error) = match Config::discover() {
        Ok(config) => (config, None),
        Err(e) => (Config::compiled_default(), Some(e)),
    };

    let log_path = config.log.path();
    let quiet = fakewkhtmltopdf::quiet_requested(&argv);
    if let Some(e) = fakewkhtmltopdf::init_logging(quiet, log_path.as_deref()) {
        warn!("Cannot open invocation log: {e}");
    }

    info!(target: INVOCATION, "=== {} ===", chrono::Local::now().to_rfc3339());
    info!(target: INVOCATION, "Full command line: {}", argv.join(" "));

    if let Some(e) = config_error {
        fail(e);
    }

    let args = match Args::try_parse_from(&argv) {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => fail(ParseError::Syntax(e).into()),
    };

    let result = fakewkhtmltopdf::translate(args).and_then(|request| {
        info!(target: INVOCATION, "Input: {}", request.input);
        info!(target: INVOCATION, "Output: {}", request.output);
        info!(target: INVOCATION, "Render config: {:?}", request.config);

        let renderer = ChromeRenderer::new(config.renderer);
        fakewkhtmltopdf::render(&renderer, &request)
    });

    match result {
        Ok(()) => info!(target: INVOCATION, "Success: PDF created"),
        Err(e) => fail(e),
    }
}
