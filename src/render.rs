//! The render seam: hand a request to a backend and deliver its PDF bytes.

use std::fs;
use std::io::Write;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::request::{Input, InvocationRequest, Output, RenderConfig};

/// An HTML-to-PDF engine.
pub trait Renderer {
    /// Render `input` with `config` and return the PDF document bytes.
    fn render(&self, config: &RenderConfig, input: &Input) -> Result<Vec<u8>>;
}

/// Check a local input exists and is readable before any backend starts.
pub fn check_input(input: &Input) -> Result<()> {
    if let Input::File(path) = input {
        let shown = path.display().to_string();
        let meta = fs::metadata(path).map_err(|e| Error::input(&shown, e.to_string()))?;
        if !meta.is_file() {
            return Err(Error::input(&shown, "not a regular file"));
        }
        fs::File::open(path).map_err(|e| Error::input(&shown, e.to_string()))?;
    }
    Ok(())
}

/// Run one request through `renderer` and write the result to its output.
pub fn render(renderer: &dyn Renderer, request: &InvocationRequest) -> Result<()> {
    check_input(&request.input)?;
    info!("Converting {} to {}...", request.input, request.output);

    let pdf = renderer.render(&request.config, &request.input)?;
    debug!(bytes = pdf.len(), "renderer returned document");

    write_output(&request.output, &pdf)?;
    info!("Successfully created {}", request.output);
    Ok(())
}

fn write_output(output: &Output, pdf: &[u8]) -> Result<()> {
    match output {
        Output::File(path) => fs::write(path, pdf).map_err(|source| Error::Output {
            path: path.clone(),
            source,
        }),
        Output::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(pdf)
                .and_then(|()| stdout.flush())
                .map_err(|source| Error::Output {
                    path: "-".into(),
                    source,
                })
        }
    }
}
