//! A wkhtmltopdf-compatible command line over a headless Chromium renderer.
//!
//! The pipeline is a single pass: [`parse`] turns argv tokens into an
//! [`InvocationRequest`], and [`render`] hands it to a [`Renderer`] and
//! writes the PDF to the requested output.

mod chrome;
mod cli;
mod config;
mod error;
mod logging;
mod options;
mod render;
mod request;

pub use chrome::{ChromeRenderer, ignored_flags, print_options};
pub use cli::{Args, quiet_requested};
pub use config::{CONFIG_ENV, Config, LogConfig, RendererConfig};
pub use error::{ConversionError, Error, ParseError, Result};
pub use logging::{INVOCATION, init as init_logging};
pub use options::{Measurement, NamedValue, Orientation, PageSize, ViewportSize};
pub use render::{Renderer, check_input, render};
pub use request::{
    Decoration, Input, InvocationRequest, Margins, Output, RenderConfig, parse, translate,
};
