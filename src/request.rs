//! Translation from scanned arguments to an `InvocationRequest`.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use clap::Parser;
use url::Url;

use crate::cli::{Args, flag_pair};
use crate::error::{ConversionError, ParseError, Result};
use crate::options::{
    Measurement, NamedValue, Orientation, PageSize, ViewportSize, convert, convert_opt,
    parse_positive_int, parse_zoom,
};

/// Where the HTML comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Url(Url),
    File(PathBuf),
}

impl Input {
    /// A token is a URL when it has a scheme and a host, or uses `file:`.
    /// Anything else, including `C:\page.html`, is a local path.
    pub fn from_token(token: &str) -> Self {
        match Url::parse(token) {
            Ok(url) if url.has_host() || url.scheme() == "file" => Input::Url(url),
            _ => Input::File(PathBuf::from(token)),
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self, Input::Url(_))
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Url(url) => write!(f, "{url}"),
            Input::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Where the PDF goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    pub fn from_token(token: &str) -> Self {
        if token == "-" {
            Output::Stdout
        } else {
            Output::File(PathBuf::from(token))
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Stdout => f.write_str("-"),
            Output::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: Measurement,
    pub right: Measurement,
    pub bottom: Measurement,
    pub left: Measurement,
}

impl Default for Margins {
    fn default() -> Self {
        let ten = Measurement::from_mm(10.0);
        Self {
            top: ten,
            right: ten,
            bottom: ten,
            left: ten,
        }
    }
}

/// Text and decoration for the page header or footer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Decoration {
    pub left: Option<String>,
    pub center: Option<String>,
    pub right: Option<String>,
    pub spacing: Option<Measurement>,
    pub line: bool,
}

impl Decoration {
    pub fn has_text(&self) -> bool {
        self.left.is_some() || self.center.is_some() || self.right.is_some()
    }
}

/// Everything the renderer needs to know, one field per recognized flag.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub page_size: PageSize,
    pub orientation: Orientation,
    pub margins: Margins,
    pub zoom: f64,
    pub dpi: u32,
    pub grayscale: bool,
    pub low_quality: bool,
    pub title: Option<String>,
    pub encoding: String,
    pub smart_shrinking: bool,
    pub load_images: bool,
    pub javascript: bool,
    pub stop_slow_scripts: bool,
    pub debug_javascript: bool,
    pub print_media_type: bool,
    pub background: bool,
    pub viewport: Option<ViewportSize>,
    pub window_status: Option<String>,
    pub header: Decoration,
    pub footer: Decoration,
    pub toc: bool,
    pub toc_depth: u32,
    pub cover: Option<String>,
    pub outline: bool,
    pub outline_depth: u32,
    pub cookies: Vec<NamedValue>,
    pub custom_headers: Vec<NamedValue>,
    pub custom_header_propagation: bool,
    pub user_style_sheet: Option<String>,
    pub allowed_paths: Vec<PathBuf>,
    pub local_file_access: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
            margins: Margins::default(),
            zoom: 1.0,
            dpi: 96,
            grayscale: false,
            low_quality: false,
            title: None,
            encoding: "utf-8".to_string(),
            smart_shrinking: true,
            load_images: true,
            javascript: true,
            stop_slow_scripts: true,
            debug_javascript: false,
            print_media_type: false,
            background: true,
            viewport: None,
            window_status: None,
            header: Decoration::default(),
            footer: Decoration::default(),
            toc: false,
            toc_depth: 3,
            cover: None,
            outline: true,
            outline_depth: 4,
            cookies: Vec::new(),
            custom_headers: Vec::new(),
            custom_header_propagation: false,
            user_style_sheet: None,
            allowed_paths: Vec::new(),
            local_file_access: true,
        }
    }
}

/// One fully validated command-line invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    pub config: RenderConfig,
    pub input: Input,
    pub output: Output,
    pub quiet: bool,
}

/// Scan `tokens` (without the program name) and build a request.
pub fn parse<I, T>(tokens: I) -> Result<InvocationRequest>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let argv = std::iter::once(OsString::from("wkhtmltopdf")).chain(tokens.into_iter().map(Into::into));
    let args = Args::try_parse_from(argv).map_err(ParseError::Syntax)?;
    translate(args)
}

/// Validate positionals and convert every option value.
pub fn translate(args: Args) -> Result<InvocationRequest> {
    let input = args.input.as_deref().ok_or(ParseError::MissingInput)?;
    let output = args.output.as_deref().ok_or(ParseError::MissingOutput)?;
    let config = build_config(&args)?;

    Ok(InvocationRequest {
        config,
        input: Input::from_token(input),
        output: Output::from_token(output),
        quiet: args.quiet,
    })
}

fn measurement(s: &str) -> std::result::Result<Measurement, String> {
    s.parse()
}

fn named_values(
    flag: &'static str,
    raw: &[String],
) -> std::result::Result<Vec<NamedValue>, ConversionError> {
    raw.iter()
        .map(|r| convert(flag, r, |s| s.parse::<NamedValue>()))
        .collect()
}

fn decoration(
    (left, center, right): (&Option<String>, &Option<String>, &Option<String>),
    spacing: (&'static str, Option<&str>),
    line: bool,
) -> std::result::Result<Decoration, ConversionError> {
    Ok(Decoration {
        left: left.clone(),
        center: center.clone(),
        right: right.clone(),
        spacing: convert_opt(spacing.0, spacing.1, measurement)?,
        line,
    })
}

fn build_config(args: &Args) -> std::result::Result<RenderConfig, ConversionError> {
    let defaults = RenderConfig::default();
    let or = |value: Option<Measurement>, fallback: Measurement| value.unwrap_or(fallback);

    Ok(RenderConfig {
        page_size: convert_opt("page-size", args.page_size.as_deref(), str::parse)?
            .unwrap_or(defaults.page_size),
        orientation: convert_opt("orientation", args.orientation.as_deref(), str::parse)?
            .unwrap_or(defaults.orientation),
        margins: Margins {
            top: or(
                convert_opt("margin-top", args.margin_top.as_deref(), measurement)?,
                defaults.margins.top,
            ),
            right: or(
                convert_opt("margin-right", args.margin_right.as_deref(), measurement)?,
                defaults.margins.right,
            ),
            bottom: or(
                convert_opt("margin-bottom", args.margin_bottom.as_deref(), measurement)?,
                defaults.margins.bottom,
            ),
            left: or(
                convert_opt("margin-left", args.margin_left.as_deref(), measurement)?,
                defaults.margins.left,
            ),
        },
        zoom: convert_opt("zoom", args.zoom.as_deref(), parse_zoom)?.unwrap_or(defaults.zoom),
        dpi: convert_opt("dpi", args.dpi.as_deref(), parse_positive_int)?.unwrap_or(defaults.dpi),
        grayscale: args.grayscale,
        low_quality: args.lowquality,
        title: args.title.clone(),
        encoding: args.encoding.clone().unwrap_or(defaults.encoding),
        smart_shrinking: flag_pair(
            args.enable_smart_shrinking,
            args.disable_smart_shrinking,
            defaults.smart_shrinking,
        ),
        load_images: flag_pair(args.images, args.no_images, defaults.load_images),
        javascript: flag_pair(
            args.enable_javascript,
            args.disable_javascript,
            defaults.javascript,
        ),
        stop_slow_scripts: flag_pair(
            args.stop_slow_scripts,
            args.no_stop_slow_scripts,
            defaults.stop_slow_scripts,
        ),
        debug_javascript: args.debug_javascript,
        print_media_type: flag_pair(
            args.print_media_type,
            args.no_print_media_type,
            defaults.print_media_type,
        ),
        background: flag_pair(args.background, args.no_background, defaults.background),
        viewport: convert_opt("viewport-size", args.viewport_size.as_deref(), str::parse)?,
        window_status: args.window_status.clone(),
        header: decoration(
            (&args.header_left, &args.header_center, &args.header_right),
            ("header-spacing", args.header_spacing.as_deref()),
            args.header_line,
        )?,
        footer: decoration(
            (&args.footer_left, &args.footer_center, &args.footer_right),
            ("footer-spacing", args.footer_spacing.as_deref()),
            args.footer_line,
        )?,
        toc: args.toc,
        toc_depth: convert_opt("toc-depth", args.toc_depth.as_deref(), parse_positive_int)?
            .unwrap_or(defaults.toc_depth),
        cover: args.cover.clone(),
        outline: flag_pair(args.outline, args.no_outline, defaults.outline),
        outline_depth: convert_opt(
            "outline-depth",
            args.outline_depth.as_deref(),
            parse_positive_int,
        )?
        .unwrap_or(defaults.outline_depth),
        cookies: named_values("cookie", &args.cookies)?,
        custom_headers: named_values("custom-header", &args.custom_headers)?,
        custom_header_propagation: flag_pair(
            args.custom_header_propagation,
            args.no_custom_header_propagation,
            defaults.custom_header_propagation,
        ),
        user_style_sheet: args.user_style_sheet.clone(),
        allowed_paths: args.allowed_paths.iter().map(PathBuf::from).collect(),
        local_file_access: flag_pair(
            args.enable_local_file_access,
            args.disable_local_file_access,
            defaults.local_file_access,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn request(tokens: &[&str]) -> InvocationRequest {
        parse(tokens.iter().copied()).unwrap()
    }

    fn conversion_flag(tokens: &[&str]) -> &'static str {
        match parse(tokens.iter().copied()) {
            Err(Error::Conversion(e)) => e.flag,
            other => panic!("expected conversion error, got {other:?}"),
        }
    }

    #[test]
    fn defaults_when_only_positionals_given() {
        let req = request(&["input.html", "output.pdf"]);
        assert_eq!(req.config, RenderConfig::default());
        assert_eq!(req.input, Input::File(PathBuf::from("input.html")));
        assert_eq!(req.output, Output::File(PathBuf::from("output.pdf")));
        assert!(!req.quiet);
    }

    #[test]
    fn page_size_orientation_and_url_input() {
        let req = request(&[
            "--page-size",
            "A4",
            "--orientation",
            "Landscape",
            "https://example.com",
            "out.pdf",
        ]);
        assert_eq!(req.config.page_size, PageSize::A4);
        assert_eq!(req.config.orientation, Orientation::Landscape);
        assert!(req.input.is_url());
        assert_eq!(req.input.to_string(), "https://example.com/");
    }

    #[test]
    fn lowercase_page_size_equals_uppercase() {
        let lower = request(&["--page-size", "a4", "a", "b"]);
        let upper = request(&["--page-size", "A4", "a", "b"]);
        assert_eq!(lower.config.page_size, upper.config.page_size);
    }

    #[test]
    fn margins_are_normalized() {
        let mm = request(&["--margin-top", "20mm", "--margin-bottom", "20mm", "a", "b"]);
        let cm = request(&["--margin-top", "2cm", "a", "b"]);
        assert_eq!(mm.config.margins.top, cm.config.margins.top);
        assert_eq!(mm.config.margins.bottom.mm(), 20.0);
        assert_eq!(mm.config.margins.left.mm(), 10.0);
    }

    #[test]
    fn boolean_flags_default_false_and_set_true() {
        let plain = request(&["a", "b"]);
        assert!(!plain.config.grayscale);
        assert!(!plain.quiet);

        let set = request(&["--grayscale", "--quiet", "a", "b"]);
        assert!(set.config.grayscale);
        assert!(set.quiet);
        assert_eq!(set.input, Input::File(PathBuf::from("a")));
        assert_eq!(set.output, Output::File(PathBuf::from("b")));
    }

    #[test]
    fn title_passes_through_unmodified() {
        let req = request(&["--title", "  Q3 Report: <draft>  ", "a", "b"]);
        assert_eq!(req.config.title.as_deref(), Some("  Q3 Report: <draft>  "));
    }

    #[test]
    fn invalid_values_name_their_flag() {
        assert_eq!(conversion_flag(&["--zoom", "notanumber", "a", "b"]), "zoom");
        assert_eq!(conversion_flag(&["--zoom", "-2", "a", "b"]), "zoom");
        assert_eq!(conversion_flag(&["--dpi", "0", "a", "b"]), "dpi");
        assert_eq!(conversion_flag(&["--page-size", "A11", "a", "b"]), "page-size");
        assert_eq!(conversion_flag(&["--orientation", "up", "a", "b"]), "orientation");
        assert_eq!(conversion_flag(&["--margin-left", "wide", "a", "b"]), "margin-left");
        assert_eq!(conversion_flag(&["--cookie", "bare", "a", "b"]), "cookie");
        assert_eq!(
            conversion_flag(&["--footer-spacing", "x", "a", "b"]),
            "footer-spacing"
        );
    }

    #[test]
    fn missing_positionals_are_parse_errors() {
        assert!(matches!(
            parse(Vec::<&str>::new()),
            Err(Error::Parse(ParseError::MissingInput))
        ));
        assert!(matches!(
            parse(["input.html"]),
            Err(Error::Parse(ParseError::MissingOutput))
        ));
        assert!(matches!(
            parse(["a", "b", "c"]),
            Err(Error::Parse(ParseError::Syntax(_)))
        ));
        assert!(matches!(
            parse(["--margin-top"]),
            Err(Error::Parse(ParseError::Syntax(_)))
        ));
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(matches!(
            parse(["--no-such-flag", "a", "b"]),
            Err(Error::Parse(ParseError::Syntax(_)))
        ));
    }

    #[test]
    fn dash_output_means_stdout() {
        assert_eq!(request(&["a", "-"]).output, Output::Stdout);
    }

    #[test]
    fn input_kind_detection() {
        assert!(Input::from_token("http://example.com/page").is_url());
        assert!(Input::from_token("file:///tmp/page.html").is_url());
        assert!(!Input::from_token("page.html").is_url());
        assert!(!Input::from_token("C:\\docs\\page.html").is_url());
        assert!(!Input::from_token("/tmp/page.html").is_url());
    }

    #[test]
    fn headers_footers_and_repeatables() {
        let req = request(&[
            "--header-center",
            "[title]",
            "--footer-right",
            "[page]/[topage]",
            "--footer-spacing",
            "5",
            "--footer-line",
            "--custom-header",
            "X-Api-Key: 123",
            "--cookie",
            "sid=abc",
            "--allow",
            "/srv/assets",
            "a",
            "b",
        ]);
        assert_eq!(req.config.header.center.as_deref(), Some("[title]"));
        assert!(req.config.header.has_text());
        assert_eq!(req.config.footer.right.as_deref(), Some("[page]/[topage]"));
        assert_eq!(req.config.footer.spacing, Some(Measurement::from_mm(5.0)));
        assert!(req.config.footer.line);
        assert_eq!(req.config.custom_headers[0].name, "X-Api-Key");
        assert_eq!(req.config.cookies[0].value, "abc");
        assert_eq!(req.config.allowed_paths, vec![PathBuf::from("/srv/assets")]);
    }

    #[test]
    fn disable_flags_flip_defaults() {
        let req = request(&[
            "--disable-javascript",
            "--no-images",
            "--no-outline",
            "--no-background",
            "--disable-local-file-access",
            "--print-media-type",
            "a",
            "b",
        ]);
        assert!(!req.config.javascript);
        assert!(!req.config.load_images);
        assert!(!req.config.outline);
        assert!(!req.config.background);
        assert!(!req.config.local_file_access);
        assert!(req.config.print_media_type);
    }
}
