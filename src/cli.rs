//! Raw command-line scanning in the wkhtmltopdf vocabulary.
//!
//! Values are kept as text here; typed conversion lives in `request` so a
//! bad value is reported as a conversion failure rather than a usage error.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "wkhtmltopdf", version)]
#[command(about = "Convert HTML to PDF with a wkhtmltopdf-compatible command line")]
#[command(allow_negative_numbers = true)]
#[command(after_help = "Examples:
  wkhtmltopdf input.html output.pdf
  wkhtmltopdf --page-size A4 --orientation Portrait input.html output.pdf
  wkhtmltopdf --margin-top 20mm --margin-bottom 20mm input.html output.pdf
  wkhtmltopdf https://example.com - > page.pdf")]
pub struct Args {
    /// Input HTML file or URL
    pub input: Option<String>,

    /// Output PDF file ("-" for standard output)
    pub output: Option<String>,

    /// Set paper size (default: A4)
    #[arg(short = 's', long, value_name = "SIZE")]
    pub page_size: Option<String>,

    /// Set orientation to Portrait or Landscape (default: Portrait)
    #[arg(short = 'O', long)]
    pub orientation: Option<String>,

    /// Set the page top margin (default: 10mm)
    #[arg(short = 'T', long, value_name = "UNITREAL")]
    pub margin_top: Option<String>,

    /// Set the page right margin (default: 10mm)
    #[arg(short = 'R', long, value_name = "UNITREAL")]
    pub margin_right: Option<String>,

    /// Set the page bottom margin (default: 10mm)
    #[arg(short = 'B', long, value_name = "UNITREAL")]
    pub margin_bottom: Option<String>,

    /// Set the page left margin (default: 10mm)
    #[arg(short = 'L', long, value_name = "UNITREAL")]
    pub margin_left: Option<String>,

    /// Use this zoom factor (default: 1.0)
    #[arg(long, value_name = "FLOAT")]
    pub zoom: Option<String>,

    /// Change the dpi explicitly (default: 96)
    #[arg(long, value_name = "DPI")]
    pub dpi: Option<String>,

    /// PDF will be generated in grayscale
    #[arg(short = 'g', long)]
    pub grayscale: bool,

    /// Generates lower quality pdf
    #[arg(short = 'l', long)]
    pub lowquality: bool,

    /// The title of the generated pdf file
    #[arg(long)]
    pub title: Option<String>,

    /// Be less verbose
    #[arg(short, long)]
    pub quiet: bool,

    /// Set the default text encoding (default: utf-8)
    #[arg(long)]
    pub encoding: Option<String>,

    /// Enable the intelligent shrinking strategy (default)
    #[arg(long, overrides_with = "disable_smart_shrinking")]
    pub enable_smart_shrinking: bool,

    /// Disable the intelligent shrinking strategy
    #[arg(long, overrides_with = "enable_smart_shrinking")]
    pub disable_smart_shrinking: bool,

    /// Load or print images (default)
    #[arg(long, overrides_with = "no_images")]
    pub images: bool,

    /// Do not load or print images
    #[arg(long, overrides_with = "images")]
    pub no_images: bool,

    /// Allow web pages to run javascript (default)
    #[arg(long, overrides_with = "disable_javascript")]
    pub enable_javascript: bool,

    /// Do not allow web pages to run javascript
    #[arg(long, overrides_with = "enable_javascript")]
    pub disable_javascript: bool,

    /// Stop slow running javascripts (default)
    #[arg(long, overrides_with = "no_stop_slow_scripts")]
    pub stop_slow_scripts: bool,

    /// Do not stop slow running javascripts
    #[arg(long, overrides_with = "stop_slow_scripts")]
    pub no_stop_slow_scripts: bool,

    /// Show javascript debugging output
    #[arg(long)]
    pub debug_javascript: bool,

    /// Use print media-type instead of screen
    #[arg(long, overrides_with = "no_print_media_type")]
    pub print_media_type: bool,

    /// Do not use print media-type (default)
    #[arg(long, overrides_with = "print_media_type")]
    pub no_print_media_type: bool,

    /// Print background (default)
    #[arg(long, overrides_with = "no_background")]
    pub background: bool,

    /// Do not print background
    #[arg(long, overrides_with = "background")]
    pub no_background: bool,

    /// Set viewport size, e.g. "1024x768"
    #[arg(long, value_name = "SIZE")]
    pub viewport_size: Option<String>,

    /// Wait until window.status is equal to this string before rendering page
    #[arg(long, value_name = "STATUS")]
    pub window_status: Option<String>,

    /// Left aligned header text
    #[arg(long, value_name = "TEXT")]
    pub header_left: Option<String>,

    /// Centered header text
    #[arg(long, value_name = "TEXT")]
    pub header_center: Option<String>,

    /// Right aligned header text
    #[arg(long, value_name = "TEXT")]
    pub header_right: Option<String>,

    /// Spacing between header and content in mm
    #[arg(long, value_name = "REAL")]
    pub header_spacing: Option<String>,

    /// Display line below the header
    #[arg(long)]
    pub header_line: bool,

    /// Left aligned footer text
    #[arg(long, value_name = "TEXT")]
    pub footer_left: Option<String>,

    /// Centered footer text
    #[arg(long, value_name = "TEXT")]
    pub footer_center: Option<String>,

    /// Right aligned footer text
    #[arg(long, value_name = "TEXT")]
    pub footer_right: Option<String>,

    /// Spacing between footer and content in mm
    #[arg(long, value_name = "REAL")]
    pub footer_spacing: Option<String>,

    /// Display line above the footer
    #[arg(long)]
    pub footer_line: bool,

    /// Insert a table of contents in the generated pdf
    #[arg(long)]
    pub toc: bool,

    /// Depth of the table of contents (default: 3)
    #[arg(long, value_name = "LEVEL")]
    pub toc_depth: Option<String>,

    /// Use a HTML page as cover
    #[arg(long, value_name = "URL")]
    pub cover: Option<String>,

    /// Put an outline into the pdf (default)
    #[arg(long, overrides_with = "no_outline")]
    pub outline: bool,

    /// Do not put an outline into the pdf
    #[arg(long, overrides_with = "outline")]
    pub no_outline: bool,

    /// Set the depth of the outline (default: 4)
    #[arg(long, value_name = "LEVEL")]
    pub outline_depth: Option<String>,

    /// Set an additional cookie as NAME=VALUE (repeatable), value should be url encoded
    #[arg(long = "cookie", value_name = "NAME=VALUE")]
    pub cookies: Vec<String>,

    /// Set an additional HTTP header as "NAME: VALUE" (repeatable)
    #[arg(long = "custom-header", value_name = "NAME: VALUE")]
    pub custom_headers: Vec<String>,

    /// Add custom headers to every resource request
    #[arg(long, overrides_with = "no_custom_header_propagation")]
    pub custom_header_propagation: bool,

    /// Only add custom headers to the main page request (default)
    #[arg(long, overrides_with = "custom_header_propagation")]
    pub no_custom_header_propagation: bool,

    /// Specify a user style sheet, to load with every page
    #[arg(long, value_name = "URL")]
    pub user_style_sheet: Option<String>,

    /// Allow the file or files from the specified folder to be loaded (repeatable)
    #[arg(long = "allow", value_name = "PATH")]
    pub allowed_paths: Vec<String>,

    /// Allow conversion of a local file to read in other local files (default)
    #[arg(long, overrides_with = "disable_local_file_access")]
    pub enable_local_file_access: bool,

    /// Do not allow conversion of a local file to read in other local files
    #[arg(long, overrides_with = "enable_local_file_access")]
    pub disable_local_file_access: bool,
}

/// Resolve an `--enable-x` / `--disable-x` pair where the last one given wins.
pub fn flag_pair(enable: bool, disable: bool, default: bool) -> bool {
    if enable {
        true
    } else if disable {
        false
    } else {
        default
    }
}

/// Whether `--quiet` or `-q` appears in `argv`, checked before clap runs so
/// rejected command lines are still logged with the right verbosity.
pub fn quiet_requested<S: AsRef<str>>(argv: &[S]) -> bool {
    argv.iter()
        .skip(1)
        .map(AsRef::as_ref)
        .take_while(|arg| *arg != "--")
        .any(|arg| match arg.strip_prefix('-') {
            Some("-quiet") => true,
            // Short clusters such as `-gq` made only of value-less flags.
            Some(cluster) if !cluster.starts_with('-') && !cluster.is_empty() => {
                cluster.contains('q') && cluster.chars().all(|c| matches!(c, 'g' | 'l' | 'q'))
            }
            _ => false,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("wkhtmltopdf").chain(tokens.iter().copied())).unwrap()
    }

    #[test]
    fn positionals_and_options_interleave() {
        let a = args(&["in.html", "--zoom", "2", "out.pdf", "-q"]);
        assert_eq!(a.input.as_deref(), Some("in.html"));
        assert_eq!(a.output.as_deref(), Some("out.pdf"));
        assert_eq!(a.zoom.as_deref(), Some("2"));
        assert!(a.quiet);
    }

    #[test]
    fn boolean_flags_do_not_consume_values() {
        let a = args(&["--grayscale", "in.html", "out.pdf"]);
        assert!(a.grayscale);
        assert_eq!(a.input.as_deref(), Some("in.html"));
        assert_eq!(a.output.as_deref(), Some("out.pdf"));
    }

    #[test]
    fn short_aliases_follow_wkhtmltopdf() {
        let a = args(&["-s", "Letter", "-O", "Landscape", "-T", "5mm", "-g", "a", "b"]);
        assert_eq!(a.page_size.as_deref(), Some("Letter"));
        assert_eq!(a.orientation.as_deref(), Some("Landscape"));
        assert_eq!(a.margin_top.as_deref(), Some("5mm"));
        assert!(a.grayscale);
    }

    #[test]
    fn last_of_a_flag_pair_wins() {
        let a = args(&["--disable-javascript", "--enable-javascript", "a", "b"]);
        assert!(flag_pair(a.enable_javascript, a.disable_javascript, true));

        let a = args(&["--enable-javascript", "--disable-javascript", "a", "b"]);
        assert!(!flag_pair(a.enable_javascript, a.disable_javascript, true));

        let a = args(&["a", "b"]);
        assert!(!flag_pair(a.print_media_type, a.no_print_media_type, false));
    }

    #[test]
    fn negative_numbers_are_values() {
        let a = args(&["--zoom", "-1", "a", "b"]);
        assert_eq!(a.zoom.as_deref(), Some("-1"));
    }

    #[test]
    fn repeatable_options_accumulate() {
        let a = args(&["--cookie", "a=1", "--cookie", "b=2", "x", "y"]);
        assert_eq!(a.cookies, vec!["a=1", "b=2"]);
    }

    #[test]
    fn quiet_is_found_before_full_parsing() {
        assert!(quiet_requested(&["wkhtmltopdf", "--bogus", "-q", "a", "b"]));
        assert!(quiet_requested(&["wkhtmltopdf", "--quiet"]));
        assert!(quiet_requested(&["wkhtmltopdf", "-gq", "a", "b"]));
        assert!(!quiet_requested(&["wkhtmltopdf", "a", "b"]));
        assert!(!quiet_requested(&["wkhtmltopdf", "--title", "x", "a", "b"]));
        assert!(!quiet_requested(&["wkhtmltopdf", "-sq"]));
        assert!(!quiet_requested(&["wkhtmltopdf", "--", "-q"]));
        // The program name itself is never inspected.
        assert!(!quiet_requested(&["-q"]));
    }

    #[test]
    fn unknown_flags_and_extra_positionals_are_rejected() {
        let base = std::iter::once("wkhtmltopdf");
        assert!(Args::try_parse_from(base.clone().chain(["--bogus", "a", "b"])).is_err());
        assert!(Args::try_parse_from(base.clone().chain(["a", "b", "c"])).is_err());
        assert!(Args::try_parse_from(base.chain(["--zoom"])).is_err());
    }
}
