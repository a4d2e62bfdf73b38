//! Headless Chromium backend.

use std::collections::HashMap;
use std::time::Duration;

use headless_chrome::protocol::cdp::Emulation;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use tracing::{debug, warn};
use url::Url;

use crate::config::RendererConfig;
use crate::error::{Error, Result};
use crate::options::Orientation;
use crate::render::Renderer;
use crate::request::{Decoration, Input, RenderConfig};

/// Chromium accepts print scales in this range only.
const MIN_SCALE: f64 = 0.1;
const MAX_SCALE: f64 = 2.0;

/// Renders through a Chromium instance launched per request.
pub struct ChromeRenderer {
    settings: RendererConfig,
}

impl ChromeRenderer {
    pub fn new(settings: RendererConfig) -> Self {
        Self { settings }
    }

    fn launch(&self, config: &RenderConfig) -> Result<Browser> {
        let mut builder = LaunchOptions::default_builder();
        builder
            .headless(self.settings.headless)
            .sandbox(self.settings.sandbox)
            .path(self.settings.chrome_path.clone())
            .window_size(config.viewport.map(|v| (v.width, v.height)));
        if let Some(secs) = self.settings.timeout_secs {
            builder.idle_browser_timeout(Duration::from_secs(secs));
        }
        let options = builder.build().map_err(Error::render)?;
        Browser::new(options).map_err(Error::render)
    }
}

impl Renderer for ChromeRenderer {
    fn render(&self, config: &RenderConfig, input: &Input) -> Result<Vec<u8>> {
        let ignored = ignored_flags(config);
        if !ignored.is_empty() {
            warn!(
                "Ignoring options the Chromium backend cannot apply: {}",
                ignored.join(", ")
            );
        }

        let url = input_url(input)?;
        let browser = self.launch(config)?;
        let tab = browser.new_tab().map_err(Error::render)?;
        if let Some(secs) = self.settings.timeout_secs {
            tab.set_default_timeout(Duration::from_secs(secs));
        }

        let headers = request_headers(config);
        if !headers.is_empty() {
            let headers: HashMap<&str, &str> = headers
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            tab.set_extra_http_headers(headers).map_err(Error::render)?;
        }
        if !config.javascript {
            tab.call_method(Emulation::SetScriptExecutionDisabled { value: true })
                .map_err(Error::render)?;
        }

        debug!(%url, "navigating");
        tab.navigate_to(url.as_str())
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| navigation_error(&url, e))?;

        if let Some(script) = page_script(config) {
            if config.javascript {
                tab.evaluate(&script, false).map_err(Error::render)?;
            } else {
                warn!("--title and --grayscale need JavaScript and are skipped with --disable-javascript");
            }
        }

        tab.print_to_pdf(Some(print_options(config)))
            .map_err(Error::render)
    }
}

/// A page that cannot be loaded is an input problem, not a renderer one.
fn navigation_error(url: &Url, e: impl std::fmt::Display) -> Error {
    Error::input(url.as_str(), e.to_string())
}

fn input_url(input: &Input) -> Result<Url> {
    match input {
        Input::Url(url) => Ok(url.clone()),
        Input::File(path) => {
            let shown = path.display().to_string();
            let absolute = path
                .canonicalize()
                .map_err(|e| Error::input(&shown, e.to_string()))?;
            Url::from_file_path(&absolute)
                .map_err(|()| Error::input(&shown, "cannot be expressed as a file URL"))
        }
    }
}

/// Translate page geometry and decorations into Chromium's print options.
pub fn print_options(config: &RenderConfig) -> PrintToPdfOptions {
    let (width_mm, height_mm) = config.page_size.dimensions_mm();
    let scale = config.zoom.clamp(MIN_SCALE, MAX_SCALE);
    if scale != config.zoom {
        warn!(zoom = config.zoom, scale, "zoom clamped to Chromium's print scale range");
    }
    let decorated = config.header.has_text() || config.footer.has_text();

    PrintToPdfOptions {
        landscape: Some(config.orientation == Orientation::Landscape),
        display_header_footer: Some(decorated),
        print_background: Some(config.background),
        scale: Some(scale),
        paper_width: Some(width_mm / 25.4),
        paper_height: Some(height_mm / 25.4),
        margin_top: Some(config.margins.top.inches()),
        margin_bottom: Some(config.margins.bottom.inches()),
        margin_left: Some(config.margins.left.inches()),
        margin_right: Some(config.margins.right.inches()),
        header_template: decorated.then(|| decoration_template(&config.header, Edge::Header)),
        footer_template: decorated.then(|| decoration_template(&config.footer, Edge::Footer)),
        ..Default::default()
    }
}

#[derive(Clone, Copy)]
enum Edge {
    Header,
    Footer,
}

/// Build a Chromium header/footer template from wkhtmltopdf-style text.
fn decoration_template(decoration: &Decoration, edge: Edge) -> String {
    if !decoration.has_text() {
        return "<span></span>".to_string();
    }
    let mut style = String::from("font-size:9px;width:100%;display:flex;margin:0 10mm;");
    let spacing = decoration.spacing.map(|s| s.mm()).unwrap_or(0.0);
    match edge {
        Edge::Header => {
            if decoration.line {
                style.push_str("border-bottom:1px solid #000;");
            }
            style.push_str(&format!("padding-bottom:{spacing}mm;"));
        }
        Edge::Footer => {
            if decoration.line {
                style.push_str("border-top:1px solid #000;");
            }
            style.push_str(&format!("padding-top:{spacing}mm;"));
        }
    }

    let cell = |text: &Option<String>, align: &str| {
        format!(
            "<span style=\"flex:1;text-align:{align}\">{}</span>",
            text.as_deref().map(substitute_variables).unwrap_or_default()
        )
    };
    format!(
        "<div style=\"{style}\">{}{}{}</div>",
        cell(&decoration.left, "left"),
        cell(&decoration.center, "center"),
        cell(&decoration.right, "right"),
    )
}

/// Escape text and replace `[page]`-style variables with Chromium's template classes.
fn substitute_variables(text: &str) -> String {
    let escaped = text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;");
    [
        ("[page]", "pageNumber"),
        ("[topage]", "totalPages"),
        ("[title]", "title"),
        ("[doctitle]", "title"),
        ("[date]", "date"),
        ("[url]", "url"),
        ("[webpage]", "url"),
    ]
    .into_iter()
    .fold(escaped, |acc, (var, class)| {
        acc.replace(var, &format!("<span class=\"{class}\"></span>"))
    })
}

/// Extra HTTP headers, with cookies folded into a single `Cookie` header.
fn request_headers(config: &RenderConfig) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = config
        .custom_headers
        .iter()
        .map(|h| (h.name.clone(), h.value.clone()))
        .collect();
    if !config.cookies.is_empty() {
        let cookie = config
            .cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");
        headers.push(("Cookie".to_string(), cookie));
    }
    headers
}

/// Script run after load for options Chromium only exposes through the DOM.
fn page_script(config: &RenderConfig) -> Option<String> {
    let mut script = String::new();
    if let Some(title) = &config.title {
        script.push_str(&format!("document.title = {};", js_string(title)));
    }
    if config.grayscale {
        script.push_str("document.documentElement.style.filter = 'grayscale(100%)';");
    }
    (!script.is_empty()).then_some(script)
}

fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '<' => out.push_str("\\u003c"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Recognized flags set away from their defaults that Chromium has no knob for.
pub fn ignored_flags(config: &RenderConfig) -> Vec<&'static str> {
    let defaults = RenderConfig::default();
    let checks = [
        (config.dpi != defaults.dpi, "--dpi"),
        (config.low_quality, "--lowquality"),
        (config.encoding != defaults.encoding, "--encoding"),
        (!config.smart_shrinking, "--disable-smart-shrinking"),
        (!config.load_images, "--no-images"),
        (!config.stop_slow_scripts, "--no-stop-slow-scripts"),
        (config.debug_javascript, "--debug-javascript"),
        (config.window_status.is_some(), "--window-status"),
        (config.toc, "--toc"),
        (config.toc_depth != defaults.toc_depth, "--toc-depth"),
        (config.cover.is_some(), "--cover"),
        (!config.outline, "--no-outline"),
        (config.outline_depth != defaults.outline_depth, "--outline-depth"),
        (config.custom_header_propagation, "--custom-header-propagation"),
        (config.user_style_sheet.is_some(), "--user-style-sheet"),
        (!config.allowed_paths.is_empty(), "--allow"),
        (!config.local_file_access, "--disable-local-file-access"),
    ];
    checks
        .into_iter()
        .filter_map(|(set, flag)| set.then_some(flag))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Measurement, NamedValue, PageSize};

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn default_geometry_is_a4_portrait_with_10mm_margins() {
        let opts = print_options(&RenderConfig::default());
        assert_eq!(opts.landscape, Some(false));
        assert!(close(opts.paper_width, 210.0 / 25.4));
        assert!(close(opts.paper_height, 297.0 / 25.4));
        assert!(close(opts.margin_top, 10.0 / 25.4));
        assert_eq!(opts.display_header_footer, Some(false));
        assert_eq!(opts.header_template, None);
        assert_eq!(opts.scale, Some(1.0));
    }

    #[test]
    fn landscape_letter_and_zoom() {
        let config = RenderConfig {
            page_size: PageSize::Letter,
            orientation: Orientation::Landscape,
            zoom: 1.5,
            ..Default::default()
        };
        let opts = print_options(&config);
        assert_eq!(opts.landscape, Some(true));
        assert!(close(opts.paper_width, 8.5));
        assert!(close(opts.paper_height, 11.0));
        assert_eq!(opts.scale, Some(1.5));
    }

    #[test]
    fn zoom_is_clamped_to_chromium_range() {
        let config = RenderConfig {
            zoom: 5.0,
            ..Default::default()
        };
        assert_eq!(print_options(&config).scale, Some(MAX_SCALE));
    }

    #[test]
    fn footer_only_still_blanks_the_header() {
        let mut config = RenderConfig::default();
        config.footer.center = Some("Page [page] of [topage]".to_string());
        config.footer.line = true;
        config.footer.spacing = Some(Measurement::from_mm(3.0));

        let opts = print_options(&config);
        assert_eq!(opts.display_header_footer, Some(true));
        assert_eq!(opts.header_template.as_deref(), Some("<span></span>"));
        let footer = opts.footer_template.unwrap();
        assert!(footer.contains("Page <span class=\"pageNumber\"></span> of <span class=\"totalPages\"></span>"));
        assert!(footer.contains("border-top:1px solid #000;"));
        assert!(footer.contains("padding-top:3mm;"));
    }

    #[test]
    fn decoration_text_is_escaped() {
        assert_eq!(
            substitute_variables("<b>[title]</b>"),
            "&lt;b&gt;<span class=\"title\"></span>&lt;/b&gt;"
        );
    }

    #[test]
    fn cookies_fold_into_one_header() {
        let config = RenderConfig {
            cookies: vec![
                NamedValue {
                    name: "a".into(),
                    value: "1".into(),
                },
                NamedValue {
                    name: "b".into(),
                    value: "2".into(),
                },
            ],
            custom_headers: vec![NamedValue {
                name: "X-Token".into(),
                value: "t".into(),
            }],
            ..Default::default()
        };
        assert_eq!(
            request_headers(&config),
            vec![
                ("X-Token".to_string(), "t".to_string()),
                ("Cookie".to_string(), "a=1; b=2".to_string()),
            ]
        );
    }

    #[test]
    fn page_script_sets_title_and_grayscale() {
        assert_eq!(page_script(&RenderConfig::default()), None);

        let config = RenderConfig {
            title: Some("Say \"hi\"</script>".into()),
            grayscale: true,
            ..Default::default()
        };
        let script = page_script(&config).unwrap();
        assert!(script.starts_with("document.title = \"Say \\\"hi\\\"\\u003c/script>\";"));
        assert!(script.contains("grayscale(100%)"));
    }

    #[test]
    fn ignored_flags_only_lists_changed_options() {
        assert!(ignored_flags(&RenderConfig::default()).is_empty());

        let config = RenderConfig {
            dpi: 300,
            toc: true,
            outline: false,
            ..Default::default()
        };
        assert_eq!(ignored_flags(&config), vec!["--dpi", "--toc", "--no-outline"]);
    }

    #[test]
    fn failed_navigation_is_an_input_error() {
        let url = Url::parse("https://example.invalid/").unwrap();
        let err = navigation_error(&url, "Navigation failed: net::ERR_NAME_NOT_RESOLVED");
        assert!(matches!(err, Error::Input { ref path, .. } if path == "https://example.invalid/"));
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("ERR_NAME_NOT_RESOLVED"));
    }

    #[test]
    fn local_input_becomes_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("page.html");
        std::fs::write(&page, "<p>x</p>").unwrap();

        let url = input_url(&Input::File(page)).unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with("/page.html"));
    }
}
