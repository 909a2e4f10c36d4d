use owo_colors::Style;
use std::sync::OnceLock;

static STDOUT_THEME: OnceLock<Theme> = OnceLock::new();
static STDERR_THEME: OnceLock<Theme> = OnceLock::new();

/// Styles by role in the export report.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Banner line
    pub title: Style,
    /// Pipeline stage names
    pub stage: Style,
    pub ok: Style,
    pub failure: Style,
    /// Icons and output paths
    pub accent: Style,
    /// Labels, causes and timings
    pub detail: Style,
}

impl Theme {
    pub fn new(colored: bool) -> Self {
        if !colored {
            return Self {
                title: Style::new(),
                stage: Style::new(),
                ok: Style::new(),
                failure: Style::new(),
                accent: Style::new(),
                detail: Style::new(),
            };
        }
        Self {
            title: Style::new().cyan().bold(),
            stage: Style::new().cyan(),
            ok: Style::new().green().bold(),
            failure: Style::new().red().bold(),
            accent: Style::new().magenta(),
            detail: Style::new().dimmed(),
        }
    }
}

/// Theme for lines on stdout; plain when piped or colors are disabled
pub fn theme() -> &'static Theme {
    STDOUT_THEME.get_or_init(|| Theme::new(console::Term::stdout().is_term() && console::colors_enabled()))
}

/// Theme for diagnostics on stderr
pub fn error_theme() -> &'static Theme {
    STDERR_THEME.get_or_init(|| Theme::new(console::Term::stderr().is_term() && console::colors_enabled_stderr()))
}
