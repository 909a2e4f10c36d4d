use crate::ui::theme::{error_theme, theme};
use crate::ui::Icons;
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::ROCKET, text.style(theme().title.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().ok.clone()));
}

/// Failure diagnostic on stderr
pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(error_theme().failure.clone()));
}

/// Indented continuation of an error, e.g. one link of the cause chain
pub fn error_detail(text: &str) {
    eprintln!("   {}", text.style(error_theme().detail.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().accent.clone()),
        label.style(theme().detail.clone()),
        value
    );
}

pub fn phase(name: &str) {
    println!(
        "{} {}",
        Icons::GEAR.style(theme().accent.clone()),
        name.style(theme().stage.clone())
    );
}

pub fn output_file(icon: &str, path: &str) {
    println!("  {} {}", icon, path.style(theme().accent.clone()));
}

pub fn timing(elapsed: &str) {
    println!("{} {}", Icons::CLOCK, elapsed.style(theme().detail.clone()));
}
