pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{error, error_detail, header, info, output_file, phase, success, timing};
pub use progress::{CliObserver, Spinner};
pub use table::{summary_table, TableBuilder};
pub use theme::{error_theme, theme, Theme};
