use crate::pipeline::ExportSummary;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Exported")]
    pub label: String,
    #[tabled(rename = "Count")]
    pub value: String,
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: impl ToString) {
        self.rows.push(TableRow {
            label: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

/// Totals of one run, plus schema catalog rows when any back end wrote them
pub fn summary_table(summary: &ExportSummary) -> String {
    let mut builder = TableBuilder::new();
    builder.add_row("Objects", summary.counts.objects);
    builder.add_row("Properties", summary.counts.properties);
    builder.add_row("Associations", summary.counts.associations);

    if let Some(catalog) = summary.reports.iter().find_map(|r| r.catalog) {
        builder.add_row("Catalog object types", catalog.object_types);
        builder.add_row("Catalog properties", catalog.properties);
        builder.add_row("Catalog associations", catalog.associations);
    }
    builder.build()
}
