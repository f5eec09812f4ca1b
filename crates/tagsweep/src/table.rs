use tabled::settings::Style;
use tabled::{Table, Tabled};
use tagsweep_cloud::{Report, ReportItem};

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&ReportItem> for ReportRow {
    fn from(item: &ReportItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            action: item.action.to_string(),
            status: item.action_status.to_string(),
        }
    }
}

pub fn render(report: &Report) -> String {
    let rows: Vec<ReportRow> = report.items.iter().map(ReportRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::psql());
    table.to_string()
}
