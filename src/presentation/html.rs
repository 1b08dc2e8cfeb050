// Server-rendered dashboard page
use crate::application::dashboard_service::ParkListing;
use crate::domain::dashboard::{AlertThresholds, DashboardSnapshot, FacilityRow, ParkFacility, PassSummary};
use crate::domain::facility::{FacilitySummary, SortOrder, format_drop_rate};
use crate::domain::observation::PassStatus;
use std::fmt::Write;

pub struct DashboardPage<'a> {
    pub snapshot: &'a DashboardSnapshot,
    pub listings: &'a [ParkListing],
    pub passes: &'a PassSummary,
    pub alerts: &'a [FacilitySummary],
    pub table: &'a [FacilityRow],
    pub thresholds: AlertThresholds,
    pub order: SortOrder,
    pub refresh_interval_secs: u64,
}

const STYLE: &str = r#"
body { font-family: sans-serif; max-width: 960px; margin: 0 auto; padding: 16px; }
nav a { margin-right: 12px; }
details { border: 1px solid #ddd; border-radius: 6px; margin: 6px 0; padding: 6px 10px; }
summary { cursor: pointer; font-weight: bold; }
small { color: #444; }
.on { color: red; } .off { color: gray; }
table { border-collapse: collapse; width: 100%; font-size: 14px; }
th, td { border-bottom: 1px solid #eee; padding: 4px 6px; text-align: left; }
img.chart { width: 100%; max-width: 800px; }
"#;

const AUTO_REFRESH_SCRIPT: &str = r#"
const box = document.getElementById('auto-refresh');
box.checked = localStorage.getItem('autoRefresh') === '1';
let timer = null;
function arm() {
  if (timer) { clearTimeout(timer); timer = null; }
  if (box.checked) { timer = setTimeout(() => location.reload(), box.dataset.interval * 1000); }
}
box.addEventListener('change', () => { localStorage.setItem('autoRefresh', box.checked ? '1' : '0'); arm(); });
arm();
"#;

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn or_na(value: Option<&str>) -> String {
    escape_html(value.unwrap_or("N/A"))
}

pub fn render_dashboard(page: &DashboardPage<'_>) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1"><title>Wait times</title><style>{STYLE}</style></head><body>"#
    );
    let _ = write!(
        html,
        r#"<h1>Wait times</h1><p><small>{} &middot; updated {} UTC</small> <label><input type="checkbox" id="auto-refresh" data-interval="{}"> Auto refresh</label></p>"#,
        page.snapshot.display_date,
        page.snapshot.generated_at.format("%H:%M:%S"),
        page.refresh_interval_secs
    );

    html.push_str("<nav>");
    for listing in page.listings {
        let _ = write!(html, r##"<a href="#park-{0}">{0}</a>"##, escape_html(&listing.code));
    }
    html.push_str(r##"<a href="#passes">Passes</a><a href="#alerts">Alerts</a><a href="#table">All facilities</a></nav>"##);

    for listing in page.listings {
        render_park(&mut html, listing, page.order);
    }
    render_passes(&mut html, page.passes);
    render_alerts(&mut html, page.alerts, page.thresholds);
    render_table(&mut html, page.table);

    let _ = write!(html, "<script>{AUTO_REFRESH_SCRIPT}</script></body></html>");
    html
}

fn render_park(html: &mut String, listing: &ParkListing, order: SortOrder) {
    let code = escape_html(&listing.code);
    let _ = write!(
        html,
        r#"<section id="park-{code}"><h2>{code} wait times</h2><p>Sort:"#
    );
    for option in SortOrder::all() {
        let label = match option {
            SortOrder::LongestWait => "Longest wait",
            SortOrder::ShortestWait => "Shortest wait",
            SortOrder::HighestDropRate => "Biggest drop",
        };
        if option == order {
            let _ = write!(html, " <b>{label}</b>");
        } else {
            let _ = write!(html, r##" <a href="?sort={}#park-{code}">{label}</a>"##, option.as_str());
        }
    }
    html.push_str("</p>");

    if listing.facilities.is_empty() {
        html.push_str("<p>No facilities reporting.</p>");
    }
    for facility in &listing.facilities {
        render_facility_panel(html, facility);
    }
    html.push_str("</section>");
}

fn render_facility_panel(html: &mut String, facility: &FacilitySummary) {
    let latest = &facility.latest;
    let updated = latest
        .update_time
        .clone()
        .unwrap_or_else(|| latest.observation.observed_at.format("%H:%M").to_string());

    let _ = write!(
        html,
        "<details><summary>{}</summary><small><b>Facility:</b> {}<br><b>Status:</b> {} / <b>Hours:</b> {} - {}<br><b>Updated:</b> {}</small>",
        escape_html(&facility.panel_label()),
        or_na(latest.kana_name.as_deref()),
        or_na(latest.operating_status.as_deref()),
        or_na(latest.operating_hours_from.as_deref()),
        or_na(latest.operating_hours_to.as_deref()),
        escape_html(&updated)
    );

    for (status, on_sale, ended) in [
        (&latest.dpa_status, "DPA on sale", "DPA sales ended"),
        (&latest.pp_status, "Priority Pass issuing", "Priority Pass ended"),
    ] {
        match status {
            PassStatus::OnSale => {
                let _ = write!(html, r#"<br><small class="on"><b>Pass:</b> {on_sale}</small>"#);
            }
            PassStatus::Ended => {
                let _ = write!(html, r#"<br><small class="off"><b>Pass:</b> {ended}</small>"#);
            }
            _ => {}
        }
    }

    let _ = write!(
        html,
        r#"<div><img class="chart" loading="lazy" alt="wait time chart" src="/facilities/{}/chart.svg"></div></details>"#,
        urlencoding::encode(facility.facility_id().as_str())
    );
}

fn render_pass_section(html: &mut String, title: &str, list: &[ParkFacility]) {
    let _ = write!(html, "<h3>{title}</h3>");
    if list.is_empty() {
        html.push_str("<p>None</p>");
        return;
    }
    html.push_str("<ul>");
    for entry in list {
        let _ = write!(
            html,
            "<li>({}) {}</li>",
            escape_html(&entry.park),
            escape_html(&entry.name)
        );
    }
    html.push_str("</ul>");
}

fn render_passes(html: &mut String, passes: &PassSummary) {
    html.push_str(r#"<section id="passes"><h2>Pass status</h2>"#);
    render_pass_section(html, "DPA on sale", &passes.dpa_on_sale);
    render_pass_section(html, "Priority Pass issuing", &passes.priority_pass_issuing);
    render_pass_section(html, "Line cut", &passes.line_cut);
    html.push_str("</section>");
}

fn render_alerts(html: &mut String, alerts: &[FacilitySummary], thresholds: AlertThresholds) {
    let _ = write!(
        html,
        r#"<section id="alerts"><h2>Good time to ride</h2><p><small>Wait &le; {} min and drop &ge; {:.0}%</small></p>"#,
        thresholds.max_wait_minutes, thresholds.min_drop_rate
    );
    if alerts.is_empty() {
        html.push_str("<p>No facilities match right now.</p></section>");
        return;
    }
    html.push_str("<ul>");
    for facility in alerts {
        let name = facility
            .short_name
            .as_deref()
            .unwrap_or(facility.facility_id().as_str());
        let _ = write!(
            html,
            "<li>({}) {}: {} min ({})</li>",
            escape_html(&facility.park),
            escape_html(name),
            facility.wait_minutes().unwrap_or_default(),
            format_drop_rate(facility.drop_rate).unwrap_or_default()
        );
    }
    html.push_str("</ul></section>");
}

fn render_table(html: &mut String, rows: &[FacilityRow]) {
    html.push_str(
        r#"<section id="table"><h2>All facilities</h2><table><thead><tr><th>Park</th><th>Attraction</th><th>Wait (min)</th><th>Drop (%)</th><th>DPA</th><th>PP</th><th>Status</th><th>Updated</th></tr></thead><tbody>"#,
    );
    for row in rows {
        let cell = |v: Option<&str>| escape_html(v.unwrap_or(""));
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&row.park),
            cell(row.short_name.as_deref()),
            row.wait_minutes.map(|w| w.to_string()).unwrap_or_default(),
            row.drop_rate.map(|d| format!("{d:.1}")).unwrap_or_default(),
            cell(row.dpa.as_deref()),
            cell(row.priority_pass.as_deref()),
            cell(row.operating_status.as_deref()),
            cell(row.update_time.as_deref())
        );
    }
    html.push_str("</tbody></table></section>");
}

pub fn render_not_ready() -> String {
    format!(
        r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8"><meta http-equiv="refresh" content="10"><title>Wait times</title><style>{STYLE}</style></head><body><h1>Wait times</h1><p>Loading wait times, this page will reload shortly.</p></body></html>"#
    )
}
