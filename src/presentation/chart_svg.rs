// SVG line chart rendering for a facility's wait times
use crate::domain::chart::ChartModel;
use crate::presentation::html::escape_html;
use chrono::{Duration, NaiveDateTime, Timelike};
use std::fmt::Write;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 320.0;
const MARGIN_LEFT: f64 = 48.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 16.0;
const MARGIN_BOTTOM: f64 = 48.0;

struct Plot<'a> {
    chart: &'a ChartModel,
    span_secs: f64,
    y_max: f64,
}

impl Plot<'_> {
    fn x(&self, at: NaiveDateTime) -> f64 {
        let offset = (at - self.chart.x_min).num_seconds() as f64;
        MARGIN_LEFT + offset / self.span_secs * (WIDTH - MARGIN_LEFT - MARGIN_RIGHT)
    }

    fn y(&self, minutes: f64) -> f64 {
        HEIGHT - MARGIN_BOTTOM - minutes / self.y_max * (HEIGHT - MARGIN_TOP - MARGIN_BOTTOM)
    }
}

/// Render the chart as a standalone SVG document. Points without a wait
/// time break the line.
pub fn render_chart_svg(chart: &ChartModel, title: &str) -> String {
    let plot = Plot {
        chart,
        span_secs: ((chart.x_max - chart.x_min).num_seconds() as f64).max(1.0),
        y_max: f64::from(chart.y_max().max(1)),
    };

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif" font-size="11"><title>{}</title><rect width="100%" height="100%" fill="white"/>"#,
        escape_html(title)
    );

    for tick in &chart.y_ticks {
        let y = plot.y(f64::from(*tick));
        let _ = write!(
            svg,
            r##"<line x1="{MARGIN_LEFT}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#ddd"/><text x="{:.1}" y="{:.1}" text-anchor="end">{tick}</text>"##,
            WIDTH - MARGIN_RIGHT,
            MARGIN_LEFT - 6.0,
            y + 4.0
        );
    }

    for at in hour_marks(chart.x_min, chart.x_max) {
        let x = plot.x(at);
        let _ = write!(
            svg,
            r##"<line x1="{x:.1}" y1="{MARGIN_TOP}" x2="{x:.1}" y2="{:.1}" stroke="#eee"/><text x="{x:.1}" y="{:.1}" text-anchor="end" transform="rotate(-45 {x:.1} {:.1})">{}</text>"##,
            HEIGHT - MARGIN_BOTTOM,
            HEIGHT - MARGIN_BOTTOM + 14.0,
            HEIGHT - MARGIN_BOTTOM + 14.0,
            at.format("%H:%M")
        );
    }

    for segment in segments(&plot) {
        let _ = write!(
            svg,
            r##"<polyline fill="none" stroke="#1f77b4" stroke-width="2" points="{}"/>"##,
            segment.join(" ")
        );
    }

    let _ = write!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">Time</text><text x="12" y="{:.1}" text-anchor="middle" transform="rotate(-90 12 {:.1})">Wait (min)</text></svg>"#,
        (WIDTH + MARGIN_LEFT) / 2.0,
        HEIGHT - 4.0,
        HEIGHT / 2.0,
        HEIGHT / 2.0
    );
    svg
}

/// Placeholder shown when a facility has nothing inside the display window
pub fn render_empty_svg(title: &str) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} 60" font-family="sans-serif" font-size="13"><title>{}</title><text x="{:.1}" y="34" text-anchor="middle" fill="#666">No chart data</text></svg>"##,
        escape_html(title),
        WIDTH / 2.0
    )
}

fn segments(plot: &Plot<'_>) -> Vec<Vec<String>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for point in &plot.chart.points {
        match point.minutes {
            Some(minutes) => current.push(format!(
                "{:.1},{:.1}",
                plot.x(point.at),
                plot.y(f64::from(minutes))
            )),
            None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Whole hours within `[from, to]`
fn hour_marks(from: NaiveDateTime, to: NaiveDateTime) -> Vec<NaiveDateTime> {
    let Some(floor) = from.with_minute(0).and_then(|t| t.with_second(0)).and_then(|t| t.with_nanosecond(0)) else {
        return Vec::new();
    };
    let mut mark = if floor < from { floor + Duration::hours(1) } else { floor };
    let mut marks = Vec::new();
    while mark <= to {
        marks.push(mark);
        mark += Duration::hours(1);
    }
    marks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::observation::{FacilityId, Observation};
    use crate::domain::series::normalize;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn chart(points: &[(u32, u32, Option<u32>)]) -> ChartModel {
        let observations: Vec<_> = points
            .iter()
            .map(|&(h, m, wait)| Observation::new(FacilityId::new("1"), at(h, m), wait))
            .collect();
        let series = normalize(&observations, at(0, 0).date());
        ChartModel::from_series(&series).unwrap()
    }

    #[test]
    fn test_hour_marks() {
        assert_eq!(hour_marks(at(9, 10), at(11, 0)), vec![at(10, 0), at(11, 0)]);
        assert_eq!(hour_marks(at(9, 0), at(9, 30)), vec![at(9, 0)]);
        assert!(hour_marks(at(9, 10), at(9, 50)).is_empty());
    }

    #[test]
    fn test_null_minutes_split_the_line() {
        let svg = render_chart_svg(
            &chart(&[(9, 0, Some(10)), (9, 5, Some(20)), (9, 10, None), (9, 15, Some(5))]),
            "Soaring",
        );
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_empty_svg() {
        let svg = render_empty_svg("Soaring");
        assert!(svg.contains("No chart data"));
        assert!(!svg.contains("<polyline"));
    }

    #[test]
    fn test_single_point_chart() {
        let svg = render_chart_svg(&chart(&[(12, 0, Some(30))]), "A & B");
        assert!(svg.contains("<title>A &amp; B</title>"));
        assert!(svg.contains("12:00"));
    }
}
