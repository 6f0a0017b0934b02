//! Server-side HTML rendering
//!
//! Every page is an askama template under `templates/` extending
//! `base.html`, with inline CSS and inline SVG charts, so the dashboard works
//! without any client-side script. Chart geometry is computed here; the
//! templates only lay it out and autoescape every value coming from the
//! snapshot.

use askama::Template;

use super::analytics::LegacyAnalytics;
use super::records::RawRecord;
use super::view::DashboardView;
use super::DashboardResult;

/// Rows shown on the records page
pub const RECORDS_PAGE_ROWS: usize = 50;
/// Rows shown in the legacy table
pub const LEGACY_PAGE_ROWS: usize = 30;

const AREA_WIDTH: f64 = 640.0;
const AREA_HEIGHT: f64 = 260.0;
const BAR_WIDTH: f64 = 320.0;
const BAR_HEIGHT: f64 = 260.0;
const CHART_PAD: f64 = 28.0;

/// Pages reachable from the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Overview,
    Records,
}

impl Page {
    pub const ALL: [Page; 2] = [Page::Overview, Page::Records];

    pub fn label(&self) -> &'static str {
        match self {
            Page::Overview => "Live Overview",
            Page::Records => "Backend Records",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Page::Overview => "/",
            Page::Records => "/records",
        }
    }
}

struct NavLink {
    path: &'static str,
    label: &'static str,
    active: bool,
}

fn nav_links(active: Page) -> Vec<NavLink> {
    Page::ALL
        .iter()
        .map(|page| NavLink {
            path: page.path(),
            label: page.label(),
            active: *page == active,
        })
        .collect()
}

struct StatCard {
    label: &'static str,
    value: String,
    sub: &'static str,
}

impl StatCard {
    fn new(label: &'static str, value: impl ToString, sub: &'static str) -> Self {
        Self {
            label,
            value: value.to_string(),
            sub,
        }
    }
}

struct GridLine {
    x1: String,
    x2: String,
    y: String,
}

struct AreaPoint {
    x: String,
    y: String,
    date: String,
    count: u64,
    label: String,
}

struct AreaChart {
    width: f64,
    height: f64,
    grid: Vec<GridLine>,
    has_line: bool,
    /// Closed path under the line, filled with the gradient
    fill_path: String,
    line: String,
    points: Vec<AreaPoint>,
    label_y: String,
}

struct HourBar {
    x: String,
    y: String,
    width: String,
    height: String,
    hour: u32,
    count: u64,
    labelled: bool,
    label_x: String,
}

struct HourlyChart {
    width: f64,
    height: f64,
    bars: Vec<HourBar>,
    label_y: String,
}

struct HeatCell {
    hour: usize,
    count: u64,
    alpha: String,
}

struct DayBar {
    date: String,
    count: u64,
    label: String,
    height: String,
}

#[derive(Template)]
#[template(path = "sidebar.html")]
struct SidebarTemplate {
    nav: Vec<NavLink>,
}

#[derive(Template)]
#[template(path = "overview.html")]
struct OverviewTemplate {
    title: &'static str,
    nav: Vec<NavLink>,
    last_update: String,
    cards: Vec<StatCard>,
    area: AreaChart,
    hourly: HourlyChart,
}

#[derive(Template)]
#[template(path = "records.html")]
struct RecordsTemplate<'a> {
    title: &'static str,
    nav: Vec<NavLink>,
    total: usize,
    rows: &'a [RawRecord],
}

#[derive(Template)]
#[template(path = "legacy.html")]
struct LegacyTemplate<'a> {
    title: &'static str,
    cards: Vec<StatCard>,
    heat_cells: Vec<HeatCell>,
    day_bars: Vec<DayBar>,
    total: usize,
    rows: &'a [RawRecord],
}

#[derive(Template)]
#[template(path = "loading.html")]
struct LoadingTemplate {
    title: &'static str,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate<'a> {
    title: &'static str,
    message: &'a str,
}

/// Navigation with the active page highlighted
pub fn sidebar(active: Page) -> DashboardResult<String> {
    let template = SidebarTemplate {
        nav: nav_links(active),
    };
    Ok(template.render()?)
}

/// Overview: stat cards, 14-day area chart and hourly bar chart
pub fn overview_page(view: &DashboardView) -> DashboardResult<String> {
    let template = OverviewTemplate {
        title: Page::Overview.label(),
        nav: nav_links(Page::Overview),
        last_update: view.last_update.clone(),
        cards: vec![
            StatCard::new("Today", view.today, "live"),
            StatCard::new("Total tweets", view.total, "all time"),
            StatCard::new("Days recorded", view.days_recorded, "recording"),
            StatCard::new("System status", "Normal", "online"),
        ],
        area: area_chart(view),
        hourly: hourly_chart(view),
    };
    Ok(template.render()?)
}

fn area_chart(view: &DashboardView) -> AreaChart {
    let baseline = AREA_HEIGHT - CHART_PAD;
    let plot_height = AREA_HEIGHT - 2.0 * CHART_PAD;
    let max = view.max_daily() as f64;

    let grid = (0..=4)
        .map(|step| GridLine {
            x1: format!("{:.1}", CHART_PAD),
            x2: format!("{:.1}", AREA_WIDTH - CHART_PAD),
            y: format!("{:.1}", CHART_PAD + plot_height * step as f64 / 4.0),
        })
        .collect();

    let coords: Vec<(f64, f64)> = view
        .daily
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let x = if view.daily.len() > 1 {
                CHART_PAD
                    + (AREA_WIDTH - 2.0 * CHART_PAD) * i as f64 / (view.daily.len() - 1) as f64
            } else {
                AREA_WIDTH / 2.0
            };
            let y = baseline - point.count as f64 / max * plot_height;
            (x, y)
        })
        .collect();

    let vertices: Vec<String> = coords
        .iter()
        .map(|(x, y)| format!("{:.1},{:.1}", x, y))
        .collect();

    let fill_path = match (coords.first(), coords.last()) {
        (Some(first), Some(last)) => format!(
            "M{:.1},{:.1} L{} L{:.1},{:.1} Z",
            first.0,
            baseline,
            vertices.join(" L"),
            last.0,
            baseline
        ),
        _ => String::new(),
    };

    let points = coords
        .iter()
        .zip(&view.daily)
        .map(|((x, y), point)| AreaPoint {
            x: format!("{:.1}", x),
            y: format!("{:.1}", y),
            date: point.date.clone(),
            count: point.count,
            label: point.name.clone(),
        })
        .collect();

    AreaChart {
        width: AREA_WIDTH,
        height: AREA_HEIGHT,
        grid,
        has_line: !vertices.is_empty(),
        fill_path,
        line: vertices.join(" "),
        points,
        label_y: format!("{:.1}", AREA_HEIGHT - 8.0),
    }
}

fn hourly_chart(view: &DashboardView) -> HourlyChart {
    let baseline = BAR_HEIGHT - CHART_PAD;
    let plot_height = BAR_HEIGHT - 2.0 * CHART_PAD;
    let slot = (BAR_WIDTH - 2.0 * CHART_PAD) / view.hourly.len().max(1) as f64;
    let max = view.max_hourly() as f64;

    let bars = view
        .hourly
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let height = point.count as f64 / max * plot_height;
            let x = CHART_PAD + slot * i as f64;
            HourBar {
                x: format!("{:.1}", x + slot * 0.15),
                y: format!("{:.1}", baseline - height),
                width: format!("{:.1}", slot * 0.7),
                height: format!("{:.1}", height),
                hour: point.hour,
                count: point.count,
                labelled: point.hour % 3 == 0,
                label_x: format!("{:.1}", x + slot / 2.0),
            }
        })
        .collect();

    HourlyChart {
        width: BAR_WIDTH,
        height: BAR_HEIGHT,
        bars,
        label_y: format!("{:.1}", BAR_HEIGHT - 8.0),
    }
}

/// Raw record table, first 50 rows
pub fn records_page(records: &[RawRecord]) -> DashboardResult<String> {
    let template = RecordsTemplate {
        title: Page::Records.label(),
        nav: nav_links(Page::Records),
        total: records.len(),
        rows: &records[..records.len().min(RECORDS_PAGE_ROWS)],
    };
    Ok(template.render()?)
}

/// Legacy view: summary cards, hour heatmap, 14-day bars and 30 rows
pub fn legacy_page(analytics: &LegacyAnalytics, records: &[RawRecord]) -> DashboardResult<String> {
    let peak_count = analytics.peak_day.as_ref().map(|(_, c)| *c).unwrap_or(0);

    let heat_cells = analytics
        .hourly_counts
        .iter()
        .enumerate()
        .map(|(hour, count)| HeatCell {
            hour,
            count: *count,
            alpha: format!("{:.3}", analytics.heat_alpha(hour)),
        })
        .collect();

    // Label is cut from the raw date; escaping happens in the template
    let day_bars = analytics
        .recent_daily
        .iter()
        .map(|(date, count)| DayBar {
            date: date.clone(),
            count: *count,
            label: date
                .get(5..)
                .filter(|s| !s.is_empty())
                .unwrap_or(date.as_str())
                .to_string(),
            height: format!("{:.1}", analytics.bar_height(*count)),
        })
        .collect();

    let template = LegacyTemplate {
        title: "Backend data",
        cards: vec![
            StatCard::new("Total tweets", analytics.total, ""),
            StatCard::new("Daily average", analytics.average_display(), ""),
            StatCard::new("Peak hour", format!("{}:00", analytics.peak_hour), ""),
            StatCard::new("Busiest day", peak_count, ""),
            StatCard::new("Days recorded", analytics.days, ""),
        ],
        heat_cells,
        day_bars,
        total: records.len(),
        rows: &records[..records.len().min(LEGACY_PAGE_ROWS)],
    };
    Ok(template.render()?)
}

/// Placeholder shown while no snapshot is available yet
pub fn loading_page() -> DashboardResult<String> {
    Ok(LoadingTemplate { title: "Loading" }.render()?)
}

/// Page shown when the snapshot could not be loaded
pub fn error_page(message: &str) -> DashboardResult<String> {
    let template = ErrorTemplate {
        title: "Error",
        message,
    };
    Ok(template.render()?)
}
