use chrono::{Local, NaiveDate};
use tracing::debug;

use crate::page::{NodeId, PageQuery, Selector};
use crate::parse::{parse_date_marker, parse_header_day, parse_heading_date, parse_location_date};

/// Recognition inputs that don't come from the page itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveContext {
    /// Reference date for inferring month/year and for the last-resort fallback
    pub today: NaiveDate,
}

impl ResolveContext {
    /// Context for the current local date.
    pub fn now() -> Self {
        ResolveContext {
            today: Local::now().date_naive(),
        }
    }

    pub fn on(today: NaiveDate) -> Self {
        ResolveContext { today }
    }
}

/// One way of reading a date off the page.
pub type DateStrategy = fn(&dyn PageQuery, NodeId, &ResolveContext) -> Option<NaiveDate>;

/// Date signals in priority order; the first hit wins.
pub const DATE_STRATEGIES: &[(&str, DateStrategy)] = &[
    ("date marker", date_from_marker),
    ("column header", date_from_column_header),
    ("location", date_from_location),
    ("view heading", date_from_heading),
];

/// Date for the grid location under `anchor`. Falls back to today, so this never fails.
pub fn resolve_date(page: &dyn PageQuery, anchor: NodeId, ctx: &ResolveContext) -> NaiveDate {
    for (name, strategy) in DATE_STRATEGIES {
        if let Some(date) = strategy(page, anchor, ctx) {
            debug!(strategy = name, %date, "resolved date");
            return date;
        }
    }
    debug!(today = %ctx.today, "no date signal on page, using today");
    ctx.today
}

/// First element in the document carrying a machine-readable date.
pub fn date_from_marker(
    page: &dyn PageQuery,
    _anchor: NodeId,
    _ctx: &ResolveContext,
) -> Option<NaiveDate> {
    let mut markers = page.find_by_attribute("data-datekey");
    markers.extend(page.find_by_attribute("data-date"));
    markers.sort();
    markers.dedup();

    markers.into_iter().find_map(|node| {
        let value = page
            .attribute(node, "data-datekey")
            .filter(|v| !v.is_empty())
            .or_else(|| page.attribute(node, "data-date"))?;
        parse_date_marker(value)
    })
}

/// Header text of the column the anchor sits in.
pub fn date_from_column_header(
    page: &dyn PageQuery,
    anchor: NodeId,
    ctx: &ResolveContext,
) -> Option<NaiveDate> {
    let column = column_index(page, anchor);
    let headers = page.find_by_role("columnheader");
    let header = headers.get(column)?;
    parse_header_day(&page.text_content(*header), ctx.today)
}

pub fn date_from_location(
    page: &dyn PageQuery,
    _anchor: NodeId,
    _ctx: &ResolveContext,
) -> Option<NaiveDate> {
    parse_location_date(page.location())
}

pub fn date_from_heading(
    page: &dyn PageQuery,
    _anchor: NodeId,
    _ctx: &ResolveContext,
) -> Option<NaiveDate> {
    let heading = page.find_by_attribute("data-view-heading").into_iter().next()?;
    parse_heading_date(&page.text_content(heading))
}

/// Ordinal of the anchor's grid cell within its row; 0 outside any cell.
pub fn column_index(page: &dyn PageQuery, anchor: NodeId) -> usize {
    page.closest_ancestor(anchor, &Selector::Role("gridcell"))
        .map(|cell| page.ordinal_index_in_parent(cell))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{ElementSpec, Page, PageSnapshot};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ctx() -> ResolveContext {
        ResolveContext::on(date(2026, 10, 18))
    }

    fn page(location: &str, children: Vec<ElementSpec>) -> Page {
        Page::from_snapshot(PageSnapshot {
            location: location.to_string(),
            root: ElementSpec::new("body").with_children(children),
        })
    }

    fn cell(id: &str) -> ElementSpec {
        ElementSpec::new("div")
            .with_attr("role", "gridcell")
            .with_attr("id", id)
    }

    fn week_grid() -> Vec<ElementSpec> {
        vec![
            ElementSpec::new("div").with_attr("role", "row").with_children([
                ElementSpec::new("div")
                    .with_attr("role", "columnheader")
                    .with_text("SUN ")
                    .with_child(ElementSpec::new("span").with_text("18")),
                ElementSpec::new("div")
                    .with_attr("role", "columnheader")
                    .with_text("MON 19"),
                ElementSpec::new("div")
                    .with_attr("role", "columnheader")
                    .with_text("TUE 20"),
            ]),
            ElementSpec::new("div")
                .with_attr("role", "grid")
                .with_child(ElementSpec::new("div").with_attr("role", "row").with_children([
                    cell("c0"),
                    cell("c1"),
                    cell("c2").with_child(ElementSpec::new("span").with_attr("id", "inner")),
                ])),
        ]
    }

    #[test]
    fn marker_wins_over_everything() {
        let mut children = week_grid();
        children.push(ElementSpec::new("div").with_attr("data-datekey", "20240115"));
        let p = page("https://cal.example.com/r/week/2025/3/3", children);
        let anchor = p.find_by_id("c1").unwrap();
        assert_eq!(resolve_date(&p, anchor, &ctx()), date(2024, 1, 15));
    }

    #[test]
    fn marker_uses_document_order_across_attributes() {
        let p = page(
            "",
            vec![
                ElementSpec::new("div").with_attr("data-date", "2024-02-01"),
                ElementSpec::new("div").with_attr("data-datekey", "2024-03-01"),
            ],
        );
        assert_eq!(
            date_from_marker(&p, p.root(), &ctx()),
            Some(date(2024, 2, 1))
        );
    }

    #[test]
    fn marker_skips_invalid_values() {
        let p = page(
            "",
            vec![
                ElementSpec::new("div").with_attr("data-date", "soon"),
                ElementSpec::new("div")
                    .with_attr("data-datekey", "")
                    .with_attr("data-date", "2024-05-06"),
            ],
        );
        assert_eq!(
            date_from_marker(&p, p.root(), &ctx()),
            Some(date(2024, 5, 6))
        );
    }

    #[test]
    fn column_header_matches_cell_position() {
        let p = page("", week_grid());
        let c0 = p.find_by_id("c0").unwrap();
        let c2 = p.find_by_id("c2").unwrap();
        assert_eq!(resolve_date(&p, c0, &ctx()), date(2026, 10, 18));
        assert_eq!(resolve_date(&p, c2, &ctx()), date(2026, 10, 20));
    }

    #[test]
    fn column_found_through_cell_ancestor() {
        let p = page("", week_grid());
        let inner = p.find_by_id("inner").unwrap();
        assert_eq!(column_index(&p, inner), 2);
        assert_eq!(column_index(&p, p.root()), 0);
    }

    #[test]
    fn location_used_when_no_headers() {
        let p = page(
            "https://cal.example.com/r/day/2024/1/15",
            vec![ElementSpec::new("div").with_attr("id", "x")],
        );
        let x = p.find_by_id("x").unwrap();
        assert_eq!(resolve_date(&p, x, &ctx()), date(2024, 1, 15));
    }

    #[test]
    fn heading_used_when_location_has_no_date() {
        let p = page(
            "https://cal.example.com/r/week",
            vec![
                ElementSpec::new("div")
                    .with_attr("data-view-heading", "")
                    .with_text("Oct 12 – 18, 2026"),
            ],
        );
        assert_eq!(resolve_date(&p, p.root(), &ctx()), date(2026, 10, 12));
    }

    #[test]
    fn header_without_day_falls_through() {
        let p = page(
            "https://cal.example.com/r/week/2024/2/2",
            vec![
                ElementSpec::new("div")
                    .with_attr("role", "columnheader")
                    .with_text("All day"),
            ],
        );
        assert_eq!(resolve_date(&p, p.root(), &ctx()), date(2024, 2, 2));
    }

    #[test]
    fn today_is_the_last_resort() {
        let p = page("about:blank", vec![]);
        assert_eq!(resolve_date(&p, p.root(), &ctx()), date(2026, 10, 18));
    }
}
