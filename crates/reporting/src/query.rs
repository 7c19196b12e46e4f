//! Campaign table query pipeline: search, status and week filters, a
//! single-key sort, and fixed-size pagination.
//!
//! Everything here is a pure function of its inputs. The caller owns the
//! `QueryState`, applies user interactions to it, and re-runs the pipeline.

use campaign_core::types::{CampaignRow, CampaignStatus};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

pub const DEFAULT_PAGE_SIZE: usize = 10;

// ─── Query state ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// Lenient parse; anything but `asc` sorts descending.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }
}

/// Sortable columns of the campaign table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Id,
    Campaign,
    Impressions,
    Clicks,
    Conversions,
    Ctr,
    Cost,
    Revenue,
    Roas,
    Status,
    Date,
    Week,
}

enum SortValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl SortField {
    pub const ALL: [SortField; 12] = [
        SortField::Id,
        SortField::Campaign,
        SortField::Impressions,
        SortField::Clicks,
        SortField::Conversions,
        SortField::Ctr,
        SortField::Cost,
        SortField::Revenue,
        SortField::Roas,
        SortField::Status,
        SortField::Date,
        SortField::Week,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Campaign => "campaign",
            SortField::Impressions => "impressions",
            SortField::Clicks => "clicks",
            SortField::Conversions => "conversions",
            SortField::Ctr => "ctr",
            SortField::Cost => "cost",
            SortField::Revenue => "revenue",
            SortField::Roas => "roas",
            SortField::Status => "status",
            SortField::Date => "date",
            SortField::Week => "week",
        }
    }

    /// Column name to field. Unknown names yield `None`, which leaves the
    /// table order untouched.
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(needle))
    }

    fn value<'a>(&self, row: &'a CampaignRow) -> SortValue<'a> {
        match self {
            SortField::Id => SortValue::Text(&row.id),
            SortField::Campaign => SortValue::Text(&row.campaign),
            SortField::Impressions => SortValue::Number(row.impressions as f64),
            SortField::Clicks => SortValue::Number(row.clicks as f64),
            SortField::Conversions => SortValue::Number(row.conversions as f64),
            SortField::Ctr => SortValue::Number(row.ctr),
            SortField::Cost => SortValue::Number(row.cost as f64),
            SortField::Revenue => SortValue::Number(row.revenue as f64),
            SortField::Roas => SortValue::Number(row.roas),
            SortField::Status => SortValue::Text(row.status.as_str()),
            SortField::Date => SortValue::Text(&row.date),
            SortField::Week => SortValue::Text(&row.week),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status dropdown: `all` or a single status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(CampaignStatus),
}

impl StatusFilter {
    /// Unknown values fall back to `All` so the filter never excludes rows.
    pub fn parse(s: &str) -> Self {
        s.parse::<CampaignStatus>()
            .map(StatusFilter::Only)
            .unwrap_or(StatusFilter::All)
    }

    pub fn matches(&self, status: CampaignStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(status) => write!(f, "{status}"),
        }
    }
}

/// Table interaction state, owned by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    pub search_term: String,
    pub status_filter: StatusFilter,
    pub sort_field: Option<SortField>,
    pub sort_direction: SortDirection,
    pub selected_week: Option<String>,
    /// 1-based.
    pub current_page: usize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            status_filter: StatusFilter::All,
            sort_field: Some(SortField::Revenue),
            sort_direction: SortDirection::Desc,
            selected_week: None,
            current_page: 1,
        }
    }
}

impl QueryState {
    fn matches(&self, row: &CampaignRow, needle: &str) -> bool {
        (needle.is_empty() || row.campaign.to_lowercase().contains(needle))
            && self.status_filter.matches(row.status)
            && self
                .selected_week
                .as_deref()
                .is_none_or(|week| row.week == week)
    }

    /// Clicking the active column flips direction; another column becomes the
    /// key and starts descending.
    pub fn toggle_sort(&mut self, field: SortField) {
        if self.sort_field == Some(field) {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_field = Some(field);
            self.sort_direction = SortDirection::Desc;
        }
    }

    pub fn select_week(&mut self, week: &str) {
        self.selected_week = toggle_week(self.selected_week.as_deref(), week);
    }

    pub fn clear_week(&mut self) {
        self.selected_week = None;
    }

    /// Keeps `current_page` within `[1, total_pages]`.
    pub fn clamp_page(&mut self, total_filtered: usize, page_size: usize) {
        let last = total_pages(total_filtered, page_size);
        self.current_page = self.current_page.clamp(1, last);
    }

    pub fn next_page(&mut self, total_pages: usize) {
        self.current_page = (self.current_page + 1).min(total_pages.max(1));
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }
}

/// Week selection from the chart: clicking the selected week clears it.
pub fn toggle_week(current: Option<&str>, clicked: &str) -> Option<String> {
    match current {
        Some(week) if week == clicked => None,
        _ => Some(clicked.to_string()),
    }
}

// ─── Pipeline ───────────────────────────────────────────────────────────────

/// One rendered page plus the counts the pager needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePage {
    pub rows: Vec<CampaignRow>,
    pub total_filtered: usize,
    pub total_pages: usize,
    pub current_page: usize,
    /// 1-based index of the first row shown, 0 when the page is empty.
    pub showing_from: usize,
    pub showing_to: usize,
}

/// Number of pages, never less than one.
pub fn total_pages(total_filtered: usize, page_size: usize) -> usize {
    total_filtered.div_ceil(page_size.max(1)).max(1)
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn compare_rows(a: &CampaignRow, b: &CampaignRow, field: SortField) -> Ordering {
    match (field.value(a), field.value(b)) {
        (SortValue::Text(x), SortValue::Text(y)) => compare_text(x, y),
        (SortValue::Number(x), SortValue::Number(y)) => x.total_cmp(&y),
        _ => Ordering::Equal,
    }
}

/// Filters and sorts without paginating; this is what the export writes.
pub fn filter_and_sort(rows: &[CampaignRow], state: &QueryState) -> Vec<CampaignRow> {
    let needle = state.search_term.to_lowercase();
    let mut filtered: Vec<CampaignRow> = rows
        .iter()
        .filter(|row| state.matches(row, &needle))
        .cloned()
        .collect();

    if let Some(field) = state.sort_field {
        filtered.sort_by(|a, b| {
            let ord = compare_rows(a, b, field);
            match state.sort_direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
    }

    debug!(
        total = rows.len(),
        filtered = filtered.len(),
        search = %state.search_term,
        status = %state.status_filter,
        week = ?state.selected_week,
        sort = ?state.sort_field,
        "Filtered campaign table"
    );
    filtered
}

pub fn query_table(rows: &[CampaignRow], state: &QueryState) -> TablePage {
    query_table_with_page_size(rows, state, DEFAULT_PAGE_SIZE)
}

pub fn query_table_with_page_size(
    rows: &[CampaignRow],
    state: &QueryState,
    page_size: usize,
) -> TablePage {
    let page_size = page_size.max(1);
    let filtered = filter_and_sort(rows, state);
    let total_filtered = filtered.len();
    let current_page = state.current_page.max(1);

    let start = (current_page - 1).saturating_mul(page_size);
    let page_rows: Vec<CampaignRow> = filtered
        .into_iter()
        .skip(start)
        .take(page_size)
        .collect();

    let (showing_from, showing_to) = if page_rows.is_empty() {
        (0, 0)
    } else {
        (start + 1, start + page_rows.len())
    };

    TablePage {
        rows: page_rows,
        total_filtered,
        total_pages: total_pages(total_filtered, page_size),
        current_page,
        showing_from,
        showing_to,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::types::CampaignCounters;
    use chrono::NaiveDate;

    const NAMES: [&str; 10] = [
        "Black Friday Sale",
        "Spring Collection",
        "Brand Awareness Q4",
        "Retargeting Campaign",
        "Product Launch",
        "Holiday Special",
        "Newsletter Signup",
        "Video Ad Campaign",
        "Search Campaign",
        "Display Network",
    ];

    fn make_row(index: usize, name: &str) -> CampaignRow {
        let statuses = CampaignStatus::ALL;
        let n = index as u64;
        CampaignRow::new(
            format!("campaign-{}", index + 1),
            name,
            CampaignCounters {
                impressions: 50_000 + n * 7_919 % 100_000,
                clicks: 1_000 + n * 331 % 4_000,
                conversions: 20 + n * 17 % 200,
                cost: 1_000 + n * 613 % 5_000,
                revenue: 2_000 + (n * 4_271) % 9_000,
            },
            statuses[index % 3],
            NaiveDate::from_ymd_opt(2026, 1, 1 + index as u32).unwrap(),
            format!("Week {}", index % 4 + 1),
        )
    }

    fn make_rows(count: usize) -> Vec<CampaignRow> {
        (0..count)
            .map(|i| make_row(i, NAMES[i % NAMES.len()]))
            .collect()
    }

    // 1. Filters ------------------------------------------------------------

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let rows = make_rows(10);
        let state = QueryState {
            search_term: "Sale".into(),
            ..Default::default()
        };
        let page = query_table(&rows, &state);
        assert_eq!(page.total_filtered, 1);
        assert_eq!(page.rows[0].campaign, "Black Friday Sale");

        let state = QueryState {
            search_term: "CAMPAIGN".into(),
            ..Default::default()
        };
        let page = query_table(&rows, &state);
        assert_eq!(page.total_filtered, 3);
        assert!(page
            .rows
            .iter()
            .all(|r| r.campaign.to_lowercase().contains("campaign")));
    }

    #[test]
    fn test_empty_search_matches_all() {
        let rows = make_rows(10);
        let page = query_table(&rows, &QueryState::default());
        assert_eq!(page.total_filtered, 10);
    }

    #[test]
    fn test_status_filter() {
        let rows = make_rows(10);
        let state = QueryState {
            status_filter: StatusFilter::Only(CampaignStatus::Paused),
            ..Default::default()
        };
        let page = query_table(&rows, &state);
        assert_eq!(page.total_filtered, 3);
        assert!(page.rows.iter().all(|r| r.status == CampaignStatus::Paused));
    }

    #[test]
    fn test_unknown_status_never_excludes() {
        assert_eq!(StatusFilter::parse("archived"), StatusFilter::All);
        assert_eq!(StatusFilter::parse("all"), StatusFilter::All);
        assert_eq!(
            StatusFilter::parse("Ended"),
            StatusFilter::Only(CampaignStatus::Ended)
        );
    }

    #[test]
    fn test_week_filter_and_toggle() {
        let rows = make_rows(10);
        let mut state = QueryState::default();
        let before = query_table(&rows, &state).total_filtered;

        state.select_week("Week 2");
        let page = query_table(&rows, &state);
        assert!(page.rows.iter().all(|r| r.week == "Week 2"));
        assert!(page.total_filtered < before);

        state.select_week("Week 2");
        assert_eq!(state.selected_week, None);
        assert_eq!(query_table(&rows, &state).total_filtered, before);
    }

    #[test]
    fn test_toggle_week_switches_between_weeks() {
        assert_eq!(toggle_week(None, "Week 1"), Some("Week 1".to_string()));
        assert_eq!(
            toggle_week(Some("Week 1"), "Week 3"),
            Some("Week 3".to_string())
        );
        assert_eq!(toggle_week(Some("Week 3"), "Week 3"), None);
    }

    // 2. Sorting ------------------------------------------------------------

    #[test]
    fn test_sort_is_monotonic_for_every_field_and_direction() {
        let rows = make_rows(23);
        for field in SortField::ALL {
            for direction in [SortDirection::Asc, SortDirection::Desc] {
                let state = QueryState {
                    sort_field: Some(field),
                    sort_direction: direction,
                    ..Default::default()
                };
                let sorted = filter_and_sort(&rows, &state);
                for pair in sorted.windows(2) {
                    let ord = compare_rows(&pair[0], &pair[1], field);
                    match direction {
                        SortDirection::Asc => assert_ne!(ord, Ordering::Greater, "{field} asc"),
                        SortDirection::Desc => assert_ne!(ord, Ordering::Less, "{field} desc"),
                    }
                }
            }
        }
    }

    #[test]
    fn test_toggling_direction_reverses_distinct_keys() {
        let rows = make_rows(10);
        let mut state = QueryState {
            sort_field: Some(SortField::Campaign),
            sort_direction: SortDirection::Asc,
            ..Default::default()
        };
        let asc: Vec<String> = filter_and_sort(&rows, &state)
            .into_iter()
            .map(|r| r.campaign)
            .collect();
        state.toggle_sort(SortField::Campaign);
        assert_eq!(state.sort_direction, SortDirection::Desc);
        let mut desc: Vec<String> = filter_and_sort(&rows, &state)
            .into_iter()
            .map(|r| r.campaign)
            .collect();
        desc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn test_new_sort_field_resets_to_desc() {
        let mut state = QueryState {
            sort_field: Some(SortField::Revenue),
            sort_direction: SortDirection::Asc,
            ..Default::default()
        };
        state.toggle_sort(SortField::Clicks);
        assert_eq!(state.sort_field, Some(SortField::Clicks));
        assert_eq!(state.sort_direction, SortDirection::Desc);
    }

    #[test]
    fn test_text_sort_ignores_case() {
        let mut rows = make_rows(3);
        rows[0].campaign = "beta".into();
        rows[1].campaign = "Alpha".into();
        rows[2].campaign = "Gamma".into();
        let state = QueryState {
            sort_field: Some(SortField::Campaign),
            sort_direction: SortDirection::Asc,
            ..Default::default()
        };
        let names: Vec<String> = filter_and_sort(&rows, &state)
            .into_iter()
            .map(|r| r.campaign)
            .collect();
        assert_eq!(names, vec!["Alpha", "beta", "Gamma"]);
    }

    #[test]
    fn test_unknown_sort_field_keeps_order() {
        assert_eq!(SortField::parse("budget"), None);
        assert_eq!(SortField::parse("ROAS"), Some(SortField::Roas));

        let rows = make_rows(10);
        let state = QueryState {
            sort_field: SortField::parse("budget"),
            ..Default::default()
        };
        assert_eq!(filter_and_sort(&rows, &state), rows);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let mut rows = make_rows(6);
        for row in rows.iter_mut() {
            row.week = "Week 1".into();
        }
        let state = QueryState {
            sort_field: Some(SortField::Week),
            ..Default::default()
        };
        let ids: Vec<String> = filter_and_sort(&rows, &state)
            .into_iter()
            .map(|r| r.id)
            .collect();
        let original: Vec<String> = rows.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, original);
    }

    // 3. Pagination ---------------------------------------------------------

    #[test]
    fn test_pages_cover_all_rows() {
        let rows = make_rows(23);
        let mut state = QueryState::default();
        let first = query_table(&rows, &state);
        assert_eq!(first.total_pages, 3);

        let mut seen = 0;
        for p in 1..=first.total_pages {
            state.current_page = p;
            let page = query_table(&rows, &state);
            if p < first.total_pages {
                assert_eq!(page.rows.len(), DEFAULT_PAGE_SIZE);
            }
            seen += page.rows.len();
        }
        assert_eq!(seen, first.total_filtered);
    }

    #[test]
    fn test_showing_range() {
        let rows = make_rows(23);
        let state = QueryState {
            current_page: 3,
            ..Default::default()
        };
        let page = query_table(&rows, &state);
        assert_eq!(page.rows.len(), 3);
        assert_eq!((page.showing_from, page.showing_to), (21, 23));
    }

    #[test]
    fn test_empty_result_is_single_empty_page() {
        let rows = make_rows(10);
        let state = QueryState {
            search_term: "no such campaign".into(),
            ..Default::default()
        };
        let page = query_table(&rows, &state);
        assert!(page.rows.is_empty());
        assert_eq!(page.total_filtered, 0);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, 1);
        assert_eq!((page.showing_from, page.showing_to), (0, 0));
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let rows = make_rows(5);
        let state = QueryState {
            current_page: 4,
            ..Default::default()
        };
        let page = query_table(&rows, &state);
        assert!(page.rows.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_clamp_page_after_shrink() {
        let mut state = QueryState {
            current_page: 3,
            ..Default::default()
        };
        state.clamp_page(12, DEFAULT_PAGE_SIZE);
        assert_eq!(state.current_page, 2);
        state.clamp_page(0, DEFAULT_PAGE_SIZE);
        assert_eq!(state.current_page, 1);
    }

    #[test]
    fn test_pager_moves_are_bounded() {
        let mut state = QueryState::default();
        state.previous_page();
        assert_eq!(state.current_page, 1);
        state.next_page(2);
        state.next_page(2);
        assert_eq!(state.current_page, 2);
    }

    #[test]
    fn test_custom_page_size() {
        let rows = make_rows(23);
        let page = query_table_with_page_size(&rows, &QueryState::default(), 5);
        assert_eq!(page.rows.len(), 5);
        assert_eq!(page.total_pages, 5);
    }

    #[test]
    fn test_nan_ratio_sorts_after_numbers() {
        let mut rows = make_rows(12);
        rows[3].ctr = f64::NAN;
        rows[8].roas = f64::NAN;

        let asc = QueryState {
            sort_field: Some(SortField::Ctr),
            sort_direction: SortDirection::Asc,
            ..Default::default()
        };
        let sorted = filter_and_sort(&rows, &asc);
        assert_eq!(sorted.len(), 12);
        assert_eq!(sorted[11].id, rows[3].id);
        assert!(sorted[..11].windows(2).all(|w| w[0].ctr <= w[1].ctr));

        let desc = QueryState {
            sort_field: Some(SortField::Roas),
            ..Default::default()
        };
        let sorted = filter_and_sort(&rows, &desc);
        assert_eq!(sorted[0].id, rows[8].id);
        assert!(sorted[1..].windows(2).all(|w| w[0].roas >= w[1].roas));
    }

    // 4. Purity -------------------------------------------------------------

    #[test]
    fn test_same_state_same_output() {
        let rows = make_rows(23);
        let before = rows.clone();
        let state = QueryState {
            search_term: "a".into(),
            sort_field: Some(SortField::Ctr),
            current_page: 2,
            ..Default::default()
        };
        let first = query_table(&rows, &state);
        let second = query_table(&rows, &state);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(rows, before);
    }
}
