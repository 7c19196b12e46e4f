//! End-to-end flow: generate a batch, narrow it by date, query the table,
//! and export the result.

use campaign_core::types::{CampaignCounters, CampaignRow, CampaignStatus, DateInterval};
use campaign_reporting::{
    export_csv, filter_by_date_range, query_table, DataGenerator, QueryState, SortDirection,
    SortField, StatusFilter, DEFAULT_PAGE_SIZE,
};
use chrono::NaiveDate;

fn anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

fn fixture_rows() -> Vec<CampaignRow> {
    DataGenerator::seeded(2024)
        .with_anchor(anchor())
        .generate_batch()
        .campaigns
}

#[test]
fn test_sale_search_on_generated_batch() {
    let rows = fixture_rows();
    let state = QueryState {
        search_term: "Sale".into(),
        ..Default::default()
    };
    let page = query_table(&rows, &state);
    assert_eq!(page.total_filtered, 1);
    assert_eq!(page.rows[0].campaign, "Black Friday Sale");
    assert_eq!(page.total_pages, 1);
}

#[test]
fn test_date_then_query_then_export() {
    let rows = fixture_rows();
    let interval = DateInterval::new(
        anchor() - chrono::Days::new(180),
        anchor(),
    );
    let in_range = filter_by_date_range(&rows, Some(&interval));
    assert!(in_range.len() <= rows.len());

    let state = QueryState {
        sort_field: Some(SortField::Roas),
        sort_direction: SortDirection::Asc,
        ..Default::default()
    };
    let page = query_table(&in_range, &state);
    assert_eq!(page.total_filtered, in_range.len());
    assert!(page.rows.windows(2).all(|w| w[0].roas <= w[1].roas));

    match export_csv(&page.rows).unwrap() {
        Some(csv) => {
            assert!(csv.starts_with("id,campaign,"));
            assert_eq!(csv.lines().count(), page.rows.len() + 1);
        }
        None => assert!(page.rows.is_empty()),
    }
}

#[test]
fn test_every_status_partition_adds_up() {
    let rows = fixture_rows();
    let total: usize = CampaignStatus::ALL
        .iter()
        .map(|status| {
            let state = QueryState {
                status_filter: StatusFilter::Only(*status),
                ..Default::default()
            };
            query_table(&rows, &state).total_filtered
        })
        .sum();
    assert_eq!(total, rows.len());
}

#[test]
fn test_paging_a_large_table() {
    let rows: Vec<CampaignRow> = (0..37)
        .map(|i| {
            CampaignRow::new(
                format!("campaign-{}", i + 1),
                format!("Campaign {i:02}"),
                CampaignCounters {
                    impressions: 100_000,
                    clicks: 1_000 + i,
                    conversions: 10,
                    cost: 1_000,
                    revenue: 500 * (i + 1),
                },
                CampaignStatus::Active,
                anchor(),
                "Week 1",
            )
        })
        .collect();

    let mut state = QueryState::default();
    let first = query_table(&rows, &state);
    assert_eq!(first.total_pages, 4);
    assert_eq!(first.rows[0].id, "campaign-37");

    let mut collected = Vec::new();
    for page in 1..=first.total_pages {
        state.current_page = page;
        let result = query_table(&rows, &state);
        if page < first.total_pages {
            assert_eq!(result.rows.len(), DEFAULT_PAGE_SIZE);
        }
        collected.extend(result.rows);
    }
    assert_eq!(collected.len(), 37);
    assert!(collected.windows(2).all(|w| w[0].revenue >= w[1].revenue));
}
