//! Integration tests for filter state and fetch orchestration

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use vysyamala_dashboard::screens::{DailyWorkFilters, MarriageFilters};
use vysyamala_dashboard::{
    CountKey, DailyWork, DashboardController, DashboardError, Delete, FetchOutcome, Gender,
    Marriage, SortOrder, TableView,
};

fn row_ids<R>(rows: &[R], id: impl Fn(&R) -> &str) -> Vec<String> {
    rows.iter().map(|r| id(r).to_string()).collect()
}

/// Only the most recently issued fetch may commit
#[tokio::test]
async fn test_older_response_never_overwrites_newer() {
    init_test_logging();

    let transport = ScriptedTransport::new();
    let gate_a = transport.push_gated();
    transport.push_json(marriage_body(1, &[("VYS-B", "Bala")]));

    let controller = DashboardController::<Marriage, _>::new(Arc::clone(&transport), admin());

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.apply_filters().await }
    });
    transport.wait_for_requests(1).await;

    let second = controller.apply_filters().await;
    assert!(second.is_committed());

    // A resolves after B; its receiver may already be gone
    let _ = gate_a.send(Ok(marriage_body(3, &[("VYS-A", "Anu")])));
    let first = first.await.unwrap();
    assert!(first.is_superseded());

    assert_eq!(
        row_ids(&controller.rows(), |r| r.profile_id.as_str()),
        ["VYS-B"]
    );
    assert_eq!(controller.summary().unwrap().total_profiles.get(), 1);
    assert!(!controller.is_loading());
}

#[tokio::test]
async fn test_superseded_fetch_leaves_loading_flag_to_newer_fetch() {
    init_test_logging();

    let transport = ScriptedTransport::new();
    let _gate_a = transport.push_gated();
    let gate_b = transport.push_gated();

    let controller = DashboardController::<Marriage, _>::new(Arc::clone(&transport), admin());

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.apply_filters().await }
    });
    transport.wait_for_requests(1).await;

    let second = tokio::spawn({
        let controller = controller.clone();
        async move { controller.apply_filters().await }
    });
    transport.wait_for_requests(2).await;

    assert!(first.await.unwrap().is_superseded());
    assert!(controller.is_loading());
    assert_eq!(controller.table_view(), TableView::Loading);

    gate_b
        .send(Ok(marriage_body(0, &[("VYS-B", "Bala")])))
        .unwrap();
    assert!(second.await.unwrap().is_committed());
    assert!(!controller.is_loading());
}

/// A fetch abandoned by its caller must not leave the screen loading
#[tokio::test]
async fn test_dropped_fetch_clears_loading_flag() {
    init_test_logging();

    let transport = ScriptedTransport::new();
    transport.push_json(marriage_body(2, &[("VYS1", "John"), ("VYS2", "Jane")]));
    let _gate = transport.push_gated();

    let controller = DashboardController::<Marriage, _>::new(Arc::clone(&transport), admin());
    assert!(controller.apply_filters().await.is_committed());

    let timed_out = tokio::time::timeout(Duration::from_millis(50), controller.apply_filters())
        .await
        .is_err();
    assert!(timed_out);

    assert!(!controller.is_loading());
    assert_eq!(controller.set_search_query("jo"), 1);
    assert!(matches!(controller.table_view(), TableView::Rows(rows) if rows.len() == 1));
}

#[tokio::test]
async fn test_dropped_superseded_fetch_keeps_newer_loading_flag() {
    let transport = ScriptedTransport::new();
    let _gate_a = transport.push_gated();
    let gate_b = transport.push_gated();

    let controller = DashboardController::<Marriage, _>::new(Arc::clone(&transport), admin());

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.apply_filters().await }
    });
    transport.wait_for_requests(1).await;

    let second = tokio::spawn({
        let controller = controller.clone();
        async move { controller.apply_filters().await }
    });
    transport.wait_for_requests(2).await;

    first.abort();
    let _ = first.await;
    assert!(controller.is_loading());

    gate_b
        .send(Ok(marriage_body(1, &[("VYS-B", "Bala")])))
        .unwrap();
    assert!(second.await.unwrap().is_committed());
    assert!(!controller.is_loading());
}

#[tokio::test]
async fn test_cancel_discards_in_flight_response() {
    let transport = ScriptedTransport::new();
    let gate = transport.push_gated();

    let controller = DashboardController::<Delete, _>::new(Arc::clone(&transport), admin());
    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.apply_filters().await }
    });
    transport.wait_for_requests(1).await;

    controller.cancel();
    assert!(!controller.is_loading());

    let _ = gate.send(Ok(json!({"status": true, "total_deleted": 9, "data": []})));
    assert!(pending.await.unwrap().is_superseded());
    assert!(controller.summary().is_none());
    assert_eq!(controller.table_view(), TableView::Idle);
}

#[tokio::test]
async fn test_card_clicked_twice_drops_count_filter() {
    let transport = ScriptedTransport::new();
    transport.push_json(marriage_body(2, &[("VYS1", "John")]));
    transport.push_json(marriage_body(2, &[("VYS1", "John")]));

    let controller = DashboardController::<Marriage, _>::new(Arc::clone(&transport), admin());
    let premium = CountKey::new("premium");

    assert!(controller.click_card(&premium).await.is_committed());
    assert_eq!(transport.query(0).get("countFilter"), Some("premium"));
    assert_eq!(controller.active_card(), Some(premium.clone()));
    assert!(controller.take_scroll_request());
    assert!(!controller.take_scroll_request());

    assert!(controller.click_card(&premium).await.is_committed());
    assert!(!transport.query(1).contains("countFilter"));
    assert_eq!(controller.active_card(), None);
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn test_marriage_card_click_resets_search_gender_and_order() {
    let transport = ScriptedTransport::new();
    transport.push_json(marriage_body(2, &[("VYS1", "John"), ("VYS2", "Jane")]));

    let controller = DashboardController::<Marriage, _>::new(Arc::clone(&transport), admin());
    controller.set_filters(|f| {
        f.search_query = "jo".to_string();
        f.gender = Some(Gender::Male);
        f.order = SortOrder::Asc;
    });

    controller.click_card(&CountKey::new("premium_tn")).await;

    let query = transport.query(0);
    assert_eq!(query.get("countFilter"), Some("premium_tn"));
    assert_eq!(query.get("order_by"), Some("desc"));
    assert!(!query.contains("genderFilter"));
    assert_eq!(controller.rows().len(), 2);
}

#[tokio::test]
async fn test_reset_restores_defaults_and_fetches_once() {
    let transport = ScriptedTransport::new();
    transport.push_json(marriage_body(0, &[]));

    let controller = DashboardController::<Marriage, _>::new(Arc::clone(&transport), staff());
    controller.set_filters(|f| {
        f.from_date = "2025-01-01".to_string();
        f.profile_id = "VYS77".to_string();
        f.order = SortOrder::Asc;
        f.count_filter.toggle(&CountKey::new("fake"));
    });
    assert_eq!(transport.request_count(), 0);

    controller.reset_filters().await;

    assert_eq!(transport.request_count(), 1);
    assert_eq!(
        controller.filters(),
        MarriageFilters {
            owner: "15".to_string(),
            ..MarriageFilters::default()
        }
    );
    assert_eq!(transport.query(0).to_query_string(), "order_by=desc&owner=15");
}

#[tokio::test]
async fn test_privileged_reset_clears_owner() {
    let transport = ScriptedTransport::new();
    transport.push_json(daily_work_body(&[]));

    let controller = DashboardController::<DailyWork, _>::new(Arc::clone(&transport), admin());
    controller.select_staff("42");
    controller.reset_filters().await;

    assert_eq!(controller.filters(), DailyWorkFilters::default());
    assert!(transport.query(0).is_empty());
}

#[tokio::test]
async fn test_non_privileged_owner_is_scoped_to_self() {
    let transport = ScriptedTransport::new();
    transport.push_json(marriage_body(0, &[]));

    let controller = DashboardController::<Marriage, _>::new(Arc::clone(&transport), staff());
    controller.set_filters(|f| f.owner = "99".to_string());
    controller.apply_filters().await;

    assert_eq!(transport.query(0).get("owner"), Some("15"));
}

#[tokio::test]
async fn test_filter_edits_wait_for_apply() {
    let transport = ScriptedTransport::new();
    transport.push_json(daily_work_body(&["VYS1"]));

    let controller = DashboardController::<DailyWork, _>::new(Arc::clone(&transport), admin());
    let filters = controller.select_staff("42");
    assert_eq!(filters.staff, "42");
    assert_eq!(transport.request_count(), 0);

    let marriage = DashboardController::<Marriage, _>::new(Arc::clone(&transport), admin());
    marriage.set_gender(Some(Gender::Female));
    assert_eq!(transport.request_count(), 0);

    controller.apply_filters().await;
    assert_eq!(transport.query(0).get("owner"), Some("42"));
}

#[tokio::test]
async fn test_select_staff_clears_card_selection() {
    let transport = ScriptedTransport::new();
    transport.push_json(daily_work_body(&["VYS1"]));

    let controller = DashboardController::<DailyWork, _>::new(Arc::clone(&transport), admin());
    controller.click_card(&CountKey::new("reg_today_work")).await;
    assert!(controller.filters().count_filter.get().is_some());

    controller.select_staff("7");
    assert_eq!(controller.filters().count_filter.get(), None);
}

#[tokio::test]
async fn test_sort_toggle_fetches_immediately() {
    let transport = ScriptedTransport::new();
    transport.push_json(marriage_body(0, &[]));

    let controller = DashboardController::<Marriage, _>::new(Arc::clone(&transport), admin());
    controller.toggle_sort_order().await;

    assert_eq!(transport.request_count(), 1);
    assert_eq!(transport.query(0).get("order_by"), Some("asc"));
}

#[tokio::test]
async fn test_text_filter_over_fetched_rows() {
    let transport = ScriptedTransport::new();
    transport.push_json(marriage_body(2, &[("VYS1", "John"), ("VYS2", "Jane")]));

    let controller = DashboardController::<Marriage, _>::new(Arc::clone(&transport), admin());
    controller.apply_filters().await;

    assert_eq!(controller.set_search_query("jo"), 1);
    assert_eq!(row_ids(&controller.rows(), |r| r.profile_id.as_str()), ["VYS1"]);

    assert_eq!(controller.clear_search(), 2);
    assert_eq!(row_ids(&controller.rows(), |r| r.profile_id.as_str()), ["VYS1", "VYS2"]);
    assert_eq!(controller.all_rows().len(), 2);
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn test_text_filter_waits_for_in_flight_fetch() {
    let transport = ScriptedTransport::new();
    transport.push_json(marriage_body(1, &[("VYS9", "Mani")]));
    let gate = transport.push_gated();

    let controller = DashboardController::<Marriage, _>::new(Arc::clone(&transport), admin());
    controller.apply_filters().await;

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.apply_filters().await }
    });
    transport.wait_for_requests(2).await;

    // Deferred: the old rows are not re-filtered while loading
    assert_eq!(controller.set_search_query("jo"), 1);

    gate.send(Ok(marriage_body(2, &[("VYS1", "John"), ("VYS2", "Jane")])))
        .unwrap();
    assert!(pending.await.unwrap().is_committed());
    assert_eq!(row_ids(&controller.rows(), |r| r.profile_id.as_str()), ["VYS1"]);
}

#[tokio::test]
async fn test_empty_rows_render_no_records() {
    let transport = ScriptedTransport::new();
    assert_eq!(
        DashboardController::<Marriage, _>::new(Arc::clone(&transport), admin()).table_view(),
        TableView::Idle
    );

    transport.push_json(marriage_body(0, &[]));
    let controller = DashboardController::<Marriage, _>::new(Arc::clone(&transport), admin());
    assert!(controller.apply_filters().await.is_committed());
    assert_eq!(controller.table_view(), TableView::NoRecords);
    assert!(controller.last_error().is_none());
}

#[tokio::test]
async fn test_failure_keeps_previous_data() {
    let transport = ScriptedTransport::new();
    transport.push_json(marriage_body(1, &[("VYS1", "John")]));
    transport.push_error(DashboardError::Status {
        path: "api/marriage-report/".to_string(),
        status: 502,
    });

    let controller = DashboardController::<Marriage, _>::new(Arc::clone(&transport), admin());
    controller.apply_filters().await;
    let outcome = controller.apply_filters().await;

    assert!(matches!(outcome, FetchOutcome::Failed(DashboardError::Status { status: 502, .. })));
    assert!(!controller.is_loading());
    assert!(controller.last_error().unwrap().contains("502"));
    assert_eq!(controller.rows().len(), 1);
    assert_eq!(controller.summary().unwrap().total_profiles.get(), 1);
    assert!(matches!(controller.table_view(), TableView::Rows(_)));
}

#[tokio::test]
async fn test_failure_without_data_renders_error_state() {
    let transport = ScriptedTransport::new();
    transport.push_json(json!({"status": false, "message": "Owner not found"}));

    let controller = DashboardController::<Delete, _>::new(Arc::clone(&transport), admin());
    let outcome = controller.apply_filters().await;

    assert!(matches!(outcome, FetchOutcome::Failed(DashboardError::Unsuccessful { .. })));
    assert!(matches!(controller.table_view(), TableView::Failed(msg) if msg.contains("Owner not found")));
}

#[tokio::test]
async fn test_cards_follow_committed_summary() {
    let transport = ScriptedTransport::new();
    transport.push_json(marriage_body(12, &[]));

    let controller = DashboardController::<Marriage, _>::new(Arc::clone(&transport), admin());
    assert!(controller.cards().is_empty());

    controller.apply_filters().await;
    let sections = controller.cards();
    assert_eq!(sections[0].cards[0].value.get(), 12);
    assert_eq!(sections[0].cards[1].display_value(), "4 - 3/1");
}
