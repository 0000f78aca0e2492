//! Two-phase API sources: search pages are re-read every run, detail pages once.

mod common;

use std::time::Duration;

use bikeacquire::scrapers::{Orchestrator, SourceState};
use common::*;

fn upstream() -> MockFetcher {
    MockFetcher::new()
        .page(
            &api_url(1),
            api_page(vec![
                api_record("avenger-1", Some("₹ 65,000")),
                api_record("avenger-2", Some("₹ 70,000")),
            ]),
        )
        .page(&api_url(2), api_page(vec![]))
        .page(&detail_url("avenger-1"), detail_page("2 Owner", "12000 Km"))
        .page(&detail_url("avenger-2"), detail_page("3 Owner", "45000 Km Driven"))
}

#[tokio::test]
async fn test_detail_pages_merge_into_listings() {
    let fetcher = upstream();
    let (_dir, store) = temp_store();

    let report = Orchestrator::new(&fetcher, &store)
        .run_source(&api_source(), None)
        .await;

    assert_eq!(report.listings_persisted, 2);
    assert_eq!(report.pages_scraped, 2);
    assert_eq!(
        fetcher.calls(),
        vec![
            api_url(1),
            detail_url("avenger-1"),
            detail_url("avenger-2"),
            api_url(2)
        ]
    );

    let stored = store.listings().all().unwrap();
    let second = &stored[1].listing;
    assert_eq!(second.owner, "3 Owner");
    assert_eq!(second.kms_driven, "45000 Km Driven");
    assert_eq!(second.mileage.as_deref(), Some("45 kmpl"));
    assert_eq!(second.engine.as_deref(), Some("220 cc"));
    assert_eq!(second.model_year, "2017");
    assert_eq!(second.location, "Gurgaon");
    assert_eq!(second.detail_url.as_deref(), Some(detail_url("avenger-2").as_str()));
}

#[tokio::test]
async fn test_visited_detail_not_refetched_by_new_orchestrator() {
    let fetcher = upstream();
    let (_dir, store) = temp_store();
    let source = api_source();

    Orchestrator::new(&fetcher, &store)
        .run_source(&source, None)
        .await;
    let second = Orchestrator::new(&fetcher, &store)
        .run_source(&source, None)
        .await;

    assert_eq!(second.details_skipped, 2);
    assert_eq!(second.listings_persisted, 0);
    assert_eq!(fetcher.calls_to(&detail_url("avenger-1")), 1);
    assert_eq!(fetcher.calls_to(&detail_url("avenger-2")), 1);
    // search pages themselves are never marked
    assert_eq!(fetcher.calls_to(&api_url(1)), 2);
    assert!(!store.visited().contains(&api_url(1)).unwrap());
    assert_eq!(store.listings().count().unwrap(), 2);
}

#[tokio::test]
async fn test_failed_detail_is_retried() {
    let fetcher = upstream().status(&detail_url("avenger-2"), 500);
    let (_dir, store) = temp_store();
    let source = api_source();

    let first = Orchestrator::new(&fetcher, &store)
        .run_source(&source, None)
        .await;
    assert_eq!(first.details_failed, 1);
    assert_eq!(first.listings_persisted, 1);
    assert!(!store.visited().contains(&detail_url("avenger-2")).unwrap());

    Orchestrator::new(&fetcher, &store)
        .run_source(&source, None)
        .await;
    assert_eq!(fetcher.calls_to(&detail_url("avenger-2")), 2);
    assert_eq!(fetcher.calls_to(&detail_url("avenger-1")), 1);
}

#[tokio::test]
async fn test_discarded_record_is_still_marked() {
    let fetcher = MockFetcher::new()
        .page(&api_url(1), api_page(vec![api_record("no-price", None)]))
        .page(&api_url(2), api_page(vec![]))
        .page(&detail_url("no-price"), detail_page("1 Owner", "500 Km"));
    let (_dir, store) = temp_store();

    let report = Orchestrator::new(&fetcher, &store)
        .run_source(&api_source(), None)
        .await;

    assert_eq!(report.records_discarded, 1);
    assert_eq!(store.listings().count().unwrap(), 0);
    assert!(store.visited().contains(&detail_url("no-price")).unwrap());
}

#[tokio::test]
async fn test_detail_shared_across_contexts_fetched_once() {
    let fetcher = upstream();
    let (_dir, store) = temp_store();
    let mut source = api_source();
    source.context = Some(bikeacquire::scrapers::ContextConfig {
        cookie: "city".to_string(),
        values: vec!["Delhi".to_string(), "Pune".to_string()],
    });

    let report = Orchestrator::new(&fetcher, &store)
        .run_all(&[source])
        .await;

    assert_eq!(report.sources.len(), 2);
    assert_eq!(fetcher.calls_to(&api_url(1)), 2);
    assert_eq!(fetcher.calls_to(&detail_url("avenger-1")), 1);
    assert_eq!(report.sources[1].details_skipped, 2);
    assert_eq!(report.listings_persisted(), 2);
}

#[tokio::test]
async fn test_api_only_mode_skips_detail_fetch() {
    let fetcher = MockFetcher::new()
        .page(
            &api_url(1),
            api_page(vec![serde_json::json!({
                "title": "Hero Splendor Plus 2019",
                "price": "₹ 40,000",
                "owner_count": 2,
                "locations": "Noida",
                "kms": "15000 km",
                "slug": "splendor"
            })]),
        )
        .page(&api_url(2), api_page(vec![]));
    let (_dir, store) = temp_store();
    let mut source = api_source();
    source.follow_details = false;
    if let bikeacquire::scrapers::ExtractorConfig::ApiDetail(api) = &mut source.extractor {
        api.kms_field = Some("kms".to_string());
    }

    let report = Orchestrator::new(&fetcher, &store)
        .run_source(&source, None)
        .await;

    assert_eq!(report.listings_persisted, 1);
    assert_eq!(fetcher.calls_to(&detail_url("splendor")), 0);
    let stored = store.listings().all().unwrap();
    assert_eq!(stored[0].listing.owner, "2 Owner");
    assert_eq!(stored[0].listing.model_year, "2019");
    assert!(store.visited().contains(&detail_url("splendor")).unwrap());
}

/// Search pages 1 and 3 hold one record each, page 2 fails.
fn upstream_with_failed_search_page(status: u16) -> MockFetcher {
    MockFetcher::new()
        .page(&api_url(1), api_page(vec![api_record("a1", Some("₹ 50,000"))]))
        .status(&api_url(2), status)
        .page(&api_url(3), api_page(vec![api_record("b3", Some("₹ 52,000"))]))
        .page(&api_url(4), api_page(vec![]))
        .page(&detail_url("a1"), detail_page("1 Owner", "8000 Km"))
        .page(&detail_url("b3"), detail_page("2 Owner", "16000 Km"))
}

#[tokio::test(start_paused = true)]
async fn test_failed_search_page_does_not_end_walk() {
    let fetcher = upstream_with_failed_search_page(503);
    let (_dir, store) = temp_store();

    let report = Orchestrator::new(&fetcher, &store)
        .run_source(&api_source(), None)
        .await;

    assert_eq!(
        fetcher.calls(),
        vec![
            api_url(1),
            detail_url("a1"),
            api_url(2),
            api_url(3),
            detail_url("b3"),
            api_url(4)
        ]
    );
    assert_eq!(report.state, SourceState::Done);
    assert_eq!(report.pages_failed, 1);
    assert_eq!(report.pages_scraped, 3);
    assert_eq!(report.listings_persisted, 2);
    assert_eq!(store.listings().count().unwrap(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_pause_follows_failed_search_page() {
    let fetcher = upstream_with_failed_search_page(500);
    let (_dir, store) = temp_store();
    let mut source = api_source();
    source.delay_ms = 1000;

    let started = tokio::time::Instant::now();
    let report = Orchestrator::new(&fetcher, &store)
        .run_source(&source, None)
        .await;
    let elapsed = started.elapsed();

    assert_eq!(report.pages_failed, 1);
    assert_eq!(fetcher.call_count(), 6);
    // four search pages and two detail pages, each followed by one delay
    assert!(elapsed >= Duration::from_secs(6), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(7), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn test_search_walk_stops_at_page_limit() {
    let record = |n: u32| api_record(&format!("r{n}"), Some("₹ 30,000"));
    let fetcher = (1..=3).fold(MockFetcher::new(), |f, n| {
        f.page(&api_url(n), api_page(vec![record(n)]))
            .page(&detail_url(&format!("r{n}")), detail_page("1 Owner", "100 Km"))
    });
    let (_dir, store) = temp_store();
    let mut source = api_source();
    if let bikeacquire::scrapers::ExtractorConfig::ApiDetail(api) = &mut source.extractor {
        api.max_api_pages = 2;
    }

    let report = Orchestrator::new(&fetcher, &store)
        .run_source(&source, None)
        .await;

    assert_eq!(report.pages_scraped, 2);
    assert_eq!(fetcher.calls_to(&api_url(3)), 0);
    assert_eq!(report.listings_persisted, 2);
}
