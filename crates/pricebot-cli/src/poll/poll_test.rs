use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use pricebot_core::{PriceValue, RawPage};
use pricebot_scraper::{
    Exhaustion, PageSource, PriceParser, ProductExtractor, ScraperError, TransportError,
    UrlValidator,
};
use rust_decimal::Decimal;

use super::*;

const URL_A: &str = "https://www.amazon.es/dp/B0AAAAAAAA";
const URL_B: &str = "https://www.amazon.es/dp/B0BBBBBBBB";
const URL_C: &str = "https://www.amazon.es/dp/B0CCCCCCCC";

fn page(name: &str, whole: &str, fraction: &str) -> String {
    format!(
        r#"<span id="productTitle">{name}</span>
           <span class="a-price">
             <span class="a-price-whole">{whole}</span>
             <span class="a-price-fraction">{fraction}</span>
             <span class="a-price-symbol">€</span>
           </span>"#
    )
}

/// Serves per-URL markup; URLs without markup fail like an exhausted fetch.
#[derive(Default)]
struct FakeSite {
    pages: Mutex<HashMap<String, String>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeSite {
    fn serve(&self, url: &str, html: String) {
        self.pages.lock().unwrap().insert(url.to_owned(), html);
    }
}

impl PageSource for FakeSite {
    async fn fetch_page(&self, url: &str) -> Result<RawPage, ScraperError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let html = self.pages.lock().unwrap().get(url).cloned();
        match html {
            Some(html) => Ok(RawPage {
                url: url.to_owned(),
                html,
                fetched_at: Utc::now(),
            }),
            None => Err(ScraperError::FetchExhausted {
                url: url.to_owned(),
                attempts: 1,
                reason: Exhaustion::DirectFailed,
                last_error: Box::new(TransportError::UnexpectedStatus {
                    status: 503,
                    url: url.to_owned(),
                }),
            }),
        }
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(i64, String)>>,
    fail: bool,
}

impl Notifier for RecordingNotifier {
    async fn notify(&self, owner_id: i64, message: &str) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError {
                owner_id,
                reason: "chat not found".to_owned(),
            });
        }
        self.sent.lock().unwrap().push((owner_id, message.to_owned()));
        Ok(())
    }
}

fn tracker(site: FakeSite) -> ProductTracker<FakeSite> {
    ProductTracker::new(
        site,
        UrlValidator::syntactic(),
        ProductExtractor::new(PriceParser::new("EUR")).unwrap(),
    )
}

fn eur(amount: &str) -> PriceValue {
    PriceValue::new(Decimal::from_str(amount).unwrap(), "EUR")
}

fn entry(owner_id: i64, url: &str) -> TrackedEntry {
    TrackedEntry {
        owner_id,
        url: url.to_owned(),
        name: None,
    }
}

async fn store_with(urls: &[&str]) -> InMemoryPriceStore {
    let store = InMemoryPriceStore::new();
    let entries: Vec<TrackedEntry> = urls.iter().map(|u| entry(7, u)).collect();
    seed_store(&store, &entries).await.unwrap();
    store
}

// ---------------------------------------------------------------------------
// seed_store
// ---------------------------------------------------------------------------

#[tokio::test]
async fn seed_store_normalizes_and_skips_bad_entries() {
    let store = InMemoryPriceStore::new();
    let entries = vec![
        entry(1, "https://www.amazon.es/Some-Slug/dp/B0AAAAAAAA?tag=x"),
        entry(1, URL_A),
        entry(1, "https://example.com/not-a-product"),
        entry(2, URL_A),
    ];

    let added = seed_store(&store, &entries).await.unwrap();
    assert_eq!(added, 2, "duplicate after normalization and invalid URL are skipped");

    let products = store.tracked_products().await.unwrap();
    assert!(products.iter().all(|p| p.url == URL_A));
    assert_eq!(products[0].name, URL_A, "missing name falls back to the URL");
}

// ---------------------------------------------------------------------------
// check_all
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_pass_records_silently_and_unchanged_pass_stays_silent() {
    let site = FakeSite::default();
    site.serve(URL_A, page("Cafetera", "49", "99"));
    let tracker = tracker(site);
    let store = store_with(&[URL_A]).await;
    let notifier = RecordingNotifier::default();

    let first = check_all(&tracker, &store, &notifier, 5).await.unwrap();
    assert_eq!(first.first_seen, 1);

    let second = check_all(&tracker, &store, &notifier, 5).await.unwrap();
    assert_eq!(second.unchanged, 1);
    assert_eq!(second.changed, 0);

    assert!(notifier.sent.lock().unwrap().is_empty());
    assert_eq!(store.price_history(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn price_change_is_recorded_and_owner_notified() {
    let site = FakeSite::default();
    site.serve(URL_A, page("Cafetera", "49", "99"));
    let tracker = tracker(site);
    let store = store_with(&[URL_A]).await;
    let notifier = RecordingNotifier::default();

    check_all(&tracker, &store, &notifier, 5).await.unwrap();
    tracker.source().serve(URL_A, page("Cafetera", "44", "90"));
    let totals = check_all(&tracker, &store, &notifier, 5).await.unwrap();

    assert_eq!(totals.changed, 1);
    assert_eq!(totals.notified, 1);
    assert_eq!(store.last_price(1).await.unwrap(), Some(eur("44.90")));
    assert_eq!(store.price_history(1).await.unwrap().len(), 2);

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let (owner_id, message) = &sent[0];
    assert_eq!(*owner_id, 7);
    assert!(message.contains("Cafetera"), "{message}");
    assert!(message.contains(r"44,90 €"), "{message}");
}

#[tokio::test]
async fn one_failing_product_does_not_stop_the_batch() {
    let site = FakeSite::default();
    site.serve(URL_A, page("A", "10", "00"));
    site.serve(URL_C, page("C", "30", "00"));
    let tracker = tracker(site);
    let store = store_with(&[URL_A, URL_B, URL_C]).await;

    let totals = check_all(&tracker, &store, &RecordingNotifier::default(), 2)
        .await
        .unwrap();

    assert_eq!(totals.checked, 3);
    assert_eq!(totals.failed, 1);
    assert_eq!(totals.first_seen, 2);
}

#[tokio::test]
async fn batch_where_everything_fails_is_an_error() {
    let tracker = tracker(FakeSite::default());
    let store = store_with(&[URL_A, URL_B]).await;

    let err = check_all(&tracker, &store, &RecordingNotifier::default(), 2)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("all 2 products failed"), "{err}");
}

#[tokio::test]
async fn empty_batch_is_not_an_error() {
    let tracker = tracker(FakeSite::default());
    let store = InMemoryPriceStore::new();

    let totals = check_all(&tracker, &store, &RecordingNotifier::default(), 2)
        .await
        .unwrap();
    assert_eq!(totals, PollTotals::default());
}

#[tokio::test]
async fn page_without_price_records_nothing() {
    let site = FakeSite::default();
    site.serve(URL_A, r#"<span id="productTitle">Sin precio</span>"#.to_owned());
    let tracker = tracker(site);
    let store = store_with(&[URL_A]).await;

    let totals = check_all(&tracker, &store, &RecordingNotifier::default(), 1)
        .await
        .unwrap();

    assert_eq!(totals.degraded, 1);
    assert!(store.price_history(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn notification_failure_keeps_the_recorded_price() {
    let site = FakeSite::default();
    site.serve(URL_A, page("A", "10", "00"));
    let tracker = tracker(site);
    let store = store_with(&[URL_A]).await;
    let notifier = RecordingNotifier {
        fail: true,
        ..RecordingNotifier::default()
    };

    check_all(&tracker, &store, &notifier, 1).await.unwrap();
    tracker.source().serve(URL_A, page("A", "12", "00"));
    let totals = check_all(&tracker, &store, &notifier, 1).await.unwrap();

    assert_eq!(totals.changed, 1);
    assert_eq!(totals.notified, 0);
    assert_eq!(store.last_price(1).await.unwrap(), Some(eur("12.00")));
}

#[tokio::test]
async fn concurrency_limit_bounds_in_flight_fetches() {
    let site = FakeSite {
        delay: Some(Duration::from_millis(20)),
        ..FakeSite::default()
    };
    let urls: Vec<String> = (0..6).map(|i| format!("https://www.amazon.es/dp/B0TEST000{i}")).collect();
    for url in &urls {
        site.serve(url, page("X", "1", "00"));
    }
    let tracker = tracker(site);
    let refs: Vec<&str> = urls.iter().map(String::as_str).collect();
    let store = store_with(&refs).await;

    let totals = check_all(&tracker, &store, &RecordingNotifier::default(), 2)
        .await
        .unwrap();

    assert_eq!(totals.first_seen, 6);
    let peak = tracker.source().max_in_flight.load(Ordering::SeqCst);
    assert!(peak <= 2, "peak concurrency {peak} exceeded the limit");
    assert!(peak >= 2, "fetches never overlapped");
}

#[tokio::test]
async fn log_notifier_always_succeeds() {
    assert!(LogNotifier.notify(1, "hola").await.is_ok());
}
