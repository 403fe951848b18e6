//! End-to-end scenarios chaining normalisation, clustering, publishing, and
//! detection together, the way a real worker -> engine -> query cycle
//! would.

mod support;

use std::sync::Arc;
use std::time::Duration;

use oddsaxiom::core::domain::{Category, PriceFormat};
use oddsaxiom::core::engine::{ArbitrageEngine, EngineConfig};
use oddsaxiom::core::normalise::normalise;
use oddsaxiom::core::publish::Publisher;
use oddsaxiom::core::query::LiveQueryAssembler;
use oddsaxiom::testkit::{MemoryBroadcaster, MemoryCache, MemoryOpportunityStore, MemoryOrderedLog};
use support::raw_quote;
use tokio::sync::watch;

struct Harness {
    cache: Arc<MemoryCache>,
    ordered_log: Arc<MemoryOrderedLog>,
    broadcaster: Arc<MemoryBroadcaster>,
    opportunity_store: Arc<MemoryOpportunityStore>,
    publisher: Publisher,
}

impl Harness {
    fn new() -> Self {
        let cache = Arc::new(MemoryCache::new());
        let ordered_log = Arc::new(MemoryOrderedLog::new());
        let broadcaster = Arc::new(MemoryBroadcaster::new());
        let opportunity_store = Arc::new(MemoryOpportunityStore::new());
        let publisher = Publisher::new(
            cache.clone(),
            ordered_log.clone(),
            broadcaster.clone(),
            Duration::from_secs(660),
        );
        Self {
            cache,
            ordered_log,
            broadcaster,
            opportunity_store,
            publisher,
        }
    }

    /// Run the engine for a short fixed window against this harness's
    /// ordered log and opportunity store, then shut it down.
    async fn run_engine_briefly(&self) {
        let config = EngineConfig {
            min_profit: 0.001,
            detection_interval: Duration::from_millis(20),
            recluster_interval_cycles: 1,
            opportunity_ttl: Duration::from_secs(60),
        };
        let engine = ArbitrageEngine::new(
            config,
            self.ordered_log.clone(),
            self.opportunity_store.clone(),
            self.broadcaster.clone(),
            Duration::from_millis(10),
        );
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(engine.run(rx));
        tokio::time::sleep(Duration::from_millis(120)).await;
        let _ = tx.send(true);
        let _ = handle.await;
    }
}

/// Scenario 1: two venues quote the same binary market with implied
/// probabilities that sum to less than one — a genuine cross-venue
/// arbitrage.
#[tokio::test]
async fn scenario_two_leg_probability_arbitrage() {
    let harness = Harness::new();

    // Venue A: Yes=0.47, No=0.55. Venue B: Yes=0.50, No=0.48. Best per
    // outcome is Yes@A (0.47) and No@B (0.48) — a genuine two-outcome,
    // two-venue arb, matching spec §8 scenario 1.
    let a_yes = normalise(&raw_quote(
        "polymarket", "m1", "Will the Fed cut rates in March?", 0, "Yes", 0.47, PriceFormat::Probability,
    ));
    let a_no = normalise(&raw_quote(
        "polymarket", "m1", "Will the Fed cut rates in March?", 1, "No", 0.55, PriceFormat::Probability,
    ));
    let b_yes = normalise(&raw_quote(
        "kalshi", "KXFED-25MAR", "Will the Fed cut rates in March", 0, "Yes", 0.50, PriceFormat::Probability,
    ));
    let b_no = normalise(&raw_quote(
        "kalshi", "KXFED-25MAR", "Will the Fed cut rates in March", 1, "No", 0.48, PriceFormat::Probability,
    ));
    harness.publisher.publish(&[a_yes, a_no]).await.unwrap();
    harness.publisher.publish(&[b_yes, b_no]).await.unwrap();

    harness.run_engine_briefly().await;

    let top = harness.opportunity_store.top(10).await.unwrap();
    assert_eq!(top.len(), 1);
    assert!((top[0].total_implied - 0.95).abs() < 1e-9);
    assert!((top[0].expected_profit - 0.05).abs() < 1e-9);
}

/// Scenario 2: a venue quoting in cents normalises to the same implied
/// probability space as a venue quoting raw probability; combined with a
/// second venue's probability-format quotes they still yield a genuine
/// (if thin) two-outcome arbitrage, per spec §8 scenario 2's
/// `(0.47, 0.52)` vs `(0.47, 0.55)` -> total 0.99, profit 0.01.
#[tokio::test]
async fn scenario_cents_normalisation_combines_with_probability_venue() {
    let harness = Harness::new();

    let cents_yes = normalise(&raw_quote(
        "sportsbook_aggregator", "m1", "Will the Fed cut rates in March?", 0, "Yes", 47.0, PriceFormat::Cents,
    ));
    let cents_no = normalise(&raw_quote(
        "sportsbook_aggregator", "m1", "Will the Fed cut rates in March?", 1, "No", 52.0, PriceFormat::Cents,
    ));
    assert!((cents_yes.implied_prob - 0.47).abs() < 1e-9);
    assert!((cents_no.implied_prob - 0.52).abs() < 1e-9);

    let prob_yes = normalise(&raw_quote(
        "kalshi", "KXFED-25MAR", "Will the Fed cut rates in March", 0, "Yes", 0.47, PriceFormat::Probability,
    ));
    let prob_no = normalise(&raw_quote(
        "kalshi", "KXFED-25MAR", "Will the Fed cut rates in March", 1, "No", 0.55, PriceFormat::Probability,
    ));

    harness.publisher.publish(&[cents_yes, cents_no]).await.unwrap();
    harness.publisher.publish(&[prob_yes, prob_no]).await.unwrap();
    harness.run_engine_briefly().await;

    let top = harness.opportunity_store.top(10).await.unwrap();
    assert_eq!(top.len(), 1);
    assert!((top[0].total_implied - 0.99).abs() < 1e-9);
    assert!((top[0].expected_profit - 0.01).abs() < 1e-9);
}

/// Scenario 3: American odds from two sportsbooks normalise and combine
/// into an arbitrage the same way prediction-market probabilities do, per
/// spec §8 scenario 3: the best price on one outcome comes from one book,
/// the best price on the other outcome comes from the other book.
#[tokio::test]
async fn scenario_american_odds_cross_venue_arbitrage() {
    let harness = Harness::new();

    // coinbase: Yes +150 -> 100/(150+100) = 0.4; No -150 -> 150/(150+100) = 0.6
    let coinbase_yes = normalise(&raw_quote(
        "coinbase", "m1", "Team A wins the match", 0, "Yes", 150.0, PriceFormat::AmericanPositive,
    ));
    let coinbase_no = normalise(&raw_quote(
        "coinbase", "m1", "Team A wins the match", 1, "No", -150.0, PriceFormat::AmericanNegative,
    ));
    assert!((coinbase_yes.implied_prob - 0.4).abs() < 1e-9);
    assert!((coinbase_no.implied_prob - 0.6).abs() < 1e-9);

    // gemini: Yes +160 -> 100/(160+100) = 0.3846...; No -200 -> 200/(200+100) = 0.6667...
    let gemini_yes = normalise(&raw_quote(
        "gemini", "m1-other-book", "Team A wins the match", 0, "Yes", 160.0, PriceFormat::AmericanPositive,
    ));
    let gemini_no = normalise(&raw_quote(
        "gemini", "m1-other-book", "Team A wins the match", 1, "No", -200.0, PriceFormat::AmericanNegative,
    ));

    // Best Yes is gemini's 0.3846..., best No is coinbase's 0.6 — two
    // outcomes, two distinct venues, total < 1.
    harness.publisher.publish(&[coinbase_yes, coinbase_no]).await.unwrap();
    harness.publisher.publish(&[gemini_yes, gemini_no]).await.unwrap();
    harness.run_engine_briefly().await;

    let top = harness.opportunity_store.top(10).await.unwrap();
    assert_eq!(top.len(), 1);
    assert!(top[0].legs_have_distinct_venues());
    assert_eq!(top[0].legs.len(), 2);
    assert!((top[0].total_implied - (100.0 / 260.0 + 0.6)).abs() < 1e-9);
}

/// Scenario 4: two similar-looking listings from the *same* venue never
/// merge into one cluster, so they can never form an "arbitrage" against
/// themselves.
#[tokio::test]
async fn scenario_same_venue_listings_never_self_arbitrage() {
    let harness = Harness::new();

    let leg_a = normalise(&raw_quote(
        "kalshi", "m1", "Will the Fed cut rates in March?", 0, "Yes", 0.3, PriceFormat::Probability,
    ));
    let leg_b = normalise(&raw_quote(
        "kalshi", "m2", "Will the Fed cut rates sometime in March?", 0, "Yes", 0.3, PriceFormat::Probability,
    ));

    harness.publisher.publish(&[leg_a]).await.unwrap();
    harness.publisher.publish(&[leg_b]).await.unwrap();
    harness.run_engine_briefly().await;

    assert!(harness.opportunity_store.top(10).await.unwrap().is_empty());
}

/// Scenario 5: a candidacy-announcement market and an outcome market that
/// share most of their tokens must not cluster, even though a naive fuzzy
/// match alone would merge them.
#[tokio::test]
async fn scenario_semantic_conflict_prevents_false_cluster() {
    let harness = Harness::new();

    let announce = normalise(&raw_quote(
        "polymarket", "m1", "Will Jane Doe run for senate in 2028?", 0, "Yes", 0.6, PriceFormat::Probability,
    ));
    let outcome = normalise(&raw_quote(
        "kalshi", "m2", "Will Jane Doe win the senate race in 2028?", 0, "Yes", 0.1, PriceFormat::Probability,
    ));

    harness.publisher.publish(&[announce]).await.unwrap();
    harness.publisher.publish(&[outcome]).await.unwrap();
    harness.run_engine_briefly().await;

    assert!(
        harness.opportunity_store.top(10).await.unwrap().is_empty(),
        "semantically conflicting markets must not be treated as the same market"
    );
}

/// Scenario 6: the live cache TTL is respected by the query assembler — an
/// entry that has aged out of its TTL window is excluded from the read-side
/// view even though the engine/opportunity path is entirely separate.
#[tokio::test]
async fn scenario_ttl_expiry_hides_stale_cache_entries_from_queries() {
    let cache = Arc::new(MemoryCache::new());
    let ordered_log = Arc::new(MemoryOrderedLog::new());
    let broadcaster = Arc::new(MemoryBroadcaster::new());
    let publisher = Publisher::new(cache.clone(), ordered_log, broadcaster, Duration::from_millis(30));
    let assembler = LiveQueryAssembler::new(cache, Duration::from_millis(0));

    let quote = normalise(&raw_quote(
        "polymarket", "m1", "Will it rain tomorrow?", 0, "Yes", 0.3, PriceFormat::Probability,
    ));
    publisher.publish(&[quote]).await.unwrap();

    let fresh = assembler.assemble(Some(Category::Politics)).await.unwrap();
    assert_eq!(fresh.len(), 1);

    tokio::time::sleep(Duration::from_millis(60)).await;

    let stale = assembler.assemble(Some(Category::Politics)).await.unwrap();
    assert!(stale.is_empty(), "entry should have aged out of the live cache TTL");
}
