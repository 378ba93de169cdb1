#![expect(
    clippy::expect_used,
    reason = "tests should fail fast when setup breaks"
)]
#![expect(
    clippy::float_arithmetic,
    reason = "score assertions compare within a tolerance"
)]

//! Behavioural coverage for the recommendation engine.

use std::cell::RefCell;

use campus_eats_core::{
    FilterError, Location, Rating, RecommendationFilters, Review, SqliteReviewStore, UserId,
    test_support::{MemoryStore, write_sqlite_database},
};
use campus_eats_scorer::{
    AlsoLikedLocation, LocationRecommendation, RecencyDecay, RecommendError, Recommender,
    ScoringConfig,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

const NEWCOMER: &str = "newcomer";
const STEADY: u64 = 1;
const ONE_HIT: u64 = 2;
const MIXED: u64 = 3;
const UNREVIEWED: u64 = 4;
const DAY: u64 = 86_400;
const NOW: u64 = 1_760_000_000;

/// Aggregate fixtures shared across the BDD scenarios.
pub struct TestContext {
    temp_dir: TempDir,
    store: RefCell<MemoryStore>,
    sqlite: RefCell<Option<SqliteReviewStore>>,
    outcome: RefCell<Option<Result<Vec<LocationRecommendation>, RecommendError>>>,
    also_liked: RefCell<Vec<AlsoLikedLocation>>,
}

impl TestContext {
    fn recommend(&self, filters: Option<&RecommendationFilters>) {
        self.recommend_with(filters, ScoringConfig::default(), 0);
    }

    fn recommend_with(
        &self,
        filters: Option<&RecommendationFilters>,
        config: ScoringConfig,
        now: u64,
    ) {
        let user = UserId::new(NEWCOMER);
        let outcome = if let Some(sqlite) = self.sqlite.borrow().as_ref() {
            Recommender::new(sqlite, config)
                .expect("valid config")
                .recommend_at(&user, filters, now)
        } else {
            let store = self.store.borrow();
            Recommender::new(&*store, config)
                .expect("valid config")
                .recommend_at(&user, filters, now)
        };
        self.outcome.replace(Some(outcome));
    }

    fn ranked(&self) -> Vec<LocationRecommendation> {
        self.outcome
            .borrow()
            .as_ref()
            .expect("a request should have been made")
            .as_ref()
            .expect("request should succeed")
            .clone()
    }
}

#[fixture]
/// Build a fresh `TestContext` for each scenario run.
pub fn context() -> TestContext {
    TestContext {
        temp_dir: TempDir::new().expect("create tempdir for scenario"),
        store: RefCell::new(MemoryStore::default()),
        sqlite: RefCell::new(None),
        outcome: RefCell::new(None),
        also_liked: RefCell::new(Vec::new()),
    }
}

fn campus_locations() -> Vec<Location> {
    vec![
        Location::new(STEADY, "Ayan Gardens", "Restaurant"),
        Location::new(ONE_HIT, "Raju Campus Hotel", "Cafe"),
        Location::new(MIXED, "Hot N Spicy", "Fast Food"),
    ]
}

fn campus_reviews() -> Vec<Review> {
    let ratings: [(u64, &str, u8); 8] = [
        (STEADY, "sara", 5),
        (STEADY, "omar", 5),
        (STEADY, "bilal", 5),
        (ONE_HIT, "hina", 5),
        (MIXED, "zainab", 2),
        (MIXED, "ayesha", 2),
        (MIXED, "usman", 2),
        (MIXED, "fatima", 2),
    ];
    ratings
        .into_iter()
        .zip(1_u64..)
        .map(|((location_id, user, stars), id)| {
            let rating = Rating::new(stars).expect("valid rating");
            Review::new(id, location_id, UserId::new(user), rating, 1_700_000_000)
        })
        .collect()
}

#[given("a campus with three reviewed locations")]
fn campus(context: &TestContext) {
    context
        .store
        .replace(MemoryStore::with_data(campus_locations(), campus_reviews()));
}

#[given("a new location nobody has reviewed")]
fn new_location(context: &TestContext) {
    let store = context.store.take();
    context
        .store
        .replace(store.with_location(Location::new(UNREVIEWED, "Chai Shai", "Cafe")));
}

#[given("a SQLite review database for the same campus")]
fn sqlite_campus(context: &TestContext) {
    let path = context.temp_dir.path().join("campuseats.db");
    write_sqlite_database(&path, &campus_locations(), &campus_reviews())
        .expect("persist campus database");
    let store = SqliteReviewStore::open(&path).expect("open campus database");
    context.sqlite.replace(Some(store));
}

#[given("the steady location's reviewers also rated the one-hit location")]
fn overlapping_reviewers(context: &TestContext) {
    let store = context.store.take();
    context.store.replace(
        store
            .with_rating(ONE_HIT, "sara", 4)
            .with_rating(ONE_HIT, "omar", 5),
    );
}

#[given("a SQLite review database with a year-old one star review and a day-old five star review")]
fn sqlite_aged_reviews(context: &TestContext) {
    let path = context.temp_dir.path().join("aged.db");
    let rating = |stars| Rating::new(stars).expect("valid rating");
    let reviews = [
        Review::new(1, ONE_HIT, UserId::new("sara"), rating(1), NOW - 365 * DAY),
        Review::new(2, ONE_HIT, UserId::new("omar"), rating(5), NOW - DAY),
    ];
    write_sqlite_database(
        &path,
        &[Location::new(ONE_HIT, "Raju Campus Hotel", "Cafe")],
        &reviews,
    )
    .expect("persist aged database");
    let store = SqliteReviewStore::open(&path).expect("open aged database");
    context.sqlite.replace(Some(store));
}

#[when("a newcomer asks for recommendations with a one week recency decay")]
fn ask_with_recency(context: &TestContext) {
    let config = ScoringConfig::default().with_recency(RecencyDecay::from_days(7, 7));
    context.recommend_with(None, config, NOW);
}

#[when("a newcomer asks what reviewers of the steady location also liked")]
fn ask_also_liked(context: &TestContext) {
    let store = context.store.borrow();
    let liked = Recommender::with_default_config(&*store)
        .also_liked(STEADY, 10)
        .expect("in-memory store never fails");
    context.also_liked.replace(liked);
}

#[when("a newcomer asks for recommendations")]
fn ask(context: &TestContext) {
    context.recommend(None);
}

#[when("a newcomer asks for vegetarian locations")]
fn ask_vegetarian(context: &TestContext) {
    let filters = RecommendationFilters::new().with_category("Vegetarian");
    context.recommend(Some(&filters));
}

#[when("a newcomer sends an unknown filter key")]
fn ask_malformed(context: &TestContext) {
    let parsed = RecommendationFilters::from_pairs([("cuisine", "thai")]);
    let outcome = parsed
        .map_err(RecommendError::from)
        .map(|_| Vec::new());
    context.outcome.replace(Some(outcome));
}

#[then("the location with three five star reviews ranks first")]
fn steady_first(context: &TestContext) {
    let ranked = context.ranked();
    let first = ranked.first().expect("at least one recommendation");
    assert_eq!(first.location_id, STEADY);
    assert!(
        (first.score - 4.0625).abs() < 1e-9,
        "unexpected score {}",
        first.score
    );
}

#[then("the location with one five star review ranks second")]
fn one_hit_second(context: &TestContext) {
    let ranked = context.ranked();
    let second = ranked.get(1).expect("at least two recommendations");
    assert_eq!(second.location_id, ONE_HIT);
    assert!(
        (second.score - 3.75).abs() < 1e-9,
        "unexpected score {}",
        second.score
    );
}

#[then("the location scores close to its fresh five star rating")]
fn fresh_rating_dominates(context: &TestContext) {
    let ranked = context.ranked();
    let only = ranked.first().expect("one recommendation");
    assert_eq!(only.mean_rating, Some(3.0));
    assert!((only.score - 5.0).abs() < 0.1, "unexpected score {}", only.score);
}

#[then("only the one-hit location is suggested, shared by two reviewers")]
fn one_hit_also_liked(context: &TestContext) {
    let liked = context.also_liked.borrow();
    let found: Vec<_> = liked
        .iter()
        .map(|l| (l.location_id, l.co_reviewers))
        .collect();
    assert_eq!(found, vec![(ONE_HIT, 2)]);
}

#[then("no recommendations are returned")]
fn none_returned(context: &TestContext) {
    assert!(context.ranked().is_empty());
}

#[then("the new location is ranked last with the prior score")]
fn unreviewed_last(context: &TestContext) {
    let ranked = context.ranked();
    let last = ranked.last().expect("recommendations");
    assert_eq!(last.location_id, UNREVIEWED);
    assert_eq!(last.review_count, 0);
    assert_eq!(last.score, 0.0);
    assert_eq!(ranked.len(), 4);
}

#[then("the request fails with an invalid filter error")]
fn invalid_filter(context: &TestContext) {
    let outcome = context.outcome.borrow();
    let err = outcome
        .as_ref()
        .expect("a request should have been made")
        .as_ref()
        .expect_err("request should fail");
    assert!(matches!(
        err,
        RecommendError::InvalidFilter(FilterError::UnknownKey(key)) if key == "cuisine"
    ));
}

#[scenario(path = "tests/features/recommend.feature", index = 0)]
fn sustained_ratings_win(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/recommend.feature", index = 1)]
fn absent_category_is_empty(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/recommend.feature", index = 2)]
fn unreviewed_keeps_prior(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/recommend.feature", index = 3)]
fn sqlite_backed_recommendations(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/recommend.feature", index = 4)]
fn malformed_filters_rejected(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/recommend.feature", index = 5)]
fn millisecond_timestamps_decay(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/recommend.feature", index = 6)]
fn co_reviewers_drive_also_liked(context: TestContext) {
    let _ = context;
}
