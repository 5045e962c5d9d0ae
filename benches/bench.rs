// Criterion benchmarks for Venue Rank

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use venue_rank::core::attributes::parse_attributes;
use venue_rank::models::{InteractionEvent, Query, UserProfile, VenueRecord};
use venue_rank::services::ProfileStore;
use venue_rank::{RankMode, Ranker};

const CATEGORIES: [&str; 6] = [
    "Ramen, Japanese",
    "Pizza, Italian",
    "Korean, BBQ",
    "Coffee & Tea, Cafes",
    "Tacos, Mexican",
    "Sushi Bars, Japanese",
];

fn create_venue(id: usize) -> VenueRecord {
    VenueRecord {
        venue_id: format!("venue-{}", id),
        name: format!("Venue {}", id),
        stars: Some(2.5 + (id % 5) as f64 * 0.5),
        review_count: Some(10 + (id as u64 * 37) % 2000),
        categories: CATEGORIES[id % CATEGORIES.len()].to_string(),
        attributes: Some(format!(
            "{{'RestaurantsPriceRange2': '{}', 'GoodForMeal': \"{{'lunch': True, 'dinner': {}}}\"}}",
            1 + id % 4,
            if id % 2 == 0 { "True" } else { "False" }
        )),
        morning_rate: Some((id % 7) as f64 / 7.0),
        lunch_rate: Some((id % 3) as f64 / 3.0),
        dinner_rate: Some((id % 5) as f64 / 5.0),
        sentiment_positive: Some(0.4),
        sentiment_negative: Some(0.1),
        is_open: serde_json::json!(id % 4 != 0),
        latitude: None,
        longitude: None,
    }
}

fn create_profile() -> UserProfile {
    let store = ProfileStore::in_memory();
    for i in 0..20 {
        let event = InteractionEvent::new(format!("venue-{}", i), "details_view", CATEGORIES[i % 3])
            .with_price_level(Some(2));
        store.record_event("bench", &event).unwrap();
    }
    store.load("bench").unwrap()
}

fn bench_parse_attributes(c: &mut Criterion) {
    let raw = "{'RestaurantsPriceRange2': '2', 'GoodForMeal': \"{'dessert': False, 'latenight': False, 'lunch': True, 'dinner': True}\", 'WiFi': u'free'}";
    c.bench_function("parse_attributes", |b| {
        b.iter(|| parse_attributes(black_box(Some(raw))));
    });
}

fn bench_ranking(c: &mut Criterion) {
    let ranker = Ranker::with_default_policy();
    let profile = create_profile();
    let plain = Query::from_keyword_string("ramen, bbq").with_max_price(Some(2));
    let personalized = plain.clone().personalized(true);

    let mut group = c.benchmark_group("ranking");

    for pool_size in [100, 1000, 5000].iter() {
        let venues: Vec<VenueRecord> = (0..*pool_size).map(create_venue).collect();
        let max_reviews = venues.iter().filter_map(|v| v.review_count).max().unwrap_or(0);

        group.bench_with_input(BenchmarkId::new("recommend", pool_size), pool_size, |b, _| {
            b.iter(|| {
                ranker.rank(
                    black_box(&venues),
                    black_box(&plain),
                    None,
                    max_reviews,
                    RankMode::Recommend,
                )
            });
        });

        group.bench_with_input(BenchmarkId::new("search_personalized", pool_size), pool_size, |b, _| {
            b.iter(|| {
                ranker.rank(
                    black_box(&venues),
                    black_box(&personalized),
                    Some(&profile),
                    max_reviews,
                    RankMode::Search,
                )
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_attributes, bench_ranking);

criterion_main!(benches);
