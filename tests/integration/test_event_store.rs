//! Store and query layer integration tests.

use std::sync::Arc;

use chrono::{Duration, Utc};
use podium::{
    end_of_local_day, local_day, start_of_local_day, today, ArtistEventsOptions,
    EmbeddedEventStore, Event, EventDraft, EventPatch, EventQueryEngine, EventStore, EventType,
    Participant, PodiumError,
};

fn engine_and_store() -> (EventQueryEngine<EmbeddedEventStore>, Arc<EmbeddedEventStore>) {
    let store = Arc::new(EmbeddedEventStore::new());
    (EventQueryEngine::new(Arc::clone(&store)), store)
}

fn draft(artist_id: &str, offset_days: i64, venue: &str) -> EventDraft {
    EventDraft {
        artist_id: Some(artist_id.to_string()),
        artist_name: Some("Mira".to_string()),
        date: Some(Utc::now() + Duration::days(offset_days)),
        city: Some("Gent".to_string()),
        venue: Some(venue.to_string()),
        event_type: Some("gig".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn add_then_query_artist_upcoming() {
    let (engine, _store) = engine_and_store();
    engine.add_event(draft("a1", 7, "De Centrale")).await.unwrap();
    engine.add_event(draft("a1", -7, "Vooruit")).await.unwrap();
    engine.add_event(draft("a2", 7, "Elders")).await.unwrap();

    let events = engine
        .artist_events(
            "a1",
            ArtistEventsOptions {
                upcoming_only: true,
                ..Default::default()
            },
        )
        .await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].venue, "De Centrale");
}

#[tokio::test]
async fn date_range_returns_only_in_range_sorted() {
    let (engine, _store) = engine_and_store();
    for offset in [10, 2, 6, 40] {
        engine.add_event(draft("a1", offset, "Zaal")).await.unwrap();
    }

    let start = Utc::now();
    let end = start + Duration::days(14);
    let events = engine.events_for_date_range(start, end, None).await;

    assert_eq!(events.len(), 3);
    for pair in events.windows(2) {
        assert!(pair[0].date.unwrap() <= pair[1].date.unwrap());
        assert!(pair[0].date.unwrap() >= start && pair[0].date.unwrap() <= end);
    }
}

/// A draft pinned to a local calendar day, for tests that assert per-day
/// bucketing rather than instant comparisons.
fn draft_on_day(artist_id: &str, offset_days: i64) -> EventDraft {
    let mut d = draft(artist_id, 0, "Zaal");
    d.date = Some(start_of_local_day(today() + Duration::days(offset_days)) + Duration::hours(20));
    d
}

#[tokio::test]
async fn counts_cover_the_fetched_set() {
    let (engine, _store) = engine_and_store();
    for offset in [1, 1, 3] {
        engine.add_event(draft_on_day("a1", offset)).await.unwrap();
    }

    let start = start_of_local_day(today());
    let end = end_of_local_day(today() + Duration::days(5));
    let events = engine.events_for_date_range(start, end, None).await;
    let counts = engine.event_counts_per_date(start, end).await;

    assert_eq!(counts.values().sum::<usize>(), events.len());
    assert_eq!(counts.get(&(today() + Duration::days(1))), Some(&2));
    assert_eq!(counts.get(&(today() + Duration::days(2))), None);
    assert_eq!(counts.get(&(today() + Duration::days(3))), Some(&1));
}

#[tokio::test]
async fn grouping_partitions_the_fetched_set() {
    let (engine, _store) = engine_and_store();
    for offset in [1, 1, 4] {
        engine.add_event(draft_on_day("a1", offset)).await.unwrap();
    }

    let start = start_of_local_day(today());
    let end = end_of_local_day(today() + Duration::days(5));
    let grouped = engine.events_grouped_by_date(start, end).await;

    let total: usize = grouped.values().map(Vec::len).sum();
    assert_eq!(total, 3);
    for (day, bucket) in &grouped {
        for event in bucket {
            assert_eq!(local_day(event.date.unwrap()), *day);
        }
    }
}

#[tokio::test]
async fn update_patches_and_stamps() {
    let (engine, store) = engine_and_store();
    let created = engine.add_event(draft("a1", 3, "Zaal")).await.unwrap();

    let patch = EventPatch {
        venue: Some("  Handelsbeurs ".to_string()),
        event_type: Some(EventType::Showcase),
        ..Default::default()
    };
    let updated = engine.update_event(&created.id, patch).await.unwrap();

    assert_eq!(updated.venue, "Handelsbeurs");
    assert_eq!(updated.event_type, EventType::Showcase);
    assert!(updated.updated_at >= created.updated_at);

    let stored = store.get(&created.id).await.unwrap().unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn delete_is_unconditional_and_hard() {
    let (engine, store) = engine_and_store();
    let created = engine.add_event(draft("a1", 3, "Zaal")).await.unwrap();

    engine.delete_event(&created.id).await.unwrap();
    assert!(store.get(&created.id).await.unwrap().is_none());
    assert!(engine.get_event(&created.id).await.is_none());
}

#[tokio::test]
async fn validation_rejects_before_store() {
    let (engine, store) = engine_and_store();

    let mut bad = draft("a1", 3, "Zaal");
    bad.date = None;
    assert!(matches!(
        engine.add_event(bad).await,
        Err(PodiumError::Validation(_))
    ));

    // Nothing reached the store.
    let events = store.query(Default::default()).await.unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn cluster_events_survive_the_store() {
    let (_engine, store) = engine_and_store();
    let cluster = Event::cluster(
        "Nacht van de Poëzie",
        Utc::now() + Duration::days(5),
        "Utrecht",
        "TivoliVredenburg",
        EventType::Showcase,
    )
    .with_participant(Participant::new("a1", "Mira"))
    .with_participant(Participant::new("a2", "Jens"));

    let created = store.create(cluster).await.unwrap();
    let fetched = store.get(&created.id).await.unwrap().unwrap();

    assert!(fetched.is_cluster());
    assert_eq!(fetched.line_up().len(), 2);
    // Cluster events have no owning artist; artist queries skip them.
    assert!(fetched.artist_id().is_none());
}
