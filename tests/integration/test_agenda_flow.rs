//! End-to-end agenda flow: load, filter, toggle attendance, render.

use std::sync::Arc;

use chrono::Duration;
use podium::{
    resolve_attendee_profiles, start_of_local_day, today, AgendaConfig, AgendaController,
    AttendanceTracker, EmbeddedEventStore, Event, EventStore, EventType, InMemoryDirectory,
    Participant, Region, Role,
};

fn event_on(day_offset: i64, artist_id: &str, city: &str, event_type: EventType) -> Event {
    Event::solo(
        Participant::new(artist_id, "Mira"),
        start_of_local_day(today() + Duration::days(day_offset)) + Duration::hours(20),
        city,
        "Zaal",
        event_type,
    )
}

#[tokio::test]
async fn full_agenda_session() {
    let store = Arc::new(EmbeddedEventStore::new());
    let day = today() + Duration::days(3);

    store.create(event_on(3, "a1", "Gent", EventType::Slam)).await.unwrap();
    store.create(event_on(3, "a2", "Breda", EventType::Gig)).await.unwrap();
    store.create(event_on(5, "a1", "Brussel", EventType::OpenMic)).await.unwrap();

    let mut agenda = AgendaController::new(Arc::clone(&store), AgendaConfig::default());
    let view = agenda.init().await;
    assert_eq!(agenda.state().events.len(), 3);
    assert_eq!(view.date_tape.values().sum::<usize>(), 3);

    // Select a day: only that day's events show.
    let view = agenda.select_date(day).await;
    assert_eq!(view.day_events.len(), 2);

    // Region filter narrows the fixed day, not the range.
    let view = agenda.set_region_filter(Region::Vlaanderen).await;
    assert_eq!(view.day_events.len(), 1);
    assert_eq!(view.day_events[0].city, "Gent");
    // The tape is unaffected by filters.
    assert_eq!(view.date_tape.values().sum::<usize>(), 3);

    // Toggle attendance; the cached copy is patched without a re-fetch.
    let event_id = view.day_events[0].id.clone();
    assert!(agenda.toggle_attendance(&event_id, "u1").await.unwrap());
    let cached = agenda
        .state()
        .events
        .iter()
        .find(|e| e.id == event_id)
        .unwrap();
    assert_eq!(cached.attendee_count, 1);

    // And the store agrees.
    let stored = store.get(&event_id).await.unwrap().unwrap();
    assert_eq!(stored.attendees, vec!["u1".to_string()]);

    agenda.cleanup();
    assert!(agenda.state().events.is_empty());
}

#[tokio::test]
async fn attendance_notifications_resolve_profiles() {
    let store = Arc::new(EmbeddedEventStore::new());
    let tracker = AttendanceTracker::new(Arc::clone(&store));

    let event = store.create(event_on(2, "a1", "Gent", EventType::Gig)).await.unwrap();
    tracker.toggle(&event.id, "a1").await.unwrap();
    tracker.toggle(&event.id, "p1").await.unwrap();
    tracker.toggle(&event.id, "ghost").await.unwrap();

    let notifications = tracker.notifications_for_artist("a1").await;
    assert_eq!(notifications.len(), 1);
    assert_eq!(
        notifications[0].attendee_ids,
        vec!["p1".to_string(), "ghost".to_string()]
    );

    let mut directory = InMemoryDirectory::new();
    directory.insert_programmer("p1", "Theaterhuis");

    let profiles =
        resolve_attendee_profiles(&directory, &notifications[0].attendee_ids, 20).await;
    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[0].role, Role::Programmer);
    assert_eq!(profiles[1].name, "Community member");
}

#[tokio::test]
async fn double_toggle_round_trips_through_controller() {
    let store = Arc::new(EmbeddedEventStore::new());
    let event = store.create(event_on(2, "a1", "Gent", EventType::Gig)).await.unwrap();

    let mut agenda = AgendaController::new(Arc::clone(&store), AgendaConfig::default());
    agenda.init().await;

    assert!(agenda.toggle_attendance(&event.id, "u1").await.unwrap());
    assert!(!agenda.toggle_attendance(&event.id, "u1").await.unwrap());

    let stored = store.get(&event.id).await.unwrap().unwrap();
    assert!(stored.attendees.is_empty());
    assert_eq!(stored.attendee_count, 0);
}
