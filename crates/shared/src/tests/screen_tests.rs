use super::*;

fn two_movies() -> ScreenState {
    ScreenState::loaded(vec![
        MovieRecord::titled("tt0096895", "Batman"),
        MovieRecord::titled("tt1877830", "The Batman"),
    ])
}

#[test]
fn replace_item_touches_only_the_matching_record() {
    let state = two_movies();

    let next = state
        .replace_item(&MovieId::from("tt1877830"), |item| item.with_watched(true))
        .expect("id is present");

    assert_eq!(next.items.len(), 2);
    assert_eq!(next.items[0], state.items[0]);
    assert_eq!(next.items[1].id, MovieId::from("tt1877830"));
    assert!(next.items[1].watched);
    assert_eq!(next.error_message, None);
}

#[test]
fn replace_item_returns_none_for_unknown_id() {
    let state = two_movies();
    assert!(state
        .replace_item(&MovieId::from("tt0000000"), |item| item.with_watched(true))
        .is_none());
}

#[test]
fn replace_item_keeps_navigation_and_error_fields() {
    let mut state = two_movies().with_navigation(true);
    state.error_message = Some("stale".into());

    let next = state
        .replace_item(&MovieId::from("tt0096895"), |item| item.with_watch_later(true))
        .expect("id is present");

    assert!(next.navigate_to_details);
    assert_eq!(next.error_message.as_deref(), Some("stale"));
}

#[test]
fn failed_state_has_no_items() {
    let state = ScreenState::failed("Not found!");
    assert!(state.items.is_empty());
    assert_eq!(state.error_message.as_deref(), Some("Not found!"));
    assert!(!state.navigate_to_details);
}

#[test]
fn navigation_event_serializes_with_type_tag() {
    let event = NavigationEvent::Details {
        id: MovieId::from("tt1877830"),
    };
    let json = serde_json::to_value(&event).expect("serialize event");
    assert_eq!(json["type"], "details");
    assert_eq!(json["id"], "tt1877830");
}

#[test]
fn loaded_keeps_first_record_per_id() {
    let state = ScreenState::loaded(vec![
        MovieRecord::titled("tt0096895", "Batman"),
        MovieRecord::titled("tt1877830", "The Batman"),
        MovieRecord::titled("tt0096895", "Batman (dup)"),
    ]);

    let titles: Vec<_> = state
        .items
        .iter()
        .map(|item| item.title.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(titles, vec!["Batman", "The Batman"]);
}
