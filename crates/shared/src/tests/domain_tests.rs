use super::*;

#[test]
fn flag_builders_keep_identity_and_other_fields() {
    let original = MovieRecord {
        year: Some("1989".into()),
        kind: Some("movie".into()),
        ..MovieRecord::titled("tt0096895", "Batman")
    };

    let marked = original.with_watch_later(true).with_watched(true);

    assert_eq!(marked.id, original.id);
    assert_eq!(marked.title, original.title);
    assert_eq!(marked.year, original.year);
    assert!(marked.watch_later);
    assert!(marked.watched);
    assert!(!original.watch_later, "builders must not mutate the source record");
}

#[test]
fn catalog_entries_default_missing_flags_to_false() {
    let record: MovieRecord = serde_json::from_str(
        r#"{"id":"tt1877830","title":"The Batman","year":"2022","type":"movie"}"#,
    )
    .expect("parse record");

    assert_eq!(record.id, MovieId::from("tt1877830"));
    assert_eq!(record.kind.as_deref(), Some("movie"));
    assert_eq!(record.poster_link, None);
    assert!(!record.watch_later);
    assert!(!record.watched);
}

#[test]
fn movie_id_serializes_as_plain_string() {
    let json = serde_json::to_string(&MovieId::new("tt0096895")).expect("serialize id");
    assert_eq!(json, "\"tt0096895\"");
    assert_eq!(MovieId::new("tt0096895").to_string(), "tt0096895");
}
