use std::sync::Arc;

use kobllux::{
    Deck, FixedClock, InMemoryAssets,
    assets::{DeckMessage, DeckMeta},
    constants::DECK_META,
};

use crate::helpers::*;

#[tokio::test]
async fn test_deck_meta_after_save_and_delete() {
    let store = test_store();
    let deck = Deck::with_clock(
        store.clone(),
        Arc::new(InMemoryAssets::new()),
        Arc::new(FixedClock::new(1_700_000_000_000)),
    );

    let first = deck
        .save_snapshot(&[
            DeckMessage::assistant("Olá!"),
            DeckMessage::user("Me conte uma história sobre o mar e as estrelas"),
        ])
        .await
        .unwrap();
    assert_eq!(first.title, "Me conte uma história sobre o ...");

    let second = deck
        .save_snapshot(&[DeckMessage::assistant("só eu")])
        .await
        .unwrap();
    assert_eq!(second.title, "Memória Sem Nome...");

    let meta: DeckMeta = store.get_json(DECK_META).unwrap();
    assert_eq!(meta.count, 2);
    assert_eq!(meta.last_title, second.title);
    assert_eq!(meta.last_date, second.date);

    let raw: serde_json::Value = serde_json::from_str(&store.get(DECK_META, "")).unwrap();
    assert!(raw.get("lastTitle").is_some());
    assert!(raw.get("lastDate").is_some());

    deck.delete(second.id).await.unwrap();
    let meta: DeckMeta = store.get_json(DECK_META).unwrap();
    assert_eq!(meta.count, 1);
    assert_eq!(meta.last_title, first.title);

    deck.delete(first.id).await.unwrap();
    let meta: DeckMeta = store.get_json(DECK_META).unwrap();
    assert_eq!(meta.count, 0);
    assert_eq!(meta.last_title, "Vazio");
    assert_eq!(meta.last_date, "--/--");
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let clock = Arc::new(FixedClock::new(5_000));
    let deck = Deck::with_clock(test_store(), Arc::new(InMemoryAssets::new()), clock.clone());
    for text in ["um", "dois", "três"] {
        deck.save_snapshot(&[DeckMessage::user(text)]).await.unwrap();
        clock.advance(60_000);
    }

    let titles: Vec<String> = deck
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.title)
        .collect();
    assert_eq!(titles, vec!["três...", "dois...", "um..."]);
}

#[tokio::test]
async fn test_empty_snapshot_is_rejected() {
    let store = test_store();
    let deck = Deck::new(store.clone(), Arc::new(InMemoryAssets::new()));
    assert!(deck.save_snapshot(&[]).await.unwrap_err().is_validation_error());
    assert_eq!(store.get_opt(DECK_META), None);
}
