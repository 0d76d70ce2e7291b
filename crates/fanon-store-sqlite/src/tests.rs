//! Integration tests for `SqliteStore` and the service components,
//! against an in-memory database.

use fanon_core::{
  Error, ErrorKind,
  assoc::AssociationIndex,
  catalog::Catalog,
  character::NewCharacter,
  comment::{CommentParent, NewComment},
  engage::EngagementAggregator,
  graph::RelationshipGraph,
  lore::{LoreTag, NewLoreEntry},
  profile::NewProfile,
  relationship::{Direction, NewRelationship},
  series::NewSeries,
  store::{ContentStore, LoreFilter},
  theory::NewFanTheory,
  timeline::{NewTimeline, NewTimelineEvent},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

async fn seed_series(s: &SqliteStore, name: &str) -> i64 {
  s.add_series(NewSeries {
    name:        name.into(),
    description: None,
    start_year:  Some("20XX".into()),
    end_year:    None,
    color_code:  "#1d4ed8".into(),
  })
  .await
  .unwrap()
  .id
}

async fn seed_character(s: &SqliteStore, name: &str, series_id: i64) -> i64 {
  s.add_character(NewCharacter::new(name, series_id))
    .await
    .unwrap()
    .id
}

async fn seed_profile(s: &SqliteStore, username: &str) -> Uuid {
  let user_id = Uuid::new_v4();
  s.upsert_profile(NewProfile {
    user_id,
    username: username.into(),
    avatar_url: None,
    bio: None,
  })
  .await
  .unwrap();
  user_id
}

async fn seed_theory(s: &SqliteStore, creator: Uuid, title: &str) -> i64 {
  s.add_theory(NewFanTheory {
    title:              title.into(),
    description:        "what if".into(),
    branching_point:    "the final battle".into(),
    alternate_timeline: "everything diverges".into(),
    creator_id:         creator,
  })
  .await
  .unwrap()
  .id
}

fn lore_input(series_id: Option<i64>, creator: Option<Uuid>) -> NewLoreEntry {
  NewLoreEntry {
    title: "The first uprising".into(),
    content: "It began quietly.".into(),
    series_id,
    tags: vec![LoreTag::Canon],
    sources: vec!["Issue #4".into()],
    creator_id: creator,
  }
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_profile_creates_then_updates() {
  let s = store().await;
  let user_id = Uuid::new_v4();

  let created = s
    .upsert_profile(NewProfile {
      user_id,
      username: "rockfan".into(),
      avatar_url: None,
      bio: None,
    })
    .await
    .unwrap();
  assert_eq!(created.username, "rockfan");

  let updated = s
    .upsert_profile(NewProfile {
      user_id,
      username: "rockfan2".into(),
      avatar_url: Some("https://example.com/a.png".into()),
      bio: Some("longtime lurker".into()),
    })
    .await
    .unwrap();

  assert_eq!(updated.username, "rockfan2");
  assert_eq!(updated.role, created.role);
  assert_eq!(updated.created_at, created.created_at);
}

// ─── Characters ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_character() {
  let s = store().await;
  let series = seed_series(&s, "Classic").await;

  let mut input = NewCharacter::new("Zero", series);
  input.alias = Some("The Crimson Hunter".into());
  input.flags.is_reploid = true;

  let character = s.add_character(input).await.unwrap();
  let fetched = s.get_character(character.id).await.unwrap().unwrap();

  assert_eq!(fetched.name, "Zero");
  assert_eq!(fetched.alias.as_deref(), Some("The Crimson Hunter"));
  assert!(fetched.flags.is_reploid);
  assert!(!fetched.flags.is_human);
}

#[tokio::test]
async fn add_character_unknown_series_errors() {
  let s = store().await;
  let err = s
    .add_character(NewCharacter::new("Nobody", 999))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SeriesNotFound(999)));
}

#[tokio::test]
async fn list_characters_ordered_by_name() {
  let s = store().await;
  let series = seed_series(&s, "Classic").await;
  seed_character(&s, "Zero", series).await;
  seed_character(&s, "Axl", series).await;
  seed_character(&s, "Iris", series).await;

  let names: Vec<_> = s
    .list_characters(None)
    .await
    .unwrap()
    .into_iter()
    .map(|listing| listing.character.name)
    .collect();

  assert_eq!(names, ["Axl", "Iris", "Zero"]);
}

#[tokio::test]
async fn list_characters_filtered_by_series() {
  let s = store().await;
  let classic = seed_series(&s, "Classic").await;
  let x = seed_series(&s, "X").await;
  seed_character(&s, "Rock", classic).await;
  seed_character(&s, "X", x).await;

  let listings = s.list_characters(Some(x)).await.unwrap();
  assert_eq!(listings.len(), 1);
  assert_eq!(listings[0].character.name, "X");
  assert_eq!(listings[0].series.as_ref().unwrap().name, "X");
}

// ─── Relationship graph ──────────────────────────────────────────────────────

#[tokio::test]
async fn edge_is_outgoing_for_source_and_incoming_for_target() {
  let s = store().await;
  let graph = RelationshipGraph::new(s.clone());
  let series = seed_series(&s, "Classic").await;
  let a = seed_character(&s, "Rock", series).await;
  let b = seed_character(&s, "Roll", series).await;

  graph
    .add_edge(NewRelationship {
      source_id:         a,
      target_id:         b,
      relationship_type: "ally".into(),
      description:       None,
    })
    .await
    .unwrap();

  let from_a = graph.edges_for_character(a).await.unwrap();
  assert_eq!(from_a.len(), 1);
  assert_eq!(from_a[0].other_id, b);
  assert_eq!(from_a[0].direction, Direction::Outgoing);

  let from_b = graph.edges_for_character(b).await.unwrap();
  assert_eq!(from_b.len(), 1);
  assert_eq!(from_b[0].other_id, a);
  assert_eq!(from_b[0].direction, Direction::Incoming);
}

#[tokio::test]
async fn self_edge_rejected_without_mutation() {
  let s = store().await;
  let graph = RelationshipGraph::new(s.clone());
  let series = seed_series(&s, "Classic").await;
  let a = seed_character(&s, "Rock", series).await;

  let err = graph
    .add_edge(NewRelationship {
      source_id:         a,
      target_id:         a,
      relationship_type: "rival".into(),
      description:       None,
    })
    .await
    .unwrap_err();

  assert!(matches!(err, Error::SelfRelationship));
  assert_eq!(err.kind(), ErrorKind::Validation);
  assert!(graph.edges_for_character(a).await.unwrap().is_empty());
}

#[tokio::test]
async fn edge_with_unknown_character_errors() {
  let s = store().await;
  let graph = RelationshipGraph::new(s.clone());
  let series = seed_series(&s, "Classic").await;
  let a = seed_character(&s, "Rock", series).await;

  let err = graph
    .add_edge(NewRelationship {
      source_id:         a,
      target_id:         999,
      relationship_type: "ally".into(),
      description:       None,
    })
    .await
    .unwrap_err();

  assert!(matches!(err, Error::CharacterNotFound(999)));
}

#[tokio::test]
async fn reciprocal_duplicate_is_a_conflict() {
  let s = store().await;
  let graph = RelationshipGraph::new(s.clone());
  let series = seed_series(&s, "Classic").await;
  let a = seed_character(&s, "Rock", series).await;
  let b = seed_character(&s, "Roll", series).await;

  graph
    .add_edge(NewRelationship {
      source_id:         a,
      target_id:         b,
      relationship_type: "ally".into(),
      description:       None,
    })
    .await
    .unwrap();

  // Same fact restated with the endpoints flipped.
  let err = graph
    .add_edge(NewRelationship {
      source_id:         b,
      target_id:         a,
      relationship_type: "ally".into(),
      description:       None,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateRelationship(..)));
  assert_eq!(err.kind(), ErrorKind::Conflict);

  // A different type on the inverse direction is a different fact.
  graph
    .add_edge(NewRelationship {
      source_id:         b,
      target_id:         a,
      relationship_type: "creation".into(),
      description:       None,
    })
    .await
    .unwrap();

  assert_eq!(graph.edges_for_character(a).await.unwrap().len(), 2);
}

#[tokio::test]
async fn remove_edge_is_not_idempotent() {
  let s = store().await;
  let graph = RelationshipGraph::new(s.clone());
  let series = seed_series(&s, "Classic").await;
  let a = seed_character(&s, "Rock", series).await;
  let b = seed_character(&s, "Roll", series).await;

  let edge = graph
    .add_edge(NewRelationship {
      source_id:         a,
      target_id:         b,
      relationship_type: "ally".into(),
      description:       None,
    })
    .await
    .unwrap();

  graph.remove_edge(edge.id).await.unwrap();

  let err = graph.remove_edge(edge.id).await.unwrap_err();
  assert!(matches!(err, Error::RelationshipNotFound(_)));
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ─── Association index ───────────────────────────────────────────────────────

#[tokio::test]
async fn associate_is_idempotent() {
  let s = store().await;
  let assoc = AssociationIndex::new(s.clone());
  let series = seed_series(&s, "Classic").await;
  let character = seed_character(&s, "Rock", series).await;
  let entry = s.add_lore_entry(lore_input(Some(series), None)).await.unwrap();

  let first = assoc.associate(character, entry.id).await.unwrap();
  let second = assoc.associate(character, entry.id).await.unwrap();
  assert_eq!(first, second);

  let entries = assoc.lore_entries_for_character(character).await.unwrap();
  assert_eq!(entries.len(), 1);

  let characters = assoc.characters_for_lore_entry(entry.id).await.unwrap();
  assert_eq!(characters.len(), 1);
  assert_eq!(characters[0].character.id, character);
}

#[tokio::test]
async fn associate_unknown_ids_error() {
  let s = store().await;
  let assoc = AssociationIndex::new(s.clone());
  let series = seed_series(&s, "Classic").await;
  let character = seed_character(&s, "Rock", series).await;
  let entry = s.add_lore_entry(lore_input(Some(series), None)).await.unwrap();

  let err = assoc.associate(999, entry.id).await.unwrap_err();
  assert!(matches!(err, Error::CharacterNotFound(999)));

  let err = assoc.associate(character, 999).await.unwrap_err();
  assert!(matches!(err, Error::LoreEntryNotFound(999)));
}

#[tokio::test]
async fn resolution_embeds_series() {
  let s = store().await;
  let assoc = AssociationIndex::new(s.clone());
  let series = seed_series(&s, "X").await;
  let character = seed_character(&s, "X", series).await;
  let entry = s.add_lore_entry(lore_input(Some(series), None)).await.unwrap();

  assoc.associate(character, entry.id).await.unwrap();

  let entries = assoc.lore_entries_for_character(character).await.unwrap();
  assert_eq!(entries[0].series.as_ref().unwrap().name, "X");
}

// ─── Votes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn toggle_vote_keeps_counter_equal_to_rows() {
  let s = store().await;
  let engage = EngagementAggregator::new(s.clone());
  let creator = seed_profile(&s, "creator").await;
  let theory = seed_theory(&s, creator, "What if the war never ended").await;
  let voter = Uuid::new_v4();

  for round in 1..=5 {
    let receipt = engage.toggle_vote(voter, theory).await.unwrap();
    let expect_on = round % 2 == 1;

    assert_eq!(receipt.upvoted, expect_on);
    assert_eq!(receipt.upvotes, i64::from(expect_on));
    assert_eq!(s.count_votes(theory).await.unwrap(), i64::from(expect_on));
    assert_eq!(engage.has_voted(voter, theory).await.unwrap(), expect_on);

    let stored = s.get_theory(theory).await.unwrap().unwrap();
    assert_eq!(stored.upvotes, i64::from(expect_on));
  }
}

#[tokio::test]
async fn toggle_vote_is_its_own_inverse() {
  let s = store().await;
  let engage = EngagementAggregator::new(s.clone());
  let creator = seed_profile(&s, "creator").await;
  let theory = seed_theory(&s, creator, "What if").await;

  // A bystander's standing vote must survive another user's toggling.
  let bystander = Uuid::new_v4();
  engage.toggle_vote(bystander, theory).await.unwrap();

  let voter = Uuid::new_v4();
  let on = engage.toggle_vote(voter, theory).await.unwrap();
  assert!(on.upvoted);
  assert_eq!(on.upvotes, 2);

  let off = engage.toggle_vote(voter, theory).await.unwrap();
  assert!(!off.upvoted);
  assert_eq!(off.upvotes, 1);

  assert!(engage.has_voted(bystander, theory).await.unwrap());
  assert!(!engage.has_voted(voter, theory).await.unwrap());
  assert_eq!(s.count_votes(theory).await.unwrap(), 1);
}

#[tokio::test]
async fn concurrent_voters_never_skew_the_counter() {
  let s = store().await;
  let creator = seed_profile(&s, "creator").await;
  let theory = seed_theory(&s, creator, "What if").await;

  let mut handles = Vec::new();
  for _ in 0..8 {
    let engage = EngagementAggregator::new(s.clone());
    let voter = Uuid::new_v4();
    handles.push(tokio::spawn(async move {
      engage.toggle_vote(voter, theory).await
    }));
  }
  for handle in handles {
    handle.await.unwrap().unwrap();
  }

  let stored = s.get_theory(theory).await.unwrap().unwrap();
  assert_eq!(stored.upvotes, 8);
  assert_eq!(s.count_votes(theory).await.unwrap(), 8);
}

#[tokio::test]
async fn concurrent_toggles_by_one_user_stay_consistent() {
  let s = store().await;
  let creator = seed_profile(&s, "creator").await;
  let theory = seed_theory(&s, creator, "What if").await;
  let voter = Uuid::new_v4();

  let mut handles = Vec::new();
  for _ in 0..5 {
    let engage = EngagementAggregator::new(s.clone());
    handles.push(tokio::spawn(async move {
      engage.toggle_vote(voter, theory).await
    }));
  }
  for handle in handles {
    handle.await.unwrap().unwrap();
  }

  // Whatever the interleaving, the counter equals the true row count and
  // an odd number of toggles leaves the vote standing.
  let rows = s.count_votes(theory).await.unwrap();
  let stored = s.get_theory(theory).await.unwrap().unwrap();
  assert_eq!(stored.upvotes, rows);
  assert_eq!(rows, 1);
}

#[tokio::test]
async fn toggle_vote_unknown_theory_errors() {
  let s = store().await;
  let engage = EngagementAggregator::new(s.clone());

  let err = engage.toggle_vote(Uuid::new_v4(), 999).await.unwrap_err();
  assert!(matches!(err, Error::TheoryNotFound(999)));
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn blank_comment_rejected() {
  let s = store().await;
  let engage = EngagementAggregator::new(s.clone());
  let creator = seed_profile(&s, "creator").await;
  let theory = seed_theory(&s, creator, "What if").await;

  for content in ["", "   \n\t"] {
    let err = engage
      .add_comment(NewComment {
        content: content.into(),
        user_id: creator,
        parent:  CommentParent::FanTheory(theory),
      })
      .await
      .unwrap_err();
    assert!(matches!(err, Error::EmptyComment));
  }
}

#[tokio::test]
async fn comment_on_missing_parent_errors() {
  let s = store().await;
  let engage = EngagementAggregator::new(s.clone());
  let user = Uuid::new_v4();

  let err = engage
    .add_comment(NewComment {
      content: "first".into(),
      user_id: user,
      parent:  CommentParent::LoreEntry(999),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::LoreEntryNotFound(999)));

  let err = engage
    .add_comment(NewComment {
      content: "first".into(),
      user_id: user,
      parent:  CommentParent::FanTheory(999),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::TheoryNotFound(999)));
}

#[tokio::test]
async fn comments_read_back_oldest_first_with_authors() {
  let s = store().await;
  let engage = EngagementAggregator::new(s.clone());
  let author = seed_profile(&s, "author").await;
  let entry = s.add_lore_entry(lore_input(None, Some(author))).await.unwrap();
  let parent = CommentParent::LoreEntry(entry.id);

  for content in ["first", "second", "third"] {
    engage
      .add_comment(NewComment {
        content: content.into(),
        user_id: author,
        parent,
      })
      .await
      .unwrap();
  }

  let comments = engage.comments_for(parent).await.unwrap();
  let contents: Vec<_> = comments
    .iter()
    .map(|view| view.comment.content.as_str())
    .collect();
  assert_eq!(contents, ["first", "second", "third"]);
  assert!(
    comments
      .iter()
      .all(|view| view.user.as_ref().unwrap().username == "author")
  );
}

// ─── Lore entries ────────────────────────────────────────────────────────────

#[tokio::test]
async fn lore_listing_is_approved_only_newest_first() {
  let s = store().await;
  let series = seed_series(&s, "Classic").await;

  let mut hidden = lore_input(Some(series), None);
  hidden.title = "Unreviewed".into();
  s.add_lore_entry(hidden).await.unwrap();

  let mut older = lore_input(Some(series), None);
  older.title = "Older".into();
  let older = s.add_lore_entry(older).await.unwrap();
  s.approve_lore_entry(older.id).await.unwrap();

  let mut newer = lore_input(Some(series), None);
  newer.title = "Newer".into();
  newer.tags = vec![LoreTag::Disputed, LoreTag::GameOnly];
  let newer = s.add_lore_entry(newer).await.unwrap();
  s.approve_lore_entry(newer.id).await.unwrap();

  let titles: Vec<_> = s
    .list_lore_entries(LoreFilter::default())
    .await
    .unwrap()
    .into_iter()
    .map(|listing| listing.entry.title)
    .collect();
  assert_eq!(titles, ["Newer", "Older"]);

  let tagged = s
    .list_lore_entries(LoreFilter {
      tag: Some(LoreTag::GameOnly),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(tagged.len(), 1);
  assert_eq!(tagged[0].entry.title, "Newer");
}

#[tokio::test]
async fn lore_tags_and_sources_round_trip() {
  let s = store().await;

  let mut input = lore_input(None, None);
  input.tags = vec![LoreTag::GameOnly, LoreTag::MangaOnly];
  input.sources = vec!["Guidebook p.12".into(), "Interview 1994".into()];
  let entry = s.add_lore_entry(input).await.unwrap();

  let fetched = s.get_lore_entry(entry.id).await.unwrap().unwrap();
  assert_eq!(fetched.tags, vec![LoreTag::GameOnly, LoreTag::MangaOnly]);
  assert_eq!(fetched.sources, vec!["Guidebook p.12", "Interview 1994"]);
}

#[tokio::test]
async fn approve_missing_lore_entry_errors() {
  let s = store().await;
  let err = s.approve_lore_entry(999).await.unwrap_err();
  assert!(matches!(err, Error::LoreEntryNotFound(999)));
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn character_detail_composes_graph_and_lore() {
  let s = store().await;
  let catalog = Catalog::new(s.clone());
  let graph = RelationshipGraph::new(s.clone());
  let assoc = AssociationIndex::new(s.clone());

  let series = seed_series(&s, "Classic").await;
  let rock = seed_character(&s, "Rock", series).await;
  let roll = seed_character(&s, "Roll", series).await;
  let light = seed_character(&s, "Dr. Light", series).await;

  graph
    .add_edge(NewRelationship {
      source_id:         rock,
      target_id:         roll,
      relationship_type: "ally".into(),
      description:       Some("siblings in arms".into()),
    })
    .await
    .unwrap();
  graph
    .add_edge(NewRelationship {
      source_id:         light,
      target_id:         rock,
      relationship_type: "creator".into(),
      description:       None,
    })
    .await
    .unwrap();

  let approved = s.add_lore_entry(lore_input(Some(series), None)).await.unwrap();
  s.approve_lore_entry(approved.id).await.unwrap();
  let mut pending = lore_input(Some(series), None);
  pending.title = "Pending".into();
  let pending = s.add_lore_entry(pending).await.unwrap();
  assoc.associate(rock, approved.id).await.unwrap();
  assoc.associate(rock, pending.id).await.unwrap();

  let detail = catalog.character_detail(rock).await.unwrap();

  assert_eq!(detail.character.name, "Rock");
  assert_eq!(detail.series.as_ref().unwrap().name, "Classic");

  assert_eq!(detail.relationships.len(), 2);
  let ally = &detail.relationships[0];
  assert_eq!(ally.character.name, "Roll");
  assert_eq!(ally.direction, Direction::Outgoing);
  let made_by = &detail.relationships[1];
  assert_eq!(made_by.character.name, "Dr. Light");
  assert_eq!(made_by.direction, Direction::Incoming);

  // Pending lore never shows on a character page.
  assert_eq!(detail.lore_entries.len(), 1);
  assert_eq!(detail.lore_entries[0].entry.id, approved.id);
}

#[tokio::test]
async fn character_detail_missing_errors() {
  let s = store().await;
  let catalog = Catalog::new(s.clone());

  let err = catalog.character_detail(999).await.unwrap_err();
  assert!(matches!(err, Error::CharacterNotFound(999)));
}

#[tokio::test]
async fn pending_lore_visible_only_to_creator() {
  let s = store().await;
  let catalog = Catalog::new(s.clone());
  let creator = seed_profile(&s, "creator").await;
  let other = seed_profile(&s, "other").await;

  let entry = s.add_lore_entry(lore_input(None, Some(creator))).await.unwrap();

  catalog.lore_entry_detail(entry.id, Some(creator)).await.unwrap();

  let err = catalog
    .lore_entry_detail(entry.id, Some(other))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::LoreEntryNotFound(_)));
  let err = catalog.lore_entry_detail(entry.id, None).await.unwrap_err();
  assert!(matches!(err, Error::LoreEntryNotFound(_)));

  s.approve_lore_entry(entry.id).await.unwrap();
  catalog.lore_entry_detail(entry.id, Some(other)).await.unwrap();
  let detail = catalog.lore_entry_detail(entry.id, None).await.unwrap();
  assert_eq!(detail.creator.as_ref().unwrap().username, "creator");
}

#[tokio::test]
async fn lore_detail_includes_characters_and_comments() {
  let s = store().await;
  let catalog = Catalog::new(s.clone());
  let assoc = AssociationIndex::new(s.clone());
  let engage = EngagementAggregator::new(s.clone());

  let series = seed_series(&s, "Classic").await;
  let rock = seed_character(&s, "Rock", series).await;
  let commenter = seed_profile(&s, "commenter").await;
  let entry = s.add_lore_entry(lore_input(Some(series), None)).await.unwrap();
  s.approve_lore_entry(entry.id).await.unwrap();

  assoc.associate(rock, entry.id).await.unwrap();
  engage
    .add_comment(NewComment {
      content: "great read".into(),
      user_id: commenter,
      parent:  CommentParent::LoreEntry(entry.id),
    })
    .await
    .unwrap();

  let detail = catalog.lore_entry_detail(entry.id, None).await.unwrap();
  assert_eq!(detail.related_characters.len(), 1);
  assert_eq!(detail.related_characters[0].character.name, "Rock");
  assert_eq!(detail.comments.len(), 1);
  assert_eq!(detail.comments[0].comment.content, "great read");
  assert_eq!(detail.series.as_ref().unwrap().name, "Classic");
}

#[tokio::test]
async fn pending_theory_visible_only_to_creator() {
  let s = store().await;
  let catalog = Catalog::new(s.clone());
  let creator = seed_profile(&s, "creator").await;
  let other = seed_profile(&s, "other").await;
  let theory = seed_theory(&s, creator, "What if").await;

  catalog.theory_detail(theory, Some(creator)).await.unwrap();
  let err = catalog.theory_detail(theory, Some(other)).await.unwrap_err();
  assert!(matches!(err, Error::TheoryNotFound(_)));

  s.approve_theory(theory).await.unwrap();
  catalog.theory_detail(theory, Some(other)).await.unwrap();
}

#[tokio::test]
async fn theory_detail_resolves_caller_vote() {
  let s = store().await;
  let catalog = Catalog::new(s.clone());
  let engage = EngagementAggregator::new(s.clone());
  let creator = seed_profile(&s, "creator").await;
  let voter = seed_profile(&s, "voter").await;
  let theory = seed_theory(&s, creator, "What if").await;
  s.approve_theory(theory).await.unwrap();

  engage.toggle_vote(voter, theory).await.unwrap();

  let detail = catalog.theory_detail(theory, Some(voter)).await.unwrap();
  assert!(detail.has_upvoted);
  assert_eq!(detail.theory.upvotes, 1);

  let anonymous = catalog.theory_detail(theory, None).await.unwrap();
  assert!(!anonymous.has_upvoted);
}

#[tokio::test]
async fn theories_list_most_upvoted_first_approved_only() {
  let s = store().await;
  let catalog = Catalog::new(s.clone());
  let engage = EngagementAggregator::new(s.clone());
  let creator = seed_profile(&s, "creator").await;

  let quiet = seed_theory(&s, creator, "Quiet").await;
  let popular = seed_theory(&s, creator, "Popular").await;
  let hidden = seed_theory(&s, creator, "Hidden").await;
  s.approve_theory(quiet).await.unwrap();
  s.approve_theory(popular).await.unwrap();

  for _ in 0..3 {
    engage.toggle_vote(Uuid::new_v4(), popular).await.unwrap();
  }
  engage.toggle_vote(Uuid::new_v4(), hidden).await.unwrap();

  let titles: Vec<_> = catalog
    .theories()
    .await
    .unwrap()
    .into_iter()
    .map(|listing| listing.theory.title)
    .collect();
  assert_eq!(titles, ["Popular", "Quiet"]);
}

// ─── Timelines ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn timeline_events_ordered_by_year() {
  let s = store().await;
  let catalog = Catalog::new(s.clone());
  let series = seed_series(&s, "X").await;

  let timeline = s
    .add_timeline(NewTimeline {
      title:       "Alternate chronology".into(),
      description: None,
      creator_id:  None,
    })
    .await
    .unwrap();

  for (title, year, series_id) in [
    ("The awakening", "21XX", Some(series)),
    ("First light", "20XX", Some(series)),
    ("Interlude", "20XX-2", None),
  ] {
    s.add_timeline_event(NewTimelineEvent {
      timeline_id: timeline.id,
      title:       title.into(),
      description: None,
      year:        year.into(),
      series_id,
      importance:  1,
    })
    .await
    .unwrap();
  }

  let titles: Vec<_> = catalog
    .timeline_events(timeline.id, None)
    .await
    .unwrap()
    .into_iter()
    .map(|view| view.event.title)
    .collect();
  assert_eq!(titles, ["First light", "Interlude", "The awakening"]);

  let filtered = catalog
    .timeline_events(timeline.id, Some(series))
    .await
    .unwrap();
  assert_eq!(filtered.len(), 2);
  assert!(filtered.iter().all(|view| {
    view.series.as_ref().map(|s| s.name.as_str()) == Some("X")
  }));
}

#[tokio::test]
async fn events_for_unknown_timeline_error() {
  let s = store().await;
  let catalog = Catalog::new(s.clone());

  let err = catalog.timeline_events(999, None).await.unwrap_err();
  assert!(matches!(err, Error::TimelineNotFound(999)));
}

#[tokio::test]
async fn list_timelines_filtered_by_official_flag() {
  let s = store().await;

  s.add_timeline(NewTimeline {
    title:       "Fan chronology".into(),
    description: None,
    creator_id:  None,
  })
  .await
  .unwrap();

  let fan_made = s.list_timelines(Some(false)).await.unwrap();
  assert_eq!(fan_made.len(), 1);
  assert!(!fan_made[0].is_official);

  let official = s.list_timelines(Some(true)).await.unwrap();
  assert!(official.is_empty());
}

#[tokio::test]
async fn add_event_unknown_timeline_errors() {
  let s = store().await;
  let err = s
    .add_timeline_event(NewTimelineEvent {
      timeline_id: 999,
      title:       "Nowhere".into(),
      description: None,
      year:        "20XX".into(),
      series_id:   None,
      importance:  1,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::TimelineNotFound(999)));
}
