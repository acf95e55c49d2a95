//! Integration tests for `DieselGroupRepository`.
//!
//! Each test runs against its own clone of the migrated template database on
//! the shared embedded PostgreSQL cluster.

use pagination::{PageRequest, SortDirection, SortKey};
use rstest::rstest;
use serde_json::json;
use things_store::domain::ports::{
    ConnectionRepository, GroupRepository, ListScope, ProfileRepository, RepositoryError,
    ThingRepository,
};
use uuid::Uuid;

mod support;

use support::fixtures::{
    TestStore, metadata, new_group, new_thing, seed_group_and_profile, store,
};

#[rstest]
fn saved_groups_round_trip(store: Option<TestStore>) {
    let Some(store) = store else {
        eprintln!("SKIP-TEST-CLUSTER: saved_groups_round_trip skipped");
        return;
    };

    let org_id = Uuid::new_v4().to_string();
    let mut group = new_group(&org_id, "plant-a");
    group.metadata = metadata(json!({"site": "north", "floor": 2}));

    let saved = store
        .block_on(store.groups.save(std::slice::from_ref(&group)))
        .expect("save group");
    assert_eq!(saved, vec![group.clone()]);

    let found = store
        .block_on(store.groups.retrieve_by_id(&group.id))
        .expect("retrieve group");
    assert_eq!(found, group);
}

#[rstest]
fn duplicate_name_in_organisation_is_a_conflict(store: Option<TestStore>) {
    let Some(store) = store else {
        eprintln!("SKIP-TEST-CLUSTER: duplicate_name_in_organisation_is_a_conflict skipped");
        return;
    };

    let org_id = Uuid::new_v4().to_string();
    let first = new_group(&org_id, "plant");
    store
        .block_on(store.groups.save(std::slice::from_ref(&first)))
        .expect("save first group");

    let fresh = new_group(&org_id, "annex");
    let clash = new_group(&org_id, "plant");
    let error = store
        .block_on(store.groups.save(&[fresh.clone(), clash]))
        .expect_err("duplicate name must fail");
    assert!(matches!(error, RepositoryError::Conflict { .. }), "{error}");
    let kept = store
        .block_on(store.groups.retrieve_by_id(&first.id))
        .expect("first group survives the clash");
    assert_eq!(kept, first);

    let missing = store
        .block_on(store.groups.retrieve_by_id(&fresh.id))
        .expect_err("batch must roll back");
    assert!(matches!(missing, RepositoryError::NotFound { .. }));

    let other_org = new_group(&Uuid::new_v4().to_string(), "plant");
    store
        .block_on(store.groups.save(std::slice::from_ref(&other_org)))
        .expect("same name in another organisation");
}

#[rstest]
#[case("not-a-uuid")]
#[case("")]
fn unparseable_group_id_is_malformed_on_save(store: Option<TestStore>, #[case] id: &str) {
    let Some(store) = store else {
        eprintln!("SKIP-TEST-CLUSTER: unparseable_group_id_is_malformed_on_save skipped");
        return;
    };

    let mut group = new_group(&Uuid::new_v4().to_string(), "plant");
    group.id = id.to_owned();
    let error = store
        .block_on(store.groups.save(&[group]))
        .expect_err("bad id must fail");
    assert!(matches!(error, RepositoryError::MalformedEntity { .. }));
}

#[rstest]
fn update_skips_blank_fields_and_replaces_metadata(store: Option<TestStore>) {
    let Some(store) = store else {
        eprintln!("SKIP-TEST-CLUSTER: update_skips_blank_fields_and_replaces_metadata skipped");
        return;
    };

    let mut group = new_group(&Uuid::new_v4().to_string(), "plant");
    group.metadata = metadata(json!({"site": "north"}));
    store
        .block_on(store.groups.save(std::slice::from_ref(&group)))
        .expect("save group");

    let mut changes = group.clone();
    changes.name = String::new();
    changes.description = "rebuilt".to_owned();
    changes.metadata = metadata(json!({"site": "south"}));
    changes.updated_at = group.updated_at + chrono::Duration::minutes(5);

    let updated = store
        .block_on(store.groups.update(&changes))
        .expect("update group");
    assert_eq!(updated.name, "plant");
    assert_eq!(updated.description, "rebuilt");
    assert_eq!(updated.metadata, metadata(json!({"site": "south"})));
    assert_eq!(updated.updated_at, changes.updated_at);
    assert_eq!(updated.created_at, group.created_at);

    let mut ghost = group.clone();
    ghost.id = Uuid::new_v4().to_string();
    let error = store
        .block_on(store.groups.update(&ghost))
        .expect_err("missing group");
    assert!(matches!(error, RepositoryError::NotFound { .. }));
}

#[rstest]
fn retrieve_by_ids_returns_existing_groups_in_id_order(store: Option<TestStore>) {
    let Some(store) = store else {
        eprintln!("SKIP-TEST-CLUSTER: retrieve_by_ids_returns_existing_groups_in_id_order skipped");
        return;
    };

    let org_id = Uuid::new_v4().to_string();
    let groups = vec![
        new_group(&org_id, "a"),
        new_group(&org_id, "b"),
        new_group(&org_id, "c"),
    ];
    store
        .block_on(store.groups.save(&groups))
        .expect("save groups");

    let mut ids: Vec<String> = groups.iter().map(|group| group.id.clone()).collect();
    ids.push(Uuid::new_v4().to_string());
    ids.push("garbage".to_owned());

    let found = store
        .block_on(store.groups.retrieve_by_ids(&ids))
        .expect("retrieve groups");
    let mut expected: Vec<String> = groups.iter().map(|group| group.id.clone()).collect();
    expected.sort();
    let found_ids: Vec<String> = found.into_iter().map(|group| group.id).collect();
    assert_eq!(found_ids, expected);

    let none = store
        .block_on(store.groups.retrieve_by_ids(&[]))
        .expect("empty lookup");
    assert!(none.is_empty());
}

#[rstest]
fn filter_combines_scope_name_and_metadata(store: Option<TestStore>) {
    let Some(store) = store else {
        eprintln!("SKIP-TEST-CLUSTER: filter_combines_scope_name_and_metadata skipped");
        return;
    };

    let org_id = Uuid::new_v4().to_string();
    let mut north_pump = new_group(&org_id, "North Pumps");
    north_pump.metadata = metadata(json!({"site": "north", "tier": 1}));
    let mut south_pump = new_group(&org_id, "south-pumps");
    south_pump.metadata = metadata(json!({"site": "south"}));
    let mut north_valve = new_group(&org_id, "north-valves");
    north_valve.metadata = metadata(json!({"site": "north"}));
    let outsider = new_group(&Uuid::new_v4().to_string(), "pumps elsewhere");
    store
        .block_on(store.groups.save(&[
            north_pump.clone(),
            south_pump.clone(),
            north_valve.clone(),
            outsider,
        ]))
        .expect("save groups");

    let scope = ListScope::Organization(org_id.clone());

    let by_name = store
        .block_on(
            store
                .groups
                .retrieve_by_filter(&scope, &PageRequest::default().with_name("PUMP")),
        )
        .expect("filter by name");
    assert_eq!(by_name.total, 2);

    let by_both = store
        .block_on(store.groups.retrieve_by_filter(
            &scope,
            &PageRequest::default()
                .with_name("pump")
                .with_metadata_entry("site", json!("north")),
        ))
        .expect("filter by name and metadata");
    assert_eq!(by_both.total, 1);
    assert_eq!(
        by_both.items.first().map(|group| group.id.as_str()),
        Some(north_pump.id.as_str())
    );

    let superset_probe = store
        .block_on(store.groups.retrieve_by_filter(
            &scope,
            &PageRequest::default().with_metadata(metadata(json!({"site": "south", "tier": 1}))),
        ))
        .expect("probe larger than any stored document");
    assert_eq!(superset_probe.total, 0);

    let listed_groups = ListScope::Groups(vec![south_pump.id.clone(), north_valve.id.clone()]);
    let by_ids = store
        .block_on(store.groups.retrieve_by_filter(
            &listed_groups,
            &PageRequest::default().with_order(SortKey::Name, SortDirection::Asc),
        ))
        .expect("filter by group ids");
    let names: Vec<&str> = by_ids.items.iter().map(|group| group.name.as_str()).collect();
    assert_eq!(names, vec!["north-valves", "south-pumps"]);
}

#[rstest]
#[case("ÄPFEL")]
#[case("Äpfel")]
#[case("-Ω")]
fn name_filter_matches_non_ascii_substrings(store: Option<TestStore>, #[case] probe: &str) {
    let Some(store) = store else {
        eprintln!("SKIP-TEST-CLUSTER: name_filter_matches_non_ascii_substrings skipped");
        return;
    };

    let org_id = Uuid::new_v4().to_string();
    let orchard = new_group(&org_id, "ÄPFEL-Ω");
    let other = new_group(&org_id, "birnen");
    store
        .block_on(store.groups.save(&[orchard.clone(), other]))
        .expect("save groups");

    let page = store
        .block_on(store.groups.retrieve_by_filter(
            &ListScope::Organization(org_id),
            &PageRequest::default().with_name(probe),
        ))
        .expect("filtered listing");
    assert_eq!(page.total, 1);
    assert_eq!(page.items, vec![orchard]);
}

#[rstest]
fn pages_report_the_full_total(store: Option<TestStore>) {
    let Some(store) = store else {
        eprintln!("SKIP-TEST-CLUSTER: pages_report_the_full_total skipped");
        return;
    };

    let org_id = Uuid::new_v4().to_string();
    let groups: Vec<_> = (0..5)
        .map(|index| new_group(&org_id, &format!("group-{index}")))
        .collect();
    store
        .block_on(store.groups.save(&groups))
        .expect("save groups");
    let scope = ListScope::Organization(org_id);

    let window = store
        .block_on(store.groups.retrieve_by_filter(
            &scope,
            &PageRequest::default()
                .with_order(SortKey::Name, SortDirection::Desc)
                .with_window(1, 2),
        ))
        .expect("second window");
    assert_eq!(window.total, 5);
    assert_eq!(window.offset, 1);
    assert_eq!(window.limit, 2);
    let names: Vec<&str> = window.items.iter().map(|group| group.name.as_str()).collect();
    assert_eq!(names, vec!["group-3", "group-2"]);
    assert!(window.has_more());

    let everything = store
        .block_on(
            store
                .groups
                .retrieve_by_filter(&scope, &PageRequest::unbounded()),
        )
        .expect("unbounded page");
    assert_eq!(everything.items.len(), 5);
    assert_eq!(everything.total, 5);

    let beyond = store
        .block_on(
            store
                .groups
                .retrieve_by_filter(&scope, &PageRequest::default().with_window(50, 10)),
        )
        .expect("window past the end");
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, 5);
}

#[rstest]
fn oversized_page_is_malformed(store: Option<TestStore>) {
    let Some(store) = store else {
        eprintln!("SKIP-TEST-CLUSTER: oversized_page_is_malformed skipped");
        return;
    };

    let error = store
        .block_on(store.groups.retrieve_by_filter(
            &ListScope::All,
            &PageRequest::default().with_window(0, pagination::MAX_LIMIT + 1),
        ))
        .expect_err("limit above maximum");
    assert!(matches!(error, RepositoryError::MalformedEntity { .. }));
}

#[rstest]
fn unknown_organisation_scope_matches_nothing(store: Option<TestStore>) {
    let Some(store) = store else {
        eprintln!("SKIP-TEST-CLUSTER: unknown_organisation_scope_matches_nothing skipped");
        return;
    };

    seed_group_and_profile(&store);
    let page = store
        .block_on(store.groups.retrieve_by_filter(
            &ListScope::Organization("not-an-org".to_owned()),
            &PageRequest::default(),
        ))
        .expect("unparseable scope still lists");
    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);
}

#[rstest]
fn removing_a_group_cascades_to_everything_it_owns(store: Option<TestStore>) {
    let Some(store) = store else {
        eprintln!("SKIP-TEST-CLUSTER: removing_a_group_cascades_to_everything_it_owns skipped");
        return;
    };

    let seed = seed_group_and_profile(&store);
    let thing = new_thing(&seed.group, &seed.profile, "pump-1", "key-pump-1");
    store
        .block_on(store.things.save(std::slice::from_ref(&thing)))
        .expect("save thing");
    store
        .block_on(
            store
                .connections
                .connect(&seed.profile.id, std::slice::from_ref(&thing.id)),
        )
        .expect("connect thing");
    store
        .execute_sql(&format!(
            "INSERT INTO group_roles (group_id, member_id, role) VALUES ('{}', 'alice', 'admin')",
            seed.group.id
        ))
        .expect("seed role");

    store
        .block_on(store.groups.remove(&[seed.group.id.clone(), "bogus".to_owned()]))
        .expect("remove group");

    let profile = store
        .block_on(store.profiles.retrieve_by_id(&seed.profile.id))
        .expect_err("profile removed");
    assert!(matches!(profile, RepositoryError::NotFound { .. }));
    let gone = store
        .block_on(store.things.retrieve_by_key("key-pump-1"))
        .expect_err("thing removed");
    assert!(matches!(gone, RepositoryError::NotFound { .. }));
    assert_eq!(store.count_rows("connections", "TRUE"), Ok(0));
    assert_eq!(store.count_rows("group_roles", "TRUE"), Ok(0));

    store
        .block_on(store.groups.remove(&[seed.group.id.clone()]))
        .expect("removing again is a no-op");
}

#[rstest]
fn missing_table_surfaces_as_retrieve_failure(store: Option<TestStore>) {
    let Some(store) = store else {
        eprintln!("SKIP-TEST-CLUSTER: missing_table_surfaces_as_retrieve_failure skipped");
        return;
    };

    seed_group_and_profile(&store);
    store
        .execute_sql("DROP TABLE groups CASCADE")
        .expect("drop groups table");

    let error = store
        .block_on(
            store
                .groups
                .retrieve_by_filter(&ListScope::All, &PageRequest::default()),
        )
        .expect_err("query against a missing table");
    assert!(matches!(error, RepositoryError::RetrieveFailed { .. }), "{error}");
}
