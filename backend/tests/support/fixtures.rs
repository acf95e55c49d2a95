//! Store fixture and record builders shared by the repository suites.

use std::future::Future;

use chrono::{SubsecRound, Utc};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use postgres::{Client, NoTls};
use rstest::fixture;
use serde_json::Value;
use things_store::domain::{Group, GroupMember, MemberTable, Metadata, Profile, Thing};
use things_store::outbound::persistence::{
    DbPool, DieselConnectionRepository, DieselGroupMemberRepository, DieselGroupRepository,
    DieselProfileRepository, DieselThingRepository, PoolConfig,
};
use tokio::runtime::Runtime;
use uuid::Uuid;

use super::cluster::shared_cluster_handle;
use super::{format_postgres_error, handle_cluster_setup_failure, provision_template_database};

/// Every repository wired to one freshly cloned database.
pub struct TestStore {
    pub groups: DieselGroupRepository,
    pub profiles: DieselProfileRepository,
    pub things: DieselThingRepository,
    pub connections: DieselConnectionRepository,
    pub pool: DbPool,
    pub database_url: String,
    runtime: Runtime,
    _database: TemporaryDatabase,
}

impl TestStore {
    /// Drive a repository future to completion.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Repository for one member table.
    pub fn members(&self, table: MemberTable) -> DieselGroupMemberRepository {
        DieselGroupMemberRepository::new(self.pool.clone(), table)
    }

    /// Run raw SQL outside the repositories.
    pub fn execute_sql(&self, sql: &str) -> Result<(), String> {
        let mut client =
            Client::connect(&self.database_url, NoTls).map_err(|err| format_postgres_error(&err))?;
        client
            .batch_execute(sql)
            .map_err(|err| format_postgres_error(&err))
    }

    /// Count rows of `table` matching `predicate`.
    pub fn count_rows(&self, table: &str, predicate: &str) -> Result<i64, String> {
        let mut client =
            Client::connect(&self.database_url, NoTls).map_err(|err| format_postgres_error(&err))?;
        let row = client
            .query_one(
                format!("SELECT COUNT(*) FROM {table} WHERE {predicate}").as_str(),
                &[],
            )
            .map_err(|err| format_postgres_error(&err))?;
        Ok(row.get(0))
    }
}

fn setup_store() -> Result<TestStore, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster_handle().map_err(|err| err.to_string())?;
    let database = provision_template_database(cluster)?;
    let database_url = database.url().to_string();

    let config = PoolConfig::new(database_url.as_str())
        .with_max_size(4)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    Ok(TestStore {
        groups: DieselGroupRepository::new(pool.clone()),
        profiles: DieselProfileRepository::new(pool.clone()),
        things: DieselThingRepository::new(pool.clone()),
        connections: DieselConnectionRepository::new(pool.clone()),
        pool,
        database_url,
        runtime,
        _database: database,
    })
}

/// A migrated store, or `None` when the cluster is unavailable and
/// `SKIP_TEST_CLUSTER` is set.
#[fixture]
pub fn store() -> Option<TestStore> {
    match setup_store() {
        Ok(store) => Some(store),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

/// Build a metadata map from a JSON object literal.
pub fn metadata(value: Value) -> Metadata {
    match value {
        Value::Object(map) => map,
        _ => Metadata::new(),
    }
}

pub fn new_group(org_id: &str, name: &str) -> Group {
    let now = Utc::now().trunc_subsecs(6);
    Group {
        id: Uuid::new_v4().to_string(),
        org_id: org_id.to_owned(),
        name: name.to_owned(),
        description: format!("{name} description"),
        metadata: Metadata::new(),
        created_at: now,
        updated_at: now,
    }
}

pub fn new_profile(group: &Group, name: &str) -> Profile {
    Profile {
        id: Uuid::new_v4().to_string(),
        group_id: group.id.clone(),
        name: name.to_owned(),
        config: metadata(serde_json::json!({"transport": "mqtt"})),
        metadata: Metadata::new(),
    }
}

pub fn new_thing(group: &Group, profile: &Profile, name: &str, key: &str) -> Thing {
    Thing {
        id: Uuid::new_v4().to_string(),
        group_id: group.id.clone(),
        profile_id: profile.id.clone(),
        name: name.to_owned(),
        key: key.to_owned(),
        metadata: Metadata::new(),
    }
}

pub fn new_member(group: &Group, member_id: &str, role: &str) -> GroupMember {
    GroupMember::new(group.id.clone(), member_id, role)
}

/// One group with one profile, already stored.
pub struct Seed {
    pub org_id: String,
    pub group: Group,
    pub profile: Profile,
}

/// Store a group and a profile inside it.
pub fn seed_group_and_profile(store: &TestStore) -> Seed {
    let org_id = Uuid::new_v4().to_string();
    let group = new_group(&org_id, "plant");
    let profile = new_profile(&group, "gateway");
    store.block_on(async {
        use things_store::domain::ports::{GroupRepository, ProfileRepository};

        store
            .groups
            .save(std::slice::from_ref(&group))
            .await
            .expect("seed group");
        store
            .profiles
            .save(std::slice::from_ref(&profile))
            .await
            .expect("seed profile");
    });
    Seed {
        org_id,
        group,
        profile,
    }
}
