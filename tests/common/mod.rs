//! In-memory Taiga used by the integration tests.
//!
//! `FakeTaiga` implements both `Connect` and `TaigaApi`, stores records per
//! kind and records every upstream call so tests can assert on payloads and
//! on calls that must not happen.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::{json, Value};

use taiga_bridge::actions::Actions;
use taiga_bridge::api::{create_router, AppState};
use taiga_bridge::config::Config;
use taiga_bridge::idempotency::IdempotencyStore;
use taiga_bridge::models::{ItemKind, Pagination, Record};
use taiga_bridge::taiga::{Connect, Page, TaigaApi, TaigaError};

pub const API_KEY: &str = "test-key";
pub const USER_ID: i64 = 42;

/// One upstream call as seen by the fake.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CurrentUser,
    ListProjects(Vec<(String, String)>),
    GetProject(i64),
    GetProjectBySlug(String),
    List(ItemKind, Vec<(String, String)>),
    Get(ItemKind, i64),
    Create(ItemKind, Record),
    Update(ItemKind, i64, Record),
    Delete(ItemKind, i64),
    ListStatuses(ItemKind, i64),
    Link(i64, i64),
    ListUsers(Option<i64>),
    ListMemberships(i64),
    ListMilestones(i64),
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub projects: Vec<Record>,
    pub records: BTreeMap<(u8, i64), Record>,
    pub statuses: Vec<(ItemKind, Vec<Record>)>,
    pub users: Vec<Record>,
    pub memberships: Vec<Record>,
    pub milestones: Vec<Record>,
    pub pagination: Pagination,
    /// Answer `users?project=` with 403.
    pub users_forbidden: bool,
    /// Answer the next update with 409 after bumping the stored version.
    pub conflict_on_update: bool,
    /// Answer every call with this upstream status.
    pub fail_with: Option<u16>,
    pub next_id: i64,
    pub calls: Vec<Call>,
}

fn slot(kind: ItemKind) -> u8 {
    match kind {
        ItemKind::Epic => 0,
        ItemKind::Story => 1,
        ItemKind::Task => 2,
        ItemKind::Issue => 3,
    }
}

pub fn record(value: Value) -> Record {
    value.as_object().cloned().expect("test record must be an object")
}

#[derive(Clone, Default)]
pub struct FakeTaiga {
    pub state: Arc<Mutex<FakeState>>,
}

impl FakeTaiga {
    pub fn new() -> Self {
        let fake = Self::default();
        fake.state.lock().unwrap().next_id = 100;
        fake
    }

    pub fn with_project(self, value: Value) -> Self {
        self.state.lock().unwrap().projects.push(record(value));
        self
    }

    pub fn with_record(self, kind: ItemKind, value: Value) -> Self {
        let record = record(value);
        let id = record["id"].as_i64().expect("record needs an id");
        self.state.lock().unwrap().records.insert((slot(kind), id), record);
        self
    }

    pub fn with_statuses(self, kind: ItemKind, value: Value) -> Self {
        let statuses = value
            .as_array()
            .expect("statuses must be an array")
            .iter()
            .map(|s| record(s.clone()))
            .collect();
        self.state.lock().unwrap().statuses.push((kind, statuses));
        self
    }

    pub fn with_users(self, users: Value, memberships: Value) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.users = users.as_array().unwrap().iter().map(|u| record(u.clone())).collect();
            state.memberships = memberships
                .as_array()
                .unwrap()
                .iter()
                .map(|m| record(m.clone()))
                .collect();
        }
        self
    }

    pub fn with_milestones(self, value: Value) -> Self {
        self.state.lock().unwrap().milestones =
            value.as_array().unwrap().iter().map(|m| record(m.clone())).collect();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn stored(&self, kind: ItemKind, id: i64) -> Option<Record> {
        self.state.lock().unwrap().records.get(&(slot(kind), id)).cloned()
    }

    pub fn creates(&self) -> Vec<Record> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Create(_, payload) => Some(payload),
                _ => None,
            })
            .collect()
    }

    pub fn updates(&self) -> Vec<Record> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Update(_, _, payload) => Some(payload),
                _ => None,
            })
            .collect()
    }

    fn begin(&self, call: Call) -> Result<std::sync::MutexGuard<'_, FakeState>, TaigaError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        let fail_with = state.fail_with;
        match fail_with {
            Some(status) => Err(TaigaError::Api {
                status,
                body: "upstream failure".into(),
            }),
            None => Ok(state),
        }
    }
}

fn not_found() -> TaigaError {
    TaigaError::Api {
        status: 404,
        body: "{\"_error_message\": \"No matches the given query.\"}".into(),
    }
}

#[async_trait]
impl Connect for FakeTaiga {
    async fn connect(&self) -> Result<Box<dyn TaigaApi>, TaigaError> {
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl TaigaApi for FakeTaiga {
    async fn authenticate(&self) -> Result<(), TaigaError> {
        Ok(())
    }

    async fn current_user_id(&self) -> Result<i64, TaigaError> {
        self.begin(Call::CurrentUser)?;
        Ok(USER_ID)
    }

    async fn list_projects(&self, params: &[(String, String)]) -> Result<Vec<Record>, TaigaError> {
        let state = self.begin(Call::ListProjects(params.to_vec()))?;
        Ok(state.projects.clone())
    }

    async fn get_project(&self, project_id: i64) -> Result<Record, TaigaError> {
        let state = self.begin(Call::GetProject(project_id))?;
        state
            .projects
            .iter()
            .find(|p| p["id"] == json!(project_id))
            .cloned()
            .ok_or_else(not_found)
    }

    async fn get_project_by_slug(&self, slug: &str) -> Result<Record, TaigaError> {
        let state = self.begin(Call::GetProjectBySlug(slug.to_string()))?;
        state
            .projects
            .iter()
            .find(|p| p["slug"] == json!(slug))
            .cloned()
            .ok_or_else(not_found)
    }

    async fn list(&self, kind: ItemKind, params: &[(String, String)]) -> Result<Page, TaigaError> {
        let state = self.begin(Call::List(kind, params.to_vec()))?;
        let project = params
            .iter()
            .find(|(key, _)| key == "project")
            .and_then(|(_, value)| value.parse::<i64>().ok());
        let items = state
            .records
            .iter()
            .filter(|((s, _), _)| *s == slot(kind))
            .map(|(_, record)| record)
            .filter(|record| project.map_or(true, |p| record.get("project") == Some(&json!(p))))
            .cloned()
            .collect();
        Ok(Page {
            items,
            pagination: state.pagination.clone(),
        })
    }

    async fn get(&self, kind: ItemKind, id: i64) -> Result<Record, TaigaError> {
        let state = self.begin(Call::Get(kind, id))?;
        state.records.get(&(slot(kind), id)).cloned().ok_or_else(not_found)
    }

    async fn create(&self, kind: ItemKind, payload: &Record) -> Result<Record, TaigaError> {
        let mut state = self.begin(Call::Create(kind, payload.clone()))?;
        state.next_id += 1;
        let id = state.next_id;
        let mut created = payload.clone();
        created.insert("id".into(), id.into());
        created.insert("ref".into(), id.into());
        created.insert("version".into(), 1.into());
        created.insert("created_date".into(), "2025-01-01T00:00:00Z".into());
        created.insert("owner".into(), USER_ID.into());
        state.records.insert((slot(kind), id), created.clone());
        Ok(created)
    }

    async fn update(&self, kind: ItemKind, id: i64, payload: &Record) -> Result<Record, TaigaError> {
        let mut state = self.begin(Call::Update(kind, id, payload.clone()))?;
        let conflict = std::mem::take(&mut state.conflict_on_update);
        let record = state.records.get_mut(&(slot(kind), id)).ok_or_else(not_found)?;
        let version = record.get("version").and_then(Value::as_i64).unwrap_or(0);

        if conflict {
            record.insert("version".into(), (version + 1).into());
            return Err(TaigaError::Api {
                status: 409,
                body: "{\"_error_message\": \"The version doesn't match with the current one\"}"
                    .into(),
            });
        }

        for (key, value) in payload {
            if key != "version" {
                record.insert(key.clone(), value.clone());
            }
        }
        record.insert("version".into(), (version + 1).into());
        Ok(record.clone())
    }

    async fn delete(&self, kind: ItemKind, id: i64) -> Result<(), TaigaError> {
        let mut state = self.begin(Call::Delete(kind, id))?;
        state.records.remove(&(slot(kind), id)).map(|_| ()).ok_or_else(not_found)
    }

    async fn list_statuses(&self, kind: ItemKind, project_id: i64) -> Result<Vec<Record>, TaigaError> {
        let state = self.begin(Call::ListStatuses(kind, project_id))?;
        Ok(state
            .statuses
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, statuses)| statuses.clone())
            .unwrap_or_default())
    }

    async fn link_epic_user_story(
        &self,
        epic_id: i64,
        user_story_id: i64,
    ) -> Result<Option<Record>, TaigaError> {
        self.begin(Call::Link(epic_id, user_story_id))?;
        Ok(Some(record(json!({
            "epic": epic_id,
            "user_story": user_story_id,
            "order": 1,
            "epic_extra_info": {"subject": "Onboarding"}
        }))))
    }

    async fn list_users(&self, project_id: Option<i64>) -> Result<Vec<Record>, TaigaError> {
        let state = self.begin(Call::ListUsers(project_id))?;
        if state.users_forbidden && project_id.is_some() {
            return Err(TaigaError::Api {
                status: 403,
                body: "forbidden".into(),
            });
        }
        Ok(state.users.clone())
    }

    async fn list_memberships(&self, project_id: i64) -> Result<Vec<Record>, TaigaError> {
        let state = self.begin(Call::ListMemberships(project_id))?;
        Ok(state.memberships.clone())
    }

    async fn list_milestones(&self, project_id: i64) -> Result<Vec<Record>, TaigaError> {
        let state = self.begin(Call::ListMilestones(project_id))?;
        Ok(state.milestones.clone())
    }
}

/// Config with the test API key and a recognisable Taiga account.
pub fn test_config() -> Config {
    let mut config = Config::with_api_key(API_KEY);
    config.taiga.base_url = Some("https://taiga.example.com/api/v1".into());
    config.taiga.username = Some("service@example.com".into());
    config
}

pub fn actions_with(fake: &FakeTaiga, config: &Config) -> Actions {
    Actions::new(Arc::new(fake.clone()), IdempotencyStore::new(), config)
}

pub fn actions(fake: &FakeTaiga) -> Actions {
    actions_with(fake, &test_config())
}

pub fn server_with(fake: &FakeTaiga, config: Config) -> TestServer {
    let actions = actions_with(fake, &config);
    let app = create_router(AppState::new(actions, config));
    TestServer::new(app).expect("Failed to create test server")
}

pub fn server(fake: &FakeTaiga) -> TestServer {
    server_with(fake, test_config())
}

/// Project 1 with story statuses, a closed task status and story 7.
pub fn seeded() -> FakeTaiga {
    FakeTaiga::new()
        .with_project(json!({
            "id": 1, "name": "Beta Launch", "slug": "beta-launch",
            "description": "", "is_private": true, "owner": {"id": 1}
        }))
        .with_project(json!({
            "id": 2, "name": "Internal Tools", "slug": "internal-tools",
            "description": "", "is_private": false
        }))
        .with_statuses(
            ItemKind::Story,
            json!([
                {"id": 4, "name": "New", "slug": "new", "is_closed": false, "order": 1, "color": "#999"},
                {"id": 5, "name": "In Progress", "slug": "in-progress", "is_closed": false, "order": 2},
                {"id": 6, "name": "Done", "slug": "done", "is_closed": true, "order": 3}
            ]),
        )
        .with_statuses(
            ItemKind::Task,
            json!([
                {"id": 11, "name": "New", "slug": "new", "is_closed": false, "order": 1},
                {"id": 12, "name": "Closed", "slug": "closed", "is_closed": true, "order": 2}
            ]),
        )
        .with_record(
            ItemKind::Story,
            json!({
                "id": 7, "ref": 7, "subject": "Login page", "project": 1,
                "description": "First", "tags": [["ui", "#fff"], "auth"],
                "status": 4, "version": 3, "assigned_to": null
            }),
        )
}
