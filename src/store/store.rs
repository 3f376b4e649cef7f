use super::config::StoreConfig;
use super::record::Record;
use crate::error::Result;
use crate::signal::{Derived, Writable};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Application state for the admin UI.
///
/// Every field is a cell that UI code can read and subscribe to. All of them
/// except `user_tasks` can be written; `user_tasks` follows `tasks` and `user`.
///
/// # Examples
///
/// ```
/// use admin_store::{AppStore, Record};
///
/// let store = AppStore::new();
/// store.tasks.set(vec![
///     Record::new().with("user", "a@x").with("title", "Review"),
///     Record::new().with("user", "b@x").with("title", "Deploy"),
/// ]);
/// assert!(store.user_tasks.get().is_empty());
///
/// store.user.set(Some(Record::new().with("email", "a@x")));
/// assert_eq!(store.user_tasks.get().len(), 1);
/// ```
#[derive(Clone)]
pub struct AppStore {
    /// Whether a user is signed in.
    pub is_authenticated: Writable<bool>,
    /// The signed-in user. `None` means no user at all; the default is an
    /// empty record.
    pub user: Writable<Option<Record>>,
    /// The task currently being viewed or edited.
    pub task: Writable<Record>,
    /// An error for the UI to display, placed here by whoever hit it.
    pub error: Writable<Option<Value>>,
    /// Every user known to the admin UI.
    pub users: Writable<Vec<Record>>,
    /// Every task, in display order.
    pub tasks: Writable<Vec<Record>>,
    /// Tasks owned by the current user, in `tasks` order.
    pub user_tasks: Derived<Vec<Record>>,
    config: Arc<StoreConfig>,
}

impl AppStore {
    /// Create a store with every cell at its default value.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create a store matching tasks to users with the given keys.
    pub fn with_config(config: StoreConfig) -> Self {
        Self::from_snapshot(Snapshot::default(), config)
    }

    /// Create a store seeded from `snapshot`.
    ///
    /// `snapshot.user_tasks` is ignored; the list is derived from `tasks` and
    /// `user`.
    pub fn from_snapshot(snapshot: Snapshot, config: StoreConfig) -> Self {
        let config = Arc::new(config);
        let user = Writable::named("user", snapshot.user);
        let tasks = Writable::named("tasks", snapshot.tasks);

        let keys = Arc::clone(&config);
        let user_tasks = Derived::named(
            "user_tasks",
            (tasks.clone(), user.clone()),
            move |(tasks, user): (Vec<Record>, Option<Record>)| {
                tasks_for_user(&tasks, user.as_ref(), &keys)
            },
        );

        let store = Self {
            is_authenticated: Writable::named("is_authenticated", snapshot.is_authenticated),
            user,
            task: Writable::named("task", snapshot.task),
            error: Writable::named("error", snapshot.error),
            users: Writable::named("users", snapshot.users),
            tasks,
            user_tasks,
            config,
        };
        tracing::debug!(
            users = store.users.with(Vec::len),
            tasks = store.tasks.with(Vec::len),
            user_tasks = store.user_tasks.with(Vec::len),
            "app store created"
        );
        store
    }

    /// Keys used to match tasks to the current user.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Copy every cell's current value.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            is_authenticated: self.is_authenticated.get(),
            user: self.user.get(),
            task: self.task.get(),
            error: self.error.get(),
            users: self.users.get(),
            tasks: self.tasks.get(),
            user_tasks: self.user_tasks.get(),
        }
    }

    /// Write every cell back to its default value.
    ///
    /// Listeners see each write; `user_tasks` recomputes after the `user` and
    /// `tasks` writes.
    pub fn reset(&self) {
        let defaults = Snapshot::default();
        self.is_authenticated.set(defaults.is_authenticated);
        self.user.set(defaults.user);
        self.task.set(defaults.task);
        self.error.set(defaults.error);
        self.users.set(defaults.users);
        self.tasks.set(defaults.tasks);
        tracing::debug!("app store reset");
    }
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppStore")
            .field("is_authenticated", &self.is_authenticated)
            .field("user", &self.user)
            .field("task", &self.task)
            .field("error", &self.error)
            .field("users", &self.users)
            .field("tasks", &self.tasks)
            .field("user_tasks", &self.user_tasks)
            .field("config", &self.config)
            .finish()
    }
}

/// Plain copy of every cell's value, for seeding a store or dumping it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Value of [`AppStore::is_authenticated`].
    pub is_authenticated: bool,
    /// Value of [`AppStore::user`].
    pub user: Option<Record>,
    /// Value of [`AppStore::task`].
    pub task: Record,
    /// Value of [`AppStore::error`].
    pub error: Option<Value>,
    /// Value of [`AppStore::users`].
    pub users: Vec<Record>,
    /// Value of [`AppStore::tasks`].
    pub tasks: Vec<Record>,
    /// Value of [`AppStore::user_tasks`]; written out but never read back.
    #[serde(skip_deserializing)]
    pub user_tasks: Vec<Record>,
}

impl Snapshot {
    /// Parse a snapshot; missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            is_authenticated: false,
            user: Some(Record::new()),
            task: Record::new(),
            error: None,
            users: Vec::new(),
            tasks: Vec::new(),
            user_tasks: Vec::new(),
        }
    }
}

/// Tasks whose owner field equals the user's email, in order.
///
/// Returns an empty list when there is no user or the user's email is
/// missing, `null`, `false`, `0` or an empty string. Owners match only
/// strings, numbers or booleans equal to the email; numbers compare by value,
/// so `1` matches `1.0`. Objects and arrays never match.
pub fn tasks_for_user(tasks: &[Record], user: Option<&Record>, config: &StoreConfig) -> Vec<Record> {
    let Some(email) = user
        .and_then(|user| user.get(&config.user_email_key))
        .filter(|email| is_truthy(email))
    else {
        return Vec::new();
    };

    tasks
        .iter()
        .filter(|task| {
            task.get(&config.task_owner_key)
                .is_some_and(|owner| strictly_equal(owner, email))
        })
        .cloned()
        .collect()
}

fn strictly_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Null, Value::Null) => true,
        _ => false,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
