//! FFI use-case API for the Flutter dashboard.
//!
//! # Responsibility
//! - Expose dashboard operations to Dart via FRB as flat envelopes.
//! - Resolve the store location and open it per call.
//! - Relay committed changes to Dart through drained subscriptions.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - Failures come back as `ok=false` plus a stable `error_code`.
//! - Ids cross the boundary as UUID strings.

use log::warn;
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::sync::{Mutex, MutexGuard, OnceLock};
use triumph_core::events::SubscriptionId;
use triumph_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, level_from_env,
    open_db, ping as ping_inner, ChangeEvent, ChangeNotifier, Collection, Dashboard, EntityId,
    Goal, NewSnippet, NewTask, QuickLink, ServiceError, Snippet, SnippetEdit, SnippetListQuery,
    Task, TaskPriority, WidgetConfig, WidgetKind,
};
use uuid::Uuid;

/// Env var overriding the dashboard database file location.
pub const DB_PATH_ENV: &str = "TRIUMPH_DB_PATH";
const DB_FILE_NAME: &str = "triumph_board.sqlite3";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static NOTIFIER: OnceLock<ChangeNotifier> = OnceLock::new();
static CHANGE_QUEUES: OnceLock<Mutex<HashMap<SubscriptionId, Receiver<ChangeEvent>>>> =
    OnceLock::new();

/// Health check for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error`, case-insensitive. Blank means
///   `TRIUMPH_LOG_LEVEL`, then the build default.
/// - `log_dir`: absolute directory for rolling log files.
/// - Returns an empty string on success, the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(effective_level(&level), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Outcome of one write call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Id of the created or affected entity.
    pub id: Option<String>,
    /// Machine-readable failure code; `None` on success.
    pub error_code: Option<String>,
    pub message: String,
}

/// Outcome of a toggle call, carrying the state after the flip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleResponse {
    pub ok: bool,
    pub value: bool,
    pub error_code: Option<String>,
    pub message: String,
}

/// One committed store change, as delivered to Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEventItem {
    /// `quick_links|goals|tasks|knowledge_snippets|widget_configs`.
    pub collection: String,
    /// `inserted|updated|deleted`.
    pub kind: String,
    pub id: String,
}

/// Result of opening a change subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionResponse {
    pub ok: bool,
    pub subscription_id: Option<u64>,
    pub error_code: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickLinkItem {
    pub id: String,
    pub title: String,
    pub url: String,
    pub date_added_ms: i64,
    pub display_order: i32,
}

/// Goal row with its task completion counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalItem {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub date_created_ms: i64,
    pub display_order: i32,
    pub completed_tasks: u32,
    pub total_tasks: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub goal_id: String,
    pub text: String,
    pub due_date_ms: Option<i64>,
    /// `Low|Medium|High`.
    pub priority: String,
    pub is_completed: bool,
    pub is_overdue: bool,
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetItem {
    pub id: String,
    pub title: Option<String>,
    pub content: String,
    pub language: Option<String>,
    pub tags: Option<String>,
    pub date_created_ms: i64,
    pub last_accessed_ms: Option<i64>,
    pub is_favorite: bool,
    pub display_order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetItem {
    pub id: String,
    /// `quicklinks|triumphgoals|knowledgebytes`.
    pub kind: String,
    pub display_name: String,
    pub display_order: i32,
    pub payload: Option<Vec<u8>>,
}

/// Quick links in display order; empty when the store could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickLinkListResponse {
    pub items: Vec<QuickLinkItem>,
    pub message: String,
}

/// Goals in display order with task counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalListResponse {
    pub items: Vec<GoalItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub items: Vec<TaskItem>,
    pub message: String,
}

/// Snippets newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetListResponse {
    pub items: Vec<SnippetItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetListResponse {
    pub items: Vec<WidgetItem>,
    pub message: String,
}

struct Failure {
    code: &'static str,
    message: String,
}

impl From<ServiceError> for Failure {
    fn from(err: ServiceError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: EntityId) -> Self {
        Self {
            ok: true,
            id: Some(id.to_string()),
            error_code: None,
            message: message.into(),
        }
    }

    fn failure(operation: &str, failure: Failure) -> Self {
        Self {
            ok: false,
            id: None,
            error_code: Some(failure.code.to_string()),
            message: format!("{operation} failed: {}", failure.message),
        }
    }

    fn from_result(operation: &str, result: Result<(String, EntityId), Failure>) -> Self {
        match result {
            Ok((message, id)) => Self::success(message, id),
            Err(failure) => Self::failure(operation, failure),
        }
    }
}

impl ToggleResponse {
    fn from_result(operation: &str, result: Result<bool, Failure>) -> Self {
        match result {
            Ok(value) => Self {
                ok: true,
                value,
                error_code: None,
                message: if value { "On." } else { "Off." }.to_string(),
            },
            Err(failure) => Self {
                ok: false,
                value: false,
                error_code: Some(failure.code.to_string()),
                message: format!("{operation} failed: {}", failure.message),
            },
        }
    }
}

fn list_outcome<T>(operation: &str, result: Result<Vec<T>, Failure>) -> (Vec<T>, String) {
    match result {
        Ok(items) => {
            let message = if items.is_empty() {
                "Nothing here yet.".to_string()
            } else {
                format!("{} item(s).", items.len())
            };
            (items, message)
        }
        Err(failure) => (Vec::new(), format!("{operation} failed: {}", failure.message)),
    }
}

// Quick links

#[flutter_rust_bridge::frb(sync)]
pub fn quick_link_create(title: String, url: String) -> ActionResponse {
    let result = with_dashboard(|dashboard| {
        let link = dashboard.quick_links().create_quick_link(title, url)?;
        Ok(("Link added.".to_string(), link.id))
    });
    ActionResponse::from_result("quick_link_create", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn quick_link_delete(id: String) -> ActionResponse {
    let result = parse_id(&id).and_then(|id| {
        with_dashboard(|dashboard| {
            dashboard.quick_links().delete_quick_link(id)?;
            Ok(("Link removed.".to_string(), id))
        })
    });
    ActionResponse::from_result("quick_link_delete", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn quick_links_list() -> QuickLinkListResponse {
    let result = with_dashboard(|dashboard| {
        Ok(dashboard
            .quick_links()
            .list_quick_links()
            .into_iter()
            .map(to_quick_link_item)
            .collect::<Vec<_>>())
    });
    let (items, message) = list_outcome("quick_links_list", result);
    QuickLinkListResponse { items, message }
}

// Goals and tasks

/// Creates a goal; blank `description` is stored as none.
#[flutter_rust_bridge::frb(sync)]
pub fn goal_create(name: String, description: Option<String>) -> ActionResponse {
    let result = with_dashboard(|dashboard| {
        let goal = dashboard.goals().create_goal(name, description)?;
        Ok(("Goal created.".to_string(), goal.id))
    });
    ActionResponse::from_result("goal_create", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn goal_set_description(id: String, description: Option<String>) -> ActionResponse {
    let result = parse_id(&id).and_then(|id| {
        with_dashboard(|dashboard| {
            dashboard.goals().set_goal_description(id, description)?;
            Ok(("Description saved.".to_string(), id))
        })
    });
    ActionResponse::from_result("goal_set_description", result)
}

/// Deletes a goal together with all of its tasks.
#[flutter_rust_bridge::frb(sync)]
pub fn goal_delete(id: String) -> ActionResponse {
    let result = parse_id(&id).and_then(|id| {
        with_dashboard(|dashboard| {
            let removed = dashboard.goals().delete_goal(id)?;
            Ok((format!("Goal deleted with {removed} task(s)."), id))
        })
    });
    ActionResponse::from_result("goal_delete", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn goals_list() -> GoalListResponse {
    let result = with_dashboard(|dashboard| {
        let goals = dashboard.goals();
        goals
            .list_goals()
            .into_iter()
            .map(|goal| -> Result<GoalItem, ServiceError> {
                let progress = goals.goal_progress(goal.id)?;
                Ok(to_goal_item(goal, progress.completed, progress.total))
            })
            .collect::<Result<Vec<_>, _>>()
    });
    let (items, message) = list_outcome("goals_list", result);
    GoalListResponse { items, message }
}

/// Adds a task under `goal_id`.
///
/// `priority` accepts `low|medium|high` in any case; `None` means Medium.
#[flutter_rust_bridge::frb(sync)]
pub fn task_create(
    goal_id: String,
    text: String,
    due_date_ms: Option<i64>,
    priority: Option<String>,
) -> ActionResponse {
    let result = parse_id(&goal_id).and_then(|goal_id| {
        let priority = parse_priority(priority.as_deref())?;
        let mut task = NewTask::new(text).with_priority(priority);
        if let Some(due) = due_date_ms {
            task = task.with_due_date(due);
        }
        with_dashboard(|dashboard| {
            let created = dashboard.goals().create_task(goal_id, task)?;
            Ok(("Task added.".to_string(), created.id))
        })
    });
    ActionResponse::from_result("task_create", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle_completed(id: String) -> ToggleResponse {
    let result = parse_id(&id).and_then(|id| {
        with_dashboard(|dashboard| Ok(dashboard.goals().toggle_task_completed(id)?))
    });
    ToggleResponse::from_result("task_toggle_completed", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(id: String) -> ActionResponse {
    let result = parse_id(&id).and_then(|id| {
        with_dashboard(|dashboard| {
            dashboard.goals().delete_task(id)?;
            Ok(("Task removed.".to_string(), id))
        })
    });
    ActionResponse::from_result("task_delete", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn tasks_list(goal_id: String) -> TaskListResponse {
    let result = parse_id(&goal_id).and_then(|goal_id| {
        with_dashboard(|dashboard| {
            let now = triumph_core::model::now_epoch_ms();
            Ok(dashboard
                .goals()
                .list_tasks(goal_id)
                .into_iter()
                .map(|task| to_task_item(task, now))
                .collect::<Vec<_>>())
        })
    });
    let (items, message) = list_outcome("tasks_list", result);
    TaskListResponse { items, message }
}

// Knowledge snippets

/// Saves a snippet draft. Blank content is rejected and nothing is stored.
#[flutter_rust_bridge::frb(sync)]
pub fn snippet_create(
    content: String,
    title: Option<String>,
    language: Option<String>,
    tags: Option<String>,
) -> ActionResponse {
    let draft = NewSnippet {
        title,
        content,
        language,
        tags,
    };
    let result = with_dashboard(|dashboard| {
        let snippet = dashboard.snippets().create_snippet(draft)?;
        Ok(("Snippet saved.".to_string(), snippet.id))
    });
    ActionResponse::from_result("snippet_create", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn snippet_update(
    id: String,
    content: String,
    title: Option<String>,
    language: Option<String>,
    tags: Option<String>,
    is_favorite: bool,
) -> ActionResponse {
    let edit = SnippetEdit {
        title,
        content,
        language,
        tags,
        is_favorite,
    };
    let result = parse_id(&id).and_then(|id| {
        with_dashboard(|dashboard| {
            dashboard.snippets().update_snippet(id, edit)?;
            Ok(("Snippet updated.".to_string(), id))
        })
    });
    ActionResponse::from_result("snippet_update", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn snippet_toggle_favorite(id: String) -> ToggleResponse {
    let result = parse_id(&id)
        .and_then(|id| with_dashboard(|dashboard| Ok(dashboard.snippets().toggle_favorite(id)?)));
    ToggleResponse::from_result("snippet_toggle_favorite", result)
}

/// Marks a snippet as opened now.
#[flutter_rust_bridge::frb(sync)]
pub fn snippet_touch(id: String) -> ActionResponse {
    let result = parse_id(&id).and_then(|id| {
        with_dashboard(|dashboard| {
            dashboard.snippets().touch_last_accessed(id)?;
            Ok(("Snippet opened.".to_string(), id))
        })
    });
    ActionResponse::from_result("snippet_touch", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn snippet_delete(id: String) -> ActionResponse {
    let result = parse_id(&id).and_then(|id| {
        with_dashboard(|dashboard| {
            dashboard.snippets().delete_snippet(id)?;
            Ok(("Snippet deleted.".to_string(), id))
        })
    });
    ActionResponse::from_result("snippet_delete", result)
}

/// Removes every snippet. `id` is always `None` in the response.
#[flutter_rust_bridge::frb(sync)]
pub fn snippets_delete_all() -> ActionResponse {
    match with_dashboard(|dashboard| Ok(dashboard.snippets().delete_all_snippets()?)) {
        Ok(removed) => ActionResponse {
            ok: true,
            id: None,
            error_code: None,
            message: format!("Deleted {removed} snippet(s)."),
        },
        Err(failure) => ActionResponse::failure("snippets_delete_all", failure),
    }
}

/// Snippets newest first, optionally favorites only and/or one tag.
#[flutter_rust_bridge::frb(sync)]
pub fn snippets_list(favorites_only: bool, tag: Option<String>) -> SnippetListResponse {
    let query = SnippetListQuery {
        favorites_only,
        tag: tag
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty()),
    };
    let result = with_dashboard(|dashboard| {
        Ok(dashboard
            .snippets()
            .list_snippets(&query)
            .into_iter()
            .map(to_snippet_item)
            .collect::<Vec<_>>())
    });
    let (items, message) = list_outcome("snippets_list", result);
    SnippetListResponse { items, message }
}

// Widgets

/// Add-widget flow; refuses a kind that is already placed.
///
/// `payload` is stored as opaque widget settings.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_add(kind: String, payload: Option<Vec<u8>>) -> ActionResponse {
    let result = parse_widget_kind(&kind).and_then(|kind| {
        with_dashboard(|dashboard| {
            let config = dashboard.widgets().add_widget_with_payload(kind, payload)?;
            Ok((format!("{} added.", kind.display_name()), config.id))
        })
    });
    ActionResponse::from_result("widget_add", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn widget_delete(id: String) -> ActionResponse {
    let result = parse_id(&id).and_then(|id| {
        with_dashboard(|dashboard| {
            dashboard.widgets().delete_widget_config(id)?;
            Ok(("Widget removed.".to_string(), id))
        })
    });
    ActionResponse::from_result("widget_delete", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn widgets_list() -> WidgetListResponse {
    let result = with_dashboard(|dashboard| {
        Ok(dashboard
            .widgets()
            .list_widget_configs()
            .into_iter()
            .map(to_widget_item)
            .collect::<Vec<_>>())
    });
    let (items, message) = list_outcome("widgets_list", result);
    WidgetListResponse { items, message }
}

/// Kind labels still offered by the add-widget menu.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_available_kinds() -> Vec<String> {
    with_dashboard(|dashboard| {
        Ok(dashboard
            .widgets()
            .available_widget_kinds()
            .into_iter()
            .map(|kind| kind.as_str().to_string())
            .collect::<Vec<_>>())
    })
    .unwrap_or_default()
}

// Change subscriptions

/// Starts queueing committed changes for one collection, or all when
/// `collection` is `None`.
#[flutter_rust_bridge::frb(sync)]
pub fn subscribe_changes(collection: Option<String>) -> SubscriptionResponse {
    let filter = match collection.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(label) => match Collection::parse(label) {
            Some(collection) => Some(collection),
            None => {
                return SubscriptionResponse {
                    ok: false,
                    subscription_id: None,
                    error_code: Some("validation_failed".to_string()),
                    message: format!("unknown collection `{label}`"),
                }
            }
        },
    };
    let (id, receiver) = shared_notifier().subscribe_channel(filter);
    change_queues().insert(id, receiver);
    SubscriptionResponse {
        ok: true,
        subscription_id: Some(id),
        error_code: None,
        message: "Subscribed.".to_string(),
    }
}

/// Drains changes queued since the last poll. Unknown ids yield nothing.
#[flutter_rust_bridge::frb(sync)]
pub fn poll_changes(subscription_id: u64) -> Vec<ChangeEventItem> {
    change_queues()
        .get(&subscription_id)
        .map(|receiver| receiver.try_iter().map(to_change_event_item).collect())
        .unwrap_or_default()
}

/// Stops a subscription. Returns `false` when the id was unknown.
#[flutter_rust_bridge::frb(sync)]
pub fn unsubscribe_changes(subscription_id: u64) -> bool {
    let queued = change_queues().remove(&subscription_id).is_some();
    shared_notifier().unsubscribe(subscription_id) && queued
}

fn shared_notifier() -> &'static ChangeNotifier {
    NOTIFIER.get_or_init(ChangeNotifier::new)
}

fn change_queues() -> MutexGuard<'static, HashMap<SubscriptionId, Receiver<ChangeEvent>>> {
    CHANGE_QUEUES
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn effective_level(raw: &str) -> &str {
    if raw.trim().is_empty() {
        level_from_env()
    } else {
        raw
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn open_store() -> Result<Connection, Failure> {
    let path = resolve_db_path();
    open_db(&path).map_err(|err| {
        warn!("event=ffi_store_open module=ffi status=error error={err}");
        Failure {
            code: "store_unavailable",
            message: format!("store open failed: {err}"),
        }
    })
}

fn with_dashboard<T>(
    f: impl FnOnce(&Dashboard<'_>) -> Result<T, ServiceError>,
) -> Result<T, Failure> {
    let conn = open_store()?;
    let dashboard =
        Dashboard::with_notifier(&conn, shared_notifier().clone()).map_err(|err| Failure {
            code: "store_unavailable",
            message: format!("dashboard init failed: {err}"),
        })?;
    f(&dashboard).map_err(Failure::from)
}

fn parse_id(raw: &str) -> Result<EntityId, Failure> {
    Uuid::parse_str(raw.trim()).map_err(|_| Failure {
        code: "invalid_id",
        message: format!("`{raw}` is not a valid id"),
    })
}

fn parse_priority(raw: Option<&str>) -> Result<TaskPriority, Failure> {
    match raw {
        None => Ok(TaskPriority::default()),
        Some(value) => TaskPriority::parse(value).ok_or_else(|| Failure {
            code: "validation_failed",
            message: format!("unknown priority `{value}`; expected Low, Medium or High"),
        }),
    }
}

fn parse_widget_kind(raw: &str) -> Result<WidgetKind, Failure> {
    WidgetKind::parse(raw.trim()).ok_or_else(|| Failure {
        code: "validation_failed",
        message: format!("unknown widget kind `{raw}`"),
    })
}

fn to_quick_link_item(link: QuickLink) -> QuickLinkItem {
    QuickLinkItem {
        id: link.id.to_string(),
        title: link.title,
        url: link.url,
        date_added_ms: link.date_added,
        display_order: link.display_order,
    }
}

fn to_goal_item(goal: Goal, completed_tasks: u32, total_tasks: u32) -> GoalItem {
    GoalItem {
        id: goal.id.to_string(),
        name: goal.name,
        description: goal.description,
        date_created_ms: goal.date_created,
        display_order: goal.display_order,
        completed_tasks,
        total_tasks,
    }
}

fn to_task_item(task: Task, now_ms: i64) -> TaskItem {
    TaskItem {
        id: task.id.to_string(),
        goal_id: task.goal_id.to_string(),
        is_overdue: task.is_overdue(now_ms),
        text: task.text,
        due_date_ms: task.due_date,
        priority: task.priority.as_str().to_string(),
        is_completed: task.is_completed,
        display_order: task.display_order,
    }
}

fn to_snippet_item(snippet: Snippet) -> SnippetItem {
    SnippetItem {
        id: snippet.id.to_string(),
        title: snippet.title,
        content: snippet.content,
        language: snippet.language,
        tags: snippet.tags,
        date_created_ms: snippet.date_created,
        last_accessed_ms: snippet.last_accessed,
        is_favorite: snippet.is_favorite,
        display_order: snippet.display_order,
    }
}

fn to_change_event_item(event: ChangeEvent) -> ChangeEventItem {
    ChangeEventItem {
        collection: event.collection.as_str().to_string(),
        kind: event.kind.as_str().to_string(),
        id: event.id.to_string(),
    }
}

fn to_widget_item(config: WidgetConfig) -> WidgetItem {
    WidgetItem {
        id: config.id.to_string(),
        kind: config.kind.as_str().to_string(),
        display_name: config.kind.display_name().to_string(),
        display_order: config.display_order,
        payload: config.payload,
    }
}
