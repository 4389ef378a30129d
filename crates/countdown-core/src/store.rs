//! Session state and the operations that refresh it from the backend.
//!
//! State changes only after the backend confirmed a command. Operations take
//! `&self` and never hold a borrow of the state across an await, so a second
//! operation may start while the first is still waiting on the backend.

use std::cell::{Ref, RefCell};
use std::collections::BTreeSet;

use countdown_gui_shared::command::{
    MARK_CREATE, MARK_LIST_BY_TIMER, OPEN_DATA_DIR, TIMER_ARCHIVE, TIMER_CREATE, TIMER_LIST,
    TIMER_UPDATE, TODO_CREATE, TODO_DELETE, TODO_LIST_BY_TIMER, TODO_UPDATE_STATUS,
};
use countdown_gui_shared::{
    EpochMinutes, Mark, MarkCreateArgs, TimerArchiveArgs, Timer, TimerCreateArgs, TimerIdArg,
    TimerListArgs, TimerUpdateArgs, Todo, TodoCreateArgs, TodoIdArg, TodoStatus,
    TodoUpdateStatusArgs,
};
use serde_json::Map;
use tracing::{debug, info};

use crate::bridge::{CommandBridge, HostRuntime};
use crate::clock::parse_date_minute;
use crate::error::{CommandError, CommandResult};
use crate::format::Precision;
use crate::prefs::{KeyValueStorage, Preferences};

const NO_TIMER_SELECTED: &str = "请先选择 Timer";

/// Which draft a todo insertion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftView {
    Primary,
    Compact,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub timers: Vec<Timer>,
    pub selected_timer_id: Option<String>,
    pub marks: Vec<Mark>,
    pub todos: Vec<Todo>,
    pub preferences: Preferences,
    pending_primary: BTreeSet<String>,
    pending_compact: BTreeSet<String>,
}

impl SessionState {
    pub fn pending(&self, view: DraftView) -> &BTreeSet<String> {
        match view {
            DraftView::Primary => &self.pending_primary,
            DraftView::Compact => &self.pending_compact,
        }
    }

    fn pending_mut(&mut self, view: DraftView) -> &mut BTreeSet<String> {
        match view {
            DraftView::Primary => &mut self.pending_primary,
            DraftView::Compact => &mut self.pending_compact,
        }
    }

    pub fn selected_timer(&self) -> Option<&Timer> {
        let selected = self.selected_timer_id.as_deref()?;
        self.timers.iter().find(|timer| timer.id == selected)
    }

    fn is_selected(&self, timer_id: &str) -> bool {
        self.selected_timer_id.as_deref() == Some(timer_id)
    }

    fn clear_pending(&mut self) {
        self.pending_primary.clear();
        self.pending_compact.clear();
    }

    fn clear_scoped(&mut self) {
        self.marks.clear();
        self.todos.clear();
        self.clear_pending();
    }

    fn select(&mut self, timer_id: Option<String>) {
        if self.selected_timer_id != timer_id {
            info!(from = ?self.selected_timer_id, to = ?timer_id, "switching selected timer");
            self.selected_timer_id = timer_id;
            self.marks.clear();
            self.todos.clear();
        }
        self.clear_pending();
    }

    fn apply_timers(&mut self, timers: Vec<Timer>) {
        self.timers = timers;

        let vanished = self
            .selected_timer_id
            .as_deref()
            .is_some_and(|selected| !self.timers.iter().any(|timer| timer.id == selected));
        if vanished {
            self.select(None);
        }

        if self.selected_timer_id.is_none()
            && let Some(first) = self.timers.first().map(|timer| timer.id.clone())
        {
            self.select(Some(first));
        }
    }
}

pub struct SessionStore<H> {
    bridge: CommandBridge<H>,
    state: RefCell<SessionState>,
}

impl<H: HostRuntime> SessionStore<H> {
    pub fn new(host: H) -> Self {
        Self {
            bridge: CommandBridge::new(host),
            state: RefCell::new(SessionState::default()),
        }
    }

    /// Read-only view of the session. Do not hold it across an await.
    pub fn state(&self) -> Ref<'_, SessionState> {
        self.state.borrow()
    }

    pub fn timers(&self) -> Vec<Timer> {
        self.state.borrow().timers.clone()
    }

    pub fn selected_timer_id(&self) -> Option<String> {
        self.state.borrow().selected_timer_id.clone()
    }

    pub fn selected_timer(&self) -> Option<Timer> {
        self.state.borrow().selected_timer().cloned()
    }

    pub fn marks(&self) -> Vec<Mark> {
        self.state.borrow().marks.clone()
    }

    pub fn marks_newest_first(&self) -> Vec<Mark> {
        let mut marks = self.marks();
        marks.sort_by(|a, b| b.marked_at_minute.cmp(&a.marked_at_minute));
        marks
    }

    pub fn todos(&self) -> Vec<Todo> {
        self.state.borrow().todos.clone()
    }

    pub fn pending_todo_ids(&self, view: DraftView) -> Vec<String> {
        self.state.borrow().pending(view).iter().cloned().collect()
    }

    pub fn preferences(&self) -> Preferences {
        self.state.borrow().preferences
    }

    fn require_selection(&self) -> CommandResult<String> {
        self.selected_timer_id()
            .ok_or_else(|| CommandError::validation(NO_TIMER_SELECTED))
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_timers(&self, include_archived: bool) -> CommandResult<Vec<Timer>> {
        let timers: Vec<Timer> = self
            .bridge
            .call(TIMER_LIST, &TimerListArgs { include_archived })
            .await?;
        debug!(count = timers.len(), "timers refreshed");

        self.state.borrow_mut().apply_timers(timers.clone());
        Ok(timers)
    }

    #[tracing::instrument(skip(self, name, target))]
    pub async fn create_timer(
        &self,
        name: &str,
        target: &str,
        now_minute: EpochMinutes,
    ) -> CommandResult<Timer> {
        let (name, target_at_minute) = validate_timer_input(name, target)?;
        let timer: Timer = self
            .bridge
            .call(
                TIMER_CREATE,
                &TimerCreateArgs {
                    name,
                    target_at_minute,
                    now_minute,
                },
            )
            .await?;
        info!(timer = %timer.id, "timer created");
        Ok(timer)
    }

    #[tracing::instrument(skip(self, name, target))]
    pub async fn update_timer(
        &self,
        timer_id: &str,
        name: &str,
        target: &str,
        now_minute: EpochMinutes,
    ) -> CommandResult<Timer> {
        let (name, target_at_minute) = validate_timer_input(name, target)?;
        let timer: Timer = self
            .bridge
            .call(
                TIMER_UPDATE,
                &TimerUpdateArgs {
                    timer_id: timer_id.to_string(),
                    name,
                    target_at_minute,
                    now_minute,
                },
            )
            .await?;

        let mut state = self.state.borrow_mut();
        if let Some(cached) = state.timers.iter_mut().find(|cached| cached.id == timer.id) {
            *cached = timer.clone();
        }
        Ok(timer)
    }

    #[tracing::instrument(skip(self))]
    pub async fn archive_timer(&self, timer_id: &str, now_minute: EpochMinutes) -> CommandResult<()> {
        self.bridge
            .call_unit(
                TIMER_ARCHIVE,
                &TimerArchiveArgs {
                    timer_id: timer_id.to_string(),
                    now_minute,
                },
            )
            .await?;

        let mut state = self.state.borrow_mut();
        state.timers.retain(|timer| timer.id != timer_id);
        if state.is_selected(timer_id) {
            info!(timer = timer_id, "archived the selected timer; clearing selection");
            state.selected_timer_id = None;
            state.clear_scoped();
        }
        Ok(())
    }

    /// Replaces the selection. Both pending-insert sets are always cleared.
    pub fn select_timer(&self, timer_id: Option<&str>) {
        self.state
            .borrow_mut()
            .select(timer_id.map(str::to_string));
    }

    /// Marks of the selected timer. A response for a timer that is no longer
    /// selected is returned but not kept.
    #[tracing::instrument(skip(self))]
    pub async fn list_marks_for_selected(&self) -> CommandResult<Vec<Mark>> {
        let Some(timer_id) = self.selected_timer_id() else {
            self.state.borrow_mut().marks.clear();
            return Ok(Vec::new());
        };

        let marks: Vec<Mark> = self
            .bridge
            .call(MARK_LIST_BY_TIMER, &TimerIdArg { timer_id: timer_id.clone() })
            .await?;

        let mut state = self.state.borrow_mut();
        if state.is_selected(&timer_id) {
            state.marks = marks.clone();
        } else {
            debug!(timer = %timer_id, "selection changed while listing marks; discarding");
        }
        Ok(marks)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_todos_for_selected(&self) -> CommandResult<Vec<Todo>> {
        let Some(timer_id) = self.selected_timer_id() else {
            self.state.borrow_mut().todos.clear();
            return Ok(Vec::new());
        };

        let todos: Vec<Todo> = self
            .bridge
            .call(TODO_LIST_BY_TIMER, &TimerIdArg { timer_id: timer_id.clone() })
            .await?;

        let mut state = self.state.borrow_mut();
        if state.is_selected(&timer_id) {
            state.todos = todos.clone();
        } else {
            debug!(timer = %timer_id, "selection changed while listing todos; discarding");
        }
        Ok(todos)
    }

    pub async fn refresh_selected(&self) -> CommandResult<()> {
        self.list_marks_for_selected().await?;
        self.list_todos_for_selected().await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, description, todo_ids))]
    pub async fn create_mark(
        &self,
        description: &str,
        todo_ids: Vec<String>,
        now_minute: EpochMinutes,
    ) -> CommandResult<Mark> {
        let timer_id = self.require_selection()?;
        let mark: Mark = self
            .bridge
            .call(
                MARK_CREATE,
                &MarkCreateArgs {
                    timer_id,
                    marked_at_minute: now_minute,
                    description: description.to_string(),
                    todo_ids,
                },
            )
            .await?;

        let mut state = self.state.borrow_mut();
        if state.is_selected(&mark.timer_id) {
            state.marks.push(mark.clone());
        }
        Ok(mark)
    }

    /// Creates a mark carrying the todo ids inserted into `view`'s draft.
    /// Only that view's pending set is cleared afterwards.
    pub async fn submit_mark(
        &self,
        view: DraftView,
        description: &str,
        now_minute: EpochMinutes,
    ) -> CommandResult<Mark> {
        let todo_ids = self.pending_todo_ids(view);
        let mark = self.create_mark(description, todo_ids, now_minute).await?;
        self.state.borrow_mut().pending_mut(view).clear();
        Ok(mark)
    }

    #[tracing::instrument(skip(self, title))]
    pub async fn create_todo(&self, title: &str, now_minute: EpochMinutes) -> CommandResult<Todo> {
        let timer_id = self.require_selection()?;
        let title = title.trim();
        if title.is_empty() {
            return Err(CommandError::validation("Todo 内容不能为空"));
        }

        let todo: Todo = self
            .bridge
            .call(
                TODO_CREATE,
                &TodoCreateArgs {
                    timer_id,
                    title: title.to_string(),
                    now_minute,
                },
            )
            .await?;

        let mut state = self.state.borrow_mut();
        if state.is_selected(&todo.timer_id) {
            state.todos.push(todo.clone());
        }
        Ok(todo)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_todo_status(
        &self,
        todo_id: &str,
        status: TodoStatus,
        now_minute: EpochMinutes,
    ) -> CommandResult<Todo> {
        let todo: Todo = self
            .bridge
            .call(
                TODO_UPDATE_STATUS,
                &TodoUpdateStatusArgs {
                    todo_id: todo_id.to_string(),
                    status,
                    now_minute,
                },
            )
            .await?;

        let mut state = self.state.borrow_mut();
        if let Some(cached) = state.todos.iter_mut().find(|cached| cached.id == todo.id) {
            *cached = todo.clone();
        }
        Ok(todo)
    }

    /// Flips a cached todo between open and done.
    pub async fn toggle_todo(&self, todo_id: &str, now_minute: EpochMinutes) -> CommandResult<Todo> {
        let status = self
            .state
            .borrow()
            .todos
            .iter()
            .find(|todo| todo.id == todo_id)
            .map(|todo| todo.status.toggled())
            .ok_or_else(|| CommandError::validation(format!("Todo {todo_id} 不存在")))?;
        self.update_todo_status(todo_id, status, now_minute).await
    }

    /// Deletes a todo. Marks that reference it keep the dangling id.
    #[tracing::instrument(skip(self))]
    pub async fn delete_todo(&self, todo_id: &str) -> CommandResult<()> {
        self.bridge
            .call_unit(
                TODO_DELETE,
                &TodoIdArg {
                    todo_id: todo_id.to_string(),
                },
            )
            .await?;

        let mut state = self.state.borrow_mut();
        state.todos.retain(|todo| todo.id != todo_id);
        state.pending_primary.remove(todo_id);
        state.pending_compact.remove(todo_id);
        Ok(())
    }

    pub async fn open_data_dir(&self) -> CommandResult<()> {
        self.bridge.call_unit(OPEN_DATA_DIR, &Map::new()).await
    }

    /// Appends one todo to `draft` and records it for the next mark of `view`.
    /// Returns `false` when it was already inserted.
    pub fn insert_todo(&self, view: DraftView, todo_id: &str, draft: &mut String) -> CommandResult<bool> {
        let mut state = self.state.borrow_mut();
        let title = state
            .todos
            .iter()
            .find(|todo| todo.id == todo_id)
            .map(|todo| todo.title.clone())
            .ok_or_else(|| CommandError::validation(format!("Todo {todo_id} 不存在")))?;

        if !state.pending_mut(view).insert(todo_id.to_string()) {
            return Ok(false);
        }
        append_draft_line(draft, &title);
        Ok(true)
    }

    /// Appends every open todo not yet inserted into `view`'s draft.
    pub fn insert_open_todos(&self, view: DraftView, draft: &mut String) -> CommandResult<usize> {
        let mut state = self.state.borrow_mut();
        let open: Vec<(String, String)> = state
            .todos
            .iter()
            .filter(|todo| todo.is_open())
            .map(|todo| (todo.id.clone(), todo.title.clone()))
            .collect();
        if open.is_empty() {
            return Err(CommandError::validation("没有进行中的 Todo 可插入"));
        }

        let pending = state.pending_mut(view);
        let mut inserted = 0;
        for (id, title) in open {
            if pending.insert(id) {
                append_draft_line(draft, &title);
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    pub fn apply_preferences(&self, preferences: Preferences) {
        self.state.borrow_mut().preferences = preferences;
    }

    pub fn set_compact_mode(&self, enabled: bool, storage: &impl KeyValueStorage) {
        let prefs = {
            let mut state = self.state.borrow_mut();
            state.preferences.compact_mode = enabled;
            state.preferences
        };
        prefs.save_compact_mode(storage);
    }

    pub fn cycle_precision(&self, storage: &impl KeyValueStorage) -> Precision {
        let prefs = {
            let mut state = self.state.borrow_mut();
            state.preferences.compact_precision = state.preferences.compact_precision.next();
            state.preferences
        };
        prefs.save_precision(storage);
        prefs.compact_precision
    }
}

fn validate_timer_input(name: &str, target: &str) -> CommandResult<(String, EpochMinutes)> {
    let name = name.trim();
    match parse_date_minute(target) {
        Some(minute) if !name.is_empty() => Ok((name.to_string(), minute)),
        _ => Err(CommandError::validation("请输入合法的 timer 名称和截止时间")),
    }
}

fn append_draft_line(draft: &mut String, title: &str) {
    if !draft.trim().is_empty() {
        draft.push('\n');
    }
    draft.push_str("- ");
    draft.push_str(title);
}

#[cfg(test)]
mod tests {
    use countdown_gui_shared::Timer;

    use super::{DraftView, SessionState, append_draft_line, validate_timer_input};

    fn timer(id: &str) -> Timer {
        Timer {
            id: id.to_string(),
            name: id.to_string(),
            target_at_minute: 100,
            created_at_minute: 0,
            updated_at_minute: 0,
            archived: false,
        }
    }

    #[test]
    fn applying_timers_selects_first_when_nothing_selected() {
        let mut state = SessionState::default();
        state.apply_timers(vec![timer("a"), timer("b")]);
        assert_eq!(state.selected_timer_id.as_deref(), Some("a"));
    }

    #[test]
    fn applying_timers_keeps_a_surviving_selection() {
        let mut state = SessionState::default();
        state.apply_timers(vec![timer("a"), timer("b")]);
        state.select(Some("b".to_string()));
        state.apply_timers(vec![timer("a"), timer("b")]);
        assert_eq!(state.selected_timer_id.as_deref(), Some("b"));
    }

    #[test]
    fn vanished_selection_falls_back_to_first() {
        let mut state = SessionState::default();
        state.apply_timers(vec![timer("a"), timer("b")]);
        state.select(Some("b".to_string()));
        state.apply_timers(vec![timer("c")]);
        assert_eq!(state.selected_timer_id.as_deref(), Some("c"));

        state.apply_timers(vec![]);
        assert_eq!(state.selected_timer_id, None);
    }

    #[test]
    fn reselecting_the_same_timer_still_clears_pending() {
        let mut state = SessionState::default();
        state.select(Some("a".to_string()));
        state.pending_mut(DraftView::Primary).insert("todo-1".to_string());
        state.pending_mut(DraftView::Compact).insert("todo-2".to_string());

        state.select(Some("a".to_string()));
        assert!(state.pending(DraftView::Primary).is_empty());
        assert!(state.pending(DraftView::Compact).is_empty());
    }

    #[test]
    fn timer_input_validation() {
        assert!(validate_timer_input("  ", "2026-02-22T18:30:00Z").is_err());
        assert!(validate_timer_input("launch", "soon").is_err());
        let (name, _) =
            validate_timer_input(" launch ", "2026-02-22T18:30:00Z").expect("valid input");
        assert_eq!(name, "launch");
    }

    #[test]
    fn draft_lines_are_newline_separated() {
        let mut draft = String::new();
        append_draft_line(&mut draft, "pack");
        append_draft_line(&mut draft, "ship");
        assert_eq!(draft, "- pack\n- ship");

        let mut blank = "   ".to_string();
        append_draft_line(&mut blank, "pack");
        assert_eq!(blank, "   - pack");
    }
}
