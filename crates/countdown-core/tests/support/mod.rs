//! In-memory stand-in for the desktop backend, reachable through the same
//! invoke shapes the WebView exposes.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use countdown_core::bridge::{HostRuntime, Invoke, InvokeShape};
use countdown_core::{Mark, Timer, Todo, TodoStatus};
use serde_json::{Value, json};

#[derive(Debug, Clone)]
pub struct Call {
    pub shape: InvokeShape,
    pub command: String,
    pub payload: Value,
}

#[derive(Debug, Default)]
pub struct FakeBackend {
    pub timers: Vec<Timer>,
    pub marks: Vec<Mark>,
    pub todos: Vec<Todo>,
    pub calls: Vec<Call>,
    /// Responses returned verbatim, in order, before falling back to dispatch.
    pub scripted: VecDeque<Result<Value, Value>>,
    next_id: u64,
}

impl FakeBackend {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls.iter().map(|call| call.command.clone()).collect()
    }

    fn dispatch(&mut self, command: &str, args: &Value) -> Value {
        match self.handle(command, args) {
            Ok(data) => json!({ "ok": true, "data": data }),
            Err(message) => json!({ "ok": false, "error": { "message": message } }),
        }
    }

    fn handle(&mut self, command: &str, args: &Value) -> Result<Value, String> {
        let text = |key: &str| args[key].as_str().unwrap_or_default().to_string();
        let int = |key: &str| args[key].as_i64().unwrap_or_default();

        match command {
            "timer_list" => {
                let include_archived = args["include_archived"].as_bool().unwrap_or(false);
                let timers: Vec<&Timer> = self
                    .timers
                    .iter()
                    .filter(|timer| include_archived || !timer.archived)
                    .collect();
                Ok(json!(timers))
            }
            "timer_create" => {
                let name = text("name");
                if name.trim().is_empty() {
                    return Err("timer name cannot be empty".to_string());
                }
                let timer = Timer {
                    id: self.next_id("timer"),
                    name,
                    target_at_minute: int("target_at_minute"),
                    created_at_minute: int("now_minute"),
                    updated_at_minute: int("now_minute"),
                    archived: false,
                };
                self.timers.push(timer.clone());
                Ok(json!(timer))
            }
            "timer_update" => {
                let id = text("timer_id");
                let timer = self
                    .timers
                    .iter_mut()
                    .find(|timer| timer.id == id)
                    .ok_or_else(|| format!("not found: timer {id}"))?;
                timer.name = text("name");
                timer.target_at_minute = int("target_at_minute");
                timer.updated_at_minute = int("now_minute");
                Ok(json!(timer))
            }
            "timer_archive" => {
                let id = text("timer_id");
                let timer = self
                    .timers
                    .iter_mut()
                    .find(|timer| timer.id == id)
                    .ok_or_else(|| format!("not found: timer {id}"))?;
                timer.archived = true;
                Ok(Value::Null)
            }
            "mark_list_by_timer" => {
                let id = text("timer_id");
                let marks: Vec<&Mark> = self.marks.iter().filter(|mark| mark.timer_id == id).collect();
                Ok(json!(marks))
            }
            "mark_create" => {
                let timer_id = text("timer_id");
                let marked_at_minute = int("marked_at_minute");
                let prev_marked_at_minute = self
                    .marks
                    .iter()
                    .filter(|mark| mark.timer_id == timer_id)
                    .map(|mark| mark.marked_at_minute)
                    .max();
                let todo_ids = args["todo_ids"]
                    .as_array()
                    .map(|ids| {
                        ids.iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                let mark = Mark {
                    id: self.next_id("mark"),
                    timer_id,
                    marked_at_minute,
                    prev_marked_at_minute,
                    duration_minutes: prev_marked_at_minute.map(|prev| marked_at_minute - prev),
                    description: text("description"),
                    todo_ids,
                };
                self.marks.push(mark.clone());
                Ok(json!(mark))
            }
            "todo_list_by_timer" => {
                let id = text("timer_id");
                let todos: Vec<&Todo> = self.todos.iter().filter(|todo| todo.timer_id == id).collect();
                Ok(json!(todos))
            }
            "todo_create" => {
                let todo = Todo {
                    id: self.next_id("todo"),
                    timer_id: text("timer_id"),
                    title: text("title"),
                    status: TodoStatus::Open,
                    created_at_minute: int("now_minute"),
                    updated_at_minute: int("now_minute"),
                    done_at_minute: None,
                };
                self.todos.push(todo.clone());
                Ok(json!(todo))
            }
            "todo_update_status" => {
                let id = text("todo_id");
                let status = TodoStatus::parse(&text("status"))
                    .ok_or_else(|| format!("unsupported todo status: {}", text("status")))?;
                let now = int("now_minute");
                let todo = self
                    .todos
                    .iter_mut()
                    .find(|todo| todo.id == id)
                    .ok_or_else(|| format!("not found: todo {id}"))?;
                todo.status = status;
                todo.updated_at_minute = now;
                todo.done_at_minute = (status == TodoStatus::Done).then_some(now);
                Ok(json!(todo))
            }
            "todo_delete" => {
                let id = text("todo_id");
                self.todos.retain(|todo| todo.id != id);
                Ok(Value::Null)
            }
            "open_data_dir" => Ok(Value::Null),
            other => Err(format!("unknown command {other}")),
        }
    }
}

pub struct FakeInvoker {
    shape: InvokeShape,
    backend: Rc<RefCell<FakeBackend>>,
}

impl Invoke for FakeInvoker {
    async fn invoke(&self, command: &str, payload: Value) -> Result<Value, Value> {
        // Suspend like a real IPC round trip so other tasks can interleave.
        tokio::task::yield_now().await;

        let mut backend = self.backend.borrow_mut();
        backend.calls.push(Call {
            shape: self.shape,
            command: command.to_string(),
            payload: payload.clone(),
        });
        if let Some(scripted) = backend.scripted.pop_front() {
            return scripted;
        }
        Ok(backend.dispatch(command, &payload))
    }
}

#[derive(Clone)]
pub struct FakeHost {
    pub shapes: Vec<InvokeShape>,
    pub backend: Rc<RefCell<FakeBackend>>,
}

impl FakeHost {
    pub fn with_shapes(shapes: &[InvokeShape]) -> Self {
        Self {
            shapes: shapes.to_vec(),
            backend: Rc::new(RefCell::new(FakeBackend::default())),
        }
    }

    pub fn core() -> Self {
        Self::with_shapes(&[InvokeShape::Core])
    }

    pub fn unavailable() -> Self {
        Self::with_shapes(&[])
    }

    pub fn script(&self, response: Result<Value, Value>) {
        self.backend.borrow_mut().scripted.push_back(response);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.backend.borrow().calls.clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.backend.borrow().commands()
    }
}

impl HostRuntime for FakeHost {
    type Invoker = FakeInvoker;

    fn resolve(&self, shape: InvokeShape) -> Option<FakeInvoker> {
        self.shapes.contains(&shape).then(|| FakeInvoker {
            shape,
            backend: Rc::clone(&self.backend),
        })
    }
}
