use serde::{
  Deserialize,
  Serialize
};

/// Minutes since the Unix epoch.
pub type EpochMinutes = i64;

/// Backend command names.
pub mod command {
  pub const TIMER_LIST: &str =
    "timer_list";
  pub const TIMER_CREATE: &str =
    "timer_create";
  pub const TIMER_UPDATE: &str =
    "timer_update";
  pub const TIMER_ARCHIVE: &str =
    "timer_archive";
  pub const MARK_LIST_BY_TIMER: &str =
    "mark_list_by_timer";
  pub const MARK_CREATE: &str =
    "mark_create";
  pub const TODO_LIST_BY_TIMER: &str =
    "todo_list_by_timer";
  pub const TODO_CREATE: &str =
    "todo_create";
  pub const TODO_UPDATE_STATUS: &str =
    "todo_update_status";
  pub const TODO_DELETE: &str =
    "todo_delete";
  pub const OPEN_DATA_DIR: &str =
    "open_data_dir";
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum TodoStatus {
  Open,
  Done
}

impl TodoStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      | Self::Open => "open",
      | Self::Done => "done"
    }
  }

  pub fn parse(
    value: &str
  ) -> Option<Self> {
    match value {
      | "open" => Some(Self::Open),
      | "done" => Some(Self::Done),
      | _ => None
    }
  }

  #[must_use]
  pub fn toggled(self) -> Self {
    match self {
      | Self::Open => Self::Done,
      | Self::Done => Self::Open
    }
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Timer {
  pub id:                String,
  pub name:              String,
  pub target_at_minute:  EpochMinutes,
  pub created_at_minute: EpochMinutes,
  #[serde(default)]
  pub updated_at_minute: EpochMinutes,
  #[serde(default)]
  pub archived:          bool
}

impl Timer {
  /// Signed minutes until the target;
  /// negative once overdue.
  pub fn remaining_minutes(
    &self,
    now_minute: EpochMinutes
  ) -> EpochMinutes {
    self
      .target_at_minute
      .saturating_sub(now_minute)
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Mark {
  pub id:                    String,
  pub timer_id:              String,
  pub marked_at_minute:      EpochMinutes,
  #[serde(default)]
  pub prev_marked_at_minute:
    Option<EpochMinutes>,
  #[serde(default)]
  pub duration_minutes:
    Option<EpochMinutes>,
  #[serde(default)]
  pub description:           String,
  #[serde(default)]
  pub todo_ids:              Vec<String>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Todo {
  pub id:                String,
  pub timer_id:          String,
  pub title:             String,
  pub status:            TodoStatus,
  pub created_at_minute: EpochMinutes,
  #[serde(default)]
  pub updated_at_minute: EpochMinutes,
  #[serde(default)]
  pub done_at_minute:
    Option<EpochMinutes>
}

impl Todo {
  pub fn is_open(&self) -> bool {
    self.status == TodoStatus::Open
  }
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct TimerListArgs {
  pub include_archived: bool
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct TimerCreateArgs {
  pub name:             String,
  pub target_at_minute: EpochMinutes,
  pub now_minute:       EpochMinutes
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct TimerUpdateArgs {
  pub timer_id:         String,
  pub name:             String,
  pub target_at_minute: EpochMinutes,
  pub now_minute:       EpochMinutes
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct TimerArchiveArgs {
  pub timer_id:   String,
  pub now_minute: EpochMinutes
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct TimerIdArg {
  pub timer_id: String
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct MarkCreateArgs {
  pub timer_id:         String,
  pub marked_at_minute: EpochMinutes,
  pub description:      String,
  pub todo_ids:         Vec<String>
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct TodoCreateArgs {
  pub timer_id:   String,
  pub title:      String,
  pub now_minute: EpochMinutes
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct TodoUpdateStatusArgs {
  pub todo_id:    String,
  pub status:     TodoStatus,
  pub now_minute: EpochMinutes
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct TodoIdArg {
  pub todo_id: String
}
