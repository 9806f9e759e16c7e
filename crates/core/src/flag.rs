// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control flags: the job's execution stage, encoded as which marker object
//! exists under the job's control directory.

use serde::{Deserialize, Serialize};

/// Stage of a submitted job.
///
/// Ready is written by the submitter; Running and Done by the worker. At
/// most one flag object exists at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlFlag {
    /// Submission finished, worker not started yet
    Ready,
    /// Worker claimed the job
    Running,
    /// Worker finished and uploaded results
    Done,
}

crate::simple_display! {
    ControlFlag {
        Ready => "ready",
        Running => "running",
        Done => "done",
    }
}

impl ControlFlag {
    pub const ALL: [ControlFlag; 3] = [ControlFlag::Ready, ControlFlag::Running, ControlFlag::Done];

    /// Object name inside the control directory
    pub fn file_name(self) -> &'static str {
        match self {
            ControlFlag::Ready => "ready.txt",
            ControlFlag::Running => "running.txt",
            ControlFlag::Done => "done.txt",
        }
    }

    /// Body written into the flag object
    pub fn marker(self) -> &'static str {
        match self {
            ControlFlag::Ready => "ready",
            ControlFlag::Running => "running",
            ControlFlag::Done => "done",
        }
    }

    /// The flag this one replaces, if any
    pub fn previous(self) -> Option<ControlFlag> {
        match self {
            ControlFlag::Ready => None,
            ControlFlag::Running => Some(ControlFlag::Ready),
            ControlFlag::Done => Some(ControlFlag::Running),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ControlFlag::Done)
    }
}

#[cfg(test)]
#[path = "flag_tests.rs"]
mod tests;
