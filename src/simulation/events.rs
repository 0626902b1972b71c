use bevy_ecs::prelude::*;

use crate::data::incident::IncidentType;
use crate::simulation::playthrough::{Phase, TranscriptLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    InvalidAction,
    Content,
    Persistence,
}

/// One-line message for the player. Never mutates engine state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::InvalidAction,
            message: message.into(),
        }
    }

    pub fn content(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Content,
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Persistence,
            message: message.into(),
        }
    }
}

/// Events produced for rendering collaborators.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    LocationSelected {
        name: String,
        incident: IncidentType,
    },
    TranscriptAppended(TranscriptLine),
    StepOptionsAvailable(Vec<String>),
    PhaseChanged(Phase),
    MissionProgress {
        completed: usize,
        total: usize,
    },
    ScoreChanged {
        score: i64,
        delta: i64,
    },
    Notice(Notice),
}

#[derive(Resource, Debug, Default)]
pub struct EngineEventLog(pub Vec<EngineEvent>);

impl EngineEventLog {
    pub fn push(&mut self, event: EngineEvent) {
        self.0.push(event);
    }

    pub fn notice(&mut self, notice: Notice) {
        self.0.push(EngineEvent::Notice(notice));
    }

    pub fn drain(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.0)
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.0.iter().filter_map(|event| match event {
            EngineEvent::Notice(notice) => Some(notice),
            _ => None,
        })
    }
}
