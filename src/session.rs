//! Screen navigation for one interactive user.
//!
//! A `Session` is an immutable value. `Controller::apply` takes the current
//! session and an `Action` and returns the next session plus an optional
//! notice for the user. Correctable failures (bad identifier, duplicate,
//! unknown user, invalid form value, wrong screen) come back as notices with
//! the session unchanged; store failures come back as `Err` so the caller
//! keeps its previous session.

use crate::analyzer::{AdvisoryRules, Analysis, analyze, window};
use crate::clock::Clock;
use crate::form::{FormDefaults, FormSubmission, reconcile};
use crate::record::{AnkleRecord, UserId};
use crate::store::RecordStore;
use crate::AnkleError;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Start,
    Home,
    Record,
}

impl Screen {
    pub fn name(self) -> &'static str {
        match self {
            Screen::Start => "start",
            Screen::Home => "home",
            Screen::Record => "record",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    user: Option<UserId>,
    screen: Screen,
}

impl Session {
    pub fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    fn signed_in(user: UserId, screen: Screen) -> Self {
        Self {
            user: Some(user),
            screen,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Register(String),
    Login(String),
    StartRecording,
    Save(FormSubmission),
    Cancel,
    Logout,
    DeleteAccount,
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::Register(_) => "register",
            Action::Login(_) => "login",
            Action::StartRecording => "record",
            Action::Save(_) => "save",
            Action::Cancel => "cancel",
            Action::Logout => "logout",
            Action::DeleteAccount => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Registered(UserId),
    Saved(NaiveDate),
    AccountDeleted { user: UserId, records: usize },
    /// Input rejected; the session did not change.
    Rejected(String),
}

impl Notice {
    pub fn is_rejection(&self) -> bool {
        matches!(self, Notice::Rejected(_))
    }

    pub fn message(&self) -> String {
        match self {
            Notice::Registered(user) => format!("Registered {user}. You can log in now."),
            Notice::Saved(date) => format!("Saved the entry for {date}."),
            Notice::AccountDeleted { user, records } => {
                format!("Deleted account {user} and {records} entries.")
            }
            Notice::Rejected(reason) => reason.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub session: Session,
    pub notice: Option<Notice>,
}

impl Step {
    fn moved(session: Session) -> Self {
        Self {
            session,
            notice: None,
        }
    }

    fn with_notice(session: Session, notice: Notice) -> Self {
        Self {
            session,
            notice: Some(notice),
        }
    }

    fn rejected(session: &Session, reason: impl Into<String>) -> Self {
        Self::with_notice(session.clone(), Notice::Rejected(reason.into()))
    }
}

/// Entries listed on the home screen, independent of the analysis window.
pub const RECENT_ENTRIES: usize = 7;

/// Data shown on the home screen.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeView {
    pub user: UserId,
    /// Last entries by date, oldest first.
    pub recent: Vec<AnkleRecord>,
    pub analysis: Analysis,
}

/// Data shown on the record screen.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordView {
    pub user: UserId,
    pub date: NaiveDate,
    pub existing: bool,
    pub defaults: FormDefaults,
}

pub struct Controller<'a> {
    store: &'a dyn RecordStore,
    clock: &'a dyn Clock,
    rules: AdvisoryRules,
}

impl<'a> Controller<'a> {
    pub fn new(store: &'a dyn RecordStore, clock: &'a dyn Clock, rules: AdvisoryRules) -> Self {
        Self { store, clock, rules }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn apply(&self, session: &Session, action: Action) -> Result<Step, AnkleError> {
        log::debug!("{} on {} screen", action.name(), session.screen.name());
        match (session.screen, &session.user, action) {
            (Screen::Start, _, Action::Register(raw)) => self.register(session, &raw),
            (Screen::Start, _, Action::Login(raw)) => self.login(session, &raw),
            (Screen::Home, Some(user), Action::StartRecording) => {
                Ok(Step::moved(Session::signed_in(user.clone(), Screen::Record)))
            }
            (Screen::Home, Some(_), Action::Logout) => Ok(Step::moved(Session::default())),
            (Screen::Home, Some(user), Action::DeleteAccount) => {
                let records = self.store.delete_user(user)?;
                Ok(Step::with_notice(
                    Session::default(),
                    Notice::AccountDeleted {
                        user: user.clone(),
                        records,
                    },
                ))
            }
            (Screen::Record, Some(user), Action::Save(submission)) => {
                self.save(session, user, &submission)
            }
            (Screen::Record, Some(user), Action::Cancel) => {
                Ok(Step::moved(Session::signed_in(user.clone(), Screen::Home)))
            }
            (screen, _, action) => Ok(Step::rejected(
                session,
                format!("'{}' is not available on the {} screen", action.name(), screen.name()),
            )),
        }
    }

    fn register(&self, session: &Session, raw: &str) -> Result<Step, AnkleError> {
        let user = match UserId::parse(raw) {
            Ok(u) => u,
            Err(_) => return Ok(Step::rejected(session, "Please enter an identifier.")),
        };
        match self.store.create_user(&user) {
            Ok(()) => Ok(Step::with_notice(session.clone(), Notice::Registered(user))),
            Err(AnkleError::Duplicate(_)) => Ok(Step::rejected(
                session,
                format!("'{user}' is already taken. Choose another identifier."),
            )),
            Err(e) => Err(e),
        }
    }

    fn login(&self, session: &Session, raw: &str) -> Result<Step, AnkleError> {
        let user = match UserId::parse(raw) {
            Ok(u) => u,
            Err(_) => return Ok(Step::rejected(session, "Please enter an identifier.")),
        };
        if !self.store.user_exists(&user)? {
            return Ok(Step::rejected(
                session,
                format!("'{user}' is not registered. Register first."),
            ));
        }
        log::debug!("{user} logged in");
        Ok(Step::moved(Session::signed_in(user, Screen::Home)))
    }

    fn save(
        &self,
        session: &Session,
        user: &UserId,
        submission: &FormSubmission,
    ) -> Result<Step, AnkleError> {
        let date = self.today();
        let record = match reconcile(submission, date) {
            Ok(r) => r,
            Err(AnkleError::Validation(reason)) => return Ok(Step::rejected(session, reason)),
            Err(e) => return Err(e),
        };
        self.store.upsert(user, &record)?;
        Ok(Step::with_notice(
            Session::signed_in(user.clone(), Screen::Home),
            Notice::Saved(date),
        ))
    }

    fn signed_in_user<'s>(&self, session: &'s Session) -> Result<&'s UserId, AnkleError> {
        session
            .user
            .as_ref()
            .ok_or_else(|| AnkleError::Validation("no user is logged in".into()))
    }

    pub fn home_view(&self, session: &Session) -> Result<HomeView, AnkleError> {
        let user = self.signed_in_user(session)?;
        let records = self.store.list_records(user)?;
        Ok(HomeView {
            user: user.clone(),
            recent: window(&records, RECENT_ENTRIES),
            analysis: analyze(&records, &self.rules),
        })
    }

    pub fn record_view(&self, session: &Session) -> Result<RecordView, AnkleError> {
        let user = self.signed_in_user(session)?;
        let date = self.today();
        let existing = self.store.get_record(user, date)?;
        Ok(RecordView {
            user: user.clone(),
            date,
            existing: existing.is_some(),
            defaults: FormDefaults::resolve(existing.as_ref()),
        })
    }

    /// Pre-filled submission for today, as the record screen would show it.
    pub fn blank_submission(&self, session: &Session) -> Result<FormSubmission, AnkleError> {
        Ok(FormSubmission::from_defaults(&self.record_view(session)?.defaults))
    }
}
