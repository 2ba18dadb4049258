use crate::render::{commands, home_screen, record_screen, start_screen};
use crate::session::{Action, Controller, Screen, Session};
use crate::AnkleError;
use std::io::{BufRead, Write};

enum Command {
    Act(Action),
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(
    ctl: &Controller<'_>,
    session: &Session,
    line: &str,
) -> Result<Command, AnkleError> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(w, r)| (w, r.trim()))
        .unwrap_or((line, ""));
    let cmd = match word.to_ascii_lowercase().as_str() {
        "register" => Command::Act(Action::Register(rest.to_string())),
        "login" => Command::Act(Action::Login(rest.to_string())),
        "record" | "edit" => Command::Act(Action::StartRecording),
        "logout" => Command::Act(Action::Logout),
        "delete" => Command::Act(Action::DeleteAccount),
        "cancel" | "back" => Command::Act(Action::Cancel),
        "save" => {
            // The form only exists on the record screen.
            if session.screen() != Screen::Record {
                return Ok(Command::Unknown(format!(
                    "'save' is not available on the {} screen",
                    session.screen().name()
                )));
            }
            let mut submission = ctl.blank_submission(session)?;
            submission.apply_assignments(rest.split_whitespace())?;
            Command::Act(Action::Save(submission))
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Unknown(format!("unknown command: {other} (try 'help')")),
    };
    Ok(cmd)
}

fn render(ctl: &Controller<'_>, session: &Session) -> Result<String, AnkleError> {
    match session.screen() {
        Screen::Start => Ok(start_screen()),
        Screen::Home => Ok(home_screen(&ctl.home_view(session)?)),
        Screen::Record => Ok(record_screen(&ctl.record_view(session)?)),
    }
}

fn show<W: Write>(out: &mut W, ctl: &Controller<'_>, session: &Session) -> Result<(), AnkleError> {
    match render(ctl, session) {
        Ok(text) => write!(out, "{text}")?,
        Err(e) => writeln!(out, "anklelog: could not load screen: {e}")?,
    }
    writeln!(out, "{}", commands(session.screen()))?;
    Ok(())
}

/// Interactive start → home → record loop over line input. Ends on `quit` or EOF.
pub fn run_shell<R: BufRead, W: Write>(
    ctl: &Controller<'_>,
    input: R,
    mut out: W,
) -> Result<(), AnkleError> {
    let mut session = Session::default();
    show(&mut out, ctl, &session)?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let action = match parse_command(ctl, &session, &line) {
            Ok(Command::Act(action)) => action,
            Ok(Command::Help) => {
                show(&mut out, ctl, &session)?;
                continue;
            }
            Ok(Command::Quit) => break,
            Ok(Command::Unknown(msg)) => {
                writeln!(out, "{msg}")?;
                continue;
            }
            Err(e) if e.is_user_facing() => {
                writeln!(out, "{e}")?;
                continue;
            }
            Err(e) => {
                writeln!(out, "anklelog: {e}")?;
                continue;
            }
        };

        let saving = matches!(action, Action::Save(_));
        match ctl.apply(&session, action) {
            Ok(step) => {
                if let Some(notice) = &step.notice {
                    writeln!(out, "{}", notice.message())?;
                }
                if step.session != session {
                    session = step.session;
                    show(&mut out, ctl, &session)?;
                }
            }
            Err(e) => {
                log::warn!("action failed: {e}");
                if saving {
                    writeln!(out, "anklelog: {e}; the entry was not saved")?;
                } else {
                    writeln!(out, "anklelog: {e}")?;
                }
            }
        }
        out.flush()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::AdvisoryRules;
    use crate::clock::FixedClock;
    use crate::memory_store::MemoryStore;
    use crate::record::UserId;
    use crate::store::RecordStore;
    use chrono::NaiveDate;

    fn run(store: &MemoryStore, script: &str) -> String {
        let clock = FixedClock(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        let ctl = Controller::new(store, &clock, AdvisoryRules::default());
        let mut out = Vec::new();
        run_shell(&ctl, script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn full_walkthrough() {
        let store = MemoryStore::new();
        let out = run(
            &store,
            "register alice\n\
             login alice\n\
             record\n\
             save pain=8 sprain=occurred management=taping,coldPack\n\
             record\n\
             save pain=2 sprain=none\n\
             logout\n\
             quit\n",
        );
        assert!(out.contains("Registered alice"));
        assert!(out.contains("Welcome, alice"));
        assert!(out.contains("Record entry for 2026-10-18"));
        assert!(out.contains("Edit entry for 2026-10-18"));
        assert!(out.contains("Saved the entry for 2026-10-18"));

        let records = store.list_records(&UserId::parse("alice").unwrap()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pain.get(), 2);
        assert_eq!(records[0].management.to_text(), "taping, cold-pack");
    }

    #[test]
    fn failures_are_reported_without_moving() {
        let store = MemoryStore::new();
        let out = run(
            &store,
            "login ghost\n\
             register\n\
             save pain=1\n\
             dance\n\
             register bob\n\
             login bob\n\
             record\n\
             save pain=99\n\
             save mood=3\n\
             cancel\n",
        );
        assert!(out.contains("'ghost' is not registered"));
        assert!(out.contains("Please enter an identifier."));
        assert!(out.contains("'save' is not available on the start screen"));
        assert!(out.contains("unknown command: dance"));
        assert!(out.contains("pain: 99 out of range 0-10"));
        assert!(out.contains("unknown field: mood"));
        assert!(store.list_records(&UserId::parse("bob").unwrap()).unwrap().is_empty());
    }

    #[test]
    fn delete_account_returns_to_start() {
        let store = MemoryStore::new();
        let out = run(&store, "register carol\nlogin carol\ndelete\nlogin carol\n");
        assert!(out.contains("Deleted account carol and 0 entries."));
        assert!(out.contains("'carol' is not registered"));
        assert!(!store.user_exists(&UserId::parse("carol").unwrap()).unwrap());
    }

    #[test]
    fn management_list_with_spaces_saves_whole() {
        let store = MemoryStore::new();
        let out = run(
            &store,
            "register dana
login dana
record
save management=taping, cold-pack pain=4
",
        );
        assert!(out.contains("Saved the entry for 2026-10-18"));

        let records = store.list_records(&UserId::parse("dana").unwrap()).unwrap();
        assert_eq!(records[0].management.to_text(), "taping, cold-pack");
        assert_eq!(records[0].pain.get(), 4);
    }
}
