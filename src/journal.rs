//! One-shot subcommands. Each drives the same controller the shell uses,
//! starting from a fresh session, and turns rejection notices into errors.

use crate::analyzer::AdvisoryRules;
use crate::cli::{DeleteUserArgs, LogArgs, RegisterArgs, ShowArgs};
use crate::clock::{Clock, FixedClock, KstClock};
use crate::record::{UserId, parse_date};
use crate::render::home_screen;
use crate::session::{Action, Controller, Notice, Session, Step};
use crate::shell::run_shell;
use crate::store::RecordStore;
use crate::AnkleError;
use std::io::Write;

fn expect_accepted(step: Step) -> Result<Step, AnkleError> {
    match &step.notice {
        Some(Notice::Rejected(reason)) => Err(AnkleError::Validation(reason.clone())),
        _ => Ok(step),
    }
}

fn login(ctl: &Controller<'_>, id: &str) -> Result<Session, AnkleError> {
    let step = expect_accepted(ctl.apply(&Session::default(), Action::Login(id.to_string()))?)?;
    Ok(step.session)
}

pub fn handle_register(
    store: &dyn RecordStore,
    rules: AdvisoryRules,
    args: &RegisterArgs,
) -> Result<(), AnkleError> {
    let ctl = Controller::new(store, &KstClock, rules);
    let step = expect_accepted(ctl.apply(&Session::default(), Action::Register(args.id.clone()))?)?;
    if let Some(notice) = step.notice {
        println!("{}", notice.message());
    }
    Ok(())
}

pub fn handle_log(
    store: &dyn RecordStore,
    rules: AdvisoryRules,
    args: &LogArgs,
) -> Result<(), AnkleError> {
    let clock: Box<dyn Clock> = match &args.date {
        Some(raw) => Box::new(FixedClock(parse_date(raw)?)),
        None => Box::new(KstClock),
    };
    let ctl = Controller::new(store, clock.as_ref(), rules);

    let home = login(&ctl, &args.user)?;
    let record = ctl.apply(&home, Action::StartRecording)?.session;

    let mut submission = ctl.blank_submission(&record)?;
    for (field, value) in args.assignments() {
        submission.set(field, value)?;
    }

    let step = expect_accepted(ctl.apply(&record, Action::Save(submission))?)?;
    if let Some(notice) = &step.notice {
        println!("{}", notice.message());
    }
    let view = ctl.home_view(&step.session)?;
    println!("{}", view.analysis.advisory.message());
    Ok(())
}

pub fn handle_show(
    store: &dyn RecordStore,
    rules: AdvisoryRules,
    args: &ShowArgs,
) -> Result<(), AnkleError> {
    let ctl = Controller::new(store, &KstClock, rules);
    let home = login(&ctl, &args.user)?;
    print!("{}", home_screen(&ctl.home_view(&home)?));
    Ok(())
}

pub fn handle_delete_user(
    store: &dyn RecordStore,
    rules: AdvisoryRules,
    args: &DeleteUserArgs,
) -> Result<(), AnkleError> {
    let user = UserId::parse(&args.id)?;
    if !store.user_exists(&user)? {
        return Err(AnkleError::UnknownUser(user.to_string()));
    }

    if !args.confirm {
        let count = store.list_records(&user)?.len();
        eprintln!("anklelog: would delete account {user} and {count} entries");
        eprintln!("anklelog: re-run with --confirm to delete");
        return Ok(());
    }

    let ctl = Controller::new(store, &KstClock, rules);
    let home = login(&ctl, user.as_str())?;
    let step = expect_accepted(ctl.apply(&home, Action::DeleteAccount)?)?;
    if let Some(notice) = step.notice {
        println!("{}", notice.message());
    }
    Ok(())
}

pub fn handle_shell(store: &dyn RecordStore, rules: AdvisoryRules) -> Result<(), AnkleError> {
    let ctl = Controller::new(store, &KstClock, rules);
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    run_shell(&ctl, stdin.lock(), &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

