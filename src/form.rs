//! The daily entry form: pre-fill values and conversion of a submission into
//! the record that replaces the day's entry.

use crate::record::{
    AnkleRecord, Choice, Footwear, Level, Management, Occurrence, Surface,
};
use crate::AnkleError;
use chrono::NaiveDate;
use std::str::FromStr;

/// Values shown in the form before the user edits anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDefaults {
    pub instability: Level,
    pub pain: Level,
    pub activity: Level,
    pub sprain: Occurrence,
    pub balance: Occurrence,
    pub management: Management,
    pub footwear: Footwear,
    pub surface: Surface,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            instability: Level::clamp(5),
            pain: Level::clamp(3),
            activity: Level::clamp(5),
            sprain: Occurrence::Absent,
            balance: Occurrence::Absent,
            management: Management::default(),
            footwear: Footwear::default(),
            surface: Surface::default(),
        }
    }
}

impl FormDefaults {
    /// Today's record if there is one, the fixed defaults otherwise.
    pub fn resolve(existing: Option<&AnkleRecord>) -> Self {
        match existing {
            Some(r) => Self {
                instability: r.instability,
                pain: r.pain,
                activity: r.activity,
                sprain: r.sprain,
                balance: r.balance,
                management: r.management.clone(),
                footwear: r.footwear,
                surface: r.surface,
            },
            None => Self::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Instability,
    Pain,
    Activity,
    Sprain,
    Balance,
    Management,
    Footwear,
    Surface,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Instability,
        Field::Pain,
        Field::Activity,
        Field::Sprain,
        Field::Balance,
        Field::Management,
        Field::Footwear,
        Field::Surface,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Instability => "instability",
            Field::Pain => "pain",
            Field::Activity => "activity",
            Field::Sprain => "sprain",
            Field::Balance => "balance",
            Field::Management => "management",
            Field::Footwear => "footwear",
            Field::Surface => "surface",
        }
    }
}

impl FromStr for Field {
    type Err = AnkleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Field::ALL
            .into_iter()
            .find(|f| f.name() == key)
            .ok_or_else(|| AnkleError::Validation(format!("unknown field: {}", s.trim())))
    }
}

/// Raw form input. Nothing here is trusted until `reconcile`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub instability: i64,
    pub pain: i64,
    pub activity: i64,
    pub sprain: String,
    pub balance: String,
    pub management: String,
    pub footwear: String,
    pub surface: String,
}

impl FormSubmission {
    /// A submission equal to what the form shows untouched.
    pub fn from_defaults(defaults: &FormDefaults) -> Self {
        Self {
            instability: i64::from(defaults.instability.get()),
            pain: i64::from(defaults.pain.get()),
            activity: i64::from(defaults.activity.get()),
            sprain: defaults.sprain.as_str().to_string(),
            balance: defaults.balance.as_str().to_string(),
            management: defaults.management.to_text(),
            footwear: defaults.footwear.as_str().to_string(),
            surface: defaults.surface.as_str().to_string(),
        }
    }

    pub fn set(&mut self, field: Field, value: &str) -> Result<(), AnkleError> {
        let value = value.trim();
        match field {
            Field::Instability => self.instability = parse_level_input(field, value)?,
            Field::Pain => self.pain = parse_level_input(field, value)?,
            Field::Activity => self.activity = parse_level_input(field, value)?,
            Field::Sprain => self.sprain = value.to_string(),
            Field::Balance => self.balance = value.to_string(),
            Field::Management => self.management = value.to_string(),
            Field::Footwear => self.footwear = value.to_string(),
            Field::Surface => self.surface = value.to_string(),
        }
        Ok(())
    }

    /// Apply `field=value` tokens in order. A token without `=` continues the
    /// previous value, so `management=taping, cold-pack` arrives whole.
    pub fn apply_assignments<'a, I>(&mut self, tokens: I) -> Result<(), AnkleError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut pending: Vec<(&str, String)> = Vec::new();
        for token in tokens {
            match token.split_once('=') {
                Some((key, value)) => pending.push((key, value.to_string())),
                None => {
                    let (_, value) = pending.last_mut().ok_or_else(|| {
                        AnkleError::Validation(format!("expected field=value, got {token:?}"))
                    })?;
                    value.push(' ');
                    value.push_str(token);
                }
            }
        }
        for (key, value) in pending {
            self.set(key.parse()?, &value)?;
        }
        Ok(())
    }
}

fn parse_level_input(field: Field, value: &str) -> Result<i64, AnkleError> {
    value.parse::<i64>().map_err(|_| {
        AnkleError::Validation(format!("{}: expected a number 0-10, got {value:?}", field.name()))
    })
}

fn level(field: Field, value: i64) -> Result<Level, AnkleError> {
    Level::new(value).map_err(|_| {
        AnkleError::Validation(format!("{}: {value} out of range 0-{}", field.name(), Level::MAX))
    })
}

/// Build the full replacement record for `date`. Every field comes from the
/// submission; the previous record, if any, only influenced the pre-fill.
pub fn reconcile(submission: &FormSubmission, date: NaiveDate) -> Result<AnkleRecord, AnkleError> {
    Ok(AnkleRecord {
        date,
        instability: level(Field::Instability, submission.instability)?,
        pain: level(Field::Pain, submission.pain)?,
        activity: level(Field::Activity, submission.activity)?,
        sprain: Occurrence::parse_choice(&submission.sprain)?,
        balance: Occurrence::parse_choice(&submission.balance)?,
        management: Management::parse_list(&submission.management)?,
        footwear: Footwear::parse_choice(&submission.footwear)?,
        surface: Surface::parse_choice(&submission.surface)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn defaults_without_existing_record() {
        let d = FormDefaults::resolve(None);
        assert_eq!(d.instability.get(), 5);
        assert_eq!(d.pain.get(), 3);
        assert_eq!(d.activity.get(), 5);
        assert_eq!(d.sprain, Occurrence::Absent);
        assert!(d.management.is_empty());
        assert_eq!(d.footwear, Footwear::Sneakers);
        assert_eq!(d.surface, Surface::Flat);
    }

    #[test]
    fn defaults_follow_existing_record() {
        let mut sub = FormSubmission::from_defaults(&FormDefaults::default());
        sub.apply_assignments(["pain=8", "management=brace,taping", "surface=stairs"])
            .unwrap();
        let existing = reconcile(&sub, today()).unwrap();

        let d = FormDefaults::resolve(Some(&existing));
        assert_eq!(d.pain.get(), 8);
        assert_eq!(d.surface, Surface::Stairs);
        assert_eq!(d.management.to_text(), "taping, brace");
    }

    #[test]
    fn untouched_form_reconciles_to_defaults() {
        let sub = FormSubmission::from_defaults(&FormDefaults::default());
        let record = reconcile(&sub, today()).unwrap();
        assert_eq!(record.date, today());
        assert_eq!(record.pain.get(), 3);
        assert_eq!(record.footwear, Footwear::Sneakers);
    }

    #[test]
    fn submission_fully_replaces_previous_values() {
        let mut first = FormSubmission::from_defaults(&FormDefaults::default());
        first
            .apply_assignments([
                "instability=7",
                "pain=8",
                "activity=3",
                "sprain=occurred",
                "balance=occurred",
                "management=taping,coldPack",
            ])
            .unwrap();
        let r1 = reconcile(&first, today()).unwrap();

        let mut second = FormSubmission::from_defaults(&FormDefaults::resolve(Some(&r1)));
        second.apply_assignments(["pain=2", "sprain=none"]).unwrap();
        // Clearing a multi-select must stick, not fall back to the old value.
        second.set(Field::Management, "").unwrap();
        let r2 = reconcile(&second, today()).unwrap();

        assert_eq!(r2.pain.get(), 2);
        assert_eq!(r2.sprain, Occurrence::Absent);
        assert_eq!(r2.instability.get(), 7);
        assert_eq!(r2.balance, Occurrence::Occurred);
        assert!(r2.management.is_empty());
    }

    #[test]
    fn out_of_range_and_bad_choices_rejected() {
        let mut sub = FormSubmission::from_defaults(&FormDefaults::default());
        sub.pain = 11;
        assert!(matches!(reconcile(&sub, today()), Err(AnkleError::Validation(_))));

        let mut sub = FormSubmission::from_defaults(&FormDefaults::default());
        sub.footwear = "heels".into();
        assert!(reconcile(&sub, today()).is_err());

        let mut sub = FormSubmission::from_defaults(&FormDefaults::default());
        assert!(sub.set(Field::Activity, "lots").is_err());
        assert!(sub.apply_assignments(["mood=3"]).is_err());
        assert!(sub.apply_assignments(["pain"]).is_err());
    }

    #[test]
    fn management_list_may_contain_spaces() {
        let mut sub = FormSubmission::from_defaults(&FormDefaults::default());
        sub.apply_assignments("management=taping, cold-pack pain=6".split_whitespace())
            .unwrap();
        assert_eq!(sub.management, "taping, cold-pack");
        assert_eq!(sub.pain, 6);

        let record = reconcile(&sub, today()).unwrap();
        assert_eq!(record.management.to_text(), "taping, cold-pack");
    }
}
