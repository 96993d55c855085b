//! Boss rules: progress thresholds that interrupt the regular structure sequence.
//!
//! Rules come from `#BOSS_SETTING::<trigger>-><boss>` directives:
//!
//! - `<trigger>` = `N` fires once when progress crosses `N`,
//! - `<trigger>` = `EVERY_N` fires at every multiple of `N`.
//!
//! Progress counts the units of regular templates and their gaps. The start
//! floor and boss rooms don't advance it, so a boss can't trigger the next one.

use std::fmt;

use thiserror::Error;

use super::structure::Structure;

const EVERY_PREFIX: &str = "EVERY_";

/// When a boss rule fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BossTrigger {
    /// Once, at this progress.
    At(u32),
    /// At every positive multiple of this interval.
    Every(u32),
}

impl BossTrigger {
    /// Lowest threshold of this trigger inside `(last, current]`.
    fn first_crossing(&self, last: u32, current: u32) -> Option<u32> {
        let threshold = match *self {
            BossTrigger::At(at) => at,
            BossTrigger::Every(interval) => (last / interval + 1).checked_mul(interval)?,
        };
        (last < threshold && threshold <= current).then_some(threshold)
    }
}

impl std::str::FromStr for BossTrigger {
    type Err = InvalidTrigger;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (number, every) = match s.strip_prefix(EVERY_PREFIX) {
            Some(interval) => (interval, true),
            None => (s, false),
        };
        // Progress starts at 0, so a zero threshold could never be crossed.
        match number.parse::<u32>() {
            Ok(0) | Err(_) => Err(InvalidTrigger(s.to_string())),
            Ok(n) if every => Ok(BossTrigger::Every(n)),
            Ok(n) => Ok(BossTrigger::At(n)),
        }
    }
}

impl fmt::Display for BossTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BossTrigger::At(at) => write!(f, "{at}"),
            BossTrigger::Every(interval) => write!(f, "{EVERY_PREFIX}{interval}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid boss trigger '{0}' (expected N or EVERY_N, N > 0)")]
pub struct InvalidTrigger(pub String);

/// A single rule: trigger → boss symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BossRule {
    pub trigger: BossTrigger,
    pub boss: String,
}

/// Ordered table of boss rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BossSetting {
    rules: Vec<BossRule>,
}

impl BossSetting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule from directive text. A rule with the same trigger is replaced.
    pub fn set_setting(&mut self, trigger: &str, boss: impl Into<String>) -> Result<(), InvalidTrigger> {
        let trigger: BossTrigger = trigger.parse()?;
        let rule = BossRule {
            trigger,
            boss: boss.into(),
        };
        match self.rules.iter_mut().find(|r| r.trigger == trigger) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
        Ok(())
    }

    pub fn rules(&self) -> &[BossRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The boss rule whose threshold lies in `(last, current]`, if any.
    ///
    /// When several thresholds fall inside the interval, the lowest wins and
    /// the others are skipped. Equal thresholds go to the earlier rule.
    pub fn rule_crossed(&self, last: u32, current: u32) -> Option<&BossRule> {
        self.rules
            .iter()
            .filter_map(|rule| Some((rule.trigger.first_crossing(last, current)?, rule)))
            .min_by_key(|(threshold, _)| *threshold)
            .map(|(_, rule)| rule)
    }

    /// A fresh boss arena if progress crossed a threshold, otherwise `None`.
    pub fn next_or_none(&self, last: u32, current: u32, room_width: u32) -> Option<Structure> {
        self.rule_crossed(last, current)
            .map(|rule| Structure::boss_room(&rule.boss, room_width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setting(rules: &[(&str, &str)]) -> BossSetting {
        let mut s = BossSetting::new();
        for (trigger, boss) in rules {
            s.set_setting(trigger, *boss).unwrap();
        }
        s
    }

    #[test]
    fn parse_triggers() {
        assert_eq!("10".parse::<BossTrigger>().unwrap(), BossTrigger::At(10));
        assert_eq!(
            "EVERY_50".parse::<BossTrigger>().unwrap(),
            BossTrigger::Every(50)
        );
        assert!("0".parse::<BossTrigger>().is_err());
        assert!("EVERY_0".parse::<BossTrigger>().is_err());
        assert!("EVERY_".parse::<BossTrigger>().is_err());
        assert!("-5".parse::<BossTrigger>().is_err());
        assert!("soon".parse::<BossTrigger>().is_err());
    }

    #[test]
    fn trigger_display() {
        assert_eq!(BossTrigger::At(7).to_string(), "7");
        assert_eq!(BossTrigger::Every(30).to_string(), "EVERY_30");
    }

    #[test]
    fn at_fires_on_crossing_only() {
        let s = setting(&[("10", "Smasher")]);
        assert!(s.next_or_none(0, 9, 12).is_none());
        assert!(s.next_or_none(5, 10, 12).is_some());
        assert!(s.next_or_none(9, 15, 12).is_some());
        assert!(s.next_or_none(10, 20, 12).is_none());
    }

    #[test]
    fn empty_interval_never_fires() {
        let s = setting(&[("1", "Smasher"), ("EVERY_5", "Killer")]);
        assert!(s.next_or_none(0, 0, 12).is_none());
        assert!(s.next_or_none(1, 1, 12).is_none());
        assert!(s.next_or_none(7, 7, 12).is_none());
    }

    #[test]
    fn every_fires_repeatedly() {
        let s = setting(&[("EVERY_20", "Killer")]);
        assert!(s.next_or_none(0, 19, 12).is_none());
        assert!(s.next_or_none(19, 20, 12).is_some());
        assert!(s.next_or_none(20, 39, 12).is_none());
        assert!(s.next_or_none(39, 41, 12).is_some());
    }

    #[test]
    fn lowest_threshold_wins() {
        let s = setting(&[("30", "Late"), ("15", "Early"), ("EVERY_25", "Periodic")]);
        let rule = s.rule_crossed(10, 40).unwrap();
        assert_eq!(rule.boss, "Early");
        let rule = s.rule_crossed(20, 40).unwrap();
        assert_eq!(rule.boss, "Periodic");
    }

    #[test]
    fn equal_thresholds_prefer_first_rule() {
        let s = setting(&[("EVERY_10", "First"), ("20", "Second")]);
        assert_eq!(s.rule_crossed(15, 25).unwrap().boss, "First");
    }

    #[test]
    fn same_trigger_replaces_rule() {
        let s = setting(&[("10", "Old"), ("10", "New")]);
        assert_eq!(s.rules().len(), 1);
        assert_eq!(s.rules()[0].boss, "New");
    }

    #[test]
    fn boss_structures_are_fresh() {
        let s = setting(&[("EVERY_5", "Smasher")]);
        let mut first = s.next_or_none(0, 5, 6).unwrap();
        first.set_gap(2);
        let second = s.next_or_none(5, 10, 6).unwrap();
        assert_eq!(second.gap_width(), 0);
        assert_eq!(second.width(), 6);
        assert_eq!(second.cell(0, 3), Some("Smasher"));
    }
}
