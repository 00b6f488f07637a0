use std::collections::HashMap;

use cornercull_common::TeamId;

/// Receives visible pairs once per tick.
///
/// `report(observer, target)` means the observer may be sent the target's
/// location this tick. The engine calls it at most once per ordered pair per
/// tick.
pub trait LocationSink {
    fn report(&mut self, observer: usize, target: usize);
}

impl<F> LocationSink for F
where
    F: FnMut(usize, usize),
{
    fn report(&mut self, observer: usize, target: usize) {
        self(observer, target)
    }
}

/// Collects every report in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub reports: Vec<(usize, usize)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `observer` was told about `target`.
    pub fn count(&self, observer: usize, target: usize) -> usize {
        self.reports
            .iter()
            .filter(|r| **r == (observer, target))
            .count()
    }

    /// Reports per ordered pair.
    pub fn totals(&self) -> HashMap<(usize, usize), usize> {
        let mut totals = HashMap::new();
        for pair in &self.reports {
            *totals.entry(*pair).or_insert(0) += 1;
        }
        totals
    }

    pub fn clear(&mut self) {
        self.reports.clear();
    }
}

impl LocationSink for RecordingSink {
    fn report(&mut self, observer: usize, target: usize) {
        self.reports.push((observer, target));
    }
}

/// Emits a `trace!` event per report, optionally only for observers on one team.
#[derive(Debug, Clone, Default)]
pub struct TracingSink {
    filter: Option<(TeamId, Vec<TeamId>)>,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only trace observers on `team`; `teams[slot]` gives each slot's team.
    pub fn for_team(team: TeamId, teams: Vec<TeamId>) -> Self {
        Self {
            filter: Some((team, teams)),
        }
    }

    /// Whether reports from `observer` are traced. Unknown slots never are
    /// once a team filter is set.
    pub fn traces(&self, observer: usize) -> bool {
        match &self.filter {
            Some((team, teams)) => teams.get(observer) == Some(team),
            None => true,
        }
    }
}

impl LocationSink for TracingSink {
    fn report(&mut self, observer: usize, target: usize) {
        if !self.traces(observer) {
            return;
        }
        tracing::trace!(observer, target, "enemy visible");
    }
}

/// Forwards only the reports accepted by `predicate`.
pub struct Filtered<S, P> {
    inner: S,
    predicate: P,
}

impl<S, P> Filtered<S, P>
where
    S: LocationSink,
    P: FnMut(usize, usize) -> bool,
{
    pub fn new(inner: S, predicate: P) -> Self {
        Self { inner, predicate }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, P> LocationSink for Filtered<S, P>
where
    S: LocationSink,
    P: FnMut(usize, usize) -> bool,
{
    fn report(&mut self, observer: usize, target: usize) {
        if (self.predicate)(observer, target) {
            self.inner.report(observer, target);
        }
    }
}
