use core::fmt;

/// Independently refreshed parts of the snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldGroup {
    Dashboard,
    Report,
    ReportList,
    History,
    ExchangeRate,
}

impl FieldGroup {
    pub const ALL: [FieldGroup; 5] = [
        FieldGroup::Dashboard,
        FieldGroup::Report,
        FieldGroup::ReportList,
        FieldGroup::History,
        FieldGroup::ExchangeRate,
    ];

    const fn index(self) -> usize {
        match self {
            FieldGroup::Dashboard => 0,
            FieldGroup::Report => 1,
            FieldGroup::ReportList => 2,
            FieldGroup::History => 3,
            FieldGroup::ExchangeRate => 4,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            FieldGroup::Dashboard => "dashboard",
            FieldGroup::Report => "report summary",
            FieldGroup::ReportList => "report transactions",
            FieldGroup::History => "transaction history",
            FieldGroup::ExchangeRate => "exchange rate",
        }
    }
}

impl fmt::Display for FieldGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifies one refresh of one group within one login session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Ticket {
    pub(crate) group: FieldGroup,
    pub(crate) seq: u64,
    pub(crate) epoch: u64,
}

/// Latest issued sequence number per group plus the session epoch.
///
/// A result may only be committed while its ticket is still the latest one
/// issued for its group and the session it was issued in is still current.
#[derive(Debug, Default)]
pub(crate) struct Sequences {
    latest: [u64; FieldGroup::ALL.len()],
    epoch: u64,
}

impl Sequences {
    pub(crate) fn issue(&mut self, group: FieldGroup) -> Ticket {
        let slot = &mut self.latest[group.index()];
        *slot += 1;
        Ticket {
            group,
            seq: *slot,
            epoch: self.epoch,
        }
    }

    pub(crate) fn latest(&self, group: FieldGroup) -> u64 {
        self.latest[group.index()]
    }

    pub(crate) fn is_current(&self, ticket: Ticket) -> bool {
        ticket.epoch == self.epoch && ticket.seq == self.latest(ticket.group)
    }

    /// Invalidates every ticket issued so far.
    pub(crate) fn next_epoch(&mut self) {
        self.epoch += 1;
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }
}
