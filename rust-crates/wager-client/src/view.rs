//! Client-owned, ephemeral view state over eventually-consistent contract
//! reads: pagination cursors, status filtering, leaderboard ranking,
//! profile ownership, and the single-flight write lock. Nothing in here
//! touches the network; callers fetch, views fold.

use std::collections::HashMap;
use std::str::FromStr;

use crate::contract::{
    PlayerStats,
    Wager,
    WagerStatus,
    WagerStatusKind,
};
use crate::error::{
    Error,
    Result,
};

pub const DEFAULT_PAGE_LIMIT: u64 = 8;

/// Offset/limit cursor. The contract, not this cursor, decides whether the
/// next page is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub offset: u64,
    pub limit: u64,
}

impl Pager {
    pub fn new(limit: u64) -> Self {
        Self { offset: 0, limit }
    }

    pub fn advance(&mut self) {
        self.offset += self.limit;
    }

    pub fn retreat(&mut self) {
        self.offset = self.offset.saturating_sub(self.limit);
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Waiting,
    Active,
    Verified,
    Resolved,
}

impl StatusFilter {
    /// `All` is the identity. Every other filter is a pure predicate over
    /// the last-known status; an unfetched status never matches.
    pub fn matches(&self, status: Option<WagerStatusKind>) -> bool {
        let wanted = match self {
            StatusFilter::All => return true,
            StatusFilter::Waiting => WagerStatusKind::Waiting,
            StatusFilter::Active => WagerStatusKind::Active,
            StatusFilter::Verified => WagerStatusKind::Verified,
            StatusFilter::Resolved => WagerStatusKind::Resolved,
        };
        status == Some(wanted)
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        match input {
            "all" => Ok(StatusFilter::All),
            "waiting" => Ok(StatusFilter::Waiting),
            "active" => Ok(StatusFilter::Active),
            "verified" => Ok(StatusFilter::Verified),
            "resolved" => Ok(StatusFilter::Resolved),
            other => Err(Error::Validation(format!(
                "unknown status filter {other:?}, expected all|waiting|active|verified|resolved"
            ))),
        }
    }
}

/// The lobby: one page of wager ids plus the statuses fetched so far.
#[derive(Debug, Default)]
pub struct LobbyView {
    pub pager: Pager,
    pub filter: StatusFilter,
    wager_ids: Vec<String>,
    statuses: HashMap<String, WagerStatus>,
}

impl LobbyView {
    pub fn new(limit: u64) -> Self {
        Self {
            pager: Pager::new(limit),
            ..Self::default()
        }
    }

    /// A new page replaces the old one; statuses fetched for earlier pages
    /// stay cached by id.
    pub fn apply_page(&mut self, ids: Vec<String>) {
        self.wager_ids = ids;
    }

    pub fn record_status(&mut self, wager_id: impl Into<String>, status: WagerStatus) {
        self.statuses.insert(wager_id.into(), status);
    }

    pub fn status_of(&self, wager_id: &str) -> Option<&WagerStatus> {
        self.statuses.get(wager_id)
    }

    pub fn wager_ids(&self) -> &[String] {
        &self.wager_ids
    }

    pub fn filtered_ids(&self) -> Vec<&str> {
        self.wager_ids
            .iter()
            .filter(|id| {
                self.filter
                    .matches(self.statuses.get(id.as_str()).map(|s| s.status))
            })
            .map(String::as_str)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct LeaderboardRow {
    pub address: String,
    pub stats: PlayerStats,
}

impl LeaderboardRow {
    /// One failed stats fetch never fails the page: the row still renders
    /// with zeroed counters.
    pub fn from_fetch(address: impl Into<String>, fetched: Result<PlayerStats>) -> Self {
        let address = address.into();
        let stats = match fetched {
            Ok(stats) => stats,
            Err(err) => {
                tracing::warn!(%address, %err, "player stats fetch failed, rendering zeroed row");
                PlayerStats::default()
            }
        };
        Self { address, stats }
    }
}

/// One page of the leaderboard, ranked client-side.
#[derive(Debug, Default)]
pub struct Leaderboard {
    pub pager: Pager,
    rows: Vec<LeaderboardRow>,
}

impl Leaderboard {
    pub fn new(limit: u64) -> Self {
        Self {
            pager: Pager::new(limit),
            rows: Vec::new(),
        }
    }

    pub fn apply_page(&mut self, mut rows: Vec<LeaderboardRow>) {
        rank_rows(&mut rows);
        self.rows = rows;
    }

    pub fn rows(&self) -> &[LeaderboardRow] {
        &self.rows
    }
}

/// Sort key is (wins desc, volume_won desc); ties keep fetch order.
pub fn rank_rows(rows: &mut [LeaderboardRow]) {
    rows.sort_by(|a, b| {
        b.stats
            .wins
            .cmp(&a.stats.wins)
            .then(b.stats.volume_won.cmp(&a.stats.volume_won))
    });
}

/// One player's dashboard: their stats and the wagers on the current page
/// that involve them.
#[derive(Debug, Default)]
pub struct ProfileView {
    pub pager: Pager,
    pub stats: Option<PlayerStats>,
    wagers: Vec<Wager>,
}

impl ProfileView {
    pub fn new(limit: u64) -> Self {
        Self {
            pager: Pager::new(limit),
            ..Self::default()
        }
    }

    pub fn apply_page(&mut self, address: &str, details: Vec<Wager>) {
        self.wagers = details.into_iter().filter(|w| w.involves(address)).collect();
    }

    pub fn wagers(&self) -> &[Wager] {
        &self.wagers
    }
}

/// Explicit per-session single-flight lock over state-changing actions.
/// At most one write is in flight at a time; a second acquire fails
/// instead of queueing.
#[derive(Debug, Default)]
pub struct ActionLock {
    busy: Option<String>,
}

impl ActionLock {
    pub fn acquire(&mut self, label: impl Into<String>) -> Result<()> {
        if let Some(current) = &self.busy {
            return Err(Error::Busy(current.clone()));
        }
        self.busy = Some(label.into());
        Ok(())
    }

    pub fn release(&mut self) {
        self.busy = None;
    }

    pub fn busy(&self) -> Option<&str> {
        self.busy.as_deref()
    }
}
