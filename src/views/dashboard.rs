use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::config::{EntryDefaults, TrackerConfig};
use crate::engine::{compute_figures, split_is_balanced};
use crate::error::{Result, TrackerError};
use crate::repository::EntryRepository;
use crate::schema::{DailyEntry, DerivedFigures, EntryInputs};
use crate::session::SessionContext;
use crate::utils::today;
use crate::views::{RequestSequence, RequestTicket, StatusMessage};

pub const LOADED_EXISTING_TEXT: &str = "Existing data loaded for this date.";
pub const SAVED_TEXT: &str = "Sales recorded successfully!";
pub const LOAD_FAILED_TEXT: &str = "Failed to load entry for this date.";
pub const NOT_LOADED_TEXT: &str = "Entry for this date is not loaded yet. Reload before saving.";

/// The result of fetching one date's entry.
#[derive(Debug)]
pub struct EntryLoad {
    pub ticket: RequestTicket,
    pub date: NaiveDate,
    pub result: Result<DailyEntry>,
}

/// Edit form for a single date's entry.
///
/// Derived figures are recomputed from the form on every read. Only an owner
/// may change the form or save it, and only once the selected date has
/// loaded.
#[derive(Debug)]
pub struct DashboardView {
    session: SessionContext,
    defaults: EntryDefaults,
    date: NaiveDate,
    inputs: EntryInputs,
    message: Option<StatusMessage>,
    requests: RequestSequence,
    pending: Option<RequestTicket>,
    load_failed: bool,
}

impl DashboardView {
    pub fn new(session: SessionContext, config: &TrackerConfig, date: NaiveDate) -> Self {
        Self {
            session,
            defaults: config.defaults,
            date,
            inputs: config.defaults.blank_inputs(),
            message: None,
            requests: RequestSequence::new(),
            pending: None,
            load_failed: false,
        }
    }

    /// Opens the form on today's date.
    pub fn for_today(session: SessionContext, config: &TrackerConfig) -> Self {
        Self::new(session, config, today())
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn inputs(&self) -> &EntryInputs {
        &self.inputs
    }

    pub fn derived(&self) -> DerivedFigures {
        compute_figures(&self.inputs)
    }

    /// False when the two shares do not add up to 100, in which case the
    /// split amounts do not cover the whole net profit.
    pub fn shares_balanced(&self) -> bool {
        split_is_balanced(
            self.inputs.owner_share_percent,
            self.inputs.partner_share_percent,
        )
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// True when the last load for the selected date failed; the form may
    /// still hold another date's figures.
    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    /// Whether the current identity may change the form and save it.
    pub fn is_editable(&self) -> bool {
        self.session.can_mutate_entries()
    }

    /// Applies `change` to the form if the current identity may edit.
    pub fn edit<F>(&mut self, change: F) -> Result<()>
    where
        F: FnOnce(&mut EntryInputs),
    {
        if !self.is_editable() {
            return Err(TrackerError::Forbidden);
        }
        change(&mut self.inputs);
        Ok(())
    }

    /// Moves the owner share slider; the partner share takes the remainder.
    pub fn set_owner_share(&mut self, percent: u8) -> Result<()> {
        self.edit(|inputs| inputs.set_owner_share(percent))
    }

    /// Switches to `date` and returns the ticket its fetch must carry.
    pub fn select_date(&mut self, date: NaiveDate) -> RequestTicket {
        self.date = date;
        let ticket = self.requests.issue();
        self.pending = Some(ticket);
        ticket
    }

    pub async fn fetch<R: EntryRepository>(
        repo: &R,
        ticket: RequestTicket,
        date: NaiveDate,
    ) -> EntryLoad {
        EntryLoad {
            ticket,
            date,
            result: repo.get_entry(date).await,
        }
    }

    /// Applies a fetched entry. Returns false when the load was stale and
    /// has been dropped.
    pub fn apply_load(&mut self, load: EntryLoad) -> bool {
        if !self.requests.is_current(load.ticket) {
            warn!("Discarding stale entry load for {}", load.date);
            return false;
        }
        self.pending = None;

        match load.result {
            Ok(entry) => {
                debug!("Loaded existing entry for {}", load.date);
                self.inputs = entry.recomputed().inputs;
                self.load_failed = false;
                self.message = Some(StatusMessage::info(LOADED_EXISTING_TEXT));
            }
            Err(TrackerError::NotFound(_)) => {
                debug!("No entry for {}, starting fresh", load.date);
                self.inputs.clear_figures();
                self.load_failed = false;
                self.message = None;
            }
            Err(e) => {
                warn!("Error fetching entry for {}: {}", load.date, e);
                self.load_failed = true;
                self.message = Some(StatusMessage::error(LOAD_FAILED_TEXT));
            }
        }
        true
    }

    /// Selects, fetches and applies in one step.
    pub async fn load<R: EntryRepository>(&mut self, repo: &R, date: NaiveDate) -> bool {
        let ticket = self.select_date(date);
        let load = Self::fetch(repo, ticket, date).await;
        self.apply_load(load)
    }

    /// Persists the form as the entry for the selected date.
    ///
    /// Refused while the date is loading or after its load failed, so a
    /// stored entry that could not be read is never overwritten. A failed
    /// write keeps the form intact so the owner can retry.
    pub async fn save<R: EntryRepository>(&mut self, repo: &R) -> Result<DailyEntry> {
        if !self.is_editable() {
            let err = TrackerError::Forbidden;
            self.message = Some(StatusMessage::error(err.user_message()));
            return Err(err);
        }

        if self.is_loading() || self.load_failed {
            warn!("Refusing to save {}: entry not loaded", self.date);
            self.message = Some(StatusMessage::error(NOT_LOADED_TEXT));
            return Err(TrackerError::PersistenceFailure(format!(
                "Entry for {} is not loaded",
                self.date
            )));
        }

        self.message = None;
        let entry = DailyEntry::from_inputs(self.date, self.inputs);

        match repo.put_entry(&entry).await {
            Ok(stored) => {
                info!("Saved entry for {}: net profit {}", stored.date, stored.derived.net_profit);
                self.message = Some(StatusMessage::success(SAVED_TEXT));
                Ok(stored)
            }
            Err(e) => {
                warn!("Saving entry for {} failed: {}", self.date, e);
                let err = match e {
                    TrackerError::PersistenceFailure(_) => e,
                    other => TrackerError::PersistenceFailure(other.to_string()),
                };
                self.message = Some(StatusMessage::error(err.user_message()));
                Err(err)
            }
        }
    }

    /// Resets the form to the configured blank state.
    pub fn reset(&mut self) {
        self.inputs = self.defaults.blank_inputs();
        self.message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryEntryRepository;
    use crate::session::{User, UserRole};
    use crate::views::StatusKind;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn view(role: UserRole) -> DashboardView {
        let session = SessionContext::fixed(Some(User::new("u", None, role)));
        DashboardView::new(session, &TrackerConfig::default(), date(1))
    }

    #[test]
    fn test_derived_follows_edits() {
        let mut dash = view(UserRole::Owner);
        dash.edit(|i| {
            i.buns_sold = 100;
            i.other_sales = 200.0;
        })
        .unwrap();
        assert_eq!(dash.derived().revenue, 3200.0);

        dash.set_owner_share(60).unwrap();
        assert_eq!(dash.inputs().partner_share_percent, 40);
        assert!(dash.shares_balanced());

        dash.edit(|i| i.partner_share_percent = 20).unwrap();
        assert!(!dash.shares_balanced());
    }

    #[test]
    fn test_for_today_starts_blank() {
        let session = SessionContext::fixed(None);
        let dash = DashboardView::for_today(session, &TrackerConfig::default());
        assert_eq!(dash.date(), today());
        assert_eq!(dash.inputs(), &EntryInputs::default());
        assert!(!dash.is_editable());
    }

    #[test]
    fn test_partner_cannot_edit() {
        let mut dash = view(UserRole::Partner);
        assert!(!dash.is_editable());
        assert!(matches!(
            dash.edit(|i| i.buns_sold = 5),
            Err(TrackerError::Forbidden)
        ));
        assert_eq!(dash.inputs().buns_sold, 0);
    }

    #[tokio::test]
    async fn test_partner_cannot_save() {
        let repo = InMemoryEntryRepository::new();
        let mut dash = view(UserRole::Partner);
        assert!(matches!(dash.save(&repo).await, Err(TrackerError::Forbidden)));
        assert!(repo.is_empty());
        assert_eq!(dash.message().unwrap().kind, StatusKind::Error);
    }

    #[tokio::test]
    async fn test_missing_entry_keeps_price_and_split() {
        let repo = InMemoryEntryRepository::new();
        let mut dash = view(UserRole::Owner);
        dash.edit(|i| {
            i.buns_sold = 40;
            i.price_per_bun = 35.0;
            i.gas_cost = 50.0;
        })
        .unwrap();
        dash.set_owner_share(70).unwrap();

        assert!(dash.load(&repo, date(2)).await);
        assert_eq!(dash.inputs().buns_sold, 0);
        assert_eq!(dash.inputs().gas_cost, 0.0);
        assert_eq!(dash.inputs().price_per_bun, 35.0);
        assert_eq!(dash.inputs().owner_share_percent, 70);
        assert!(dash.message().is_none());
    }

    #[tokio::test]
    async fn test_stale_load_is_discarded() {
        let repo = InMemoryEntryRepository::new();
        let mut stored = EntryInputs::default();
        stored.buns_sold = 77;
        repo.put_entry(&DailyEntry::from_inputs(date(1), stored))
            .await
            .unwrap();

        let mut dash = view(UserRole::Owner);
        let slow = dash.select_date(date(1));
        let fast = dash.select_date(date(2));

        let fast_load = DashboardView::fetch(&repo, fast, date(2)).await;
        let slow_load = DashboardView::fetch(&repo, slow, date(1)).await;

        assert!(dash.apply_load(fast_load));
        assert!(!dash.is_loading());
        assert!(!dash.apply_load(slow_load));
        assert_eq!(dash.date(), date(2));
        assert_eq!(dash.inputs().buns_sold, 0);
    }

    #[tokio::test]
    async fn test_failed_load_blocks_save() {
        let repo = InMemoryEntryRepository::new();
        for (d, buns) in [(1, 100), (2, 12)] {
            let inputs = EntryInputs {
                buns_sold: buns,
                ..EntryInputs::default()
            };
            repo.put_entry(&DailyEntry::from_inputs(date(d), inputs))
                .await
                .unwrap();
        }

        let mut dash = view(UserRole::Owner);
        assert!(dash.load(&repo, date(1)).await);
        assert_eq!(dash.inputs().buns_sold, 100);

        repo.set_fail_reads(true);
        assert!(dash.load(&repo, date(2)).await);
        assert!(dash.load_failed());
        assert_eq!(
            dash.message(),
            Some(&StatusMessage::error(LOAD_FAILED_TEXT))
        );

        let err = dash.save(&repo).await.unwrap_err();
        assert!(matches!(err, TrackerError::PersistenceFailure(_)));
        assert_eq!(dash.message(), Some(&StatusMessage::error(NOT_LOADED_TEXT)));

        repo.set_fail_reads(false);
        assert_eq!(repo.get_entry(date(2)).await.unwrap().inputs.buns_sold, 12);

        assert!(dash.load(&repo, date(2)).await);
        assert!(!dash.load_failed());
        assert_eq!(dash.inputs().buns_sold, 12);
        assert!(dash.save(&repo).await.is_ok());
    }

    #[tokio::test]
    async fn test_save_waits_for_pending_load() {
        let repo = InMemoryEntryRepository::new();
        let mut dash = view(UserRole::Owner);
        dash.edit(|i| i.buns_sold = 9).unwrap();

        let ticket = dash.select_date(date(3));
        assert!(dash.save(&repo).await.is_err());
        assert!(repo.is_empty());

        let load = DashboardView::fetch(&repo, ticket, date(3)).await;
        assert!(dash.apply_load(load));
        dash.edit(|i| i.buns_sold = 9).unwrap();
        assert_eq!(dash.save(&repo).await.unwrap().inputs.buns_sold, 9);
    }
}
