use color_eyre::eyre::{
    Result,
    eyre,
};
use serde_json::Value;
use wager_client::view::{
    ActionLock,
    Leaderboard,
    LeaderboardRow,
    LobbyView,
    Pager,
    ProfileView,
    StatusFilter,
};
use wager_client::{
    AppConfig,
    ContractReader,
    JsonRpcReader,
    LocalSigner,
    RelayAction,
    RelayClient,
    RelayHttp,
    Wager,
    is_hex_address,
};

#[derive(Debug, Clone)]
pub enum Command {
    Lobby {
        filter: StatusFilter,
    },
    Wager {
        id: String,
    },
    Profile {
        address: String,
    },
    Leaderboard,
    Stats,
    Create {
        prediction: String,
        stake: u64,
        deadline: String,
        category: String,
        criteria: String,
    },
    Accept {
        id: String,
        stake: u64,
    },
    Verify {
        id: String,
        evidence: String,
    },
    Appeal {
        id: String,
        reason: String,
        evidence: String,
    },
    Resolve {
        id: String,
    },
    WalletNew {
        name: String,
    },
    WalletList,
}

impl Command {
    /// Writes go through the relay and need an unlocked wallet; reads don't.
    pub fn requires_wallet(&self) -> bool {
        matches!(
            self,
            Command::Create { .. }
                | Command::Accept { .. }
                | Command::Verify { .. }
                | Command::Appeal { .. }
                | Command::Resolve { .. }
        )
    }
}

pub struct AppController {
    relay: RelayClient<RelayHttp>,
    reader: ContractReader<JsonRpcReader>,
    lock: ActionLock,
    page: Pager,
}

impl AppController {
    pub fn new(config: &AppConfig, page: Pager) -> Result<Self> {
        let relay = RelayClient::new(RelayHttp::new(config.relay_url.as_str())?);
        let reader = ContractReader::new(JsonRpcReader::new(config)?, config);
        Ok(Self {
            relay,
            reader,
            lock: ActionLock::default(),
            page,
        })
    }

    pub async fn run(mut self, command: Command, signer: Option<LocalSigner>) -> Result<()> {
        match command {
            Command::Lobby { filter } => self.show_lobby(filter).await,
            Command::Wager { id } => self.show_wager(&id).await,
            Command::Profile { address } => self.show_profile(&address).await,
            Command::Leaderboard => self.show_leaderboard().await,
            Command::Stats => self.show_global_stats().await,
            Command::WalletNew { .. } | Command::WalletList => {
                // wallet management is handled before a controller exists
                Err(eyre!("wallet commands do not reach the controller"))
            }
            write => {
                let signer =
                    signer.ok_or_else(|| eyre!("this command needs an unlocked wallet"))?;
                self.run_write(write, &signer).await
            }
        }
    }

    async fn run_write(&mut self, command: Command, signer: &LocalSigner) -> Result<()> {
        let (label, action) = match command {
            Command::Create {
                prediction,
                stake,
                deadline,
                category,
                criteria,
            } => {
                validate_deadline(&deadline)?;
                if stake == 0 {
                    return Err(eyre!("Stake must be greater than zero"));
                }
                (
                    "Creating wager",
                    RelayAction::Create {
                        prediction,
                        deadline,
                        category,
                        verification_criteria: criteria,
                        stake_amount: stake,
                    },
                )
            }
            Command::Accept { id, stake } => (
                "Accepting wager",
                RelayAction::Accept {
                    wager_id: id,
                    stake_amount: stake,
                },
            ),
            Command::Verify { id, evidence } => (
                "Submitting verification",
                RelayAction::Verify {
                    wager_id: id,
                    evidence_url: evidence,
                },
            ),
            Command::Appeal {
                id,
                reason,
                evidence,
            } => (
                "Submitting appeal",
                RelayAction::Appeal {
                    wager_id: id,
                    appeal_reason: reason,
                    evidence_url: evidence,
                },
            ),
            Command::Resolve { id } => (
                "Resolving wager",
                RelayAction::Resolve { wager_id: id },
            ),
            read => return Err(eyre!("not a write command: {read:?}")),
        };

        let body = self.relay_write(label, &action, signer).await?;
        println!("{label}: relay accepted");
        if !body.is_null() {
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        if matches!(action, RelayAction::Create { .. }) {
            match self.reader.get_last_wager_id().await {
                Ok(id) if !id.is_empty() => println!("New wager id: {id}"),
                Ok(_) => {}
                Err(err) => tracing::warn!(%err, "could not read back the new wager id"),
            }
        }
        Ok(())
    }

    /// All writes run under the session's single-flight lock; a second
    /// action while one is in flight fails instead of queueing.
    async fn relay_write(
        &mut self,
        label: &str,
        action: &RelayAction,
        signer: &LocalSigner,
    ) -> Result<Value> {
        self.lock.acquire(label)?;
        tracing::info!(action = action.name(), "submitting relayed action");
        let result = self.relay.invoke(action, signer).await;
        self.lock.release();
        result.map_err(|err| eyre!("{label} failed: {err}"))
    }

    async fn show_lobby(&mut self, filter: StatusFilter) -> Result<()> {
        let mut lobby = LobbyView::new(self.page.limit);
        lobby.pager = self.page;
        lobby.filter = filter;

        let ids = self
            .reader
            .list_wagers(lobby.pager.offset, lobby.pager.limit)
            .await?;
        lobby.apply_page(ids);

        for id in lobby.wager_ids().to_vec() {
            match self.reader.get_status(&id).await {
                Ok(status) => lobby.record_status(id, status),
                Err(err) => {
                    tracing::warn!(%id, %err, "status fetch failed, wager hidden from filters")
                }
            }
        }

        println!(
            "Lobby (offset {}, limit {}, filter {:?})",
            lobby.pager.offset, lobby.pager.limit, lobby.filter
        );
        for id in lobby.filtered_ids() {
            match lobby.status_of(id) {
                Some(status) => println!(
                    "  #{id}  {}  pot {}  outcome {}",
                    status.status,
                    status.pot,
                    status.outcome_label()
                ),
                None => println!("  #{id}  (status not fetched)"),
            }
        }
        Ok(())
    }

    async fn show_wager(&mut self, id: &str) -> Result<()> {
        let wager = self.reader.get_wager(id).await?;
        print_wager(&wager);
        Ok(())
    }

    async fn show_profile(&mut self, address: &str) -> Result<()> {
        if !is_hex_address(address) {
            return Err(eyre!("Invalid address. Use a 0x… hex address."));
        }

        let mut profile = ProfileView::new(self.page.limit);
        profile.pager = self.page;

        profile.stats = match self.reader.get_player_stats(address).await {
            Ok(stats) => Some(stats),
            Err(err) => {
                tracing::warn!(%address, %err, "player stats unavailable");
                None
            }
        };

        let ids = self
            .reader
            .list_wagers(profile.pager.offset, profile.pager.limit)
            .await?;
        let mut details = Vec::with_capacity(ids.len());
        for id in ids {
            details.push(self.reader.get_wager(&id).await?);
        }
        profile.apply_page(address, details);

        println!("Profile {address}");
        match &profile.stats {
            Some(stats) => println!(
                "  wins {}  losses {}  volume won {}  volume contributed {}",
                stats.wins, stats.losses, stats.volume_won, stats.volume_contributed
            ),
            None => println!("  No stats yet."),
        }
        println!(
            "Wager history (page offset {}):",
            profile.pager.offset
        );
        for wager in profile.wagers() {
            println!(
                "  #{}  {}  stake {}  {}",
                wager.id, wager.status, wager.stake_amount, wager.prediction
            );
        }
        Ok(())
    }

    async fn show_leaderboard(&mut self) -> Result<()> {
        let mut board = Leaderboard::new(self.page.limit);
        board.pager = self.page;

        let players = self
            .reader
            .list_players(board.pager.offset, board.pager.limit)
            .await?;
        let mut rows = Vec::with_capacity(players.len());
        for address in players {
            if !is_hex_address(&address) {
                tracing::warn!(%address, "skipping malformed address from contract");
                continue;
            }
            let fetched = self.reader.get_player_stats(&address).await;
            rows.push(LeaderboardRow::from_fetch(address, fetched));
        }
        board.apply_page(rows);

        println!(
            "Leaderboard (offset {}, limit {})",
            board.pager.offset, board.pager.limit
        );
        for (rank, row) in board.rows().iter().enumerate() {
            let name = if row.stats.username.is_empty() {
                row.address.as_str()
            } else {
                row.stats.username.as_str()
            };
            println!(
                "  {:>2}. {}  wins {}  losses {}  volume won {}",
                rank + 1,
                name,
                row.stats.wins,
                row.stats.losses,
                row.stats.volume_won
            );
        }
        Ok(())
    }

    async fn show_global_stats(&mut self) -> Result<()> {
        let stats = self.reader.get_global_stats().await?;
        println!(
            "Wagers created: {}\nWagers resolved: {}\nTotal volume: {}",
            stats.total_wagers_created, stats.total_wagers_resolved, stats.total_volume
        );
        Ok(())
    }
}

fn print_wager(wager: &Wager) {
    println!("Wager #{}", wager.id);
    println!("  Prediction: {}", wager.prediction);
    println!("  Status: {}", wager.status);
    println!("  Category: {}", wager.category);
    println!("  Deadline: {}", wager.deadline);
    println!("  Stake: {}  Pot: {}", wager.stake_amount, wager.pot);
    println!("  Player A: {} ({:?})", wager.player_a, wager.player_a_stance);
    if wager.has_opponent() {
        println!("  Player B: {} ({:?})", wager.player_b, wager.player_b_stance);
    } else {
        println!("  Player B: (waiting for a counterparty)");
    }
    println!("  Criteria: {}", wager.verification_criteria);
    if let Some(verification) = &wager.verification_result {
        println!(
            "  Verification: {} (confidence {:.2}, validators {}, final {})",
            verification.outcome,
            verification.confidence,
            verification.validators_used,
            verification.is_final
        );
        if !verification.evidence.is_empty() {
            println!("  Evidence: {}", verification.evidence);
        }
    }
    if !wager.resolved_at.is_empty() {
        println!("  Resolved at: {}", wager.resolved_at);
    }
}

fn validate_deadline(deadline: &str) -> Result<()> {
    chrono::NaiveDateTime::parse_from_str(deadline, "%Y-%m-%dT%H:%M:%S")
        .map(|_| ())
        .map_err(|_| eyre!("Deadline must be an ISO datetime like 2026-12-31T23:59:59"))
}
