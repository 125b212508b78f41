//! Single-writer actor per vault
//!
//! The vault lives inside one tokio task and every caller goes through a
//! [`VaultHandle`]. Commands run strictly in arrival order, one at a time,
//! so operations on the same vault never interleave. Distinct vaults run
//! on distinct tasks and proceed in parallel.
//!
//! ```text
//! caller ──┐
//! caller ──┼──► mpsc ──► VaultActor (owns Vault) ──► oneshot reply
//! caller ──┘
//! ```

use log::{debug, info};
use strata_core::{Address, VaultError, VaultResult};
use tokio::sync::{mpsc, oneshot};

use crate::snapshot::VaultSnapshot;
use crate::vault::Vault;

/// Queue depth per vault
const COMMAND_CAPACITY: usize = 256;

type Job = Box<dyn FnOnce(&mut Vault) + Send>;

enum Command {
    Run(Job),
    Shutdown(oneshot::Sender<Vault>),
}

/// Owner task of a vault
pub struct VaultActor {
    vault: Vault,
    rx: mpsc::Receiver<Command>,
}

impl VaultActor {
    /// Move the vault into its own task and return a handle to it.
    /// Must be called from within a tokio runtime.
    pub fn spawn(vault: Vault) -> VaultHandle {
        let address = vault.address().clone();
        let (tx, rx) = mpsc::channel(COMMAND_CAPACITY);

        let actor = VaultActor { vault, rx };
        tokio::spawn(actor.run());

        info!("Vault actor started for {}", address);
        VaultHandle { address, tx }
    }

    async fn run(mut self) {
        while let Some(command) = self.rx.recv().await {
            match command {
                Command::Run(job) => job(&mut self.vault),
                Command::Shutdown(reply) => {
                    info!("Vault actor for {} shutting down", self.vault.address());
                    let _ = reply.send(self.vault);
                    return;
                }
            }
        }
        debug!("All handles to {} dropped", self.vault.address());
    }
}

/// Cheap, clonable entry point to a vault actor
#[derive(Debug, Clone)]
pub struct VaultHandle {
    address: Address,
    tx: mpsc::Sender<Command>,
}

impl VaultHandle {
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Whether the actor still accepts commands
    pub fn is_alive(&self) -> bool {
        !self.tx.is_closed()
    }

    async fn submit<T: Send + 'static>(
        &self,
        f: impl FnOnce(&mut Vault) -> T + Send + 'static,
    ) -> VaultResult<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |vault| {
            let _ = reply_tx.send(f(vault));
        });

        self.tx
            .send(Command::Run(job))
            .await
            .map_err(|_| self.gone())?;
        reply_rx.await.map_err(|_| self.gone())
    }

    fn gone(&self) -> VaultError {
        VaultError::Actor(format!("vault {} is no longer running", self.address))
    }

    /// Run a mutating operation on the vault
    pub async fn execute<T: Send + 'static>(
        &self,
        f: impl FnOnce(&mut Vault) -> VaultResult<T> + Send + 'static,
    ) -> VaultResult<T> {
        self.submit(f).await?
    }

    /// Read from the vault
    pub async fn query<T: Send + 'static>(
        &self,
        f: impl FnOnce(&Vault) -> T + Send + 'static,
    ) -> VaultResult<T> {
        self.submit(move |vault: &mut Vault| f(&*vault)).await
    }

    pub async fn snapshot(&self) -> VaultResult<VaultSnapshot> {
        self.submit(|vault: &mut Vault| vault.snapshot()).await?
    }

    /// Stop the actor after the commands already queued and hand the vault
    /// back
    pub async fn shutdown(&self) -> VaultResult<Vault> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::Shutdown(reply_tx))
            .await
            .map_err(|_| self.gone())?;
        reply_rx.await.map_err(|_| self.gone())
    }
}
