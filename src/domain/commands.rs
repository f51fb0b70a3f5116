//! Ledger commands and the batches the bridge hands to the submitter.
//!
//! A `CommandBatch` is applied atomically by the ledger. Batches built
//! by the translator always begin with the archive of the request
//! contract that triggered them.

use serde_json::Value;

use super::contracts::{Contract, ContractId};

/// Choice consuming a contract without side effects.
pub const ARCHIVE_CHOICE: &str = "Archive";

/// A single ledger command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Exercise a choice on an existing contract.
    Exercise {
        contract_id: ContractId,
        choice: String,
        argument: Value,
    },
    /// Create a new contract.
    Create(Contract),
}

impl Command {
    /// Archive the given contract (exercise `Archive` with an empty argument).
    pub fn archive(contract_id: impl Into<ContractId>) -> Self {
        Self::Exercise {
            contract_id: contract_id.into(),
            choice: ARCHIVE_CHOICE.to_string(),
            argument: Value::Object(serde_json::Map::new()),
        }
    }

    pub const fn create(contract: Contract) -> Self {
        Self::Create(contract)
    }

    /// Whether this command archives `contract_id`.
    pub fn archives(&self, contract_id: &str) -> bool {
        matches!(
            self,
            Self::Exercise { contract_id: cid, choice, .. }
                if cid == contract_id && choice == ARCHIVE_CHOICE
        )
    }
}

/// Ordered commands submitted as one atomic ledger transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandBatch {
    commands: Vec<Command>,
}

impl CommandBatch {
    /// Start a batch that archives the triggering request contract.
    pub fn archiving(request_cid: impl Into<ContractId>) -> Self {
        Self {
            commands: vec![Command::archive(request_cid)],
        }
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Contracts created by this batch, in order.
    pub fn created(&self) -> impl Iterator<Item = &Contract> {
        self.commands.iter().filter_map(|c| match c {
            Command::Create(contract) => Some(contract),
            Command::Exercise { .. } => None,
        })
    }

    /// Whether the batch records a venue-reported error.
    pub fn has_error_response(&self) -> bool {
        self.created().any(Contract::is_error_response)
    }
}

impl From<CommandBatch> for Vec<Command> {
    fn from(batch: CommandBatch) -> Self {
        batch.commands
    }
}

impl Extend<Command> for CommandBatch {
    fn extend<T: IntoIterator<Item = Command>>(&mut self, iter: T) {
        self.commands.extend(iter);
    }
}
