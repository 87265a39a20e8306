//! Decoded contract events as delivered by the upstream source.

use crate::domain::{Address, Amount, EventOrderingKey, TxHash};
use serde::{Deserialize, Serialize};

/// Block and transaction context shared by every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMeta {
    pub block_number: u64,
    /// Block time in seconds since Unix epoch.
    pub block_timestamp: u64,
    pub log_index: u32,
    pub transaction_hash: TxHash,
}

impl EventMeta {
    pub fn ordering_key(&self) -> EventOrderingKey {
        EventOrderingKey::new(self.block_number, self.log_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferParams {
    pub token_address: Address,
    pub from: Address,
    pub to: Address,
    pub value: Amount,
}

/// Event-specific parameters, tagged by `kind`.
///
/// Everything except `Transfer` is administrative and only mirrored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EventPayload {
    Transfer(TransferParams),
    AdminChanged {
        previous_admin: Address,
        new_admin: Address,
    },
    Upgraded {
        implementation: Address,
    },
    BeaconUpgraded {
        beacon: Address,
    },
    Initialized {
        version: u64,
    },
    Approval {
        owner: Address,
        spender: Address,
        value: Amount,
    },
    #[serde(rename = "eip712DomainChanged")]
    Eip712DomainChanged,
    BridgeMint {
        #[serde(rename = "_account")]
        account: Address,
        #[serde(rename = "_amount")]
        amount: Amount,
    },
    BridgeBurn {
        #[serde(rename = "_account")]
        account: Address,
        #[serde(rename = "_amount")]
        amount: Amount,
    },
    BridgeInitialize {
        l1_token: Address,
        name: String,
        symbol: String,
        decimals: u8,
    },
}

impl EventPayload {
    /// Stable name of the event kind, matching the serialized tag.
    pub fn kind(&self) -> &'static str {
        match self {
            EventPayload::Transfer(_) => "transfer",
            EventPayload::AdminChanged { .. } => "adminChanged",
            EventPayload::Upgraded { .. } => "upgraded",
            EventPayload::BeaconUpgraded { .. } => "beaconUpgraded",
            EventPayload::Initialized { .. } => "initialized",
            EventPayload::Approval { .. } => "approval",
            EventPayload::Eip712DomainChanged => "eip712DomainChanged",
            EventPayload::BridgeMint { .. } => "bridgeMint",
            EventPayload::BridgeBurn { .. } => "bridgeBurn",
            EventPayload::BridgeInitialize { .. } => "bridgeInitialize",
        }
    }
}

/// One decoded log record: payload plus block/transaction context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    #[serde(flatten)]
    pub payload: EventPayload,
    #[serde(flatten)]
    pub meta: EventMeta,
}

impl LedgerEvent {
    pub fn ordering_key(&self) -> EventOrderingKey {
        self.meta.ordering_key()
    }

    /// The transfer view of this event, if it is a transfer.
    pub fn as_transfer(&self) -> Option<TransferEvent> {
        match &self.payload {
            EventPayload::Transfer(params) => Some(TransferEvent {
                token_address: params.token_address,
                from: params.from,
                to: params.to,
                value: params.value.clone(),
                block_number: self.meta.block_number,
                block_timestamp: self.meta.block_timestamp,
                log_index: self.meta.log_index,
                transaction_hash: self.meta.transaction_hash,
            }),
            _ => None,
        }
    }
}

/// A token transfer, the only event that moves points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub token_address: Address,
    pub from: Address,
    pub to: Address,
    /// Token amount in its smallest unit.
    pub value: Amount,
    pub block_number: u64,
    pub block_timestamp: u64,
    pub log_index: u32,
    pub transaction_hash: TxHash,
}

impl TransferEvent {
    pub fn ordering_key(&self) -> EventOrderingKey {
        EventOrderingKey::new(self.block_number, self.log_index)
    }

    pub fn is_mint(&self) -> bool {
        self.from.is_zero()
    }

    pub fn is_burn(&self) -> bool {
        self.to.is_zero()
    }
}

impl From<TransferEvent> for LedgerEvent {
    fn from(event: TransferEvent) -> Self {
        LedgerEvent {
            payload: EventPayload::Transfer(TransferParams {
                token_address: event.token_address,
                from: event.from,
                to: event.to,
                value: event.value,
            }),
            meta: EventMeta {
                block_number: event.block_number,
                block_timestamp: event.block_timestamp,
                log_index: event.log_index,
                transaction_hash: event.transaction_hash,
            },
        }
    }
}
