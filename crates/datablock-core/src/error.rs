use thiserror::Error;

/// Application-level failures raised while applying a transaction body.
///
/// Every display string leads with the taxonomy name so the string that
/// ends up in a response log can be matched on by clients.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("IndexOutOfRange: index {index} outside sequence of length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("PayloadAlreadySet: version {version_index} of data {data_index} already holds a payload")]
    PayloadAlreadySet { data_index: i64, version_index: i64 },

    #[error("PayloadNotSet: version {version_index} of data {data_index} has no payload yet")]
    PayloadNotSet { data_index: i64, version_index: i64 },

    #[error("AlreadyAccepted: version {version_index} of data {data_index} was already accepted")]
    AlreadyAccepted { data_index: i64, version_index: i64 },

    #[error("InsufficientFunds: account {account} holds {available}, needs {required}")]
    InsufficientFunds {
        account: String,
        available: i64,
        required: i64,
    },

    #[error("UnknownUser: account {account} is not in the ledger")]
    UnknownUser { account: String },

    #[error("NonPositiveAmount: amount must be positive, got {amount}")]
    NonPositiveAmount { amount: i64 },

    #[error("NonPositiveStakeTarget: stake of validator {validator} would become {target}")]
    NonPositiveStakeTarget { validator: String, target: i64 },
}
