//! Request and response messages exchanged between client and server.
//!
//! Each message has a fixed wire record. Records are encoded by the codec
//! with big-endian fixed-width integers, so their sizes are constants:
//!
//! | record   | fields                                              | bytes |
//! |----------|-----------------------------------------------------|-------|
//! | header   | package_type i32                                    | 4     |
//! | request  | kind i32, account u32, amount i64                   | 16    |
//! | response | status i32, fail_reason i32, balance i64, corrupted bool | 17 |

use crate::codec::{wire_decode, wire_encode, CodecError, Message, Result};
use minicoin_core::AccountId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies which message follows a package header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum PackageType {
    ClientRequest = 0,
    ServerResponse = 1,
}

impl TryFrom<i32> for PackageType {
    type Error = CodecError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Self::ClientRequest),
            1 => Ok(Self::ServerResponse),
            other => Err(CodecError::UnknownPackageType(other)),
        }
    }
}

/// What the client is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum RequestKind {
    CheckBalance = 0,
    Transaction = 1,
    CheckBlockchainIntegrity = 2,
}

impl TryFrom<i32> for RequestKind {
    type Error = CodecError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Self::CheckBalance),
            1 => Ok(Self::Transaction),
            2 => Ok(Self::CheckBlockchainIntegrity),
            other => Err(CodecError::UnknownRequestKind(other)),
        }
    }
}

/// A client request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub kind: RequestKind,
    pub account: AccountId,
    /// Transfer amount. Ignored for everything but `Transaction`.
    pub amount: i64,
}

impl Request {
    pub fn check_balance(account: AccountId) -> Self {
        Self {
            kind: RequestKind::CheckBalance,
            account,
            amount: 0,
        }
    }

    pub fn transaction(account: AccountId, amount: i64) -> Self {
        Self {
            kind: RequestKind::Transaction,
            account,
            amount,
        }
    }

    pub fn check_integrity(account: AccountId) -> Self {
        Self {
            kind: RequestKind::CheckBlockchainIntegrity,
            account,
            amount: 0,
        }
    }
}

/// Overall outcome of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum Status {
    Success = 0,
    Failed = 1,
}

/// Why a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum FailReason {
    None = 0,
    UnknownAccount = 1,
    Overdrawn = 2,
    BlockchainTainted = 3,
}

/// A server response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
    pub fail_reason: FailReason,
    /// Account balance, meaningful on successful balance and transaction requests.
    pub balance: i64,
    /// Integrity flag: set when the chain failed verification.
    pub chain_corrupted: bool,
}

impl Response {
    /// Successful balance or transaction response.
    pub fn success(balance: i64) -> Self {
        Self {
            status: Status::Success,
            fail_reason: FailReason::None,
            balance,
            chain_corrupted: false,
        }
    }

    /// Successful integrity check reporting the chain state.
    pub fn integrity(tainted: bool) -> Self {
        Self {
            chain_corrupted: tainted,
            ..Self::success(0)
        }
    }

    /// Failed response with the given reason.
    pub fn failed(reason: FailReason) -> Self {
        Self {
            status: Status::Failed,
            fail_reason: reason,
            balance: 0,
            chain_corrupted: false,
        }
    }

    /// Rejection of any non-integrity request on a tainted chain.
    pub fn tainted() -> Self {
        Self {
            chain_corrupted: true,
            ..Self::failed(FailReason::BlockchainTainted)
        }
    }

    /// Generic failure for requests the server could not interpret.
    pub fn rejected() -> Self {
        Self::failed(FailReason::None)
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// Map a failed response to an error, returning the balance on success.
    pub fn into_result(self) -> std::result::Result<i64, ResponseError> {
        if self.is_success() {
            return Ok(self.balance);
        }
        if self.chain_corrupted {
            return Err(ResponseError::ChainCorrupted);
        }
        Err(match self.fail_reason {
            FailReason::UnknownAccount => ResponseError::UnknownAccount,
            FailReason::Overdrawn => ResponseError::Overdrawn,
            FailReason::BlockchainTainted => ResponseError::ChainCorrupted,
            FailReason::None => ResponseError::Unspecified,
        })
    }
}

/// A failed response, as presented to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResponseError {
    #[error("blockchain corrupted")]
    ChainCorrupted,
    #[error("server did not recognize the account")]
    UnknownAccount,
    #[error("not enough balance")]
    Overdrawn,
    #[error("server failed without a reason")]
    Unspecified,
}

// =============================================================================
// Wire records
// =============================================================================

#[derive(Serialize, Deserialize)]
struct HeaderRecord {
    package_type: i32,
}

#[derive(Serialize, Deserialize)]
struct RequestRecord {
    kind: i32,
    account: u32,
    amount: i64,
}

#[derive(Serialize, Deserialize)]
struct ResponseRecord {
    status: i32,
    fail_reason: i32,
    balance: i64,
    chain_corrupted: bool,
}

/// Encoded size of a package header.
pub const HEADER_LEN: usize = 4;
/// Encoded size of a request payload.
pub const REQUEST_LEN: usize = 16;
/// Encoded size of a response payload.
pub const RESPONSE_LEN: usize = 17;

/// Encode a package header.
pub fn encode_header(package: PackageType) -> Result<Vec<u8>> {
    wire_encode(&HeaderRecord {
        package_type: package as i32,
    })
}

/// Decode a package header.
pub fn decode_header(bytes: &[u8]) -> Result<PackageType> {
    let record: HeaderRecord = wire_decode(bytes)?;
    PackageType::try_from(record.package_type)
}

impl Message for Request {
    const PACKAGE: PackageType = PackageType::ClientRequest;
    const ENCODED_LEN: usize = REQUEST_LEN;

    fn encode(&self) -> Result<Vec<u8>> {
        wire_encode(&RequestRecord {
            kind: self.kind as i32,
            account: self.account,
            amount: self.amount,
        })
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let record: RequestRecord = wire_decode(bytes)?;
        Ok(Self {
            kind: RequestKind::try_from(record.kind)?,
            account: record.account,
            amount: record.amount,
        })
    }
}

impl Message for Response {
    const PACKAGE: PackageType = PackageType::ServerResponse;
    const ENCODED_LEN: usize = RESPONSE_LEN;

    fn encode(&self) -> Result<Vec<u8>> {
        wire_encode(&ResponseRecord {
            status: self.status as i32,
            fail_reason: self.fail_reason as i32,
            balance: self.balance,
            chain_corrupted: self.chain_corrupted,
        })
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let record: ResponseRecord = wire_decode(bytes)?;
        let status = match record.status {
            0 => Status::Success,
            1 => Status::Failed,
            value => {
                return Err(CodecError::InvalidField {
                    field: "status",
                    value,
                })
            }
        };
        let fail_reason = match record.fail_reason {
            0 => FailReason::None,
            1 => FailReason::UnknownAccount,
            2 => FailReason::Overdrawn,
            3 => FailReason::BlockchainTainted,
            value => {
                return Err(CodecError::InvalidField {
                    field: "fail_reason",
                    value,
                })
            }
        };
        Ok(Self {
            status,
            fail_reason,
            balance: record.balance,
            chain_corrupted: record.chain_corrupted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_kind_values() {
        assert_eq!(RequestKind::CheckBalance as i32, 0);
        assert_eq!(RequestKind::Transaction as i32, 1);
        assert_eq!(RequestKind::CheckBlockchainIntegrity as i32, 2);
        assert_eq!(RequestKind::try_from(2).unwrap(), RequestKind::CheckBlockchainIntegrity);
    }

    #[test]
    fn test_unknown_request_kind() {
        assert!(matches!(
            RequestKind::try_from(7),
            Err(CodecError::UnknownRequestKind(7))
        ));
    }

    #[test]
    fn test_record_sizes() {
        assert_eq!(encode_header(PackageType::ClientRequest).unwrap().len(), HEADER_LEN);
        assert_eq!(Request::transaction(1, -5).encode().unwrap().len(), REQUEST_LEN);
        assert_eq!(Response::tainted().encode().unwrap().len(), RESPONSE_LEN);
    }

    #[test]
    fn test_request_big_endian_layout() {
        let bytes = Request::transaction(0x0102_0304, -2).encode().unwrap();
        assert_eq!(
            bytes,
            vec![
                0, 0, 0, 1, // kind
                1, 2, 3, 4, // account
                0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE, // amount
            ]
        );
    }

    #[test]
    fn test_response_layout() {
        let bytes = Response::tainted().encode().unwrap();
        assert_eq!(&bytes[0..4], &[0, 0, 0, 1]);
        assert_eq!(&bytes[4..8], &[0, 0, 0, 3]);
        assert_eq!(&bytes[8..16], &[0; 8]);
        assert_eq!(bytes[16], 1);
    }

    #[test]
    fn test_request_decode_rejects_unknown_kind() {
        let mut bytes = Request::check_balance(3).encode().unwrap();
        bytes[3] = 9;
        assert!(matches!(
            Request::decode(&bytes),
            Err(CodecError::UnknownRequestKind(9))
        ));
    }

    #[test]
    fn test_response_decode_rejects_bad_status() {
        let mut bytes = Response::success(5).encode().unwrap();
        bytes[3] = 4;
        assert!(matches!(
            Response::decode(&bytes),
            Err(CodecError::InvalidField { field: "status", value: 4 })
        ));
    }

    #[test]
    fn test_header_decode() {
        let bytes = encode_header(PackageType::ServerResponse).unwrap();
        assert_eq!(decode_header(&bytes).unwrap(), PackageType::ServerResponse);
        assert!(matches!(
            decode_header(&[0, 0, 0, 5]),
            Err(CodecError::UnknownPackageType(5))
        ));
    }

    #[test]
    fn test_into_result() {
        assert_eq!(Response::success(40).into_result(), Ok(40));
        assert_eq!(Response::integrity(true).into_result(), Ok(0));
        assert_eq!(Response::tainted().into_result(), Err(ResponseError::ChainCorrupted));
        assert_eq!(
            Response::failed(FailReason::Overdrawn).into_result(),
            Err(ResponseError::Overdrawn)
        );
        assert_eq!(
            Response::failed(FailReason::UnknownAccount).into_result(),
            Err(ResponseError::UnknownAccount)
        );
        assert_eq!(Response::rejected().into_result(), Err(ResponseError::Unspecified));
    }

    #[test]
    fn test_response_json() {
        let json = serde_json::to_value(Response::integrity(true)).unwrap();
        assert_eq!(json["status"], "Success");
        assert_eq!(json["chain_corrupted"], true);
    }
}
