//! JSON encoding of [`LoanRecord`] as stored on the ledger
use super::loan::LoanRecord;

pub fn encode(record: &LoanRecord) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(record)
}

pub fn decode(bytes: &[u8]) -> serde_json::Result<LoanRecord> {
    serde_json::from_slice(bytes)
}
