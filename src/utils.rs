//! Identifier helpers for hosts that mint their own loan ids

use anyhow::{bail, ensure};
use bech32::{Bech32m, Hrp};
use uuid7::{Uuid, uuid7};

/// Human readable part every minted loan id starts with.
pub const LOAN_ID_PREFIX: &str = "loan";

/// Mint a time-ordered loan id: a uuid7 encoded as bech32m under
/// [`LOAN_ID_PREFIX`], e.g. `loan1qx...`.
pub fn new_loan_id() -> anyhow::Result<String> {
    let hrp = Hrp::parse(LOAN_ID_PREFIX)?;
    Ok(bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?)
}

/// Check that `loan_id` was minted by [`new_loan_id`] and recover its uuid.
///
/// Ids chosen by the host, like `L1`, are still valid ledger keys; this only
/// tells minted ids apart from those.
pub fn parse_loan_id(loan_id: &str) -> anyhow::Result<Uuid> {
    let (hrp, payload) = bech32::decode(loan_id)?;
    if hrp != Hrp::parse(LOAN_ID_PREFIX)? {
        bail!("loan id {loan_id:?} has prefix {hrp}, expected {LOAN_ID_PREFIX}");
    }
    let bytes: [u8; 16] = match payload.try_into() {
        Ok(bytes) => bytes,
        Err(payload) => bail!("loan id {loan_id:?} carries {} bytes, expected 16", payload.len()),
    };

    let uuid = Uuid::from(bytes);
    ensure!(uuid.version() == Some(7), "loan id {loan_id:?} is not time-ordered");
    Ok(uuid)
}
