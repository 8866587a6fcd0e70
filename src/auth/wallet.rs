// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! Wallet signature verification for the wallet login protocol.
//!
//! The client fetches a nonce, signs a message embedding that nonce with
//! their wallet key (EIP-191 `personal_sign`), and submits address,
//! signature and message. Verification recovers the signer address from
//! the signature and requires it to match the claimed address, and the
//! message to contain the issued nonce verbatim.

use std::str::FromStr;

use alloy::primitives::{Address, Signature};

/// Why a wallet proof was rejected.
///
/// Handlers collapse all variants into one uniform 401; the distinction
/// exists for logging only.
#[derive(Debug, thiserror::Error)]
pub enum WalletProofError {
    #[error("wallet address is not a valid ledger address: {0}")]
    InvalidAddress(String),

    #[error("signature is not parseable: {0}")]
    MalformedSignature(String),

    #[error("signed message does not embed the issued nonce")]
    NonceNotEmbedded,

    #[error("signature does not recover to the claimed address")]
    SignerMismatch,
}

/// Verify that `signature` is a valid signature over `message` by
/// `address`, and that `message` embeds `nonce`.
pub fn verify_wallet_proof(
    address: &str,
    signature: &str,
    message: &str,
    nonce: &str,
) -> Result<(), WalletProofError> {
    if !message.contains(nonce) {
        return Err(WalletProofError::NonceNotEmbedded);
    }

    let claimed = Address::from_str(address)
        .map_err(|e| WalletProofError::InvalidAddress(e.to_string()))?;

    let signature = Signature::from_str(signature)
        .map_err(|e| WalletProofError::MalformedSignature(e.to_string()))?;

    let recovered = signature
        .recover_address_from_msg(message.as_bytes())
        .map_err(|_| WalletProofError::SignerMismatch)?;

    if recovered != claimed {
        return Err(WalletProofError::SignerMismatch);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::signers::{local::PrivateKeySigner, SignerSync};

    fn signed_message(signer: &PrivateKeySigner, message: &str) -> String {
        let sig = signer.sign_message_sync(message.as_bytes()).unwrap();
        alloy::hex::encode_prefixed(sig.as_bytes())
    }

    #[test]
    fn valid_proof_is_accepted() {
        let signer = PrivateKeySigner::random();
        let address = format!("{:?}", signer.address());
        let message = "FarmLink login nonce: abc123xyz";
        let signature = signed_message(&signer, message);

        verify_wallet_proof(&address, &signature, message, "abc123xyz")
            .expect("valid proof should verify");
    }

    #[test]
    fn message_without_nonce_is_rejected() {
        let signer = PrivateKeySigner::random();
        let address = format!("{:?}", signer.address());
        let message = "FarmLink login, no nonce here";
        let signature = signed_message(&signer, message);

        let result = verify_wallet_proof(&address, &signature, message, "abc123xyz");
        assert!(matches!(result, Err(WalletProofError::NonceNotEmbedded)));
    }

    #[test]
    fn signature_by_another_key_is_rejected() {
        let signer = PrivateKeySigner::random();
        let other = PrivateKeySigner::random();
        let address = format!("{:?}", signer.address());
        let message = "FarmLink login nonce: abc123xyz";
        let signature = signed_message(&other, message);

        let result = verify_wallet_proof(&address, &signature, message, "abc123xyz");
        assert!(matches!(result, Err(WalletProofError::SignerMismatch)));
    }

    #[test]
    fn signature_over_different_message_is_rejected() {
        let signer = PrivateKeySigner::random();
        let address = format!("{:?}", signer.address());
        let signature = signed_message(&signer, "something else entirely: abc123xyz");

        let result = verify_wallet_proof(
            &address,
            &signature,
            "FarmLink login nonce: abc123xyz",
            "abc123xyz",
        );
        assert!(matches!(result, Err(WalletProofError::SignerMismatch)));
    }

    #[test]
    fn garbage_inputs_are_rejected() {
        let result = verify_wallet_proof("not-an-address", "0xdead", "msg nonce", "nonce");
        assert!(matches!(result, Err(WalletProofError::InvalidAddress(_))));

        let signer = PrivateKeySigner::random();
        let address = format!("{:?}", signer.address());
        let result = verify_wallet_proof(&address, "0xdead", "msg nonce", "nonce");
        assert!(matches!(result, Err(WalletProofError::MalformedSignature(_))));
    }
}
