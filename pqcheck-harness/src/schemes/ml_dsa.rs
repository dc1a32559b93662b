#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! ML-DSA (FIPS 204) adapters in signed-message form.
//!
//! The signed message is `signature || message`; [`SignatureScheme::open`]
//! splits it, verifies with an empty context string, and copies the message
//! out only when the signature is accepted.

use super::{scheme_failure, to_array};
use crate::error::SchemeError;
use crate::scheme::{Operation, SchemeSizes, SignatureScheme, SigningInputs, expect_len};
use fips204::traits::{KeyGen, SerDes, Signer, Verifier};
use fips204::{ml_dsa_44, ml_dsa_65, ml_dsa_87};
use rand_core::CryptoRngCore;
use tracing::{debug, instrument};

fn signed_message_too_small(needed: usize, actual: usize) -> SchemeError {
    SchemeError::InvalidLength { what: "signed message", expected: needed, actual }
}

macro_rules! ml_dsa_adapter {
    ($name:ident, $module:ident, $label:literal) => {
        #[doc = concat!($label, " through the `fips204` crate.")]
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl SignatureScheme for $name {
            fn name(&self) -> &str {
                $label
            }

            fn sizes(&self) -> SchemeSizes {
                SchemeSizes::signature($module::PK_LEN, $module::SK_LEN, $module::SIG_LEN)
            }

            #[instrument(level = "debug", skip_all, fields(scheme = $label))]
            fn keypair(
                &self,
                mut rng: &mut dyn CryptoRngCore,
                public_key: &mut [u8],
                secret_key: &mut [u8],
            ) -> Result<(), SchemeError> {
                expect_len("public key", $module::PK_LEN, public_key)?;
                expect_len("secret key", $module::SK_LEN, secret_key)?;
                let (pk, sk) = <$module::KG as KeyGen>::try_keygen_with_rng(&mut rng)
                    .map_err(scheme_failure(Operation::Keypair))?;
                public_key.copy_from_slice(&pk.into_bytes());
                secret_key.copy_from_slice(&sk.into_bytes());
                Ok(())
            }

            #[instrument(level = "debug", skip_all, fields(scheme = $label, message_len = inputs.message.len()))]
            fn sign(
                &self,
                mut rng: &mut dyn CryptoRngCore,
                signed_message: &mut [u8],
                inputs: SigningInputs<'_>,
            ) -> Result<usize, SchemeError> {
                let total = $module::SIG_LEN + inputs.message.len();
                if signed_message.len() < total {
                    return Err(signed_message_too_small(total, signed_message.len()));
                }
                let sk = $module::PrivateKey::try_from_bytes(to_array("secret key", inputs.secret_key)?)
                    .map_err(scheme_failure(Operation::Sign))?;
                let signature = sk
                    .try_sign_with_rng(&mut rng, inputs.message, &[])
                    .map_err(scheme_failure(Operation::Sign))?;
                let (sig_out, rest) = signed_message.split_at_mut($module::SIG_LEN);
                sig_out.copy_from_slice(&signature);
                rest[..inputs.message.len()].copy_from_slice(inputs.message);
                Ok(total)
            }

            #[instrument(level = "debug", skip_all, fields(scheme = $label, signed_len = signed_message.len()))]
            fn open(
                &self,
                message: &mut [u8],
                signed_message: &[u8],
                public_key: &[u8],
            ) -> Result<usize, SchemeError> {
                if signed_message.len() < $module::SIG_LEN {
                    debug!("Signed message shorter than a signature");
                    return Err(SchemeError::VerificationFailed);
                }
                let (sig_bytes, body) = signed_message.split_at($module::SIG_LEN);
                if message.len() < body.len() {
                    return Err(SchemeError::InvalidLength {
                        what: "message",
                        expected: body.len(),
                        actual: message.len(),
                    });
                }
                let pk = $module::PublicKey::try_from_bytes(to_array("public key", public_key)?)
                    .map_err(scheme_failure(Operation::Open))?;
                let signature: [u8; $module::SIG_LEN] = to_array("signature", sig_bytes)?;
                if !pk.verify(body, &signature, &[]) {
                    return Err(SchemeError::VerificationFailed);
                }
                message[..body.len()].copy_from_slice(body);
                Ok(body.len())
            }
        }
    };
}

ml_dsa_adapter!(MlDsa44, ml_dsa_44, "ML-DSA-44");
ml_dsa_adapter!(MlDsa65, ml_dsa_65, "ML-DSA-65");
ml_dsa_adapter!(MlDsa87, ml_dsa_87, "ML-DSA-87");

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use pqcheck_primitives::SurfRng;

    struct Signed {
        pk: Vec<u8>,
        sm: Vec<u8>,
    }

    fn sign(scheme: &dyn SignatureScheme, message: &[u8]) -> Signed {
        let sizes = scheme.sizes();
        let mut rng = SurfRng::new();
        let mut pk = vec![0u8; sizes.public_key_bytes];
        let mut sk = vec![0u8; sizes.secret_key_bytes];
        scheme.keypair(&mut rng, &mut pk, &mut sk).unwrap();

        let mut sm = vec![0u8; message.len() + sizes.signature_bytes()];
        let inputs = SigningInputs { message, secret_key: &sk, seed: None };
        let len = scheme.sign(&mut rng, &mut sm, inputs).unwrap();
        sm.truncate(len);
        Signed { pk, sm }
    }

    #[test]
    fn test_ml_dsa_sign_open_all_levels() {
        let message = b"signed-message form";
        let schemes: [&dyn SignatureScheme; 3] = [&MlDsa44, &MlDsa65, &MlDsa87];
        for scheme in schemes {
            let signed = sign(scheme, message);
            let mut out = vec![0u8; signed.sm.len()];
            let len = scheme.open(&mut out, &signed.sm, &signed.pk).unwrap();
            assert_eq!(&out[..len], message, "{} message recovery", scheme.name());
        }
    }

    #[test]
    fn test_ml_dsa_empty_message() {
        let signed = sign(&MlDsa44, &[]);
        assert_eq!(signed.sm.len(), ml_dsa_44::SIG_LEN);
        let mut out = vec![0u8; 0];
        assert_eq!(MlDsa44.open(&mut out, &signed.sm, &signed.pk).unwrap(), 0);
    }

    #[test]
    fn test_ml_dsa_rejects_tampered_body() {
        let mut signed = sign(&MlDsa44, b"original");
        let last = signed.sm.len() - 1;
        signed.sm[last] ^= 0x01;
        let mut out = vec![0u8; signed.sm.len()];
        assert_eq!(
            MlDsa44.open(&mut out, &signed.sm, &signed.pk).unwrap_err(),
            SchemeError::VerificationFailed
        );
        assert!(out.iter().all(|&b| b == 0), "rejected message must not be written");
    }

    #[test]
    fn test_ml_dsa_rejects_truncated_signed_message() {
        let signed = sign(&MlDsa44, b"x");
        let mut out = vec![0u8; 8];
        assert_eq!(
            MlDsa44.open(&mut out, &signed.sm[..10], &signed.pk).unwrap_err(),
            SchemeError::VerificationFailed
        );
    }

    #[test]
    fn test_ml_dsa_sign_needs_room() {
        let sizes = MlDsa44.sizes();
        let mut rng = SurfRng::new();
        let mut pk = vec![0u8; sizes.public_key_bytes];
        let mut sk = vec![0u8; sizes.secret_key_bytes];
        MlDsa44.keypair(&mut rng, &mut pk, &mut sk).unwrap();
        let mut sm = vec![0u8; sizes.signature_bytes()];
        let inputs = SigningInputs { message: b"abc", secret_key: &sk, seed: None };
        let err = MlDsa44.sign(&mut rng, &mut sm, inputs).unwrap_err();
        assert!(matches!(err, SchemeError::InvalidLength { what: "signed message", .. }));
    }
}
