#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! ML-KEM (FIPS 203) adapters.
//!
//! | Parameter set | Public key | Secret key | Ciphertext | Shared secret |
//! |---------------|-----------:|-----------:|-----------:|--------------:|
//! | ML-KEM-512    | 800        | 1632       | 768        | 32            |
//! | ML-KEM-768    | 1184       | 2400       | 1088       | 32            |
//! | ML-KEM-1024   | 1568       | 3168       | 1568       | 32            |
//!
//! Decapsulation of a tampered ciphertext succeeds with an implicitly
//! rejected (pseudo-random) secret. A tampered secret key may instead fail
//! the FIPS 203 input check on import, which is reported as a
//! [`SchemeError`].

use super::{scheme_failure, to_array};
use crate::error::SchemeError;
use crate::scheme::{DecapsulationInputs, KemScheme, Operation, SchemeSizes, expect_len};
use fips203::traits::{Decaps, Encaps, KeyGen, SerDes};
use fips203::{ml_kem_512, ml_kem_768, ml_kem_1024};
use rand_core::CryptoRngCore;
use tracing::instrument;

macro_rules! ml_kem_adapter {
    ($name:ident, $module:ident, $label:literal) => {
        #[doc = concat!($label, " through the `fips203` crate.")]
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl KemScheme for $name {
            fn name(&self) -> &str {
                $label
            }

            fn sizes(&self) -> SchemeSizes {
                SchemeSizes::kem($module::EK_LEN, $module::DK_LEN, $module::CT_LEN, fips203::SSK_LEN)
            }

            #[instrument(level = "debug", skip_all, fields(scheme = $label))]
            fn keypair(
                &self,
                mut rng: &mut dyn CryptoRngCore,
                public_key: &mut [u8],
                secret_key: &mut [u8],
            ) -> Result<(), SchemeError> {
                expect_len("public key", $module::EK_LEN, public_key)?;
                expect_len("secret key", $module::DK_LEN, secret_key)?;
                let (ek, dk) = <$module::KG as KeyGen>::try_keygen_with_rng(&mut rng)
                    .map_err(scheme_failure(Operation::Keypair))?;
                public_key.copy_from_slice(&ek.into_bytes());
                secret_key.copy_from_slice(&dk.into_bytes());
                Ok(())
            }

            #[instrument(level = "debug", skip_all, fields(scheme = $label))]
            fn encapsulate(
                &self,
                mut rng: &mut dyn CryptoRngCore,
                ciphertext: &mut [u8],
                shared_secret: &mut [u8],
                public_key: &[u8],
            ) -> Result<(), SchemeError> {
                expect_len("ciphertext", $module::CT_LEN, ciphertext)?;
                expect_len("shared secret", fips203::SSK_LEN, shared_secret)?;
                let ek = $module::EncapsKey::try_from_bytes(to_array("public key", public_key)?)
                    .map_err(scheme_failure(Operation::Encapsulate))?;
                let (ssk, ct) =
                    ek.try_encaps_with_rng(&mut rng).map_err(scheme_failure(Operation::Encapsulate))?;
                ciphertext.copy_from_slice(&ct.into_bytes());
                shared_secret.copy_from_slice(&ssk.into_bytes());
                Ok(())
            }

            #[instrument(level = "debug", skip_all, fields(scheme = $label))]
            fn decapsulate(
                &self,
                shared_secret: &mut [u8],
                inputs: DecapsulationInputs<'_>,
            ) -> Result<(), SchemeError> {
                expect_len("shared secret", fips203::SSK_LEN, shared_secret)?;
                let dk = $module::DecapsKey::try_from_bytes(to_array("secret key", inputs.secret_key)?)
                    .map_err(scheme_failure(Operation::Decapsulate))?;
                let ct = $module::CipherText::try_from_bytes(to_array("ciphertext", inputs.ciphertext)?)
                    .map_err(scheme_failure(Operation::Decapsulate))?;
                let ssk = dk.try_decaps(&ct).map_err(scheme_failure(Operation::Decapsulate))?;
                shared_secret.copy_from_slice(&ssk.into_bytes());
                Ok(())
            }
        }
    };
}

ml_kem_adapter!(MlKem512, ml_kem_512, "ML-KEM-512");
ml_kem_adapter!(MlKem768, ml_kem_768, "ML-KEM-768");
ml_kem_adapter!(MlKem1024, ml_kem_1024, "ML-KEM-1024");
