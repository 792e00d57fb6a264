//! Paillier-based MtA (spec §4.5, component C6).
//!
//! Two parties run a one-time [setup](generate_setup)/[verify](verify_setup)
//! exchange of integer-commitment parameters (each proving its own modulus
//! sound via `R_P`/`QR`/`QRdl`), then repeatedly invoke the
//! [`Receiver`]/[`Sender`] pair — one per MtA call — to turn multiplicative
//! shares into additive ones.

use generic_ec::{Curve, Scalar};
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, instrument, warn};

use crate::common::{combine, convert_scalar, gen_inversible, BigNumber};
use crate::curve::{self, CurveOrder};
use crate::error::ProtocolError;
use crate::integer_zk::r_affran;
use crate::integer_zk::r_pwr;
use crate::integer_zk::{qr, qrdl, r_p};
use crate::integer_zk::CommitmentParams;
use crate::mta::{MtaReceiver, MtaSender};
use crate::paillier::{self, DecryptionKey, EncryptionKey, Nonce};
use crate::safe_prime::SafePrimeProvider;
use crate::SecurityParams;

/// One party's private output of [`generate_setup`]: its Paillier key pair
/// plus the secret witness behind its public `(N, g, h)`.
pub struct SetupParams {
    pub sk: DecryptionKey,
    pub pk: EncryptionKey,
    pub commitment: CommitmentParams,
}

/// The public message a party sends to its peer during MtA setup: its
/// `(N, g, h)` together with the three soundness proofs (spec §4.5
/// "Setup").
pub struct SetupMessage {
    pub commitment: CommitmentParams,
    pub r_p: r_p::Proof,
    pub qr: qr::Proof,
    pub qrdl: qrdl::Proof,
}

fn scalar_to_bignumber<C: Curve>(s: &Scalar<C>) -> BigNumber {
    BigNumber::from_slice(s.to_be_bytes().as_bytes().to_vec())
}

/// Generate a fresh Paillier key and integer-commitment parameters, and the
/// proofs attesting they were built honestly (spec §4.5 "Setup").
pub fn generate_setup<R: RngCore + CryptoRng>(
    sid: &[u8],
    provider: &impl SafePrimeProvider,
    params: &SecurityParams,
    rng: &mut R,
) -> (SetupParams, SetupMessage) {
    let prime_bits = params.n_bits / 2;
    let p = provider.generate_safe_prime(prime_bits, rng);
    let q = provider.generate_safe_prime(prime_bits, rng);
    let sk = paillier::new_secret_key(p.clone(), q.clone()).expect("freshly generated safe primes yield a valid key");
    let pk = EncryptionKey::from(&sk);
    let n = pk.n().clone();

    let h_sqrt = gen_inversible(&n, rng);
    let h = h_sqrt.modmul(&h_sqrt, &n);
    let alpha = BigNumber::from_rng(&n, rng);
    let g = h.modpow(&alpha, &n);
    let commitment = CommitmentParams { n: n.clone(), g: g.clone(), h: h.clone() };

    let r_p_proof = r_p::compute_proof(
        sid,
        &r_p::Witness { p, q },
        &r_p::Statement { n: n.clone() },
        params.m as usize,
        rng,
    )
    .expect("freshly generated safe primes are a valid R_P witness");
    let qr_proof = qr::compute_proof(
        sid,
        &qr::Witness { h_sqrt },
        &qr::Statement { n: n.clone(), h: h.clone() },
        params.t as usize,
        rng,
    );
    let qrdl_proof = qrdl::compute_proof(
        sid,
        &qrdl::Witness { alpha },
        &qrdl::Statement { n, h, g },
        params.t as usize,
        params.s,
        rng,
    );

    (
        SetupParams { sk, pk, commitment: commitment.clone() },
        SetupMessage { commitment, r_p: r_p_proof, qr: qr_proof, qrdl: qrdl_proof },
    )
}

/// Verify a peer's setup message, returning its commitment parameters on
/// success. Any failure is a [`ProtocolError::SetupFailure`] (spec §7):
/// fatal for this MtA pair.
#[instrument(skip_all)]
pub fn verify_setup(sid: &[u8], msg: &SetupMessage, params: &SecurityParams) -> Result<CommitmentParams, ProtocolError> {
    r_p::verify_proof(sid, &r_p::Statement { n: msg.commitment.n.clone() }, &msg.r_p, params.m as usize)
        .map_err(|e| {
            warn!(check = e.check, "mta setup: R_P rejected");
            ProtocolError::SetupFailure(e)
        })?;
    qr::verify_proof(
        sid,
        &qr::Statement { n: msg.commitment.n.clone(), h: msg.commitment.h.clone() },
        &msg.qr,
        params.t as usize,
    )
    .map_err(|e| {
        warn!(check = e.check, "mta setup: QR rejected");
        ProtocolError::SetupFailure(e)
    })?;
    qrdl::verify_proof(
        sid,
        &qrdl::Statement { n: msg.commitment.n.clone(), h: msg.commitment.h.clone(), g: msg.commitment.g.clone() },
        &msg.qrdl,
        params.t as usize,
    )
    .map_err(|e| {
        warn!(check = e.check, "mta setup: QRdl rejected");
        ProtocolError::SetupFailure(e)
    })?;
    debug!("mta setup verified");
    Ok(msg.commitment.clone())
}

/// The receiver's round-1 message: a Paillier encryption of its input `b`
/// and a `R_PwR` proof that it is bounded by the curve order.
pub struct Round1Message {
    pub c_b: BigNumber,
    pub commitment: r_pwr::Commitment,
    pub proof: r_pwr::Proof,
}

/// The sender's round-2 message: the affine-transformed ciphertext `c_A`
/// and a `R_AffRan` proof of its construction.
pub struct Round2Message {
    pub c_a: BigNumber,
    pub commitment: r_affran::Commitment,
    pub proof: r_affran::Proof,
}

/// Receiver role (spec §4.5): holds its own Paillier setup, the sender's
/// verified commitment parameters, and its multiplicand `b`.
pub struct Receiver<C: Curve> {
    own: SetupParams,
    peer_aux: CommitmentParams,
    b: Scalar<C>,
    params: SecurityParams,
    c_b: Option<BigNumber>,
}

impl<C: Curve> Receiver<C> {
    pub fn new(own: SetupParams, peer_aux: CommitmentParams, b: Scalar<C>, params: SecurityParams) -> Self {
        Receiver { own, peer_aux, b, params, c_b: None }
    }
}

impl<C: CurveOrder> MtaReceiver<C> for Receiver<C> {
    type Round1 = Round1Message;
    type Round2 = Round2Message;

    fn init<R: RngCore + CryptoRng>(&mut self, sid: &[u8], rng: &mut R) -> Result<Round1Message, ProtocolError> {
        let q = curve::order::<C>();
        let b_int = scalar_to_bignumber(&self.b);
        let r = gen_inversible(self.own.pk.n(), rng);
        let c_b = paillier::encrypt_with_nonce(&self.own.pk, &b_int, r.clone())?;

        let witness = r_pwr::Witness { x: b_int, r };
        let stmt = r_pwr::Statement { q, key: self.own.pk.clone(), c: c_b.clone() };
        let (commitment, proof) = r_pwr::compute_proof_with_commitment(sid, &self.peer_aux, &witness, &stmt, &self.params, rng);

        self.c_b = Some(c_b.clone());
        Ok(Round1Message { c_b, commitment, proof })
    }

    fn multiply(&mut self, sid: &[u8], round2: Round2Message) -> Result<Scalar<C>, ProtocolError> {
        let c_b = self.c_b.take().ok_or(ProtocolError::StateMisuse("multiply called before init"))?;
        let q = curve::order::<C>();
        let t = self.params.t as usize;
        let l = self.params.l as usize;
        let n1 = self.own.pk.n() + BigNumber::one();
        let shift = q.clone() << (t + l);
        let c = combine(&c_b, &BigNumber::one(), &n1, &shift, self.own.pk.nn());

        let stmt = r_affran::Statement { q: q.clone(), key: self.own.pk.clone(), c, c_a: round2.c_a.clone() };
        r_affran::verify_proof(sid, &self.own.commitment, &stmt, &round2.commitment, &round2.proof, &self.params)?;

        let beta_prime = paillier::decrypt(&self.own.sk, &round2.c_a)?;
        let beta = beta_prime.nmod(&q);
        Ok(convert_scalar::<C>(&beta))
    }
}

/// Sender role (spec §4.5): holds its own commitment parameters (used to
/// verify the receiver's `R_PwR`) and the receiver's Paillier public key
/// and commitment parameters (used to construct and prove `R_AffRan`).
pub struct Sender<C: Curve> {
    own_aux: CommitmentParams,
    peer_pk: EncryptionKey,
    peer_aux: CommitmentParams,
    params: SecurityParams,
    _marker: std::marker::PhantomData<C>,
}

impl<C: Curve> Sender<C> {
    pub fn new(own_aux: CommitmentParams, peer_pk: EncryptionKey, peer_aux: CommitmentParams, params: SecurityParams) -> Self {
        Sender { own_aux, peer_pk, peer_aux, params, _marker: std::marker::PhantomData }
    }
}

impl<C: CurveOrder> MtaSender<C> for Sender<C> {
    type Round1 = Round1Message;
    type Round2 = Round2Message;

    fn update<R: RngCore + CryptoRng>(
        &mut self,
        sid: &[u8],
        a: Scalar<C>,
        round1: Round1Message,
        rng: &mut R,
    ) -> Result<(Scalar<C>, Round2Message), ProtocolError> {
        let q = curve::order::<C>();
        let t = self.params.t as usize;
        let l = self.params.l as usize;
        let s = self.params.s as usize;

        let pwr_stmt = r_pwr::Statement { q: q.clone(), key: self.peer_pk.clone(), c: round1.c_b.clone() };
        r_pwr::verify_proof(sid, &self.own_aux, &pwr_stmt, &round1.commitment, &round1.proof, &self.params)?;

        let k = r_affran::alpha_bound(&q, t, l, s);
        let alpha_prime = BigNumber::from_rng(&k, rng);

        let n1 = self.peer_pk.n() + BigNumber::one();
        let shift = q.clone() << (t + l);
        let c = combine(&round1.c_b, &BigNumber::one(), &n1, &shift, self.peer_pk.nn());

        let a_int = scalar_to_bignumber(&a);
        let c_a = combine(&c, &a_int, &n1, &alpha_prime, self.peer_pk.nn());

        let affran_stmt = r_affran::Statement { q: q.clone(), key: self.peer_pk.clone(), c, c_a: c_a.clone() };
        let witness = r_affran::Witness { a: a_int, alpha: alpha_prime.clone() };
        let (commitment, proof) = r_affran::compute_proof(sid, &self.peer_aux, &witness, &affran_stmt, &self.params, rng);

        let alpha_share: Scalar<C> = convert_scalar::<C>(&(&q - &alpha_prime.nmod(&q)).nmod(&q));
        Ok((alpha_share, Round2Message { c_a, commitment, proof }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safe_prime::RetryingSafePrimeProvider;
    use generic_ec::Scalar;
    use generic_ec_curves::rust_crypto::Secp256k1 as C;

    fn rng() -> rand_chacha::ChaCha20Rng {
        use rand::SeedableRng;
        rand_chacha::ChaCha20Rng::seed_from_u64(40)
    }

    #[test]
    fn produces_additive_shares_of_the_product() {
        let mut rng = rng();
        let params = SecurityParams::TEST;
        let provider = RetryingSafePrimeProvider;

        let (receiver_setup, receiver_msg) = generate_setup(b"setup-r", &provider, &params, &mut rng);
        let (sender_setup, sender_msg) = generate_setup(b"setup-s", &provider, &params, &mut rng);

        let receiver_aux_for_sender = verify_setup(b"setup-r", &receiver_msg, &params).expect("receiver setup sound");
        let sender_aux_for_receiver = verify_setup(b"setup-s", &sender_msg, &params).expect("sender setup sound");

        let a = Scalar::<C>::from(3);
        let b = Scalar::<C>::from(5);

        let mut receiver = Receiver::<C>::new(receiver_setup, sender_aux_for_receiver, b, params);
        let mut sender = Sender::<C>::new(sender_setup.commitment.clone(), receiver.own.pk.clone(), receiver_aux_for_sender, params);

        let round1 = receiver.init(b"mta", &mut rng).expect("round1");
        let (alpha, round2) = sender.update(b"mta", a, round1, &mut rng).expect("round2");
        let beta = receiver.multiply(b"mta", round2).expect("round3");

        assert_eq!(alpha + beta, a * b);
    }
}
