//! `n`-party SM2 signing (spec §2 C11, §4.10), grounded line-for-line on
//! `crtsm2/lnr18`'s eight-phase `Scheme`.
//!
//! Two accumulators drive the whole protocol: the nonce `R = sum(K_i)` (and
//! its x-coordinate `r`, computed up front exactly as in the two-party
//! case) and a running [`elgamal_exp`] ciphertext under the jointly-held
//! key `T = sum(T_i)` ([`crate::sm2::dkg`]) that lets all `n` parties agree
//! on sums of secret scalars — `gamma = sum(gamma_i)`, `sigma = sum(gamma_i
//! * x_i)`, `delta = sum(gamma_i * k_i)` — without any party ever seeing
//! another's share. The cross terms of each sum (`gamma_i * x_j` for `i !=
//! j`) come from `n*(n-1)` pairwise Paillier MtA conversions
//! ([`crate::mta::paillier`]); the two consistency checks (`sigma` really
//! is `gamma * x`; `delta` really is `gamma * k`) are DDH checks via
//! [`rre`]-rerandomization plus [`chaum_pedersen`], matching the two-party
//! flow's "prove, don't trust" discipline without ever decrypting anything
//! early.
//!
//! `delta` itself is the one value this protocol reveals in the clear —
//! each party encrypts its share `delta_i` under `T` *before* the reveal
//! (phase 6) and proves the revealed scalar matches that earlier
//! commitment (phase 7), so no party can bias `delta` by choosing its share
//! adaptively after seeing others'. This is the same safely-revealed-masked-
//! product pattern the two-party protocol's `sign_offline` uses for `r1 +
//! k2` — `gamma` masks the real secret the same way a fresh nonce does.
//!
//! Design note (open question, recorded in `DESIGN.md`): this module models
//! the whole session as a single in-process [`Session`], holding every
//! party's shares and stepping through phases that verify each party's
//! proofs in turn, rather than splitting into one type per party the way
//! [`crate::dkg`] and [`crate::sign_offline`] do. The grounding source
//! itself (`lnr18.go`'s `Scheme` struct) is written the same way — it is a
//! reference/test harness for the math, not a per-party network API — and
//! following that structure is what keeps the `n*(n-1)` pairwise MtA calls
//! tractable here. A per-party split is possible future work but would
//! need its own message-passing design this source doesn't provide.

use generic_ec::{Point, Scalar};
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, instrument, warn};

use crate::curve::{self, CurveOrder};
use crate::ecdsa_verify;
use crate::elgamal_exp::{self, Ciphertext};
use crate::error::ProtocolError;
use crate::group_zk::{chaum_pedersen, reg, rre, rspdl, schnorr};
use crate::integer_zk::CommitmentParams;
use crate::mta::paillier as mta_paillier;
use crate::safe_prime::SafePrimeProvider;
use crate::sm2::dkg::SmKeyShare;
use crate::SecurityParams;

/// The final, jointly-produced SM2 signature.
pub struct Signature<C: CurveOrder> {
    pub r: Scalar<C>,
    pub s: Scalar<C>,
}

fn sum_points<C: CurveOrder>(pts: &[Point<C>]) -> Point<C> {
    let mut acc = pts[0];
    for p in &pts[1..] {
        acc = acc + *p;
    }
    acc
}

fn sum_cts<C: CurveOrder>(cts: &[Ciphertext<C>]) -> Ciphertext<C> {
    let mut acc = cts[0];
    for c in &cts[1..] {
        acc = acc + *c;
    }
    acc
}

fn sum_scalars<C: CurveOrder>(xs: &[Scalar<C>]) -> Scalar<C> {
    xs.iter().fold(Scalar::<C>::from(0), |acc, x| acc + *x)
}

/// Run one party's Paillier MtA as sender (always the `gammas` vector in
/// this protocol) against another as receiver, for every ordered pair `(i,
/// j)`, `i != j`. Returns `alphas[sender][receiver]` and
/// `betas[receiver][sender]`; `sigma_i`/`delta_i` is `own*own + sum_j
/// alphas[i][j] + sum_j betas[i][j]`.
///
/// Each receiver invocation generates a fresh Paillier setup (spec §9 open
/// question, recorded in `DESIGN.md`): reusing one persistent keypair per
/// party across all `n-1` receiver roles would need `SetupParams` to be
/// cloned, and its `DecryptionKey` is deliberately not `Clone`. Every
/// party's *sender*-side aux ring (`own_aux`), by contrast, is generated
/// once and reused — `CommitmentParams` alone is cheap to clone.
fn run_pairwise_mta<C: CurveOrder, R: RngCore + CryptoRng>(
    sid: &[u8],
    provider: &impl SafePrimeProvider,
    own_aux: &[CommitmentParams],
    params: &SecurityParams,
    sender_inputs: &[Scalar<C>],
    receiver_inputs: &[Scalar<C>],
    rng: &mut R,
) -> Result<(Vec<Vec<Scalar<C>>>, Vec<Vec<Scalar<C>>>), ProtocolError> {
    let n = sender_inputs.len();
    let mut alphas = vec![vec![Scalar::<C>::from(0); n]; n];
    let mut betas = vec![vec![Scalar::<C>::from(0); n]; n];

    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let pair_sid = [sid, b"-", &(i as u32).to_be_bytes(), &(j as u32).to_be_bytes()].concat();

            let (receiver_setup, receiver_msg) = mta_paillier::generate_setup(&pair_sid, provider, params, rng);
            let receiver_aux_for_sender = mta_paillier::verify_setup(&pair_sid, &receiver_msg, params)?;
            let receiver_pk = receiver_setup.pk.clone();

            let mut receiver = mta_paillier::Receiver::<C>::new(receiver_setup, own_aux[i].clone(), receiver_inputs[j], *params);
            let mut sender = mta_paillier::Sender::<C>::new(own_aux[i].clone(), receiver_pk, receiver_aux_for_sender, *params);

            let round1 = receiver.init(&pair_sid, rng)?;
            let (alpha, round2) = sender.update(&pair_sid, sender_inputs[i], round1, rng)?;
            let beta = receiver.multiply(&pair_sid, round2)?;

            alphas[i][j] = alpha;
            betas[j][i] = beta;
        }
    }
    Ok((alphas, betas))
}

fn gamma_x_statement<C: CurveOrder>(t: Point<C>, u_gamma: Point<C>, v_gamma: Point<C>, q_i: Point<C>, a_prime: Point<C>, b_prime: Point<C>) -> rspdl::Statement<C> {
    let _ = t;
    rspdl::Statement { g: Point::generator(), a: u_gamma, b: v_gamma, x: q_i, a_prime, b_prime }
}

/// An `n`-party signing session: every participant's DKG output plus the
/// long-lived Paillier aux ring each uses whenever it acts as MtA sender.
pub struct Session<C: CurveOrder> {
    sid: Vec<u8>,
    shares: Vec<SmKeyShare<C>>,
    own_aux: Vec<CommitmentParams>,
    params: SecurityParams,
}

impl<C: CurveOrder> Session<C> {
    pub fn new<R: RngCore + CryptoRng>(
        sid: &[u8],
        shares: Vec<SmKeyShare<C>>,
        provider: &impl SafePrimeProvider,
        params: SecurityParams,
        rng: &mut R,
    ) -> Self {
        let own_aux = (0..shares.len())
            .map(|i| {
                let party_sid = [sid, b"-aux-", &(i as u32).to_be_bytes()].concat();
                let (setup, _msg) = mta_paillier::generate_setup(&party_sid, provider, &params, rng);
                setup.commitment
            })
            .collect();
        Session { sid: sid.to_vec(), shares, own_aux, params }
    }

    pub fn n(&self) -> usize {
        self.shares.len()
    }

    fn q(&self) -> Point<C> {
        self.shares[0].q
    }

    fn t(&self) -> Point<C> {
        self.shares[0].t
    }

    /// Run the full eight-phase protocol for `message`, verifying every
    /// party's proofs at each step, and return the jointly valid signature.
    #[instrument(skip_all)]
    pub fn sign<R: RngCore + CryptoRng>(&self, message: &[u8], provider: &impl SafePrimeProvider, rng: &mut R) -> Result<Signature<C>, ProtocolError> {
        let n = self.n();
        let t_pk = elgamal_exp::PublicKey { g: Point::generator(), ek: self.t() };

        // Phase 1: nonce generation (ds.NonceComProve / NonceDeComVerify,
        // reusing the same Schnorr commit/decommit primitive as the DKG).
        let mut ks = Vec::with_capacity(n);
        let mut k_points = Vec::with_capacity(n);
        let mut commits = Vec::with_capacity(n);
        let mut hashes = Vec::with_capacity(n);
        for _ in 0..n {
            let k = Scalar::<C>::random(rng);
            let k_point = Point::generator() * k;
            let stmt = schnorr::Statement { base: Point::generator(), x: k_point };
            let witness = generic_ec::SecretScalar::<C>::new(&mut { k });
            let (full, hash) = schnorr::prove_commit(&self.sid, &witness, &stmt, rng);
            ks.push(k);
            k_points.push(k_point);
            commits.push(hash);
            hashes.push(full);
        }
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let stmt = schnorr::Statement { base: Point::generator(), x: k_points[j] };
                schnorr::decommit_verify(&self.sid, &stmt, &commits[j], &hashes[j])?;
            }
        }
        let r_point = sum_points(&k_points);
        let r = curve::x_coordinate(&r_point);
        if r.is_zero() {
            return Err(ProtocolError::StateMisuse("nonce x-coordinate is zero"));
        }
        debug!("sm2 signing: phase 1 nonce aggregation complete");

        // Phase 2a: encrypt each party's gamma_i under T, proving REG.
        let mut gammas = Vec::with_capacity(n);
        let mut gamma_cts = Vec::with_capacity(n);
        for _ in 0..n {
            let gamma = Scalar::<C>::random(rng);
            let (ct, r_enc) = elgamal_exp::encrypt_fresh(&t_pk, gamma, rng);
            let stmt = reg::Statement { g: Point::generator(), ek: self.t(), a: ct.u, b: ct.v };
            let witness = reg::Witness { m: gamma, r: r_enc };
            let (commitment, proof) = reg::compute_proof(&self.sid, &witness, &stmt, rng);
            reg::verify_proof(&self.sid, &stmt, &commitment, &proof).map_err(ProtocolError::ProofFailure)?;
            gammas.push(gamma);
            gamma_cts.push(ct);
        }
        let gamma_ct = sum_cts(&gamma_cts);

        // Phase 2b: bind x_i to the aggregate gamma ciphertext via RSPDL.
        let mut xgamma_cts = Vec::with_capacity(n);
        for i in 0..n {
            let blind = Scalar::<C>::random(rng);
            let a_prime = gamma_ct.u * self.shares[i].x_i.as_ref() + Point::generator() * blind;
            let b_prime = gamma_ct.v * self.shares[i].x_i.as_ref() + Point::generator() * blind;
            let stmt = gamma_x_statement(self.t(), gamma_ct.u, gamma_ct.v, self.shares[i].q_i, a_prime, b_prime);
            let witness = rspdl::Witness { x: *self.shares[i].x_i.as_ref(), r: blind };
            let (commitment, proof) = rspdl::compute_proof(&self.sid, &witness, &stmt, rng);
            rspdl::verify_proof(&self.sid, &stmt, &commitment, &proof).map_err(ProtocolError::ProofFailure)?;
            xgamma_cts.push(Ciphertext { u: a_prime, v: b_prime });
        }
        let xgamma_ct = sum_cts(&xgamma_cts);
        debug!("sm2 signing: phase 2 gamma encryption and x-binding complete");

        // Phase 3: n*(n-1) MtA to compute sigma_i = gamma_i*x_i + cross terms.
        let xs: Vec<Scalar<C>> = self.shares.iter().map(|s| *s.x_i.as_ref()).collect();
        let (alphas, betas) = run_pairwise_mta(&[self.sid.as_slice(), b"-sigma"].concat(), provider, &self.own_aux, &self.params, &gammas, &xs, rng)?;
        let mut sigmas = Vec::with_capacity(n);
        for i in 0..n {
            let mut sigma = gammas[i] * xs[i];
            for j in 0..n {
                if j == i {
                    continue;
                }
                sigma = sigma + alphas[i][j] + betas[i][j];
            }
            sigmas.push(sigma);
        }

        // Encrypt each sigma_i under T (plain REG) and aggregate.
        let mut sigma_cts = Vec::with_capacity(n);
        for &sigma in &sigmas {
            let (ct, r_enc) = elgamal_exp::encrypt_fresh(&t_pk, sigma, rng);
            let stmt = reg::Statement { g: Point::generator(), ek: self.t(), a: ct.u, b: ct.v };
            let witness = reg::Witness { m: sigma, r: r_enc };
            let (commitment, proof) = reg::compute_proof(&self.sid, &witness, &stmt, rng);
            reg::verify_proof(&self.sid, &stmt, &commitment, &proof).map_err(ProtocolError::ProofFailure)?;
            sigma_cts.push(ct);
        }
        let sigma_ct = sum_cts(&sigma_cts);
        debug!("sm2 signing: phase 3 pairwise MtA for sigma complete");

        // Phase 4: U = UXGamma - USigma should encrypt zero iff sigma == gamma*x.
        let diff_gx = xgamma_ct - sigma_ct;
        self.ddh_check_zero(&diff_gx, rng)?;
        debug!("sm2 signing: phase 4 sigma consistency check passed");

        // Phase 5: re-randomize + scale the gamma ciphertext by each k_i
        // (same RSPDL construction as phase 2b, bound to K_i instead of Q_i).
        let mut kgamma_cts = Vec::with_capacity(n);
        for i in 0..n {
            let blind = Scalar::<C>::random(rng);
            let a_prime = gamma_ct.u * ks[i] + Point::generator() * blind;
            let b_prime = gamma_ct.v * ks[i] + Point::generator() * blind;
            let stmt = rspdl::Statement { g: Point::generator(), a: gamma_ct.u, b: gamma_ct.v, x: k_points[i], a_prime, b_prime };
            let witness = rspdl::Witness { x: ks[i], r: blind };
            let (commitment, proof) = rspdl::compute_proof(&self.sid, &witness, &stmt, rng);
            rspdl::verify_proof(&self.sid, &stmt, &commitment, &proof).map_err(ProtocolError::ProofFailure)?;
            kgamma_cts.push(Ciphertext { u: a_prime, v: b_prime });
        }
        let kgamma_ct = sum_cts(&kgamma_cts);
        debug!("sm2 signing: phase 5 gamma*k re-randomization complete");

        // Phase 6: n*(n-1) MtA to compute delta_i = gamma_i*k_i + cross terms.
        let (mus, nus) = run_pairwise_mta(&[self.sid.as_slice(), b"-delta"].concat(), provider, &self.own_aux, &self.params, &gammas, &ks, rng)?;
        let mut deltas = Vec::with_capacity(n);
        for i in 0..n {
            let mut delta_i = gammas[i] * ks[i];
            for j in 0..n {
                if j == i {
                    continue;
                }
                delta_i = delta_i + mus[i][j] + nus[i][j];
            }
            deltas.push(delta_i);
        }

        // Encrypt each delta_i under T and keep the randomness: phase 7
        // needs it to prove the later clear-text reveal matches this
        // commitment.
        let mut delta_cts = Vec::with_capacity(n);
        let mut delta_r = Vec::with_capacity(n);
        for &delta_i in &deltas {
            let (ct, r_enc) = elgamal_exp::encrypt_fresh(&t_pk, delta_i, rng);
            let stmt = reg::Statement { g: Point::generator(), ek: self.t(), a: ct.u, b: ct.v };
            let witness = reg::Witness { m: delta_i, r: r_enc };
            let (commitment, proof) = reg::compute_proof(&self.sid, &witness, &stmt, rng);
            reg::verify_proof(&self.sid, &stmt, &commitment, &proof).map_err(ProtocolError::ProofFailure)?;
            delta_cts.push(ct);
            delta_r.push(r_enc);
        }
        let delta_ct = sum_cts(&delta_cts);
        debug!("sm2 signing: phase 6 pairwise MtA for delta complete");

        // Phase 7a: A = AKGamma - ADelta should encrypt zero iff delta == gamma*k.
        let diff_gk = kgamma_ct - delta_ct;
        self.ddh_check_zero(&diff_gk, rng)?;

        // Phase 7b: reveal each delta_i in the clear, binding the reveal to
        // its phase-6 commitment with a Chaum-Pedersen proof that the same
        // r_i is the discrete log of both A_i (base G) and B_i - G^delta_i
        // (base T). No party could have biased delta_i after seeing
        // others' reveals: it was already fixed inside delta_cts[i] before
        // this phase began.
        for i in 0..n {
            let b_delta_prime = delta_cts[i].v - Point::generator() * deltas[i];
            let stmt = chaum_pedersen::Statement { g1: Point::generator(), g2: self.t(), x1: delta_cts[i].u, x2: b_delta_prime };
            let witness = generic_ec::SecretScalar::<C>::new(&mut { delta_r[i] });
            let (commitment, proof) = chaum_pedersen::compute_proof(&self.sid, &witness, &stmt, rng);
            chaum_pedersen::verify_proof(&self.sid, &stmt, &commitment, &proof).map_err(ProtocolError::ProofFailure)?;
            if Point::generator() * deltas[i] != delta_cts[i].v - b_delta_prime {
                return Err(ProtocolError::StateMisuse("revealed delta_i does not match its commitment"));
            }
        }
        let delta = sum_scalars(&deltas);
        let delta_inv = delta.invert().ok_or(ProtocolError::StateMisuse("delta is zero"))?;
        debug!("sm2 signing: phase 7 delta reveal and consistency check passed");

        // Phase 8: each party computes its share of s, sum, and verify.
        let h: Scalar<C> = curve::hash_to_scalar(message);
        let mut s = Scalar::<C>::from(0);
        for i in 0..n {
            let s_i = delta_inv * (h * gammas[i] + r * sigmas[i]);
            s = s + s_i;
        }

        ecdsa_verify::verify(self.q(), h, r, s).map_err(|e| {
            warn!("sm2 signing: emitted signature failed final ECDSA verification");
            e
        })?;
        debug!("sm2 signing complete");

        Ok(Signature { r, s })
    }

    /// Collective DDH check that `ct` encrypts the group identity (spec
    /// §4.10 phase 4 / phase 7a): every party rerandomizes `ct` (proving it
    /// via `rre`), the rerandomized ciphertexts are summed, then each
    /// party partially "decrypts" the sum with its own ElGamal share `d_i`
    /// (proving the partial decryption is honest via a Chaum-Pedersen DDH
    /// proof tying `d_i` to both `T_i` and the partial decryption point)
    /// and the partial decryptions are checked to sum to the ciphertext's
    /// second coordinate. No party's plaintext-related secret is revealed
    /// by this check; it only ever reveals whether the plaintext was zero.
    fn ddh_check_zero<R: RngCore + CryptoRng>(&self, ct: &Ciphertext<C>, rng: &mut R) -> Result<(), ProtocolError> {
        let n = self.n();
        let t_pk = elgamal_exp::PublicKey { g: Point::generator(), ek: self.t() };

        let mut rerands = Vec::with_capacity(n);
        for _ in 0..n {
            let s = Scalar::<C>::random(rng);
            let blind = Scalar::<C>::random(rng);
            let rerand = elgamal_exp::rerandomize(&t_pk, ct, s, blind);
            let stmt = rre::Statement { g: Point::generator(), ek: self.t(), a: ct.u, b: ct.v, a_prime: rerand.u, b_prime: rerand.v };
            let witness = rre::Witness { s, r: blind };
            let (commitment, proof) = rre::compute_proof(&self.sid, &witness, &stmt, rng);
            rre::verify_proof(&self.sid, &stmt, &commitment, &proof).map_err(ProtocolError::ProofFailure)?;
            rerands.push(rerand);
        }
        let combined = sum_cts(&rerands);

        let mut partials = Vec::with_capacity(n);
        for i in 0..n {
            let partial = combined.u * self.shares[i].d_i.as_ref();
            let stmt = chaum_pedersen::Statement { g1: Point::generator(), g2: combined.u, x1: self.shares[i].t_i, x2: partial };
            let (commitment, proof) = chaum_pedersen::compute_proof(&self.sid, &self.shares[i].d_i, &stmt, rng);
            chaum_pedersen::verify_proof(&self.sid, &stmt, &commitment, &proof).map_err(ProtocolError::ProofFailure)?;
            partials.push(partial);
        }
        let sum_partials = sum_points(&partials);
        if sum_partials != combined.v {
            return Err(ProtocolError::StateMisuse("DDH check failed: ciphertext does not encrypt the identity"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safe_prime::RetryingSafePrimeProvider;
    use crate::sm2::dkg;
    use generic_ec_curves::rust_crypto::Secp256k1 as C;
    use rand::SeedableRng;

    fn rng() -> rand_chacha::ChaCha20Rng {
        rand_chacha::ChaCha20Rng::seed_from_u64(300)
    }

    fn dkg_shares(n: usize, rng: &mut impl RngCore) -> Vec<SmKeyShare<C>> {
        let sid = b"sm2-sign-test-dkg";
        let mut parties: Vec<dkg::Party<C>> = (0..n).map(|i| dkg::Party::new(sid, i, n, rng)).collect();
        let round1s: Vec<_> = parties.iter_mut().map(|p| p.round1(rng)).collect();
        let round2s: Vec<_> = parties.iter_mut().map(|p| p.round2().unwrap()).collect();
        parties.into_iter().map(|p| p.finalize(&round1s, &round2s).unwrap()).collect()
    }

    #[test]
    fn three_parties_produce_a_verifiable_signature() {
        let mut rng = rng();
        let n = 3;
        let shares = dkg_shares(n, &mut rng);
        let q = shares[0].q;

        let provider = RetryingSafePrimeProvider;
        let params = SecurityParams::TEST;
        let session = Session::<C>::new(b"sm2-sign-test", shares, &provider, params, &mut rng);

        let sig = session.sign(b"sm2 test message", &provider, &mut rng).unwrap();
        let h: Scalar<C> = curve::hash_to_scalar(b"sm2 test message");
        assert!(ecdsa_verify::verify(q, h, sig.r, sig.s).is_ok());
    }

    /// Seed scenario 6 (spec §8): `n = 5`, message `"test message"` repeated
    /// ten times, final ECDSA verification against the joint key.
    #[test]
    fn five_parties_produce_a_verifiable_signature() {
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(301);
        let n = 5;
        let shares = dkg_shares(n, &mut rng);
        let q = shares[0].q;

        let provider = RetryingSafePrimeProvider;
        let params = SecurityParams::TEST;
        let session = Session::<C>::new(b"sm2-sign-test-5", shares, &provider, params, &mut rng);

        let message = "test message".repeat(10);
        let sig = session.sign(message.as_bytes(), &provider, &mut rng).unwrap();
        let h: Scalar<C> = curve::hash_to_scalar(message.as_bytes());
        assert!(ecdsa_verify::verify(q, h, sig.r, sig.s).is_ok());
    }
}
