//! The two-party protocol: one state machine, two roles.
//!
//! Both parties walk the same ordered states; each send/receive pair
//! advances both sides by one step. Any failure drops the session into
//! `Aborted` and the garbler's label table is wiped on the way out.

pub mod evaluator;
pub mod garbler;

pub use evaluator::run_as_evaluator;
pub use garbler::run_as_garbler;

use std::fmt;

use circuit::WireId;
use crypto_core::utils::fits_signed;
use crypto_core::IOChannel;

use crate::errors::ProtocolError;
use crate::msg::{receive_message, send_message, Message};

/// Default fixed-point scale: one decimal digit.
pub const DEFAULT_SCALE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Garbler,
    Evaluator,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Garbler => "garbler",
            Role::Evaluator => "evaluator",
        }
    }
}

/// Session parameters fixed before the handshake and confirmed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionParams {
    /// Circuit width in bits.
    pub n_bits: usize,
    /// Fixed-point scale applied to all inputs.
    pub scale: u32,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            n_bits: circuit::DEFAULT_WIDTH,
            scale: DEFAULT_SCALE,
        }
    }
}

/// The protocol states, identical on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Handshake,
    InputsExchanged,
    Evaluating,
    OutputsExchanged,
    Done,
    Aborted,
}

impl SessionState {
    /// The single forward transition; the session is otherwise only
    /// movable to `Aborted`.
    fn next(self) -> SessionState {
        match self {
            SessionState::Idle => SessionState::Handshake,
            SessionState::Handshake => SessionState::InputsExchanged,
            SessionState::InputsExchanged => SessionState::Evaluating,
            SessionState::Evaluating => SessionState::OutputsExchanged,
            SessionState::OutputsExchanged => SessionState::Done,
            terminal => terminal,
        }
    }
}

/// The two-bit protocol result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// `00`: both parties hold the same global maximum.
    Equal,
    /// `01`: alice's set contains the unique global maximum.
    Alice,
    /// `11`: bob's set contains the unique global maximum.
    Bob,
}

impl Verdict {
    /// Interpret the circuit's `(gt, ne)` output bits.
    pub fn from_bits(gt: bool, ne: bool) -> Result<Verdict, ProtocolError> {
        match (gt, ne) {
            (false, false) => Ok(Verdict::Equal),
            (false, true) => Ok(Verdict::Alice),
            (true, true) => Ok(Verdict::Bob),
            (true, false) => Err(ProtocolError::InvalidVerdict { gt, ne }),
        }
    }

    pub fn bits(&self) -> (bool, bool) {
        match self {
            Verdict::Equal => (false, false),
            Verdict::Alice => (false, true),
            Verdict::Bob => (true, true),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (gt, ne) = self.bits();
        write!(f, "{}{}", gt as u8, ne as u8)
    }
}

/// Compute the verdict in the clear from both maxima. Used by tests and
/// the front-end's verification mode.
pub fn clear_verdict(alice_max: i64, bob_max: i64) -> Verdict {
    if bob_max > alice_max {
        Verdict::Bob
    } else if alice_max > bob_max {
        Verdict::Alice
    } else {
        Verdict::Equal
    }
}

/// The local maximum of a party's input set, checked against the
/// circuit's representable range.
pub fn local_maximum(inputs: &[i64], n_bits: usize) -> Result<i64, ProtocolError> {
    let max = inputs
        .iter()
        .copied()
        .max()
        .ok_or(ProtocolError::EmptyInput)?;
    for &value in inputs {
        if !fits_signed(value, n_bits) {
            return Err(ProtocolError::InputOutOfRange { value, n_bits });
        }
    }
    Ok(max)
}

/// Per-session protocol driver shared by both roles.
pub(crate) struct Session<'a, C: IOChannel> {
    channel: &'a mut C,
    role: Role,
    state: SessionState,
}

impl<'a, C: IOChannel> Session<'a, C> {
    pub(crate) fn new(channel: &'a mut C, role: Role) -> Self {
        Self {
            channel,
            role,
            state: SessionState::Idle,
        }
    }

    pub(crate) fn channel(&mut self) -> &mut C {
        self.channel
    }

    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn advance(&mut self) {
        let next = self.state.next();
        log::debug!("{}: {:?} -> {:?}", self.role.name(), self.state, next);
        self.state = next;
    }

    pub(crate) fn abort(&mut self) {
        log::debug!("{}: {:?} -> Aborted", self.role.name(), self.state);
        self.state = SessionState::Aborted;
    }

    pub(crate) fn send(&mut self, msg: &Message) -> Result<(), ProtocolError> {
        send_message(self.channel, msg).map_err(ProtocolError::from_io)
    }

    pub(crate) fn recv(&mut self) -> Result<Message, ProtocolError> {
        receive_message(self.channel).map_err(ProtocolError::from_io)
    }

    /// Build the error for a message arriving out of order.
    pub(crate) fn unexpected(&self, got: &Message) -> ProtocolError {
        let state = match self.state {
            SessionState::Idle => "Idle",
            SessionState::Handshake => "Handshake",
            SessionState::InputsExchanged => "InputsExchanged",
            SessionState::Evaluating => "Evaluating",
            SessionState::OutputsExchanged => "OutputsExchanged",
            SessionState::Done => "Done",
            SessionState::Aborted => "Aborted",
        };
        ProtocolError::UnexpectedMessage {
            state,
            got: got.name(),
        }
    }
}

/// Check that output bits arrived for exactly the circuit's output
/// wires, in order, and map them to a verdict. The first output wire is
/// `gt`, the second `ne`.
pub(crate) fn verdict_from_output_bits(
    outputs: &[WireId],
    bits: &[(WireId, bool)],
) -> Result<Verdict, ProtocolError> {
    if bits.len() != outputs.len() || outputs.len() != 2 {
        return Err(ProtocolError::Crypto(format!(
            "{} output bits for {} output wires",
            bits.len(),
            outputs.len()
        )));
    }
    for (&(wire, _), &expected) in bits.iter().zip(outputs) {
        if wire != expected {
            return Err(ProtocolError::Crypto(format!(
                "output bit for wire {wire}, expected wire {expected}"
            )));
        }
    }
    Verdict::from_bits(bits[0].1, bits[1].1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use circuit::comparator;
    use crypto_core::local_channel_pair;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;
    use std::thread;

    /// Run a full protocol session over an in-process socket pair and
    /// return both parties' verdicts.
    fn run_pair(
        alice_inputs: Vec<i64>,
        bob_inputs: Vec<i64>,
        n_bits: usize,
        seed: u64,
    ) -> (
        Result<Verdict, ProtocolError>,
        Result<Verdict, ProtocolError>,
    ) {
        let params = SessionParams { n_bits, scale: DEFAULT_SCALE };
        let circ = comparator(n_bits);
        let circ_bob = circ.clone();
        let (mut alice_channel, mut bob_channel) = local_channel_pair();

        let garbler = thread::spawn(move || {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            run_as_garbler(&mut alice_channel, &mut rng, &circ, &alice_inputs, params)
        });
        let mut rng = ChaCha20Rng::seed_from_u64(seed.wrapping_add(1));
        let bob_verdict =
            run_as_evaluator(&mut bob_channel, &mut rng, &circ_bob, &bob_inputs, params);
        let alice_verdict = garbler.join().unwrap();
        (alice_verdict, bob_verdict)
    }

    fn expect(alice: Vec<i64>, bob: Vec<i64>, verdict: Verdict, seed: u64) {
        let (a, b) = run_pair(alice, bob, 32, seed);
        assert_eq!(a.unwrap(), verdict);
        assert_eq!(b.unwrap(), verdict);
    }

    #[test]
    fn scenario_mixed_sets_bob_wins() {
        // -11, -9.7, 5, 10.1, 857.4 vs -10, 5, 10.2, 564, 12558 at
        // scale 10.
        expect(
            vec![-110, -97, 50, 101, 8574],
            vec![-100, 50, 102, 5640, 125580],
            Verdict::Bob,
            1,
        );
    }

    #[test]
    fn scenario_identical_sets() {
        expect(
            vec![1000, 2000, 3000],
            vec![1000, 2000, 3000],
            Verdict::Equal,
            2,
        );
    }

    #[test]
    fn scenario_tenth_apart_alice_wins() {
        // 5.5 vs 5.4 at scale 10.
        expect(vec![55], vec![54], Verdict::Alice, 3);
    }

    #[test]
    fn scenario_all_negative_alice_wins() {
        expect(
            vec![-10000, -5000],
            vec![-20000, -15000],
            Verdict::Alice,
            4,
        );
    }

    #[test]
    fn scenario_both_zero() {
        expect(vec![0], vec![0], Verdict::Equal, 5);
    }

    #[test]
    fn scenario_most_positive_alice_wins() {
        expect(
            vec![i32::MAX as i64],
            vec![i32::MAX as i64 - 1],
            Verdict::Alice,
            6,
        );
    }

    #[test]
    fn boundary_most_negative() {
        expect(
            vec![i32::MIN as i64],
            vec![i32::MIN as i64 + 1],
            Verdict::Bob,
            7,
        );
        expect(
            vec![i32::MIN as i64],
            vec![i32::MIN as i64],
            Verdict::Equal,
            8,
        );
    }

    #[test]
    fn boundary_mixed_sign_off_by_one() {
        expect(vec![-1], vec![0], Verdict::Bob, 9);
        expect(vec![0], vec![-1], Verdict::Alice, 10);
    }

    #[test]
    fn equal_maxima_different_cardinality() {
        expect(vec![10, 20, 30], vec![30], Verdict::Equal, 11);
    }

    #[test]
    fn random_pairs_agree_with_clear_reference() {
        let mut rng = ChaCha20Rng::seed_from_u64(0x7e57);
        for i in 0..100 {
            let a = rng.gen::<i32>() as i64;
            let b = rng.gen::<i32>() as i64;
            let (got_a, got_b) = run_pair(vec![a], vec![b], 32, 100 + i);
            let expected = clear_verdict(a, b);
            assert_eq!(got_a.unwrap(), expected, "a={a} b={b}");
            assert_eq!(got_b.unwrap(), expected, "a={a} b={b}");
        }
    }

    #[test]
    fn out_of_range_input_rejected_before_any_message() {
        let params = SessionParams { n_bits: 16, scale: DEFAULT_SCALE };
        let circ = comparator(16);
        let (mut channel, _other) = local_channel_pair();
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let err =
            run_as_garbler(&mut channel, &mut rng, &circ, &[40_000], params).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::InputOutOfRange { value: 40_000, n_bits: 16 }
        ));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn empty_input_rejected() {
        let params = SessionParams::default();
        let circ = comparator(32);
        let (mut channel, _other) = local_channel_pair();
        let mut rng = ChaCha20Rng::seed_from_u64(43);
        let err = run_as_garbler(&mut channel, &mut rng, &circ, &[], params).unwrap_err();
        assert!(matches!(err, ProtocolError::EmptyInput));
    }

    #[test]
    fn handshake_parameter_mismatch_aborts() {
        let circ = comparator(32);
        let circ_bob = circ.clone();
        let (mut alice_channel, mut bob_channel) = local_channel_pair();
        let garbler = thread::spawn(move || {
            let mut rng = ChaCha20Rng::seed_from_u64(44);
            let params = SessionParams { n_bits: 32, scale: 10 };
            run_as_garbler(&mut alice_channel, &mut rng, &circ, &[1], params)
        });
        let mut rng = ChaCha20Rng::seed_from_u64(45);
        let params = SessionParams { n_bits: 32, scale: 100 };
        let bob = run_as_evaluator(&mut bob_channel, &mut rng, &circ_bob, &[1], params);
        assert!(matches!(
            bob.unwrap_err(),
            ProtocolError::ParameterMismatch { .. }
        ));
        // The evaluator rejects the Hello and hangs up; the garbler
        // sees the dead socket while waiting for the ack.
        drop(bob_channel);
        let alice = garbler.join().unwrap();
        assert!(alice.is_err());
    }

    #[test]
    fn verdict_encoding() {
        assert_eq!(Verdict::Equal.to_string(), "00");
        assert_eq!(Verdict::Alice.to_string(), "01");
        assert_eq!(Verdict::Bob.to_string(), "11");
        assert!(matches!(
            Verdict::from_bits(true, false),
            Err(ProtocolError::InvalidVerdict { .. })
        ));
    }
}
