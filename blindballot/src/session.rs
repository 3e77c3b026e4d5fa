use crate::*;

use num_bigint_dig::BigUint;
use num_enum::TryFromPrimitive;
use std::fmt;
use uuid::Uuid;

/// The six protocol steps, in the order a session must run them.
#[derive(
    Serialize, Deserialize, TryFromPrimitive, Copy, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Step {
    Identity = 1,
    BallotSelection = 2,
    Blinding = 3,
    Signing = 4,
    Unblinding = 5,
    Submission = 6,
    /// Terminal marker, entered once the tally service acknowledges the vote.
    Complete = 7,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Step::Identity => "identity",
            Step::BallotSelection => "ballot selection",
            Step::Blinding => "blinding",
            Step::Signing => "signing request",
            Step::Unblinding => "unblinding",
            Step::Submission => "submission",
            Step::Complete => "complete",
        };
        write!(f, "{}", name)
    }
}

/// Progress marker for a step, for UI feedback only.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Active,
    Inactive,
}

/// One voter's protocol run.
///
/// Every artifact of the run lives in this struct and nowhere else: the
/// session owns its identity, ballot, parameters, blinding factor and
/// signatures exclusively, and all of them evaporate with the session.
/// Steps only ever move forward; the single way back is [`reset`], which
/// discards everything.
///
/// Collaborator calls block inside the step method that issues them. A step
/// either completes fully or leaves the session exactly where it was, so a
/// failed or abandoned request never produces a half-built artifact.
///
/// [`reset`]: VotingSession::reset
pub struct VotingSession<C> {
    client: C,
    id: Uuid,
    step: Step,
    identity: Option<String>,
    ballot: Option<BallotChoice>,
    scheme: Option<BlindingScheme>,
    factor: Option<BlindingFactor>,
    blinded_ballot: Option<BigUint>,
    blind_signature: Option<BigUint>,
    unblinded_signature: Option<BigUint>,
}

impl<C> VotingSession<C>
where
    C: AuthorityClient + TallyClient,
{
    pub fn new(client: C) -> Self {
        VotingSession {
            client,
            id: Uuid::new_v4(),
            step: Step::Identity,
            identity: None,
            ballot: None,
            scheme: None,
            factor: None,
            blinded_ballot: None,
            blind_signature: None,
            unblinded_signature: None,
        }
    }

    /// Step 1: capture the voter's identity token.
    pub fn submit_identity(&mut self, identity: &str) -> Result<(), Error> {
        self.require(Step::Identity)?;
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(Error::EmptyIdentity);
        }
        self.identity = Some(identity.to_string());
        self.step = Step::BallotSelection;
        Ok(())
    }

    /// Step 2: record the ballot choice and fetch the authority's public
    /// parameters, which also selects the blinding scheme for the rest of
    /// the session. On collaborator failure neither artifact is kept.
    pub fn select_ballot(&mut self, choice: &str) -> Result<(), Error> {
        self.require(Step::BallotSelection)?;
        if choice.trim().is_empty() {
            return Err(Error::EmptyBallot);
        }
        let params = self.client.fetch_parameters()?;
        self.ballot = Some(BallotChoice::new(choice));
        self.scheme = Some(BlindingScheme::select(params));
        self.step = Step::Blinding;
        Ok(())
    }

    /// Step 3: generate the blinding factor and compute the blinded ballot.
    ///
    /// The Diffie-Hellman scheme runs its key-exchange sub-protocol here,
    /// before blinding, because the shared key is an input to the blinding
    /// transform.
    pub fn blind_ballot(&mut self) -> Result<(), Error> {
        self.require(Step::Blinding)?;
        let scheme = self
            .scheme
            .as_ref()
            .expect("blindballot: scheme missing after ballot selection");
        let ballot = self
            .ballot
            .as_ref()
            .expect("blindballot: ballot missing after ballot selection");

        let mut factor = scheme.generate_factor()?;
        if let Some(voter_value) = scheme.exchange_value(&factor)? {
            let request = KeyExchangeRequest {
                client_id: self.id,
                voter_value,
            };
            let response = self.client.key_exchange(&request)?;
            scheme.complete_exchange(&mut factor, &response.authority_value)?;
        }
        let blinded = scheme.blind(ballot.encoded(), &factor)?;

        self.factor = Some(factor);
        self.blinded_ballot = Some(blinded);
        self.step = Step::Signing;
        Ok(())
    }

    /// Step 4: submit the blinded ballot for signing. An authority
    /// rejection (network failure, identity already signed, ...) is
    /// surfaced verbatim and the session stays here so the voter may retry.
    pub fn request_signature(&mut self) -> Result<(), Error> {
        self.require(Step::Signing)?;
        let request = SignatureRequest {
            identity: self
                .identity
                .clone()
                .expect("blindballot: identity missing after identity step"),
            blinded_ballot: self
                .blinded_ballot
                .clone()
                .expect("blindballot: blinded ballot missing after blinding step"),
            client_id: Some(self.id),
        };
        let response = self.client.request_signature(&request)?;
        self.blind_signature = Some(response.blind_signature);
        self.step = Step::Unblinding;
        Ok(())
    }

    /// Step 5: strip the blinding factor from the blind signature. A
    /// missing modular inverse aborts with an explicit error; no signature
    /// is ever fabricated.
    pub fn unblind_signature(&mut self) -> Result<(), Error> {
        self.require(Step::Unblinding)?;
        let scheme = self
            .scheme
            .as_ref()
            .expect("blindballot: scheme missing after ballot selection");
        let factor = self
            .factor
            .as_ref()
            .expect("blindballot: blinding factor missing after blinding step");
        let blind_signature = self
            .blind_signature
            .as_ref()
            .expect("blindballot: blind signature missing after signing step");

        let signature = scheme.unblind(blind_signature, factor)?;
        self.unblinded_signature = Some(signature);
        self.step = Step::Submission;
        Ok(())
    }

    /// Step 6: submit the unblinded vote to the tally service. The identity
    /// is deliberately absent from this request.
    pub fn submit_vote(&mut self) -> Result<SubmissionReceipt, Error> {
        self.require(Step::Submission)?;
        let ballot = self
            .ballot
            .as_ref()
            .expect("blindballot: ballot missing after ballot selection");
        let submission = VoteSubmission {
            ballot: ballot.encoded().clone(),
            signature: self
                .unblinded_signature
                .clone()
                .expect("blindballot: signature missing after unblinding step"),
            candidate: Some(ballot.text().to_string()),
        };
        let receipt = self.client.submit_vote(&submission)?;
        self.step = Step::Complete;
        Ok(receipt)
    }

    /// Abandon the session: discard every artifact and start over with a
    /// fresh session id.
    pub fn reset(&mut self) {
        self.id = Uuid::new_v4();
        self.step = Step::Identity;
        self.identity = None;
        self.ballot = None;
        self.scheme = None;
        self.factor = None;
        self.blinded_ballot = None;
        self.blind_signature = None;
        self.unblinded_signature = None;
    }

    fn require(&self, attempted: Step) -> Result<(), Error> {
        if self.step == attempted {
            Ok(())
        } else {
            Err(Error::StepOutOfOrder {
                attempted,
                current: self.step,
            })
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// Completed / active / inactive marker for a step, relative to the
    /// session's progress.
    pub fn status(&self, step: Step) -> StepStatus {
        if step < self.step {
            StepStatus::Completed
        } else if step == self.step {
            StepStatus::Active
        } else {
            StepStatus::Inactive
        }
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn ballot(&self) -> Option<&BallotChoice> {
        self.ballot.as_ref()
    }

    pub fn scheme(&self) -> Option<&BlindingScheme> {
        self.scheme.as_ref()
    }

    pub fn blinding_factor(&self) -> Option<&BlindingFactor> {
        self.factor.as_ref()
    }

    pub fn blinded_ballot(&self) -> Option<&BigUint> {
        self.blinded_ballot.as_ref()
    }

    pub fn blind_signature(&self) -> Option<&BigUint> {
        self.blind_signature.as_ref()
    }

    pub fn unblinded_signature(&self) -> Option<&BigUint> {
        self.unblinded_signature.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A collaborator that is never reachable; good enough for exercising
    // the precondition gates.
    struct Unreachable;

    impl AuthorityClient for Unreachable {
        fn fetch_parameters(&self) -> Result<PublicParameters, Error> {
            Err(Error::Network("unreachable".to_string()))
        }
        fn key_exchange(&self, _: &KeyExchangeRequest) -> Result<KeyExchangeResponse, Error> {
            Err(Error::Network("unreachable".to_string()))
        }
        fn request_signature(&self, _: &SignatureRequest) -> Result<SignatureResponse, Error> {
            Err(Error::Network("unreachable".to_string()))
        }
    }

    impl TallyClient for Unreachable {
        fn submit_vote(&self, _: &VoteSubmission) -> Result<SubmissionReceipt, Error> {
            Err(Error::Network("unreachable".to_string()))
        }
    }

    #[test]
    fn empty_identity_is_rejected_and_session_stays_put() {
        let mut session = VotingSession::new(Unreachable);
        assert!(matches!(
            session.submit_identity("   "),
            Err(Error::EmptyIdentity)
        ));
        assert_eq!(session.step(), Step::Identity);
        assert_eq!(session.identity(), None);
    }

    #[test]
    fn steps_cannot_run_out_of_order() {
        let mut session = VotingSession::new(Unreachable);
        assert!(matches!(
            session.blind_ballot(),
            Err(Error::StepOutOfOrder {
                attempted: Step::Blinding,
                current: Step::Identity,
            })
        ));
        assert!(matches!(
            session.unblind_signature(),
            Err(Error::StepOutOfOrder { .. })
        ));
        assert_eq!(session.step(), Step::Identity);
    }

    #[test]
    fn collaborator_failure_keeps_ballot_selection_atomic() {
        let mut session = VotingSession::new(Unreachable);
        session.submit_identity("4242001").unwrap();
        assert!(matches!(
            session.select_ballot("Ada Lovelace"),
            Err(Error::Network(_))
        ));
        assert_eq!(session.step(), Step::BallotSelection);
        assert!(session.ballot().is_none());
        assert!(session.scheme().is_none());
    }

    #[test]
    fn progress_markers_track_the_active_step() {
        let mut session = VotingSession::new(Unreachable);
        session.submit_identity("4242001").unwrap();
        assert_eq!(session.status(Step::Identity), StepStatus::Completed);
        assert_eq!(session.status(Step::BallotSelection), StepStatus::Active);
        assert_eq!(session.status(Step::Blinding), StepStatus::Inactive);
        assert_eq!(session.status(Step::Submission), StepStatus::Inactive);
    }

    #[test]
    fn reset_discards_identity_and_redraws_the_session_id() {
        let mut session = VotingSession::new(Unreachable);
        let first_id = session.id();
        session.submit_identity("4242001").unwrap();
        session.reset();
        assert_eq!(session.step(), Step::Identity);
        assert_eq!(session.identity(), None);
        assert_ne!(session.id(), first_id);
    }
}
