use crate::serde_decimal;
use crate::{Error, PublicParameters};

use indexmap::IndexMap;
use num_bigint_dig::BigUint;
use uuid::Uuid;

/// The signing authority's request/response contract. Transport is a
/// collaborator concern; implementations live outside this crate.
pub trait AuthorityClient {
    /// Fetch the published parameters. The request carries no
    /// voter-identifying data.
    fn fetch_parameters(&self) -> Result<PublicParameters, Error>;

    /// Diffie-Hellman key exchange sub-protocol (shared-key scheme only).
    fn key_exchange(&self, request: &KeyExchangeRequest) -> Result<KeyExchangeResponse, Error>;

    /// Ask the authority to sign a blinded ballot. A rejection carries the
    /// authority's reason verbatim.
    fn request_signature(&self, request: &SignatureRequest) -> Result<SignatureResponse, Error>;
}

/// The tally service contract.
pub trait TallyClient {
    /// Submit the unblinded vote. The voter's identity is never part of
    /// this request.
    fn submit_vote(&self, submission: &VoteSubmission) -> Result<SubmissionReceipt, Error>;
}

impl<'a, C: AuthorityClient> AuthorityClient for &'a C {
    fn fetch_parameters(&self) -> Result<PublicParameters, Error> {
        (**self).fetch_parameters()
    }
    fn key_exchange(&self, request: &KeyExchangeRequest) -> Result<KeyExchangeResponse, Error> {
        (**self).key_exchange(request)
    }
    fn request_signature(&self, request: &SignatureRequest) -> Result<SignatureResponse, Error> {
        (**self).request_signature(request)
    }
}

impl<'a, C: TallyClient> TallyClient for &'a C {
    fn submit_vote(&self, submission: &VoteSubmission) -> Result<SubmissionReceipt, Error> {
        (**self).submit_vote(submission)
    }
}

/// Envelope the authority wraps its published parameters in.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ParametersResponse {
    pub public_key: PublicParameters,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct KeyExchangeRequest {
    pub client_id: Uuid,

    /// The voter's public exchange value `A = g^a mod p`.
    #[serde(rename = "A", with = "serde_decimal")]
    pub voter_value: BigUint,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct KeyExchangeResponse {
    /// The authority's public exchange value `B = g^b mod p`.
    #[serde(rename = "B", with = "serde_decimal")]
    pub authority_value: BigUint,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignatureRequest {
    pub identity: String,

    #[serde(with = "serde_decimal")]
    pub blinded_ballot: BigUint,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignatureResponse {
    #[serde(with = "serde_decimal")]
    pub blind_signature: BigUint,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VoteSubmission {
    #[serde(with = "serde_decimal")]
    pub ballot: BigUint,

    #[serde(with = "serde_decimal")]
    pub signature: BigUint,

    /// Display-only candidate label; plays no part in verification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SubmissionReceipt {
    pub success: bool,
}

/// Error payload a collaborator returns on rejection.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ErrorResponse {
    pub error: String,
}

/// Aggregate results, as served by the tally service.
///
/// Consumed by the results dashboard, not by the protocol engine; the shape
/// is defined here because it is part of the collaborator contract.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TallyResults {
    /// Vote counts per candidate. An ordered map, so repeated queries
    /// render in a stable order.
    pub votes: IndexMap<String, u64>,
    /// Turnout percentage.
    pub participation: f64,
    pub total_voters: u64,
    pub ballots_cast: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_request_wire_format() {
        let request = SignatureRequest {
            identity: "4242001".to_string(),
            blinded_ballot: BigUint::from(1234u32),
            client_id: None,
        };
        let encoded = serde_json::to_string(&request).unwrap();
        assert_eq!(
            encoded,
            r#"{"identity":"4242001","blinded_ballot":"1234"}"#
        );
    }

    #[test]
    fn vote_submission_never_carries_an_identity() {
        let submission = VoteSubmission {
            ballot: BigUint::from(65u32),
            signature: BigUint::from(588u32),
            candidate: Some("Ada Lovelace".to_string()),
        };
        let encoded = serde_json::to_value(&submission).unwrap();
        let fields: Vec<String> = encoded.as_object().unwrap().keys().cloned().collect();
        assert_eq!(fields, ["ballot", "signature", "candidate"]);
    }

    #[test]
    fn tally_results_parse() {
        let results: TallyResults = serde_json::from_str(
            r#"{
                "votes": {"Ada Lovelace": 12, "Grace Hopper": 9},
                "participation": 70.0,
                "total_voters": 30,
                "ballots_cast": 21
            }"#,
        )
        .unwrap();
        assert_eq!(results.votes["Ada Lovelace"], 12);
        assert_eq!(results.ballots_cast, 21);
    }
}
