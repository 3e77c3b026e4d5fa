use blindballot::{
    AuthorityClient, Error, ErrorResponse, KeyExchangeRequest, KeyExchangeResponse,
    ParametersResponse, PublicParameters, SignatureRequest, SignatureResponse, SubmissionReceipt,
    TallyClient, VoteSubmission,
};

/// Blocking REST adapter for the authority/tally collaborator.
pub struct RestClient {
    base_uri: String,
    client: reqwest::blocking::Client,
}

impl RestClient {
    pub fn new(base_uri: &str) -> Self {
        RestClient {
            base_uri: base_uri.trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn post<B, T>(&self, path: &str, body: &B, reject: fn(String) -> Error) -> Result<T, Error>
    where
        B: serde::Serialize,
        T: serde::de::DeserializeOwned,
    {
        let full_uri = format!("{}{}", self.base_uri, path);
        let response = self
            .client
            .post(&full_uri)
            .json(body)
            .send()
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Collaborators return {"error": "..."} payloads on rejection;
            // surface the reason verbatim when one is present.
            let reason = match response.json::<ErrorResponse>() {
                Ok(payload) => payload.error,
                Err(_) => format!("HTTP status {}", status),
            };
            return Err(reject(reason));
        }

        response.json().map_err(|e| Error::Network(e.to_string()))
    }
}

impl AuthorityClient for RestClient {
    fn fetch_parameters(&self) -> Result<PublicParameters, Error> {
        let response: ParametersResponse =
            self.post("/get-public-key", &serde_json::json!({}), Error::Authority)?;
        Ok(response.public_key)
    }

    fn key_exchange(&self, request: &KeyExchangeRequest) -> Result<KeyExchangeResponse, Error> {
        self.post("/dh-exchange", request, Error::Authority)
    }

    fn request_signature(&self, request: &SignatureRequest) -> Result<SignatureResponse, Error> {
        self.post("/sign-ballot", request, Error::Authority)
    }
}

impl TallyClient for RestClient {
    fn submit_vote(&self, submission: &VoteSubmission) -> Result<SubmissionReceipt, Error> {
        self.post("/submit-vote", submission, Error::Tally)
    }
}
